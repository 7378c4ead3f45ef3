use anyhow::Result;

use crate::cargo::{run_all, Step};
use crate::TARGET;

pub fn run() -> Result<()> {
    run_all(
        "🔍 Checking firmware builds...",
        &[
            Step::cargo(
                "Hardware target (STM32H7)",
                &["check", "-p", "pendant", "--target", TARGET, "--features", "hardware"],
            ),
            // Drivers and loop build for the host too; that is what the tests run on.
            Step::cargo("Host build", &["check", "-p", "pendant", "--features", "defmt"]),
            Step::cargo(
                "Platform crate (no_std)",
                &["check", "-p", "platform", "--target", TARGET, "--no-default-features"],
            ),
            Step::cargo(
                "Clippy",
                &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            )
            .advisory(),
            Step::cargo("Formatting", &["fmt", "--all", "--check"]).advisory(),
        ],
    )
}
