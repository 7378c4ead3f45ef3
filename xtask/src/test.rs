use anyhow::Result;

use crate::cargo::{run_all, Step};

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    let mut steps = Vec::new();
    if !integration_only {
        steps.push(Step::cargo(
            "Unit tests",
            &["test", "--lib", "--workspace", "--features", "platform/std"],
        ));
    }
    if !unit_only {
        steps.push(Step::cargo(
            "Integration tests",
            &["test", "--tests", "-p", "platform", "-p", "pendant", "--features", "platform/std"],
        ));
    }
    // Doc examples are illustrative; a failure there should not block.
    steps.push(Step::cargo("Doc tests", &["test", "--doc", "--workspace"]).advisory());

    run_all("🧪 Running tests...", &steps)
}
