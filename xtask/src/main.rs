// Desktop/tooling crate — unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod cargo;
mod check;
mod flash;
mod test;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Cross-compilation target for the board.
pub const TARGET: &str = "thumbv7em-none-eabihf";

/// probe-rs chip name.
pub const CHIP: &str = "STM32H743ZITx";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Pendant firmware development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the firmware and flash it via probe-rs
    Flash {
        /// Build and flash release version
        #[arg(short, long)]
        release: bool,
    },
    /// Check target and host builds, clippy and formatting
    Check,
    /// Run host tests (unit, integration, doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Flash { release } => flash::run(release),
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
    }
}
