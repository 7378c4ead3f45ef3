use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

use crate::cargo::Step;
use crate::{CHIP, TARGET};

pub fn run(release: bool) -> Result<()> {
    let profile = if release { "release" } else { "debug" };
    let binary = format!("target/{TARGET}/{profile}/pendant");

    println!();
    println!(
        "{}",
        format!("🔨 Building firmware ({profile} mode)...").cyan().bold()
    );
    println!();

    let mut build = vec!["build", "-p", "pendant", "--target", TARGET, "--features", "hardware"];
    if release {
        build.push("--release");
    }
    Step::cargo("Build", &build).run()?;

    show_binary_size(&binary);

    println!("{}", "📡 Flashing to STM32H7...".cyan().bold());
    println!("   {}", "Connecting to probe...".dimmed());

    let flash_start = Instant::now();
    let output = Command::new("probe-rs")
        .args(["download", &binary, "--chip", CHIP, "--probe-index", "0"])
        .output()
        .context("Failed to run probe-rs. Is probe-rs installed? (cargo install probe-rs-tools)")?;

    if !output.status.success() {
        eprintln!("{}", "✗ Flash failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("Flash failed - check that the probe is connected and the device is powered");
    }

    println!(
        "{}",
        format!(
            "✓ Flash successful in {:.2}s",
            flash_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();
    println!(
        "   {}",
        format!("Use 'probe-rs attach --chip {CHIP} {binary}' to view RTT logs").dimmed()
    );
    println!();

    Ok(())
}

/// Section sizes via `rust-size`, if cargo-binutils is installed.
fn show_binary_size(binary: &str) {
    let Ok(out) = Command::new("rust-size").args(["-A", binary]).output() else {
        return;
    };
    if !out.status.success() {
        return;
    }
    println!("{}", "📊 Binary size:".cyan());
    for line in String::from_utf8_lossy(&out.stdout).lines() {
        println!("   {}", line.dimmed());
    }
    println!();
}
