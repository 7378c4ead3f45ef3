//! One external command per step, reported the same way everywhere.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// A command whose failure either aborts the task or is only reported.
pub struct Step<'a> {
    pub label: &'a str,
    pub program: &'a str,
    pub args: &'a [&'a str],
    pub required: bool,
}

impl<'a> Step<'a> {
    /// Cargo invocation that aborts the task on failure.
    pub fn cargo(label: &'a str, args: &'a [&'a str]) -> Self {
        Self {
            label,
            program: "cargo",
            args,
            required: true,
        }
    }

    /// Report failure as a warning instead of aborting.
    pub fn advisory(mut self) -> Self {
        self.required = false;
        self
    }

    /// Run to completion. Returns the captured output when it succeeded.
    pub fn run(&self) -> Result<Option<Output>> {
        println!("{}", format!("  {}...", self.label).cyan());
        let start = Instant::now();

        let output = Command::new(self.program)
            .args(self.args)
            .output()
            .with_context(|| format!("Failed to run {} {}", self.program, self.args.join(" ")))?;

        if output.status.success() {
            let summary = test_summary(&String::from_utf8_lossy(&output.stdout))
                .map(|s| format!(" ({s})"))
                .unwrap_or_default();
            println!(
                "{}",
                format!(
                    "  ✓ {}{} in {:.2}s",
                    self.label,
                    summary,
                    start.elapsed().as_secs_f64()
                )
                .green()
            );
            println!();
            return Ok(Some(output));
        }

        if self.required {
            eprintln!("{}", format!("  ✗ {} failed", self.label).red().bold());
            eprintln!();
            eprintln!("{}", String::from_utf8_lossy(&output.stdout));
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            anyhow::bail!("{} failed", self.label);
        }

        eprintln!("{}", format!("  ⚠ {} reported problems", self.label).yellow().bold());
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        println!();
        Ok(None)
    }
}

/// Run steps in order, stopping at the first required failure.
pub fn run_all(title: &str, steps: &[Step<'_>]) -> Result<()> {
    println!();
    println!("{}", title.cyan().bold());
    println!();

    let start = Instant::now();
    for step in steps {
        step.run()?;
    }

    println!(
        "{}",
        format!("✓ Done in {:.2}s", start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();
    Ok(())
}

/// Pull "N passed; M failed; ..." out of cargo test output.
///
/// A workspace run prints one result line per test binary; only the first
/// is reported.
pub fn test_summary(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.split("test result:").nth(1))
        .map(|s| s.trim().trim_start_matches("ok.").trim().to_string())
}
