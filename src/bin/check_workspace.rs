//! Lint the README and inspect the workspace folder tree.
//!
//! Usage: cargo run --bin check_workspace -- --readme README.md --root .
//! Exits with status 1 if any check fails.

use clap::Parser;
use genai_workspace::{inspect, layout_checks, lint_file, scaffold, LintReport};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "check_workspace",
    version,
    about = "Check the Document Index README and the suggested folder layout."
)]
struct Args {
    /// README to lint
    #[arg(long, default_value = "README.md")]
    readme: PathBuf,

    /// Workspace root holding the suggested subfolders
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Largest file allowed under datasets/, in megabytes
    #[arg(long, default_value_t = 50)]
    max_dataset_mb: u64,

    /// Create missing subfolders before inspecting
    #[arg(long)]
    scaffold: bool,

    /// Only lint the README
    #[arg(long)]
    skip_layout: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genai_workspace=info,warn".into()),
        )
        .init();

    let args = Args::parse();

    let mut report: LintReport = lint_file(&args.readme)?;

    if !args.skip_layout {
        if args.scaffold {
            let created = scaffold(&args.root)?;
            println!("Scaffolded {} folder(s)", created.len());
        }
        let limit = args.max_dataset_mb.saturating_mul(1024 * 1024);
        let layout = inspect(&args.root, limit)?;
        report.extend(layout_checks(&layout));
    }

    for result in &report.results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        println!("{}: {}", status, result.name);
        println!("  -> {}", result.message);
    }
    println!("\nTotal: {}", report.summary());

    if !report.passed() {
        std::process::exit(1);
    }

    Ok(())
}
