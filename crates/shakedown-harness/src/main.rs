use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use shakedown_harness::{Harness, HarnessConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "shk-replay")]
#[command(about = "Replay handshake fuzz inputs outside the fuzz engine", long_about = None)]
struct Cli {
    /// Input files or directories of inputs.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Harness config (.toml or .json).
    #[arg(short, long, env = "SHK_CONFIG")]
    config: Option<PathBuf>,

    /// Print each run report as a JSON line.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HarnessConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    let harness = Harness::new(config).context("failed to set up harness")?;

    let files = collect_inputs(&cli.inputs)?;
    tracing::info!(count = files.len(), "replaying inputs");

    for path in files {
        let data = std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let report = harness.run(&data)?;
        if cli.json {
            let mut line = serde_json::to_value(&report)?;
            line["path"] = serde_json::Value::String(path.display().to_string());
            println!("{}", line);
        } else {
            println!(
                "{}: {:?} selector={:?} owner={:?} iterations={} injected={}",
                path.display(),
                report.exit,
                report.selector,
                report.injection_owner,
                report.iterations,
                report.injected_bytes()
            );
        }
    }

    Ok(())
}

/// Expands directories to their regular files, sorted by path.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries = read_dir_files(input)?;
            entries.sort();
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn read_dir_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            out.push(entry.path());
        }
    }
    Ok(out)
}
