mod config;
mod normalizer;
mod output;
mod parsers;
mod pipeline;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use config::{Config, OutputMode};
use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Convert Apache combined log timestamps to epoch time, or to bodyfile
/// records for mactime.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Apache log to parse
    #[arg(short, long, value_name = "FILE", default_value = "test.log")]
    file: String,

    /// Enable mactime output format
    #[arg(short, long)]
    mactime: bool,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            target_file: self.file.into(),
            mode: OutputMode::from_mactime(self.mactime),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.file.is_empty() {
        Args::command()
            .error(ErrorKind::ValueValidation, "Please specify a file to parse")
            .exit();
    }
    let config = args.into_config();

    // stdout is reserved for converted lines
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let start_time = Instant::now();
    let path = &config.target_file;
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mmap =
        unsafe { Mmap::map(&file) }.with_context(|| format!("cannot read {}", path.display()))?;

    let converter = pipeline::Converter::new(config.mode)?;
    let mut writer = output::Writer::new(io::stdout().lock());
    let stats = pipeline::run(&converter, &mmap, &mut writer)?;
    writer.finish()?;

    info!(
        file = %path.display(),
        mode = ?config.mode,
        lines = stats.lines,
        converted = stats.converted,
        passed_through = stats.passed_through,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "done"
    );
    if stats.timestamp_errors > 0 {
        warn!(
            count = stats.timestamp_errors,
            "lines matched the combined format but had an invalid timestamp; passed through unchanged"
        );
    }

    Ok(())
}
