//! Command-line entry point.

use clap::Parser;
use luaform::config::GeneratorConfig;
use luaform::format::Formatter;
use luaform::fs::{FileProcessor, LocalFileProcessor};
use luaform::logging::{self, LogLevel};
use luaform::pipeline;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Turns embeddable Lua scripts into YAML/JSON configuration artifacts.
#[derive(Debug, Parser)]
#[command(name = "luaform", version, about)]
struct Cli {
    /// Output format: yaml or json
    #[arg(short = 'o', long = "output", default_value = "yaml")]
    format: String,

    /// Output file suffix, overriding the format's canonical one
    #[arg(long)]
    suffix: Option<String>,

    /// Suffix used to resolve `<module>-<suffix>` override modules
    #[arg(long = "override-suffix", env = "LUAFORM_OVERRIDE_SUFFIX")]
    override_suffix: Option<String>,

    /// Report intended output paths without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Number of worker threads
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Number of writer threads
    #[arg(long, default_value_t = 2)]
    writers: usize,

    /// Job channel capacity
    #[arg(long, default_value_t = 8)]
    job_buffer: usize,

    /// Result channel capacity
    #[arg(long, default_value_t = 8)]
    result_buffer: usize,

    /// Root directory generated files are written under
    #[arg(long, default_value = ".")]
    output_root: PathBuf,

    /// Lua script files or glob patterns
    #[arg(required = true)]
    globs: Vec<String>,
}

fn main() -> ExitCode {
    logging::init(LogLevel::default());

    let cli = Cli::parse();
    match generate(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn generate(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = GeneratorConfig::new()
        .with_format(cli.format)
        .with_dry_run(cli.dry_run)
        .with_workers(cli.workers)
        .with_writers(cli.writers)
        .with_job_capacity(cli.job_buffer)
        .with_result_capacity(cli.result_buffer)
        .with_output_root(cli.output_root);
    let config = match cli.suffix {
        Some(suffix) => config.with_suffix(suffix),
        None => config,
    };
    let config = match cli.override_suffix {
        Some(suffix) => config.with_override_suffix(suffix),
        None => config,
    };
    config.validate()?;

    let formatter = Formatter::new(config.parsed_format(), config.suffix.as_deref());
    let processor = LocalFileProcessor::new();

    let files = processor.find_files(&cli.globs)?;
    info!(scripts = files.len(), "discovered input scripts");

    pipeline::run(files, &processor, &formatter, &config)?;
    Ok(())
}
