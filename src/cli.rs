//! Command-line interface components.

use crate::config::ParsingConfig;
use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::definitions::{builtin_checkpoints, builtin_config};
use crate::models::{CheckpointSet, ProcessingStats};
use crate::processor::writer::OutputFormat;
use crate::processor::{ProcessorOptions, VintageProcessor};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "kep")]
#[command(about = "Parse monthly statistical bulletins into annual, quarterly and monthly frames")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse, validate and write release files
    Process(ProcessArgs),
    /// Print the built-in parsing definitions as YAML
    Definitions(DefinitionsArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ProcessArgs {
    /// Release files, directories or glob patterns
    #[arg(value_name = "INPUTS", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Output directory; each release gets a subdirectory named by vintage
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// YAML parsing configuration (built-in definitions if not given)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// YAML checkpoint set
    #[arg(long)]
    pub checkpoints: Option<PathBuf>,

    /// Output file format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Write releases even when checkpoints fail
    #[arg(long)]
    pub skip_validation: bool,

    /// Number of releases processed concurrently
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DefinitionsArgs {
    /// Print the built-in checkpoints instead of the parsing configuration
    #[arg(long)]
    pub checkpoints: bool,
}

impl ProcessArgs {
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Parsing configuration from `--config`, else the built-in one
    pub fn load_config(&self) -> Result<ParsingConfig> {
        match &self.config {
            Some(path) => ParsingConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => builtin_config().context("Built-in definitions are invalid"),
        }
    }

    /// Checkpoints from `--checkpoints`; built-in ones only apply to the built-in config
    pub fn load_checkpoints(&self) -> Result<CheckpointSet> {
        match (&self.checkpoints, &self.config) {
            (Some(path), _) => load_checkpoint_file(path),
            (None, None) => Ok(builtin_checkpoints()),
            (None, Some(_)) => Ok(CheckpointSet::default()),
        }
    }

    pub fn options(&self) -> ProcessorOptions {
        let defaults = ProcessorOptions::default();
        ProcessorOptions {
            workers: self.workers.unwrap_or(defaults.workers).max(1),
            format: self.format,
            skip_validation: self.skip_validation,
        }
    }
}

fn load_checkpoint_file(path: &Path) -> Result<CheckpointSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read checkpoints {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse checkpoints {}", path.display()))
}

/// Set up structured logging on stderr
pub fn setup_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kep_processor={}", level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Run the `process` command
pub async fn run(args: ProcessArgs) -> Result<ProcessingStats> {
    setup_logging(args.log_level());
    info!("Starting bulletin processor");
    debug!("Command line arguments: {:?}", args);

    let config = args.load_config()?;
    let checkpoints = args.load_checkpoints()?;
    debug!(
        "{} parsing units, {} mandatory checkpoints, {} optional groups",
        config.parsing_units.len(),
        checkpoints.mandatory.len(),
        checkpoints.optional.len()
    );

    let processor = VintageProcessor::new(args.inputs.clone(), args.output.clone(), config, checkpoints)
        .with_options(args.options());

    processor
        .process()
        .await
        .context("Processing failed")
}

/// Render the `definitions` command output
pub fn render_definitions(args: &DefinitionsArgs) -> Result<String> {
    let yaml = if args.checkpoints {
        serde_yaml::to_string(&builtin_checkpoints())?
    } else {
        serde_yaml::to_string(&builtin_config()?)?
    };
    Ok(yaml)
}
