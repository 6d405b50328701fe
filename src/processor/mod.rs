//! Parsing pipeline and batch processing of bulletin releases.
//!
//! [`parse_text`] runs the synchronous core on one release: row reading,
//! segmentation, table building, row decoding and frame assembly.
//! [`VintageProcessor`] runs many releases concurrently, validates each
//! against checkpoints and writes the frames that pass.

pub mod discovery;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{
    discovery::{InputDiscovery, VintageFile},
    writer::{FrameWriter, OutputFormat},
};

use crate::config::ParsingConfig;
use crate::emitter::emit_table;
use crate::error::{KepError, Result};
use crate::frame::{FrameAssembler, Frames};
use crate::models::{CheckpointSet, Observation, ProcessingStats};
use crate::row_format::detect_row_format;
use crate::rows::{RowClassifier, read_rows};
use crate::segment::split_segments;
use crate::table::build_tables;
use crate::validator::{ValidationReport, validate};

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, error, info};

/// Decode all observations of one release
pub fn parse_observations(text: &str, config: &ParsingConfig) -> Result<Vec<Observation>> {
    let classifier = RowClassifier::from_config(config);
    let rows = read_rows(text, config);
    let segments = split_segments(rows, config)?;

    let mut observations = Vec::new();
    for segment in &segments {
        let reader = segment.unit.reader;
        let mut tables = build_tables(segment, config)?;
        for table in tables.iter_mut().filter(|t| !t.datarows.is_empty()) {
            table.row_format = Some(detect_row_format(&table.datarows, reader)?);
            observations.extend(emit_table(table, reader, &classifier)?);
        }
    }

    debug!("Decoded {} observations", observations.len());
    Ok(observations)
}

/// Parse one release into annual, quarterly and monthly frames
pub fn parse_text(text: &str, config: &ParsingConfig) -> Result<Frames> {
    let observations = parse_observations(text, config)?;
    FrameAssembler::from_config(config).assemble(&observations)
}

/// Parse and validate one release
pub fn parse_and_validate(
    text: &str,
    config: &ParsingConfig,
    checkpoints: &CheckpointSet,
) -> Result<(Frames, ValidationReport)> {
    let frames = parse_text(text, config)?;
    let report = validate(&frames, checkpoints);
    Ok((frames, report))
}

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Releases processed at the same time
    pub workers: usize,
    pub format: OutputFormat,
    /// Skip checkpoint validation and write every parsed release
    pub skip_validation: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().clamp(1, 8),
            format: OutputFormat::Csv,
            skip_validation: false,
        }
    }
}

/// Batch processor for bulletin release files
#[derive(Debug)]
pub struct VintageProcessor {
    output_path: PathBuf,
    config: Arc<ParsingConfig>,
    checkpoints: Arc<CheckpointSet>,
    options: ProcessorOptions,
    discovery: InputDiscovery,
}

impl VintageProcessor {
    /// Create a new processor over input files, directories or glob patterns
    pub fn new(
        inputs: Vec<String>,
        output_path: PathBuf,
        config: ParsingConfig,
        checkpoints: CheckpointSet,
    ) -> Self {
        Self {
            output_path,
            config: Arc::new(config),
            checkpoints: Arc::new(checkpoints),
            options: ProcessorOptions::default(),
            discovery: InputDiscovery::new(inputs),
        }
    }

    /// Configure the processor
    pub fn with_options(mut self, options: ProcessorOptions) -> Self {
        self.options = options;
        self
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        println!("{}", "Starting bulletin processing".bright_green().bold());
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.output_path.display()
        );

        let files = self.discovery.discover()?;
        println!(
            "  {} {} release files",
            "Found".bright_green(),
            files.len().to_string().bright_white().bold()
        );

        if files.is_empty() {
            return Ok(ProcessingStats {
                output_path: self.output_path.clone(),
                processing_time_ms: start_time.elapsed().as_millis(),
                ..Default::default()
            });
        }

        tokio::fs::create_dir_all(&self.output_path).await?;

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let workers = self.options.workers.max(1).min(files.len());
        let results: Vec<Result<usize>> = stream::iter(files)
            .map(|file| {
                let pb = pb.clone();
                async move {
                    pb.set_message(file.output_name());
                    let result = self.process_file(file.clone()).await;
                    pb.inc(1);
                    match &result {
                        Ok(count) => debug!("Processed {}: {} values", file.path.display(), count),
                        Err(e) => error!("Failed to process {}: {:#}", file.path.display(), e),
                    }
                    result
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;
        pb.finish_and_clear();

        let mut stats = ProcessingStats {
            output_path: self.output_path.clone(),
            ..Default::default()
        };
        for result in &results {
            match result {
                Ok(count) => {
                    stats.files_processed += 1;
                    stats.observations += count;
                }
                Err(_) => stats.files_failed += 1,
            }
        }
        stats.processing_time_ms = start_time.elapsed().as_millis();

        self.report(&stats);
        Ok(stats)
    }

    /// Parse, validate and write a single release off the async runtime
    async fn process_file(&self, file: VintageFile) -> Result<usize> {
        let text = tokio::fs::read_to_string(&file.path).await?;
        let config = Arc::clone(&self.config);
        let checkpoints = Arc::clone(&self.checkpoints);
        let skip_validation = self.options.skip_validation;
        let writer = FrameWriter::new(self.output_path.join(file.output_name()), self.options.format);
        let path = file.path.clone();

        task::spawn_blocking(move || -> Result<usize> {
            let (frames, report) = parse_and_validate(&text, &config, &checkpoints)?;
            if !skip_validation {
                report.into_result()?;
            }
            let written = writer.write(&frames)?;
            info!("{}: wrote {} files", file.output_name(), written.len());
            Ok(frames.value_count())
        })
        .await
        .map_err(|e| KepError::ProcessingFailed {
            path,
            reason: format!("worker task failed: {}", e),
        })?
    }

    fn report(&self, stats: &ProcessingStats) {
        println!("\n{}", "Processing Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Releases processed:".bright_cyan(),
            stats.files_processed.to_string().bright_white()
        );
        if stats.files_failed > 0 {
            println!(
                "  {} {}",
                "Releases failed:".bright_red(),
                stats.files_failed.to_string().bright_red().bold()
            );
        }
        println!(
            "  {} {}",
            "Values written:".bright_cyan(),
            stats.observations.to_string().bright_white().bold()
        );
    }
}
