//! Frame output for processed releases
//!
//! Writes the annual, quarterly and monthly frames of one release as
//! `dfa`, `dfq` and `dfm` files in CSV or Parquet format.

use crate::error::{KepError, Result};
use crate::frame::Frames;
use crate::models::Frequency;

use clap::ValueEnum;
use polars::prelude::{CsvWriter, ParquetCompression, ParquetWriter, SerWriter};
use std::fs::File;
use std::path::PathBuf;
use tracing::debug;

/// Output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// File stem of the frame for a frequency
pub fn frame_stem(frequency: Frequency) -> String {
    format!("df{}", frequency.code())
}

/// Writes the frames of one release into an output directory
#[derive(Debug, Clone)]
pub struct FrameWriter {
    output_dir: PathBuf,
    format: OutputFormat,
}

impl FrameWriter {
    pub fn new(output_dir: PathBuf, format: OutputFormat) -> Self {
        Self { output_dir, format }
    }

    /// Write all three frames, returning the written paths
    pub fn write(&self, frames: &Frames) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::with_capacity(Frequency::ALL.len());
        for frame in frames.iter() {
            let path = self.output_dir.join(format!(
                "{}.{}",
                frame_stem(frame.frequency()),
                self.format.extension()
            ));
            let mut df = frame.to_dataframe()?;
            let mut file = File::create(&path)?;

            match self.format {
                OutputFormat::Csv => CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(&mut df),
                OutputFormat::Parquet => ParquetWriter::new(&mut file)
                    .with_compression(ParquetCompression::Snappy)
                    .finish(&mut df)
                    .map(|_| ()),
            }
            .map_err(|e| KepError::ProcessingFailed {
                path: path.clone(),
                reason: format!("Failed to write {} frame: {}", frame.frequency(), e),
            })?;

            debug!("Wrote {} rows to {}", df.height(), path.display());
            written.push(path);
        }

        Ok(written)
    }
}
