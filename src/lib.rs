//! KEP Processor Library
//!
//! Turns the tab-delimited text of a monthly statistical bulletin into
//! annual, quarterly and monthly time-series frames.
//!
//! This library provides tools for:
//! - Reading raw rows and normalizing messy numeric cells
//! - Splitting a release into boundary-scoped segments
//! - Labeling tables from header text and unit vocabularies
//! - Decoding data rows by their column shape
//! - Assembling and de-accumulating frames
//! - Validating frames against known checkpoint values
//! - Batch processing of release files to CSV or Parquet

pub mod cli;
pub mod config;
pub mod constants;
pub mod definitions;
pub mod emitter;
pub mod error;
pub mod frame;
pub mod labels;
pub mod models;
pub mod processor;
pub mod row_format;
pub mod rows;
pub mod segment;
pub mod table;
pub mod validator;

// Re-export commonly used types
pub use config::{DuplicatePolicy, ParsingConfig, ParsingUnit, RowReader, UnitPattern};
pub use error::{KepError, Result};
pub use frame::{Frame, FrameAssembler, Frames};
pub use models::{Checkpoint, CheckpointSet, Frequency, Label, Observation, RawRow};
pub use processor::writer::{FrameWriter, OutputFormat};
pub use processor::{VintageProcessor, parse_and_validate, parse_observations, parse_text};
pub use validator::{ValidationReport, validate};
