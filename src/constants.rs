//! Application constants for the bulletin processor
//!
//! Plausible year range, missing-value glyphs, the known data row shapes
//! and the naming conventions shared across modules.

// =============================================================================
// Row Classification
// =============================================================================

/// Earliest year accepted in a year cell
pub const MIN_YEAR: i32 = 1991;

/// Latest year accepted in a year cell
pub const MAX_YEAR: i32 = 2050;

/// First cells starting with these prefixes are dropped on read
pub const DEFAULT_IGNORE_PREFIXES: &[&str] = &["___", "#"];

// =============================================================================
// Value Normalization
// =============================================================================

/// Maximum number of cleaning attempts on a single cell
pub const MAX_NORMALIZE_ATTEMPTS: usize = 5;

/// Placeholder glyphs meaning "no value"
pub const MISSING_GLYPHS: &[&str] = &["…", "...", "-", "—", "–", "x", "х"];

// =============================================================================
// Row Formats
// =============================================================================

/// Row format tags
pub mod tags {
    /// Year cell
    pub const YEAR: char = 'Y';
    /// Annual value
    pub const ANNUAL: char = 'A';
    /// Quarterly value
    pub const QUARTER: char = 'Q';
    /// Monthly value
    pub const MONTH: char = 'M';
    /// Cell with unknown semantics, passed over
    pub const SKIP: char = 'X';
}

/// Known data row shapes keyed by cell count
pub const ROW_FORMATS: &[(usize, &str)] = &[
    (2, "YA"),
    (5, "YQQQQ"),
    (6, "YAQQQQ"),
    (13, "YMMMMMMMMMMMM"),
    (14, "YAMMMMMMMMMMMM"),
    (17, "YQQQQMMMMMMMMMMMM"),
    (18, "YAQQQQMMMMMMMMMMMM"),
];

/// Data row shapes for accumulated fiscal tables: annual total followed by
/// January..November year-to-date values
pub const FISCAL_ROW_FORMATS: &[(usize, &str)] = &[(13, "YAMMMMMMMMMMM")];

// =============================================================================
// Accumulated Series
// =============================================================================

/// Name prefix of government fiscal series
pub const ACCUMULATED_PREFIX: &str = "GOV_";

/// Name marker of year-to-date accumulated series
pub const ACCUMULATED_MARKER: &str = "_ACCUM";

// =============================================================================
// Validation & Output
// =============================================================================

/// Relative tolerance when comparing a frame cell with a checkpoint value
pub const CHECKPOINT_TOLERANCE: f64 = 1e-9;

/// Index column name of every frame
pub const DATE_COLUMN: &str = "date";

/// Default output directory for processed vintages
pub const DEFAULT_OUTPUT_DIR: &str = "processed";
