//! Input discovery for bulletin releases
//!
//! Expands input files, directories and glob patterns into release files
//! and identifies the vintage (year and month) of each from its file name.

use crate::constants::{MAX_YEAR, MIN_YEAR};
use crate::error::{KepError, Result};
use crate::models::Vintage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `2017_06`, `2017-6`, `tab_2017.06`
static VINTAGE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})[-_.](\d{1,2})(?:\D|$)").unwrap());

/// Extensions of tab-delimited release text
const RELEASE_EXTENSIONS: &[&str] = &["txt", "tsv", "csv"];

/// One release file and its vintage, if the name carries one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VintageFile {
    pub path: PathBuf,
    pub vintage: Option<Vintage>,
}

impl VintageFile {
    pub fn new(path: PathBuf) -> Self {
        let vintage = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(detect_vintage);
        Self { path, vintage }
    }

    /// Output directory name: the vintage, else the file stem
    pub fn output_name(&self) -> String {
        match self.vintage {
            Some(vintage) => vintage.to_string(),
            None => self
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| "release".to_string()),
        }
    }
}

/// Year and month in a release file name
pub fn detect_vintage(name: &str) -> Option<Vintage> {
    VINTAGE_NAME.captures_iter(name).find_map(|caps| {
        let year = caps[1].parse::<i32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        ((MIN_YEAR..=MAX_YEAR).contains(&year) && (1..=12).contains(&month))
            .then_some(Vintage { year, month })
    })
}

/// Input discovery component
#[derive(Debug, Clone)]
pub struct InputDiscovery {
    inputs: Vec<String>,
}

impl InputDiscovery {
    pub fn new(inputs: Vec<String>) -> Self {
        Self { inputs }
    }

    /// Resolve all inputs to release files, sorted and deduplicated
    pub fn discover(&self) -> Result<Vec<VintageFile>> {
        let mut paths = BTreeSet::new();

        for input in &self.inputs {
            let path = Path::new(input);
            if path.is_file() {
                paths.insert(path.to_path_buf());
            } else if path.is_dir() {
                paths.extend(release_files_in(path)?);
            } else {
                let matched = expand_pattern(input)?;
                if matched.is_empty() {
                    warn!("No release files match '{}'", input);
                }
                paths.extend(matched);
            }
        }

        debug!("Discovered {} release files", paths.len());
        Ok(paths.into_iter().map(VintageFile::new).collect())
    }
}

fn release_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_release_file(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| KepError::Configuration {
        message: format!("invalid input pattern '{}': {}", pattern, e),
    })?;
    Ok(entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect())
}

fn is_release_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| RELEASE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_vintage() {
        assert_eq!(
            detect_vintage("tab_2017_06"),
            Some(Vintage {
                year: 2017,
                month: 6
            })
        );
        assert_eq!(
            detect_vintage("2016-12"),
            Some(Vintage {
                year: 2016,
                month: 12
            })
        );
        assert_eq!(detect_vintage("2016-13"), None);
        assert_eq!(detect_vintage("tab"), None);
        assert_eq!(detect_vintage("1850_01"), None);
    }

    #[test]
    fn test_output_name() {
        let file = VintageFile::new(PathBuf::from("/data/tab_2017_06.txt"));
        assert_eq!(file.output_name(), "2017-06");
        let file = VintageFile::new(PathBuf::from("/data/latest.txt"));
        assert_eq!(file.output_name(), "latest");
    }

    #[test]
    fn test_discover_directory_and_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("2017_05.txt"), "x").unwrap();
        fs::write(dir.join("2017_06.txt"), "x").unwrap();
        fs::write(dir.join("notes.md"), "x").unwrap();

        let discovery = InputDiscovery::new(vec![dir.to_string_lossy().to_string()]);
        let files = discovery.discover().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].output_name(), "2017-05");

        let pattern = dir.join("*_06.txt").to_string_lossy().to_string();
        let single = dir.join("2017_05.txt").to_string_lossy().to_string();
        let discovery = InputDiscovery::new(vec![pattern, single.clone(), single]);
        let files = discovery.discover().unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let discovery = InputDiscovery::new(vec!["[".to_string()]);
        assert!(matches!(
            discovery.discover(),
            Err(KepError::Configuration { .. })
        ));
    }

    #[test]
    fn test_is_release_file() {
        assert!(is_release_file(Path::new("tab.txt")));
        assert!(is_release_file(Path::new("/path/to/tab.csv")));
        assert!(!is_release_file(Path::new("tab.xls")));
        assert!(!is_release_file(Path::new("tab")));
    }
}
