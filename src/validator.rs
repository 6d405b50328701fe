//! Checkpoint validation of assembled frames.
//!
//! Mandatory checkpoints must each be reproduced exactly; every optional
//! group needs at least one satisfied member. Validation never mutates the
//! frames.

use crate::constants::CHECKPOINT_TOLERANCE;
use crate::error::{KepError, Result};
use crate::frame::Frames;
use crate::models::{Checkpoint, CheckpointSet};
use tracing::debug;

/// Outcome of validating one set of frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub checked: usize,
    pub failures: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn failures into a `Validation` error
    pub fn into_result(self) -> Result<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(KepError::Validation {
                failures: self.failures,
            })
        }
    }
}

/// Why a checkpoint is not satisfied, `None` when it is
pub fn check(frames: &Frames, checkpoint: &Checkpoint) -> Option<String> {
    let frame = frames.get(checkpoint.frequency);

    let Some(date) = checkpoint.date() else {
        return Some(format!("{}: invalid period", checkpoint));
    };
    if !frame.has_label(&checkpoint.label) {
        return Some(format!(
            "{}: label not found in {} frame",
            checkpoint, checkpoint.frequency
        ));
    }

    match frame.get(&checkpoint.label, date) {
        None => Some(format!("{}: no value at {}", checkpoint, date)),
        Some(actual) if !approx_eq(actual, checkpoint.value) => Some(format!(
            "{}: expected {}, found {}",
            checkpoint, checkpoint.value, actual
        )),
        Some(_) => None,
    }
}

fn approx_eq(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= CHECKPOINT_TOLERANCE * expected.abs().max(1.0)
}

/// Check mandatory checkpoints and optional groups against frames
pub fn validate(frames: &Frames, checkpoints: &CheckpointSet) -> ValidationReport {
    let mut report = ValidationReport::default();

    for checkpoint in &checkpoints.mandatory {
        report.checked += 1;
        if let Some(failure) = check(frames, checkpoint) {
            report.failures.push(failure);
        }
    }

    for group in &checkpoints.optional {
        report.checked += 1;
        let satisfied = group
            .iter()
            .any(|checkpoint| check(frames, checkpoint).is_none());
        if !satisfied {
            let members: Vec<String> = group.iter().map(Checkpoint::to_string).collect();
            report
                .failures
                .push(format!("none satisfied in group [{}]", members.join("; ")));
        }
    }

    debug!(
        "Validated {} checkpoints, {} failures",
        report.checked,
        report.failures.len()
    );
    report
}
