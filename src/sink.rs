//! Submission hand-off
//!
//! Once every step and the final phone check pass, the session emits a
//! [`Submission`]. Delivering it is the job of a [`SubmissionSink`]; the form
//! engine itself never performs IO.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FormError, Result};

/// Values collected by a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Title of the form that produced it
    pub form: String,
    /// Seconds since the UNIX epoch
    pub submitted_at: u64,
    /// Values of every field shown at submission time
    pub values: BTreeMap<String, String>,
}

impl Submission {
    pub fn new(form: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        let submitted_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            form: form.into(),
            submitted_at,
            values,
        }
    }
}

/// Receiver of accepted submissions
pub trait SubmissionSink {
    fn deliver(&self, submission: &Submission) -> Result<()>;
}

/// Writes each submission as pretty-printed JSON to a file
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionSink for JsonFileSink {
    fn deliver(&self, submission: &Submission) -> Result<()> {
        let json = serde_json::to_string_pretty(submission)?;
        fs::write(&self.path, json).map_err(|e| {
            FormError::submission(format!("cannot write {}: {}", self.path.display(), e))
        })?;
        info!(
            "Submission of '{}' written to {}",
            submission.form,
            self.path.display()
        );
        Ok(())
    }
}
