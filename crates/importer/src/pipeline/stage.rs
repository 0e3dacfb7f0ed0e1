use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::ImporterError;

/// Where a class is in its run. `Persisted` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassStage {
    Discover,
    Fetching,
    Parsing,
    Validating,
    Persisted,
    Failed,
}

impl ClassStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Persisted | Self::Failed)
    }
}

impl fmt::Display for ClassStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discover => "DISCOVER",
            Self::Fetching => "FETCHING",
            Self::Parsing => "PARSING",
            Self::Validating => "VALIDATING",
            Self::Persisted => "PERSISTED",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Outcome of one class (or the calendar) in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassReport {
    pub label: String,
    pub stage: ClassStage,
    /// Stage that was running when the class failed.
    pub failed_at: Option<ClassStage>,
    pub records: usize,
    pub written: u64,
    /// Pages that stayed unavailable after retries. They do not fail the class.
    pub missing_urls: Vec<String>,
    pub error: Option<String>,
}

impl ClassReport {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            stage: ClassStage::Discover,
            failed_at: None,
            records: 0,
            written: 0,
            missing_urls: Vec::new(),
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.stage == ClassStage::Persisted
    }

    pub(crate) fn advance(&mut self, stage: ClassStage) {
        debug!(label = %self.label, from = %self.stage, to = %stage, "stage");
        self.stage = stage;
    }

    pub(crate) fn persisted(&mut self, records: usize, written: u64) {
        self.advance(ClassStage::Persisted);
        self.records = records;
        self.written = written;
        info!(
            label = %self.label,
            records,
            written,
            missing = self.missing_urls.len(),
            "class persisted"
        );
    }

    pub(crate) fn fail(&mut self, err: &ImporterError) {
        error!(label = %self.label, stage = %self.stage, error = %err, "class failed");
        self.failed_at = Some(self.stage);
        self.stage = ClassStage::Failed;
        self.error = Some(err.to_string());
    }

    /// Report for a class that never got past discovery because the shared
    /// listing page could not be loaded.
    pub(crate) fn failed(label: impl Into<String>, err: &ImporterError) -> Self {
        let mut report = Self::new(label);
        report.fail(err);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_remembers_stage() {
        let mut report = ClassReport::new("MOTO3");
        report.advance(ClassStage::Fetching);
        report.advance(ClassStage::Parsing);
        report.fail(&ImporterError::ImportError("layout changed".to_string()));

        assert_eq!(report.stage, ClassStage::Failed);
        assert_eq!(report.failed_at, Some(ClassStage::Parsing));
        assert!(report.stage.is_terminal());
        assert!(!report.succeeded());
        assert_eq!(report.error.as_deref(), Some("Import error: layout changed"));
    }

    #[test]
    fn test_persisted_is_success() {
        let mut report = ClassReport::new("MOTOGP");
        report.persisted(22, 22);
        assert!(report.succeeded());
        assert_eq!(report.records, 22);
        assert_eq!(ClassStage::Validating.to_string(), "VALIDATING");
    }
}
