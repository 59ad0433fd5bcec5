//! Error Types for Sales Analytics

use std::path::PathBuf;

use agent_core::ToolError;
use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Line {line}: invalid {field} '{value}'")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Invalid period: {start} is after {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),

    #[error("Failed to write report {}: {reason}", path.display())]
    Report { path: PathBuf, reason: String },
}

impl From<AnalyticsError> for ToolError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::UnknownColumn(_) | AnalyticsError::InvalidPeriod { .. } => {
                Self::InvalidInput(err.to_string())
            }
            other => Self::Execution(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_invalid_input() {
        let err: ToolError = AnalyticsError::UnknownColumn("cor".into()).into();
        assert!(matches!(err, ToolError::InvalidInput(msg) if msg.contains("cor")));

        let err: ToolError = AnalyticsError::MissingColumn("date").into();
        assert!(matches!(err, ToolError::Execution(_)));

        let err: ToolError = AnalyticsError::Overflow("revenue").into();
        assert!(matches!(err, ToolError::Execution(msg) if msg.contains("revenue")));
    }
}
