use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ReachError;
use crate::probing::ProtocolReport;

/// Persists a completed protocol report and returns where it went.
pub trait Reporter: Send + Sync {
    fn write(&self, report: &ProtocolReport) -> Result<PathBuf, ReachError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One human-readable line per host, `<protocol>.txt`.
    #[default]
    Text,
    /// `<protocol>.csv` with a header row.
    Csv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => f.write_str("text"),
            ReportFormat::Csv => f.write_str("csv"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(ReachError::InvalidConfig(format!(
                "unknown report format '{other}' (expected text or csv)"
            ))),
        }
    }
}
