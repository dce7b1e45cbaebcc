use std::path::PathBuf;

use thiserror::Error;

use crate::network::protocol::Protocol;

/// Run-level failures.
///
/// Per-host network conditions are never represented here; they are recorded
/// as [`crate::probing::ProbeStatus`] values inside a report.
#[derive(Debug, Error)]
pub enum ReachError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown protocol '{0}' (supported: snmp, ssh)")]
    UnknownProtocol(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not open input file {path}: {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("column '{0}' not found in CSV file")]
    MissingColumn(String),

    #[error("error reading CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("{protocol} report is incomplete: {filled}/{expected} outcomes recorded")]
    IncompleteReport {
        protocol: Protocol,
        filled: usize,
        expected: usize,
    },

    #[error("slot {index} is out of range for a report of {expected} hosts")]
    SlotOutOfRange { index: usize, expected: usize },

    #[error("slot {index} already holds an outcome")]
    DuplicateOutcome { index: usize },

    #[error("outcome for {got} recorded into the {expected} report")]
    ProtocolMismatch { expected: Protocol, got: Protocol },

    #[error("failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
