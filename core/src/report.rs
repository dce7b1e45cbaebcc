//! # File Reporter
//!
//! Writes one artifact per protocol into the results directory, named after
//! the protocol (`ssh.txt`, `snmp.csv`). Rows follow the report, which is
//! already in target set order. Each artifact is written to a temporary
//! sibling first and renamed into place.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use reachr_common::ReachError;
use reachr_common::network::protocol::Protocol;
use reachr_common::probing::{ProbeOutcome, ProtocolReport, single_line};
use reachr_common::reporting::{ReportFormat, Reporter};

const CSV_HEADER: [&str; 5] = ["host", "protocol", "status", "detail", "latency_ms"];

pub struct FileReporter {
    results_dir: PathBuf,
    format: ReportFormat,
}

impl FileReporter {
    pub fn new(results_dir: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            results_dir: results_dir.into(),
            format,
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn path_for(&self, protocol: Protocol) -> PathBuf {
        self.results_dir
            .join(format!("{}.{}", protocol.name(), self.format.extension()))
    }

    /// Creates the results directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), ReachError> {
        if self.results_dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.results_dir).map_err(|source| ReachError::ReportWrite {
            path: self.results_dir.clone(),
            source,
        })?;
        info!("Created directory: {}", self.results_dir.display());
        Ok(())
    }
}

impl Reporter for FileReporter {
    fn write(&self, report: &ProtocolReport) -> Result<PathBuf, ReachError> {
        self.ensure_dir()?;

        let path = self.path_for(report.protocol());
        let tmp = path.with_extension(format!("{}.tmp", self.format.extension()));

        match self.format {
            ReportFormat::Text => write_text(&tmp, report),
            ReportFormat::Csv => write_csv(&tmp, report),
        }?;

        fs::rename(&tmp, &path).map_err(|source| ReachError::ReportWrite {
            path: path.clone(),
            source,
        })?;

        info!("Results written to {}", path.display());
        Ok(path)
    }
}

/// `IP: 10.0.0.1, SSH Success: SSH-2.0-OpenSSH_9.6 (12ms)`
pub fn render_line(outcome: &ProbeOutcome) -> String {
    format!(
        "IP: {}, {} {}: {} ({}ms)",
        single_line(outcome.host().as_str()),
        outcome.protocol().name().to_uppercase(),
        outcome.status(),
        outcome.detail(),
        outcome.latency().as_millis()
    )
}

fn write_text(path: &Path, report: &ProtocolReport) -> Result<(), ReachError> {
    let io_err = |source: std::io::Error| ReachError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    for outcome in report.iter() {
        writeln!(writer, "{}", render_line(outcome)).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}

fn write_csv(path: &Path, report: &ProtocolReport) -> Result<(), ReachError> {
    let csv_err = |e: csv::Error| ReachError::ReportWrite {
        path: path.to_path_buf(),
        source: std::io::Error::from(e),
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(CSV_HEADER).map_err(csv_err)?;
    for outcome in report.iter() {
        writer.write_record([
            outcome.host().as_str(),
            outcome.protocol().name(),
            outcome.status().label(),
            outcome.detail(),
            outcome.latency().as_millis().to_string().as_str(),
        ])
        .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ReachError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
