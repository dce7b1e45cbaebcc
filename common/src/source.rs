//! # Host Source
//!
//! Reads the raw host column out of an inventory CSV. The values come back
//! untouched, in file order; trimming and deduplication belong to
//! [`crate::network::target::TargetSet`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::ReachError;

/// Opens `path` and extracts `column` from every record.
pub fn load_hosts(path: &Path, column: &str) -> Result<Vec<String>, ReachError> {
    let file = File::open(path).map_err(|source| ReachError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;
    let hosts = read_hosts(file, column)?;
    info!("Extracted {} entries from column '{column}'", hosts.len());
    Ok(hosts)
}

/// Extracts `column` from CSV data with a header row.
pub fn read_hosts<R: Read>(reader: R, column: &str) -> Result<Vec<String>, ReachError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let index = csv_reader
        .headers()?
        .iter()
        .position(|header| header.trim() == column)
        .ok_or_else(|| ReachError::MissingColumn(column.to_string()))?;

    let mut hosts = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        hosts.push(record.get(index).unwrap_or_default().to_string());
    }
    Ok(hosts)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
