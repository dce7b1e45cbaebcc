//! # Target Set
//!
//! The ordered, deduplicated list of hosts a run probes. Built once from the
//! raw column values and read-only afterwards; a host's position in the set is
//! the slot its outcome occupies in every protocol report.

use std::collections::HashSet;

use tracing::debug;

use crate::error::ReachError;
use crate::network::host::Host;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    hosts: Vec<Host>,
}

impl TargetSet {
    /// Normalises `raw` (trim, drop blanks) and collapses duplicates, keeping
    /// the first occurrence.
    ///
    /// Fails with [`ReachError::InvalidInput`] if nothing survives.
    pub fn new<I, S>(raw: I) -> Result<Self, ReachError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<Host> = HashSet::new();
        let mut hosts: Vec<Host> = Vec::new();
        let mut dropped: usize = 0;

        for entry in raw {
            let Some(host) = Host::parse(entry.as_ref()) else {
                dropped += 1;
                continue;
            };
            if seen.insert(host.clone()) {
                hosts.push(host);
            } else {
                dropped += 1;
            }
        }

        if hosts.is_empty() {
            return Err(ReachError::InvalidInput(
                "target list contains no usable hosts".to_string(),
            ));
        }

        debug!("{} hosts kept, {dropped} blank or duplicate entries dropped", hosts.len());
        Ok(Self { hosts })
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Always false for a constructed set; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Host> {
        self.hosts.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Host> {
        self.hosts.iter()
    }

    pub fn as_slice(&self) -> &[Host] {
        &self.hosts
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a Host;
    type IntoIter = std::slice::Iter<'a, Host>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.iter()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
