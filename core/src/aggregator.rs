//! # Result Aggregator
//!
//! Collects the outcomes of one protocol run into a slot per host, addressed
//! by the host's position in the target set. Workers write disjoint slots, so
//! the only coordination needed is the filled-slot counter; the resulting
//! report order never depends on which probe finished first.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use reachr_common::ReachError;
use reachr_common::network::protocol::Protocol;
use reachr_common::probing::{ProbeOutcome, ProtocolReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    /// No slot filled yet.
    Pending,
    InProgress,
    /// Every slot filled. Terminal.
    Complete,
}

#[derive(Debug)]
pub struct Aggregator {
    protocol: Protocol,
    slots: Vec<OnceLock<ProbeOutcome>>,
    filled: AtomicUsize,
}

impl Aggregator {
    pub fn new(protocol: Protocol, expected: usize) -> Self {
        Self {
            protocol,
            slots: (0..expected).map(|_| OnceLock::new()).collect(),
            filled: AtomicUsize::new(0),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn expected(&self) -> usize {
        self.slots.len()
    }

    pub fn filled(&self) -> usize {
        self.filled.load(Ordering::Acquire)
    }

    /// Stores `outcome` in slot `index` and returns the resulting state.
    ///
    /// A slot can be written once; a second write is rejected and leaves the
    /// first outcome in place.
    pub fn record(&self, index: usize, outcome: ProbeOutcome) -> Result<AggregatorState, ReachError> {
        if outcome.protocol() != self.protocol {
            return Err(ReachError::ProtocolMismatch {
                expected: self.protocol,
                got: outcome.protocol(),
            });
        }

        let slot = self.slots.get(index).ok_or(ReachError::SlotOutOfRange {
            index,
            expected: self.slots.len(),
        })?;
        slot.set(outcome)
            .map_err(|_| ReachError::DuplicateOutcome { index })?;

        let filled = self.filled.fetch_add(1, Ordering::AcqRel) + 1;
        Ok(self.state_for(filled))
    }

    pub fn state(&self) -> AggregatorState {
        self.state_for(self.filled())
    }

    fn state_for(&self, filled: usize) -> AggregatorState {
        if filled == self.slots.len() {
            AggregatorState::Complete
        } else if filled == 0 {
            AggregatorState::Pending
        } else {
            AggregatorState::InProgress
        }
    }

    /// Indices of slots that have not been written yet.
    pub fn missing(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.get().is_none())
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns the report once every slot is filled.
    pub fn snapshot(&self) -> Result<ProtocolReport, ReachError> {
        let incomplete = || ReachError::IncompleteReport {
            protocol: self.protocol,
            filled: self.filled(),
            expected: self.slots.len(),
        };

        if self.state() != AggregatorState::Complete {
            return Err(incomplete());
        }

        let outcomes = self
            .slots
            .iter()
            .map(|slot| slot.get().cloned())
            .collect::<Option<Vec<ProbeOutcome>>>()
            .ok_or_else(incomplete)?;

        Ok(ProtocolReport::new(self.protocol, outcomes))
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
