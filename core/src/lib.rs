//! # Reachr Engine
//!
//! Concurrent reachability checks over a fixed target set.
//!
//! * [`probe`]: the native [`reachr_common::probing::Probe`] implementation.
//! * [`dispatcher`]: bounded worker pool that runs one probe per host.
//! * [`aggregator`]: index-addressed slots that keep reports in target order.
//! * [`cancel`]: run-level cancellation shared by every worker.
//! * [`report`]: writes finished reports to the results directory.

pub mod aggregator;
pub mod cancel;
pub mod dispatcher;
pub mod probe;
pub mod report;
