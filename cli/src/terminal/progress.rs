use std::sync::Arc;

use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use reachr_common::network::protocol::Protocol;
use reachr_common::probing::ProbeOutcome;
use reachr_core::dispatcher::OutcomeHook;

const TEMPLATE: &str = "{spinner:.blue} {msg} [{bar:32.cyan/blue}] {pos}/{len} ({elapsed})";
const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Span carrying the progress bar for one protocol run.
pub fn protocol_span(protocol: Protocol, total: usize) -> Span {
    let span = info_span!("probing", protocol = protocol.name(), indicatif.pb_show = true);

    let style = ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICKS)
        .progress_chars("#>-");
    span.pb_set_style(&style);
    span.pb_set_length(total as u64);
    span.pb_set_message(&format!("Probing {}", protocol.name().to_uppercase()));
    span
}

/// Advances the span's bar once per recorded outcome.
pub fn hook_for(span: &Span) -> OutcomeHook {
    let span = span.clone();
    Arc::new(move |_outcome: &ProbeOutcome| span.pb_inc(1))
}
