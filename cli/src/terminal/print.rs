use colored::*;
use tracing::info;

use reachr_common::probing::{ProbeOutcome, ProbeStatus, ProtocolReport};

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "reachr::print";

/// Raw terminal output, routed through tracing so it never tears a progress bar.
pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }

    let text_content: String = format!("⟦ REACHR v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = console::measure_text_width(&text_content);
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).bright_black();
    print(&format!("{}{}{}", sep, text, sep));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 1 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

pub fn status_colored(status: ProbeStatus) -> ColoredString {
    let color = match status {
        ProbeStatus::Success => colors::SUCCESS,
        ProbeStatus::Unreachable => colors::UNREACHABLE,
        ProbeStatus::Timeout => colors::TIMEOUT,
        ProbeStatus::Error => colors::ERROR,
        ProbeStatus::Cancelled => colors::CANCELLED,
    };
    status.label().color(color).bold()
}

/// `[3] 10.0.0.4 ........ Success  SSH-2.0-OpenSSH_9.6 (14ms)`
pub fn outcome_line(idx: usize, outcome: &ProbeOutcome, host_width: usize) {
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    let host = outcome.host().as_str();
    let dots: String = ".".repeat(host_width.saturating_sub(host.len()) + 2);
    let latency: ColoredString = format!("({}ms)", outcome.latency().as_millis()).color(colors::SEPARATOR);

    print(&format!(
        "{} {} {} {:<11} {} {}",
        idx_str.color(colors::SEPARATOR),
        host.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        status_colored(outcome.status()),
        outcome.detail().color(colors::TEXT_DEFAULT),
        latency
    ));
}

pub fn report(report: &ProtocolReport, q_level: u8) {
    if q_level > 0 {
        return;
    }
    let host_width = report
        .iter()
        .map(|o| o.host().as_str().len())
        .max()
        .unwrap_or(0);
    for (idx, outcome) in report.iter().enumerate() {
        outcome_line(idx, outcome, host_width);
    }
}

pub fn summary(report: &ProtocolReport, q_level: u8) {
    if q_level > 1 {
        return;
    }

    let parts: Vec<String> = report
        .summary()
        .into_iter()
        .map(|(status, count)| format!("{} {}", count.to_string().bold(), status_colored(status)))
        .collect();
    let protocol: ColoredString = report.protocol().name().to_uppercase().color(colors::PRIMARY).bold();
    let output: String = format!("{protocol}: {}", parts.join(", "));

    fat_separator();
    centerln(&output);
}

pub fn end_of_program() {
    print(&format!(
        "{}",
        "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)
    ));
}
