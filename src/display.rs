//! Plain-text rendering of advisor output
//!
//! Turns a [`Recommendation`] and catch history into the lines the CLI prints.
//! Kept separate from the CLI so the wording can be tested without a terminal.

use std::fmt::Write;

use crate::advisor::Recommendation;
use crate::location::ResolutionPath;
use crate::store::CatchLogRecord;

/// Temperature line, e.g. `🌡️ Temp in 西貢: 19°C`
pub fn temperature_line(rec: &Recommendation) -> String {
    match (&rec.temperature.place, rec.temperature.value) {
        (Some(place), Some(value)) => format!("🌡️ Temp in {place}: {value}°C"),
        _ => "🌡️ Temperature data not found".to_string(),
    }
}

/// Rainfall line, noting when the figure is a default
pub fn rainfall_line(rec: &Recommendation) -> String {
    let mut line = format!("🌧️ Rainfall: {} mm", rec.rainfall.amount);
    if !rec.rainfall.reported {
        line.push_str(" (not reported)");
    }
    match rec.rainfall.place.path {
        ResolutionPath::Exact | ResolutionPath::NotAttempted => {}
        ResolutionPath::Fuzzy { similarity } => {
            let _ = write!(
                line,
                " [matched {} at {:.0}%]",
                rec.rainfall.place.name,
                similarity * 100.0
            );
        }
        ResolutionPath::Fallback => {
            let _ = write!(line, " [no station match for {}]", rec.rainfall.place.name);
        }
    }
    line
}

/// One line per selected tide event, e.g. `High Tide at 06:12`
pub fn tide_lines(rec: &Recommendation) -> Vec<String> {
    rec.tide
        .events
        .iter()
        .map(|event| format!("{} Tide at {}", event.event_type.label(), event.time))
        .collect()
}

/// Full report, section by section
pub fn render_recommendation(rec: &Recommendation) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "### 🌤️ Weather Info ({})", rec.spot);
    let _ = writeln!(out, "{}", temperature_line(rec));
    let _ = writeln!(out, "{}", rainfall_line(rec));
    out.push('\n');

    let _ = writeln!(out, "### 🌕 Moon Phase");
    let _ = writeln!(out, "{}", rec.moon_phase);
    out.push('\n');

    let _ = writeln!(out, "### 🌊 Tide Info ({})", rec.tide.station);
    for line in tide_lines(rec) {
        let _ = writeln!(out, "{line}");
    }
    out.push('\n');

    let _ = writeln!(out, "### 🎣 Recommendation");
    let _ = writeln!(out, "Score: {}", rec.score);
    let _ = writeln!(out, "{}", rec.advisory.message());

    if !rec.warnings.is_empty() {
        out.push('\n');
        for warning in &rec.warnings {
            let _ = writeln!(out, "⚠️ {warning}");
        }
    }

    out
}

/// Catch history as one line per day
pub fn render_history(username: &str, records: &[CatchLogRecord]) -> String {
    if records.is_empty() {
        return format!("No catches logged for {username}\n");
    }

    let mut out = String::new();
    for record in records {
        let species = if record.entry.species.is_empty() {
            "-".to_string()
        } else {
            record.entry.species.join(", ")
        };
        let _ = write!(
            out,
            "{}  {}  {} x {}",
            record.date, record.entry.spot, record.entry.quantity, species
        );
        if !record.entry.notes.is_empty() {
            let _ = write!(out, "  ({})", record.entry.notes);
        }
        out.push('\n');
    }
    out
}
