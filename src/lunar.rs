//! Moon phase from a calendar date
//!
//! A deliberately coarse four-bucket phase: elapsed days since 2001-01-01,
//! folded into one synodic month and split into quartiles. Good enough for a
//! fishing heuristic, not an ephemeris.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mean synodic month length in days
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_67;

/// Reference date the elapsed-day count starts from
fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 1, 1).unwrap_or_default()
}

/// The four phase buckets, in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoonPhase {
    /// First quarter of the cycle (index in [0, 0.25))
    NewCrescent,
    /// [0.25, 0.5)
    FirstQuarter,
    /// [0.5, 0.75)
    WaxingGibbous,
    /// [0.75, 1.0)
    FullMoon,
}

impl MoonPhase {
    /// Returns all phases in cycle order.
    pub fn all() -> &'static [MoonPhase] {
        &[
            MoonPhase::NewCrescent,
            MoonPhase::FirstQuarter,
            MoonPhase::WaxingGibbous,
            MoonPhase::FullMoon,
        ]
    }

    /// Display label shown to anglers
    pub fn label(&self) -> &'static str {
        match self {
            MoonPhase::NewCrescent => "🌒 初月",
            MoonPhase::FirstQuarter => "🌓 上弦",
            MoonPhase::WaxingGibbous => "🌔 盈凸月",
            MoonPhase::FullMoon => "🌕 滿月",
        }
    }

    /// Parses a display label back into a phase.
    ///
    /// Matching looks for the phase name inside the label, so both
    /// `"🌕 滿月"` and a bare `"滿月"` are accepted. The English kebab-case
    /// names (`full-moon`, ...) are accepted too.
    pub fn from_label(label: &str) -> Option<MoonPhase> {
        let trimmed = label.trim();
        if trimmed.contains("滿月") || trimmed.eq_ignore_ascii_case("full-moon") {
            Some(MoonPhase::FullMoon)
        } else if trimmed.contains("上弦") || trimmed.eq_ignore_ascii_case("first-quarter") {
            Some(MoonPhase::FirstQuarter)
        } else if trimmed.contains("盈凸月") || trimmed.eq_ignore_ascii_case("waxing-gibbous") {
            Some(MoonPhase::WaxingGibbous)
        } else if trimmed.contains("初月") || trimmed.eq_ignore_ascii_case("new-crescent") {
            Some(MoonPhase::NewCrescent)
        } else {
            None
        }
    }

    /// Whether this phase earns the moon bonus when scoring
    pub fn is_favourable(&self) -> bool {
        matches!(self, MoonPhase::FullMoon | MoonPhase::FirstQuarter)
    }
}

impl std::fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fraction of the synodic cycle in [0, 1) for a (possibly fractional,
/// possibly negative) count of days since the reference date.
pub fn cycle_index(days_since_reference: f64) -> f64 {
    let index = (days_since_reference + 1.0).rem_euclid(SYNODIC_MONTH_DAYS) / SYNODIC_MONTH_DAYS;
    // rem_euclid can round up to exactly L for tiny negative inputs
    if index >= 1.0 {
        0.0
    } else {
        index
    }
}

/// Phase for an elapsed-day count relative to 2001-01-01
pub fn phase_for_days(days_since_reference: f64) -> MoonPhase {
    let index = cycle_index(days_since_reference);
    if index < 0.25 {
        MoonPhase::NewCrescent
    } else if index < 0.5 {
        MoonPhase::FirstQuarter
    } else if index < 0.75 {
        MoonPhase::WaxingGibbous
    } else {
        MoonPhase::FullMoon
    }
}

/// Phase for a calendar date. Dates before 2001-01-01 are valid.
pub fn phase_for(date: NaiveDate) -> MoonPhase {
    let days = (date - reference_date()).num_days();
    phase_for_days(days as f64)
}
