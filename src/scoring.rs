//! Fishing score engine
//!
//! An additive heuristic on a base of 50: dry weather, a high tide and a full
//! or first-quarter moon each push the score up, heavy rain pulls it down.
//! The result is clamped to 0-100 and bucketed into an advisory.

use serde::{Deserialize, Serialize};

use crate::data::TideType;
use crate::lunar::MoonPhase;

/// Starting score before adjustments
const BASE_SCORE: i32 = 50;

/// Rainfall (mm) below which conditions count as dry
const DRY_RAINFALL_MM: f64 = 20.0;

/// Rainfall (mm) above which conditions count as wet
const WET_RAINFALL_MM: f64 = 50.0;

const DRY_BONUS: i32 = 20;
const WET_PENALTY: i32 = -30;
const HIGH_TIDE_BONUS: i32 = 15;
const MOON_BONUS: i32 = 10;

/// Qualitative reading of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Score above 75
    Favorable,
    /// Score in (50, 75]
    Mixed,
    /// Score 50 or below
    Unfavorable,
}

impl Advisory {
    /// Buckets a score.
    pub fn from_score(score: u8) -> Advisory {
        if score > 75 {
            Advisory::Favorable
        } else if score > 50 {
            Advisory::Mixed
        } else {
            Advisory::Unfavorable
        }
    }

    /// Message shown to the angler
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::Favorable => "🟢 Great time to fish!",
            Advisory::Mixed => "🟡 Okay but watch conditions.",
            Advisory::Unfavorable => "🔴 Not recommended.",
        }
    }
}

/// Score plus its advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecommendationResult {
    /// 0-100
    pub score: u8,
    pub advisory: Advisory,
}

/// Rainfall contribution. Non-finite amounts contribute nothing.
fn rainfall_adjustment(rainfall_mm: f64) -> i32 {
    if rainfall_mm < DRY_RAINFALL_MM {
        DRY_BONUS
    } else if rainfall_mm > WET_RAINFALL_MM {
        WET_PENALTY
    } else {
        0
    }
}

/// Scores conditions on a 0-100 scale.
pub fn score(rainfall_mm: f64, tide: TideType, moon: MoonPhase) -> u8 {
    let mut total = BASE_SCORE + rainfall_adjustment(rainfall_mm);
    if tide == TideType::High {
        total += HIGH_TIDE_BONUS;
    }
    if moon.is_favourable() {
        total += MOON_BONUS;
    }
    total.clamp(0, 100) as u8
}

/// Scores conditions and attaches the advisory.
pub fn recommend(rainfall_mm: f64, tide: TideType, moon: MoonPhase) -> RecommendationResult {
    let score = score(rainfall_mm, tide, moon);
    RecommendationResult {
        score,
        advisory: Advisory::from_score(score),
    }
}
