use serde::{Deserialize, Serialize};

use crate::models::stress::StressLevel;

// 40 and 140 bpm bound the expected resting-to-elevated range; readings
// outside are clamped, never rejected, so ingestion survives sensor noise.
const HR_FLOOR: f64 = 40.0;
const HR_CEILING: f64 = 140.0;

// RMSSD at or above this reads as fully relaxed; 0 as fully stressed.
const RMSSD_CEILING: f64 = 50.0;

// Heart rate carries more weight than HRV: it is always present, HRV is a
// secondary corroborating signal.
const HR_WEIGHT: f64 = 0.6;
const HRV_WEIGHT: f64 = 0.4;

const HIGH_THRESHOLD: i64 = 70;
const MODERATE_THRESHOLD: i64 = 40;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StressAssessment {
    pub score: i64,
    pub level: StressLevel,
}

/// Maps one physiological observation to a bounded, categorized stress
/// indicator. Pure and infallible: out-of-range inputs are clamped inside
/// normalization. A missing RMSSD reading must be passed as `0.0`.
pub fn assess(heart_rate: i64, rmssd: f64) -> StressAssessment {
    let hr_norm = ((heart_rate as f64 - HR_FLOOR) / (HR_CEILING - HR_FLOOR)).clamp(0.0, 1.0);
    let hrv_norm = ((RMSSD_CEILING - rmssd) / RMSSD_CEILING).clamp(0.0, 1.0);

    let blended = HR_WEIGHT * hr_norm + HRV_WEIGHT * hrv_norm;
    let score = (blended * 100.0).round() as i64;

    StressAssessment {
        score,
        level: level_for(score),
    }
}

/// Band thresholds are inclusive at the lower bound.
pub fn level_for(score: i64) -> StressLevel {
    if score >= HIGH_THRESHOLD {
        StressLevel::High
    } else if score >= MODERATE_THRESHOLD {
        StressLevel::Moderate
    } else {
        StressLevel::Low
    }
}
