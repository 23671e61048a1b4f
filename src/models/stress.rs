use serde::{Deserialize, Serialize};
use std::fmt;

/// Stress band derived from the numeric score: low (<40), moderate (40-69),
/// high (>=70). Never stored independently of the score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    Moderate,
    High,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Low => "low",
            StressLevel::Moderate => "moderate",
            StressLevel::High => "high",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for StressLevel {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(StressLevel::Low),
            "moderate" => Ok(StressLevel::Moderate),
            "high" => Ok(StressLevel::High),
            other => Err(format!("unsupported stress level: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressScoreRecord {
    pub id: i64,
    pub user_id: String,
    pub computed_at: String,
    pub score: i64,
    pub level: StressLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_metric_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressScoreInsert {
    pub user_id: String,
    pub computed_at: String,
    pub score: i64,
    pub level: StressLevel,
    #[serde(default)]
    pub source_metric_id: Option<i64>,
}
