use serde::{Deserialize, Serialize};

/// A single biometric observation as reported by a wearable. Immutable once
/// stored; removed only by cascading user deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartMetricRecord {
    pub id: i64,
    pub user_id: String,
    pub captured_at: String,
    pub heart_rate: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmssd: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartMetricIngest {
    pub user_id: String,
    pub heart_rate: i64,
    /// RMSSD in milliseconds; absent when the sensor did not report HRV.
    #[serde(default)]
    pub rmssd: Option<f64>,
    /// Capture time; defaults to ingestion time when absent.
    #[serde(default)]
    pub captured_at: Option<String>,
}
