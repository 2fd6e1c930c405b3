use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::IntentType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub intent: IntentType,
    pub count: u64,
}

/// Events falling on one local calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub count: u64,
}

/// Events whose local hour-of-day matches, across the entire history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HourBucket {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
    /// Share of all URL-typed events, in percent.
    pub share_pct: f64,
}

/// Derived statistics over the full scan history, recomputed on every query
/// and never persisted. Produced only for a non-empty history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_scans: u64,
    /// Ranked by descending count, ties broken by type name.
    pub type_counts: Vec<TypeCount>,
    pub unique_types: usize,
    /// Seven buckets, oldest first, ending with today.
    pub daily: Vec<DailyBucket>,
    pub peak_day: DailyBucket,
    /// Twenty-four buckets, hour 0 through 23.
    pub hourly: Vec<HourBucket>,
    pub peak_hour: HourBucket,
    /// Top ten domains among URL-typed events.
    pub top_domains: Vec<DomainCount>,
    pub last_24h: u64,
    pub avg_per_day: u64,
    /// Timestamp of the earliest event, milliseconds since the epoch.
    pub first_scan_at: i64,
    /// Whole days elapsed since the first scan, floored at one.
    pub days_since_first: i64,
}
