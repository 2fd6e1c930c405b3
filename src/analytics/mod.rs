mod types;

pub use types::{AnalyticsSnapshot, DailyBucket, DomainCount, HourBucket, TypeCount};

use std::collections::HashMap;

use chrono::{DateTime, Duration, Local, TimeZone, Timelike, Utc};
use url::Url;

use crate::models::{IntentType, ScanEvent};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const DAILY_WINDOW_DAYS: i64 = 7;
const TOP_DOMAIN_LIMIT: usize = 10;
const INVALID_URL_BUCKET: &str = "Invalid URL";

/// Aggregate the full event history into an [`AnalyticsSnapshot`].
///
/// Pure and total: recomputes everything from the input on every call and
/// never fails. An empty history yields `None`; callers branch on that
/// instead of receiving a snapshot full of zeroes. Day and hour boundaries
/// are taken in the timezone of `now`.
pub fn analyze(events: &[ScanEvent], now: DateTime<Local>) -> Option<AnalyticsSnapshot> {
    if events.is_empty() {
        return None;
    }

    let now_ms = now.timestamp_millis();

    let type_counts = count_by_type(events);
    let unique_types = type_counts.len();

    let daily = daily_buckets(events, now);
    // First maximum wins, and the buckets run oldest to newest.
    let peak_day = daily
        .iter()
        .fold(daily[0].clone(), |max, bucket| {
            if bucket.count > max.count {
                bucket.clone()
            } else {
                max
            }
        });

    let hourly = hourly_buckets(events);
    let peak_hour = hourly
        .iter()
        .fold(hourly[0].clone(), |max, bucket| {
            if bucket.count > max.count {
                bucket.clone()
            } else {
                max
            }
        });

    let top_domains = domain_stats(events);

    let last_24h = events
        .iter()
        .filter(|event| event.timestamp > now_ms - DAY_MS)
        .count() as u64;

    let first_scan_at = events.iter().map(|event| event.timestamp).min()?;
    let days_since_first = elapsed_days(first_scan_at, now_ms);
    let avg_per_day = (events.len() as f64 / days_since_first as f64).round() as u64;

    Some(AnalyticsSnapshot {
        total_scans: events.len() as u64,
        type_counts,
        unique_types,
        daily,
        peak_day,
        hourly,
        peak_hour,
        top_domains,
        last_24h,
        avg_per_day,
        first_scan_at,
        days_since_first,
    })
}

/// Count events per stored intent, ranked by descending count with ties
/// broken by type name. Iterating `IntentType::ALL` keeps the grouping
/// exhaustive over the closed set.
fn count_by_type(events: &[ScanEvent]) -> Vec<TypeCount> {
    let mut counts: Vec<TypeCount> = IntentType::ALL
        .iter()
        .map(|intent| TypeCount {
            intent: *intent,
            count: events.iter().filter(|event| event.intent == *intent).count() as u64,
        })
        .filter(|entry| entry.count > 0)
        .collect();

    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.intent.as_str().cmp(b.intent.as_str()))
    });
    counts
}

fn daily_buckets(events: &[ScanEvent], now: DateTime<Local>) -> Vec<DailyBucket> {
    (0..DAILY_WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let date = now.date_naive() - Duration::days(offset);
            let count = events
                .iter()
                .filter(|event| {
                    local_time(event.timestamp)
                        .map(|at| at.date_naive() == date)
                        .unwrap_or(false)
                })
                .count() as u64;
            DailyBucket { date, count }
        })
        .collect()
}

fn hourly_buckets(events: &[ScanEvent]) -> Vec<HourBucket> {
    (0..24)
        .map(|hour| HourBucket {
            hour,
            count: events
                .iter()
                .filter(|event| {
                    local_time(event.timestamp)
                        .map(|at| at.hour() == hour)
                        .unwrap_or(false)
                })
                .count() as u64,
        })
        .collect()
}

/// Domain frequency over URL-typed events. A payload that fails to parse is
/// bucketed under `"Invalid URL"` so partial data never drops events from
/// the aggregate. Shares are over all URL-typed events, so the top-ten
/// truncation can only ever lose percentage mass, never invent it.
fn domain_stats(events: &[ScanEvent]) -> Vec<DomainCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut url_total = 0u64;

    for event in events.iter().filter(|event| event.intent == IntentType::Url) {
        url_total += 1;
        *counts.entry(host_of(&event.data)).or_insert(0) += 1;
    }

    let mut ranked: Vec<DomainCount> = counts
        .into_iter()
        .map(|(domain, count)| DomainCount {
            domain,
            count,
            share_pct: count as f64 * 100.0 / url_total as f64,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.domain.cmp(&b.domain))
    });
    ranked.truncate(TOP_DOMAIN_LIMIT);
    ranked
}

fn host_of(data: &str) -> String {
    let candidate = if data.starts_with("http") {
        data.to_string()
    } else {
        format!("https://{data}")
    };

    Url::parse(&candidate)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| INVALID_URL_BUCKET.to_string())
}

/// Whole days between the first scan and now, rounded up and floored at one
/// so a single-instant history still counts as one active day.
fn elapsed_days(first_ms: i64, now_ms: i64) -> i64 {
    let days = ((now_ms - first_ms) as f64 / DAY_MS as f64).ceil() as i64;
    days.max(1)
}

fn local_time(timestamp_ms: i64) -> Option<DateTime<Local>> {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|at| at.with_timezone(&Local))
}
