use chrono::{DateTime, Local, TimeZone, Utc};

use crate::models::ScanEvent;

const HEADER: &str = "Timestamp,Type,Data,Format";

/// Serialize a history snapshot as CSV for the export collaborator.
///
/// Every field of every row is double-quoted with embedded quotes doubled,
/// timestamps render in local time, and rows keep the caller-supplied order.
/// Lines are joined with `\n` and the result carries no trailing newline.
pub fn to_csv(events: &[ScanEvent]) -> String {
    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(HEADER.to_string());

    for event in events {
        lines.push(format!(
            "{},{},{},{}",
            quote(&format_timestamp(event.timestamp)),
            quote(event.intent.as_str()),
            quote(&event.data),
            quote(&event.format),
        ));
    }

    lines.join("\n")
}

/// Default export file name, e.g. `qr-scan-history-2026-08-06.csv`.
pub fn default_file_name(now: DateTime<Local>) -> String {
    format!("qr-scan-history-{}.csv", now.format("%Y-%m-%d"))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|at| {
            at.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IntentType;

    fn event(data: &str, intent: IntentType, timestamp: i64, format: &str) -> ScanEvent {
        ScanEvent {
            id: "test".to_string(),
            data: data.to_string(),
            timestamp,
            intent,
            format: format.to_string(),
        }
    }

    #[test]
    fn empty_history_exports_just_the_header() {
        assert_eq!(to_csv(&[]), "Timestamp,Type,Data,Format");
    }

    #[test]
    fn rows_are_fully_quoted_and_ordered() {
        let events = vec![
            event("https://example.com", IntentType::Url, 1_700_000_000_000, "QR_CODE"),
            event("hello", IntentType::Text, 1_700_000_100_000, "QR_CODE"),
        ];

        let csv = to_csv(&events);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Timestamp,Type,Data,Format");
        assert!(lines[1].contains("\"URL\",\"https://example.com\",\"QR_CODE\""));
        assert!(lines[2].contains("\"Text\",\"hello\",\"QR_CODE\""));
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let events = vec![event("say \"hi\"", IntentType::Text, 0, "QR_CODE")];
        let csv = to_csv(&events);
        assert!(csv.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn timestamps_use_the_local_wall_clock_format() {
        let events = vec![event("x", IntentType::Text, 1_700_000_000_000, "QR_CODE")];
        let csv = to_csv(&events);
        let row = csv.split('\n').nth(1).unwrap();
        let stamp = row.split("\",\"").next().unwrap().trim_start_matches('"');
        let expected = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .unwrap()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(stamp, expected);
    }

    #[test]
    fn default_file_name_carries_the_date() {
        let now = Local::now();
        assert_eq!(
            default_file_name(now),
            format!("qr-scan-history-{}.csv", now.format("%Y-%m-%d"))
        );
    }
}
