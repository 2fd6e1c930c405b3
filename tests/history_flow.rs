use std::fs;
use std::path::PathBuf;

use qrtrail::history::{HistoryQuery, SortKey};
use qrtrail::models::IntentType;
use qrtrail::App;
use uuid::Uuid;

fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("qrtrail-it-{}", Uuid::new_v4()))
}

#[tokio::test]
async fn scan_pipeline_feeds_queries_analytics_and_export() {
    let dir = temp_data_dir();
    let app = App::init(&dir).unwrap();

    let url_a = app
        .history
        .record_scan("https://example.com/a".into(), None)
        .await
        .unwrap();
    assert_eq!(url_a.intent, IntentType::Url);
    assert_eq!(url_a.format, "QR_CODE");

    app.history
        .record_scan("https://example.com/b".into(), None)
        .await
        .unwrap();
    app.history
        .record_scan("hello world".into(), Some("AZTEC".into()))
        .await
        .unwrap();

    // Generation never appends, so the history holds exactly the scans.
    let all = app.history.history().await.unwrap();
    assert_eq!(all.len(), 3);

    let urls_only = app
        .history
        .query(&HistoryQuery {
            intent: Some(IntentType::Url),
            sort: SortKey::Oldest,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(urls_only.len(), 2);
    assert_eq!(urls_only[0].data, "https://example.com/a");

    let snapshot = app.history.analytics().await.unwrap().unwrap();
    assert_eq!(snapshot.total_scans, 3);
    assert_eq!(snapshot.last_24h, 3);
    assert_eq!(snapshot.unique_types, 2);
    assert_eq!(snapshot.top_domains.len(), 1);
    assert_eq!(snapshot.top_domains[0].domain, "example.com");
    assert_eq!(snapshot.top_domains[0].count, 2);

    let csv = app
        .history
        .export_csv(&HistoryQuery::default())
        .await
        .unwrap();
    let lines: Vec<&str> = csv.split('\n').collect();
    assert_eq!(lines[0], "Timestamp,Type,Data,Format");
    assert_eq!(lines.len(), 4);
    assert!(csv.contains("\"AZTEC\""));

    drop(app);
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn selective_removal_and_clear() {
    let dir = temp_data_dir();
    let app = App::init(&dir).unwrap();

    let keep = app
        .history
        .record_scan("tel:+15551234567".into(), None)
        .await
        .unwrap();
    let doomed = app
        .history
        .record_scan("geo:40.7,-74.0".into(), None)
        .await
        .unwrap();
    assert_eq!(doomed.intent, IntentType::Location);

    let removed = app.history.remove_by_ids(vec![doomed.id]).await.unwrap();
    assert_eq!(removed, 1);

    let remaining = app.history.history().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);

    assert_eq!(app.history.clear().await.unwrap(), 1);
    assert!(app.history.analytics().await.unwrap().is_none());

    drop(app);
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn history_survives_a_reopen_in_order() {
    let dir = temp_data_dir();

    {
        let app = App::init(&dir).unwrap();
        app.history.record_scan("one".into(), None).await.unwrap();
        app.history.record_scan("two".into(), None).await.unwrap();
    }

    let reopened = App::init(&dir).unwrap();
    let history = reopened.history.history().await.unwrap();
    let data: Vec<&str> = history.iter().map(|e| e.data.as_str()).collect();
    assert_eq!(data, vec!["one", "two"]);

    drop(reopened);
    let _ = fs::remove_dir_all(&dir);
}
