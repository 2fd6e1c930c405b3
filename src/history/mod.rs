use std::collections::HashSet;

use anyhow::Result;
use chrono::{Local, Utc};
use uuid::Uuid;

use crate::analytics::{self, AnalyticsSnapshot};
use crate::db::Database;
use crate::export;
use crate::models::{IntentType, ScanEvent};
use crate::payload::classify;
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

const DEFAULT_FORMAT: &str = "QR_CODE";

/// View over a loaded history snapshot: free-text search, type filter, and
/// presentation order.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub search: Option<String>,
    pub intent: Option<IntentType>,
    pub sort: SortKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Type,
    Data,
}

/// Owns the scan pipeline and every operation over the accumulated history.
/// Holds a cloned [`Database`] handle; the codec and analytics layers stay
/// pure and never touch the store themselves.
#[derive(Clone)]
pub struct HistoryController {
    db: Database,
}

impl HistoryController {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Classify a decoded payload, stamp it with an id and timestamp, and
    /// append it to the store. This is the only place scan events are
    /// created; the generation path never records anything.
    pub async fn record_scan(&self, data: String, format: Option<String>) -> Result<ScanEvent> {
        let event = ScanEvent {
            id: Uuid::new_v4().to_string(),
            intent: classify(&data),
            data,
            timestamp: Utc::now().timestamp_millis(),
            format: format.unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
        };

        self.db.append_scan(&event).await?;
        log_info!("Recorded {} scan {}", event.intent.as_str(), event.id);
        Ok(event)
    }

    pub async fn history(&self) -> Result<Vec<ScanEvent>> {
        self.db.load_history().await
    }

    pub async fn query(&self, query: &HistoryQuery) -> Result<Vec<ScanEvent>> {
        let events = self.db.load_history().await?;
        Ok(apply_query(events, query))
    }

    /// Recompute analytics from the full history. `None` when the store is
    /// empty; callers branch on that rather than reading zeroed fields.
    pub async fn analytics(&self) -> Result<Option<AnalyticsSnapshot>> {
        let events = self.db.load_history().await?;
        Ok(analytics::analyze(&events, Local::now()))
    }

    pub async fn export_csv(&self, query: &HistoryQuery) -> Result<String> {
        let events = self.query(query).await?;
        Ok(export::to_csv(&events))
    }

    pub async fn clear(&self) -> Result<usize> {
        let removed = self.db.clear_history().await?;
        log_warn!("Cleared scan history ({removed} events)");
        Ok(removed)
    }

    pub async fn remove_by_ids(&self, ids: Vec<String>) -> Result<usize> {
        let ids: HashSet<String> = ids.into_iter().collect();
        let removed = self
            .db
            .remove_scans_where(move |event| ids.contains(&event.id))
            .await?;
        log_info!("Removed {removed} selected events");
        Ok(removed)
    }
}

/// Apply search, filter and sort to a loaded snapshot. Pure; the sorts are
/// stable, so equal keys keep their insertion order.
pub fn apply_query(mut events: Vec<ScanEvent>, query: &HistoryQuery) -> Vec<ScanEvent> {
    if let Some(term) = query.search.as_deref() {
        let needle = term.to_lowercase();
        events.retain(|event| {
            event.data.to_lowercase().contains(&needle)
                || event.intent.as_str().to_lowercase().contains(&needle)
        });
    }

    if let Some(intent) = query.intent {
        events.retain(|event| event.intent == intent);
    }

    match query.sort {
        SortKey::Newest => events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortKey::Oldest => events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        SortKey::Type => events.sort_by(|a, b| a.intent.as_str().cmp(b.intent.as_str())),
        SortKey::Data => events.sort_by(|a, b| a.data.cmp(&b.data)),
    }

    events
}
