use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::{params, Connection};
use tokio::sync::oneshot;

mod migrations;

use migrations::run_migrations;

use crate::models::{IntentType, ScanEvent};

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

fn intent_from_str(value: &str) -> Result<IntentType> {
    match value {
        "Text" => Ok(IntentType::Text),
        "URL" => Ok(IntentType::Url),
        "Email" => Ok(IntentType::Email),
        "Phone" => Ok(IntentType::Phone),
        "SMS" => Ok(IntentType::Sms),
        "WiFi" => Ok(IntentType::Wifi),
        "Contact" => Ok(IntentType::Contact),
        "Location" => Ok(IntentType::Location),
        _ => Err(anyhow!("unknown intent type '{value}'")),
    }
}

fn row_to_scan(row: &rusqlite::Row<'_>) -> Result<ScanEvent> {
    let intent: String = row.get("type")?;
    Ok(ScanEvent {
        id: row.get("id")?,
        data: row.get("data")?,
        timestamp: row.get("timestamp")?,
        intent: intent_from_str(&intent)?,
        format: row.get("format")?,
    })
}

/// Handle to the scan history store.
///
/// All access goes through one dedicated worker thread owning the SQLite
/// connection, so appends are serialized and every read observes a full
/// snapshot, which is what the analytics engine relies on.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("qrtrail-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    pub async fn append_scan(&self, event: &ScanEvent) -> Result<()> {
        let record = event.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO scans (id, data, timestamp, type, format)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.data,
                    record.timestamp,
                    record.intent.as_str(),
                    record.format,
                ],
            )
            .with_context(|| "failed to insert scan event")?;
            Ok(())
        })
        .await
    }

    /// The full history in insertion order. Ordering by rowid keeps the
    /// sequence stable even when two events share a timestamp.
    pub async fn load_history(&self) -> Result<Vec<ScanEvent>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, data, timestamp, type, format
                 FROM scans
                 ORDER BY rowid ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(row_to_scan(row)?);
            }

            Ok(events)
        })
        .await
    }

    pub async fn clear_history(&self) -> Result<usize> {
        self.execute(|conn| {
            let removed = conn
                .execute("DELETE FROM scans", [])
                .with_context(|| "failed to clear scan history")?;
            Ok(removed)
        })
        .await
    }

    /// Remove every event the predicate selects, returning how many were
    /// deleted. Selection and deletion run inside one transaction so a
    /// concurrent read never observes a partial removal.
    pub async fn remove_scans_where<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&ScanEvent) -> bool + Send + 'static,
    {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let removed = {
                let mut stmt = tx.prepare(
                    "SELECT id, data, timestamp, type, format
                     FROM scans
                     ORDER BY rowid ASC",
                )?;

                let mut rows = stmt.query([])?;
                let mut doomed = Vec::new();
                while let Some(row) = rows.next()? {
                    let event = row_to_scan(row)?;
                    if predicate(&event) {
                        doomed.push(event.id);
                    }
                }
                drop(rows);
                drop(stmt);

                let mut removed = 0;
                for id in doomed {
                    removed += tx.execute("DELETE FROM scans WHERE id = ?1", params![id])?;
                }
                removed
            };
            tx.commit()?;
            Ok(removed)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_db_path() -> PathBuf {
        std::env::temp_dir().join(format!("qrtrail-db-test-{}.sqlite3", Uuid::new_v4()))
    }

    fn event(data: &str, intent: IntentType, timestamp: i64) -> ScanEvent {
        ScanEvent {
            id: Uuid::new_v4().to_string(),
            data: data.to_string(),
            timestamp,
            intent,
            format: "QR_CODE".to_string(),
        }
    }

    #[tokio::test]
    async fn load_preserves_insertion_order_under_equal_timestamps() {
        let path = temp_db_path();
        let db = Database::new(path.clone()).unwrap();

        let first = event("first", IntentType::Text, 1_000);
        let second = event("second", IntentType::Text, 1_000);
        let third = event("tel:3", IntentType::Phone, 500);
        db.append_scan(&first).await.unwrap();
        db.append_scan(&second).await.unwrap();
        db.append_scan(&third).await.unwrap();

        let history = db.load_history().await.unwrap();
        let data: Vec<&str> = history.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["first", "second", "tel:3"]);
        assert_eq!(history[2].intent, IntentType::Phone);

        drop(db);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let path = temp_db_path();
        let db = Database::new(path.clone()).unwrap();

        db.append_scan(&event("a", IntentType::Text, 1)).await.unwrap();
        db.append_scan(&event("b", IntentType::Text, 2)).await.unwrap();

        assert_eq!(db.clear_history().await.unwrap(), 2);
        assert!(db.load_history().await.unwrap().is_empty());

        drop(db);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn remove_where_deletes_only_matching_events() {
        let path = temp_db_path();
        let db = Database::new(path.clone()).unwrap();

        db.append_scan(&event("https://a.example", IntentType::Url, 1))
            .await
            .unwrap();
        db.append_scan(&event("keep me", IntentType::Text, 2))
            .await
            .unwrap();
        db.append_scan(&event("https://b.example", IntentType::Url, 3))
            .await
            .unwrap();

        let removed = db
            .remove_scans_where(|e| e.intent == IntentType::Url)
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let history = db.load_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].data, "keep me");

        drop(db);
        let _ = std::fs::remove_file(&path);
    }
}
