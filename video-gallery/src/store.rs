//! Media record persistence and live gallery snapshots
//!
//! The store is the single writer of the record set. Every acknowledged
//! mutation publishes a full ordered snapshot (newest first) through a
//! watch channel; consumers only ever hold a projection of the last
//! snapshot and never fabricate or reorder entries locally. A record
//! becomes visible in snapshots only after its write is acknowledged —
//! there is no optimistic insertion.

use crate::models::MediaRecord;
use crate::schema::init_gallery_schema;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Errors that can occur in the media store
#[derive(Debug)]
pub enum StoreError {
    DatabaseError(rusqlite::Error),
    IoError(std::io::Error),
    Other(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DatabaseError(e) => write!(f, "Database error: {}", e),
            StoreError::IoError(e) => write!(f, "IO error: {}", e),
            StoreError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::DatabaseError(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

/// Ordered record collection with live snapshot delivery
///
/// `add` assigns the record id and timestamp on write (the caller never
/// picks either). `subscribe` hands out a receiver that always carries the
/// latest full snapshot, ordered by creation time descending.
#[allow(async_fn_in_trait)]
pub trait MediaStore {
    async fn add(&self, uri: &str, file_size: u64) -> Result<MediaRecord, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
    fn subscribe(&self) -> watch::Receiver<Vec<MediaRecord>>;
}

impl<S: MediaStore> MediaStore for Arc<S> {
    async fn add(&self, uri: &str, file_size: u64) -> Result<MediaRecord, StoreError> {
        (**self).add(uri, file_size).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    fn subscribe(&self) -> watch::Receiver<Vec<MediaRecord>> {
        (**self).subscribe()
    }
}

/// SQLite-backed media store
pub struct SqliteMediaStore {
    conn: Mutex<Connection>,
    snapshots: watch::Sender<Vec<MediaRecord>>,
}

impl SqliteMediaStore {
    /// Open (and create if needed) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory store, used in tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        init_gallery_schema(&conn)?;
        let initial = query_snapshot(&conn)?;
        let (snapshots, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            snapshots,
        })
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Re-query and publish the full ordered snapshot
    fn publish(&self, conn: &Connection) -> Result<(), StoreError> {
        let snapshot = query_snapshot(conn)?;
        let _ = self.snapshots.send(snapshot);
        Ok(())
    }
}

fn query_snapshot(conn: &Connection) -> Result<Vec<MediaRecord>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, uri, timestamp, file_size FROM videos ORDER BY timestamp DESC, id",
    )?;
    let records = stmt
        .query_map([], |row| {
            Ok(MediaRecord {
                id: row.get(0)?,
                uri: row.get(1)?,
                timestamp: row.get::<_, DateTime<Utc>>(2)?,
                file_size: row.get::<_, i64>(3)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

impl MediaStore for SqliteMediaStore {
    async fn add(&self, uri: &str, file_size: u64) -> Result<MediaRecord, StoreError> {
        let record = MediaRecord {
            id: Uuid::new_v4().to_string(),
            uri: uri.to_string(),
            timestamp: Utc::now(),
            file_size,
        };

        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO videos (id, uri, timestamp, file_size) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id,
                record.uri,
                record.timestamp,
                record.file_size as i64
            ],
        )?;
        self.publish(&conn)?;

        log::info!("Committed video {} ({} bytes)", record.id, record.file_size);
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.lock_conn();
        let affected = conn.execute("DELETE FROM videos WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::Other(format!("No video with id {}", id)));
        }
        self.publish(&conn)?;

        log::info!("Deleted video {}", id);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Vec<MediaRecord>> {
        self.snapshots.subscribe()
    }
}

/// Consumer-side projection of the live gallery
///
/// Always reflects the last snapshot the store emitted; snapshot arrival
/// is ordered independently of any commit acknowledgement the consumer
/// may have observed.
pub struct GalleryStore {
    rx: watch::Receiver<Vec<MediaRecord>>,
}

impl GalleryStore {
    pub fn new(rx: watch::Receiver<Vec<MediaRecord>>) -> Self {
        Self { rx }
    }

    pub fn from_store<S: MediaStore>(store: &S) -> Self {
        Self::new(store.subscribe())
    }

    /// The most recent snapshot
    pub fn latest(&mut self) -> Vec<MediaRecord> {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next snapshot; false once the store is gone
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Push every snapshot (starting with the current one) to `listener`
    ///
    /// The returned guard unsubscribes exactly once when dropped.
    pub fn watch<F>(&self, mut listener: F) -> Subscription
    where
        F: FnMut(Vec<MediaRecord>) + Send + 'static,
    {
        let mut rx = self.rx.clone();
        let task = tokio::spawn(async move {
            loop {
                let snapshot = rx.borrow_and_update().clone();
                listener(snapshot);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
        Subscription { task }
    }
}

/// Guard for a live gallery subscription
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stop receiving snapshots (same as dropping the guard)
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_assigns_id_and_timestamp() {
        let store = SqliteMediaStore::open_in_memory().unwrap();
        let record = store.add("file:///tmp/a.mp4", 5_242_880).await.unwrap();

        assert!(!record.id.is_empty());
        assert_eq!(record.uri, "file:///tmp/a.mp4");
        assert_eq!(record.file_size, 5_242_880);
    }

    #[tokio::test]
    async fn test_snapshots_are_newest_first() {
        let store = SqliteMediaStore::open_in_memory().unwrap();

        let first = store.add("file:///tmp/a.mp4", 100).await.unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = store.add("file:///tmp/b.mp4", 200).await.unwrap();

        let snapshot = store.subscribe().borrow().clone();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, second.id);
        assert_eq!(snapshot[1].id, first.id);
        assert!(snapshot[0].timestamp >= snapshot[1].timestamp);
    }

    #[tokio::test]
    async fn test_snapshot_only_after_ack() {
        let store = SqliteMediaStore::open_in_memory().unwrap();
        let rx = store.subscribe();
        assert!(rx.borrow().is_empty());

        let record = store.add("file:///tmp/a.mp4", 100).await.unwrap();
        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot, vec![record]);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = SqliteMediaStore::open_in_memory().unwrap();
        let record = store.add("file:///tmp/a.mp4", 100).await.unwrap();

        store.delete(&record.id).await.unwrap();
        assert!(store.subscribe().borrow().is_empty());

        // deleting again fails, the caller decides whether to care
        assert!(store.delete(&record.id).await.is_err());
    }

    #[tokio::test]
    async fn test_gallery_store_projection() {
        let store = SqliteMediaStore::open_in_memory().unwrap();
        let mut gallery = GalleryStore::from_store(&store);
        assert!(gallery.latest().is_empty());

        let record = store.add("file:///tmp/a.mp4", 100).await.unwrap();
        assert!(gallery.changed().await);
        assert_eq!(gallery.latest(), vec![record]);
    }

    #[tokio::test]
    async fn test_watch_delivers_initial_and_updates() {
        let store = Arc::new(SqliteMediaStore::open_in_memory().unwrap());
        let gallery = GalleryStore::from_store(&store);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let subscription = gallery.watch(move |snapshot| {
            let _ = tx.send(snapshot);
        });

        let initial = rx.recv().await.unwrap();
        assert!(initial.is_empty());

        let record = store.add("file:///tmp/a.mp4", 100).await.unwrap();
        let updated = rx.recv().await.unwrap();
        assert_eq!(updated, vec![record]);

        subscription.unsubscribe();
        store.add("file:///tmp/b.mp4", 200).await.unwrap();
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }
}
