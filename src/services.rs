use crate::database;
use crate::error::AppError;
use std::sync::{Arc, OnceLock};
use video_gallery::{
    MediaSizeProbe, MediaStore, SqliteMediaStore, SystemMediaPicker, UploadCoordinator,
};

/// Concrete coordinator wiring for the app
pub type AppCoordinator =
    UploadCoordinator<SystemMediaPicker, MediaSizeProbe, Arc<SqliteMediaStore>>;

static STORE: OnceLock<Arc<SqliteMediaStore>> = OnceLock::new();
static COORDINATOR: OnceLock<Arc<AppCoordinator>> = OnceLock::new();

/// Process-wide media store (opened lazily on first use)
pub fn media_store() -> Result<Arc<SqliteMediaStore>, AppError> {
    if let Some(store) = STORE.get() {
        return Ok(store.clone());
    }
    let store = Arc::new(SqliteMediaStore::open(database::get_database_path())?);
    Ok(STORE.get_or_init(|| store).clone())
}

/// Process-wide upload coordinator
pub fn upload_coordinator() -> Result<Arc<AppCoordinator>, AppError> {
    if let Some(coordinator) = COORDINATOR.get() {
        return Ok(coordinator.clone());
    }
    let store = media_store()?;
    let coordinator = Arc::new(UploadCoordinator::new(
        SystemMediaPicker::default(),
        MediaSizeProbe::new(),
        store,
    ));
    Ok(COORDINATOR.get_or_init(|| coordinator).clone())
}

/// Delete a committed video
///
/// Failures are logged only; the gallery keeps showing whatever the last
/// store snapshot said.
pub async fn delete_video(id: &str) {
    match media_store() {
        Ok(store) => delete_from(&store, id).await,
        Err(e) => log::error!("Store unavailable for delete: {}", e),
    }
}

/// Logs and swallows delete failures; the confirmation flow always
/// completes and the grid keeps rendering the store's last snapshot.
async fn delete_from<S: MediaStore>(store: &S, id: &str) {
    if let Err(e) = store.delete(id).await {
        log::error!("Error deleting video {}: {}", id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::watch;
    use video_gallery::{MediaRecord, StoreError};

    struct RefusingStore {
        deletes: AtomicUsize,
        snapshots: watch::Sender<Vec<MediaRecord>>,
    }

    impl RefusingStore {
        fn new() -> Self {
            let (snapshots, _) = watch::channel(Vec::new());
            Self {
                deletes: AtomicUsize::new(0),
                snapshots,
            }
        }
    }

    impl MediaStore for RefusingStore {
        async fn add(&self, _uri: &str, _file_size: u64) -> Result<MediaRecord, StoreError> {
            Err(StoreError::Other("read only".into()))
        }

        async fn delete(&self, _id: &str) -> Result<(), StoreError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Other("delete refused".into()))
        }

        fn subscribe(&self) -> watch::Receiver<Vec<MediaRecord>> {
            self.snapshots.subscribe()
        }
    }

    #[tokio::test]
    async fn test_failed_delete_is_attempted_once_and_swallowed() {
        let store = RefusingStore::new();

        delete_from(&store, "missing-id").await;
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
    }
}
