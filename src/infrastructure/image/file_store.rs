//! Disk-backed photo store serialized through a single worker task.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::domain::entities::CachedPhoto;
use crate::domain::errors::StoreError;
use crate::domain::ports::PhotoStore;
use crate::domain::task::Completion;

const PAYLOAD_EXTENSION: &str = "img";
const METADATA_EXTENSION: &str = "json";

/// Metadata written next to each payload file.
#[derive(Debug, Serialize, Deserialize)]
struct RecordMetadata {
    url: String,
    timestamp: DateTime<Utc>,
    length: u64,
}

enum StoreCommand {
    Retrieve {
        url: Url,
        reply: Completion<Option<CachedPhoto>, StoreError>,
    },
    Insert {
        data: Bytes,
        url: Url,
        timestamp: DateTime<Utc>,
        reply: Completion<(), StoreError>,
    },
    Delete {
        url: Url,
        reply: Completion<(), StoreError>,
    },
    Flush(oneshot::Sender<()>),
}

impl StoreCommand {
    fn reject(self, error: StoreError) {
        match self {
            Self::Retrieve { reply, .. } => reply(Err(error)),
            Self::Insert { reply, .. } | Self::Delete { reply, .. } => reply(Err(error)),
            Self::Flush(_) => {}
        }
    }
}

/// Photo store keeping one payload and one metadata file per URL.
///
/// All operations of one instance run on its own worker task, one at a time,
/// in submission order. The worker stops once the store is dropped and the
/// queued operations have run.
pub struct FilePhotoStore {
    tx: mpsc::UnboundedSender<StoreCommand>,
    directory: PathBuf,
}

impl FilePhotoStore {
    /// Opens a store in `directory`, creating it if needed.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub async fn open(directory: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&directory).await.map_err(|e| {
            StoreError::Io(format!(
                "failed to create store dir {}: {e}",
                directory.display()
            ))
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Worker {
            directory: directory.clone(),
        };
        tokio::spawn(run_worker_loop(worker, rx));

        debug!(path = %directory.display(), "Opened photo store");
        Ok(Self { tx, directory })
    }

    /// Directory holding the records.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Waits until every operation submitted before this call has run.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(StoreCommand::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    fn submit(&self, command: StoreCommand) {
        if let Err(mpsc::error::SendError(command)) = self.tx.send(command) {
            warn!("Photo store worker is gone");
            command.reject(StoreError::Closed);
        }
    }
}

impl std::fmt::Debug for FilePhotoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePhotoStore")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

impl PhotoStore for FilePhotoStore {
    fn retrieve(&self, url: &Url, completion: Completion<Option<CachedPhoto>, StoreError>) {
        self.submit(StoreCommand::Retrieve {
            url: url.clone(),
            reply: completion,
        });
    }

    fn insert(
        &self,
        data: Bytes,
        url: &Url,
        timestamp: DateTime<Utc>,
        completion: Completion<(), StoreError>,
    ) {
        self.submit(StoreCommand::Insert {
            data,
            url: url.clone(),
            timestamp,
            reply: completion,
        });
    }

    fn delete(&self, url: &Url, completion: Completion<(), StoreError>) {
        self.submit(StoreCommand::Delete {
            url: url.clone(),
            reply: completion,
        });
    }
}

async fn run_worker_loop(worker: Worker, mut rx: mpsc::UnboundedReceiver<StoreCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            StoreCommand::Retrieve { url, reply } => reply(worker.retrieve(&url).await),
            StoreCommand::Insert {
                data,
                url,
                timestamp,
                reply,
            } => reply(worker.insert(&data, &url, timestamp).await),
            StoreCommand::Delete { url, reply } => reply(worker.delete(&url).await),
            StoreCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    trace!(path = %worker.directory.display(), "Photo store worker stopped");
}

/// File operations, only ever run by the worker task.
struct Worker {
    directory: PathBuf,
}

impl Worker {
    fn record_path(&self, url: &Url, extension: &str) -> PathBuf {
        self.directory.join(format!("{}.{extension}", record_key(url)))
    }

    async fn retrieve(&self, url: &Url) -> Result<Option<CachedPhoto>, StoreError> {
        let metadata_path = self.record_path(url, METADATA_EXTENSION);
        let raw = match fs::read(&metadata_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(url = %url, "Photo store miss");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let metadata: RecordMetadata = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Corrupt(format!("unreadable metadata: {e}")))?;
        if metadata.url != url.as_str() {
            return Err(StoreError::Corrupt(format!(
                "record belongs to {}",
                metadata.url
            )));
        }

        let data = match fs::read(self.record_path(url, PAYLOAD_EXTENSION)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::Corrupt("payload missing".to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if data.len() as u64 != metadata.length {
            return Err(StoreError::Corrupt(format!(
                "payload is {} bytes, expected {}",
                data.len(),
                metadata.length
            )));
        }

        trace!(url = %url, size = data.len(), "Photo store hit");
        Ok(Some(CachedPhoto::new(
            url.clone(),
            Bytes::from(data),
            metadata.timestamp,
        )))
    }

    async fn insert(
        &self,
        data: &[u8],
        url: &Url,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.delete(url).await?;

        let payload_path = self.record_path(url, PAYLOAD_EXTENSION);
        write_atomically(&payload_path, data).await?;

        let metadata = RecordMetadata {
            url: url.to_string(),
            timestamp,
            length: data.len() as u64,
        };
        let raw = serde_json::to_vec(&metadata)
            .map_err(|e| StoreError::Corrupt(format!("failed to encode metadata: {e}")))?;
        write_atomically(&self.record_path(url, METADATA_EXTENSION), &raw).await?;

        debug!(url = %url, size = data.len(), "Stored photo");
        Ok(())
    }

    async fn delete(&self, url: &Url) -> Result<(), StoreError> {
        // metadata first, so a half-deleted record reads as missing
        for extension in [METADATA_EXTENSION, PAYLOAD_EXTENSION] {
            match fs::remove_file(self.record_path(url, extension)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        trace!(url = %url, "Removed photo record");
        Ok(())
    }
}

async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

/// File name stem for `url`: the first 16 bytes of its SHA-256, hex encoded.
fn record_key(url: &Url) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    hex::encode(&digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn create_test_store() -> (FilePhotoStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FilePhotoStore::open(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        (store, temp_dir)
    }

    fn url(name: &str) -> Url {
        Url::parse(&format!("https://img.test/{name}.jpg")).unwrap()
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).single().unwrap()
    }

    fn retrieve(
        store: &FilePhotoStore,
        url: &Url,
    ) -> oneshot::Receiver<Result<Option<CachedPhoto>, StoreError>> {
        let (tx, rx) = oneshot::channel();
        store.retrieve(
            url,
            Box::new(move |r| {
                let _ = tx.send(r);
            }),
        );
        rx
    }

    fn insert(
        store: &FilePhotoStore,
        data: &'static [u8],
        url: &Url,
    ) -> oneshot::Receiver<Result<(), StoreError>> {
        let (tx, rx) = oneshot::channel();
        store.insert(
            Bytes::from_static(data),
            url,
            timestamp(),
            Box::new(move |r| {
                let _ = tx.send(r);
            }),
        );
        rx
    }

    fn delete(store: &FilePhotoStore, url: &Url) -> oneshot::Receiver<Result<(), StoreError>> {
        let (tx, rx) = oneshot::channel();
        store.delete(
            url,
            Box::new(move |r| {
                let _ = tx.send(r);
            }),
        );
        rx
    }

    #[tokio::test]
    async fn test_retrieve_from_empty_store() {
        let (store, _temp) = create_test_store().await;

        assert_eq!(retrieve(&store, &url("a")).await.unwrap(), Ok(None));
        assert_eq!(retrieve(&store, &url("a")).await.unwrap(), Ok(None));
    }

    #[tokio::test]
    async fn test_insert_then_retrieve() {
        let (store, _temp) = create_test_store().await;
        let url = url("a");

        insert(&store, b"photo", &url).await.unwrap().unwrap();

        let expected = CachedPhoto::new(url.clone(), Bytes::from_static(b"photo"), timestamp());
        assert_eq!(retrieve(&store, &url).await.unwrap(), Ok(Some(expected)));
    }

    #[tokio::test]
    async fn test_insert_replaces_previous_record() {
        let (store, _temp) = create_test_store().await;
        let url = url("a");

        insert(&store, b"first", &url).await.unwrap().unwrap();
        insert(&store, b"second version", &url).await.unwrap().unwrap();

        let photo = retrieve(&store, &url).await.unwrap().unwrap().unwrap();
        assert_eq!(&photo.data[..], b"second version");
    }

    #[tokio::test]
    async fn test_records_are_keyed_by_url() {
        let (store, _temp) = create_test_store().await;

        insert(&store, b"a", &url("a")).await.unwrap().unwrap();

        assert_eq!(retrieve(&store, &url("b")).await.unwrap(), Ok(None));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (store, _temp) = create_test_store().await;
        let url = url("a");

        insert(&store, b"photo", &url).await.unwrap().unwrap();
        delete(&store, &url).await.unwrap().unwrap();

        assert_eq!(retrieve(&store, &url).await.unwrap(), Ok(None));
    }

    #[tokio::test]
    async fn test_delete_missing_record_succeeds() {
        let (store, _temp) = create_test_store().await;

        assert_eq!(delete(&store, &url("a")).await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_operations_run_in_submission_order() {
        let (store, _temp) = create_test_store().await;
        let url = url("a");

        let inserted = insert(&store, b"photo", &url);
        let deleted = delete(&store, &url);
        let retrieved = retrieve(&store, &url);
        let reinserted = insert(&store, b"again", &url);
        let last = retrieve(&store, &url);

        assert_eq!(inserted.await.unwrap(), Ok(()));
        assert_eq!(deleted.await.unwrap(), Ok(()));
        assert_eq!(retrieved.await.unwrap(), Ok(None));
        assert_eq!(reinserted.await.unwrap(), Ok(()));
        let photo = last.await.unwrap().unwrap().unwrap();
        assert_eq!(&photo.data[..], b"again");
    }

    #[tokio::test]
    async fn test_flush_waits_for_pending_inserts() {
        let (store, temp) = create_test_store().await;
        let url = url("a");

        store.insert(
            Bytes::from_static(b"photo"),
            &url,
            timestamp(),
            Box::new(|_| {}),
        );
        store.flush().await;

        let payload = temp
            .path()
            .join(format!("{}.{PAYLOAD_EXTENSION}", record_key(&url)));
        assert_eq!(std::fs::read(payload).unwrap(), b"photo");
    }

    #[tokio::test]
    async fn test_records_survive_reopening() {
        let temp_dir = TempDir::new().unwrap();
        let url = url("a");
        {
            let store = FilePhotoStore::open(temp_dir.path().to_path_buf())
                .await
                .unwrap();
            insert(&store, b"photo", &url).await.unwrap().unwrap();
        }

        let store = FilePhotoStore::open(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        let photo = retrieve(&store, &url).await.unwrap().unwrap().unwrap();

        assert_eq!(photo.timestamp, timestamp());
    }

    #[tokio::test]
    async fn test_truncated_payload_is_corrupt() {
        let (store, temp) = create_test_store().await;
        let url = url("a");
        insert(&store, b"photo", &url).await.unwrap().unwrap();

        let payload = temp
            .path()
            .join(format!("{}.{PAYLOAD_EXTENSION}", record_key(&url)));
        std::fs::write(payload, b"ph").unwrap();

        assert!(matches!(
            retrieve(&store, &url).await.unwrap(),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_unreadable_metadata_is_corrupt() {
        let (store, temp) = create_test_store().await;
        let url = url("a");

        let metadata = temp
            .path()
            .join(format!("{}.{METADATA_EXTENSION}", record_key(&url)));
        std::fs::write(metadata, b"{ not json").unwrap();

        assert!(matches!(
            retrieve(&store, &url).await.unwrap(),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_metadata_for_another_url_is_corrupt() {
        let (store, temp) = create_test_store().await;
        let url = url("a");
        insert(&store, b"photo", &url).await.unwrap().unwrap();

        let foreign = RecordMetadata {
            url: "https://img.test/b.jpg".to_string(),
            timestamp: timestamp(),
            length: 5,
        };
        let metadata = temp
            .path()
            .join(format!("{}.{METADATA_EXTENSION}", record_key(&url)));
        std::fs::write(metadata, serde_json::to_vec(&foreign).unwrap()).unwrap();

        assert!(matches!(
            retrieve(&store, &url).await.unwrap(),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_submit_after_worker_stopped_is_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let store = FilePhotoStore {
            tx,
            directory: PathBuf::from("unused"),
        };
        let received: Arc<Mutex<Vec<Result<Option<CachedPhoto>, StoreError>>>> = Arc::default();
        let sink = Arc::clone(&received);

        store.retrieve(&url("a"), Box::new(move |r| sink.lock().push(r)));

        assert_eq!(*received.lock(), vec![Err(StoreError::Closed)]);
    }

    #[test]
    fn test_record_key_is_stable() {
        let key = record_key(&url("a"));
        assert_eq!(key.len(), 32);
        assert_eq!(key, record_key(&url("a")));
        assert_ne!(key, record_key(&url("b")));
    }
}
