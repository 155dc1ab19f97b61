//! Local record store: in-memory, optionally persisted as one JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use exportdesk_core::Fields;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{Record, RecordStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    collections: BTreeMap<String, Vec<Record>>,
}

impl Snapshot {
    fn find_mut(&mut self, collection: &str, id: &str) -> Result<&mut Record, StoreError> {
        self.collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| not_found(collection, id))
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

/// Record store kept in process memory.
///
/// Use [`open`](Self::open) for an ephemeral store and
/// [`open_persistent`](Self::open_persistent) for one backed by a JSON file
/// that is rewritten after every change. Records list in creation order.
pub struct MemoryStore {
    state: Mutex<Snapshot>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn open() -> Self {
        Self {
            state: Mutex::new(Snapshot::default()),
            path: None,
        }
    }

    /// Open or create a JSON-backed store at `path`.
    ///
    /// The file is only created on the first write.
    pub async fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let snapshot = match tokio::fs::read(path).await {
            Ok(bytes) if bytes.is_empty() => Snapshot::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e.into()),
        };
        let total: usize = snapshot.collections.values().map(Vec::len).sum();
        info!(path = %path.display(), records = total, "opened record store");
        Ok(Self {
            state: Mutex::new(snapshot),
            path: Some(path.to_path_buf()),
        })
    }

    /// Number of records in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        let state = self.state.lock().await;
        state.collections.get(collection).map_or(0, Vec::len)
    }

    /// Write `next` to disk, then make it the live state. A failed write
    /// leaves the live state untouched.
    async fn commit(&self, state: &mut Snapshot, next: Snapshot) -> Result<(), StoreError> {
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.next_id += 1;
        let id = format!("{:08}", next.next_id);
        next
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Record {
                id: id.clone(),
                fields,
            });
        self.commit(&mut state, next).await?;
        debug!(collection, id = %id, "created record");
        Ok(id)
    }

    async fn list_records(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.collections.get(collection).cloned().unwrap_or_default())
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.find_mut(collection, id)?.fields.extend(fields);
        self.commit(&mut state, next).await?;
        debug!(collection, id, "updated record");
        Ok(())
    }

    async fn delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let records = next
            .collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let idx = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found(collection, id))?;
        records.remove(idx);
        self.commit(&mut state, next).await?;
        debug!(collection, id, "deleted record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exportdesk_core::FieldValue;

    fn named(name: &str) -> Fields {
        Fields::from([("name".to_string(), FieldValue::Text(name.into()))])
    }

    #[tokio::test]
    async fn create_then_list_in_order() {
        let store = MemoryStore::open();
        let a = store.create_record("products", named("A")).await.unwrap();
        let b = store.create_record("products", named("B")).await.unwrap();
        assert_ne!(a, b);

        let records = store.list_records("products").await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![a.as_str(), b.as_str()]);
        assert!(store.list_records("countries").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryStore::open();
        let id = store.create_record("countries", named("Egypt")).await.unwrap();
        let patch = Fields::from([("code".to_string(), FieldValue::Text("EG".into()))]);
        store.update_record("countries", &id, patch).await.unwrap();

        let records = store.list_records("countries").await.unwrap();
        assert_eq!(records[0].fields.len(), 2);
        assert_eq!(
            records[0].fields.get("name"),
            Some(&FieldValue::Text("Egypt".into()))
        );
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryStore::open();
        let err = store.delete_record("products", "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        let err = store
            .update_record("products", "nope", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_only_target() {
        let store = MemoryStore::open();
        let a = store.create_record("products", named("A")).await.unwrap();
        store.create_record("products", named("B")).await.unwrap();
        store.delete_record("products", &a).await.unwrap();
        assert_eq!(store.count("products").await, 1);
    }

    #[tokio::test]
    async fn persistent_store_survives_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("records.json");

        let store = MemoryStore::open_persistent(&path).await.unwrap();
        // File is created on first write.
        assert!(!path.exists());
        let first = store.create_record("products", named("A")).await.unwrap();
        assert!(path.exists());
        drop(store);

        let store = MemoryStore::open_persistent(&path).await.unwrap();
        assert_eq!(store.count("products").await, 1);
        // Ids keep increasing across reopen.
        let second = store.create_record("products", named("B")).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn failed_write_leaves_store_unchanged() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing-dir").join("records.json");
        let store = MemoryStore::open_persistent(&path).await.unwrap();

        let err = store.create_record("products", named("A")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(store.list_records("products").await.unwrap().is_empty());

        std::fs::create_dir(tmp.path().join("missing-dir")).unwrap();
        let id = store.create_record("products", named("B")).await.unwrap();
        // The failed create did not consume an id.
        assert_eq!(id, "00000001");
        assert_eq!(store.count("products").await, 1);
    }

    #[tokio::test]
    async fn failed_update_and_delete_keep_record() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("data");
        std::fs::create_dir(&dir).unwrap();
        let store = MemoryStore::open_persistent(&dir.join("records.json"))
            .await
            .unwrap();
        let id = store.create_record("countries", named("Egypt")).await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let patch = Fields::from([("code".to_string(), FieldValue::Text("EG".into()))]);
        assert!(store.update_record("countries", &id, patch).await.is_err());
        assert!(store.delete_record("countries", &id).await.is_err());

        let records = store.list_records("countries").await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].fields.contains_key("code"));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("records.json");
        std::fs::write(&path, b"{not json").unwrap();
        let err = MemoryStore::open_persistent(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::Json(_)));
    }
}
