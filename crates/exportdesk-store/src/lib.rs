//! Storage layer: the record store collaborator, a local backend, and bulk import.
//!
//! Every backend exposes the same four document operations over named
//! collections (`products`, `countries`). Import routines are written
//! against the trait, so they run unchanged on the local store and on
//! Firestore.

mod error;
pub mod import;
mod memory;

pub use error::StoreError;
pub use import::SaveSummary;
pub use memory::MemoryStore;

use async_trait::async_trait;
use exportdesk_core::Fields;
use serde::{Deserialize, Serialize};

/// A stored document: generated id plus its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub fields: Fields,
}

/// Document store addressed by collection name and record id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record and return its generated id.
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// All records in a collection, in backend order.
    async fn list_records(&self, collection: &str) -> Result<Vec<Record>, StoreError>;

    /// Merge `fields` into an existing record; fields not named are kept.
    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;

    async fn delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
