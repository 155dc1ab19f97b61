//! Remote backends for the record store.

#[cfg(feature = "http")]
pub mod firestore;

#[cfg(feature = "http")]
pub use firestore::{FirestoreClient, SyncError};
