//! Bulk save and delete of reviewed candidates.
//!
//! Writes go one record at a time, in order. A failed write is logged and
//! counted and the batch carries on, so a partial failure leaves some
//! records written and is reported only as a summary.

use chrono::Utc;
use exportdesk_core::record::with_created_at;
use exportdesk_core::{
    COUNTRIES, Country, PRODUCTS, ParsedCountryCandidate, ParsedProductCandidate, Product,
    RecordError,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{RecordStore, StoreError};

/// Outcome of a bulk write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub attempted: usize,
    pub saved: usize,
    pub failed: usize,
}

impl SaveSummary {
    /// Nothing was selected, so nothing was attempted.
    pub fn nothing_selected(&self) -> bool {
        self.attempted == 0
    }

    pub fn all_saved(&self) -> bool {
        self.failed == 0
    }

    /// Admin-facing result line. Individual errors are only logged.
    pub fn message(&self) -> String {
        if self.all_saved() {
            format!("{} saved", self.saved)
        } else {
            format!("{} saved, some failed", self.saved)
        }
    }

    fn record(&mut self, result: Result<(), StoreError>, collection: &str, label: &str) {
        self.attempted += 1;
        match result {
            Ok(()) => self.saved += 1,
            Err(e) => {
                self.failed += 1;
                warn!(collection, item = label, error = %e, "bulk write failed, continuing");
            }
        }
    }
}

/// Create one product record per selected candidate.
pub async fn save_products(
    store: &dyn RecordStore,
    candidates: &[ParsedProductCandidate],
) -> SaveSummary {
    let mut summary = SaveSummary::default();
    for candidate in candidates.iter().filter(|c| c.selected) {
        let fields = with_created_at(Product::from(candidate).to_fields(), Utc::now());
        let result = store.create_record(PRODUCTS, fields).await.map(|_| ());
        summary.record(result, PRODUCTS, &candidate.name);
    }
    info!(saved = summary.saved, failed = summary.failed, "saved products");
    summary
}

/// Create one country record per selected candidate; codes are uppercased.
pub async fn save_countries(
    store: &dyn RecordStore,
    candidates: &[ParsedCountryCandidate],
) -> SaveSummary {
    let mut summary = SaveSummary::default();
    for candidate in candidates.iter().filter(|c| c.selected) {
        let fields = with_created_at(Country::from(candidate).to_fields(), Utc::now());
        let result = store.create_record(COUNTRIES, fields).await.map(|_| ());
        summary.record(result, COUNTRIES, &candidate.name);
    }
    info!(saved = summary.saved, failed = summary.failed, "saved countries");
    summary
}

/// Delete several records, continuing past failures.
pub async fn delete_records(
    store: &dyn RecordStore,
    collection: &str,
    ids: &[String],
) -> SaveSummary {
    let mut summary = SaveSummary::default();
    for id in ids {
        let result = store.delete_record(collection, id).await;
        summary.record(result, collection, id);
    }
    info!(collection, deleted = summary.saved, failed = summary.failed, "bulk delete");
    summary
}

/// Products with their record ids.
pub async fn list_products(store: &dyn RecordStore) -> Result<Vec<(String, Product)>, StoreError> {
    let records = store.list_records(PRODUCTS).await?;
    Ok(records
        .into_iter()
        .map(|r| {
            let product = Product::from_fields(&r.fields);
            (r.id, product)
        })
        .collect())
}

/// Countries with their record ids.
pub async fn list_countries(store: &dyn RecordStore) -> Result<Vec<(String, Country)>, StoreError> {
    let records = store.list_records(COUNTRIES).await?;
    Ok(records
        .into_iter()
        .map(|r| {
            let country = Country::from_fields(&r.fields);
            (r.id, country)
        })
        .collect())
}

/// Failure of a single manual save.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Invalid(#[from] RecordError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Save one manually entered product: create when `id` is `None`, otherwise
/// overwrite that record's product fields. Returns the record id.
pub async fn save_product(
    store: &dyn RecordStore,
    id: Option<&str>,
    form: &ParsedProductCandidate,
) -> Result<String, SaveError> {
    let fields = Product::validated(form)?.to_fields();
    match id {
        Some(id) => {
            store.update_record(PRODUCTS, id, fields).await?;
            Ok(id.to_string())
        }
        None => Ok(store
            .create_record(PRODUCTS, with_created_at(fields, Utc::now()))
            .await?),
    }
}

/// Save one manually entered country; see [`save_product`].
pub async fn save_country(
    store: &dyn RecordStore,
    id: Option<&str>,
    form: &ParsedCountryCandidate,
) -> Result<String, SaveError> {
    let fields = Country::validated(form)?.to_fields();
    match id {
        Some(id) => {
            store.update_record(COUNTRIES, id, fields).await?;
            Ok(id.to_string())
        }
        None => Ok(store
            .create_record(COUNTRIES, with_created_at(fields, Utc::now()))
            .await?),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use exportdesk_core::record::created_at;
    use exportdesk_core::{Fields, parse_country_text, parse_email_text};

    use super::*;
    use crate::{MemoryStore, Record};

    /// Fails every `n`th create, delegating the rest to a memory store.
    struct FlakyStore {
        inner: MemoryStore,
        every: usize,
        calls: AtomicUsize,
    }

    impl FlakyStore {
        fn failing_every(every: usize) -> Self {
            Self {
                inner: MemoryStore::open(),
                every,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordStore for FlakyStore {
        async fn create_record(
            &self,
            collection: &str,
            fields: Fields,
        ) -> Result<String, StoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n % self.every == 0 {
                return Err(StoreError::Backend("quota exceeded".into()));
            }
            self.inner.create_record(collection, fields).await
        }

        async fn list_records(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
            self.inner.list_records(collection).await
        }

        async fn update_record(
            &self,
            collection: &str,
            id: &str,
            fields: Fields,
        ) -> Result<(), StoreError> {
            self.inner.update_record(collection, id, fields).await
        }

        async fn delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError> {
            self.inner.delete_record(collection, id).await
        }
    }

    #[tokio::test]
    async fn only_selected_products_are_saved() {
        let store = MemoryStore::open();
        let mut candidates = parse_email_text("* Toners, Mists\nPanthenol, Allantoin\n* Creams (4 SKUs)");
        candidates[1].selected = false;

        let summary = save_products(&store, &candidates).await;
        assert_eq!(summary, SaveSummary { attempted: 2, saved: 2, failed: 0 });
        assert_eq!(summary.message(), "2 saved");

        let products = list_products(&store).await.unwrap();
        let names: Vec<&str> = products.iter().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(names, vec!["Toners", "Creams"]);
        assert_eq!(products[0].1.ingredients, vec!["Panthenol", "Allantoin"]);
        assert_eq!(products[1].1.description, "4 SKUs");
    }

    #[tokio::test]
    async fn saved_records_carry_created_at() {
        let store = MemoryStore::open();
        save_countries(&store, &parse_country_text("Egypt (eg)\n- COA")).await;
        let records = store.list_records(COUNTRIES).await.unwrap();
        assert!(created_at(&records[0].fields).is_some());

        let countries = list_countries(&store).await.unwrap();
        assert_eq!(countries[0].1.code, "EG");
        assert_eq!(countries[0].1.documents, vec!["COA"]);
    }

    #[tokio::test]
    async fn partial_failure_continues_and_counts() {
        let store = FlakyStore::failing_every(2);
        let candidates = parse_email_text("* A\n* B\n* C\n* D\n* E");

        let summary = save_products(&store, &candidates).await;
        assert_eq!(summary.attempted, 5);
        assert_eq!(summary.saved, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.message(), "3 saved, some failed");

        let names: Vec<String> = list_products(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|(_, p)| p.name)
            .collect();
        assert_eq!(names, vec!["A", "C", "E"]);
    }

    #[tokio::test]
    async fn nothing_selected_writes_nothing() {
        let store = MemoryStore::open();
        let mut candidates = parse_country_text("Egypt (EG)");
        candidates[0].selected = false;
        let summary = save_countries(&store, &candidates).await;
        assert!(summary.nothing_selected());
        assert_eq!(store.count(COUNTRIES).await, 0);
    }

    #[tokio::test]
    async fn bulk_delete_skips_missing_ids() {
        let store = MemoryStore::open();
        save_products(&store, &parse_email_text("* A\n* B")).await;
        let mut ids: Vec<String> = list_products(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        ids.insert(1, "missing".into());

        let summary = delete_records(&store, PRODUCTS, &ids).await;
        assert_eq!(summary, SaveSummary { attempted: 3, saved: 2, failed: 1 });
        assert_eq!(store.count(PRODUCTS).await, 0);
    }

    #[tokio::test]
    async fn manual_save_validates_then_creates_or_updates() {
        let store = MemoryStore::open();

        let blank = ParsedProductCandidate::new("", "");
        let err = save_product(&store, None, &blank).await.unwrap_err();
        assert!(matches!(err, SaveError::Invalid(RecordError::MissingField("name"))));
        assert_eq!(store.count(PRODUCTS).await, 0);

        let mut form = ParsedProductCandidate::new("Toner", "Toners");
        form.ingredients = "Water, Glycerin".into();
        let id = save_product(&store, None, &form).await.unwrap();

        form.description = "Best seller".into();
        assert_eq!(save_product(&store, Some(id.as_str()), &form).await.unwrap(), id);

        let products = list_products(&store).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].1.description, "Best seller");
        // The update keeps the creation stamp.
        let records = store.list_records(PRODUCTS).await.unwrap();
        assert!(created_at(&records[0].fields).is_some());
    }

    #[tokio::test]
    async fn manual_country_update_of_missing_record_fails() {
        let store = MemoryStore::open();
        let form = ParsedCountryCandidate::new("Egypt", "eg");
        let err = save_country(&store, Some("ghost"), &form).await.unwrap_err();
        assert!(matches!(err, SaveError::Store(StoreError::NotFound { .. })));
    }
}
