//! Firestore REST client implementing [`RecordStore`].
//!
//! Talks to the Firestore v1 REST API (or the local emulator when `base_url`
//! points at it). Only the value kinds records use are encoded: strings,
//! string arrays and timestamps.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use exportdesk_core::{FieldValue, Fields};
use exportdesk_store::{Record, RecordStore, StoreError};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::info;

const PAGE_SIZE: &str = "300";

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected document: {0}")]
    Decode(String),
}

impl SyncError {
    fn into_store_error(self, collection: &str, id: &str) -> StoreError {
        match self {
            SyncError::Server { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                }
            }
            other => other.into(),
        }
    }
}

impl From<SyncError> for StoreError {
    fn from(e: SyncError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

#[derive(Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

/// Firestore document store for one project's `(default)` database.
pub struct FirestoreClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    token: Option<String>,
}

impl FirestoreClient {
    /// Create a client for `base_url` (e.g. `https://firestore.googleapis.com`
    /// or `http://localhost:8080` for the emulator), no trailing slash needed.
    pub fn new(base_url: String, project_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<reqwest::Response, SyncError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    /// Create a document with a server-generated id and return that id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: &Fields,
    ) -> Result<String, SyncError> {
        let url = self.collection_url(collection);
        info!(url = %url, "creating document");
        let body = json!({ "fields": encode_fields(fields) });
        let resp = Self::send(self.request(Method::POST, &url).json(&body)).await?;
        let doc: Document = resp.json().await?;
        document_id(&doc.name)
    }

    /// Fetch every document in a collection, following page tokens.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Record>, SyncError> {
        let url = self.collection_url(collection);
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }
            let resp = Self::send(self.request(Method::GET, &url).query(&query)).await?;
            let page: ListResponse = resp.json().await?;
            for doc in page.documents {
                records.push(decode_document(doc)?);
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(url = %url, count = records.len(), "listed documents");
        Ok(records)
    }

    /// Overwrite the named fields of an existing document.
    pub async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<(), SyncError> {
        let url = self.document_url(collection, id);
        info!(url = %url, fields = fields.len(), "patching document");
        let body = json!({ "fields": encode_fields(fields) });
        let builder = self
            .request(Method::PATCH, &url)
            .query(&update_mask(fields))
            .json(&body);
        Self::send(builder).await?;
        Ok(())
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), SyncError> {
        let url = self.document_url(collection, id);
        info!(url = %url, "deleting document");
        Self::send(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FirestoreClient {
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        Ok(self.create_document(collection, &fields).await?)
    }

    async fn list_records(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        Ok(self.list_documents(collection).await?)
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.patch_document(collection, id, &fields)
            .await
            .map_err(|e| e.into_store_error(collection, id))
    }

    async fn delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.delete_document(collection, id)
            .await
            .map_err(|e| e.into_store_error(collection, id))
    }
}

// ── Wire encoding ──

/// Query pairs restricting a PATCH to the given fields and to existing documents.
fn update_mask(fields: &Fields) -> Vec<(&'static str, String)> {
    let mut query: Vec<(&'static str, String)> = fields
        .keys()
        .map(|k| ("updateMask.fieldPaths", k.clone()))
        .collect();
    query.push(("currentDocument.exists", "true".to_string()));
    query
}

fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => json!({ "stringValue": s }),
        FieldValue::List(items) if items.is_empty() => json!({ "arrayValue": {} }),
        FieldValue::List(items) => {
            let values: Vec<Value> = items.iter().map(|s| json!({ "stringValue": s })).collect();
            json!({ "arrayValue": { "values": values } })
        }
        FieldValue::Timestamp(t) => {
            json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
    }
}

/// Decode one Firestore value; kinds records never use come back as `None`.
fn decode_value(value: &Value) -> Option<FieldValue> {
    if let Some(s) = value.get("stringValue").and_then(Value::as_str) {
        return Some(FieldValue::Text(s.to_string()));
    }
    if let Some(array) = value.get("arrayValue") {
        let items = array
            .get("values")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.get("stringValue").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        return Some(FieldValue::List(items));
    }
    value
        .get("timestampValue")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
}

fn decode_document(doc: Document) -> Result<Record, SyncError> {
    let id = document_id(&doc.name)?;
    let fields = doc
        .fields
        .iter()
        .filter_map(|(k, v)| decode_value(v).map(|fv| (k.clone(), fv)))
        .collect();
    Ok(Record { id, fields })
}

/// Last path segment of a document resource name.
fn document_id(name: &str) -> Result<String, SyncError> {
    name.rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SyncError::Decode(format!("document name without id: {name:?}")))
}
