//! Persisted product and country shapes.
//!
//! Records are what the store holds. Candidates become records on save:
//! comma-joined text is re-split into lists and country codes are
//! uppercased. Records become candidates again when an admin edits one.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::candidate::{ParsedCountryCandidate, ParsedProductCandidate};
use crate::fields::{join_list, split_on_comma};

pub const PRODUCTS: &str = "products";
pub const COUNTRIES: &str = "countries";

/// Field stamped on every record when it is first created.
pub const CREATED_AT: &str = "createdAt";

/// A single stored field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Timestamp(DateTime<Utc>),
}

/// Field name → value, in name order.
pub type Fields = BTreeMap<String, FieldValue>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

fn text(fields: &Fields, key: &str) -> String {
    match fields.get(key) {
        Some(FieldValue::Text(s)) => s.clone(),
        _ => String::new(),
    }
}

fn list(fields: &Fields, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(FieldValue::List(v)) => v.clone(),
        _ => Vec::new(),
    }
}

/// Stamp a creation time onto a field set.
pub fn with_created_at(mut fields: Fields, at: DateTime<Utc>) -> Fields {
    fields.insert(CREATED_AT.to_string(), FieldValue::Timestamp(at));
    fields
}

/// Read the creation stamp back, if the record has one.
pub fn created_at(fields: &Fields) -> Option<DateTime<Utc>> {
    match fields.get(CREATED_AT) {
        Some(FieldValue::Timestamp(t)) => Some(*t),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub functions: Vec<String>,
    pub target_countries: Vec<String>,
    pub required_documents: Vec<String>,
    pub description: String,
}

impl Product {
    /// Convert a manually entered form, requiring a name and category.
    ///
    /// Bulk imports use `From` instead and accept whatever was parsed.
    pub fn validated(form: &ParsedProductCandidate) -> Result<Self, RecordError> {
        if form.name.is_empty() {
            return Err(RecordError::MissingField("name"));
        }
        if form.category.is_empty() {
            return Err(RecordError::MissingField("category"));
        }
        Ok(Self::from(form))
    }

    pub fn to_fields(&self) -> Fields {
        Fields::from([
            ("name".to_string(), FieldValue::Text(self.name.clone())),
            ("category".to_string(), FieldValue::Text(self.category.clone())),
            ("ingredients".to_string(), FieldValue::List(self.ingredients.clone())),
            ("functions".to_string(), FieldValue::List(self.functions.clone())),
            (
                "targetCountries".to_string(),
                FieldValue::List(self.target_countries.clone()),
            ),
            (
                "requiredDocuments".to_string(),
                FieldValue::List(self.required_documents.clone()),
            ),
            ("description".to_string(), FieldValue::Text(self.description.clone())),
        ])
    }

    /// Read a product back; absent or mistyped fields come back empty.
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            name: text(fields, "name"),
            category: text(fields, "category"),
            ingredients: list(fields, "ingredients"),
            functions: list(fields, "functions"),
            target_countries: list(fields, "targetCountries"),
            required_documents: list(fields, "requiredDocuments"),
            description: text(fields, "description"),
        }
    }
}

impl From<&ParsedProductCandidate> for Product {
    fn from(c: &ParsedProductCandidate) -> Self {
        Self {
            name: c.name.clone(),
            category: c.category.clone(),
            ingredients: split_on_comma(&c.ingredients),
            functions: split_on_comma(&c.functions),
            target_countries: split_on_comma(&c.target_countries),
            required_documents: split_on_comma(&c.required_documents),
            description: c.description.clone(),
        }
    }
}

impl From<&Product> for ParsedProductCandidate {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            category: p.category.clone(),
            ingredients: join_list(&p.ingredients),
            functions: join_list(&p.functions),
            target_countries: join_list(&p.target_countries),
            required_documents: join_list(&p.required_documents),
            description: p.description.clone(),
            selected: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
    pub requirements: String,
    pub documents: Vec<String>,
}

impl Country {
    /// Convert a manually entered form, requiring a name and code.
    pub fn validated(form: &ParsedCountryCandidate) -> Result<Self, RecordError> {
        if form.name.is_empty() {
            return Err(RecordError::MissingField("name"));
        }
        if form.code.is_empty() {
            return Err(RecordError::MissingField("code"));
        }
        Ok(Self::from(form))
    }

    pub fn to_fields(&self) -> Fields {
        Fields::from([
            ("name".to_string(), FieldValue::Text(self.name.clone())),
            ("code".to_string(), FieldValue::Text(self.code.clone())),
            (
                "requirements".to_string(),
                FieldValue::Text(self.requirements.clone()),
            ),
            ("documents".to_string(), FieldValue::List(self.documents.clone())),
        ])
    }

    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            name: text(fields, "name"),
            code: text(fields, "code"),
            requirements: text(fields, "requirements"),
            documents: list(fields, "documents"),
        }
    }
}

impl From<&ParsedCountryCandidate> for Country {
    fn from(c: &ParsedCountryCandidate) -> Self {
        Self {
            name: c.name.clone(),
            code: c.code.to_uppercase(),
            requirements: c.requirements.clone(),
            documents: split_on_comma(&c.documents),
        }
    }
}

impl From<&Country> for ParsedCountryCandidate {
    fn from(c: &Country) -> Self {
        Self {
            name: c.name.clone(),
            code: c.code.clone(),
            requirements: c.requirements.clone(),
            documents: join_list(&c.documents),
            selected: true,
        }
    }
}
