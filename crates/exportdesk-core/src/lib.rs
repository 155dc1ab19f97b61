//! Core types and free-text import parsers for ExportDesk.
//!
//! Admins paste buyer emails (product catalogues, country export requirement
//! lists); the parsers here turn them into editable candidates that are
//! reviewed and then saved as records.

pub mod candidate;
pub mod country_text;
pub mod fields;
pub mod items;
pub mod keywords;
pub mod product_text;
pub mod record;
pub mod review;
pub mod selection;

pub use candidate::{
    CountryField, ParsedCountryCandidate, ParsedProductCandidate, ProductField, Selectable,
};
pub use country_text::parse_country_text;
pub use fields::{join_list, split_on_comma};
pub use items::split_category_items;
pub use keywords::{CountryInfo, detect_country_from_text};
pub use product_text::parse_email_text;
pub use record::{COUNTRIES, Country, FieldValue, Fields, PRODUCTS, Product, RecordError};
pub use review::ReviewList;
