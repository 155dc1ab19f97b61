//! Parsed candidates awaiting admin review.
//!
//! Candidates exist only for one parse → review → save cycle. They have no
//! identity beyond their position in the review list.

use serde::{Deserialize, Serialize};

/// A product extracted from a pasted buyer catalogue.
///
/// List-valued attributes are kept comma-joined for editing and re-split
/// when the candidate is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProductCandidate {
    pub name: String,
    pub category: String,
    pub ingredients: String,
    pub functions: String,
    pub target_countries: String,
    pub required_documents: String,
    pub description: String,
    pub selected: bool,
}

impl ParsedProductCandidate {
    /// A fresh, selected candidate with only name and category set.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ingredients: String::new(),
            functions: String::new(),
            target_countries: String::new(),
            required_documents: String::new(),
            description: String::new(),
            selected: true,
        }
    }

    pub fn set_field(&mut self, field: ProductField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProductField::Name => self.name = value,
            ProductField::Category => self.category = value,
            ProductField::Ingredients => self.ingredients = value,
            ProductField::Functions => self.functions = value,
            ProductField::TargetCountries => self.target_countries = value,
            ProductField::RequiredDocuments => self.required_documents = value,
            ProductField::Description => self.description = value,
        }
    }
}

/// Editable text attributes of a [`ParsedProductCandidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Category,
    Ingredients,
    Functions,
    TargetCountries,
    RequiredDocuments,
    Description,
}

/// A country with export requirements extracted from pasted text.
///
/// `requirements` keeps one requirement per line; `documents` is comma-joined.
/// The code is stored as found and uppercased only on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCountryCandidate {
    pub name: String,
    pub code: String,
    pub requirements: String,
    pub documents: String,
    pub selected: bool,
}

impl ParsedCountryCandidate {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            requirements: String::new(),
            documents: String::new(),
            selected: true,
        }
    }

    pub fn set_field(&mut self, field: CountryField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CountryField::Name => self.name = value,
            CountryField::Code => self.code = value,
            CountryField::Requirements => self.requirements = value,
            CountryField::Documents => self.documents = value,
        }
    }
}

/// Editable text attributes of a [`ParsedCountryCandidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryField {
    Name,
    Code,
    Requirements,
    Documents,
}

/// Anything the review list can toggle.
pub trait Selectable {
    fn is_selected(&self) -> bool;
    fn set_selected(&mut self, selected: bool);
}

impl Selectable for ParsedProductCandidate {
    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

impl Selectable for ParsedCountryCandidate {
    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
