//! Multi-select country picker state.
//!
//! The picker edits a comma-separated code string (`"VN, TH"`) against the
//! list of countries currently registered. Every operation takes the current
//! value and returns the next one.

use crate::fields::{join_list, split_on_comma};

/// A country the picker can offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryOption {
    pub code: String,
    pub name: String,
}

impl CountryOption {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

pub fn selected_codes(value: &str) -> Vec<String> {
    split_on_comma(value)
}

pub fn is_selected(value: &str, code: &str) -> bool {
    selected_codes(value).iter().any(|c| c == code)
}

/// All offered countries are selected (by count, as the picker displays it).
pub fn is_all_selected(countries: &[CountryOption], value: &str) -> bool {
    !countries.is_empty() && selected_codes(value).len() == countries.len()
}

/// Remove `code` if present, otherwise append it.
pub fn toggle(value: &str, code: &str) -> String {
    let mut codes = selected_codes(value);
    match codes.iter().position(|c| c == code) {
        Some(i) => {
            codes.remove(i);
        }
        None => codes.push(code.to_string()),
    }
    join_list(&codes)
}

/// Clear when everything is selected, otherwise select every offered code.
pub fn toggle_all(countries: &[CountryOption], value: &str) -> String {
    if is_all_selected(countries, value) {
        String::new()
    } else {
        let codes: Vec<&str> = countries.iter().map(|c| c.code.as_str()).collect();
        join_list(&codes)
    }
}

/// Button caption for the closed picker.
pub fn summary(countries: &[CountryOption], value: &str) -> String {
    let codes = selected_codes(value);
    if codes.is_empty() {
        "Select countries".to_string()
    } else if is_all_selected(countries, value) {
        format!("All selected ({})", countries.len())
    } else {
        format!("{} countries selected ({})", codes.len(), join_list(&codes))
    }
}
