//! Vertical card display for parsed candidates and stored records.
//!
//! Each card is a header line followed by labelled sections; sections whose
//! values are all empty are skipped.

use exportdesk_core::{
    Country, FieldValue, Fields, ParsedCountryCandidate, ParsedProductCandidate, Product,
};

const MAX_LIST_ITEMS: usize = 10;

// ── Public API ──

/// Print one parsed product candidate with its review index.
pub fn print_product_candidate(index: usize, c: &ParsedProductCandidate) {
    println!("=== [{index}] {} ===", c.name);
    println!();
    print_section(
        "Product",
        &[("category", &c.category), ("description", &c.description)],
    );
    print_section(
        "Composition",
        &[("ingredients", &c.ingredients), ("functions", &c.functions)],
    );
    print_section(
        "Export",
        &[
            ("target_countries", &c.target_countries),
            ("required_documents", &c.required_documents),
        ],
    );
}

/// Print one parsed country candidate with its review index.
pub fn print_country_candidate(index: usize, c: &ParsedCountryCandidate) {
    println!("=== [{index}] {} ({}) ===", c.name, c.code);
    println!();
    print_section(
        "Export",
        &[("requirements", &c.requirements), ("documents", &c.documents)],
    );
}

/// Print a stored product keyed by its record id.
pub fn print_product(id: &str, p: &Product) {
    println!("=== {} ===", p.name);
    println!("{id}");
    println!();
    print_section(
        "Product",
        &[("category", &p.category), ("description", &p.description)],
    );
    print_lists(
        "Composition",
        &[("ingredients", &p.ingredients), ("functions", &p.functions)],
    );
    print_lists(
        "Export",
        &[
            ("target_countries", &p.target_countries),
            ("required_documents", &p.required_documents),
        ],
    );
}

/// Print a stored country keyed by its record id.
pub fn print_country(id: &str, c: &Country) {
    println!("=== {} ({}) ===", c.name, c.code);
    println!("{id}");
    println!();
    print_section("Requirements", &[("requirements", &c.requirements)]);
    print_lists("Documents", &[("documents", &c.documents)]);
}

/// Print every field of a raw record, including ones the typed views drop.
pub fn print_fields(id: &str, fields: &Fields) {
    println!("=== {id} ===");
    for (name, value) in fields {
        match value {
            FieldValue::Text(s) => println!("  {name:<22} {s}"),
            FieldValue::List(items) => println!("  {name:<22} {}", truncated(items)),
            FieldValue::Timestamp(t) => {
                println!("  {name:<22} {}", t.format("%Y-%m-%d %H:%M:%S UTC"))
            }
        }
    }
    println!();
}

// ── Section rendering ──

fn print_section(header: &str, rows: &[(&str, &String)]) {
    if rows.iter().all(|(_, v)| v.is_empty()) {
        return;
    }
    println!("{header}");
    for (name, value) in rows {
        if !value.is_empty() {
            println!("  {name:<22} {value}");
        }
    }
    println!();
}

fn print_lists(header: &str, rows: &[(&str, &Vec<String>)]) {
    if rows.iter().all(|(_, v)| v.is_empty()) {
        return;
    }
    println!("{header}");
    for (name, items) in rows {
        if !items.is_empty() {
            println!("  {name:<22} {}", truncated(items));
        }
    }
    println!();
}

fn truncated(items: &[String]) -> String {
    if items.len() <= MAX_LIST_ITEMS {
        return items.join(", ");
    }
    format!(
        "{} ... and {} more",
        items[..MAX_LIST_ITEMS].join(", "),
        items.len() - MAX_LIST_ITEMS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lists_are_joined() {
        let items = vec!["COA".to_string(), "MSDS".to_string()];
        assert_eq!(truncated(&items), "COA, MSDS");
    }

    #[test]
    fn long_lists_are_cut() {
        let items: Vec<String> = (0..13).map(|i| format!("doc{i}")).collect();
        let out = truncated(&items);
        assert!(out.starts_with("doc0, doc1"));
        assert!(out.ends_with("doc9 ... and 3 more"));
    }
}
