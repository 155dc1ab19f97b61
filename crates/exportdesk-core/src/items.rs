//! Category label expansion.
//!
//! A pasted category header such as `Toners, Essences (hydrating, calming), plus Mists`
//! names several products at once. Commas separate items, except inside
//! parentheses, and a leading connective (`plus`, `and`, `&`) is dropped.

use std::sync::LazyLock;

use regex::Regex;

/// Private-use marker wrapped around the index of a protected span.
const MARKER: char = '\u{E000}';

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]+\)").unwrap());
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("{MARKER}([0-9]+){MARKER}")).unwrap());
static CONNECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:plus|and|&)\s+").unwrap());

/// Split a category label into its items.
///
/// Order is preserved and duplicates are kept. Only commas split; an `&`
/// in the middle of an item stays part of that item.
pub fn split_category_items(text: &str) -> Vec<String> {
    let mut spans: Vec<String> = Vec::new();
    let protected = PAREN_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        let idx = spans.len();
        spans.push(caps[0].to_string());
        format!("{MARKER}{idx}{MARKER}")
    });

    protected
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| CONNECTIVE_RE.replace(s, "").trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| restore(&s, &spans))
        .collect()
}

fn restore(piece: &str, spans: &[String]) -> String {
    PLACEHOLDER_RE
        .replace_all(piece, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| spans.get(i))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
