//! Product catalogue parser.
//!
//! Reads the body of a buyer email that lists product categories as bullet
//! headers, each followed by free-text ingredient lines:
//!
//! ```text
//! * Serums & Body Oils (6 SKUs)
//! Niacinamide, Hyaluronic Acid
//! Vitamin C
//! - Toners, Mists
//! Centella Asiatica
//! ```
//!
//! Lines before the first header are ignored. Boilerplate prose lines that
//! buyers paste under a category (registration notes, sample requests) are
//! skipped rather than read as ingredients.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::candidate::ParsedProductCandidate;
use crate::items::split_category_items;

static STAR_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\*\s*(.+?)(?:\s*\(([0-9]+)\s*SKUs?\))?$").unwrap());
static DASH_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[-–—]\s*(.+?)(?:\s*\(([0-9]+)\s*SKUs?\))?$").unwrap());
static TRAILING_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[-–—]\s*$").unwrap());
static BOILERPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:requirements|all cosmetic|samples|we recommend|registration|ingredient compliance|claims|factory|individual|official)",
    )
    .unwrap()
});
static EDGE_COMMAS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[,\s]+|[,\s]+$").unwrap());

/// A category header with the ingredient lines collected under it so far.
struct OpenCategory {
    label: String,
    sku_count: Option<u64>,
    ingredient_lines: Vec<String>,
}

impl OpenCategory {
    /// Emit the candidates for this category.
    ///
    /// A label that lists several items yields one candidate per item, all
    /// sharing the ingredient list. The SKU count only survives on a
    /// single-item label, and only when it is non-zero.
    fn flush(self, out: &mut Vec<ParsedProductCandidate>) {
        let ingredients = self.ingredient_lines.join(", ");
        let items = split_category_items(&self.label);

        if items.len() > 1 {
            for item in items {
                let mut candidate = ParsedProductCandidate::new(item.clone(), item);
                candidate.ingredients = ingredients.clone();
                out.push(candidate);
            }
        } else {
            let mut candidate = ParsedProductCandidate::new(self.label.clone(), self.label);
            candidate.ingredients = ingredients;
            if let Some(n) = self.sku_count.filter(|&n| n > 0) {
                candidate.description = format!("{n} SKUs");
            }
            out.push(candidate);
        }
    }
}

/// Parse a pasted product catalogue into review candidates.
///
/// Returns an empty list when no category header is found; callers treat
/// that as "nothing parsed" and show the expected format.
pub fn parse_email_text(text: &str) -> Vec<ParsedProductCandidate> {
    let mut results = Vec::new();
    let mut current: Option<OpenCategory> = None;

    for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = header_captures(line) {
            if let Some(done) = current.take() {
                done.flush(&mut results);
            }
            let label = TRAILING_DASH_RE.replace(&caps[1], "").trim().to_string();
            // An empty label closes the previous category without opening one.
            if !label.is_empty() {
                current = Some(OpenCategory {
                    label,
                    sku_count: caps.get(2).and_then(|m| m.as_str().parse().ok()),
                    ingredient_lines: Vec::new(),
                });
            }
        } else if let Some(open) = current.as_mut() {
            if !BOILERPLATE_RE.is_match(line) {
                open.ingredient_lines
                    .push(EDGE_COMMAS_RE.replace_all(line, "").into_owned());
            }
        }
    }

    if let Some(done) = current.take() {
        done.flush(&mut results);
    }

    debug!(candidates = results.len(), "parsed product text");
    results
}

fn header_captures(line: &str) -> Option<regex::Captures<'_>> {
    STAR_HEADER_RE
        .captures(line)
        .or_else(|| DASH_HEADER_RE.captures(line))
}
