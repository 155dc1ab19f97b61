//! Country keyword table.
//!
//! Maps lowercase country names and demonyms to a canonical display name and
//! code. Used to attribute a block of pasted text to a country when the text
//! has no explicit `Name (CODE)` header.
//!
//! Codes are ISO 3166 alpha-2 except for the `EU` bloc.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `(comma-separated keywords, display name, code)`.
const COUNTRY_DATA: &[(&str, &str, &str)] = &[
    ("egypt,egyptian", "Egypt", "EG"),
    ("vietnam,vietnamese", "Vietnam", "VN"),
    ("thailand,thai", "Thailand", "TH"),
    ("china,chinese", "China", "CN"),
    ("japan,japanese", "Japan", "JP"),
    ("indonesia,indonesian", "Indonesia", "ID"),
    ("malaysia,malaysian", "Malaysia", "MY"),
    ("philippines,philippine,filipino", "Philippines", "PH"),
    ("india,indian", "India", "IN"),
    ("saudi arabia,saudi", "Saudi Arabia", "SA"),
    ("uae,united arab emirates,emirati", "UAE", "AE"),
    ("brazil,brazilian", "Brazil", "BR"),
    ("russia,russian", "Russia", "RU"),
    ("turkey,turkish", "Turkey", "TR"),
    ("mexico,mexican", "Mexico", "MX"),
    ("singapore,singaporean", "Singapore", "SG"),
    ("taiwan,taiwanese", "Taiwan", "TW"),
    ("hong kong", "Hong Kong", "HK"),
    ("cambodia,cambodian", "Cambodia", "KH"),
    ("myanmar", "Myanmar", "MM"),
    ("nigeria,nigerian", "Nigeria", "NG"),
    ("south africa", "South Africa", "ZA"),
    ("kenya,kenyan", "Kenya", "KE"),
    ("ghana,ghanaian", "Ghana", "GH"),
    ("morocco,moroccan", "Morocco", "MA"),
    ("algeria,algerian", "Algeria", "DZ"),
    ("iraq,iraqi", "Iraq", "IQ"),
    ("iran,iranian", "Iran", "IR"),
    ("pakistan,pakistani", "Pakistan", "PK"),
    ("bangladesh,bangladeshi", "Bangladesh", "BD"),
    ("jordan,jordanian", "Jordan", "JO"),
    ("lebanon,lebanese", "Lebanon", "LB"),
    ("kuwait,kuwaiti", "Kuwait", "KW"),
    ("qatar,qatari", "Qatar", "QA"),
    ("oman,omani", "Oman", "OM"),
    ("bahrain,bahraini", "Bahrain", "BH"),
    ("australia,australian", "Australia", "AU"),
    ("canada,canadian", "Canada", "CA"),
    ("colombia,colombian", "Colombia", "CO"),
    ("chile,chilean", "Chile", "CL"),
    ("peru,peruvian", "Peru", "PE"),
    ("argentina,argentine", "Argentina", "AR"),
    ("uzbekistan", "Uzbekistan", "UZ"),
    ("kazakhstan", "Kazakhstan", "KZ"),
    ("mongolia,mongolian", "Mongolia", "MN"),
    ("new zealand", "New Zealand", "NZ"),
    ("united states,usa,american", "USA", "US"),
    ("european union,eu,european", "EU", "EU"),
];

/// Canonical country identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    pub name: &'static str,
    pub code: &'static str,
}

/// One flattened keyword with its compiled matcher.
struct KeywordEntry {
    keyword: &'static str,
    pattern: Regex,
    info: CountryInfo,
}

/// All keywords, longest first. Equal lengths keep table order.
static KEYWORDS: LazyLock<Vec<KeywordEntry>> = LazyLock::new(|| {
    let mut entries: Vec<KeywordEntry> = COUNTRY_DATA
        .iter()
        .flat_map(|&(keywords, name, code)| {
            keywords.split(',').map(str::trim).map(move |keyword| {
                let words: Vec<String> = keyword.split_whitespace().map(regex::escape).collect();
                KeywordEntry {
                    keyword,
                    pattern: Regex::new(&words.join(r"\s+")).unwrap(),
                    info: CountryInfo { name, code },
                }
            })
        })
        .collect();
    entries.sort_by(|a, b| b.keyword.len().cmp(&a.keyword.len()));
    entries
});

/// Find the country a piece of text talks about.
///
/// Keywords are tried longest first, each as a whole word; whitespace inside
/// a multi-word keyword matches any run of whitespace. Returns the first hit.
pub fn detect_country_from_text(text: &str) -> Option<CountryInfo> {
    let lower = text.to_lowercase();
    KEYWORDS
        .iter()
        .find(|e| matches_whole_word(&e.pattern, &lower))
        .map(|e| e.info)
}

/// Whole-word match with ASCII word boundaries, so a keyword directly
/// followed by Hangul (`vietnam에서`) still counts.
fn matches_whole_word(pattern: &Regex, haystack: &str) -> bool {
    let mut start = 0;
    while let Some(m) = pattern.find_at(haystack, start) {
        let before = haystack[..m.start()].chars().next_back();
        let after = haystack[m.end()..].chars().next();
        if !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char) {
            return true;
        }
        start = m.start()
            + haystack[m.start()..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
    }
    false
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
