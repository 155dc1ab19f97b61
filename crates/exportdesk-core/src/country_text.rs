//! Country requirements parser.
//!
//! Pasted text is cut into blocks at separator lines (`----`, `====`). Each
//! block is read in one of two modes:
//!
//! - **Explicit headers**: some line looks like `Egypt (EG)`, `1. Egypt [EG]`
//!   or `EG - Egypt`. Every such line opens a new country; the lines after it
//!   belong to that country until the next header.
//! - **Keyword detection**: no header line exists, so the whole block is
//!   attributed to the country the keyword table finds in it. Blocks that
//!   mention no known country produce nothing.
//!
//! Body lines are routed the same way in both modes. A bare section label
//! (`Requirements:`, `서류`) switches the active section, a labelled line
//! (`Documents: CFS, GMP`) stores its content and switches, and anything else
//! goes to the active section. Until a label is seen, bulleted lines count as
//! documents and plain lines as requirements.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::candidate::ParsedCountryCandidate;
use crate::keywords::detect_country_from_text;

static BLOCK_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*[-–—=]{3,}\s*\n").unwrap());

static BRACKET_HEADER_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[*\-–—•#0-9.)]*\s*.+?\s*[(\[]\s*[A-Za-z]{2,3}\s*[)\]]").unwrap()
});
static CODE_HEADER_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*\-–—•]*\s*[A-Z]{2,3}\s*[-–—:]\s*.+").unwrap());
static BRACKET_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[*\-–—•#0-9.)]*\s*(.+?)\s*[(\[]\s*([A-Za-z]{2,3})\s*[)\]]?\s*:?\s*$").unwrap()
});
static CODE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*\-–—•]*\s*([A-Z]{2,3})\s*[-–—:]\s*(.+?)\s*$").unwrap());

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[*\-–—•]\s*").unwrap());
static REQUIREMENTS_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:requirements?|규정|요건|수출\s*요건)\s*[:：]?\s*$").unwrap()
});
static DOCUMENTS_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:documents?|서류|필요\s*서류)\s*[:：]?\s*$").unwrap());
static REQUIREMENTS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:requirements?|규정|요건|수출\s*요건)\s*[:：]\s*(.+)").unwrap()
});
static DOCUMENTS_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:documents?|서류|필요\s*서류)\s*[:：]\s*(.+)").unwrap());

/// Which buffer plain body lines go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// No label seen yet: bullets are documents, plain lines requirements.
    Undecided,
    Requirements,
    Documents,
}

/// How a single body line is handled, checked in this order.
#[derive(Debug, PartialEq, Eq)]
enum BodyLine<'a> {
    Empty,
    SectionLabel(Section),
    LabelledRequirement(&'a str),
    LabelledDocuments(&'a str),
    Content { text: &'a str, bulleted: bool },
}

fn classify_body_line(line: &str) -> BodyLine<'_> {
    let text = match BULLET_RE.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    };
    if text.is_empty() {
        return BodyLine::Empty;
    }
    if REQUIREMENTS_LABEL_RE.is_match(text) {
        return BodyLine::SectionLabel(Section::Requirements);
    }
    if DOCUMENTS_LABEL_RE.is_match(text) {
        return BodyLine::SectionLabel(Section::Documents);
    }
    if let Some(caps) = REQUIREMENTS_LINE_RE.captures(text) {
        let content = caps.get(1).map_or("", |m| m.as_str()).trim();
        return BodyLine::LabelledRequirement(content);
    }
    if let Some(caps) = DOCUMENTS_LINE_RE.captures(text) {
        return BodyLine::LabelledDocuments(caps.get(1).map_or("", |m| m.as_str()));
    }
    BodyLine::Content {
        text,
        bulleted: BULLET_RE.is_match(line),
    }
}

/// Recognise an explicit country header, returning `(name, CODE)`.
fn match_header(line: &str) -> Option<(String, String)> {
    if let Some(caps) = BRACKET_HEADER_RE.captures(line) {
        return Some((caps[1].trim().to_string(), caps[2].to_uppercase()));
    }
    CODE_HEADER_RE
        .captures(line)
        .map(|caps| (caps[2].trim().to_string(), caps[1].to_uppercase()))
}

fn has_explicit_header(lines: &[&str]) -> bool {
    lines
        .iter()
        .any(|l| BRACKET_HEADER_HINT_RE.is_match(l) || CODE_HEADER_HINT_RE.is_match(l))
}

/// The country currently collecting body lines.
struct CountryBlock {
    name: String,
    code: String,
    section: Section,
    requirements: Vec<String>,
    documents: Vec<String>,
}

impl CountryBlock {
    fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            section: Section::Undecided,
            requirements: Vec::new(),
            documents: Vec::new(),
        }
    }

    fn route(&mut self, line: &str) {
        match classify_body_line(line) {
            BodyLine::Empty => {}
            BodyLine::SectionLabel(section) => self.section = section,
            BodyLine::LabelledRequirement(content) => {
                self.requirements.push(content.to_string());
                self.section = Section::Requirements;
            }
            BodyLine::LabelledDocuments(content) => {
                self.documents.extend(
                    content
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
                self.section = Section::Documents;
            }
            BodyLine::Content { text, bulleted } => {
                let to_documents = match self.section {
                    Section::Requirements => false,
                    Section::Documents => true,
                    Section::Undecided => bulleted,
                };
                if to_documents {
                    self.documents.push(text.to_string());
                } else {
                    self.requirements.push(text.to_string());
                }
            }
        }
    }

    fn finish(self) -> ParsedCountryCandidate {
        let mut candidate = ParsedCountryCandidate::new(self.name, self.code);
        candidate.requirements = self.requirements.join("\n");
        candidate.documents = self.documents.join(", ");
        candidate
    }
}

/// Parse pasted country requirement text into review candidates.
///
/// Candidates are returned in block order. The same country appearing in
/// several blocks yields several candidates.
pub fn parse_country_text(text: &str) -> Vec<ParsedCountryCandidate> {
    let mut results = Vec::new();

    for block in BLOCK_SEPARATOR_RE
        .split(text)
        .filter(|b| !b.trim().is_empty())
    {
        let lines: Vec<&str> = block
            .split('\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        if has_explicit_header(&lines) {
            parse_explicit_block(&lines, &mut results);
        } else {
            parse_keyword_block(block, &lines, &mut results);
        }
    }

    debug!(candidates = results.len(), "parsed country text");
    results
}

/// Header lines open a country; body lines before the first header are dropped.
fn parse_explicit_block(lines: &[&str], out: &mut Vec<ParsedCountryCandidate>) {
    let mut current: Option<CountryBlock> = None;

    for line in lines {
        if let Some((name, code)) = match_header(line) {
            if let Some(done) = current.replace(CountryBlock::new(name, code)) {
                out.push(done.finish());
            }
        } else if let Some(block) = current.as_mut() {
            block.route(line);
        }
    }

    if let Some(done) = current {
        out.push(done.finish());
    }
}

fn parse_keyword_block(block: &str, lines: &[&str], out: &mut Vec<ParsedCountryCandidate>) {
    let Some(info) = detect_country_from_text(block) else {
        debug!("skipping block with no recognisable country");
        return;
    };

    let mut country = CountryBlock::new(info.name, info.code);
    for line in lines {
        country.route(line);
    }
    out.push(country.finish());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullets_default_to_documents() {
        let parsed = parse_country_text("Egypt (EG)\n- EDA Registration\n- Lab Testing Report");
        assert_eq!(
            parsed,
            vec![ParsedCountryCandidate {
                name: "Egypt".into(),
                code: "EG".into(),
                requirements: String::new(),
                documents: "EDA Registration, Lab Testing Report".into(),
                selected: true,
            }]
        );
    }

    #[test]
    fn explicit_and_keyword_blocks_are_attributed_separately() {
        let text = "Egypt (EG)\n\
                    - EDA Registration\n\
                    ----------\n\
                    Our Vietnamese buyers need:\n\
                    - CFS\n\
                    Product registration with DAV";
        let parsed = parse_country_text(text);
        assert_eq!(parsed.len(), 2);

        assert_eq!(parsed[0].code, "EG");
        assert_eq!(parsed[0].documents, "EDA Registration");

        assert_eq!(parsed[1].name, "Vietnam");
        assert_eq!(parsed[1].code, "VN");
        assert_eq!(parsed[1].documents, "CFS");
        assert_eq!(
            parsed[1].requirements,
            "Our Vietnamese buyers need:\nProduct registration with DAV"
        );
    }

    #[test]
    fn several_headers_in_one_block() {
        let text = "1. Thailand [th]\n\
                    Thai FDA notification\n\
                    2) Malaysia (MY):\n\
                    NPRA notification\n\
                    - Halal certificate";
        let parsed = parse_country_text(text);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "Thailand");
        assert_eq!(parsed[0].code, "TH");
        assert_eq!(parsed[0].requirements, "Thai FDA notification");
        assert_eq!(parsed[1].name, "Malaysia");
        assert_eq!(parsed[1].code, "MY");
        assert_eq!(parsed[1].requirements, "NPRA notification");
        assert_eq!(parsed[1].documents, "Halal certificate");
    }

    #[test]
    fn code_dash_header() {
        let parsed = parse_country_text("SA – Saudi Arabia\n- SFDA listing");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Saudi Arabia");
        assert_eq!(parsed[0].code, "SA");
        assert_eq!(parsed[0].documents, "SFDA listing");
    }

    #[test]
    fn section_labels_switch_buffers() {
        let text = "Indonesia (ID)\n\
                    Documents:\n\
                    Certificate of Free Sale\n\
                    GMP\n\
                    Requirements\n\
                    - BPOM notification\n\
                    - Halal by 2026";
        let parsed = parse_country_text(text);
        assert_eq!(parsed[0].documents, "Certificate of Free Sale, GMP");
        assert_eq!(parsed[0].requirements, "BPOM notification\nHalal by 2026");
    }

    #[test]
    fn labelled_lines_store_content_and_switch() {
        let text = "Japan (JP)\n\
                    Requirements: Japanese labelling\n\
                    Quasi-drug approval for whitening\n\
                    Documents: INCI list, MSDS ,\n\
                    Import notification";
        let parsed = parse_country_text(text);
        assert_eq!(
            parsed[0].requirements,
            "Japanese labelling\nQuasi-drug approval for whitening"
        );
        assert_eq!(parsed[0].documents, "INCI list, MSDS, Import notification");
    }

    #[test]
    fn korean_section_labels() {
        let text = "베트남 (VN)\n\
                    수출 요건\n\
                    - 제품 등록\n\
                    필요 서류：CFS, 성분표";
        let parsed = parse_country_text(text);
        assert_eq!(parsed[0].name, "베트남");
        assert_eq!(parsed[0].requirements, "제품 등록");
        assert_eq!(parsed[0].documents, "CFS, 성분표");
    }

    #[test]
    fn keyword_block_honours_section_labels() {
        let text = "Kenyan market notes\n\
                    Documents\n\
                    KEBS certificate\n\
                    requirement: English label";
        let parsed = parse_country_text(text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].code, "KE");
        assert_eq!(parsed[0].documents, "KEBS certificate");
        assert_eq!(parsed[0].requirements, "Kenyan market notes\nEnglish label");
    }

    #[test]
    fn block_without_country_is_skipped() {
        let text = "Please send samples soon.\n====\nThank you";
        assert!(parse_country_text(text).is_empty());
    }

    #[test]
    fn lines_before_first_header_are_dropped() {
        let parsed = parse_country_text("Dear team\nOman (OM)\nMOH approval");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].requirements, "MOH approval");
    }

    #[test]
    fn duplicate_countries_are_not_merged() {
        let text = "Egypt (EG)\nEDA\n---\nEgyptian importers ask for:\n- COA";
        let parsed = parse_country_text(text);
        assert_eq!(parsed.len(), 2);
        assert!(parsed.iter().all(|c| c.code == "EG"));
    }

    #[test]
    fn malformed_codes_pass_through() {
        let parsed = parse_country_text("Europe (eur)\nCPNP");
        assert_eq!(parsed[0].code, "EUR");
        assert_eq!(parsed[0].name, "Europe");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_country_text("").is_empty());
        assert!(parse_country_text("\n---\n\n").is_empty());
    }

    #[test]
    fn parsing_is_deterministic() {
        let text = "Egypt (EG)\n- A\n---\nChinese buyers\n- B";
        assert_eq!(parse_country_text(text), parse_country_text(text));
    }

    #[test]
    fn classify_guards_in_order() {
        assert_eq!(classify_body_line("- "), BodyLine::Empty);
        assert_eq!(
            classify_body_line("• Requirements:"),
            BodyLine::SectionLabel(Section::Requirements)
        );
        assert_eq!(
            classify_body_line("서류"),
            BodyLine::SectionLabel(Section::Documents)
        );
        assert_eq!(
            classify_body_line("Document: CFS"),
            BodyLine::LabelledDocuments("CFS")
        );
        assert_eq!(
            classify_body_line("* Stability test"),
            BodyLine::Content { text: "Stability test", bulleted: true }
        );
    }
}
