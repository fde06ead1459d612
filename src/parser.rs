//! Wikitext scraping: redirects, list-article table rows and infobox ids

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Regex patterns for wiki markup (compiled once)
static REDIRECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mi)^[ \t]*#[ \t]*redirect\b").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\]|]*)(?:\|([^\]]*))?\]\]").unwrap());
static REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<ref[^>/]*>.*?</ref>").unwrap());
static REF_SELF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<ref[^>]*/\s*>").unwrap());
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static HTML_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Decorative templates found in the list-article rows
static SORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{\{\s*sort\s*\|[^{}|]*\|([^{}]*)\}\}").unwrap());
static NOWRAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\{\{\s*nowrap\s*\|([^{}]*)\}\}").unwrap());
static SMALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\{\{\s*small\s*\|[^{}]*\}\}").unwrap());
static TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{[^{}]*\}\}").unwrap());

// Infobox shapes carrying the UNESCO id, in priority order
static WHS_INFOBOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(?i:infobox[ _]+world[ _]+heritage[ _]+site)").unwrap());
static SITE_INFOBOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(?i:infobox[ _]+(?:historic[ _]+site|protected[ _]+area))").unwrap()
});
static ID_PARAM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|\s*ID\s*=[ \t]*(\d+)[a-z]*").unwrap());
static REFNUM_PARAM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|\s*refnum\s*=[ \t]*(\d+)[a-z]*").unwrap());
static WHS_NUMBER_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*whs_number\s*=[ \t]*(\d+)[a-z]*").unwrap());
static DESIGNATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*designation(\d+)\s*=\s*([^|\n}]*)").unwrap());
static DESIGNATION_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\|\s*designation(\d+)_number\s*=[ \t]*(?:\[\S+\s+)?(\d+)[a-z]*").unwrap()
});

/// Marker opening the header cell of a site row in the list articles
pub const ROW_MARKER: &str = "! scope=\"row\"";

/// Link namespaces that never point at a site article
const SKIP_LINK_PREFIXES: &[&str] = &["file:", "image:", "category:"];

/// One scraped row of a list article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Display name of the site
    pub name: String,
    /// Link targets found in the name cell, first occurrence order
    pub titles: Vec<String>,
}

/// Wikitext scraper
pub struct WikiParser;

impl WikiParser {
    /// Check if text is a redirect page
    pub fn is_redirect(text: &str) -> bool {
        REDIRECT_RE.is_match(text)
    }

    /// Extract redirect target from redirect text, without any `#section`
    pub fn redirect_target(text: &str) -> Option<String> {
        let marker = REDIRECT_RE.find(text)?;
        let caps = LINK_RE.captures(&text[marker.end()..])?;
        let target = strip_section(&caps[1]);
        if target.is_empty() {
            None
        } else {
            Some(target.to_string())
        }
    }

    /// Extract the UNESCO id number from an article's markup.
    ///
    /// Empty markup and redirect pages are caller errors; `Ok(None)` means
    /// none of the known infobox shapes is present.
    pub fn extract_id_number(text: &str) -> Result<Option<u32>> {
        if text.trim().is_empty() {
            return Err(Error::EmptyMarkup);
        }
        if Self::is_redirect(text) {
            return Err(Error::RedirectPage {
                target: Self::redirect_target(text),
            });
        }

        let text = COMMENT_RE.replace_all(text, "");

        let id = infobox_number(&WHS_INFOBOX_RE, &ID_PARAM_RE, &text)
            .or_else(|| infobox_number(&WHS_INFOBOX_RE, &REFNUM_PARAM_RE, &text))
            .or_else(|| designation_number(&text))
            .or_else(|| infobox_number(&SITE_INFOBOX_RE, &WHS_NUMBER_PARAM_RE, &text));
        Ok(id)
    }

    /// Scrape every site row of a list article
    pub fn parse_table(text: &str) -> Vec<TableRow> {
        text.lines().filter_map(Self::parse_table_row).collect()
    }

    /// Scrape one line; `None` unless it is a site row with at least one link
    pub fn parse_table_row(line: &str) -> Option<TableRow> {
        let rest = line.trim_start().strip_prefix(ROW_MARKER)?;
        // Skip cell attributes up to the separator
        let (_, cell) = rest.split_once('|')?;

        let cell = Self::strip_decorations(cell);

        let mut titles: Vec<String> = Vec::new();
        for caps in LINK_RE.captures_iter(&cell) {
            let target = caps[1].trim();
            if is_skipped_link(target) {
                continue;
            }
            let target = strip_section(target);
            if !target.is_empty() && !titles.iter().any(|t| t == target) {
                titles.push(target.to_string());
            }
        }
        if titles.is_empty() {
            return None;
        }

        let name = LINK_RE.replace_all(&cell, |caps: &regex::Captures| {
            let target = caps[1].trim();
            if is_skipped_link(target) {
                return String::new();
            }
            match caps.get(2) {
                Some(label) => label.as_str().to_string(),
                None => strip_section(target).to_string(),
            }
        });
        let name = MULTI_SPACE_RE.replace_all(&name, " ").trim().to_string();
        if name.is_empty() {
            return None;
        }

        Some(TableRow { name, titles })
    }

    /// Remove the decorative syntax of a table cell, keeping wikilinks
    pub fn strip_decorations(cell: &str) -> String {
        let mut result = COMMENT_RE.replace_all(cell, "").to_string();
        result = REF_RE.replace_all(&result, "").to_string();
        result = REF_SELF_RE.replace_all(&result, "").to_string();
        result = BR_RE.replace_all(&result, " ").to_string();
        result = HTML_RE.replace_all(&result, "").to_string();

        // Innermost templates unwrap first, so repeat until nested ones are gone
        loop {
            let mut next = SORT_RE.replace_all(&result, "$1").to_string();
            next = NOWRAP_RE.replace_all(&next, "$1").to_string();
            next = SMALL_RE.replace_all(&next, "").to_string();
            if next == result {
                break;
            }
            result = next;
        }
        result = TEMPLATE_RE.replace_all(&result, "").to_string();

        // Remove bold/italic markup
        result.replace("'''", "").replace("''", "")
    }
}

fn strip_section(target: &str) -> &str {
    match target.find('#') {
        Some(pos) => target[..pos].trim(),
        None => target.trim(),
    }
}

fn is_skipped_link(target: &str) -> bool {
    let lower = target.trim_start_matches(':').to_lowercase();
    SKIP_LINK_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Text of a template from its opening `{{` up to the matching `}}`
fn template_body(text: &str, start: usize) -> &str {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < bytes.len() {
        match &bytes[i..i + 2] {
            b"{{" => {
                depth += 1;
                i += 2;
            }
            b"}}" => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return &text[start..i];
                }
            }
            _ => i += 1,
        }
    }
    // Unclosed template runs to the end of the article
    &text[start..]
}

/// First `param` number inside any template opened by `infobox`
fn infobox_number(infobox: &Regex, param: &Regex, text: &str) -> Option<u32> {
    infobox.find_iter(text).find_map(|m| {
        let body = template_body(text, m.start());
        param.captures(body).and_then(|caps| caps[1].parse().ok())
    })
}

/// `designationN = WHS` paired with its `designationN_number`
fn designation_number(text: &str) -> Option<u32> {
    let whs_slots: Vec<String> = DESIGNATION_RE
        .captures_iter(text)
        .filter(|caps| {
            let value = caps[2].trim().to_lowercase();
            value.starts_with("whs") || value.contains("world heritage")
        })
        .map(|caps| caps[1].to_string())
        .collect();

    DESIGNATION_NUMBER_RE
        .captures_iter(text)
        .find(|caps| whs_slots.iter().any(|slot| slot == &caps[1]))
        .and_then(|caps| caps[2].parse().ok())
}
