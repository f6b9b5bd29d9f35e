//! Raw field map to [`JobItem`].
//!
//! Collectors hand over loosely shaped JSON maps. Every field here is
//! single-valued: when a key holds an array only its first non-empty
//! element is kept. Nothing in this module fails; malformed input simply
//! leaves the field empty.

use chrono::{DateTime, NaiveDateTime, Utc};
use scraper::Html;
use serde_json::{Map, Value};

use crate::models::JobItem;
use crate::models::job::DATE_FORMAT;

pub type RawFields = Map<String, Value>;

const REQUIREMENT_MAX_CHARS: usize = 500;
const ELLIPSIS: &str = "...";

pub fn normalize(raw: &RawFields) -> JobItem {
    JobItem {
        id: text(raw, "id").unwrap_or_default(),
        title: text(raw, "title"),
        description: text(raw, "description")
            .map(|s| html_to_text(&s))
            .filter(|s| !s.is_empty()),
        company: text(raw, "company"),
        posted_date: date(raw, "posted_date"),
        expired_date: date(raw, "expired_date"),
        location: text(raw, "location"),
        job_type: text(raw, "type"),
        requirement: text(raw, "requirement")
            .map(|s| truncate(&break_sentences(&html_to_text(&s)), REQUIREMENT_MAX_CHARS))
            .unwrap_or_default(),
        career_level: text(raw, "career_level"),
        year_experience_min: integer(raw, "year_experience_min"),
        year_experience_max: integer(raw, "year_experience_max"),
        currency: text(raw, "currency"),
        salary: text(raw, "salary"),
        remote: take_first(raw.get("remote")).and_then(Value::as_bool),
        source: text(raw, "source").unwrap_or_default(),
        url: text(raw, "url").unwrap_or_default(),
    }
}

/// First value that is neither null nor an empty string.
fn take_first(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Array(values) => values.iter().find(|v| !is_blank(v)),
        v if is_blank(v) => None,
        v => Some(v),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

fn text(raw: &RawFields, key: &str) -> Option<String> {
    match take_first(raw.get(key))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer(raw: &RawFields, key: &str) -> Option<i64> {
    match take_first(raw.get(key))? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn date(raw: &RawFields, key: &str) -> Option<DateTime<Utc>> {
    match take_first(raw.get(key))? {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, DATE_FORMAT)
        .ok()
        .map(|d| d.and_utc())
}

/// Visible text of an HTML fragment with whitespace runs collapsed.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let joined = fragment.root_element().text().collect::<String>();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Put a line break after every period.
fn break_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '.' {
            out.push('\n');
            if chars.peek() == Some(&' ') {
                chars.next();
            }
        }
    }
    out.trim_end().to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(ELLIPSIS);
    out
}
