use serde_json::{Map, Value};

use crate::collectors::{JobSource, ListEntry, ListPage, pointer, str_at};
use crate::http::HttpRequest;
use crate::models::PageSizing;
use crate::normalize::RawFields;

const LIST_URL: &str = "https://api.sejutacita.id/v1/explore-job/job";
const DETAIL_URL: &str = "https://api.sejutacita.id/v1/job-portal/job/slug";
const PUBLIC_URL: &str = "https://dealls.com/loker";
const CATEGORY: &str = "it-and-engineering";
const PAGE_SIZE: u32 = 20;

/// Dealls (sejutacita.id) job portal.
pub struct Dealls;

impl JobSource for Dealls {
    fn name(&self) -> &str {
        "dealls"
    }

    fn page_sizing(&self) -> PageSizing {
        PageSizing {
            default: PAGE_SIZE,
            cap: Some(PAGE_SIZE),
        }
    }

    fn required_category(&self) -> &str {
        CATEGORY
    }

    fn list_request(&self, page: u32, page_size: u32) -> HttpRequest {
        HttpRequest::get(LIST_URL)
            .header("Accept", "application/json")
            .query("page", page)
            .query("limit", page_size)
    }

    fn parse_list(&self, body: &Value) -> ListPage {
        let total = pointer(body, &["data", "totalDocs"])
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let entries = pointer(body, &["data", "docs"])
            .and_then(Value::as_array)
            .map(|docs| docs.iter().map(parse_entry).collect())
            .unwrap_or_default();
        ListPage { total, entries }
    }

    fn detail_request(&self, entry: &ListEntry) -> HttpRequest {
        let slug = entry.detail_key.as_deref().unwrap_or_default();
        HttpRequest::get(format!("{DETAIL_URL}/{slug}")).header("Accept", "application/json")
    }

    fn parse_detail(&self, body: &Value, _entry: &ListEntry) -> Option<RawFields> {
        let job = posting(body)?;
        let mut m = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(v) = value {
                m.insert(key.to_string(), v);
            }
        };
        let text = |path: &[&str]| str_at(job, path).map(Value::String);

        put("id", text(&["id"]));
        put("title", text(&["role"]));
        put("description", text(&["description"]));
        put(
            "posted_date",
            str_at(job, &["publishedAt"]).map(|s| Value::String(to_second_precision(&s))),
        );
        put("company", text(&["company", "name"]));
        put("location", location(job).map(Value::String));
        put("type", pointer(job, &["employmentTypes"]).cloned());
        put("requirement", text(&["requirements"]));
        put("salary", salary(job).map(Value::String));
        put(
            "remote",
            Some(Value::Bool(
                str_at(job, &["workplaceType"]).as_deref() == Some("remote"),
            )),
        );
        put("source", Some(Value::String(self.name().to_string())));

        let slug = str_at(job, &["slug"]).unwrap_or_default();
        let company_slug = str_at(job, &["company", "slug"]).unwrap_or_default();
        put(
            "url",
            Some(Value::String(format!("{PUBLIC_URL}/{slug}~{company_slug}"))),
        );

        Some(m)
    }

    fn is_closed(&self, body: &Value) -> bool {
        posting(body)
            .and_then(|job| job.get("closed"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn parse_entry(doc: &Value) -> ListEntry {
    ListEntry {
        id: str_at(doc, &["id"]).filter(|s| !s.is_empty()),
        title: str_at(doc, &["title"]),
        category: str_at(doc, &["categorySlug"]),
        detail_key: str_at(doc, &["slug"]),
        context: RawFields::new(),
    }
}

/// The posting object, absent when missing or empty.
fn posting(body: &Value) -> Option<&Value> {
    pointer(body, &["data", "result"]).filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
}

/// `2024-01-05T10:00:00.000Z` to `2024-01-05T10:00:00Z`.
fn to_second_precision(timestamp: &str) -> String {
    let base = timestamp.split('.').next().unwrap_or_default();
    let base = base.strip_suffix('Z').unwrap_or(base);
    format!("{base}Z")
}

fn location(job: &Value) -> Option<String> {
    let city = str_at(job, &["location", "city", "name"]).filter(|s| !s.is_empty());
    let country = str_at(job, &["location", "country", "name"]).filter(|s| !s.is_empty());
    match (city, country) {
        (Some(city), Some(country)) => Some(format!("{city}, {country}")),
        _ => None,
    }
}

fn salary(job: &Value) -> Option<String> {
    let bound = |key: &str| {
        pointer(job, &["salaryRange", key])
            .filter(|v| !is_zero_or_blank(v))
            .and_then(|v| match v {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
    };
    match (bound("start"), bound("end")) {
        (Some(start), Some(end)) => Some(format!("Rp {start} - {end}")),
        _ => None,
    }
}

fn is_zero_or_blank(v: &Value) -> bool {
    match v {
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Null => true,
        _ => false,
    }
}
