// Job board collectors.
// Each source is a fixed set of endpoints and payload mappings; the runner
// drives pagination, filtering and detail fetches for all of them.

pub mod dealls;
pub mod jobstreet;
pub mod runner;

use serde_json::Value;

use crate::http::HttpRequest;
use crate::models::PageSizing;
use crate::normalize::RawFields;

/// One entry of a list page, before its detail fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    /// Slug or key used to build the detail request.
    pub detail_key: Option<String>,
    /// List-level fields the detail response does not repeat.
    pub context: RawFields,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub total: u64,
    pub entries: Vec<ListEntry>,
}

/// Endpoints and payload mappings of a single job board.
///
/// All parsing is total: missing keys or wrong types yield empty values,
/// never errors.
pub trait JobSource: Send + Sync {
    /// Name used on the command line and stamped on every posting.
    fn name(&self) -> &str;

    fn page_sizing(&self) -> PageSizing;

    /// The only category whose postings are fetched.
    fn required_category(&self) -> &str;

    fn list_request(&self, page: u32, page_size: u32) -> HttpRequest;

    fn parse_list(&self, body: &Value) -> ListPage;

    fn detail_request(&self, entry: &ListEntry) -> HttpRequest;

    /// Raw fields of a posting, `None` when the body has no posting object.
    fn parse_detail(&self, body: &Value, entry: &ListEntry) -> Option<RawFields>;

    fn is_closed(&self, body: &Value) -> bool;

    /// Exact, case-sensitive match against [`JobSource::required_category`].
    fn category_matches(&self, entry: &ListEntry) -> bool {
        entry.category.as_deref() == Some(self.required_category())
    }
}

pub fn known_sources() -> &'static [&'static str] {
    &["dealls", "jobstreet"]
}

pub fn get_collector(name: &str) -> Option<Box<dyn JobSource>> {
    match name {
        "dealls" => Some(Box::new(dealls::Dealls)),
        "jobstreet" => Some(Box::new(jobstreet::JobStreet)),
        _ => None,
    }
}

/// Walk `path` through nested objects.
pub(crate) fn pointer<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

/// String (or number rendered as text) at `path`.
pub(crate) fn str_at(value: &Value, path: &[&str]) -> Option<String> {
    match pointer(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
