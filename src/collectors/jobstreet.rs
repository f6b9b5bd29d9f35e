use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::collectors::{JobSource, ListEntry, ListPage, pointer, str_at};
use crate::http::HttpRequest;
use crate::models::PageSizing;
use crate::normalize::RawFields;

const SEARCH_URL: &str = "https://jobsearch-api-ts.cloud.seek.com.au/v5/search";
const GRAPHQL_URL: &str = "https://id.jobstreet.com/graphql";
const PUBLIC_URL: &str = "https://id.jobstreet.com/id/job";
const SITE_KEY: &str = "ID-Main";
const LOCALE: &str = "en-ID";
const CATEGORY: &str = "Information & Communication Technology";
const PAGE_SIZE: u32 = 100;

const JOB_DETAILS_QUERY: &str = "query GetJobDetails($jobId: ID!, $jobDetailsViewedCorrelationId: String!, $sessionId: String!, $locale: Locale!) { jobDetails( id: $jobId tracking: {channel: \"WEB\", jobDetailsViewedCorrelationId: $jobDetailsViewedCorrelationId, sessionId: $sessionId} ) { job { id title abstract content(platform: WEB) advertiser { name(locale: $locale) } location { label(locale: $locale, type: LONG) } workTypes { label(locale: $locale) } salary { label } isExpired } } }";

/// JobStreet Indonesia: SEEK search API for listings, GraphQL for details.
pub struct JobStreet;

impl JobSource for JobStreet {
    fn name(&self) -> &str {
        "jobstreet"
    }

    fn page_sizing(&self) -> PageSizing {
        PageSizing {
            default: PAGE_SIZE,
            cap: None,
        }
    }

    fn required_category(&self) -> &str {
        CATEGORY
    }

    fn list_request(&self, page: u32, page_size: u32) -> HttpRequest {
        HttpRequest::get(SEARCH_URL)
            .header("Accept", "application/json")
            .query("siteKey", SITE_KEY)
            .query("pageSize", page_size)
            .query("page", page)
            .query("sortMode", "ListedDate")
    }

    fn parse_list(&self, body: &Value) -> ListPage {
        let total = body.get("totalCount").and_then(Value::as_u64).unwrap_or(0);
        let entries = body
            .get("data")
            .and_then(Value::as_array)
            .map(|jobs| jobs.iter().map(parse_entry).collect())
            .unwrap_or_default();
        ListPage { total, entries }
    }

    fn detail_request(&self, entry: &ListEntry) -> HttpRequest {
        let payload = json!({
            "operationName": "GetJobDetails",
            "variables": {
                "jobId": entry.id.as_deref().unwrap_or_default(),
                "jobDetailsViewedCorrelationId": Uuid::new_v4().to_string(),
                "sessionId": Uuid::new_v4().to_string(),
                "locale": LOCALE,
            },
            "query": JOB_DETAILS_QUERY,
        });
        HttpRequest::post_json(GRAPHQL_URL, payload).header("Accept", "application/json")
    }

    fn parse_detail(&self, body: &Value, entry: &ListEntry) -> Option<RawFields> {
        let job = posting(body)?;
        let mut m = Map::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                m.insert(key.to_string(), Value::String(v));
            }
        };

        let id = entry.id.clone().unwrap_or_default();
        put("title", str_at(job, &["title"]));
        put("description", str_at(job, &["abstract"]));
        put("company", str_at(job, &["advertiser", "name"]));
        put("location", str_at(job, &["location", "label"]));
        put("type", str_at(job, &["workTypes", "label"]));
        put("requirement", str_at(job, &["content"]));
        put("salary", str_at(job, &["salary", "label"]));
        put("source", Some(self.name().to_string()));
        put("url", Some(format!("{PUBLIC_URL}/{id}")));
        put("id", Some(id));

        // Carried over from the list entry
        for (key, value) in &entry.context {
            m.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Some(m)
    }

    fn is_closed(&self, body: &Value) -> bool {
        posting(body)
            .and_then(|job| job.get("isExpired"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn parse_entry(job: &Value) -> ListEntry {
    let category = job
        .get("classifications")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| str_at(c, &["classification", "description"]));

    let mut context = RawFields::new();
    if let Some(listed) = str_at(job, &["listingDate"]) {
        context.insert("posted_date".to_string(), Value::String(listed));
    }

    let id = str_at(job, &["id"]).filter(|s| !s.is_empty());
    ListEntry {
        detail_key: id.clone(),
        id,
        title: str_at(job, &["title"]),
        category,
        context,
    }
}

fn posting(body: &Value) -> Option<&Value> {
    pointer(body, &["data", "jobDetails", "job"])
        .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::normalize::normalize;

    fn entry() -> ListEntry {
        JobStreet
            .parse_list(&json!({
                "totalCount": 1,
                "data": [{
                    "id": "81234567",
                    "title": "Rust Developer",
                    "listingDate": "2024-01-05T10:00:00Z",
                    "classifications": [
                        { "classification": { "description": "Information & Communication Technology" } }
                    ]
                }]
            }))
            .entries
            .remove(0)
    }

    #[test]
    fn list_request_parameters() {
        assert_eq!(
            JobStreet.list_request(2, 50).full_url(),
            "https://jobsearch-api-ts.cloud.seek.com.au/v5/search?siteKey=ID-Main&pageSize=50&page=2&sortMode=ListedDate"
        );
    }

    #[test]
    fn parses_list_entry() {
        let e = entry();
        assert_eq!(e.id.as_deref(), Some("81234567"));
        assert_eq!(e.category.as_deref(), Some(CATEGORY));
        assert!(JobStreet.category_matches(&e));
        assert_eq!(
            e.context.get("posted_date"),
            Some(&Value::String("2024-01-05T10:00:00Z".into()))
        );
    }

    #[test]
    fn missing_classification_has_no_category() {
        let page = JobStreet.parse_list(&json!({
            "totalCount": 2,
            "data": [{ "id": "1", "classifications": [] }, { "id": 2 }]
        }));
        assert_eq!(page.total, 2);
        assert!(page.entries.iter().all(|e| e.category.is_none()));
        assert_eq!(page.entries[1].id.as_deref(), Some("2"));
    }

    #[test]
    fn detail_request_is_graphql_post() {
        let req = JobStreet.detail_request(&entry());
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.url, GRAPHQL_URL);
        let body = req.body.expect("payload");
        assert_eq!(body["operationName"], "GetJobDetails");
        assert_eq!(body["variables"]["jobId"], "81234567");
        assert_eq!(body["variables"]["locale"], "en-ID");
        assert_ne!(
            body["variables"]["sessionId"],
            body["variables"]["jobDetailsViewedCorrelationId"]
        );
    }

    #[test]
    fn maps_detail_with_list_context() {
        let body = json!({ "data": { "jobDetails": { "job": {
            "id": "81234567",
            "title": "Rust Developer",
            "abstract": "Great <b>team</b>",
            "content": "<ul><li>3 years Rust.</li></ul>",
            "advertiser": { "name": "Seek Co" },
            "location": { "label": "Jakarta Raya" },
            "workTypes": { "label": "Full time" },
            "salary": { "label": "" },
            "isExpired": false
        }}}});
        let item = normalize(&JobStreet.parse_detail(&body, &entry()).expect("posting"));
        assert_eq!(item.id, "81234567");
        assert_eq!(item.description.as_deref(), Some("Great team"));
        assert_eq!(item.company.as_deref(), Some("Seek Co"));
        assert_eq!(item.location.as_deref(), Some("Jakarta Raya"));
        assert_eq!(item.job_type.as_deref(), Some("Full time"));
        assert_eq!(item.requirement, "3 years Rust.");
        assert!(item.salary.is_none());
        assert!(item.posted_date.is_some());
        assert_eq!(item.url, "https://id.jobstreet.com/id/job/81234567");
        assert_eq!(item.source, "jobstreet");
    }

    #[test]
    fn expired_flag() {
        let expired = json!({ "data": { "jobDetails": { "job": { "id": "1", "isExpired": true } } } });
        assert!(JobStreet.is_closed(&expired));
        assert!(!JobStreet.is_closed(&json!({ "data": { "jobDetails": null } })));
        assert!(JobStreet.parse_detail(&json!({ "data": {} }), &entry()).is_none());
    }
}
