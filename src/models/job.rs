use chrono::{DateTime, Utc};

/// Format used by every source for posting timestamps.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A normalized job posting, independent of the board it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobItem {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub posted_date: Option<DateTime<Utc>>,
    pub expired_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    /// Always present; empty when the source had no requirement text.
    pub requirement: String,
    pub career_level: Option<String>,
    pub year_experience_min: Option<i64>,
    pub year_experience_max: Option<i64>,
    pub currency: Option<String>,
    pub salary: Option<String>,
    pub remote: Option<bool>,
    pub source: String,
    pub url: String,
}

#[cfg(test)]
impl JobItem {
    /// Export the record as a raw field map, the same shape collectors produce.
    pub fn to_raw_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        use serde_json::{Map, Value};

        let mut m = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(v) = value {
                m.insert(key.to_string(), v);
            }
        };
        let text = |s: &Option<String>| s.clone().map(Value::String);
        let date = |d: &Option<DateTime<Utc>>| d.map(|d| Value::String(d.format(DATE_FORMAT).to_string()));

        put("id", Some(Value::String(self.id.clone())));
        put("title", text(&self.title));
        put("description", text(&self.description));
        put("company", text(&self.company));
        put("posted_date", date(&self.posted_date));
        put("expired_date", date(&self.expired_date));
        put("location", text(&self.location));
        put("type", text(&self.job_type));
        put("requirement", Some(Value::String(self.requirement.clone())));
        put("career_level", text(&self.career_level));
        put("year_experience_min", self.year_experience_min.map(Value::from));
        put("year_experience_max", self.year_experience_max.map(Value::from));
        put("currency", text(&self.currency));
        put("salary", text(&self.salary));
        put("remote", self.remote.map(Value::Bool));
        put("source", Some(Value::String(self.source.clone())));
        put("url", Some(Value::String(self.url.clone())));
        m
    }
}
