use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::http::{HttpClient, HttpRequest};
use crate::models::JobItem;
use crate::notify::Notifier;

const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub chat_id: String,
    pub bot_token: String,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

pub struct TelegramNotifier {
    http: Arc<dyn HttpClient>,
    credentials: Option<TelegramCredentials>,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new(
        http: Arc<dyn HttpClient>,
        credentials: Option<TelegramCredentials>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, credentials: &TelegramCredentials, text: &str) -> HttpRequest {
        let payload = SendMessage {
            chat_id: &credentials.chat_id,
            text,
            parse_mode: "Markdown",
        };
        HttpRequest::post_json(
            format!("{}/bot{}/sendMessage", self.api_base, credentials.bot_token),
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn dispatch(&self, item: &JobItem) {
        let Some(credentials) = &self.credentials else {
            tracing::error!("Telegram chat ID or bot token is not set");
            return;
        };
        if item.id.is_empty() {
            tracing::warn!("Posting without an id, not sending: {:?}", item.title);
            return;
        }

        let text = format_message(item);
        match self.http.send(&self.request(credentials, &text)).await {
            Ok(resp) if resp.is_success() => {
                tracing::info!(
                    "Job notification sent: ({}) {}, {} - {}",
                    item.id,
                    or_placeholder(&item.title),
                    or_placeholder(&item.company),
                    or_placeholder(&item.location)
                );
            }
            Ok(resp) => {
                tracing::error!(
                    "Failed to send job notification ({}): {} - {}",
                    item.id,
                    resp.status,
                    resp.body
                );
            }
            Err(e) => {
                tracing::error!("Error sending job notification ({}): {e}", item.id);
            }
        }
    }
}

fn or_placeholder(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(PLACEHOLDER)
}

/// Markdown message body for one posting.
pub fn format_message(item: &JobItem) -> String {
    let posted = item
        .posted_date
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let requirement = if item.requirement.is_empty() {
        PLACEHOLDER
    } else {
        item.requirement.as_str()
    };
    let url = if item.url.is_empty() {
        PLACEHOLDER
    } else {
        item.url.as_str()
    };

    format!(
        "*New Job Posting*\n\n\
         Title: {}\n\
         Company: {}\n\
         Location: {}\n\
         Salary: {}\n\
         Posted Date: {posted}\n\
         Description:\n{}\n\
         Requirement:\n{requirement}\n\
         Source: {}\n\
         URL: {url}",
        or_placeholder(&item.title),
        or_placeholder(&item.company),
        or_placeholder(&item.location),
        or_placeholder(&item.salary),
        or_placeholder(&item.description),
        item.source,
    )
}
