use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::collectors;
use crate::error::AppError;
use crate::notify::telegram::TelegramCredentials;

#[derive(Parser, Debug, Clone)]
#[command(name = "job-notif", about = "Crawl job boards and send new postings to Telegram")]
pub struct Config {
    /// Sources to crawl, comma separated (defaults to every known source)
    #[arg(long = "source", env = "JOB_SOURCES", value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Items requested per list page
    #[arg(long)]
    pub limit: Option<u32>,

    /// Number of postings to acquire per source (0 or unset: all available)
    #[arg(long)]
    pub required: Option<u32>,

    /// Delay between two requests to the same source, in milliseconds
    #[arg(long, env = "DOWNLOAD_DELAY_MS", default_value = "1000")]
    pub delay_ms: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Repeat the crawl every N seconds until interrupted
    #[arg(long, env = "CRAWL_INTERVAL_SECS")]
    pub interval_secs: Option<u64>,

    #[arg(long, env = "TELEGRAM_CHAT_ID", hide_env_values = true)]
    pub telegram_chat_id: Option<String>,

    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    /// Base URL of the Telegram Bot API
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = "https://api.telegram.org")]
    pub telegram_api_base: String,

    /// Also write logs to a timestamped file in this directory
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Chat id and bot token, or `None` when either one is missing or blank.
    pub fn telegram_credentials(&self) -> Option<TelegramCredentials> {
        let chat_id = self.telegram_chat_id.as_deref().map(str::trim)?;
        let bot_token = self.telegram_bot_token.as_deref().map(str::trim)?;
        if chat_id.is_empty() || bot_token.is_empty() {
            return None;
        }
        Some(TelegramCredentials {
            chat_id: chat_id.to_string(),
            bot_token: bot_token.to_string(),
        })
    }

    /// Requested source names, defaulting to every registered source.
    /// Fails on the first name that has no collector.
    pub fn resolved_sources(&self) -> Result<Vec<String>, AppError> {
        let requested: Vec<String> = self
            .sources
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if requested.is_empty() {
            return Ok(collectors::known_sources()
                .iter()
                .map(|s| s.to_string())
                .collect());
        }

        for name in &requested {
            if collectors::get_collector(name).is_none() {
                return Err(AppError::UnknownSource(format!(
                    "{name} (known sources: {})",
                    collectors::known_sources().join(", ")
                )));
            }
        }
        Ok(requested)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
