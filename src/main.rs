mod collectors;
mod config;
mod error;
mod http;
mod logging;
mod models;
mod normalize;
mod notify;
#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::task::JoinSet;

use crate::collectors::get_collector;
use crate::collectors::runner::Crawler;
use crate::config::Config;
use crate::http::{HttpClient, ReqwestClient};
use crate::notify::Notifier;
use crate::notify::telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    let _log_guard = logging::init(config.log_dir.as_deref())?;

    let sources = config.resolved_sources()?;

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(config.timeout())?);
    let credentials = config.telegram_credentials();
    if credentials.is_none() {
        tracing::warn!("Telegram credentials are not configured, postings will not be delivered");
    }
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        http.clone(),
        credentials,
        config.telegram_api_base.clone(),
    ));
    let crawler = Arc::new(Crawler::new(http, notifier, config.delay()));

    let Some(interval) = config.interval_secs else {
        crawl_all(&crawler, &sources, &config).await;
        return Ok(());
    };

    tracing::info!(
        "Crawling {} every {interval}s",
        sources.join(", ")
    );
    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received, exiting gracefully");
                break;
            }
            _ = async {
                crawl_all(&crawler, &sources, &config).await;
                tokio::time::sleep(Duration::from_secs(interval)).await;
            } => {}
        }
    }

    Ok(())
}

/// One pass over every source, each on its own task.
async fn crawl_all(crawler: &Arc<Crawler>, sources: &[String], config: &Config) {
    let mut tasks = JoinSet::new();
    for name in sources {
        let Some(source) = get_collector(name) else {
            tracing::error!("Unknown collector: {name}");
            continue;
        };
        let crawler = Arc::clone(crawler);
        let (limit, required) = (config.limit, config.required);
        let name = name.clone();
        tasks.spawn(async move {
            let outcome = crawler.run(source.as_ref(), limit, required).await;
            (name, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, outcome)) => tracing::info!(
                "Crawl of '{name}' finished ({:?}): {} acquired, {} required, {} available",
                outcome.stop,
                outcome.state.acquired_jobs,
                outcome.state.required_jobs,
                outcome.state.available_jobs
            ),
            Err(e) => tracing::error!("Crawl task failed: {e}"),
        }
    }
}
