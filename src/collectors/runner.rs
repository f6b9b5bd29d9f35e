use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use crate::collectors::{JobSource, ListEntry, ListPage};
use crate::http::{HttpClient, Throttle};
use crate::models::CrawlState;
use crate::normalize::normalize;
use crate::notify::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// List page could not be fetched (fault or non-success status).
    ListFailed,
    /// Source reported zero available postings.
    NoJobs,
    /// A list page came back empty.
    Exhausted,
    QuotaReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub state: CrawlState,
    pub stop: StopReason,
}

/// What to do with one list page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub state: CrawlState,
    /// Entries to fetch details for, in list order.
    pub fetch: Vec<ListEntry>,
    /// `None` when the next page should be requested.
    pub stop: Option<StopReason>,
}

/// Decide the fate of a list page without touching the network.
///
/// Acquisitions are counted here, at issuance, so the quota holds even
/// when a detail fetch later fails or the posting turns out closed.
pub fn plan_page(source: &dyn JobSource, state: CrawlState, page: &ListPage) -> PagePlan {
    if page.total == 0 {
        tracing::info!("No jobs found");
        return PagePlan {
            state,
            fetch: Vec::new(),
            stop: Some(StopReason::NoJobs),
        };
    }

    let mut state = state.with_available(page.total);
    tracing::info!(
        "Available jobs: {}, required jobs: {}",
        state.available_jobs,
        state.required_jobs
    );

    if page.entries.is_empty() {
        tracing::info!(
            "Jobs are exhausted on page {}, {} acquired in total",
            state.current_page,
            state.acquired_jobs
        );
        return PagePlan {
            state,
            fetch: Vec::new(),
            stop: Some(StopReason::Exhausted),
        };
    }

    let mut fetch = Vec::new();
    for entry in &page.entries {
        let Some(id) = entry.id.as_deref() else {
            tracing::warn!("Job ID not found, skipping job");
            continue;
        };

        if !source.category_matches(entry) {
            tracing::info!(
                "Skipping job {} due to category: {:?}",
                entry.title.as_deref().unwrap_or(id),
                entry.category
            );
            continue;
        }

        tracing::info!("Fetching details for job ID: {id}");
        fetch.push(entry.clone());
        state = state.acquire();
        if state.quota_reached() {
            tracing::info!("Required jobs acquired: {}. Stopping", state.acquired_jobs);
            return PagePlan {
                state,
                fetch,
                stop: Some(StopReason::QuotaReached),
            };
        }
    }

    PagePlan {
        state,
        fetch,
        stop: None,
    }
}

/// Drives one source from page 1 until a stop condition fires.
pub struct Crawler {
    http: Arc<dyn HttpClient>,
    notifier: Arc<dyn Notifier>,
    delay: Duration,
}

impl Crawler {
    pub fn new(http: Arc<dyn HttpClient>, notifier: Arc<dyn Notifier>, delay: Duration) -> Self {
        Self {
            http,
            notifier,
            delay,
        }
    }

    pub async fn run(
        &self,
        source: &dyn JobSource,
        limit: Option<u32>,
        required: Option<u32>,
    ) -> CrawlOutcome {
        let span = tracing::info_span!("crawl", source = source.name());
        self.crawl(source, limit, required).instrument(span).await
    }

    async fn crawl(
        &self,
        source: &dyn JobSource,
        limit: Option<u32>,
        required: Option<u32>,
    ) -> CrawlOutcome {
        let mut throttle = Throttle::new(self.delay);
        let mut state = CrawlState::new(limit, required, source.page_sizing());

        loop {
            throttle.wait().await;
            let Some(page) = self.fetch_list(source, &state).await else {
                return CrawlOutcome {
                    state,
                    stop: StopReason::ListFailed,
                };
            };

            let plan = plan_page(source, state, &page);
            state = plan.state;

            for entry in &plan.fetch {
                throttle.wait().await;
                self.fetch_detail(source, entry).await;
            }

            if let Some(stop) = plan.stop {
                return CrawlOutcome { state, stop };
            }

            state = state.next_page();
            tracing::info!("Fetching next page: {}", state.current_page);
        }
    }

    async fn fetch_list(&self, source: &dyn JobSource, state: &CrawlState) -> Option<ListPage> {
        let request = source.list_request(state.current_page, state.page_limit);
        let resp = match self.http.send(&request).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Failed to fetch page {}: {e}", state.current_page);
                return None;
            }
        };
        if !resp.is_success() {
            tracing::error!("Failed to fetch data: {}", resp.status);
            return None;
        }
        let Some(body) = resp.json() else {
            tracing::warn!("List page {} is not valid JSON", state.current_page);
            return Some(ListPage::default());
        };
        Some(source.parse_list(&body))
    }

    /// Fetch, normalize and dispatch one posting. Failures drop the item only.
    async fn fetch_detail(&self, source: &dyn JobSource, entry: &ListEntry) {
        let id = entry.id.as_deref().unwrap_or_default();
        let resp = match self.http.send(&source.detail_request(entry)).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Failed to fetch job details ({id}): {e}");
                return;
            }
        };
        if !resp.is_success() {
            tracing::error!("Failed to fetch job details ({id}): {}", resp.status);
            return;
        }
        let Some(body) = resp.json() else {
            tracing::warn!("Job details ({id}) are not valid JSON");
            return;
        };

        if source.is_closed(&body) {
            tracing::info!("Job ID {id} is closed, skipping");
            return;
        }
        let Some(raw) = source.parse_detail(&body, entry) else {
            tracing::warn!("Job details not found ({id})");
            return;
        };

        let item = normalize(&raw);
        self.notifier.dispatch(&item).await;
        tracing::info!("Job ID {id} details processed");
    }
}
