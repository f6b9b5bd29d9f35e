/// Progress of one crawl over one source.
///
/// Transitions consume the state and return the next one, so the
/// orchestrator never mutates counters in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlState {
    /// Total reported by the source, 0 until the first list page arrives.
    pub available_jobs: u64,
    /// Detail fetches issued so far.
    pub acquired_jobs: u64,
    /// Quota for this run; 0 means "whatever the source has".
    pub required_jobs: u64,
    pub page_limit: u32,
    /// 1-based page cursor.
    pub current_page: u32,
}

/// How a source sizes its list pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizing {
    pub default: u32,
    pub cap: Option<u32>,
}

impl CrawlState {
    /// Resolve operator inputs into the initial state.
    ///
    /// With both inputs the page is large enough to fill the quota in one go;
    /// a lone `limit` is clamped to the source cap.
    pub fn new(limit: Option<u32>, required: Option<u32>, sizing: PageSizing) -> Self {
        let page_limit = match (limit, required) {
            (Some(limit), Some(required)) => limit.max(required),
            (Some(limit), None) => match sizing.cap {
                Some(cap) => limit.min(cap),
                None => limit,
            },
            (None, _) => sizing.default,
        };
        Self {
            available_jobs: 0,
            acquired_jobs: 0,
            required_jobs: required.map(u64::from).unwrap_or(0),
            page_limit,
            current_page: 1,
        }
    }

    /// Record the total reported by a list page and clamp the quota to it.
    pub fn with_available(self, available: u64) -> Self {
        let required_jobs = if self.required_jobs > 0 {
            self.required_jobs.min(available)
        } else {
            available
        };
        Self {
            available_jobs: available,
            required_jobs,
            ..self
        }
    }

    pub fn acquire(self) -> Self {
        Self {
            acquired_jobs: self.acquired_jobs + 1,
            ..self
        }
    }

    pub fn next_page(self) -> Self {
        Self {
            current_page: self.current_page + 1,
            ..self
        }
    }

    pub fn quota_reached(&self) -> bool {
        self.acquired_jobs >= self.required_jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPPED: PageSizing = PageSizing { default: 20, cap: Some(20) };
    const UNCAPPED: PageSizing = PageSizing { default: 100, cap: None };

    #[test]
    fn page_limit_resolution() {
        assert_eq!(CrawlState::new(Some(5), Some(30), CAPPED).page_limit, 30);
        assert_eq!(CrawlState::new(Some(40), Some(3), CAPPED).page_limit, 40);
        assert_eq!(CrawlState::new(Some(50), None, CAPPED).page_limit, 20);
        assert_eq!(CrawlState::new(Some(10), None, CAPPED).page_limit, 10);
        assert_eq!(CrawlState::new(Some(500), None, UNCAPPED).page_limit, 500);
        assert_eq!(CrawlState::new(None, Some(7), CAPPED).page_limit, 20);
        assert_eq!(CrawlState::new(None, None, UNCAPPED).page_limit, 100);
    }

    #[test]
    fn initial_state() {
        let state = CrawlState::new(None, Some(7), CAPPED);
        assert_eq!(state.required_jobs, 7);
        assert_eq!(state.available_jobs, 0);
        assert_eq!(state.acquired_jobs, 0);
        assert_eq!(state.current_page, 1);
        assert_eq!(CrawlState::new(None, None, CAPPED).required_jobs, 0);
    }

    #[test]
    fn required_never_exceeds_available() {
        for required in [None, Some(0), Some(3), Some(10), Some(1000)] {
            for available in [1u64, 3, 10, 50] {
                let state = CrawlState::new(None, required, CAPPED).with_available(available);
                assert!(state.required_jobs <= state.available_jobs);
                assert!(state.required_jobs > 0);
            }
        }
    }

    #[test]
    fn unbounded_quota_takes_available() {
        let state = CrawlState::new(None, None, CAPPED).with_available(42);
        assert_eq!(state.required_jobs, 42);
    }

    #[test]
    fn quota_tracks_acquisitions() {
        let state = CrawlState::new(None, Some(2), CAPPED).with_available(3);
        assert!(!state.quota_reached());
        let state = state.acquire();
        assert!(!state.quota_reached());
        let state = state.acquire();
        assert!(state.quota_reached());
        assert_eq!(state.next_page().current_page, 2);
    }
}
