pub mod crawl_state;
pub mod job;

pub use crawl_state::{CrawlState, PageSizing};
pub use job::JobItem;
