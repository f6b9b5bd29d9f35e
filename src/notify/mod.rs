pub mod telegram;

use async_trait::async_trait;

use crate::models::JobItem;

/// Delivers a posting somewhere a human will see it.
///
/// Delivery is fire-and-forget: implementations log their own failures and
/// always return.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn dispatch(&self, item: &JobItem);
}
