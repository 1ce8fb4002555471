//! Run summary delivery.

use crate::error::GameCalResult;

#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, summary: &str) -> GameCalResult<()>;
}

/// Deliver a summary without letting a failure reach the caller.
pub async fn notify_best_effort<N: Notifier>(notifier: &N, summary: &str) {
    if let Err(e) = notifier.notify(summary).await {
        tracing::warn!("Could not deliver summary: {e}");
    }
}
