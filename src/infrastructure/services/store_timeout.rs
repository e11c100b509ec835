//! Upper bound on backing-store calls

use std::future::Future;
use std::time::Duration;

use crate::domain::DomainError;

/// Runs a store call, turning an elapsed deadline into `StoreUnavailable`.
///
/// The inner future is dropped on timeout; the remote side is not cancelled.
pub(crate) async fn with_store_timeout<T, F>(
    store: &str,
    limit: Duration,
    call: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::store_unavailable(
            store,
            format!("timed out after {}ms", limit.as_millis()),
        )),
    }
}
