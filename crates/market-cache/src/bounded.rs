//! Timeouts around collaborator calls.

use market_core::error::{SourceError, StoreError};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Run an upstream call, mapping an elapsed deadline to [`SourceError::Timeout`].
pub(crate) async fn source_call<T, F>(limit: Duration, call: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout {
            after_secs: limit.as_secs(),
        }),
    }
}

/// Run a storage call, mapping an elapsed deadline to [`StoreError::Timeout`].
pub(crate) async fn store_call<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            after_secs: limit.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_source_call_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, SourceError>(1)
        };
        let result = source_call(Duration::from_secs(5), slow).await;

        assert!(matches!(result, Err(SourceError::Timeout { after_secs: 5 })));
    }

    #[tokio::test]
    async fn test_store_call_passes_through() {
        let result = store_call(Duration::from_secs(1), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
