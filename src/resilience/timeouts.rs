//! Timeout enforcement.
//!
//! Every remote call gets a deadline. Uses Tokio's timeout facilities; the
//! caller decides which error an elapsed deadline becomes.

use std::future::Future;
use std::time::Duration;

/// Await `future` for at most `limit`, mapping an elapsed deadline through `on_elapsed`.
pub async fn with_timeout<T, E, F>(
    limit: Duration,
    future: F,
    on_elapsed: impl FnOnce(Duration) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(on_elapsed(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_timeout(Duration::from_millis(100), async { Ok::<_, String>(7) }, |_| {
            "elapsed".to_string()
        })
        .await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_elapsed_deadline_maps_error() {
        let result: Result<(), String> = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            |limit| format!("timed out after {}ms", limit.as_millis()),
        )
        .await;
        assert_eq!(result, Err("timed out after 10ms".to_string()));
    }
}
