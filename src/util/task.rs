use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Runs `future`, converting a panic into `Err(message)`.
///
/// Background fetch tasks must always report back; a task that dies silently
/// would leave its page stuck in a loading state.
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_value() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_captures_str_and_string_panics() {
        let err = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(err, Err::<(), _>("boom".to_string()));

        let code = 42;
        let err = catch_task_panic(async move { panic!("failed with {}", code) }).await;
        assert_eq!(err, Err::<(), _>("failed with 42".to_string()));
    }
}
