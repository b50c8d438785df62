//! Carry the current request identifier into spawned work
//!
//! Task-local and thread-local slots are not inherited by new tasks or
//! threads. These helpers capture the identifier at the point where work is
//! handed off and re-install it in a scope owned by that work.

use std::future::Future;
use tokio::task::JoinHandle;

use crate::context;

/// Wrap `fut` so it runs with the caller's current identifier.
///
/// The identifier is captured now, not when the future is first polled.
/// Without a current identifier the future still gets its own empty scope.
pub fn propagate<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    let captured = context::get();
    async move {
        match captured {
            Some(id) => context::scope_with(id, fut).await,
            None => context::scope(fut).await,
        }
    }
}

/// `tokio::spawn` that keeps the caller's identifier
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(propagate(fut))
}

/// Wrap a closure for `spawn_blocking` or a thread pool so it runs with the
/// caller's identifier
pub fn wrap_blocking<F, R>(f: F) -> impl FnOnce() -> R
where
    F: FnOnce() -> R,
{
    let captured = context::get();
    move || match captured {
        Some(id) => context::sync_scope_with(id, f),
        None => context::sync_scope(f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_id::RequestId;

    #[tokio::test]
    async fn test_spawn_inherits_identifier() {
        let seen = context::scope_with("req-parent", async {
            spawn(async { context::get() }).await.unwrap()
        })
        .await;
        assert_eq!(seen, Some(RequestId::from("req-parent")));
    }

    #[tokio::test]
    async fn test_plain_spawn_does_not_inherit() {
        let seen = context::scope_with("req-parent", async {
            tokio::spawn(async { context::get() }).await.unwrap()
        })
        .await;
        assert_eq!(seen, None);
    }

    #[tokio::test]
    async fn test_child_changes_stay_in_child() {
        context::scope_with("req-parent", async {
            spawn(async {
                context::set("req-child");
                context::clear();
            })
            .await
            .unwrap();
            assert_eq!(context::get(), Some(RequestId::from("req-parent")));
        })
        .await;
    }

    #[tokio::test]
    async fn test_captured_at_wrap_time() {
        let fut = context::scope_with("req-a", async { propagate(async { context::get() }) }).await;
        let seen = context::scope_with("req-b", fut).await;
        assert_eq!(seen, Some(RequestId::from("req-a")));
    }

    #[tokio::test]
    async fn test_blocking_inherits_identifier() {
        let seen = context::scope_with("req-blocking", async {
            tokio::task::spawn_blocking(wrap_blocking(context::get)).await.unwrap()
        })
        .await;
        assert_eq!(seen, Some(RequestId::from("req-blocking")));
    }

    #[test]
    fn test_wrap_without_identifier() {
        let job = std::thread::spawn(|| {
            let f = wrap_blocking(context::get);
            f()
        });
        assert_eq!(job.join().unwrap(), None);
    }
}
