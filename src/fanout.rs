//! Bounded fan-out/fan-in over a list of inputs.
use futures::stream::{self, StreamExt};
use std::future::Future;

pub const DEFAULT_CONCURRENCY: usize = 8;

/// Run `f` over every item with at most `limit` futures in flight and wait for
/// all of them. Results come back in input order regardless of completion
/// order. A `limit` of zero is treated as one.
pub async fn bounded<I, T, F, Fut>(items: I, limit: usize, f: F) -> Vec<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(items)
        .map(f)
        .buffered(limit.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn preserves_input_order() {
        // later items finish first
        let out = bounded(vec![30u64, 20, 10, 0], 4, |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            ms
        })
        .await;
        assert_eq!(out, vec![30, 20, 10, 0]);
    }

    #[tokio::test]
    async fn never_exceeds_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let out = bounded(0..20, 3, |i| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                i * 2
            }
        })
        .await;
        assert_eq!(out.len(), 20);
        assert_eq!(out[19], 38);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let out: Vec<u8> = bounded(Vec::<u8>::new(), 0, |x| async move { x }).await;
        assert!(out.is_empty());
    }
}
