//! Bounded admission for in-flight probe calls.
//!
//! One limiter instance is shared across the entire run (not re-scoped
//! per section), so the cap holds globally no matter how sections
//! interleave with item work.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A concurrency slot held for the duration of one probe call.
///
/// Dropping the permit releases the slot to the next waiter, on success
/// and failure paths alike.
pub type Permit = OwnedSemaphorePermit;

/// Caps the number of concurrently outstanding probe calls.
///
/// Cheap to clone; all clones share the same permit pool. Admission is
/// FIFO (tokio semaphores queue waiters fairly), so no item starves.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    permits: Arc<Semaphore>,
}

impl ConcurrencyLimiter {
    /// Create a limiter with `max_concurrent` slots. A zero cap would
    /// deadlock every caller, so it is raised to one.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Wait until a slot is free, then take it.
    pub async fn admit(&self) -> Permit {
        // The semaphore is never closed, so acquisition cannot fail.
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .expect("limiter semaphore closed")
    }

    /// Number of currently free slots.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_admit_and_release() {
        let limiter = ConcurrencyLimiter::new(2);
        assert_eq!(limiter.available(), 2);

        let first = limiter.admit().await;
        let second = limiter.admit().await;
        assert_eq!(limiter.available(), 0);

        drop(first);
        assert_eq!(limiter.available(), 1);
        drop(second);
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test]
    async fn test_waiter_blocks_until_slot_frees() {
        let limiter = ConcurrencyLimiter::new(1);
        let held = limiter.admit().await;

        let waiter = {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                let _permit = limiter.admit().await;
            })
        };

        // The waiter cannot finish while the slot is held.
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(held);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_cap_is_raised_to_one() {
        let limiter = ConcurrencyLimiter::new(0);
        assert_eq!(limiter.available(), 1);
        let _permit = limiter.admit().await;
    }

    #[tokio::test]
    async fn test_clones_share_the_pool() {
        let limiter = ConcurrencyLimiter::new(1);
        let clone = limiter.clone();
        let _permit = limiter.admit().await;
        assert_eq!(clone.available(), 0);
    }
}
