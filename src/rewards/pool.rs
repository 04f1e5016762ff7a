//! Bounded worker pool shared by sweeps and interactive requests.
//!
//! The pool hands out permits; whoever holds one may run a reward-ledger update.
//! Part of the capacity is reserved for [`Priority::Interactive`] work so that a
//! population-wide sweep cannot starve direct requests. Waiters queue in FIFO
//! order and give up after the configured queue timeout.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Who is asking for a permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Direct requests for one user; may use the reserved share.
    Interactive,
    /// Scheduled sweeps; limited to the shared share.
    Background,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PoolError {
    /// No permit became free within the queue timeout. Retryable.
    #[error("worker pool saturated, gave up after {waited_ms} ms")]
    Saturated { waited_ms: u64 },

    #[error("worker pool closed")]
    Closed,
}

/// Held for the duration of one unit of work; releases its slot on drop.
#[derive(Debug)]
pub struct PoolPermit {
    _permit: OwnedSemaphorePermit,
}

struct PoolInner {
    shared: Arc<Semaphore>,
    reserved: Arc<Semaphore>,
    capacity: usize,
    reserve: usize,
    queue_timeout: Duration,
}

/// Cloneable handle to the process-wide pool.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    /// `reserve` is clamped so background work always keeps at least one slot.
    pub fn new(capacity: usize, reserve: usize, queue_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        let reserve = reserve.min(capacity - 1);
        Self {
            inner: Arc::new(PoolInner {
                shared: Arc::new(Semaphore::new(capacity - reserve)),
                reserved: Arc::new(Semaphore::new(reserve)),
                capacity,
                reserve,
                queue_timeout,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn reserve(&self) -> usize {
        self.inner.reserve
    }

    /// Permits currently free across both shares.
    pub fn available(&self) -> usize {
        self.inner.shared.available_permits() + self.inner.reserved.available_permits()
    }

    /// Waits for a permit, in FIFO order, for at most the queue timeout.
    pub async fn acquire(&self, priority: Priority) -> Result<PoolPermit, PoolError> {
        let started = Instant::now();
        let shared = self.inner.shared.clone();
        let reserved = self.inner.reserved.clone();

        let wait = async move {
            match priority {
                Priority::Background => shared.acquire_owned().await,
                Priority::Interactive => {
                    if let Ok(permit) = shared.clone().try_acquire_owned() {
                        return Ok(permit);
                    }
                    tokio::select! {
                        permit = reserved.acquire_owned() => permit,
                        permit = shared.acquire_owned() => permit,
                    }
                }
            }
        };

        match tokio::time::timeout(self.inner.queue_timeout, wait).await {
            Ok(Ok(permit)) => Ok(PoolPermit { _permit: permit }),
            Ok(Err(_)) => Err(PoolError::Closed),
            Err(_) => Err(PoolError::Saturated {
                waited_ms: started.elapsed().as_millis() as u64,
            }),
        }
    }

    /// Wakes every waiter with [`PoolError::Closed`] and refuses new work.
    pub fn close(&self) {
        self.inner.shared.close();
        self.inner.reserved.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reserve_is_clamped() {
        let pool = WorkerPool::new(4, 10, Duration::from_secs(1));
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.reserve(), 3);
        assert_eq!(pool.available(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_work_times_out_when_saturated() {
        let pool = WorkerPool::new(2, 1, Duration::from_millis(500));
        let _held = pool.acquire(Priority::Background).await.unwrap();

        let err = pool.acquire(Priority::Background).await.unwrap_err();
        assert!(matches!(err, PoolError::Saturated { waited_ms } if waited_ms >= 500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interactive_uses_reserve_when_shared_is_busy() {
        let pool = WorkerPool::new(2, 1, Duration::from_millis(500));
        let _background = pool.acquire(Priority::Background).await.unwrap();

        let interactive = pool.acquire(Priority::Interactive).await;
        assert!(interactive.is_ok());
        assert_eq!(pool.available(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_released_permit_wakes_waiter() {
        let pool = WorkerPool::new(1, 0, Duration::from_secs(5));
        let held = pool.acquire(Priority::Background).await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire(Priority::Background).await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(held);

        assert!(waiter.await.unwrap().is_ok());
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn test_close_fails_waiters() {
        let pool = WorkerPool::new(1, 0, Duration::from_secs(60));
        let _held = pool.acquire(Priority::Background).await.unwrap();
        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire(Priority::Background).await.map(|_| ()) })
        };
        tokio::task::yield_now().await;
        pool.close();
        assert_eq!(waiter.await.unwrap(), Err(PoolError::Closed));
    }
}
