//! Concurrency gate bounding the number of running yt-dlp processes
//!
//! Built on a tokio `Semaphore`. Growing adds permits immediately; shrinking
//! acquires the excess permits and forgets them, so it completes only once
//! enough in-flight invocations have finished. Resizes are serialized.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::core::config::process::{MAX_PROCESSES, MIN_PROCESSES};
use crate::core::error::{YtdlError, YtdlResult};

#[derive(Debug)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: AtomicUsize,
    resize_lock: Mutex<()>,
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> YtdlResult<Self> {
        check_capacity(capacity)?;
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity: AtomicUsize::new(capacity),
            resize_lock: Mutex::new(()),
        })
    }

    /// Capacity after the last completed resize.
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::SeqCst)
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Changes the capacity.
    ///
    /// Shrinking waits until the excess permits are released by running
    /// invocations; queued invocations are not admitted in the meantime.
    pub async fn resize(&self, capacity: usize) -> YtdlResult<()> {
        check_capacity(capacity)?;
        let _guard = self.resize_lock.lock().await;

        let current = self.capacity();
        if capacity > current {
            self.semaphore.add_permits(capacity - current);
            self.capacity.store(capacity, Ordering::SeqCst);
            log::info!("Process limit raised from {} to {}", current, capacity);
        } else if capacity < current {
            let excess = current - capacity;
            log::debug!("Reclaiming {} permit(s) to shrink process limit", excess);
            let permits = self
                .semaphore
                .acquire_many(excess as u32)
                .await
                .map_err(|_| YtdlError::Cancelled)?;
            permits.forget();
            self.capacity.store(capacity, Ordering::SeqCst);
            log::info!("Process limit lowered from {} to {}", current, capacity);
        }
        Ok(())
    }

    /// Runs `task` once a permit is available.
    ///
    /// The permit is held until `task` resolves and released on every path.
    /// If `cancel` fires while waiting, the task never starts and
    /// `Err(Cancelled)` is returned.
    pub async fn run_throttled<F, T>(&self, cancel: &CancellationToken, task: F) -> YtdlResult<T>
    where
        F: Future<Output = YtdlResult<T>>,
    {
        let _permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(YtdlError::Cancelled),
            permit = self.semaphore.acquire() => permit.map_err(|_| YtdlError::Cancelled)?,
        };
        task.await
    }
}

fn check_capacity(capacity: usize) -> YtdlResult<()> {
    if (MIN_PROCESSES..=MAX_PROCESSES).contains(&capacity) {
        Ok(())
    } else {
        Err(YtdlError::CapacityOutOfRange {
            requested: capacity,
            max: MAX_PROCESSES,
        })
    }
}
