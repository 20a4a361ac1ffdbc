//! Bounded-time execution of generation jobs
//!
//! Jobs run on a rayon pool while the caller waits on a channel with a
//! timeout. Cancellation is cooperative: a timed-out job keeps running until
//! it next calls [`CancelToken::check`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{GeneratorError, Result};

/// Default time budget for one build
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// Shared cancellation flag checked between pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Interrupted` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(GeneratorError::Interrupted)
        } else {
            Ok(())
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Thread pool plus the time budget applied to every job.
pub struct BoundedWorker {
    pool: rayon::ThreadPool,
    timeout: Duration,
}

impl BoundedWorker {
    /// `workers == 0` uses the available parallelism.
    pub fn new(workers: usize, timeout: Duration) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("tooltipgen-worker-{}", index))
            .build()
            .map_err(|e| GeneratorError::internal("Failed to start worker pool", e))?;
        Ok(Self { pool, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `job` on the pool and wait for it.
    ///
    /// Errors and panics inside the job come back as a single failure. When
    /// the budget runs out the job is cancelled and `Timeout` is returned.
    pub fn run<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&CancelToken) -> Result<T> + Send + 'static,
    {
        let token = CancelToken::new();
        let (sender, receiver) = mpsc::channel();

        let job_token = token.clone();
        self.pool.spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| job(&job_token))).unwrap_or_else(|payload| {
                Err(GeneratorError::internal("Image generation failed", panic_message(payload.as_ref())))
            });
            // The caller may have stopped listening after a timeout
            let _ = sender.send(outcome);
        });

        match receiver.recv_timeout(self.timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                token.cancel();
                tracing::warn!("Image generation exceeded {}ms", self.timeout.as_millis());
                Err(GeneratorError::Timeout)
            }
            Err(RecvTimeoutError::Disconnected) => Err(GeneratorError::Interrupted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn worker(timeout_ms: u64) -> BoundedWorker {
        BoundedWorker::new(2, Duration::from_millis(timeout_ms)).unwrap()
    }

    #[test]
    fn test_pool_size() {
        assert_eq!(worker(1000).threads(), 2);
        assert!(BoundedWorker::new(0, Duration::from_secs(1)).unwrap().threads() >= 1);
    }

    #[test]
    fn test_returns_job_result() {
        assert_eq!(worker(1000).run(|_| Ok(21 * 2)).unwrap(), 42);
    }

    #[test]
    fn test_job_error_propagates() {
        let result: Result<()> = worker(1000).run(|_| Err(GeneratorError::not_found("Item with ID `x` not found")));
        assert!(matches!(result, Err(GeneratorError::NotFound(_))));
    }

    #[test]
    fn test_panic_is_wrapped() {
        let result: Result<()> = worker(1000).run(|_| panic!("boom"));
        match result {
            Err(GeneratorError::Internal { message, .. }) => assert_eq!(message, "boom"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_timeout_cancels_job() {
        let (seen_sender, seen_receiver) = mpsc::channel();
        let result: Result<()> = worker(20).run(move |token| {
            while !token.is_cancelled() {
                thread::sleep(Duration::from_millis(5));
            }
            let _ = seen_sender.send(());
            token.check()
        });
        assert!(matches!(result, Err(GeneratorError::Timeout)));
        assert!(seen_receiver.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(token.check().is_ok());
        token.clone().cancel();
        assert!(matches!(token.check(), Err(GeneratorError::Interrupted)));
    }
}
