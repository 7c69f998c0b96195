//! Per-request cancellation scope
//!
//! Every public fetch runs its whole upstream orchestration under
//! [`RequestContext::run`]. When the caller's deadline passes, the pending
//! future is dropped (abandoning in-flight HTTP calls) and the fetch
//! resolves to [`SailError::Cancelled`] instead of a partial result.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::{Result, SailError};

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context without a deadline
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Drive `future` to completion unless the deadline passes first
    pub async fn run<T, F>(&self, operation: &'static str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.deadline {
            None => future.await,
            Some(deadline) => match tokio::time::timeout_at(deadline, future).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(operation, "deadline elapsed, abandoning upstream calls");
                    Err(SailError::cancelled(operation))
                }
            },
        }
    }
}
