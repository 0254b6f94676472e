//! Bounded intake queue.
//!
//! Producers hold [`Submitter`]s and may submit concurrently; a full queue
//! makes them wait instead of dropping input. The single consumer holds
//! the [`Intake`]. Processing order is the order in which lines entered
//! the queue.

use crate::error::{EngineError, EngineResult};
use tokio::sync::mpsc;

/// Create a bounded intake queue
///
/// # Errors
///
/// Returns error if `capacity` is zero
pub fn intake_channel(capacity: usize) -> EngineResult<(Submitter, Intake)> {
    if capacity == 0 {
        return Err(EngineError::InvalidCapacity(capacity));
    }
    let (tx, rx) = mpsc::channel(capacity);
    Ok((Submitter { tx }, Intake { rx }))
}

/// Producer side of the intake queue; cheap to clone
#[derive(Debug, Clone)]
pub struct Submitter {
    tx: mpsc::Sender<String>,
}

impl Submitter {
    /// Enqueue a raw line, waiting while the queue is full
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Closed`] if the processing loop has stopped
    pub async fn submit(&self, line: impl Into<String>) -> EngineResult<()> {
        self.tx
            .send(line.into())
            .await
            .map_err(|_| EngineError::Closed)
    }

    /// Enqueue from a plain thread, blocking while the queue is full.
    ///
    /// Must not be called from inside an async task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Closed`] if the processing loop has stopped
    pub fn submit_blocking(&self, line: impl Into<String>) -> EngineResult<()> {
        self.tx
            .blocking_send(line.into())
            .map_err(|_| EngineError::Closed)
    }

    /// Free slots right now
    #[must_use]
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    /// Total queue capacity
    #[must_use]
    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Whether the consumer is gone
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the intake queue
#[derive(Debug)]
pub struct Intake {
    rx: mpsc::Receiver<String>,
}

impl Intake {
    /// Next line, suspending while the queue is empty.
    ///
    /// Returns `None` once every submitter is dropped and the queue is drained.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Blocking variant of [`Intake::next`] for a dedicated thread
    pub fn next_blocking(&mut self) -> Option<String> {
        self.rx.blocking_recv()
    }

    /// Lines waiting in the queue
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            intake_channel(0),
            Err(EngineError::InvalidCapacity(0))
        ));
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (submitter, mut intake) = intake_channel(4).unwrap();
        submitter.submit("a|b|1").await.unwrap();
        submitter.submit("a|b|2").await.unwrap();
        drop(submitter);

        assert_eq!(intake.next().await.as_deref(), Some("a|b|1"));
        assert_eq!(intake.next().await.as_deref(), Some("a|b|2"));
        assert_eq!(intake.next().await, None);
    }

    #[tokio::test]
    async fn test_full_queue_applies_backpressure() {
        let (submitter, mut intake) = intake_channel(1).unwrap();
        submitter.submit("first").await.unwrap();
        assert_eq!(submitter.available(), 0);

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), submitter.submit("second")).await;
        assert!(blocked.is_err(), "submit should wait while the queue is full");

        assert_eq!(intake.next().await.as_deref(), Some("first"));
        submitter.submit("second").await.unwrap();
        assert_eq!(intake.next().await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_submit_after_close() {
        let (submitter, intake) = intake_channel(2).unwrap();
        drop(intake);
        assert!(submitter.is_closed());
        assert!(matches!(
            submitter.submit("x").await,
            Err(EngineError::Closed)
        ));
    }
}
