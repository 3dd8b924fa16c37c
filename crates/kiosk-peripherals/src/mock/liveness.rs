//! Scripted liveness probe.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{PeripheralError, Result};
use crate::traits::LivenessProbe;

/// What the mock probe answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessReply {
    /// Respond with this HTTP status.
    Status(u16),

    /// Fail as a transport timeout.
    Timeout,
}

/// Liveness probe returning a fixed reply, optionally after a delay.
///
/// Clones share the call counter.
///
/// # Examples
///
/// ```
/// use kiosk_peripherals::mock::MockLiveness;
/// use kiosk_peripherals::traits::LivenessProbe;
///
/// #[tokio::main]
/// async fn main() -> kiosk_peripherals::Result<()> {
///     let probe = MockLiveness::status(404);
///     assert_eq!(probe.probe().await?, 404);
///     assert_eq!(probe.calls(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockLiveness {
    reply: LivenessReply,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockLiveness {
    pub fn new(reply: LivenessReply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Probe answering `status`.
    pub fn status(status: u16) -> Self {
        Self::new(LivenessReply::Status(status))
    }

    /// Probe answering 200.
    pub fn healthy() -> Self {
        Self::status(200)
    }

    /// Wait `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of probes performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockLiveness {
    fn default() -> Self {
        Self::healthy()
    }
}

impl LivenessProbe for MockLiveness {
    async fn probe(&self) -> Result<u16> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.reply {
            LivenessReply::Status(status) => Ok(status),
            LivenessReply::Timeout => Err(PeripheralError::timeout(self.delay.as_millis() as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_reply() {
        let probe = MockLiveness::new(LivenessReply::Timeout);
        assert!(matches!(
            probe.probe().await,
            Err(PeripheralError::Timeout { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_and_shared_counter() {
        let probe = MockLiveness::healthy().with_delay(Duration::from_secs(2));
        let clone = probe.clone();

        let started = tokio::time::Instant::now();
        assert_eq!(clone.probe().await.unwrap(), 200);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(probe.calls(), 1);
    }
}
