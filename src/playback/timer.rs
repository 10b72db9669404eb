//! Single-shot timers scoped to their owner
//!
//! A [`ScopedTimer`] delivers one message into the owner's input channel
//! after a delay. Scheduling again cancels the pending shot, and dropping the
//! timer cancels it too, so no callback outlives the view that armed it.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Cancel-on-replace, cancel-on-drop single-shot timer
#[derive(Debug)]
pub struct ScopedTimer<M: Send + 'static> {
    tx: UnboundedSender<M>,
    pending: Option<JoinHandle<()>>,
}

impl<M: Send + 'static> ScopedTimer<M> {
    /// Create an idle timer delivering into `tx`
    pub fn new(tx: UnboundedSender<M>) -> Self {
        Self { tx, pending: None }
    }

    /// Arm the timer, replacing any pending shot
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, delay: Duration, message: M) {
        self.cancel();
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the owner was torn down
            let _ = tx.send(message);
        }));
    }

    /// Disarm the timer; returns whether a shot was pending
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    /// Whether a shot is armed and has not fired yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl<M: Send + 'static> Drop for ScopedTimer<M> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = ScopedTimer::new(tx);

        timer.schedule(Duration::from_secs(2), "retry");
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some("retry"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_cancels_previous() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = ScopedTimer::new(tx);

        timer.schedule(Duration::from_secs(3), 1);
        tokio::time::sleep(Duration::from_secs(2)).await;
        timer.schedule(Duration::from_secs(3), 2);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.recv().await, Some(2));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut timer = ScopedTimer::new(tx);
            timer.schedule(Duration::from_secs(1), ());
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reports_pending() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut timer = ScopedTimer::new(tx);
        assert!(!timer.cancel());
        timer.schedule(Duration::from_secs(1), ());
        assert!(timer.cancel());
        assert!(!timer.is_pending());
    }
}
