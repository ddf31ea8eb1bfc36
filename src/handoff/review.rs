use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// How a review ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    Submitted(String),
    Cancelled,
}

/// Resolves once the prompt under review is submitted or closed.
pub struct ReviewSession {
    rx: oneshot::Receiver<ReviewOutcome>,
}

/// Cloneable side that resolves a [`ReviewSession`]. The first of
/// `submit` or `close` wins; later calls return `false`.
#[derive(Clone)]
pub struct ReviewHandle {
    tx: Arc<Mutex<Option<oneshot::Sender<ReviewOutcome>>>>,
}

pub fn open_review() -> (ReviewHandle, ReviewSession) {
    let (tx, rx) = oneshot::channel();
    (
        ReviewHandle {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        ReviewSession { rx },
    )
}

impl ReviewHandle {
    fn resolve(&self, outcome: ReviewOutcome) -> bool {
        let sender = match self.tx.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    pub fn submit(&self, text: impl Into<String>) -> bool {
        self.resolve(ReviewOutcome::Submitted(text.into()))
    }

    pub fn close(&self) -> bool {
        self.resolve(ReviewOutcome::Cancelled)
    }

    #[cfg(test)]
    pub fn is_resolved(&self) -> bool {
        self.tx.lock().map(|g| g.is_none()).unwrap_or(true)
    }
}

impl ReviewSession {
    /// Wait for the outcome. Dropping every handle counts as a close.
    pub async fn wait(self) -> ReviewOutcome {
        self.rx.await.unwrap_or(ReviewOutcome::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_wins() {
        let (handle, session) = open_review();
        assert!(handle.submit("final prompt"));
        assert!(!handle.close());
        assert!(!handle.submit("second"));
        assert!(handle.is_resolved());
        assert_eq!(
            session.wait().await,
            ReviewOutcome::Submitted("final prompt".to_string())
        );
    }

    #[tokio::test]
    async fn test_close_wins() {
        let (handle, session) = open_review();
        let other = handle.clone();
        assert!(other.close());
        assert!(!handle.submit("too late"));
        assert_eq!(session.wait().await, ReviewOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_dropped_handle_cancels() {
        let (handle, session) = open_review();
        drop(handle);
        assert_eq!(session.wait().await, ReviewOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_concurrent_resolution_has_one_winner() {
        let (handle, session) = open_review();
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let h = handle.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        h.submit(format!("text {}", i))
                    } else {
                        h.close()
                    }
                })
            })
            .collect();

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        let _ = session.wait().await;
    }
}
