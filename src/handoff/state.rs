use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

/// Where one handoff invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandoffState {
    #[default]
    Idle,
    Syncing,
    Gathering,
    AwaitingReview,
    Sending,
    Done,
    Cancelled,
    Failed,
}

impl HandoffState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandoffState::Done | HandoffState::Cancelled | HandoffState::Failed
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            HandoffState::Idle => "idle",
            HandoffState::Syncing => "syncing local changes",
            HandoffState::Gathering => "gathering context",
            HandoffState::AwaitingReview => "awaiting review",
            HandoffState::Sending => "sending to Jules",
            HandoffState::Done => "done",
            HandoffState::Cancelled => "cancelled",
            HandoffState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffEvent {
    Begin,
    Synced,
    Gathered,
    Submitted,
    Sent,
    Cancel,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot apply {event:?} while {from:?}")]
pub struct InvalidTransition {
    pub from: HandoffState,
    pub event: HandoffEvent,
}

/// Pure transition function of the handoff state machine.
///
/// Cancellation is accepted up to review; once a submission is in
/// flight it can only finish or fail.
pub fn transition(
    from: HandoffState,
    event: HandoffEvent,
) -> Result<HandoffState, InvalidTransition> {
    use HandoffEvent as E;
    use HandoffState as S;

    let next = match (from, event) {
        (S::Idle, E::Begin) => S::Syncing,
        (S::Syncing, E::Synced) => S::Gathering,
        (S::Gathering, E::Gathered) => S::AwaitingReview,
        (S::AwaitingReview, E::Submitted) => S::Sending,
        (S::Sending, E::Sent) => S::Done,
        (S::Syncing | S::Gathering | S::AwaitingReview, E::Cancel) => S::Cancelled,
        (s, E::Fail) if !s.is_terminal() && s != S::Idle => S::Failed,
        _ => return Err(InvalidTransition { from, event }),
    };
    Ok(next)
}

/// Publishes state changes to any number of subscribers.
pub struct StateTracker {
    tx: watch::Sender<HandoffState>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(HandoffState::Idle);
        Self { tx }
    }

    pub fn current(&self) -> HandoffState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<HandoffState> {
        self.tx.subscribe()
    }

    pub fn apply(&self, event: HandoffEvent) -> Result<HandoffState, InvalidTransition> {
        let from = self.current();
        let next = transition(from, event)?;
        self.tx.send_replace(next);
        debug!("Handoff state: {:?} -> {:?}", from, next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = HandoffState::Idle;
        for event in [
            HandoffEvent::Begin,
            HandoffEvent::Synced,
            HandoffEvent::Gathered,
            HandoffEvent::Submitted,
            HandoffEvent::Sent,
        ] {
            state = transition(state, event).unwrap();
        }
        assert_eq!(state, HandoffState::Done);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_no_cancel_after_submit() {
        let err = transition(HandoffState::Sending, HandoffEvent::Cancel).unwrap_err();
        assert_eq!(err.from, HandoffState::Sending);
        assert_eq!(
            transition(HandoffState::AwaitingReview, HandoffEvent::Cancel).unwrap(),
            HandoffState::Cancelled
        );
        assert_eq!(
            transition(HandoffState::Sending, HandoffEvent::Fail).unwrap(),
            HandoffState::Failed
        );
    }

    #[test]
    fn test_out_of_order_events_rejected() {
        assert!(transition(HandoffState::Idle, HandoffEvent::Gathered).is_err());
        assert!(transition(HandoffState::Idle, HandoffEvent::Fail).is_err());
        assert!(transition(HandoffState::Done, HandoffEvent::Fail).is_err());
        assert!(transition(HandoffState::Done, HandoffEvent::Begin).is_err());
    }

    #[tokio::test]
    async fn test_tracker_publishes() {
        let tracker = StateTracker::new();
        let mut rx = tracker.subscribe();

        tracker.apply(HandoffEvent::Begin).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), HandoffState::Syncing);

        assert!(tracker.apply(HandoffEvent::Sent).is_err());
        assert_eq!(tracker.current(), HandoffState::Syncing);
    }
}
