//! Authoritative session state with ordered observer fan-out.
//!
//! The transport side owns a [`StateSender`] and may post events from any
//! thread. Nothing is delivered until the controller thread calls
//! [`SessionStateMachine::drain`], which validates each transition against the
//! state graph and notifies subscribers in arrival order.

use std::fmt;

use tracing::{debug, error, warn};

use crate::errors::SessionError;
use crate::messages::ServerEvent;

/// Connection state of a single session instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    /// Terminal. A retry creates a new session instead of leaving this state.
    Disconnected(String),
}

impl SessionState {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disconnected(_))
    }

    /// Whether the state graph allows moving from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Connecting)
                | (Self::Connecting, Self::Connected)
                | (Self::Connecting, Self::Disconnected(_))
                | (Self::Connected, Self::Disconnected(_))
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected(reason) => write!(f, "Disconnected({reason})"),
        }
    }
}

/// Handle returned by [`SessionStateMachine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&SessionState)>;

/// Cloneable, thread-safe handle the transport uses to report progress.
#[derive(Clone)]
pub struct StateSender {
    tx: flume::Sender<ServerEvent>,
}

impl StateSender {
    /// Post a raw event.
    pub fn send(&self, event: ServerEvent) -> Result<(), SessionError> {
        self.tx.send(event).map_err(|_| SessionError::ChannelClosed)
    }

    /// Report a state transition.
    pub fn transition(&self, state: SessionState) -> Result<(), SessionError> {
        self.send(ServerEvent::StateChanged(state))
    }
}

/// Holds the current [`SessionState`] and the ordered list of subscribers.
pub struct SessionStateMachine {
    current: SessionState,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
    tx: flume::Sender<ServerEvent>,
    rx: flume::Receiver<ServerEvent>,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            current: SessionState::Idle,
            observers: Vec::new(),
            next_id: 0,
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn current(&self) -> &SessionState {
        &self.current
    }

    #[must_use]
    pub fn sender(&self) -> StateSender {
        StateSender {
            tx: self.tx.clone(),
        }
    }

    /// Register an observer. Observers are called in registration order.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&SessionState) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    /// Apply a transition directly on the controller thread.
    ///
    /// Returns `Ok(false)` when `next` equals the current state; the duplicate
    /// is coalesced and observers are not called again.
    pub fn apply(&mut self, next: SessionState) -> Result<bool, SessionError> {
        if next == self.current {
            debug!("Coalescing duplicate session state {}", next);
            return Ok(false);
        }
        if self.current.is_terminal() {
            return Err(SessionError::Terminated(self.current.to_string()));
        }
        if !self.current.can_transition_to(&next) {
            return Err(SessionError::IllegalTransition {
                from: self.current.clone(),
                to: next,
            });
        }

        debug!("Session state {} -> {}", self.current, next);
        self.current = next;
        for (_, observer) in &mut self.observers {
            observer(&self.current);
        }
        Ok(true)
    }

    /// Pull every pending event off the channel in arrival order.
    ///
    /// State changes are applied (and fanned out) as they are reached. Illegal
    /// or duplicate transitions are dropped from the returned list. All other
    /// events pass through unchanged.
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut accepted = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            match event {
                ServerEvent::StateChanged(next) => match self.apply(next.clone()) {
                    Ok(true) => accepted.push(ServerEvent::StateChanged(next)),
                    Ok(false) => {}
                    Err(e) if e.is_protocol_violation() => {
                        warn!("Dropping session transition: {}", e)
                    }
                    Err(e) => error!("Session transition failed: {}", e),
                },
                other => accepted.push(other),
            }
        }
        accepted
    }
}
