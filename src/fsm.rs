//! Reconnection state machine
//!
//! Pure transition logic shared by the session coordinator and the
//! per-member mirrors. The machine consumes normalized transport health,
//! deadline firings and explicit leave requests, and produces at most one
//! transition per input. Driving the machine (timers, event emission,
//! snapshots) is the owner's job.

use crate::events::DisruptionCause;
use crate::health::{TransportHealth, TransportKind};
use serde::{Deserialize, Serialize};

/// Unified connection state of a session or of one mirrored member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Both transports healthy
    Connected,
    /// At least one transport unhealthy, recovery in progress
    Reconnecting,
    /// Terminal: the reconnect window elapsed, a terminal fault arrived, or
    /// the local side left
    Disconnected,
}

impl ConnectionState {
    /// Get the state name for logging/debugging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Inputs serialized onto one state machine's queue
#[derive(Debug)]
pub(crate) enum FsmInput {
    /// An observer forwarded a health change for one transport
    Health(TransportKind, TransportHealth),
    /// The reconnect deadline scheduled for `episode` fired
    DeadlineElapsed { episode: u64 },
    /// Explicit local leave
    Leave,
}

/// Transition produced by applying one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Left `Connected`; the owner starts the reconnect deadline for
    /// `episode` and emits a reconnecting notification once
    EnterReconnecting { cause: DisruptionCause, episode: u64 },
    /// Both transports recovered before the deadline; cancel it and notify
    Recover,
    /// Terminal. `cause` is `None` only for an explicit leave
    Terminate { cause: Option<DisruptionCause> },
}

/// State machine merging two transport health streams into one connection
/// narrative
///
/// The episode counter increments on every entry into `Reconnecting`; a
/// deadline firing whose episode no longer matches is stale and ignored.
pub(crate) struct ReconnectFsm {
    state: ConnectionState,
    signaling: TransportHealth,
    media: TransportHealth,
    episode: u64,
}

impl ReconnectFsm {
    pub(crate) fn new() -> Self {
        Self {
            state: ConnectionState::Connected,
            signaling: TransportHealth::Healthy,
            media: TransportHealth::Healthy,
            episode: 0,
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    /// Apply one input, returning the transition it caused, if any.
    ///
    /// `Disconnected` is absorbing: every later input is a no-op.
    pub(crate) fn apply(&mut self, input: FsmInput) -> Option<Transition> {
        if self.state == ConnectionState::Disconnected {
            return None;
        }

        match input {
            FsmInput::Health(kind, health) => self.apply_health(kind, health),
            FsmInput::DeadlineElapsed { episode } => self.deadline_elapsed(episode),
            FsmInput::Leave => {
                self.state = ConnectionState::Disconnected;
                Some(Transition::Terminate { cause: None })
            }
        }
    }

    fn apply_health(&mut self, kind: TransportKind, health: TransportHealth) -> Option<Transition> {
        // Terminal faults bypass the deadline from any live state
        let terminal_cause = health.fault().filter(|f| f.terminal).map(|f| f.cause);

        match kind {
            TransportKind::Signaling => self.signaling = health,
            TransportKind::Media => self.media = health,
        }

        if let Some(cause) = terminal_cause {
            self.state = ConnectionState::Disconnected;
            return Some(Transition::Terminate { cause: Some(cause) });
        }

        match self.state {
            ConnectionState::Connected => {
                if self.both_healthy() {
                    return None;
                }
                self.state = ConnectionState::Reconnecting;
                self.episode += 1;
                let cause = self.pending_cause()?;
                Some(Transition::EnterReconnecting {
                    cause,
                    episode: self.episode,
                })
            }
            ConnectionState::Reconnecting => {
                if self.both_healthy() {
                    self.state = ConnectionState::Connected;
                    Some(Transition::Recover)
                } else {
                    // Already reconnecting; the entry notification stands
                    None
                }
            }
            ConnectionState::Disconnected => None,
        }
    }

    fn deadline_elapsed(&mut self, episode: u64) -> Option<Transition> {
        // A firing raced against a transition that already resolved the
        // episode is a no-op
        if self.state != ConnectionState::Reconnecting || episode != self.episode {
            return None;
        }
        self.state = ConnectionState::Disconnected;
        Some(Transition::Terminate {
            cause: self.pending_cause(),
        })
    }

    fn both_healthy(&self) -> bool {
        self.signaling.is_healthy() && self.media.is_healthy()
    }

    /// Cause across the currently-unhealthy transports, control channel
    /// taking priority over media
    fn pending_cause(&self) -> Option<DisruptionCause> {
        match (self.signaling.fault(), self.media.fault()) {
            (Some(s), Some(m)) => Some(s.cause.merge(m.cause)),
            (Some(s), None) => Some(s.cause),
            (None, Some(m)) => Some(m.cause),
            (None, None) => None,
        }
    }
}
