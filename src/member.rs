//! Remote session members and their mirrored connection state
//!
//! Each remote member runs a participant mirror: an isolated copy of the
//! reconnection state machine driven by that member's own relayed
//! control-channel health. A mirror never reads or writes the session-level
//! state; member narratives are fully independent of the local one and of
//! each other.

use crate::events::{MemberEvent, SessionEvent};
use crate::fsm::{ConnectionState, FsmInput, ReconnectFsm, Transition};
use crate::health::{TransportHealth, TransportKind};
use crate::timer::{DeadlineHandle, TimerService};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Opaque identifier of a session member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    /// Create a member id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MemberId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Map of member id to mirror handle, owned by the session
pub(crate) type MemberRegistry = Arc<RwLock<HashMap<MemberId, Member>>>;

/// Handle to a remote member's mirrored state
///
/// Cheap to clone; all clones observe the same mirror.
#[derive(Clone)]
pub struct Member {
    id: MemberId,
    state: Arc<RwLock<ConnectionState>>,
    input: mpsc::UnboundedSender<FsmInput>,
}

impl Member {
    /// The member's identifier
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// Last-known connection state of this member
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Forward a relayed health signal to the mirror
    pub(crate) fn send_health(&self, kind: TransportKind, health: TransportHealth) {
        let _ = self.input.send(FsmInput::Health(kind, health));
    }

    /// Tear the mirror down (member left or session ended)
    pub(crate) fn leave(&self) {
        let _ = self.input.send(FsmInput::Leave);
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("id", &self.id)
            .field("state", &self.connection_state())
            .finish()
    }
}

/// Spawn a participant mirror for `id`
///
/// Returns the member handle and the member-level event stream. Mirror
/// transitions additionally post `participant_*` notifications on the
/// session-level stream.
pub(crate) fn spawn_mirror(
    id: MemberId,
    window: Duration,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
) -> (Member, mpsc::UnboundedReceiver<MemberEvent>) {
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    let (member_tx, member_rx) = mpsc::unbounded_channel();
    let state = Arc::new(RwLock::new(ConnectionState::Connected));

    let member = Member {
        id: id.clone(),
        state: Arc::clone(&state),
        input: input_tx.clone(),
    };

    tokio::spawn(async move {
        let timers = TimerService::new(input_tx);
        let mut fsm = ReconnectFsm::new();
        let mut deadline: Option<DeadlineHandle> = None;
        // Relayed signals repeat; remember the last one seen per transport
        let mut seen: HashMap<TransportKind, TransportHealth> = HashMap::new();

        debug!("Member {} mirror started", id);

        while let Some(input) = input_rx.recv().await {
            if let FsmInput::Health(kind, ref health) = input {
                if seen.get(&kind).is_some_and(|last| health.is_repeat_of(last)) {
                    debug!(
                        "Member {} dropping repeated {} signal",
                        id,
                        kind.name()
                    );
                    continue;
                }
                seen.insert(kind, health.clone());
            }

            let previous = fsm.state();
            let Some(transition) = fsm.apply(input) else {
                continue;
            };

            info!(
                "Member {} state transition: {:?} -> {:?}",
                id,
                previous,
                fsm.state()
            );

            match transition {
                Transition::EnterReconnecting { episode, .. } => {
                    deadline =
                        Some(timers.schedule(window, FsmInput::DeadlineElapsed { episode }));
                    *state.write() = ConnectionState::Reconnecting;
                    let _ = member_tx.send(MemberEvent::Reconnecting);
                    let _ = session_tx.send(SessionEvent::ParticipantReconnecting {
                        member: id.clone(),
                    });
                }
                Transition::Recover => {
                    if let Some(mut handle) = deadline.take() {
                        handle.cancel();
                    }
                    *state.write() = ConnectionState::Connected;
                    let _ = member_tx.send(MemberEvent::Reconnected);
                    let _ = session_tx.send(SessionEvent::ParticipantReconnected {
                        member: id.clone(),
                    });
                }
                Transition::Terminate { .. } => {
                    if let Some(mut handle) = deadline.take() {
                        handle.cancel();
                    }
                    *state.write() = ConnectionState::Disconnected;
                    let _ = member_tx.send(MemberEvent::Disconnected);
                    break;
                }
            }
        }

        debug!("Member {} mirror stopped", id);
    });

    (member, member_rx)
}
