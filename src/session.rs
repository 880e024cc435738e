//! Session object owning the coordinator, observers and member registry

use crate::config::SessionConfig;
use crate::coordinator;
use crate::error::{Error, Result};
use crate::events::{MemberEvent, SessionEvent};
use crate::fsm::{ConnectionState, FsmInput};
use crate::member::{self, Member, MemberId, MemberRegistry};
use crate::observer::{MediaObserver, SignalingObserver};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// A joined real-time communication session
///
/// Owns the reconnection coordinator, both transport observers and the
/// registry of remote members. The connection narrative is read through the
/// event stream returned by [`Session::start`] or through
/// [`Session::connection_state`] snapshots; it is never mutated directly.
pub struct Session {
    id: String,
    config: SessionConfig,
    state: Arc<RwLock<ConnectionState>>,
    input: mpsc::UnboundedSender<FsmInput>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    signaling: SignalingObserver,
    media: MediaObserver,
    members: MemberRegistry,
}

impl Session {
    /// Start a session with the given configuration
    ///
    /// Returns the session and its lifecycle event stream. The session
    /// starts `Connected`; both transports are assumed healthy until an
    /// observer says otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn start(config: SessionConfig) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>)> {
        config.validate()?;

        let id = config
            .session_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = Arc::new(RwLock::new(ConnectionState::Connected));

        coordinator::spawn_coordinator(
            id.clone(),
            config.reconnect_window(),
            input_tx.clone(),
            input_rx,
            event_tx.clone(),
            Arc::clone(&state),
        );

        let members: MemberRegistry = Arc::new(RwLock::new(HashMap::new()));
        let signaling = SignalingObserver::new(input_tx.clone(), Arc::clone(&members));
        let media = MediaObserver::new(input_tx.clone(), config.ice_gathering_timeout());

        info!("Session {} started", id);

        Ok((
            Self {
                id,
                config,
                state,
                input: input_tx,
                event_tx,
                signaling,
                media,
                members,
            },
            event_rx,
        ))
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last-known unified connection state
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Observer fed by the signaling subsystem
    pub fn signaling(&self) -> &SignalingObserver {
        &self.signaling
    }

    /// Observer fed by the media subsystem
    pub fn media(&self) -> &MediaObserver {
        &self.media
    }

    /// Register a remote member and spawn its participant mirror
    ///
    /// Returns the member handle and that member's own event stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the session already disconnected or the member
    /// is already registered.
    pub fn add_member(
        &self,
        id: impl Into<MemberId>,
    ) -> Result<(Member, mpsc::UnboundedReceiver<MemberEvent>)> {
        let id = id.into();

        if self.connection_state() == ConnectionState::Disconnected {
            return Err(Error::SessionClosed(self.id.clone()));
        }

        let mut members = self.members.write();
        if members.contains_key(&id) {
            return Err(Error::MemberAlreadyRegistered(id.to_string()));
        }

        let (member, events) = member::spawn_mirror(
            id.clone(),
            self.config.reconnect_window(),
            self.event_tx.clone(),
        );
        members.insert(id.clone(), member.clone());

        info!("Session {} added member {}", self.id, id);
        Ok((member, events))
    }

    /// Remove a member and tear its mirror down
    ///
    /// # Errors
    ///
    /// Returns an error if the member is not registered.
    pub fn remove_member(&self, id: &MemberId) -> Result<()> {
        match self.members.write().remove(id) {
            Some(mirror) => {
                mirror.leave();
                info!("Session {} removed member {}", self.id, id);
                Ok(())
            }
            None => Err(Error::MemberNotFound(id.to_string())),
        }
    }

    /// Look up a member handle
    pub fn member(&self, id: &MemberId) -> Option<Member> {
        self.members.read().get(id).cloned()
    }

    /// Number of registered remote members
    pub fn member_count(&self) -> usize {
        self.members.read().len()
    }

    /// Leave the session
    ///
    /// Terminal: no reconnection is attempted, the disconnect carries no
    /// cause, and every mirror's timers are canceled along with the
    /// session's own.
    ///
    /// # Errors
    ///
    /// Returns an error if the session already disconnected.
    pub fn leave(&self) -> Result<()> {
        info!("Session {} leaving", self.id);

        for (_, mirror) in self.members.write().drain() {
            mirror.leave();
        }

        self.input
            .send(FsmInput::Leave)
            .map_err(|_| Error::SessionClosed(self.id.clone()))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for (_, mirror) in self.members.write().drain() {
            mirror.leave();
        }
        // Best-effort: already-terminal sessions have no receiver anymore
        if self.input.send(FsmInput::Leave).is_ok() {
            warn!("Session {} dropped without an explicit leave", self.id);
        }
    }
}
