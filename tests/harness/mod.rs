//! Reconnection fault-injection harness
//!
//! Drives a [`Session`] through simulated transport faults and collects the
//! lifecycle events it emits:
//!
//! - Loss and restoration of the control channel and the media transport,
//!   individually or together (full network-path replacement)
//! - Server-side rejection via terminal close codes
//! - Relayed per-member control-channel flaps
//!
//! Tests run under `#[tokio::test(start_paused = true)]` so reconnect and
//! gathering deadlines elapse deterministically while waiting on the event
//! streams.

#![allow(dead_code)]

use roomlink::{
    close_codes, Member, MemberEvent, MemberId, Session, SessionConfig, SessionEvent,
};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Reconnect window used by [`FaultHarness::start`]
pub const WINDOW: Duration = Duration::from_millis(2_000);

/// Candidate gathering timeout used by [`FaultHarness::start`]
pub const GATHERING_TIMEOUT: Duration = Duration::from_millis(500);

/// Upper bound on waiting for an expected event
const EVENT_WAIT: Duration = Duration::from_secs(60);

/// How long a stream must stay silent to count as idle
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// A session under fault injection plus its collected event stream
pub struct FaultHarness {
    pub session: Session,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    /// Events skipped by a filtered wait, kept for later retrieval
    deferred: VecDeque<SessionEvent>,
}

impl FaultHarness {
    /// Start a session with short test windows
    pub fn start() -> Self {
        Self::with_config(SessionConfig {
            session_id: Some("test-session".to_string()),
            reconnect_window_ms: WINDOW.as_millis() as u64,
            ice_gathering_timeout_ms: GATHERING_TIMEOUT.as_millis() as u64,
        })
    }

    /// Start a session with a custom configuration
    pub fn with_config(config: SessionConfig) -> Self {
        init_tracing();
        let (session, events) = Session::start(config).expect("session start");
        Self {
            session,
            events,
            deferred: VecDeque::new(),
        }
    }

    // Fault injection ------------------------------------------------------

    /// Unexpectedly close the control channel (recoverable)
    pub fn drop_control_channel(&self) {
        self.session
            .signaling()
            .channel_closed(false, close_codes::ABNORMAL, Some("connection reset"));
    }

    /// Bring the control channel back up
    pub fn restore_control_channel(&self) {
        self.session.signaling().channel_reestablished();
    }

    /// Close the control channel with a terminal rejection code
    pub fn reject_session(&self) {
        self.session.signaling().channel_closed(
            false,
            close_codes::SESSION_ENDED,
            Some("session ended by server"),
        );
    }

    /// Drop the established media path
    pub fn drop_media(&self) {
        self.session
            .media()
            .connectivity_lost(Some("ice connection failed"));
    }

    /// Restore media connectivity
    pub fn restore_media(&self) {
        self.session.media().connectivity_restored();
    }

    /// Lose every transport at once
    pub fn drop_all_transports(&self) {
        self.drop_media();
        self.drop_control_channel();
    }

    /// Restore every transport at once
    pub fn restore_all_transports(&self) {
        self.restore_control_channel();
        self.restore_media();
    }

    /// Simulate a full replacement of the underlying network path
    pub fn replace_network_path(&self) {
        self.drop_all_transports();
        self.restore_all_transports();
    }

    /// Relayed signal: `member`'s own control channel dropped
    pub fn drop_member_channel(&self, member: &MemberId) {
        self.session
            .signaling()
            .member_channel_closed(member, Some("connection reset"));
    }

    /// Relayed signal: `member`'s control channel recovered
    pub fn restore_member_channel(&self, member: &MemberId) {
        self.session.signaling().member_channel_reestablished(member);
    }

    // Membership -----------------------------------------------------------

    /// Register a member and return its handle plus event stream
    pub fn add_member(&self, id: &str) -> (Member, mpsc::UnboundedReceiver<MemberEvent>) {
        self.session.add_member(id).expect("add member")
    }

    // Event collection -----------------------------------------------------

    /// Wait for the next session-level event, deferred ones first
    pub async fn next_event(&mut self) -> SessionEvent {
        if let Some(event) = self.deferred.pop_front() {
            return event;
        }
        self.recv_event().await
    }

    /// Wait for the next event about the local session, deferring
    /// participant notifications (cross-machine order is unspecified)
    pub async fn next_local_event(&mut self) -> SessionEvent {
        self.next_event_matching(|event| event.member().is_none())
            .await
    }

    /// Wait for the next participant notification, deferring local events
    pub async fn next_participant_event(&mut self) -> SessionEvent {
        self.next_event_matching(|event| event.member().is_some())
            .await
    }

    /// Assert the session stream stays silent and nothing is left deferred
    pub async fn expect_idle(&mut self) {
        if let Some(event) = self.deferred.pop_front() {
            panic!("expected idle session stream, had deferred {:?}", event);
        }
        if let Ok(event) = timeout(IDLE_WAIT, self.events.recv()).await {
            panic!("expected idle session stream, got {:?}", event);
        }
    }

    async fn next_event_matching(
        &mut self,
        matches: impl Fn(&SessionEvent) -> bool,
    ) -> SessionEvent {
        if let Some(pos) = self.deferred.iter().position(|event| matches(event)) {
            return self.deferred.remove(pos).expect("position is in range");
        }
        loop {
            let event = self.recv_event().await;
            if matches(&event) {
                return event;
            }
            self.deferred.push_back(event);
        }
    }

    async fn recv_event(&mut self) -> SessionEvent {
        timeout(EVENT_WAIT, self.events.recv())
            .await
            .expect("timed out waiting for session event")
            .expect("session event stream closed")
    }
}

/// Assert a member event stream stays silent
pub async fn expect_member_idle(events: &mut mpsc::UnboundedReceiver<MemberEvent>) {
    if let Ok(event) = timeout(IDLE_WAIT, events.recv()).await {
        panic!("expected idle member stream, got {:?}", event);
    }
}

/// Wait for the next member-level event
pub async fn next_member_event(events: &mut mpsc::UnboundedReceiver<MemberEvent>) -> MemberEvent {
    timeout(EVENT_WAIT, events.recv())
        .await
        .expect("timed out waiting for member event")
        .expect("member event stream closed")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("roomlink=debug")),
        )
        .with_test_writer()
        .try_init();
}
