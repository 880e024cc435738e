//! Control-channel state observer
//!
//! Consumes close/reestablish notifications from the signaling subsystem
//! and relayed per-member health carried over the same channel. Local
//! signals feed the session coordinator; member signals are routed to that
//! member's mirror.

use crate::events::DisruptionCause;
use crate::fsm::FsmInput;
use crate::health::{TransportFault, TransportHealth, TransportKind};
use crate::member::{MemberId, MemberRegistry};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Well-known close codes on the control channel
///
/// The 1000-range codes follow the WebSocket close-code registry; the
/// 4000-range codes are assigned by the coordination server.
pub mod close_codes {
    /// Normal closure requested by the local side
    pub const NORMAL: u16 = 1000;

    /// Server going away (restart or migration); recoverable
    pub const GOING_AWAY: u16 = 1001;

    /// Connection dropped without a close frame; recoverable
    pub const ABNORMAL: u16 = 1006;

    /// Session was ended by the coordination server
    pub const SESSION_ENDED: u16 = 4001;

    /// Join rejected or membership revoked
    pub const REJECTED: u16 = 4003;

    /// Whether a close code means the session cannot be resumed
    pub fn is_terminal(code: u16) -> bool {
        matches!(code, SESSION_ENDED | REJECTED)
    }
}

/// Observer for the control (signaling) channel
pub struct SignalingObserver {
    input: mpsc::UnboundedSender<FsmInput>,
    members: MemberRegistry,
    last: Mutex<TransportHealth>,
}

impl SignalingObserver {
    pub(crate) fn new(input: mpsc::UnboundedSender<FsmInput>, members: MemberRegistry) -> Self {
        Self {
            input,
            members,
            last: Mutex::new(TransportHealth::Healthy),
        }
    }

    /// The control channel closed
    ///
    /// `expected` marks a close requested by the local side; it carries no
    /// fault. An unexpected close becomes a control-channel fault, terminal
    /// when the close code says the server ended or rejected the session.
    pub fn channel_closed(&self, expected: bool, code: u16, reason: Option<&str>) {
        if expected {
            debug!("Control channel closed on request (code {})", code);
            return;
        }

        let detail = reason
            .map(str::to_string)
            .unwrap_or_else(|| format!("close code {}", code));
        let fault = TransportFault {
            cause: DisruptionCause::ControlChannelLost,
            terminal: close_codes::is_terminal(code),
            detail: Some(detail),
        };

        warn!(
            "Control channel lost (code {}, terminal: {})",
            code, fault.terminal
        );
        self.forward(TransportHealth::Lost(fault));
    }

    /// The control channel came back up
    pub fn channel_reestablished(&self) {
        info!("Control channel reestablished");
        self.forward(TransportHealth::Healthy);
    }

    /// Relayed signal: a remote member's own control channel dropped
    pub fn member_channel_closed(&self, member: &MemberId, reason: Option<&str>) {
        let mut fault = TransportFault::new(DisruptionCause::ControlChannelLost);
        if let Some(reason) = reason {
            fault = fault.with_detail(reason);
        }
        self.relay(member, TransportHealth::Lost(fault));
    }

    /// Relayed signal: a remote member's control channel recovered
    pub fn member_channel_reestablished(&self, member: &MemberId) {
        self.relay(member, TransportHealth::Healthy);
    }

    fn forward(&self, health: TransportHealth) {
        let mut last = self.last.lock();
        if health.is_repeat_of(&last) {
            debug!("Dropping repeated control channel signal");
            return;
        }
        *last = health.clone();
        let _ = self
            .input
            .send(FsmInput::Health(TransportKind::Signaling, health));
    }

    fn relay(&self, member: &MemberId, health: TransportHealth) {
        match self.members.read().get(member) {
            Some(mirror) => mirror.send_health(TransportKind::Signaling, health),
            None => warn!("Relayed health for unknown member {}", member),
        }
    }
}
