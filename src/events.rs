//! Lifecycle event types delivered to the application
//!
//! Session-level events flow from the coordinator to the session's event
//! stream; member-level events flow from each participant mirror to the
//! corresponding member object. Events are emitted in transition order for
//! a single state machine; no ordering holds across machines.

use crate::member::MemberId;
use serde::{Deserialize, Serialize};

/// Cause of a connection disruption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisruptionCause {
    /// The control channel closed without a local leave request
    ControlChannelLost,
    /// Candidate gathering produced no usable route within its window, or
    /// an established media path dropped
    MediaConnectivityLost,
}

impl DisruptionCause {
    /// Merge two causes reported for the same disruption.
    ///
    /// Control-channel loss wins: the session cannot recover media without
    /// signaling.
    pub fn merge(self, other: DisruptionCause) -> DisruptionCause {
        match (self, other) {
            (DisruptionCause::ControlChannelLost, _) | (_, DisruptionCause::ControlChannelLost) => {
                DisruptionCause::ControlChannelLost
            }
            _ => DisruptionCause::MediaConnectivityLost,
        }
    }
}

/// Session-level lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The session left `Connected` and automatic recovery started
    Reconnecting {
        /// First fault that triggered the disruption
        cause: DisruptionCause,
    },

    /// The session returned to `Connected` before the reconnect window
    /// elapsed
    Reconnected,

    /// The session reached its terminal state
    Disconnected {
        /// Remaining fault, or `None` for an explicit local leave
        cause: Option<DisruptionCause>,
    },

    /// A remote member's own control channel was disrupted
    ParticipantReconnecting {
        /// Affected member
        member: MemberId,
    },

    /// A remote member's control channel recovered
    ParticipantReconnected {
        /// Affected member
        member: MemberId,
    },
}

impl SessionEvent {
    /// Get the event name for logging/debugging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reconnecting { .. } => "reconnecting",
            Self::Reconnected => "reconnected",
            Self::Disconnected { .. } => "disconnected",
            Self::ParticipantReconnecting { .. } => "participant_reconnecting",
            Self::ParticipantReconnected { .. } => "participant_reconnected",
        }
    }

    /// Member this event refers to, for the participant variants
    pub fn member(&self) -> Option<&MemberId> {
        match self {
            Self::ParticipantReconnecting { member } | Self::ParticipantReconnected { member } => {
                Some(member)
            }
            _ => None,
        }
    }
}

/// Member-level lifecycle events
///
/// Cause is a session-level concept; member events carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberEvent {
    /// The member's control channel was disrupted
    Reconnecting,
    /// The member's control channel recovered
    Reconnected,
    /// The member's mirrored state reached its terminal state
    Disconnected,
}

impl MemberEvent {
    /// Get the event name for logging/debugging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reconnecting => "reconnecting",
            Self::Reconnected => "reconnected",
            Self::Disconnected => "disconnected",
        }
    }
}
