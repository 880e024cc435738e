//! Normalized transport health signals
//!
//! Observers reduce raw subsystem callbacks to these values; the
//! reconnection state machines consume nothing else.

use crate::events::DisruptionCause;
use serde::{Deserialize, Serialize};

/// The two transports a session depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    /// Control (signaling) channel to the coordination server
    Signaling,
    /// Peer or relayed media transport
    Media,
}

impl TransportKind {
    /// Get the transport name for logging/debugging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Signaling => "signaling",
            Self::Media => "media",
        }
    }
}

/// Typed fault attached to an unhealthy transport signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFault {
    /// What kind of disruption this is
    pub cause: DisruptionCause,

    /// Terminal faults bypass the reconnect window (e.g. the session was
    /// rejected or ended by the coordination server)
    pub terminal: bool,

    /// Human-readable detail for diagnostics (close reason, timeout
    /// description)
    pub detail: Option<String>,
}

impl TransportFault {
    /// Create a recoverable fault
    pub fn new(cause: DisruptionCause) -> Self {
        Self {
            cause,
            terminal: false,
            detail: None,
        }
    }

    /// Create a terminal fault
    pub fn terminal(cause: DisruptionCause) -> Self {
        Self {
            cause,
            terminal: true,
            detail: None,
        }
    }

    /// Attach a diagnostic detail string
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Health of one transport as seen by its observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportHealth {
    /// Operating normally
    Healthy,
    /// Impaired but possibly still usable
    Degraded(TransportFault),
    /// No usable connectivity
    Lost(TransportFault),
}

impl TransportHealth {
    /// Whether the transport is operating normally
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// The fault carried by an unhealthy signal
    pub fn fault(&self) -> Option<&TransportFault> {
        match self {
            Self::Healthy => None,
            Self::Degraded(fault) | Self::Lost(fault) => Some(fault),
        }
    }

    /// Whether this signal repeats `earlier`: same level, same cause, same
    /// severity. Detail strings are ignored; they vary per notification.
    pub fn is_repeat_of(&self, earlier: &TransportHealth) -> bool {
        match (self, earlier) {
            (Self::Healthy, Self::Healthy) => true,
            (Self::Degraded(a), Self::Degraded(b)) | (Self::Lost(a), Self::Lost(b)) => {
                a.cause == b.cause && a.terminal == b.terminal
            }
            _ => false,
        }
    }
}
