//! Connection-state coordination for real-time group-communication clients
//!
//! A session depends on two independently-failing transports: a control
//! (signaling) channel to a coordination server and a negotiated media
//! transport. This crate merges their fault/recovery signals into one
//! deterministic connection narrative, drives bounded automatic recovery,
//! and emits ordered, deduplicated lifecycle events for the session and for
//! each remote member.
//!
//! # Features
//!
//! - **Unified state machine**: `Connected` / `Reconnecting` /
//!   `Disconnected` driven by normalized transport health
//! - **Bounded recovery**: a configurable reconnect window converts
//!   lingering faults into a terminal disconnect
//! - **Exactly-once notifications**: one `reconnecting` per disruption
//!   episode, first cause wins, control-channel loss outranks media loss
//! - **Participant mirrors**: per-member replicas of the same machine,
//!   fully independent of the local narrative
//! - **Serialized transitions**: one event queue per machine; stale timer
//!   firings are discarded by episode
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application                                            │
//! │  ↑ (SessionEvent / MemberEvent streams)                 │
//! │  Session                                                │
//! │  ├─ SignalingObserver (control channel health)          │
//! │  ├─ MediaObserver (media transport health)              │
//! │  ├─ Coordinator task (session state machine)            │
//! │  └─ MemberId → participant mirror (per remote member)   │
//! │     ↓                                                   │
//! │  TimerService (reconnect / gathering deadlines)         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use roomlink::SessionConfig;
//!
//! let config = SessionConfig {
//!     reconnect_window_ms: 10_000,
//!     ..Default::default()
//! };
//!
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Async Usage
//!
//! ```no_run
//! use roomlink::{Session, SessionConfig};
//!
//! # async fn example() -> roomlink::Result<()> {
//! let (session, mut events) = Session::start(SessionConfig::default())?;
//!
//! // Wire the observers to the signaling/media subsystems, then react to
//! // the lifecycle narrative
//! while let Some(event) = events.recv().await {
//!     println!("session {}: {}", session.id(), event.name());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

// Public modules
pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod member;
pub mod observer;
pub mod session;
pub mod timer;

// Internal modules
mod coordinator;
mod fsm;

// Re-exports for public API
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use events::{DisruptionCause, MemberEvent, SessionEvent};
pub use fsm::ConnectionState;
pub use health::{TransportFault, TransportHealth, TransportKind};
pub use member::{Member, MemberId};
pub use observer::{close_codes, MediaObserver, SignalingObserver};
pub use session::Session;
pub use timer::{DeadlineHandle, TimerService};

/// Get the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
