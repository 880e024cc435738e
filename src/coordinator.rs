//! Session-level reconnection coordinator
//!
//! A dedicated task owning the unified connection state. Observer updates,
//! deadline firings and leave requests all arrive on one queue, so no two
//! transitions ever run concurrently. Each transition updates the shared
//! snapshot before its event is emitted; a reader woken by an event always
//! sees the state that produced it.

use crate::events::SessionEvent;
use crate::fsm::{ConnectionState, FsmInput, ReconnectFsm, Transition};
use crate::timer::{DeadlineHandle, TimerService};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Spawn the coordinator task for one session
///
/// `input_tx` is the same queue the observers post to; the coordinator keeps
/// a clone so its deadline firings serialize with every other input. The
/// task runs until the machine reaches its terminal state or every input
/// sender is dropped.
pub(crate) fn spawn_coordinator(
    session_id: String,
    window: Duration,
    input_tx: mpsc::UnboundedSender<FsmInput>,
    mut input_rx: mpsc::UnboundedReceiver<FsmInput>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    state: Arc<RwLock<ConnectionState>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let timers = TimerService::new(input_tx);
        let mut fsm = ReconnectFsm::new();
        let mut deadline: Option<DeadlineHandle> = None;

        debug!("Session {} coordinator started", session_id);

        while let Some(input) = input_rx.recv().await {
            let previous = fsm.state();
            let Some(transition) = fsm.apply(input) else {
                continue;
            };

            info!(
                "Session {} state transition: {:?} -> {:?}",
                session_id,
                previous,
                fsm.state()
            );

            match transition {
                Transition::EnterReconnecting { cause, episode } => {
                    deadline =
                        Some(timers.schedule(window, FsmInput::DeadlineElapsed { episode }));
                    *state.write() = ConnectionState::Reconnecting;
                    let _ = event_tx.send(SessionEvent::Reconnecting { cause });
                }
                Transition::Recover => {
                    if let Some(mut handle) = deadline.take() {
                        handle.cancel();
                    }
                    *state.write() = ConnectionState::Connected;
                    let _ = event_tx.send(SessionEvent::Reconnected);
                }
                Transition::Terminate { cause } => {
                    if let Some(mut handle) = deadline.take() {
                        handle.cancel();
                    }
                    *state.write() = ConnectionState::Disconnected;
                    let _ = event_tx.send(SessionEvent::Disconnected { cause });
                    break;
                }
            }
        }

        debug!("Session {} coordinator stopped", session_id);
    })
}
