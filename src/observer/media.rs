//! Media transport state observer
//!
//! Consumes connectivity signals from the media subsystem and arms a
//! candidate-gathering watchdog: gathering that produces no usable route
//! within its window is reported as a media fault even if the subsystem
//! never says so explicitly. A generation counter keeps watchdog firings
//! from outliving the gathering round they were armed for.

use crate::events::DisruptionCause;
use crate::fsm::FsmInput;
use crate::health::{TransportFault, TransportHealth, TransportKind};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

struct MediaState {
    last: TransportHealth,
    gathering: bool,
    generation: u64,
}

/// Observer for the negotiated media transport
pub struct MediaObserver {
    input: mpsc::UnboundedSender<FsmInput>,
    gathering_timeout: Duration,
    inner: Arc<Mutex<MediaState>>,
}

impl MediaObserver {
    pub(crate) fn new(input: mpsc::UnboundedSender<FsmInput>, gathering_timeout: Duration) -> Self {
        Self {
            input,
            gathering_timeout,
            inner: Arc::new(Mutex::new(MediaState {
                last: TransportHealth::Healthy,
                gathering: false,
                generation: 0,
            })),
        }
    }

    /// Candidate gathering started; arm the watchdog
    pub fn gathering_started(&self) {
        let generation = {
            let mut state = self.inner.lock();
            state.gathering = true;
            state.generation += 1;
            state.generation
        };
        debug!(
            "Candidate gathering started (watchdog {:?})",
            self.gathering_timeout
        );

        let inner = Arc::clone(&self.inner);
        let input = self.input.clone();
        let timeout = self.gathering_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            let health = {
                let mut state = inner.lock();
                if !state.gathering || state.generation != generation {
                    // A later round superseded this watchdog
                    return;
                }
                state.gathering = false;
                let fault = TransportFault::new(DisruptionCause::MediaConnectivityLost)
                    .with_detail("candidate gathering produced no usable route");
                let health = TransportHealth::Lost(fault);
                if health.is_repeat_of(&state.last) {
                    return;
                }
                state.last = health.clone();
                health
            };

            warn!("Candidate gathering produced no usable route within the window");
            let _ = input.send(FsmInput::Health(TransportKind::Media, health));
        });
    }

    /// Candidate gathering found a usable route; disarm the watchdog
    pub fn gathering_completed(&self) {
        debug!("Candidate gathering completed");
        self.disarm();
    }

    /// The media subsystem reported gathering timed out on its own
    pub fn gathering_timed_out(&self) {
        self.disarm();
        self.forward(TransportHealth::Lost(
            TransportFault::new(DisruptionCause::MediaConnectivityLost)
                .with_detail("candidate gathering timed out"),
        ));
    }

    /// An established media path is impaired but may still recover on its
    /// own
    pub fn connectivity_degraded(&self, detail: Option<&str>) {
        let mut fault = TransportFault::new(DisruptionCause::MediaConnectivityLost);
        if let Some(detail) = detail {
            fault = fault.with_detail(detail);
        }
        self.forward(TransportHealth::Degraded(fault));
    }

    /// An established media path dropped
    pub fn connectivity_lost(&self, detail: Option<&str>) {
        let mut fault = TransportFault::new(DisruptionCause::MediaConnectivityLost);
        if let Some(detail) = detail {
            fault = fault.with_detail(detail);
        }
        self.forward(TransportHealth::Lost(fault));
    }

    /// Media connectivity is back
    pub fn connectivity_restored(&self) {
        self.disarm();
        self.forward(TransportHealth::Healthy);
    }

    fn disarm(&self) {
        let mut state = self.inner.lock();
        state.gathering = false;
        state.generation += 1;
    }

    fn forward(&self, health: TransportHealth) {
        let mut state = self.inner.lock();
        if health.is_repeat_of(&state.last) {
            debug!("Dropping repeated media signal");
            return;
        }
        state.last = health.clone();
        let _ = self.input.send(FsmInput::Health(TransportKind::Media, health));
    }
}

impl Drop for MediaObserver {
    fn drop(&mut self) {
        // Leave any in-flight watchdog with a stale generation
        self.disarm();
    }
}
