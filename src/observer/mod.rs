//! Transport state observers
//!
//! Each observer wraps one external subsystem's raw fault/recovery signals
//! and forwards normalized, debounced [`TransportHealth`](crate::TransportHealth)
//! updates onto the session's input queue. The signaling observer also
//! routes relayed per-member health to the matching participant mirror.

mod media;
mod signaling;

pub use media::MediaObserver;
pub use signaling::{close_codes, SignalingObserver};
