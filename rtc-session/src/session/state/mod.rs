//! Negotiation and gathering state types.
//!
//! [`RTCSignalingState`] tracks the offer/answer exchange and decides which
//! Set* calls are legal. [`RTCIceGatheringState`] tracks candidate allocation,
//! both per transport and for the session as a whole.

pub(crate) mod ice_gathering_state;
pub(crate) mod signaling_state;

pub use ice_gathering_state::RTCIceGatheringState;
pub use signaling_state::{
    RTCSignalingState, expect_set_local_description, expect_set_remote_description,
};
