//! Structured session descriptions.
//!
//! A [`RTCSessionDescription`] is the parsed form of an SDP blob: a declared
//! [`RTCSdpType`], an ordered list of named [`RTCMediaContent`]s and the
//! content groups (BUNDLE) that tie them together.

pub(crate) mod content;
pub(crate) mod sdp_type;
pub(crate) mod session_description;

pub use content::{
    GROUP_SEMANTICS_BUNDLE, RTCCodec, RTCContentGroup, RTCCryptoParams, RTCMediaContent,
    RTCMediaKind, RTCStreamParams, RTCTransportDescription,
};
pub use sdp_type::RTCSdpType;
pub use session_description::RTCSessionDescription;
