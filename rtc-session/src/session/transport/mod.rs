//! Transport layer seam and the session's bookkeeping of live transports.

use std::fmt;

use crate::session::candidate::RTCIceCandidate;
use crate::session::event::RTCTransportEventSender;
use crate::session::sdp::{RTCSdpType, RTCTransportDescription};
use crate::session::state::RTCIceGatheringState;
use shared::error::Result;

/// ICE/DTLS transports as seen from the negotiation core.
///
/// Transports are named. Every asynchronous signal a transport raises is
/// sent through the [`RTCTransportEventSender`] given at creation.
pub trait TransportLayer {
    fn create_transport(
        &mut self,
        transport_name: &str,
        events: RTCTransportEventSender,
    ) -> Result<()>;

    fn destroy_transport(&mut self, transport_name: &str);

    fn set_local_transport_description(
        &mut self,
        transport_name: &str,
        description: &RTCTransportDescription,
        action: RTCSdpType,
    ) -> Result<()>;

    fn set_remote_transport_description(
        &mut self,
        transport_name: &str,
        description: &RTCTransportDescription,
        action: RTCSdpType,
    ) -> Result<()>;

    /// Starts candidate allocation. Gathered candidates are reported per
    /// content in `content_names`.
    fn start_gathering(&mut self, transport_name: &str, content_names: &[String]) -> Result<()>;

    fn add_remote_candidates(
        &mut self,
        transport_name: &str,
        candidates: &[RTCIceCandidate],
    ) -> Result<()>;

    /// Enables or disables transport sharing for subsequent allocation.
    fn set_bundle_enabled(&mut self, enabled: bool);

    /// Answers a signaling request: the transport may proceed.
    fn signaling_ready(&mut self, transport_name: &str);
}

/// Session-side record of a transport and the contents it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RTCTransportBinding {
    pub(crate) name: String,
    pub(crate) content_names: Vec<String>,
    pub(crate) gathering_state: RTCIceGatheringState,
    pub(crate) connecting: bool,
    pub(crate) writable: bool,
}

impl RTCTransportBinding {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            content_names: vec![],
            gathering_state: RTCIceGatheringState::New,
            connecting: false,
            writable: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_names(&self) -> &[String] {
        &self.content_names
    }

    pub fn gathering_state(&self) -> RTCIceGatheringState {
        self.gathering_state
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub(crate) fn attach(&mut self, content_name: &str) {
        if !self.content_names.iter().any(|n| n == content_name) {
            self.content_names.push(content_name.to_owned());
        }
    }

    pub(crate) fn detach(&mut self, content_name: &str) {
        self.content_names.retain(|n| n != content_name);
    }

    pub(crate) fn is_unreferenced(&self) -> bool {
        self.content_names.is_empty()
    }
}

impl fmt::Display for RTCTransportBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] gathering={}",
            self.name,
            self.content_names.join(","),
            self.gathering_state
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_transport_binding_contents() {
        let mut binding = RTCTransportBinding::new("audio");
        assert!(binding.is_unreferenced());
        assert_eq!(binding.gathering_state(), RTCIceGatheringState::New);

        binding.attach("audio");
        binding.attach("video");
        binding.attach("audio");
        assert_eq!(binding.content_names(), ["audio", "video"]);
        assert_eq!(binding.to_string(), "audio[audio,video] gathering=new");

        binding.detach("audio");
        binding.detach("video");
        assert!(binding.is_unreferenced());
    }
}
