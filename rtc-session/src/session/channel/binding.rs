use std::fmt;

use super::RTCMediaChannel;
use crate::session::sdp::RTCMediaKind;

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCChannelState {
    /// Created and receiving content, but not yet carrying media.
    #[default]
    Negotiating,
    /// The exchange reached stable and the channel was switched on.
    Enabled,
}

impl fmt::Display for RTCChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCChannelState::Negotiating => write!(f, "negotiating"),
            RTCChannelState::Enabled => write!(f, "enabled"),
        }
    }
}

/// A channel bound to a content and to the transport that carries it.
pub struct RTCChannel {
    content_name: String,
    transport_name: String,
    state: RTCChannelState,
    pub(crate) media: RTCMediaChannel,
}

impl RTCChannel {
    pub(crate) fn new(content_name: &str, transport_name: &str, media: RTCMediaChannel) -> Self {
        Self {
            content_name: content_name.to_owned(),
            transport_name: transport_name.to_owned(),
            state: RTCChannelState::Negotiating,
            media,
        }
    }

    pub fn content_name(&self) -> &str {
        &self.content_name
    }

    pub fn transport_name(&self) -> &str {
        &self.transport_name
    }

    pub fn kind(&self) -> RTCMediaKind {
        self.media.kind()
    }

    pub fn state(&self) -> RTCChannelState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == RTCChannelState::Enabled
    }

    /// Switches the channel on. A second call is a no-op.
    pub(crate) fn enable(&mut self) -> bool {
        if self.is_enabled() {
            return false;
        }
        self.media.enable(true);
        self.state = RTCChannelState::Enabled;
        true
    }

    pub(crate) fn rebind(&mut self, transport_name: &str) {
        if self.transport_name != transport_name {
            self.media.set_transport(transport_name);
            self.transport_name = transport_name.to_owned();
        }
    }

    pub(crate) fn into_media(self) -> RTCMediaChannel {
        self.media
    }
}

impl fmt::Debug for RTCChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTCChannel")
            .field("content_name", &self.content_name)
            .field("transport_name", &self.transport_name)
            .field("kind", &self.kind())
            .field("state", &self.state)
            .finish()
    }
}
