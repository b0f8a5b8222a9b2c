//! Media channels and the manager that allocates them.
//!
//! The session owns one [`RTCChannel`] per negotiated content. The engine
//! side of a channel is created by a [`ChannelManager`] and handed back to
//! it for destruction.

pub(crate) mod binding;

pub use binding::{RTCChannel, RTCChannelState};

use crate::data_channel::parameters::DataChannelParameters;
use crate::data_channel::RTCDataChannelId;
use crate::session::provider::{RTCAudioOptions, RTCVideoCapturer, RTCVideoRenderer};
use crate::session::sdp::{RTCMediaContent, RTCMediaKind, RTCSdpType};
use shared::error::Result;

/// Operations every channel supports regardless of media kind.
pub trait MediaChannel {
    fn set_local_content(&mut self, content: &RTCMediaContent, action: RTCSdpType) -> Result<()>;
    fn set_remote_content(&mut self, content: &RTCMediaContent, action: RTCSdpType)
    -> Result<()>;
    /// Moves the channel onto another transport. Called when BUNDLE
    /// membership changes.
    fn set_transport(&mut self, transport_name: &str);
    fn enable(&mut self, enabled: bool);
}

pub trait VoiceMediaChannel: MediaChannel {
    fn set_playout(&mut self, ssrc: u32, enable: bool) -> Result<()>;
    fn set_send(&mut self, ssrc: u32, enable: bool, options: &RTCAudioOptions) -> Result<()>;
    fn can_insert_dtmf(&self) -> bool;
    fn insert_dtmf(
        &mut self,
        send_ssrc: u32,
        play_ssrc: Option<u32>,
        tones: &str,
        duration_ms: u32,
    ) -> Result<()>;
}

pub trait VideoMediaChannel: MediaChannel {
    fn set_send(&mut self, ssrc: u32, enable: bool) -> Result<()>;
    fn set_capturer(
        &mut self,
        ssrc: u32,
        capturer: Option<Box<dyn RTCVideoCapturer>>,
    ) -> Result<()>;
    fn set_renderer(
        &mut self,
        ssrc: u32,
        renderer: Option<Box<dyn RTCVideoRenderer>>,
    ) -> Result<()>;
}

pub trait DataMediaChannel: MediaChannel {
    fn open_stream(&mut self, id: RTCDataChannelId, params: &DataChannelParameters) -> Result<()>;
}

/// Engine half of a channel, as produced by a [`ChannelManager`].
pub enum RTCMediaChannel {
    Voice(Box<dyn VoiceMediaChannel>),
    Video(Box<dyn VideoMediaChannel>),
    Data(Box<dyn DataMediaChannel>),
}

impl RTCMediaChannel {
    pub fn kind(&self) -> RTCMediaKind {
        match self {
            RTCMediaChannel::Voice(_) => RTCMediaKind::Audio,
            RTCMediaChannel::Video(_) => RTCMediaKind::Video,
            RTCMediaChannel::Data(_) => RTCMediaKind::Data,
        }
    }

    pub(crate) fn set_local_content(
        &mut self,
        content: &RTCMediaContent,
        action: RTCSdpType,
    ) -> Result<()> {
        match self {
            RTCMediaChannel::Voice(c) => c.set_local_content(content, action),
            RTCMediaChannel::Video(c) => c.set_local_content(content, action),
            RTCMediaChannel::Data(c) => c.set_local_content(content, action),
        }
    }

    pub(crate) fn set_remote_content(
        &mut self,
        content: &RTCMediaContent,
        action: RTCSdpType,
    ) -> Result<()> {
        match self {
            RTCMediaChannel::Voice(c) => c.set_remote_content(content, action),
            RTCMediaChannel::Video(c) => c.set_remote_content(content, action),
            RTCMediaChannel::Data(c) => c.set_remote_content(content, action),
        }
    }

    pub(crate) fn set_transport(&mut self, transport_name: &str) {
        match self {
            RTCMediaChannel::Voice(c) => c.set_transport(transport_name),
            RTCMediaChannel::Video(c) => c.set_transport(transport_name),
            RTCMediaChannel::Data(c) => c.set_transport(transport_name),
        }
    }

    pub(crate) fn enable(&mut self, enabled: bool) {
        match self {
            RTCMediaChannel::Voice(c) => c.enable(enabled),
            RTCMediaChannel::Video(c) => c.enable(enabled),
            RTCMediaChannel::Data(c) => c.enable(enabled),
        }
    }
}

/// Allocates and releases the engine side of channels.
pub trait ChannelManager {
    fn create_voice_channel(
        &mut self,
        content_name: &str,
        transport_name: &str,
    ) -> Result<Box<dyn VoiceMediaChannel>>;

    fn create_video_channel(
        &mut self,
        content_name: &str,
        transport_name: &str,
    ) -> Result<Box<dyn VideoMediaChannel>>;

    fn create_data_channel(
        &mut self,
        content_name: &str,
        transport_name: &str,
    ) -> Result<Box<dyn DataMediaChannel>>;

    fn destroy_channel(&mut self, content_name: &str, channel: RTCMediaChannel);
}
