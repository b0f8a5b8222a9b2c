//! Capability sets the session exposes to the application: audio, video,
//! DTMF and data channels. Each is its own trait so a collaborator only
//! sees the capability it consumes.
//!
//! Track names resolve to SSRCs through the negotiated descriptions: the
//! local description for sending and capture, the remote description for
//! playout and rendering.

use log::{debug, info};

use super::RTCSession;
use crate::data_channel::init::RTCDataChannelInit;
use crate::data_channel::parameters::DataChannelParameters;
use crate::data_channel::{MAX_PROTOCOL_LEN, RTCDataChannel, RTCDataChannelId};
use crate::session::channel::{
    DataMediaChannel, RTCMediaChannel, VideoMediaChannel, VoiceMediaChannel,
};
use crate::session::sdp::{RTCMediaKind, RTCSessionDescription};
use shared::error::{Error, Result};

/// Audio processing switches applied when sending starts.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct RTCAudioOptions {
    pub echo_cancellation: Option<bool>,
    pub auto_gain_control: Option<bool>,
    pub noise_suppression: Option<bool>,
}

/// A source of video frames owned by the application.
pub trait RTCVideoCapturer {
    fn id(&self) -> &str;
}

/// A sink of decoded video frames owned by the application.
pub trait RTCVideoRenderer {
    fn id(&self) -> &str;
}

pub trait AudioProvider {
    fn set_audio_playout(&mut self, track_name: &str, enable: bool) -> Result<()>;
    fn set_audio_send(
        &mut self,
        track_name: &str,
        enable: bool,
        options: &RTCAudioOptions,
    ) -> Result<()>;
}

pub trait VideoProvider {
    fn set_capture_device(
        &mut self,
        track_name: &str,
        capturer: Option<Box<dyn RTCVideoCapturer>>,
    ) -> Result<()>;
    /// Attaches `renderer` to a remote track, or detaches with `None`.
    fn set_video_playout(
        &mut self,
        track_name: &str,
        renderer: Option<Box<dyn RTCVideoRenderer>>,
    ) -> Result<()>;
    fn set_video_send(&mut self, track_name: &str, enable: bool) -> Result<()>;
}

pub trait DtmfProvider {
    fn can_insert_dtmf(&self, track_name: &str) -> bool;
    fn insert_dtmf(&mut self, track_name: &str, tones: &str, duration_ms: u32) -> Result<()>;
}

pub trait DataChannelFactory {
    fn create_data_channel(
        &mut self,
        label: &str,
        options: Option<RTCDataChannelInit>,
    ) -> Result<RTCDataChannel>;
}

fn find_ssrc(
    description: Option<&RTCSessionDescription>,
    kind: RTCMediaKind,
    track_name: &str,
) -> Option<u32> {
    description?
        .active_contents()
        .filter(|content| content.kind == kind)
        .find_map(|content| content.find_stream(track_name))
        .and_then(|stream| stream.first_ssrc())
}

impl RTCSession {
    fn local_ssrc(&self, kind: RTCMediaKind, track_name: &str) -> Result<u32> {
        find_ssrc(self.local_description.as_ref(), kind, track_name)
            .ok_or_else(|| Error::ErrTrackNotFound(track_name.to_owned()))
    }

    fn remote_ssrc(&self, kind: RTCMediaKind, track_name: &str) -> Result<u32> {
        find_ssrc(self.remote_description.as_ref(), kind, track_name)
            .ok_or_else(|| Error::ErrTrackNotFound(track_name.to_owned()))
    }

    fn voice_channel_mut(&mut self) -> Result<&mut Box<dyn VoiceMediaChannel>> {
        self.channels
            .iter_mut()
            .find_map(|c| match &mut c.media {
                RTCMediaChannel::Voice(voice) => Some(voice),
                _ => None,
            })
            .ok_or_else(|| Error::ErrChannelNotFound(RTCMediaKind::Audio.to_string()))
    }

    fn voice_channel(&self) -> Option<&dyn VoiceMediaChannel> {
        self.channels.iter().find_map(|c| match &c.media {
            RTCMediaChannel::Voice(voice) => Some(&**voice),
            _ => None,
        })
    }

    fn video_channel_mut(&mut self) -> Result<&mut Box<dyn VideoMediaChannel>> {
        self.channels
            .iter_mut()
            .find_map(|c| match &mut c.media {
                RTCMediaChannel::Video(video) => Some(video),
                _ => None,
            })
            .ok_or_else(|| Error::ErrChannelNotFound(RTCMediaKind::Video.to_string()))
    }

    fn data_channel_mut(&mut self) -> Option<(String, &mut Box<dyn DataMediaChannel>)> {
        self.channels.iter_mut().find_map(|c| {
            let content_name = c.content_name().to_owned();
            match &mut c.media {
                RTCMediaChannel::Data(data) => Some((content_name, data)),
                _ => None,
            }
        })
    }

    fn generate_data_channel_id(&self) -> Result<RTCDataChannelId> {
        if self.data_channels.len() > usize::from(RTCDataChannelId::MAX) {
            return Err(Error::ErrMaxDataChannelId);
        }
        let mut id = rand::random::<RTCDataChannelId>();
        while self.data_channels.contains_key(&id) {
            id = rand::random::<RTCDataChannelId>();
        }
        Ok(id)
    }
}

impl AudioProvider for RTCSession {
    fn set_audio_playout(&mut self, track_name: &str, enable: bool) -> Result<()> {
        self.check_open()?;
        let ssrc = self.remote_ssrc(RTCMediaKind::Audio, track_name)?;
        debug!("audio playout of {track_name} (ssrc {ssrc}) enable={enable}");
        self.voice_channel_mut()?.set_playout(ssrc, enable)
    }

    fn set_audio_send(
        &mut self,
        track_name: &str,
        enable: bool,
        options: &RTCAudioOptions,
    ) -> Result<()> {
        self.check_open()?;
        let ssrc = self.local_ssrc(RTCMediaKind::Audio, track_name)?;
        debug!("audio send of {track_name} (ssrc {ssrc}) enable={enable}");
        self.voice_channel_mut()?.set_send(ssrc, enable, options)
    }
}

impl VideoProvider for RTCSession {
    fn set_capture_device(
        &mut self,
        track_name: &str,
        capturer: Option<Box<dyn RTCVideoCapturer>>,
    ) -> Result<()> {
        self.check_open()?;
        let ssrc = self.local_ssrc(RTCMediaKind::Video, track_name)?;
        let channel = self.video_channel_mut()?;
        match capturer {
            Some(capturer) => {
                debug!("capturer {} attached to {track_name}", capturer.id());
                channel.set_capturer(ssrc, Some(capturer))?;
                channel.set_send(ssrc, true)
            }
            None => {
                debug!("capturer detached from {track_name}");
                channel.set_send(ssrc, false)?;
                channel.set_capturer(ssrc, None)
            }
        }
    }

    fn set_video_playout(
        &mut self,
        track_name: &str,
        renderer: Option<Box<dyn RTCVideoRenderer>>,
    ) -> Result<()> {
        self.check_open()?;
        let ssrc = self.remote_ssrc(RTCMediaKind::Video, track_name)?;
        debug!(
            "renderer {} for {track_name} (ssrc {ssrc})",
            renderer.as_ref().map_or("none", |r| r.id())
        );
        self.video_channel_mut()?.set_renderer(ssrc, renderer)
    }

    fn set_video_send(&mut self, track_name: &str, enable: bool) -> Result<()> {
        self.check_open()?;
        let ssrc = self.local_ssrc(RTCMediaKind::Video, track_name)?;
        self.video_channel_mut()?.set_send(ssrc, enable)
    }
}

impl DtmfProvider for RTCSession {
    fn can_insert_dtmf(&self, track_name: &str) -> bool {
        if self.check_open().is_err() {
            return false;
        }
        self.local_ssrc(RTCMediaKind::Audio, track_name).is_ok()
            && self.voice_channel().is_some_and(|c| c.can_insert_dtmf())
    }

    /// Sends `tones` on the track's SSRC, and plays them out locally on the
    /// remote track of the same name when there is one.
    fn insert_dtmf(&mut self, track_name: &str, tones: &str, duration_ms: u32) -> Result<()> {
        self.check_open()?;
        let send_ssrc = self.local_ssrc(RTCMediaKind::Audio, track_name)?;
        let play_ssrc = self.remote_ssrc(RTCMediaKind::Audio, track_name).ok();
        let channel = self.voice_channel_mut()?;
        if !channel.can_insert_dtmf() {
            return Err(Error::ErrDtmfNotSupported(track_name.to_owned()));
        }
        debug!("inserting dtmf {tones:?} on {track_name} for {duration_ms}ms");
        channel.insert_dtmf(send_ssrc, play_ssrc, tones, duration_ms)
    }
}

impl DataChannelFactory for RTCSession {
    fn create_data_channel(
        &mut self,
        label: &str,
        options: Option<RTCDataChannelInit>,
    ) -> Result<RTCDataChannel> {
        self.check_open()?;
        if !self.configuration.enable_data_channels {
            return Err(Error::ErrDataChannelNotNegotiated);
        }

        let options = options.unwrap_or_default();
        let protocol = options.protocol.unwrap_or_default();
        if protocol.len() > MAX_PROTOCOL_LEN {
            return Err(Error::ErrProtocolTooLarge);
        }
        if options.max_packet_life_time.is_some() && options.max_retransmits.is_some() {
            return Err(Error::ErrRetransmitsOrPacketLifeTime);
        }

        let id = match options.negotiated {
            Some(id) if self.data_channels.contains_key(&id) => {
                return Err(Error::ErrDataChannelIdInUse(id));
            }
            Some(id) => id,
            None => self.generate_data_channel_id()?,
        };

        let params = DataChannelParameters {
            label: label.to_owned(),
            protocol,
            ordered: options.ordered.unwrap_or(true),
            max_packet_life_time: options.max_packet_life_time,
            max_retransmits: options.max_retransmits,
            negotiated: options.negotiated.is_some(),
        };

        let Some((content_name, channel)) = self.data_channel_mut() else {
            return Err(Error::ErrDataChannelNotNegotiated);
        };
        channel.open_stream(id, &params)?;
        info!("opened data channel {label} (id {id}) on {content_name}");

        let data_channel = RTCDataChannel {
            id,
            content_name,
            params,
        };
        self.data_channels.insert(id, data_channel.clone());
        Ok(data_channel)
    }
}
