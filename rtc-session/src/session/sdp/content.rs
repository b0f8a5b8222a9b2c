use std::fmt;

use crate::session::candidate::RTCIceCandidate;
use crate::session::configuration::UNSPECIFIED_STR;
use serde::{Deserialize, Serialize};

/// Kind of media a content carries. It decides which channel the session
/// creates for the content.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RTCMediaKind {
    #[default]
    Unspecified,
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "data")]
    Data,
}

const MEDIA_KIND_AUDIO_STR: &str = "audio";
const MEDIA_KIND_VIDEO_STR: &str = "video";
const MEDIA_KIND_DATA_STR: &str = "data";

impl From<&str> for RTCMediaKind {
    fn from(raw: &str) -> Self {
        match raw {
            MEDIA_KIND_AUDIO_STR => RTCMediaKind::Audio,
            MEDIA_KIND_VIDEO_STR => RTCMediaKind::Video,
            MEDIA_KIND_DATA_STR => RTCMediaKind::Data,
            _ => RTCMediaKind::Unspecified,
        }
    }
}

impl fmt::Display for RTCMediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCMediaKind::Audio => write!(f, "{MEDIA_KIND_AUDIO_STR}"),
            RTCMediaKind::Video => write!(f, "{MEDIA_KIND_VIDEO_STR}"),
            RTCMediaKind::Data => write!(f, "{MEDIA_KIND_DATA_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

/// A payload format offered or accepted for a content.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCCodec {
    pub payload_type: u8,
    pub name: String,
    pub clock_rate: u32,
    pub channels: u16,
}

impl RTCCodec {
    pub fn new(payload_type: u8, name: &str, clock_rate: u32, channels: u16) -> Self {
        Self {
            payload_type,
            name: name.to_owned(),
            clock_rate,
            channels,
        }
    }

    /// Two codecs describe the same format when name, clock rate and channel
    /// count agree. Payload types are negotiated and may differ.
    pub fn matches(&self, other: &RTCCodec) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.clock_rate == other.clock_rate
            && self.channels == other.channels
    }
}

/// SDES crypto attribute of a content (RFC 4568).
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCCryptoParams {
    pub tag: u32,
    pub crypto_suite: String,
    pub key_params: String,
}

/// A sending stream inside a content. `id` is the track name the media
/// provider operations look streams up by.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCStreamParams {
    pub id: String,
    pub stream_label: String,
    pub cname: String,
    pub ssrcs: Vec<u32>,
}

impl RTCStreamParams {
    pub fn first_ssrc(&self) -> Option<u32> {
        self.ssrcs.first().copied()
    }

    pub fn has_ssrc(&self, ssrc: u32) -> bool {
        self.ssrcs.contains(&ssrc)
    }
}

/// ICE credentials and the candidates embedded for one content.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCTransportDescription {
    pub ice_ufrag: String,
    pub ice_pwd: String,
    pub candidates: Vec<RTCIceCandidate>,
}

impl RTCTransportDescription {
    /// Credentials are considered equal when both ufrag and pwd match.
    pub fn same_credentials(&self, other: &RTCTransportDescription) -> bool {
        self.ice_ufrag == other.ice_ufrag && self.ice_pwd == other.ice_pwd
    }

    pub(crate) fn has_candidate(&self, candidate: &RTCIceCandidate) -> bool {
        self.candidates.iter().any(|c| c.same_address(candidate))
    }
}

/// One named content of a session description.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCMediaContent {
    pub name: String,
    pub kind: RTCMediaKind,
    /// A rejected content is carried in the description but backed by no channel.
    pub rejected: bool,
    pub codecs: Vec<RTCCodec>,
    pub cryptos: Vec<RTCCryptoParams>,
    pub crypto_required: bool,
    pub streams: Vec<RTCStreamParams>,
    pub transport: RTCTransportDescription,
}

impl RTCMediaContent {
    pub fn new(name: &str, kind: RTCMediaKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            ..Default::default()
        }
    }

    pub fn has_crypto(&self) -> bool {
        !self.cryptos.is_empty()
    }

    pub fn find_stream(&self, track_name: &str) -> Option<&RTCStreamParams> {
        self.streams.iter().find(|s| s.id == track_name)
    }

    pub fn find_stream_by_ssrc(&self, ssrc: u32) -> Option<&RTCStreamParams> {
        self.streams.iter().find(|s| s.has_ssrc(ssrc))
    }
}

pub const GROUP_SEMANTICS_BUNDLE: &str = "BUNDLE";

/// A content group such as `a=group:BUNDLE audio video`.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCContentGroup {
    pub semantics: String,
    pub content_names: Vec<String>,
}

impl RTCContentGroup {
    pub fn bundle(content_names: &[&str]) -> Self {
        Self {
            semantics: GROUP_SEMANTICS_BUNDLE.to_owned(),
            content_names: content_names.iter().map(|name| (*name).to_owned()).collect(),
        }
    }

    pub fn is_bundle(&self) -> bool {
        self.semantics == GROUP_SEMANTICS_BUNDLE
    }

    pub fn first_content_name(&self) -> Option<&str> {
        self.content_names.first().map(String::as_str)
    }

    pub fn has_content_name(&self, name: &str) -> bool {
        self.content_names.iter().any(|n| n == name)
    }
}
