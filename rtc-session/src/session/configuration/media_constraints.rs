use serde::{Deserialize, Serialize};

use crate::session::sdp::RTCMediaKind;

/// A local track to be described as a sending stream.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCTrackOptions {
    pub kind: RTCMediaKind,
    /// Track name. Media provider calls look the stream up by this name.
    pub track_id: String,
    pub stream_label: String,
}

impl RTCTrackOptions {
    pub fn new(kind: RTCMediaKind, track_id: &str, stream_label: &str) -> Self {
        Self {
            kind,
            track_id: track_id.to_owned(),
            stream_label: stream_label.to_owned(),
        }
    }
}

/// Options for building an offer or an answer.
///
/// A content of a kind is included when a local track of that kind is
/// present or when receiving that kind is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCMediaConstraints {
    pub offer_to_receive_audio: bool,
    pub offer_to_receive_video: bool,
    /// Group every content into a single BUNDLE group.
    pub use_bundle: bool,
    /// Generate fresh ICE credentials instead of reusing the current ones.
    pub ice_restart: bool,
    pub voice_activity_detection: bool,
    pub tracks: Vec<RTCTrackOptions>,
}

impl Default for RTCMediaConstraints {
    fn default() -> Self {
        Self {
            offer_to_receive_audio: true,
            offer_to_receive_video: true,
            use_bundle: true,
            ice_restart: false,
            voice_activity_detection: true,
            tracks: vec![],
        }
    }
}

impl RTCMediaConstraints {
    pub fn with_track(mut self, track: RTCTrackOptions) -> Self {
        self.tracks.push(track);
        self
    }

    pub(crate) fn has_track_of_kind(&self, kind: RTCMediaKind) -> bool {
        self.tracks.iter().any(|t| t.kind == kind)
    }

    pub(crate) fn wants_kind(&self, kind: RTCMediaKind) -> bool {
        match kind {
            RTCMediaKind::Audio => self.offer_to_receive_audio || self.has_track_of_kind(kind),
            RTCMediaKind::Video => self.offer_to_receive_video || self.has_track_of_kind(kind),
            _ => false,
        }
    }
}
