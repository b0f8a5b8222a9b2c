pub mod bundle_policy;
pub mod media_constraints;
pub mod secure_policy;

use serde::{Deserialize, Serialize};

use crate::session::sdp::RTCCodec;
use bundle_policy::RTCBundlePolicy;
use secure_policy::RTCSecurePolicy;
use shared::error::{Error, Result};

/// Display value of every enum's `Unspecified` variant.
pub(crate) const UNSPECIFIED_STR: &str = "Unspecified";

const MIN_UFRAG_LEN: usize = 4;
const MIN_PWD_LEN: usize = 22;

/// Settings that stay fixed for the lifetime of a session.
///
/// The secure policy configured here is only the initial value;
/// [`RTCSession::set_secure_policy`](crate::session::RTCSession::set_secure_policy)
/// changes it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCConfiguration {
    pub(crate) secure_policy: RTCSecurePolicy,
    pub(crate) bundle_policy: RTCBundlePolicy,

    /// Data contents are offered and accepted only when this is set.
    pub(crate) enable_data_channels: bool,

    /// Permits SetLocalDescription(offer) while an earlier local offer is
    /// still outstanding. The second offer replaces the first.
    pub(crate) allow_repeated_local_offer: bool,

    pub(crate) audio_codecs: Vec<RTCCodec>,
    pub(crate) video_codecs: Vec<RTCCodec>,

    /// Fixed local ICE credentials. Random ones are generated when unset.
    pub(crate) ice_ufrag: Option<String>,
    pub(crate) ice_pwd: Option<String>,
}

impl Default for RTCConfiguration {
    fn default() -> Self {
        RTCConfigurationBuilder::new().build()
    }
}

impl RTCConfiguration {
    pub fn secure_policy(&self) -> RTCSecurePolicy {
        self.secure_policy
    }

    pub fn bundle_policy(&self) -> RTCBundlePolicy {
        self.bundle_policy
    }

    pub fn enable_data_channels(&self) -> bool {
        self.enable_data_channels
    }

    pub fn allow_repeated_local_offer(&self) -> bool {
        self.allow_repeated_local_offer
    }

    pub fn audio_codecs(&self) -> &[RTCCodec] {
        &self.audio_codecs
    }

    pub fn video_codecs(&self) -> &[RTCCodec] {
        &self.video_codecs
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.audio_codecs.is_empty() && self.video_codecs.is_empty() {
            return Err(Error::ErrNoCodecs("audio or video".to_owned()));
        }
        if let Some(ufrag) = &self.ice_ufrag {
            if ufrag.len() < MIN_UFRAG_LEN {
                return Err(Error::ErrLocalUfragInsufficientBits);
            }
        }
        if let Some(pwd) = &self.ice_pwd {
            if pwd.len() < MIN_PWD_LEN {
                return Err(Error::ErrLocalPwdInsufficientBits);
            }
        }
        Ok(())
    }
}

pub(crate) fn default_audio_codecs() -> Vec<RTCCodec> {
    vec![
        RTCCodec::new(111, "opus", 48000, 2),
        RTCCodec::new(0, "PCMU", 8000, 1),
    ]
}

pub(crate) fn default_video_codecs() -> Vec<RTCCodec> {
    vec![
        RTCCodec::new(96, "VP8", 90000, 0),
        RTCCodec::new(102, "H264", 90000, 0),
    ]
}

#[derive(Debug, Clone)]
pub struct RTCConfigurationBuilder {
    pub(crate) secure_policy: RTCSecurePolicy,
    pub(crate) bundle_policy: RTCBundlePolicy,
    pub(crate) enable_data_channels: bool,
    pub(crate) allow_repeated_local_offer: bool,
    pub(crate) audio_codecs: Vec<RTCCodec>,
    pub(crate) video_codecs: Vec<RTCCodec>,
    pub(crate) ice_ufrag: Option<String>,
    pub(crate) ice_pwd: Option<String>,
}

impl Default for RTCConfigurationBuilder {
    fn default() -> Self {
        Self {
            secure_policy: RTCSecurePolicy::default(),
            bundle_policy: RTCBundlePolicy::default(),
            enable_data_channels: false,
            allow_repeated_local_offer: false,
            audio_codecs: default_audio_codecs(),
            video_codecs: default_video_codecs(),
            ice_ufrag: None,
            ice_pwd: None,
        }
    }
}

impl RTCConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secure_policy(mut self, secure_policy: RTCSecurePolicy) -> Self {
        self.secure_policy = secure_policy;
        self
    }

    pub fn with_bundle_policy(mut self, bundle_policy: RTCBundlePolicy) -> Self {
        self.bundle_policy = bundle_policy;
        self
    }

    pub fn with_data_channels(mut self, enable_data_channels: bool) -> Self {
        self.enable_data_channels = enable_data_channels;
        self
    }

    pub fn with_repeated_local_offer(mut self, allow_repeated_local_offer: bool) -> Self {
        self.allow_repeated_local_offer = allow_repeated_local_offer;
        self
    }

    pub fn with_audio_codecs(mut self, audio_codecs: Vec<RTCCodec>) -> Self {
        self.audio_codecs = audio_codecs;
        self
    }

    pub fn with_video_codecs(mut self, video_codecs: Vec<RTCCodec>) -> Self {
        self.video_codecs = video_codecs;
        self
    }

    pub fn with_ice_credentials(mut self, ufrag: &str, pwd: &str) -> Self {
        self.ice_ufrag = Some(ufrag.to_owned());
        self.ice_pwd = Some(pwd.to_owned());
        self
    }

    pub fn build(self) -> RTCConfiguration {
        RTCConfiguration {
            secure_policy: self.secure_policy,
            bundle_policy: self.bundle_policy,
            enable_data_channels: self.enable_data_channels,
            allow_repeated_local_offer: self.allow_repeated_local_offer,
            audio_codecs: self.audio_codecs,
            video_codecs: self.video_codecs,
            ice_ufrag: self.ice_ufrag,
            ice_pwd: self.ice_pwd,
        }
    }
}
