//! Builds offers and answers from the configured capabilities.

use log::{debug, trace};

use crate::session::configuration::RTCConfiguration;
use crate::session::configuration::bundle_policy::RTCBundlePolicy;
use crate::session::configuration::media_constraints::RTCMediaConstraints;
use crate::session::configuration::secure_policy::RTCSecurePolicy;
use crate::session::sdp::{
    RTCCodec, RTCContentGroup, RTCCryptoParams, RTCMediaContent, RTCMediaKind,
    RTCSessionDescription, RTCStreamParams, RTCTransportDescription,
};
use shared::error::{Error, Result};
use shared::util::{generate_ice_pwd, generate_ice_ufrag, math_rand_alpha, math_rand_alpha_number};

pub const CRYPTO_SUITE_AES_CM_128_HMAC_SHA1_80: &str = "AES_CM_128_HMAC_SHA1_80";
pub const CRYPTO_SUITE_AES_CM_128_HMAC_SHA1_32: &str = "AES_CM_128_HMAC_SHA1_32";

const SUPPORTED_CRYPTO_SUITES: [&str; 2] = [
    CRYPTO_SUITE_AES_CM_128_HMAC_SHA1_80,
    CRYPTO_SUITE_AES_CM_128_HMAC_SHA1_32,
];

/// Base64 length of a 30 byte SRTP master key and salt.
const CRYPTO_KEY_LEN: usize = 40;
const CNAME_LEN: usize = 16;

const CONTENT_NAME_AUDIO: &str = "audio";
const CONTENT_NAME_VIDEO: &str = "video";
const CONTENT_NAME_DATA: &str = "data";

pub(crate) fn data_codec() -> RTCCodec {
    RTCCodec::new(109, "google-data", 90000, 0)
}

/// Produces the descriptions handed out by create_offer and create_answer.
///
/// `current` is the local description currently in place, if any. It lets a
/// factory keep m-line order, ssrcs, keys and ICE credentials stable across
/// renegotiation.
pub trait SessionDescriptionFactory {
    fn create_offer(
        &self,
        constraints: &RTCMediaConstraints,
        current: Option<&RTCSessionDescription>,
    ) -> Result<RTCSessionDescription>;

    fn create_answer(
        &self,
        offer: &RTCSessionDescription,
        constraints: &RTCMediaConstraints,
        current: Option<&RTCSessionDescription>,
    ) -> Result<RTCSessionDescription>;

    fn secure_policy(&self) -> RTCSecurePolicy;

    fn set_secure_policy(&mut self, secure_policy: RTCSecurePolicy);
}

/// Default factory: offers the configured codecs, intersects codecs and
/// crypto suites when answering and mirrors BUNDLE.
#[derive(Debug, Clone)]
pub struct RTCMediaSessionDescriptionFactory {
    secure_policy: RTCSecurePolicy,
    bundle_policy: RTCBundlePolicy,
    enable_data_channels: bool,
    audio_codecs: Vec<RTCCodec>,
    video_codecs: Vec<RTCCodec>,
    ice_ufrag: Option<String>,
    ice_pwd: Option<String>,
}

impl RTCMediaSessionDescriptionFactory {
    pub fn new(configuration: &RTCConfiguration) -> Self {
        Self {
            secure_policy: configuration.secure_policy,
            bundle_policy: configuration.bundle_policy,
            enable_data_channels: configuration.enable_data_channels,
            audio_codecs: configuration.audio_codecs.clone(),
            video_codecs: configuration.video_codecs.clone(),
            ice_ufrag: configuration.ice_ufrag.clone(),
            ice_pwd: configuration.ice_pwd.clone(),
        }
    }

    fn codecs_for(&self, kind: RTCMediaKind) -> Vec<RTCCodec> {
        match kind {
            RTCMediaKind::Audio => self.audio_codecs.clone(),
            RTCMediaKind::Video => self.video_codecs.clone(),
            RTCMediaKind::Data => vec![data_codec()],
            RTCMediaKind::Unspecified => vec![],
        }
    }

    fn bundle_allowed(&self, constraints: &RTCMediaConstraints) -> bool {
        constraints.use_bundle && self.bundle_policy.allows_bundle()
    }

    /// One credential set per description. Reused from `current` unless an
    /// ICE restart was requested.
    fn transport_description(
        &self,
        constraints: &RTCMediaConstraints,
        current: Option<&RTCSessionDescription>,
    ) -> RTCTransportDescription {
        if let (Some(ufrag), Some(pwd)) = (&self.ice_ufrag, &self.ice_pwd) {
            return RTCTransportDescription {
                ice_ufrag: ufrag.clone(),
                ice_pwd: pwd.clone(),
                candidates: vec![],
            };
        }

        if !constraints.ice_restart {
            if let Some(existing) = current
                .and_then(|desc| desc.active_contents().next())
                .map(|content| &content.transport)
            {
                return RTCTransportDescription {
                    ice_ufrag: existing.ice_ufrag.clone(),
                    ice_pwd: existing.ice_pwd.clone(),
                    candidates: vec![],
                };
            }
        }

        RTCTransportDescription {
            ice_ufrag: generate_ice_ufrag(),
            ice_pwd: generate_ice_pwd(),
            candidates: vec![],
        }
    }

    fn offer_cryptos(&self, existing: Option<&RTCMediaContent>) -> Vec<RTCCryptoParams> {
        if !self.secure_policy.offers_crypto() {
            return vec![];
        }
        if let Some(existing) = existing.filter(|c| c.has_crypto()) {
            return existing.cryptos.clone();
        }
        SUPPORTED_CRYPTO_SUITES
            .iter()
            .zip(1u32..)
            .map(|(suite, tag)| new_crypto(tag, suite))
            .collect()
    }

    /// Picks the first offered suite this side supports. `None` means no
    /// crypto goes into the answer.
    fn answer_crypto(
        &self,
        offered: &RTCMediaContent,
        existing: Option<&RTCMediaContent>,
    ) -> Option<RTCCryptoParams> {
        if !self.secure_policy.offers_crypto() {
            return None;
        }
        let chosen = offered
            .cryptos
            .iter()
            .find(|c| SUPPORTED_CRYPTO_SUITES.contains(&c.crypto_suite.as_str()))?;

        let reused = existing
            .and_then(|content| {
                content
                    .cryptos
                    .iter()
                    .find(|c| c.crypto_suite == chosen.crypto_suite)
            })
            .map(|c| c.key_params.clone());

        Some(RTCCryptoParams {
            tag: chosen.tag,
            crypto_suite: chosen.crypto_suite.clone(),
            key_params: reused.unwrap_or_else(new_key_params),
        })
    }

    fn streams(
        &self,
        kind: RTCMediaKind,
        constraints: &RTCMediaConstraints,
        existing: Option<&RTCMediaContent>,
        cname: &str,
    ) -> Vec<RTCStreamParams> {
        constraints
            .tracks
            .iter()
            .filter(|track| track.kind == kind)
            .map(|track| {
                if let Some(stream) = existing.and_then(|c| c.find_stream(&track.track_id)) {
                    return stream.clone();
                }
                RTCStreamParams {
                    id: track.track_id.clone(),
                    stream_label: track.stream_label.clone(),
                    cname: cname.to_owned(),
                    ssrcs: vec![new_ssrc()],
                }
            })
            .collect()
    }

    /// Content kinds this offer carries, in m-line order. Kinds already
    /// described keep their position.
    fn offered_kinds(
        &self,
        constraints: &RTCMediaConstraints,
        current: Option<&RTCSessionDescription>,
    ) -> Vec<(String, RTCMediaKind, bool)> {
        let mut wanted = vec![];
        for kind in [RTCMediaKind::Audio, RTCMediaKind::Video] {
            if constraints.wants_kind(kind) {
                wanted.push(kind);
            }
        }
        if self.enable_data_channels {
            wanted.push(RTCMediaKind::Data);
        }

        let mut kinds = vec![];
        if let Some(current) = current {
            for content in &current.contents {
                let keep = wanted.contains(&content.kind)
                    && !kinds.iter().any(|(_, k, active)| *k == content.kind && *active);
                kinds.push((content.name.clone(), content.kind, keep));
            }
        }
        for kind in wanted {
            if !kinds.iter().any(|(_, k, active)| *k == kind && *active) {
                kinds.push((default_content_name(kind, &kinds), kind, true));
            }
        }
        kinds
    }
}

impl SessionDescriptionFactory for RTCMediaSessionDescriptionFactory {
    fn create_offer(
        &self,
        constraints: &RTCMediaConstraints,
        current: Option<&RTCSessionDescription>,
    ) -> Result<RTCSessionDescription> {
        let transport = self.transport_description(constraints, current);
        let cname = session_cname(current);

        let mut contents = vec![];
        for (name, kind, active) in self.offered_kinds(constraints, current) {
            let existing = current.and_then(|desc| desc.content(&name));
            if !active {
                let mut rejected = RTCMediaContent::new(&name, kind);
                rejected.rejected = true;
                contents.push(rejected);
                continue;
            }

            let codecs = self.codecs_for(kind);
            if codecs.is_empty() {
                return Err(Error::ErrNoCodecs(kind.to_string()));
            }

            contents.push(RTCMediaContent {
                name: name.clone(),
                kind,
                rejected: false,
                codecs,
                cryptos: self.offer_cryptos(existing),
                crypto_required: self.secure_policy.is_required(),
                streams: self.streams(kind, constraints, existing, &cname),
                transport: transport.clone(),
            });
        }

        let mut groups = vec![];
        if self.bundle_allowed(constraints) {
            let names: Vec<&str> = contents
                .iter()
                .filter(|c| !c.rejected)
                .map(|c| c.name.as_str())
                .collect();
            if !names.is_empty() {
                groups.push(RTCContentGroup::bundle(&names));
            }
        }

        debug!(
            "created offer with {} contents, bundle={}",
            contents.len(),
            !groups.is_empty()
        );
        Ok(RTCSessionDescription::offer(contents, groups))
    }

    fn create_answer(
        &self,
        offer: &RTCSessionDescription,
        constraints: &RTCMediaConstraints,
        current: Option<&RTCSessionDescription>,
    ) -> Result<RTCSessionDescription> {
        let transport = self.transport_description(constraints, current);
        let cname = session_cname(current);

        let mut contents = vec![];
        for offered in &offer.contents {
            let existing = current.and_then(|desc| desc.content(&offered.name));
            let mut answer = RTCMediaContent::new(&offered.name, offered.kind);

            let accepted_kind = match offered.kind {
                RTCMediaKind::Audio | RTCMediaKind::Video => constraints.wants_kind(offered.kind),
                RTCMediaKind::Data => self.enable_data_channels,
                RTCMediaKind::Unspecified => false,
            };
            let ours = self.codecs_for(offered.kind);
            let codecs: Vec<RTCCodec> = offered
                .codecs
                .iter()
                .filter(|codec| ours.iter().any(|c| c.matches(codec)))
                .cloned()
                .collect();
            let crypto = self.answer_crypto(offered, existing);
            // Either side demanding crypto turns "no common suite" into a rejection.
            let crypto_refused = crypto.is_none()
                && (self.secure_policy.is_required() || offered.crypto_required);

            if offered.rejected || !accepted_kind || codecs.is_empty() || crypto_refused {
                trace!(
                    "rejecting content {}: rejected={} accepted_kind={} codecs={} crypto_refused={}",
                    offered.name,
                    offered.rejected,
                    accepted_kind,
                    codecs.len(),
                    crypto_refused
                );
                answer.rejected = true;
                contents.push(answer);
                continue;
            }

            answer.codecs = codecs;
            answer.cryptos = crypto.into_iter().collect();
            answer.crypto_required = self.secure_policy.is_required();
            answer.streams = self.streams(offered.kind, constraints, existing, &cname);
            answer.transport = transport.clone();
            contents.push(answer);
        }

        let mut groups = vec![];
        if let Some(offered_group) = offer.bundle_group() {
            if self.bundle_allowed(constraints) {
                let names: Vec<&str> = offered_group
                    .content_names
                    .iter()
                    .filter(|name| contents.iter().any(|c| &c.name == *name && !c.rejected))
                    .map(String::as_str)
                    .collect();
                if !names.is_empty() {
                    groups.push(RTCContentGroup::bundle(&names));
                }
            }
        }

        debug!(
            "created answer accepting {} of {} contents, bundle={}",
            contents.iter().filter(|c| !c.rejected).count(),
            contents.len(),
            !groups.is_empty()
        );
        Ok(RTCSessionDescription::answer(contents, groups))
    }

    fn secure_policy(&self) -> RTCSecurePolicy {
        self.secure_policy
    }

    fn set_secure_policy(&mut self, secure_policy: RTCSecurePolicy) {
        self.secure_policy = secure_policy;
    }
}

fn default_content_name(kind: RTCMediaKind, taken: &[(String, RTCMediaKind, bool)]) -> String {
    let base = match kind {
        RTCMediaKind::Audio => CONTENT_NAME_AUDIO,
        RTCMediaKind::Video => CONTENT_NAME_VIDEO,
        _ => CONTENT_NAME_DATA,
    };
    let mut name = base.to_owned();
    let mut n = 1;
    while taken.iter().any(|(existing, _, _)| *existing == name) {
        name = format!("{base}{n}");
        n += 1;
    }
    name
}

fn session_cname(current: Option<&RTCSessionDescription>) -> String {
    current
        .and_then(|desc| {
            desc.contents
                .iter()
                .flat_map(|c| c.streams.iter())
                .map(|s| s.cname.clone())
                .next()
        })
        .unwrap_or_else(|| math_rand_alpha(CNAME_LEN))
}

fn new_ssrc() -> u32 {
    loop {
        let ssrc = rand::random::<u32>();
        if ssrc != 0 {
            return ssrc;
        }
    }
}

fn new_key_params() -> String {
    format!("inline:{}", math_rand_alpha_number(CRYPTO_KEY_LEN))
}

fn new_crypto(tag: u32, suite: &str) -> RTCCryptoParams {
    RTCCryptoParams {
        tag,
        crypto_suite: suite.to_owned(),
        key_params: new_key_params(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::session::configuration::RTCConfigurationBuilder;
    use crate::session::configuration::media_constraints::RTCTrackOptions;

    fn factory(policy: RTCSecurePolicy) -> RTCMediaSessionDescriptionFactory {
        RTCMediaSessionDescriptionFactory::new(
            &RTCConfigurationBuilder::new()
                .with_secure_policy(policy)
                .with_data_channels(true)
                .build(),
        )
    }

    #[test]
    fn test_create_offer_contents() -> Result<()> {
        let constraints = RTCMediaConstraints::default()
            .with_track(RTCTrackOptions::new(RTCMediaKind::Audio, "mic", "local"));
        let offer = factory(RTCSecurePolicy::Preferred).create_offer(&constraints, None)?;

        let names: Vec<&str> = offer.contents.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["audio", "video", "data"]);
        assert_eq!(
            offer.bundle_group().map(|g| g.content_names.len()),
            Some(3)
        );

        let audio = offer.content("audio").ok_or(Error::ErrChannelNotFound("audio".into()))?;
        assert_eq!(audio.cryptos.len(), 2);
        assert_eq!(audio.cryptos[0].crypto_suite, CRYPTO_SUITE_AES_CM_128_HMAC_SHA1_80);
        assert!(audio.cryptos[0].key_params.starts_with("inline:"));
        assert_eq!(audio.streams.len(), 1);
        assert_eq!(audio.streams[0].id, "mic");
        assert_ne!(audio.streams[0].ssrcs[0], 0);
        assert_eq!(audio.transport.ice_ufrag.len(), shared::util::LEN_UFRAG);
        assert_eq!(
            offer.content("video").map(|c| c.transport.ice_ufrag.clone()),
            Some(audio.transport.ice_ufrag.clone())
        );
        Ok(())
    }

    #[test]
    fn test_create_offer_keeps_state_across_renegotiation() -> Result<()> {
        let factory = factory(RTCSecurePolicy::Preferred);
        let constraints = RTCMediaConstraints::default()
            .with_track(RTCTrackOptions::new(RTCMediaKind::Audio, "mic", "local"));
        let first = factory.create_offer(&constraints, None)?;

        let audio_only = RTCMediaConstraints {
            offer_to_receive_video: false,
            ..constraints.clone()
        };
        let second = factory.create_offer(&audio_only, Some(&first))?;

        assert_eq!(second.contents.len(), 3);
        assert!(second.has_active_content("audio"));
        assert!(!second.has_active_content("video"));
        assert_eq!(
            second.content("audio").map(|c| &c.streams),
            first.content("audio").map(|c| &c.streams)
        );
        assert_eq!(
            second.content("audio").map(|c| &c.cryptos),
            first.content("audio").map(|c| &c.cryptos)
        );
        assert_eq!(
            second.content("audio").map(|c| c.transport.ice_pwd.clone()),
            first.content("audio").map(|c| c.transport.ice_pwd.clone())
        );

        let restart = RTCMediaConstraints {
            ice_restart: true,
            ..constraints
        };
        let third = factory.create_offer(&restart, Some(&first))?;
        assert_ne!(
            third.content("audio").map(|c| c.transport.ice_pwd.clone()),
            first.content("audio").map(|c| c.transport.ice_pwd.clone())
        );
        Ok(())
    }

    #[test]
    fn test_create_offer_without_crypto_or_bundle() -> Result<()> {
        let factory = RTCMediaSessionDescriptionFactory::new(
            &RTCConfigurationBuilder::new()
                .with_secure_policy(RTCSecurePolicy::Disabled)
                .with_bundle_policy(RTCBundlePolicy::MaxCompat)
                .build(),
        );
        let offer = factory.create_offer(&RTCMediaConstraints::default(), None)?;
        assert!(offer.groups.is_empty());
        assert!(offer.contents.iter().all(|c| !c.has_crypto()));
        Ok(())
    }

    #[test]
    fn test_create_offer_no_codecs() {
        let factory = RTCMediaSessionDescriptionFactory::new(
            &RTCConfigurationBuilder::new()
                .with_video_codecs(vec![])
                .build(),
        );
        assert_eq!(
            factory.create_offer(&RTCMediaConstraints::default(), None),
            Err(Error::ErrNoCodecs("video".to_owned()))
        );
    }

    #[test]
    fn test_create_answer_intersects() -> Result<()> {
        let offerer = factory(RTCSecurePolicy::Preferred);
        let mut offer = offerer.create_offer(&RTCMediaConstraints::default(), None)?;
        if let Some(video) = offer.content_mut("video") {
            video.codecs = vec![RTCCodec::new(100, "AV1", 90000, 0)];
        }
        if let Some(audio) = offer.content_mut("audio") {
            audio.cryptos.remove(0);
        }

        let answerer = RTCMediaSessionDescriptionFactory::new(&RTCConfiguration::default());
        let answer = answerer.create_answer(&offer, &RTCMediaConstraints::default(), None)?;

        let audio = answer.content("audio").ok_or(Error::ErrChannelNotFound("audio".into()))?;
        assert!(!audio.rejected);
        assert_eq!(audio.codecs.len(), 2);
        assert_eq!(audio.cryptos.len(), 1);
        assert_eq!(audio.cryptos[0].crypto_suite, CRYPTO_SUITE_AES_CM_128_HMAC_SHA1_32);
        assert_eq!(audio.cryptos[0].tag, 2);

        assert!(!answer.has_active_content("video"), "no common video codec");
        assert!(!answer.has_active_content("data"), "data channels disabled");
        assert_eq!(
            answer.bundle_group().map(|g| g.content_names.clone()),
            Some(vec!["audio".to_owned()])
        );
        Ok(())
    }

    #[test]
    fn test_create_answer_required_rejects_plain_content() -> Result<()> {
        let offerer = factory(RTCSecurePolicy::Disabled);
        let offer = offerer.create_offer(&RTCMediaConstraints::default(), None)?;

        let answer = factory(RTCSecurePolicy::Required).create_answer(
            &offer,
            &RTCMediaConstraints::default(),
            None,
        )?;
        assert_eq!(answer.active_contents().count(), 0);
        assert!(answer.groups.is_empty());

        let answer = factory(RTCSecurePolicy::Preferred).create_answer(
            &offer,
            &RTCMediaConstraints::default(),
            None,
        )?;
        assert_eq!(answer.active_contents().count(), 3);
        assert!(answer.contents.iter().all(|c| !c.has_crypto()));
        Ok(())
    }
}
