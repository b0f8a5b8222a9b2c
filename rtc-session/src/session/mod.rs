//! The negotiation core.
//!
//! [`RTCSession`] applies local and remote descriptions through the
//! offer/answer state machine, keeps one channel per negotiated content,
//! binds channels to transports (sharing one transport across a BUNDLE
//! group) and coordinates ICE candidates in both directions.
//!
//! The session owns no sockets. Collaborators are injected:
//!
//! - a [`ChannelManager`] allocates voice, video and data channels,
//! - a [`TransportLayer`] runs ICE and reports back through
//!   [`RTCTransportEventSender`],
//! - a [`SessionDescriptionFactory`] builds offers and answers.
//!
//! Transport signals may be raised on any thread. They are queued and only
//! applied when the owner calls [`RTCSession::process_transport_events`], so
//! all session state is mutated on the owner's thread.
//!
//! # Example
//!
//! ```no_run
//! use rtc_session::session::configuration::media_constraints::RTCMediaConstraints;
//! use rtc_session::session::configuration::RTCConfigurationBuilder;
//! use rtc_session::session::channel::ChannelManager;
//! use rtc_session::session::transport::TransportLayer;
//! use rtc_session::session::RTCSession;
//!
//! # fn example(
//! #     channel_manager: Box<dyn ChannelManager>,
//! #     transport_layer: Box<dyn TransportLayer>,
//! # ) -> shared::error::Result<()> {
//! let mut session = RTCSession::new(
//!     RTCConfigurationBuilder::new().build(),
//!     channel_manager,
//!     transport_layer,
//! )?;
//!
//! let offer = session.create_offer(&RTCMediaConstraints::default())?;
//! session.set_local_description(offer.clone())?;
//! // send `offer` to the remote peer, then apply its answer:
//! // session.set_remote_description(answer)?;
//! # Ok(())
//! # }
//! ```

pub mod candidate;
pub mod channel;
pub mod configuration;
pub mod description_factory;
pub mod event;
pub(crate) mod internal;
pub(crate) mod proto;
pub mod provider;
pub mod sdp;
pub mod state;
pub mod transport;

use std::collections::{HashMap, VecDeque};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

use crate::data_channel::{RTCDataChannel, RTCDataChannelId};
use candidate::{RTCIceCandidate, SavedCandidateQueue};
use channel::{ChannelManager, RTCChannel};
use configuration::RTCConfiguration;
use configuration::media_constraints::RTCMediaConstraints;
use configuration::secure_policy::RTCSecurePolicy;
use description_factory::{RTCMediaSessionDescriptionFactory, SessionDescriptionFactory};
use event::{RTCSessionEvent, RTCSessionObserver, RTCTransportEvent, RTCTransportEventSender};
use sdp::{RTCSdpType, RTCSessionDescription};
use shared::error::{Error, Result};
use state::{
    RTCIceGatheringState, RTCSignalingState, expect_set_local_description,
    expect_set_remote_description,
};
use transport::{RTCTransportBinding, TransportLayer};

/// A negotiation session between the local endpoint and one remote peer.
pub struct RTCSession {
    pub(crate) configuration: RTCConfiguration,

    pub(crate) session_id: String,
    pub(crate) session_version: u64,

    pub(crate) signaling_state: RTCSignalingState,
    pub(crate) ice_gathering_state: RTCIceGatheringState,
    pub(crate) local_description: Option<RTCSessionDescription>,
    pub(crate) remote_description: Option<RTCSessionDescription>,
    /// Cleared for good once a description without a BUNDLE group is applied.
    pub(crate) bundle_enabled: bool,

    pub(crate) channels: Vec<RTCChannel>,
    pub(crate) transports: HashMap<String, RTCTransportBinding>,
    pub(crate) saved_candidates: SavedCandidateQueue,
    pub(crate) data_channels: HashMap<RTCDataChannelId, RTCDataChannel>,

    pub(crate) channel_manager: Box<dyn ChannelManager>,
    pub(crate) transport_layer: Box<dyn TransportLayer>,
    pub(crate) description_factory: Box<dyn SessionDescriptionFactory>,

    pub(crate) observer: Option<Box<dyn RTCSessionObserver>>,
    pub(crate) events: VecDeque<RTCSessionEvent>,
    pub(crate) transport_events_tx: Sender<RTCTransportEvent>,
    pub(crate) transport_events_rx: Receiver<RTCTransportEvent>,

    /// First fatal error. Once set, negotiation is refused.
    pub(crate) fatal_error: Option<Error>,
}

impl RTCSession {
    /// Creates a session that builds descriptions with
    /// [`RTCMediaSessionDescriptionFactory`].
    pub fn new(
        configuration: RTCConfiguration,
        channel_manager: Box<dyn ChannelManager>,
        transport_layer: Box<dyn TransportLayer>,
    ) -> Result<Self> {
        let factory = Box::new(RTCMediaSessionDescriptionFactory::new(&configuration));
        Self::with_description_factory(configuration, channel_manager, transport_layer, factory)
    }

    pub fn with_description_factory(
        configuration: RTCConfiguration,
        channel_manager: Box<dyn ChannelManager>,
        mut transport_layer: Box<dyn TransportLayer>,
        mut description_factory: Box<dyn SessionDescriptionFactory>,
    ) -> Result<Self> {
        configuration.validate()?;
        description_factory.set_secure_policy(configuration.secure_policy);

        let (transport_events_tx, transport_events_rx) = crossbeam_channel::unbounded();
        let session_id = (rand::random::<u64>() & i64::MAX as u64).to_string();
        let bundle_enabled = configuration.bundle_policy.allows_bundle();

        transport_layer.set_bundle_enabled(bundle_enabled);

        debug!("session {session_id} created, bundle={bundle_enabled}");

        Ok(Self {
            configuration,
            session_id,
            session_version: 0,
            signaling_state: RTCSignalingState::Stable,
            ice_gathering_state: RTCIceGatheringState::New,
            local_description: None,
            remote_description: None,
            bundle_enabled,
            channels: vec![],
            transports: HashMap::new(),
            saved_candidates: SavedCandidateQueue::new(),
            data_channels: HashMap::new(),
            channel_manager,
            transport_layer,
            description_factory,
            observer: None,
            events: VecDeque::new(),
            transport_events_tx,
            transport_events_rx,
            fatal_error: None,
        })
    }

    /// Registers the observer and delivers every notification queued so far.
    pub fn register_observer(&mut self, observer: Box<dyn RTCSessionObserver>) {
        self.observer = Some(observer);
        self.flush_events();
    }

    /// A sender for transport signals. Every transport the session creates
    /// receives its own clone.
    pub fn transport_event_sender(&self) -> RTCTransportEventSender {
        RTCTransportEventSender::new(self.transport_events_tx.clone())
    }

    pub fn configuration(&self) -> &RTCConfiguration {
        &self.configuration
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Version stamped onto the most recently created description.
    pub fn session_version(&self) -> u64 {
        self.session_version
    }

    pub fn signaling_state(&self) -> RTCSignalingState {
        self.signaling_state
    }

    pub fn ice_gathering_state(&self) -> RTCIceGatheringState {
        self.ice_gathering_state
    }

    pub fn local_description(&self) -> Option<&RTCSessionDescription> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&RTCSessionDescription> {
        self.remote_description.as_ref()
    }

    pub fn secure_policy(&self) -> RTCSecurePolicy {
        self.description_factory.secure_policy()
    }

    /// Changes the policy applied to descriptions created or set from now on.
    pub fn set_secure_policy(&mut self, secure_policy: RTCSecurePolicy) {
        self.description_factory.set_secure_policy(secure_policy);
    }

    pub fn is_bundle_enabled(&self) -> bool {
        self.bundle_enabled
    }

    /// Channels in creation order.
    pub fn channels(&self) -> &[RTCChannel] {
        &self.channels
    }

    pub fn channel(&self, content_name: &str) -> Option<&RTCChannel> {
        self.channels
            .iter()
            .find(|c| c.content_name() == content_name)
    }

    pub fn transport(&self, transport_name: &str) -> Option<&RTCTransportBinding> {
        self.transports.get(transport_name)
    }

    /// Names of live transports, sorted.
    pub fn transport_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.transports.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remote candidates still waiting for their content.
    pub fn saved_candidates(&self) -> &SavedCandidateQueue {
        &self.saved_candidates
    }

    pub fn data_channel(&self, id: RTCDataChannelId) -> Option<&RTCDataChannel> {
        self.data_channels.get(&id)
    }

    pub fn is_closed(&self) -> bool {
        self.signaling_state == RTCSignalingState::Closed
    }

    /// The fatal error reported by a transport, if any.
    pub fn fatal_error(&self) -> Option<&Error> {
        self.fatal_error.as_ref()
    }

    /// Builds an offer from the current negotiated contents, `constraints`
    /// and the secure policy. Only the session version changes.
    pub fn create_offer(
        &mut self,
        constraints: &RTCMediaConstraints,
    ) -> Result<RTCSessionDescription> {
        self.check_open()?;

        let mut constraints = constraints.clone();
        constraints.use_bundle &= self.bundle_enabled;

        let mut offer = self
            .description_factory
            .create_offer(&constraints, self.local_description.as_ref())?;
        self.stamp(&mut offer);
        Ok(offer)
    }

    /// Builds an answer to `offer`. Only the session version changes.
    pub fn create_answer(
        &mut self,
        constraints: &RTCMediaConstraints,
        offer: &RTCSessionDescription,
    ) -> Result<RTCSessionDescription> {
        self.check_open()?;
        if offer.sdp_type != RTCSdpType::Offer {
            return Err(Error::ErrSdpTypeNotOffer(offer.sdp_type.to_string()));
        }

        let mut constraints = constraints.clone();
        constraints.use_bundle &= self.bundle_enabled;

        let mut answer = self.description_factory.create_answer(
            offer,
            &constraints,
            self.local_description.as_ref(),
        )?;
        self.stamp(&mut answer);
        Ok(answer)
    }

    /// Applies a local description.
    ///
    /// On failure nothing changes: descriptions, signaling state, channels,
    /// transports and saved candidates are left as they were.
    pub fn set_local_description(&mut self, mut description: RTCSessionDescription) -> Result<()> {
        self.check_open()?;
        let action = description.action()?;
        description.validate()?;
        let next_state = expect_set_local_description(
            self.signaling_state,
            action,
            self.configuration.allow_repeated_local_offer,
        )
        .inspect_err(|err| warn!("set_local_description({action}) refused: {err}"))?;

        self.update_session_description_secure_policy(&mut description);
        self.verify_crypto(&description)?;

        let staged = self.create_channels(action, &description)?;
        if let Err(err) = self.push_local_description(&description, action, &staged) {
            self.rollback_channels(staged);
            return Err(err);
        }

        self.carry_local_candidates(&mut description);
        self.commit_bindings(&description, staged);
        let restarted = self.restarted_contents(&description);
        let active: Vec<String> = description
            .active_contents()
            .map(|c| c.name.clone())
            .collect();
        self.local_description = Some(description);
        if action == RTCSdpType::Answer {
            self.remove_unused_channels_and_transports(&active);
        }
        self.set_signaling_state(next_state);
        if next_state == RTCSignalingState::Stable {
            self.enable_channels();
        }
        self.restart_gathering(&restarted);
        self.start_candidates_allocation();
        self.flush_events();

        Ok(())
    }

    /// Applies a remote description, then applies the candidates it embeds
    /// and drains saved candidates for every content it makes present.
    ///
    /// On failure nothing changes.
    pub fn set_remote_description(
        &mut self,
        mut description: RTCSessionDescription,
    ) -> Result<()> {
        self.check_open()?;
        let action = description.action()?;
        description.validate()?;
        let next_state = expect_set_remote_description(self.signaling_state, action)
            .inspect_err(|err| warn!("set_remote_description({action}) refused: {err}"))?;

        self.verify_crypto(&description)?;
        stamp_embedded_candidates(&mut description);

        let staged = self.create_channels(action, &description)?;
        if let Err(err) = self.push_remote_description(&description, action, &staged) {
            self.rollback_channels(staged);
            return Err(err);
        }

        self.commit_bindings(&description, staged);
        let active: Vec<String> = description
            .active_contents()
            .map(|c| c.name.clone())
            .collect();
        self.remote_description = Some(description);
        if action == RTCSdpType::Answer {
            self.remove_unused_channels_and_transports(&active);
        }
        self.set_signaling_state(next_state);
        if next_state == RTCSignalingState::Stable {
            self.enable_channels();
        }
        if self.local_description.is_some() {
            self.start_candidates_allocation();
        }

        self.use_candidates_in_session_description(&active);
        self.resolve_saved_candidates();
        for content_name in &active {
            self.apply_saved_candidates(content_name);
        }
        self.flush_events();

        Ok(())
    }

    /// Accepts one remote candidate from signaling.
    ///
    /// When the remote description already has the candidate's content the
    /// candidate is applied at once. Otherwise it is saved until the content
    /// appears. A candidate known only by m-line index that arrives before
    /// any remote description is saved until one can name its content.
    pub fn process_ice_message(&mut self, mut candidate: RTCIceCandidate) -> Result<()> {
        self.check_open()?;
        candidate.validate()?;
        if candidate.content_name().is_none()
            && candidate.sdp_mline_index.is_some()
            && self.remote_description.is_none()
        {
            debug!(
                "saving remote candidate {candidate} until a remote description names its content"
            );
            self.saved_candidates.push_unresolved(candidate);
            return Ok(());
        }
        let content_name = self.resolve_candidate_content(&candidate)?;
        candidate.sdp_mid = Some(content_name.clone());

        let present = self
            .remote_description
            .as_ref()
            .is_some_and(|desc| desc.has_active_content(&content_name));
        if present {
            self.use_candidate(candidate)
        } else {
            debug!("saving remote candidate {candidate} until content {content_name} is described");
            self.saved_candidates.push(&content_name, candidate);
            Ok(())
        }
    }

    /// Hands a remote candidate to the transport of its content and records
    /// it in the remote description.
    ///
    /// Fails when the remote description lacks the content or no transport
    /// backs it. Saved candidates are not touched either way.
    pub fn use_candidate(&mut self, mut candidate: RTCIceCandidate) -> Result<()> {
        let content_name = self.resolve_candidate_content(&candidate)?;
        candidate.sdp_mid = Some(content_name.clone());

        let Some(remote) = self.remote_description.as_ref() else {
            return Err(Error::ErrCandidateUnknownContent(content_name));
        };
        if !remote.has_active_content(&content_name) {
            return Err(Error::ErrCandidateUnknownContent(content_name));
        }
        candidate.sdp_mline_index = remote.content_index(&content_name);

        let Some(transport_name) = self
            .channel(&content_name)
            .map(|c| c.transport_name().to_owned())
        else {
            return Err(Error::ErrCandidateNoTransport(content_name));
        };
        candidate.validate()?;

        self.transport_layer
            .add_remote_candidates(&transport_name, std::slice::from_ref(&candidate))
            .map_err(|err| Error::ErrCandidateRejected(content_name.clone(), err.to_string()))?;
        debug!("applied remote candidate {candidate} on transport {transport_name}");

        if let Some(remote) = self.remote_description.as_mut() {
            remote.add_candidate(&content_name, &candidate);
        }
        Ok(())
    }

    /// Drains every transport signal queued so far, in delivery order, then
    /// flushes notifications to the observer.
    pub fn process_transport_events(&mut self) -> Result<()> {
        let mut errs = vec![];
        while let Ok(event) = self.transport_events_rx.try_recv() {
            if let Err(err) = self.handle_transport_event(event) {
                errs.push(err);
            }
        }
        self.flush_events();
        shared::error::flatten_errs(errs)
    }

    /// Name of the local track sending on `ssrc`.
    pub fn get_local_track_name(&self, ssrc: u32) -> Option<String> {
        track_name_by_ssrc(self.local_description.as_ref(), ssrc)
    }

    /// Name of the remote track sending on `ssrc`.
    pub fn get_remote_track_name(&self, ssrc: u32) -> Option<String> {
        track_name_by_ssrc(self.remote_description.as_ref(), ssrc)
    }

    /// Tears the session down: destroys every channel and transport, which
    /// stops gathering, drops saved candidates and moves to `Closed`.
    /// Calling it again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }

        for channel in std::mem::take(&mut self.channels) {
            let content_name = channel.content_name().to_owned();
            info!("destroying {} channel {content_name}", channel.kind());
            self.channel_manager
                .destroy_channel(&content_name, channel.into_media());
        }
        let mut transport_names: Vec<String> = self.transports.keys().cloned().collect();
        transport_names.sort();
        for transport_name in transport_names {
            debug!("destroying transport {transport_name}");
            self.transport_layer.destroy_transport(&transport_name);
        }
        self.transports.clear();
        self.saved_candidates.clear();
        self.data_channels.clear();

        self.set_signaling_state(RTCSignalingState::Closed);
        self.flush_events();
        Ok(())
    }

    fn stamp(&mut self, description: &mut RTCSessionDescription) {
        self.session_version += 1;
        description.session_id = self.session_id.clone();
        description.session_version = self.session_version;
    }

    pub(crate) fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ErrSessionClosed);
        }
        if let Some(err) = &self.fatal_error {
            return Err(Error::ErrSessionFailed(err.to_string()));
        }
        Ok(())
    }
}

impl Drop for RTCSession {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("failed to close session {}: {err}", self.session_id);
        }
    }
}

/// Tags candidates embedded in a remote description with the content
/// carrying them.
fn stamp_embedded_candidates(description: &mut RTCSessionDescription) {
    for (index, content) in description.contents.iter_mut().enumerate() {
        for candidate in content.transport.candidates.iter_mut() {
            candidate.sdp_mid = Some(content.name.clone());
            candidate.sdp_mline_index = u16::try_from(index).ok();
        }
    }
}

fn track_name_by_ssrc(description: Option<&RTCSessionDescription>, ssrc: u32) -> Option<String> {
    description?
        .active_contents()
        .find_map(|content| content.find_stream_by_ssrc(ssrc))
        .map(|stream| stream.id.clone())
}
