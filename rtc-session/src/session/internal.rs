use std::collections::VecDeque;

use log::{debug, error, info, trace, warn};

use super::RTCSession;
use crate::session::candidate::RTCIceCandidate;
use crate::session::channel::{RTCChannel, RTCMediaChannel};
use crate::session::event::{self, RTCIceCandidatesEvent, RTCSessionEvent, RTCTransportEvent};
use crate::session::sdp::{RTCMediaContent, RTCMediaKind, RTCSdpType, RTCSessionDescription};
use crate::session::state::signaling_state::StateChangeOp;
use crate::session::state::{RTCIceGatheringState, RTCSignalingState};
use crate::session::transport::RTCTransportBinding;
use shared::error::{Error, Result};

/// Channels, transports and re-bindings prepared by one Set* call. Undone
/// by `rollback_channels` if the call fails before committing.
#[derive(Default, Debug)]
pub(crate) struct StagedChannels {
    transports: Vec<String>,
    contents: Vec<String>,
    rebinds: Vec<(String, String)>,
}

impl StagedChannels {
    fn rebind_target(&self, content_name: &str) -> Option<&str> {
        self.rebinds
            .iter()
            .find(|(content, _)| content == content_name)
            .map(|(_, transport)| transport.as_str())
    }
}

impl RTCSession {
    /// Forces the crypto-required flag of every content to match the policy.
    pub(crate) fn update_session_description_secure_policy(
        &self,
        description: &mut RTCSessionDescription,
    ) {
        let required = self.secure_policy().is_required();
        for content in description.contents.iter_mut() {
            content.crypto_required = required;
        }
    }

    /// Under a Required policy every active content must carry crypto.
    pub(crate) fn verify_crypto(&self, description: &RTCSessionDescription) -> Result<()> {
        if !self.secure_policy().is_required() {
            return Ok(());
        }
        if let Some(content) = description.active_contents().find(|c| !c.has_crypto()) {
            warn!(
                "{} content {} has no crypto while crypto is required",
                description.sdp_type, content.name
            );
            return Err(Error::ErrCryptoRequired(content.name.clone()));
        }
        Ok(())
    }

    /// Transport a content of `description` should ride on: the first
    /// active member of its BUNDLE group, or a transport of its own.
    fn transport_name_for(&self, description: &RTCSessionDescription, content_name: &str) -> String {
        if self.bundle_enabled {
            if let Some(group) = description
                .bundle_group()
                .filter(|g| g.has_content_name(content_name))
            {
                if let Some(first) = group
                    .content_names
                    .iter()
                    .find(|name| description.has_active_content(name))
                {
                    return first.clone();
                }
            }
        }
        content_name.to_owned()
    }

    fn wants_channel(&self, kind: RTCMediaKind) -> bool {
        match kind {
            RTCMediaKind::Audio | RTCMediaKind::Video => true,
            RTCMediaKind::Data => self.configuration.enable_data_channels,
            RTCMediaKind::Unspecified => false,
        }
    }

    /// Creates a channel for every active content that lacks one. On a final
    /// answer, also prepares moving existing channels onto the transport the
    /// answer's BUNDLE group selects. Nothing is left behind on failure.
    pub(crate) fn create_channels(
        &mut self,
        action: RTCSdpType,
        description: &RTCSessionDescription,
    ) -> Result<StagedChannels> {
        let mut staged = StagedChannels::default();
        if let Err(err) = self.stage_channels(action, description, &mut staged) {
            self.rollback_channels(staged);
            return Err(err);
        }
        Ok(staged)
    }

    fn stage_channels(
        &mut self,
        action: RTCSdpType,
        description: &RTCSessionDescription,
        staged: &mut StagedChannels,
    ) -> Result<()> {
        for content in description.active_contents() {
            let transport_name = self.transport_name_for(description, &content.name);
            let current = self
                .channel(&content.name)
                .map(|c| c.transport_name().to_owned());

            match current {
                Some(current) => {
                    if action == RTCSdpType::Answer && current != transport_name {
                        self.ensure_transport(&transport_name, staged)?;
                        staged.rebinds.push((content.name.clone(), transport_name));
                    }
                }
                None => {
                    if !self.wants_channel(content.kind) {
                        debug!(
                            "no channel for {} content {}",
                            content.kind, content.name
                        );
                        continue;
                    }
                    self.ensure_transport(&transport_name, staged)?;
                    let media = self.create_media_channel(content, &transport_name)?;
                    info!(
                        "created {} channel for content {} on transport {}",
                        content.kind, content.name, transport_name
                    );
                    if let Some(binding) = self.transports.get_mut(&transport_name) {
                        binding.attach(&content.name);
                    }
                    self.channels
                        .push(RTCChannel::new(&content.name, &transport_name, media));
                    staged.contents.push(content.name.clone());
                }
            }
        }
        Ok(())
    }

    fn ensure_transport(&mut self, transport_name: &str, staged: &mut StagedChannels) -> Result<()> {
        if self.transports.contains_key(transport_name) {
            return Ok(());
        }
        let sender = self.transport_event_sender();
        self.transport_layer
            .create_transport(transport_name, sender)
            .map_err(|err| Error::ErrTransportCreation(transport_name.to_owned(), err.to_string()))?;
        debug!("created transport {transport_name}");
        self.transports.insert(
            transport_name.to_owned(),
            RTCTransportBinding::new(transport_name),
        );
        staged.transports.push(transport_name.to_owned());
        Ok(())
    }

    fn create_media_channel(
        &mut self,
        content: &RTCMediaContent,
        transport_name: &str,
    ) -> Result<RTCMediaChannel> {
        let result = match content.kind {
            RTCMediaKind::Audio => self
                .channel_manager
                .create_voice_channel(&content.name, transport_name)
                .map(RTCMediaChannel::Voice),
            RTCMediaKind::Video => self
                .channel_manager
                .create_video_channel(&content.name, transport_name)
                .map(RTCMediaChannel::Video),
            RTCMediaKind::Data => self
                .channel_manager
                .create_data_channel(&content.name, transport_name)
                .map(RTCMediaChannel::Data),
            RTCMediaKind::Unspecified => Err(Error::Other("unspecified media kind".to_owned())),
        };

        result.map_err(|err| {
            warn!(
                "channel manager failed to create {} channel for {}: {err}",
                content.kind, content.name
            );
            Error::ErrChannelCreation(content.kind.to_string(), content.name.clone())
        })
    }

    pub(crate) fn rollback_channels(&mut self, staged: StagedChannels) {
        for content_name in staged.contents.iter().rev() {
            let Some(pos) = self
                .channels
                .iter()
                .position(|c| c.content_name() == content_name)
            else {
                continue;
            };
            let channel = self.channels.remove(pos);
            if let Some(binding) = self.transports.get_mut(channel.transport_name()) {
                binding.detach(content_name);
            }
            debug!("rolling back channel {content_name}");
            self.channel_manager
                .destroy_channel(content_name, channel.into_media());
        }
        for transport_name in staged.transports.iter().rev() {
            debug!("rolling back transport {transport_name}");
            self.transports.remove(transport_name);
            self.transport_layer.destroy_transport(transport_name);
        }
    }

    pub(crate) fn push_local_description(
        &mut self,
        description: &RTCSessionDescription,
        action: RTCSdpType,
        staged: &StagedChannels,
    ) -> Result<()> {
        self.push_description(description, action, staged, StateChangeOp::SetLocal)
    }

    pub(crate) fn push_remote_description(
        &mut self,
        description: &RTCSessionDescription,
        action: RTCSdpType,
        staged: &StagedChannels,
    ) -> Result<()> {
        self.push_description(description, action, staged, StateChangeOp::SetRemote)
    }

    /// Hands content to every channel first, then transport parameters to
    /// each transport once. On a refusal the channels and transports already
    /// updated get the previously applied description back.
    fn push_description(
        &mut self,
        description: &RTCSessionDescription,
        action: RTCSdpType,
        staged: &StagedChannels,
        op: StateChangeOp,
    ) -> Result<()> {
        let previous = match op {
            StateChangeOp::SetLocal => self.local_description.clone(),
            StateChangeOp::SetRemote => self.remote_description.clone(),
        };

        let mut updated: Vec<String> = vec![];
        for content in description.active_contents() {
            let Some(channel) = self
                .channels
                .iter_mut()
                .find(|c| c.content_name() == content.name)
            else {
                continue;
            };
            if let Err(err) = push_content(&mut channel.media, op, content, action) {
                warn!("{op}: channel {} refused content: {err}", content.name);
                self.restore_channel_contents(previous.as_ref(), &updated, staged, op);
                return Err(Error::ErrChannelContentRejected(
                    content.name.clone(),
                    err.to_string(),
                ));
            }
            updated.push(content.name.clone());
        }

        let mut pushed: Vec<String> = vec![];
        for content in description.active_contents() {
            let Some(transport_name) = self.target_transport(&content.name, staged) else {
                continue;
            };
            if pushed.contains(&transport_name) {
                continue;
            }
            if let Err(err) =
                self.push_transport_description(&transport_name, content, action, staged, op)
            {
                warn!("{op}: transport {transport_name} refused description: {err}");
                self.restore_transport_descriptions(previous.as_ref(), &pushed, staged, op);
                self.restore_channel_contents(previous.as_ref(), &updated, staged, op);
                return Err(err);
            }
            pushed.push(transport_name);
        }
        Ok(())
    }

    /// Transport a content's channel will ride on once staged rebinds commit.
    fn target_transport(&self, content_name: &str, staged: &StagedChannels) -> Option<String> {
        let channel = self.channel(content_name)?;
        Some(
            staged
                .rebind_target(content_name)
                .unwrap_or(channel.transport_name())
                .to_owned(),
        )
    }

    fn push_transport_description(
        &mut self,
        transport_name: &str,
        content: &RTCMediaContent,
        action: RTCSdpType,
        staged: &StagedChannels,
        op: StateChangeOp,
    ) -> Result<()> {
        // A transport created to carry a rebound channel has not seen the
        // side negotiated earlier.
        let created_for_rebind = staged.rebind_target(&content.name) == Some(transport_name)
            && staged.transports.iter().any(|t| t == transport_name);
        if created_for_rebind {
            let counterpart = match op {
                StateChangeOp::SetLocal => self.remote_description.as_ref(),
                StateChangeOp::SetRemote => self.local_description.as_ref(),
            };
            if let Some((counterpart_action, transport)) = counterpart.and_then(|desc| {
                desc.content(&content.name)
                    .map(|c| (desc.sdp_type, c.transport.clone()))
            }) {
                debug!(
                    "seeding transport {transport_name} with the {counterpart_action} of {}",
                    content.name
                );
                match op {
                    StateChangeOp::SetLocal => self.transport_layer.set_remote_transport_description(
                        transport_name,
                        &transport,
                        counterpart_action,
                    )?,
                    StateChangeOp::SetRemote => self.transport_layer.set_local_transport_description(
                        transport_name,
                        &transport,
                        counterpart_action,
                    )?,
                }
            }
        }

        match op {
            StateChangeOp::SetLocal => self.transport_layer.set_local_transport_description(
                transport_name,
                &content.transport,
                action,
            ),
            StateChangeOp::SetRemote => self.transport_layer.set_remote_transport_description(
                transport_name,
                &content.transport,
                action,
            ),
        }
    }

    /// Gives channels that already took the new content their previous
    /// content back. Channels created by this call are left to the rollback.
    fn restore_channel_contents(
        &mut self,
        previous: Option<&RTCSessionDescription>,
        updated: &[String],
        staged: &StagedChannels,
        op: StateChangeOp,
    ) {
        let Some(previous) = previous else {
            return;
        };
        for content_name in updated {
            if staged.contents.contains(content_name) {
                continue;
            }
            let Some(old) = previous.content(content_name).filter(|c| !c.rejected) else {
                continue;
            };
            let Some(channel) = self
                .channels
                .iter_mut()
                .find(|c| c.content_name() == content_name)
            else {
                continue;
            };
            match push_content(&mut channel.media, op, old, previous.sdp_type) {
                Ok(()) => debug!("{op}: restored {} content of {content_name}", previous.sdp_type),
                Err(err) => warn!("{op}: failed to restore content of {content_name}: {err}"),
            }
        }
    }

    /// Gives transports that already took the new parameters their previous
    /// parameters back. Transports created by this call are left to the
    /// rollback.
    fn restore_transport_descriptions(
        &mut self,
        previous: Option<&RTCSessionDescription>,
        pushed: &[String],
        staged: &StagedChannels,
        op: StateChangeOp,
    ) {
        let Some(previous) = previous else {
            return;
        };
        for transport_name in pushed {
            if staged.transports.contains(transport_name) {
                continue;
            }
            let Some(old) = previous.active_contents().find(|c| {
                self.channel(&c.name)
                    .is_some_and(|ch| ch.transport_name() == transport_name)
            }) else {
                continue;
            };
            let result = match op {
                StateChangeOp::SetLocal => self.transport_layer.set_local_transport_description(
                    transport_name,
                    &old.transport,
                    previous.sdp_type,
                ),
                StateChangeOp::SetRemote => self.transport_layer.set_remote_transport_description(
                    transport_name,
                    &old.transport,
                    previous.sdp_type,
                ),
            };
            if let Err(err) = result {
                warn!("{op}: failed to restore transport {transport_name}: {err}");
            }
        }
    }

    /// Applies BUNDLE decisions of a description that is being committed.
    pub(crate) fn commit_bindings(
        &mut self,
        description: &RTCSessionDescription,
        staged: StagedChannels,
    ) {
        if description.bundle_group().is_none() && self.bundle_enabled {
            info!("{} carries no BUNDLE group, disabling transport sharing", description.sdp_type);
            self.bundle_enabled = false;
            self.transport_layer.set_bundle_enabled(false);
        }

        for (content_name, target) in staged.rebinds {
            let Some(channel) = self
                .channels
                .iter_mut()
                .find(|c| c.content_name() == content_name)
            else {
                continue;
            };
            let previous = channel.transport_name().to_owned();
            channel.rebind(&target);
            if let Some(binding) = self.transports.get_mut(&previous) {
                binding.detach(&content_name);
            }
            if let Some(binding) = self.transports.get_mut(&target) {
                binding.attach(&content_name);
            }
            info!("content {content_name} moved from transport {previous} to {target}");
        }
        self.destroy_unreferenced_transports();
    }

    /// Carries local candidates of contents whose ICE credentials did not
    /// change into the replacing description.
    pub(crate) fn carry_local_candidates(&self, description: &mut RTCSessionDescription) {
        let Some(previous) = self.local_description.as_ref() else {
            return;
        };
        for (index, content) in description.contents.iter_mut().enumerate() {
            if content.rejected {
                continue;
            }
            let Some(old) = previous
                .content(&content.name)
                .filter(|c| !c.rejected && c.transport.same_credentials(&content.transport))
            else {
                continue;
            };
            for candidate in &old.transport.candidates {
                if !content.transport.has_candidate(candidate) {
                    let mut candidate = candidate.clone();
                    candidate.sdp_mline_index = u16::try_from(index).ok();
                    content.transport.candidates.push(candidate);
                }
            }
        }
    }

    /// Destroys channels whose content is not in `active`, then every
    /// transport no remaining channel references.
    pub(crate) fn remove_unused_channels_and_transports(&mut self, active: &[String]) {
        let (kept, removed): (Vec<RTCChannel>, Vec<RTCChannel>) =
            std::mem::take(&mut self.channels)
                .into_iter()
                .partition(|c| active.iter().any(|name| name == c.content_name()));
        self.channels = kept;

        for channel in removed {
            let content_name = channel.content_name().to_owned();
            if let Some(binding) = self.transports.get_mut(channel.transport_name()) {
                binding.detach(&content_name);
            }
            if channel.kind() == RTCMediaKind::Data {
                self.data_channels
                    .retain(|_, dc| dc.content_name() != content_name);
            }
            info!("destroying {} channel {content_name}", channel.kind());
            self.channel_manager
                .destroy_channel(&content_name, channel.into_media());
        }
        self.destroy_unreferenced_transports();
    }

    fn destroy_unreferenced_transports(&mut self) {
        let mut unused: Vec<String> = self
            .transports
            .values()
            .filter(|b| b.is_unreferenced())
            .map(|b| b.name().to_owned())
            .collect();
        unused.sort();
        for transport_name in unused {
            info!("destroying unused transport {transport_name}");
            self.transports.remove(&transport_name);
            self.transport_layer.destroy_transport(&transport_name);
        }
    }

    pub(crate) fn set_signaling_state(&mut self, next: RTCSignalingState) {
        if self.signaling_state == next {
            return;
        }
        info!("signaling state changed to {next}");
        self.signaling_state = next;
        self.events
            .push_back(RTCSessionEvent::OnSignalingStateChangeEvent(next));
    }

    /// Switches every channel to sending and receiving.
    pub(crate) fn enable_channels(&mut self) {
        for channel in self.channels.iter_mut() {
            if channel.enable() {
                info!(
                    "enabled {} channel {}",
                    channel.kind(),
                    channel.content_name()
                );
            }
        }
    }

    /// Starts gathering on every transport that has not started yet, in
    /// channel order.
    pub(crate) fn start_candidates_allocation(&mut self) {
        let mut names: Vec<String> = vec![];
        for channel in &self.channels {
            let name = channel.transport_name();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_owned());
            }
        }

        for transport_name in names {
            let Some(binding) = self.transports.get(&transport_name) else {
                continue;
            };
            if binding.gathering_state != RTCIceGatheringState::New {
                continue;
            }
            let content_names = binding.content_names.clone();
            match self
                .transport_layer
                .start_gathering(&transport_name, &content_names)
            {
                Ok(()) => {
                    debug!("started gathering on transport {transport_name}");
                    if let Some(binding) = self.transports.get_mut(&transport_name) {
                        binding.gathering_state = RTCIceGatheringState::Gathering;
                    }
                }
                Err(err) => warn!("failed to start gathering on {transport_name}: {err}"),
            }
        }
        self.update_ice_gathering_state();
    }

    /// Active contents of a new local description whose ICE credentials
    /// differ from the ones applied before.
    pub(crate) fn restarted_contents(&self, description: &RTCSessionDescription) -> Vec<String> {
        let Some(previous) = self.local_description.as_ref() else {
            return vec![];
        };
        description
            .active_contents()
            .filter(|content| {
                previous
                    .content(&content.name)
                    .filter(|old| !old.rejected)
                    .is_some_and(|old| !old.transport.same_credentials(&content.transport))
            })
            .map(|content| content.name.clone())
            .collect()
    }

    /// Sends the transports carrying `content_names` back to New so the next
    /// allocation gathers with the new credentials.
    pub(crate) fn restart_gathering(&mut self, content_names: &[String]) {
        for content_name in content_names {
            let Some(transport_name) = self
                .channel(content_name)
                .map(|c| c.transport_name().to_owned())
            else {
                continue;
            };
            let Some(binding) = self.transports.get_mut(&transport_name) else {
                continue;
            };
            if binding.gathering_state != RTCIceGatheringState::New {
                info!("ice restart on transport {transport_name}, gathering again");
                binding.gathering_state = RTCIceGatheringState::New;
            }
        }
    }

    fn update_ice_gathering_state(&mut self) {
        let state =
            RTCIceGatheringState::aggregate(self.transports.values().map(|b| b.gathering_state));
        if state != self.ice_gathering_state {
            debug!("ice gathering state changed to {state}");
            self.ice_gathering_state = state;
            self.events
                .push_back(RTCSessionEvent::OnIceGatheringStateChangeEvent(state));
        }
    }

    /// Pushes the candidates embedded in the remote description to their
    /// transports. A refused batch is logged and skipped.
    pub(crate) fn use_candidates_in_session_description(&mut self, active: &[String]) {
        for content_name in active {
            let candidates: Vec<RTCIceCandidate> = self
                .remote_description
                .as_ref()
                .and_then(|desc| desc.content(content_name))
                .map(|c| c.transport.candidates.clone())
                .unwrap_or_default();
            if candidates.is_empty() {
                continue;
            }
            let Some(transport_name) = self
                .channel(content_name)
                .map(|c| c.transport_name().to_owned())
            else {
                warn!(
                    "dropping {} embedded candidates: no transport for {content_name}",
                    candidates.len()
                );
                continue;
            };

            let valid: Vec<RTCIceCandidate> = candidates
                .into_iter()
                .filter(|c| match c.validate() {
                    Ok(()) => true,
                    Err(err) => {
                        warn!("dropping embedded candidate for {content_name}: {err}");
                        false
                    }
                })
                .collect();
            if valid.is_empty() {
                continue;
            }
            match self
                .transport_layer
                .add_remote_candidates(&transport_name, &valid)
            {
                Ok(()) => debug!(
                    "applied {} embedded candidates for {content_name}",
                    valid.len()
                ),
                Err(err) => warn!("transport {transport_name} refused embedded candidates: {err}"),
            }
        }
    }

    /// Names the content of candidates saved by m-line index alone, using
    /// the remote description just applied.
    pub(crate) fn resolve_saved_candidates(&mut self) {
        let Some(remote) = self.remote_description.as_ref() else {
            return;
        };
        let dropped = self
            .saved_candidates
            .resolve(|index| remote.content_at(index).map(|c| c.name.clone()));
        for candidate in dropped {
            warn!("dropping saved candidate {candidate}: m-line index names no content");
        }
    }

    /// Drains and applies saved candidates for a content in arrival order.
    pub(crate) fn apply_saved_candidates(&mut self, content_name: &str) {
        let saved = self.saved_candidates.take(content_name);
        if saved.is_empty() {
            return;
        }
        debug!(
            "applying {} saved candidates for {content_name}",
            saved.len()
        );
        for candidate in saved {
            trace!("applying saved candidate {candidate}");
            if let Err(err) = self.use_candidate(candidate) {
                warn!("dropping saved candidate for {content_name}: {err}");
            }
        }
    }

    /// Content a remote candidate belongs to, by name or by media-line index.
    pub(crate) fn resolve_candidate_content(&self, candidate: &RTCIceCandidate) -> Result<String> {
        if let Some(name) = candidate.content_name() {
            return Ok(name.to_owned());
        }
        candidate
            .sdp_mline_index
            .and_then(|index| {
                self.remote_description
                    .as_ref()
                    .and_then(|desc| desc.content_at(index))
            })
            .map(|content| content.name.clone())
            .ok_or(Error::ErrCandidateMissingContent)
    }

    pub(crate) fn handle_transport_event(&mut self, event: RTCTransportEvent) -> Result<()> {
        if self.is_closed() {
            debug!("ignoring transport event after close: {event:?}");
            return Ok(());
        }
        if let Some(transport_name) = event.transport_name() {
            if !self.transports.contains_key(transport_name) {
                debug!("ignoring event for unknown transport {transport_name}");
                return Ok(());
            }
        }

        match event {
            RTCTransportEvent::CandidatesReady {
                content_name,
                candidates,
            } => self.on_local_candidates(content_name, candidates)?,
            RTCTransportEvent::GatheringComplete { transport_name } => {
                if let Some(binding) = self.transports.get_mut(&transport_name) {
                    binding.gathering_state = RTCIceGatheringState::Complete;
                }
                debug!("gathering complete on transport {transport_name}");
                self.events
                    .push_back(RTCSessionEvent::OnIceGatheringCompleteEvent(transport_name));
                self.update_ice_gathering_state();
            }
            RTCTransportEvent::RequestSignaling { transport_name } => {
                debug!("transport {transport_name} requested signaling");
                self.transport_layer.signaling_ready(&transport_name);
            }
            RTCTransportEvent::Connecting { transport_name } => {
                if let Some(binding) = self.transports.get_mut(&transport_name) {
                    binding.connecting = true;
                }
                debug!("transport {transport_name} connecting");
            }
            RTCTransportEvent::Writable { transport_name } => {
                if let Some(binding) = self.transports.get_mut(&transport_name) {
                    binding.writable = true;
                }
                debug!("transport {transport_name} writable");
            }
            RTCTransportEvent::Failed {
                transport_name,
                reason,
            } => self.fail(Error::ErrTransportFailed(transport_name, reason)),
        }
        Ok(())
    }

    /// Records freshly gathered candidates in the local description and
    /// queues one notification for the batch.
    fn on_local_candidates(
        &mut self,
        content_name: String,
        candidates: Vec<RTCIceCandidate>,
    ) -> Result<()> {
        if candidates.is_empty() {
            return Ok(());
        }
        let Some(local) = self.local_description.as_mut() else {
            warn!(
                "dropping {} local candidates for {content_name}: no local description",
                candidates.len()
            );
            return Err(Error::ErrCandidateUnknownContent(content_name));
        };
        let Some(index) = local
            .content_index(&content_name)
            .filter(|_| local.has_active_content(&content_name))
        else {
            warn!(
                "dropping {} local candidates for unknown content {content_name}",
                candidates.len()
            );
            return Err(Error::ErrCandidateUnknownContent(content_name));
        };

        let candidates: Vec<RTCIceCandidate> = candidates
            .into_iter()
            .map(|mut candidate| {
                candidate.sdp_mid = Some(content_name.clone());
                candidate.sdp_mline_index = Some(index);
                candidate
            })
            .collect();
        for candidate in &candidates {
            trace!("local candidate {candidate}");
            local.add_candidate(&content_name, candidate);
        }
        debug!(
            "gathered {} local candidates for {content_name}",
            candidates.len()
        );

        self.events
            .push_back(RTCSessionEvent::OnIceCandidatesEvent(RTCIceCandidatesEvent {
                content_name,
                candidates,
            }));
        Ok(())
    }

    /// Records the first fatal error and queues the single error notification.
    pub(crate) fn fail(&mut self, err: Error) {
        if self.fatal_error.is_some() {
            debug!("session already failed, ignoring: {err}");
            return;
        }
        error!("session {} failed: {err}", self.session_id);
        self.fatal_error = Some(err);
        self.events.push_back(RTCSessionEvent::OnErrorEvent);
    }

    /// Delivers queued notifications to the observer. Events the observer
    /// does not consume stay queued for `poll_event`.
    pub(crate) fn flush_events(&mut self) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        let mut pending = VecDeque::with_capacity(self.events.len());
        while let Some(event) = self.events.pop_front() {
            if let Some(event) = event::dispatch(observer.as_mut(), event) {
                pending.push_back(event);
            }
        }
        self.events = pending;
    }
}

fn push_content(
    media: &mut RTCMediaChannel,
    op: StateChangeOp,
    content: &RTCMediaContent,
    action: RTCSdpType,
) -> Result<()> {
    match op {
        StateChangeOp::SetLocal => media.set_local_content(content, action),
        StateChangeOp::SetRemote => media.set_remote_content(content, action),
    }
}
