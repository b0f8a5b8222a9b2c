use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::content::{RTCContentGroup, RTCMediaContent, RTCMediaKind};
use super::sdp_type::RTCSdpType;
use crate::session::candidate::RTCIceCandidate;
use shared::error::{Error, Result};

/// A structured session description: the typed result of parsing SDP.
///
/// The session never renders or parses SDP text itself. Descriptions are
/// exchanged in this form and may be serialized with serde for signaling.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCSessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: RTCSdpType,
    pub session_id: String,
    pub session_version: u64,
    pub contents: Vec<RTCMediaContent>,
    pub groups: Vec<RTCContentGroup>,
}

impl RTCSessionDescription {
    /// Given contents, create an offer
    pub fn offer(contents: Vec<RTCMediaContent>, groups: Vec<RTCContentGroup>) -> Self {
        Self::new(RTCSdpType::Offer, contents, groups)
    }

    /// Given contents, create a provisional answer
    pub fn pranswer(contents: Vec<RTCMediaContent>, groups: Vec<RTCContentGroup>) -> Self {
        Self::new(RTCSdpType::Pranswer, contents, groups)
    }

    /// Given contents, create an answer
    pub fn answer(contents: Vec<RTCMediaContent>, groups: Vec<RTCContentGroup>) -> Self {
        Self::new(RTCSdpType::Answer, contents, groups)
    }

    pub fn new(
        sdp_type: RTCSdpType,
        contents: Vec<RTCMediaContent>,
        groups: Vec<RTCContentGroup>,
    ) -> Self {
        Self {
            sdp_type,
            contents,
            groups,
            ..Default::default()
        }
    }

    /// Builds a description whose type is given as a string, the way it
    /// arrives from signaling. Unknown type strings are refused.
    pub fn with_type_str(
        sdp_type: &str,
        contents: Vec<RTCMediaContent>,
        groups: Vec<RTCContentGroup>,
    ) -> Result<Self> {
        Ok(Self::new(sdp_type.parse()?, contents, groups))
    }

    /// The action carried by this description.
    pub(crate) fn action(&self) -> Result<RTCSdpType> {
        match self.sdp_type {
            RTCSdpType::Unspecified => Err(Error::ErrSdpTypeUnspecified),
            sdp_type => Ok(sdp_type),
        }
    }

    /// Checks the structure of the description: content names must be
    /// non-empty and unique, and every BUNDLE member must name a content.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for content in &self.contents {
            if content.name.is_empty() {
                return Err(Error::ErrEmptyContentName);
            }
            if !names.insert(content.name.as_str()) {
                return Err(Error::ErrDuplicateContentName(content.name.clone()));
            }
        }

        for group in self.groups.iter().filter(|g| g.is_bundle()) {
            for name in &group.content_names {
                if !names.contains(name.as_str()) {
                    return Err(Error::ErrBundleGroupUnknownContent(name.clone()));
                }
            }
        }

        Ok(())
    }

    pub fn content(&self, name: &str) -> Option<&RTCMediaContent> {
        self.contents.iter().find(|c| c.name == name)
    }

    pub(crate) fn content_mut(&mut self, name: &str) -> Option<&mut RTCMediaContent> {
        self.contents.iter_mut().find(|c| c.name == name)
    }

    /// Returns true when the description has a content named `name` that was
    /// not rejected.
    pub fn has_active_content(&self, name: &str) -> bool {
        self.content(name).is_some_and(|c| !c.rejected)
    }

    pub fn active_contents(&self) -> impl Iterator<Item = &RTCMediaContent> {
        self.contents.iter().filter(|c| !c.rejected)
    }

    /// Content at the given media-line index, counting rejected lines.
    pub fn content_at(&self, sdp_mline_index: u16) -> Option<&RTCMediaContent> {
        self.contents.get(sdp_mline_index as usize)
    }

    pub fn content_index(&self, name: &str) -> Option<u16> {
        self.contents
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| u16::try_from(i).ok())
    }

    pub fn first_active_content_of_kind(&self, kind: RTCMediaKind) -> Option<&RTCMediaContent> {
        self.active_contents().find(|c| c.kind == kind)
    }

    pub fn bundle_group(&self) -> Option<&RTCContentGroup> {
        self.groups.iter().find(|g| g.is_bundle())
    }

    /// Appends `candidate` to the content it names unless an identical
    /// address is already listed. Returns whether the content exists.
    pub(crate) fn add_candidate(&mut self, content_name: &str, candidate: &RTCIceCandidate) -> bool {
        let Some(content) = self.content_mut(content_name) else {
            return false;
        };
        if !content.transport.has_candidate(candidate) {
            let mut candidate = candidate.clone();
            candidate.sdp_mid = Some(content_name.to_owned());
            content.transport.candidates.push(candidate);
        }
        true
    }
}
