//! ICE candidates and the queue holding remote candidates that arrive
//! before the content they name has been described.

pub(crate) mod candidate_type;
pub(crate) mod saved_candidates;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use candidate_type::{RTCIceCandidateType, RTCIceProtocol};
pub use saved_candidates::SavedCandidateQueue;
use shared::error::{Error, Result};

/// A transport address a peer may be reached at, tagged with the content it
/// belongs to.
///
/// Either `sdp_mid` or `sdp_mline_index` identifies the content. When only
/// the index is present it is resolved against the remote description.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCIceCandidate {
    pub sdp_mid: Option<String>,
    pub sdp_mline_index: Option<u16>,
    pub foundation: String,
    pub priority: u32,
    pub address: String,
    pub protocol: RTCIceProtocol,
    pub port: u16,
    pub typ: RTCIceCandidateType,
    pub component: u16,
    pub related_address: String,
    pub related_port: u16,
    pub username_fragment: Option<String>,
}

/// RTP component id (RFC 8445 section 5.1.1.1).
pub const COMPONENT_RTP: u16 = 1;

impl RTCIceCandidate {
    /// A udp host candidate for the RTP component of `content_name`.
    pub fn host(content_name: &str, foundation: &str, address: &str, port: u16) -> Self {
        let mut candidate = RTCIceCandidate {
            sdp_mid: Some(content_name.to_owned()),
            foundation: foundation.to_owned(),
            address: address.to_owned(),
            protocol: RTCIceProtocol::Udp,
            port,
            typ: RTCIceCandidateType::Host,
            component: COMPONENT_RTP,
            ..Default::default()
        };
        candidate.priority = candidate.compute_priority(u16::MAX);
        candidate
    }

    /// priority = 2^24 * type preference + 2^8 * local preference + (256 - component)
    pub fn compute_priority(&self, local_preference: u16) -> u32 {
        (1 << 24) * self.typ.preference()
            + (1 << 8) * u32::from(local_preference)
            + (256 - u32::from(self.component.min(256)))
    }

    /// The content this candidate names, if it names one directly.
    pub fn content_name(&self) -> Option<&str> {
        self.sdp_mid.as_deref().filter(|mid| !mid.is_empty())
    }

    /// Checks the transport fields a transport needs to use the candidate.
    pub fn validate(&self) -> Result<()> {
        if self.address.is_empty() {
            return Err(Error::ErrCandidateMalformed("empty address".to_owned()));
        }
        if self.port == 0 {
            return Err(Error::ErrCandidateMalformed(format!(
                "{}: port must not be zero",
                self.address
            )));
        }
        if self.component == 0 {
            return Err(Error::ErrCandidateMalformed(format!(
                "{}:{}: component must not be zero",
                self.address, self.port
            )));
        }
        if self.protocol == RTCIceProtocol::Unspecified {
            return Err(Error::ErrCandidateMalformed(format!(
                "{}:{}: unknown protocol",
                self.address, self.port
            )));
        }
        Ok(())
    }

    /// Whether both candidates describe the same transport address.
    pub(crate) fn same_address(&self, other: &RTCIceCandidate) -> bool {
        self.address == other.address
            && self.port == other.port
            && self.protocol == other.protocol
            && self.component == other.component
    }
}

impl fmt::Display for RTCIceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}:{}",
            self.content_name().unwrap_or("?"),
            self.protocol,
            self.typ,
            self.address,
            self.port,
        )
    }
}
