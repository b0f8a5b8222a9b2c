use std::fmt;
use std::str::FromStr;

use crate::session::configuration::UNSPECIFIED_STR;
use serde::{Deserialize, Serialize};
use shared::error::Error;

/// Declared role of a session description in the offer/answer exchange.
///
/// ```
/// use rtc_session::session::sdp::RTCSdpType;
///
/// assert_eq!(RTCSdpType::Pranswer.to_string(), "pranswer");
/// assert_eq!("answer".parse::<RTCSdpType>().ok(), Some(RTCSdpType::Answer));
/// assert!("rollback".parse::<RTCSdpType>().is_err());
/// ```
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum RTCSdpType {
    /// Type not specified. A description of this type is refused by every Set* call.
    #[default]
    Unspecified = 0,

    /// The description proposes a new set of contents.
    #[serde(rename = "offer")]
    Offer,

    /// A provisional answer. It may be applied in response to an offer or as
    /// an update to a previous provisional answer, and leaves the exchange open.
    #[serde(rename = "pranswer")]
    Pranswer,

    /// The final answer. Applying it completes the exchange.
    #[serde(rename = "answer")]
    Answer,
}

const SDP_TYPE_OFFER_STR: &str = "offer";
const SDP_TYPE_PRANSWER_STR: &str = "pranswer";
const SDP_TYPE_ANSWER_STR: &str = "answer";

/// creates an SDPType from a string
impl From<&str> for RTCSdpType {
    fn from(raw: &str) -> Self {
        match raw {
            SDP_TYPE_OFFER_STR => RTCSdpType::Offer,
            SDP_TYPE_PRANSWER_STR => RTCSdpType::Pranswer,
            SDP_TYPE_ANSWER_STR => RTCSdpType::Answer,
            _ => RTCSdpType::Unspecified,
        }
    }
}

/// Strict parse used when the declared type comes from the wire.
impl FromStr for RTCSdpType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match RTCSdpType::from(raw) {
            RTCSdpType::Unspecified => Err(Error::ErrSdpTypeUnrecognized(raw.to_owned())),
            sdp_type => Ok(sdp_type),
        }
    }
}

impl fmt::Display for RTCSdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCSdpType::Offer => write!(f, "{SDP_TYPE_OFFER_STR}"),
            RTCSdpType::Pranswer => write!(f, "{SDP_TYPE_PRANSWER_STR}"),
            RTCSdpType::Answer => write!(f, "{SDP_TYPE_ANSWER_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}
