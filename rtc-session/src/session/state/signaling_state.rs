use std::fmt;

use crate::session::configuration::UNSPECIFIED_STR;
use crate::session::sdp::sdp_type::RTCSdpType;
use shared::error::{Error, Result};

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum StateChangeOp {
    #[default]
    SetLocal,
    SetRemote,
}

impl fmt::Display for StateChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StateChangeOp::SetLocal => write!(f, "SetLocal"),
            StateChangeOp::SetRemote => write!(f, "SetRemote"),
        }
    }
}

/// Indicates where the session is in the offer/answer exchange.
///
/// The offerer walks `Stable → HaveLocalOffer → Stable` while the answerer
/// walks `Stable → HaveRemoteOffer → Stable`. Provisional answers park the
/// session in one of the pranswer states until the final answer arrives.
/// `Closed` is terminal: every further Set* call is refused.
///
/// ```
/// use rtc_session::session::state::RTCSignalingState;
///
/// let state = RTCSignalingState::HaveLocalOffer;
/// assert_eq!(state.to_string(), "have-local-offer");
///
/// let parsed: RTCSignalingState = "have-remote-pranswer".into();
/// assert_eq!(parsed, RTCSignalingState::HaveRemotePranswer);
/// ```
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCSignalingState {
    Unspecified = 0,

    /// No exchange is in progress. Initial state, and the state reached after
    /// a final answer has been applied.
    #[default]
    Stable,

    /// A local offer was applied; waiting for the remote answer.
    HaveLocalOffer,

    /// A remote offer was applied; a local answer is expected.
    HaveRemoteOffer,

    /// A remote offer and a local provisional answer were applied.
    HaveLocalPranswer,

    /// A local offer and a remote provisional answer were applied.
    HaveRemotePranswer,

    /// The session has been closed.
    Closed,
}

const SIGNALING_STATE_STABLE_STR: &str = "stable";
const SIGNALING_STATE_HAVE_LOCAL_OFFER_STR: &str = "have-local-offer";
const SIGNALING_STATE_HAVE_REMOTE_OFFER_STR: &str = "have-remote-offer";
const SIGNALING_STATE_HAVE_LOCAL_PRANSWER_STR: &str = "have-local-pranswer";
const SIGNALING_STATE_HAVE_REMOTE_PRANSWER_STR: &str = "have-remote-pranswer";
const SIGNALING_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for RTCSignalingState {
    fn from(raw: &str) -> Self {
        match raw {
            SIGNALING_STATE_STABLE_STR => RTCSignalingState::Stable,
            SIGNALING_STATE_HAVE_LOCAL_OFFER_STR => RTCSignalingState::HaveLocalOffer,
            SIGNALING_STATE_HAVE_REMOTE_OFFER_STR => RTCSignalingState::HaveRemoteOffer,
            SIGNALING_STATE_HAVE_LOCAL_PRANSWER_STR => RTCSignalingState::HaveLocalPranswer,
            SIGNALING_STATE_HAVE_REMOTE_PRANSWER_STR => RTCSignalingState::HaveRemotePranswer,
            SIGNALING_STATE_CLOSED_STR => RTCSignalingState::Closed,
            _ => RTCSignalingState::Unspecified,
        }
    }
}

impl fmt::Display for RTCSignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCSignalingState::Stable => write!(f, "{SIGNALING_STATE_STABLE_STR}"),
            RTCSignalingState::HaveLocalOffer => {
                write!(f, "{SIGNALING_STATE_HAVE_LOCAL_OFFER_STR}")
            }
            RTCSignalingState::HaveRemoteOffer => {
                write!(f, "{SIGNALING_STATE_HAVE_REMOTE_OFFER_STR}")
            }
            RTCSignalingState::HaveLocalPranswer => {
                write!(f, "{SIGNALING_STATE_HAVE_LOCAL_PRANSWER_STR}")
            }
            RTCSignalingState::HaveRemotePranswer => {
                write!(f, "{SIGNALING_STATE_HAVE_REMOTE_PRANSWER_STR}")
            }
            RTCSignalingState::Closed => write!(f, "{SIGNALING_STATE_CLOSED_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

impl RTCSignalingState {
    /// Returns true while an offer is outstanding in either direction.
    pub fn is_negotiating(&self) -> bool {
        !matches!(
            self,
            RTCSignalingState::Stable | RTCSignalingState::Closed | RTCSignalingState::Unspecified
        )
    }
}

/// Computes the state reached by applying a description of `sdp_type` with
/// `op` while in `cur`, or fails when the combination is not a legal move.
///
/// A repeated local offer while `HaveLocalOffer` is only legal when
/// `allow_repeated_local_offer` is set.
pub(crate) fn check_next_signaling_state(
    cur: RTCSignalingState,
    op: StateChangeOp,
    sdp_type: RTCSdpType,
    allow_repeated_local_offer: bool,
) -> Result<RTCSignalingState> {
    let next = match (cur, op, sdp_type) {
        // stable->SetLocal(offer)->have-local-offer
        (RTCSignalingState::Stable, StateChangeOp::SetLocal, RTCSdpType::Offer) => {
            Some(RTCSignalingState::HaveLocalOffer)
        }
        // stable->SetRemote(offer)->have-remote-offer
        (RTCSignalingState::Stable, StateChangeOp::SetRemote, RTCSdpType::Offer) => {
            Some(RTCSignalingState::HaveRemoteOffer)
        }
        // have-local-offer->SetLocal(offer)->have-local-offer
        (RTCSignalingState::HaveLocalOffer, StateChangeOp::SetLocal, RTCSdpType::Offer)
            if allow_repeated_local_offer =>
        {
            Some(RTCSignalingState::HaveLocalOffer)
        }
        // have-local-offer->SetRemote(answer)->stable
        (RTCSignalingState::HaveLocalOffer, StateChangeOp::SetRemote, RTCSdpType::Answer) => {
            Some(RTCSignalingState::Stable)
        }
        // have-local-offer->SetRemote(pranswer)->have-remote-pranswer
        (RTCSignalingState::HaveLocalOffer, StateChangeOp::SetRemote, RTCSdpType::Pranswer) => {
            Some(RTCSignalingState::HaveRemotePranswer)
        }
        // have-remote-pranswer->SetRemote(pranswer)->have-remote-pranswer
        (
            RTCSignalingState::HaveRemotePranswer,
            StateChangeOp::SetRemote,
            RTCSdpType::Pranswer,
        ) => Some(RTCSignalingState::HaveRemotePranswer),
        // have-remote-pranswer->SetRemote(answer)->stable
        (RTCSignalingState::HaveRemotePranswer, StateChangeOp::SetRemote, RTCSdpType::Answer) => {
            Some(RTCSignalingState::Stable)
        }
        // have-remote-offer->SetLocal(answer)->stable
        (RTCSignalingState::HaveRemoteOffer, StateChangeOp::SetLocal, RTCSdpType::Answer) => {
            Some(RTCSignalingState::Stable)
        }
        // have-remote-offer->SetLocal(pranswer)->have-local-pranswer
        (RTCSignalingState::HaveRemoteOffer, StateChangeOp::SetLocal, RTCSdpType::Pranswer) => {
            Some(RTCSignalingState::HaveLocalPranswer)
        }
        // have-local-pranswer->SetLocal(pranswer)->have-local-pranswer
        (RTCSignalingState::HaveLocalPranswer, StateChangeOp::SetLocal, RTCSdpType::Pranswer) => {
            Some(RTCSignalingState::HaveLocalPranswer)
        }
        // have-local-pranswer->SetLocal(answer)->stable
        (RTCSignalingState::HaveLocalPranswer, StateChangeOp::SetLocal, RTCSdpType::Answer) => {
            Some(RTCSignalingState::Stable)
        }
        _ => None,
    };

    next.ok_or_else(|| {
        Error::ErrSignalingStateProposedTransitionInvalid(format!(
            "from {cur} applying {op}({sdp_type})"
        ))
    })
}

/// Checks whether a local description of `sdp_type` may be applied in `cur`
/// and returns the resulting state.
pub fn expect_set_local_description(
    cur: RTCSignalingState,
    sdp_type: RTCSdpType,
    allow_repeated_local_offer: bool,
) -> Result<RTCSignalingState> {
    check_next_signaling_state(
        cur,
        StateChangeOp::SetLocal,
        sdp_type,
        allow_repeated_local_offer,
    )
}

/// Checks whether a remote description of `sdp_type` may be applied in `cur`
/// and returns the resulting state.
pub fn expect_set_remote_description(
    cur: RTCSignalingState,
    sdp_type: RTCSdpType,
) -> Result<RTCSignalingState> {
    check_next_signaling_state(cur, StateChangeOp::SetRemote, sdp_type, false)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_signaling_state() {
        let tests = vec![
            ("Unspecified", RTCSignalingState::Unspecified),
            ("stable", RTCSignalingState::Stable),
            ("have-local-offer", RTCSignalingState::HaveLocalOffer),
            ("have-remote-offer", RTCSignalingState::HaveRemoteOffer),
            ("have-local-pranswer", RTCSignalingState::HaveLocalPranswer),
            (
                "have-remote-pranswer",
                RTCSignalingState::HaveRemotePranswer,
            ),
            ("closed", RTCSignalingState::Closed),
        ];

        for (state_string, expected_state) in tests {
            assert_eq!(RTCSignalingState::from(state_string), expected_state);
        }
    }

    #[test]
    fn test_signaling_state_string() {
        let tests = vec![
            (RTCSignalingState::Unspecified, "Unspecified"),
            (RTCSignalingState::Stable, "stable"),
            (RTCSignalingState::HaveLocalOffer, "have-local-offer"),
            (RTCSignalingState::HaveRemoteOffer, "have-remote-offer"),
            (RTCSignalingState::HaveLocalPranswer, "have-local-pranswer"),
            (
                RTCSignalingState::HaveRemotePranswer,
                "have-remote-pranswer",
            ),
            (RTCSignalingState::Closed, "closed"),
        ];

        for (state, expected_string) in tests {
            assert_eq!(state.to_string(), expected_string);
        }
    }

    #[test]
    fn test_signaling_state_transitions() {
        let tests = vec![
            (
                "stable->SetLocal(offer)->have-local-offer",
                RTCSignalingState::Stable,
                StateChangeOp::SetLocal,
                RTCSdpType::Offer,
                Some(RTCSignalingState::HaveLocalOffer),
            ),
            (
                "stable->SetRemote(offer)->have-remote-offer",
                RTCSignalingState::Stable,
                StateChangeOp::SetRemote,
                RTCSdpType::Offer,
                Some(RTCSignalingState::HaveRemoteOffer),
            ),
            (
                "have-local-offer->SetRemote(answer)->stable",
                RTCSignalingState::HaveLocalOffer,
                StateChangeOp::SetRemote,
                RTCSdpType::Answer,
                Some(RTCSignalingState::Stable),
            ),
            (
                "have-local-offer->SetRemote(pranswer)->have-remote-pranswer",
                RTCSignalingState::HaveLocalOffer,
                StateChangeOp::SetRemote,
                RTCSdpType::Pranswer,
                Some(RTCSignalingState::HaveRemotePranswer),
            ),
            (
                "have-remote-pranswer->SetRemote(pranswer)->have-remote-pranswer",
                RTCSignalingState::HaveRemotePranswer,
                StateChangeOp::SetRemote,
                RTCSdpType::Pranswer,
                Some(RTCSignalingState::HaveRemotePranswer),
            ),
            (
                "have-remote-pranswer->SetRemote(answer)->stable",
                RTCSignalingState::HaveRemotePranswer,
                StateChangeOp::SetRemote,
                RTCSdpType::Answer,
                Some(RTCSignalingState::Stable),
            ),
            (
                "have-remote-offer->SetLocal(answer)->stable",
                RTCSignalingState::HaveRemoteOffer,
                StateChangeOp::SetLocal,
                RTCSdpType::Answer,
                Some(RTCSignalingState::Stable),
            ),
            (
                "have-remote-offer->SetLocal(pranswer)->have-local-pranswer",
                RTCSignalingState::HaveRemoteOffer,
                StateChangeOp::SetLocal,
                RTCSdpType::Pranswer,
                Some(RTCSignalingState::HaveLocalPranswer),
            ),
            (
                "have-local-pranswer->SetLocal(answer)->stable",
                RTCSignalingState::HaveLocalPranswer,
                StateChangeOp::SetLocal,
                RTCSdpType::Answer,
                Some(RTCSignalingState::Stable),
            ),
            (
                "(invalid) stable->SetRemote(answer)",
                RTCSignalingState::Stable,
                StateChangeOp::SetRemote,
                RTCSdpType::Answer,
                None,
            ),
            (
                "(invalid) stable->SetLocal(pranswer)",
                RTCSignalingState::Stable,
                StateChangeOp::SetLocal,
                RTCSdpType::Pranswer,
                None,
            ),
            (
                "(invalid) have-local-offer->SetLocal(offer)",
                RTCSignalingState::HaveLocalOffer,
                StateChangeOp::SetLocal,
                RTCSdpType::Offer,
                None,
            ),
            (
                "(invalid) have-local-offer->SetRemote(offer)",
                RTCSignalingState::HaveLocalOffer,
                StateChangeOp::SetRemote,
                RTCSdpType::Offer,
                None,
            ),
            (
                "(invalid) have-remote-offer->SetRemote(offer)",
                RTCSignalingState::HaveRemoteOffer,
                StateChangeOp::SetRemote,
                RTCSdpType::Offer,
                None,
            ),
            (
                "(invalid) have-remote-offer->SetLocal(offer)",
                RTCSignalingState::HaveRemoteOffer,
                StateChangeOp::SetLocal,
                RTCSdpType::Offer,
                None,
            ),
            (
                "(invalid) have-remote-pranswer->SetLocal(answer)",
                RTCSignalingState::HaveRemotePranswer,
                StateChangeOp::SetLocal,
                RTCSdpType::Answer,
                None,
            ),
            (
                "(invalid) closed->SetRemote(offer)",
                RTCSignalingState::Closed,
                StateChangeOp::SetRemote,
                RTCSdpType::Offer,
                None,
            ),
            (
                "(invalid) stable->SetLocal(unspecified)",
                RTCSignalingState::Stable,
                StateChangeOp::SetLocal,
                RTCSdpType::Unspecified,
                None,
            ),
        ];

        for (desc, cur, op, sdp_type, expected) in tests {
            let result = check_next_signaling_state(cur, op, sdp_type, false);
            match (result, expected) {
                (Ok(got), Some(want)) => assert_eq!(got, want, "{desc}"),
                (Err(err), None) => assert_eq!(
                    err.kind(),
                    shared::error::ErrorKind::StateTransition,
                    "{desc}"
                ),
                (result, expected) => {
                    panic!("{desc}: expected {expected:?}, got {result:?}")
                }
            }
        }
    }

    #[test]
    fn test_repeated_local_offer() {
        assert!(
            expect_set_local_description(
                RTCSignalingState::HaveLocalOffer,
                RTCSdpType::Offer,
                false
            )
            .is_err()
        );
        assert_eq!(
            expect_set_local_description(
                RTCSignalingState::HaveLocalOffer,
                RTCSdpType::Offer,
                true
            ),
            Ok(RTCSignalingState::HaveLocalOffer)
        );
        assert!(
            expect_set_remote_description(RTCSignalingState::Closed, RTCSdpType::Answer).is_err()
        );
    }
}
