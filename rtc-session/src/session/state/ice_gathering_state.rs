use std::fmt;

use crate::session::configuration::UNSPECIFIED_STR;

/// Candidate gathering progress of a single transport, or of the session
/// taken as a whole.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceGatheringState {
    #[default]
    Unspecified,

    /// The transport exists but has not been asked to gather yet.
    New,

    /// Gathering was started and candidates may still arrive.
    Gathering,

    /// The transport reported that allocation finished.
    Complete,
}

const ICE_GATHERING_STATE_NEW_STR: &str = "new";
const ICE_GATHERING_STATE_GATHERING_STR: &str = "gathering";
const ICE_GATHERING_STATE_COMPLETE_STR: &str = "complete";

impl From<&str> for RTCIceGatheringState {
    fn from(raw: &str) -> Self {
        match raw {
            ICE_GATHERING_STATE_NEW_STR => RTCIceGatheringState::New,
            ICE_GATHERING_STATE_GATHERING_STR => RTCIceGatheringState::Gathering,
            ICE_GATHERING_STATE_COMPLETE_STR => RTCIceGatheringState::Complete,
            _ => RTCIceGatheringState::Unspecified,
        }
    }
}

impl fmt::Display for RTCIceGatheringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCIceGatheringState::New => write!(f, "{ICE_GATHERING_STATE_NEW_STR}"),
            RTCIceGatheringState::Gathering => write!(f, "{ICE_GATHERING_STATE_GATHERING_STR}"),
            RTCIceGatheringState::Complete => {
                write!(f, "{ICE_GATHERING_STATE_COMPLETE_STR}")
            }
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

impl RTCIceGatheringState {
    /// Folds per-transport states into the session-wide state: `New` when
    /// there is nothing to gather, `Complete` once every transport finished,
    /// `Gathering` as long as any transport is still gathering.
    pub(crate) fn aggregate<I>(states: I) -> RTCIceGatheringState
    where
        I: IntoIterator<Item = RTCIceGatheringState>,
    {
        let mut any = false;
        let mut all_complete = true;
        let mut any_gathering = false;
        for state in states {
            any = true;
            match state {
                RTCIceGatheringState::Complete => {}
                RTCIceGatheringState::Gathering => {
                    any_gathering = true;
                    all_complete = false;
                }
                _ => all_complete = false,
            }
        }

        if !any {
            RTCIceGatheringState::New
        } else if all_complete {
            RTCIceGatheringState::Complete
        } else if any_gathering {
            RTCIceGatheringState::Gathering
        } else {
            RTCIceGatheringState::New
        }
    }
}
