#![allow(dead_code)]

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`] values.
///
/// Callers that only care about *why* an operation was refused (a bad signaling
/// transition versus a malformed candidate, for instance) can match on the kind
/// instead of enumerating individual variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An operation is illegal in the current negotiation state.
    StateTransition,
    /// A description or its declared type could not be understood.
    Format,
    /// The configured secure policy is not satisfied.
    SecurityPolicy,
    /// A remote candidate could not be queued or applied.
    Candidate,
    /// The channel manager failed to allocate a channel.
    ChannelCreation,
    /// A data channel request was refused.
    DataChannel,
    /// A media provider request could not be served.
    Media,
    /// The transport layer refused a request or failed.
    Transport,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            ErrorKind::StateTransition => "state-transition",
            ErrorKind::Format => "format",
            ErrorKind::SecurityPolicy => "security-policy",
            ErrorKind::Candidate => "candidate",
            ErrorKind::ChannelCreation => "channel-creation",
            ErrorKind::DataChannel => "data-channel",
            ErrorKind::Media => "media",
            ErrorKind::Transport => "transport",
            ErrorKind::Other => "other",
        };
        write!(f, "{s}")
    }
}

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    //////////////////////////////////////////////////
    // signaling state
    //////////////////////////////////////////////////
    /// Indicates a proposed signaling transition is not allowed from the
    /// current signaling state.
    #[error("invalid proposed signaling state transition: {0}")]
    ErrSignalingStateProposedTransitionInvalid(String),

    /// Indicates the session has been closed and cannot be used any more.
    #[error("session closed")]
    ErrSessionClosed,

    /// Indicates the session reported a fatal error and refuses further negotiation.
    #[error("session failed: {0}")]
    ErrSessionFailed(String),

    //////////////////////////////////////////////////
    // format
    //////////////////////////////////////////////////
    /// Indicates the declared description type is not one of offer, pranswer or answer.
    #[error("unrecognized session description type: {0}")]
    ErrSdpTypeUnrecognized(String),

    /// Indicates a description was passed with an unspecified type.
    #[error("session description type is unspecified")]
    ErrSdpTypeUnspecified,

    /// Indicates create_answer was given a description that is not an offer.
    #[error("expected an offer, got {0}")]
    ErrSdpTypeNotOffer(String),

    /// Indicates two contents of one description share a name.
    #[error("duplicate content name in session description: {0}")]
    ErrDuplicateContentName(String),

    /// Indicates a content has an empty name.
    #[error("content name must not be empty")]
    ErrEmptyContentName,

    /// Indicates a BUNDLE group names a content the description does not have.
    #[error("bundle group references unknown content: {0}")]
    ErrBundleGroupUnknownContent(String),

    //////////////////////////////////////////////////
    // security policy
    //////////////////////////////////////////////////
    /// Indicates crypto is required by policy but the content carries no crypto parameters.
    #[error("crypto required by secure policy but missing for content: {0}")]
    ErrCryptoRequired(String),

    //////////////////////////////////////////////////
    // candidate
    //////////////////////////////////////////////////
    /// Indicates the candidate names a content that the remote description does not contain.
    #[error("candidate references unknown content: {0}")]
    ErrCandidateUnknownContent(String),

    /// Indicates no transport backs the content named by the candidate.
    #[error("no transport for candidate content: {0}")]
    ErrCandidateNoTransport(String),

    /// Indicates the candidate carries neither a content name nor a usable media-line index.
    #[error("candidate has neither sdp_mid nor a resolvable sdp_mline_index")]
    ErrCandidateMissingContent,

    /// Indicates the candidate's transport data is malformed.
    #[error("malformed candidate: {0}")]
    ErrCandidateMalformed(String),

    /// Indicates the transport layer refused the candidate.
    #[error("transport rejected candidate for {0}: {1}")]
    ErrCandidateRejected(String, String),

    //////////////////////////////////////////////////
    // channel
    //////////////////////////////////////////////////
    /// Indicates the channel manager failed to create a channel.
    #[error("failed to create {0} channel for content {1}")]
    ErrChannelCreation(String, String),

    /// Indicates a channel refused the negotiated content.
    #[error("channel for content {0} rejected description: {1}")]
    ErrChannelContentRejected(String, String),

    /// Indicates no channel of the requested kind exists.
    #[error("no {0} channel")]
    ErrChannelNotFound(String),

    //////////////////////////////////////////////////
    // data channel
    //////////////////////////////////////////////////
    /// Indicates the session has not negotiated data channel support.
    #[error("data channels are not negotiated")]
    ErrDataChannelNotNegotiated,

    /// Indicates both max_packet_life_time and max_retransmits were set.
    #[error("both max_packet_life_time and max_retransmits was set")]
    ErrRetransmitsOrPacketLifeTime,

    /// Indicates the data channel protocol string exceeds 65535 bytes.
    #[error("protocol is larger then 65535 bytes")]
    ErrProtocolTooLarge,

    /// Indicates a data channel with the requested id already exists.
    #[error("data channel id {0} already in use")]
    ErrDataChannelIdInUse(u16),

    /// Indicates every data channel id is already allocated.
    #[error("maximum number of data channels reached")]
    ErrMaxDataChannelId,

    //////////////////////////////////////////////////
    // media
    //////////////////////////////////////////////////
    /// Indicates no track with the given name is described.
    #[error("track not found: {0}")]
    ErrTrackNotFound(String),

    /// Indicates the voice channel cannot send DTMF for the track.
    #[error("dtmf not supported for track: {0}")]
    ErrDtmfNotSupported(String),

    //////////////////////////////////////////////////
    // transport
    //////////////////////////////////////////////////
    /// Indicates the transport layer failed to create a transport.
    #[error("failed to create transport {0}: {1}")]
    ErrTransportCreation(String, String),

    /// Indicates the transport layer reported an unrecoverable failure.
    #[error("transport {0} failed: {1}")]
    ErrTransportFailed(String, String),

    //////////////////////////////////////////////////
    // configuration
    //////////////////////////////////////////////////
    /// Indicates a codec list in the configuration is empty.
    #[error("no {0} codecs configured")]
    ErrNoCodecs(String),

    /// Indicates local username fragment is shorter than 4 characters.
    #[error("local username fragment is less than 24 bits long")]
    ErrLocalUfragInsufficientBits,

    /// Indicates local password is shorter than 22 characters.
    #[error("local password is less than 128 bits long")]
    ErrLocalPwdInsufficientBits,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// kind classifies the error into one of the [`ErrorKind`] buckets.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ErrSignalingStateProposedTransitionInvalid(_)
            | Error::ErrSessionClosed
            | Error::ErrSessionFailed(_) => ErrorKind::StateTransition,

            Error::ErrSdpTypeUnrecognized(_)
            | Error::ErrSdpTypeUnspecified
            | Error::ErrSdpTypeNotOffer(_)
            | Error::ErrDuplicateContentName(_)
            | Error::ErrEmptyContentName
            | Error::ErrBundleGroupUnknownContent(_) => ErrorKind::Format,

            Error::ErrCryptoRequired(_) => ErrorKind::SecurityPolicy,

            Error::ErrCandidateUnknownContent(_)
            | Error::ErrCandidateNoTransport(_)
            | Error::ErrCandidateMissingContent
            | Error::ErrCandidateMalformed(_)
            | Error::ErrCandidateRejected(_, _) => ErrorKind::Candidate,

            Error::ErrChannelCreation(_, _) | Error::ErrChannelContentRejected(_, _) => {
                ErrorKind::ChannelCreation
            }

            Error::ErrDataChannelNotNegotiated
            | Error::ErrRetransmitsOrPacketLifeTime
            | Error::ErrProtocolTooLarge
            | Error::ErrDataChannelIdInUse(_)
            | Error::ErrMaxDataChannelId => ErrorKind::DataChannel,

            Error::ErrChannelNotFound(_)
            | Error::ErrTrackNotFound(_)
            | Error::ErrDtmfNotSupported(_) => ErrorKind::Media,

            Error::ErrTransportCreation(_, _) | Error::ErrTransportFailed(_, _) => {
                ErrorKind::Transport
            }

            Error::ErrNoCodecs(_)
            | Error::ErrLocalUfragInsufficientBits
            | Error::ErrLocalPwdInsufficientBits
            | Error::Other(_) => ErrorKind::Other,
        }
    }
}

/// flatten_errs flattens multiple errors into one
pub fn flatten_errs(errs: Vec<impl Into<Error>>) -> Result<()> {
    if errs.is_empty() {
        Ok(())
    } else {
        let errs_strs: Vec<String> = errs.into_iter().map(|e| e.into().to_string()).collect();
        Err(Error::Other(errs_strs.join("\n")))
    }
}
