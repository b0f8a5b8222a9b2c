use serde::{Deserialize, Serialize};

/// Parameters describing an open data channel stream.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChannelParameters {
    /// The label that can be used to distinguish this DataChannel from others.
    pub label: String,

    /// The name of the sub-protocol in use.
    pub protocol: String,

    /// Whether the data channel guarantees in-order delivery of messages.
    pub ordered: bool,

    /// The maximum time in milliseconds during which transmissions and
    /// retransmissions may occur in unreliable mode.
    pub max_packet_life_time: Option<u16>,

    /// The maximum number of retransmission attempts in unreliable mode.
    pub max_retransmits: Option<u16>,

    /// True when the id was agreed by the application rather than allocated.
    pub negotiated: bool,
}
