//! Data channel requests served by the session.

pub mod init;
pub mod parameters;

use parameters::DataChannelParameters;

/// Identifier for a data channel within a particular session
pub type RTCDataChannelId = u16;

/// Largest protocol string a data channel may carry.
pub(crate) const MAX_PROTOCOL_LEN: usize = 65535;

/// A data channel stream opened on the session's data content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RTCDataChannel {
    pub(crate) id: RTCDataChannelId,
    pub(crate) content_name: String,
    pub(crate) params: DataChannelParameters,
}

impl RTCDataChannel {
    pub fn id(&self) -> RTCDataChannelId {
        self.id
    }

    /// Name of the data content the stream was opened on.
    pub fn content_name(&self) -> &str {
        &self.content_name
    }

    /// label represents a label that can be used to distinguish this
    /// DataChannel object from other DataChannel objects.
    pub fn label(&self) -> &str {
        &self.params.label
    }

    pub fn protocol(&self) -> &str {
        &self.params.protocol
    }

    /// Ordered returns true if the DataChannel is ordered, and false if
    /// out-of-order delivery is allowed.
    pub fn ordered(&self) -> bool {
        self.params.ordered
    }

    pub fn max_packet_life_time(&self) -> Option<u16> {
        self.params.max_packet_life_time
    }

    pub fn max_retransmits(&self) -> Option<u16> {
        self.params.max_retransmits
    }

    pub fn negotiated(&self) -> bool {
        self.params.negotiated
    }

    pub fn parameters(&self) -> &DataChannelParameters {
        &self.params
    }
}
