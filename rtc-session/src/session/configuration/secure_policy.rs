use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether SDES crypto parameters are offered, accepted or demanded.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum RTCSecurePolicy {
    /// Never offer crypto and ignore offered crypto.
    #[serde(rename = "disabled")]
    Disabled,

    /// Offer crypto and accept peers that do not use it.
    #[default]
    #[serde(rename = "preferred")]
    Preferred,

    /// Offer crypto and refuse any content without it.
    #[serde(rename = "required")]
    Required,
}

const SECURE_POLICY_DISABLED_STR: &str = "disabled";
const SECURE_POLICY_PREFERRED_STR: &str = "preferred";
const SECURE_POLICY_REQUIRED_STR: &str = "required";

impl From<&str> for RTCSecurePolicy {
    fn from(raw: &str) -> Self {
        match raw {
            SECURE_POLICY_DISABLED_STR => RTCSecurePolicy::Disabled,
            SECURE_POLICY_REQUIRED_STR => RTCSecurePolicy::Required,
            _ => RTCSecurePolicy::Preferred,
        }
    }
}

impl fmt::Display for RTCSecurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RTCSecurePolicy::Disabled => SECURE_POLICY_DISABLED_STR,
            RTCSecurePolicy::Preferred => SECURE_POLICY_PREFERRED_STR,
            RTCSecurePolicy::Required => SECURE_POLICY_REQUIRED_STR,
        };
        write!(f, "{s}")
    }
}

impl RTCSecurePolicy {
    pub fn is_required(&self) -> bool {
        *self == RTCSecurePolicy::Required
    }

    pub fn offers_crypto(&self) -> bool {
        *self != RTCSecurePolicy::Disabled
    }
}
