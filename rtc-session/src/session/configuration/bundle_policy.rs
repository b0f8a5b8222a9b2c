use std::fmt;

use serde::{Deserialize, Serialize};

/// Governs whether contents may share one transport through a BUNDLE group.
///
/// Only `MaxCompat` changes negotiation. `Balanced` and `MaxBundle` both
/// offer one group over every content and both fall back to a transport per
/// content when the answer leaves a content out of the group; the policy
/// itself is still reported through the configuration.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum RTCBundlePolicy {
    /// Unspecified - treated as balanced
    #[default]
    Unspecified = 0,

    /// Offer a BUNDLE group over every content.
    #[serde(rename = "balanced")]
    Balanced = 1,

    /// Never offer BUNDLE. Every content gets its own transport.
    #[serde(rename = "max-compat")]
    MaxCompat = 2,

    /// Same negotiation as `Balanced`.
    #[serde(rename = "max-bundle")]
    MaxBundle = 3,
}

const BUNDLE_POLICY_BALANCED_STR: &str = "balanced";
const BUNDLE_POLICY_MAX_COMPAT_STR: &str = "max-compat";
const BUNDLE_POLICY_MAX_BUNDLE_STR: &str = "max-bundle";

impl From<&str> for RTCBundlePolicy {
    fn from(raw: &str) -> Self {
        match raw {
            BUNDLE_POLICY_BALANCED_STR => RTCBundlePolicy::Balanced,
            BUNDLE_POLICY_MAX_COMPAT_STR => RTCBundlePolicy::MaxCompat,
            BUNDLE_POLICY_MAX_BUNDLE_STR => RTCBundlePolicy::MaxBundle,
            _ => RTCBundlePolicy::Unspecified,
        }
    }
}

impl fmt::Display for RTCBundlePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCBundlePolicy::Balanced => write!(f, "{BUNDLE_POLICY_BALANCED_STR}"),
            RTCBundlePolicy::MaxCompat => write!(f, "{BUNDLE_POLICY_MAX_COMPAT_STR}"),
            RTCBundlePolicy::MaxBundle => write!(f, "{BUNDLE_POLICY_MAX_BUNDLE_STR}"),
            _ => write!(f, "{}", super::UNSPECIFIED_STR),
        }
    }
}

impl RTCBundlePolicy {
    /// Whether offers carry a BUNDLE group and answers may confirm one.
    pub fn allows_bundle(&self) -> bool {
        *self != RTCBundlePolicy::MaxCompat
    }
}
