//! Core identifier and classification types shared across the crate.

use serde::{Deserialize, Serialize};

use crate::registry::CustomIntentEntry;

/// Opaque reference to a call owned by the host signaling layer.
///
/// The admission core never dereferences a call itself; every operation on
/// the underlying object goes through [`crate::host::CallOps`].
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CallId(pub String);

impl CallId {
    pub fn new() -> Self {
        Self(format!("call-{}", uuid::Uuid::new_v4()))
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CallId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// SDP-style media direction.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum MediaDirection {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl MediaDirection {
    /// Decodes the textual form used in configuration lines.
    pub fn decode(s: &str) -> Option<Self> {
        match s {
            "sendrecv" => Some(Self::SendRecv),
            "sendonly" => Some(Self::SendOnly),
            "recvonly" => Some(Self::RecvOnly),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SendRecv => "sendrecv",
            Self::SendOnly => "sendonly",
            Self::RecvOnly => "recvonly",
            Self::Inactive => "inactive",
        }
    }

    /// Whether any media flows at all in this direction.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

impl std::fmt::Display for MediaDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Call lifecycle events delivered by the host, in the order the host
/// guarantees per call: `Created → Incoming | (LocalOfferReady →) Established
/// → Closed`, with DTMF events interleaved while established.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum CallEvent {
    Created,
    Incoming,
    LocalOfferReady,
    Established,
    DtmfStart,
    DtmfEnd,
    Closed,
}

/// Answer delay applied to an incoming call.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum AnswerDelay {
    /// Auto answer after the given number of seconds.
    Secs(u32),
    /// Never auto answer; ring until answered manually.
    Never,
}

/// Decoded purpose of an intercom call, derived from the intent header.
///
/// Recomputed from the call's custom headers on every lifecycle event;
/// classification carries no state of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Normal,
    Announcement,
    ForceTalk,
    Surveillance,
    Preview,
    Hidden,
    /// Operator-defined intent matched by subject prefix.
    Custom(CustomIntentEntry),
    /// Not an intercom call (or not the intent header at all).
    None,
}

impl Intent {
    pub fn is_none(&self) -> bool {
        matches!(self, Intent::None)
    }
}
