//! Shared types used across the application.

use std::fmt;

/// Telegram chat or user id a message can be delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DestinationId(pub i64);

impl DestinationId {
    /// Map the configured group id, where `0` means unbound.
    pub fn from_config(raw: i64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two platforms joined by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Source side (platform A).
    Gitter,
    /// Destination side (platform B).
    Telegram,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gitter => f.write_str("Gitter"),
            Self::Telegram => f.write_str("Telegram"),
        }
    }
}

/// Authenticated account of the bridge on one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

/// Lifecycle of the Gitter stream subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Connecting,
    Open,
    Closed,
    /// Retry ceiling reached. Terminal.
    Exhausted,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Exhausted => "exhausted",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_group_id_is_unbound() {
        assert_eq!(DestinationId::from_config(0), None);
        assert_eq!(
            DestinationId::from_config(-1001234),
            Some(DestinationId(-1001234))
        );
    }
}
