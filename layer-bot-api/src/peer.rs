//! Chat and user addressing.
//!
//! Anything a message can be sent to is a [`Peer`]: a numeric identifier or a
//! public `@username`. Domain types that carry an identifier convert into
//! one with `From`, so they can be passed wherever a recipient is expected.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::Request;

/// A chat or user a request can address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Peer {
    /// Numeric chat or user identifier. Channels and supergroups are negative.
    Id(i64),
    /// Public username, stored without the leading `@`.
    Username(String),
}

impl Peer {
    /// Peer for a username. A leading `@` is accepted and dropped.
    pub fn username(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix('@') {
            Some(rest) => Self::Username(rest.to_string()),
            None       => Self::Username(name),
        }
    }

    /// Add this peer to `request` under `key`.
    pub fn add_to_request(&self, key: &str, request: Request) -> Request {
        match self {
            Self::Id(id)         => request.add_int64(key, *id),
            Self::Username(name) => request.add_string(key, format!("@{name}")),
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id)         => write!(f, "{id}"),
            Self::Username(name) => write!(f, "@{name}"),
        }
    }
}

/// `"@name"` parses as a username, anything else must be an integer.
impl FromStr for Peer {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('@') {
            Some(name) => Ok(Self::Username(name.to_string())),
            None       => s.parse().map(Self::Id),
        }
    }
}

impl From<i64> for Peer {
    fn from(id: i64) -> Self { Self::Id(id) }
}

impl From<i32> for Peer {
    fn from(id: i32) -> Self { Self::Id(id.into()) }
}

impl From<&str> for Peer {
    fn from(name: &str) -> Self { Self::username(name) }
}

impl From<String> for Peer {
    fn from(name: String) -> Self { Self::username(name) }
}

impl From<&Peer> for Peer {
    fn from(peer: &Peer) -> Self { peer.clone() }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(peer: impl Into<Peer>) -> Option<String> {
        Request::new("test").add_peer("chat_id", peer).arg("chat_id").map(str::to_string)
    }

    #[test]
    fn numeric_id_encodes_as_integer() {
        assert_eq!(encoded(1i64).as_deref(), Some("1"));
        assert_eq!(encoded(-1001234567890i64).as_deref(), Some("-1001234567890"));
    }

    #[test]
    fn username_encodes_with_at() {
        assert_eq!(encoded("mr-linch").as_deref(), Some("@mr-linch"));
        assert_eq!(encoded("@mr-linch").as_deref(), Some("@mr-linch"));
    }

    #[test]
    fn parse_peer() {
        assert_eq!("@durov".parse::<Peer>().unwrap(), Peer::Username("durov".into()));
        assert_eq!("-100500".parse::<Peer>().unwrap(), Peer::Id(-100500));
        assert!("durov".parse::<Peer>().is_err());
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(Peer::Id(42).to_string(), "42");
        assert_eq!(Peer::username("durov").to_string(), "@durov");
    }
}
