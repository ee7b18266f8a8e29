use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use std::fmt;
use std::str::FromStr;

use super::users::UserPublic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConnectionStatus::Pending),
            "accepted" => Ok(ConnectionStatus::Accepted),
            other => Err(format!("unknown connection status: {}", other)),
        }
    }
}

/// Direction-free key for an edge: the two ids sorted ascending.
///
/// Storage keeps this next to the directional requester/addressee fields and
/// enforces uniqueness on it, so (A,B) and (B,A) can never both exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalPair {
    low: Uuid,
    high: Uuid,
}

impl CanonicalPair {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.low == user_id || self.high == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub addressee_id: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    pub fn pending(requester_id: Uuid, addressee_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            requester_id,
            addressee_id,
            status: ConnectionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn pair(&self) -> CanonicalPair {
        CanonicalPair::new(self.requester_id, self.addressee_id)
    }

    /// The party on the edge that is not `user_id`.
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.requester_id == user_id {
            self.addressee_id
        } else {
            self.requester_id
        }
    }
}

/// An edge paired with the other party's public profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionWithUser {
    pub connection: Connection,
    pub user: UserPublic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_ignores_direction() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let forward = CanonicalPair::new(a, b);
        let backward = CanonicalPair::new(b, a);

        assert_eq!(forward, backward);
        assert!(forward.low() < forward.high());
        assert!(forward.contains(a) && forward.contains(b));
    }

    #[test]
    fn test_counterpart_from_either_side() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let conn = Connection::pending(a, b, Utc::now());

        assert_eq!(conn.counterpart(a), b);
        assert_eq!(conn.counterpart(b), a);
        assert_eq!(conn.pair(), CanonicalPair::new(b, a));
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [ConnectionStatus::Pending, ConnectionStatus::Accepted] {
            assert_eq!(status.as_str().parse::<ConnectionStatus>().unwrap(), status);
        }
        assert!("blocked".parse::<ConnectionStatus>().is_err());
        assert_eq!(
            serde_json::to_value(ConnectionStatus::Accepted).unwrap(),
            serde_json::json!("accepted")
        );
    }
}
