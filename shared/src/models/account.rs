//! Identity record and role models
//!
//! An identity record is the single cross-role account record. Role-specific
//! fields live in the profile models and are kept consistent with the
//! identity record by the backend's synchronization service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role an account currently holds on the marketplace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Charters yachts and books add-on services
    Consumer,
    /// Owns and lists yachts
    Producer,
    /// Offers add-on services (catering, crew, transfers)
    Partner,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Consumer => "consumer",
            AccountRole::Producer => "producer",
            AccountRole::Partner => "partner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "consumer" => Some(AccountRole::Consumer),
            "producer" => Some(AccountRole::Producer),
            "partner" => Some(AccountRole::Partner),
            _ => None,
        }
    }

    /// Whether accounts in this role are backed by a provider profile
    pub fn is_provider(&self) -> bool {
        matches!(self, AccountRole::Producer | AccountRole::Partner)
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marketplace account, one per person
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: AccountRole,
    pub email_verified: bool,
    /// Loyalty point balance, starts at 0
    pub points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for the owner-mutable identity fields.
///
/// Unknown fields are rejected rather than silently merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl IdentityUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [
            AccountRole::Consumer,
            AccountRole::Producer,
            AccountRole::Partner,
        ] {
            assert_eq!(AccountRole::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn unknown_role_string_is_rejected() {
        assert_eq!(AccountRole::parse("admin"), None);
        assert_eq!(AccountRole::parse("Consumer"), None);
        assert_eq!(AccountRole::parse(""), None);
    }

    #[test]
    fn provider_roles() {
        assert!(!AccountRole::Consumer.is_provider());
        assert!(AccountRole::Producer.is_provider());
        assert!(AccountRole::Partner.is_provider());
    }
}
