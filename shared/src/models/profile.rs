//! Role-specific profile models
//!
//! Profiles are denormalized from the identity record. They are created the
//! first time an account holds the matching role and are never deleted on a
//! role change, so a reverted account finds its old data intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile for accounts chartering yachts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerProfile {
    pub account_id: Uuid,
    pub profile_photo: Option<String>,
    pub preferences: Vec<String>,
    /// Ordered, duplicate-free list of yacht listing ids
    pub wishlist: Vec<Uuid>,
    pub booking_history: Vec<Uuid>,
    pub last_updated: DateTime<Utc>,
}

impl ConsumerProfile {
    /// Empty profile created when an account first becomes a consumer
    pub fn empty(account_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            account_id,
            profile_photo: None,
            preferences: Vec::new(),
            wishlist: Vec::new(),
            booking_history: Vec::new(),
            last_updated: now,
        }
    }
}

/// Contact details for a yacht owner or service partner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInformation {
    pub address: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
}

/// Profile for yacht owners and add-on service partners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub account_id: Uuid,
    pub business_name: String,
    pub contact_information: ContactInformation,
    pub services_offered: Vec<String>,
    pub certifications: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl ProviderProfile {
    /// Default profile created when an account first becomes a provider.
    /// The business name is seeded from the account holder's name.
    pub fn defaulted(account_id: Uuid, business_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            account_id,
            business_name: business_name.to_string(),
            contact_information: ContactInformation::default(),
            services_offered: Vec::new(),
            certifications: Vec::new(),
            last_updated: now,
        }
    }
}

/// Partial update for consumer profile fields.
///
/// Unknown fields are rejected rather than silently merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumerProfileUpdate {
    pub profile_photo: Option<String>,
    pub preferences: Option<Vec<String>>,
}

/// Partial update for provider profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderProfileUpdate {
    pub business_name: Option<String>,
    pub contact_information: Option<ContactInformation>,
    pub services_offered: Option<Vec<String>>,
    pub certifications: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_consumer_profile_has_no_history() {
        let profile = ConsumerProfile::empty(Uuid::new_v4(), Utc::now());
        assert!(profile.preferences.is_empty());
        assert!(profile.wishlist.is_empty());
        assert!(profile.booking_history.is_empty());
        assert!(profile.profile_photo.is_none());
    }

    #[test]
    fn defaulted_provider_profile_uses_account_name() {
        let profile = ProviderProfile::defaulted(Uuid::new_v4(), "Ada Lovelace", Utc::now());
        assert_eq!(profile.business_name, "Ada Lovelace");
        assert!(profile.services_offered.is_empty());
    }

    #[test]
    fn consumer_update_rejects_unknown_fields() {
        let err = serde_json::from_str::<ConsumerProfileUpdate>(r#"{"wishlist": []}"#);
        assert!(err.is_err());
    }
}
