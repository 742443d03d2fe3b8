//! Account service for identity records and role-specific profiles

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::sync::SyncService;
use crate::store::AccountStore;
use shared::models::{
    AccountRole, ConsumerProfile, ConsumerProfileUpdate, IdentityRecord, IdentityUpdate,
    ProviderProfile, ProviderProfileUpdate,
};
use shared::validation::{dedupe_wishlist, validate_phone, validate_preference_tag};

/// Account service for identity and profile access
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    sync: SyncService,
}

/// Input for creating a new marketplace account
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub role: AccountRole,
}

/// Combined view of an account: the identity record plus whichever
/// role-specific profiles the account has ever held
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfile {
    pub core: IdentityRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tourist_profile: Option<ConsumerProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider_profile: Option<ProviderProfile>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        let sync = SyncService::new(accounts.clone());
        Self { accounts, sync }
    }

    /// Create an identity record and provision its initial profile
    pub async fn create_account(&self, input: CreateAccountInput) -> AppResult<IdentityRecord> {
        if let Some(phone) = &input.phone {
            validate_phone(phone).map_err(|msg| AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
            })?;
        }

        let now = Utc::now();
        let record = IdentityRecord {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            role: input.role,
            email_verified: false,
            points: 0,
            created_at: now,
            updated_at: now,
        };

        self.accounts.create_identity(&record).await?;
        self.sync.ensure_profile_for(&record).await?;

        Ok(record)
    }

    /// Read the harmonized view: identity record plus existing profiles.
    ///
    /// Runs a synchronization pass first, so the profile matching the current
    /// role is guaranteed to exist in the response.
    pub async fn get_complete_profile(&self, account_id: Uuid) -> AppResult<CompleteProfile> {
        self.sync.ensure_profile(account_id).await?;

        let core = self
            .accounts
            .get_identity(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account".to_string()))?;
        let tourist_profile = self.accounts.get_consumer_profile(account_id).await?;
        let service_provider_profile = self.accounts.get_provider_profile(account_id).await?;

        Ok(CompleteProfile {
            core,
            tourist_profile,
            service_provider_profile,
        })
    }

    /// Apply a partial update to the owner-mutable identity fields
    pub async fn update_identity(
        &self,
        account_id: Uuid,
        update: IdentityUpdate,
    ) -> AppResult<IdentityRecord> {
        if let Some(phone) = &update.phone {
            validate_phone(phone).map_err(|msg| AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
            })?;
        }
        if let Some(name) = &update.name {
            if name.is_empty() || name.len() > 100 {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Name must be 1-100 characters".to_string(),
                });
            }
        }
        if let Some(email) = &update.email {
            if !validator::validate_email(email) {
                return Err(AppError::Validation {
                    field: "email".to_string(),
                    message: "Invalid email format".to_string(),
                });
            }
        }

        self.accounts
            .update_identity(account_id, &update, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Account".to_string()))
    }

    /// Grant loyalty points; returns the new balance
    pub async fn grant_points(&self, account_id: Uuid, points: i64) -> AppResult<i64> {
        if points <= 0 {
            return Err(AppError::Validation {
                field: "points".to_string(),
                message: "Point grants must be positive".to_string(),
            });
        }

        self.accounts
            .add_points(account_id, points, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Account".to_string()))
    }

    pub async fn update_consumer_profile(
        &self,
        account_id: Uuid,
        update: ConsumerProfileUpdate,
    ) -> AppResult<ConsumerProfile> {
        if let Some(preferences) = &update.preferences {
            for tag in preferences {
                validate_preference_tag(tag).map_err(|msg| AppError::Validation {
                    field: "preferences".to_string(),
                    message: msg.to_string(),
                })?;
            }
        }

        self.accounts
            .update_consumer_profile(account_id, &update, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Consumer profile".to_string()))
    }

    pub async fn update_provider_profile(
        &self,
        account_id: Uuid,
        update: ProviderProfileUpdate,
    ) -> AppResult<ProviderProfile> {
        if let Some(name) = &update.business_name {
            if name.is_empty() || name.len() > 200 {
                return Err(AppError::Validation {
                    field: "business_name".to_string(),
                    message: "Business name must be 1-200 characters".to_string(),
                });
            }
        }

        self.accounts
            .update_provider_profile(account_id, &update, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Provider profile".to_string()))
    }

    /// Append a listing to the wishlist, suppressing duplicates
    pub async fn add_to_wishlist(
        &self,
        account_id: Uuid,
        listing_id: Uuid,
    ) -> AppResult<ConsumerProfile> {
        let profile = self
            .accounts
            .get_consumer_profile(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Consumer profile".to_string()))?;

        let mut wishlist = profile.wishlist;
        wishlist.push(listing_id);
        dedupe_wishlist(&mut wishlist);

        self.accounts
            .set_wishlist(account_id, &wishlist, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Consumer profile".to_string()))
    }

    /// Remove a listing from the wishlist; removing an absent id is a no-op
    pub async fn remove_from_wishlist(
        &self,
        account_id: Uuid,
        listing_id: Uuid,
    ) -> AppResult<ConsumerProfile> {
        let profile = self
            .accounts
            .get_consumer_profile(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Consumer profile".to_string()))?;

        let wishlist: Vec<Uuid> = profile
            .wishlist
            .into_iter()
            .filter(|id| *id != listing_id)
            .collect();

        self.accounts
            .set_wishlist(account_id, &wishlist, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Consumer profile".to_string()))
    }
}
