//! Profile synchronization service
//!
//! Profiles are denormalized from the identity record and there is no
//! transactional join across the two tables. This routine is the sole
//! mechanism keeping "a profile exists for the current role" true: it
//! creates a missing profile with defaults and never touches an existing
//! one.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::AccountStore;
use shared::models::{ConsumerProfile, IdentityRecord, ProviderProfile};

/// Outcome of a synchronization pass
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The role-matching profile already existed; nothing was written
    AlreadyPresent,
    CreatedConsumerProfile,
    CreatedProviderProfile,
}

/// Keeps the role-specific profile in step with the identity record
#[derive(Clone)]
pub struct SyncService {
    accounts: Arc<dyn AccountStore>,
}

impl SyncService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Ensure a profile exists for the account's current role.
    ///
    /// Fails with NotFound if the identity record is absent; profile write
    /// failures propagate to the caller.
    pub async fn ensure_profile(&self, account_id: Uuid) -> AppResult<SyncOutcome> {
        let identity = self
            .accounts
            .get_identity(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account".to_string()))?;

        self.ensure_profile_for(&identity).await
    }

    /// Same as [`ensure_profile`](Self::ensure_profile) for an already-loaded
    /// identity record.
    pub async fn ensure_profile_for(&self, identity: &IdentityRecord) -> AppResult<SyncOutcome> {
        let now = Utc::now();

        let outcome = if identity.role.is_provider() {
            let profile = ProviderProfile::defaulted(identity.id, &identity.name, now);
            if self.accounts.create_provider_profile_if_absent(&profile).await? {
                SyncOutcome::CreatedProviderProfile
            } else {
                SyncOutcome::AlreadyPresent
            }
        } else {
            let profile = ConsumerProfile::empty(identity.id, now);
            if self.accounts.create_consumer_profile_if_absent(&profile).await? {
                SyncOutcome::CreatedConsumerProfile
            } else {
                SyncOutcome::AlreadyPresent
            }
        };

        if outcome != SyncOutcome::AlreadyPresent {
            tracing::info!(
                account_id = %identity.id,
                role = %identity.role,
                "created default profile during synchronization"
            );
        }

        Ok(outcome)
    }
}
