//! Role transition handler
//!
//! Changes an identity record's role and provisions the new role's profile
//! without deleting the old one, so a reverted account finds its data
//! intact. The new role is pushed to the auth provider's custom claims as a
//! best-effort final step.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::AuthClaimsClient;
use crate::services::sync::SyncService;
use crate::store::AccountStore;
use shared::models::AccountRole;

/// Result of a role transition request
#[derive(Debug, Serialize)]
pub struct RoleTransition {
    pub account_id: Uuid,
    pub role: AccountRole,
    /// False when the target role was already current (no-op)
    pub changed: bool,
}

/// Handles role transitions across the denormalized collections
#[derive(Clone)]
pub struct RoleService {
    accounts: Arc<dyn AccountStore>,
    sync: SyncService,
    claims: AuthClaimsClient,
}

impl RoleService {
    pub fn new(accounts: Arc<dyn AccountStore>, claims: AuthClaimsClient) -> Self {
        let sync = SyncService::new(accounts.clone());
        Self {
            accounts,
            sync,
            claims,
        }
    }

    /// Transition an account to a target role.
    ///
    /// Requesting the current role is a success no-op that does not touch
    /// `updated_at`. Otherwise the identity record is updated, the profile
    /// for the new role is provisioned through the synchronization routine,
    /// and the role claim is propagated upstream.
    ///
    /// Claim propagation failure leaves the identity record and the auth
    /// provider out of sync; there is no rollback. The failure is logged and
    /// convergence relies on the claim push being retried on the next
    /// transition.
    pub async fn change_role(
        &self,
        account_id: Uuid,
        target: AccountRole,
    ) -> AppResult<RoleTransition> {
        let identity = self
            .accounts
            .get_identity(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account".to_string()))?;

        if identity.role == target {
            return Ok(RoleTransition {
                account_id,
                role: target,
                changed: false,
            });
        }

        if !self.accounts.set_role(account_id, target, Utc::now()).await? {
            return Err(AppError::NotFound("Account".to_string()));
        }

        tracing::info!(
            account_id = %account_id,
            from = %identity.role,
            to = %target,
            "role transition applied"
        );

        // Consistency pass: creates the new role's profile if missing and
        // leaves every existing profile untouched
        self.sync.ensure_profile(account_id).await?;

        if let Err(e) = self.claims.set_role_claim(account_id, target).await {
            tracing::warn!(
                account_id = %account_id,
                role = %target,
                error = %e,
                "role claim propagation failed; identity record and auth claims are out of sync"
            );
        }

        Ok(RoleTransition {
            account_id,
            role: target,
            changed: true,
        })
    }
}
