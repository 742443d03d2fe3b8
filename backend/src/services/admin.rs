//! Admin account lifecycle service
//!
//! Implements the approval state machine: invitation redemption creates a
//! `pending_approval` account, a holder of `approve_admins` moves it to
//! `active` or `rejected`, and every privileged action re-checks that the
//! caller is `active` before proceeding.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::AdminStore;
use shared::models::{
    default_permissions, AdminAccount, AdminInvitation, AdminPermission, AdminRole, AdminStatus,
    ApprovalDecision,
};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_invitation_expiry;

/// Admin lifecycle service
#[derive(Clone)]
pub struct AdminService {
    admins: Arc<dyn AdminStore>,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for issuing a new invitation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationInput {
    #[validate(email)]
    pub email: String,
    pub role: AdminRole,
    /// Days until expiry; defaults to 7, capped at 30
    pub expires_in_days: Option<i64>,
}

/// An issued invitation with its raw token, shown exactly once
#[derive(Debug, Serialize)]
pub struct InvitationIssued {
    pub invitation: AdminInvitation,
    pub token: String,
}

/// Registrant fields for invitation redemption
#[derive(Debug, Deserialize, Validate)]
pub struct RedeemInvitationInput {
    pub token: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Input for deciding a pending admin account
#[derive(Debug, Deserialize)]
pub struct ApprovalInput {
    pub decision: ApprovalDecision,
}

/// JWT claims for admin sessions
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub permissions: Vec<AdminPermission>,
    pub exp: i64,
    pub iat: i64,
}

/// Admin session tokens
#[derive(Debug, Serialize)]
pub struct AdminTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// Current approval status, so clients can route to the right screen
    pub status: AdminStatus,
    pub requires_mfa_setup: bool,
}

impl AdminService {
    pub fn new(admins: Arc<dyn AdminStore>, config: &Config) -> Self {
        Self {
            admins,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Issue a single-use invitation. Requires an active caller holding
    /// `approve_admins`.
    pub async fn issue_invitation(
        &self,
        issuer_id: Uuid,
        input: CreateInvitationInput,
    ) -> AppResult<InvitationIssued> {
        let issuer = self.check_access(issuer_id).await?;
        if !issuer.has_permission(AdminPermission::ApproveAdmins) {
            return Err(AppError::InsufficientPermissions);
        }

        let now = Utc::now();
        let expires_at = now + Duration::days(input.expires_in_days.unwrap_or(7));
        validate_invitation_expiry(expires_at, now).map_err(|msg| AppError::Validation {
            field: "expires_in_days".to_string(),
            message: msg.to_string(),
        })?;

        let (token, token_digest) = Self::generate_token();
        let invitation = AdminInvitation {
            id: Uuid::new_v4(),
            token_digest,
            email: input.email,
            role: input.role,
            expires_at,
            used: false,
            used_by: None,
            used_at: None,
            created_at: now,
        };

        self.admins.create_invitation(&invitation).await?;

        tracing::info!(
            invitation_id = %invitation.id,
            issued_by = %issuer.id,
            "admin invitation issued"
        );

        Ok(InvitationIssued { invitation, token })
    }

    /// Redeem an invitation, creating an admin account in `pending_approval`.
    ///
    /// Consumption is atomic in the store, so two concurrent redemptions of
    /// the same token produce at most one account. If the account insert
    /// fails after consumption the invitation stays burned; the failure is
    /// logged and propagated.
    pub async fn redeem_invitation(
        &self,
        input: RedeemInvitationInput,
    ) -> AppResult<AdminAccount> {
        let now = Utc::now();
        let account_id = Uuid::new_v4();
        let token_digest = Self::digest_token(&input.token);

        let invitation = self
            .admins
            .consume_invitation(&token_digest, account_id, now)
            .await?
            .ok_or(AppError::InvalidInvitation)?;

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let admin = AdminAccount {
            id: account_id,
            name: input.name,
            email: invitation.email.clone(),
            status: AdminStatus::PendingApproval,
            permissions: default_permissions(invitation.role),
            mfa_enabled: false,
            invitation_id: invitation.id,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.admins.create_admin(&admin, &password_hash).await {
            tracing::error!(
                invitation_id = %invitation.id,
                error = %e,
                "admin account creation failed after invitation was consumed"
            );
            return Err(e);
        }

        tracing::info!(admin_id = %admin.id, "admin account created, pending approval");

        Ok(admin)
    }

    /// Approve or reject a pending admin account.
    ///
    /// The decision is guarded on the account still being pending, so a
    /// second concurrent decision fails with Conflict rather than silently
    /// re-applying.
    pub async fn process_approval(
        &self,
        approver_id: Uuid,
        target_id: Uuid,
        decision: ApprovalDecision,
    ) -> AppResult<AdminAccount> {
        let approver = self.check_access(approver_id).await?;
        if !approver.has_permission(AdminPermission::ApproveAdmins) {
            return Err(AppError::InsufficientPermissions);
        }

        let applied = self
            .admins
            .decide_admin(target_id, decision.target_status(), approver_id, Utc::now())
            .await?;

        if !applied {
            // Distinguish an absent account from one already decided
            let target = self
                .admins
                .get_admin(target_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Admin account".to_string()))?;
            return Err(AppError::Conflict {
                resource: "admin_account".to_string(),
                message: format!("Account already decided: status is {}", target.status),
            });
        }

        let updated = self
            .admins
            .get_admin(target_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin account".to_string()))?;

        tracing::info!(
            admin_id = %target_id,
            approver_id = %approver_id,
            status = %updated.status,
            "admin approval decision recorded"
        );

        Ok(updated)
    }

    /// Gate for privileged actions: returns the account when active, or
    /// Forbidden carrying the current status otherwise.
    pub async fn check_access(&self, admin_id: Uuid) -> AppResult<AdminAccount> {
        let admin = self
            .admins
            .get_admin(admin_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin account".to_string()))?;

        if admin.status != AdminStatus::Active {
            return Err(AppError::AdminInactive {
                status: admin.status,
            });
        }

        Ok(admin)
    }

    /// Suspend an active admin account. Requires `manage_security`.
    pub async fn suspend(&self, actor_id: Uuid, target_id: Uuid) -> AppResult<()> {
        let actor = self.check_access(actor_id).await?;
        if !actor.has_permission(AdminPermission::ManageSecurity) {
            return Err(AppError::InsufficientPermissions);
        }

        let moved = self
            .admins
            .set_admin_status(
                target_id,
                AdminStatus::Active,
                AdminStatus::Suspended,
                Utc::now(),
            )
            .await?;

        if !moved {
            let target = self
                .admins
                .get_admin(target_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Admin account".to_string()))?;
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot suspend an account in status {}",
                target.status
            )));
        }

        tracing::warn!(admin_id = %target_id, actor_id = %actor_id, "admin account suspended");
        Ok(())
    }

    /// Reinstate a suspended admin account. Requires `manage_security`.
    pub async fn reinstate(&self, actor_id: Uuid, target_id: Uuid) -> AppResult<()> {
        let actor = self.check_access(actor_id).await?;
        if !actor.has_permission(AdminPermission::ManageSecurity) {
            return Err(AppError::InsufficientPermissions);
        }

        let moved = self
            .admins
            .set_admin_status(
                target_id,
                AdminStatus::Suspended,
                AdminStatus::Active,
                Utc::now(),
            )
            .await?;

        if !moved {
            let target = self
                .admins
                .get_admin(target_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Admin account".to_string()))?;
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot reinstate an account in status {}",
                target.status
            )));
        }

        Ok(())
    }

    /// Record MFA setup completion. Independent of approval state.
    pub async fn complete_mfa_setup(&self, admin_id: Uuid) -> AppResult<()> {
        if !self.admins.set_mfa_enabled(admin_id, Utc::now()).await? {
            return Err(AppError::NotFound("Admin account".to_string()));
        }
        Ok(())
    }

    /// List pending admin accounts. Requires `approve_admins`.
    pub async fn list_pending(
        &self,
        actor_id: Uuid,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<AdminAccount>> {
        let actor = self.check_access(actor_id).await?;
        if !actor.has_permission(AdminPermission::ApproveAdmins) {
            return Err(AppError::InsufficientPermissions);
        }

        let (admins, total) = self
            .admins
            .list_admins_by_status(
                AdminStatus::PendingApproval,
                pagination.page,
                pagination.per_page,
            )
            .await?;

        Ok(PaginatedResponse {
            data: admins,
            pagination: PaginationMeta::new(pagination.page, pagination.per_page, total),
        })
    }

    /// Authenticate an admin with email and password.
    ///
    /// Login succeeds in any status so the client can render the matching
    /// screen; every privileged endpoint still re-checks the status.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AdminTokens> {
        let (admin, password_hash) = self
            .admins
            .get_admin_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let now = Utc::now();
        let claims = AdminClaims {
            sub: admin.id.to_string(),
            permissions: admin.permissions.clone(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AdminTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            status: admin.status,
            requires_mfa_setup: !admin.mfa_enabled,
        })
    }

    /// Validate an admin access token and return its claims
    pub fn validate_token(&self, token: &str) -> AppResult<AdminClaims> {
        let token_data = decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Generate a raw invitation token and its storage digest
    fn generate_token() -> (String, String) {
        let raw = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        let digest = Self::digest_token(&raw);
        (raw, digest)
    }

    /// SHA-256 digest of a token, URL-safe base64 encoded
    fn digest_token(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_digest_is_stable_and_token_length_fixed() {
        let (token, digest) = AdminService::generate_token();
        assert_eq!(token.len(), 64);
        assert_eq!(AdminService::digest_token(&token), digest);
    }

    #[test]
    fn distinct_tokens_have_distinct_digests() {
        let (_, d1) = AdminService::generate_token();
        let (_, d2) = AdminService::generate_token();
        assert_ne!(d1, d2);
    }
}
