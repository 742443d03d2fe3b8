//! Storage abstractions for identity records, profiles, and admin governance
//!
//! Services depend on these traits rather than a concrete database so the
//! integration tests can run against the in-memory store.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use shared::models::{
    AccountRole, AdminAccount, AdminInvitation, AdminStatus, ConsumerProfile,
    ConsumerProfileUpdate, IdentityRecord, IdentityUpdate, ProviderProfile, ProviderProfileUpdate,
};

/// Storage for identity records and their role-specific profiles
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new identity record
    async fn create_identity(&self, record: &IdentityRecord) -> AppResult<()>;

    /// Fetch an identity record by id
    async fn get_identity(&self, id: Uuid) -> AppResult<Option<IdentityRecord>>;

    /// Apply a partial update to the owner-mutable identity fields.
    /// Returns the updated record, or None if the id is unknown.
    async fn update_identity(
        &self,
        id: Uuid,
        update: &IdentityUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<IdentityRecord>>;

    /// Overwrite the role on an identity record, bumping `updated_at`.
    /// Returns false if the id is unknown.
    async fn set_role(&self, id: Uuid, role: AccountRole, now: DateTime<Utc>) -> AppResult<bool>;

    /// Add loyalty points; returns the new balance, or None if unknown
    async fn add_points(&self, id: Uuid, delta: i64, now: DateTime<Utc>) -> AppResult<Option<i64>>;

    async fn get_consumer_profile(&self, account_id: Uuid) -> AppResult<Option<ConsumerProfile>>;

    async fn get_provider_profile(&self, account_id: Uuid) -> AppResult<Option<ProviderProfile>>;

    /// Insert a consumer profile unless one already exists.
    /// Returns true if a row was created. Never overwrites existing data.
    async fn create_consumer_profile_if_absent(&self, profile: &ConsumerProfile)
        -> AppResult<bool>;

    /// Insert a provider profile unless one already exists.
    async fn create_provider_profile_if_absent(&self, profile: &ProviderProfile)
        -> AppResult<bool>;

    async fn update_consumer_profile(
        &self,
        account_id: Uuid,
        update: &ConsumerProfileUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ConsumerProfile>>;

    async fn update_provider_profile(
        &self,
        account_id: Uuid,
        update: &ProviderProfileUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ProviderProfile>>;

    /// Replace the wishlist wholesale (callers dedupe before writing)
    async fn set_wishlist(
        &self,
        account_id: Uuid,
        wishlist: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<Option<ConsumerProfile>>;
}

/// Storage for admin accounts and single-use invitations
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn create_invitation(&self, invitation: &AdminInvitation) -> AppResult<()>;

    /// Atomically consume an unused, unexpired invitation matching the token
    /// digest, recording who redeemed it. Returns None when the token is
    /// unknown, already used, or expired; under concurrent redemption at most
    /// one caller gets Some.
    async fn consume_invitation(
        &self,
        token_digest: &str,
        used_by: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<AdminInvitation>>;

    async fn create_admin(&self, admin: &AdminAccount, password_hash: &str) -> AppResult<()>;

    async fn get_admin(&self, id: Uuid) -> AppResult<Option<AdminAccount>>;

    /// Fetch an admin account and its password hash by email
    async fn get_admin_by_email(&self, email: &str)
        -> AppResult<Option<(AdminAccount, String)>>;

    /// Record an approval decision, guarded on the account still being
    /// pending. Returns false when no pending row matched (absent or already
    /// decided); under concurrent decisions at most one caller gets true.
    /// The approver and timestamp are recorded only when `to` is active; a
    /// rejection leaves both unset.
    async fn decide_admin(
        &self,
        id: Uuid,
        to: AdminStatus,
        approved_by: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Move an admin account between states, guarded on the current state.
    /// Returns false when the account was not in `from`.
    async fn set_admin_status(
        &self,
        id: Uuid,
        from: AdminStatus,
        to: AdminStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Flip the MFA flag on; returns false if the id is unknown
    async fn set_mfa_enabled(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Page through admin accounts in a given state, newest first
    async fn list_admins_by_status(
        &self,
        status: AdminStatus,
        page: u32,
        per_page: u32,
    ) -> AppResult<(Vec<AdminAccount>, u64)>;
}
