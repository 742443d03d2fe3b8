//! PostgreSQL-backed store
//!
//! Single-statement conditional updates guard the two races in the admin
//! lifecycle: invitation consumption and the approval decision.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{AccountStore, AdminStore};
use shared::models::{
    AccountRole, AdminAccount, AdminInvitation, AdminPermission, AdminRole, AdminStatus,
    ConsumerProfile, ConsumerProfileUpdate, ContactInformation, IdentityRecord, IdentityUpdate,
    ProviderProfile, ProviderProfileUpdate,
};

/// Store implementation over a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
    email_verified: bool,
    points: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IdentityRow {
    fn into_record(self) -> AppResult<IdentityRecord> {
        let role = AccountRole::parse(&self.role)
            .ok_or_else(|| AppError::Internal(format!("Unknown role in database: {}", self.role)))?;
        Ok(IdentityRecord {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            role,
            email_verified: self.email_verified,
            points: self.points,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ConsumerProfileRow {
    account_id: Uuid,
    profile_photo: Option<String>,
    preferences: Vec<String>,
    wishlist: Vec<Uuid>,
    booking_history: Vec<Uuid>,
    last_updated: DateTime<Utc>,
}

impl From<ConsumerProfileRow> for ConsumerProfile {
    fn from(row: ConsumerProfileRow) -> Self {
        ConsumerProfile {
            account_id: row.account_id,
            profile_photo: row.profile_photo,
            preferences: row.preferences,
            wishlist: row.wishlist,
            booking_history: row.booking_history,
            last_updated: row.last_updated,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProviderProfileRow {
    account_id: Uuid,
    business_name: String,
    address: String,
    city: Option<String>,
    country: Option<String>,
    website: Option<String>,
    services_offered: Vec<String>,
    certifications: Vec<String>,
    last_updated: DateTime<Utc>,
}

impl From<ProviderProfileRow> for ProviderProfile {
    fn from(row: ProviderProfileRow) -> Self {
        ProviderProfile {
            account_id: row.account_id,
            business_name: row.business_name,
            contact_information: ContactInformation {
                address: row.address,
                city: row.city,
                country: row.country,
                website: row.website,
            },
            services_offered: row.services_offered,
            certifications: row.certifications,
            last_updated: row.last_updated,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: Uuid,
    name: String,
    email: String,
    status: String,
    permissions: Vec<String>,
    mfa_enabled: bool,
    invitation_id: Uuid,
    approved_by: Option<Uuid>,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AdminRow {
    fn into_account(self) -> AppResult<AdminAccount> {
        let status = AdminStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown admin status in database: {}", self.status))
        })?;
        let permissions = self
            .permissions
            .iter()
            .map(|p| {
                AdminPermission::parse(p).ok_or_else(|| {
                    AppError::Internal(format!("Unknown permission in database: {}", p))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(AdminAccount {
            id: self.id,
            name: self.name,
            email: self.email,
            status,
            permissions,
            mfa_enabled: self.mfa_enabled,
            invitation_id: self.invitation_id,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InvitationRow {
    id: Uuid,
    token_digest: String,
    email: String,
    role: String,
    expires_at: DateTime<Utc>,
    used: bool,
    used_by: Option<Uuid>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl InvitationRow {
    fn into_invitation(self) -> AppResult<AdminInvitation> {
        let role = AdminRole::parse(&self.role).ok_or_else(|| {
            AppError::Internal(format!("Unknown admin role in database: {}", self.role))
        })?;
        Ok(AdminInvitation {
            id: self.id,
            token_digest: self.token_digest,
            email: self.email,
            role,
            expires_at: self.expires_at,
            used: self.used,
            used_by: self.used_by,
            used_at: self.used_at,
            created_at: self.created_at,
        })
    }
}

const IDENTITY_COLUMNS: &str =
    "id, name, email, phone, role, email_verified, points, created_at, updated_at";
const CONSUMER_COLUMNS: &str =
    "account_id, profile_photo, preferences, wishlist, booking_history, last_updated";
const PROVIDER_COLUMNS: &str = "account_id, business_name, address, city, country, website, \
     services_offered, certifications, last_updated";
const ADMIN_COLUMNS: &str = "id, name, email, status, permissions, mfa_enabled, invitation_id, \
     approved_by, approved_at, created_at, updated_at";
const INVITATION_COLUMNS: &str =
    "id, token_digest, email, role, expires_at, used, used_by, used_at, created_at";

#[async_trait]
impl AccountStore for PgStore {
    async fn create_identity(&self, record: &IdentityRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO identity_records
                (id, name, email, phone, role, email_verified, points, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(record.role.as_str())
        .bind(record.email_verified)
        .bind(record.points)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn get_identity(&self, id: Uuid) -> AppResult<Option<IdentityRecord>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {} FROM identity_records WHERE id = $1",
            IDENTITY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(IdentityRow::into_record).transpose()
    }

    async fn update_identity(
        &self,
        id: Uuid,
        update: &IdentityUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<IdentityRecord>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            UPDATE identity_records
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                updated_at = GREATEST(updated_at, $5)
            WHERE id = $1
            RETURNING {}
            "#,
            IDENTITY_COLUMNS
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;

        row.map(IdentityRow::into_record).transpose()
    }

    async fn set_role(&self, id: Uuid, role: AccountRole, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE identity_records
            SET role = $2, updated_at = GREATEST(updated_at, $3)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_points(&self, id: Uuid, delta: i64, now: DateTime<Utc>) -> AppResult<Option<i64>> {
        let balance = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE identity_records
            SET points = points + $2, updated_at = GREATEST(updated_at, $3)
            WHERE id = $1
            RETURNING points
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;

        Ok(balance)
    }

    async fn get_consumer_profile(&self, account_id: Uuid) -> AppResult<Option<ConsumerProfile>> {
        let row = sqlx::query_as::<_, ConsumerProfileRow>(&format!(
            "SELECT {} FROM consumer_profiles WHERE account_id = $1",
            CONSUMER_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(ConsumerProfile::from))
    }

    async fn get_provider_profile(&self, account_id: Uuid) -> AppResult<Option<ProviderProfile>> {
        let row = sqlx::query_as::<_, ProviderProfileRow>(&format!(
            "SELECT {} FROM provider_profiles WHERE account_id = $1",
            PROVIDER_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(ProviderProfile::from))
    }

    async fn create_consumer_profile_if_absent(
        &self,
        profile: &ConsumerProfile,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO consumer_profiles
                (account_id, profile_photo, preferences, wishlist, booking_history, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (account_id) DO NOTHING
            "#,
        )
        .bind(profile.account_id)
        .bind(&profile.profile_photo)
        .bind(&profile.preferences)
        .bind(&profile.wishlist)
        .bind(&profile.booking_history)
        .bind(profile.last_updated)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_provider_profile_if_absent(
        &self,
        profile: &ProviderProfile,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO provider_profiles
                (account_id, business_name, address, city, country, website,
                 services_offered, certifications, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (account_id) DO NOTHING
            "#,
        )
        .bind(profile.account_id)
        .bind(&profile.business_name)
        .bind(&profile.contact_information.address)
        .bind(&profile.contact_information.city)
        .bind(&profile.contact_information.country)
        .bind(&profile.contact_information.website)
        .bind(&profile.services_offered)
        .bind(&profile.certifications)
        .bind(profile.last_updated)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_consumer_profile(
        &self,
        account_id: Uuid,
        update: &ConsumerProfileUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ConsumerProfile>> {
        let row = sqlx::query_as::<_, ConsumerProfileRow>(&format!(
            r#"
            UPDATE consumer_profiles
            SET profile_photo = COALESCE($2, profile_photo),
                preferences = COALESCE($3, preferences),
                last_updated = $4
            WHERE account_id = $1
            RETURNING {}
            "#,
            CONSUMER_COLUMNS
        ))
        .bind(account_id)
        .bind(&update.profile_photo)
        .bind(&update.preferences)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(ConsumerProfile::from))
    }

    async fn update_provider_profile(
        &self,
        account_id: Uuid,
        update: &ProviderProfileUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ProviderProfile>> {
        let contact = update.contact_information.as_ref();
        let row = sqlx::query_as::<_, ProviderProfileRow>(&format!(
            r#"
            UPDATE provider_profiles
            SET business_name = COALESCE($2, business_name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                country = COALESCE($5, country),
                website = COALESCE($6, website),
                services_offered = COALESCE($7, services_offered),
                certifications = COALESCE($8, certifications),
                last_updated = $9
            WHERE account_id = $1
            RETURNING {}
            "#,
            PROVIDER_COLUMNS
        ))
        .bind(account_id)
        .bind(&update.business_name)
        .bind(contact.map(|c| c.address.clone()))
        .bind(contact.and_then(|c| c.city.clone()))
        .bind(contact.and_then(|c| c.country.clone()))
        .bind(contact.and_then(|c| c.website.clone()))
        .bind(&update.services_offered)
        .bind(&update.certifications)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(ProviderProfile::from))
    }

    async fn set_wishlist(
        &self,
        account_id: Uuid,
        wishlist: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<Option<ConsumerProfile>> {
        let row = sqlx::query_as::<_, ConsumerProfileRow>(&format!(
            r#"
            UPDATE consumer_profiles
            SET wishlist = $2, last_updated = $3
            WHERE account_id = $1
            RETURNING {}
            "#,
            CONSUMER_COLUMNS
        ))
        .bind(account_id)
        .bind(wishlist)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(ConsumerProfile::from))
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn create_invitation(&self, invitation: &AdminInvitation) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_invitations
                (id, token_digest, email, role, expires_at, used, used_by, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(invitation.id)
        .bind(&invitation.token_digest)
        .bind(&invitation.email)
        .bind(invitation.role.as_str())
        .bind(invitation.expires_at)
        .bind(invitation.used)
        .bind(invitation.used_by)
        .bind(invitation.used_at)
        .bind(invitation.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn consume_invitation(
        &self,
        token_digest: &str,
        used_by: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<AdminInvitation>> {
        // The WHERE guard ensures at most one concurrent redemption wins
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            UPDATE admin_invitations
            SET used = true, used_by = $2, used_at = $3
            WHERE token_digest = $1 AND used = false AND expires_at > $3
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        ))
        .bind(token_digest)
        .bind(used_by)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;

        row.map(InvitationRow::into_invitation).transpose()
    }

    async fn create_admin(&self, admin: &AdminAccount, password_hash: &str) -> AppResult<()> {
        let permissions: Vec<String> = admin
            .permissions
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO admin_accounts
                (id, name, email, password_hash, status, permissions, mfa_enabled,
                 invitation_id, approved_by, approved_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(admin.id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(password_hash)
        .bind(admin.status.as_str())
        .bind(&permissions)
        .bind(admin.mfa_enabled)
        .bind(admin.invitation_id)
        .bind(admin.approved_by)
        .bind(admin.approved_at)
        .bind(admin.created_at)
        .bind(admin.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn get_admin(&self, id: Uuid) -> AppResult<Option<AdminAccount>> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {} FROM admin_accounts WHERE id = $1",
            ADMIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(AdminRow::into_account).transpose()
    }

    async fn get_admin_by_email(
        &self,
        email: &str,
    ) -> AppResult<Option<(AdminAccount, String)>> {
        #[derive(sqlx::FromRow)]
        struct AdminWithHash {
            #[sqlx(flatten)]
            admin: AdminRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, AdminWithHash>(&format!(
            "SELECT {}, password_hash FROM admin_accounts WHERE email = $1",
            ADMIN_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        row.map(|r| Ok((r.admin.into_account()?, r.password_hash)))
            .transpose()
    }

    async fn decide_admin(
        &self,
        id: Uuid,
        to: AdminStatus,
        approved_by: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        // Guarded on the account still being pending so concurrent approvals
        // cannot both apply. The approver and timestamp are recorded only on
        // activation; a rejection leaves both NULL.
        let result = sqlx::query(
            r#"
            UPDATE admin_accounts
            SET status = $2,
                approved_by = CASE WHEN $2 = 'active' THEN $3 ELSE approved_by END,
                approved_at = CASE WHEN $2 = 'active' THEN $4 ELSE approved_at END,
                updated_at = $4
            WHERE id = $1 AND status = 'pending_approval'
            "#,
        )
        .bind(id)
        .bind(to.as_str())
        .bind(approved_by)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_admin_status(
        &self,
        id: Uuid,
        from: AdminStatus,
        to: AdminStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE admin_accounts
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_mfa_enabled(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE admin_accounts SET mfa_enabled = true, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_admins_by_status(
        &self,
        status: AdminStatus,
        page: u32,
        per_page: u32,
    ) -> AppResult<(Vec<AdminAccount>, u64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM admin_accounts WHERE status = $1",
        )
        .bind(status.as_str())
        .fetch_one(&self.db)
        .await?;

        let offset = (page.saturating_sub(1) as i64) * per_page as i64;
        let rows = sqlx::query_as::<_, AdminRow>(&format!(
            r#"
            SELECT {}
            FROM admin_accounts
            WHERE status = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            ADMIN_COLUMNS
        ))
        .bind(status.as_str())
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let admins = rows
            .into_iter()
            .map(AdminRow::into_account)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((admins, total as u64))
    }
}
