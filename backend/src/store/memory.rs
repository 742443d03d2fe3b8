//! In-memory store used by the integration tests
//!
//! Each operation takes the single lock once, so check-and-set sequences are
//! atomic and the conditional-update semantics match the Postgres store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::store::{AccountStore, AdminStore};
use shared::models::{
    AccountRole, AdminAccount, AdminInvitation, AdminStatus, ConsumerProfile,
    ConsumerProfileUpdate, IdentityRecord, IdentityUpdate, ProviderProfile, ProviderProfileUpdate,
};

#[derive(Default)]
struct Inner {
    identities: HashMap<Uuid, IdentityRecord>,
    consumer_profiles: HashMap<Uuid, ConsumerProfile>,
    provider_profiles: HashMap<Uuid, ProviderProfile>,
    admins: HashMap<Uuid, (AdminAccount, String)>,
    /// Keyed by token digest
    invitations: HashMap<String, AdminInvitation>,
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_identity(&self, record: &IdentityRecord) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.identities.insert(record.id, record.clone());
        Ok(())
    }

    async fn get_identity(&self, id: Uuid) -> AppResult<Option<IdentityRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.identities.get(&id).cloned())
    }

    async fn update_identity(
        &self,
        id: Uuid,
        update: &IdentityUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<IdentityRecord>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(record) = inner.identities.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            record.name = name.clone();
        }
        if let Some(email) = &update.email {
            record.email = email.clone();
        }
        if let Some(phone) = &update.phone {
            record.phone = Some(phone.clone());
        }
        record.updated_at = record.updated_at.max(now);
        Ok(Some(record.clone()))
    }

    async fn set_role(&self, id: Uuid, role: AccountRole, now: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some(record) = inner.identities.get_mut(&id) else {
            return Ok(false);
        };
        record.role = role;
        record.updated_at = record.updated_at.max(now);
        Ok(true)
    }

    async fn add_points(&self, id: Uuid, delta: i64, now: DateTime<Utc>) -> AppResult<Option<i64>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(record) = inner.identities.get_mut(&id) else {
            return Ok(None);
        };
        record.points += delta;
        record.updated_at = record.updated_at.max(now);
        Ok(Some(record.points))
    }

    async fn get_consumer_profile(&self, account_id: Uuid) -> AppResult<Option<ConsumerProfile>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.consumer_profiles.get(&account_id).cloned())
    }

    async fn get_provider_profile(&self, account_id: Uuid) -> AppResult<Option<ProviderProfile>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.provider_profiles.get(&account_id).cloned())
    }

    async fn create_consumer_profile_if_absent(
        &self,
        profile: &ConsumerProfile,
    ) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.consumer_profiles.contains_key(&profile.account_id) {
            return Ok(false);
        }
        inner
            .consumer_profiles
            .insert(profile.account_id, profile.clone());
        Ok(true)
    }

    async fn create_provider_profile_if_absent(
        &self,
        profile: &ProviderProfile,
    ) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.provider_profiles.contains_key(&profile.account_id) {
            return Ok(false);
        }
        inner
            .provider_profiles
            .insert(profile.account_id, profile.clone());
        Ok(true)
    }

    async fn update_consumer_profile(
        &self,
        account_id: Uuid,
        update: &ConsumerProfileUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ConsumerProfile>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(profile) = inner.consumer_profiles.get_mut(&account_id) else {
            return Ok(None);
        };
        if let Some(photo) = &update.profile_photo {
            profile.profile_photo = Some(photo.clone());
        }
        if let Some(preferences) = &update.preferences {
            profile.preferences = preferences.clone();
        }
        profile.last_updated = now;
        Ok(Some(profile.clone()))
    }

    async fn update_provider_profile(
        &self,
        account_id: Uuid,
        update: &ProviderProfileUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ProviderProfile>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(profile) = inner.provider_profiles.get_mut(&account_id) else {
            return Ok(None);
        };
        if let Some(name) = &update.business_name {
            profile.business_name = name.clone();
        }
        if let Some(contact) = &update.contact_information {
            profile.contact_information = contact.clone();
        }
        if let Some(services) = &update.services_offered {
            profile.services_offered = services.clone();
        }
        if let Some(certs) = &update.certifications {
            profile.certifications = certs.clone();
        }
        profile.last_updated = now;
        Ok(Some(profile.clone()))
    }

    async fn set_wishlist(
        &self,
        account_id: Uuid,
        wishlist: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<Option<ConsumerProfile>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(profile) = inner.consumer_profiles.get_mut(&account_id) else {
            return Ok(None);
        };
        profile.wishlist = wishlist.to_vec();
        profile.last_updated = now;
        Ok(Some(profile.clone()))
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn create_invitation(&self, invitation: &AdminInvitation) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .invitations
            .insert(invitation.token_digest.clone(), invitation.clone());
        Ok(())
    }

    async fn consume_invitation(
        &self,
        token_digest: &str,
        used_by: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<AdminInvitation>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(invitation) = inner.invitations.get_mut(token_digest) else {
            return Ok(None);
        };
        if !invitation.is_redeemable(now) {
            return Ok(None);
        }
        invitation.used = true;
        invitation.used_by = Some(used_by);
        invitation.used_at = Some(now);
        Ok(Some(invitation.clone()))
    }

    async fn create_admin(&self, admin: &AdminAccount, password_hash: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .admins
            .insert(admin.id, (admin.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn get_admin(&self, id: Uuid) -> AppResult<Option<AdminAccount>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.admins.get(&id).map(|(admin, _)| admin.clone()))
    }

    async fn get_admin_by_email(
        &self,
        email: &str,
    ) -> AppResult<Option<(AdminAccount, String)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .admins
            .values()
            .find(|(admin, _)| admin.email == email)
            .cloned())
    }

    async fn decide_admin(
        &self,
        id: Uuid,
        to: AdminStatus,
        approved_by: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some((admin, _)) = inner.admins.get_mut(&id) else {
            return Ok(false);
        };
        if admin.status != AdminStatus::PendingApproval {
            return Ok(false);
        }
        admin.status = to;
        if to == AdminStatus::Active {
            admin.approved_by = Some(approved_by);
            admin.approved_at = Some(now);
        }
        admin.updated_at = now;
        Ok(true)
    }

    async fn set_admin_status(
        &self,
        id: Uuid,
        from: AdminStatus,
        to: AdminStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some((admin, _)) = inner.admins.get_mut(&id) else {
            return Ok(false);
        };
        if admin.status != from {
            return Ok(false);
        }
        admin.status = to;
        admin.updated_at = now;
        Ok(true)
    }

    async fn set_mfa_enabled(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some((admin, _)) = inner.admins.get_mut(&id) else {
            return Ok(false);
        };
        admin.mfa_enabled = true;
        admin.updated_at = now;
        Ok(true)
    }

    async fn list_admins_by_status(
        &self,
        status: AdminStatus,
        page: u32,
        per_page: u32,
    ) -> AppResult<(Vec<AdminAccount>, u64)> {
        let inner = self.inner.lock().unwrap();
        let mut matching: Vec<AdminAccount> = inner
            .admins
            .values()
            .filter(|(admin, _)| admin.status == status)
            .map(|(admin, _)| admin.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let start = (page.saturating_sub(1) as usize) * per_page as usize;
        let admins = matching
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Ok((admins, total))
    }
}
