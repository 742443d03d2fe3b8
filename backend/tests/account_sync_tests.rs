//! Integration tests for account creation and profile synchronization

mod common;

use std::sync::Arc;

use shared::models::AccountRole;
use ycm_backend::services::account::{AccountService, CreateAccountInput};
use ycm_backend::services::sync::{SyncOutcome, SyncService};
use ycm_backend::store::{AccountStore, MemoryStore};

use common::{memory_store, seed_identity};

fn account_service(store: &Arc<MemoryStore>) -> AccountService {
    let accounts: Arc<dyn AccountStore> = store.clone();
    AccountService::new(accounts)
}

fn sync_service(store: &Arc<MemoryStore>) -> SyncService {
    let accounts: Arc<dyn AccountStore> = store.clone();
    SyncService::new(accounts)
}

#[tokio::test]
async fn sync_creates_consumer_profile_once() {
    let store = memory_store();
    let sync = sync_service(&store);
    let id = seed_identity(&store, "Mika", AccountRole::Consumer).await;

    let first = sync.ensure_profile(id).await.unwrap();
    assert_eq!(first, SyncOutcome::CreatedConsumerProfile);

    // Re-running is a no-op, not an overwrite
    let second = sync.ensure_profile(id).await.unwrap();
    assert_eq!(second, SyncOutcome::AlreadyPresent);

    let profile = store.get_consumer_profile(id).await.unwrap().unwrap();
    assert!(profile.wishlist.is_empty());
    assert!(profile.preferences.is_empty());
}

#[tokio::test]
async fn sync_seeds_provider_profile_with_account_name() {
    let store = memory_store();
    let sync = sync_service(&store);
    let id = seed_identity(&store, "Harbor Charters", AccountRole::Producer).await;

    let outcome = sync.ensure_profile(id).await.unwrap();
    assert_eq!(outcome, SyncOutcome::CreatedProviderProfile);

    let profile = store.get_provider_profile(id).await.unwrap().unwrap();
    assert_eq!(profile.business_name, "Harbor Charters");
    assert!(profile.services_offered.is_empty());
}

#[tokio::test]
async fn sync_never_overwrites_existing_profile_data() {
    let store = memory_store();
    let service = account_service(&store);
    let sync = sync_service(&store);

    let record = service
        .create_account(CreateAccountInput {
            name: "Lena".to_string(),
            email: "lena@example.com".to_string(),
            phone: None,
            role: AccountRole::Consumer,
        })
        .await
        .unwrap();

    // Customize the profile, then force repeated sync passes
    let listing = uuid::Uuid::new_v4();
    service.add_to_wishlist(record.id, listing).await.unwrap();

    for _ in 0..3 {
        let outcome = sync.ensure_profile(record.id).await.unwrap();
        assert_eq!(outcome, SyncOutcome::AlreadyPresent);
    }

    let profile = store.get_consumer_profile(record.id).await.unwrap().unwrap();
    assert_eq!(profile.wishlist, vec![listing]);
}

#[tokio::test]
async fn sync_fails_for_unknown_account() {
    let store = memory_store();
    let sync = sync_service(&store);

    let err = sync.ensure_profile(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ycm_backend::error::AppError::NotFound(_)));
}

#[tokio::test]
async fn create_account_provisions_matching_profile() {
    let store = memory_store();
    let service = account_service(&store);

    let consumer = service
        .create_account(CreateAccountInput {
            name: "Tourist".to_string(),
            email: "tourist@example.com".to_string(),
            phone: Some("+66812345678".to_string()),
            role: AccountRole::Consumer,
        })
        .await
        .unwrap();

    assert!(store
        .get_consumer_profile(consumer.id)
        .await
        .unwrap()
        .is_some());
    assert!(store
        .get_provider_profile(consumer.id)
        .await
        .unwrap()
        .is_none());

    let partner = service
        .create_account(CreateAccountInput {
            name: "Agency".to_string(),
            email: "agency@example.com".to_string(),
            phone: None,
            role: AccountRole::Partner,
        })
        .await
        .unwrap();

    assert!(store
        .get_provider_profile(partner.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn complete_profile_includes_only_existing_profiles() {
    let store = memory_store();
    let service = account_service(&store);

    let record = service
        .create_account(CreateAccountInput {
            name: "Jo".to_string(),
            email: "jo@example.com".to_string(),
            phone: None,
            role: AccountRole::Consumer,
        })
        .await
        .unwrap();

    let view = service.get_complete_profile(record.id).await.unwrap();
    assert_eq!(view.core.id, record.id);
    assert!(view.tourist_profile.is_some());
    assert!(view.service_provider_profile.is_none());
}

#[tokio::test]
async fn complete_profile_heals_missing_profile_on_read() {
    let store = memory_store();
    let service = account_service(&store);

    // Identity inserted without any profile, as after a partial write
    let id = seed_identity(&store, "Orphan", AccountRole::Consumer).await;
    assert!(store.get_consumer_profile(id).await.unwrap().is_none());

    let view = service.get_complete_profile(id).await.unwrap();
    assert!(view.tourist_profile.is_some());
}

#[tokio::test]
async fn identity_update_validates_every_field_it_touches() {
    let store = memory_store();
    let service = account_service(&store);
    let id = seed_identity(&store, "Avery", shared::models::AccountRole::Consumer).await;

    let err = service
        .update_identity(
            id,
            shared::models::IdentityUpdate {
                email: Some("not-an-email".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ycm_backend::error::AppError::Validation { .. }
    ));

    let err = service
        .update_identity(
            id,
            shared::models::IdentityUpdate {
                phone: Some("call-me".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ycm_backend::error::AppError::Validation { .. }
    ));

    let record = service
        .update_identity(
            id,
            shared::models::IdentityUpdate {
                email: Some("avery@sailmail.com".to_string()),
                phone: Some("+306912345678".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(record.email, "avery@sailmail.com");
    assert_eq!(record.phone.as_deref(), Some("+306912345678"));
}

#[tokio::test]
async fn wishlist_add_is_idempotent_and_remove_tolerates_absence() {
    let store = memory_store();
    let service = account_service(&store);

    let record = service
        .create_account(CreateAccountInput {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            phone: None,
            role: AccountRole::Consumer,
        })
        .await
        .unwrap();

    let listing = uuid::Uuid::new_v4();
    service.add_to_wishlist(record.id, listing).await.unwrap();
    let profile = service.add_to_wishlist(record.id, listing).await.unwrap();
    assert_eq!(profile.wishlist, vec![listing]);

    let profile = service
        .remove_from_wishlist(record.id, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(profile.wishlist, vec![listing]);

    let profile = service
        .remove_from_wishlist(record.id, listing)
        .await
        .unwrap();
    assert!(profile.wishlist.is_empty());
}
