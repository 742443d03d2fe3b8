//! Integration tests for the admin invitation and approval lifecycle

mod common;

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use shared::models::{
    default_permissions, AdminInvitation, AdminPermission, AdminRole, AdminStatus,
    ApprovalDecision,
};
use ycm_backend::error::AppError;
use ycm_backend::services::admin::{
    AdminService, ApprovalInput, CreateInvitationInput, RedeemInvitationInput,
};
use ycm_backend::store::{AdminStore, MemoryStore};

use common::{memory_store, seed_admin, test_config};

fn admin_service(store: &Arc<MemoryStore>) -> AdminService {
    let admins: Arc<dyn AdminStore> = store.clone();
    AdminService::new(admins, &test_config())
}

fn digest(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

/// Insert an invitation with a caller-chosen raw token
async fn seed_invitation(
    store: &Arc<MemoryStore>,
    token: &str,
    expires_in: Duration,
) -> AdminInvitation {
    let now = Utc::now();
    let invitation = AdminInvitation {
        id: Uuid::new_v4(),
        token_digest: digest(token),
        email: format!("{}@admin.example.com", Uuid::new_v4().simple()),
        role: AdminRole::Support,
        expires_at: now + expires_in,
        used: false,
        used_by: None,
        used_at: None,
        created_at: now,
    };
    AdminStore::create_invitation(store.as_ref(), &invitation)
        .await
        .unwrap();
    invitation
}

fn redeem_input(token: &str) -> RedeemInvitationInput {
    RedeemInvitationInput {
        token: token.to_string(),
        name: "New Admin".to_string(),
        password: "correct-horse-battery".to_string(),
    }
}

#[tokio::test]
async fn redemption_creates_pending_account_with_role_permissions() {
    let store = memory_store();
    let service = admin_service(&store);
    let invitation = seed_invitation(&store, "tok-basic", Duration::days(7)).await;

    let admin = service.redeem_invitation(redeem_input("tok-basic")).await.unwrap();

    assert_eq!(admin.status, AdminStatus::PendingApproval);
    assert_eq!(admin.email, invitation.email);
    assert_eq!(admin.permissions, default_permissions(AdminRole::Support));
    assert!(!admin.mfa_enabled);
    assert_eq!(admin.invitation_id, invitation.id);
}

#[tokio::test]
async fn used_token_cannot_be_redeemed_again() {
    let store = memory_store();
    let service = admin_service(&store);
    seed_invitation(&store, "tok-once", Duration::days(7)).await;

    service.redeem_invitation(redeem_input("tok-once")).await.unwrap();

    let err = service
        .redeem_invitation(redeem_input("tok-once"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInvitation));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let store = memory_store();
    let service = admin_service(&store);
    seed_invitation(&store, "tok-stale", Duration::hours(-1)).await;

    let err = service
        .redeem_invitation(redeem_input("tok-stale"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInvitation));
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let store = memory_store();
    let service = admin_service(&store);

    let err = service
        .redeem_invitation(redeem_input("tok-never-issued"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInvitation));
}

#[tokio::test]
async fn concurrent_redemption_creates_at_most_one_account() {
    let store = memory_store();
    let service = admin_service(&store);
    seed_invitation(&store, "tok-race", Duration::days(7)).await;

    let (a, b) = tokio::join!(
        service.redeem_invitation(redeem_input("tok-race")),
        service.redeem_invitation(redeem_input("tok-race")),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);

    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser.unwrap_err(), AppError::InvalidInvitation));
}

#[tokio::test]
async fn approval_activates_pending_account() {
    let store = memory_store();
    let service = admin_service(&store);
    let approver = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;

    seed_invitation(&store, "tok-approve", Duration::days(7)).await;
    let pending = service
        .redeem_invitation(redeem_input("tok-approve"))
        .await
        .unwrap();

    let updated = service
        .process_approval(approver, pending.id, ApprovalDecision::Approve)
        .await
        .unwrap();

    assert_eq!(updated.status, AdminStatus::Active);
    assert_eq!(updated.approved_by, Some(approver));
    assert!(updated.approved_at.is_some());
}

#[tokio::test]
async fn rejection_records_no_approver() {
    let store = memory_store();
    let service = admin_service(&store);
    let approver = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;

    seed_invitation(&store, "tok-reject", Duration::days(7)).await;
    let pending = service
        .redeem_invitation(redeem_input("tok-reject"))
        .await
        .unwrap();

    let updated = service
        .process_approval(approver, pending.id, ApprovalDecision::Reject)
        .await
        .unwrap();

    assert_eq!(updated.status, AdminStatus::Rejected);
    // The approval fields are reserved for activation
    assert!(updated.approved_by.is_none());
    assert!(updated.approved_at.is_none());

    // The rejected account is locked out, with its status reported
    let err = service.check_access(pending.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::AdminInactive {
            status: AdminStatus::Rejected
        }
    ));
}

#[tokio::test]
async fn second_decision_conflicts() {
    let store = memory_store();
    let service = admin_service(&store);
    let approver = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;

    seed_invitation(&store, "tok-twice", Duration::days(7)).await;
    let pending = service
        .redeem_invitation(redeem_input("tok-twice"))
        .await
        .unwrap();

    service
        .process_approval(approver, pending.id, ApprovalDecision::Reject)
        .await
        .unwrap();

    let err = service
        .process_approval(approver, pending.id, ApprovalDecision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    // The first decision stands
    let admin = store.get_admin(pending.id).await.unwrap().unwrap();
    assert_eq!(admin.status, AdminStatus::Rejected);
}

#[tokio::test]
async fn approval_without_permission_is_forbidden_and_leaves_target_pending() {
    let store = memory_store();
    let service = admin_service(&store);
    // Active, but only holds reporting access
    let actor = seed_admin(
        &store,
        AdminStatus::Active,
        vec![AdminPermission::ViewReports],
    )
    .await;

    seed_invitation(&store, "tok-gate", Duration::days(7)).await;
    let pending = service
        .redeem_invitation(redeem_input("tok-gate"))
        .await
        .unwrap();

    let err = service
        .process_approval(actor, pending.id, ApprovalDecision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientPermissions));

    let admin = store.get_admin(pending.id).await.unwrap().unwrap();
    assert_eq!(admin.status, AdminStatus::PendingApproval);
}

#[tokio::test]
async fn inactive_approver_is_rejected_with_current_status() {
    let store = memory_store();
    let service = admin_service(&store);
    let suspended = seed_admin(
        &store,
        AdminStatus::Suspended,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;

    let err = service.check_access(suspended).await.unwrap_err();
    match err {
        AppError::AdminInactive { status } => assert_eq!(status, AdminStatus::Suspended),
        other => panic!("expected AdminInactive, got {:?}", other),
    }

    let pending = seed_admin(
        &store,
        AdminStatus::PendingApproval,
        default_permissions(AdminRole::Support),
    )
    .await;
    let err = service.check_access(pending).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::AdminInactive {
            status: AdminStatus::PendingApproval
        }
    ));
}

#[tokio::test]
async fn suspend_and_reinstate_round_trip() {
    let store = memory_store();
    let service = admin_service(&store);
    let security = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;
    let target = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::Support),
    )
    .await;

    service.suspend(security, target).await.unwrap();
    let admin = store.get_admin(target).await.unwrap().unwrap();
    assert_eq!(admin.status, AdminStatus::Suspended);

    // Suspending again is an invalid transition, not a silent no-op
    let err = service.suspend(security, target).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));

    service.reinstate(security, target).await.unwrap();
    let admin = store.get_admin(target).await.unwrap().unwrap();
    assert_eq!(admin.status, AdminStatus::Active);
}

#[tokio::test]
async fn rejected_account_cannot_be_suspended() {
    let store = memory_store();
    let service = admin_service(&store);
    let security = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;
    let target = seed_admin(
        &store,
        AdminStatus::Rejected,
        default_permissions(AdminRole::Support),
    )
    .await;

    let err = service.suspend(security, target).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn login_succeeds_in_any_status_and_reports_it() {
    let store = memory_store();
    let service = admin_service(&store);
    seed_invitation(&store, "tok-login", Duration::days(7)).await;

    let pending = service
        .redeem_invitation(redeem_input("tok-login"))
        .await
        .unwrap();

    let tokens = service
        .login(&pending.email, "correct-horse-battery")
        .await
        .unwrap();
    assert_eq!(tokens.status, AdminStatus::PendingApproval);
    assert!(tokens.requires_mfa_setup);

    let claims = service.validate_token(&tokens.access_token).unwrap();
    assert_eq!(claims.sub, pending.id.to_string());

    let err = service
        .login(&pending.email, "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn invitation_issuance_requires_active_approver() {
    let store = memory_store();
    let service = admin_service(&store);
    let issuer = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;

    let issued = service
        .issue_invitation(
            issuer,
            CreateInvitationInput {
                email: "invitee@example.com".to_string(),
                role: AdminRole::Admin,
                expires_in_days: None,
            },
        )
        .await
        .unwrap();

    // The raw token round-trips through redemption
    let admin = service
        .redeem_invitation(redeem_input(&issued.token))
        .await
        .unwrap();
    assert_eq!(admin.email, "invitee@example.com");
    assert_eq!(admin.permissions, default_permissions(AdminRole::Admin));

    let pending_issuer = seed_admin(
        &store,
        AdminStatus::PendingApproval,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;
    let err = service
        .issue_invitation(
            pending_issuer,
            CreateInvitationInput {
                email: "other@example.com".to_string(),
                role: AdminRole::Support,
                expires_in_days: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AdminInactive { .. }));
}

#[tokio::test]
async fn invitation_expiry_is_capped() {
    let store = memory_store();
    let service = admin_service(&store);
    let issuer = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;

    let err = service
        .issue_invitation(
            issuer,
            CreateInvitationInput {
                email: "longterm@example.com".to_string(),
                role: AdminRole::Support,
                expires_in_days: Some(90),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[tokio::test]
async fn list_pending_pages_through_undecided_accounts() {
    let store = memory_store();
    let service = admin_service(&store);
    let approver = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;

    for i in 0..3 {
        seed_invitation(&store, &format!("tok-page-{}", i), Duration::days(7)).await;
        service
            .redeem_invitation(redeem_input(&format!("tok-page-{}", i)))
            .await
            .unwrap();
    }

    let page = service
        .list_pending(
            approver,
            shared::types::Pagination { page: 1, per_page: 2 },
        )
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.pagination.total_items, 3);
    assert_eq!(page.pagination.total_pages, 2);
    assert!(page
        .data
        .iter()
        .all(|a| a.status == AdminStatus::PendingApproval));
}

#[tokio::test]
async fn full_lifecycle_from_invitation_to_active_access() {
    let store = memory_store();
    let service = admin_service(&store);
    let root = seed_admin(
        &store,
        AdminStatus::Active,
        default_permissions(AdminRole::SuperAdmin),
    )
    .await;

    let issued = service
        .issue_invitation(
            root,
            CreateInvitationInput {
                email: "lifecycle@example.com".to_string(),
                role: AdminRole::Admin,
                expires_in_days: Some(3),
            },
        )
        .await
        .unwrap();

    let admin = service
        .redeem_invitation(redeem_input(&issued.token))
        .await
        .unwrap();

    // Pending accounts are locked out of privileged actions
    let err = service.check_access(admin.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::AdminInactive {
            status: AdminStatus::PendingApproval
        }
    ));

    let input = ApprovalInput {
        decision: ApprovalDecision::Approve,
    };
    service
        .process_approval(root, admin.id, input.decision)
        .await
        .unwrap();

    service.complete_mfa_setup(admin.id).await.unwrap();

    let active = service.check_access(admin.id).await.unwrap();
    assert_eq!(active.status, AdminStatus::Active);
    assert!(active.mfa_enabled);
}
