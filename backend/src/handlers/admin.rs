//! Admin governance handlers
//!
//! Every privileged endpoint runs the approval gate before acting; an
//! account that is not active gets a Forbidden response carrying its
//! current status.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::CurrentAdmin;
use crate::services::account::CompleteProfile;
use crate::services::admin::{
    AdminTokens, ApprovalInput, CreateInvitationInput, InvitationIssued, RedeemInvitationInput,
};
use crate::services::{AccountService, AdminService};
use crate::AppState;
use shared::models::{AdminAccount, AdminPermission, AdminStatus};
use shared::types::{PaginatedResponse, Pagination, SuccessResponse};

/// Login request body
#[derive(Debug, Deserialize)]
pub struct AdminLoginInput {
    pub email: String,
    pub password: String,
}

/// Response for the access check endpoint
#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub allowed: bool,
    pub status: AdminStatus,
}

/// Authenticate an admin account
pub async fn admin_login(
    State(state): State<AppState>,
    Json(input): Json<AdminLoginInput>,
) -> Result<Json<AdminTokens>, AppError> {
    let service = AdminService::new(state.admins.clone(), &state.config);
    let tokens = service.login(&input.email, &input.password).await?;

    Ok(Json(tokens))
}

/// Redeem an invitation, creating a pending admin account
pub async fn redeem_invitation(
    State(state): State<AppState>,
    Json(input): Json<RedeemInvitationInput>,
) -> Result<(StatusCode, Json<AdminAccount>), AppError> {
    input
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = AdminService::new(state.admins.clone(), &state.config);
    let admin = service.redeem_invitation(input).await?;

    Ok((StatusCode::CREATED, Json(admin)))
}

/// Issue a new single-use invitation
pub async fn issue_invitation(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(input): Json<CreateInvitationInput>,
) -> Result<(StatusCode, Json<InvitationIssued>), AppError> {
    input
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = AdminService::new(state.admins.clone(), &state.config);
    let issued = service.issue_invitation(admin.admin_id, input).await?;

    Ok((StatusCode::CREATED, Json(issued)))
}

/// Check whether the caller may act; carries the status either way
pub async fn check_access(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
) -> Result<Json<AccessResponse>, AppError> {
    let service = AdminService::new(state.admins.clone(), &state.config);
    let account = service.check_access(admin.admin_id).await?;

    Ok(Json(AccessResponse {
        allowed: true,
        status: account.status,
    }))
}

/// List admin accounts awaiting a decision
pub async fn list_pending_admins(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<AdminAccount>>, AppError> {
    let service = AdminService::new(state.admins.clone(), &state.config);
    let page = service.list_pending(admin.admin_id, pagination).await?;

    Ok(Json(page))
}

/// Approve or reject a pending admin account
pub async fn process_approval(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(target_id): Path<Uuid>,
    Json(input): Json<ApprovalInput>,
) -> Result<Json<SuccessResponse>, AppError> {
    let service = AdminService::new(state.admins.clone(), &state.config);
    service
        .process_approval(admin.admin_id, target_id, input.decision)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Suspend an active admin account
pub async fn suspend_admin(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(target_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    let service = AdminService::new(state.admins.clone(), &state.config);
    service.suspend(admin.admin_id, target_id).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Reinstate a suspended admin account
pub async fn reinstate_admin(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(target_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    let service = AdminService::new(state.admins.clone(), &state.config);
    service.reinstate(admin.admin_id, target_id).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Record completion of the caller's MFA setup
pub async fn complete_mfa_setup(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
) -> Result<Json<SuccessResponse>, AppError> {
    let service = AdminService::new(state.admins.clone(), &state.config);
    service.complete_mfa_setup(admin.admin_id).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Inspect a marketplace account's harmonized profile
pub async fn get_marketplace_account(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(account_id): Path<Uuid>,
) -> Result<Json<CompleteProfile>, AppError> {
    let admin_service = AdminService::new(state.admins.clone(), &state.config);
    let account = admin_service.check_access(admin.admin_id).await?;
    if !account.has_permission(AdminPermission::ManageAccounts) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = AccountService::new(state.accounts.clone());
    let profile = service.get_complete_profile(account_id).await?;

    Ok(Json(profile))
}

/// Body for a loyalty point grant
#[derive(Debug, Deserialize)]
pub struct GrantPointsInput {
    pub points: i64,
}

/// Response carrying the new point balance
#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub account_id: Uuid,
    pub points: i64,
}

/// Grant loyalty points to a marketplace account
pub async fn grant_points(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(account_id): Path<Uuid>,
    Json(input): Json<GrantPointsInput>,
) -> Result<Json<PointsResponse>, AppError> {
    let admin_service = AdminService::new(state.admins.clone(), &state.config);
    let account = admin_service.check_access(admin.admin_id).await?;
    if !account.has_permission(AdminPermission::ManageAccounts) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = AccountService::new(state.accounts.clone());
    let points = service.grant_points(account_id, input.points).await?;

    Ok(Json(PointsResponse { account_id, points }))
}
