//! Account and profile handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::account::{CompleteProfile, CreateAccountInput};
use crate::services::AccountService;
use crate::AppState;
use shared::models::{
    ConsumerProfile, ConsumerProfileUpdate, IdentityRecord, IdentityUpdate, ProviderProfile,
    ProviderProfileUpdate,
};

/// Register a new marketplace account
pub async fn create_account(
    State(state): State<AppState>,
    Json(input): Json<CreateAccountInput>,
) -> Result<(StatusCode, Json<IdentityRecord>), AppError> {
    input
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = AccountService::new(state.accounts.clone());
    let record = service.create_account(input).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Get the caller's harmonized profile view
pub async fn get_my_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CompleteProfile>, AppError> {
    let service = AccountService::new(state.accounts.clone());
    let profile = service.get_complete_profile(user.account_id).await?;

    Ok(Json(profile))
}

/// Partially update the caller's identity fields
pub async fn update_my_identity(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<IdentityUpdate>,
) -> Result<Json<IdentityRecord>, AppError> {
    let service = AccountService::new(state.accounts.clone());
    let record = service.update_identity(user.account_id, update).await?;

    Ok(Json(record))
}

/// Partially update the caller's consumer profile
pub async fn update_my_consumer_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ConsumerProfileUpdate>,
) -> Result<Json<ConsumerProfile>, AppError> {
    let service = AccountService::new(state.accounts.clone());
    let profile = service
        .update_consumer_profile(user.account_id, update)
        .await?;

    Ok(Json(profile))
}

/// Partially update the caller's provider profile
pub async fn update_my_provider_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ProviderProfileUpdate>,
) -> Result<Json<ProviderProfile>, AppError> {
    let service = AccountService::new(state.accounts.clone());
    let profile = service
        .update_provider_profile(user.account_id, update)
        .await?;

    Ok(Json(profile))
}

/// Add a yacht listing to the caller's wishlist
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ConsumerProfile>, AppError> {
    let service = AccountService::new(state.accounts.clone());
    let profile = service.add_to_wishlist(user.account_id, listing_id).await?;

    Ok(Json(profile))
}

/// Remove a yacht listing from the caller's wishlist
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ConsumerProfile>, AppError> {
    let service = AccountService::new(state.accounts.clone());
    let profile = service
        .remove_from_wishlist(user.account_id, listing_id)
        .await?;

    Ok(Json(profile))
}
