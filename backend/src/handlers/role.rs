//! Role transition handler

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::RoleService;
use crate::AppState;
use shared::models::AccountRole;
use shared::types::SuccessResponse;

/// Request body for a role change
#[derive(Debug, Deserialize)]
pub struct UpdateRoleInput {
    pub role: String,
}

/// Change the caller's role, provisioning the new role's profile
pub async fn update_my_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<UpdateRoleInput>,
) -> Result<Json<SuccessResponse>, AppError> {
    let target = AccountRole::parse(&input.role).ok_or_else(|| AppError::Validation {
        field: "role".to_string(),
        message: "Role must be one of: consumer, producer, partner".to_string(),
    })?;

    let service = RoleService::new(state.accounts.clone(), state.claims.clone());
    service.change_role(user.account_id, target).await?;

    Ok(Json(SuccessResponse::ok()))
}
