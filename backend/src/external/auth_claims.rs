//! Auth provider claim propagation client
//!
//! The marketplace's login tokens are issued by an upstream auth provider.
//! After a role transition the new role is pushed into that provider's
//! custom claims so freshly issued tokens carry it.

use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use crate::config::AuthProviderConfig;
use crate::error::{AppError, AppResult};
use shared::models::AccountRole;

/// Auth provider admin API client
#[derive(Clone)]
pub struct AuthClaimsClient {
    client: Client,
    api_base: String,
    api_key: String,
}

#[derive(Serialize)]
struct ClaimUpdate {
    role: AccountRole,
}

impl AuthClaimsClient {
    pub fn new(config: &AuthProviderConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Overwrite the role claim for an account on the auth provider
    pub async fn set_role_claim(&self, account_id: Uuid, role: AccountRole) -> AppResult<()> {
        let url = format!("{}/v1/accounts/{}/claims", self.api_base, account_id);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_key)
            .json(&ClaimUpdate { role })
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Auth provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Claim update for {} returned {}",
                account_id,
                response.status()
            )));
        }

        Ok(())
    }
}
