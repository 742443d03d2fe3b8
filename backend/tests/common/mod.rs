//! Shared fixtures for the service integration tests

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use shared::models::{
    AccountRole, AdminAccount, AdminPermission, AdminStatus, IdentityRecord,
};
use ycm_backend::config::{
    AuthProviderConfig, Config, DatabaseConfig, JwtConfig, ServerConfig,
};
use ycm_backend::external::AuthClaimsClient;
use ycm_backend::store::{AccountStore, AdminStore, MemoryStore};

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 0,
        },
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        },
        auth_provider: AuthProviderConfig {
            // Nothing listens here; claim propagation is best-effort
            api_base: "http://127.0.0.1:9".to_string(),
            api_key: String::new(),
        },
    }
}

pub fn test_claims_client() -> AuthClaimsClient {
    AuthClaimsClient::new(&test_config().auth_provider)
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Insert an identity record with the given role, returning its id
pub async fn seed_identity(
    store: &Arc<MemoryStore>,
    name: &str,
    role: AccountRole,
) -> Uuid {
    let now = Utc::now();
    let record = IdentityRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", Uuid::new_v4().simple()),
        phone: None,
        role,
        email_verified: false,
        points: 0,
        created_at: now,
        updated_at: now,
    };
    AccountStore::create_identity(store.as_ref(), &record)
        .await
        .unwrap();
    record.id
}

/// Insert an admin account directly, bypassing the invitation flow
pub async fn seed_admin(
    store: &Arc<MemoryStore>,
    status: AdminStatus,
    permissions: Vec<AdminPermission>,
) -> Uuid {
    let now = Utc::now();
    let admin = AdminAccount {
        id: Uuid::new_v4(),
        name: "Seeded Admin".to_string(),
        email: format!("{}@admin.example.com", Uuid::new_v4().simple()),
        status,
        permissions,
        mfa_enabled: false,
        invitation_id: Uuid::new_v4(),
        approved_by: None,
        approved_at: None,
        created_at: now,
        updated_at: now,
    };
    AdminStore::create_admin(store.as_ref(), &admin, "$2b$12$seeded-hash")
        .await
        .unwrap();
    admin.id
}
