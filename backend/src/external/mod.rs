//! Clients for external services

pub mod auth_claims;

pub use auth_claims::AuthClaimsClient;
