//! Request middleware

pub mod auth;

pub use auth::{
    admin_auth_middleware, auth_middleware, AdminUser, AuthUser, CurrentAdmin, CurrentUser,
};
