//! Route definitions for the Yacht Charter Marketplace backend

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{admin_auth_middleware, auth_middleware},
    AppState,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Account registration (public) and owner-scoped account routes
        .nest("/accounts", account_routes())
        // Admin governance
        .nest("/admin", admin_routes())
}

/// Account routes: registration is public, everything else is owner-scoped
fn account_routes() -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/me",
            get(handlers::get_my_profile).put(handlers::update_my_identity),
        )
        .route("/me/role", put(handlers::update_my_role))
        .route(
            "/me/consumer-profile",
            put(handlers::update_my_consumer_profile),
        )
        .route(
            "/me/provider-profile",
            put(handlers::update_my_provider_profile),
        )
        .route(
            "/me/wishlist/:listing_id",
            post(handlers::add_to_wishlist).delete(handlers::remove_from_wishlist),
        )
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/", post(handlers::create_account))
        .merge(protected)
}

/// Admin routes: login and invitation redemption are public, the rest
/// require an admin session token (and pass the approval gate per handler)
fn admin_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/access", get(handlers::check_access))
        .route("/invitations", post(handlers::issue_invitation))
        .route("/mfa/complete", post(handlers::complete_mfa_setup))
        .route("/accounts/pending", get(handlers::list_pending_admins))
        .route("/accounts/:admin_id/approval", post(handlers::process_approval))
        .route("/accounts/:admin_id/suspend", post(handlers::suspend_admin))
        .route(
            "/accounts/:admin_id/reinstate",
            post(handlers::reinstate_admin),
        )
        .route(
            "/marketplace-accounts/:account_id",
            get(handlers::get_marketplace_account),
        )
        .route(
            "/marketplace-accounts/:account_id/points",
            post(handlers::grant_points),
        )
        .route_layer(middleware::from_fn(admin_auth_middleware));

    Router::new()
        .route("/auth/login", post(handlers::admin_login))
        .route("/invitations/redeem", post(handlers::redeem_invitation))
        .merge(protected)
}
