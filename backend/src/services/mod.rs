//! Business logic services for the Yacht Charter Marketplace

pub mod account;
pub mod admin;
pub mod role;
pub mod sync;

pub use account::AccountService;
pub use admin::AdminService;
pub use role::RoleService;
pub use sync::SyncService;
