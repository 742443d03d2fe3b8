//! Domain models for the Yacht Charter Marketplace

pub mod account;
pub mod admin;
pub mod profile;

pub use account::*;
pub use admin::*;
pub use profile::*;
