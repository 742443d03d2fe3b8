//! HTTP request handlers

pub mod account;
pub mod admin;
pub mod health;
pub mod role;

pub use account::*;
pub use admin::*;
pub use health::*;
pub use role::*;
