//! HTTP API definitions.

pub mod admin;
pub mod auth;
pub mod health;
pub mod user;

pub use self::user::User;
