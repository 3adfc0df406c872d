//! # Token Refresher Library
//!
//! Decides whether a bearer token is still fresh enough to present and, when it
//! is not, fetches a new one from an OAuth2-like token endpoint described by a
//! declarative configuration.
//!
//! Modules:
//! - `config` - plugin configuration and service settings
//! - `freshness` - expiry claim parsing and the refresh decision
//! - `fetcher` - token endpoint request building and response handling
//! - `refresher` - the initialize / refresh policy / refresh token operations
//! - `server` - HTTP adapter exposing those operations to the host

pub mod config;
pub mod errors;
pub mod fetcher;
pub mod freshness;
pub mod refresher;
pub mod observability;
pub mod server;
pub mod helpers;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::plugin::PluginConfig;
pub use crate::errors::{ConfigError, RefreshError};
pub use crate::refresher::{RefreshOutcome, RefreshPolicy, TokenRefresher};
