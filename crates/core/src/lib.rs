//! `medfac-core` — navigation primitives shared by the admin console crates.
//!
//! This crate contains **pure** value types (no identity provider, no routing).

pub mod error;
pub mod id;
pub mod navigation;

pub use error::{ConfigError, ConfigResult};
pub use id::NavigationId;
pub use navigation::{Decision, NavigationIntent, paths};
