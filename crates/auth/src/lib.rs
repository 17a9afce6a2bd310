//! `medfac-auth` — route-guard decision engine of the admin console.
//!
//! This crate is intentionally decoupled from routing and rendering: it turns
//! an identity snapshot plus a static access requirement into one decision.

pub mod claims;
pub mod config;
pub mod evaluate;
pub mod guard;
pub mod identity;
pub mod permissions;
pub mod requirement;
pub mod roles;

pub use claims::{UserClaims, UserProfile};
pub use config::{BuildMode, Bypass, ProviderConfig};
pub use evaluate::{Evaluation, GuardContext, evaluate, evaluate_snapshot, resolve, settled_snapshot};
pub use guard::{Guard, chain};
pub use identity::{
    IdentityProvider, IdentityPublisher, IdentitySnapshot, InMemoryIdentityProvider, LoginOptions,
    ProviderError,
};
pub use permissions::Permission;
pub use requirement::AccessRequirement;
pub use roles::Role;
