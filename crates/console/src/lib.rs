//! `medfac-console` — route table and navigation of the Medical Facilities
//! admin console.
//!
//! The console owns *where* guards run (per matched route, outermost first)
//! and what happens with their decisions; `medfac-auth` owns *what* they
//! decide.

pub mod app;
pub mod navigator;
pub mod routes;

pub use app::{Console, build_console, build_navigator, load_identity};
pub use navigator::{MAX_REDIRECTS, NavigationOutcome, Navigator};
pub use routes::{Resolution, RouteMatch, RouteNode, RouteTable, ViewId};
