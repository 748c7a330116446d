//! Request middleware.
//!
//! Purpose: define middleware for request lifecycle concerns such as tracing
//! and navigation gatekeeping.

pub mod route_guard;
pub mod trace;

pub use route_guard::RouteGuard;
pub use trace::Trace;
