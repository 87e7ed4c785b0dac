//! Admin authentication: a bearer-token guard for admin routes and the
//! `AdminContext` it hands to handlers.

pub mod middleware;
pub mod models;

pub use middleware::admin_auth_middleware;
pub use models::AdminContext;
