// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, self-service registration and the health check.

pub mod auth;
pub mod health;

pub use auth::*;
pub use health::health_get;
