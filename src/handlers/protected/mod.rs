// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler here takes a `RequestContext`, so the account and its tenant
// are loaded and checked for activity before the handler body runs.

pub mod media;
pub mod profile;
pub mod team_members;
pub mod templates;
pub mod tenant_settings;
pub mod users;

pub use media::*;
pub use profile::*;
pub use team_members::*;
pub use templates::*;
pub use tenant_settings::*;
pub use users::*;
