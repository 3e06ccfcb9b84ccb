pub mod media_service;
pub mod team_service;
pub mod template_service;
pub mod tenant_service;
pub mod user_service;

pub use media_service::{MediaError, MediaService};
pub use team_service::TeamService;
pub use template_service::TemplateService;
pub use tenant_service::TenantService;
pub use user_service::UserService;
