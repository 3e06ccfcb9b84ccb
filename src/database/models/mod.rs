pub mod media;
pub mod project;
pub mod tenant;
pub mod user;

pub use media::Media;
pub use project::Project;
pub use tenant::{Tenant, TenantSettingsPatch, TenantView, WhatsAppCredentials, WhatsAppPatch};
pub use user::{normalize_email, NewUser, User, UserView};
