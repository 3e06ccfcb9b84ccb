pub mod auth;
pub mod context;
pub mod json;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthClaims};
pub use context::RequestContext;
pub use json::JsonBody;
pub use response::{ApiResponse, ApiResult};
