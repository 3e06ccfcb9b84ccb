pub mod app;
pub mod auth;
pub mod authz;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod testing;
pub mod types;
pub mod validation;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::external::{MediaHost, MessagingClient};
use crate::services::{MediaService, TeamService, TemplateService, TenantService, UserService};

pub use app::app;

/// Shared state handed to every handler. Services are cheap views over it
/// and are built per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub media_host: Arc<dyn MediaHost>,
    pub messaging: MessagingClient,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, media_host: Arc<dyn MediaHost>) -> Self {
        let messaging = MessagingClient::new(&config.api);
        Self {
            config: Arc::new(config),
            store,
            media_host,
            messaging,
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone(), self.config.security.clone())
    }

    pub fn tenants(&self) -> TenantService {
        TenantService::new(self.store.clone(), self.config.security.bcrypt_cost)
    }

    pub fn team(&self) -> TeamService {
        TeamService::new(self.store.clone(), self.config.security.bcrypt_cost)
    }

    pub fn media(&self) -> MediaService {
        MediaService::new(self.store.clone(), self.media_host.clone())
    }

    pub fn templates(&self) -> TemplateService {
        TemplateService::new(self.messaging.clone())
    }
}
