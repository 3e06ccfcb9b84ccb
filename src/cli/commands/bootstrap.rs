use anyhow::anyhow;
use clap::Args;

use crate::config::AppConfig;
use crate::services::tenant_service::CreateTenantRequest;
use crate::services::TenantService;

#[derive(Args, Debug)]
pub struct BootstrapArgs {
    #[arg(long, help = "Tenant name")]
    pub name: String,

    #[arg(long, help = "Tenant domain")]
    pub domain: String,

    #[arg(long, help = "Administrator e-mail")]
    pub admin_email: String,

    #[arg(long, env = "BOOTSTRAP_ADMIN_PASSWORD", help = "Administrator password")]
    pub admin_password: String,

    #[arg(long, help = "Administrator username (defaults to the e-mail local part)")]
    pub admin_username: Option<String>,
}

pub async fn handle(args: BootstrapArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    if config.database.url.is_none() {
        return Err(anyhow!("DATABASE_URL must be set to bootstrap a tenant"));
    }

    let store = super::open_store(&config, false).await?;
    let service = TenantService::new(store, config.security.bcrypt_cost);

    let request = CreateTenantRequest {
        name: args.name,
        domain: args.domain,
        website_name: None,
        favicon: None,
        admin_email: args.admin_email,
        admin_password: args.admin_password,
        admin_username: args.admin_username,
        admin_first_name: None,
        admin_last_name: None,
    };

    let created = service
        .bootstrap(request)
        .await
        .map_err(|e| anyhow!("bootstrap failed: {}", e.message()))?;

    if let Some(created) = created.data {
        println!("✓ Super admin tenant '{}' created ({})", created.tenant.name, created.tenant.id);
        println!("  Administrator: {}", created.admin.email);
    }
    Ok(())
}
