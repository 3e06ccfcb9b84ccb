use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credentials for the tenant's WhatsApp Business account. Every field
/// defaults to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhatsAppCredentials {
    pub account_id: String,
    pub access_token: String,
    pub app_id: String,
    pub base_url: String,
    pub api_version: String,
}

impl WhatsAppCredentials {
    pub fn is_configured(&self) -> bool {
        !self.account_id.trim().is_empty() && !self.access_token.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
    pub website_name: String,
    pub favicon: String,
    pub is_active: bool,
    pub is_super_admin: bool,
    pub whatsapp: WhatsAppCredentials,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(name: &str, domain: &str, website_name: &str, favicon: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            domain: domain.trim().to_ascii_lowercase(),
            website_name: website_name.trim().to_string(),
            favicon: favicon.trim().to_string(),
            is_active: true,
            is_super_admin: false,
            whatsapp: WhatsAppCredentials::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn view(&self) -> TenantView {
        TenantView {
            id: self.id,
            name: self.name.clone(),
            domain: self.domain.clone(),
            website_name: self.website_name.clone(),
            favicon: self.favicon.clone(),
            is_active: self.is_active,
            is_super_admin: self.is_super_admin,
            whatsapp: WhatsAppView {
                account_id: self.whatsapp.account_id.clone(),
                app_id: self.whatsapp.app_id.clone(),
                base_url: self.whatsapp.base_url.clone(),
                api_version: self.whatsapp.api_version.clone(),
                has_access_token: !self.whatsapp.access_token.is_empty(),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Outward representation of a tenant. The access token is reduced to a flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantView {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
    pub website_name: String,
    pub favicon: String,
    pub is_active: bool,
    pub is_super_admin: bool,
    pub whatsapp: WhatsAppView,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppView {
    pub account_id: String,
    pub app_id: String,
    pub base_url: String,
    pub api_version: String,
    pub has_access_token: bool,
}

/// Partial update of tenant settings; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettingsPatch {
    pub website_name: Option<String>,
    pub favicon: Option<String>,
    pub whatsapp: Option<WhatsAppPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppPatch {
    pub account_id: Option<String>,
    pub access_token: Option<String>,
    pub app_id: Option<String>,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
}

impl TenantSettingsPatch {
    pub fn apply(self, tenant: &mut Tenant) {
        if let Some(name) = self.website_name {
            tenant.website_name = name.trim().to_string();
        }
        if let Some(favicon) = self.favicon {
            tenant.favicon = favicon.trim().to_string();
        }
        if let Some(wa) = self.whatsapp {
            let creds = &mut tenant.whatsapp;
            if let Some(v) = wa.account_id {
                creds.account_id = v.trim().to_string();
            }
            if let Some(v) = wa.access_token {
                creds.access_token = v.trim().to_string();
            }
            if let Some(v) = wa.app_id {
                creds.app_id = v.trim().to_string();
            }
            if let Some(v) = wa.base_url {
                creds.base_url = v.trim().trim_end_matches('/').to_string();
            }
            if let Some(v) = wa.api_version {
                creds.api_version = v.trim().to_string();
            }
        }
        tenant.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut tenant = Tenant::new("acme", "Acme.io", "Acme", "");
        tenant.whatsapp.app_id = "app-1".into();

        TenantSettingsPatch {
            favicon: Some("https://cdn/acme.ico".into()),
            whatsapp: Some(WhatsAppPatch {
                access_token: Some("tok".into()),
                base_url: Some("https://graph.example.com/".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
        .apply(&mut tenant);

        assert_eq!(tenant.website_name, "Acme");
        assert_eq!(tenant.domain, "acme.io");
        assert_eq!(tenant.favicon, "https://cdn/acme.ico");
        assert_eq!(tenant.whatsapp.app_id, "app-1");
        assert_eq!(tenant.whatsapp.access_token, "tok");
        assert_eq!(tenant.whatsapp.base_url, "https://graph.example.com");
    }

    #[test]
    fn view_hides_access_token() {
        let mut tenant = Tenant::new("acme", "acme.io", "Acme", "");
        tenant.whatsapp.access_token = "secret".into();
        let json = serde_json::to_value(tenant.view()).unwrap();
        assert_eq!(json["whatsapp"]["hasAccessToken"], true);
        assert!(!json.to_string().contains("secret"));
    }
}
