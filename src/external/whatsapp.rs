//! WhatsApp Cloud API client for message templates and analytics.
//!
//! Credentials come from the acting tenant; base URL and API version fall
//! back to the configured defaults when the tenant leaves them blank.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::database::models::WhatsAppCredentials;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MessagingError {
    #[error("Messaging API credentials are not configured")]
    NotConfigured,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Messaging API request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for MessagingError {
    fn from(err: reqwest::Error) -> Self {
        MessagingError::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub language: String,
    pub category: String,
    pub components: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TemplateList {
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Clone)]
pub struct MessagingClient {
    http: reqwest::Client,
    default_base_url: String,
    default_api_version: String,
}

/// Credentials resolved against the defaults.
struct Account<'a> {
    base_url: String,
    api_version: String,
    account_id: &'a str,
    access_token: &'a str,
}

impl Account<'_> {
    fn url(&self, tail: &str) -> Result<url::Url, MessagingError> {
        let raw = format!("{}/{}/{}{}", self.base_url, self.api_version, self.account_id, tail);
        url::Url::parse(&raw).map_err(|e| MessagingError::Transport(format!("invalid url '{}': {}", raw, e)))
    }
}

impl MessagingClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            default_base_url: config.whatsapp_default_base_url.trim_end_matches('/').to_string(),
            default_api_version: config.whatsapp_default_api_version.clone(),
        }
    }

    fn account<'a>(&self, creds: &'a WhatsAppCredentials) -> Result<Account<'a>, MessagingError> {
        if !creds.is_configured() {
            return Err(MessagingError::NotConfigured);
        }

        let pick = |value: &str, fallback: &str| {
            let value = value.trim();
            if value.is_empty() { fallback.to_string() } else { value.to_string() }
        };

        Ok(Account {
            base_url: pick(&creds.base_url, &self.default_base_url).trim_end_matches('/').to_string(),
            api_version: pick(&creds.api_version, &self.default_api_version),
            account_id: creds.account_id.trim(),
            access_token: creds.access_token.trim(),
        })
    }

    /// Map a Graph API response to its JSON body or an [`MessagingError::Api`]
    /// carrying the provider's message.
    async fn read(response: reqwest::Response) -> Result<Value, MessagingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<GraphErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("Messaging API returned {}", status),
        };
        tracing::error!("Messaging API error {}: {}", status, message);
        Err(MessagingError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn list_templates(&self, creds: &WhatsAppCredentials) -> Result<Vec<Value>, MessagingError> {
        let account = self.account(creds)?;
        let response = self
            .http
            .get(account.url("/message_templates")?)
            .bearer_auth(account.access_token)
            .send()
            .await?;

        let body = Self::read(response).await?;
        let list: TemplateList =
            serde_json::from_value(body).map_err(|e| MessagingError::Transport(e.to_string()))?;
        Ok(list.data)
    }

    pub async fn create_template(
        &self,
        creds: &WhatsAppCredentials,
        template: &NewTemplate,
    ) -> Result<Value, MessagingError> {
        let account = self.account(creds)?;
        let response = self
            .http
            .post(account.url("/message_templates")?)
            .bearer_auth(account.access_token)
            .json(template)
            .send()
            .await?;

        Self::read(response).await
    }

    pub async fn delete_template(&self, creds: &WhatsAppCredentials, name: &str) -> Result<(), MessagingError> {
        let account = self.account(creds)?;
        let mut url = account.url("/message_templates")?;
        url.query_pairs_mut().append_pair("name", name);

        let response = self.http.delete(url).bearer_auth(account.access_token).send().await?;
        Self::read(response).await.map(|_| ())
    }

    /// Daily message analytics for the window `[start, end]` (unix seconds).
    pub async fn analytics(&self, creds: &WhatsAppCredentials, start: i64, end: i64) -> Result<Value, MessagingError> {
        let account = self.account(creds)?;
        let mut url = account.url("")?;
        url.query_pairs_mut()
            .append_pair("fields", &format!("analytics.start({}).end({}).granularity(DAY)", start, end));

        let response = self.http.get(url).bearer_auth(account.access_token).send().await?;
        let body = Self::read(response).await?;
        Ok(body.get("analytics").cloned().unwrap_or(Value::Null))
    }
}
