//! Cloudinary upload API client.
//!
//! Requests are signed with SHA-256 (`signature_algorithm=sha256`); the
//! Cloudinary account must accept SHA-256 signatures.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::MediaConfig;
use crate::types::MediaKind;

/// A file accepted for upload, fully read and size-checked.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Where the host stored an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedAsset {
    pub url: String,
    pub public_id: String,
    pub size: i64,
}

/// Binary storage for media. Built once at startup from [`MediaConfig`].
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, file: &UploadFile, kind: MediaKind) -> Result<HostedAsset>;

    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    bytes: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct CloudinaryHost {
    http: reqwest::Client,
    config: MediaConfig,
}

fn resource_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
        MediaKind::Document => "raw",
    }
}

/// Sign sorted `key=value` pairs joined by `&`, with the secret appended.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl CloudinaryHost {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> Result<url::Url> {
        let base = self.config.upload_base_url.trim_end_matches('/');
        let raw = format!("{}/{}/{}/{}", base, self.config.cloud_name, resource_type(kind), action);
        url::Url::parse(&raw).with_context(|| format!("invalid media host url '{}'", raw))
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.config.cloud_name.is_empty() || self.config.api_key.is_empty() || self.config.api_secret.is_empty() {
            return Err(anyhow!("media host credentials are not configured"));
        }
        Ok(())
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => format!("{}: {}", status, body.error.message),
            Err(_) => status.to_string(),
        }
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, file: &UploadFile, kind: MediaKind) -> Result<HostedAsset> {
        self.ensure_configured()?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let folder = self.config.folder.clone();
        let signature = sign(&[("folder", folder.as_str()), ("timestamp", timestamp.as_str())], &self.config.api_secret);

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .context("invalid content type")?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        if !folder.is_empty() {
            form = form.text("folder", folder);
        }

        let response = self
            .http
            .post(self.endpoint(kind, "upload")?)
            .multipart(form)
            .send()
            .await
            .context("media upload request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("media upload rejected ({})", Self::error_message(response).await));
        }

        let body: UploadResponse = response.json().await.context("unexpected media upload response")?;
        Ok(HostedAsset {
            url: body.secure_url,
            public_id: body.public_id,
            size: body.bytes.unwrap_or(file.bytes.len() as i64),
        })
    }

    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<()> {
        self.ensure_configured()?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(&[("public_id", public_id), ("timestamp", timestamp.as_str())], &self.config.api_secret);

        let response = self
            .http
            .post(self.endpoint(kind, "destroy")?)
            .form(&[
                ("public_id", public_id),
                ("api_key", self.config.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .context("media destroy request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("media destroy rejected ({})", Self::error_message(response).await));
        }

        // "not found" means the asset is already gone
        let body: DestroyResponse = response.json().await.context("unexpected media destroy response")?;
        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(anyhow!("media destroy failed: {}", other)),
        }
    }
}
