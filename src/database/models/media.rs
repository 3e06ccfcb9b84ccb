use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::MediaKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: Uuid,
    pub url: String,
    pub public_id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Bytes
    pub size: i64,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Media {
    pub fn new(url: String, public_id: String, kind: MediaKind, size: i64, uploaded_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            url,
            public_id,
            kind,
            size,
            uploaded_by,
            created_at: now,
            updated_at: now,
        }
    }
}
