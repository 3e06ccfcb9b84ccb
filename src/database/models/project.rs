use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Projects are owned by another part of the platform; this service only reads
/// them to find the owner and the tenant they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Owner
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(tenant_id: Uuid, user_id: Uuid, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            user_id,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }
}
