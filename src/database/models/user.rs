use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Role;

/// Stored account. Deliberately not `Serialize`: callers go through
/// [`User::sanitized`] so the password hash never reaches a response.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    /// Set only for team members.
    pub project_id: Option<Uuid>,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to create a user; id, timestamps and the active flag are
/// assigned by [`User::new`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub tenant_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub project_id: Option<Uuid>,
    pub permissions: Vec<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    pub fn new(new: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id: new.tenant_id,
            username: new.username.trim().to_string(),
            email: normalize_email(&new.email),
            password_hash: new.password_hash,
            role: new.role,
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            mobile_number: new.mobile_number.trim().to_string(),
            project_id: new.project_id,
            permissions: new.permissions,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sanitized(&self) -> UserView {
        UserView {
            id: self.id,
            tenant_id: self.tenant_id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            mobile_number: self.mobile_number.clone(),
            project_id: self.project_id,
            permissions: self.permissions.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User without credentials, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_lowercases_email() {
        let user = User::new(NewUser {
            tenant_id: Uuid::new_v4(),
            username: " jdoe ".into(),
            email: " John.Doe@Example.COM ".into(),
            password_hash: "$2b$04$hash".into(),
            role: Role::User,
            first_name: "John".into(),
            last_name: "Doe".into(),
            mobile_number: String::new(),
            project_id: None,
            permissions: vec![],
        });
        assert_eq!(user.email, "john.doe@example.com");
        assert_eq!(user.username, "jdoe");
        assert!(user.is_active);
    }

    #[test]
    fn sanitized_view_has_no_password() {
        let user = User::new(NewUser {
            tenant_id: Uuid::new_v4(),
            username: "jdoe".into(),
            email: "j@example.com".into(),
            password_hash: "$2b$04$secrethash".into(),
            role: Role::TeamMember,
            first_name: "J".into(),
            last_name: "D".into(),
            mobile_number: String::new(),
            project_id: Some(Uuid::new_v4()),
            permissions: vec!["templates:read".into()],
        });
        let json = serde_json::to_value(user.sanitized()).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "team-member");
        assert!(!json.to_string().contains("secrethash"));
    }
}
