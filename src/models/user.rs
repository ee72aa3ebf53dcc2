//! User accounts with student / teacher / admin roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    /// Lowercase name as stored in tokens and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Self::Student),
            "teacher" => Some(Self::Teacher),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Full user row from database (includes password_hash: never serialize to API).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response DTO: excludes password_hash and internal fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            avatar: u.avatar,
            created_at: u.created_at,
        }
    }
}

/// Admin-issued account creation; any role allowed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub role: UserRole,
}

/// Self-service registration. Admin accounts cannot be self-registered.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[serde(default = "default_register_role")]
    pub role: UserRole,
}

fn default_register_role() -> UserRole {
    UserRole::Student
}

impl From<RegisterUser> for CreateUser {
    fn from(r: RegisterUser) -> Self {
        Self {
            email: r.email,
            password: r.password,
            name: r.name,
            role: r.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::nil(),
            email: "ada@school.test".to_string(),
            name: "Ada".to_string(),
            password_hash: "secret_hash".to_string(),
            role: UserRole::Teacher,
            avatar: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_role_serialization() {
        let json = serde_json::to_string(&UserRole::Teacher).unwrap();
        assert_eq!(json, "\"teacher\"");
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn role_parse_matches_as_str() {
        for role in [UserRole::Student, UserRole::Teacher, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("Platform_Admin"), None);
    }

    #[test]
    fn user_response_excludes_password() {
        let response: UserResponse = sample_user().into();
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
        assert_eq!(response.role, UserRole::Teacher);
    }

    #[test]
    fn register_defaults_to_student() {
        let body: RegisterUser = serde_json::from_str(
            r#"{"email":"kid@school.test","password":"longenough","name":"Kid"}"#,
        )
        .unwrap();
        assert_eq!(body.role, UserRole::Student);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn register_rejects_bad_email() {
        let body = RegisterUser {
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
            name: "Kid".to_string(),
            role: UserRole::Student,
        };
        assert!(body.validate().is_err());
    }
}
