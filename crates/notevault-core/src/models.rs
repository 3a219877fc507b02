//! Domain models and request/response DTOs.
//!
//! Wire field names follow the upstream API contract: a note serializes its
//! category reference as `category` and its owner as `user`, and timestamps
//! stay internal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// DOMAIN MODELS
// =============================================================================

/// A registered user. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

/// A note category, owned by exactly one user. Owner is immutable.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "user")]
    pub owner_id: Uuid,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

/// A note, owned by exactly one user and optionally filed under one of the
/// owner's categories.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "category")]
    pub category_id: Option<Uuid>,
    #[serde(rename = "user")]
    pub owner_id: Uuid,
    pub pinned: bool,
    pub font_size: i32,
    pub font_style: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

/// Default note font size (matches the upstream model default).
pub const DEFAULT_FONT_SIZE: i32 = 16;

/// Default note font style.
pub const DEFAULT_FONT_STYLE: &str = "normal";

// =============================================================================
// ACCOUNT REQUESTS
// =============================================================================

/// Registration payload. All fields are required; validation reports the
/// first missing one by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token refresh payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Partial profile update. Absent or empty fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Profile view returned by `GET /profile/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Authenticated password reset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Unauthenticated password recovery. Wire field names follow the upstream
/// contract (`re_type_password`, not `confirm_password`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecoverPasswordRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub new_password: Option<String>,
    pub re_type_password: Option<String>,
}

// =============================================================================
// CATEGORY / NOTE REQUESTS
// =============================================================================

/// Category create/update payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRequest {
    pub title: Option<String>,
}

/// Note creation payload. `category` is the category id; title, content and
/// category are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Uuid>,
    #[serde(default)]
    pub pinned: bool,
    pub font_size: Option<i32>,
    pub font_style: Option<String>,
}

/// Partial note update. Only supplied fields change.
///
/// `category` distinguishes an absent field from an explicit null: absent
/// leaves the filing untouched, `"category": null` detaches the note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<Uuid>>,
    pub pinned: Option<bool>,
    pub font_size: Option<i32>,
    pub font_style: Option<String>,
}

/// Deserialize a present-but-nullable field as `Some(inner)`, so the outer
/// option tracks field presence and the inner one tracks null.
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateNoteRequest {
    /// True when no field is supplied at all (the update is a no-op).
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.pinned.is_none()
            && self.font_size.is_none()
            && self.font_style.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_wire_field_names() {
        let note = Note {
            id: Uuid::nil(),
            title: "Plan".to_string(),
            content: "x".to_string(),
            category_id: Some(Uuid::nil()),
            owner_id: Uuid::nil(),
            pinned: false,
            font_size: DEFAULT_FONT_SIZE,
            font_style: DEFAULT_FONT_STYLE.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("category").is_some());
        assert!(json.get("user").is_some());
        assert!(json.get("category_id").is_none());
        assert!(json.get("owner_id").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["font_size"], 16);
    }

    #[test]
    fn test_category_wire_field_names() {
        let category = Category {
            id: Uuid::nil(),
            title: "Work".to_string(),
            owner_id: Uuid::nil(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&category).unwrap();
        assert!(json.get("user").is_some());
        assert!(json.get("owner_id").is_none());
    }

    #[test]
    fn test_create_note_request_defaults() {
        let req: CreateNoteRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(!req.pinned);
        assert!(req.font_size.is_none());
    }

    #[test]
    fn test_update_note_request_is_empty() {
        let req: UpdateNoteRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());

        let req: UpdateNoteRequest = serde_json::from_str(r#"{"pinned": true}"#).unwrap();
        assert!(!req.is_empty());
    }

    #[test]
    fn test_update_note_request_category_tri_state() {
        // Absent: leave the filing untouched.
        let req: UpdateNoteRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.category, None);

        // Explicit null: detach the note from its category.
        let req: UpdateNoteRequest = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(req.category, Some(None));

        // A value: re-file under that category.
        let req: UpdateNoteRequest = serde_json::from_str(
            r#"{"category": "018f4e1c-0000-7000-8000-000000000000"}"#,
        )
        .unwrap();
        assert!(matches!(req.category, Some(Some(_))));
        assert!(!req.is_empty());
    }

    #[test]
    fn test_recover_password_wire_field() {
        let req: RecoverPasswordRequest = serde_json::from_str(
            r#"{"username": "u", "email": "u@example.com",
                "new_password": "a", "re_type_password": "a"}"#,
        )
        .unwrap();
        assert_eq!(req.re_type_password.as_deref(), Some("a"));
    }

    #[test]
    fn test_profile_response_from_user() {
        let user = User {
            id: Uuid::nil(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            created_at: Utc::now(),
        };
        let profile = ProfileResponse::from(user);
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.first_name, "Alice");
    }
}
