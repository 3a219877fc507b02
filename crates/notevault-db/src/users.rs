//! User repository: credentials, profile, and password lifecycle.

use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use rand_core::OsRng;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use notevault_core::{
    Error, ProfileResponse, RecoverPasswordRequest, RegisterRequest, ResetPasswordRequest, Result,
    UpdateProfileRequest, User,
};

/// The single message for any login failure. Must not reveal whether the
/// username or the password was wrong.
pub const LOGIN_FAILED_MESSAGE: &str = "No active account found with the given credentials";

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, created_at";

/// PostgreSQL implementation of the credential store.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

fn map_user(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: row.get("created_at"),
    }
}

/// Hash a password into an Argon2 PHC string with a fresh random salt.
pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored PHC hash.
pub(crate) fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn require<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Validation(format!("{} is required", name))),
    }
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Register a new user. Username and email uniqueness are each enforced
    /// with a named error message.
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        let username = require(&req.username, "username")?;
        let email = require(&req.email, "email")?;
        let password = require(&req.password, "password")?;
        let first_name = require(&req.first_name, "first_name")?;
        let last_name = require(&req.last_name, "last_name")?;

        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        if username_taken {
            return Err(Error::Validation(
                "A user with that username already exists.".to_string(),
            ));
        }

        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        if email_taken {
            return Err(Error::Validation(
                "A user with that email already exists.".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let row = sqlx::query(&format!(
            "INSERT INTO app_user (id, username, email, password_hash, first_name, last_name, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Race with a concurrent registration: surface the same named
            // validation error as the pre-check.
            let msg = e.to_string();
            if msg.contains("app_user_username_key") {
                Error::Validation("A user with that username already exists.".to_string())
            } else if msg.contains("app_user_email_key") {
                Error::Validation("A user with that email already exists.".to_string())
            } else {
                Error::Database(e)
            }
        })?;

        Ok(map_user(&row))
    }

    /// Authenticate by username and password. Unknown username and wrong
    /// password are indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM app_user WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::Auth(LOGIN_FAILED_MESSAGE.to_string()))?;

        let stored_hash: String = row.get("password_hash");
        if !verify_password(password, &stored_hash) {
            return Err(Error::Auth(LOGIN_FAILED_MESSAGE.to_string()));
        }

        Ok(map_user(&row))
    }

    /// Fetch a user by id.
    pub async fn get(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM app_user WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        Ok(map_user(&row))
    }

    /// Fetch a user's profile view.
    pub async fn profile(&self, id: Uuid) -> Result<ProfileResponse> {
        Ok(self.get(id).await?.into())
    }

    /// Partial profile update. Absent or empty fields are left untouched,
    /// not cleared.
    pub async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User> {
        let current = self.get(id).await?;

        let pick = |new: Option<String>, old: String| match new {
            Some(value) if !value.is_empty() => value,
            _ => old,
        };
        let email = pick(req.email, current.email);
        let first_name = pick(req.first_name, current.first_name);
        let last_name = pick(req.last_name, current.last_name);

        let row = sqlx::query(&format!(
            "UPDATE app_user SET email = $1, first_name = $2, last_name = $3
             WHERE id = $4
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&email)
        .bind(&first_name)
        .bind(&last_name)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_user(&row))
    }

    /// Authenticated password reset. A reset to the current password is an
    /// error, not a no-op.
    pub async fn reset_password(&self, id: Uuid, req: ResetPasswordRequest) -> Result<()> {
        let (current_password, new_password) = match (&req.current_password, &req.new_password) {
            (Some(current), Some(new)) if !current.is_empty() && !new.is_empty() => (current, new),
            _ => {
                return Err(Error::Validation(
                    "Both current and new passwords are required".to_string(),
                ))
            }
        };

        let stored_hash: String =
            sqlx::query_scalar("SELECT password_hash FROM app_user WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?
                .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        if !verify_password(current_password, &stored_hash) {
            return Err(Error::Validation(
                "Current password is incorrect".to_string(),
            ));
        }
        if current_password == new_password {
            return Err(Error::Validation(
                "New password cannot be the same as the current password".to_string(),
            ));
        }

        self.store_password(id, new_password).await
    }

    /// Unauthenticated recovery via username+email. The sequential existence
    /// checks (username, then email, then the pair) are an upstream contract.
    pub async fn recover_password(&self, req: RecoverPasswordRequest) -> Result<()> {
        let username = match req.username.as_deref() {
            Some(u) if !u.is_empty() => u,
            _ => return Err(Error::Validation("Username is required".to_string())),
        };
        let email = match req.email.as_deref() {
            Some(e) if !e.is_empty() => e,
            _ => return Err(Error::Validation("Email is required".to_string())),
        };

        let by_username: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM app_user WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;
        if by_username.is_none() {
            return Err(Error::NotFound(
                "User with this username does not exist".to_string(),
            ));
        }

        let by_email: Option<Uuid> = sqlx::query_scalar("SELECT id FROM app_user WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        if by_email.is_none() {
            return Err(Error::NotFound(
                "User with this email does not exist".to_string(),
            ));
        }

        let user_id: Uuid =
            sqlx::query_scalar("SELECT id FROM app_user WHERE username = $1 AND email = $2")
                .bind(username)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?
                .ok_or_else(|| Error::NotFound("Username and email do not match".to_string()))?;

        let (new_password, re_type_password) = match (&req.new_password, &req.re_type_password) {
            (Some(new), Some(retyped)) if !new.is_empty() && !retyped.is_empty() => (new, retyped),
            _ => {
                return Err(Error::Validation(
                    "Both new and re-type passwords are required fields".to_string(),
                ))
            }
        };
        if new_password != re_type_password {
            return Err(Error::Validation("Passwords do not match".to_string()));
        }

        self.store_password(user_id, new_password).await
    }

    /// Look up a user's first name by username.
    pub async fn first_name_of(&self, username: &str) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT first_name FROM app_user WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn store_password(&self, id: Uuid, password: &str) -> Result<()> {
        let password_hash = hash_password(password)?;
        sqlx::query("UPDATE app_user SET password_hash = $1 WHERE id = $2")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_require_named_errors() {
        let req = RegisterRequest {
            username: Some("alice".to_string()),
            ..Default::default()
        };
        assert!(require(&req.username, "username").is_ok());
        match require(&req.email, "email") {
            Err(Error::Validation(msg)) => assert_eq!(msg, "email is required"),
            other => panic!("Expected Validation error, got {:?}", other.map(|_| ())),
        }
        // Empty strings count as absent.
        let empty = Some(String::new());
        assert!(require(&empty, "password").is_err());
    }
}
