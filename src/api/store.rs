//! In-memory user store.
//!
//! All shared state lives in one struct behind a single `tokio::sync::RwLock`,
//! so every operation is one atomic read-modify-write; there is no finer
//! locking and no persistence. Handlers receive a cloned [`UserStore`] handle
//! via `Extension`.

use chrono::Utc;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use utoipa::ToSchema;

const DEFAULT_ROLE: &str = "client";

/// A stored user record, serialized as-is in API responses.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub created_at: String,
}

/// Outcome of a create-user call.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(User),
    DuplicateEmail,
}

#[derive(Debug, Default)]
struct Maps {
    /// user id -> record
    users: HashMap<String, User>,
    /// email -> plaintext password (demo service, nothing is hashed)
    credentials: HashMap<String, SecretString>,
    /// email -> pending six-digit code, consumed on successful verification
    verification_codes: HashMap<String, String>,
}

/// Shared handle to the in-memory maps.
#[derive(Clone, Debug, Default)]
pub struct UserStore {
    inner: Arc<RwLock<Maps>>,
}

impl UserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the fixture account used by demo clients.
    pub async fn seed_test_user(&self) {
        let user = User {
            id: "test123".to_string(),
            email: "test@example.com".to_string(),
            display_name: "Test User".to_string(),
            role: DEFAULT_ROLE.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let mut maps = self.inner.write().await;
        maps.credentials.insert(
            user.email.clone(),
            SecretString::from("password123".to_string()),
        );

        info!(
            email = %user.email,
            password = "password123",
            "Seeded test user"
        );

        maps.users.insert(user.id.clone(), user);
    }

    /// Create a user plus its credential entry.
    ///
    /// Email uniqueness is checked here, at creation time only, by scanning
    /// the existing records. An empty or absent role falls back to `client`.
    pub async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        role: Option<&str>,
        password: &str,
    ) -> CreateOutcome {
        let mut maps = self.inner.write().await;

        if maps.users.values().any(|user| user.email == email) {
            return CreateOutcome::DuplicateEmail;
        }

        let role = match role {
            Some(role) if !role.is_empty() => role.to_string(),
            _ => DEFAULT_ROLE.to_string(),
        };

        let user = User {
            id: generate_user_id(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            role,
            created_at: Utc::now().to_rfc3339(),
        };

        maps.credentials
            .insert(email.to_string(), SecretString::from(password.to_string()));
        maps.users.insert(user.id.clone(), user.clone());

        CreateOutcome::Created(user)
    }

    /// Check credentials and, on success, generate a fresh verification code
    /// for the email, replacing any pending one.
    ///
    /// The returned user is the first record matching the email. A credential
    /// can outlive its user record (delete does not clean it up), in which
    /// case the returned record is empty, matching the historical behavior.
    pub async fn login(&self, email: &str, password: &str) -> Option<(User, String)> {
        let mut maps = self.inner.write().await;

        let stored = maps.credentials.get(email)?;
        if stored.expose_secret() != password {
            return None;
        }

        let user = maps
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
            .unwrap_or_default();

        let code = generate_verification_code();
        maps.verification_codes
            .insert(email.to_string(), code.clone());

        Some((user, code))
    }

    /// Compare the submitted code against the pending one for the email.
    ///
    /// A match deletes the pending code (one-time use). A mismatch leaves it
    /// in place so the client can retry.
    pub async fn consume_verification_code(&self, email: &str, code: &str) -> bool {
        let mut maps = self.inner.write().await;

        if maps
            .verification_codes
            .get(email)
            .is_some_and(|pending| pending == code)
        {
            maps.verification_codes.remove(email);
            true
        } else {
            false
        }
    }

    /// Pending code for an email, if any. Mirrors the logged side channel so
    /// test drivers can complete the verify flow without scraping logs.
    pub async fn pending_verification_code(&self, email: &str) -> Option<String> {
        let maps = self.inner.read().await;
        maps.verification_codes.get(email).cloned()
    }

    pub async fn lookup_user(&self, id: &str) -> Option<User> {
        let maps = self.inner.read().await;
        maps.users.get(id).cloned()
    }

    /// All records, in the map's own enumeration order.
    pub async fn list_users(&self) -> Vec<User> {
        let maps = self.inner.read().await;
        maps.users.values().cloned().collect()
    }

    /// Apply the recognized fields of an untyped patch to a user.
    ///
    /// Only a string-typed `display_name` is applied; anything else in the
    /// patch is ignored. Returns the updated record, or `None` for an
    /// unknown id.
    pub async fn update_user(
        &self,
        id: &str,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> Option<User> {
        let mut maps = self.inner.write().await;
        let user = maps.users.get_mut(id)?;

        if let Some(serde_json::Value::String(display_name)) = patch.get("display_name") {
            user.display_name = display_name.clone();
        }

        Some(user.clone())
    }

    /// Remove the user record only. Credential and pending-code entries for
    /// the email stay behind.
    pub async fn delete_user(&self, id: &str) -> bool {
        let mut maps = self.inner.write().await;
        maps.users.remove(id).is_some()
    }
}

/// Random `user_<n>` identifier, no collision check against existing ids.
fn generate_user_id() -> String {
    format!("user_{}", rand::thread_rng().gen_range(0..100_000))
}

/// Six ASCII digits, zero-padded.
fn generate_verification_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}
