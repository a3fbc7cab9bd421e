//! # User Management
//!
//! User model and repository. Login and signup live in the HTTP layer;
//! this module only knows how to store and look users up.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::crypto::{hash_password, verify_password};
use super::errors::AuthResult;
use super::principal::Role;
use crate::storage::{StorageError, StorageResult};

/// User model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    /// Unique, stored lowercased
    pub email: String,

    pub role: Role,

    /// Argon2id password hash (never plaintext)
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Verify a password against this user's stored hash
    pub fn verify_password(&self, password: &str) -> AuthResult<bool> {
        verify_password(password, &self.password_hash)
    }
}

/// Validated signup payload
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Validated login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Validated update payload; a new password arrives in plaintext
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Storage-level user changes (password already hashed)
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl UserPatch {
    /// Hash the plaintext password, if one was supplied
    pub fn from_request(req: UpdateUserRequest) -> AuthResult<Self> {
        let password_hash = req.password.as_deref().map(hash_password).transpose()?;
        Ok(Self {
            email: req.email,
            password_hash,
            role: req.role,
        })
    }
}

/// User repository trait
///
/// Abstracts storage operations for users.
pub trait UserRepository: Send + Sync {
    fn find_by_id(&self, id: i64) -> StorageResult<Option<User>>;

    fn find_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    /// Fails with `Conflict` when the email is taken
    fn create(&self, email: String, password_hash: String, role: Role) -> StorageResult<User>;

    fn update(&self, id: i64, patch: UserPatch) -> StorageResult<User>;

    fn delete(&self, id: i64) -> StorageResult<()>;
}

/// In-memory user repository
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_id(&self, id: i64) -> StorageResult<Option<User>> {
        let users = self.users.read().map_err(|_| StorageError::poisoned())?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let users = self.users.read().map_err(|_| StorageError::poisoned())?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    fn create(&self, email: String, password_hash: String, role: Role) -> StorageResult<User> {
        let mut users = self.users.write().map_err(|_| StorageError::poisoned())?;

        if users.iter().any(|u| u.email == email) {
            return Err(StorageError::Conflict("Email already registered".to_string()));
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email,
            role,
            password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    fn update(&self, id: i64, patch: UserPatch) -> StorageResult<User> {
        let mut users = self.users.write().map_err(|_| StorageError::poisoned())?;

        if let Some(email) = &patch.email {
            if users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(StorageError::Conflict("Email already registered".to_string()));
            }
        }

        let existing = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StorageError::not_found("User", id))?;

        if let Some(email) = patch.email {
            existing.email = email;
        }
        if let Some(hash) = patch.password_hash {
            existing.password_hash = hash;
        }
        if let Some(role) = patch.role {
            existing.role = role;
        }
        Ok(existing.clone())
    }

    fn delete(&self, id: i64) -> StorageResult<()> {
        let mut users = self.users.write().map_err(|_| StorageError::poisoned())?;

        let len_before = users.len();
        users.retain(|u| u.id != id);

        if users.len() == len_before {
            Err(StorageError::not_found("User", id))
        } else {
            Ok(())
        }
    }
}
