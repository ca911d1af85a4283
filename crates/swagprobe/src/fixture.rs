//! Credential fixtures.
//!
//! A flat, immutable mapping from logical user keys (`standard`, `locked`,
//! `invalid`, ...) to username/password pairs. The store is built once at
//! startup and shared read-only (behind an `Arc`) by every scenario.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Credential fixture shipped with the crate
pub const DEFAULT_USERS_JSON: &str = include_str!("../fixtures/users.json");

/// One logical user of the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCredential {
    /// Fixture key
    pub key: String,
    /// Login name
    pub username: String,
    /// Password
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct RawCredential {
    username: String,
    password: String,
}

/// Read-only credential store
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: BTreeMap<String, UserCredential>,
}

impl CredentialStore {
    /// Parse a store from its JSON form: `{ "<key>": { "username", "password" } }`
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` if the JSON is malformed or a key is empty
    pub fn from_json(json: &str) -> ProbeResult<Self> {
        let raw: BTreeMap<String, RawCredential> =
            serde_json::from_str(json).map_err(|e| ProbeError::FixtureError {
                message: e.to_string(),
            })?;

        let mut users = BTreeMap::new();
        for (key, cred) in raw {
            if key.trim().is_empty() {
                return Err(ProbeError::FixtureError {
                    message: "credential key must not be empty".to_string(),
                });
            }
            let _ = users.insert(
                key.clone(),
                UserCredential {
                    key,
                    username: cred.username,
                    password: cred.password,
                },
            );
        }
        Ok(Self { users })
    }

    /// Load a store from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or `FixtureError` if it is malformed
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), users = store.len(), "loaded credential fixtures");
        Ok(store)
    }

    /// The embedded default fixture
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` if the embedded fixture is malformed
    pub fn builtin() -> ProbeResult<Self> {
        Self::from_json(DEFAULT_USERS_JSON)
    }

    /// Look up a user by key
    ///
    /// # Errors
    ///
    /// Returns `CredentialNotFound` if the key is absent
    pub fn get_user(&self, key: &str) -> ProbeResult<&UserCredential> {
        self.users
            .get(key)
            .ok_or_else(|| ProbeError::CredentialNotFound {
                key: key.to_string(),
            })
    }

    /// Registered keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    /// All users in key order
    pub fn users(&self) -> impl Iterator<Item = &UserCredential> {
        self.users.values()
    }

    /// Number of users
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
