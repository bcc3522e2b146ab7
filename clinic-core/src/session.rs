//! Persisted session: the bearer token plus a denormalized user profile.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{lenient, token, ClinicConfig, ClinicError, Storage};

/// Profile cached at login for display and role checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient::text")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiry as reported by the login endpoint, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Snapshot of what storage currently holds. Either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Role used for access checks; see [`token::resolve_role`].
    pub fn role(&self) -> Option<String> {
        token::resolve_role(self.user.as_ref(), self.token.as_deref())
    }
}

/// Reads and writes the session through a [`Storage`] backend.
///
/// Reads never fail: unreadable or malformed entries are logged and reported
/// as absent.
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    token_key: String,
    user_key: String,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S, config: &ClinicConfig) -> Self {
        Self {
            storage,
            token_key: config.token_key.clone(),
            user_key: config.user_key.clone(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stores the token and profile together.
    pub fn save(&self, token: &str, profile: &UserProfile) -> Result<(), ClinicError> {
        let profile_json = serde_json::to_string(profile)?;
        self.storage.set_item(&self.token_key, token)?;
        self.storage.set_item(&self.user_key, &profile_json)?;
        debug!(email = %profile.email, "session saved");
        Ok(())
    }

    pub fn load(&self) -> Session {
        Session {
            token: self.token(),
            user: self.profile(),
        }
    }

    /// Stored bearer token. An empty string counts as absent.
    pub fn token(&self) -> Option<String> {
        match self.storage.get_item(&self.token_key) {
            Ok(value) => value.filter(|token| !token.is_empty()),
            Err(err) => {
                warn!(error = %err, "could not read session token");
                None
            }
        }
    }

    /// Stored profile; malformed JSON is treated as no profile.
    pub fn profile(&self) -> Option<UserProfile> {
        let raw = match self.storage.get_item(&self.user_key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(err) => {
                warn!(error = %err, "could not read session profile");
                return None;
            }
        };

        match serde_json::from_str::<Option<UserProfile>>(&raw) {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err, "ignoring malformed session profile");
                None
            }
        }
    }

    /// Removes both entries. Storage failures are logged, not returned.
    pub fn clear(&self) {
        for key in [&self.token_key, &self.user_key] {
            if let Err(err) = self.storage.remove_item(key) {
                warn!(key = %key, error = %err, "could not remove session entry");
            }
        }
        debug!("session cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn resolve_role(&self) -> Option<String> {
        self.load().role()
    }
}
