use serde::{Deserialize, Serialize};

/// Runtime settings shared by the guard, the session store and the API client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicConfig {
    /// Base URL of the clinic REST API, e.g. `https://localhost:5282/api`.
    pub api_base_url: String,
    /// Per-request timeout (seconds). Ignored on wasm, where fetch has no timeout.
    pub request_timeout_secs: u64,
    /// Public login view.
    pub login_path: String,
    /// Landing view for users who fail a role check.
    pub home_path: String,
    /// Storage key holding the raw bearer token.
    pub token_key: String,
    /// Storage key holding the JSON user profile.
    pub user_key: String,
    /// What the guard does when no token is stored.
    pub missing_token: MissingTokenPolicy,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5282/api".to_string(),
            request_timeout_secs: 15,
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
            token_key: "auth_token".to_string(),
            user_key: "auth_user".to_string(),
            missing_token: MissingTokenPolicy::Redirect,
        }
    }
}

/// Guard behavior for a navigation without a stored token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingTokenPolicy {
    /// Send the user to the login view, remembering the requested path.
    #[default]
    Redirect,
    /// Log a warning and keep evaluating. Only meant for local testing against
    /// an API that does not require authentication.
    AllowWithWarning,
}

impl ClinicConfig {
    /// Joins `path` onto the API base URL without doubling slashes.
    pub fn api_url(&self, path: &str) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        if path.is_empty() {
            return base.to_string();
        }
        format!("{base}/{}", path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_without_duplicate_slashes() {
        let config = ClinicConfig {
            api_base_url: "https://clinic.test/api/".to_string(),
            ..ClinicConfig::default()
        };
        assert_eq!(
            config.api_url("/pacientes"),
            "https://clinic.test/api/pacientes"
        );
        assert_eq!(config.api_url("ping"), "https://clinic.test/api/ping");
        assert_eq!(config.api_url(""), "https://clinic.test/api");
    }

    #[test]
    fn defaults_use_browser_storage_keys() {
        let config = ClinicConfig::default();
        assert_eq!(config.token_key, "auth_token");
        assert_eq!(config.user_key, "auth_user");
        assert_eq!(config.missing_token, MissingTokenPolicy::Redirect);
    }
}
