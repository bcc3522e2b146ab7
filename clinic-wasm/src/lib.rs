//! Framework-neutral WASM <-> JavaScript bridge for session gating.
//!
//! JS callers pass an optional partial config; missing fields fall back to
//! [`ClinicConfig::default`].

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserNavigator, BrowserStorage};

use std::rc::Rc;

use clinic_core::{
    navigate, ClinicConfig, GuardDecision, MissingTokenPolicy, Navigation,
    RouteGuard, RouteTable, SessionStore, Storage,
};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
struct JsClinicConfig {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    login_path: Option<String>,
    #[serde(default)]
    home_path: Option<String>,
    #[serde(default)]
    token_key: Option<String>,
    #[serde(default)]
    user_key: Option<String>,
    #[serde(default)]
    allow_missing_token: Option<bool>,
}

impl From<JsClinicConfig> for ClinicConfig {
    fn from(cfg: JsClinicConfig) -> Self {
        let mut base = ClinicConfig::default();
        if let Some(url) = cfg.api_base_url {
            base.api_base_url = url;
        }
        if let Some(secs) = cfg.request_timeout_secs {
            base.request_timeout_secs = secs;
        }
        if let Some(path) = cfg.login_path {
            base.login_path = path;
        }
        if let Some(path) = cfg.home_path {
            base.home_path = path;
        }
        if let Some(key) = cfg.token_key {
            base.token_key = key;
        }
        if let Some(key) = cfg.user_key {
            base.user_key = key;
        }
        if let Some(allow) = cfg.allow_missing_token {
            base.missing_token = if allow {
                MissingTokenPolicy::AllowWithWarning
            } else {
                MissingTokenPolicy::Redirect
            };
        }
        base
    }
}

/// Reads an optional JS config object.
pub fn config_from_js(config: Option<JsValue>) -> Result<ClinicConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsClinicConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            Ok(ClinicConfig::from(cfg))
        }
        _ => Ok(ClinicConfig::default()),
    }
}

/// Guard decision for `path` over whatever `storage` holds.
pub fn guard_decision<S: Storage>(
    storage: S,
    config: &ClinicConfig,
    path: &str,
    required_roles: &[String],
) -> GuardDecision {
    let guard = RouteGuard::new(Rc::new(SessionStore::new(storage, config)), config);
    guard.evaluate(path, required_roles)
}

/// Full navigation outcome for `path` against the built-in route table.
pub fn route_navigation<S: Storage>(storage: S, config: &ClinicConfig, path: &str) -> Navigation {
    let guard = RouteGuard::new(Rc::new(SessionStore::new(storage, config)), config);
    navigate(&RouteTable::default(), &guard, config, path)
}

/// Routes Rust panics to `console.error`. Safe to call repeatedly.
#[wasm_bindgen]
pub fn install_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Claims of `token`, or `null` when it cannot be decoded.
#[wasm_bindgen]
pub fn decode_token(token: &str) -> Result<JsValue, JsValue> {
    install_panic_hook();
    to_value(&clinic_core::decode(token))
        .map_err(|err| JsValue::from_str(&format!("Could not serialize claims: {err}")))
}

#[wasm_bindgen]
pub fn is_token_expired(token: &str) -> bool {
    clinic_core::is_expired(token)
}

/// Route match for `path` (`null` when unknown). Does not consult the session.
#[wasm_bindgen]
pub fn resolve_route(path: &str) -> Result<JsValue, JsValue> {
    to_value(&RouteTable::default().resolve(path))
        .map_err(|err| JsValue::from_str(&format!("Could not serialize route: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::{MemoryStorage, UserProfile};

    #[test]
    fn partial_js_config_merges_onto_defaults() {
        let cfg = JsClinicConfig {
            api_base_url: Some("https://api.clinic.test".to_string()),
            allow_missing_token: Some(true),
            ..JsClinicConfig::default()
        };
        let config = ClinicConfig::from(cfg);
        assert_eq!(config.api_base_url, "https://api.clinic.test");
        assert_eq!(config.missing_token, MissingTokenPolicy::AllowWithWarning);
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.token_key, "auth_token");
    }

    #[test]
    fn guard_decision_reads_from_given_storage() {
        let config = ClinicConfig::default();
        let storage = MemoryStorage::new();
        assert_eq!(
            guard_decision(&storage, &config, "/agenda", &[]),
            GuardDecision::RedirectLogin {
                from: "/agenda".to_string()
            }
        );

        SessionStore::new(&storage, &config)
            .save(
                "opaque-token",
                &UserProfile {
                    role: Some("Recepcao".to_string()),
                    ..UserProfile::default()
                },
            )
            .expect("save session");
        assert_eq!(
            guard_decision(&storage, &config, "/agenda", &[]),
            GuardDecision::Allow
        );
        assert_eq!(
            guard_decision(&storage, &config, "/usuarios/novo", &["Admin".to_string()]),
            GuardDecision::RedirectHome
        );
    }

    #[test]
    fn route_navigation_renders_public_login() {
        let outcome = route_navigation(MemoryStorage::new(), &ClinicConfig::default(), "/login");
        assert!(matches!(outcome, Navigation::Render(_)));
    }
}
