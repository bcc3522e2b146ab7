//! `window.localStorage` and `window.location` behind the core seams.

use clinic_api::Navigator;
use clinic_core::{ClinicError, Storage};
use wasm_bindgen::prelude::*;

use crate::{
    config_from_js, guard_decision, install_panic_hook, route_navigation,
};

pub struct BrowserStorage {
    inner: web_sys::Storage,
}

impl BrowserStorage {
    pub fn local() -> Result<Self, ClinicError> {
        let window = web_sys::window()
            .ok_or_else(|| ClinicError::Storage("no window".to_string()))?;
        let inner = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| ClinicError::Storage("localStorage unavailable".to_string()))?;
        Ok(Self { inner })
    }
}

impl Storage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClinicError> {
        self.inner.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClinicError> {
        self.inner.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> Result<(), ClinicError> {
        self.inner.remove_item(key).map_err(js_error)
    }
}

fn js_error(err: JsValue) -> ClinicError {
    ClinicError::Storage(format!("{err:?}"))
}

fn format_clinic_error(err: ClinicError) -> JsValue {
    JsValue::from_str(&format!("Clinic error: {err}"))
}

/// Hard navigation through `location.href`, which reloads the app on the
/// target path.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn current_path(&self) -> String {
        web_sys::window()
            .and_then(|window| window.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string())
    }

    fn redirect(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.location().set_href(path) {
            tracing::warn!(?err, path, "redirect failed");
        }
    }
}

/// Guard decision for `path` with `required_roles` (array of strings or
/// `undefined`) against `localStorage`.
#[wasm_bindgen]
pub fn evaluate_guard(
    path: &str,
    required_roles: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let config = config_from_js(config)?;
    let roles: Vec<String> = if required_roles.is_undefined() || required_roles.is_null() {
        Vec::new()
    } else {
        serde_wasm_bindgen::from_value(required_roles)
            .map_err(|err| JsValue::from_str(&format!("Could not read roles: {err}")))?
    };
    let storage = BrowserStorage::local().map_err(format_clinic_error)?;
    let decision = guard_decision(storage, &config, path, &roles);

    serde_wasm_bindgen::to_value(&decision)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize decision: {err}")))
}

/// Navigation outcome for `path` against the built-in route table.
#[wasm_bindgen]
pub fn evaluate_route(path: &str, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let config = config_from_js(config)?;
    let storage = BrowserStorage::local().map_err(format_clinic_error)?;
    let outcome = route_navigation(storage, &config, path);

    serde_wasm_bindgen::to_value(&outcome)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize navigation: {err}")))
}

/// Removes the stored token and profile.
#[wasm_bindgen]
pub fn clear_session(config: Option<JsValue>) -> Result<(), JsValue> {
    let config = config_from_js(config)?;
    let storage = BrowserStorage::local().map_err(format_clinic_error)?;
    clinic_core::SessionStore::new(storage, &config).clear();
    Ok(())
}
