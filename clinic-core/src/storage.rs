//! Key/value persistence seam, shaped after the browser `localStorage` API.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::ClinicError;

/// Synchronous string key/value storage.
///
/// Browser storage throws on quota or privacy-mode failures, so every call is
/// fallible even though the in-memory implementation never fails.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClinicError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), ClinicError>;
    fn remove_item(&self, key: &str) -> Result<(), ClinicError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClinicError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClinicError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), ClinicError> {
        (**self).remove_item(key)
    }
}

/// In-process storage used by tests and native tools.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClinicError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClinicError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ClinicError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
