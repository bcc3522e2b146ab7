use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clinic_core::{ClinicError, Storage};

/// Key/value session storage kept as a flat JSON object on disk. A missing
/// or empty file reads as empty storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, ClinicError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(ClinicError::Storage(format!(
                "cannot read {}: {err}",
                self.path.display()
            ))),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), ClinicError> {
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, text).map_err(|err| {
            ClinicError::Storage(format!("cannot write {}: {err}", self.path.display()))
        })
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClinicError> {
        Ok(self.read()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClinicError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove_item(&self, key: &str) -> Result<(), ClinicError> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}
