//! Response normalization at the client boundary.
//!
//! The API has served the same payloads with PascalCase and camelCase keys,
//! and doctors with either `nome` or `fullName`. Every response passes through
//! [`ResponseSchema::normalize`] once; models only ever see the canonical shape.

use clinic_core::ClinicError;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::dates;

/// Revision of the response contract the client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    #[default]
    V1,
}

/// Payload kinds with their own alias rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Login,
    CurrentUser,
    Patient,
    Doctor,
    Appointment,
    MedicalRecord,
    FinancialEntry,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseSchema {
    version: SchemaVersion,
}

impl ResponseSchema {
    pub const fn new(version: SchemaVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Canonical shape: camelCase keys everywhere, then per-resource aliases
    /// folded into their canonical field on each top-level record.
    pub fn normalize(&self, resource: Resource, value: Value) -> Value {
        match camel_case_keys(value) {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.fold_aliases(resource, item))
                    .collect(),
            ),
            other => self.fold_aliases(resource, other),
        }
    }

    /// Decodes a single record. An empty or `null` body is missing data.
    pub fn decode<D: DeserializeOwned>(
        &self,
        resource: Resource,
        body: &[u8],
    ) -> Result<D, ClinicError> {
        let value = self.parse(resource, body)?;
        if value.is_null() {
            return Err(ClinicError::MissingData);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Decodes a list. An empty or `null` body is an empty list.
    pub fn decode_list<D: DeserializeOwned>(
        &self,
        resource: Resource,
        body: &[u8],
    ) -> Result<Vec<D>, ClinicError> {
        match self.parse(resource, body)? {
            Value::Null => Ok(Vec::new()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    fn parse(&self, resource: Resource, body: &[u8]) -> Result<Value, ClinicError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_slice(body)?;
        Ok(self.normalize(resource, value))
    }

    /// `(alias, canonical)` pairs for a resource.
    fn aliases(&self, resource: Resource) -> &'static [(&'static str, &'static str)] {
        match (self.version, resource) {
            (SchemaVersion::V1, Resource::Doctor) => &[("fullName", "nome")],
            (SchemaVersion::V1, Resource::Appointment) => {
                &[("paciente", "pacienteNome"), ("medico", "medicoNome")]
            }
            (SchemaVersion::V1, Resource::CurrentUser) => &[("fullName", "name")],
            _ => &[],
        }
    }

    fn fold_aliases(&self, resource: Resource, value: Value) -> Value {
        let Value::Object(mut object) = value else {
            return value;
        };

        for (alias, canonical) in self.aliases(resource) {
            if !is_blank(object.get(*canonical)) {
                continue;
            }
            if let Some(aliased) = object.remove(*alias) {
                if !aliased.is_null() {
                    object.insert((*canonical).to_string(), aliased);
                }
            }
        }
        Value::Object(object)
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        _ => false,
    }
}

/// Recursively rewrites object keys to camelCase. A key already in camelCase
/// wins over a PascalCase duplicate.
pub fn camel_case_keys(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut out = Map::with_capacity(object.len());
            for (key, value) in object {
                let camel = camel_case(&key);
                if camel == key || !out.contains_key(&camel) {
                    out.insert(camel, camel_case_keys(value));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(camel_case_keys).collect()),
        other => other,
    }
}

/// `Valor` → `valor`, `PacienteNome` → `pacienteNome`, `CPF` → `cpf`,
/// `URLValue` → `urlValue`.
pub fn camel_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len());
    let mut lowering = true;

    for (index, c) in chars.iter().enumerate() {
        if lowering {
            let next_is_upper = chars.get(index + 1).map_or(true, |next| next.is_uppercase());
            if index == 0 || (c.is_uppercase() && next_is_upper) {
                out.extend(c.to_lowercase());
                continue;
            }
            lowering = false;
        }
        out.push(*c);
    }
    out
}

/// Lenient field readers for normalized payloads.
pub(crate) mod lenient {
    use super::*;
    use chrono::{DateTime, Utc};

    pub use clinic_core::lenient::text;

    /// Identifiers arrive as numbers or strings; both become strings.
    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(opt_id(deserializer)?.unwrap_or_default())
    }

    pub fn opt_id<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text)),
            Some(Value::Number(number)) => Ok(Some(number.to_string())),
            Some(other) => Err(de::Error::custom(format!("unexpected identifier {other}"))),
        }
    }

    pub fn opt_datetime<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?
            .as_ref()
            .and_then(Value::as_str)
            .and_then(dates::parse_datetime))
    }

    /// Money: number or numeric string; anything else is zero.
    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(number)) => number.as_f64().unwrap_or_default(),
            Some(Value::String(text)) => text.trim().replace(',', ".").parse().unwrap_or_default(),
            _ => 0.0,
        })
    }

    /// `null` where a list is expected reads as empty.
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }
}
