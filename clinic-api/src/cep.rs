//! Brazilian postal code (CEP) lookup through the public ViaCEP service.
//!
//! This talks to a third party, so it goes straight through a transport and
//! never carries the clinic bearer token. Point an
//! `HttpTransport::with_base_url` at [`VIACEP_BASE_URL`] for real lookups.

use clinic_core::ClinicError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::{ApiRequest, Transport};

pub const VIACEP_BASE_URL: &str = "https://viacep.com.br";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub complement: String,
}

/// Keeps only digits; `Some` when exactly eight remain.
pub fn clean_cep(cep: &str) -> Option<String> {
    let digits: String = cep.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == 8).then_some(digits)
}

/// Looks up an address. Malformed or unknown codes give `Ok(None)`.
pub async fn lookup_address<T: Transport>(
    transport: &T,
    cep: &str,
) -> Result<Option<Address>, ClinicError> {
    let Some(cep) = clean_cep(cep) else {
        return Ok(None);
    };

    let response = transport
        .send(ApiRequest::get(format!("/ws/{cep}/json/")))
        .await?;
    if !response.is_success() {
        return Err(ClinicError::Http {
            status: response.status,
            body: response.text(),
        });
    }

    let value: Value = serde_json::from_slice(&response.body)?;
    if is_error_flag(value.get("erro")) {
        return Ok(None);
    }

    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Ok(Some(Address {
        street: field("logradouro"),
        district: field("bairro"),
        city: field("localidade"),
        state: field("uf"),
        complement: field("complemento"),
    }))
}

/// ViaCEP has answered both `"erro": true` and `"erro": "true"`.
fn is_error_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text == "true",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_cep_requires_eight_digits() {
        assert_eq!(clean_cep("01310-100").as_deref(), Some("01310100"));
        assert_eq!(clean_cep(" 01.310-100 ").as_deref(), Some("01310100"));
        assert_eq!(clean_cep("1234"), None);
        assert_eq!(clean_cep("013101000"), None);
    }
}
