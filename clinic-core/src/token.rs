//! Reads claims out of a compact `header.payload.signature` bearer token.
//!
//! The signature is never checked. Claims read here only drive redirects in
//! the UI; the API validates the token on every request.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::UserProfile;

/// URL-safe alphabet, padding optional, trailing bits tolerated.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Claims relevant to session gating, plus whatever else the payload carried.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Claims {
    /// Expiry in unix seconds.
    pub exp: Option<i64>,
    pub role: Option<String>,
    pub roles: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// `role`, falling back to the first entry of `roles`.
    pub fn primary_role(&self) -> Option<&str> {
        self.role
            .as_deref()
            .or_else(|| self.roles.as_ref()?.first().map(String::as_str))
    }

    /// Fail-open: without an `exp` claim the token never counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp <= now.timestamp())
    }
}

/// Decodes the payload segment. Any malformed input yields `None`.
pub fn decode(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;

    // Accept the standard alphabet too; some issuers mix them.
    let normalized: String = payload
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = PAYLOAD_ENGINE.decode(normalized.as_bytes()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let Value::Object(mut object) = serde_json::from_str::<Value>(&text).ok()? else {
        return None;
    };

    let exp = object.remove("exp").and_then(|value| unix_seconds(&value));
    let (role, role_list) = match object.remove("role") {
        Some(Value::String(role)) => (non_empty(role), None),
        Some(Value::Array(items)) => (None, Some(string_items(&items))),
        _ => (None, None),
    };
    let roles = match object.remove("roles") {
        Some(Value::Array(items)) => Some(string_items(&items)),
        _ => role_list,
    };

    Some(Claims {
        exp,
        role,
        roles,
        extra: object,
    })
}

/// Expiry check against the current clock.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// `true` only when the token decodes and carries an `exp` at or before `now`.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    decode(token).is_some_and(|claims| claims.is_expired_at(now))
}

/// Role used for access checks: cached profile first, then token claims.
pub fn resolve_role(profile: Option<&UserProfile>, token: Option<&str>) -> Option<String> {
    if let Some(role) = profile.and_then(|user| user.role.as_deref()) {
        if !role.is_empty() {
            return Some(role.to_string());
        }
    }

    let claims = decode(token?)?;
    claims.primary_role().map(str::to_string)
}

fn unix_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|secs| secs.floor() as i64)),
        Value::String(text) => text.trim().parse::<f64>().ok().map(|secs| secs.floor() as i64),
        _ => None,
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::TimeZone;
    use serde_json::json;

    fn token_with(payload: Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    #[test]
    fn decodes_exp_and_role() {
        let token = token_with(json!({"exp": 1_700_000_000, "role": "Medico", "sub": "42"}));
        let claims = decode(&token).expect("claims");
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(claims.role.as_deref(), Some("Medico"));
        assert_eq!(claims.extra.get("sub"), Some(&json!("42")));
    }

    #[test]
    fn malformed_tokens_yield_no_claims() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("only-one-segment"), None);
        assert_eq!(decode("a.%%%.c"), None);
        let not_json = URL_SAFE_NO_PAD.encode("not json");
        assert_eq!(decode(&format!("a.{not_json}.c")), None);
        let scalar = URL_SAFE_NO_PAD.encode("5");
        assert_eq!(decode(&format!("a.{scalar}.c")), None);
    }

    #[test]
    fn accepts_padded_and_standard_alphabet_payloads() {
        let payload = json!({"exp": 10, "name": "João ~~~?"}).to_string();
        let padded = base64::engine::general_purpose::STANDARD.encode(payload);
        let claims = decode(&format!("h.{padded}.s")).expect("claims");
        assert_eq!(claims.exp, Some(10));
        assert_eq!(claims.extra.get("name"), Some(&json!("João ~~~?")));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let token = token_with(json!({"exp": 1_000}));
        assert!(is_expired_at(&token, at(1_000)));
        assert!(is_expired_at(&token, at(1_001)));
        assert!(!is_expired_at(&token, at(999)));
    }

    #[test]
    fn expiry_fails_open_without_claims() {
        let no_exp = token_with(json!({"role": "Admin"}));
        assert!(!is_expired_at(&no_exp, at(4_000_000_000)));
        assert!(!is_expired_at("garbage", at(0)));
        assert!(!is_expired("garbage"));
    }

    #[test]
    fn fractional_and_string_exp_are_floored() {
        let token = token_with(json!({"exp": 100.9}));
        assert_eq!(decode(&token).and_then(|c| c.exp), Some(100));
        let token = token_with(json!({"exp": "250"}));
        assert_eq!(decode(&token).and_then(|c| c.exp), Some(250));
    }

    #[test]
    fn role_resolution_prefers_profile() {
        let token = token_with(json!({"role": "Medico"}));
        let profile = UserProfile {
            role: Some("Admin".to_string()),
            ..UserProfile::default()
        };
        assert_eq!(
            resolve_role(Some(&profile), Some(&token)).as_deref(),
            Some("Admin")
        );
    }

    #[test]
    fn role_resolution_falls_back_through_claims() {
        let singular = token_with(json!({"role": "Medico", "roles": ["Admin"]}));
        assert_eq!(resolve_role(None, Some(&singular)).as_deref(), Some("Medico"));

        let list = token_with(json!({"roles": ["Recepcao", "Admin"]}));
        assert_eq!(resolve_role(None, Some(&list)).as_deref(), Some("Recepcao"));

        let array_role = token_with(json!({"role": ["Admin", "Medico"]}));
        assert_eq!(resolve_role(None, Some(&array_role)).as_deref(), Some("Admin"));

        let empty_profile = UserProfile {
            role: Some(String::new()),
            ..UserProfile::default()
        };
        assert_eq!(
            resolve_role(Some(&empty_profile), Some(&list)).as_deref(),
            Some("Recepcao")
        );
    }

    #[test]
    fn role_resolution_without_sources_is_none() {
        assert_eq!(resolve_role(None, None), None);
        assert_eq!(resolve_role(None, Some("garbage")), None);
        let empty = token_with(json!({"roles": []}));
        assert_eq!(resolve_role(None, Some(&empty)), None);
    }
}
