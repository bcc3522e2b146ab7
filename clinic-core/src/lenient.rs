//! Serde readers for values other clients may have written loosely.

use serde::{Deserialize, Deserializer};

/// `null` where a string is expected reads as empty.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
