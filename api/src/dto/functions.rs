//! Bodies of the `/functions/v1` endpoints
//!
//! Request fields are read leniently: a field that is absent, `null` or not
//! a string reads as empty and is then rejected by validation, the same as
//! an empty string.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use pf_core::services::verification::IssuedCode;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GenerateCodeRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1))]
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateCodeResponse {
    pub phone_number: String,
    pub security_code: String,
}

impl From<IssuedCode> for GenerateCodeResponse {
    fn from(issued: IssuedCode) -> Self {
        Self {
            phone_number: issued.phone_number,
            security_code: issued.security_code,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1))]
    pub phone_number: String,

    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1))]
    pub code: String,
}

/// Parse a request body into `T`
///
/// Only malformed JSON is an error. Well-formed JSON that is not an object
/// yields `T::default()`.
pub fn parse_body<T>(body: &[u8]) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}
