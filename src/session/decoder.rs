use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Claims read out of an access token. Only `exp` is required.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Expiry, seconds since the epoch. Fractional values are truncated.
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub jti: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<Value>,
    /// Any additional claim fields we don't explicitly model.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// A NumericDate may be written as an integer or a float.
fn numeric_date<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumericDate {
        Int(i64),
        Float(f64),
    }

    match NumericDate::deserialize(deserializer)? {
        NumericDate::Int(seconds) => Ok(seconds),
        NumericDate::Float(seconds) if seconds.is_finite() => Ok(seconds.trunc() as i64),
        NumericDate::Float(_) => Err(D::Error::custom("exp is not a finite number")),
    }
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Error)]
#[error("malformed access token: {0}")]
pub struct DecodeError(#[from] jsonwebtoken::errors::Error);

/// Decodes a token's claims without verifying its signature.
///
/// Fails on a wrong segment count, bad base64, non-JSON parts, an unknown
/// header algorithm, or a missing/non-numeric `exp`.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    // Expiry is judged by `is_expired` against the caller's clock, without leeway.
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/// `exp * 1000 < now_ms`: a token expiring exactly now is still valid.
pub fn is_expired(claims: &Claims, now_ms: i64) -> bool {
    claims.exp.saturating_mul(1000) < now_ms
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
