//! Decoding of bearer token claims.
//!
//! Only the payload segment is read; signatures are the backend's concern and
//! are never verified on the client.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a token payload cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenDecodeError {
    /// Fewer than three dot-separated segments.
    #[error("token has no signature segment")]
    MissingSignature,
    /// Payload length leaves a remainder of 1 modulo 4.
    #[error("payload length {length} is not valid base64")]
    InvalidLength {
        /// Unpadded payload length.
        length: usize,
    },
    /// Payload contains characters outside the base64url alphabet.
    #[error("payload is not valid base64: {message}")]
    InvalidBase64 {
        /// Decoder message.
        message: String,
    },
    /// Payload bytes are not UTF-8.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
    /// Payload is not a JSON object.
    #[error("payload is not a JSON object: {message}")]
    InvalidJson {
        /// Parser message.
        message: String,
    },
}

/// Claims carried in a token payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    claims: Map<String, Value>,
}

impl TokenClaims {
    /// Expiry in epoch seconds, integer or fractional.
    pub fn exp(&self) -> Option<f64> {
        self.claims.get("exp").and_then(Value::as_f64)
    }

    /// Role names when the token carries a `roles` array of strings.
    pub fn roles(&self) -> Option<Vec<String>> {
        let roles = self.claims.get("roles")?.as_array()?;
        roles
            .iter()
            .map(|role| role.as_str().map(str::to_owned))
            .collect()
    }

    /// Raw claim lookup.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}

/// Decode the payload segment of `token` into its claims.
///
/// The URL-safe alphabet is mapped onto the standard one and padding is
/// restored: a remainder of 2 gains `==`, a remainder of 3 gains `=`, and a
/// remainder of 1 is rejected.
///
/// # Examples
/// ```
/// use admin_client::domain::token::decode_claims;
///
/// // {"exp":1}
/// let claims = decode_claims("h.eyJleHAiOjF9.s").unwrap();
/// assert_eq!(claims.exp(), Some(1.0));
/// ```
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenDecodeError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature)) =
        (segments.next(), segments.next(), segments.next())
    else {
        return Err(TokenDecodeError::MissingSignature);
    };

    let mut standard: String = payload
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    match standard.len() % 4 {
        0 => {}
        2 => standard.push_str("=="),
        3 => standard.push('='),
        _ => {
            return Err(TokenDecodeError::InvalidLength {
                length: payload.len(),
            });
        }
    }

    let bytes = STANDARD
        .decode(standard.as_bytes())
        .map_err(|err| TokenDecodeError::InvalidBase64 {
            message: err.to_string(),
        })?;
    let text = String::from_utf8(bytes).map_err(|_| TokenDecodeError::InvalidUtf8)?;
    let claims: Map<String, Value> =
        serde_json::from_str(&text).map_err(|err| TokenDecodeError::InvalidJson {
            message: err.to_string(),
        })?;
    Ok(TokenClaims { claims })
}
