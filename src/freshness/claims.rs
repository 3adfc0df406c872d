use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::{Map, Value};
use tracing::debug;

/// Expiry claimed by a token, or the lack of one.
///
/// The signature is never checked, the claim is taken at face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claims {
    /// `exp`, in seconds since the epoch
    Present(i64),
    Absent,
}

impl Claims {
    /// Reads the `exp` claim from the payload segment of a dot separated token.
    ///
    /// Any structural, base64 or JSON problem yields [`Claims::Absent`].
    pub fn parse(token: &str) -> Self {
        let Some(payload) = token.split('.').nth(1) else {
            debug!("token has no payload segment");
            return Claims::Absent;
        };

        let decoded = match decode_segment(payload) {
            Some(bytes) => bytes,
            None => {
                debug!("token payload is not base64");
                return Claims::Absent;
            }
        };

        // payload must be a JSON object, arrays and scalars carry no claims
        match serde_json::from_slice::<Map<String, Value>>(&decoded) {
            Ok(payload) => match payload.get("exp").and_then(Value::as_i64) {
                Some(exp) => Claims::Present(exp),
                None => {
                    debug!("token payload has no integer exp claim");
                    Claims::Absent
                }
            },
            Err(e) => {
                debug!("invalid token payload: {}", e);
                Claims::Absent
            }
        }
    }

    pub fn expire_at(&self) -> Option<i64> {
        match self {
            Claims::Present(exp) => Some(*exp),
            Claims::Absent => None,
        }
    }
}

/// Drops a leading scheme label ("bearer abc" -> "abc").
pub fn strip_scheme(token: &str) -> &str {
    token
        .split_once(' ')
        .map(|(_, rest)| rest)
        .unwrap_or(token)
}

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    STANDARD_NO_PAD
        .decode(segment)
        .or_else(|_| URL_SAFE_NO_PAD.decode(segment))
        .ok()
}
