//! Cursor codec: a [`CursorKey`] to and from an opaque token.
//!
//! Wire format (v1): the JSON envelope `{"k":[[kind, canonical], ...],"v":1}`,
//! base64url-encoded without padding. Each key component carries its type
//! marker, so decoding restores the exact kind and value. The format is an
//! internal detail; tokens are not meant to outlive an incompatible release.

use serde::Deserialize;

use crate::errors::CursorError;
use crate::order::SortSpec;
use crate::value::{Value, ValueKind};

const VERSION: u8 = 1;

/// Sort-key tuple of one row, in the same order as the [`SortSpec`] it was taken with.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorKey(Vec<Value>);

impl CursorKey {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    /// Check each component against the expected kind at the same position.
    /// `None` entries, and positions past the end of `expected`, are not checked.
    ///
    /// # Errors
    /// Returns `CursorError::KindMismatch` for the first component of another kind.
    pub fn check_kinds(&self, expected: &[Option<ValueKind>]) -> Result<(), CursorError> {
        for (index, (value, want)) in self.0.iter().zip(expected).enumerate() {
            if let Some(want) = *want
                && value.kind() != want
            {
                return Err(CursorError::KindMismatch {
                    index,
                    expected: want,
                    got: value.kind(),
                });
            }
        }
        Ok(())
    }

    /// Shorthand for [`encode`].
    #[must_use]
    pub fn encode(&self) -> String {
        encode(self)
    }
}

impl From<Vec<Value>> for CursorKey {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for CursorKey {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Encode a key into an opaque cursor. Deterministic and injective.
#[must_use]
pub fn encode(key: &CursorKey) -> String {
    let parts: Vec<serde_json::Value> = key
        .0
        .iter()
        .map(|v| serde_json::json!([v.kind().as_str(), v.to_canonical()]))
        .collect();
    let envelope = serde_json::json!({ "v": VERSION, "k": parts });
    base64_url::encode(envelope.to_string().as_bytes())
}

/// Decode a cursor produced by [`encode`].
///
/// # Errors
/// Returns a [`CursorError`] describing why the token is not a valid v1 cursor.
pub fn decode(token: &str) -> Result<CursorKey, CursorError> {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Envelope {
        v: u8,
        k: serde_json::Value,
    }

    let bytes = base64_url::decode(token).map_err(|_| CursorError::InvalidBase64)?;
    let envelope: Envelope =
        serde_json::from_slice(&bytes).map_err(|_| CursorError::InvalidJson)?;
    if envelope.v != VERSION {
        return Err(CursorError::UnsupportedVersion(envelope.v));
    }
    let parts: Vec<(String, String)> =
        serde_json::from_value(envelope.k).map_err(|_| CursorError::InvalidJson)?;
    if parts.is_empty() {
        return Err(CursorError::EmptyKey);
    }

    parts
        .into_iter()
        .map(|(marker, payload)| {
            let kind: ValueKind = marker.parse().map_err(CursorError::UnknownKind)?;
            Value::parse_canonical(kind, &payload).ok_or(CursorError::InvalidValue(kind))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CursorKey)
}

/// Decode a cursor and check that it has one component per field of `order`.
///
/// # Errors
/// Same as [`decode`], plus `CursorError::ArityMismatch`.
pub fn decode_for(token: &str, order: &SortSpec) -> Result<CursorKey, CursorError> {
    let key = decode(token)?;
    if key.len() != order.len() {
        return Err(CursorError::ArityMismatch {
            expected: order.len(),
            got: key.len(),
        });
    }
    Ok(key)
}

// base64url helpers (no padding)
mod base64_url {
    use base64::Engine;

    pub fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(s)
    }
}
