//! Relay connection arguments (`first`, `last`, `after`, `before`).

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Validated connection arguments.
///
/// `first` and `last` are mutually exclusive; every constructor (including
/// deserialization) enforces it, so a value of this type is always valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConnectionArgs", rename_all = "camelCase")]
pub struct ConnectionArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    first: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConnectionArgs {
    #[serde(default)]
    first: Option<u64>,
    #[serde(default)]
    last: Option<u64>,
    #[serde(default)]
    after: Option<String>,
    #[serde(default)]
    before: Option<String>,
}

impl TryFrom<RawConnectionArgs> for ConnectionArgs {
    type Error = Error;

    fn try_from(raw: RawConnectionArgs) -> Result<Self, Self::Error> {
        Self::new(raw.first, raw.last, raw.after, raw.before)
    }
}

impl ConnectionArgs {
    /// Build arguments from their optional parts.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if both `first` and `last` are present.
    pub fn new(
        first: Option<u64>,
        last: Option<u64>,
        after: Option<String>,
        before: Option<String>,
    ) -> Result<Self, Error> {
        if first.is_some() && last.is_some() {
            return Err(Error::first_and_last());
        }
        Ok(Self {
            first,
            last,
            after,
            before,
        })
    }

    /// `first: n`
    #[must_use]
    pub fn forward(n: u64) -> Self {
        Self {
            first: Some(n),
            ..Self::default()
        }
    }

    /// `last: n`
    #[must_use]
    pub fn backward(n: u64) -> Self {
        Self {
            last: Some(n),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn with_before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn first(&self) -> Option<u64> {
        self.first
    }

    #[must_use]
    pub fn last(&self) -> Option<u64> {
        self.last
    }

    #[must_use]
    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    #[must_use]
    pub fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }

    /// `first ?? last`
    #[must_use]
    pub fn limit(&self) -> Option<u64> {
        self.first.or(self.last)
    }

    /// Whether the page is taken from the tail of the range (`last` given).
    #[must_use]
    pub fn is_backward(&self) -> bool {
        self.last.is_some()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::errors::FIRST_AND_LAST_MESSAGE;

    #[test]
    fn first_and_last_together_are_rejected() {
        let err = ConnectionArgs::new(Some(1), Some(1), None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(err.to_string(), FIRST_AND_LAST_MESSAGE);
        assert_eq!(
            err.to_string(),
            "first and last must not be included at the same time"
        );
    }

    #[test]
    fn first_and_last_are_rejected_whatever_else_is_set() {
        let err = ConnectionArgs::new(Some(0), Some(0), Some("a".into()), Some("b".into()))
            .unwrap_err();
        assert_eq!(err.to_string(), FIRST_AND_LAST_MESSAGE);
    }

    #[test]
    fn limit_prefers_first_then_last() {
        assert_eq!(ConnectionArgs::forward(10).limit(), Some(10));
        assert_eq!(ConnectionArgs::backward(3).limit(), Some(3));
        assert_eq!(ConnectionArgs::default().limit(), None);
        assert!(ConnectionArgs::backward(3).is_backward());
        assert!(!ConnectionArgs::forward(3).is_backward());
    }

    #[test]
    fn builders_keep_cursors() {
        let args = ConnectionArgs::forward(2).with_after("A").with_before("B");
        assert_eq!(args.first(), Some(2));
        assert_eq!(args.after(), Some("A"));
        assert_eq!(args.before(), Some("B"));
        assert_eq!(args.last(), None);
    }

    #[test]
    fn deserialization_validates() {
        let ok: ConnectionArgs = serde_json::from_str(r#"{"last":2,"before":"xyz"}"#).unwrap();
        assert_eq!(ok, ConnectionArgs::backward(2).with_before("xyz"));

        let err = serde_json::from_str::<ConnectionArgs>(r#"{"first":1,"last":2}"#).unwrap_err();
        assert!(err.to_string().contains(FIRST_AND_LAST_MESSAGE));

        assert!(serde_json::from_str::<ConnectionArgs>(r#"{"first":-1}"#).is_err());
    }

    #[test]
    fn serializes_in_camel_case_without_nulls() {
        let json = serde_json::to_string(&ConnectionArgs::forward(5).with_after("c")).unwrap();
        assert_eq!(json, r#"{"first":5,"after":"c"}"#);
    }
}
