//! Sort specification: an ordered, non-empty list of fields with directions.
//!
//! Field order defines tie-break precedence. The combination of fields must be
//! unique per row for paging to be stable; append a unique column with
//! [`SortSpec::ensure_tiebreaker`] when in doubt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    /// Reverse the sort direction (Asc <-> Desc)
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortField {
    pub name: String,
    pub dir: SortDir,
}

impl SortField {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: SortDir::Desc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<SortField>", into = "Vec<SortField>")]
pub struct SortSpec(Vec<SortField>);

impl SortSpec {
    /// Build a sort specification.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if `fields` is empty.
    pub fn new(fields: Vec<SortField>) -> Result<Self, Error> {
        if fields.is_empty() {
            return Err(Error::InvalidArgument(
                "sort specification must contain at least one field".to_owned(),
            ));
        }
        Ok(Self(fields))
    }

    #[must_use]
    pub fn fields(&self) -> &[SortField] {
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

    pub fn iter(&self) -> std::slice::Iter<'_, SortField> {
        self.0.iter()
    }

    /// Same fields with every direction inverted (used to fetch the tail for `last`).
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|f| SortField {
                    name: f.name.clone(),
                    dir: f.dir.reverse(),
                })
                .collect(),
        )
    }

    /// Append tiebreaker if missing
    #[must_use]
    pub fn ensure_tiebreaker(mut self, tiebreaker: &str, dir: SortDir) -> Self {
        if !self.0.iter().any(|f| f.name == tiebreaker) {
            self.0.push(SortField {
                name: tiebreaker.to_owned(),
                dir,
            });
        }
        self
    }

    /// Render as "+f1,-f2"
    #[must_use]
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(|f| match f.dir {
                SortDir::Asc => format!("+{}", f.name),
                SortDir::Desc => format!("-{}", f.name),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse signed tokens (e.g. "+a,-b"). A bare name defaults to ascending.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if the input is empty or a token has no field name.
    pub fn from_signed_tokens(signed: &str) -> Result<Self, Error> {
        let mut out = Vec::new();
        for seg in signed.split(',') {
            let seg = seg.trim();
            if seg.is_empty() {
                continue;
            }
            let (dir, name) = if let Some(rest) = seg.strip_prefix('+') {
                (SortDir::Asc, rest)
            } else if let Some(rest) = seg.strip_prefix('-') {
                (SortDir::Desc, rest)
            } else {
                (SortDir::Asc, seg)
            };
            if name.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "invalid sort token `{seg}`"
                )));
            }
            out.push(SortField {
                name: name.to_owned(),
                dir,
            });
        }
        Self::new(out)
    }
}

impl FromStr for SortSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_signed_tokens(s)
    }
}

impl TryFrom<Vec<SortField>> for SortSpec {
    type Error = Error;

    fn try_from(fields: Vec<SortField>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl From<SortSpec> for Vec<SortField> {
    fn from(spec: SortSpec) -> Self {
        spec.0
    }
}

impl<'a> IntoIterator for &'a SortSpec {
    type Item = &'a SortField;
    type IntoIter = std::slice::Iter<'a, SortField>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// Display trait for human-readable representation
impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted: Vec<String> = self
            .0
            .iter()
            .map(|field| {
                let dir_str = match field.dir {
                    SortDir::Asc => "asc",
                    SortDir::Desc => "desc",
                };
                format!("{} {}", field.name, dir_str)
            })
            .collect();

        write!(f, "{}", formatted.join(", "))
    }
}
