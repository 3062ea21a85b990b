//! Typed configuration for the pagination engine.
//!
//! Loaded from a `figment::Figment` section, e.g. in YAML:
//!
//! ```yaml
//! pagination:
//!   max_page_size: 500
//!   concurrent_probes: true
//! ```

use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Upper bound for `first` / `last`. `None` means no cap.
    pub max_page_size: Option<u64>,
    /// Await the main fetch and both page-info probes together in `resolve()`.
    pub concurrent_probes: bool,
}

impl PaginationConfig {
    /// Extract the section at `key`; a missing section yields the defaults.
    ///
    /// # Errors
    /// Returns the figment error if the section exists but does not deserialize.
    pub fn from_figment(figment: &Figment, key: &str) -> Result<Self, figment::Error> {
        if !figment.contains(key) {
            return Ok(Self::default());
        }
        figment.extract_inner(key)
    }

    #[must_use]
    pub fn with_max_page_size(mut self, max: u64) -> Self {
        self.max_page_size = Some(max);
        self
    }

    #[must_use]
    pub fn with_concurrent_probes(mut self, enabled: bool) -> Self {
        self.concurrent_probes = enabled;
        self
    }

    /// Validate a requested `first` / `last` against the cap.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if `requested` exceeds `max_page_size`.
    pub fn check_page_size(&self, arg: &str, requested: u64) -> Result<(), Error> {
        match self.max_page_size {
            Some(max) if requested > max => Err(Error::InvalidArgument(format!(
                "{arg} must not exceed {max}"
            ))),
            _ => Ok(()),
        }
    }
}
