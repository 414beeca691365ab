//! Core nodegroups domain types.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which of the two API base URIs a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Read-only API (lookups)
    Ro,
    /// Read-write API (mutations)
    Rw,
}

impl Endpoint {
    /// Returns the endpoint name as used in configuration keys.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ro => "ro",
            Self::Rw => "rw",
        }
    }

    /// Returns the dotted configuration parameter holding this endpoint's URI.
    #[must_use]
    pub const fn parameter(&self) -> &'static str {
        match self {
            Self::Ro => "uri.ro",
            Self::Rw => "uri.rw",
        }
    }

    /// Returns both endpoints.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Ro, Self::Rw]
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ro" => Ok(Self::Ro),
            "rw" => Ok(Self::Rw),
            _ => Err(Error::InvalidRequest(format!("Unknown endpoint: {s}"))),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
