//! Data provenance tag for anything that may come from a degraded path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a piece of data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    /// Returned by the external service
    Live,
    /// Derived locally because the external service failed
    Fallback,
}

impl DataSource {
    pub fn is_live(&self) -> bool {
        matches!(self, DataSource::Live)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Live => write!(f, "live"),
            DataSource::Fallback => write!(f, "fallback"),
        }
    }
}
