//! Functional identifiers
//!
//! Every entity carries two identifiers: a technical `i64` primary key
//! that never leaves the service, and a functional UUID exposed in every
//! API surface. Functional ids are time-ordered (UUIDv7) so index
//! locality follows insertion order.
//!
//! # Example
//!
//! ```rust
//! use restkit::ids::FunctionalId;
//!
//! let id = FunctionalId::generate();
//! let parsed: FunctionalId = id.to_string().parse().unwrap();
//! assert_eq!(parsed, id);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The externally visible identifier of an entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct FunctionalId(Uuid);

impl FunctionalId {
    /// A fresh time-ordered identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// The wrapped UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for FunctionalId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for FunctionalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FunctionalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}
