//! Newtype identifiers for roster entities.
//!
//! All identifiers are opaque `u64` newtypes. The solver, graph and cache
//! key off these; they never carry free text.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw identifier value.
            #[inline]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a camper.
    CamperId,
    "camper-"
);
define_id!(
    /// Identifier of a bunk.
    BunkId,
    "bunk-"
);
define_id!(
    /// Identifier of a session.
    SessionId,
    "session-"
);
define_id!(
    /// Stable identifier of a request, used for idempotent re-application.
    RequestId,
    "request-"
);
