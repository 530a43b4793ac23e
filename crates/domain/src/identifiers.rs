//! Strongly-typed identifier types for the field analytics domain.
//!
//! Every upstream service keys its entities by a 64-bit integer. Wrapping the
//! raw integers in newtypes prevents accidental mixing of ID spaces (a task id
//! passed where a brigade id is expected is a compile error, not a bad query).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier as assigned by the owning service.
            #[inline]
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the underlying integer value.
            #[inline]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(TaskId, "Identifier of a field-inspection task");
define_id!(InspectionId, "Identifier of an inspection result");
define_id!(BrigadeId, "Identifier of a field brigade");
define_id!(InspectorId, "Identifier of an inspector within a brigade");
define_id!(ObjectId, "Identifier of a serviced object");
define_id!(SubscriberId, "Identifier of a subscriber account holder");
define_id!(ReportId, "Identifier of a generated report");
define_id!(FileId, "Identifier of a file owned by the file service");
