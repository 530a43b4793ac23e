//! Inspection results fetched from the inspection service.
//!
//! Classification enums are int-coded on the wire and in the fact table; the
//! codes are part of the inspection service contract.

use crate::identifiers::InspectionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of energy action the inspection documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum InspectionType {
    /// Supply was limited or disconnected.
    Limitation,
    /// A previously limited supply was resumed.
    Resumption,
    /// Control check of a previously imposed restriction.
    Control,
}

impl InspectionType {
    pub fn code(self) -> i32 {
        match self {
            Self::Limitation => 1,
            Self::Resumption => 2,
            Self::Control => 3,
        }
    }
}

impl From<InspectionType> for i32 {
    fn from(value: InspectionType) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for InspectionType {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Limitation),
            2 => Ok(Self::Resumption),
            3 => Ok(Self::Control),
            other => Err(format!("unknown inspection type code: {other}")),
        }
    }
}

/// Outcome of the documented energy action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Resolution {
    /// The limitation was carried out.
    Limited,
    /// Supply was resumed.
    Resumed,
    /// The brigade was denied access.
    Refused,
}

impl Resolution {
    pub fn code(self) -> i32 {
        match self {
            Self::Limited => 1,
            Self::Resumed => 2,
            Self::Refused => 3,
        }
    }
}

impl From<Resolution> for i32 {
    fn from(value: Resolution) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for Resolution {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Limited),
            2 => Ok(Self::Resumed),
            3 => Ok(Self::Refused),
            other => Err(format!("unknown resolution code: {other}")),
        }
    }
}

/// Who executed the energy action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum MethodBy {
    /// Performed on site by the inspector.
    Inspector,
    /// Performed remotely through metering equipment.
    Remote,
}

impl MethodBy {
    pub fn code(self) -> i32 {
        match self {
            Self::Inspector => 1,
            Self::Remote => 2,
        }
    }
}

impl From<MethodBy> for i32 {
    fn from(value: MethodBy) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for MethodBy {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Inspector),
            2 => Ok(Self::Remote),
            other => Err(format!("unknown method-by code: {other}")),
        }
    }
}

/// Grounds on which the energy action was ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ReasonType {
    /// Outstanding debt on the account.
    Debt,
    /// The supply contract was terminated.
    ContractTermination,
    /// Safety violation at the object.
    Safety,
}

impl ReasonType {
    pub fn code(self) -> i32 {
        match self {
            Self::Debt => 1,
            Self::ContractTermination => 2,
            Self::Safety => 3,
        }
    }
}

impl From<ReasonType> for i32 {
    fn from(value: ReasonType) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for ReasonType {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Debt),
            2 => Ok(Self::ContractTermination),
            3 => Ok(Self::Safety),
            other => Err(format!("unknown reason type code: {other}")),
        }
    }
}

/// An immutable inspection snapshot, keyed by the task it concluded.
///
/// Classification, flags and timestamps are mandatory: a record missing any
/// of them is unusable for analytics and is rejected during enrichment
/// mapping. The free-text justifications are genuinely optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: InspectionId,
    pub kind: InspectionType,
    pub resolution: Resolution,
    pub limit_reason: Option<String>,
    pub method: String,
    pub method_by: MethodBy,
    pub reason_type: ReasonType,
    pub reason_description: Option<String>,
    pub is_restriction_checked: bool,
    pub is_violation_detected: bool,
    pub is_expense_available: bool,
    pub violation_description: Option<String>,
    pub is_unauthorized_consumers: bool,
    pub unauthorized_description: Option<String>,
    pub unauthorized_explanation: Option<String>,
    pub inspected_at: DateTime<Utc>,
    pub energy_action_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_codes_round_trip() {
        for kind in [
            InspectionType::Limitation,
            InspectionType::Resumption,
            InspectionType::Control,
        ] {
            assert_eq!(InspectionType::try_from(kind.code()).unwrap(), kind);
        }
        for resolution in [Resolution::Limited, Resolution::Resumed, Resolution::Refused] {
            assert_eq!(Resolution::try_from(resolution.code()).unwrap(), resolution);
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!(InspectionType::try_from(0).is_err());
        assert!(Resolution::try_from(42).is_err());
        assert!(MethodBy::try_from(-1).is_err());
        assert!(ReasonType::try_from(7).is_err());
    }
}
