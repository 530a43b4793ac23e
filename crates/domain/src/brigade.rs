//! Brigades and their assigned inspectors, as returned by the brigade service.

use crate::identifiers::{BrigadeId, InspectorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A field brigade with its current inspector roster.
///
/// Inspector order is meaningful: it is the order the brigade service assigned
/// them in and is preserved through to report rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brigade {
    pub id: BrigadeId,
    pub inspectors: Vec<Inspector>,
}

/// A single inspector assigned to a brigade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspector {
    pub id: InspectorId,
    pub surname: String,
    pub name: String,
    pub patronymic: String,
    pub phone_number: String,
    pub email: String,
    pub assigned_at: DateTime<Utc>,
}
