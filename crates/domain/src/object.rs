//! Serviced objects and their subscribers, as returned by the subscriber
//! service.

use crate::identifiers::{ObjectId, SubscriberId};
use serde::{Deserialize, Serialize};

/// Standing of a subscriber account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SubscriberStatus {
    /// Account in good standing.
    Active,
    /// Supply limited for this account.
    Suspended,
    /// Contract closed.
    Closed,
}

impl SubscriberStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Active => 1,
            Self::Suspended => 2,
            Self::Closed => 3,
        }
    }
}

impl From<SubscriberStatus> for i32 {
    fn from(value: SubscriberStatus) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for SubscriberStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Active),
            2 => Ok(Self::Suspended),
            3 => Ok(Self::Closed),
            other => Err(format!("unknown subscriber status code: {other}")),
        }
    }
}

/// A serviced object together with the subscriber it is contracted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectExtended {
    pub id: ObjectId,
    pub address: String,
    pub have_automaton: bool,
    pub subscriber: Subscriber,
}

/// The account holder contracted for an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: SubscriberId,
    pub account_number: String,
    pub surname: String,
    pub name: String,
    pub patronymic: String,
    pub phone_number: String,
    pub email: String,
    pub tax_id: String,
    pub birth_date: String,
    pub status: SubscriberStatus,
}
