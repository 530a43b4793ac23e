//! The denormalized finished-task record appended to the fact store.

use crate::brigade::Brigade;
use crate::errors::AnalyticsError;
use crate::identifiers::TaskId;
use crate::inspection::Inspection;
use crate::object::ObjectExtended;
use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The flattened join of a finished task with its three enrichment sources.
///
/// One record is appended per successfully enriched `Finished` event and is
/// never updated or deleted afterwards; the fact store built from these
/// records is the system of record for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedTaskRecord {
    pub task_id: TaskId,
    pub comment: Option<String>,
    pub plan_visit_at: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub inspection: Inspection,
    pub brigade: Brigade,
    pub object: ObjectExtended,
}

impl FinishedTaskRecord {
    /// Assemble a record from a finished task and its enrichment results.
    ///
    /// A finished task must carry both work timestamps; an event without them
    /// is malformed and cannot produce a fact row.
    pub fn from_parts(
        task: Task,
        inspection: Inspection,
        brigade: Brigade,
        object: ObjectExtended,
    ) -> Result<Self, AnalyticsError> {
        let started_at = task.started_at.ok_or_else(|| {
            AnalyticsError::MalformedEvent(format!("task {} has no startedAt", task.id))
        })?;
        let finished_at = task.finished_at.ok_or_else(|| {
            AnalyticsError::MalformedEvent(format!("task {} has no finishedAt", task.id))
        })?;

        Ok(Self {
            task_id: task.id,
            comment: task.comment,
            plan_visit_at: task.plan_visit_at,
            started_at,
            finished_at,
            inspection,
            brigade,
            object,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::{BrigadeId, InspectionId, ObjectId, SubscriberId};
    use crate::inspection::{InspectionType, MethodBy, ReasonType, Resolution};
    use crate::object::{Subscriber, SubscriberStatus};
    use crate::task::TaskStatus;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task {
            id: TaskId::new(5),
            comment: None,
            plan_visit_at: None,
            started_at: Some(Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()),
            finished_at: Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()),
            status: TaskStatus::Done,
            brigade_id: Some(BrigadeId::new(2)),
            object_id: ObjectId::new(7),
        }
    }

    fn sample_inspection() -> Inspection {
        Inspection {
            id: InspectionId::new(12),
            kind: InspectionType::Limitation,
            resolution: Resolution::Limited,
            limit_reason: Some("debt over threshold".to_owned()),
            method: "seal".to_owned(),
            method_by: MethodBy::Inspector,
            reason_type: ReasonType::Debt,
            reason_description: None,
            is_restriction_checked: true,
            is_violation_detected: false,
            is_expense_available: false,
            violation_description: None,
            is_unauthorized_consumers: false,
            unauthorized_description: None,
            unauthorized_explanation: None,
            inspected_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            energy_action_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 10, 0).unwrap(),
        }
    }

    fn sample_object() -> ObjectExtended {
        ObjectExtended {
            id: ObjectId::new(7),
            address: "Lenina st. 10".to_owned(),
            have_automaton: false,
            subscriber: Subscriber {
                id: SubscriberId::new(3),
                account_number: "AC-100".to_owned(),
                surname: "Ivanov".to_owned(),
                name: "Ivan".to_owned(),
                patronymic: "Ivanovich".to_owned(),
                phone_number: "+7 900 000-00-00".to_owned(),
                email: "ivanov@example.com".to_owned(),
                tax_id: "7700000000".to_owned(),
                birth_date: "1980-05-04".to_owned(),
                status: SubscriberStatus::Suspended,
            },
        }
    }

    #[test]
    fn assembles_record_from_parts() {
        let brigade = Brigade {
            id: BrigadeId::new(2),
            inspectors: Vec::new(),
        };

        let record =
            FinishedTaskRecord::from_parts(sample_task(), sample_inspection(), brigade, sample_object())
                .unwrap();

        assert_eq!(record.task_id, TaskId::new(5));
        assert_eq!(record.object.subscriber.account_number, "AC-100");
    }

    #[test]
    fn rejects_task_without_work_timestamps() {
        let mut task = sample_task();
        task.finished_at = None;

        let brigade = Brigade {
            id: BrigadeId::new(2),
            inspectors: Vec::new(),
        };
        let err =
            FinishedTaskRecord::from_parts(task, sample_inspection(), brigade, sample_object())
                .unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedEvent(_)));
    }
}
