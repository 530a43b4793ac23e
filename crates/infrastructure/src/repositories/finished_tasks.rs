//! Fact-store repository: the append-only `finished_tasks` table.
//!
//! The table is the write-optimized, denormalized form of
//! [`FinishedTaskRecord`]: one prefixed column per enrichment field, the
//! inspector roster as a JSON column. Rows are appended exactly once per
//! enriched event and never updated or deleted here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use field_analytics_application::{DedupePolicy, FinishedTaskStore};
use field_analytics_domain::{
    AnalyticsError, AnalyticsResult, Brigade, FinishedTaskRecord, Inspection, InspectionType,
    MethodBy, ObjectExtended, ReasonType, Resolution, Subscriber, SubscriberStatus,
};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

const INSERT_COLUMNS: &str = r#"
    task_id, comment, plan_visit_at, started_at, finished_at,
    inspection_id, inspection_type, inspection_resolution, inspection_limit_reason,
    inspection_method, inspection_method_by, inspection_reason_type,
    inspection_reason_description, inspection_is_restriction_checked,
    inspection_is_violation_detected, inspection_is_expense_available,
    inspection_violation_description, inspection_is_unauthorized_consumers,
    inspection_unauthorized_description, inspection_unauthorized_explanation,
    inspection_inspected_at, inspection_energy_action_at,
    brigade_id, brigade_inspectors,
    object_id, object_address, object_have_automaton,
    subscriber_id, subscriber_account_number, subscriber_surname, subscriber_name,
    subscriber_patronymic, subscriber_phone_number, subscriber_email,
    subscriber_tax_id, subscriber_birth_date, subscriber_status
"#;

const BIND_LIST: &str = r#"
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
    $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32,
    $33, $34, $35, $36, $37
"#;

const SELECT_BY_PERIOD_SQL: &str = r#"
    SELECT
        task_id, comment, plan_visit_at, started_at, finished_at,
        inspection_id, inspection_type, inspection_resolution, inspection_limit_reason,
        inspection_method, inspection_method_by, inspection_reason_type,
        inspection_reason_description, inspection_is_restriction_checked,
        inspection_is_violation_detected, inspection_is_expense_available,
        inspection_violation_description, inspection_is_unauthorized_consumers,
        inspection_unauthorized_description, inspection_unauthorized_explanation,
        inspection_inspected_at, inspection_energy_action_at,
        brigade_id, brigade_inspectors,
        object_id, object_address, object_have_automaton,
        subscriber_id, subscriber_account_number, subscriber_surname, subscriber_name,
        subscriber_patronymic, subscriber_phone_number, subscriber_email,
        subscriber_tax_id, subscriber_birth_date, subscriber_status
    FROM finished_tasks
    WHERE finished_at >= $1 AND finished_at < $2
    ORDER BY finished_at, task_id
"#;

/// PostgreSQL implementation of the fact store.
pub struct PgFinishedTaskStore {
    pool: PgPool,
}

impl PgFinishedTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn insert_sql(policy: DedupePolicy) -> String {
        match policy {
            DedupePolicy::AllowDuplicates => {
                format!("INSERT INTO finished_tasks ({INSERT_COLUMNS}) VALUES ({BIND_LIST})")
            }
            // Natural key on task_id, enforced at insert time so the table
            // itself needs no unique constraint for the legacy policy.
            DedupePolicy::SkipDuplicates => format!(
                "INSERT INTO finished_tasks ({INSERT_COLUMNS}) \
                 SELECT {BIND_LIST} \
                 WHERE NOT EXISTS (SELECT 1 FROM finished_tasks WHERE task_id = $1)"
            ),
        }
    }
}

#[async_trait]
impl FinishedTaskStore for PgFinishedTaskStore {
    #[instrument(skip(self, record), fields(task_id = %record.task_id))]
    async fn append(
        &self,
        record: &FinishedTaskRecord,
        policy: DedupePolicy,
    ) -> AnalyticsResult<()> {
        let row = FinishedTaskRow::from_domain(record);

        let result = sqlx::query(&Self::insert_sql(policy))
            .bind(row.task_id)
            .bind(&row.comment)
            .bind(row.plan_visit_at)
            .bind(row.started_at)
            .bind(row.finished_at)
            .bind(row.inspection_id)
            .bind(row.inspection_type)
            .bind(row.inspection_resolution)
            .bind(&row.inspection_limit_reason)
            .bind(&row.inspection_method)
            .bind(row.inspection_method_by)
            .bind(row.inspection_reason_type)
            .bind(&row.inspection_reason_description)
            .bind(row.inspection_is_restriction_checked)
            .bind(row.inspection_is_violation_detected)
            .bind(row.inspection_is_expense_available)
            .bind(&row.inspection_violation_description)
            .bind(row.inspection_is_unauthorized_consumers)
            .bind(&row.inspection_unauthorized_description)
            .bind(&row.inspection_unauthorized_explanation)
            .bind(row.inspection_inspected_at)
            .bind(row.inspection_energy_action_at)
            .bind(row.brigade_id)
            .bind(&row.brigade_inspectors)
            .bind(row.object_id)
            .bind(&row.object_address)
            .bind(row.object_have_automaton)
            .bind(row.subscriber_id)
            .bind(&row.subscriber_account_number)
            .bind(&row.subscriber_surname)
            .bind(&row.subscriber_name)
            .bind(&row.subscriber_patronymic)
            .bind(&row.subscriber_phone_number)
            .bind(&row.subscriber_email)
            .bind(&row.subscriber_tax_id)
            .bind(&row.subscriber_birth_date)
            .bind(row.subscriber_status)
            .execute(&self.pool)
            .await
            .map_err(|err| AnalyticsError::persistence("add finished task", err))?;

        if result.rows_affected() == 0 {
            debug!(task_id = %record.task_id, "duplicate finished task dropped");
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn by_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> AnalyticsResult<Vec<FinishedTaskRecord>> {
        let rows: Vec<FinishedTaskRow> = sqlx::query_as(SELECT_BY_PERIOD_SQL)
            .bind(period_start)
            .bind(period_end)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| AnalyticsError::persistence("get finished tasks by period", err))?;

        rows.into_iter().map(FinishedTaskRow::into_domain).collect()
    }
}

/// Flattened database form of a finished-task record.
#[derive(Debug, Clone, FromRow)]
pub struct FinishedTaskRow {
    pub task_id: i64,
    pub comment: Option<String>,
    pub plan_visit_at: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub inspection_id: i64,
    pub inspection_type: i32,
    pub inspection_resolution: i32,
    pub inspection_limit_reason: Option<String>,
    pub inspection_method: String,
    pub inspection_method_by: i32,
    pub inspection_reason_type: i32,
    pub inspection_reason_description: Option<String>,
    pub inspection_is_restriction_checked: bool,
    pub inspection_is_violation_detected: bool,
    pub inspection_is_expense_available: bool,
    pub inspection_violation_description: Option<String>,
    pub inspection_is_unauthorized_consumers: bool,
    pub inspection_unauthorized_description: Option<String>,
    pub inspection_unauthorized_explanation: Option<String>,
    pub inspection_inspected_at: DateTime<Utc>,
    pub inspection_energy_action_at: DateTime<Utc>,
    pub brigade_id: i64,
    pub brigade_inspectors: Json<Vec<InspectorRow>>,
    pub object_id: i64,
    pub object_address: String,
    pub object_have_automaton: bool,
    pub subscriber_id: i64,
    pub subscriber_account_number: String,
    pub subscriber_surname: String,
    pub subscriber_name: String,
    pub subscriber_patronymic: String,
    pub subscriber_phone_number: String,
    pub subscriber_email: String,
    pub subscriber_tax_id: String,
    pub subscriber_birth_date: String,
    pub subscriber_status: i32,
}

/// Database form of an inspector inside the JSON roster column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorRow {
    pub id: i64,
    pub surname: String,
    pub name: String,
    pub patronymic: String,
    pub phone_number: String,
    pub email: String,
    pub assigned_at: DateTime<Utc>,
}

impl FinishedTaskRow {
    pub fn from_domain(record: &FinishedTaskRecord) -> Self {
        let inspectors = record
            .brigade
            .inspectors
            .iter()
            .map(|inspector| InspectorRow {
                id: inspector.id.get(),
                surname: inspector.surname.clone(),
                name: inspector.name.clone(),
                patronymic: inspector.patronymic.clone(),
                phone_number: inspector.phone_number.clone(),
                email: inspector.email.clone(),
                assigned_at: inspector.assigned_at,
            })
            .collect();

        Self {
            task_id: record.task_id.get(),
            comment: record.comment.clone(),
            plan_visit_at: record.plan_visit_at,
            started_at: record.started_at,
            finished_at: record.finished_at,
            inspection_id: record.inspection.id.get(),
            inspection_type: record.inspection.kind.code(),
            inspection_resolution: record.inspection.resolution.code(),
            inspection_limit_reason: record.inspection.limit_reason.clone(),
            inspection_method: record.inspection.method.clone(),
            inspection_method_by: record.inspection.method_by.code(),
            inspection_reason_type: record.inspection.reason_type.code(),
            inspection_reason_description: record.inspection.reason_description.clone(),
            inspection_is_restriction_checked: record.inspection.is_restriction_checked,
            inspection_is_violation_detected: record.inspection.is_violation_detected,
            inspection_is_expense_available: record.inspection.is_expense_available,
            inspection_violation_description: record.inspection.violation_description.clone(),
            inspection_is_unauthorized_consumers: record.inspection.is_unauthorized_consumers,
            inspection_unauthorized_description: record
                .inspection
                .unauthorized_description
                .clone(),
            inspection_unauthorized_explanation: record
                .inspection
                .unauthorized_explanation
                .clone(),
            inspection_inspected_at: record.inspection.inspected_at,
            inspection_energy_action_at: record.inspection.energy_action_at,
            brigade_id: record.brigade.id.get(),
            brigade_inspectors: Json(inspectors),
            object_id: record.object.id.get(),
            object_address: record.object.address.clone(),
            object_have_automaton: record.object.have_automaton,
            subscriber_id: record.object.subscriber.id.get(),
            subscriber_account_number: record.object.subscriber.account_number.clone(),
            subscriber_surname: record.object.subscriber.surname.clone(),
            subscriber_name: record.object.subscriber.name.clone(),
            subscriber_patronymic: record.object.subscriber.patronymic.clone(),
            subscriber_phone_number: record.object.subscriber.phone_number.clone(),
            subscriber_email: record.object.subscriber.email.clone(),
            subscriber_tax_id: record.object.subscriber.tax_id.clone(),
            subscriber_birth_date: record.object.subscriber.birth_date.clone(),
            subscriber_status: record.object.subscriber.status.code(),
        }
    }

    pub fn into_domain(self) -> AnalyticsResult<FinishedTaskRecord> {
        let inspectors = self
            .brigade_inspectors
            .0
            .into_iter()
            .map(|row| field_analytics_domain::Inspector {
                id: row.id.into(),
                surname: row.surname,
                name: row.name,
                patronymic: row.patronymic,
                phone_number: row.phone_number,
                email: row.email,
                assigned_at: row.assigned_at,
            })
            .collect();

        Ok(FinishedTaskRecord {
            task_id: self.task_id.into(),
            comment: self.comment,
            plan_visit_at: self.plan_visit_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            inspection: Inspection {
                id: self.inspection_id.into(),
                kind: decode_code::<InspectionType>(self.inspection_type)?,
                resolution: decode_code::<Resolution>(self.inspection_resolution)?,
                limit_reason: self.inspection_limit_reason,
                method: self.inspection_method,
                method_by: decode_code::<MethodBy>(self.inspection_method_by)?,
                reason_type: decode_code::<ReasonType>(self.inspection_reason_type)?,
                reason_description: self.inspection_reason_description,
                is_restriction_checked: self.inspection_is_restriction_checked,
                is_violation_detected: self.inspection_is_violation_detected,
                is_expense_available: self.inspection_is_expense_available,
                violation_description: self.inspection_violation_description,
                is_unauthorized_consumers: self.inspection_is_unauthorized_consumers,
                unauthorized_description: self.inspection_unauthorized_description,
                unauthorized_explanation: self.inspection_unauthorized_explanation,
                inspected_at: self.inspection_inspected_at,
                energy_action_at: self.inspection_energy_action_at,
            },
            brigade: Brigade {
                id: self.brigade_id.into(),
                inspectors,
            },
            object: ObjectExtended {
                id: self.object_id.into(),
                address: self.object_address,
                have_automaton: self.object_have_automaton,
                subscriber: Subscriber {
                    id: self.subscriber_id.into(),
                    account_number: self.subscriber_account_number,
                    surname: self.subscriber_surname,
                    name: self.subscriber_name,
                    patronymic: self.subscriber_patronymic,
                    phone_number: self.subscriber_phone_number,
                    email: self.subscriber_email,
                    tax_id: self.subscriber_tax_id,
                    birth_date: self.subscriber_birth_date,
                    status: decode_code::<SubscriberStatus>(self.subscriber_status)?,
                },
            },
        })
    }
}

/// Decode a stored classification code; a code the domain no longer knows is
/// a consistency breach, not a valid record.
fn decode_code<T: TryFrom<i32, Error = String>>(code: i32) -> AnalyticsResult<T> {
    T::try_from(code).map_err(AnalyticsError::DataConsistency)
}
