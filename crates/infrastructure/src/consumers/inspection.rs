//! Inspection service client.
//!
//! The wire form marks classification, flags and timestamps as nullable, but
//! analytics cannot use a partially populated inspection: every one of those
//! fields is mandatory after mapping, and a missing field is treated as a
//! failed lookup (an upstream contract violation), not a valid domain state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use field_analytics_application::InspectionLookup;
use field_analytics_domain::{
    AnalyticsError, AnalyticsResult, EnrichmentSource, Inspection, TaskId,
};
use serde::Deserialize;
use tracing::instrument;

/// HTTP client for the inspection service.
pub struct InspectionClient {
    http: reqwest::Client,
    base_url: String,
}

impl InspectionClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: super::base(base_url),
        }
    }
}

#[async_trait]
impl InspectionLookup for InspectionClient {
    #[instrument(skip(self))]
    async fn by_task_id(&self, task_id: TaskId) -> AnalyticsResult<Inspection> {
        let url = format!("{}/inspections/task/{task_id}", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AnalyticsError::enrichment(EnrichmentSource::Inspection, err))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::enrichment(
                EnrichmentSource::Inspection,
                format!("unexpected status code: {}", response.status().as_u16()),
            ));
        }

        let dto: InspectionDto = response
            .json()
            .await
            .map_err(|err| AnalyticsError::enrichment(EnrichmentSource::Inspection, err))?;

        dto.into_domain()
    }
}

/// Wire form of an inspection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectionDto {
    id: i64,
    #[serde(rename = "type")]
    kind: Option<i32>,
    resolution: Option<i32>,
    limit_reason: Option<String>,
    method: Option<String>,
    method_by: Option<i32>,
    reason_type: Option<i32>,
    reason_description: Option<String>,
    is_restriction_checked: Option<bool>,
    is_violation_detected: Option<bool>,
    is_expense_available: Option<bool>,
    violation_description: Option<String>,
    is_unauthorized_consumers: Option<bool>,
    unauthorized_description: Option<String>,
    unauthorized_explanation: Option<String>,
    inspected_at: Option<DateTime<Utc>>,
    energy_action_at: Option<DateTime<Utc>>,
}

impl InspectionDto {
    fn into_domain(self) -> AnalyticsResult<Inspection> {
        Ok(Inspection {
            id: self.id.into(),
            kind: decode(require(self.kind, "type")?)?,
            resolution: decode(require(self.resolution, "resolution")?)?,
            limit_reason: self.limit_reason,
            method: require(self.method, "method")?,
            method_by: decode(require(self.method_by, "methodBy")?)?,
            reason_type: decode(require(self.reason_type, "reasonType")?)?,
            reason_description: self.reason_description,
            is_restriction_checked: require(self.is_restriction_checked, "isRestrictionChecked")?,
            is_violation_detected: require(self.is_violation_detected, "isViolationDetected")?,
            is_expense_available: require(self.is_expense_available, "isExpenseAvailable")?,
            violation_description: self.violation_description,
            is_unauthorized_consumers: require(
                self.is_unauthorized_consumers,
                "isUnauthorizedConsumers",
            )?,
            unauthorized_description: self.unauthorized_description,
            unauthorized_explanation: self.unauthorized_explanation,
            inspected_at: require(self.inspected_at, "inspectedAt")?,
            energy_action_at: require(self.energy_action_at, "energyActionAt")?,
        })
    }
}

fn require<T>(value: Option<T>, field: &str) -> AnalyticsResult<T> {
    value.ok_or_else(|| {
        AnalyticsError::enrichment(
            EnrichmentSource::Inspection,
            format!("inspection response missing {field}"),
        )
    })
}

fn decode<T: TryFrom<i32, Error = String>>(code: i32) -> AnalyticsResult<T> {
    T::try_from(code).map_err(|err| AnalyticsError::enrichment(EnrichmentSource::Inspection, err))
}
