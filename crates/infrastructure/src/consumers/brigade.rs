//! Brigade service client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use field_analytics_application::BrigadeLookup;
use field_analytics_domain::{
    AnalyticsError, AnalyticsResult, Brigade, BrigadeId, EnrichmentSource, Inspector,
};
use serde::Deserialize;
use tracing::instrument;

/// HTTP client for the brigade service.
pub struct BrigadeClient {
    http: reqwest::Client,
    base_url: String,
}

impl BrigadeClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: super::base(base_url),
        }
    }
}

#[async_trait]
impl BrigadeLookup for BrigadeClient {
    #[instrument(skip(self))]
    async fn by_id(&self, id: BrigadeId) -> AnalyticsResult<Brigade> {
        let url = format!("{}/brigades/{id}", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AnalyticsError::enrichment(EnrichmentSource::Brigade, err))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::enrichment(
                EnrichmentSource::Brigade,
                format!("unexpected status code: {}", response.status().as_u16()),
            ));
        }

        let dto: BrigadeDto = response
            .json()
            .await
            .map_err(|err| AnalyticsError::enrichment(EnrichmentSource::Brigade, err))?;

        Ok(dto.into_domain())
    }
}

/// Wire form of a brigade with its roster.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrigadeDto {
    id: i64,
    inspectors: Vec<InspectorDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectorDto {
    id: i64,
    surname: String,
    name: String,
    patronymic: String,
    phone_number: String,
    email: String,
    assigned_at: DateTime<Utc>,
}

impl BrigadeDto {
    fn into_domain(self) -> Brigade {
        Brigade {
            id: self.id.into(),
            inspectors: self
                .inspectors
                .into_iter()
                .map(|inspector| Inspector {
                    id: inspector.id.into(),
                    surname: inspector.surname,
                    name: inspector.name,
                    patronymic: inspector.patronymic,
                    phone_number: inspector.phone_number,
                    email: inspector.email,
                    assigned_at: inspector.assigned_at,
                })
                .collect(),
        }
    }
}
