//! Subscriber service client: extended object lookups.

use async_trait::async_trait;
use field_analytics_application::ObjectLookup;
use field_analytics_domain::{
    AnalyticsError, AnalyticsResult, EnrichmentSource, ObjectExtended, ObjectId, Subscriber,
};
use serde::Deserialize;
use tracing::instrument;

/// HTTP client for the subscriber service.
pub struct SubscriberClient {
    http: reqwest::Client,
    base_url: String,
}

impl SubscriberClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: super::base(base_url),
        }
    }
}

#[async_trait]
impl ObjectLookup for SubscriberClient {
    #[instrument(skip(self))]
    async fn by_id(&self, id: ObjectId) -> AnalyticsResult<ObjectExtended> {
        let url = format!("{}/objects/{id}/extended", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AnalyticsError::enrichment(EnrichmentSource::Object, err))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::enrichment(
                EnrichmentSource::Object,
                format!("unexpected status code: {}", response.status().as_u16()),
            ));
        }

        let dto: ObjectExtendedDto = response
            .json()
            .await
            .map_err(|err| AnalyticsError::enrichment(EnrichmentSource::Object, err))?;

        dto.into_domain()
    }
}

/// Wire form of an object with its contracted subscriber.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectExtendedDto {
    id: i64,
    address: String,
    have_automaton: bool,
    subscriber: SubscriberDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriberDto {
    id: i64,
    account_number: String,
    surname: String,
    name: String,
    patronymic: String,
    phone_number: String,
    email: String,
    tax_id: String,
    birth_date: String,
    status: i32,
}

impl ObjectExtendedDto {
    fn into_domain(self) -> AnalyticsResult<ObjectExtended> {
        let status = self
            .subscriber
            .status
            .try_into()
            .map_err(|err: String| AnalyticsError::enrichment(EnrichmentSource::Object, err))?;

        Ok(ObjectExtended {
            id: self.id.into(),
            address: self.address,
            have_automaton: self.have_automaton,
            subscriber: Subscriber {
                id: self.subscriber.id.into(),
                account_number: self.subscriber.account_number,
                surname: self.subscriber.surname,
                name: self.subscriber.name,
                patronymic: self.subscriber.patronymic,
                phone_number: self.subscriber.phone_number,
                email: self.subscriber.email,
                tax_id: self.subscriber.tax_id,
                birth_date: self.subscriber.birth_date,
                status,
            },
        })
    }
}
