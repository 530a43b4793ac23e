//! File service client: artifact upload and batched metadata lookup.
//!
//! The file service owns file identity and storage; this service keeps only
//! id relations and re-resolves metadata on read. Failures here surface as
//! persistence errors — the file service is a storage dependency of the
//! reporting flow, not an enrichment source.

use async_trait::async_trait;
use field_analytics_application::FileTransfer;
use field_analytics_domain::{AnalyticsError, AnalyticsResult, FileId, StoredFile};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::instrument;

/// HTTP client for the file service.
pub struct FileClient {
    http: reqwest::Client,
    base_url: String,
}

impl FileClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: super::base(base_url),
        }
    }
}

#[async_trait]
impl FileTransfer for FileClient {
    #[instrument(skip(self, content), fields(size = content.len()))]
    async fn upload(&self, file_name: &str, content: Vec<u8>) -> AnalyticsResult<StoredFile> {
        let url = format!("{}/files", self.base_url);
        let form = Form::new().part(
            "file",
            Part::bytes(content).file_name(file_name.to_owned()),
        );

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| AnalyticsError::persistence("upload file", err))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::persistence(
                "upload file",
                format!("unexpected status code: {}", response.status().as_u16()),
            ));
        }

        let dto: StoredFileDto = response
            .json()
            .await
            .map_err(|err| AnalyticsError::persistence("upload file", err))?;

        Ok(dto.into_domain())
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn by_ids(&self, ids: &[FileId]) -> AnalyticsResult<Vec<StoredFile>> {
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/files", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("ids", joined.as_str())])
            .send()
            .await
            .map_err(|err| AnalyticsError::persistence("get files by ids", err))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::persistence(
                "get files by ids",
                format!("unexpected status code: {}", response.status().as_u16()),
            ));
        }

        let dtos: Vec<StoredFileDto> = response
            .json()
            .await
            .map_err(|err| AnalyticsError::persistence("get files by ids", err))?;

        Ok(dtos.into_iter().map(StoredFileDto::into_domain).collect())
    }
}

/// Wire form of a stored file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredFileDto {
    id: i64,
    file_name: String,
    file_size: i64,
    bucket: String,
    url: String,
}

impl StoredFileDto {
    fn into_domain(self) -> StoredFile {
        StoredFile {
            id: self.id.into(),
            file_name: self.file_name,
            file_size: self.file_size,
            bucket: self.bucket,
            url: self.url,
        }
    }
}
