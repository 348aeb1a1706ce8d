use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::{Config, ConfigError};
use crate::models::{BlockRecord, CourseRecord, LectureRecord};

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Request(String),
    #[error("{url} returned HTTP {status}")]
    Upstream { url: String, status: u16 },
    #[error("{url} did not return JSON: {message}")]
    NotJson { url: String, message: String },
    #[error("unexpected {resource} {id} payload: {message}")]
    Schema {
        resource: &'static str,
        id: u64,
        message: String,
    },
}

// ── Resources ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Course,
    Lecture,
    Block,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Course => "courses",
            Resource::Lecture => "lectures",
            Resource::Block => "lecture-blocks",
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────────────

/// Thin wrapper over the teaching kit REST API.
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base: Url,
    locale: String,
}

impl ContentClient {
    pub fn new(config: &Config) -> Result<Self, ContentError> {
        Ok(Self {
            http: config.build_client()?,
            base: config.api_base_url()?,
            locale: config.locale.clone(),
        })
    }

    /// The underlying HTTP client, shared with the image downloader.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn resource_url(&self, resource: Resource, id: u64) -> Result<Url, ContentError> {
        let mut url = self
            .base
            .join(&format!("{}/{}", resource.path(), id))
            .map_err(|e| ContentError::Request(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("locale", &self.locale)
            .append_pair("populate", "*");
        Ok(url)
    }

    /// `GET <base>/{resource}/{id}?locale=..&populate=*` as raw JSON.
    pub async fn fetch(&self, resource: Resource, id: u64) -> Result<Value, ContentError> {
        let url = self.resource_url(resource, id)?;
        tracing::debug!(%url, "fetching {}", resource.path());

        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ContentError::Request(format!("TimeoutError: {}", e))
            } else if e.is_connect() {
                ContentError::Request(format!("ConnectError: {}", e))
            } else {
                ContentError::Request(format!("RequestError: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(ContentError::Upstream {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| ContentError::NotJson {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn fetch_typed<T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: u64,
    ) -> Result<T, ContentError> {
        let value = self.fetch(resource, id).await?;
        serde_json::from_value(value).map_err(|e| ContentError::Schema {
            resource: resource.path(),
            id,
            message: e.to_string(),
        })
    }

    pub async fn course(&self, id: u64) -> Result<CourseRecord, ContentError> {
        self.fetch_typed(Resource::Course, id).await
    }

    pub async fn lecture(&self, id: u64) -> Result<LectureRecord, ContentError> {
        self.fetch_typed(Resource::Lecture, id).await
    }

    pub async fn block(&self, id: u64) -> Result<BlockRecord, ContentError> {
        self.fetch_typed(Resource::Block, id).await
    }
}
