// src/integrations/content_api/client.rs
//
// HTTP client for the catalog REST API
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Maps external payloads into ContentSummary and nothing else

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{ContentFetcher, ContentSummary};
use crate::domain::ContentId;
use crate::error::{AppError, AppResult};

/// Payload of `GET /anime/{id}`
#[derive(Debug, Deserialize)]
struct ContentData {
    id: u64,
    name: NameData,
    #[serde(default)]
    poster: Option<PosterData>,
    #[serde(default)]
    episodes_total: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct NameData {
    main: String,
    #[serde(default)]
    english: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PosterData {
    src: Option<String>,
}

pub struct HttpContentClient {
    base_url: String,
    http_client: Client,
}

impl HttpContentClient {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn content_url(&self, id: ContentId) -> String {
        format!("{}/anime/{}", self.base_url, id)
    }

    fn map_content(data: ContentData) -> ContentSummary {
        ContentSummary {
            id: ContentId(data.id),
            title: data.name.english.filter(|t| !t.is_empty()).unwrap_or(data.name.main),
            poster_url: data.poster.and_then(|p| p.src),
            episodes_total: data.episodes_total,
        }
    }
}

#[async_trait]
impl ContentFetcher for HttpContentClient {
    async fn fetch_content(&self, id: ContentId) -> AppResult<ContentSummary> {
        let response = self
            .http_client
            .get(self.content_url(id))
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound);
        }
        if !response.status().is_success() {
            return Err(AppError::Other(format!(
                "Content API returned status: {}",
                response.status()
            )));
        }

        let data: ContentData = response.json().await?;
        Ok(Self::map_content(data))
    }
}
