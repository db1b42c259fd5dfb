// src/integrations/content_api/mod.rs
//
// Content API boundary
//
// The catalog service owns anime records. The player only needs to
// hydrate content IDs from the watch history into displayable summaries.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ContentId;
use crate::error::AppResult;

pub use client::HttpContentClient;

/// Display record for a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub id: ContentId,
    pub title: String,
    pub poster_url: Option<String>,
    pub episodes_total: Option<u32>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_content(&self, id: ContentId) -> AppResult<ContentSummary>;
}
