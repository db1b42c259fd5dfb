// src/integrations/mod.rs
//
// External Integrations Module

pub mod content_api;

pub use content_api::{ContentFetcher, ContentSummary, HttpContentClient};
