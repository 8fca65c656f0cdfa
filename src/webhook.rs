//! Delivery of rendered documents to the external document webhook
//!
//! The sink answers a successful POST with a redirect. Following it would replay the
//! call as a body-less GET, so redirects are disabled and any 2xx or 3xx status
//! counts as delivered.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client};
use serde::Serialize;
use thiserror::Error;

use crate::{config::WebhookDestination, domain::text::clip_chars};

pub const PUSH_SOURCE: &str = "context-summarizer-mcp";
pub const ERROR_BODY_MAX_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPush {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushReceipt {
    pub status: u16,
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("webhook not configured (DOC_WEBHOOK_URL and DOC_WEBHOOK_TOKEN are required)")]
    NotConfigured,
    #[error("webhook request failed: {0}")]
    Transport(String),
    #[error("webhook responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait DocSink: Send + Sync {
    async fn push(&self, doc: &DocPush) -> Result<PushReceipt, PushError>;
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    token: &'a str,
    title: &'a str,
    text: &'a str,
    source: &'static str,
}

#[derive(Debug, Clone)]
pub struct WebhookPusher {
    client: Client,
    destination: Option<WebhookDestination>,
}

impl WebhookPusher {
    pub fn new(
        destination: Option<WebhookDestination>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            destination,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.destination.is_some()
    }
}

#[async_trait]
impl DocSink for WebhookPusher {
    async fn push(&self, doc: &DocPush) -> Result<PushReceipt, PushError> {
        let Some(destination) = self.destination.as_ref() else {
            return Err(PushError::NotConfigured);
        };

        let payload = WebhookPayload {
            token: &destination.token,
            title: &doc.title,
            text: &doc.text,
            source: PUSH_SOURCE,
        };

        // The URL may embed deployment secrets, keep it out of the diagnostic.
        let response = self
            .client
            .post(&destination.url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                PushError::Transport(clip_chars(
                    &err.without_url().to_string(),
                    ERROR_BODY_MAX_CHARS,
                ))
            })?;

        let status = response.status().as_u16();
        if (200..400).contains(&status) {
            return Ok(PushReceipt { status });
        }

        let body = response.text().await.unwrap_or_default();
        Err(PushError::Status {
            status,
            body: clip_chars(&body, ERROR_BODY_MAX_CHARS),
        })
    }
}
