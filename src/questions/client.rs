//! Upstream question API client.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::UpstreamConfig;
use crate::error::{KataError, Result};

use super::{ActiveQuestions, Question};

/// Wire envelope for `GET /random-questions`.
#[derive(Debug, Deserialize)]
struct QuestionsEnvelope {
    #[serde(default)]
    questions: Vec<Question>,
}

/// Async client for the question-source API.
pub struct UpstreamClient {
    http: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Builds a client from config. Fails when no base URL is configured.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| KataError::Config("upstream.base_url is not configured".to_string()))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches `count` random questions at an upstream difficulty label.
    pub async fn fetch_random(&self, count: u32, difficulty: &str) -> Result<Vec<Question>> {
        let url = format!("{}/random-questions", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("count", count.to_string()),
                ("difficulty", difficulty.to_string()),
            ])
            .send()
            .await
            .map_err(|err| KataError::Upstream(format!("contact question API: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KataError::Upstream(format!(
                "fetch {difficulty} questions: status {status}"
            )));
        }

        let envelope: QuestionsEnvelope = response
            .json()
            .await
            .map_err(|err| KataError::Upstream(format!("invalid question API response: {err}")))?;
        Ok(envelope.questions)
    }

    /// Fetches both difficulty lists and stamps the set with today's
    /// day start.
    pub async fn fetch_active(&self, config: &UpstreamConfig) -> Result<ActiveQuestions> {
        let easy = self
            .fetch_random(config.count, &config.difficulty_easy)
            .await?;
        let hard = self
            .fetch_random(config.count, &config.difficulty_hard)
            .await?;
        info!(
            easy = easy.len(),
            hard = hard.len(),
            "fetched active question set"
        );
        Ok(ActiveQuestions::new(easy, hard, Utc::now().naive_utc()))
    }
}
