// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The production `PlanSource`: an OpenAI-compatible chat completions
//! client, configured by `MODEL_API_URL`/`MODEL_API_KEY`. The model
//! backend itself is out of scope (spec §1); this is just the thin HTTP
//! wrapper around it, following the `reqwest`-client idiom used
//! throughout the broader example pack for outbound model/API calls.

use async_trait::async_trait;
use oj_core::plan::ActionPlan;
use serde::{Deserialize, Serialize};

use crate::source::{parse_or_fallback, system_instruction, PlanSource};

pub struct HttpPlanSource {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpPlanSource {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key,
            model: "gpt-4".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl PlanSource for HttpPlanSource {
    async fn analyze(&self, prompt: &str) -> ActionPlan {
        let mut request = self
            .client
            .post(&self.api_url)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage { role: "system", content: system_instruction() },
                    ChatMessage { role: "user", content: prompt },
                ],
                temperature: 0.2,
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "analyzer request failed, falling back to the echo plan");
                return ActionPlan::fallback();
            }
        };

        let body: ChatResponse = match response.error_for_status() {
            Ok(response) => match response.json().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::error!(error = %err, "analyzer response body did not parse, falling back to the echo plan");
                    return ActionPlan::fallback();
                }
            },
            Err(err) => {
                tracing::error!(error = %err, "analyzer request returned an error status, falling back to the echo plan");
                return ActionPlan::fallback();
            }
        };

        let Some(choice) = body.choices.into_iter().next() else {
            tracing::warn!("analyzer returned no choices, falling back to the echo plan");
            return ActionPlan::fallback();
        };

        parse_or_fallback(&choice.message.content)
    }
}
