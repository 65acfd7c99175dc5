use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Telegram refuses longer message texts, counted in UTF-16 code units.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Delivers one message to one recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<()>;
}

pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    token: String,
}

impl TelegramNotifier {
    pub fn new(api_url: impl Into<String>, token: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<()> {
        let length = text.encode_utf16().count();
        if length > MAX_MESSAGE_CHARS {
            return Err(AppError::Telegram(format!(
                "message too long: {} UTF-16 units (limit {})",
                length, MAX_MESSAGE_CHARS
            )));
        }

        let request = SendMessageRequest {
            chat_id: recipient_id,
            text,
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Telegram reports failures as `{"ok": false, "description": ...}`,
        // usually with a 4xx status.
        let api_response: Option<ApiResponse> = serde_json::from_str(&body).ok();
        match api_response {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse {
                description: Some(description),
                ..
            }) => Err(AppError::Telegram(format!("{} ({})", description, status))),
            _ => Err(AppError::Telegram(format!("API error ({}): {}", status, body))),
        }
    }
}
