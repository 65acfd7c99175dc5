#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use factcast::ai::{FactGenerator, GenerationBackend, GenerationParams};
use factcast::config::Language;
use factcast::error::{AppError, Result};
use factcast::models::FixedClock;
use factcast::services::Notifier;
use factcast::store::TopicStore;
use factcast::{App, RunSettings};

/// Backend returning a canned reply, or failing when `reply` is `None`.
pub struct ScriptedBackend {
    pub reply: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.calls.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| AppError::Generation("API error (500 Internal Server Error)".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Notifier that records every message, optionally failing instead.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::Telegram("Forbidden: bot was blocked by the user".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient_id.to_string(), text.to_string()));
        Ok(())
    }
}

pub fn write_table(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("topic.csv");
    std::fs::write(&path, content).unwrap();
    path
}

pub fn settings(language: Language) -> RunSettings {
    RunSettings {
        recipient_id: "42".to_string(),
        timezone: chrono_tz::Europe::Moscow,
        timezone_label: "МСК".to_string(),
        language,
    }
}

/// 2024-01-01 07:00 UTC, i.e. 10:00 in Moscow.
pub fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap())
}

pub fn build_app(
    path: &Path,
    backend: Box<dyn GenerationBackend>,
    notifier: Box<dyn Notifier>,
    language: Language,
) -> App {
    App::from_parts(
        TopicStore::new(path),
        FactGenerator::new(backend, GenerationParams::default(), language),
        notifier,
        Box::new(fixed_clock()),
        settings(language),
    )
}

/// Answer exactly one HTTP request with `status` and `body`, returning the raw request.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// JSON body of a captured raw request.
pub fn request_body(request: &str) -> serde_json::Value {
    let (_, body) = request.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}
