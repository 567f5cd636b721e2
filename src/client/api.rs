use async_trait::async_trait;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::RwLock;
use std::time::Duration;

use crate::client::remote::{unwrap_status, GameRemote, RemoteError};
use crate::config::ServerConfig;
use crate::o_trace;

/// HTTP transport to the Simeis server. Every endpoint is a GET with its
/// arguments in the path and the player key in the query string.
pub struct SimeisClient {
    client: reqwest::Client,
    base_url: String,
    key: RwLock<Option<String>>,
    api_logging: bool,
    api_log_path: String,
}

impl SimeisClient {
    pub fn new(server: &ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let timeout = Duration::try_from_secs_f64(server.request_timeout_seconds)
            .map_err(|e| format!("invalid request timeout {}: {}", server.request_timeout_seconds, e))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(SimeisClient {
            client,
            base_url: server.url.trim_end_matches('/').to_string(),
            key: RwLock::new(None),
            api_logging: server.api_logging,
            api_log_path: server.api_log_path.clone(),
        })
    }

    pub fn set_api_logging(&mut self, logging: bool) {
        self.api_logging = logging;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn current_key(&self) -> Option<String> {
        self.key.read().ok().and_then(|key| key.clone())
    }

    fn log_api_call(&self, url: &str, query: &[(&str, String)], response_status: u16, response_body: &str) {
        if !self.api_logging {
            return;
        }

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let shown_query: Vec<String> = query
            .iter()
            .map(|(name, value)| if *name == "key" { format!("{}=***", name) } else { format!("{}={}", name, value) })
            .collect();
        let log_entry = format!(
            "\n=== API CALL [{timestamp}] ===\n\
             URL: {url}\n\
             Query: {query}\n\
             Response Status: {response_status}\n\
             Response Body: {response_body}\n\
             ========================================\n",
            timestamp = timestamp,
            url = url,
            query = shown_query.join("&"),
            response_status = response_status,
            response_body = response_body,
        );

        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.api_log_path)
        {
            let _ = file.write_all(log_entry.as_bytes());
        }
    }
}

#[async_trait]
impl GameRemote for SimeisClient {
    async fn call(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, RemoteError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut query: Vec<(&str, String)> = params.to_vec();
        if let Some(key) = self.current_key() {
            query.push(("key", key));
        }

        o_trace!("🌐 GET {}", endpoint);
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| RemoteError::unreachable(format!("{}: {}", endpoint, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::unreachable(format!("{}: {}", endpoint, e)))?;
        self.log_api_call(&url, &query, status, &body);

        let reply: Value = serde_json::from_str(&body).map_err(|e| {
            RemoteError::unreachable(format!("malformed reply from {} (HTTP {}): {}", endpoint, status, e))
        })?;
        unwrap_status(reply)
    }

    fn authenticate(&self, key: &str) {
        if let Ok(mut current) = self.key.write() {
            *current = Some(key.to_string());
        }
    }
}
