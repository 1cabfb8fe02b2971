use super::{types::*, ValidateApi};
use crate::config::Config;
use anyhow::{Context, Result};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(cfg: &Config) -> Result<Self> {
        let timeout = if cfg.api.timeout_seconds > 0 {
            Some(Duration::from_secs(cfg.api.timeout_seconds))
        } else {
            None
        };
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .with_context(|| "building HTTP client")?;
        Ok(Self {
            client,
            base_url: cfg.api.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl ValidateApi for HttpApi {
    fn health(&self) -> Result<ApiHealth> {
        let url = self.url("/health");
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| "health check")?;
        resp.json().with_context(|| "parsing health response")
    }

    fn validate_text(&self, text: &str) -> Result<TextResult> {
        let url = self.url("/validate/text");
        debug!("POST {url} text_len={}", text.len());
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "texto": text }))
            .send()
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| "text validation")?;
        resp.json().with_context(|| "parsing text validation response")
    }

    fn validate_csv(&self, file: &Path) -> Result<BatchResult> {
        let url = self.url("/validate/csv");
        debug!("POST {url} file={}", file.display());
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.csv")
            .to_string();
        let bytes =
            std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")
            .with_context(|| "building multipart file field")?;
        let form = Form::new().part("file", part);
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| "csv validation")?;
        resp.json().with_context(|| "parsing csv validation response")
    }
}
