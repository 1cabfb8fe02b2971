use crate::{
    api::{BatchResult, TextResult, ValidateApi},
    config::Config,
    download::trigger_download,
    export::{format_as_json, format_as_plain_text, format_rows_as_csv},
    util::make_filename,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Lifecycle of one result slot. A failed call reverts to `Empty`; there is
/// no distinct error state, the alert side-channel is the only report.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Empty,
    Loading,
    Populated(T),
}

impl<T> Slot<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Slot::Populated(v) => Some(v),
            _ => None,
        }
    }
}

/// User-facing alert channel. The CLI prints to stderr; tests record.
pub trait Notifier {
    fn alert(&self, message: &str);
}

pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Two independent result slots plus the export routing between them.
/// Replaced wholesale per call; both may hold stale data at once, in which
/// case `download_latest` prefers the batch slot (fixed policy).
pub struct Session<A: ValidateApi, N: Notifier> {
    api: A,
    notifier: N,
    out_dir: PathBuf,
    pub text: Slot<TextResult>,
    pub batch: Slot<BatchResult>,
    selected_file: Option<PathBuf>,
}

impl<A: ValidateApi, N: Notifier> Session<A, N> {
    pub fn new(cfg: &Config, api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            out_dir: PathBuf::from(&cfg.output.dir),
            text: Slot::Empty,
            batch: Slot::Empty,
            selected_file: None,
        }
    }

    /// No-op for blank input; a failed call leaves the slot Empty and raises
    /// exactly one alert.
    pub fn submit_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        self.text = Slot::Loading;
        match self.api.validate_text(text) {
            Ok(res) => {
                info!("text result status={} score={}", res.status, res.score);
                self.text = Slot::Populated(res);
            }
            Err(err) => {
                warn!("text validation failed: {err:#}");
                self.text = Slot::Empty;
                self.notifier.alert("Failed to reach the validation API.");
            }
        }
    }

    /// Takes the first path of a selection; empty selections are ignored.
    /// No client-side validation of type, size, or content.
    pub fn select_file(&mut self, selection: &[PathBuf]) {
        if let Some(first) = selection.first() {
            self.selected_file = Some(first.clone());
        }
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    /// No-op without a selected file; same slot lifecycle as `submit_text`,
    /// independent slot.
    pub fn submit_file(&mut self) {
        let Some(file) = self.selected_file.clone() else {
            return;
        };

        self.batch = Slot::Loading;
        match self.api.validate_csv(&file) {
            Ok(res) => {
                info!("batch result total={} rows={}", res.total, res.rows.len());
                self.batch = Slot::Populated(res);
            }
            Err(err) => {
                warn!("csv validation failed: {err:#}");
                self.batch = Slot::Empty;
                self.notifier.alert("Failed to process the CSV file.");
            }
        }
    }

    /// Fixed priority: a populated batch slot with non-empty rows wins over
    /// the text slot; an empty session is a no-op.
    pub fn download_latest(&self) -> Result<Option<PathBuf>> {
        if let Some(batch) = self.batch.populated() {
            if !batch.rows.is_empty() {
                return self.download_batch_csv();
            }
        }
        if self.text.populated().is_some() {
            return self.download_text_plain();
        }
        Ok(None)
    }

    pub fn download_text_plain(&self) -> Result<Option<PathBuf>> {
        let Some(res) = self.text.populated() else {
            return Ok(None);
        };
        let anonymized = res.anonymized_text.as_deref().unwrap_or_default();
        let Some(bytes) = format_as_plain_text(anonymized) else {
            return Ok(None);
        };
        let name = make_filename("safedoc_texto_anonimizado", "txt");
        self.save(&bytes, &name, "text/plain")
    }

    pub fn download_text_json(&self) -> Result<Option<PathBuf>> {
        let Some(res) = self.text.populated() else {
            return Ok(None);
        };
        let Some(bytes) = self.json_or_alert(res) else {
            return Ok(None);
        };
        let name = make_filename("safedoc_resultado_texto", "json");
        self.save(&bytes, &name, "application/json")
    }

    pub fn download_batch_json(&self) -> Result<Option<PathBuf>> {
        let Some(res) = self.batch.populated() else {
            return Ok(None);
        };
        let Some(bytes) = self.json_or_alert(res) else {
            return Ok(None);
        };
        let name = make_filename("safedoc_resultado_lote", "json");
        self.save(&bytes, &name, "application/json")
    }

    pub fn download_batch_csv(&self) -> Result<Option<PathBuf>> {
        let Some(res) = self.batch.populated() else {
            return Ok(None);
        };
        let Some(bytes) = format_rows_as_csv(&res.rows) else {
            return Ok(None);
        };
        let name = make_filename("safedoc_resultado_lote", "csv");
        self.save(&bytes, &name, "text/csv")
    }

    /// Serialization failure surfaces an alert instead of crashing; data is
    /// never silently dropped.
    fn json_or_alert<T: serde::Serialize>(&self, value: &T) -> Option<Vec<u8>> {
        match format_as_json(value) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!("JSON export failed: {err:#}");
                self.notifier.alert("Failed to serialize the result for export.");
                None
            }
        }
    }

    fn save(&self, bytes: &[u8], filename: &str, mime: &str) -> Result<Option<PathBuf>> {
        let path = trigger_download(bytes, filename, mime, &self.out_dir)?;
        Ok(Some(path))
    }
}
