use serde::{Deserialize, Serialize};

/// Response of `POST /validate/text`. Field names on the wire follow the
/// collaborator service; match records are opaque to this client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResult {
    pub status: String,
    pub score: f64,
    #[serde(default)]
    pub total_matches: u64,
    #[serde(default)]
    pub matches: Vec<serde_json::Value>,
    #[serde(rename = "texto_anonimizado", default)]
    pub anonymized_text: Option<String>,
}

/// Response of `POST /validate/csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub total: u64,
    #[serde(rename = "resultados", default)]
    pub rows: Vec<RowResult>,
}

/// One line-item outcome within a batch response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowResult {
    pub index: u64,
    pub status: String,
    pub score: f64,
    #[serde(rename = "texto_anonimizado", default)]
    pub anonymized_text: Option<String>,
    /// String, structured value, or absent; never interpreted here.
    #[serde(default)]
    pub matches: Option<serde_json::Value>,
    #[serde(rename = "texto_original_preview", default, skip_serializing_if = "Option::is_none")]
    pub original_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_matches: Option<u64>,
}

impl RowResult {
    pub fn new(index: u64, status: &str, score: f64) -> Self {
        Self {
            index,
            status: status.to_string(),
            score,
            anonymized_text: None,
            matches: None,
            original_preview: None,
            total_matches: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}
