pub mod http;
pub mod types;

use anyhow::Result;
use std::path::Path;

pub use http::HttpApi;
pub use types::{ApiHealth, BatchResult, RowResult, TextResult};

pub trait ValidateApi {
    fn health(&self) -> Result<ApiHealth>;
    fn validate_text(&self, text: &str) -> Result<TextResult>;
    fn validate_csv(&self, file: &Path) -> Result<BatchResult>;
}
