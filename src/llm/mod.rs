pub mod chat;

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: String,
    pub base_url: String,
    pub timeout: Duration,
}
