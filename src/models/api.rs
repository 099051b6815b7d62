use serde::{ Serialize, Deserialize };

#[derive(Deserialize, Debug, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub persona: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub reply: String,
    pub timestamp: String,
    pub model: String,
}

/// Body used for every short-circuit answer of the chat endpoint.
#[derive(Serialize, Deserialize, Debug)]
pub struct ReplyBody {
    pub reply: String,
}

impl ReplyBody {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}
