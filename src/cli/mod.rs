use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Upstream Completion Args ---
    /// API key for the Groq chat completion API. Leave empty to run without an upstream.
    #[arg(long, env = "GROQ_API_KEY", default_value = "")]
    pub groq_api_key: String,

    /// Default model used when the client does not ask for one.
    #[arg(long, env = "GROQ_MODEL", default_value = "openai/gpt-oss-20b")]
    pub groq_model: String,

    /// Base URL of the OpenAI-compatible API; requests go to {base}/chat/completions
    #[arg(long, env = "GROQ_BASE_URL", default_value = "https://api.groq.com/openai/v1")]
    pub groq_base_url: String,

    /// Timeout in seconds for a single completion request.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "60")]
    pub upstream_timeout_secs: u64,

    // --- Access Control Args ---
    /// Shared secret clients must send in X-APP-TOKEN. Empty disables the check.
    #[arg(long, env = "APP_TOKEN", default_value = "")]
    pub app_token: String,

    /// Maximum chat requests per client within one window.
    #[arg(long, env = "RATE_LIMIT_MAX", default_value = "30")]
    pub rate_limit_max: u32,

    /// Length of the fixed rate-limit window in seconds.
    #[arg(long, env = "RATE_LIMIT_WINDOW", default_value = "60")]
    pub rate_limit_window: u64,

    /// Interval in seconds for evicting expired rate-limit records. 0 keeps every record.
    #[arg(long, env = "RATE_LIMIT_SWEEP_SECS", default_value = "0")]
    pub rate_limit_sweep_secs: u64,

    /// Requests per second accepted across all clients. 0 disables the global limit.
    #[arg(long, env = "GLOBAL_RATE_LIMIT", default_value = "0")]
    pub global_rate_limit: u32,

    // --- General App Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:5000")]
    pub server_addr: String,

    /// Directory holding the bundled frontend (index.html, chat.js).
    #[arg(long, env = "FRONTEND_DIR", default_value = "static")]
    pub frontend_dir: String,

    /// JSON file that accumulates conversation snapshots.
    #[arg(long, env = "CONVERSATION_PATH", default_value = "conversation.json")]
    pub conversation_path: String,

    /// Optional path to the TLS certificate file (PEM format) for serving HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for serving HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
