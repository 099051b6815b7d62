use crate::cli::Args;
use crate::llm::LlmConfig;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::{ Duration, Instant };
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("RATE_LIMIT_MAX must be at least 1")]
    ZeroRateLimit,
    #[error("RATE_LIMIT_WINDOW must be at least 1 second")]
    ZeroWindow,
    #[error("RATE_LIMIT_WINDOW of {0} seconds is too large")]
    WindowTooLarge(u64),
    #[error("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.")]
    IncompleteTls,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

/// Runtime settings resolved from the command line and environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub default_model: String,
    pub base_url: String,
    pub upstream_timeout: Duration,
    pub app_token: Option<String>,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    pub rate_limit_sweep: Option<Duration>,
    pub global_rate_limit: Option<NonZeroU32>,
    pub server_addr: String,
    pub frontend_dir: PathBuf,
    pub conversation_path: PathBuf,
    pub tls: Option<TlsPaths>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            upstream_timeout: Duration::from_secs(60),
            app_token: None,
            rate_limit_max: 30,
            rate_limit_window: Duration::from_secs(60),
            rate_limit_sweep: None,
            global_rate_limit: None,
            server_addr: "127.0.0.1:5000".to_string(),
            frontend_dir: PathBuf::from("static"),
            conversation_path: PathBuf::from("conversation.json"),
            tls: None,
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.rate_limit_max == 0 {
            return Err(ConfigError::ZeroRateLimit);
        }
        if args.rate_limit_window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        let rate_limit_window = Duration::from_secs(args.rate_limit_window);
        if Instant::now().checked_add(rate_limit_window).is_none() {
            return Err(ConfigError::WindowTooLarge(args.rate_limit_window));
        }

        let tls = if args.enable_tls {
            match (&args.tls_cert_path, &args.tls_key_path) {
                (Some(cert_path), Some(key_path)) => Some(TlsPaths {
                    cert_path: cert_path.clone(),
                    key_path: key_path.clone(),
                }),
                _ => {
                    return Err(ConfigError::IncompleteTls);
                }
            }
        } else {
            None
        };

        Ok(Self {
            api_key: non_blank(&args.groq_api_key),
            default_model: non_blank(&args.groq_model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_blank(&args.groq_base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            upstream_timeout: Duration::from_secs(args.upstream_timeout_secs.max(1)),
            app_token: non_blank(&args.app_token),
            rate_limit_max: args.rate_limit_max,
            rate_limit_window,
            rate_limit_sweep: Some(args.rate_limit_sweep_secs)
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            global_rate_limit: NonZeroU32::new(args.global_rate_limit),
            server_addr: args.server_addr.clone(),
            frontend_dir: PathBuf::from(&args.frontend_dir),
            conversation_path: PathBuf::from(&args.conversation_path),
            tls,
        })
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.api_key.clone(),
            completion_model: self.default_model.clone(),
            base_url: self.base_url.clone(),
            timeout: self.upstream_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["chatty-proxy", "--groq-api-key", "", "--groq-model", DEFAULT_MODEL];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn blank_secrets_are_treated_as_unset() {
        let args = parse(&["--app-token", "   "]);
        let config = AppConfig::from_args(&args).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.app_token, None);
        assert_eq!(config.default_model, DEFAULT_MODEL);
    }

    #[test]
    fn zero_limits_are_rejected_or_disabled() {
        let args = parse(&["--app-token", "", "--rate-limit-max", "0"]);
        assert_eq!(AppConfig::from_args(&args).unwrap_err(), ConfigError::ZeroRateLimit);

        let args = parse(&["--rate-limit-window", "0"]);
        assert_eq!(AppConfig::from_args(&args).unwrap_err(), ConfigError::ZeroWindow);

        let args = parse(&["--rate-limit-sweep-secs", "0", "--global-rate-limit", "0"]);
        let config = AppConfig::from_args(&args).unwrap();
        assert!(config.rate_limit_sweep.is_none());
        assert!(config.global_rate_limit.is_none());
    }

    #[test]
    fn oversized_window_is_rejected() {
        let max = u64::MAX.to_string();
        let args = parse(&["--rate-limit-window", max.as_str()]);
        assert_eq!(AppConfig::from_args(&args).unwrap_err(), ConfigError::WindowTooLarge(u64::MAX));

        let args = parse(&["--rate-limit-window", "86400"]);
        let config = AppConfig::from_args(&args).unwrap();
        assert_eq!(config.rate_limit_window, Duration::from_secs(86400));
    }

    #[test]
    fn tls_requires_both_paths() {
        let args = parse(&["--enable-tls", "--tls-cert-path", "cert.pem"]);
        assert_eq!(AppConfig::from_args(&args).unwrap_err(), ConfigError::IncompleteTls);

        let args = parse(&[
            "--enable-tls",
            "--tls-cert-path",
            "cert.pem",
            "--tls-key-path",
            "key.pem",
        ]);
        let config = AppConfig::from_args(&args).unwrap();
        assert_eq!(
            config.tls,
            Some(TlsPaths { cert_path: "cert.pem".into(), key_path: "key.pem".into() })
        );
    }
}
