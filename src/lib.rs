pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod ratelimit;
pub mod server;

use cli::Args;
use config::AppConfig;
use log::{ info, warn };
use server::state::AppState;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Server Address: {}", config.server_addr);
    info!("Default Model: {}", config.default_model);
    info!("Upstream Endpoint: {}", config.base_url);
    info!("Upstream API Key: {}", if config.api_key.is_some() { "set" } else { "NOT set" });
    info!("App Token Auth: {}", if config.app_token.is_some() { "enabled" } else { "disabled" });
    info!(
        "Rate Limit: {} requests / {}s per client",
        config.rate_limit_max,
        config.rate_limit_window.as_secs()
    );
    if let Some(rps) = config.global_rate_limit {
        info!("Global Rate Limit: {} requests/s", rps);
    }
    info!("Frontend Path: {}", config.frontend_dir.display());
    info!("Conversation File: {}", config.conversation_path.display());
    info!("-------------------------");

    if !config.frontend_dir.join("index.html").is_file() {
        warn!("No index.html found in {}; / will answer 404", config.frontend_dir.display());
    }

    let chat_client = llm::chat::new_client(&config.llm_config())?;
    let state = AppState::new(config, chat_client);
    let server = Server::new(state);
    server.run().await?;

    Ok(())
}
