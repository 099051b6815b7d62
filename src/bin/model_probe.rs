use chatty_proxy::config::{ DEFAULT_BASE_URL, DEFAULT_MODEL };
use chatty_proxy::llm::chat::groq::GroqChatClient;
use clap::Parser;
use dotenv::dotenv;
use log::error;
use std::process::ExitCode;
use std::time::Duration;

/// Sends one prompt to the completion endpoint and prints the raw answer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct ProbeArgs {
    #[arg(long, env = "GROQ_API_KEY", default_value = "")]
    groq_api_key: String,

    #[arg(long, env = "GROQ_MODEL", default_value = DEFAULT_MODEL)]
    groq_model: String,

    #[arg(long, env = "GROQ_BASE_URL", default_value = DEFAULT_BASE_URL)]
    groq_base_url: String,

    #[arg(long, default_value = "Hello")]
    prompt: String,

    #[arg(long, default_value = "32")]
    max_tokens: u32,

    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "60")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = ProbeArgs::parse();

    let client = match GroqChatClient::new(
        Some(args.groq_api_key),
        Some(args.groq_model),
        Some(args.groq_base_url),
        Duration::from_secs(args.timeout_secs.max(1)),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match client.probe(&args.prompt, args.max_tokens).await {
        Ok((status, body)) => {
            println!("STATUS: {}", status);
            match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(json) => {
                    let pretty = serde_json::to_string_pretty(&json).unwrap_or(body);
                    println!("{}", pretty);
                }
                Err(_) => println!("BODY: {}", body),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
