use crate::history::iso_timestamp;
use crate::llm::chat::CompletionOptions;
use crate::models::api::{ ChatRequest, ChatResponse, ErrorBody, ReplyBody };
use crate::models::chat::Role;
use crate::ratelimit::RateDecision;
use super::shutdown::shutdown_signal;
use super::state::AppState;
use std::error::Error;
use std::net::SocketAddr;
use axum::{
    body::to_bytes,
    extract::{ ConnectInfo, Request, State },
    http::{ header, StatusCode },
    middleware::{ self, Next },
    response::{ IntoResponse, Response },
    routing::{ get, post },
    Json,
    Router,
};
use tower_http::cors::{ Any, CorsLayer };
use tower_http::services::ServeDir;
use log::{ debug, error, info, warn };

pub const APP_TOKEN_HEADER: &str = "X-APP-TOKEN";
pub const EMPTY_MESSAGE_REPLY: &str = "Please type a message.";
pub const UNAUTHORIZED_REPLY: &str = "[Unauthorized — missing or invalid app token]";
pub const INVALID_BODY_REPLY: &str = "[Invalid request body]";
pub const SERVER_BUSY_REPLY: &str = "[Server busy — try again shortly]";
pub const NO_CONVERSATION_FILE: &str = "No conversation file found.";

const MAX_BODY_BYTES: usize = 1024 * 1024;

fn reply(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(ReplyBody::new(text))).into_response()
}

fn client_id(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let frontend = ServeDir::new(&state.config.frontend_dir);

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/conversation.json", get(download_handler))
        .fallback_service(frontend)
        .layer(middleware::from_fn_with_state(state.clone(), global_limit))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(state: AppState) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = tokio::net::lookup_host(state.config.server_addr.as_str()).await?
        .next()
        .ok_or_else(|| format!("Could not resolve server address '{}'", state.config.server_addr))?;
    let tls = state.config.tls.clone();
    let app = app(state).into_make_service_with_connect_info::<SocketAddr>();

    if let Some(tls) = tls {
        info!(
            "TLS enabled. Loading certificate from '{}' and key from '{}'",
            tls.cert_path,
            tls.key_path
        );
        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            &tls.cert_path,
            &tls.key_path
        ).await?;

        info!("Starting HTTPS server on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config).serve(app).await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
            e
        })?;

        info!("Starting HTTP server on: http://{}", addr);
        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    }

    Ok(())
}

async fn global_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(limiter) = &state.global_limiter {
        if limiter.check().is_err() {
            warn!("Global request rate limit exceeded. Rejecting {}", request.uri());
            return reply(StatusCode::SERVICE_UNAVAILABLE, SERVER_BUSY_REPLY);
        }
    }
    next.run(request).await
}

async fn chat_handler(State(state): State<AppState>, request: Request) -> Response {
    let client = client_id(&request);

    let decision = state.limiter.lock().await.check(&client);
    if let RateDecision::Denied { retry_after } = decision {
        warn!("{}: rate limit exceeded, retry in {:?}", client, retry_after);
        return reply(
            StatusCode::TOO_MANY_REQUESTS,
            format!("[Rate limit exceeded — try again in {}s]", retry_after.as_secs())
        );
    }

    if let Some(required) = &state.config.app_token {
        let provided = request
            .headers()
            .get(APP_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if provided.is_empty() || provided != required.as_str() {
            warn!("{}: bad or missing app token", client);
            return reply(StatusCode::UNAUTHORIZED, UNAUTHORIZED_REPLY);
        }
    }

    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("{}: failed to read request body: {}", client, e);
            return reply(StatusCode::BAD_REQUEST, INVALID_BODY_REPLY);
        }
    };
    let req = match serde_json::from_slice::<ChatRequest>(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!("{}: failed to parse chat request: {}", client, e);
            return reply(StatusCode::BAD_REQUEST, INVALID_BODY_REPLY);
        }
    };

    let message = req.message.as_deref().unwrap_or("").trim();
    if message.is_empty() {
        return reply(StatusCode::OK, EMPTY_MESSAGE_REPLY);
    }

    let model = req.model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.config.default_model.clone());

    let mut conversation = state.conversation.lock().await;
    if let Some(persona) = req.persona.as_deref().filter(|p| !p.is_empty()) {
        debug!("{}: persona override applied", client);
        conversation.set_persona(persona);
    }
    conversation.append_message(Role::User, message);

    let reply_text = state.chat_client
        .complete_text(conversation.messages(), &model, CompletionOptions::default()).await;

    conversation.append_message(Role::Assistant, reply_text.clone());
    conversation.persist().await;
    info!("{}: completed turn with {} ({} messages)", client, model, conversation.len());
    drop(conversation);

    Json(ChatResponse {
        reply: reply_text,
        timestamp: iso_timestamp(),
        model,
    }).into_response()
}

async fn download_handler(State(state): State<AppState>) -> Response {
    match state.snapshot_log.read_raw().await {
        Ok(Some(bytes)) =>
            (
                [
                    (header::CONTENT_TYPE, "application/json"),
                    (header::CONTENT_DISPOSITION, "attachment; filename=\"conversation.json\""),
                ],
                bytes,
            ).into_response(),
        Ok(None) =>
            (
                StatusCode::NOT_FOUND,
                Json(ErrorBody { error: NO_CONVERSATION_FILE.to_string() }),
            ).into_response(),
        Err(e) => {
            error!("Failed to read {}: {}", state.snapshot_log.path().display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { error: e.to_string() }),
            ).into_response()
        }
    }
}
