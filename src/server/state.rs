use crate::config::AppConfig;
use crate::history::{ ConversationStore, SnapshotLog };
use crate::llm::chat::ChatClient;
use crate::ratelimit::{ self, FixedWindowLimiter };
use governor::DefaultDirectRateLimiter;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub chat_client: Arc<dyn ChatClient>,
    /// Held for a whole chat turn, so turns and snapshot writes never interleave.
    pub conversation: Arc<Mutex<ConversationStore>>,
    pub limiter: Arc<Mutex<FixedWindowLimiter>>,
    pub global_limiter: Option<Arc<DefaultDirectRateLimiter>>,
    pub snapshot_log: SnapshotLog,
}

impl AppState {
    pub fn new(config: AppConfig, chat_client: Arc<dyn ChatClient>) -> Self {
        let snapshot_log = SnapshotLog::new(config.conversation_path.clone());
        let limiter = FixedWindowLimiter::new(config.rate_limit_max, config.rate_limit_window);
        let global_limiter = config.global_rate_limit.map(|rps| Arc::new(ratelimit::global_limiter(rps)));

        Self {
            chat_client,
            conversation: Arc::new(Mutex::new(ConversationStore::new(snapshot_log.clone()))),
            limiter: Arc::new(Mutex::new(limiter)),
            global_limiter,
            snapshot_log,
            config: Arc::new(config),
        }
    }
}
