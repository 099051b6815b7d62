pub mod api;
pub mod shutdown;
pub mod state;

use self::state::AppState;
use std::error::Error;
use std::time::{ Duration, Instant };
use log::{ debug, info, warn };

pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        if state.config.app_token.is_some() {
            info!("Server configured with app token authentication.");
        } else {
            warn!("Server configured WITHOUT app token authentication. /chat is open.");
        }

        Self { state }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(every) = self.state.config.rate_limit_sweep {
            self.spawn_rate_limit_sweeper(every);
        }

        api::start_http_server(self.state.clone()).await
    }

    fn spawn_rate_limit_sweeper(&self, every: Duration) {
        let limiter = self.state.limiter.clone();
        info!("Evicting expired rate-limit records every {:?}", every);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut guard = limiter.lock().await;
                let removed = guard.sweep_expired(Instant::now());
                if removed > 0 {
                    debug!(
                        "Removed {} expired rate-limit records, {} still tracked",
                        removed,
                        guard.tracked_clients()
                    );
                }
            }
        });
    }
}
