//! Shared state for the Web API server.
//!
//! Everything a handler needs travels in [`AppState`]; handlers pull out the
//! piece they use with `State<Arc<..>>` via `FromRef`.

use std::sync::Arc;

use axum::extract::FromRef;

use super::auth::{ServerAuth, SlackAuth};
use crate::storage::config::Config;
use crate::storage::Database;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: Arc<Database>,
    pub api_auth: Arc<ServerAuth>,
    pub slack_auth: Arc<SlackAuth>,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Self {
        if config.slack.signing_secret.is_none() {
            tracing::warn!("no Slack signing secret configured, slash commands are not verified");
        }

        Self {
            db: Arc::new(db),
            api_auth: Arc::new(ServerAuth::new(config.api.secret_key.clone())),
            slack_auth: Arc::new(SlackAuth::new(config.slack.signing_secret.clone())),
        }
    }

    /// Open state without any authentication.
    #[cfg(test)]
    pub fn unauthenticated(db: Database) -> Self {
        Self {
            db: Arc::new(db),
            api_auth: Arc::new(ServerAuth::no_auth()),
            slack_auth: Arc::new(SlackAuth::disabled()),
        }
    }
}
