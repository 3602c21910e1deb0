//! `dolt serve`

use crate::api::{self, AppState};
use crate::error::Result;
use crate::storage::config::Config;
use crate::storage::Database;

pub fn execute(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let db_path = config.database.resolved_path();
    let db = Database::open(&db_path)?;
    tracing::info!(path = %db_path.display(), "database opened");

    let state = AppState::new(db, config);
    tokio::runtime::Runtime::new()?.block_on(api::start_server(&host, port, state))?;
    Ok(())
}
