//! Fact ledger node
//!
//! Opens the backing store (degrading to memory-only if unavailable),
//! replays the persisted chain, mines genesis on first start, and serves
//! the HTTP gateway.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use factchain::api::{serve, AppState, RateLimiter};
use factchain::attachments::AttachmentStore;
use factchain::config::LedgerConfig;
use factchain::mining::MinerPool;
use factchain::storage::{ChainStore, LedgerDb};
use factchain::validation::FactValidator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config = LedgerConfig::default();
    if let Ok(port) = std::env::var("FACTCHAIN_PORT") {
        config.listen_port = port.parse()?;
    }
    if let Ok(path) = std::env::var("FACTCHAIN_DATA") {
        config.db_path = path.clone().into();
        config.attachment_dir = format!("{path}-multimedia").into();
    }
    let config = Arc::new(config);

    info!(
        difficulty = config.difficulty,
        port = config.listen_port,
        "fact ledger node starting"
    );

    let db = match LedgerDb::open(&config.db_path) {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(error = %e, "backing store unreachable; running memory-only");
            None
        }
    };

    let chain = Arc::new(ChainStore::new(config.clone(), db.clone()));
    chain.load();
    if let Err(e) = chain.ensure_genesis() {
        return Err(format!("genesis append failed: {e}").into());
    }
    info!(
        blocks = chain.len(),
        valid = chain.is_valid(),
        "chain ready"
    );

    let state = Arc::new(AppState {
        validator: FactValidator::new(config.clone()),
        miner_pool: MinerPool::new(config.mining_workers, config.mining_timeout),
        limiter: RateLimiter::new(),
        submit_lock: Mutex::new(()),
        attachments: Arc::new(AttachmentStore::new(config.clone(), db)),
        chain,
        config: config.clone(),
    });

    serve(state, config.listen_port).await?;
    Ok(())
}
