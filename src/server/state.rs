use std::sync::Arc;
use std::time::Instant;

use crate::server::config::ServerConfig;
use crate::server::error::{ServerError, ServerResult};
use crate::source::DocumentFetcher;
use crate::store::JobStore;

/// Shared application state
#[derive(Debug, Clone,)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig,>,

    /// Finished jobs keyed by kickoff id
    pub store: Arc<JobStore,>,

    /// HTTP client for `xml_url`
    pub fetcher: Arc<DocumentFetcher,>,

    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig,) -> ServerResult<Self,> {
        let fetcher = DocumentFetcher::new(config.fetch_policy(),).map_err(ServerError::from,)?;
        let store = JobStore::new(config.store_policy(),);

        Ok(Self {
            config: Arc::new(config,),
            store: Arc::new(store,),
            fetcher: Arc::new(fetcher,),
            started_at: Instant::now(),
        },)
    }

    pub fn uptime_seconds(&self,) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
