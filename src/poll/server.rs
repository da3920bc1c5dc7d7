//! Poll server

use crate::common::http::serve;
use crate::common::{Config, RequestStats, Result, Storage};
use crate::poll::http::{create_router, PollState};
use crate::poll::store::PollStore;

pub struct PollServer {
    config: Config,
}

impl PollServer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr(self.config.poll.port);
        tracing::info!("Starting poll service v{}", crate::VERSION);
        tracing::info!("  HTTP API: {}", addr);
        tracing::info!("  Storage: {:?}", self.config.storage.backend);

        let storage = Storage::open(&self.config.storage).await?;
        let state = PollState {
            store: PollStore::new(storage),
            stats: RequestStats::shared(),
        };

        serve(create_router(state), &addr).await
    }
}
