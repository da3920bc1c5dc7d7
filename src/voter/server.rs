//! Voter server

use crate::common::http::serve;
use crate::common::{Config, RequestStats, Result, Storage};
use crate::voter::http::{create_router, VoterState};
use crate::voter::store::VoterStore;

pub struct VoterServer {
    config: Config,
}

impl VoterServer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr(self.config.voter.port);
        tracing::info!("Starting voter service v{}", crate::VERSION);
        tracing::info!("  HTTP API: {}", addr);
        tracing::info!("  Storage: {:?}", self.config.storage.backend);

        let storage = Storage::open(&self.config.storage).await?;
        let state = VoterState {
            store: VoterStore::new(storage),
            stats: RequestStats::shared(),
        };

        serve(create_router(state), &addr).await
    }
}
