//! Votes server

use std::sync::Arc;

use crate::common::http::serve;
use crate::common::{Config, RequestStats, Result, Storage};
use crate::votes::client::HttpRegistry;
use crate::votes::http::{create_router, VotesState};
use crate::votes::store::VoteStore;
use crate::votes::workflow::VoteWorkflow;

pub struct VotesServer {
    config: Config,
}

impl VotesServer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        let votes = &self.config.votes;
        let addr = self.config.bind_addr(votes.port);
        tracing::info!("Starting votes service v{}", crate::VERSION);
        tracing::info!("  HTTP API: {}", addr);
        tracing::info!("  Storage: {:?}", self.config.storage.backend);
        tracing::info!("  Voter API: {}", votes.voter_api_url);
        tracing::info!("  Poll API: {}", votes.poll_api_url);

        let storage = Storage::open(&self.config.storage).await?;
        let registry = Arc::new(HttpRegistry::from_config(votes));
        let state = VotesState {
            workflow: VoteWorkflow::new(VoteStore::new(storage), registry),
            stats: RequestStats::shared(),
        };

        serve(create_router(state), &addr).await
    }
}
