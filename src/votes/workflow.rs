//! Vote recording across the voter, poll and votes stores
//!
//! Adding a vote runs four steps in order:
//!
//! 1. look the voter up in the voter service,
//! 2. look the poll and option up in the poll service,
//! 3. store the vote locally,
//! 4. append a history entry to the voter.
//!
//! Deleting runs: load the vote, remove the voter's history entry, delete
//! the vote. Neither sequence is transactional. A failure in step 4 leaves
//! the vote stored without a history entry; a failure while removing history
//! leaves the vote in place. Nothing is retried or rolled back, and every
//! failure is tagged with the [`VoteStep`] it happened in.

use std::fmt;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::common::Error;
use crate::votes::client::Registry;
use crate::votes::store::{Vote, VoteStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteStep {
    LookupVoter,
    LookupPoll,
    StoreVote,
    RecordHistory,
    LoadVote,
    RemoveHistory,
    DeleteVote,
}

impl VoteStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteStep::LookupVoter => "lookup_voter",
            VoteStep::LookupPoll => "lookup_poll",
            VoteStep::StoreVote => "store_vote",
            VoteStep::RecordHistory => "record_history",
            VoteStep::LoadVote => "load_vote",
            VoteStep::RemoveHistory => "remove_history",
            VoteStep::DeleteVote => "delete_vote",
        }
    }
}

impl fmt::Display for VoteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workflow failure and the step that produced it.
#[derive(Debug, thiserror::Error)]
#[error("{step}: {source}")]
pub struct StepFailure {
    pub step: VoteStep,
    #[source]
    pub source: Error,
}

impl StepFailure {
    fn at(step: VoteStep, source: Error) -> Self {
        Self { step, source }
    }

    /// True when an earlier step already committed a change.
    pub fn partially_applied(&self) -> bool {
        matches!(self.step, VoteStep::RecordHistory)
    }

    pub fn status(&self) -> StatusCode {
        self.source.to_http_status()
    }
}

impl IntoResponse for StepFailure {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.partially_applied() || status.is_server_error() {
            tracing::error!(step = %self.step, error = %self.source, "vote workflow failed");
        } else {
            tracing::debug!(step = %self.step, error = %self.source, "vote rejected");
        }
        let body = json!({
            "error": self.source.to_string(),
            "step": self.step.as_str(),
            "partial": self.partially_applied(),
        });
        (status, Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct VoteWorkflow {
    votes: VoteStore,
    registry: Arc<dyn Registry>,
}

impl VoteWorkflow {
    pub fn new(votes: VoteStore, registry: Arc<dyn Registry>) -> Self {
        Self { votes, registry }
    }

    pub fn votes(&self) -> &VoteStore {
        &self.votes
    }

    /// Validate references, store the vote, then record it in the voter's history.
    pub async fn add_vote(&self, vote: Vote) -> Result<Vote, StepFailure> {
        // Unreachable upstreams reject the vote rather than skip the check.
        let voters = self.registry.voters().await.map_err(|e| {
            tracing::warn!(error = %e, "voter lookup failed");
            StepFailure::at(
                VoteStep::LookupVoter,
                Error::NotFound(format!("voter {} (lookup failed: {})", vote.voter_id, e)),
            )
        })?;
        if !voters.iter().any(|v| v.voter_id == vote.voter_id) {
            return Err(StepFailure::at(
                VoteStep::LookupVoter,
                Error::not_found("voter", vote.voter_id),
            ));
        }

        let polls = self.registry.polls().await.map_err(|e| {
            tracing::warn!(error = %e, "poll lookup failed");
            StepFailure::at(
                VoteStep::LookupPoll,
                Error::NotFound(format!("poll {} (lookup failed: {})", vote.poll_id, e)),
            )
        })?;
        let poll = polls
            .iter()
            .find(|p| p.poll_id == vote.poll_id)
            .ok_or_else(|| {
                StepFailure::at(VoteStep::LookupPoll, Error::not_found("poll", vote.poll_id))
            })?;
        if poll.option(vote.vote_value).is_none() {
            return Err(StepFailure::at(
                VoteStep::LookupPoll,
                Error::NotFound(format!(
                    "option {} of poll {}",
                    vote.vote_value, vote.poll_id
                )),
            ));
        }

        let vote = self
            .votes
            .add(vote)
            .await
            .map_err(|e| StepFailure::at(VoteStep::StoreVote, e))?;

        self.registry
            .record_vote(vote.voter_id, vote.poll_id, Utc::now())
            .await
            .map_err(|e| {
                tracing::error!(
                    vote_id = vote.vote_id,
                    voter_id = vote.voter_id,
                    error = %e,
                    "vote stored but voter history was not updated"
                );
                StepFailure::at(VoteStep::RecordHistory, e)
            })?;

        tracing::info!(
            vote_id = vote.vote_id,
            voter_id = vote.voter_id,
            poll_id = vote.poll_id,
            "vote recorded"
        );
        Ok(vote)
    }

    /// Remove the history entry, then the vote. Returns the deleted vote.
    pub async fn delete_vote(&self, vote_id: u32) -> Result<Vote, StepFailure> {
        let vote = self
            .votes
            .get(vote_id)
            .await
            .map_err(|e| StepFailure::at(VoteStep::LoadVote, e))?;

        match self
            .registry
            .remove_vote(vote.voter_id, vote.poll_id)
            .await
        {
            Ok(()) => {}
            // History already gone (or voter deleted); the vote can still go.
            Err(e) if e.is_not_found() => {
                tracing::warn!(vote_id, error = %e, "no history entry to remove");
            }
            Err(e) => return Err(StepFailure::at(VoteStep::RemoveHistory, e)),
        }

        self.votes
            .delete(vote_id)
            .await
            .map_err(|e| StepFailure::at(VoteStep::DeleteVote, e))?;

        tracing::info!(vote_id, voter_id = vote.voter_id, "vote deleted");
        Ok(vote)
    }
}
