//! Votes service
//!
//! Stores votes under `/votes` and keeps the voter service's history in
//! step with them. See [`workflow`] for the cross-service sequence.

pub mod client;
pub mod http;
pub mod server;
pub mod store;
pub mod workflow;

pub use client::{HttpRegistry, Registry};
pub use server::VotesServer;
pub use store::{Vote, VoteStore};
pub use workflow::{StepFailure, VoteStep, VoteWorkflow};
