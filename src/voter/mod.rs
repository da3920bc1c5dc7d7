//! Voter service
//!
//! Keeps voters and, per voter, the history of polls they voted in.
//! Routes live under `/voters`; the votes service writes history entries
//! through `/voters/{id}/polls/{pollId}`.

pub mod http;
pub mod server;
pub mod store;

pub use server::VoterServer;
pub use store::{Voter, VoterPoll, VoterStore};
