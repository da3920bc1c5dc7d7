//! Poll service
//!
//! Keeps polls and their options under `/polls`. The votes service reads
//! `GET /polls` to check that a vote names an existing option.

pub mod http;
pub mod server;
pub mod store;

pub use server::PollServer;
pub use store::{Poll, PollOption, PollStore};
