//! # votekv
//!
//! Voting microservices over a pluggable key-value store:
//! - voter service: voters and the polls each one voted in
//! - poll service: polls and their options
//! - votes service: votes, checked against the other two services and
//!   mirrored into the voter's history
//! - a file-backed todo list with its own CLI
//!
//! Each service keeps its entities in memory or in Redis (`voter:<id>`,
//! `poll:<id>`, `votes:<id>`) and reports request counters on `/<kind>/health`.
//!
//! ## Architecture

#![allow(clippy::result_large_err)]
//!
//! ```text
//!                 ┌──────────────────────┐
//!   client ──────▶│  votes  (:1082)      │
//!                 └───┬──────────────┬───┘
//!        GET /voters  │              │  GET /polls
//!  POST|DELETE        │              │
//!  /voters/{id}/polls │              │
//!                 ┌───▼──────┐  ┌────▼─────┐
//!                 │ voter    │  │ poll     │
//!                 │ (:1080)  │  │ (:1081)  │
//!                 └───┬──────┘  └────┬─────┘
//!                     └──────┬───────┘
//!                      memory | redis
//! ```
//!
//! ## Usage
//!
//! ```bash
//! votekv-voter --backend redis --redis-url redis://localhost:6379
//! votekv-poll
//! votekv-votes --voter-api http://localhost:1080 --poll-api http://localhost:1081
//!
//! votekv-todo --db ./todo.json add '{"id": 1, "title": "buy milk", "done": false}'
//! votekv-todo list
//! ```

pub mod common;
pub mod poll;
pub mod todo;
pub mod voter;
pub mod votes;

// Re-export commonly used types
pub use common::{Config, Error, Result, Storage};
pub use poll::PollServer;
pub use voter::VoterServer;
pub use votes::VotesServer;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
