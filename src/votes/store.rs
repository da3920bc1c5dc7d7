//! Vote records

use serde::{Deserialize, Serialize};

use crate::common::{Collection, Document, Result, Storage};

pub const VOTE_KEY_PREFIX: &str = "votes:";

/// A voter's choice of option `vote_value` in poll `poll_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vote {
    pub vote_id: u32,
    pub voter_id: u32,
    pub poll_id: u32,
    pub vote_value: u32,
}

impl Vote {
    pub fn new(vote_id: u32, voter_id: u32, poll_id: u32, vote_value: u32) -> Self {
        Self {
            vote_id,
            voter_id,
            poll_id,
            vote_value,
        }
    }
}

impl Document for Vote {
    const KIND: &'static str = "vote";
    const KEY_PREFIX: &'static str = VOTE_KEY_PREFIX;

    fn id(&self) -> u32 {
        self.vote_id
    }
}

/// Raw vote storage. Reference checks live in the workflow, not here.
#[derive(Clone)]
pub struct VoteStore {
    votes: Collection<Vote>,
}

impl VoteStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            votes: Collection::new(storage),
        }
    }

    pub async fn list(&self) -> Result<Vec<Vote>> {
        self.votes.get_all().await
    }

    pub async fn get(&self, vote_id: u32) -> Result<Vote> {
        self.votes.get(vote_id).await
    }

    pub async fn add(&self, vote: Vote) -> Result<Vote> {
        self.votes.insert(&vote).await?;
        Ok(vote)
    }

    pub async fn update(&self, vote: Vote) -> Result<Vote> {
        self.votes
            .modify(vote.vote_id, move |existing| {
                *existing = vote;
                Ok(existing.clone())
            })
            .await
    }

    pub async fn delete(&self, vote_id: u32) -> Result<()> {
        self.votes.remove(vote_id).await
    }

    pub async fn delete_all(&self) -> Result<()> {
        self.votes.clear().await
    }
}
