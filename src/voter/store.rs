//! Voter records and their poll history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{Collection, Document, Error, Result, Storage};

pub const VOTER_KEY_PREFIX: &str = "voter:";

/// One entry of a voter's history: the poll voted in and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterPoll {
    pub poll_id: u32,
    pub vote_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Voter {
    pub voter_id: u32,
    pub first_name: String,
    pub last_name: String,
    pub vote_history: Vec<VoterPoll>,
}

impl Voter {
    /// A voter with an empty history.
    pub fn new(voter_id: u32, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            voter_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            vote_history: Vec::new(),
        }
    }

    pub fn history_entry(&self, poll_id: u32) -> Option<&VoterPoll> {
        self.vote_history.iter().find(|p| p.poll_id == poll_id)
    }
}

impl Document for Voter {
    const KIND: &'static str = "voter";
    const KEY_PREFIX: &'static str = VOTER_KEY_PREFIX;

    fn id(&self) -> u32 {
        self.voter_id
    }
}

fn history_not_found(voter_id: u32, poll_id: u32) -> Error {
    Error::NotFound(format!("poll {} in history of voter {}", poll_id, voter_id))
}

/// Voter store over either storage backend.
#[derive(Clone)]
pub struct VoterStore {
    voters: Collection<Voter>,
}

impl VoterStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            voters: Collection::new(storage),
        }
    }

    pub async fn list(&self) -> Result<Vec<Voter>> {
        self.voters.get_all().await
    }

    pub async fn get(&self, voter_id: u32) -> Result<Voter> {
        self.voters.get(voter_id).await
    }

    pub async fn add(&self, voter: Voter) -> Result<Voter> {
        self.voters.insert(&voter).await?;
        tracing::debug!(voter_id = voter.voter_id, "voter added");
        Ok(voter)
    }

    /// Overwrites the names; the history is left untouched.
    pub async fn update(&self, voter: Voter) -> Result<Voter> {
        self.voters
            .modify(voter.voter_id, move |existing| {
                existing.first_name = voter.first_name;
                existing.last_name = voter.last_name;
                Ok(existing.clone())
            })
            .await
    }

    pub async fn delete(&self, voter_id: u32) -> Result<()> {
        self.voters.remove(voter_id).await
    }

    pub async fn delete_all(&self) -> Result<()> {
        self.voters.clear().await
    }

    pub async fn history(&self, voter_id: u32) -> Result<Vec<VoterPoll>> {
        Ok(self.get(voter_id).await?.vote_history)
    }

    pub async fn history_entry(&self, voter_id: u32, poll_id: u32) -> Result<VoterPoll> {
        self.get(voter_id)
            .await?
            .history_entry(poll_id)
            .cloned()
            .ok_or_else(|| history_not_found(voter_id, poll_id))
    }

    pub async fn add_history(
        &self,
        voter_id: u32,
        poll_id: u32,
        vote_date: DateTime<Utc>,
    ) -> Result<VoterPoll> {
        self.voters
            .modify(voter_id, move |voter| {
                if voter.history_entry(poll_id).is_some() {
                    return Err(Error::Conflict(format!(
                        "voter {} has already voted in poll {}",
                        voter_id, poll_id
                    )));
                }
                let entry = VoterPoll { poll_id, vote_date };
                voter.vote_history.push(entry.clone());
                Ok(entry)
            })
            .await
    }

    pub async fn update_history(
        &self,
        voter_id: u32,
        poll_id: u32,
        vote_date: DateTime<Utc>,
    ) -> Result<VoterPoll> {
        self.voters
            .modify(voter_id, move |voter| {
                let entry = voter
                    .vote_history
                    .iter_mut()
                    .find(|p| p.poll_id == poll_id)
                    .ok_or_else(|| history_not_found(voter_id, poll_id))?;
                entry.vote_date = vote_date;
                Ok(entry.clone())
            })
            .await
    }

    pub async fn delete_history(&self, voter_id: u32, poll_id: u32) -> Result<()> {
        self.voters
            .modify(voter_id, move |voter| {
                let before = voter.vote_history.len();
                voter.vote_history.retain(|p| p.poll_id != poll_id);
                if voter.vote_history.len() == before {
                    return Err(history_not_found(voter_id, poll_id));
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> VoterStore {
        VoterStore::new(Storage::new_memory())
    }

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_add_then_get_returns_same_voter() {
        let voters = store();
        let voter = Voter::new(1, "Nisarg", "Patel");
        voters.add(voter.clone()).await.unwrap();
        assert_eq!(voters.get(1).await.unwrap(), voter);
    }

    #[tokio::test]
    async fn test_duplicate_add_fails() {
        let voters = store();
        voters.add(Voter::new(1, "A", "B")).await.unwrap();
        let err = voters.add(Voter::new(1, "C", "D")).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_history() {
        let voters = store();
        voters.add(Voter::new(1, "A", "B")).await.unwrap();
        voters.add_history(1, 5, date(1)).await.unwrap();

        let mut patch = Voter::new(1, "Ada", "Lovelace");
        patch.vote_history.clear();
        let updated = voters.update(patch).await.unwrap();

        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.last_name, "Lovelace");
        assert_eq!(updated.vote_history.len(), 1);
        assert_eq!(voters.get(1).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_voter_leaves_store_unchanged() {
        let voters = store();
        voters.add(Voter::new(1, "A", "B")).await.unwrap();
        let err = voters.update(Voter::new(2, "X", "Y")).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(voters.list().await.unwrap(), vec![Voter::new(1, "A", "B")]);
    }

    #[tokio::test]
    async fn test_delete_and_delete_all() {
        let voters = store();
        assert!(voters.delete(1).await.unwrap_err().is_not_found());

        voters.add(Voter::new(1, "A", "B")).await.unwrap();
        voters.add(Voter::new(2, "C", "D")).await.unwrap();
        voters.delete(1).await.unwrap();
        assert!(voters.get(1).await.unwrap_err().is_not_found());

        voters.delete_all().await.unwrap();
        assert!(voters.list().await.unwrap().is_empty());
        voters.delete_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_history_lifecycle() {
        let voters = store();
        voters.add(Voter::new(1, "A", "B")).await.unwrap();

        let entry = voters.add_history(1, 7, date(1)).await.unwrap();
        assert_eq!(entry.poll_id, 7);
        assert_eq!(voters.history(1).await.unwrap(), vec![entry.clone()]);
        assert_eq!(voters.history_entry(1, 7).await.unwrap(), entry);

        let err = voters.add_history(1, 7, date(2)).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let updated = voters.update_history(1, 7, date(3)).await.unwrap();
        assert_eq!(updated.vote_date, date(3));

        assert!(voters
            .update_history(1, 8, date(3))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(voters.history_entry(1, 8).await.unwrap_err().is_not_found());

        voters.delete_history(1, 7).await.unwrap();
        assert!(voters.history(1).await.unwrap().is_empty());
        assert!(voters.delete_history(1, 7).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_history_ops_require_parent() {
        let voters = store();
        assert!(voters.history(9).await.unwrap_err().is_not_found());
        assert!(voters.add_history(9, 1, date(1)).await.unwrap_err().is_not_found());
        assert!(voters.delete_history(9, 1).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_json_field_names() {
        let mut voter = Voter::new(3, "A", "B");
        voter.vote_history.push(VoterPoll {
            poll_id: 1,
            vote_date: date(5),
        });
        let value = serde_json::to_value(&voter).unwrap();
        assert_eq!(value["voterId"], 3);
        assert_eq!(value["firstName"], "A");
        assert_eq!(value["voteHistory"][0]["pollId"], 1);
        assert!(value["voteHistory"][0]["voteDate"].is_string());
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(crate::common::document_key::<Voter>(7), "voter:7");
    }
}
