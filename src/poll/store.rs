//! Polls and their options

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::common::{Collection, Document, Error, Result, Storage};

pub const POLL_KEY_PREFIX: &str = "poll:";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollOption {
    pub poll_option_id: u32,
    pub poll_option_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Poll {
    pub poll_id: u32,
    pub poll_title: String,
    pub poll_question: String,
    pub poll_options: Vec<PollOption>,
}

impl Poll {
    pub fn new(poll_id: u32, poll_title: impl Into<String>, poll_question: impl Into<String>) -> Self {
        Self {
            poll_id,
            poll_title: poll_title.into(),
            poll_question: poll_question.into(),
            poll_options: Vec::new(),
        }
    }

    pub fn with_option(mut self, poll_option_id: u32, text: impl Into<String>) -> Self {
        self.poll_options.push(PollOption {
            poll_option_id,
            poll_option_text: text.into(),
        });
        self
    }

    pub fn option(&self, poll_option_id: u32) -> Option<&PollOption> {
        self.poll_options
            .iter()
            .find(|o| o.poll_option_id == poll_option_id)
    }

    fn check_unique_options(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for option in &self.poll_options {
            if !seen.insert(option.poll_option_id) {
                return Err(Error::Validation(format!(
                    "poll {} lists option {} more than once",
                    self.poll_id, option.poll_option_id
                )));
            }
        }
        Ok(())
    }
}

impl Document for Poll {
    const KIND: &'static str = "poll";
    const KEY_PREFIX: &'static str = POLL_KEY_PREFIX;

    fn id(&self) -> u32 {
        self.poll_id
    }
}

fn option_not_found(poll_id: u32, poll_option_id: u32) -> Error {
    Error::NotFound(format!("option {} of poll {}", poll_option_id, poll_id))
}

#[derive(Clone)]
pub struct PollStore {
    polls: Collection<Poll>,
}

impl PollStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            polls: Collection::new(storage),
        }
    }

    pub async fn list(&self) -> Result<Vec<Poll>> {
        self.polls.get_all().await
    }

    pub async fn get(&self, poll_id: u32) -> Result<Poll> {
        self.polls.get(poll_id).await
    }

    pub async fn add(&self, poll: Poll) -> Result<Poll> {
        poll.check_unique_options()?;
        self.polls.insert(&poll).await?;
        tracing::debug!(poll_id = poll.poll_id, options = poll.poll_options.len(), "poll added");
        Ok(poll)
    }

    /// Overwrites title and question; options are left untouched.
    pub async fn update(&self, poll: Poll) -> Result<Poll> {
        self.polls
            .modify(poll.poll_id, move |existing| {
                existing.poll_title = poll.poll_title;
                existing.poll_question = poll.poll_question;
                Ok(existing.clone())
            })
            .await
    }

    pub async fn delete(&self, poll_id: u32) -> Result<()> {
        self.polls.remove(poll_id).await
    }

    pub async fn delete_all(&self) -> Result<()> {
        self.polls.clear().await
    }

    pub async fn options(&self, poll_id: u32) -> Result<Vec<PollOption>> {
        Ok(self.get(poll_id).await?.poll_options)
    }

    pub async fn option(&self, poll_id: u32, poll_option_id: u32) -> Result<PollOption> {
        self.get(poll_id)
            .await?
            .option(poll_option_id)
            .cloned()
            .ok_or_else(|| option_not_found(poll_id, poll_option_id))
    }

    pub async fn add_option(
        &self,
        poll_id: u32,
        poll_option_id: u32,
        text: String,
    ) -> Result<PollOption> {
        self.polls
            .modify(poll_id, move |poll| {
                if poll.option(poll_option_id).is_some() {
                    return Err(Error::Conflict(format!(
                        "poll {} already has option {}",
                        poll_id, poll_option_id
                    )));
                }
                let option = PollOption {
                    poll_option_id,
                    poll_option_text: text,
                };
                poll.poll_options.push(option.clone());
                Ok(option)
            })
            .await
    }

    pub async fn update_option(
        &self,
        poll_id: u32,
        poll_option_id: u32,
        text: String,
    ) -> Result<PollOption> {
        self.polls
            .modify(poll_id, move |poll| {
                let option = poll
                    .poll_options
                    .iter_mut()
                    .find(|o| o.poll_option_id == poll_option_id)
                    .ok_or_else(|| option_not_found(poll_id, poll_option_id))?;
                option.poll_option_text = text;
                Ok(option.clone())
            })
            .await
    }

    pub async fn delete_option(&self, poll_id: u32, poll_option_id: u32) -> Result<()> {
        self.polls
            .modify(poll_id, move |poll| {
                let before = poll.poll_options.len();
                poll.poll_options
                    .retain(|o| o.poll_option_id != poll_option_id);
                if poll.poll_options.len() == before {
                    return Err(option_not_found(poll_id, poll_option_id));
                }
                Ok(())
            })
            .await
    }
}
