//! Clients for the voter and poll services
//!
//! The votes service only needs four remote operations. They sit behind the
//! [`Registry`] trait so the workflow can run against the real services
//! ([`HttpRegistry`]) or an in-process double in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde_json::json;

use crate::common::{Error, Result, VotesConfig};
use crate::poll::Poll;
use crate::voter::Voter;

/// The voter and poll services as seen from the votes service.
#[async_trait]
pub trait Registry: Send + Sync {
    /// `GET /voters`
    async fn voters(&self) -> Result<Vec<Voter>>;

    /// `GET /polls`
    async fn polls(&self) -> Result<Vec<Poll>>;

    /// `POST /voters/{voter_id}/polls/{poll_id}`
    async fn record_vote(&self, voter_id: u32, poll_id: u32, at: DateTime<Utc>) -> Result<()>;

    /// `DELETE /voters/{voter_id}/polls/{poll_id}`
    async fn remove_vote(&self, voter_id: u32, poll_id: u32) -> Result<()>;
}

pub struct HttpRegistry {
    client: Client,
    voter_api_url: String,
    poll_api_url: String,
}

impl HttpRegistry {
    pub fn new(voter_api_url: &str, poll_api_url: &str) -> Self {
        Self {
            client: Client::new(),
            voter_api_url: voter_api_url.trim_end_matches('/').to_string(),
            poll_api_url: poll_api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &VotesConfig) -> Self {
        Self::new(&config.voter_api_url, &config.poll_api_url)
    }

    pub fn history_url(&self, voter_id: u32, poll_id: u32) -> String {
        format!(
            "{}/voters/{}/polls/{}",
            self.voter_api_url, voter_id, poll_id
        )
    }
}

/// Map a non-success response onto the crate error kinds.
fn check(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let what = format!("{} resource {}", service, response.url().path());
    Err(match status {
        StatusCode::NOT_FOUND => Error::NotFound(what),
        StatusCode::CONFLICT => Error::Conflict(what),
        _ => Error::Upstream {
            service: service.to_string(),
            status: status.as_u16(),
        },
    })
}

#[async_trait]
impl Registry for HttpRegistry {
    async fn voters(&self) -> Result<Vec<Voter>> {
        let url = format!("{}/voters", self.voter_api_url);
        let response = check("voter", self.client.get(&url).send().await?)?;
        Ok(response.json().await?)
    }

    async fn polls(&self) -> Result<Vec<Poll>> {
        let url = format!("{}/polls", self.poll_api_url);
        let response = check("poll", self.client.get(&url).send().await?)?;
        Ok(response.json().await?)
    }

    async fn record_vote(&self, voter_id: u32, poll_id: u32, at: DateTime<Utc>) -> Result<()> {
        let response = self
            .client
            .post(self.history_url(voter_id, poll_id))
            .json(&json!({ "voteDate": at }))
            .send()
            .await?;
        check("voter", response)?;
        Ok(())
    }

    async fn remove_vote(&self, voter_id: u32, poll_id: u32) -> Result<()> {
        let response = self
            .client
            .delete(self.history_url(voter_id, poll_id))
            .send()
            .await?;
        check("voter", response)?;
        Ok(())
    }
}
