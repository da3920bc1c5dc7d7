//! HTTP API for the voter service

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::common::http::{message, parse_id, with_service_layers, JsonBody};
use crate::common::{RequestStats, Result};
use crate::voter::store::{Voter, VoterStore};

/// Shared voter service state for HTTP handlers.
#[derive(Clone)]
pub struct VoterState {
    pub store: VoterStore,
    pub stats: Arc<RequestStats>,
}

/// Body of voter POST/PUT. Only the names are read; ids and history in the
/// body are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoterNamesBody {
    pub first_name: String,
    pub last_name: String,
}

/// Body of history POST/PUT; a missing date means "now".
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoteDateBody {
    pub vote_date: Option<DateTime<Utc>>,
}

pub fn create_router(state: VoterState) -> Router {
    let stats = state.stats.clone();
    let router = Router::new()
        .route("/", get(welcome))
        .route("/voters", get(list_voters).delete(delete_all_voters))
        .route("/voters/health", get(health))
        .route(
            "/voters/:id",
            get(get_voter)
                .post(add_voter)
                .put(update_voter)
                .delete(delete_voter),
        )
        .route("/voters/:id/polls", get(get_history))
        .route(
            "/voters/:id/polls/:poll_id",
            get(get_history_entry)
                .post(add_history_entry)
                .put(update_history_entry)
                .delete(delete_history_entry),
        )
        .with_state(state);
    with_service_layers(router, stats)
}

async fn welcome() -> impl IntoResponse {
    message("Welcome to voter API.")
}

async fn health(State(state): State<VoterState>) -> impl IntoResponse {
    Json(state.stats.health())
}

async fn list_voters(State(state): State<VoterState>) -> Result<Json<Vec<Voter>>> {
    Ok(Json(state.store.list().await?))
}

async fn get_voter(
    State(state): State<VoterState>,
    Path(id): Path<String>,
) -> Result<Json<Voter>> {
    let id = parse_id("voter id", &id)?;
    Ok(Json(state.store.get(id).await?))
}

/// The path id wins over any id in the body, and history starts empty.
async fn add_voter(
    State(state): State<VoterState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<VoterNamesBody>,
) -> Result<Json<Voter>> {
    let id = parse_id("voter id", &id)?;
    let voter = Voter::new(id, body.first_name, body.last_name);
    Ok(Json(state.store.add(voter).await?))
}

async fn update_voter(
    State(state): State<VoterState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<VoterNamesBody>,
) -> Result<Json<Voter>> {
    let id = parse_id("voter id", &id)?;
    let names = Voter::new(id, body.first_name, body.last_name);
    Ok(Json(state.store.update(names).await?))
}

async fn delete_all_voters(State(state): State<VoterState>) -> Result<impl IntoResponse> {
    state.store.delete_all().await?;
    Ok(message("All voters deleted successfully."))
}

async fn delete_voter(
    State(state): State<VoterState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id("voter id", &id)?;
    state.store.delete(id).await?;
    Ok(message("Voter deleted successfully."))
}

async fn get_history(
    State(state): State<VoterState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id("voter id", &id)?;
    Ok(Json(state.store.history(id).await?))
}

fn parse_pair(id: &str, poll_id: &str) -> Result<(u32, u32)> {
    Ok((parse_id("voter id", id)?, parse_id("poll id", poll_id)?))
}

async fn get_history_entry(
    State(state): State<VoterState>,
    Path((id, poll_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let (id, poll_id) = parse_pair(&id, &poll_id)?;
    Ok(Json(state.store.history_entry(id, poll_id).await?))
}

async fn add_history_entry(
    State(state): State<VoterState>,
    Path((id, poll_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<VoteDateBody>,
) -> Result<impl IntoResponse> {
    let (id, poll_id) = parse_pair(&id, &poll_id)?;
    let date = body.vote_date.unwrap_or_else(Utc::now);
    Ok(Json(state.store.add_history(id, poll_id, date).await?))
}

async fn update_history_entry(
    State(state): State<VoterState>,
    Path((id, poll_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<VoteDateBody>,
) -> Result<impl IntoResponse> {
    let (id, poll_id) = parse_pair(&id, &poll_id)?;
    let date = body.vote_date.unwrap_or_else(Utc::now);
    Ok(Json(state.store.update_history(id, poll_id, date).await?))
}

async fn delete_history_entry(
    State(state): State<VoterState>,
    Path((id, poll_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let (id, poll_id) = parse_pair(&id, &poll_id)?;
    state.store.delete_history(id, poll_id).await?;
    Ok(message("Voter poll deleted successfully."))
}
