//! HTTP API for the votes service

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::common::http::{message, parse_id, with_service_layers, JsonBody};
use crate::common::{RequestStats, Result};
use crate::votes::store::Vote;
use crate::votes::workflow::VoteWorkflow;

#[derive(Clone)]
pub struct VotesState {
    pub workflow: VoteWorkflow,
    pub stats: Arc<RequestStats>,
}

pub fn create_router(state: VotesState) -> Router {
    let stats = state.stats.clone();
    let router = Router::new()
        .route("/", get(welcome))
        .route("/votes", get(list_votes).delete(delete_all_votes))
        .route("/votes/health", get(health))
        .route(
            "/votes/:id",
            get(get_vote).post(add_vote).delete(delete_vote),
        )
        .with_state(state);
    with_service_layers(router, stats)
}

async fn welcome() -> impl IntoResponse {
    message("Welcome to votes API.")
}

async fn health(State(state): State<VotesState>) -> impl IntoResponse {
    Json(state.stats.health())
}

async fn list_votes(State(state): State<VotesState>) -> Result<Json<Vec<Vote>>> {
    Ok(Json(state.workflow.votes().list().await?))
}

async fn get_vote(State(state): State<VotesState>, Path(id): Path<String>) -> Result<Json<Vote>> {
    let id = parse_id("vote id", &id)?;
    Ok(Json(state.workflow.votes().get(id).await?))
}

async fn add_vote(
    State(state): State<VotesState>,
    Path(id): Path<String>,
    JsonBody(mut body): JsonBody<Vote>,
) -> Result<Response> {
    body.vote_id = parse_id("vote id", &id)?;
    Ok(match state.workflow.add_vote(body).await {
        Ok(vote) => Json(vote).into_response(),
        Err(failure) => failure.into_response(),
    })
}

/// Removes vote records only; voter histories are left as they are.
async fn delete_all_votes(State(state): State<VotesState>) -> Result<impl IntoResponse> {
    state.workflow.votes().delete_all().await?;
    Ok(message("All votes deleted successfully."))
}

async fn delete_vote(State(state): State<VotesState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id("vote id", &id)?;
    Ok(match state.workflow.delete_vote(id).await {
        Ok(_) => message("Vote deleted successfully.").into_response(),
        Err(failure) => failure.into_response(),
    })
}
