//! HTTP API for the poll service

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::common::http::{message, parse_id, with_service_layers, JsonBody};
use crate::common::{RequestStats, Result};
use crate::poll::store::{Poll, PollStore};

#[derive(Clone)]
pub struct PollState {
    pub store: PollStore,
    pub stats: Arc<RequestStats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionTextBody {
    #[serde(alias = "pollOptionText")]
    pub option_text: String,
}

pub fn create_router(state: PollState) -> Router {
    let stats = state.stats.clone();
    let router = Router::new()
        .route("/", get(welcome))
        .route("/polls", get(list_polls).delete(delete_all_polls))
        .route("/polls/health", get(health))
        .route(
            "/polls/:id",
            get(get_poll)
                .post(add_poll)
                .put(update_poll)
                .delete(delete_poll),
        )
        .route("/polls/:id/options", get(get_options))
        .route(
            "/polls/:id/options/:option_id",
            get(get_option)
                .post(add_option)
                .put(update_option)
                .delete(delete_option),
        )
        .with_state(state);
    with_service_layers(router, stats)
}

async fn welcome() -> impl IntoResponse {
    message("Welcome to poll API.")
}

async fn health(State(state): State<PollState>) -> impl IntoResponse {
    Json(state.stats.health())
}

async fn list_polls(State(state): State<PollState>) -> Result<Json<Vec<Poll>>> {
    Ok(Json(state.store.list().await?))
}

async fn get_poll(State(state): State<PollState>, Path(id): Path<String>) -> Result<Json<Poll>> {
    let id = parse_id("poll id", &id)?;
    Ok(Json(state.store.get(id).await?))
}

async fn add_poll(
    State(state): State<PollState>,
    Path(id): Path<String>,
    JsonBody(mut body): JsonBody<Poll>,
) -> Result<Json<Poll>> {
    body.poll_id = parse_id("poll id", &id)?;
    Ok(Json(state.store.add(body).await?))
}

async fn update_poll(
    State(state): State<PollState>,
    Path(id): Path<String>,
    JsonBody(mut body): JsonBody<Poll>,
) -> Result<Json<Poll>> {
    body.poll_id = parse_id("poll id", &id)?;
    Ok(Json(state.store.update(body).await?))
}

async fn delete_all_polls(State(state): State<PollState>) -> Result<impl IntoResponse> {
    state.store.delete_all().await?;
    Ok(message("All polls deleted successfully."))
}

async fn delete_poll(
    State(state): State<PollState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id("poll id", &id)?;
    state.store.delete(id).await?;
    Ok(message("Poll deleted successfully."))
}

async fn get_options(
    State(state): State<PollState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id("poll id", &id)?;
    Ok(Json(state.store.options(id).await?))
}

fn parse_pair(id: &str, option_id: &str) -> Result<(u32, u32)> {
    Ok((parse_id("poll id", id)?, parse_id("poll option id", option_id)?))
}

async fn get_option(
    State(state): State<PollState>,
    Path((id, option_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let (id, option_id) = parse_pair(&id, &option_id)?;
    Ok(Json(state.store.option(id, option_id).await?))
}

async fn add_option(
    State(state): State<PollState>,
    Path((id, option_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<OptionTextBody>,
) -> Result<impl IntoResponse> {
    let (id, option_id) = parse_pair(&id, &option_id)?;
    Ok(Json(
        state.store.add_option(id, option_id, body.option_text).await?,
    ))
}

async fn update_option(
    State(state): State<PollState>,
    Path((id, option_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<OptionTextBody>,
) -> Result<impl IntoResponse> {
    let (id, option_id) = parse_pair(&id, &option_id)?;
    Ok(Json(
        state
            .store
            .update_option(id, option_id, body.option_text)
            .await?,
    ))
}

async fn delete_option(
    State(state): State<PollState>,
    Path((id, option_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let (id, option_id) = parse_pair(&id, &option_id)?;
    state.store.delete_option(id, option_id).await?;
    Ok(message("Poll option deleted successfully."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Storage;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(PollState {
            store: PollStore::new(Storage::new_memory()),
            stats: RequestStats::shared(),
        })
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_poll_with_options_over_http() {
        let app = app();
        let (status, body) = call(
            &app,
            Method::POST,
            "/polls/1",
            Some(json!({
                "pollTitle": "Tea or Coffee",
                "pollQuestion": "Which one?",
                "pollOptions": [
                    {"pollOptionId": 1, "pollOptionText": "Tea"},
                    {"pollOptionId": 2, "pollOptionText": "Coffee"}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pollId"], 1);

        let (status, body) = call(&app, Method::GET, "/polls/1/options/2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pollOptionText"], "Coffee");

        let (status, body) = call(
            &app,
            Method::POST,
            "/polls/1/options/3",
            Some(json!({"optionText": "Water"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pollOptionId"], 3);

        let (status, _) = call(
            &app,
            Method::POST,
            "/polls/1/options/3",
            Some(json!({"optionText": "Juice"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(
            &app,
            Method::PUT,
            "/polls/1/options/3",
            Some(json!({"optionText": "Juice"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pollOptionText"], "Juice");

        let (_, body) = call(&app, Method::GET, "/polls/1/options", None).await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (status, _) = call(&app, Method::DELETE, "/polls/1/options/3", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::DELETE, "/polls/1/options/3", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_poll_update_and_delete_over_http() {
        let app = app();
        call(
            &app,
            Method::POST,
            "/polls/4",
            Some(json!({"pollTitle": "a", "pollQuestion": "b"})),
        )
        .await;

        let (status, body) = call(
            &app,
            Method::PUT,
            "/polls/4",
            Some(json!({"pollTitle": "c", "pollQuestion": "d"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pollTitle"], "c");

        let (status, _) = call(&app, Method::PUT, "/polls/5", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::GET, "/polls/four", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::DELETE, "/polls", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, Method::GET, "/polls", None).await;
        assert_eq!(body, json!([]));
    }
}
