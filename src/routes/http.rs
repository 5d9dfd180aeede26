//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs ids, lengths and basic result info.

use std::sync::Arc;

use axum::{
  extract::{
    rejection::{JsonRejection, QueryRejection},
    FromRequestParts, Path, Query, State,
  },
  http::request::Parts,
  Json,
};
use chrono::Utc;
use tracing::{info, instrument};

use crate::domain::{Exercise, SectionId, User};
use crate::error::ApiError;
use crate::exercises::{sections, Section};
use crate::leaderboard::{rank, LeaderboardEntry};
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity taken from the `X-User-Id` header.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserId {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .map(|v| UserId(v.to_string()))
      .ok_or_else(|| ApiError::Validation("Missing X-User-Id header".into()))
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> Json<HealthOut> {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info")]
pub async fn http_get_sections() -> Json<Vec<Section>> {
  Json(sections())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_exercises(
  State(state): State<Arc<AppState>>,
  Path(section_id): Path<String>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
  let exercises = SectionId::parse(&section_id)
    .and_then(|id| state.exercises.section(id))
    .ok_or_else(|| ApiError::NotFound(format!("Unknown section: {}", section_id)))?;
  info!(target: "codequest", section = %section_id, count = exercises.len(), "HTTP exercises served");
  Ok(Json(exercises.to_vec()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  UserId(user_id): UserId,
) -> Json<UserStatsOut> {
  let mut store = state.store.write().await;
  Json(stats_out(store.get_or_create(&user_id)))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  UserId(user_id): UserId,
  body: Result<Json<SubmitIn>, JsonRejection>,
) -> Result<Json<SubmitOut>, ApiError> {
  let Json(body) = body?;
  let out = submit_solution(&state, &user_id, &body, Utc::now()).await?;
  info!(target: "progression", %user_id, exercise = %body.exercise_id, correct = out.correct, xp = ?out.xp_earned, "HTTP submit evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_hint(
  State(state): State<Arc<AppState>>,
  body: Result<Json<HintIn>, JsonRejection>,
) -> Result<Json<HintOut>, ApiError> {
  let Json(body) = body?;
  let hint = get_hint_text(
    &state,
    &body.exercise_prompt,
    &body.user_code,
    body.error_message.as_deref(),
    body.hint_level.get(),
  )
  .await;
  info!(target: "codequest", level = body.hint_level.get(), hint_len = hint.len(), "HTTP hint served");
  Ok(Json(HintOut { hint, explanation: Some(HINT_EXPLANATION.into()) }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  body: Result<Json<ChatIn>, JsonRejection>,
) -> Result<Json<ChatOut>, ApiError> {
  let Json(body) = body?;
  if body.message.trim().is_empty() {
    return Err(ApiError::Validation("message must not be empty".into()));
  }
  let response = do_chat(&state, &body.message, &body.context).await;
  Ok(Json(ChatOut { response }))
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_get_leaderboard(
  State(state): State<Arc<AppState>>,
  q: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
  let Query(q) = q.map_err(|r| ApiError::Validation(format!("Invalid query: {}", r.body_text())))?;
  let limit = q
    .limit
    .unwrap_or(state.leaderboard_limit)
    .clamp(1, state.leaderboard_limit);
  let entries = rank(&*state.store.read().await, limit);
  info!(target: "codequest", limit, entries = entries.len(), "HTTP leaderboard served");
  Ok(Json(entries))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_achievements(
  State(state): State<Arc<AppState>>,
  UserId(user_id): UserId,
) -> Json<Vec<AchievementOut>> {
  Json(achievements_for(&state, &user_id).await)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_user(
  State(state): State<Arc<AppState>>,
  body: Result<Json<NewUserIn>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
  let Json(body) = body?;
  let user = register_user(&state, &body.username).await?;
  info!(target: "codequest", id = %user.id, username = %user.username, "User registered");
  Ok(Json(user))
}
