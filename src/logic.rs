//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Submitting a solution (grade, then progression, then write-back under one lock)
//!   - Tutor hints and chat, with local fallbacks when the tutor is absent or fails
//!   - Small read-side projections (achievements for a user)

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument};

use crate::domain::User;
use crate::error::ApiError;
use crate::grading::grade;
use crate::openai::ChatContext;
use crate::progression::{
  apply_correct_submission, record_incorrect_submission, AttemptContext, Submission, ACHIEVEMENTS,
};
use crate::protocol::{AchievementOut, SubmitIn, SubmitOut};
use crate::state::AppState;
use crate::store::StatsPatch;
use crate::util::trunc_for_log;

pub const HINT_EXPLANATION: &str = "Intenta aplicar esta pista a tu código.";
pub const HINT_FAILURE_FALLBACK: &str = "Lo siento, no pude generar una pista en este momento. ¡Pero sé que puedes lograrlo!";
pub const CHAT_FAILURE_FALLBACK: &str = "Lo siento, estoy teniendo problemas para responder ahora. Por favor intenta de nuevo.";

/// Upper bound for a single submission's `timeSpent` (one day, in seconds).
pub const MAX_TIME_SPENT_SECS: f64 = 86_400.0;

fn validate_submission(body: &SubmitIn) -> Result<u64, ApiError> {
  if body.exercise_id.trim().is_empty() {
    return Err(ApiError::Validation("exerciseId must not be empty".into()));
  }
  if !body.time_spent.is_finite() || body.time_spent < 0.0 {
    return Err(ApiError::Validation("timeSpent must be a non-negative number".into()));
  }
  if body.time_spent > MAX_TIME_SPENT_SECS {
    return Err(ApiError::Validation(format!("timeSpent must not exceed {} seconds", MAX_TIME_SPENT_SECS)));
  }
  Ok(body.time_spent.round() as u64)
}

/// Grade a submission and fold it into the user's progress.
///
/// The store's write guard is held from the stats read to the last write, which
/// serializes submissions (for the same user and across users).
#[instrument(level = "info", skip(state, user_id, body), fields(%user_id, exercise = %body.exercise_id, section = %body.section_id, code_len = body.code.len()))]
pub async fn submit_solution(state: &AppState, user_id: &str, body: &SubmitIn, now: DateTime<Utc>) -> Result<SubmitOut, ApiError> {
  let time_spent_secs = validate_submission(body)?;
  let exercise = state
    .exercises
    .find(body.section_id, &body.exercise_id)
    .ok_or_else(|| ApiError::NotFound(format!("Exercise not found: {}", body.exercise_id)))?;

  let verdict = grade(exercise, &body.code);
  debug!(target: "progression", code = %trunc_for_log(&body.code, 120), correct = verdict.correct, "Submission graded");

  let mut store = state.store.write().await;
  let before = store.get_or_create(user_id).clone();
  let ctx = AttemptContext::for_exercise(&before, &exercise.id);
  let sub = Submission {
    exercise_id: &exercise.id,
    section_id: exercise.section_id,
    code: &body.code,
    time_spent_secs,
    now,
  };

  if !verdict.correct {
    let after = record_incorrect_submission(before, &sub, ctx);
    if let Some(p) = after.exercise_progress.get(&exercise.id) {
      store.upsert_progress(user_id, p.clone());
    }
    store.update_stats(user_id, StatsPatch { total_time_spent: Some(after.total_time_spent), ..Default::default() });
    info!(target: "progression", %user_id, exercise = %exercise.id, attempts = ctx.attempts, "Incorrect submission recorded");
    return Ok(SubmitOut {
      correct: false,
      message: verdict.message,
      xp_earned: None,
      unlocked_achievements: vec![],
    });
  }

  let outcome = apply_correct_submission(before, &sub, ctx);
  if let Some(p) = outcome.stats.exercise_progress.get(&exercise.id) {
    store.upsert_progress(user_id, p.clone());
  }
  store.update_stats(user_id, StatsPatch::from_stats(&outcome.stats));
  for id in &outcome.unlocked {
    store.unlock_achievement(user_id, *id);
  }

  info!(
    target: "progression",
    %user_id,
    exercise = %exercise.id,
    xp_earned = outcome.xp_earned,
    total_xp = outcome.stats.total_xp,
    level = outcome.stats.level(),
    streak = outcome.stats.current_streak,
    unlocked = outcome.unlocked.len(),
    "Correct submission recorded"
  );

  Ok(SubmitOut {
    correct: true,
    message: verdict.message,
    xp_earned: Some(outcome.xp_earned),
    unlocked_achievements: outcome.unlocked,
  })
}

#[instrument(level = "info", skip(state, exercise_prompt, code, error), fields(code_len = code.len()))]
pub async fn get_hint_text(state: &AppState, exercise_prompt: &str, code: &str, error: Option<&str>, level: u8) -> String {
  if let Some(oa) = &state.openai {
    match oa.hint(&state.prompts, exercise_prompt, code, error, level).await {
      Ok(t) => t,
      Err(e) => {
        error!(target: "codequest", error = %e, "Tutor hint failed; using fallback.");
        HINT_FAILURE_FALLBACK.into()
      }
    }
  } else {
    hint_local(code, error, level)
  }
}

#[instrument(level = "info", skip(state, message, context), fields(message_len = message.len()))]
pub async fn do_chat(state: &AppState, message: &str, context: &ChatContext) -> String {
  if let Some(oa) = &state.openai {
    match oa.chat(&state.prompts, message, context).await {
      Ok(t) => t,
      Err(e) => {
        error!(target: "codequest", error = %e, "Tutor chat failed; using fallback.");
        CHAT_FAILURE_FALLBACK.into()
      }
    }
  } else {
    debug!(target: "codequest", "Chat reply via stub.");
    chat_local(message)
  }
}

/// Catalog with per-user unlock flags.
pub async fn achievements_for(state: &AppState, user_id: &str) -> Vec<AchievementOut> {
  let store = state.store.read().await;
  let unlocked = store
    .stats(user_id)
    .map(|s| s.unlocked_achievements.clone())
    .unwrap_or_default();
  ACHIEVEMENTS
    .iter()
    .map(|a| AchievementOut { achievement: *a, unlocked: unlocked.contains(&a.id) })
    .collect()
}

#[instrument(level = "info", skip(state))]
pub async fn register_user(state: &AppState, username: &str) -> Result<User, ApiError> {
  let username = username.trim();
  if username.is_empty() {
    return Err(ApiError::Validation("username must not be empty".into()));
  }
  state
    .store
    .write()
    .await
    .create_user(username)
    .ok_or_else(|| ApiError::Conflict(format!("Username already taken: {}", username)))
}

// -------- Local fallbacks --------

fn hint_local(code: &str, error: Option<&str>, level: u8) -> String {
  if !code.contains("resultado") {
    return "Recuerda guardar tu respuesta final en una variable llamada 'resultado'.".into();
  }
  if let Some(e) = error.filter(|e| !e.trim().is_empty()) {
    return format!("Lee con calma el mensaje de error: \"{}\". Suele indicar la línea exacta del problema.", e.trim());
  }
  match level {
    1 => "Relee el enunciado: ¿qué valores te piden usar y qué operación debes aplicar?".into(),
    2 => "Identifica el operador o la función de Python que resuelve el ejercicio y aplícalo a tus variables.".into(),
    _ => "Escribe el cálculo completo en una sola línea: resultado = <tu expresión>, usando los valores del enunciado.".into(),
  }
}

fn chat_local(message: &str) -> String {
  let lower = message.to_lowercase();
  if lower.contains("solución") || lower.contains("solucion") || lower.contains("respuesta") {
    "Intenta resolverlo por tu cuenta primero: pide una pista y avanza paso a paso.".into()
  } else if lower.contains("error") {
    "Los errores de Python indican la línea y el tipo de problema. Revisa nombres de variables, comillas y paréntesis.".into()
  } else {
    "Entiendo tu pregunta. Intentemos abordar esto paso a paso: ¿qué parte del ejercicio te resulta más difícil?".into()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn local_hint_points_at_missing_result_first() {
    assert!(hint_local("x = 1", None, 3).contains("'resultado'"));
    assert!(hint_local("resultado = x", Some("NameError"), 1).contains("NameError"));
    assert_ne!(hint_local("resultado = 1", None, 1), hint_local("resultado = 1", None, 3));
  }

  #[test]
  fn local_chat_discourages_asking_for_solutions() {
    assert!(chat_local("¿Cuál es la solución?").contains("pista"));
    assert!(chat_local("tengo un error").contains("errores"));
  }
}
