//! Progression rules: XP awards, levels, streaks and achievements.
//!
//! Everything here is a pure function over `UserStats`; the caller decides when and how
//! the result is written back into the store.
//!
//! Award table for a correct submission:
//!   - already completed before        : 10 XP
//!   - first completion                : 50 XP
//!   - first completion, first attempt : 100 XP (replaces the 50, does not stack)
//! Achievement rewards unlocked by the same submission are added on top.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{ExerciseProgress, SectionId, UserStats};
use crate::exercises::SECTION_SIZE;

pub const XP_PER_LEVEL: u64 = 1000;
pub const BASE_XP: u64 = 10;
pub const FIRST_COMPLETION_XP: u64 = 50;
pub const PERFECT_XP: u64 = 100;

pub fn calculate_level(total_xp: u64) -> u32 {
  (total_xp / XP_PER_LEVEL) as u32 + 1
}

/// Total XP at which the next level starts.
pub fn xp_for_next_level(total_xp: u64) -> u64 {
  calculate_level(total_xp) as u64 * XP_PER_LEVEL
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct XpProgress {
  /// XP earned inside the current level.
  pub current: u64,
  /// XP span of a level.
  pub needed: u64,
  pub percentage: f64,
}

pub fn xp_progress(total_xp: u64) -> XpProgress {
  let level = calculate_level(total_xp) as u64;
  let level_start = (level - 1) * XP_PER_LEVEL;
  let current = total_xp - level_start;
  let needed = level * XP_PER_LEVEL - level_start;
  XpProgress {
    current,
    needed,
    percentage: current as f64 / needed as f64 * 100.0,
  }
}

/// Base/bonus award before achievements.
pub fn submission_award(first_completion: bool, attempts: u32) -> u64 {
  match (first_completion, attempts) {
    (true, 1) => PERFECT_XP,
    (true, _) => FIRST_COMPLETION_XP,
    (false, _) => BASE_XP,
  }
}

/// Streak continuation over calendar days (UTC).
/// Same day keeps the streak, the day after extends it, anything else restarts at 1.
pub fn next_streak(current: u32, last_active: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
  let today = now.date_naive();
  match last_active.map(|t| t.date_naive()) {
    Some(day) if day == today => current,
    Some(day) if day + Duration::days(1) == today => current + 1,
    _ => 1,
  }
}

// ------------------------------------------------------------------
// Achievements
// ------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AchievementId {
  #[serde(rename = "first_steps")]
  FirstSteps,
  #[serde(rename = "streak_3")]
  Streak3,
  #[serde(rename = "streak_7")]
  Streak7,
  #[serde(rename = "completed_10")]
  Completed10,
  #[serde(rename = "completed_50")]
  Completed50,
  #[serde(rename = "completed_100")]
  Completed100,
  #[serde(rename = "section_complete")]
  SectionComplete,
  #[serde(rename = "perfectionist")]
  Perfectionist,
}

impl AchievementId {
  pub fn as_str(&self) -> &'static str {
    match self {
      AchievementId::FirstSteps => "first_steps",
      AchievementId::Streak3 => "streak_3",
      AchievementId::Streak7 => "streak_7",
      AchievementId::Completed10 => "completed_10",
      AchievementId::Completed50 => "completed_50",
      AchievementId::Completed100 => "completed_100",
      AchievementId::SectionComplete => "section_complete",
      AchievementId::Perfectionist => "perfectionist",
    }
  }

  /// Eligibility predicate. Must stay side-effect free.
  pub fn is_met(&self, stats: &UserStats) -> bool {
    match self {
      AchievementId::FirstSteps => stats.exercises_completed() >= 1,
      AchievementId::Streak3 => stats.current_streak >= 3,
      AchievementId::Streak7 => stats.current_streak >= 7,
      AchievementId::Completed10 => stats.exercises_completed() >= 10,
      AchievementId::Completed50 => stats.exercises_completed() >= 50,
      AchievementId::Completed100 => stats.exercises_completed() >= 100,
      AchievementId::SectionComplete => stats
        .completed_by_section()
        .values()
        .any(|&n| n >= SECTION_SIZE),
      AchievementId::Perfectionist => stats.first_try_completions() >= 10,
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
  pub id: AchievementId,
  pub title: &'static str,
  pub description: &'static str,
  pub icon: &'static str,
  pub xp_reward: u64,
}

/// Evaluation order is catalog order.
pub const ACHIEVEMENTS: [Achievement; 8] = [
  Achievement {
    id: AchievementId::FirstSteps,
    title: "Primeros Pasos",
    description: "Completa tu primer ejercicio",
    icon: "Target",
    xp_reward: 50,
  },
  Achievement {
    id: AchievementId::Streak3,
    title: "Constancia",
    description: "Mantén una racha de 3 días",
    icon: "Flame",
    xp_reward: 100,
  },
  Achievement {
    id: AchievementId::Streak7,
    title: "Dedicación",
    description: "Mantén una racha de 7 días",
    icon: "Zap",
    xp_reward: 250,
  },
  Achievement {
    id: AchievementId::Completed10,
    title: "Aprendiz",
    description: "Completa 10 ejercicios",
    icon: "BookOpen",
    xp_reward: 150,
  },
  Achievement {
    id: AchievementId::Completed50,
    title: "Practicante",
    description: "Completa 50 ejercicios",
    icon: "GraduationCap",
    xp_reward: 500,
  },
  Achievement {
    id: AchievementId::Completed100,
    title: "Experto",
    description: "Completa 100 ejercicios",
    icon: "Trophy",
    xp_reward: 1000,
  },
  Achievement {
    id: AchievementId::SectionComplete,
    title: "Maestro de Sección",
    description: "Completa todos los ejercicios de una sección",
    icon: "Star",
    xp_reward: 750,
  },
  Achievement {
    id: AchievementId::Perfectionist,
    title: "Perfeccionista",
    description: "Completa 10 ejercicios en el primer intento",
    icon: "Gem",
    xp_reward: 300,
  },
];

/// Unlock every eligible achievement, crediting its reward to `total_xp`.
///
/// Scans the catalog repeatedly until a full pass unlocks nothing, so an unlock whose
/// reward makes a later predicate true is picked up in the same call. Already unlocked
/// ids are skipped, which makes this idempotent. Returns the new ids and their summed reward.
pub fn unlock_achievements(stats: &mut UserStats) -> (Vec<AchievementId>, u64) {
  let mut unlocked = Vec::new();
  let mut reward = 0u64;
  loop {
    let mut progressed = false;
    for a in ACHIEVEMENTS.iter() {
      if !stats.has_unlocked(a.id) && a.id.is_met(stats) {
        stats.unlocked_achievements.push(a.id);
        stats.total_xp = stats.total_xp.saturating_add(a.xp_reward);
        reward = reward.saturating_add(a.xp_reward);
        unlocked.push(a.id);
        progressed = true;
        info!(target: "progression", user = %stats.user_id, achievement = a.id.as_str(), reward = a.xp_reward, "Achievement unlocked");
      }
    }
    if !progressed {
      break;
    }
  }
  (unlocked, reward)
}

// ------------------------------------------------------------------
// Submissions
// ------------------------------------------------------------------

/// One graded submission as seen by the engine.
#[derive(Clone, Debug)]
pub struct Submission<'a> {
  pub exercise_id: &'a str,
  pub section_id: SectionId,
  pub code: &'a str,
  pub time_spent_secs: u64,
  pub now: DateTime<Utc>,
}

/// Completion context derived from the stats *before* this submission is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptContext {
  pub first_completion: bool,
  /// Attempts including this one.
  pub attempts: u32,
}

impl AttemptContext {
  pub fn for_exercise(stats: &UserStats, exercise_id: &str) -> Self {
    let existing = stats.exercise_progress.get(exercise_id);
    Self {
      first_completion: !existing.map(|p| p.completed).unwrap_or(false),
      attempts: existing.map(|p| p.attempts).unwrap_or(0) + 1,
    }
  }
}

#[derive(Clone, Debug)]
pub struct Progression {
  pub stats: UserStats,
  /// Base/bonus award plus every achievement reward unlocked by this submission.
  pub xp_earned: u64,
  pub submission_xp: u64,
  pub unlocked: Vec<AchievementId>,
}

fn progress_record(stats: &UserStats, sub: &Submission<'_>, attempts: u32, completed: bool) -> ExerciseProgress {
  let previous_time = stats
    .exercise_progress
    .get(sub.exercise_id)
    .map(|p| p.time_spent)
    .unwrap_or(0);
  ExerciseProgress {
    exercise_id: sub.exercise_id.to_string(),
    section_id: sub.section_id,
    completed,
    attempts,
    last_attempt_date: sub.now,
    time_spent: previous_time.saturating_add(sub.time_spent_secs),
    code_submitted: Some(sub.code.to_string()),
  }
}

/// Apply a submission already graded correct.
pub fn apply_correct_submission(mut stats: UserStats, sub: &Submission<'_>, ctx: AttemptContext) -> Progression {
  let submission_xp = submission_award(ctx.first_completion, ctx.attempts);
  let level_before = stats.level();

  let record = progress_record(&stats, sub, ctx.attempts, true);
  stats.exercise_progress.insert(sub.exercise_id.to_string(), record);

  stats.total_xp = stats.total_xp.saturating_add(submission_xp);
  stats.total_time_spent = stats.total_time_spent.saturating_add(sub.time_spent_secs);

  let streak = next_streak(stats.current_streak, stats.last_active_date, sub.now);
  stats.current_streak = streak;
  stats.longest_streak = stats.longest_streak.max(streak);
  stats.last_active_date = Some(sub.now);

  let (unlocked, achievement_xp) = unlock_achievements(&mut stats);

  debug!(
    target: "progression",
    user = %stats.user_id,
    exercise = sub.exercise_id,
    first_completion = ctx.first_completion,
    attempts = ctx.attempts,
    submission_xp,
    achievement_xp,
    streak,
    level_before,
    level_after = stats.level(),
    "Correct submission applied"
  );

  Progression {
    stats,
    xp_earned: submission_xp.saturating_add(achievement_xp),
    submission_xp,
    unlocked,
  }
}

/// Record an incorrect attempt. An earlier completion is never revoked, and no XP or
/// streak changes happen.
pub fn record_incorrect_submission(mut stats: UserStats, sub: &Submission<'_>, ctx: AttemptContext) -> UserStats {
  let record = progress_record(&stats, sub, ctx.attempts, !ctx.first_completion);
  stats.exercise_progress.insert(sub.exercise_id.to_string(), record);
  stats.total_time_spent = stats.total_time_spent.saturating_add(sub.time_spent_secs);
  stats
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use proptest::prelude::*;

  fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
  }

  fn submit<'a>(id: &'a str, now: DateTime<Utc>) -> Submission<'a> {
    Submission {
      exercise_id: id,
      section_id: SectionId::Variables,
      code: "resultado = 42",
      time_spent_secs: 30,
      now,
    }
  }

  fn correct(stats: UserStats, id: &str, now: DateTime<Utc>) -> Progression {
    let ctx = AttemptContext::for_exercise(&stats, id);
    apply_correct_submission(stats, &submit(id, now), ctx)
  }

  fn wrong(stats: UserStats, id: &str, now: DateTime<Utc>) -> UserStats {
    let ctx = AttemptContext::for_exercise(&stats, id);
    record_incorrect_submission(stats, &submit(id, now), ctx)
  }

  #[test]
  fn level_examples() {
    assert_eq!(calculate_level(0), 1);
    assert_eq!(calculate_level(999), 1);
    assert_eq!(calculate_level(1000), 2);
    assert_eq!(calculate_level(2500), 3);
    assert_eq!(xp_for_next_level(2500), 3000);
  }

  proptest! {
    #[test]
    fn level_is_floor_of_xp(x in 0u64..10_000_000) {
      prop_assert_eq!(calculate_level(x) as u64, x / XP_PER_LEVEL + 1);
    }

    #[test]
    fn xp_progress_reconstructs_total(x in 0u64..10_000_000) {
      let p = xp_progress(x);
      let level = calculate_level(x) as u64;
      prop_assert_eq!(p.current + (level - 1) * XP_PER_LEVEL, x);
      prop_assert!(p.percentage >= 0.0 && p.percentage <= 100.0);
    }
  }

  #[test]
  fn first_completion_on_first_attempt_awards_perfect_bonus() {
    let out = correct(UserStats::new("u"), "var-int-0", at(1, 10));
    assert_eq!(out.submission_xp, 100);
    // first_steps unlocks in the same submission
    assert_eq!(out.unlocked, vec![AchievementId::FirstSteps]);
    assert_eq!(out.xp_earned, 150);
    assert_eq!(out.stats.total_xp, 150);
    assert_eq!(out.stats.exercises_completed(), 1);
  }

  #[test]
  fn first_completion_after_failures_awards_fifty() {
    let stats = wrong(UserStats::new("u"), "var-int-0", at(1, 9));
    assert_eq!(stats.total_xp, 0);
    assert_eq!(stats.exercises_completed(), 0);

    let out = correct(stats, "var-int-0", at(1, 10));
    assert_eq!(out.submission_xp, 50);
    assert_eq!(out.stats.exercise_progress["var-int-0"].attempts, 2);
  }

  #[test]
  fn repeat_completion_awards_base_and_keeps_count() {
    let first = correct(UserStats::new("u"), "var-int-0", at(1, 10));
    let again = correct(first.stats, "var-int-0", at(1, 11));
    assert_eq!(again.submission_xp, 10);
    assert_eq!(again.xp_earned, 10);
    assert!(again.unlocked.is_empty());
    assert_eq!(again.stats.exercises_completed(), 1);
    assert_eq!(again.stats.total_xp, 160);
  }

  #[test]
  fn failing_a_completed_exercise_keeps_it_completed() {
    let first = correct(UserStats::new("u"), "var-int-0", at(1, 10));
    let stats = wrong(first.stats, "var-int-0", at(1, 11));
    assert!(stats.exercise_progress["var-int-0"].completed);
    assert_eq!(stats.exercise_progress["var-int-0"].attempts, 2);
    assert_eq!(stats.exercises_completed(), 1);
    assert_eq!(stats.total_time_spent, 60);
  }

  #[test]
  fn time_totals_saturate_instead_of_overflowing() {
    let huge = |id| Submission { time_spent_secs: u64::MAX - 1, ..submit(id, at(1, 10)) };
    let stats = UserStats::new("u");
    let ctx = AttemptContext::for_exercise(&stats, "a");
    let stats = record_incorrect_submission(stats, &huge("a"), ctx);
    let ctx = AttemptContext::for_exercise(&stats, "a");
    let out = apply_correct_submission(stats, &huge("a"), ctx);
    assert_eq!(out.stats.total_time_spent, u64::MAX);
    assert_eq!(out.stats.exercise_progress["a"].time_spent, u64::MAX);
    assert_eq!(out.stats.exercise_progress["a"].attempts, 2);
  }

  #[test]
  fn streak_rules_follow_calendar_days() {
    let mut stats = correct(UserStats::new("u"), "a", at(1, 10)).stats;
    assert_eq!(stats.current_streak, 1);

    // same day, different hour
    stats = correct(stats, "b", at(1, 23)).stats;
    assert_eq!(stats.current_streak, 1);

    // next calendar day, even though less than 24h later
    stats = correct(stats, "c", at(2, 1)).stats;
    assert_eq!(stats.current_streak, 2);

    stats = correct(stats, "d", at(3, 8)).stats;
    assert_eq!(stats.current_streak, 3);
    assert_eq!(stats.longest_streak, 3);

    // skipped day 4
    stats = correct(stats, "e", at(5, 8)).stats;
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.longest_streak, 3);
  }

  #[test]
  fn next_streak_without_history_starts_at_one() {
    assert_eq!(next_streak(0, None, at(1, 0)), 1);
    assert_eq!(next_streak(4, Some(at(1, 0)), at(1, 23)), 4);
  }

  #[test]
  fn streak_achievement_unlocks_on_third_day() {
    let mut stats = correct(UserStats::new("u"), "a", at(1, 10)).stats;
    stats = correct(stats, "b", at(2, 10)).stats;
    let out = correct(stats, "c", at(3, 10));
    assert_eq!(out.unlocked, vec![AchievementId::Streak3]);
    assert_eq!(out.xp_earned, 100 + 100);
  }

  #[test]
  fn unlocking_is_idempotent() {
    let out = correct(UserStats::new("u"), "a", at(1, 10));
    let mut stats = out.stats;
    let xp = stats.total_xp;
    assert_eq!(unlock_achievements(&mut stats), (vec![], 0));
    assert_eq!(stats.total_xp, xp);
    assert_eq!(
      stats.unlocked_achievements.iter().filter(|a| **a == AchievementId::FirstSteps).count(),
      1
    );
  }

  #[test]
  fn several_achievements_unlock_in_catalog_order() {
    let mut stats = UserStats::new("u");
    for i in 0..10 {
      let id = format!("var-int-{}", i);
      stats.exercise_progress.insert(
        id.clone(),
        ExerciseProgress {
          exercise_id: id,
          section_id: SectionId::Variables,
          completed: true,
          attempts: 1,
          last_attempt_date: at(1, 0),
          time_spent: 5,
          code_submitted: None,
        },
      );
    }
    let (unlocked, reward) = unlock_achievements(&mut stats);
    assert_eq!(reward, 50 + 150 + 300);
    assert_eq!(
      unlocked,
      vec![AchievementId::FirstSteps, AchievementId::Completed10, AchievementId::Perfectionist]
    );
    assert_eq!(stats.total_xp, 50 + 150 + 300);
  }

  #[test]
  fn section_complete_needs_a_full_section() {
    let mut stats = UserStats::new("u");
    for i in 0..SECTION_SIZE {
      let id = format!("loop-{}", i);
      stats.exercise_progress.insert(
        id.clone(),
        ExerciseProgress {
          exercise_id: id,
          section_id: SectionId::Bucles,
          completed: true,
          attempts: 2,
          last_attempt_date: at(1, 0),
          time_spent: 1,
          code_submitted: None,
        },
      );
    }
    assert!(AchievementId::SectionComplete.is_met(&stats));
    stats.exercise_progress.get_mut("loop-0").unwrap().completed = false;
    assert!(!AchievementId::SectionComplete.is_met(&stats));
  }

  #[test]
  fn catalog_ids_are_unique_and_serialize_to_their_names() {
    for (i, a) in ACHIEVEMENTS.iter().enumerate() {
      assert!(ACHIEVEMENTS[i + 1..].iter().all(|b| b.id != a.id));
      assert_eq!(serde_json::to_value(a.id).unwrap(), a.id.as_str());
    }
  }
}
