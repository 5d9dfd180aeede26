//! In-memory progress store: the only owner of user records and their stats.
//!
//! Users are kept in insertion order, which is also the tie order seen by the leaderboard.
//! Every operation is synchronous and infallible; callers that share the store across
//! tasks wrap it in a lock (see `AppState`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{ExerciseProgress, User, UserStats};
use crate::progression::AchievementId;

/// Partial stats update; `None` fields keep their current value.
#[derive(Clone, Debug, Default)]
pub struct StatsPatch {
  pub total_xp: Option<u64>,
  pub current_streak: Option<u32>,
  pub longest_streak: Option<u32>,
  pub last_active_date: Option<DateTime<Utc>>,
  pub total_time_spent: Option<u64>,
}

impl StatsPatch {
  /// Patch carrying every scalar counter of `stats`.
  pub fn from_stats(stats: &UserStats) -> Self {
    Self {
      total_xp: Some(stats.total_xp),
      current_streak: Some(stats.current_streak),
      longest_streak: Some(stats.longest_streak),
      last_active_date: stats.last_active_date,
      total_time_spent: Some(stats.total_time_spent),
    }
  }
}

struct Record {
  user: User,
  stats: UserStats,
}

#[derive(Default)]
pub struct ProgressStore {
  records: Vec<Record>,
  index: HashMap<String, usize>,
}

impl ProgressStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  fn insert(&mut self, user: User) -> usize {
    let idx = self.records.len();
    self.index.insert(user.id.clone(), idx);
    let stats = UserStats::new(user.id.clone());
    self.records.push(Record { user, stats });
    idx
  }

  fn slot(&mut self, user_id: &str) -> usize {
    match self.index.get(user_id) {
      Some(&idx) => idx,
      None => {
        debug!(target: "progression", user = %user_id, "Creating zeroed stats on first access");
        self.insert(User { id: user_id.to_string(), username: user_id.to_string() })
      }
    }
  }

  /// Register a named user with a fresh id. Returns `None` when the username is taken.
  pub fn create_user(&mut self, username: &str) -> Option<User> {
    if self.user_by_username(username).is_some() {
      return None;
    }
    let user = User { id: Uuid::new_v4().to_string(), username: username.to_string() };
    self.insert(user.clone());
    info!(target: "progression", id = %user.id, %username, "User registered");
    Some(user)
  }

  pub fn user(&self, user_id: &str) -> Option<&User> {
    self.index.get(user_id).map(|&i| &self.records[i].user)
  }

  pub fn user_by_username(&self, username: &str) -> Option<&User> {
    self.records.iter().map(|r| &r.user).find(|u| u.username == username)
  }

  pub fn stats(&self, user_id: &str) -> Option<&UserStats> {
    self.index.get(user_id).map(|&i| &self.records[i].stats)
  }

  pub fn get_or_create(&mut self, user_id: &str) -> &UserStats {
    let idx = self.slot(user_id);
    &self.records[idx].stats
  }

  pub fn update_stats(&mut self, user_id: &str, patch: StatsPatch) -> &UserStats {
    let idx = self.slot(user_id);
    let stats = &mut self.records[idx].stats;
    if let Some(v) = patch.total_xp {
      stats.total_xp = v;
    }
    if let Some(v) = patch.current_streak {
      stats.current_streak = v;
    }
    if let Some(v) = patch.longest_streak {
      stats.longest_streak = v;
    }
    if let Some(v) = patch.last_active_date {
      stats.last_active_date = Some(v);
    }
    if let Some(v) = patch.total_time_spent {
      stats.total_time_spent = v;
    }
    stats
  }

  pub fn upsert_progress(&mut self, user_id: &str, progress: ExerciseProgress) -> &UserStats {
    let idx = self.slot(user_id);
    let stats = &mut self.records[idx].stats;
    stats.exercise_progress.insert(progress.exercise_id.clone(), progress);
    stats
  }

  /// Appends the id unless it is already unlocked.
  pub fn unlock_achievement(&mut self, user_id: &str, id: AchievementId) -> &UserStats {
    let idx = self.slot(user_id);
    let stats = &mut self.records[idx].stats;
    if !stats.unlocked_achievements.contains(&id) {
      stats.unlocked_achievements.push(id);
    }
    stats
  }

  /// Users with their stats, in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = (&User, &UserStats)> {
    self.records.iter().map(|r| (&r.user, &r.stats))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::SectionId;

  fn progress(id: &str, completed: bool) -> ExerciseProgress {
    ExerciseProgress {
      exercise_id: id.into(),
      section_id: SectionId::Bucles,
      completed,
      attempts: 1,
      last_attempt_date: Utc::now(),
      time_spent: 12,
      code_submitted: None,
    }
  }

  #[test]
  fn first_access_creates_zeroed_stats() {
    let mut store = ProgressStore::new();
    let stats = store.get_or_create("u1").clone();
    assert_eq!(stats, UserStats::new("u1"));
    assert_eq!(stats.level(), 1);
    assert_eq!(store.user("u1").map(|u| u.username.as_str()), Some("u1"));
    store.get_or_create("u1");
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn partial_update_keeps_unspecified_fields() {
    let mut store = ProgressStore::new();
    store.update_stats("u", StatsPatch { total_xp: Some(300), current_streak: Some(2), ..Default::default() });
    let s = store.update_stats("u", StatsPatch { total_xp: Some(450), ..Default::default() });
    assert_eq!(s.total_xp, 450);
    assert_eq!(s.current_streak, 2);
    assert_eq!(s.level(), 1);
  }

  #[test]
  fn upsert_replaces_the_exercise_record() {
    let mut store = ProgressStore::new();
    store.upsert_progress("u", progress("loop-sum-0", false));
    let s = store.upsert_progress("u", progress("loop-sum-0", true));
    assert_eq!(s.exercise_progress.len(), 1);
    assert_eq!(s.exercises_completed(), 1);
  }

  #[test]
  fn unlock_is_idempotent() {
    let mut store = ProgressStore::new();
    store.unlock_achievement("u", AchievementId::FirstSteps);
    store.unlock_achievement("u", AchievementId::Streak3);
    let s = store.unlock_achievement("u", AchievementId::FirstSteps);
    assert_eq!(s.unlocked_achievements, vec![AchievementId::FirstSteps, AchievementId::Streak3]);
  }

  #[test]
  fn usernames_are_unique() {
    let mut store = ProgressStore::new();
    let ada = store.create_user("ada").unwrap();
    assert!(store.create_user("ada").is_none());
    assert_eq!(store.user_by_username("ada"), Some(&ada));
    assert_eq!(store.stats(&ada.id).map(|s| s.total_xp), Some(0));
  }

  #[test]
  fn iteration_follows_insertion_order() {
    let mut store = ProgressStore::new();
    for id in ["c", "a", "b"] {
      store.get_or_create(id);
    }
    let ids: Vec<&str> = store.iter().map(|(u, _)| u.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
  }
}
