//! Leaderboard projection over the progress store.

use serde::Serialize;

use crate::store::ProgressStore;

pub const DEFAULT_LIMIT: usize = 20;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
  pub user_id: String,
  pub username: String,
  pub total_xp: u64,
  pub level: u32,
  pub exercises_completed: usize,
  pub rank: usize,
}

/// Users by descending total XP, ranks `1..=n` with no gaps. Ties keep store order.
pub fn rank(store: &ProgressStore, limit: usize) -> Vec<LeaderboardEntry> {
  let mut entries: Vec<LeaderboardEntry> = store
    .iter()
    .map(|(user, stats)| LeaderboardEntry {
      user_id: user.id.clone(),
      username: user.username.clone(),
      total_xp: stats.total_xp,
      level: stats.level(),
      exercises_completed: stats.exercises_completed(),
      rank: 0,
    })
    .collect();

  // stable: equal XP keeps insertion order
  entries.sort_by(|a, b| b.total_xp.cmp(&a.total_xp));
  entries.truncate(limit);
  for (i, e) in entries.iter_mut().enumerate() {
    e.rank = i + 1;
  }
  entries
}
