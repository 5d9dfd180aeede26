//! Public protocol structs for the HTTP API (serde ready, camelCase on the wire).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ExerciseProgress, SectionId, UserStats};
use crate::openai::ChatContext;
use crate::progression::{xp_for_next_level, xp_progress, Achievement, AchievementId, XpProgress};

//
// Stats
//

/// `UserStats` plus the values derived from it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsOut {
    pub user_id: String,
    pub total_xp: u64,
    pub level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_date: Option<DateTime<Utc>>,
    pub exercises_completed: usize,
    pub total_time_spent: u64,
    pub exercise_progress: BTreeMap<String, ExerciseProgress>,
    pub unlocked_achievements: Vec<AchievementId>,
    pub xp_progress: XpProgress,
    pub xp_for_next_level: u64,
}

pub fn stats_out(s: &UserStats) -> UserStatsOut {
    UserStatsOut {
        user_id: s.user_id.clone(),
        total_xp: s.total_xp,
        level: s.level(),
        current_streak: s.current_streak,
        longest_streak: s.longest_streak,
        last_active_date: s.last_active_date,
        exercises_completed: s.exercises_completed(),
        total_time_spent: s.total_time_spent,
        exercise_progress: s.exercise_progress.clone(),
        unlocked_achievements: s.unlocked_achievements.clone(),
        xp_progress: xp_progress(s.total_xp),
        xp_for_next_level: xp_for_next_level(s.total_xp),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementOut {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
}

//
// Submit
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitIn {
    pub exercise_id: String,
    pub section_id: SectionId,
    pub code: String,
    /// Seconds; non-negative.
    pub time_spent: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOut {
    pub correct: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp_earned: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unlocked_achievements: Vec<AchievementId>,
}

//
// Tutor
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintIn {
    pub exercise_prompt: String,
    pub user_code: String,
    #[serde(default)]
    pub error_message: Option<String>,
    pub hint_level: HintLevel,
}

/// Hint depth: 1 (subtle) to 3 (nearly the answer).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u8")]
pub struct HintLevel(u8);

impl HintLevel {
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HintLevel {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1..=3 => Ok(HintLevel(v)),
            _ => Err(format!("hintLevel must be 1, 2 or 3 (got {})", v)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HintOut {
    pub hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatIn {
    pub message: String,
    #[serde(default)]
    pub context: ChatContext,
}

#[derive(Debug, Serialize)]
pub struct ChatOut {
    pub response: String,
}

//
// Users, leaderboard, misc
//

#[derive(Debug, Deserialize)]
pub struct NewUserIn {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}
