//! Domain models used by the backend: sections, exercises, per-exercise progress and user stats.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progression::{calculate_level, AchievementId};

/// Topic sections of the curriculum. Ids are part of the public API.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
  Variables,
  Colecciones,
  Bucles,
  Funciones,
}

impl SectionId {
  pub const ALL: [SectionId; 4] = [
    SectionId::Variables,
    SectionId::Colecciones,
    SectionId::Bucles,
    SectionId::Funciones,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      SectionId::Variables => "variables",
      SectionId::Colecciones => "colecciones",
      SectionId::Bucles => "bucles",
      SectionId::Funciones => "funciones",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|id| id.as_str() == s)
  }
}

impl fmt::Display for SectionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  /// Step function over a slot index: `i < easy_until` is easy, `i < medium_until` medium, rest hard.
  pub fn tier(i: usize, easy_until: usize, medium_until: usize) -> Self {
    if i < easy_until {
      Difficulty::Easy
    } else if i < medium_until {
      Difficulty::Medium
    } else {
      Difficulty::Hard
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
  Integer,
  Float,
  String,
  Boolean,
}

/// Expected value of `resultado`. Serialized as a bare JSON value; the type lives in `ResultType`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExpectedResult {
  Integer(i64),
  Float(f64),
  Text(String),
  Boolean(bool),
}

impl ExpectedResult {
  pub fn result_type(&self) -> ResultType {
    match self {
      ExpectedResult::Integer(_) => ResultType::Integer,
      ExpectedResult::Float(_) => ResultType::Float,
      ExpectedResult::Text(_) => ResultType::String,
      ExpectedResult::Boolean(_) => ResultType::Boolean,
    }
  }
}

/// Renders the value the way a learner would write it in Python source.
impl fmt::Display for ExpectedResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExpectedResult::Integer(n) => write!(f, "{}", n),
      ExpectedResult::Float(x) => write!(f, "{}", x),
      ExpectedResult::Text(s) => f.write_str(s),
      ExpectedResult::Boolean(true) => f.write_str("True"),
      ExpectedResult::Boolean(false) => f.write_str("False"),
    }
  }
}

/// Immutable exercise definition, generated once per section at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
  pub id: String,
  pub section_id: SectionId,
  pub prompt: String,
  pub starter_code: String,
  pub expected_result: ExpectedResult,
  pub result_type: ResultType,
  pub difficulty: Difficulty,
  pub hints: Vec<String>,
  pub explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProgress {
  pub exercise_id: String,
  pub section_id: SectionId,
  pub completed: bool,
  pub attempts: u32,
  pub last_attempt_date: DateTime<Utc>,
  /// Seconds.
  pub time_spent: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code_submitted: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
  pub id: String,
  pub username: String,
}

/// Per-user aggregate. `level` and `exercises_completed` are derived on read so they can
/// never drift from `total_xp` and `exercise_progress`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
  pub user_id: String,
  pub total_xp: u64,
  pub current_streak: u32,
  pub longest_streak: u32,
  /// `None` until the first graded-correct submission.
  pub last_active_date: Option<DateTime<Utc>>,
  /// Seconds.
  pub total_time_spent: u64,
  pub exercise_progress: BTreeMap<String, ExerciseProgress>,
  pub unlocked_achievements: Vec<AchievementId>,
}

impl UserStats {
  pub fn new(user_id: impl Into<String>) -> Self {
    Self {
      user_id: user_id.into(),
      total_xp: 0,
      current_streak: 0,
      longest_streak: 0,
      last_active_date: None,
      total_time_spent: 0,
      exercise_progress: BTreeMap::new(),
      unlocked_achievements: Vec::new(),
    }
  }

  pub fn level(&self) -> u32 {
    calculate_level(self.total_xp)
  }

  pub fn exercises_completed(&self) -> usize {
    self.exercise_progress.values().filter(|p| p.completed).count()
  }

  pub fn has_unlocked(&self, id: AchievementId) -> bool {
    self.unlocked_achievements.contains(&id)
  }

  /// Completed exercise counts grouped by section.
  pub fn completed_by_section(&self) -> HashMap<SectionId, usize> {
    let mut counts = HashMap::new();
    for p in self.exercise_progress.values().filter(|p| p.completed) {
      *counts.entry(p.section_id).or_insert(0) += 1;
    }
    counts
  }

  /// Exercises completed on their very first attempt.
  pub fn first_try_completions(&self) -> usize {
    self
      .exercise_progress
      .values()
      .filter(|p| p.completed && p.attempts == 1)
      .count()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expected_result_renders_python_literals() {
    assert_eq!(ExpectedResult::Integer(-7).to_string(), "-7");
    assert_eq!(ExpectedResult::Float(12.5).to_string(), "12.5");
    assert_eq!(ExpectedResult::Float(3.0).to_string(), "3");
    assert_eq!(ExpectedResult::Boolean(true).to_string(), "True");
    assert_eq!(ExpectedResult::Text("Hola, Ada".into()).to_string(), "Hola, Ada");
  }

  #[test]
  fn section_ids_round_trip_through_their_names() {
    for id in SectionId::ALL {
      assert_eq!(SectionId::parse(id.as_str()), Some(id));
    }
    assert_eq!(SectionId::parse("clases"), None);
  }

  #[test]
  fn difficulty_tier_is_a_step_function() {
    assert_eq!(Difficulty::tier(0, 20, 50), Difficulty::Easy);
    assert_eq!(Difficulty::tier(19, 20, 50), Difficulty::Easy);
    assert_eq!(Difficulty::tier(20, 20, 50), Difficulty::Medium);
    assert_eq!(Difficulty::tier(49, 20, 50), Difficulty::Medium);
    assert_eq!(Difficulty::tier(50, 20, 50), Difficulty::Hard);
  }
}
