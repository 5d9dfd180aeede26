//! CodeQuest backend: Python practice exercises, grading, XP/streak/achievement
//! progression, a leaderboard and an optional tutor for hints and chat.

pub mod config;
pub mod domain;
pub mod error;
pub mod exercises;
pub mod grading;
pub mod leaderboard;
pub mod logic;
pub mod openai;
pub mod progression;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;
