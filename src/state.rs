//! Application state: exercise bank, progress store, tutor client and prompts.
//!
//! This module owns:
//!   - the exercise bank (generated once at startup, read-only afterwards)
//!   - the progress store behind a single `RwLock`; writers hold the write guard for the
//!     whole read-modify-write of a submission, so concurrent submissions never lose updates
//!   - the prompts struct (from TOML or defaults)
//!   - optional tutor client

use std::{sync::Arc, time::Duration};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::{AppConfig, Prompts};
use crate::domain::SectionId;
use crate::exercises::ExerciseBank;
use crate::openai::OpenAI;
use crate::store::ProgressStore;

#[derive(Clone)]
pub struct AppState {
    pub exercises: Arc<ExerciseBank>,
    pub store: Arc<RwLock<ProgressStore>>,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub leaderboard_limit: usize,
}

impl AppState {
    /// Build state from config with an explicit (possibly absent) tutor client.
    #[instrument(level = "info", skip_all, fields(seeded = cfg.exercise_seed.is_some(), tutor = openai.is_some()))]
    pub fn new(cfg: AppConfig, openai: Option<OpenAI>) -> Self {
        let mut rng = match cfg.exercise_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let exercises = ExerciseBank::generate(&mut rng);

        for id in SectionId::ALL {
            let count = exercises.section(id).map(|e| e.len()).unwrap_or(0);
            info!(target: "codequest", section = %id, exercises = count, "Startup exercise inventory");
        }

        Self {
            exercises: Arc::new(exercises),
            store: Arc::new(RwLock::new(ProgressStore::new())),
            openai,
            prompts: cfg.prompts,
            leaderboard_limit: cfg.leaderboard_limit.max(1),
        }
    }

    /// Build state from env: optional TOML config and optional tutor client.
    pub fn from_env() -> Self {
        let cfg = crate::config::load_config_from_env().unwrap_or_default();
        let openai = OpenAI::from_env(Duration::from_secs(cfg.ai_timeout_secs));
        if let Some(oa) = &openai {
            info!(target: "codequest", base_url = %oa.base_url, model = %oa.model, timeout_secs = cfg.ai_timeout_secs, "Tutor enabled.");
        } else {
            info!(target: "codequest", "Tutor disabled. Using local hints.");
        }
        Self::new(cfg, openai)
    }
}
