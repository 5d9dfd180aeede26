//! Loading application configuration (tutor prompts + tuning knobs) from TOML.
//!
//! See `AppConfig` and `Prompts` for expected schema. Every key is optional.

use serde::Deserialize;
use tracing::{error, info};

use crate::leaderboard::DEFAULT_LIMIT;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub prompts: Prompts,
  /// Seeds exercise generation; `None` draws from entropy.
  pub exercise_seed: Option<u64>,
  /// Upper bound for leaderboard size.
  pub leaderboard_limit: usize,
  /// Applied to every call to the tutor model.
  pub ai_timeout_secs: u64,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      prompts: Prompts::default(),
      exercise_seed: None,
      leaderboard_limit: DEFAULT_LIMIT,
      ai_timeout_secs: 20,
    }
  }
}

/// Prompts used by the tutor client. Defaults target Spanish-speaking Python learners.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub hint_system: String,
  /// Placeholders: {level}, {level_guidance}, {exercise}, {code}, {error}
  pub hint_user_template: String,
  pub hint_level_1: String,
  pub hint_level_2: String,
  pub hint_level_3: String,
  pub chat_system: String,
  /// Placeholders: {context}, {message}
  pub chat_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      hint_system: "Eres un tutor de Python experto y amigable. Ayudas a estudiantes con pistas útiles sin dar nunca la solución completa. Responde en español, de forma breve, alentadora y positiva.".into(),
      hint_user_template: "Nivel de pista {level}: {level_guidance}\n\nEjercicio: {exercise}\nCódigo actual del estudiante: {code}\n{error}".into(),
      hint_level_1: "Da una pista muy sutil que oriente al estudiante en la dirección correcta sin revelar la solución.".into(),
      hint_level_2: "Señala exactamente qué concepto u operación de Python necesita usar.".into(),
      hint_level_3: "Da una pista muy detallada que casi muestre la solución, pero que aún requiera que el estudiante escriba el código.".into(),
      chat_system: "Eres un tutor de Python experto y amigable que ayuda a un estudiante con ejercicios. Responde de manera clara, educativa y alentadora en español. Si pide la solución directa, anímalo a pensar por sí mismo con pistas.".into(),
      chat_user_template: "{context}\n\nPregunta del estudiante: {message}".into(),
    }
  }
}

impl Prompts {
  pub fn hint_level_guidance(&self, level: u8) -> &str {
    match level {
      1 => &self.hint_level_1,
      2 => &self.hint_level_2,
      _ => &self.hint_level_3,
    }
  }
}

pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from CODEQUEST_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("CODEQUEST_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "codequest", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "codequest", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "codequest", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
