//! Heuristic grading of a submission without executing it.
//!
//! The first single-line `resultado = <expr>` assignment is located and its right-hand side
//! text is compared against the expected value: exact equality, or substring containment of
//! the expected value's Python-literal form. Floats additionally accept a numerically equal
//! literal. This is deliberately a weak oracle: `resultado = "not 42 at all 42"` passes for
//! an expected `42`, and `resultado = a + b` fails even when it would evaluate correctly.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::{Exercise, ExpectedResult};

pub const MSG_CORRECT: &str = "¡Excelente trabajo! Tu solución es correcta.";
pub const MSG_MISSING_RESULT: &str = "No se encontró la variable 'resultado' en tu código. Asegúrate de guardar tu respuesta en una variable llamada 'resultado'.";

const FLOAT_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Verdict {
  pub correct: bool,
  pub message: String,
}

impl Verdict {
  fn correct() -> Self {
    Self { correct: true, message: MSG_CORRECT.into() }
  }

  fn incorrect(message: impl Into<String>) -> Self {
    Self { correct: false, message: message.into() }
  }
}

fn assignment_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  // `.` stops at newlines, so only the rest of the assignment's line is captured.
  RE.get_or_init(|| Regex::new(r"resultado\s*=\s*(.+)").expect("static regex"))
}

/// Right-hand side of the first `resultado = ...` assignment, trimmed.
pub fn extract_result_expression(code: &str) -> Option<&str> {
  assignment_re()
    .captures(code)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().trim())
}

fn matches_expected(rhs: &str, expected: &ExpectedResult) -> bool {
  let expected_str = expected.to_string();
  if rhs == expected_str || rhs.contains(&expected_str) {
    return true;
  }
  match expected {
    ExpectedResult::Float(x) => rhs
      .parse::<f64>()
      .map(|v| (v - x).abs() < FLOAT_TOLERANCE)
      .unwrap_or(false),
    _ => false,
  }
}

pub fn grade(exercise: &Exercise, code: &str) -> Verdict {
  let Some(rhs) = extract_result_expression(code) else {
    return Verdict::incorrect(MSG_MISSING_RESULT);
  };

  if matches_expected(rhs, &exercise.expected_result) {
    Verdict::correct()
  } else {
    Verdict::incorrect(format!(
      "El resultado no es correcto. Se esperaba: {}, pero tu código produce un resultado diferente.",
      exercise.expected_result
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, SectionId};

  fn exercise(expected: ExpectedResult) -> Exercise {
    Exercise {
      id: "t-0".into(),
      section_id: SectionId::Variables,
      prompt: String::new(),
      starter_code: String::new(),
      result_type: expected.result_type(),
      expected_result: expected,
      difficulty: Difficulty::Easy,
      hints: vec![],
      explanation: String::new(),
    }
  }

  #[test]
  fn literal_assignment_is_correct() {
    let v = grade(&exercise(ExpectedResult::Integer(42)), "resultado = 42");
    assert!(v.correct);
    assert_eq!(v.message, MSG_CORRECT);
  }

  #[test]
  fn missing_assignment_is_reported() {
    let v = grade(&exercise(ExpectedResult::Integer(42)), "a = 40\nb = 2\nprint(a + b)");
    assert!(!v.correct);
    assert_eq!(v.message, MSG_MISSING_RESULT);
  }

  #[test]
  fn substring_rule_accepts_text_containing_expected_value() {
    let v = grade(&exercise(ExpectedResult::Integer(42)), r#"resultado = "not 42 at all 42""#);
    assert!(v.correct);
  }

  #[test]
  fn equivalent_expression_is_rejected() {
    let v = grade(&exercise(ExpectedResult::Integer(42)), "a = 40\nb = 2\nresultado = a + b");
    assert!(!v.correct);
    assert!(v.message.contains("Se esperaba: 42"));
  }

  #[test]
  fn only_the_assignment_line_is_considered() {
    let code = "resultado = 7\n# 42";
    assert!(!grade(&exercise(ExpectedResult::Integer(42)), code).correct);
    let code = "x = 1\nresultado   =   42   \nprint(resultado)";
    assert!(grade(&exercise(ExpectedResult::Integer(42)), code).correct);
  }

  #[test]
  fn booleans_use_python_literals() {
    let ex = exercise(ExpectedResult::Boolean(true));
    assert!(grade(&ex, "resultado = True").correct);
    assert!(!grade(&ex, "resultado = False").correct);
  }

  #[test]
  fn floats_compare_numerically() {
    let ex = exercise(ExpectedResult::Float(12.5));
    assert!(grade(&ex, "resultado = 12.5").correct);
    assert!(grade(&ex, "resultado = 12.50").correct);
    let ex = exercise(ExpectedResult::Float(3.0));
    assert!(grade(&ex, "resultado = 3.0").correct);
    assert!(!grade(&exercise(ExpectedResult::Float(12.5)), "resultado = 1.25").correct);
  }

  #[test]
  fn strings_match_inside_quotes() {
    let ex = exercise(ExpectedResult::Text("Hola, Ada".into()));
    assert!(grade(&ex, r#"resultado = "Hola, Ada""#).correct);
    assert!(!grade(&ex, r#"resultado = "Hola, " + nombre"#).correct);
  }
}
