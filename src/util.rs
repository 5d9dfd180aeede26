//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings, cut on a char boundary.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fills_every_occurrence_and_leaves_unknown_keys() {
    let out = fill_template("{a} y {a} con {b} {c}", &[("a", "uno"), ("b", "dos")]);
    assert_eq!(out, "uno y uno con dos {c}");
  }

  #[test]
  fn truncation_respects_utf8() {
    assert_eq!(trunc_for_log("hola", 10), "hola");
    let s = "añoañoaño";
    let out = trunc_for_log(s, 2);
    assert!(out.starts_with('a'));
    assert!(out.ends_with(&format!("({} bytes total)", s.len())));
  }
}
