//! Small utility helpers used across modules.

/// Canonical text form for answer comparison: trimmed, lowercased, with all
/// whitespace removed ("  3 / 4 " -> "3/4").
pub fn normalize_answer(s: &str) -> String {
  s.chars()
    .filter(|c| !c.is_whitespace())
    .flat_map(char::to_lowercase)
    .collect()
}

/// Log-safe truncation for learner-provided strings.
/// Keeps a runaway paste from flooding the logs.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
