//! Keyword result extractor
//!
//! Reduces free-text agent output to the lines that mention a stage's
//! vocabulary. This is a line filter, not a parser: it keeps whole lines that
//! contain a keyword (case-sensitive substring) in their original order.

/// Filters `raw_text` down to the lines containing at least one keyword
///
/// Lines are split on `\n` and rejoined with `\n`. When no line matches,
/// `raw_text` is returned unchanged so that output phrased outside the
/// expected vocabulary is not thrown away.
pub fn extract<K: AsRef<str>>(raw_text: &str, keywords: &[K]) -> String {
    let kept: Vec<&str> = raw_text
        .split('\n')
        .filter(|line| keywords.iter().any(|k| line.contains(k.as_ref())))
        .collect();

    if kept.is_empty() {
        return raw_text.to_string();
    }

    kept.join("\n")
}
