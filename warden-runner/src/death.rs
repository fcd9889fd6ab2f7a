// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assert-message extraction and fuzzy string similarity for death-test
//! classification (spec §4.E). Deliberately kept to the exact contract the
//! spec pins down, not a general-purpose assert-parsing library: the pack
//! marks this heuristic as an external collaborator the core only needs the
//! contract of.

use std::sync::OnceLock;

use regex::Regex;

fn assert_message_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"&&\s*"([^"]*)""#).expect("static regex is valid"))
}

/// Locates the message embedded in a `assert(expr && "message")`-style
/// diagnostic: find the last `" on file "` anchor, then the last
/// `&& "..."` quoted string preceding it. Returns `None` if the pattern
/// isn't present, per §4.E ("extraction fails and the death test fails with
/// an explicit diagnostic").
pub fn extract_assert_message(captured_output: &str) -> Option<String> {
    let anchor = captured_output.rfind(" on file ")?;
    let prefix = &captured_output[..anchor];
    assert_message_pattern().captures_iter(prefix).last().map(|c| c[1].to_string())
}

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, case-insensitive. Two
/// empty strings are similarity 1 (spec §4.E).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(&a_chars, &b_chars) as f64 / max_len as f64)
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_from_well_formed_assert_diagnostic() {
        let output = r#"Assertion failed: ptr != nullptr && "pointer must not be null" on file src/thing.c line 42"#;
        assert_eq!(extract_assert_message(output).as_deref(), Some("pointer must not be null"));
    }

    #[test]
    fn returns_none_without_the_on_file_anchor() {
        assert_eq!(extract_assert_message("segmentation fault"), None);
    }

    #[test]
    fn returns_none_without_a_preceding_quoted_message() {
        let output = "Assertion failed: x == y on file a.c line 1";
        assert_eq!(extract_assert_message(output), None);
    }

    #[test]
    fn uses_the_last_anchor_when_multiple_assertions_are_present() {
        let output = concat!(
            r#"Assertion failed: a && "first" on file a.c line 1"#,
            "\n",
            r#"Assertion failed: b && "second" on file b.c line 2"#,
        );
        assert_eq!(extract_assert_message(output).as_deref(), Some("second"));
    }

    #[test]
    fn identical_strings_have_similarity_one() {
        assert_eq!(similarity("abc", "abc"), 1.0);
    }

    #[test]
    fn two_empty_strings_have_similarity_one() {
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn comparison_is_case_insensitive() {
        assert_eq!(similarity("ABC", "abc"), 1.0);
    }

    #[test]
    fn completely_different_strings_of_equal_length_have_similarity_near_zero() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn one_edit_in_a_longer_string_yields_high_similarity() {
        let s = similarity("pointer must not be null", "pointer must not be nul1");
        assert!(s > 0.9, "expected high similarity, got {s}");
    }
}
