//! Mark string parsing.
//!
//! A mark string is a user-typed list of tags separated by `;`.

use super::model::Mark;

/// Separator between tags in a mark string.
pub const MARK_SEPARATOR: char = ';';

/// Parse a mark string into its tags.
///
/// Segments are trimmed and empty segments dropped; order is kept.
///
/// ```
/// use accountform_core::{Mark, parse_marks};
///
/// assert_eq!(
///     parse_marks("a; b ;;c"),
///     vec![Mark::new("a"), Mark::new("b"), Mark::new("c")]
/// );
/// ```
#[must_use]
pub fn parse_marks(mark_string: &str) -> Vec<Mark> {
    mark_string
        .split(MARK_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(Mark::new)
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn texts(marks: &[Mark]) -> Vec<&str> {
        marks.iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn empty_string_has_no_marks() {
        assert!(parse_marks("").is_empty());
        assert!(parse_marks(" ; ;; ").is_empty());
    }

    #[test]
    fn single_mark() {
        assert_eq!(texts(&parse_marks("  admin ")), vec!["admin"]);
    }

    #[test]
    fn inner_whitespace_kept() {
        assert_eq!(
            texts(&parse_marks("team a; team b")),
            vec!["team a", "team b"]
        );
    }

    #[test]
    fn duplicates_kept() {
        assert_eq!(texts(&parse_marks("x;x")), vec!["x", "x"]);
    }

    proptest! {
        #[test]
        fn marks_are_trimmed_and_non_empty(input in ".{0,80}") {
            for mark in parse_marks(&input) {
                prop_assert!(!mark.text.is_empty());
                prop_assert_eq!(mark.text.trim(), mark.text.as_str());
                prop_assert!(!mark.text.contains(MARK_SEPARATOR));
            }
        }

        #[test]
        fn joined_marks_parse_back(
            tags in proptest::collection::vec("[a-z0-9]{1,8}", 0..6)
        ) {
            let joined = tags.join(" ; ");
            let parsed = parse_marks(&joined);
            prop_assert_eq!(texts(&parsed), tags.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
