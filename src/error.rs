// lrpeg. The Left-Recursive Parser
// Copyright (c) 2018 Dragoș Tiselice
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::fmt;

/// Everything a match call can fail with.
///
/// Grammar errors are fatal and reported before any input is consumed; a
/// [`MatchFailure`] is the ordinary "this input does not parse" outcome.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// A rule name was applied or requested but never registered.
    #[error("unknown rule `{0}`")]
    UnknownRule(String),
    /// An equal-width string set mixes strings of different widths.
    #[error("rule `{rule}` has an alternative {found} character(s) wide, expected {expected}")]
    UnevenAlternatives {
        /// The rule whose body holds the malformed set.
        rule: String,
        /// Width of the first string in the set.
        expected: usize,
        /// Width of the offending string.
        found: usize,
    },
    /// The start rule did not consume the entire input.
    #[error("{0}")]
    Unmatched(MatchFailure),
}

/// The furthest-position diagnostic collected during a failed match.
///
/// Renders as a short report: the failure position, a window of up to 40
/// characters starting 10 characters before it, a caret under the exact
/// spot, and the expressions that were expected there.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchFailure {
    pos: usize,
    window: String,
    caret: usize,
    expected: Vec<String>,
}

const WINDOW_BEFORE: usize = 10;
const WINDOW_LEN: usize = 40;

impl MatchFailure {
    pub(crate) fn new(input: &str, pos: usize, expected: Vec<String>) -> MatchFailure {
        let start = input[..pos]
            .char_indices()
            .rev()
            .take(WINDOW_BEFORE)
            .last()
            .map_or(pos, |(i, _)| i);
        let end = input[start..]
            .char_indices()
            .nth(WINDOW_LEN)
            .map_or(input.len(), |(i, _)| start + i);

        // Controls are blanked out so the caret line stays aligned.
        let window = input[start..end]
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let caret = input[start..pos].chars().count();

        MatchFailure {
            pos,
            window,
            caret,
            expected,
        }
    }

    /// The byte position the match could not get past.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Rendered expressions that were expected at [`pos`](MatchFailure::pos).
    pub fn expected(&self) -> &[String] {
        &self.expected
    }
}

impl fmt::Display for MatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " --> position {}", self.pos)?;
        writeln!(f, "  |")?;
        writeln!(f, "  | {}", self.window)?;
        writeln!(f, "  | {}^---", " ".repeat(self.caret))?;
        writeln!(f, "  |")?;
        if self.expected.is_empty() {
            write!(f, "  = unknown match failure")
        } else {
            write!(f, "  = expected {}", enumerate(&self.expected))
        }
    }
}

fn enumerate(expected: &[String]) -> String {
    match expected.len() {
        1 => expected[0].clone(),
        2 => format!("{} or {}", expected[0], expected[1]),
        l => {
            let separated = expected[..l - 1].join(", ");
            format!("{}, or {}", separated, expected[l - 1])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_match_failure() {
        let failure = MatchFailure::new("ab\ncd\nef", 4, vec![String::from("\"x\"")]);

        assert_eq!(
            failure.to_string(),
            vec![
                " --> position 4",
                "  |",
                "  | ab cd ef",
                "  |     ^---",
                "  |",
                "  = expected \"x\"",
            ]
            .join("\n")
        );
    }

    #[test]
    fn display_enumerates_expected_expressions() {
        let failure = MatchFailure::new("z", 0, vec!["\"a\"".into(), "\"b\"".into(), "num".into()]);

        assert!(failure.to_string().ends_with("= expected \"a\", \"b\", or num"));
    }

    #[test]
    fn display_without_expectations() {
        let failure = MatchFailure::new("z", 0, vec![]);

        assert!(failure.to_string().ends_with("= unknown match failure"));
    }

    #[test]
    fn window_is_clipped_around_the_failure() {
        let input = "a".repeat(100);
        let failure = MatchFailure::new(&input, 50, vec![String::from("\"b\"")]);

        assert_eq!(failure.pos(), 50);
        // 10 characters of context, then up to 30 more past the failure.
        assert!(failure.to_string().contains(&"a".repeat(40)));
        assert!(!failure.to_string().contains(&"a".repeat(41)));
    }
}
