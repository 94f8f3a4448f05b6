// lrpeg. The Left-Recursive Parser
// Copyright (c) 2018 Dragoș Tiselice
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use pretty_assertions::assert_eq;

use lrpeg::{alt, apply, choice, plus, seq, term, Matcher, Mode, DEDENT, INDENT};

fn lowercase_word() -> lrpeg::Expr {
    plus(alt(('a'..='z').map(String::from)))
}

/// `Block <- (INDENT line DEDENT)+` with a one-word line.
fn block_grammar(mode: Mode) -> Matcher {
    let mut matcher = Matcher::new(mode);
    matcher.add_rule(
        "Block",
        plus(seq(vec![term(INDENT), apply("line"), term(DEDENT)])),
    );
    matcher.add_rule("line", lowercase_word());
    matcher
}

#[test]
fn one_indented_line() {
    let mut matcher = block_grammar(Mode::Python);

    let tree = matcher.parse("Block", "\n  foo\n").unwrap();
    assert_eq!(tree.rule_tokens(), vec![("Block", 0, 7), ("line", 3, 6)]);
    assert_eq!(tree.as_str(), "\n  foo\n");
}

#[test]
fn an_unindented_line_is_rejected() {
    let mut matcher = block_grammar(Mode::Python);

    assert!(matcher.parse("Block", "\nfoo\n").is_err());
    assert!(matcher.print_match_failure().contains("INDENT"));
}

#[test]
fn pseudo_tokens_never_match_in_standard_mode() {
    let mut matcher = block_grammar(Mode::Standard);

    assert!(matcher.parse("Block", "\n  foo\n").is_err());
}

#[test]
fn blank_lines_before_the_indent_are_layout() {
    let mut matcher = block_grammar(Mode::Python);

    let tree = matcher.parse("Block", "\n\n  foo\n").unwrap();
    assert_eq!(tree.rule_tokens(), vec![("Block", 0, 8), ("line", 4, 7)]);
}

#[test]
fn a_line_at_the_same_depth_cannot_dedent() {
    let mut matcher = block_grammar(Mode::Python);

    // The second line still sits at the block's depth, so DEDENT fails and
    // the input is never fully consumed.
    assert!(matcher.parse("Block", "\n  a\n  b\n").is_err());
}

#[test]
fn blocks_nest_and_unwind_level_by_level() {
    let mut matcher = Matcher::new(Mode::Python);
    matcher.add_rule("Suite", plus(apply("Stmt")));
    matcher.add_rule(
        "Stmt",
        choice(vec![apply("Block"), apply("word")]),
    );
    matcher.add_rule(
        "Block",
        seq(vec![term(INDENT), plus(apply("Stmt")), term(DEDENT)]),
    );
    matcher.add_rule("word", lowercase_word());

    let tree = matcher.parse("Suite", "\n  a\n    b\n  c\n").unwrap();

    assert_eq!(
        tree.rule_tokens(),
        vec![
            ("Suite", 0, 15),
            ("Stmt", 1, 15),
            ("Block", 1, 15),
            ("Stmt", 3, 4),
            ("word", 3, 4),
            ("Stmt", 5, 13),
            ("Block", 5, 13),
            ("Stmt", 9, 10),
            ("word", 9, 10),
            ("Stmt", 13, 14),
            ("word", 13, 14),
        ],
    );
}

#[test]
fn mid_line_blanks_are_still_skipped_in_python_mode() {
    let mut matcher = Matcher::new(Mode::Python);
    matcher.add_rule("Assign", seq(vec![term("k"), term("="), term("v")]));

    let tree = matcher.parse("Assign", "k = v").unwrap();
    assert_eq!(tree.as_str(), "k = v");
}

#[test]
fn the_indent_stack_resets_between_parses() {
    let mut matcher = block_grammar(Mode::Python);

    assert!(matcher.parse("Block", "\n  foo\n").is_ok());
    assert!(matcher.parse("Block", "\n  foo\n").is_ok());
}
