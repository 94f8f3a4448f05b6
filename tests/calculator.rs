// lrpeg. The Left-Recursive Parser
// Copyright (c) 2018 Dragoș Tiselice
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use pretty_assertions::assert_eq;

use lrpeg::{alt, apply, choice, plus, seq, term, Error, Matcher, Mode};

fn digits() -> lrpeg::Expr {
    plus(alt(('0'..='9').map(String::from)))
}

/// `expr <- expr ("+" / "-") num / num`, directly left-recursive.
fn calculator() -> Matcher {
    let mut matcher = Matcher::new(Mode::Standard);
    matcher.add_rule(
        "expr",
        choice(vec![
            seq(vec![apply("expr"), alt(["+", "-"]), apply("num")]),
            apply("num"),
        ]),
    );
    matcher.add_rule("num", digits());
    matcher
}

#[test]
fn single_number() {
    let tree = calculator().parse("expr", "7").unwrap();

    assert_eq!(tree.rule_tokens(), vec![("expr", 0, 1), ("num", 0, 1)]);
}

#[test]
fn subtraction_is_left_associated() {
    let tree = calculator().parse("expr", "1-2-3").unwrap();

    // ((1 - 2) - 3): every recursive `expr` hugs the left edge.
    assert_eq!(
        tree.rule_tokens(),
        vec![
            ("expr", 0, 5),
            ("expr", 0, 3),
            ("expr", 0, 1),
            ("num", 0, 1),
            ("num", 2, 3),
            ("num", 4, 5),
        ],
    );
}

#[test]
fn the_seed_grows_across_multi_digit_numbers() {
    let tree = calculator().parse("expr", "10-2+30-4").unwrap();

    assert_eq!(
        tree.rule_tokens(),
        vec![
            ("expr", 0, 9),
            ("expr", 0, 7),
            ("expr", 0, 4),
            ("expr", 0, 2),
            ("num", 0, 2),
            ("num", 3, 4),
            ("num", 5, 7),
            ("num", 8, 9),
        ],
    );
}

#[test]
fn a_dangling_operator_is_left_unconsumed() {
    match calculator().parse("expr", "1-") {
        Err(Error::Unmatched(failure)) => assert_eq!(failure.pos(), 2),
        result => panic!("expected a match failure, got {:?}", result),
    }
}

#[test]
fn two_left_recursive_rules_nest() {
    let mut matcher = Matcher::new(Mode::Standard);
    matcher.add_rule(
        "sum",
        choice(vec![
            seq(vec![apply("sum"), term("-"), apply("product")]),
            apply("product"),
        ]),
    );
    matcher.add_rule(
        "product",
        choice(vec![
            seq(vec![apply("product"), term("*"), apply("num")]),
            apply("num"),
        ]),
    );
    matcher.add_rule("num", digits());

    let tree = matcher.parse("sum", "1-2*3-4").unwrap();

    // ((1 - (2 * 3)) - 4)
    assert_eq!(
        tree.rule_tokens(),
        vec![
            ("sum", 0, 7),
            ("sum", 0, 5),
            ("sum", 0, 1),
            ("product", 0, 1),
            ("num", 0, 1),
            ("product", 2, 5),
            ("product", 2, 3),
            ("num", 2, 3),
            ("num", 4, 5),
            ("product", 6, 7),
            ("num", 6, 7),
        ],
    );
}

#[test]
fn left_recursion_skips_whitespace_in_syntactic_rules() {
    let mut matcher = Matcher::new(Mode::Standard);
    matcher.add_rule(
        "Sum",
        choice(vec![
            seq(vec![apply("Sum"), term("-"), apply("num")]),
            apply("num"),
        ]),
    );
    matcher.add_rule("num", digits());

    let tree = matcher.parse("Sum", "1 - 2 - 3").unwrap();

    assert_eq!(
        tree.rule_tokens(),
        vec![
            ("Sum", 0, 9),
            ("Sum", 0, 5),
            ("Sum", 0, 1),
            ("num", 0, 1),
            ("num", 4, 5),
            ("num", 8, 9),
        ],
    );
}

#[test]
fn reparsing_after_left_recursion_starts_clean() {
    let mut matcher = calculator();

    assert!(matcher.parse("expr", "1-").is_err());

    let tree = matcher.parse("expr", "1-2").unwrap();
    assert_eq!(
        tree.rule_tokens(),
        vec![("expr", 0, 3), ("expr", 0, 1), ("num", 0, 1), ("num", 2, 3)],
    );
}
