// lrpeg. The Left-Recursive Parser
// Copyright (c) 2018 Dragoș Tiselice
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! # lrpeg. The Left-Recursive Parser
//!
//! lrpeg is a PEG matching engine that, unlike a classical packrat parser,
//! handles directly left-recursive rules. A grammar is a set of named rules
//! built from the expression constructors in this crate; matching an input
//! against a start rule produces a labeled [`ParseTree`] spanning the whole
//! input, or a positioned diagnostic.
//!
//! Left recursion is resolved by *seed growing*: when a rule reaches itself
//! at the same position, the engine repeatedly reparses the rule, each round
//! substituting the previous (shorter) result for the recursive call, until
//! the match stops getting longer. The result is the left-associated tree a
//! grammar like `expr <- expr "-" num / num` reads as:
//!
//! ```
//! use lrpeg::{alt, apply, choice, plus, seq, term, Matcher, Mode};
//!
//! let mut matcher = Matcher::new(Mode::Standard);
//! matcher.add_rule("expr", choice(vec![
//!     seq(vec![apply("expr"), term("-"), apply("num")]),
//!     apply("num"),
//! ]));
//! matcher.add_rule("num", plus(alt(('0'..='9').map(String::from))));
//!
//! let tree = matcher.parse("expr", "1-2-3").unwrap();
//!
//! // ((1 - 2) - 3), not (1 - (2 - 3)).
//! assert_eq!(
//!     tree.rule_tokens(),
//!     vec![
//!         ("expr", 0, 5),
//!         ("expr", 0, 3),
//!         ("expr", 0, 1),
//!         ("num", 0, 1),
//!         ("num", 2, 3),
//!         ("num", 4, 5),
//!     ],
//! );
//! ```
//!
//! Rules whose names start with an uppercase letter are *syntactic*: the
//! elements of their sequences and repetitions may be separated by
//! whitespace, or by whatever a grammar-supplied `skip` rule matches. In
//! [`Mode::Python`], the [`INDENT`] and [`DEDENT`] pseudo-tokens turn
//! leading whitespace into structure, the way an off-side-rule language
//! expects.

#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

mod error;
mod expr;
mod indent;
mod matcher;
mod span;
mod stack;
mod tree;

pub use crate::error::{Error, MatchFailure};
pub use crate::expr::{
    alt, apply, choice, dot, neg, opt, plus, pos, seq, star, term, Expr, ExprIter, ExprKind,
};
pub use crate::indent::{DEDENT, INDENT};
pub use crate::matcher::{Matcher, Mode};
pub use crate::span::Span;
pub use crate::tree::ParseTree;
