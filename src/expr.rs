// lrpeg. The Left-Recursive Parser
// Copyright (c) 2018 Dragoș Tiselice
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::collections::HashSet;
use std::fmt;

use crate::indent::{DEDENT, INDENT};

/// A parsing expression together with an optional label.
///
/// Expressions are immutable once built. Rule references are held by name, so
/// recursive grammars contain no reference cycles; the name is resolved
/// against the rule registry at match time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Expr {
    kind: ExprKind,
    label: Option<String>,
}

/// The closed family of parsing operators.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExprKind {
    /// Applies the rule with the given name, e.g. `expr`.
    Ident(String),
    /// Matches an exact string, e.g. `"let"`.
    Str(String),
    /// Matches one member of a set of equally wide strings, e.g. `["+", "-"]`.
    ///
    /// The width is a character count, fixed when the set is built, so a
    /// single slice lookup decides the whole attempt.
    OneOf {
        /// The candidate strings.
        strings: HashSet<String>,
        /// Shared width of every candidate, in characters.
        width: usize,
    },
    /// Matches a list of expressions one after the other.
    Seq(Vec<Expr>),
    /// Tries each alternative in order and commits to the first match.
    Choice(Vec<Expr>),
    /// Optionally matches an expression, e.g. `e?`.
    Opt(Box<Expr>),
    /// Matches an expression zero or more times, e.g. `e*`.
    Rep(Box<Expr>),
    /// Matches an expression one or more times, e.g. `e+`.
    RepOnce(Box<Expr>),
    /// Positive lookahead; matches without making progress, e.g. `&e`.
    PosPred(Box<Expr>),
    /// Negative lookahead; matches if the expression doesn't, e.g. `!e`.
    NegPred(Box<Expr>),
    /// Matches any single character.
    Any,
}

impl Expr {
    fn new(kind: ExprKind) -> Expr {
        Expr { kind, label: None }
    }

    /// The operator this expression evaluates.
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// The label carried over to parse-tree nodes this expression produces.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Attaches a label, replacing any previous one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lrpeg::term;
    /// let open = term("(").with_label("open");
    ///
    /// assert_eq!(open.label(), Some("open"));
    /// ```
    pub fn with_label(mut self, label: &str) -> Expr {
        self.label = Some(label.to_string());
        self
    }

    /// Returns `true` for the two lookahead operators.
    pub fn is_lookahead(&self) -> bool {
        matches!(self.kind, ExprKind::PosPred(_) | ExprKind::NegPred(_))
    }

    /// Iterates over this expression and every sub-expression, top-down.
    pub fn iter(&self) -> ExprIter<'_> {
        ExprIter { next: vec![self] }
    }
}

/// Applies the rule registered under `name`.
pub fn apply(name: &str) -> Expr {
    Expr::new(ExprKind::Ident(name.to_string()))
}

/// Matches the literal `string`.
///
/// In Python mode the [`INDENT`](crate::INDENT) and [`DEDENT`](crate::DEDENT)
/// sentinels passed to `term` are matched by the indentation engine instead
/// of by literal comparison.
pub fn term(string: &str) -> Expr {
    Expr::new(ExprKind::Str(string.to_string()))
}

/// Matches one of a set of strings which all share one character width.
///
/// # Examples
///
/// ```
/// # use lrpeg::alt;
/// let digit = alt(('0'..='9').map(String::from));
/// ```
pub fn alt<I>(strings: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let strings: HashSet<String> = strings.into_iter().map(Into::into).collect();
    let width = strings.iter().next().map_or(0, |s| s.chars().count());

    Expr::new(ExprKind::OneOf { strings, width })
}

/// Matches every expression in `exprs`, in order.
pub fn seq(exprs: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Seq(exprs))
}

/// Tries `exprs` in order; the first success wins.
pub fn choice(exprs: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Choice(exprs))
}

/// Matches `expr` or nothing.
pub fn opt(expr: Expr) -> Expr {
    Expr::new(ExprKind::Opt(Box::new(expr)))
}

/// Matches `expr` zero or more times.
pub fn star(expr: Expr) -> Expr {
    Expr::new(ExprKind::Rep(Box::new(expr)))
}

/// Matches `expr` one or more times.
pub fn plus(expr: Expr) -> Expr {
    Expr::new(ExprKind::RepOnce(Box::new(expr)))
}

/// Succeeds iff `expr` fails; consumes nothing either way.
pub fn neg(expr: Expr) -> Expr {
    Expr::new(ExprKind::NegPred(Box::new(expr)))
}

/// Succeeds iff `expr` matches; consumes nothing either way.
pub fn pos(expr: Expr) -> Expr {
    Expr::new(ExprKind::PosPred(Box::new(expr)))
}

/// Matches any single character.
pub fn dot() -> Expr {
    Expr::new(ExprKind::Any)
}

/// Top-down iterator over an expression and its sub-expressions.
pub struct ExprIter<'a> {
    next: Vec<&'a Expr>,
}

impl<'a> Iterator for ExprIter<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.next.pop()?;

        match &expr.kind {
            ExprKind::Seq(exprs) | ExprKind::Choice(exprs) => {
                self.next.extend(exprs.iter().rev());
            }
            ExprKind::Opt(inner)
            | ExprKind::Rep(inner)
            | ExprKind::RepOnce(inner)
            | ExprKind::PosPred(inner)
            | ExprKind::NegPred(inner) => {
                self.next.push(inner);
            }
            ExprKind::Ident(_) | ExprKind::Str(_) | ExprKind::OneOf { .. } | ExprKind::Any => {}
        }

        Some(expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Ident(name) => write!(f, "{}", name),
            ExprKind::Str(string) if string == INDENT => write!(f, "INDENT"),
            ExprKind::Str(string) if string == DEDENT => write!(f, "DEDENT"),
            ExprKind::Str(string) => write!(f, "{:?}", string),
            ExprKind::OneOf { strings, width } => {
                let mut sorted: Vec<&String> = strings.iter().collect();
                sorted.sort();

                if *width == 1 {
                    write!(f, "[")?;
                    for string in sorted {
                        for c in string.chars() {
                            write!(f, "{}", c.escape_debug())?;
                        }
                    }
                    write!(f, "]")
                } else {
                    write!(f, "(")?;
                    for (i, string) in sorted.iter().enumerate() {
                        if i > 0 {
                            write!(f, " | ")?;
                        }
                        write!(f, "{:?}", string)?;
                    }
                    write!(f, ")")
                }
            }
            ExprKind::Seq(exprs) => {
                write!(f, "(")?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", expr)?;
                }
                write!(f, ")")
            }
            ExprKind::Choice(exprs) => {
                write!(f, "(")?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " / ")?;
                    }
                    write!(f, "{}", expr)?;
                }
                write!(f, ")")
            }
            ExprKind::Opt(inner) => write!(f, "{}?", inner),
            ExprKind::Rep(inner) => write!(f, "{}*", inner),
            ExprKind::RepOnce(inner) => write!(f, "{}+", inner),
            ExprKind::PosPred(inner) => write!(f, "&{}", inner),
            ExprKind::NegPred(inner) => write!(f, "!{}", inner),
            ExprKind::Any => write!(f, "ANY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let expr = choice(vec![
            seq(vec![apply("expr"), term("-"), apply("num")]),
            apply("num"),
        ]);

        assert_eq!(expr.to_string(), "((expr \"-\" num) / num)");
    }

    #[test]
    fn display_char_class() {
        let expr = alt(["b", "a", "c"]);

        assert_eq!(expr.to_string(), "[abc]");
    }

    #[test]
    fn display_wide_alternatives() {
        let expr = alt(["ab", "cd"]);

        assert_eq!(expr.to_string(), "(\"ab\" | \"cd\")");
    }

    #[test]
    fn display_pseudo_tokens() {
        assert_eq!(term(INDENT).to_string(), "INDENT");
        assert_eq!(term(DEDENT).to_string(), "DEDENT");
    }

    #[test]
    fn labels_attach_to_any_expression() {
        let expr = star(dot()).with_label("rest");

        assert_eq!(expr.label(), Some("rest"));
        assert_eq!(expr.to_string(), "ANY*");
    }

    #[test]
    fn top_down_iterator() {
        let expr = choice(vec![term("a"), seq(vec![term("b"), dot()])]);
        let rendered: Vec<String> = expr.iter().map(|e| e.to_string()).collect();

        assert_eq!(
            rendered,
            vec!["(\"a\" / (\"b\" ANY))", "\"a\"", "(\"b\" ANY)", "\"b\"", "ANY"],
        );
    }

    #[test]
    fn one_of_width_is_in_characters() {
        match alt(["💖💖"]).kind() {
            ExprKind::OneOf { width, .. } => assert_eq!(*width, 2),
            kind => panic!("expected OneOf, got {:?}", kind),
        }
    }
}
