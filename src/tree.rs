// lrpeg. The Left-Recursive Parser
// Copyright (c) 2018 Dragoș Tiselice
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use crate::span::Span;

/// A node of a labeled parse tree, one variant per operator family.
///
/// Every node records the span it consumed; children sit inside their
/// parent's span and appear in input order. Lookahead nodes are always
/// zero-width and never show up among sequence or repetition children.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseTree<'i> {
    /// A named rule application wrapping the tree its body produced.
    Rule {
        /// The applied rule's name.
        name: String,
        /// Consumed input, including layout skipped ahead of a syntactic rule.
        span: Span<'i>,
        /// Label of the `apply` expression, if any.
        label: Option<String>,
        /// The tree produced by the rule's body.
        child: Box<ParseTree<'i>>,
    },
    /// A literal match, also produced by `dot` and the indentation tokens.
    Terminal {
        /// Consumed input.
        span: Span<'i>,
        /// Label of the originating expression, if any.
        label: Option<String>,
    },
    /// A match of one member of an equal-width string set.
    OneOf {
        /// Consumed input; always exactly the set's width.
        span: Span<'i>,
        /// Label of the originating expression, if any.
        label: Option<String>,
    },
    /// An ordered sequence; lookahead elements leave no child behind.
    Seq {
        /// Consumed input.
        span: Span<'i>,
        /// Label of the originating expression, if any.
        label: Option<String>,
        /// One tree per consuming element, in order.
        children: Vec<ParseTree<'i>>,
    },
    /// The first alternative that matched.
    Choice {
        /// Consumed input.
        span: Span<'i>,
        /// Label of the originating expression, if any.
        label: Option<String>,
        /// The winning alternative's tree.
        child: Box<ParseTree<'i>>,
    },
    /// An optional match; `child` is `None` when nothing was consumed.
    Opt {
        /// Consumed input.
        span: Span<'i>,
        /// Label of the originating expression, if any.
        label: Option<String>,
        /// The matched tree, when the inner expression succeeded.
        child: Option<Box<ParseTree<'i>>>,
    },
    /// Zero or more repetitions of one expression.
    Rep {
        /// Consumed input.
        span: Span<'i>,
        /// Label of the originating expression, if any.
        label: Option<String>,
        /// One tree per consuming iteration, in order.
        children: Vec<ParseTree<'i>>,
    },
    /// A positive lookahead that held; zero-width.
    PosPred {
        /// The zero-width span at the probe position.
        span: Span<'i>,
        /// Label of the originating expression, if any.
        label: Option<String>,
    },
    /// A negative lookahead that held; zero-width.
    NegPred {
        /// The zero-width span at the probe position.
        span: Span<'i>,
        /// Label of the originating expression, if any.
        label: Option<String>,
    },
}

impl<'i> ParseTree<'i> {
    /// The input range this node consumed.
    pub fn span(&self) -> &Span<'i> {
        match self {
            ParseTree::Rule { span, .. }
            | ParseTree::Terminal { span, .. }
            | ParseTree::OneOf { span, .. }
            | ParseTree::Seq { span, .. }
            | ParseTree::Choice { span, .. }
            | ParseTree::Opt { span, .. }
            | ParseTree::Rep { span, .. }
            | ParseTree::PosPred { span, .. }
            | ParseTree::NegPred { span, .. } => span,
        }
    }

    /// The matched slice of the input.
    pub fn as_str(&self) -> &'i str {
        self.span().as_str()
    }

    /// The node's start byte position.
    pub fn start(&self) -> usize {
        self.span().start()
    }

    /// The node's end byte position (exclusive).
    pub fn end(&self) -> usize {
        self.span().end()
    }

    /// The label inherited from the expression that produced this node.
    pub fn label(&self) -> Option<&str> {
        match self {
            ParseTree::Rule { label, .. }
            | ParseTree::Terminal { label, .. }
            | ParseTree::OneOf { label, .. }
            | ParseTree::Seq { label, .. }
            | ParseTree::Choice { label, .. }
            | ParseTree::Opt { label, .. }
            | ParseTree::Rep { label, .. }
            | ParseTree::PosPred { label, .. }
            | ParseTree::NegPred { label, .. } => label.as_deref(),
        }
    }

    /// The rule name, for rule nodes.
    pub fn rule(&self) -> Option<&str> {
        match self {
            ParseTree::Rule { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns `true` for lookahead result nodes.
    pub fn is_lookahead(&self) -> bool {
        matches!(self, ParseTree::PosPred { .. } | ParseTree::NegPred { .. })
    }

    /// This node's direct children, in input order.
    pub fn children(&self) -> Vec<&ParseTree<'i>> {
        match self {
            ParseTree::Rule { child, .. } | ParseTree::Choice { child, .. } => {
                vec![child.as_ref()]
            }
            ParseTree::Opt { child, .. } => child.as_deref().into_iter().collect(),
            ParseTree::Seq { children, .. } | ParseTree::Rep { children, .. } => {
                children.iter().collect()
            }
            ParseTree::Terminal { .. }
            | ParseTree::OneOf { .. }
            | ParseTree::PosPred { .. }
            | ParseTree::NegPred { .. } => vec![],
        }
    }

    /// Flattens the tree into `(rule, start, end)` triples, preorder.
    ///
    /// Only rule nodes are listed, which makes the triples a compact
    /// fingerprint of a parse; handy in tests and debug output.
    pub fn rule_tokens(&self) -> Vec<(&str, usize, usize)> {
        let mut tokens = Vec::new();
        self.collect_rule_tokens(&mut tokens);
        tokens
    }

    fn collect_rule_tokens<'a>(&'a self, tokens: &mut Vec<(&'a str, usize, usize)>) {
        if let ParseTree::Rule { name, span, .. } = self {
            tokens.push((name.as_str(), span.start(), span.end()));
        }
        for child in self.children() {
            child.collect_rule_tokens(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal(input: &str, start: usize, end: usize) -> ParseTree<'_> {
        ParseTree::Terminal {
            span: Span::new(input, start, end).unwrap(),
            label: None,
        }
    }

    #[test]
    fn children_cover_every_shape() {
        let input = "ab";
        let seq = ParseTree::Seq {
            span: Span::new(input, 0, 2).unwrap(),
            label: None,
            children: vec![terminal(input, 0, 1), terminal(input, 1, 2)],
        };

        assert_eq!(seq.children().len(), 2);
        assert_eq!(terminal(input, 0, 1).children().len(), 0);

        let opt = ParseTree::Opt {
            span: Span::new(input, 0, 0).unwrap(),
            label: None,
            child: None,
        };

        assert!(opt.children().is_empty());
    }

    #[test]
    fn rule_tokens_are_preorder() {
        let input = "ab";
        let inner = ParseTree::Rule {
            name: String::from("b"),
            span: Span::new(input, 1, 2).unwrap(),
            label: None,
            child: Box::new(terminal(input, 1, 2)),
        };
        let outer = ParseTree::Rule {
            name: String::from("a"),
            span: Span::new(input, 0, 2).unwrap(),
            label: None,
            child: Box::new(ParseTree::Seq {
                span: Span::new(input, 0, 2).unwrap(),
                label: None,
                children: vec![terminal(input, 0, 1), inner],
            }),
        };

        assert_eq!(outer.rule_tokens(), vec![("a", 0, 2), ("b", 1, 2)]);
    }
}
