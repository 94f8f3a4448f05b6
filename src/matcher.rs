// lrpeg. The Left-Recursive Parser
// Copyright (c) 2018 Dragoș Tiselice
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use once_cell::sync::Lazy;

use crate::error::{Error, MatchFailure};
use crate::expr::{alt, Expr, ExprKind};
use crate::indent::{self, IndentStack, DEDENT, INDENT};
use crate::span::Span;
use crate::stack::CallStack;
use crate::tree::ParseTree;

/// Name of the rule driving implicit whitespace skipping.
///
/// Grammars may register their own; otherwise [`DEFAULT_SKIP`] applies.
const SKIP_RULE: &str = "skip";

/// One character the implicit skip may discard when no `skip` rule is
/// registered: the ASCII controls and the space, `U+0000..=U+0020`.
static DEFAULT_SKIP: Lazy<Expr> =
    Lazy::new(|| alt((0u8..=0x20).map(|b| char::from(b).to_string())));

/// Selects how terminals are interpreted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Plain PEG matching.
    Standard,
    /// Like `Standard`, but `term(INDENT)` and `term(DEDENT)` are matched by
    /// the indentation engine, and the implicit skip leaves line-leading
    /// blanks alone for it.
    Python,
}

/// A rule registry plus the machinery to match input against it.
///
/// Rules whose names start with an uppercase letter are *syntactic* and skip
/// whitespace between the elements of their sequences and repetitions; all
/// other rules are *lexical* and match exactly. Rule bodies may refer to
/// themselves in leftmost position; such direct left recursion is resolved
/// by growing a seed match until it stops getting longer.
///
/// # Examples
///
/// ```
/// use lrpeg::{apply, choice, plus, seq, term, alt, Matcher, Mode};
///
/// let mut matcher = Matcher::new(Mode::Standard);
/// matcher.add_rule("expr", choice(vec![
///     seq(vec![apply("expr"), term("-"), apply("num")]),
///     apply("num"),
/// ]));
/// matcher.add_rule("num", plus(alt(('0'..='9').map(String::from))));
///
/// let tree = matcher.parse("expr", "7-2-1").unwrap();
/// assert_eq!(tree.as_str(), "7-2-1");
/// ```
#[derive(Debug)]
pub struct Matcher {
    rules: HashMap<String, Expr>,
    mode: Mode,
    last_failure: Option<MatchFailure>,
}

impl Matcher {
    /// Creates a matcher with an empty rule registry.
    pub fn new(mode: Mode) -> Matcher {
        Matcher {
            rules: HashMap::new(),
            mode,
            last_failure: None,
        }
    }

    /// The mode the matcher was created with.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Registers `expr` as the body of `name`, replacing any previous body.
    pub fn add_rule(&mut self, name: &str, expr: Expr) {
        self.rules.insert(name.to_string(), expr);
    }

    /// Matches `input` against the rule registered as `start_rule`.
    ///
    /// Succeeds only when the entire input is consumed. Grammar errors (an
    /// unknown rule name anywhere in the registry, an equal-width string set
    /// that is not equal-width) are reported before matching begins.
    ///
    /// Every call starts from a blank slate; a matcher can be reused for any
    /// number of inputs, one at a time.
    ///
    /// # Examples
    ///
    /// ```
    /// use lrpeg::{term, Matcher, Mode};
    ///
    /// let mut matcher = Matcher::new(Mode::Standard);
    /// matcher.add_rule("start", term("abc"));
    ///
    /// assert!(matcher.parse("start", "abc").is_ok());
    /// assert!(matcher.parse("start", "ab").is_err());
    /// ```
    pub fn parse<'i>(&mut self, start_rule: &str, input: &'i str) -> Result<ParseTree<'i>, Error> {
        self.validate(start_rule)?;
        self.last_failure = None;

        debug!(
            "matching `{}` against {} byte(s) of input",
            start_rule,
            input.len()
        );

        let mut st = MatchState::new(input, self.mode);
        let result = self.eval_rule(start_rule, None, &mut st);

        debug_assert!(st.stack.is_empty(), "rule applications left on the call stack");
        debug_assert!(st.growing.is_empty(), "seeds left in the growing table");
        debug_assert!(st.unwind_to.is_none(), "unwind flag left raised");

        match result {
            Some(tree) if st.pos == input.len() => {
                debug!("matched `{}`", start_rule);
                Ok(tree)
            }
            result => {
                if result.is_some() {
                    // The start rule stopped short of the end.
                    st.track_end_of_input(st.pos);
                }

                let mut expected = st.attempts;
                expected.sort();
                expected.dedup();

                let failure = MatchFailure::new(input, st.attempt_pos, expected);
                debug!(
                    "match of `{}` failed at position {}",
                    start_rule,
                    failure.pos()
                );
                self.last_failure = Some(failure.clone());
                Err(Error::Unmatched(failure))
            }
        }
    }

    /// Renders the diagnostic of the most recent failed [`parse`](Matcher::parse).
    ///
    /// Returns an empty string when the last parse succeeded or none ran yet.
    pub fn print_match_failure(&self) -> String {
        self.last_failure
            .as_ref()
            .map(MatchFailure::to_string)
            .unwrap_or_default()
    }

    fn validate(&self, start_rule: &str) -> Result<(), Error> {
        if !self.rules.contains_key(start_rule) {
            return Err(Error::UnknownRule(start_rule.to_string()));
        }

        for (name, body) in &self.rules {
            for expr in body.iter() {
                match expr.kind() {
                    ExprKind::Ident(target) => {
                        if !self.rules.contains_key(target) {
                            return Err(Error::UnknownRule(target.clone()));
                        }
                    }
                    ExprKind::OneOf { strings, width } => {
                        for string in strings {
                            let found = string.chars().count();
                            if found != *width {
                                return Err(Error::UnevenAlternatives {
                                    rule: name.clone(),
                                    expected: *width,
                                    found,
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Applies the rule registered as `name` at the current position.
    ///
    /// This is where left recursion is detected and resolved. The call stack
    /// is scanned for an earlier application of the same rule at the same
    /// position; if one exists this application is left-recursive and enters
    /// seed growth instead of recursing forever.
    fn eval_rule<'i>(
        &self,
        name: &str,
        label: Option<&str>,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        if st.unwind_to.is_some() {
            return None;
        }

        let outer_start = st.pos;
        if is_syntactic(name) {
            self.skip_layout(st);
        }
        let pos = st.pos;

        let body = match self.rules.get(name) {
            Some(body) => body,
            // The registry was validated before matching started.
            None => panic!("undefined rule `{}`", name),
        };

        let prev = st.stack.find(name, pos);
        let growing_anywhere = st.stack.find_left_recursive(name).is_some();
        st.stack.push(name, pos, prev.is_some());
        let cur = st.stack.len() - 1;

        let result = if growing_anywhere && st.seed_planted(name, pos) {
            // Continue growth: stand in for the recursive call with the seed
            // grown so far, which may not exist yet.
            let seed = st.current_seed(name, pos);
            if let Some(tree) = &seed {
                st.pos = tree.end();
            }
            seed
        } else if let Some(prev) = prev {
            self.grow_seed(name, body, pos, cur, prev, st)
        } else {
            self.apply_memoized(name, body, pos, cur, st)
        };

        let frame = st.stack.pop();
        debug_assert!(
            frame.map_or(false, |f| f.rule == name && f.pos == pos) && st.stack.len() == cur,
            "call stack corrupted around `{}`",
            name
        );

        match result {
            Some(child) => {
                let span = Span::new_internal(st.input, outer_start, st.pos);
                Some(ParseTree::Rule {
                    name: name.to_string(),
                    span,
                    label: label.map(str::to_string),
                    child: Box::new(child),
                })
            }
            None => {
                st.pos = outer_start;
                None
            }
        }
    }

    /// Seed growth for a left-recursive application of `rule` at `pos`.
    ///
    /// `cur` is this frame, `prev` the earlier frame of the same rule at the
    /// same position. The grown seed is handed to `prev` through its seed
    /// slot, and the unwind flag forces every application in between to
    /// fail so `prev` can return the seed itself. This frame always reports
    /// failure.
    fn grow_seed<'i>(
        &self,
        rule: &str,
        body: &Expr,
        pos: usize,
        cur: usize,
        prev: usize,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        let nested = st.growing_count(rule) > 0;
        st.plant_seed(rule, pos);

        if nested {
            // A deeper seed inside an already-growing one gets exactly one
            // attempt, with its seed pinned empty so it cannot extend
            // itself while the outer seed is still in flux.
            st.pos = pos;
            let result = self.traditional(body, cur, st);
            st.remove_seed(rule, pos);

            if let Some(tree) = result {
                if !st.stack.frame(prev).left_recursive {
                    trace!(
                        "nested seed for `{}` at {} handed to frame {}",
                        rule,
                        pos,
                        prev
                    );
                    st.stack.set_seed(prev, Some(tree));
                    st.unwind_to = Some(prev);
                }
            }

            None
        } else {
            trace!("growing seed for `{}` at {}", rule, pos);

            loop {
                st.pos = pos;
                let new = self.traditional(body, cur, st);

                let grew = match (&new, st.seed_end(rule, pos)) {
                    (Some(tree), Some(end)) => tree.end() > end,
                    (Some(_), None) => true,
                    (None, _) => false,
                };

                if !grew {
                    let seed = st.remove_seed(rule, pos);
                    trace!(
                        "seed for `{}` at {} settled, ends at {:?}",
                        rule,
                        pos,
                        seed.as_ref().map(ParseTree::end)
                    );
                    st.stack.set_seed(prev, seed);
                    st.unwind_to = Some(prev);
                    return None;
                }

                st.store_seed(rule, pos, new);
            }
        }
    }

    /// An ordinary application with the memo table in front of it.
    ///
    /// Memoization is sound only while no seed is being grown anywhere (a
    /// memoized result could otherwise capture a stale seed) and never in
    /// Python mode, where a result also depends on the indent stack.
    fn apply_memoized<'i>(
        &self,
        rule: &str,
        body: &Expr,
        pos: usize,
        cur: usize,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        let memoizable = st.mode == Mode::Standard && st.growing.is_empty();

        if memoizable {
            if let Some((tree, end)) = st.memo.get(rule).and_then(|m| m.get(&pos)) {
                st.pos = *end;
                return tree.clone();
            }
        }

        let result = self.traditional(body, cur, st);

        // A result computed while a seed was growing, or while an unwind is
        // in flight, is not a settled fact about (rule, pos). Results from
        // silent contexts are not stored either, or a later hit would rob
        // the diagnostic log of its attempts.
        if memoizable && st.silent == 0 && st.growing.is_empty() && st.unwind_to.is_none() {
            st.memo
                .entry(rule.to_string())
                .or_default()
                .insert(pos, (result.clone(), st.pos));
        }

        result
    }

    /// Evaluates a rule body and resolves the unwind protocol afterwards.
    fn traditional<'i>(
        &self,
        body: &Expr,
        cur: usize,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        let result = self.eval(body, st);

        match st.unwind_to {
            None => result,
            Some(target) if target == cur => {
                // The unwind ends here: this frame returns the grown seed as
                // if its body had parsed it directly.
                st.unwind_to = None;
                let seed = st.stack.take_seed(cur);
                if let Some(tree) = &seed {
                    st.pos = tree.end();
                }
                trace!(
                    "frame {} caught its seed, ends at {:?}",
                    cur,
                    seed.as_ref().map(ParseTree::end)
                );
                seed
            }
            Some(_) => None,
        }
    }

    fn eval<'i>(&self, expr: &Expr, st: &mut MatchState<'i>) -> Option<ParseTree<'i>> {
        if st.unwind_to.is_some() {
            return None;
        }

        match expr.kind() {
            ExprKind::Ident(name) => self.eval_rule(name, expr.label(), st),
            ExprKind::Str(string) => self.eval_str(expr, string, st),
            ExprKind::OneOf { strings, width } => self.eval_one_of(expr, strings, *width, st),
            ExprKind::Seq(exprs) => self.eval_seq(expr, exprs, st),
            ExprKind::Choice(exprs) => self.eval_choice(expr, exprs, st),
            ExprKind::Opt(inner) => self.eval_opt(expr, inner, st),
            ExprKind::Rep(inner) => self.eval_rep(expr, inner, 0, st),
            ExprKind::RepOnce(inner) => self.eval_rep(expr, inner, 1, st),
            ExprKind::PosPred(inner) => self.eval_lookahead(expr, inner, true, st),
            ExprKind::NegPred(inner) => self.eval_lookahead(expr, inner, false, st),
            ExprKind::Any => self.eval_any(expr, st),
        }
    }

    fn eval_str<'i>(
        &self,
        expr: &Expr,
        string: &str,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        if string == INDENT || string == DEDENT {
            return self.eval_pseudo_token(expr, string, st);
        }

        let start = st.pos;
        if st.input[start..].starts_with(string) {
            st.pos += string.len();
            Some(ParseTree::Terminal {
                span: Span::new_internal(st.input, start, st.pos),
                label: owned_label(expr),
            })
        } else {
            st.track(start, expr);
            None
        }
    }

    fn eval_pseudo_token<'i>(
        &self,
        expr: &Expr,
        token: &str,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        if st.mode != Mode::Python {
            return None;
        }

        let start = st.pos;
        let end = if token == INDENT {
            st.indents.indent(st.input, start)
        } else {
            st.indents.dedent(st.input, start)
        };

        match end {
            Some(end) => {
                st.pos = end;
                Some(ParseTree::Terminal {
                    span: Span::new_internal(st.input, start, end),
                    label: owned_label(expr),
                })
            }
            None => {
                st.track(start, expr);
                None
            }
        }
    }

    fn eval_one_of<'i>(
        &self,
        expr: &Expr,
        strings: &HashSet<String>,
        width: usize,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        let start = st.pos;

        let mut end = start;
        for _ in 0..width {
            match st.input[end..].chars().next() {
                Some(c) => end += c.len_utf8(),
                None => {
                    st.track(start, expr);
                    return None;
                }
            }
        }

        if strings.contains(&st.input[start..end]) {
            st.pos = end;
            Some(ParseTree::OneOf {
                span: Span::new_internal(st.input, start, end),
                label: owned_label(expr),
            })
        } else {
            st.track(start, expr);
            None
        }
    }

    fn eval_any<'i>(&self, expr: &Expr, st: &mut MatchState<'i>) -> Option<ParseTree<'i>> {
        let start = st.pos;

        match st.input[start..].chars().next() {
            Some(c) => {
                st.pos = start + c.len_utf8();
                Some(ParseTree::Terminal {
                    span: Span::new_internal(st.input, start, st.pos),
                    label: owned_label(expr),
                })
            }
            None => {
                st.track(start, expr);
                None
            }
        }
    }

    fn eval_seq<'i>(
        &self,
        expr: &Expr,
        exprs: &[Expr],
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        let start = st.pos;
        let mut children = Vec::new();

        for (i, elem) in exprs.iter().enumerate() {
            if i > 0 && st.in_syntactic() {
                self.skip_layout(st);
            }

            match self.eval(elem, st) {
                Some(tree) => {
                    if !tree.is_lookahead() {
                        children.push(tree);
                    }
                }
                None => {
                    st.pos = start;
                    return None;
                }
            }
        }

        Some(ParseTree::Seq {
            span: Span::new_internal(st.input, start, st.pos),
            label: owned_label(expr),
            children,
        })
    }

    fn eval_choice<'i>(
        &self,
        expr: &Expr,
        exprs: &[Expr],
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        let start = st.pos;

        for alternative in exprs {
            // A bare lookahead only means something as a guard inside a
            // sequence; as an alternative it is skipped.
            if alternative.is_lookahead() {
                continue;
            }

            st.pos = start;
            if let Some(tree) = self.eval(alternative, st) {
                return Some(ParseTree::Choice {
                    span: Span::new_internal(st.input, start, st.pos),
                    label: owned_label(expr),
                    child: Box::new(tree),
                });
            }

            if st.unwind_to.is_some() {
                break;
            }
        }

        st.pos = start;
        None
    }

    fn eval_opt<'i>(
        &self,
        expr: &Expr,
        inner: &Expr,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        let start = st.pos;

        match self.eval(inner, st) {
            Some(tree) => {
                let child = if tree.is_lookahead() {
                    None
                } else {
                    Some(Box::new(tree))
                };

                Some(ParseTree::Opt {
                    span: Span::new_internal(st.input, start, st.pos),
                    label: owned_label(expr),
                    child,
                })
            }
            None => {
                if st.unwind_to.is_some() {
                    return None;
                }

                st.pos = start;
                Some(ParseTree::Opt {
                    span: Span::new_internal(st.input, start, start),
                    label: owned_label(expr),
                    child: None,
                })
            }
        }
    }

    fn eval_rep<'i>(
        &self,
        expr: &Expr,
        inner: &Expr,
        min: usize,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        let start = st.pos;
        let mut children = Vec::new();
        let mut matched = 0;
        let mut end = start;

        loop {
            if matched > 0 && st.in_syntactic() {
                self.skip_layout(st);
            }

            let before = st.pos;
            match self.eval(inner, st) {
                Some(tree) => {
                    matched += 1;
                    if !tree.is_lookahead() {
                        children.push(tree);
                    }
                    end = st.pos;

                    if st.pos == before {
                        // A zero-width match would repeat forever.
                        break;
                    }
                }
                None => {
                    if st.unwind_to.is_some() {
                        st.pos = start;
                        return None;
                    }

                    // Drop whatever layout was skipped after the last
                    // successful iteration.
                    st.pos = end;
                    break;
                }
            }
        }

        if matched < min {
            st.pos = start;
            return None;
        }

        Some(ParseTree::Rep {
            span: Span::new_internal(st.input, start, end),
            label: owned_label(expr),
            children,
        })
    }

    fn eval_lookahead<'i>(
        &self,
        expr: &Expr,
        inner: &Expr,
        positive: bool,
        st: &mut MatchState<'i>,
    ) -> Option<ParseTree<'i>> {
        let start = st.pos;

        st.silent += 1;
        let result = self.eval(inner, st);
        st.silent -= 1;

        st.pos = start;
        if st.unwind_to.is_some() {
            return None;
        }

        if result.is_some() == positive {
            let span = Span::new_internal(st.input, start, start);
            let label = owned_label(expr);

            Some(if positive {
                ParseTree::PosPred { span, label }
            } else {
                ParseTree::NegPred { span, label }
            })
        } else {
            None
        }
    }

    /// Zero or more applications of the `skip` rule.
    ///
    /// Runs between the elements of syntactic sequences and repetitions and
    /// ahead of a syntactic rule's body. Failures inside the skip never
    /// reach the diagnostic log.
    fn skip_layout<'i>(&self, st: &mut MatchState<'i>) {
        st.silent += 1;

        loop {
            if st.mode == Mode::Python
                && indent::at_line_start(st.input, st.pos)
                && st.input[st.pos..]
                    .chars()
                    .next()
                    .map_or(false, indent::is_indent_char)
            {
                // Line-leading blanks belong to the indentation engine.
                break;
            }

            let before = st.pos;
            let matched = if self.rules.contains_key(SKIP_RULE) {
                self.eval_rule(SKIP_RULE, None, st).is_some()
            } else {
                self.eval(&DEFAULT_SKIP, st).is_some()
            };

            if !matched || st.pos == before {
                break;
            }
        }

        st.silent -= 1;
    }
}

/// The whole mutable state of one match call.
#[derive(Debug)]
struct MatchState<'i> {
    input: &'i str,
    pos: usize,
    mode: Mode,
    stack: CallStack<'i>,
    /// `rule -> position -> seed`; an entry means a seed is being grown for
    /// that rule at that position right now.
    growing: HashMap<String, HashMap<usize, Option<ParseTree<'i>>>>,
    /// `rule -> position -> (result, end)` for ordinary applications.
    memo: HashMap<String, HashMap<usize, (Option<ParseTree<'i>>, usize)>>,
    /// Frame every in-between application must fail back to, when raised.
    unwind_to: Option<usize>,
    indents: IndentStack,
    attempt_pos: usize,
    attempts: Vec<String>,
    /// Suppression depth for attempt tracking (skip and lookahead bodies).
    silent: usize,
}

impl<'i> MatchState<'i> {
    fn new(input: &'i str, mode: Mode) -> MatchState<'i> {
        MatchState {
            input,
            pos: 0,
            mode,
            stack: CallStack::new(),
            growing: HashMap::new(),
            memo: HashMap::new(),
            unwind_to: None,
            indents: IndentStack::new(),
            attempt_pos: 0,
            attempts: vec![],
            silent: 0,
        }
    }

    fn in_syntactic(&self) -> bool {
        self.stack.last().map_or(false, |f| is_syntactic(&f.rule))
    }

    fn seed_planted(&self, rule: &str, pos: usize) -> bool {
        self.growing
            .get(rule)
            .map_or(false, |g| g.contains_key(&pos))
    }

    fn current_seed(&self, rule: &str, pos: usize) -> Option<ParseTree<'i>> {
        self.growing
            .get(rule)
            .and_then(|g| g.get(&pos))
            .cloned()
            .flatten()
    }

    fn seed_end(&self, rule: &str, pos: usize) -> Option<usize> {
        self.growing
            .get(rule)
            .and_then(|g| g.get(&pos))
            .and_then(|seed| seed.as_ref())
            .map(ParseTree::end)
    }

    fn growing_count(&self, rule: &str) -> usize {
        self.growing.get(rule).map_or(0, HashMap::len)
    }

    fn plant_seed(&mut self, rule: &str, pos: usize) {
        self.growing
            .entry(rule.to_string())
            .or_default()
            .insert(pos, None);
    }

    fn store_seed(&mut self, rule: &str, pos: usize, seed: Option<ParseTree<'i>>) {
        if let Some(g) = self.growing.get_mut(rule) {
            g.insert(pos, seed);
        }
    }

    fn remove_seed(&mut self, rule: &str, pos: usize) -> Option<ParseTree<'i>> {
        let g = self.growing.get_mut(rule)?;
        let seed = g.remove(&pos).flatten();
        if g.is_empty() {
            self.growing.remove(rule);
        }
        seed
    }

    fn track(&mut self, pos: usize, expected: &Expr) {
        if self.silent == 0 && pos >= self.attempt_pos {
            self.track_message(pos, expected.to_string());
        }
    }

    fn track_end_of_input(&mut self, pos: usize) {
        if self.silent == 0 && pos >= self.attempt_pos {
            self.track_message(pos, String::from("end of input"));
        }
    }

    fn track_message(&mut self, pos: usize, expected: String) {
        if pos > self.attempt_pos {
            self.attempts.clear();
            self.attempt_pos = pos;
        }
        self.attempts.push(expected);
    }
}

fn is_syntactic(name: &str) -> bool {
    name.chars().next().map_or(false, char::is_uppercase)
}

fn owned_label(expr: &Expr) -> Option<String> {
    expr.label().map(str::to_string)
}
