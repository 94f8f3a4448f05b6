// lrpeg. The Left-Recursive Parser
// Copyright (c) 2018 Dragoș Tiselice
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use core::fmt;
use core::ptr;

/// A half-open byte range over a `&str`, produced by every successful match.
///
/// A zero-width match is represented by `start == end`.
#[derive(Clone, Copy)]
pub struct Span<'i> {
    input: &'i str,
    start: usize,
    end: usize,
}

impl<'i> Span<'i> {
    /// Create a new `Span` without checking invariants. (Checked with `debug_assertions`.)
    pub(crate) fn new_internal(input: &str, start: usize, end: usize) -> Span<'_> {
        debug_assert!(input.get(start..end).is_some());
        Span { input, start, end }
    }

    /// Attempts to create a new span. Will return `None` if `input[start..end]` is an invalid
    /// index into `input`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lrpeg::Span;
    /// let input = "Hello!";
    /// assert_eq!(None, Span::new(input, 100, 0));
    /// assert!(Span::new(input, 0, input.len()).is_some());
    /// ```
    pub fn new(input: &str, start: usize, end: usize) -> Option<Span<'_>> {
        if input.get(start..end).is_some() {
            Some(Span { input, start, end })
        } else {
            None
        }
    }

    /// Returns the `Span`'s start byte position as a `usize`.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the `Span`'s end byte position as a `usize`.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns `true` if the span covers no input at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Captures a slice from the `&str` defined by the `Span`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lrpeg::Span;
    /// let input = "abc def";
    /// let span = Span::new(input, 4, 7).unwrap();
    ///
    /// assert_eq!(span.as_str(), "def");
    /// ```
    #[inline]
    pub fn as_str(&self) -> &'i str {
        // The span's byte range was validated on construction.
        &self.input[self.start..self.end]
    }

    /// Returns the input the span was taken from.
    #[inline]
    pub fn input(&self) -> &'i str {
        self.input
    }
}

impl<'i> fmt::Debug for Span<'i> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Span")
            .field("str", &self.as_str())
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl<'i> PartialEq for Span<'i> {
    fn eq(&self, other: &Span<'i>) -> bool {
        ptr::eq(self.input, other.input) && self.start == other.start && self.end == other.end
    }
}

impl<'i> Eq for Span<'i> {}

#[cfg(test)]
mod tests {
    use super::Span;

    #[test]
    fn zero_width() {
        let span = Span::new("ab", 1, 1).unwrap();

        assert!(span.is_empty());
        assert_eq!(span.as_str(), "");
    }

    #[test]
    fn invalid_boundary() {
        let heart = "💖";

        assert!(Span::new(heart, 0, 1).is_none());
        assert!(Span::new(heart, 0, heart.len()).is_some());
    }

    #[test]
    fn equality_is_per_input() {
        let input = "aa";
        let other = String::from("aa");

        assert_eq!(Span::new(input, 0, 1), Span::new(input, 0, 1));
        assert_ne!(Span::new(input, 0, 1), Span::new(&other, 0, 1));
    }
}
