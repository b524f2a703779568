//! Parser combinators
//!
//! Every combinator here is polymorphic over the [`Parser`] interface and
//! produces a [`BoxedParser`], so any combinator works as an input to any
//! other. Binary composition is available both as methods (`seq`, `or`,
//! `map`, ...) and as operators (`+`, `-`, `*`, `|`, `>>`); the larger
//! shapes (alternation lists, repetition, bracketing, look-ahead) are
//! free functions.

use std::any::Any;
use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::rc::Rc;

use crate::cause::{get_latest_cause, Cause};
use crate::charset::CharSet;
use crate::state::{ParseResult, ParseState, Parser};
use crate::tree::Name;

// === Type-erased parsers ===

type ParseFn<T> = dyn Fn(&mut ParseState) -> ParseResult<T>;

/// A clonable, type-erased parser.
///
/// Combinators compose `BoxedParser`s by value; cloning shares the
/// underlying closure, so a grammar can reuse one parser in several
/// rules without rebuilding it.
pub struct BoxedParser<T> {
    run: Rc<ParseFn<T>>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    /// Wrap any [`Parser`] (closures included) for composition.
    pub fn new<P>(parser: P) -> Self
    where
        P: Parser<T> + 'static,
    {
        BoxedParser {
            run: Rc::new(move |state| parser.parse(state)),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        (self.run)(state)
    }
}

// === Pairwise composition ===

impl<T: 'static> BoxedParser<T> {
    /// Run `self`, then `next`, pairing the two values.
    ///
    /// In tree mode every sequence match becomes an anonymous node: it
    /// opens at the starting position, the children's nodes nest inside
    /// it, and on success it closes spanning both matches with the tuple
    /// as its result. A failing child discards the node.
    pub fn seq<U>(self, next: BoxedParser<U>) -> BoxedParser<(T, U)>
    where
        T: Clone,
        U: Clone + 'static,
    {
        BoxedParser::new(move |state: &mut ParseState| {
            let tree = state.tree_enabled();
            if tree {
                state.node_open(None, state.position());
            }
            let first = match self.parse(state) {
                Ok(value) => value,
                Err(failure) => {
                    if tree {
                        state.node_discard();
                    }
                    return Err(failure);
                }
            };
            match next.parse(state) {
                Ok(second) => {
                    let pair = (first, second);
                    if tree {
                        let erased: Rc<dyn Any> = Rc::new(pair.clone());
                        state.node_close(state.position(), Some(erased));
                    }
                    Ok(pair)
                }
                Err(failure) => {
                    if tree {
                        state.node_discard();
                    }
                    Err(failure)
                }
            }
        })
    }

    /// Run `self`, then `next`, keeping only the left value.
    pub fn skip<U: 'static>(self, next: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let value = self.parse(state)?;
            next.parse(state)?;
            Ok(value)
        })
    }

    /// Run `self`, then `next`, keeping only the right value.
    pub fn skip_left<U: 'static>(self, next: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            self.parse(state)?;
            next.parse(state)
        })
    }

    /// Try `self`; on failure rewind and try `fallback`.
    pub fn or(self, fallback: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let saved = state.checkpoint();
            match self.parse(state) {
                Ok(value) => Ok(value),
                Err(_) => {
                    state.rewind(saved);
                    fallback.parse(state)
                }
            }
        })
    }

    /// Transform the value on success.
    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| Ok(f(self.parse(state)?)))
    }

    /// Fallible map: the function sees the value and the matched span and
    /// may reject it. A rejection fails at the *end* of the inner match,
    /// so it bubbles up as the latest cause rather than being shadowed by
    /// shallower alternatives.
    pub fn try_map<U: 'static, F>(self, f: F) -> BoxedParser<U>
    where
        F: Fn(T, usize, usize) -> Result<U, String> + 'static,
    {
        BoxedParser::new(move |state: &mut ParseState| {
            let start = state.position();
            let value = self.parse(state)?;
            let end = state.position();
            match f(value, start, end) {
                Ok(mapped) => Ok(mapped),
                Err(message) => Err(state.fail(end, || message)),
            }
        })
    }

    /// Keep the value only if the predicate accepts it; a rejection fails
    /// at the end of the match with the returned message.
    pub fn verify<F>(self, predicate: F) -> BoxedParser<T>
    where
        F: Fn(&T) -> Result<(), String> + 'static,
    {
        BoxedParser::new(move |state: &mut ParseState| {
            let value = self.parse(state)?;
            let end = state.position();
            match predicate(&value) {
                Ok(()) => Ok(value),
                Err(message) => Err(state.fail(end, || message)),
            }
        })
    }

    /// Discard the result
    pub fn ignored(self) -> BoxedParser<()> {
        self.map(|_| ())
    }
}

impl<T: Clone + 'static> BoxedParser<T> {
    /// Label this parser for diagnostics and the parse tree.
    ///
    /// On failure the label is recorded in the failure record if no
    /// deeper parser claimed it first; in tree mode a successful match
    /// becomes a node carrying the label, span, and value.
    pub fn named(self, name: impl Into<Name>) -> BoxedParser<T> {
        let name = name.into();
        BoxedParser::new(move |state: &mut ParseState| {
            let start = state.position();
            let tree = state.tree_enabled();
            if tree {
                state.node_open(Some(name.clone()), start);
            }
            match self.parse(state) {
                Ok(value) => {
                    if tree {
                        let erased: Rc<dyn Any> = Rc::new(value.clone());
                        state.node_close(state.position(), Some(erased));
                    }
                    Ok(value)
                }
                Err(failure) => {
                    if tree {
                        state.node_discard();
                    }
                    state.label_failure(&name.label);
                    Err(failure)
                }
            }
        })
    }
}

// === Operator sugar ===
//
// Grammar rules read better infix: `sign + digits` pairs two values,
// `token - ws` drops the right one, `ws * token` drops the left one,
// `a | b` chooses, and `p >> f` maps.

impl<T, U> Add<BoxedParser<U>> for BoxedParser<T>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    type Output = BoxedParser<(T, U)>;

    /// `a + b` is [`BoxedParser::seq`].
    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    /// `a - b` is [`BoxedParser::skip`]: keep the left value.
    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    /// `a * b` is [`BoxedParser::skip_left`]: keep the right value.
    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    /// `a | b` is [`BoxedParser::or`].
    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    /// `p >> f` is [`BoxedParser::map`].
    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Alternation ===

/// Try each parser in order from the same position; first success wins.
///
/// When all alternatives fail and the *causes* bit is on, a snapshot of
/// every alternative's cause is kept as a sibling and the furthest one is
/// promoted (see [`get_latest_cause`]), so the error points at the
/// deepest attempt instead of the start of the alternation.
pub fn alt<T: 'static>(parsers: Vec<BoxedParser<T>>) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParseState| {
        let saved = state.checkpoint();
        let start = saved.position();
        let collect = state.detail().causes();
        let mut siblings: Vec<Cause> = Vec::new();
        for parser in &parsers {
            state.rewind(saved);
            match parser.parse(state) {
                Ok(value) => return Ok(value),
                Err(_) => {
                    if collect {
                        if let Some(cause) = state.cause_copy() {
                            siblings.push(cause);
                        }
                    }
                }
            }
        }
        state.rewind(saved);
        if collect {
            let message = if state.detail().messages() {
                "no alternative matched".to_string()
            } else {
                String::new()
            };
            let merged = get_latest_cause(siblings, Cause::new(start, message));
            Err(state.fail_cause(merged))
        } else {
            Err(state.fail(start, || "no alternative matched".to_string()))
        }
    })
}

/// Run each parser in order, discarding values.
pub fn check(parsers: Vec<BoxedParser<()>>) -> BoxedParser<()> {
    BoxedParser::new(move |state: &mut ParseState| {
        for parser in &parsers {
            parser.parse(state)?;
        }
        Ok(())
    })
}

// === Repetition ===

/// Trailing-separator policy for [`repsep`] and [`rep1sep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trail {
    /// A separator after the last element is permitted (and consumed).
    Allow,
    /// A separator after the last element is not consumed: the cursor is
    /// rewound to just after the last element.
    Disallow,
    /// Every element must be followed by a separator; a missing one is a
    /// failure.
    Require,
}

/// Parse zero or more occurrences; never fails.
///
/// A success that consumes nothing ends the repetition without being
/// accumulated, so a zero-width parser cannot loop forever.
pub fn rep<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut items = Vec::new();
        loop {
            let saved = state.checkpoint();
            match parser.parse(state) {
                Ok(item) => {
                    if state.position() == saved.position() {
                        state.rewind(saved);
                        break;
                    }
                    items.push(item);
                }
                Err(_) => {
                    state.rewind(saved);
                    break;
                }
            }
        }
        Ok(items)
    })
}

/// Parse one or more occurrences.
pub fn rep1<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    let rest = rep(parser.clone());
    BoxedParser::new(move |state: &mut ParseState| {
        let first = parser.parse(state)?;
        let mut items = rest.parse(state)?;
        items.insert(0, first);
        Ok(items)
    })
}

/// Zero or more occurrences of `parser` separated by `separator`.
pub fn repsep<T: 'static, S: 'static>(
    parser: BoxedParser<T>,
    separator: BoxedParser<S>,
    trail: Trail,
) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let saved = state.checkpoint();
        let mut items = Vec::new();
        match parser.parse(state) {
            Ok(item) => items.push(item),
            Err(_) => {
                state.rewind(saved);
                return Ok(items);
            }
        }
        separated_rest(state, &parser, &separator, trail, &mut items)?;
        Ok(items)
    })
}

/// One or more occurrences of `parser` separated by `separator`.
pub fn rep1sep<T: 'static, S: 'static>(
    parser: BoxedParser<T>,
    separator: BoxedParser<S>,
    trail: Trail,
) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let first = parser.parse(state)?;
        let mut items = vec![first];
        separated_rest(state, &parser, &separator, trail, &mut items)?;
        Ok(items)
    })
}

/// The shared `(separator element)*` tail of the separated repetitions.
fn separated_rest<T: 'static, S: 'static>(
    state: &mut ParseState,
    parser: &BoxedParser<T>,
    separator: &BoxedParser<S>,
    trail: Trail,
    items: &mut Vec<T>,
) -> ParseResult<()> {
    loop {
        let after_item = state.checkpoint();
        if separator.parse(state).is_err() {
            state.rewind(after_item);
            if trail == Trail::Require {
                let at = after_item.position();
                return Err(state.fail(at, || "expected trailing separator".to_string()));
            }
            return Ok(());
        }
        let after_sep = state.checkpoint();
        if after_sep.position() == after_item.position() {
            // zero-width separator would never terminate
            state.rewind(after_item);
            return Ok(());
        }
        match parser.parse(state) {
            Ok(item) => items.push(item),
            Err(_) => {
                match trail {
                    // the trailing separator stays consumed
                    Trail::Allow | Trail::Require => state.rewind(after_sep),
                    // rewind to just after the last element
                    Trail::Disallow => state.rewind(after_item),
                }
                return Ok(());
            }
        }
    }
}

// === Optional & negation ===

/// Optional: parse zero or one. Always succeeds; on failure the cursor
/// is unchanged and the value is `None`.
pub fn opt<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let saved = state.checkpoint();
        match parser.parse(state) {
            Ok(item) => Ok(Some(item)),
            Err(_) => {
                state.rewind(saved);
                Ok(None)
            }
        }
    })
}

/// Negative look-ahead: succeeds without consuming iff `parser` fails.
pub fn not<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<()> {
    BoxedParser::new(move |state: &mut ParseState| {
        let saved = state.checkpoint();
        let start = saved.position();
        match parser.parse(state) {
            Ok(_) => {
                let consumed = state.slice(start, state.position()).to_string();
                state.rewind(saved);
                Err(state.fail(start, || format!("unexpected `{consumed}`")))
            }
            Err(_) => {
                state.rewind(saved);
                Ok(())
            }
        }
    })
}

/// Conjunction with negation: `parser` must match where `guard` does not.
///
/// Both run from the same start; on success the cursor rests at the end
/// of `parser`'s match.
pub fn and_not<T: 'static, U: 'static>(
    parser: BoxedParser<T>,
    guard: BoxedParser<U>,
) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParseState| {
        let saved = state.checkpoint();
        let start = saved.position();
        let value = parser.parse(state)?;
        let end = state.checkpoint();
        state.restore(start);
        match guard.parse(state) {
            Ok(_) => {
                let consumed = state.slice(start, state.position()).to_string();
                state.rewind(saved);
                Err(state.fail(start, || format!("unexpected `{consumed}`")))
            }
            Err(_) => {
                // drop whatever the guard recorded, keep the match
                state.rewind(end);
                Ok(value)
            }
        }
    })
}

// === Bracketing ===

/// `left content right`, keeping only the content's value.
pub fn bracket<L: 'static, T: 'static, R: 'static>(
    left: BoxedParser<L>,
    content: BoxedParser<T>,
    right: BoxedParser<R>,
) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParseState| {
        left.parse(state)?;
        let value = content.parse(state)?;
        right.parse(state)?;
        Ok(value)
    })
}

/// Bracketing where several delimiters may open, and whichever opened
/// must also close: `ends[i] content ends[i]`.
pub fn bracket_matched<E: 'static, T: 'static>(
    ends: Vec<BoxedParser<E>>,
    content: BoxedParser<T>,
) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParseState| {
        let saved = state.checkpoint();
        let start = saved.position();
        let mut matched = None;
        for (i, end) in ends.iter().enumerate() {
            state.rewind(saved);
            if end.parse(state).is_ok() {
                matched = Some(i);
                break;
            }
        }
        let Some(which) = matched else {
            state.rewind(saved);
            return Err(state.fail(start, || "expected opening delimiter".to_string()));
        };
        let value = content.parse(state)?;
        ends[which].parse(state)?;
        Ok(value)
    })
}

// === Chaining & spans ===

/// Monadic step: run `parser`, let `selector` pick the continuation from
/// its value, and run that. A `None` selection is the failure
/// "chain selection failed" at the current position.
pub fn chain<T: 'static, U: 'static, F>(parser: BoxedParser<T>, selector: F) -> BoxedParser<U>
where
    F: Fn(&T) -> Option<BoxedParser<U>> + 'static,
{
    BoxedParser::new(move |state: &mut ParseState| {
        let value = parser.parse(state)?;
        match selector(&value) {
            Some(next) => next.parse(state),
            None => {
                let at = state.position();
                Err(state.fail(at, || "chain selection failed".to_string()))
            }
        }
    })
}

/// Run `parser` but return the substring it matched, discarding its value.
pub fn outer<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<String> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        parser.parse(state)?;
        Ok(state.slice(start, state.position()).to_string())
    })
}

// === Look-ahead scanning ===

/// Scan forward to each occurrence of a sigil character, attempting
/// `terminator` there; on its first success, return everything between
/// the entry position and the terminator match. The cursor rests at the
/// start of the terminator match, which is not consumed.
pub fn read_to_parser<U: 'static>(sigils: &str, terminator: BoxedParser<U>) -> BoxedParser<String> {
    read_to_parser_impl(CharSet::new(sigils), terminator, false)
}

/// Like [`read_to_parser`], but at least one character must be consumed.
pub fn read1_to_parser<U: 'static>(sigils: &str, terminator: BoxedParser<U>) -> BoxedParser<String> {
    read_to_parser_impl(CharSet::new(sigils), terminator, true)
}

fn read_to_parser_impl<U: 'static>(
    sigils: CharSet,
    terminator: BoxedParser<U>,
    at_least_one: bool,
) -> BoxedParser<String> {
    BoxedParser::new(move |state: &mut ParseState| {
        let entry = state.checkpoint();
        let start = entry.position();
        let input = state.input();
        let mut from = start;
        loop {
            let at = sigils.seek_until(input, from);
            if at >= input.len() {
                state.rewind(entry);
                let fail_at = input.len().saturating_sub(1);
                return Err(state.fail(fail_at, || {
                    format!(
                        "expected one of {} before end of input",
                        sigils.display()
                    )
                }));
            }
            state.advance_to(at);
            // the terminator is pure look-ahead; whatever it consumed or
            // recorded is rolled back
            let probe = state.checkpoint();
            let matched = terminator.parse(state).is_ok();
            state.rewind(probe);
            if matched {
                if at_least_one && at == start {
                    state.rewind(entry);
                    return Err(
                        state.fail(start, || "expected input before terminator".to_string())
                    );
                }
                return Ok(input[start..at].to_string());
            }
            let width = input[at..].chars().next().map_or(1, char::len_utf8);
            from = at + width;
        }
    })
}

// === Debugging ===

/// Trace a parser's entry and outcome without changing its behavior.
pub fn debug<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        tracing::debug!(position = start, "parser entered");
        let result = parser.parse(state);
        match &result {
            Ok(_) => tracing::debug!(start, end = state.position(), "parser matched"),
            Err(_) => tracing::debug!(start, "parser failed"),
        }
        result
    })
}
