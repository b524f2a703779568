//! Primitive parsers
//!
//! Pure character-level scanners: each advances the cursor by consuming
//! characters (or, for [`peek`], not at all) and never builds sub-trees.
//! Character sets are normalized once at construction; the `i`-prefixed
//! variants fold both ASCII cases into the set.

use crate::charset::{CharSet, DynStop};
use crate::combinators::BoxedParser;
use crate::state::ParseState;

// === Set scanning ===

/// Advance over any characters in `set`; never fails.
pub fn skip(set: &str) -> BoxedParser<()> {
    skip_impl(CharSet::new(set), false)
}

/// Like [`skip`], but at least one character must be consumed.
pub fn skip1(set: &str) -> BoxedParser<()> {
    skip_impl(CharSet::new(set), true)
}

/// Case-insensitive [`skip`].
pub fn iskip(set: &str) -> BoxedParser<()> {
    skip_impl(CharSet::case_fold(set), false)
}

/// Case-insensitive [`skip1`].
pub fn iskip1(set: &str) -> BoxedParser<()> {
    skip_impl(CharSet::case_fold(set), true)
}

fn skip_impl(set: CharSet, at_least_one: bool) -> BoxedParser<()> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        let end = set.seek_while(state.input(), start);
        if at_least_one && end == start {
            return Err(state.fail(start, || format!("expected one of {}", set.display())));
        }
        state.advance_to(end);
        Ok(())
    })
}

/// Like [`skip`], returning the consumed span; never fails.
pub fn read(set: &str) -> BoxedParser<String> {
    read_impl(CharSet::new(set), false)
}

/// Like [`read`], but at least one character must be consumed.
pub fn read1(set: &str) -> BoxedParser<String> {
    read_impl(CharSet::new(set), true)
}

/// Case-insensitive [`read`].
pub fn iread(set: &str) -> BoxedParser<String> {
    read_impl(CharSet::case_fold(set), false)
}

/// Case-insensitive [`read1`].
pub fn iread1(set: &str) -> BoxedParser<String> {
    read_impl(CharSet::case_fold(set), true)
}

fn read_impl(set: CharSet, at_least_one: bool) -> BoxedParser<String> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        let end = set.seek_while(state.input(), start);
        if at_least_one && end == start {
            return Err(state.fail(start, || {
                format!("expected at least one of {}", set.display())
            }));
        }
        state.advance_to(end);
        Ok(state.slice(start, end).to_string())
    })
}

// === Fixed-count reading ===

/// Read exactly `n` characters of any kind.
pub fn chars(n: usize) -> BoxedParser<String> {
    counted_impl(n, None, false)
}

/// Read exactly `n` characters, each of which must be in `allowed`.
pub fn chars_in(n: usize, allowed: &str) -> BoxedParser<String> {
    counted_impl(n, Some(CharSet::new(allowed)), false)
}

/// Case-insensitive [`chars_in`].
pub fn ichars_in(n: usize, allowed: &str) -> BoxedParser<String> {
    counted_impl(n, Some(CharSet::case_fold(allowed)), false)
}

/// Read exactly `n` characters, none of which may be in `disallowed`.
pub fn not_chars(n: usize, disallowed: &str) -> BoxedParser<String> {
    counted_impl(n, Some(CharSet::new(disallowed)), true)
}

/// Case-insensitive [`not_chars`].
pub fn not_ichars(n: usize, disallowed: &str) -> BoxedParser<String> {
    counted_impl(n, Some(CharSet::case_fold(disallowed)), true)
}

fn counted_impl(n: usize, set: Option<CharSet>, negate: bool) -> BoxedParser<String> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        let rest = state.rest();
        let mut end = start;
        let mut taken = rest.char_indices();
        for _ in 0..n {
            match taken.next() {
                Some((offset, c)) => {
                    if let Some(set) = &set {
                        if set.contains(c) == negate {
                            return Err(
                                state.fail(start + offset, || format!("unexpected char `{c}`"))
                            );
                        }
                    }
                    end = start + offset + c.len_utf8();
                }
                None => {
                    return Err(state.fail(start, || "unexpected end of input".to_string()));
                }
            }
        }
        state.advance_to(end);
        Ok(state.slice(start, end).to_string())
    })
}

// === Reading up to a stop set ===

/// Consume until a character in `stop`; the stop character itself is not
/// consumed. Fails if no stop character occurs before the end of input.
pub fn read_to(stop: &str) -> BoxedParser<String> {
    read_to_impl(CharSet::new(stop), false, false)
}

/// Like [`read_to`], but the end of input also counts as a stop.
pub fn read_to_or_end(stop: &str) -> BoxedParser<String> {
    read_to_impl(CharSet::new(stop), true, false)
}

/// Like [`read_to`], but at least one character must be consumed.
pub fn read1_to(stop: &str) -> BoxedParser<String> {
    read_to_impl(CharSet::new(stop), false, true)
}

/// Like [`read_to_or_end`], but at least one character must be consumed.
pub fn read1_to_or_end(stop: &str) -> BoxedParser<String> {
    read_to_impl(CharSet::new(stop), true, true)
}

/// Case-insensitive [`read_to`].
pub fn iread_to(stop: &str) -> BoxedParser<String> {
    read_to_impl(CharSet::case_fold(stop), false, false)
}

/// Case-insensitive [`read1_to`].
pub fn iread1_to(stop: &str) -> BoxedParser<String> {
    read_to_impl(CharSet::case_fold(stop), false, true)
}

fn read_to_impl(stop: CharSet, accept_end: bool, at_least_one: bool) -> BoxedParser<String> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        let input = state.input();
        let end = stop.seek_until(input, start);
        if end >= input.len() && !accept_end {
            let at = input.len().saturating_sub(1);
            return Err(state.fail(at, || {
                format!("expected one of {} before end of input", stop.display())
            }));
        }
        if at_least_one && end == start {
            return Err(state.fail(start, || {
                format!("expected input before one of {}", stop.display())
            }));
        }
        state.advance_to(end);
        Ok(state.slice(start, end).to_string())
    })
}

/// Like [`read_to`], but the stop set is re-read from `stop` on every
/// invocation, so it can change while the parse runs.
pub fn read_to_dyn(stop: DynStop) -> BoxedParser<String> {
    read_to_dyn_impl(stop, false, false)
}

/// [`read_to_dyn`] accepting the end of input as a stop.
pub fn read_to_dyn_or_end(stop: DynStop) -> BoxedParser<String> {
    read_to_dyn_impl(stop, true, false)
}

/// [`read_to_dyn`] requiring at least one consumed character.
pub fn read1_to_dyn(stop: DynStop) -> BoxedParser<String> {
    read_to_dyn_impl(stop, false, true)
}

fn read_to_dyn_impl(stop: DynStop, accept_end: bool, at_least_one: bool) -> BoxedParser<String> {
    BoxedParser::new(move |state: &mut ParseState| {
        let set = CharSet::new(&stop.get());
        let start = state.position();
        let input = state.input();
        let end = set.seek_until(input, start);
        if end >= input.len() && !accept_end {
            let at = input.len().saturating_sub(1);
            return Err(state.fail(at, || {
                format!("expected one of {} before end of input", set.display())
            }));
        }
        if at_least_one && end == start {
            return Err(state.fail(start, || {
                format!("expected input before one of {}", set.display())
            }));
        }
        state.advance_to(end);
        Ok(state.slice(start, end).to_string())
    })
}

// === Look-ahead ===

/// Return the next `n` characters without advancing.
pub fn peek(n: usize) -> BoxedParser<String> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        let rest = state.rest();
        let mut end = 0;
        let mut taken = rest.char_indices();
        for _ in 0..n {
            match taken.next() {
                Some((offset, c)) => end = offset + c.len_utf8(),
                None => {
                    return Err(state.fail(start, || "unexpected end of input".to_string()));
                }
            }
        }
        Ok(rest[..end].to_string())
    })
}

// === Fixed strings ===

/// Match one of the listed literal strings, in order, returning it.
pub fn literal_of(options: &[&str]) -> BoxedParser<String> {
    let options: Vec<String> = options.iter().map(|s| s.to_string()).collect();
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        for option in &options {
            if state.rest().starts_with(option.as_str()) {
                state.advance_to(start + option.len());
                return Ok(option.clone());
            }
        }
        Err(state.fail(start, || expected_literal(&options)))
    })
}

/// Match a single literal string.
pub fn literal(text: &str) -> BoxedParser<String> {
    literal_of(&[text])
}

/// Case-insensitive [`literal_of`]; the returned string is normalized to
/// the listed casing.
pub fn iliteral_of(options: &[&str]) -> BoxedParser<String> {
    let options: Vec<String> = options.iter().map(|s| s.to_string()).collect();
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        let rest = state.rest();
        for option in &options {
            let len = option.len();
            if rest.len() >= len
                && rest.is_char_boundary(len)
                && rest[..len].eq_ignore_ascii_case(option)
            {
                state.advance_to(start + len);
                return Ok(option.clone());
            }
        }
        Err(state.fail(start, || expected_literal(&options)))
    })
}

/// Case-insensitive [`literal`].
pub fn iliteral(text: &str) -> BoxedParser<String> {
    iliteral_of(&[text])
}

fn expected_literal(options: &[String]) -> String {
    match options {
        [single] => format!("expected `{single}`"),
        _ => {
            let listed: Vec<String> = options.iter().map(|o| format!("`{o}`")).collect();
            format!("expected one of {}", listed.join(", "))
        }
    }
}
