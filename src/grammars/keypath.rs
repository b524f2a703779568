//! Key-path grammar
//!
//! Dotted and bracketed paths into nested structures: `a.b[2]["c.d"]`
//! becomes field, field, index, field.

use crate::combinators::{alt, bracket, bracket_matched, rep, BoxedParser};
use crate::driver::{Driver, Options};
use crate::error::ParseError;
use crate::primitives::{literal, read1, read1_to};

const FIELD_CHARS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";

/// One step of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// field := ident_chars+
fn field_segment() -> BoxedParser<Segment> {
    read1(FIELD_CHARS).map(Segment::Field)
}

/// bracketed := "[" (index | quoted-field) "]"
fn bracket_segment() -> BoxedParser<Segment> {
    let index = read1("0123456789").try_map(|digits, _, _| {
        digits
            .parse::<usize>()
            .map(Segment::Index)
            .map_err(|_| "index out of range".to_string())
    });
    // whichever quote opens must close
    let quoted = bracket_matched(
        vec![literal("'"), literal("\"")],
        read1_to("'\""),
    )
    .map(Segment::Field);
    bracket(literal("["), alt(vec![index, quoted]), literal("]"))
}

/// path := (field | bracketed) ("." field | bracketed)*
pub fn path_parser() -> BoxedParser<Vec<Segment>> {
    let first = alt(vec![field_segment(), bracket_segment()]);
    let follow = alt(vec![
        literal(".").skip_left(field_segment()),
        bracket_segment(),
    ]);
    first.seq(rep(follow)).map(|(head, mut tail)| {
        tail.insert(0, head);
        tail
    })
}

/// Parse a key path.
pub fn parse_keypath(input: &str) -> Result<Vec<Segment>, ParseError> {
    Driver::with_options(
        path_parser(),
        Options {
            consume_all: true,
            ..Options::default()
        },
    )
    .parse(input)
}
