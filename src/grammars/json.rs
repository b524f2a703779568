//! JSON-ish grammar
//!
//! A permissive JSON reader: `0x`/`0b`/`0o` integer literals, `_` digit
//! separators, single-quoted strings, unquoted identifier keys, `\xHH`
//! and `\uHHHH` escapes, and trailing commas.

use std::fmt::{self, Write};

use indexmap::IndexMap;

use crate::combinators::{alt, and_not, bracket, chain, opt, outer, rep, repsep, BoxedParser, Trail};
use crate::driver::{Driver, Options};
use crate::error::ParseError;
use crate::lazy::LazyParser;
use crate::primitives::{chars_in, literal, literal_of, read1, read1_to, skip};

const WS: &str = " \t\r\n";
const DECIMAL_DIGITS: &str = "0123456789_";
const HEX_DIGITS: &str = "0123456789abcdefABCDEF";
const IDENT_CHARS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";

/// A parsed JSON-ish document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Object member lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|members| members.get(key))
    }
}

/// Renders as strict JSON (double quotes, decimal numbers), which the
/// parser also accepts, so rendering and re-parsing is lossless.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write_quoted(f, s),
            Value::Array(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Value::Object(members) => {
                f.write_char('{')?;
                for (i, (key, member)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_quoted(f, key)?;
                    write!(f, ": {member}")?;
                }
                f.write_char('}')
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04X}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// Wrap a token parser to consume trailing whitespace.
fn lexeme<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<T> {
    parser.skip(skip(WS))
}

/// keyword := word !ident_char
fn keyword(word: &'static str) -> BoxedParser<String> {
    and_not(
        literal(word),
        literal(word).seq(chars_in(1, IDENT_CHARS)),
    )
}

fn int_from_radix(digits: &str, base: u32) -> Result<Value, String> {
    let clean = digits.replace('_', "");
    i64::from_str_radix(&clean, base)
        .map(Value::Int)
        .map_err(|_| "number out of range".to_string())
}

fn decimal_value(text: &str) -> Result<Value, String> {
    let clean = text.replace('_', "");
    if clean.contains(['.', 'e', 'E']) {
        clean
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| "invalid number".to_string())
    } else {
        clean
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| "number out of range".to_string())
    }
}

fn negate(value: Value) -> Value {
    match value {
        Value::Int(i) => Value::Int(-i),
        Value::Float(f) => Value::Float(-f),
        other => other,
    }
}

/// decimal := digits ["." digits] [("e" | "E") [sign] digits]
fn decimal() -> BoxedParser<Value> {
    let digits = read1(DECIMAL_DIGITS);
    let frac = literal(".").seq(read1(DECIMAL_DIGITS)).ignored();
    let exp = literal_of(&["e", "E"])
        .seq(opt(literal_of(&["+", "-"])))
        .seq(read1(DECIMAL_DIGITS))
        .ignored();
    outer(digits.ignored().seq(opt(frac)).seq(opt(exp)))
        .try_map(|text, _, _| decimal_value(&text))
}

/// number := [sign] (hex | bin | oct | decimal)
fn number() -> BoxedParser<Value> {
    let hex = literal_of(&["0x", "0X"])
        .skip_left(read1(&format!("{HEX_DIGITS}_")))
        .try_map(|digits, _, _| int_from_radix(&digits, 16));
    let bin = literal_of(&["0b", "0B"])
        .skip_left(read1("01_"))
        .try_map(|digits, _, _| int_from_radix(&digits, 2));
    let oct = literal_of(&["0o", "0O"])
        .skip_left(read1("01234567_"))
        .try_map(|digits, _, _| int_from_radix(&digits, 8));
    let magnitude = alt(vec![hex, bin, oct, decimal()]);
    opt(literal_of(&["-", "+"]))
        .seq(magnitude)
        .map(|(sign, value)| match sign.as_deref() {
            Some("-") => negate(value),
            _ => value,
        })
}

fn code_point(hex: &str) -> Result<String, String> {
    let value = u32::from_str_radix(hex, 16).map_err(|_| "invalid escape".to_string())?;
    char::from_u32(value)
        .map(String::from)
        .ok_or_else(|| format!("invalid code point `{hex}`"))
}

/// escape := "n" | "t" | "r" | "b" | "f" | "0" | "/" | "\" | quote
///         | "x" hex{2} | "u" hex{4}
fn escape_code() -> BoxedParser<String> {
    alt(vec![
        literal("n").map(|_| "\n".to_string()),
        literal("t").map(|_| "\t".to_string()),
        literal("r").map(|_| "\r".to_string()),
        literal("b").map(|_| "\u{8}".to_string()),
        literal("f").map(|_| "\u{c}".to_string()),
        literal("0").map(|_| "\0".to_string()),
        literal("/").map(|_| "/".to_string()),
        literal("\\").map(|_| "\\".to_string()),
        literal("\"").map(|_| "\"".to_string()),
        literal("'").map(|_| "'".to_string()),
        literal("x")
            .skip_left(chars_in(2, HEX_DIGITS))
            .try_map(|hex, _, _| code_point(&hex)),
        literal("u")
            .skip_left(chars_in(4, HEX_DIGITS))
            .try_map(|hex, _, _| code_point(&hex)),
    ])
}

/// The body and closing quote for whichever quote opened the string.
fn string_body(quote: String) -> BoxedParser<String> {
    let stop = format!("{quote}\\");
    let piece = alt(vec![
        literal("\\").skip_left(escape_code()),
        read1_to(&stop),
    ]);
    rep(piece)
        .map(|parts| parts.concat())
        .skip(literal(&quote))
}

/// string := quote (escape | chars)* quote
fn string_text() -> BoxedParser<String> {
    chain(literal_of(&["\"", "'"]), |quote: &String| {
        Some(string_body(quote.clone()))
    })
}

/// key := string | identifier
fn member_key() -> BoxedParser<String> {
    let ident = read1(IDENT_CHARS).verify(|name: &String| {
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            Err("identifier cannot start with a digit".to_string())
        } else {
            Ok(())
        }
    });
    alt(vec![string_text(), ident])
}

/// The complete value grammar; recursion goes through a lazy handle.
pub fn value_parser() -> BoxedParser<Value> {
    let value = LazyParser::new();

    let null = keyword("null").map(|_| Value::Null);
    let boolean = alt(vec![
        keyword("true").map(|_| Value::Bool(true)),
        keyword("false").map(|_| Value::Bool(false)),
    ]);

    let array = bracket(
        lexeme(literal("[")),
        repsep(value.parser(), lexeme(literal(",")), Trail::Allow),
        literal("]"),
    )
    .map(Value::Array);

    let member = lexeme(member_key())
        .skip(lexeme(literal(":")))
        .seq(value.parser());
    let object = bracket(
        lexeme(literal("{")),
        repsep(member, lexeme(literal(",")), Trail::Allow),
        literal("}"),
    )
    .map(|members| Value::Object(members.into_iter().collect()));

    value.define(lexeme(alt(vec![
        null.named("null"),
        boolean.named("boolean"),
        number().named("number"),
        string_text().map(Value::Str).named("string"),
        array.named("array"),
        object.named("object"),
    ])));

    value.parser()
}

/// A ready-to-use JSON-ish driver: trimmed, whole-input, detailed errors.
pub fn json() -> Driver<Value> {
    Driver::with_options(
        value_parser(),
        Options {
            trim: true,
            consume_all: true,
            ..Options::default()
        },
    )
}

/// Parse a JSON-ish document.
pub fn parse_json(input: &str) -> Result<Value, ParseError> {
    json().parse(input)
}
