//! Parsnip - string parser combinators with rich diagnostics
//!
//! This library provides small composable parser values over UTF-8
//! strings, positional error reporting with line/column context, and an
//! optional parse tree recorded alongside a successful parse.
//!
//! ```
//! use parsnip::{alt, literal, read1, Driver, Options};
//!
//! let number = read1("0123456789").try_map(|digits: String, _, _| {
//!     digits.parse::<i64>().map_err(|_| "number out of range".to_string())
//! });
//! let answer = alt(vec![number, literal("?").map(|_| -1)]);
//!
//! let driver = Driver::with_options(
//!     answer,
//!     Options { consume_all: true, ..Options::default() },
//! );
//! assert_eq!(driver.parse("42").unwrap(), 42);
//! assert_eq!(driver.parse("?").unwrap(), -1);
//!
//! let error = driver.parse("4x").unwrap_err();
//! assert_eq!(error.position, 1);
//! ```

pub mod cause;
pub mod charset;
pub mod combinators;
pub mod driver;
pub mod error;
pub mod grammars;
pub mod lazy;
pub mod primitives;
pub mod state;
pub mod tree;

pub use cause::{find_latest_cause, get_latest_cause, Cause};
pub use charset::{CharSet, DynStop};
pub use combinators::*;
pub use driver::{Driver, Options};
pub use error::{get_line_num, get_parse_error, ParseError};
pub use lazy::LazyParser;
pub use primitives::*;
pub use state::{Detail, Failure, ParseResult, ParseState, Parser};
pub use tree::{node_for_position, Name, ParseNode};
