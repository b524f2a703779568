//! CSV grammar
//!
//! Delimiter-configurable CSV: fields separated by `field_sep`, records
//! by `record_sep` (with `\r\n` tolerated for the default newline), and
//! quoted fields that may contain separators and doubled quotes.

use indexmap::IndexMap;

use crate::combinators::{alt, bracket, rep, repsep, BoxedParser, Trail};
use crate::driver::{Driver, Options};
use crate::error::ParseError;
use crate::primitives::{literal, literal_of, read1_to, read_to_or_end};

/// Separator configuration.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub field_sep: char,
    pub record_sep: char,
    pub quote: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            field_sep: ',',
            record_sep: '\n',
            quote: '"',
        }
    }
}

/// quoted := quote (doubled-quote | chars)* quote
fn quoted_field(quote: char) -> BoxedParser<String> {
    let q = quote.to_string();
    let doubled = literal(&q.repeat(2)).map({
        let q = q.clone();
        move |_| q.clone()
    });
    let piece = alt(vec![doubled, read1_to(&q)]);
    bracket(
        literal(&q),
        rep(piece).map(|parts| parts.concat()),
        literal(&q),
    )
}

/// bare := anything up to a separator or the end of input; quotes only
/// appear in quoted fields
fn bare_field(options: &CsvOptions) -> BoxedParser<String> {
    let mut stops = String::new();
    stops.push(options.field_sep);
    stops.push(options.record_sep);
    stops.push(options.quote);
    if options.record_sep == '\n' {
        stops.push('\r');
    }
    read_to_or_end(&stops)
}

/// field := quoted | bare
fn field(options: &CsvOptions) -> BoxedParser<String> {
    alt(vec![quoted_field(options.quote), bare_field(options)])
}

/// record := field (field_sep field)*
fn record(options: &CsvOptions) -> BoxedParser<Vec<String>> {
    repsep(
        field(options),
        literal(&options.field_sep.to_string()),
        Trail::Disallow,
    )
}

fn record_separator(options: &CsvOptions) -> BoxedParser<String> {
    if options.record_sep == '\n' {
        literal_of(&["\r\n", "\n"])
    } else {
        literal(&options.record_sep.to_string())
    }
}

/// The full document: records separated by the record separator, with a
/// trailing separator tolerated and the empty record it would imply
/// dropped.
pub fn rows_parser(options: &CsvOptions) -> BoxedParser<Vec<Vec<String>>> {
    repsep(record(options), record_separator(options), Trail::Allow).map(|mut rows| {
        if rows.last().is_some_and(|r| r.len() == 1 && r[0].is_empty()) {
            rows.pop();
        }
        rows
    })
}

/// Parse a CSV document into rows of fields.
pub fn parse_csv(input: &str, options: &CsvOptions) -> Result<Vec<Vec<String>>, ParseError> {
    Driver::with_options(
        rows_parser(options),
        Options {
            consume_all: true,
            ..Options::default()
        },
    )
    .parse(input)
}

/// Parse a CSV document whose first row is a header, flattening every
/// following row into an ordered column-to-value map.
pub fn parse_csv_records(
    input: &str,
    options: &CsvOptions,
) -> Result<Vec<IndexMap<String, String>>, ParseError> {
    let mut rows = parse_csv(input, options)?.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    Ok(rows
        .map(|row| header.iter().cloned().zip(row).collect())
        .collect())
}
