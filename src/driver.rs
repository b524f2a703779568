//! Driver
//!
//! The driver turns a root parser plus default [`Options`] into the
//! user-facing entry point: it installs the detail bits, optionally
//! trims surrounding whitespace, runs the parser, validates consume-all,
//! and renders failures into [`ParseError`]s (or a parse tree in tree
//! mode).

use crate::cause::{find_latest_cause, get_latest_cause, Cause};
use crate::charset::CharSet;
use crate::combinators::BoxedParser;
use crate::error::{get_parse_error, ParseError};
use crate::state::{Detail, Failure, ParseState, Parser};
use crate::tree::ParseNode;

/// Per-parse options; the driver holds defaults and every call may
/// override them.
#[derive(Debug, Clone)]
pub struct Options {
    /// Strip leading and trailing whitespace around the root parse.
    pub trim: bool,
    /// Fail unless the parse consumes the entire input.
    pub consume_all: bool,
    /// The *messages* detail bit: build human-readable failure strings.
    pub detailed: bool,
    /// The *causes* detail bit: keep the full cause-chain tree. More
    /// expensive; implies nothing about `detailed`.
    pub causes: bool,
    /// Lines of surrounding context to include in rendered errors.
    pub context_lines: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            trim: false,
            consume_all: false,
            detailed: true,
            causes: false,
            context_lines: 1,
        }
    }
}

impl Options {
    fn detail(&self) -> Detail {
        Detail::new(self.detailed, self.causes)
    }
}

const TRIM_CHARS: &str = " \t\r\n";

/// A root parser bound to default options.
pub struct Driver<T> {
    root: BoxedParser<T>,
    defaults: Options,
}

impl<T: 'static> Driver<T> {
    pub fn new(root: BoxedParser<T>) -> Self {
        Driver {
            root,
            defaults: Options::default(),
        }
    }

    pub fn with_options(root: BoxedParser<T>, defaults: Options) -> Self {
        Driver { root, defaults }
    }

    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    /// Parse with the driver's default options.
    pub fn parse(&self, input: &str) -> Result<T, ParseError> {
        self.parse_with(input, &self.defaults)
    }

    /// Parse with per-call options.
    pub fn parse_with(&self, input: &str, options: &Options) -> Result<T, ParseError> {
        let mut state = ParseState::with_detail(input, options.detail());
        match self.run(&mut state, options) {
            Ok(value) => Ok(value),
            Err(_) => Err(render_failure(&mut state, input, options)),
        }
    }

    /// Success-or-not parsing: no error is constructed and both detail
    /// bits stay off, which is the cheapest way to test an input.
    pub fn parse_opt(&self, input: &str) -> Option<T> {
        let mut state = ParseState::with_detail(input, Detail::none());
        self.run(&mut state, &self.defaults).ok()
    }

    /// Whether the input parses at all.
    pub fn accepts(&self, input: &str) -> bool {
        self.parse_opt(input).is_some()
    }

    /// Parse in tree mode with the default options.
    pub fn parse_tree(&self, input: &str) -> Result<ParseNode, ParseError> {
        self.parse_tree_with(input, &self.defaults)
    }

    /// Parse in tree mode: the result is the root [`ParseNode`], whose
    /// descendants are the named parsers that matched.
    pub fn parse_tree_with(&self, input: &str, options: &Options) -> Result<ParseNode, ParseError> {
        let mut state = ParseState::with_detail(input, options.detail());
        state.enable_tree();
        match self.run(&mut state, options) {
            Ok(_) => {
                let end = state.position();
                if let Some(node) = state.finish_tree(end) {
                    Ok(node)
                } else {
                    unreachable!("tree mode was enabled above")
                }
            }
            Err(_) => Err(render_failure(&mut state, input, options)),
        }
    }

    /// Trim, run the root parser, and validate consume-all. The failure
    /// content is left in the state for rendering.
    fn run(&self, state: &mut ParseState, options: &Options) -> Result<T, Failure> {
        let input = state.input();
        if state.detail().messages() {
            state.reset_latest_cause();
        }
        let trim = if options.trim {
            Some(CharSet::new(TRIM_CHARS))
        } else {
            None
        };
        if let Some(ws) = &trim {
            state.advance_to(ws.seek_while(input, state.position()));
        }
        tracing::trace!(len = input.len(), "parse started");
        let value = self.root.parse(state)?;
        if let Some(ws) = &trim {
            state.advance_to(ws.seek_while(input, state.position()));
        }
        if options.consume_all && state.position() < input.len() {
            let at = state.position();
            let consumed = input[..at].chars().count();
            return Err(state.fail(at, || {
                format!("expected to consume all input, but only {consumed} chars consumed")
            }));
        }
        tracing::trace!(end = state.position(), "parse succeeded");
        Ok(value)
    }
}

/// Build the reported [`ParseError`] from the state's failure record.
///
/// The record's siblings are merged and the furthest promoted; if a
/// still-deeper failure exists anywhere (the cause tree or the
/// out-of-band latest record), it is attached as `latest`.
fn render_failure(state: &mut ParseState, input: &str, options: &Options) -> ParseError {
    let record = state
        .take_cause()
        .unwrap_or_else(|| Cause::new(state.position(), String::new()));
    let reported = get_latest_cause(record.siblings.clone(), record.clone());
    let mut error = get_parse_error(&reported, input, options.context_lines);

    let mut deepest = find_latest_cause(&record).clone();
    if let Some(latest) = state.latest_cause() {
        if latest.position > deepest.position {
            deepest = latest.clone();
        }
    }
    if deepest.position != reported.position {
        error.latest = Some(Box::new(deepest));
    }
    if options.causes {
        error.cause = Some(Box::new(record));
    }
    tracing::trace!(position = error.position, "parse failed");
    error
}
