//! # Parser State Management
//!
//! This module provides the core infrastructure for the combinators:
//! - **ParseState**: input tape, byte cursor, backtracking, and the
//!   per-parse diagnostics (failure record, latest cause, detail bits)
//! - **Failure**: the canonical failure sentinel
//! - **Parser trait**: the interface every parser implements
//!
//! ## Backtracking
//!
//! Combinators try alternatives and fall back when they fail:
//!
//! ```text
//! let pos = state.position();     // Save current position
//! match parser.parse(state) {
//!     Ok(result) => result,
//!     Err(_) => {
//!         state.restore(pos);     // Restore and try the next alternative
//!         alternative.parse(state)
//!     }
//! }
//! ```
//!
//! ## Diagnostics
//!
//! Failures carry no payload; [`Failure`] is a zero-sized sentinel and
//! the *content* of the failure lives in the state:
//!
//! - the **failure record**, a [`Cause`] overwritten on every failure —
//!   callers that need to keep one must snapshot it with
//!   [`ParseState::cause_copy`]
//! - the **latest cause**, the failure observed furthest into the input
//!   since the last [`ParseState::reset_latest_cause`] — the "real"
//!   error is usually at the furthest point the parser reached before
//!   giving up completely
//! - the **detail bits**, two independent flags: *messages* (build
//!   human-readable failure strings) and *causes* (maintain the full
//!   cause-chain tree). With both bits off the failure path does no
//!   formatting and no cloning at all.
//!
//! ## Related Modules
//!
//! - [`crate::combinators`] - Parser combinators built on this state
//! - [`crate::primitives`] - Character-level parsers that drive the cursor
//! - [`crate::driver`] - Turns a root parser plus options into a runner

use std::any::Any;
use std::rc::Rc;

use crate::cause::Cause;
use crate::tree::{Name, ParseNode, TreeBuilder};

/// The two independent diagnostic detail bits.
///
/// *messages* controls whether failure strings are formatted at all;
/// *causes* controls whether combinators keep the full cause-chain tree
/// (sibling snapshots in `alt`, for example). Each has its own cost, so
/// they are switchable separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detail {
    messages: bool,
    causes: bool,
}

impl Detail {
    pub const fn new(messages: bool, causes: bool) -> Self {
        Detail { messages, causes }
    }

    /// Both bits off: the error-only fast path.
    pub const fn none() -> Self {
        Detail::new(false, false)
    }

    /// Both bits on.
    pub const fn full() -> Self {
        Detail::new(true, true)
    }

    pub const fn messages(&self) -> bool {
        self.messages
    }

    pub const fn causes(&self) -> bool {
        self.causes
    }
}

impl Default for Detail {
    /// Messages on, causes off.
    fn default() -> Self {
        Detail::new(true, false)
    }
}

/// A saved parse position: the input cursor plus the number of tree
/// nodes completed under the currently open node. Rolling back with
/// [`ParseState::rewind`] undoes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub(crate) position: usize,
    pub(crate) mark: usize,
}

impl Checkpoint {
    /// The saved cursor position.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// The canonical failure sentinel.
///
/// Deliberately empty: the position, message, and cause chain of the
/// failure live in [`ParseState`], so returning a failure costs nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure;

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, Failure>;

/// Parser state: the input tape, cursor, and per-parse diagnostics.
///
/// `ParseState` is the mutable context every parser operates on. It is
/// created per parse call, so the library has no process-wide state and
/// distinct parses never interfere.
pub struct ParseState<'a> {
    /// The complete input being parsed.
    input: &'a str,

    /// Current byte position (position of the next character to read).
    index: usize,

    /// Diagnostic detail bits for this parse.
    detail: Detail,

    /// The current failure record; overwritten on every failure.
    failure: Option<Cause>,

    /// Failure observed furthest into the input since the last reset.
    latest: Option<Cause>,

    /// Parse-tree builder; present only in tree mode.
    tree: Option<TreeBuilder>,
}

impl<'a> ParseState<'a> {
    /// A state with the default detail bits (messages on, causes off).
    pub fn new(input: &'a str) -> Self {
        ParseState::with_detail(input, Detail::default())
    }

    pub fn with_detail(input: &'a str, detail: Detail) -> Self {
        ParseState {
            input,
            index: 0,
            detail,
            failure: None,
            latest: None,
            tree: None,
        }
    }

    /// The full input tape. The returned slice borrows the input, not the
    /// state, so it stays usable while the state is mutated.
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.index..]
    }

    /// A slice of the input by byte positions.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn at_end(&self) -> bool {
        self.index >= self.input.len()
    }

    /// The next character, if any, without consuming it.
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Restore the cursor to a previously saved position.
    ///
    /// Used for backtracking: a failed alternative restores the position
    /// it started from before the next alternative runs. Combinators
    /// that can recover inside tree mode should prefer
    /// [`ParseState::checkpoint`] / [`ParseState::rewind`], which also
    /// roll back nodes recorded by the abandoned attempt.
    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }

    /// Save the cursor and the tree position together.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.index,
            mark: self.tree.as_ref().map_or(0, TreeBuilder::mark),
        }
    }

    /// Roll back to a checkpoint: the cursor returns to the saved
    /// position and any tree nodes completed since are dropped.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.index = checkpoint.position;
        if let Some(tree) = self.tree.as_mut() {
            tree.truncate(checkpoint.mark);
        }
    }

    /// Move the cursor forward to `position` after consuming input.
    /// Same operation as [`ParseState::restore`], named for intent.
    pub fn advance_to(&mut self, position: usize) {
        self.index = position;
    }

    pub fn detail(&self) -> Detail {
        self.detail
    }

    // === Failure record ===

    /// Record a failure at `at` and return the sentinel.
    ///
    /// The message closure runs only when the *messages* detail bit is
    /// set; with it off, the failure path allocates nothing.
    pub fn fail(&mut self, at: usize, message: impl FnOnce() -> String) -> Failure {
        let message = if self.detail.messages() {
            message()
        } else {
            String::new()
        };
        self.record(Cause::new(at, message))
    }

    /// Record a prepared cause (used by combinators that assemble sibling
    /// or inner chains themselves).
    pub fn fail_cause(&mut self, cause: Cause) -> Failure {
        self.record(cause)
    }

    fn record(&mut self, cause: Cause) -> Failure {
        if self.detail.messages() {
            let further = self
                .latest
                .as_ref()
                .map_or(true, |l| cause.position >= l.position);
            if further {
                self.latest = Some(cause.clone());
            }
        }
        self.failure = Some(cause);
        Failure
    }

    /// The current failure record, if a failure has been recorded.
    pub fn cause(&self) -> Option<&Cause> {
        self.failure.as_ref()
    }

    /// An owned snapshot of the current failure record.
    ///
    /// The record is overwritten on every failure, so a caller that needs
    /// to retain one (an `alt` collecting per-alternative causes, say)
    /// must copy it before running another parser.
    pub fn cause_copy(&self) -> Option<Cause> {
        self.failure.clone()
    }

    pub fn take_cause(&mut self) -> Option<Cause> {
        self.failure.take()
    }

    /// Attach a name to the current failure record if it has none, and
    /// synthesize an "expected `<label>`" message if it has no message.
    pub(crate) fn label_failure(&mut self, label: &str) {
        let messages = self.detail.messages();
        if let Some(cause) = self.failure.as_mut() {
            if cause.name.is_none() {
                cause.name = Some(label.to_string());
            }
            if messages && cause.message.is_empty() {
                cause.message = format!("expected {label}");
            }
        }
    }

    // === Latest cause ===

    /// The failure observed furthest into the input since the last reset.
    /// Tracked only while the *messages* bit is set.
    pub fn latest_cause(&self) -> Option<&Cause> {
        self.latest.as_ref()
    }

    pub fn reset_latest_cause(&mut self) {
        self.latest = None;
    }

    // === Parse tree ===

    /// Switch tree mode on, with the root node opened at position 0.
    pub fn enable_tree(&mut self) {
        self.tree = Some(TreeBuilder::new(0));
    }

    pub fn tree_enabled(&self) -> bool {
        self.tree.is_some()
    }

    pub(crate) fn node_open(&mut self, name: Option<Name>, start: usize) {
        if let Some(tree) = self.tree.as_mut() {
            tree.open(name, start);
        }
    }

    pub(crate) fn node_close(&mut self, end: usize, value: Option<Rc<dyn Any>>) {
        if let Some(tree) = self.tree.as_mut() {
            tree.close(end, value);
        }
    }

    pub(crate) fn node_discard(&mut self) {
        if let Some(tree) = self.tree.as_mut() {
            tree.discard();
        }
    }

    /// Close the root node and hand the finished tree out.
    pub(crate) fn finish_tree(&mut self, end: usize) -> Option<ParseNode> {
        self.tree.take().map(|tree| tree.finish(end))
    }
}

/// Generic parser trait.
///
/// All parsers implement this, enabling a unified interface for the
/// combinators. A parser either consumes input (moving the state's
/// cursor forward) and returns a value, or records a failure in the
/// state and returns the [`Failure`] sentinel.
pub trait Parser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

/// Allow closures to be parsers.
impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}
