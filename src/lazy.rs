//! Lazy parser handles
//!
//! Grammars are mutually recursive; a handle lets a rule refer to a
//! parser that does not exist yet. The target is snapshotted on first
//! use and every later call goes straight to the snapshot.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use crate::combinators::BoxedParser;
use crate::state::{ParseState, Parser};

/// A handle to a parser that may not be built yet.
///
/// ```
/// use parsnip::{alt, bracket, literal, read1, LazyParser, Parser, ParseState};
///
/// let expr = LazyParser::new();
/// let parens = bracket(literal("("), expr.parser(), literal(")"));
/// expr.define(alt(vec![read1("0123456789"), parens]));
///
/// let mut state = ParseState::new("((7))");
/// assert_eq!(expr.parser().parse(&mut state), Ok("7".to_string()));
/// ```
///
/// A handle used before [`LazyParser::define`] fills it evaluates to an
/// always-failing parser with the message "uninitialized lazy parser".
pub struct LazyParser<T> {
    slot: Rc<RefCell<Option<BoxedParser<T>>>>,
    resolved: Rc<OnceCell<BoxedParser<T>>>,
}

impl<T> Clone for LazyParser<T> {
    fn clone(&self) -> Self {
        LazyParser {
            slot: Rc::clone(&self.slot),
            resolved: Rc::clone(&self.resolved),
        }
    }
}

impl<T: 'static> LazyParser<T> {
    pub fn new() -> Self {
        LazyParser {
            slot: Rc::new(RefCell::new(None)),
            resolved: Rc::new(OnceCell::new()),
        }
    }

    /// Bind the target parser. Replaces any previous binding that has
    /// not been snapshotted yet; once a parse has resolved the handle,
    /// the snapshot wins.
    pub fn define(&self, parser: BoxedParser<T>) {
        *self.slot.borrow_mut() = Some(parser);
    }

    /// The resolved target, once a parse has snapshotted it.
    pub fn target(&self) -> Option<BoxedParser<T>> {
        self.resolved.get().cloned()
    }

    /// A parser that forwards to the handle's target, resolving it on
    /// first use.
    pub fn parser(&self) -> BoxedParser<T> {
        let slot = Rc::clone(&self.slot);
        let resolved = Rc::clone(&self.resolved);
        BoxedParser::new(move |state: &mut ParseState| {
            if let Some(parser) = resolved.get() {
                return parser.parse(state);
            }
            let target = slot.borrow().clone();
            match target {
                Some(parser) => resolved.get_or_init(|| parser).parse(state),
                None => {
                    let at = state.position();
                    Err(state.fail(at, || "uninitialized lazy parser".to_string()))
                }
            }
        })
    }
}

impl<T: 'static> Default for LazyParser<T> {
    fn default() -> Self {
        LazyParser::new()
    }
}
