//! Failure causes
//!
//! A [`Cause`] records why a specific failure happened: its position, a
//! message, an optional parser name, an `inner` chain of "because one
//! level down", and `siblings` for peer failures (every alternative of an
//! `alt`, for example).
//!
//! The furthest-into-the-input failure is usually the most informative
//! one, so [`get_latest_cause`] promotes the furthest sibling over the
//! enclosing cause, and [`find_latest_cause`] digs out the deepest
//! position in a whole cause tree.

/// Why a failure happened, as a tree of positions and messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// Byte position at which the parser gave up.
    pub position: usize,
    /// Human-readable description; empty when the *messages* detail bit
    /// was off at failure time.
    pub message: String,
    /// Name recorded by the nearest enclosing `named` parser, if any.
    pub name: Option<String>,
    /// The failure one level down that this one wraps.
    pub inner: Option<Box<Cause>>,
    /// Peer failures, e.g. every alternative that was tried.
    pub siblings: Vec<Cause>,
}

impl Cause {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Cause {
            position,
            message: message.into(),
            name: None,
            inner: None,
            siblings: Vec::new(),
        }
    }

    /// The deepest position anywhere in this cause tree.
    pub fn furthest_position(&self) -> usize {
        find_latest_cause(self).position
    }
}

/// Merge peer failures into an enclosing cause and promote the furthest.
///
/// `siblings` are attached to `outer`. If some sibling failed further into
/// the input than `outer` itself, the result is that sibling with `outer`
/// appended to the end of its causal chain, so the caller sees both the
/// furthest concrete reason and the enclosing context. Otherwise `outer`
/// is returned unchanged (with the siblings attached).
pub fn get_latest_cause(siblings: Vec<Cause>, mut outer: Cause) -> Cause {
    outer.siblings = siblings;
    let furthest = outer.siblings.iter().max_by_key(|c| c.position).cloned();
    match furthest {
        Some(sibling) if sibling.position > outer.position => append_context(sibling, outer),
        _ => outer,
    }
}

/// Hang `context` off the end of `cause`'s inner chain.
fn append_context(mut cause: Cause, context: Cause) -> Cause {
    cause.inner = Some(Box::new(match cause.inner.take() {
        Some(inner) => append_context(*inner, context),
        None => context,
    }));
    cause
}

/// Deep traversal: the cause with the greatest position anywhere in the
/// tree. Ties go to the deeper entry.
pub fn find_latest_cause(cause: &Cause) -> &Cause {
    let mut best = cause;
    if let Some(inner) = &cause.inner {
        let candidate = find_latest_cause(inner);
        if candidate.position >= best.position {
            best = candidate;
        }
    }
    for sibling in &cause.siblings {
        let candidate = find_latest_cause(sibling);
        if candidate.position >= best.position {
            best = candidate;
        }
    }
    best
}
