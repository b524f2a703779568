//! Bundled grammars
//!
//! Users of the core API, organized by format:
//! - `json`: a permissive JSON-ish notation
//! - `csv`: delimiter-configurable CSV
//! - `keypath`: dotted and bracketed key paths
//!
//! Each exposes a driver-wrapped parse function and serves as the
//! reference for how the combinators compose in practice.

pub mod csv;
pub mod json;
pub mod keypath;
