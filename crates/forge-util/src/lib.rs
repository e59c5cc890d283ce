//! forge-util - Foundation types shared by every compiler phase.
//!
//! This crate provides the pieces that every other `forge-*` crate builds
//! on:
//!
//! - [`span`] - source locations ([`Span`], [`FileId`]) and the
//!   [`SourceMap`] of loaded files
//! - [`diagnostic`] - structured diagnostics with stable codes, severities,
//!   child notes/suggestions, and the collecting [`Messages`] sink
//! - [`ice!`] - the single abort primitive for internal invariant
//!   violations
//!
//! The split between diagnostics and internal errors is deliberate: a
//! diagnostic describes a problem in the *user's* program and is collected
//! for reporting, while [`ice!`] fires only when a compiler invariant is
//! broken (a pass postcondition violated, an impossible node shape) and
//! aborts with a stable message.

pub mod diagnostic;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Level, Messages};
pub use span::{FileId, SourceFile, SourceMap, Span};

/// Abort with an internal compiler error.
///
/// Used for conditions that earlier passes guarantee can never happen.
/// Reaching one of these is a compiler bug, never a user error, so the
/// message is stable and prefixed for bug reports.
///
/// ```should_panic
/// use forge_util::ice;
///
/// ice!("unknown node kind {}", 42);
/// ```
#[macro_export]
macro_rules! ice {
    ($($arg:tt)*) => {
        panic!("internal compiler error: {}", format_args!($($arg)*))
    };
}
