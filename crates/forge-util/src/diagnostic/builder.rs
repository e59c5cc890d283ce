//! Fluent construction of diagnostics.

use super::{Diagnostic, DiagnosticCode, Level};
use crate::span::Span;

/// Builder for constructing diagnostics with a fluent API
///
/// # Examples
///
/// ```
/// use forge_util::diagnostic::{DiagnosticBuilder, DiagnosticCode, Level};
/// use forge_util::span::Span;
///
/// let diag = DiagnosticBuilder::error("unable to implicitly cast from type u8 to i8")
///     .code(DiagnosticCode::UNABLE_TO_IMPLICITLY_CAST)
///     .span(Span::DUMMY)
///     .suggestion("use 'as' to cast between types")
///     .build();
///
/// assert_eq!(diag.level, Level::Error);
/// ```
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
    code: Option<DiagnosticCode>,
    notes: Vec<String>,
    suggestions: Vec<String>,
}

impl DiagnosticBuilder {
    /// Start a diagnostic at the given level
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: Span::DUMMY,
            code: None,
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Start an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    /// Start a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    /// Set the source span
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Set the diagnostic code
    pub fn code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a note child
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Attach a suggestion child
    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Finish building the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            level: self.level,
            message: self.message,
            span: self.span,
            code: self.code,
            notes: self.notes,
            suggestions: self.suggestions,
        }
    }

    /// Build and emit into a sink in one step
    pub fn emit(self, messages: &mut super::Messages) {
        messages.emit(self.build());
    }
}
