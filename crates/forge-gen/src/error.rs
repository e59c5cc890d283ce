//! Error types for LLVM code generation.

use thiserror::Error;

/// Error type for code generation
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A language construct the backend does not translate yet
    #[error("not yet supported in code generation: {0}")]
    Unsupported(&'static str),

    /// A non-void function fell off the end of its body
    #[error("function '{0}' does not return a value on every path")]
    MissingReturn(String),

    /// Statements follow a terminating statement in the same block
    #[error("unreachable statement after a terminating statement")]
    UnreachableCode,

    /// `break`/`continue` with no enclosing loop
    #[error("'{0}' used outside of a loop")]
    OutsideLoop(&'static str),

    /// A type has no LLVM value representation
    #[error("cannot map type to LLVM: {0}")]
    TypeMapping(String),

    /// LLVM rejected a generated function
    #[error("LLVM verification failed for function '{0}'")]
    VerificationFailed(String),

    /// An LLVM builder operation failed
    #[error("LLVM builder operation failed: {0}")]
    Builder(#[from] inkwell::builder::BuilderError),

    /// The JIT engine could not be created or a symbol was missing
    #[error("JIT error: {0}")]
    Jit(String),
}

/// Result type alias for code generation operations
pub type Result<T> = std::result::Result<T, CodegenError>;
