//! Stable diagnostic codes.
//!
//! Every diagnostic the compiler emits carries a [`DiagnosticCode`] so that
//! messages can be referenced in documentation and matched in tests. Codes
//! follow the format `{prefix}{number:03}` where the prefix encodes the
//! subsystem and severity class:
//!
//! - `ISY` internal (broken structural invariants)
//! - `ESY` / `WSY` syntax errors / warnings
//! - `ESC` / `WSC` scope errors / warnings
//! - `ETY` type errors

/// A unique code identifying a diagnostic message
///
/// Codes pair a short renderable form (`"ETY005"`) with a stable dotted
/// name (`"type.unable_to_implicitly_cast"`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    /// The subsystem prefix (e.g. "ETY", "WSY")
    pub prefix: &'static str,
    /// The numeric identifier
    pub number: u32,
    /// Stable dotted name
    pub name: &'static str,
}

impl DiagnosticCode {
    /// Create a new diagnostic code
    #[inline]
    pub const fn new(prefix: &'static str, number: u32, name: &'static str) -> Self {
        Self {
            prefix,
            number,
            name,
        }
    }

    /// Get the full code string (e.g. "ETY005")
    pub fn as_str(&self) -> String {
        format!("{}{:03}", self.prefix, self.number)
    }

    /// Get the stable dotted name (e.g. "type.unexpected_type")
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    /// ISY000: a node failed a structural well-formedness check
    pub const NOT_WELL_FORMED: Self = Self::new("ISY", 0, "internal.not_well_formed");

    // =========================================================================
    // SYNTAX
    // =========================================================================

    /// ESY001: a block comment is never closed
    pub const UNCLOSED_BLOCK_COMMENT: Self = Self::new("ESY", 1, "syntax.unclosed_block_comment");
    /// ESY002: a character that starts no token
    pub const UNEXPECTED_CHARACTER: Self = Self::new("ESY", 2, "syntax.unexpected_character");
    /// ESY003: the parser found a token it cannot use here
    pub const UNEXPECTED_TOKEN: Self = Self::new("ESY", 3, "syntax.unexpected_token");
    /// WSY001: a literal was truncated to fit its type
    pub const VALUE_DOES_NOT_FIT_IN_TYPE: Self =
        Self::new("WSY", 1, "literal.value_does_not_fit_in_type");

    // =========================================================================
    // SCOPE
    // =========================================================================

    /// ESC001: a name that resolves to no declaration
    pub const SYMBOL_NOT_FOUND: Self = Self::new("ESC", 1, "scope.symbol_not_found");
    /// ESC002: a structured-type member clashes with an inherited one
    pub const MEMBER_SHADOWS_INHERITED: Self =
        Self::new("ESC", 2, "scope.member_shadows_inherited");
    /// ESC003: two declarations with the same name in one scope
    pub const DUPLICATE_NAME: Self = Self::new("ESC", 3, "scope.duplicate_name");
    /// WSC001: a declaration shadows one from an enclosing scope
    pub const SHADOWS_OUTER: Self = Self::new("WSC", 1, "scope.shadows_outer");

    // =========================================================================
    // TYPES
    // =========================================================================

    /// ETY001: a type could not be computed for a node
    pub const UNABLE_TO_RESOLVE: Self = Self::new("ETY", 1, "type.unable_to_resolve");
    /// ETY002: pointers to void are not allowed
    pub const NO_VOID_POINTERS: Self = Self::new("ETY", 2, "type.no_void_pointers");
    /// ETY003: pointers to functions are not allowed
    pub const NO_FUNCTION_POINTERS: Self = Self::new("ETY", 3, "type.no_function_pointers");
    /// ETY004: an operand has the wrong kind of type
    pub const UNEXPECTED_TYPE: Self = Self::new("ETY", 4, "type.unexpected_type");
    /// ETY005: an implicit conversion is not permitted here
    pub const UNABLE_TO_IMPLICITLY_CAST: Self =
        Self::new("ETY", 5, "type.unable_to_implicitly_cast");
    /// ETY006: not even an explicit cast can convert these types
    pub const ILLEGAL_CAST: Self = Self::new("ETY", 6, "type.illegal_cast");
    /// ETY007: call arity does not match the callee
    pub const INCORRECT_NUMBER_OF_ARGS: Self =
        Self::new("ETY", 7, "type.incorrect_number_of_args");
    /// ETY008: callee is not a function
    pub const CANNOT_CALL_NON_FUNCTION: Self =
        Self::new("ETY", 8, "type.cannot_call_non_function");
    /// ETY009: bare `return` in a non-void function
    pub const NON_VOID_FUNCTION_MUST_RETURN_VALUE: Self =
        Self::new("ETY", 9, "type.non_void_function_must_return_value");
    /// ETY010: `return expr` in a void function
    pub const VOID_FUNCTION_CANNOT_RETURN_VALUE: Self =
        Self::new("ETY", 10, "type.void_function_cannot_return_value");
    /// ETY011: member access names no member of the structured type
    pub const NO_MEMBER_WITH_NAME: Self = Self::new("ETY", 11, "type.no_member_with_name");
    /// ETY012: a namespace name used where a value is expected
    pub const NAMESPACE_USED_AS_VALUE: Self = Self::new("ETY", 12, "type.namespace_used_as_value");
    /// ETY013: a namespace declared inside a structured type
    pub const NAMESPACE_WITHIN_STRUCTURED_TYPE: Self =
        Self::new("ETY", 13, "type.namespace_within_structured_type");
}

impl std::fmt::Debug for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DiagnosticCode({} {})", self.as_str(), self.name)
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
