//! forge-sem - Semantic analysis for Forge.
//!
//! Takes a freshly parsed tree and produces a fully annotated, type-checked
//! tree ready for codegen. Four passes run in a fixed order over the shared
//! traversal framework in [`visitor`]:
//!
//! 1. [`WellFormedHandler`] - structural invariants. Everything later
//!    relies on the shapes this pass guarantees.
//! 2. [`SymbolResolutionHandler`] - builds the scope chain and binds every
//!    `TypeSymbol`/`ValueSymbol` to its declaration.
//! 3. [`TypeResolutionHandler`] - computes `resolved_type` for every value
//!    and declaration.
//! 4. [`TypeValidationHandler`] - enforces operator, call, return, and
//!    cast rules on the resolved annotations.
//!
//! Each pass annotates the tree in place and keeps going past user errors
//! where it can, so one compile reports as much as possible. The driver
//! checks the sink between passes: a pass only runs when everything before
//! it was error-free.

pub mod resolve;
pub mod scope;
pub mod type_resolution;
pub mod type_validation;
pub mod types;
pub mod visitor;
pub mod well_formed;

pub use resolve::SymbolResolutionHandler;
pub use scope::{Scope, ScopeKind, ScopeSet, ShadowKind};
pub use type_resolution::TypeResolutionHandler;
pub use type_validation::TypeValidationHandler;
pub use types::{
    arithmetic_containing_type, casting_mode, concrete_type, integer_signedness, is_type_bool,
    is_type_float, is_type_integer, is_type_number, is_type_pointer, is_type_void,
    pointer_element_type, type_display, types_equal, CastingMode, TargetInfo,
};
pub use visitor::{Handler, Output, Pass, Visit, VisitorStatus};
pub use well_formed::WellFormedHandler;

use forge_par::ast::{NodeId, SyntaxTree};
use forge_util::Messages;

/// Run the full pass pipeline over one translation unit.
///
/// Passes run in order; a pass that leaves error diagnostics behind stops
/// the pipeline, since its successors assume its postconditions. The scope
/// set built during symbol resolution is returned for callers that need to
/// inspect name bindings afterwards.
pub fn analyze(
    tree: &mut SyntaxTree,
    root: NodeId,
    target: &TargetInfo,
    messages: &mut Messages,
) -> ScopeSet {
    let mut scopes = ScopeSet::new();

    {
        let mut pass = Pass::new();
        pass.add_handler(WellFormedHandler::new());
        pass.run(tree, root, messages);
    }
    if messages.has_errors() {
        return scopes;
    }

    {
        let mut pass = Pass::new();
        pass.add_handler(SymbolResolutionHandler::new(&mut scopes));
        pass.run(tree, root, messages);
    }
    if messages.has_errors() {
        return scopes;
    }

    {
        let mut pass = Pass::new();
        pass.add_handler(TypeResolutionHandler::new(*target));
        pass.run(tree, root, messages);
    }
    if messages.has_errors() {
        return scopes;
    }

    {
        let mut pass = Pass::new();
        pass.add_handler(TypeValidationHandler::new(*target));
        pass.run(tree, root, messages);
    }

    scopes
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_util::FileId;

    fn analyze_source(source: &str) -> Messages {
        let mut messages = Messages::new();
        let tokens = forge_lex::tokenize(source, FileId::DUMMY, &mut messages);
        let (mut tree, unit) = forge_par::parse(tokens, &mut messages);
        assert!(!messages.has_errors(), "parse failed: {source:?}");
        analyze(&mut tree, unit, &TargetInfo::default(), &mut messages);
        messages
    }

    #[test]
    fn test_pipeline_clean_program() {
        let messages = analyze_source(
            "let counter: i32 = 0;\n\
             func add(a: i32, b: i32) -> i32 { return a + b; }\n\
             func main() -> i32 { return add(counter, 2); }",
        );
        assert_eq!(messages.diagnostics().len(), 0, "{:?}", messages.diagnostics());
    }

    #[test]
    fn test_pipeline_stops_after_resolution_errors() {
        // The unknown symbol is reported once; type validation never runs
        // on the half-annotated tree, so no cascading diagnostics appear
        let messages = analyze_source("func f() -> i32 { return mystery + 1; }");
        assert_eq!(messages.error_count(), 1);
        assert_eq!(
            messages.diagnostics()[0].code.map(|c| c.as_str()),
            Some("ESC001".to_string())
        );
    }

    #[test]
    fn test_well_formedness_dominance(/* P2 */) {
        // A program that passes well-formedness never triggers ISY000 in
        // the later passes, even when it is full of type errors
        let messages = analyze_source(
            "func f(a: f32) -> i8 { if (a) { return a; } return -a; }",
        );
        assert!(messages.has_errors());
        assert!(messages
            .diagnostics()
            .iter()
            .all(|d| d.code.map(|c| c.as_str()) != Some("ISY000".to_string())));
    }
}
