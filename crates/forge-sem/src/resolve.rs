//! Symbol resolution.
//!
//! Two sub-phases driven by the same traversal:
//!
//! - **Declare**: scopes are created and linked when a scope-owning node
//!   is entered. The translation unit collects all of its top-level
//!   declarations up front (so functions can call each other regardless of
//!   order); block-level declarations become visible at their statement,
//!   C-style. A function's arguments land in a synthetic scope between
//!   the enclosing scope and the body block's scope.
//! - **Resolve**: every `TypeSymbol`/`ValueSymbol` is looked up on leave,
//!   walking the scope chain outward, and bound to its declaration.
//!
//! Member names (the right side of `.`) are not scope lookups; they are
//! resolved against the left side's type during type resolution.

use forge_par::ast::{BinaryOperator, NodeId, NodeKind, ScopeId};
use forge_util::{DiagnosticBuilder, DiagnosticCode};

use crate::scope::{ScopeKind, ScopeSet, ShadowKind};
use crate::visitor::{Handler, Output, Visit};

/// Pass 2: binds symbols to declarations
pub struct SymbolResolutionHandler<'s> {
    scopes: &'s mut ScopeSet,
}

impl<'s> SymbolResolutionHandler<'s> {
    pub fn new(scopes: &'s mut ScopeSet) -> Self {
        Self { scopes }
    }

    /// The scope of the nearest scope-owning ancestor
    fn enclosing_scope(&self, visit: &Visit<'_, '_>) -> Option<ScopeId> {
        visit
            .stack
            .iter()
            .rev()
            .find_map(|&id| visit.tree.scope_of(id))
    }

    /// Insert a block-level declaration into the enclosing block scope
    fn declare_in_block(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        // Only declarations introduced by a declaration statement live in
        // block scopes; top-level declarations were collected when the
        // translation unit was entered, and namespace/struct members are
        // reached through their owner.
        let Some(parent) = visit.parent() else {
            return Output::CONTINUE;
        };
        if !matches!(
            visit.tree.kind(parent),
            NodeKind::StatementDeclaration { .. }
        ) {
            return Output::CONTINUE;
        }

        let Some(scope) = self.enclosing_scope(visit) else {
            return Output::CONTINUE;
        };
        let Some(name) = visit.tree.name_of(visit.node).map(str::to_string) else {
            return Output::CONTINUE;
        };

        match self.scopes.insert(scope, name.clone(), visit.node) {
            ShadowKind::None => {}
            ShadowKind::SameScope => {
                let span = visit.span();
                DiagnosticBuilder::error(format!(
                    "a declaration named '{name}' already exists in this scope"
                ))
                .code(DiagnosticCode::DUPLICATE_NAME)
                .span(span)
                .emit(visit.messages);
            }
            ShadowKind::AncestorScope => {
                let span = visit.span();
                DiagnosticBuilder::warning(format!(
                    "declaration of '{name}' shadows an outer declaration"
                ))
                .code(DiagnosticCode::SHADOWS_OUTER)
                .span(span)
                .emit(visit.messages);
            }
        }

        Output::CONTINUE
    }

    /// Resolve a symbol name against the scope chain
    fn resolve_symbol(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        // Already bound (e.g. the pass ran before): nothing to do
        if visit.tree.referenced_declaration_of(visit.node).is_some() {
            return Output::CONTINUE;
        }

        let Some(name) = visit.tree.name_of(visit.node).map(str::to_string) else {
            return Output::CONTINUE;
        };

        let Some(scope) = self.enclosing_scope(visit) else {
            return Output::CONTINUE;
        };

        match self.scopes.lookup(scope, &name) {
            Some(declaration) => {
                visit.tree.set_referenced_declaration(visit.node, declaration);
            }
            None => {
                let span = visit.span();
                DiagnosticBuilder::error(format!("use of undeclared symbol '{name}'"))
                    .code(DiagnosticCode::SYMBOL_NOT_FOUND)
                    .span(span)
                    .emit(visit.messages);
            }
        }

        Output::CONTINUE
    }

    /// Is this node the member-name side of a `.` expression?
    fn is_member_access_rhs(visit: &Visit<'_, '_>) -> bool {
        let Some(parent) = visit.parent() else {
            return false;
        };
        matches!(
            visit.tree.kind(parent),
            NodeKind::ValueBinary {
                operator: BinaryOperator::MemberAccess,
                rhs: Some(rhs),
                ..
            } if *rhs == visit.node
        )
    }
}

impl Handler for SymbolResolutionHandler<'_> {
    fn on_enter_translation_unit(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        // Re-running on a resolved tree reuses the existing scope
        if visit.tree.scope_of(visit.node).is_some() {
            return Output::CONTINUE;
        }

        let scope = self.scopes.alloc(ScopeKind::TranslationUnit, None);
        visit.tree.set_scope(visit.node, scope);

        // Collect all top-level declarations before anything resolves, so
        // order between them does not matter
        let NodeKind::TranslationUnit { declarations, .. } = visit.tree.kind(visit.node) else {
            unreachable!()
        };
        let declarations = declarations.clone();

        for declaration in declarations {
            let Some(name) = visit.tree.name_of(declaration).map(str::to_string) else {
                continue;
            };
            if self.scopes.insert(scope, name.clone(), declaration) == ShadowKind::SameScope {
                let span = visit.tree.span(declaration);
                DiagnosticBuilder::error(format!(
                    "a declaration named '{name}' already exists in this scope"
                ))
                .code(DiagnosticCode::DUPLICATE_NAME)
                .span(span)
                .emit(visit.messages);
            }
        }

        Output::CONTINUE
    }

    fn on_enter_statement_block(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        if visit.tree.scope_of(visit.node).is_some() {
            return Output::CONTINUE;
        }

        let enclosing = self.enclosing_scope(visit);

        // The outermost block of a function gets an extra scope holding
        // the argument declarations, chained between the enclosing scope
        // and the block's own scope
        let function = visit.parent().filter(|&parent| {
            matches!(
                visit.tree.kind(parent),
                NodeKind::DeclarationFunction { .. }
            )
        });

        let parent_scope = match function {
            Some(function) => {
                let args_scope = self.scopes.alloc(ScopeKind::FunctionArgs, enclosing);
                let NodeKind::DeclarationFunction { args, .. } = visit.tree.kind(function) else {
                    unreachable!()
                };
                let args = args.clone();
                for arg in args {
                    let Some(name) = visit.tree.name_of(arg).map(str::to_string) else {
                        continue;
                    };
                    // Arguments may shadow outer names silently
                    if self.scopes.insert(args_scope, name.clone(), arg)
                        == ShadowKind::SameScope
                    {
                        let span = visit.tree.span(arg);
                        DiagnosticBuilder::error(format!(
                            "a declaration named '{name}' already exists in this scope"
                        ))
                        .code(DiagnosticCode::DUPLICATE_NAME)
                        .span(span)
                        .emit(visit.messages);
                    }
                }
                Some(args_scope)
            }
            None => enclosing,
        };

        let block_scope = self.scopes.alloc(ScopeKind::Block, parent_scope);
        visit.tree.set_scope(visit.node, block_scope);

        Output::CONTINUE
    }

    fn on_enter_declaration_variable(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        self.declare_in_block(visit)
    }

    fn on_enter_declaration_function(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        self.declare_in_block(visit)
    }

    fn on_enter_declaration_type_alias(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        self.declare_in_block(visit)
    }

    fn on_enter_declaration_structured_type(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        self.declare_in_block(visit)
    }

    fn on_enter_declaration_namespace(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        self.declare_in_block(visit)
    }

    fn on_leave_type_symbol(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        self.resolve_symbol(visit)
    }

    fn on_leave_value_symbol(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        // The right side of `.` names a member, not a scope entry
        if Self::is_member_access_rhs(visit) {
            return Output::CONTINUE;
        }
        self.resolve_symbol(visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::Pass;
    use forge_par::ast::SyntaxTree;
    use forge_util::{FileId, Messages};

    fn resolve(source: &str) -> (SyntaxTree, NodeId, ScopeSet, Messages) {
        let mut messages = Messages::new();
        let tokens = forge_lex::tokenize(source, FileId::DUMMY, &mut messages);
        let (mut tree, unit) = forge_par::parse(tokens, &mut messages);
        assert!(!messages.has_errors(), "parse failed: {source:?}");

        let mut scopes = ScopeSet::new();
        {
            let mut pass = Pass::new();
            pass.add_handler(SymbolResolutionHandler::new(&mut scopes));
            pass.run(&mut tree, unit, &mut messages);
        }
        (tree, unit, scopes, messages)
    }

    fn find_value_symbol(tree: &SyntaxTree, name: &str) -> NodeId {
        tree.ids()
            .find(|&id| {
                matches!(tree.kind(id), NodeKind::ValueSymbol { name: n, .. } if n == name)
            })
            .expect("symbol not found in tree")
    }

    #[test]
    fn test_argument_resolves() {
        let (tree, _, _, messages) = resolve("func f(a: u8) -> u8 { return a; }");
        assert!(!messages.has_errors());

        let a = find_value_symbol(&tree, "a");
        let decl = tree.referenced_declaration_of(a).expect("should resolve");
        assert!(matches!(
            tree.kind(decl),
            NodeKind::DeclarationVariable { name, .. } if name == "a"
        ));
    }

    #[test]
    fn test_local_variable_resolves() {
        let (tree, _, _, messages) =
            resolve("func f() -> i32 { let x: i32 = 1; return x; }");
        assert!(!messages.has_errors());
        let x = find_value_symbol(&tree, "x");
        assert!(tree.referenced_declaration_of(x).is_some());
    }

    #[test]
    fn test_forward_function_reference_resolves() {
        // g is declared after f but is visible inside it
        let (tree, _, _, messages) =
            resolve("func f() -> i32 { return g(); }\nfunc g() -> i32 { return 1; }");
        assert!(!messages.has_errors());
        let g = find_value_symbol(&tree, "g");
        let decl = tree.referenced_declaration_of(g).expect("should resolve");
        assert!(matches!(
            tree.kind(decl),
            NodeKind::DeclarationFunction { name, .. } if name == "g"
        ));
    }

    #[test]
    fn test_unknown_symbol_reports_esc001() {
        let (tree, _, _, messages) = resolve("func f() -> i32 { return nope; }");
        assert_eq!(messages.error_count(), 1);
        assert_eq!(
            messages.diagnostics()[0].code.map(|c| c.as_str()),
            Some("ESC001".to_string())
        );
        // The symbol stays unbound
        let nope = find_value_symbol(&tree, "nope");
        assert_eq!(tree.referenced_declaration_of(nope), None);
    }

    #[test]
    fn test_use_before_declaration_in_block_fails() {
        let (_, _, _, messages) =
            resolve("func f() -> i32 { let y: i32 = x; let x: i32 = 1; return y; }");
        assert_eq!(messages.error_count(), 1);
        assert_eq!(
            messages.diagnostics()[0].code.map(|c| c.as_str()),
            Some("ESC001".to_string())
        );
    }

    #[test]
    fn test_duplicate_in_same_scope_reports_esc003() {
        let (_, _, _, messages) =
            resolve("func f() -> void { let x: i32 = 1; let x: i32 = 2; }");
        assert_eq!(messages.error_count(), 1);
        assert_eq!(
            messages.diagnostics()[0].code.map(|c| c.as_str()),
            Some("ESC003".to_string())
        );
    }

    #[test]
    fn test_shadowing_outer_scope_warns() {
        let (_, _, _, messages) =
            resolve("let x: i32 = 1;\nfunc f() -> void { let x: i32 = 2; }");
        assert!(!messages.has_errors());
        assert_eq!(messages.warning_count(), 1);
        assert_eq!(
            messages.diagnostics()[0].code.map(|c| c.as_str()),
            Some("WSC001".to_string())
        );
    }

    #[test]
    fn test_argument_shadowing_global_is_silent() {
        let (_, _, _, messages) = resolve("let a: i32 = 1;\nfunc f(a: i32) -> void {}");
        assert!(!messages.has_errors());
        assert_eq!(messages.warning_count(), 0);
    }

    #[test]
    fn test_member_name_is_not_a_scope_lookup() {
        // `y` only exists as a member name; resolution must not complain
        // about it (type resolution deals with members)
        let (_, _, _, messages) =
            resolve("struct P { let y: i32; }\nfunc f(p: P) -> void { p.y; }");
        assert!(!messages.has_errors());
    }

    #[test]
    fn test_scope_chain_reaches_symbol(/* P5 */) {
        let (tree, unit, scopes, messages) =
            resolve("let g: i32 = 1;\nfunc f() -> i32 { let l: i32 = 2; return g + l; }");
        assert!(!messages.has_errors());

        // Find the innermost block scope
        let block_scope = tree
            .ids()
            .filter_map(|id| match tree.kind(id) {
                NodeKind::StatementBlock { scope, .. } => *scope,
                _ => None,
            })
            .next()
            .expect("block should own a scope");

        // Both symbols are findable from the innermost scope by walking
        // the parent chain
        for name in ["g", "l"] {
            let symbol = find_value_symbol(&tree, name);
            let bound = tree.referenced_declaration_of(symbol).unwrap();
            assert_eq!(scopes.lookup(block_scope, name), Some(bound));
        }

        // And the chain bottoms out at the translation-unit scope
        let tu_scope = tree.scope_of(unit).unwrap();
        let mut current = Some(block_scope);
        let mut reached_tu = false;
        while let Some(scope) = current {
            if scope == tu_scope {
                reached_tu = true;
            }
            current = scopes.parent(scope);
        }
        assert!(reached_tu);
    }

    #[test]
    fn test_resolution_is_idempotent(/* P1 */) {
        let source = "let g: i32 = 1;\nfunc f(a: i32) -> i32 { return g + a; }";
        let (mut tree, unit, mut scopes, messages) = {
            let mut messages = Messages::new();
            let tokens = forge_lex::tokenize(source, FileId::DUMMY, &mut messages);
            let (mut tree, unit) = forge_par::parse(tokens, &mut messages);
            let mut scopes = ScopeSet::new();
            {
                let mut pass = Pass::new();
                pass.add_handler(SymbolResolutionHandler::new(&mut scopes));
                pass.run(&mut tree, unit, &mut messages);
            }
            (tree, unit, scopes, messages)
        };
        assert!(!messages.has_errors());

        let bindings_before: Vec<_> = tree
            .ids()
            .map(|id| tree.referenced_declaration_of(id))
            .collect();
        let scope_count_before = scopes.len();

        // Run the pass a second time on the already-resolved tree
        let mut messages = Messages::new();
        {
            let mut pass = Pass::new();
            pass.add_handler(SymbolResolutionHandler::new(&mut scopes));
            pass.run(&mut tree, unit, &mut messages);
        }

        assert_eq!(messages.diagnostics().len(), 0);
        assert_eq!(scopes.len(), scope_count_before);
        let bindings_after: Vec<_> = tree
            .ids()
            .map(|id| tree.referenced_declaration_of(id))
            .collect();
        assert_eq!(bindings_before, bindings_after);
    }
}
