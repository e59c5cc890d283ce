//! Lexical scopes for name resolution.
//!
//! A scope maps names to the declarations that introduce them and chains
//! to its parent; lookup walks the chain outward. Scopes live in a
//! [`ScopeSet`] arena and are attached to their owning block or
//! translation-unit node by [`ScopeId`].

use forge_par::ast::{NodeId, ScopeId};
use rustc_hash::FxHashMap;

/// What a scope belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The translation-unit scope (root of the chain)
    TranslationUnit,
    /// The synthetic scope holding a function's arguments
    FunctionArgs,
    /// An ordinary block scope
    Block,
}

/// What an insertion collided with, if anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowKind {
    /// The name was free
    None,
    /// A declaration with this name already exists in the same scope
    SameScope,
    /// A declaration with this name exists in an ancestor scope
    AncestorScope,
}

/// A single scope
#[derive(Debug)]
pub struct Scope {
    /// Bindings in this scope
    bindings: FxHashMap<String, NodeId>,
    /// Parent scope
    parent: Option<ScopeId>,
    /// Kind of scope
    kind: ScopeKind,
}

/// Arena of scopes for one translation unit
#[derive(Debug, Default)]
pub struct ScopeSet {
    scopes: Vec<Scope>,
}

impl ScopeSet {
    /// Create an empty scope set
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new scope chained to `parent`
    pub fn alloc(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            bindings: FxHashMap::default(),
            parent,
            kind,
        });
        id
    }

    /// Number of scopes
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns true if no scopes have been allocated
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// A scope's kind
    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes[scope.0 as usize].kind
    }

    /// A scope's parent
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0 as usize].parent
    }

    /// Re-chain a scope to a new parent
    pub fn set_parent(&mut self, scope: ScopeId, parent: Option<ScopeId>) {
        self.scopes[scope.0 as usize].parent = parent;
    }

    /// Record `name -> declaration` in `scope`, reporting what it shadows
    ///
    /// A same-scope collision keeps the first binding; an ancestor-scope
    /// collision shadows it for lookups through this scope.
    pub fn insert(&mut self, scope: ScopeId, name: impl Into<String>, decl: NodeId) -> ShadowKind {
        let name = name.into();

        if self.scopes[scope.0 as usize].bindings.contains_key(&name) {
            return ShadowKind::SameScope;
        }

        let shadows = match self.parent(scope) {
            Some(parent) if self.lookup(parent, &name).is_some() => ShadowKind::AncestorScope,
            _ => ShadowKind::None,
        };

        self.scopes[scope.0 as usize].bindings.insert(name, decl);
        shadows
    }

    /// Look a name up in `scope`, walking the parent chain
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<NodeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0 as usize];
            if let Some(&decl) = scope.bindings.get(name) {
                return Some(decl);
            }
            current = scope.parent;
        }
        None
    }

    /// Look a name up in `scope` only, ignoring parents
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<NodeId> {
        self.scopes[scope.0 as usize].bindings.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_par::ast::{NodeKind, SyntaxTree};
    use forge_util::Span;

    fn decl(tree: &mut SyntaxTree, name: &str) -> NodeId {
        tree.alloc(
            Span::DUMMY,
            NodeKind::DeclarationVariable {
                name: name.into(),
                ty: None,
                initial_value: None,
                resolved_type: None,
            },
        )
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut tree = SyntaxTree::new();
        let x = decl(&mut tree, "x");

        let mut scopes = ScopeSet::new();
        let root = scopes.alloc(ScopeKind::TranslationUnit, None);
        assert_eq!(scopes.insert(root, "x", x), ShadowKind::None);
        assert_eq!(scopes.lookup(root, "x"), Some(x));
        assert_eq!(scopes.lookup(root, "y"), None);
    }

    #[test]
    fn test_lookup_walks_parent_chain() {
        let mut tree = SyntaxTree::new();
        let x = decl(&mut tree, "x");

        let mut scopes = ScopeSet::new();
        let root = scopes.alloc(ScopeKind::TranslationUnit, None);
        let args = scopes.alloc(ScopeKind::FunctionArgs, Some(root));
        let block = scopes.alloc(ScopeKind::Block, Some(args));

        scopes.insert(root, "x", x);
        assert_eq!(scopes.lookup(block, "x"), Some(x));
        assert_eq!(scopes.lookup_local(block, "x"), None);
    }

    #[test]
    fn test_same_scope_collision_keeps_first() {
        let mut tree = SyntaxTree::new();
        let first = decl(&mut tree, "x");
        let second = decl(&mut tree, "x");

        let mut scopes = ScopeSet::new();
        let root = scopes.alloc(ScopeKind::TranslationUnit, None);
        assert_eq!(scopes.insert(root, "x", first), ShadowKind::None);
        assert_eq!(scopes.insert(root, "x", second), ShadowKind::SameScope);
        assert_eq!(scopes.lookup(root, "x"), Some(first));
    }

    #[test]
    fn test_ancestor_shadowing_detected() {
        let mut tree = SyntaxTree::new();
        let outer = decl(&mut tree, "x");
        let inner = decl(&mut tree, "x");

        let mut scopes = ScopeSet::new();
        let root = scopes.alloc(ScopeKind::TranslationUnit, None);
        let block = scopes.alloc(ScopeKind::Block, Some(root));

        scopes.insert(root, "x", outer);
        assert_eq!(scopes.insert(block, "x", inner), ShadowKind::AncestorScope);
        // Inner scope sees the shadowing declaration, outer is untouched
        assert_eq!(scopes.lookup(block, "x"), Some(inner));
        assert_eq!(scopes.lookup(root, "x"), Some(outer));
    }

    #[test]
    fn test_kind_and_parent_access() {
        let mut scopes = ScopeSet::new();
        let root = scopes.alloc(ScopeKind::TranslationUnit, None);
        let block = scopes.alloc(ScopeKind::Block, Some(root));
        assert_eq!(scopes.kind(root), ScopeKind::TranslationUnit);
        assert_eq!(scopes.kind(block), ScopeKind::Block);
        assert_eq!(scopes.parent(block), Some(root));
        assert_eq!(scopes.parent(root), None);
    }
}
