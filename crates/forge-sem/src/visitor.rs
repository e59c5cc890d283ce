//! Tree traversal framework.
//!
//! A [`Pass`] walks the syntax tree depth-first, applying an ordered list
//! of [`Handler`]s. Every handler gets a pre-order `on_enter` and a
//! post-order `on_leave` at each node, receiving a [`Visit`] with the
//! current node, the ancestor stack, and the diagnostic sink. Children are
//! visited in declared field order.
//!
//! Handlers usually implement the per-kind callbacks
//! (`on_leave_value_binary` and friends); the generic `on_enter`/`on_leave`
//! defaults dispatch on the node's discriminator. The dispatch match is
//! exhaustive over the closed kind set, so adding a node kind without a
//! branch fails to compile.

use forge_par::ast::{Kind, NodeId, NodeKind, SyntaxTree};
use forge_util::{Messages, Span};

/// What a handler wants the traversal to do next
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VisitorStatus {
    /// Keep walking
    #[default]
    Continue,
    /// Do not descend into this node's children
    SkipChildren,
    /// Stop the whole traversal; remaining siblings are not visited
    HaltTraversal,
}

/// Handler callback result
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub status: VisitorStatus,
}

impl Output {
    /// Keep walking
    pub const CONTINUE: Output = Output {
        status: VisitorStatus::Continue,
    };

    pub fn new(status: VisitorStatus) -> Self {
        Self { status }
    }
}

/// Handler input for one node visit
pub struct Visit<'t, 'm> {
    /// The tree being walked; the current node may be mutated
    pub tree: &'t mut SyntaxTree,
    /// The node being visited
    pub node: NodeId,
    /// Ancestors of the current node, most recent last
    pub stack: &'t [NodeId],
    /// Diagnostic sink
    pub messages: &'m mut Messages,
}

impl Visit<'_, '_> {
    /// The current node's payload
    pub fn kind(&self) -> &NodeKind {
        self.tree.kind(self.node)
    }

    /// The current node's span
    pub fn span(&self) -> Span {
        self.tree.span(self.node)
    }

    /// The immediate parent, if any
    pub fn parent(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    /// Walk the ancestor stack upward for the nearest node matching the
    /// predicate.
    pub fn try_get_directly_surrounding(
        &self,
        predicate: impl Fn(&NodeKind) -> bool,
    ) -> Option<NodeId> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|&id| predicate(self.tree.kind(id)))
    }

    /// The nearest enclosing function declaration
    pub fn surrounding_function(&self) -> Option<NodeId> {
        self.try_get_directly_surrounding(|kind| {
            matches!(kind, NodeKind::DeclarationFunction { .. })
        })
    }
}

macro_rules! define_handler {
    ($( $kind:ident => $enter:ident / $leave:ident; )*) => {
        /// A pluggable tree-walk participant
        ///
        /// The generic `on_enter`/`on_leave` dispatch to the per-kind
        /// callbacks below, all of which default to a no-op `Continue`.
        pub trait Handler {
            /// Pre-order callback; dispatches per kind by default
            fn on_enter(&mut self, visit: &mut Visit<'_, '_>) -> Output {
                match visit.kind().tag() {
                    $( Kind::$kind => self.$enter(visit), )*
                }
            }

            /// Post-order callback; dispatches per kind by default
            fn on_leave(&mut self, visit: &mut Visit<'_, '_>) -> Output {
                match visit.kind().tag() {
                    $( Kind::$kind => self.$leave(visit), )*
                }
            }

            $(
                #[allow(unused_variables)]
                fn $enter(&mut self, visit: &mut Visit<'_, '_>) -> Output {
                    Output::CONTINUE
                }

                #[allow(unused_variables)]
                fn $leave(&mut self, visit: &mut Visit<'_, '_>) -> Output {
                    Output::CONTINUE
                }
            )*
        }
    };
}

define_handler! {
    TypeBasic => on_enter_type_basic / on_leave_type_basic;
    TypeWithBitWidth => on_enter_type_with_bit_width / on_leave_type_with_bit_width;
    TypeSymbol => on_enter_type_symbol / on_leave_type_symbol;
    TypeUnary => on_enter_type_unary / on_leave_type_unary;
    TypeFunction => on_enter_type_function / on_leave_type_function;
    TypeStructured => on_enter_type_structured / on_leave_type_structured;
    ValueLiteralBool => on_enter_value_literal_bool / on_leave_value_literal_bool;
    ValueLiteralNumber => on_enter_value_literal_number / on_leave_value_literal_number;
    ValueSymbol => on_enter_value_symbol / on_leave_value_symbol;
    ValueUnary => on_enter_value_unary / on_leave_value_unary;
    ValueBinary => on_enter_value_binary / on_leave_value_binary;
    ValueCall => on_enter_value_call / on_leave_value_call;
    ValueCast => on_enter_value_cast / on_leave_value_cast;
    StatementBasic => on_enter_statement_basic / on_leave_statement_basic;
    StatementValue => on_enter_statement_value / on_leave_statement_value;
    StatementDeclaration => on_enter_statement_declaration / on_leave_statement_declaration;
    StatementBlock => on_enter_statement_block / on_leave_statement_block;
    StatementIf => on_enter_statement_if / on_leave_statement_if;
    StatementWhile => on_enter_statement_while / on_leave_statement_while;
    DeclarationVariable => on_enter_declaration_variable / on_leave_declaration_variable;
    DeclarationFunction => on_enter_declaration_function / on_leave_declaration_function;
    DeclarationTypeAlias => on_enter_declaration_type_alias / on_leave_declaration_type_alias;
    DeclarationStructuredType => on_enter_declaration_structured_type / on_leave_declaration_structured_type;
    DeclarationNamespace => on_enter_declaration_namespace / on_leave_declaration_namespace;
    TranslationUnit => on_enter_translation_unit / on_leave_translation_unit;
}

/// One complete traversal of the tree with an ordered handler list
///
/// Handlers run in registration order at every node. A `SkipChildren` from
/// any handler's `on_enter` skips the subtree (the node's own `on_leave`
/// callbacks still run); a `HaltTraversal` stops the walk outright.
pub struct Pass<'h> {
    handlers: Vec<Box<dyn Handler + 'h>>,
}

impl<'h> Pass<'h> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler; order of registration is order of execution.
    pub fn add_handler(&mut self, handler: impl Handler + 'h) -> &mut Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Walk the tree rooted at `root`.
    pub fn run(
        &mut self,
        tree: &mut SyntaxTree,
        root: NodeId,
        messages: &mut Messages,
    ) -> VisitorStatus {
        let mut stack = Vec::new();
        self.walk(tree, root, &mut stack, messages)
    }

    fn walk(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        stack: &mut Vec<NodeId>,
        messages: &mut Messages,
    ) -> VisitorStatus {
        let mut skip_children = false;

        for handler in &mut self.handlers {
            let mut visit = Visit {
                tree: &mut *tree,
                node,
                stack: stack.as_slice(),
                messages: &mut *messages,
            };
            match handler.on_enter(&mut visit).status {
                VisitorStatus::Continue => {}
                VisitorStatus::SkipChildren => skip_children = true,
                VisitorStatus::HaltTraversal => return VisitorStatus::HaltTraversal,
            }
        }

        if !skip_children {
            let children = tree.children(node);
            stack.push(node);
            for child in children {
                if self.walk(tree, child, stack, messages) == VisitorStatus::HaltTraversal {
                    stack.pop();
                    return VisitorStatus::HaltTraversal;
                }
            }
            stack.pop();
        }

        for handler in &mut self.handlers {
            let mut visit = Visit {
                tree: &mut *tree,
                node,
                stack: stack.as_slice(),
                messages: &mut *messages,
            };
            if handler.on_leave(&mut visit).status == VisitorStatus::HaltTraversal {
                return VisitorStatus::HaltTraversal;
            }
        }

        VisitorStatus::Continue
    }
}

impl Default for Pass<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_par::ast::{StatementBasicKind, TypeBasicKind};
    use forge_util::Span;

    /// Records the order in which nodes are visited
    struct Recorder<'a> {
        enters: &'a mut Vec<NodeId>,
        leaves: &'a mut Vec<NodeId>,
        skip_at: Option<NodeId>,
        halt_at: Option<NodeId>,
    }

    impl Handler for Recorder<'_> {
        fn on_enter(&mut self, visit: &mut Visit<'_, '_>) -> Output {
            self.enters.push(visit.node);
            if self.skip_at == Some(visit.node) {
                return Output::new(VisitorStatus::SkipChildren);
            }
            if self.halt_at == Some(visit.node) {
                return Output::new(VisitorStatus::HaltTraversal);
            }
            Output::CONTINUE
        }

        fn on_leave(&mut self, visit: &mut Visit<'_, '_>) -> Output {
            self.leaves.push(visit.node);
            Output::CONTINUE
        }
    }

    fn small_tree() -> (SyntaxTree, NodeId, NodeId, NodeId) {
        // block { continue; break; }
        let mut tree = SyntaxTree::new();
        let first = tree.alloc(
            Span::DUMMY,
            NodeKind::StatementBasic {
                basic_kind: StatementBasicKind::Continue,
            },
        );
        let second = tree.alloc(
            Span::DUMMY,
            NodeKind::StatementBasic {
                basic_kind: StatementBasicKind::Break,
            },
        );
        let block = tree.alloc(
            Span::DUMMY,
            NodeKind::StatementBlock {
                statements: vec![first, second],
                scope: None,
            },
        );
        (tree, block, first, second)
    }

    fn record(
        tree: &mut SyntaxTree,
        root: NodeId,
        skip_at: Option<NodeId>,
        halt_at: Option<NodeId>,
    ) -> (VisitorStatus, Vec<NodeId>, Vec<NodeId>) {
        let mut enters = Vec::new();
        let mut leaves = Vec::new();
        let mut messages = Messages::new();
        let status = {
            let mut pass = Pass::new();
            pass.add_handler(Recorder {
                enters: &mut enters,
                leaves: &mut leaves,
                skip_at,
                halt_at,
            });
            pass.run(tree, root, &mut messages)
        };
        (status, enters, leaves)
    }

    #[test]
    fn test_enter_preorder_leave_postorder() {
        let (mut tree, block, first, second) = small_tree();
        let (status, enters, leaves) = record(&mut tree, block, None, None);

        assert_eq!(status, VisitorStatus::Continue);
        assert_eq!(enters, vec![block, first, second]);
        assert_eq!(leaves, vec![first, second, block]);
    }

    #[test]
    fn test_skip_children() {
        let (mut tree, block, ..) = small_tree();
        let (_, enters, leaves) = record(&mut tree, block, Some(block), None);

        // Children never visited, but the block's own leave still runs
        assert_eq!(enters, vec![block]);
        assert_eq!(leaves, vec![block]);
    }

    #[test]
    fn test_halt_stops_siblings() {
        let (mut tree, block, first, _second) = small_tree();
        let (status, enters, leaves) = record(&mut tree, block, None, Some(first));

        assert_eq!(status, VisitorStatus::HaltTraversal);
        assert_eq!(enters, vec![block, first]);
        assert!(leaves.is_empty());
    }

    #[test]
    fn test_stack_holds_ancestors() {
        struct StackChecker {
            expected_parent: NodeId,
        }
        impl Handler for StackChecker {
            fn on_enter(&mut self, visit: &mut Visit<'_, '_>) -> Output {
                if matches!(visit.kind(), NodeKind::StatementBasic { .. }) {
                    assert_eq!(visit.parent(), Some(self.expected_parent));
                }
                Output::CONTINUE
            }
        }

        let (mut tree, block, ..) = small_tree();
        let mut messages = Messages::new();
        let mut pass = Pass::new();
        pass.add_handler(StackChecker {
            expected_parent: block,
        });
        pass.run(&mut tree, block, &mut messages);
    }

    #[test]
    fn test_surrounding_function_lookup() {
        // func f() -> void { return; }
        let mut tree = SyntaxTree::new();
        let ret = tree.alloc(
            Span::DUMMY,
            NodeKind::StatementBasic {
                basic_kind: StatementBasicKind::ReturnVoid,
            },
        );
        let body = tree.alloc(
            Span::DUMMY,
            NodeKind::StatementBlock {
                statements: vec![ret],
                scope: None,
            },
        );
        let void_ty = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeBasic {
                basic_kind: TypeBasicKind::Void,
                is_const: false,
            },
        );
        let func = tree.alloc(
            Span::DUMMY,
            NodeKind::DeclarationFunction {
                name: "f".into(),
                args: vec![],
                return_type: Some(void_ty),
                body: Some(body),
                resolved_type: None,
            },
        );

        struct FunctionFinder {
            expected: NodeId,
        }
        impl Handler for FunctionFinder {
            fn on_leave_statement_basic(&mut self, visit: &mut Visit<'_, '_>) -> Output {
                assert_eq!(visit.surrounding_function(), Some(self.expected));
                Output::CONTINUE
            }
        }

        let mut messages = Messages::new();
        let mut pass = Pass::new();
        pass.add_handler(FunctionFinder { expected: func });
        pass.run(&mut tree, func, &mut messages);
    }
}
