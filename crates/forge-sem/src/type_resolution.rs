//! Type resolution.
//!
//! Computes the `resolved_type` annotation for every value and declaration
//! on leave, so a node's operands are always resolved before the node
//! itself. Unresolvable nodes are left unannotated when the cause was
//! already reported (an unknown symbol, say); only genuinely new problems
//! produce diagnostics here.

use indexmap::IndexMap;
use forge_par::ast::{
    BinaryOperator, NodeId, NodeKind, SyntaxTree, TypeBasicKind, TypeUnaryKind, UnaryOperator,
};
use forge_util::{ice, DiagnosticBuilder, DiagnosticCode, Span};

use crate::types::{
    arithmetic_containing_type, concrete_type, is_type_pointer, pointer_element_type, TargetInfo,
};
use crate::visitor::{Handler, Output, Visit};

/// Pass 3: attaches `resolved_type` annotations
pub struct TypeResolutionHandler {
    target: TargetInfo,
}

impl TypeResolutionHandler {
    pub fn new(target: TargetInfo) -> Self {
        Self { target }
    }
}

fn bool_type(tree: &mut SyntaxTree) -> NodeId {
    tree.alloc(
        Span::DUMMY,
        NodeKind::TypeBasic {
            basic_kind: TypeBasicKind::Bool,
            is_const: false,
        },
    )
}

impl Handler for TypeResolutionHandler {
    fn on_leave_value_literal_bool(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let ty = bool_type(visit.tree);
        visit.tree.set_resolved_type(visit.node, ty);
        Output::CONTINUE
    }

    fn on_leave_value_literal_number(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueLiteralNumber { ty, .. } = *visit.kind() else {
            unreachable!()
        };
        let Some(ty) = ty else {
            ice!("number literal has no type; was the well-formedness pass run?")
        };
        let clone = visit.tree.clone_type(ty);
        visit.tree.set_resolved_type(visit.node, clone);
        Output::CONTINUE
    }

    fn on_leave_value_symbol(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let Some(declaration) = visit.tree.referenced_declaration_of(visit.node) else {
            // Unresolved symbols were already reported
            return Output::CONTINUE;
        };
        if let Some(declared) = visit.tree.resolved_type_of(declaration) {
            let clone = visit.tree.clone_type(declared);
            visit.tree.set_resolved_type(visit.node, clone);
        }
        Output::CONTINUE
    }

    fn on_leave_value_unary(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueUnary {
            operator, operand, ..
        } = *visit.kind()
        else {
            unreachable!()
        };
        let Some(operand) = operand else {
            ice!("unary value has no operand; was the well-formedness pass run?")
        };

        match operator {
            UnaryOperator::BoolNot => {
                let ty = bool_type(visit.tree);
                visit.tree.set_resolved_type(visit.node, ty);
            }
            UnaryOperator::BitNot | UnaryOperator::Pos | UnaryOperator::Neg => {
                if let Some(operand_type) = visit.tree.resolved_type_of(operand) {
                    let clone = visit.tree.clone_type(operand_type);
                    visit.tree.set_resolved_type(visit.node, clone);
                }
            }
            UnaryOperator::Deref => {
                if let Some(operand_type) = visit.tree.resolved_type_of(operand) {
                    if is_type_pointer(visit.tree, operand_type) {
                        let pointee = pointer_element_type(visit.tree, operand_type)
                            .unwrap_or(operand_type);
                        let clone = visit.tree.clone_type(pointee);
                        visit.tree.set_resolved_type(visit.node, clone);
                    }
                }
            }
            UnaryOperator::GetAddr => {
                if let Some(operand_type) = visit.tree.resolved_type_of(operand) {
                    let pointee = visit.tree.clone_type(operand_type);
                    let span = visit.span();
                    let pointer = visit.tree.alloc(
                        span,
                        NodeKind::TypeUnary {
                            unary_kind: TypeUnaryKind::Pointer,
                            operand_type: Some(pointee),
                            is_const: false,
                        },
                    );
                    visit.tree.set_resolved_type(visit.node, pointer);
                }
            }
        }

        Output::CONTINUE
    }

    fn on_leave_value_binary(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueBinary {
            operator, lhs, rhs, ..
        } = *visit.kind()
        else {
            unreachable!()
        };
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            ice!("binary value has a null side; was the well-formedness pass run?")
        };

        match operator {
            // Logical and comparison operators always produce bool
            BinaryOperator::BoolAnd
            | BinaryOperator::BoolOr
            | BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Le
            | BinaryOperator::Gt
            | BinaryOperator::Ge => {
                let ty = bool_type(visit.tree);
                visit.tree.set_resolved_type(visit.node, ty);
            }

            // Symmetric arithmetic and bitwise operators take the
            // arithmetic containing type of their operands
            BinaryOperator::BitAnd
            | BinaryOperator::BitOr
            | BinaryOperator::BitXor
            | BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Mod => {
                let (Some(lhs_type), Some(rhs_type)) = (
                    visit.tree.resolved_type_of(lhs),
                    visit.tree.resolved_type_of(rhs),
                ) else {
                    return Output::CONTINUE;
                };
                let span = visit.span();
                if let Some(ty) = arithmetic_containing_type(
                    visit.tree,
                    &self.target,
                    lhs_type,
                    rhs_type,
                    span,
                    visit.messages,
                ) {
                    visit.tree.set_resolved_type(visit.node, ty);
                }
            }

            // Shifts, exponentiation, and every assignment form keep the
            // left operand's type
            BinaryOperator::BitShl
            | BinaryOperator::BitShr
            | BinaryOperator::Exp
            | BinaryOperator::Assign
            | BinaryOperator::BitAndAssign
            | BinaryOperator::BitOrAssign
            | BinaryOperator::BitXorAssign
            | BinaryOperator::BitShlAssign
            | BinaryOperator::BitShrAssign
            | BinaryOperator::AddAssign
            | BinaryOperator::SubAssign
            | BinaryOperator::MulAssign
            | BinaryOperator::DivAssign
            | BinaryOperator::ModAssign
            | BinaryOperator::ExpAssign => {
                if let Some(lhs_type) = visit.tree.resolved_type_of(lhs) {
                    let clone = visit.tree.clone_type(lhs_type);
                    visit.tree.set_resolved_type(visit.node, clone);
                }
            }

            BinaryOperator::MemberAccess => {
                self.resolve_member_access(visit, lhs, rhs);
            }
        }

        Output::CONTINUE
    }

    fn on_leave_value_call(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueCall { callee, .. } = *visit.kind() else {
            unreachable!()
        };
        let Some(callee) = callee else {
            ice!("call has no callee; was the well-formedness pass run?")
        };

        if let Some(callee_type) = visit.tree.resolved_type_of(callee) {
            let concrete = concrete_type(visit.tree, callee_type);
            if let NodeKind::TypeFunction {
                return_type: Some(return_type),
                ..
            } = *visit.tree.kind(concrete)
            {
                let clone = visit.tree.clone_type(return_type);
                visit.tree.set_resolved_type(visit.node, clone);
            }
        }

        Output::CONTINUE
    }

    fn on_leave_value_cast(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueCast { ty, .. } = *visit.kind() else {
            unreachable!()
        };
        let Some(ty) = ty else {
            ice!("cast has no target type; was the well-formedness pass run?")
        };
        let clone = visit.tree.clone_type(ty);
        visit.tree.set_resolved_type(visit.node, clone);
        Output::CONTINUE
    }

    fn on_leave_declaration_variable(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationVariable {
            ty, initial_value, ..
        } = *visit.kind()
        else {
            unreachable!()
        };

        if let Some(ty) = ty {
            let clone = visit.tree.clone_type(ty);
            visit.tree.set_resolved_type(visit.node, clone);
            return Output::CONTINUE;
        }

        match initial_value {
            Some(initial_value) => {
                // The initializer's type may be missing when the
                // initializer itself failed; that was already reported
                if let Some(value_type) = visit.tree.resolved_type_of(initial_value) {
                    let clone = visit.tree.clone_type(value_type);
                    visit.tree.set_resolved_type(visit.node, clone);
                }
            }
            None => {
                let span = visit.span();
                DiagnosticBuilder::error(
                    "unable to resolve the variable's type: neither a type nor an initial value is provided",
                )
                .code(DiagnosticCode::UNABLE_TO_RESOLVE)
                .span(span)
                .emit(visit.messages);
            }
        }

        Output::CONTINUE
    }

    fn on_leave_declaration_function(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationFunction {
            args, return_type, ..
        } = visit.kind()
        else {
            unreachable!()
        };
        let args = args.clone();
        let return_type = *return_type;

        if return_type.is_none() {
            let span = visit.span();
            DiagnosticBuilder::error("function return type is not provided")
                .code(DiagnosticCode::UNABLE_TO_RESOLVE)
                .span(span)
                .emit(visit.messages);
        }

        let return_clone = return_type.map(|ty| visit.tree.clone_type(ty));

        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args {
            match visit.tree.resolved_type_of(arg) {
                Some(arg_type) => arg_types.push(visit.tree.clone_type(arg_type)),
                None => {
                    let name = visit.tree.name_of(arg).unwrap_or("<unnamed>").to_string();
                    let span = visit.tree.span(arg);
                    DiagnosticBuilder::error(format!(
                        "unable to resolve the type of argument '{name}'"
                    ))
                    .code(DiagnosticCode::UNABLE_TO_RESOLVE)
                    .span(span)
                    .emit(visit.messages);
                }
            }
        }

        let span = visit.span();
        let function_type = visit.tree.alloc(
            span,
            NodeKind::TypeFunction {
                return_type: return_clone,
                arg_types,
                is_const: false,
            },
        );
        visit.tree.set_resolved_type(visit.node, function_type);

        Output::CONTINUE
    }

    fn on_leave_declaration_type_alias(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationTypeAlias { ty, .. } = *visit.kind() else {
            unreachable!()
        };
        let Some(ty) = ty else {
            ice!("type alias has no type; was the well-formedness pass run?")
        };
        let clone = visit.tree.clone_type(ty);
        visit.tree.set_resolved_type(visit.node, clone);
        Output::CONTINUE
    }

    fn on_leave_declaration_structured_type(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationStructuredType {
            members, inherits, ..
        } = visit.kind()
        else {
            unreachable!()
        };
        let members = members.clone();
        let inherits = inherits.clone();

        // Merge inherited members first, then the type's own. Sibling
        // parents are unordered, so any duplicate across the merged set is
        // reported; the first-merged member stays so later passes can keep
        // going.
        let mut merged: IndexMap<String, (Option<NodeId>, Span)> = IndexMap::new();
        let mut clashes: Vec<(String, Span)> = Vec::new();

        for parent_symbol in inherits {
            let Some(parent_decl) = visit.tree.referenced_declaration_of(parent_symbol) else {
                continue;
            };
            if !matches!(
                visit.tree.kind(parent_decl),
                NodeKind::DeclarationStructuredType { .. }
            ) {
                continue;
            }
            let Some(parent_type) = visit.tree.resolved_type_of(parent_decl) else {
                continue;
            };
            let NodeKind::TypeStructured {
                members: parent_members,
                ..
            } = visit.tree.kind(concrete_type(visit.tree, parent_type))
            else {
                continue;
            };
            for &member in parent_members.clone().iter() {
                let Some(name) = visit.tree.name_of(member).map(str::to_string) else {
                    continue;
                };
                let entry = (visit.tree.resolved_type_of(member), visit.tree.span(member));
                if merged.contains_key(&name) {
                    clashes.push((name, entry.1));
                } else {
                    merged.insert(name, entry);
                }
            }
        }

        for member in members {
            let Some(name) = visit.tree.name_of(member).map(str::to_string) else {
                continue;
            };
            let entry = (visit.tree.resolved_type_of(member), visit.tree.span(member));
            if merged.contains_key(&name) {
                clashes.push((name, entry.1));
            } else {
                merged.insert(name, entry);
            }
        }

        for (name, span) in clashes {
            DiagnosticBuilder::error(format!(
                "member '{name}' shadows an inherited member of the same name"
            ))
            .code(DiagnosticCode::MEMBER_SHADOWS_INHERITED)
            .span(span)
            .emit(visit.messages);
        }

        let mut synthesized_members = Vec::with_capacity(merged.len());
        for (name, (member_type, span)) in merged {
            let resolved_type = member_type.map(|ty| visit.tree.clone_type(ty));
            synthesized_members.push(visit.tree.alloc(
                span,
                NodeKind::DeclarationVariable {
                    name,
                    ty: None,
                    initial_value: None,
                    resolved_type,
                },
            ));
        }

        let span = visit.span();
        let structured = visit.tree.alloc(
            span,
            NodeKind::TypeStructured {
                members: synthesized_members,
                is_const: false,
            },
        );
        visit.tree.set_resolved_type(visit.node, structured);

        Output::CONTINUE
    }
}

impl TypeResolutionHandler {
    /// Resolve `lhs.rhs` against a structured type or a namespace.
    fn resolve_member_access(&mut self, visit: &mut Visit<'_, '_>, lhs: NodeId, rhs: NodeId) {
        let member_name = match visit.tree.kind(rhs) {
            NodeKind::ValueSymbol { name, .. } => name.clone(),
            other => ice!(
                "member access has a {} on the right; was the well-formedness pass run?",
                other.kind_name()
            ),
        };

        // Qualified access through a namespace name
        if let NodeKind::ValueSymbol {
            referenced_declaration: Some(lhs_decl),
            ..
        } = *visit.tree.kind(lhs)
        {
            if let NodeKind::DeclarationNamespace { members, .. } = visit.tree.kind(lhs_decl) {
                let members = members.clone();
                let member = members
                    .iter()
                    .copied()
                    .find(|&m| visit.tree.name_of(m) == Some(member_name.as_str()));
                match member {
                    Some(member) => {
                        visit.tree.set_referenced_declaration(rhs, member);
                        if let Some(member_type) = visit.tree.resolved_type_of(member) {
                            let rhs_clone = visit.tree.clone_type(member_type);
                            visit.tree.set_resolved_type(rhs, rhs_clone);
                            let node_clone = visit.tree.clone_type(member_type);
                            visit.tree.set_resolved_type(visit.node, node_clone);
                        }
                    }
                    None => {
                        let span = visit.tree.span(rhs);
                        DiagnosticBuilder::error(format!(
                            "namespace has no member named '{member_name}'"
                        ))
                        .code(DiagnosticCode::NO_MEMBER_WITH_NAME)
                        .span(span)
                        .emit(visit.messages);
                    }
                }
                return;
            }
        }

        // Member access through a structured type
        let Some(lhs_type) = visit.tree.resolved_type_of(lhs) else {
            // The left side failed to resolve and was already reported
            return;
        };

        let concrete = concrete_type(visit.tree, lhs_type);
        let NodeKind::TypeStructured { members, .. } = visit.tree.kind(concrete) else {
            let span = visit.tree.span(lhs);
            DiagnosticBuilder::error("unexpected type: expected structured type")
                .code(DiagnosticCode::UNEXPECTED_TYPE)
                .span(span)
                .emit(visit.messages);
            return;
        };

        let members = members.clone();
        let member = members
            .iter()
            .copied()
            .find(|&m| visit.tree.name_of(m) == Some(member_name.as_str()));

        match member {
            Some(member) => {
                visit.tree.set_referenced_declaration(rhs, member);
                if let Some(member_type) = visit.tree.resolved_type_of(member) {
                    let rhs_clone = visit.tree.clone_type(member_type);
                    visit.tree.set_resolved_type(rhs, rhs_clone);
                    let node_clone = visit.tree.clone_type(member_type);
                    visit.tree.set_resolved_type(visit.node, node_clone);
                }
            }
            None => {
                let span = visit.tree.span(rhs);
                DiagnosticBuilder::error(format!(
                    "structured type has no member named '{member_name}'"
                ))
                .code(DiagnosticCode::NO_MEMBER_WITH_NAME)
                .span(span)
                .emit(visit.messages);
            }
        }
    }
}
