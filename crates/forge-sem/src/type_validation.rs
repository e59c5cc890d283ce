//! Type validation.
//!
//! The final semantic pass. Resolution has annotated every value and
//! declaration; this pass enforces the operator, call, return, and cast
//! rules on those annotations. Nodes whose types never resolved are
//! skipped: whatever went wrong was reported upstream, and piling more
//! diagnostics on the same expression helps nobody.

use forge_par::ast::{
    BinaryOperator, NodeId, NodeKind, StatementBasicKind, StatementValueKind, SyntaxTree,
    TypeUnaryKind, UnaryOperator,
};
use forge_util::{DiagnosticBuilder, DiagnosticCode, Level, Span};

use crate::types::{
    casting_mode, concrete_type, integer_signedness, is_type_bool, is_type_integer,
    is_type_number, is_type_pointer, is_type_void, type_display, CastingMode, TargetInfo,
};
use crate::visitor::{Handler, Output, Visit};

/// Pass 4: enforces typing rules
pub struct TypeValidationHandler {
    target: TargetInfo,
}

impl TypeValidationHandler {
    pub fn new(target: TargetInfo) -> Self {
        Self { target }
    }

    fn check_implicit_cast(
        &self,
        visit: &mut Visit<'_, '_>,
        span: Span,
        from: NodeId,
        to: NodeId,
    ) {
        if casting_mode(visit.tree, &self.target, from, to) != CastingMode::Implicit {
            emit_unable_to_implicitly_cast(visit, span, from, to);
        }
    }
}

/// L-values are exactly: a symbol, a dereference, or a member access
fn is_lvalue(tree: &SyntaxTree, value: NodeId) -> bool {
    match tree.kind(value) {
        NodeKind::ValueSymbol { .. } => true,
        NodeKind::ValueUnary {
            operator: UnaryOperator::Deref,
            ..
        } => true,
        NodeKind::ValueBinary {
            operator: BinaryOperator::MemberAccess,
            ..
        } => true,
        _ => false,
    }
}

fn emit_unexpected_type(visit: &mut Visit<'_, '_>, span: Span, expected: &str) {
    DiagnosticBuilder::error(format!("unexpected type: expected {expected}"))
        .code(DiagnosticCode::UNEXPECTED_TYPE)
        .span(span)
        .emit(visit.messages);
}

fn emit_unable_to_implicitly_cast(visit: &mut Visit<'_, '_>, span: Span, from: NodeId, to: NodeId) {
    let from = type_display(visit.tree, from);
    let to = type_display(visit.tree, to);
    DiagnosticBuilder::error(format!("unable to implicitly cast from type {from} to {to}"))
        .code(DiagnosticCode::UNABLE_TO_IMPLICITLY_CAST)
        .span(span)
        .suggestion("use 'as' to cast between types")
        .emit(visit.messages);
}

impl Handler for TypeValidationHandler {
    fn on_leave_type_unary(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::TypeUnary {
            unary_kind: TypeUnaryKind::Pointer,
            operand_type,
            ..
        } = *visit.kind()
        else {
            unreachable!()
        };
        let Some(operand_type) = operand_type else {
            return Output::CONTINUE;
        };

        if is_type_void(visit.tree, operand_type) {
            let span = visit.tree.span(operand_type);
            DiagnosticBuilder::error("pointers to void are not allowed")
                .code(DiagnosticCode::NO_VOID_POINTERS)
                .span(span)
                .emit(visit.messages);
        } else if matches!(
            visit.tree.kind(concrete_type(visit.tree, operand_type)),
            NodeKind::TypeFunction { .. }
        ) {
            let span = visit.tree.span(operand_type);
            DiagnosticBuilder::error("pointers to functions are not allowed")
                .code(DiagnosticCode::NO_FUNCTION_POINTERS)
                .span(span)
                .emit(visit.messages);
        }

        Output::CONTINUE
    }

    fn on_leave_type_function(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::TypeFunction { arg_types, .. } = visit.kind() else {
            unreachable!()
        };
        let arg_types = arg_types.clone();
        for arg_type in arg_types {
            if is_type_void(visit.tree, arg_type) {
                let span = visit.tree.span(arg_type);
                emit_unexpected_type(visit, span, "non-void type");
            }
        }
        Output::CONTINUE
    }

    fn on_leave_value_symbol(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        // A namespace name is only meaningful as the left side of `.`
        if let Some(declaration) = visit.tree.referenced_declaration_of(visit.node) {
            if matches!(
                visit.tree.kind(declaration),
                NodeKind::DeclarationNamespace { .. }
            ) {
                let qualifies = visit.parent().is_some_and(|parent| {
                    matches!(
                        visit.tree.kind(parent),
                        NodeKind::ValueBinary {
                            operator: BinaryOperator::MemberAccess,
                            lhs: Some(lhs),
                            ..
                        } if *lhs == visit.node
                    )
                });
                if !qualifies {
                    let span = visit.span();
                    DiagnosticBuilder::error("a namespace cannot be used as a value")
                        .code(DiagnosticCode::NAMESPACE_USED_AS_VALUE)
                        .span(span)
                        .emit(visit.messages);
                }
                return Output::CONTINUE;
            }
        }

        if let Some(resolved) = visit.tree.resolved_type_of(visit.node) {
            if is_type_void(visit.tree, resolved) {
                let span = visit.span();
                emit_unexpected_type(visit, span, "non-void type");
            }
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
            return Output::CONTINUE;
        };
        let operand_type = visit.tree.resolved_type_of(operand);
        let operand_span = visit.tree.span(operand);

        match operator {
            UnaryOperator::BoolNot => {
                if let Some(ty) = operand_type {
                    if !is_type_bool(visit.tree, ty) {
                        emit_unexpected_type(visit, operand_span, "bool");
                    }
                }
            }
            UnaryOperator::BitNot => {
                if let Some(ty) = operand_type {
                    if !is_type_integer(visit.tree, ty) {
                        emit_unexpected_type(visit, operand_span, "integer type");
                    }
                }
            }
            UnaryOperator::Pos => {
                if let Some(ty) = operand_type {
                    if !is_type_number(visit.tree, ty) {
                        emit_unexpected_type(visit, operand_span, "numeric type");
                    }
                }
            }
            UnaryOperator::Neg => {
                if let Some(ty) = operand_type {
                    if !is_type_number(visit.tree, ty) {
                        emit_unexpected_type(visit, operand_span, "numeric type");
                    }
                    // Negating an unsigned value is suspicious but legal
                    if integer_signedness(visit.tree, ty) == Some(false) {
                        DiagnosticBuilder::new(
                            Level::Warning,
                            "unexpected type: expected signed integer type",
                        )
                        .code(DiagnosticCode::UNEXPECTED_TYPE)
                        .span(operand_span)
                        .emit(visit.messages);
                    }
                }
            }
            UnaryOperator::Deref => {
                if let Some(ty) = operand_type {
                    if !is_type_pointer(visit.tree, ty) {
                        emit_unexpected_type(visit, operand_span, "pointer type");
                    }
                }
            }
            UnaryOperator::GetAddr => {
                if !is_lvalue(visit.tree, operand) {
                    emit_unexpected_type(visit, operand_span, "l-value reference");
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
            return Output::CONTINUE;
        };

        let lhs_type = visit.tree.resolved_type_of(lhs);
        let rhs_type = visit.tree.resolved_type_of(rhs);
        let lhs_span = visit.tree.span(lhs);
        let rhs_span = visit.tree.span(rhs);

        match operator {
            // Boolean only
            BinaryOperator::BoolAnd | BinaryOperator::BoolOr => {
                if let Some(ty) = lhs_type {
                    if !is_type_bool(visit.tree, ty) {
                        emit_unexpected_type(visit, lhs_span, "bool");
                    }
                }
                if let Some(ty) = rhs_type {
                    if !is_type_bool(visit.tree, ty) {
                        emit_unexpected_type(visit, rhs_span, "bool");
                    }
                }
            }

            // Integer only
            BinaryOperator::BitAnd
            | BinaryOperator::BitOr
            | BinaryOperator::BitXor
            | BinaryOperator::BitShl
            | BinaryOperator::BitShr => {
                if let Some(ty) = lhs_type {
                    if !is_type_integer(visit.tree, ty) {
                        emit_unexpected_type(visit, lhs_span, "integer type");
                    }
                }
                if let Some(ty) = rhs_type {
                    if !is_type_integer(visit.tree, ty) {
                        emit_unexpected_type(visit, rhs_span, "integer type");
                    }
                }
            }

            // Numeric only
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Exp
            | BinaryOperator::Div
            | BinaryOperator::Mod
            | BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Le
            | BinaryOperator::Gt
            | BinaryOperator::Ge => {
                if let Some(ty) = lhs_type {
                    if !is_type_number(visit.tree, ty) {
                        emit_unexpected_type(visit, lhs_span, "numeric type");
                    }
                }
                if let Some(ty) = rhs_type {
                    if !is_type_number(visit.tree, ty) {
                        emit_unexpected_type(visit, rhs_span, "numeric type");
                    }
                }
            }

            // Assignment
            BinaryOperator::Assign
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
                if !is_lvalue(visit.tree, lhs) {
                    emit_unexpected_type(visit, lhs_span, "l-value reference");
                }
                if let (Some(lhs_type), Some(rhs_type)) = (lhs_type, rhs_type) {
                    self.check_implicit_cast(visit, rhs_span, rhs_type, lhs_type);
                }
            }

            // Checked during type resolution
            BinaryOperator::MemberAccess => {}
        }

        Output::CONTINUE
    }

    fn on_leave_value_call(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueCall { callee, args, .. } = visit.kind() else {
            unreachable!()
        };
        let args = args.clone();
        let Some(callee) = *callee else {
            return Output::CONTINUE;
        };
        let Some(callee_type) = visit.tree.resolved_type_of(callee) else {
            return Output::CONTINUE;
        };

        let concrete = concrete_type(visit.tree, callee_type);
        let NodeKind::TypeFunction { arg_types, .. } = visit.tree.kind(concrete) else {
            let display = type_display(visit.tree, callee_type);
            let span = visit.tree.span(callee);
            DiagnosticBuilder::error(format!("cannot call a value of type {display}"))
                .code(DiagnosticCode::CANNOT_CALL_NON_FUNCTION)
                .span(span)
                .emit(visit.messages);
            return Output::CONTINUE;
        };
        let arg_types = arg_types.clone();

        if args.len() != arg_types.len() {
            let span = visit.span();
            DiagnosticBuilder::error(format!(
                "incorrect number of arguments: expected {}, found {}",
                arg_types.len(),
                args.len()
            ))
            .code(DiagnosticCode::INCORRECT_NUMBER_OF_ARGS)
            .span(span)
            .emit(visit.messages);
            return Output::CONTINUE;
        }

        for (&arg, &arg_type) in args.iter().zip(arg_types.iter()) {
            if let Some(value_type) = visit.tree.resolved_type_of(arg) {
                let span = visit.tree.span(arg);
                self.check_implicit_cast(visit, span, value_type, arg_type);
            }
        }

        Output::CONTINUE
    }

    fn on_leave_value_cast(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueCast { value, ty, .. } = *visit.kind() else {
            unreachable!()
        };
        let (Some(value), Some(ty)) = (value, ty) else {
            return Output::CONTINUE;
        };
        let Some(value_type) = visit.tree.resolved_type_of(value) else {
            return Output::CONTINUE;
        };

        if casting_mode(visit.tree, &self.target, value_type, ty) == CastingMode::Illegal {
            let from = type_display(visit.tree, value_type);
            let to = type_display(visit.tree, ty);
            let span = visit.span();
            DiagnosticBuilder::error(format!("illegal cast from type {from} to {to}"))
                .code(DiagnosticCode::ILLEGAL_CAST)
                .span(span)
                .emit(visit.messages);
        }

        Output::CONTINUE
    }

    fn on_leave_statement_basic(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::StatementBasic { basic_kind } = *visit.kind() else {
            unreachable!()
        };
        if basic_kind != StatementBasicKind::ReturnVoid {
            return Output::CONTINUE;
        }

        let Some(function) = visit.surrounding_function() else {
            let span = visit.span();
            DiagnosticBuilder::error("return statement used outside of a function")
                .code(DiagnosticCode::NOT_WELL_FORMED)
                .span(span)
                .emit(visit.messages);
            return Output::CONTINUE;
        };

        let NodeKind::DeclarationFunction { return_type, .. } = visit.tree.kind(function) else {
            unreachable!()
        };
        if let Some(return_type) = *return_type {
            if !is_type_void(visit.tree, return_type) {
                let span = visit.span();
                DiagnosticBuilder::error("a non-void function must return a value")
                    .code(DiagnosticCode::NON_VOID_FUNCTION_MUST_RETURN_VALUE)
                    .span(span)
                    .emit(visit.messages);
            }
        }

        Output::CONTINUE
    }

    fn on_leave_statement_value(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::StatementValue { value_kind, value } = *visit.kind() else {
            unreachable!()
        };
        if value_kind != StatementValueKind::Return {
            return Output::CONTINUE;
        }

        let Some(function) = visit.surrounding_function() else {
            let span = visit.span();
            DiagnosticBuilder::error("return statement used outside of a function")
                .code(DiagnosticCode::NOT_WELL_FORMED)
                .span(span)
                .emit(visit.messages);
            return Output::CONTINUE;
        };

        let NodeKind::DeclarationFunction { return_type, .. } = visit.tree.kind(function) else {
            unreachable!()
        };
        let Some(return_type) = *return_type else {
            return Output::CONTINUE;
        };

        if is_type_void(visit.tree, return_type) {
            let span = visit.span();
            DiagnosticBuilder::error("a void function cannot return a value")
                .code(DiagnosticCode::VOID_FUNCTION_CANNOT_RETURN_VALUE)
                .span(span)
                .emit(visit.messages);
            // The value itself is not checked further
            return Output::CONTINUE;
        }

        let Some(value) = value else {
            return Output::CONTINUE;
        };
        if let Some(value_type) = visit.tree.resolved_type_of(value) {
            let span = visit.tree.span(value);
            self.check_implicit_cast(visit, span, value_type, return_type);
        }

        Output::CONTINUE
    }

    fn on_leave_statement_if(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::StatementIf { condition, .. } = *visit.kind() else {
            unreachable!()
        };
        let Some(condition) = condition else {
            return Output::CONTINUE;
        };
        if let Some(ty) = visit.tree.resolved_type_of(condition) {
            if !is_type_bool(visit.tree, ty) {
                let span = visit.tree.span(condition);
                emit_unexpected_type(visit, span, "bool");
            }
        }
        Output::CONTINUE
    }

    fn on_leave_statement_while(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::StatementWhile { condition, .. } = *visit.kind() else {
            unreachable!()
        };
        let Some(condition) = condition else {
            return Output::CONTINUE;
        };
        if let Some(ty) = visit.tree.resolved_type_of(condition) {
            if !is_type_bool(visit.tree, ty) {
                let span = visit.tree.span(condition);
                emit_unexpected_type(visit, span, "bool");
            }
        }
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
            if is_type_void(visit.tree, ty) {
                let span = visit.tree.span(ty);
                emit_unexpected_type(visit, span, "non-void type");
            }

            if let Some(initial_value) = initial_value {
                if let Some(value_type) = visit.tree.resolved_type_of(initial_value) {
                    let span = visit.tree.span(initial_value);
                    self.check_implicit_cast(visit, span, value_type, ty);
                }
            }
        }

        Output::CONTINUE
    }

    fn on_leave_declaration_structured_type(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationStructuredType { members, .. } = visit.kind() else {
            unreachable!()
        };
        let members = members.clone();
        for member in members {
            if matches!(
                visit.tree.kind(member),
                NodeKind::DeclarationNamespace { .. }
            ) {
                let span = visit.tree.span(member);
                DiagnosticBuilder::error(
                    "a namespace cannot be declared inside a structured type",
                )
                .code(DiagnosticCode::NAMESPACE_WITHIN_STRUCTURED_TYPE)
                .span(span)
                .emit(visit.messages);
            }
        }
        Output::CONTINUE
    }
}
