//! Structural well-formedness validation.
//!
//! The first pass over a freshly parsed tree. It knows nothing about
//! types or names; it only checks that every node has the shape the later
//! passes are allowed to assume: mandatory children present, names
//! non-empty, bit widths in the supported sets, `else` clauses shaped like
//! else-if chains, member access with a symbol on the right.
//!
//! Every failure is an `ISY000` diagnostic and halts the traversal, since
//! nothing downstream is safe on a malformed tree.

use forge_par::ast::{BinaryOperator, NodeId, NodeKind, TypeWithBitWidthKind};
use forge_util::{DiagnosticBuilder, DiagnosticCode};

use crate::visitor::{Handler, Output, Visit, VisitorStatus};

/// Pass 1: structural invariants
#[derive(Default)]
pub struct WellFormedHandler;

impl WellFormedHandler {
    pub fn new() -> Self {
        Self
    }
}

fn emit_not_well_formed(visit: &mut Visit<'_, '_>, detail: impl Into<String>) {
    let kind_name = visit.kind().kind_name();
    let span = visit.span();
    DiagnosticBuilder::error(format!("{kind_name} node is not well formed"))
        .code(DiagnosticCode::NOT_WELL_FORMED)
        .span(span)
        .note(detail)
        .emit(visit.messages);
}

/// Check a mandatory child; reports the field name on failure.
fn validate_child_not_null(
    visit: &mut Visit<'_, '_>,
    field: &str,
    child: Option<NodeId>,
) -> bool {
    if child.is_some() {
        return true;
    }
    emit_not_well_formed(visit, format!("field '{field}' must not be null"));
    false
}

/// Check a mandatory name string.
fn validate_name_not_empty(visit: &mut Visit<'_, '_>, field: &str, name: &str) -> bool {
    if !name.is_empty() {
        return true;
    }
    emit_not_well_formed(visit, format!("field '{field}' must not be empty"));
    false
}

const HALT: Output = Output {
    status: VisitorStatus::HaltTraversal,
};

impl Handler for WellFormedHandler {
    fn on_leave_type_with_bit_width(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::TypeWithBitWidth {
            width_kind,
            bit_width,
            ..
        } = *visit.kind()
        else {
            unreachable!()
        };

        match width_kind {
            TypeWithBitWidthKind::SignedInt | TypeWithBitWidthKind::UnsignedInt => {
                if !matches!(bit_width, 8 | 16 | 32 | 64) {
                    let span = visit.span();
                    DiagnosticBuilder::error(format!(
                        "invalid bit width for integer: {bit_width}"
                    ))
                    .code(DiagnosticCode::NOT_WELL_FORMED)
                    .span(span)
                    .note("valid are 8, 16, 32, and 64")
                    .emit(visit.messages);
                    return HALT;
                }
            }
            TypeWithBitWidthKind::Float => {
                if !matches!(bit_width, 32 | 64) {
                    let span = visit.span();
                    DiagnosticBuilder::error(format!("invalid bit width for float: {bit_width}"))
                        .code(DiagnosticCode::NOT_WELL_FORMED)
                        .span(span)
                        .note("valid are 32 and 64")
                        .emit(visit.messages);
                    return HALT;
                }
            }
        }

        Output::CONTINUE
    }

    fn on_leave_type_symbol(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::TypeSymbol { name, .. } = visit.kind() else {
            unreachable!()
        };
        let name = name.clone();
        if !validate_name_not_empty(visit, "name", &name) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_type_unary(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::TypeUnary { operand_type, .. } = *visit.kind() else {
            unreachable!()
        };

        if !validate_child_not_null(visit, "operand_type", operand_type) {
            return HALT;
        }
        let Some(operand_type) = operand_type else {
            return HALT;
        };

        // Pointers to functions cannot be formed (functions are only
        // first-class as callees)
        if matches!(
            visit.tree.kind(operand_type),
            NodeKind::TypeFunction { .. }
        ) {
            emit_not_well_formed(visit, "unary type cannot have a function operand type");
            return HALT;
        }

        Output::CONTINUE
    }

    fn on_leave_type_function(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::TypeFunction { return_type, .. } = *visit.kind() else {
            unreachable!()
        };
        if !validate_child_not_null(visit, "return_type", return_type) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_value_literal_number(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueLiteralNumber { ty, .. } = *visit.kind() else {
            unreachable!()
        };
        if !validate_child_not_null(visit, "type", ty) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_value_symbol(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueSymbol { name, .. } = visit.kind() else {
            unreachable!()
        };
        let name = name.clone();
        if !validate_name_not_empty(visit, "name", &name) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_value_unary(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueUnary { operand, .. } = *visit.kind() else {
            unreachable!()
        };
        if !validate_child_not_null(visit, "operand", operand) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_value_binary(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueBinary { operator, lhs, rhs, .. } = *visit.kind() else {
            unreachable!()
        };

        if !validate_child_not_null(visit, "lhs", lhs) {
            return HALT;
        }
        if !validate_child_not_null(visit, "rhs", rhs) {
            return HALT;
        }

        if operator == BinaryOperator::MemberAccess {
            let Some(rhs) = rhs else {
                return HALT;
            };
            if !matches!(visit.tree.kind(rhs), NodeKind::ValueSymbol { .. }) {
                emit_not_well_formed(
                    visit,
                    "member access operator must have a symbol on the right",
                );
                return HALT;
            }
        }

        Output::CONTINUE
    }

    fn on_leave_value_call(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueCall { callee, .. } = *visit.kind() else {
            unreachable!()
        };
        if !validate_child_not_null(visit, "callee", callee) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_value_cast(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::ValueCast { value, ty, .. } = *visit.kind() else {
            unreachable!()
        };
        if !validate_child_not_null(visit, "value", value) {
            return HALT;
        }
        if !validate_child_not_null(visit, "type", ty) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_statement_value(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::StatementValue { value, .. } = *visit.kind() else {
            unreachable!()
        };
        if !validate_child_not_null(visit, "value", value) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_statement_declaration(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::StatementDeclaration { declaration } = *visit.kind() else {
            unreachable!()
        };
        if !validate_child_not_null(visit, "declaration", declaration) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_statement_if(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::StatementIf {
            condition,
            then_branch,
            else_branch,
        } = *visit.kind()
        else {
            unreachable!()
        };

        if !validate_child_not_null(visit, "condition", condition) {
            return HALT;
        }
        if !validate_child_not_null(visit, "then", then_branch) {
            return HALT;
        }

        if let Some(else_branch) = else_branch {
            if !matches!(
                visit.tree.kind(else_branch),
                NodeKind::StatementBlock { .. } | NodeKind::StatementIf { .. }
            ) {
                emit_not_well_formed(
                    visit,
                    "if statement else clause must be a block or another if",
                );
                return HALT;
            }
        }

        Output::CONTINUE
    }

    fn on_leave_statement_while(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::StatementWhile {
            condition, body, ..
        } = *visit.kind()
        else {
            unreachable!()
        };
        if !validate_child_not_null(visit, "condition", condition) {
            return HALT;
        }
        if !validate_child_not_null(visit, "body", body) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_declaration_variable(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationVariable { name, .. } = visit.kind() else {
            unreachable!()
        };
        let name = name.clone();
        if !validate_name_not_empty(visit, "name", &name) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_declaration_function(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationFunction { name, .. } = visit.kind() else {
            unreachable!()
        };
        let name = name.clone();
        if !validate_name_not_empty(visit, "name", &name) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_declaration_structured_type(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationStructuredType { name, .. } = visit.kind() else {
            unreachable!()
        };
        let name = name.clone();
        if !validate_name_not_empty(visit, "name", &name) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_declaration_type_alias(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationTypeAlias { name, ty, .. } = visit.kind() else {
            unreachable!()
        };
        let name = name.clone();
        let ty = *ty;
        if !validate_name_not_empty(visit, "name", &name) {
            return HALT;
        }
        if !validate_child_not_null(visit, "type", ty) {
            return HALT;
        }
        Output::CONTINUE
    }

    fn on_leave_declaration_namespace(&mut self, visit: &mut Visit<'_, '_>) -> Output {
        let NodeKind::DeclarationNamespace { name, .. } = visit.kind() else {
            unreachable!()
        };
        let name = name.clone();
        if !validate_name_not_empty(visit, "name", &name) {
            return HALT;
        }
        Output::CONTINUE
    }
}
