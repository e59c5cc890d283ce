//! LLVM IR generation.
//!
//! Translates a fully analyzed tree into an LLVM module. The passes
//! guarantee the invariants this code leans on: every value carries a
//! resolved type, every symbol is bound, every implicit conversion was
//! checked. A broken invariant here is a compiler bug and aborts.
//!
//! Control flow is emitted without phi nodes by threading a "current basic
//! block" through statement emission: a statement either hands back the
//! block where execution continues, or `None` when it terminated
//! (return/break/continue, or an `if` whose arms all terminate).

use forge_par::ast::{
    BinaryOperator, NodeId, NodeKind, NumberValue, StatementBasicKind, StatementValueKind,
    SyntaxTree, TypeWithBitWidthKind, UnaryOperator,
};
use forge_sem::{
    arithmetic_containing_type, concrete_type, integer_signedness, is_type_float, is_type_void,
    pointer_element_type, TargetInfo,
};
use forge_util::{ice, Messages};
use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::BasicTypeEnum;
use inkwell::values::{
    BasicMetadataValueEnum, BasicValueEnum, FunctionValue, PointerValue,
};
use inkwell::{FloatPredicate, IntPredicate};
use rustc_hash::FxHashMap;

use crate::error::{CodegenError, Result};
use crate::types::TypeMapper;

/// Where a variable's value lives during codegen
#[derive(Clone, Copy)]
enum Storage<'ctx> {
    /// A stack slot; reads load from it, writes store to it
    Slot(PointerValue<'ctx>),
    /// An SSA value (function arguments); not addressable
    Direct(BasicValueEnum<'ctx>),
}

/// Ambient state while emitting the statements of one function
#[derive(Clone, Copy)]
struct StatementContext<'ctx> {
    function: NodeId,
    llvm_function: FunctionValue<'ctx>,
    loop_body: Option<BasicBlock<'ctx>>,
    loop_after: Option<BasicBlock<'ctx>>,
}

/// The LLVM backend for one translation unit
pub struct Codegen<'ctx, 't> {
    context: &'ctx Context,
    pub module: Module<'ctx>,
    builder: Builder<'ctx>,
    types: TypeMapper<'ctx>,
    target: TargetInfo,
    tree: &'t mut SyntaxTree,
    /// Variable declaration -> its storage
    storage: FxHashMap<NodeId, Storage<'ctx>>,
    /// Function declaration -> its LLVM function
    functions: FxHashMap<NodeId, FunctionValue<'ctx>>,
}

impl<'ctx, 't> Codegen<'ctx, 't> {
    pub fn new(
        context: &'ctx Context,
        module_name: &str,
        tree: &'t mut SyntaxTree,
        target: TargetInfo,
    ) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();
        Self {
            context,
            module,
            builder,
            types: TypeMapper::new(context, target),
            target,
            tree,
            storage: FxHashMap::default(),
            functions: FxHashMap::default(),
        }
    }

    /// Emit the whole translation unit into the module.
    pub fn translation_unit(&mut self, unit: NodeId) -> Result<()> {
        let NodeKind::TranslationUnit { declarations, .. } = self.tree.kind(unit) else {
            ice!("codegen root must be a translation unit")
        };
        let declarations = declarations.clone();

        // Declare every function signature first so that call emission
        // never depends on declaration order
        self.declare_signatures(&declarations)?;

        for declaration in declarations {
            self.declaration(declaration)?;
        }
        Ok(())
    }

    fn declare_signatures(&mut self, declarations: &[NodeId]) -> Result<()> {
        for &declaration in declarations {
            match self.tree.kind(declaration) {
                NodeKind::DeclarationFunction {
                    name,
                    args,
                    return_type,
                    ..
                } => {
                    let name = name.clone();
                    let args = args.clone();
                    let Some(return_type) = *return_type else {
                        ice!("function '{name}' has no return type; were the passes run?")
                    };

                    let mut arg_types = Vec::with_capacity(args.len());
                    for arg in args {
                        let Some(arg_type) = self.tree.resolved_type_of(arg) else {
                            ice!("argument of '{name}' has no resolved type; were the passes run?")
                        };
                        arg_types.push(arg_type);
                    }

                    let fn_type = self
                        .types
                        .function_type(self.tree, return_type, &arg_types)?;
                    let function = self.module.add_function(&name, fn_type, None);
                    self.functions.insert(declaration, function);
                }
                NodeKind::DeclarationNamespace { members, .. } => {
                    let members = members.clone();
                    self.declare_signatures(&members)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn declaration(&mut self, declaration: NodeId) -> Result<()> {
        match self.tree.kind(declaration) {
            NodeKind::DeclarationVariable { .. } => {
                Err(CodegenError::Unsupported("top-level variable codegen"))
            }
            NodeKind::DeclarationFunction { .. } => self.declaration_function(declaration),
            NodeKind::DeclarationTypeAlias { .. } => Ok(()),
            NodeKind::DeclarationStructuredType { .. } => {
                Err(CodegenError::Unsupported("structured type codegen"))
            }
            NodeKind::DeclarationNamespace { members, .. } => {
                let members = members.clone();
                for member in members {
                    self.declaration(member)?;
                }
                Ok(())
            }
            other => ice!("cannot codegen a {} declaration", other.kind_name()),
        }
    }

    fn declaration_function(&mut self, declaration: NodeId) -> Result<()> {
        let NodeKind::DeclarationFunction {
            name,
            args,
            return_type,
            body,
            ..
        } = self.tree.kind(declaration)
        else {
            unreachable!()
        };
        let name = name.clone();
        let args = args.clone();
        let Some(return_type) = *return_type else {
            ice!("function '{name}' has no return type; were the passes run?")
        };
        let Some(body) = *body else {
            ice!("function '{name}' has no body; were the passes run?")
        };

        let function = *self
            .functions
            .get(&declaration)
            .unwrap_or_else(|| ice!("function '{name}' was never declared"));

        for (index, arg) in args.iter().enumerate() {
            let Some(param) = function.get_nth_param(index as u32) else {
                ice!("function '{name}' is missing parameter {index}")
            };
            if let Some(arg_name) = self.tree.name_of(*arg) {
                match param {
                    BasicValueEnum::IntValue(value) => value.set_name(arg_name),
                    BasicValueEnum::FloatValue(value) => value.set_name(arg_name),
                    BasicValueEnum::PointerValue(value) => value.set_name(arg_name),
                    _ => {}
                }
            }
            self.storage.insert(*arg, Storage::Direct(param));
        }

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        let cx = StatementContext {
            function: declaration,
            llvm_function: function,
            loop_body: None,
            loop_after: None,
        };
        let end = self.statement(body, entry, cx)?;

        if end.is_some() {
            // Fell off the end of the body
            if is_type_void(self.tree, return_type) {
                self.builder.build_return(None)?;
            } else {
                return Err(CodegenError::MissingReturn(name));
            }
        }

        if !function.verify(true) {
            return Err(CodegenError::VerificationFailed(name));
        }
        Ok(())
    }

    // -- statements -------------------------------------------------------

    /// Emit one statement into `current`, returning the block where
    /// execution continues (`None` when the statement terminated).
    ///
    /// The builder is positioned at the returned block on exit.
    fn statement(
        &mut self,
        statement: NodeId,
        current: BasicBlock<'ctx>,
        cx: StatementContext<'ctx>,
    ) -> Result<Option<BasicBlock<'ctx>>> {
        match self.tree.kind(statement) {
            NodeKind::StatementBasic { .. } => self.statement_basic(statement, cx),
            NodeKind::StatementValue { .. } => self.statement_value(statement, current, cx),
            NodeKind::StatementDeclaration { .. } => {
                self.statement_declaration(statement, current)
            }
            NodeKind::StatementBlock { .. } => self.statement_block(statement, current, cx),
            NodeKind::StatementIf { .. } => self.statement_if(statement, cx),
            NodeKind::StatementWhile { .. } => self.statement_while(statement, cx),
            other => ice!("{} is not a statement", other.kind_name()),
        }
    }

    fn statement_basic(
        &mut self,
        statement: NodeId,
        cx: StatementContext<'ctx>,
    ) -> Result<Option<BasicBlock<'ctx>>> {
        let NodeKind::StatementBasic { basic_kind } = *self.tree.kind(statement) else {
            unreachable!()
        };
        match basic_kind {
            StatementBasicKind::Continue => {
                let Some(loop_body) = cx.loop_body else {
                    return Err(CodegenError::OutsideLoop("continue"));
                };
                self.builder.build_unconditional_branch(loop_body)?;
            }
            StatementBasicKind::Break => {
                let Some(loop_after) = cx.loop_after else {
                    return Err(CodegenError::OutsideLoop("break"));
                };
                self.builder.build_unconditional_branch(loop_after)?;
            }
            StatementBasicKind::ReturnVoid => {
                self.builder.build_return(None)?;
            }
        }
        Ok(None)
    }

    fn statement_value(
        &mut self,
        statement: NodeId,
        current: BasicBlock<'ctx>,
        cx: StatementContext<'ctx>,
    ) -> Result<Option<BasicBlock<'ctx>>> {
        let NodeKind::StatementValue { value_kind, value } = *self.tree.kind(statement) else {
            unreachable!()
        };
        let Some(value) = value else {
            ice!("value statement has no value; were the passes run?")
        };

        match value_kind {
            StatementValueKind::Execute => {
                // Evaluate for side effects; void calls have no value
                if matches!(self.tree.kind(value), NodeKind::ValueCall { .. }) {
                    self.call_value(value)?;
                } else {
                    self.value(value)?;
                }
                Ok(Some(current))
            }
            StatementValueKind::Return => {
                let NodeKind::DeclarationFunction { return_type, .. } =
                    self.tree.kind(cx.function)
                else {
                    ice!("return statement outside of a function")
                };
                let Some(return_type) = *return_type else {
                    ice!("surrounding function has no return type")
                };
                let result = self.value_implicit_cast(value, return_type)?;
                self.builder.build_return(Some(&result))?;
                Ok(None)
            }
        }
    }

    fn statement_declaration(
        &mut self,
        statement: NodeId,
        current: BasicBlock<'ctx>,
    ) -> Result<Option<BasicBlock<'ctx>>> {
        let NodeKind::StatementDeclaration { declaration } = *self.tree.kind(statement) else {
            unreachable!()
        };
        let Some(declaration) = declaration else {
            ice!("declaration statement has no declaration; were the passes run?")
        };
        let NodeKind::DeclarationVariable {
            name,
            ty,
            initial_value,
            resolved_type,
        } = self.tree.kind(declaration)
        else {
            ice!("only variables can be declared inside a function")
        };
        let name = name.clone();
        let initial_value = *initial_value;
        let Some(var_type) = ty.or(*resolved_type) else {
            ice!("variable '{name}' has no resolved type; were the passes run?")
        };

        let llvm_type = self.types.basic_type(self.tree, var_type)?;
        let slot = self.builder.build_alloca(llvm_type, &name)?;
        self.storage.insert(declaration, Storage::Slot(slot));

        if let Some(initial_value) = initial_value {
            let value = self.value_implicit_cast(initial_value, var_type)?;
            self.builder.build_store(slot, value)?;
        }

        Ok(Some(current))
    }

    fn statement_block(
        &mut self,
        block: NodeId,
        current: BasicBlock<'ctx>,
        cx: StatementContext<'ctx>,
    ) -> Result<Option<BasicBlock<'ctx>>> {
        let NodeKind::StatementBlock { statements, .. } = self.tree.kind(block) else {
            unreachable!()
        };
        let statements = statements.clone();

        let mut current = Some(current);
        for statement in statements {
            let Some(block) = current else {
                return Err(CodegenError::UnreachableCode);
            };
            current = self.statement(statement, block, cx)?;
        }
        Ok(current)
    }

    fn statement_if(
        &mut self,
        statement: NodeId,
        cx: StatementContext<'ctx>,
    ) -> Result<Option<BasicBlock<'ctx>>> {
        let NodeKind::StatementIf {
            condition,
            then_branch,
            else_branch,
        } = *self.tree.kind(statement)
        else {
            unreachable!()
        };
        let (Some(condition), Some(then_branch)) = (condition, then_branch) else {
            ice!("if statement is missing children; were the passes run?")
        };

        let then_block = self.context.append_basic_block(cx.llvm_function, "if:then");
        let else_block =
            else_branch.map(|_| self.context.append_basic_block(cx.llvm_function, "if:else"));
        let after_block = self.context.append_basic_block(cx.llvm_function, "if:after");

        let condition_value = self.value(condition)?.into_int_value();
        self.builder.build_conditional_branch(
            condition_value,
            then_block,
            else_block.unwrap_or(after_block),
        )?;

        self.builder.position_at_end(then_block);
        let then_end = self.statement(then_branch, then_block, cx)?;
        if then_end.is_some() {
            self.builder.build_unconditional_branch(after_block)?;
        }

        if let (Some(else_branch), Some(else_block)) = (else_branch, else_block) {
            self.builder.position_at_end(else_block);
            let else_end = self.statement(else_branch, else_block, cx)?;
            if else_end.is_some() {
                self.builder.build_unconditional_branch(after_block)?;
            }
        }

        // If every path terminated, nothing branches to the after block;
        // drop it and report termination upward
        if after_block.get_first_use().is_none() {
            let _ = after_block.remove_from_function();
            return Ok(None);
        }

        self.builder.position_at_end(after_block);
        Ok(Some(after_block))
    }

    fn statement_while(
        &mut self,
        statement: NodeId,
        cx: StatementContext<'ctx>,
    ) -> Result<Option<BasicBlock<'ctx>>> {
        let NodeKind::StatementWhile {
            condition,
            body,
            is_do_while,
        } = *self.tree.kind(statement)
        else {
            unreachable!()
        };
        let (Some(condition), Some(body)) = (condition, body) else {
            ice!("while statement is missing children; were the passes run?")
        };

        let body_block = self
            .context
            .append_basic_block(cx.llvm_function, "while:body");
        let after_block = self
            .context
            .append_basic_block(cx.llvm_function, "while:after");

        if is_do_while {
            self.builder.build_unconditional_branch(body_block)?;
        } else {
            let condition_value = self.value(condition)?.into_int_value();
            self.builder
                .build_conditional_branch(condition_value, body_block, after_block)?;
        }

        self.builder.position_at_end(body_block);
        let loop_cx = StatementContext {
            loop_body: Some(body_block),
            loop_after: Some(after_block),
            ..cx
        };
        let body_end = self.statement(body, body_block, loop_cx)?;

        if body_end.is_some() {
            // Re-test at the end of the body
            let condition_value = self.value(condition)?.into_int_value();
            self.builder
                .build_conditional_branch(condition_value, body_block, after_block)?;
        }

        self.builder.position_at_end(after_block);
        Ok(Some(after_block))
    }

    // -- values -----------------------------------------------------------

    fn resolved_type(&self, value: NodeId) -> NodeId {
        match self.tree.resolved_type_of(value) {
            Some(ty) => ty,
            None => ice!(
                "{} node has no resolved type; were the passes run?",
                self.tree.kind(value).kind_name()
            ),
        }
    }

    /// Emit a value expression.
    fn value(&mut self, value: NodeId) -> Result<BasicValueEnum<'ctx>> {
        match self.tree.kind(value) {
            NodeKind::ValueLiteralBool { value: literal, .. } => Ok(self
                .context
                .bool_type()
                .const_int(*literal as u64, false)
                .into()),
            NodeKind::ValueLiteralNumber { value: number, .. } => Ok(match *number {
                NumberValue::U8(raw) => self.context.i8_type().const_int(raw as u64, false).into(),
                NumberValue::U16(raw) => {
                    self.context.i16_type().const_int(raw as u64, false).into()
                }
                NumberValue::U32(raw) => {
                    self.context.i32_type().const_int(raw as u64, false).into()
                }
                NumberValue::U64(raw) => self.context.i64_type().const_int(raw, false).into(),
                NumberValue::F32(raw) => {
                    self.context.f32_type().const_float(raw as f64).into()
                }
                NumberValue::F64(raw) => self.context.f64_type().const_float(raw).into(),
            }),
            NodeKind::ValueSymbol { name, .. } => {
                let name = name.clone();
                let Some(declaration) = self.tree.referenced_declaration_of(value) else {
                    ice!("symbol '{name}' was never resolved; were the passes run?")
                };
                if self.functions.contains_key(&declaration) {
                    return Err(CodegenError::Unsupported("functions as values"));
                }
                match self.storage.get(&declaration) {
                    Some(Storage::Direct(value)) => Ok(*value),
                    Some(Storage::Slot(slot)) => {
                        let slot = *slot;
                        let Some(var_type) = self.tree.resolved_type_of(declaration) else {
                            ice!("variable '{name}' has no resolved type; were the passes run?")
                        };
                        let llvm_type = self.types.basic_type(self.tree, var_type)?;
                        Ok(self
                            .builder
                            .build_load(llvm_type, slot, &format!("value_of:{name}"))?)
                    }
                    None => ice!("variable '{name}' has no storage; was it ever declared?"),
                }
            }
            NodeKind::ValueUnary { .. } => self.value_unary(value),
            NodeKind::ValueBinary { .. } => self.value_binary(value),
            NodeKind::ValueCall { .. } => self.call_value(value)?.ok_or(
                CodegenError::TypeMapping("a void call has no value".to_string()),
            ),
            NodeKind::ValueCast { .. } => {
                let NodeKind::ValueCast { value: inner, ty, .. } = *self.tree.kind(value) else {
                    unreachable!()
                };
                let (Some(inner), Some(ty)) = (inner, ty) else {
                    ice!("cast is missing children; were the passes run?")
                };
                // Explicit casts reuse the implicit emission; legality was
                // checked by validation
                self.value_implicit_cast(inner, ty)
            }
            other => ice!("{} is not a value", other.kind_name()),
        }
    }

    fn value_unary(&mut self, value: NodeId) -> Result<BasicValueEnum<'ctx>> {
        let NodeKind::ValueUnary {
            operator, operand, ..
        } = *self.tree.kind(value)
        else {
            unreachable!()
        };
        let Some(operand) = operand else {
            ice!("unary value has no operand; were the passes run?")
        };
        let result_type = self.resolved_type(value);

        match operator {
            UnaryOperator::BoolNot => {
                let operand_value = self.value_implicit_cast(operand, result_type)?;
                let all_true = self.context.bool_type().const_int(1, false);
                Ok(self
                    .builder
                    .build_xor(operand_value.into_int_value(), all_true, "bool_not")?
                    .into())
            }
            UnaryOperator::BitNot => {
                let operand_value = self
                    .value_implicit_cast(operand, result_type)?
                    .into_int_value();
                let all_ones = operand_value.get_type().const_all_ones();
                Ok(self
                    .builder
                    .build_xor(operand_value, all_ones, "bit_not")?
                    .into())
            }
            UnaryOperator::Pos => self.value_implicit_cast(operand, result_type),
            UnaryOperator::Neg => {
                let operand_value = self.value_implicit_cast(operand, result_type)?;
                if operand_value.is_float_value() {
                    Ok(self
                        .builder
                        .build_float_neg(operand_value.into_float_value(), "neg")?
                        .into())
                } else {
                    Ok(self
                        .builder
                        .build_int_neg(operand_value.into_int_value(), "neg")?
                        .into())
                }
            }
            UnaryOperator::Deref => {
                let pointer = self.value(operand)?.into_pointer_value();
                let operand_type = self.resolved_type(operand);
                let Some(pointee) = pointer_element_type(self.tree, operand_type) else {
                    ice!("dereferenced a non-pointer; was validation run?")
                };
                let llvm_type = self.types.basic_type(self.tree, pointee)?;
                Ok(self.builder.build_load(llvm_type, pointer, "deref")?)
            }
            UnaryOperator::GetAddr => Ok(self.lvalue(operand)?.into()),
        }
    }

    fn value_binary(&mut self, value: NodeId) -> Result<BasicValueEnum<'ctx>> {
        let NodeKind::ValueBinary {
            operator, lhs, rhs, ..
        } = *self.tree.kind(value)
        else {
            unreachable!()
        };
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            ice!("binary value has a null side; were the passes run?")
        };

        if operator == BinaryOperator::MemberAccess {
            return Err(CodegenError::Unsupported("member access codegen"));
        }

        // Comparisons cannot take their operand type from the (bool)
        // result, so compute the arithmetic containing type on the fly
        let operand_type = if operator.is_comparison() {
            let lhs_type = self.resolved_type(lhs);
            let rhs_type = self.resolved_type(rhs);
            let span = self.tree.span(value);
            // Any cap warning was already reported during resolution
            let mut scratch = Messages::new();
            arithmetic_containing_type(
                self.tree,
                &self.target,
                lhs_type,
                rhs_type,
                span,
                &mut scratch,
            )
            .unwrap_or_else(|| ice!("comparison operands are not numeric; was validation run?"))
        } else {
            self.resolved_type(value)
        };

        let operands_float = is_type_float(self.tree, operand_type);
        let operands_signed = integer_signedness(self.tree, operand_type).unwrap_or(false);

        if operator == BinaryOperator::Assign {
            let slot = self.lvalue(lhs)?;
            let rhs_value = self.value_implicit_cast(rhs, operand_type)?;
            self.builder.build_store(slot, rhs_value)?;
            return Ok(rhs_value);
        }

        if let Some(base) = operator.compound_base() {
            let slot = self.lvalue(lhs)?;
            let lhs_value = self.value_implicit_cast(lhs, operand_type)?;
            let rhs_value = self.value_implicit_cast(rhs, operand_type)?;
            let result = self.apply_binary_operator(
                base,
                lhs_value,
                rhs_value,
                operands_float,
                operands_signed,
            )?;
            self.builder.build_store(slot, result)?;
            return Ok(result);
        }

        let lhs_value = self.value_implicit_cast(lhs, operand_type)?;
        let rhs_value = self.value_implicit_cast(rhs, operand_type)?;
        self.apply_binary_operator(operator, lhs_value, rhs_value, operands_float, operands_signed)
    }

    /// The operator x (float, signed) instruction table.
    fn apply_binary_operator(
        &mut self,
        operator: BinaryOperator,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
        operands_float: bool,
        operands_signed: bool,
    ) -> Result<BasicValueEnum<'ctx>> {
        macro_rules! int {
            () => {
                (lhs.into_int_value(), rhs.into_int_value())
            };
        }
        macro_rules! float {
            () => {
                (lhs.into_float_value(), rhs.into_float_value())
            };
        }

        let value: BasicValueEnum<'ctx> = match operator {
            BinaryOperator::BoolAnd => {
                let (l, r) = int!();
                self.builder.build_and(l, r, "bool_and")?.into()
            }
            BinaryOperator::BoolOr => {
                let (l, r) = int!();
                self.builder.build_or(l, r, "bool_or")?.into()
            }
            BinaryOperator::BitAnd => {
                let (l, r) = int!();
                self.builder.build_and(l, r, "bit_and")?.into()
            }
            BinaryOperator::BitOr => {
                let (l, r) = int!();
                self.builder.build_or(l, r, "bit_or")?.into()
            }
            BinaryOperator::BitXor => {
                let (l, r) = int!();
                self.builder.build_xor(l, r, "bit_xor")?.into()
            }
            BinaryOperator::BitShl => {
                let (l, r) = int!();
                self.builder.build_left_shift(l, r, "bit_shl")?.into()
            }
            BinaryOperator::BitShr => {
                let (l, r) = int!();
                self.builder
                    .build_right_shift(l, r, operands_signed, "bit_shr")?
                    .into()
            }
            BinaryOperator::Add => {
                if operands_float {
                    let (l, r) = float!();
                    self.builder.build_float_add(l, r, "add")?.into()
                } else {
                    let (l, r) = int!();
                    self.builder.build_int_add(l, r, "add")?.into()
                }
            }
            BinaryOperator::Sub => {
                if operands_float {
                    let (l, r) = float!();
                    self.builder.build_float_sub(l, r, "sub")?.into()
                } else {
                    let (l, r) = int!();
                    self.builder.build_int_sub(l, r, "sub")?.into()
                }
            }
            BinaryOperator::Mul => {
                if operands_float {
                    let (l, r) = float!();
                    self.builder.build_float_mul(l, r, "mul")?.into()
                } else {
                    let (l, r) = int!();
                    self.builder.build_int_mul(l, r, "mul")?.into()
                }
            }
            BinaryOperator::Div => {
                if operands_float {
                    let (l, r) = float!();
                    self.builder.build_float_div(l, r, "div")?.into()
                } else if operands_signed {
                    let (l, r) = int!();
                    self.builder.build_int_signed_div(l, r, "div")?.into()
                } else {
                    let (l, r) = int!();
                    self.builder.build_int_unsigned_div(l, r, "div")?.into()
                }
            }
            BinaryOperator::Mod => {
                if operands_float {
                    let (l, r) = float!();
                    self.builder.build_float_rem(l, r, "mod")?.into()
                } else if operands_signed {
                    let (l, r) = int!();
                    self.builder.build_int_signed_rem(l, r, "mod")?.into()
                } else {
                    let (l, r) = int!();
                    self.builder.build_int_unsigned_rem(l, r, "mod")?.into()
                }
            }
            BinaryOperator::Exp => {
                return Err(CodegenError::Unsupported("the exponentiation operator"));
            }
            BinaryOperator::Eq => self.comparison(
                lhs,
                rhs,
                operands_float,
                IntPredicate::EQ,
                FloatPredicate::OEQ,
                "eq",
            )?,
            BinaryOperator::Ne => self.comparison(
                lhs,
                rhs,
                operands_float,
                IntPredicate::NE,
                FloatPredicate::ONE,
                "ne",
            )?,
            BinaryOperator::Lt => self.comparison(
                lhs,
                rhs,
                operands_float,
                if operands_signed {
                    IntPredicate::SLT
                } else {
                    IntPredicate::ULT
                },
                FloatPredicate::OLT,
                "lt",
            )?,
            BinaryOperator::Le => self.comparison(
                lhs,
                rhs,
                operands_float,
                if operands_signed {
                    IntPredicate::SLE
                } else {
                    IntPredicate::ULE
                },
                FloatPredicate::OLE,
                "le",
            )?,
            BinaryOperator::Gt => self.comparison(
                lhs,
                rhs,
                operands_float,
                if operands_signed {
                    IntPredicate::SGT
                } else {
                    IntPredicate::UGT
                },
                FloatPredicate::OGT,
                "gt",
            )?,
            BinaryOperator::Ge => self.comparison(
                lhs,
                rhs,
                operands_float,
                if operands_signed {
                    IntPredicate::SGE
                } else {
                    IntPredicate::UGE
                },
                FloatPredicate::OGE,
                "ge",
            )?,
            BinaryOperator::MemberAccess
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
                ice!("operator handled before the instruction table")
            }
        };
        Ok(value)
    }

    fn comparison(
        &mut self,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
        operands_float: bool,
        int_predicate: IntPredicate,
        float_predicate: FloatPredicate,
        name: &str,
    ) -> Result<BasicValueEnum<'ctx>> {
        if operands_float {
            Ok(self
                .builder
                .build_float_compare(
                    float_predicate,
                    lhs.into_float_value(),
                    rhs.into_float_value(),
                    name,
                )?
                .into())
        } else {
            Ok(self
                .builder
                .build_int_compare(
                    int_predicate,
                    lhs.into_int_value(),
                    rhs.into_int_value(),
                    name,
                )?
                .into())
        }
    }

    /// Emit a call, returning `None` for void callees.
    fn call_value(&mut self, value: NodeId) -> Result<Option<BasicValueEnum<'ctx>>> {
        let NodeKind::ValueCall { callee, args, .. } = self.tree.kind(value) else {
            unreachable!()
        };
        let args = args.clone();
        let Some(callee) = *callee else {
            ice!("call has no callee; were the passes run?")
        };

        let function = self.callee_function(callee)?;

        let callee_type = self.resolved_type(callee);
        let concrete = concrete_type(self.tree, callee_type);
        let NodeKind::TypeFunction { arg_types, .. } = self.tree.kind(concrete) else {
            ice!("callee is not a function; was validation run?")
        };
        let arg_types = arg_types.clone();

        if args.len() != arg_types.len() {
            ice!("call arity mismatch survived validation");
        }

        let mut llvm_args: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(args.len());
        for (&arg, &arg_type) in args.iter().zip(arg_types.iter()) {
            llvm_args.push(self.value_implicit_cast(arg, arg_type)?.into());
        }

        let call = self.builder.build_call(function, &llvm_args, "call")?;
        Ok(call.try_as_basic_value().left())
    }

    /// The function a callee expression names.
    ///
    /// Callees are direct: a symbol naming a function, or a namespace
    /// member access whose right side resolved to a function.
    fn callee_function(&self, callee: NodeId) -> Result<FunctionValue<'ctx>> {
        let declaration = match self.tree.kind(callee) {
            NodeKind::ValueSymbol {
                referenced_declaration,
                ..
            } => *referenced_declaration,
            NodeKind::ValueBinary {
                operator: BinaryOperator::MemberAccess,
                rhs: Some(rhs),
                ..
            } => self.tree.referenced_declaration_of(*rhs),
            _ => None,
        };
        declaration
            .and_then(|declaration| self.functions.get(&declaration).copied())
            .ok_or(CodegenError::Unsupported("indirect calls"))
    }

    /// The storage location an l-value expression denotes.
    fn lvalue(&mut self, value: NodeId) -> Result<PointerValue<'ctx>> {
        match self.tree.kind(value) {
            NodeKind::ValueSymbol { name, .. } => {
                let name = name.clone();
                let Some(declaration) = self.tree.referenced_declaration_of(value) else {
                    ice!("symbol '{name}' was never resolved; were the passes run?")
                };
                match self.storage.get(&declaration) {
                    Some(Storage::Slot(slot)) => Ok(*slot),
                    Some(Storage::Direct(_)) => Err(CodegenError::Unsupported(
                        "taking the storage of a function argument",
                    )),
                    None => ice!("variable '{name}' has no storage; was it ever declared?"),
                }
            }
            NodeKind::ValueUnary {
                operator: UnaryOperator::Deref,
                operand: Some(operand),
                ..
            } => {
                let operand = *operand;
                Ok(self.value(operand)?.into_pointer_value())
            }
            NodeKind::ValueBinary {
                operator: BinaryOperator::MemberAccess,
                ..
            } => Err(CodegenError::Unsupported("member access codegen")),
            other => ice!("{} is not an l-value; was validation run?", other.kind_name()),
        }
    }

    // -- casts ------------------------------------------------------------

    /// Emit a value and convert it to the given type.
    ///
    /// Implicit positions and explicit `as` casts share this emission; the
    /// difference between them is purely one of validation.
    fn value_implicit_cast(
        &mut self,
        value: NodeId,
        to_type: NodeId,
    ) -> Result<BasicValueEnum<'ctx>> {
        let from_type = self.resolved_type(value);
        let llvm_value = self.value(value)?;
        self.cast_value(llvm_value, from_type, to_type)
    }

    fn cast_value(
        &mut self,
        value: BasicValueEnum<'ctx>,
        from_type: NodeId,
        to_type: NodeId,
    ) -> Result<BasicValueEnum<'ctx>> {
        let llvm_to = self.types.basic_type(self.tree, to_type)?;
        let llvm_from = value.get_type();

        if llvm_from == llvm_to {
            return Ok(value);
        }

        let from_signed = integer_signedness(self.tree, from_type).unwrap_or(false);
        let to_signed = integer_signedness(self.tree, to_type).unwrap_or(false);

        let result: BasicValueEnum<'ctx> = match (llvm_from, llvm_to) {
            (BasicTypeEnum::IntType(from), BasicTypeEnum::IntType(to)) => {
                if from.get_bit_width() < to.get_bit_width() {
                    if from_signed {
                        self.builder
                            .build_int_s_extend(value.into_int_value(), to, "sext")?
                            .into()
                    } else {
                        self.builder
                            .build_int_z_extend(value.into_int_value(), to, "zext")?
                            .into()
                    }
                } else {
                    self.builder
                        .build_int_truncate(value.into_int_value(), to, "trunc")?
                        .into()
                }
            }
            (BasicTypeEnum::IntType(_), BasicTypeEnum::FloatType(to)) => {
                if from_signed {
                    self.builder
                        .build_signed_int_to_float(value.into_int_value(), to, "sitofp")?
                        .into()
                } else {
                    self.builder
                        .build_unsigned_int_to_float(value.into_int_value(), to, "uitofp")?
                        .into()
                }
            }
            (BasicTypeEnum::FloatType(_), BasicTypeEnum::IntType(to)) => {
                if to_signed {
                    self.builder
                        .build_float_to_signed_int(value.into_float_value(), to, "fptosi")?
                        .into()
                } else {
                    self.builder
                        .build_float_to_unsigned_int(value.into_float_value(), to, "fptoui")?
                        .into()
                }
            }
            (BasicTypeEnum::FloatType(from), BasicTypeEnum::FloatType(to)) => {
                // The only distinct float pair is f32 and f64
                if from == self.context.f32_type() {
                    self.builder
                        .build_float_ext(value.into_float_value(), to, "fpext")?
                        .into()
                } else {
                    self.builder
                        .build_float_trunc(value.into_float_value(), to, "fptrunc")?
                        .into()
                }
            }
            (BasicTypeEnum::PointerType(_), BasicTypeEnum::IntType(to)) => self
                .builder
                .build_ptr_to_int(value.into_pointer_value(), to, "ptr_to_int")?
                .into(),
            (BasicTypeEnum::IntType(_), BasicTypeEnum::PointerType(to)) => self
                .builder
                .build_int_to_ptr(value.into_int_value(), to, "int_to_ptr")?
                .into(),
            (BasicTypeEnum::PointerType(_), BasicTypeEnum::PointerType(to)) => self
                .builder
                .build_pointer_cast(value.into_pointer_value(), to, "ptr_cast")?
                .into(),
            (from, to) => ice!("unsupported cast from {from:?} to {to:?}"),
        };
        Ok(result)
    }
}
