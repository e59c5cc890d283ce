//! Mapping of resolved syntax-tree types onto LLVM types.

use forge_par::ast::{NodeId, NodeKind, SyntaxTree, TypeBasicKind, TypeWithBitWidthKind};
use forge_sem::{concrete_type, type_display, TargetInfo};
use inkwell::context::Context;
use inkwell::types::{BasicMetadataTypeEnum, BasicTypeEnum, FunctionType, IntType};
use inkwell::AddressSpace;

use crate::error::{CodegenError, Result};

/// Translates resolved types into LLVM types
///
/// `isize`/`usize` become integers of the target pointer width; pointers
/// are opaque. `void` has no value representation and is only legal as a
/// function return type.
pub struct TypeMapper<'ctx> {
    context: &'ctx Context,
    target: TargetInfo,
}

impl<'ctx> TypeMapper<'ctx> {
    pub fn new(context: &'ctx Context, target: TargetInfo) -> Self {
        Self { context, target }
    }

    fn int_type(&self, bit_width: u32) -> IntType<'ctx> {
        match bit_width {
            8 => self.context.i8_type(),
            16 => self.context.i16_type(),
            32 => self.context.i32_type(),
            64 => self.context.i64_type(),
            other => forge_util::ice!("unsupported integer bit width: {other}"),
        }
    }

    /// The LLVM value type for a resolved type node
    pub fn basic_type(&self, tree: &SyntaxTree, ty: NodeId) -> Result<BasicTypeEnum<'ctx>> {
        let concrete = concrete_type(tree, ty);
        match tree.kind(concrete) {
            NodeKind::TypeBasic { basic_kind, .. } => match basic_kind {
                TypeBasicKind::Bool => Ok(self.context.bool_type().into()),
                TypeBasicKind::Void => Err(CodegenError::TypeMapping(
                    "void has no value representation".to_string(),
                )),
                TypeBasicKind::Isize | TypeBasicKind::Usize => {
                    Ok(self.int_type(self.target.pointer_bit_width).into())
                }
            },
            NodeKind::TypeWithBitWidth {
                width_kind,
                bit_width,
                ..
            } => match width_kind {
                TypeWithBitWidthKind::SignedInt | TypeWithBitWidthKind::UnsignedInt => {
                    Ok(self.int_type(*bit_width).into())
                }
                TypeWithBitWidthKind::Float => match bit_width {
                    32 => Ok(self.context.f32_type().into()),
                    64 => Ok(self.context.f64_type().into()),
                    other => forge_util::ice!("unsupported float bit width: {other}"),
                },
            },
            NodeKind::TypeUnary { .. } => {
                Ok(self.context.ptr_type(AddressSpace::default()).into())
            }
            NodeKind::TypeStructured { .. } => {
                Err(CodegenError::Unsupported("structured type layout"))
            }
            NodeKind::TypeFunction { .. } => Err(CodegenError::TypeMapping(
                "function types are not value types".to_string(),
            )),
            NodeKind::TypeSymbol { name, .. } => Err(CodegenError::TypeMapping(format!(
                "type symbol '{name}' was never resolved"
            ))),
            other => Err(CodegenError::TypeMapping(format!(
                "{} is not a type",
                other.kind_name()
            ))),
        }
    }

    /// The LLVM function type for a return type and argument types
    ///
    /// `return_type` pointing at `void` produces a void function.
    pub fn function_type(
        &self,
        tree: &SyntaxTree,
        return_type: NodeId,
        arg_types: &[NodeId],
    ) -> Result<FunctionType<'ctx>> {
        let mut params: Vec<BasicMetadataTypeEnum<'ctx>> = Vec::with_capacity(arg_types.len());
        for &arg_type in arg_types {
            params.push(self.basic_type(tree, arg_type)?.into());
        }

        if forge_sem::is_type_void(tree, return_type) {
            return Ok(self.context.void_type().fn_type(&params, false));
        }

        let return_type = self.basic_type(tree, return_type).map_err(|_| {
            CodegenError::TypeMapping(format!(
                "cannot use {} as a return type",
                type_display(tree, return_type)
            ))
        })?;
        Ok(return_type.fn_type(&params, false))
    }
}
