//! Type expression parsing.

use forge_lex::Token;

use crate::ast::{NodeId, NodeKind, TypeBasicKind, TypeUnaryKind, TypeWithBitWidthKind};
use crate::Parser;

impl Parser<'_> {
    /// Parse a type: `bool`, `void`, `isize`, `usize`, sized numerics,
    /// `const T`, `*T`, a parenthesized type, or a named type.
    pub(crate) fn parse_type(&mut self) -> Option<NodeId> {
        let start = self.peek_span();

        if self.eat(&Token::Const) {
            let inner = self.parse_type()?;
            self.set_const(inner);
            return Some(inner);
        }

        if self.eat(&Token::Star) {
            let operand_type = self.parse_type()?;
            let span = start.merge(self.tree.span(operand_type));
            return Some(self.tree.alloc(
                span,
                NodeKind::TypeUnary {
                    unary_kind: TypeUnaryKind::Pointer,
                    operand_type: Some(operand_type),
                    is_const: false,
                },
            ));
        }

        if self.eat(&Token::LParen) {
            let inner = self.parse_type()?;
            self.expect(Token::RParen, "to close the parenthesized type");
            return Some(inner);
        }

        let basic = match self.peek() {
            Token::Bool => Some(TypeBasicKind::Bool),
            Token::Void => Some(TypeBasicKind::Void),
            Token::Isize => Some(TypeBasicKind::Isize),
            Token::Usize => Some(TypeBasicKind::Usize),
            _ => None,
        };
        if let Some(basic_kind) = basic {
            self.bump();
            return Some(self.tree.alloc(
                start,
                NodeKind::TypeBasic {
                    basic_kind,
                    is_const: false,
                },
            ));
        }

        let sized = match self.peek() {
            Token::I8 => Some((TypeWithBitWidthKind::SignedInt, 8)),
            Token::I16 => Some((TypeWithBitWidthKind::SignedInt, 16)),
            Token::I32 => Some((TypeWithBitWidthKind::SignedInt, 32)),
            Token::I64 => Some((TypeWithBitWidthKind::SignedInt, 64)),
            Token::U8 => Some((TypeWithBitWidthKind::UnsignedInt, 8)),
            Token::U16 => Some((TypeWithBitWidthKind::UnsignedInt, 16)),
            Token::U32 => Some((TypeWithBitWidthKind::UnsignedInt, 32)),
            Token::U64 => Some((TypeWithBitWidthKind::UnsignedInt, 64)),
            Token::F32 => Some((TypeWithBitWidthKind::Float, 32)),
            Token::F64 => Some((TypeWithBitWidthKind::Float, 64)),
            _ => None,
        };
        if let Some((width_kind, bit_width)) = sized {
            self.bump();
            return Some(self.tree.alloc(
                start,
                NodeKind::TypeWithBitWidth {
                    width_kind,
                    bit_width,
                    is_const: false,
                },
            ));
        }

        if let Token::Ident(name) = self.peek().clone() {
            self.bump();
            return Some(self.tree.alloc(
                start,
                NodeKind::TypeSymbol {
                    name,
                    referenced_declaration: None,
                    is_const: false,
                },
            ));
        }

        let found = self.peek().describe();
        self.error_here(format!("expected a type, found {found}"));
        None
    }

    fn set_const(&mut self, ty: NodeId) {
        match self.tree.kind_mut(ty) {
            NodeKind::TypeBasic { is_const, .. }
            | NodeKind::TypeWithBitWidth { is_const, .. }
            | NodeKind::TypeSymbol { is_const, .. }
            | NodeKind::TypeUnary { is_const, .. }
            | NodeKind::TypeFunction { is_const, .. }
            | NodeKind::TypeStructured { is_const, .. } => *is_const = true,
            other => forge_util::ice!("cannot const-qualify a {} node", other.kind_name()),
        }
    }
}
