//! Expression parsing.
//!
//! Precedence climbing, loosest first: assignment, `||`, `&&`, `|`, `^`,
//! `&`, equality, relational, shifts, additive, multiplicative, `**`
//! (right-associative), `as` casts, prefix unary, postfix (calls and member
//! access), primary.

use forge_lex::{LiteralSuffix, Token};
use forge_util::{DiagnosticBuilder, DiagnosticCode, Span};

use crate::ast::{
    BinaryOperator, NodeId, NodeKind, NumberValue, TypeWithBitWidthKind, UnaryOperator,
};
use crate::Parser;

impl Parser<'_> {
    /// Parse a full expression.
    pub(crate) fn parse_expression(&mut self) -> Option<NodeId> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Option<NodeId> {
        let lhs = self.parse_bool_or()?;

        let operator = match self.peek() {
            Token::Assign => BinaryOperator::Assign,
            Token::PlusAssign => BinaryOperator::AddAssign,
            Token::MinusAssign => BinaryOperator::SubAssign,
            Token::StarAssign => BinaryOperator::MulAssign,
            Token::SlashAssign => BinaryOperator::DivAssign,
            Token::PercentAssign => BinaryOperator::ModAssign,
            Token::StarStarAssign => BinaryOperator::ExpAssign,
            Token::ShlAssign => BinaryOperator::BitShlAssign,
            Token::ShrAssign => BinaryOperator::BitShrAssign,
            Token::AmpAssign => BinaryOperator::BitAndAssign,
            Token::PipeAssign => BinaryOperator::BitOrAssign,
            Token::CaretAssign => BinaryOperator::BitXorAssign,
            _ => return Some(lhs),
        };
        self.bump();

        // Right-associative
        let rhs = self.parse_assignment()?;
        Some(self.binary(operator, lhs, rhs))
    }

    fn parse_bool_or(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_bool_and()?;
        while self.eat(&Token::PipePipe) {
            let rhs = self.parse_bool_and()?;
            lhs = self.binary(BinaryOperator::BoolOr, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_bool_and(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_bit_or()?;
        while self.eat(&Token::AmpAmp) {
            let rhs = self.parse_bit_or()?;
            lhs = self.binary(BinaryOperator::BoolAnd, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_bit_or(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_bit_xor()?;
        while self.eat(&Token::Pipe) {
            let rhs = self.parse_bit_xor()?;
            lhs = self.binary(BinaryOperator::BitOr, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_bit_xor(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_bit_and()?;
        while self.eat(&Token::Caret) {
            let rhs = self.parse_bit_and()?;
            lhs = self.binary(BinaryOperator::BitXor, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_bit_and(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&Token::Amp) {
            let rhs = self.parse_equality()?;
            lhs = self.binary(BinaryOperator::BitAnd, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_equality(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_relational()?;
        loop {
            let operator = match self.peek() {
                Token::EqEq => BinaryOperator::Eq,
                Token::NotEq => BinaryOperator::Ne,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_relational()?;
            lhs = self.binary(operator, lhs, rhs);
        }
    }

    fn parse_relational(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_shift()?;
        loop {
            let operator = match self.peek() {
                Token::Lt => BinaryOperator::Lt,
                Token::Le => BinaryOperator::Le,
                Token::Gt => BinaryOperator::Gt,
                Token::Ge => BinaryOperator::Ge,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_shift()?;
            lhs = self.binary(operator, lhs, rhs);
        }
    }

    fn parse_shift(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_additive()?;
        loop {
            let operator = match self.peek() {
                Token::Shl => BinaryOperator::BitShl,
                Token::Shr => BinaryOperator::BitShr,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_additive()?;
            lhs = self.binary(operator, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let operator = match self.peek() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Sub,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_multiplicative()?;
            lhs = self.binary(operator, lhs, rhs);
        }
    }

    fn parse_multiplicative(&mut self) -> Option<NodeId> {
        let mut lhs = self.parse_exponent()?;
        loop {
            let operator = match self.peek() {
                Token::Star => BinaryOperator::Mul,
                Token::Slash => BinaryOperator::Div,
                Token::Percent => BinaryOperator::Mod,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_exponent()?;
            lhs = self.binary(operator, lhs, rhs);
        }
    }

    fn parse_exponent(&mut self) -> Option<NodeId> {
        let lhs = self.parse_cast()?;
        if self.eat(&Token::StarStar) {
            // Right-associative
            let rhs = self.parse_exponent()?;
            return Some(self.binary(BinaryOperator::Exp, lhs, rhs));
        }
        Some(lhs)
    }

    fn parse_cast(&mut self) -> Option<NodeId> {
        let mut value = self.parse_unary()?;
        while self.eat(&Token::As) {
            let ty = self.parse_type()?;
            let span = self.tree.span(value).merge(self.prev_span());
            value = self.tree.alloc(
                span,
                NodeKind::ValueCast {
                    value: Some(value),
                    ty: Some(ty),
                    resolved_type: None,
                },
            );
        }
        Some(value)
    }

    fn parse_unary(&mut self) -> Option<NodeId> {
        let operator = match self.peek() {
            Token::Bang => UnaryOperator::BoolNot,
            Token::Tilde => UnaryOperator::BitNot,
            Token::Plus => UnaryOperator::Pos,
            Token::Minus => UnaryOperator::Neg,
            Token::Star => UnaryOperator::Deref,
            Token::Amp => UnaryOperator::GetAddr,
            _ => return self.parse_postfix(),
        };
        let start = self.peek_span();
        self.bump();

        // A minus directly before an integer literal folds into the
        // literal, so that i64::MIN-shaped values stay in range. Unsigned
        // suffixes keep the unary operator; validation warns about them.
        if operator == UnaryOperator::Neg {
            if let Token::Int(value, suffix) = *self.peek() {
                let signed = match suffix {
                    None
                    | Some(LiteralSuffix::I8)
                    | Some(LiteralSuffix::I16)
                    | Some(LiteralSuffix::I32)
                    | Some(LiteralSuffix::I64) => true,
                    Some(LiteralSuffix::F32) | Some(LiteralSuffix::F64) => true,
                    _ => false,
                };
                if signed {
                    let literal_span = self.peek_span();
                    self.bump();
                    let span = start.merge(literal_span);
                    return Some(self.make_int_literal(span, value, suffix, true));
                }
            }
            if let Token::Float(value, suffix) = *self.peek() {
                let literal_span = self.peek_span();
                self.bump();
                let span = start.merge(literal_span);
                return Some(self.make_float_literal(span, -value, suffix));
            }
        }

        let operand = self.parse_unary()?;
        let span = start.merge(self.tree.span(operand));
        Some(self.tree.alloc(
            span,
            NodeKind::ValueUnary {
                operator,
                operand: Some(operand),
                resolved_type: None,
            },
        ))
    }

    fn parse_postfix(&mut self) -> Option<NodeId> {
        let mut value = self.parse_primary()?;

        loop {
            if self.eat(&Token::LParen) {
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.parse_expression()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                    self.expect(Token::RParen, "after the call arguments");
                }
                let span = self.tree.span(value).merge(self.prev_span());
                value = self.tree.alloc(
                    span,
                    NodeKind::ValueCall {
                        callee: Some(value),
                        args,
                        resolved_type: None,
                    },
                );
            } else if self.eat(&Token::Dot) {
                let member_span = self.peek_span();
                let member = self.expect_ident("after '.'")?;
                let rhs = self.tree.alloc(
                    member_span,
                    NodeKind::ValueSymbol {
                        name: member,
                        referenced_declaration: None,
                        resolved_type: None,
                    },
                );
                let span = self.tree.span(value).merge(member_span);
                value = self.tree.alloc(
                    span,
                    NodeKind::ValueBinary {
                        operator: BinaryOperator::MemberAccess,
                        lhs: Some(value),
                        rhs: Some(rhs),
                        resolved_type: None,
                    },
                );
            } else {
                return Some(value);
            }
        }
    }

    fn parse_primary(&mut self) -> Option<NodeId> {
        let span = self.peek_span();
        match self.peek().clone() {
            Token::True => {
                self.bump();
                Some(self.tree.alloc(
                    span,
                    NodeKind::ValueLiteralBool {
                        value: true,
                        resolved_type: None,
                    },
                ))
            }
            Token::False => {
                self.bump();
                Some(self.tree.alloc(
                    span,
                    NodeKind::ValueLiteralBool {
                        value: false,
                        resolved_type: None,
                    },
                ))
            }
            Token::Int(value, suffix) => {
                self.bump();
                Some(self.make_int_literal(span, value, suffix, false))
            }
            Token::Float(value, suffix) => {
                self.bump();
                Some(self.make_float_literal(span, value, suffix))
            }
            Token::Ident(name) => {
                self.bump();
                Some(self.tree.alloc(
                    span,
                    NodeKind::ValueSymbol {
                        name,
                        referenced_declaration: None,
                        resolved_type: None,
                    },
                ))
            }
            Token::SelfValue => {
                self.bump();
                Some(self.tree.alloc(
                    span,
                    NodeKind::ValueSymbol {
                        name: "self".to_string(),
                        referenced_declaration: None,
                        resolved_type: None,
                    },
                ))
            }
            Token::LParen => {
                self.bump();
                let value = self.parse_expression()?;
                self.expect(Token::RParen, "to close the parenthesized expression");
                Some(value)
            }
            other => {
                self.error_here(format!("expected an expression, found {}", other.describe()));
                None
            }
        }
    }

    fn binary(&mut self, operator: BinaryOperator, lhs: NodeId, rhs: NodeId) -> NodeId {
        let span = self.tree.span(lhs).merge(self.tree.span(rhs));
        self.tree.alloc(
            span,
            NodeKind::ValueBinary {
                operator,
                lhs: Some(lhs),
                rhs: Some(rhs),
                resolved_type: None,
            },
        )
    }

    // -- literal materialization ------------------------------------------

    /// Build a number literal node from a lexed integer, fitting the value
    /// into its declared type and warning (WSY001) when it truncates.
    ///
    /// `negated` is true when a directly adjacent `-` was folded in.
    pub(crate) fn make_int_literal(
        &mut self,
        span: Span,
        value: u64,
        suffix: Option<LiteralSuffix>,
        negated: bool,
    ) -> NodeId {
        // Float suffixes can reach here through negation folding
        if let Some(suffix) = suffix {
            if suffix.is_float() {
                let float = if negated { -(value as f64) } else { value as f64 };
                return self.make_float_literal(span, float, Some(suffix));
            }
        }

        let (width_kind, bit_width) = match suffix {
            Some(LiteralSuffix::I8) => (TypeWithBitWidthKind::SignedInt, 8),
            Some(LiteralSuffix::I16) => (TypeWithBitWidthKind::SignedInt, 16),
            Some(LiteralSuffix::I32) | None => (TypeWithBitWidthKind::SignedInt, 32),
            Some(LiteralSuffix::I64) => (TypeWithBitWidthKind::SignedInt, 64),
            Some(LiteralSuffix::U8) => (TypeWithBitWidthKind::UnsignedInt, 8),
            Some(LiteralSuffix::U16) => (TypeWithBitWidthKind::UnsignedInt, 16),
            Some(LiteralSuffix::U32) => (TypeWithBitWidthKind::UnsignedInt, 32),
            Some(LiteralSuffix::U64) => (TypeWithBitWidthKind::UnsignedInt, 64),
            Some(LiteralSuffix::F32) | Some(LiteralSuffix::F64) => unreachable!(),
        };

        let parsed: i128 = if negated {
            -(value as i128)
        } else {
            value as i128
        };

        let fits = match (width_kind, bit_width) {
            (TypeWithBitWidthKind::SignedInt, n) => {
                let min = -(1i128 << (n - 1));
                let max = (1i128 << (n - 1)) - 1;
                parsed >= min && parsed <= max
            }
            (TypeWithBitWidthKind::UnsignedInt, n) => {
                let max = if n == 64 {
                    u64::MAX as i128
                } else {
                    (1i128 << n) - 1
                };
                parsed >= 0 && parsed <= max
            }
            (TypeWithBitWidthKind::Float, _) => true,
        };

        let raw = parsed as u64;
        let number = match bit_width {
            8 => NumberValue::U8(raw as u8),
            16 => NumberValue::U16(raw as u16),
            32 => NumberValue::U32(raw as u32),
            64 => NumberValue::U64(raw),
            _ => unreachable!(),
        };

        if !fits {
            let truncated_display = match (width_kind, number) {
                (TypeWithBitWidthKind::SignedInt, NumberValue::U8(v)) => {
                    (v as i8).to_string()
                }
                (TypeWithBitWidthKind::SignedInt, NumberValue::U16(v)) => {
                    (v as i16).to_string()
                }
                (TypeWithBitWidthKind::SignedInt, NumberValue::U32(v)) => {
                    (v as i32).to_string()
                }
                (TypeWithBitWidthKind::SignedInt, NumberValue::U64(v)) => {
                    (v as i64).to_string()
                }
                (_, NumberValue::U8(v)) => v.to_string(),
                (_, NumberValue::U16(v)) => v.to_string(),
                (_, NumberValue::U32(v)) => v.to_string(),
                (_, NumberValue::U64(v)) => v.to_string(),
                (_, NumberValue::F32(v)) => v.to_string(),
                (_, NumberValue::F64(v)) => v.to_string(),
            };
            let type_name = match (width_kind, bit_width) {
                (TypeWithBitWidthKind::SignedInt, n) => format!("i{n}"),
                (TypeWithBitWidthKind::UnsignedInt, n) => format!("u{n}"),
                (TypeWithBitWidthKind::Float, n) => format!("f{n}"),
            };
            DiagnosticBuilder::warning(format!(
                "literal value does not fit in type {type_name}"
            ))
            .code(DiagnosticCode::VALUE_DOES_NOT_FIT_IN_TYPE)
            .span(span)
            .note(format!("was parsed as {parsed}"))
            .note(format!("but got truncated to {truncated_display}"))
            .emit(self.messages);
        }

        let ty = self.tree.alloc(
            span,
            NodeKind::TypeWithBitWidth {
                width_kind,
                bit_width,
                is_const: false,
            },
        );
        self.tree.alloc(
            span,
            NodeKind::ValueLiteralNumber {
                ty: Some(ty),
                value: number,
                resolved_type: None,
            },
        )
    }

    /// Build a number literal node from a lexed float.
    pub(crate) fn make_float_literal(
        &mut self,
        span: Span,
        value: f64,
        suffix: Option<LiteralSuffix>,
    ) -> NodeId {
        let (bit_width, number) = match suffix {
            Some(LiteralSuffix::F32) => (32, NumberValue::F32(value as f32)),
            Some(LiteralSuffix::F64) | None => (64, NumberValue::F64(value)),
            Some(other) => {
                self.error_here(format!(
                    "integer suffix {other:?} cannot be used on a float literal"
                ));
                (64, NumberValue::F64(value))
            }
        };

        let ty = self.tree.alloc(
            span,
            NodeKind::TypeWithBitWidth {
                width_kind: TypeWithBitWidthKind::Float,
                bit_width,
                is_const: false,
            },
        );
        self.tree.alloc(
            span,
            NodeKind::ValueLiteralNumber {
                ty: Some(ty),
                value: number,
                resolved_type: None,
            },
        )
    }
}
