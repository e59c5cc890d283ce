//! Number literal lexing.
//!
//! Handles decimal, hexadecimal (0x), binary (0b), and octal (0o) integers,
//! floating-point literals, and optional type suffixes (`256u8`, `1.5f32`).
//! Integer values are carried as raw `u64` bit patterns; fitting them into
//! their final type (and warning on truncation) happens when the literal is
//! materialized into a syntax-tree node.

use forge_util::{DiagnosticBuilder, DiagnosticCode};

use crate::token::{LiteralSuffix, Token};
use crate::Lexer;

impl Lexer<'_, '_> {
    /// Lexes a number literal. The current character must be a digit.
    pub(crate) fn lex_number(&mut self) -> Token {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        if self.cursor.current_char() == '0' {
            match self.cursor.peek_char(1) {
                'x' | 'X' => {
                    self.cursor.advance_n(2);
                    return self.lex_radix_integer(16, start, line, column);
                }
                'b' | 'B' => {
                    self.cursor.advance_n(2);
                    return self.lex_radix_integer(2, start, line, column);
                }
                'o' | 'O' => {
                    self.cursor.advance_n(2);
                    return self.lex_radix_integer(8, start, line, column);
                }
                _ => {}
            }
        }

        while self.cursor.current_char().is_ascii_digit() || self.cursor.current_char() == '_' {
            self.cursor.advance();
        }

        let is_float = (self.cursor.current_char() == '.'
            && self.cursor.peek_char(1).is_ascii_digit())
            || self.cursor.current_char() == 'e'
            || self.cursor.current_char() == 'E';

        if is_float {
            if self.cursor.current_char() == '.' {
                self.cursor.advance();
                while self.cursor.current_char().is_ascii_digit()
                    || self.cursor.current_char() == '_'
                {
                    self.cursor.advance();
                }
            }

            if self.cursor.current_char() == 'e' || self.cursor.current_char() == 'E' {
                self.cursor.advance();
                if self.cursor.current_char() == '+' || self.cursor.current_char() == '-' {
                    self.cursor.advance();
                }
                let exp_digits_start = self.cursor.position();
                while self.cursor.current_char().is_ascii_digit() {
                    self.cursor.advance();
                }
                if exp_digits_start == self.cursor.position() {
                    DiagnosticBuilder::error("no digits in float exponent")
                        .code(DiagnosticCode::UNEXPECTED_CHARACTER)
                        .span(self.span_from(start, line, column))
                        .emit(self.messages);
                }
            }

            let text = self.cursor.slice_from(start).replace('_', "");
            let value = text.parse::<f64>().unwrap_or(0.0);
            let suffix = self.lex_suffix(start, line, column);
            Token::Float(value, suffix)
        } else {
            let text = self.cursor.slice_from(start).replace('_', "");
            let value = match text.parse::<u64>() {
                Ok(value) => value,
                Err(_) => {
                    DiagnosticBuilder::error(format!("integer literal '{text}' overflows u64"))
                        .code(DiagnosticCode::UNEXPECTED_CHARACTER)
                        .span(self.span_from(start, line, column))
                        .emit(self.messages);
                    0
                }
            };
            match self.lex_suffix(start, line, column) {
                Some(suffix) if suffix.is_float() => Token::Float(value as f64, Some(suffix)),
                suffix => Token::Int(value, suffix),
            }
        }
    }

    /// Lexes digits of an integer in the given base (after the prefix).
    fn lex_radix_integer(&mut self, base: u32, start: usize, line: u32, column: u32) -> Token {
        let digits_start = self.cursor.position();

        while self.cursor.current_char() == '_' || self.cursor.current_char().is_digit(base) {
            self.cursor.advance();
        }

        if digits_start == self.cursor.position() {
            DiagnosticBuilder::error(format!("no digits after base-{base} prefix"))
                .code(DiagnosticCode::UNEXPECTED_CHARACTER)
                .span(self.span_from(start, line, column))
                .emit(self.messages);
            return Token::Int(0, None);
        }

        let text = self.cursor.slice_from(digits_start).replace('_', "");
        let value = match u64::from_str_radix(&text, base) {
            Ok(value) => value,
            Err(_) => {
                DiagnosticBuilder::error(format!("integer literal '{text}' overflows u64"))
                    .code(DiagnosticCode::UNEXPECTED_CHARACTER)
                    .span(self.span_from(start, line, column))
                    .emit(self.messages);
                0
            }
        };

        Token::Int(value, self.lex_suffix(start, line, column))
    }

    /// Lexes an optional type suffix directly following a number.
    fn lex_suffix(&mut self, start: usize, line: u32, column: u32) -> Option<LiteralSuffix> {
        if !self.cursor.current_char().is_alphabetic() {
            return None;
        }

        let suffix_start = self.cursor.position();
        while self.cursor.current_char() == '_' || self.cursor.current_char().is_alphanumeric() {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(suffix_start);
        let suffix = LiteralSuffix::from_str(text);
        if suffix.is_none() {
            DiagnosticBuilder::error(format!("invalid numeric literal suffix '{text}'"))
                .code(DiagnosticCode::UNEXPECTED_CHARACTER)
                .span(self.span_from(start, line, column))
                .emit(self.messages);
        }
        suffix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_util::{FileId, Messages};

    fn lex_num(source: &str) -> (Token, usize) {
        let mut messages = Messages::new();
        let token = {
            let mut lexer = Lexer::new(source, FileId::DUMMY, &mut messages);
            lexer.lex_number()
        };
        (token, messages.error_count())
    }

    #[test]
    fn test_decimal_integer() {
        assert_eq!(lex_num("42").0, Token::Int(42, None));
        assert_eq!(lex_num("0").0, Token::Int(0, None));
        assert_eq!(lex_num("1_000_000").0, Token::Int(1_000_000, None));
    }

    #[test]
    fn test_radix_integers() {
        assert_eq!(lex_num("0xFF").0, Token::Int(0xFF, None));
        assert_eq!(lex_num("0b1010").0, Token::Int(0b1010, None));
        assert_eq!(lex_num("0o777").0, Token::Int(0o777, None));
    }

    #[test]
    fn test_radix_needs_digits() {
        let (token, errors) = lex_num("0x");
        assert_eq!(token, Token::Int(0, None));
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_suffixed_integers() {
        assert_eq!(lex_num("256u8").0, Token::Int(256, Some(LiteralSuffix::U8)));
        assert_eq!(lex_num("5i64").0, Token::Int(5, Some(LiteralSuffix::I64)));
        assert_eq!(lex_num("0xFFu16").0, Token::Int(255, Some(LiteralSuffix::U16)));
    }

    #[test]
    fn test_floats() {
        assert!(matches!(lex_num("3.14").0, Token::Float(f, None) if (f - 3.14).abs() < 1e-9));
        assert!(matches!(lex_num("1e10").0, Token::Float(f, None) if (f - 1e10).abs() < 1.0));
        assert!(
            matches!(lex_num("2.5e-3").0, Token::Float(f, None) if (f - 2.5e-3).abs() < 1e-9)
        );
    }

    #[test]
    fn test_float_suffix() {
        assert!(matches!(
            lex_num("1.5f32").0,
            Token::Float(f, Some(LiteralSuffix::F32)) if (f - 1.5).abs() < 1e-9
        ));
        // Integer shape with a float suffix is a float literal
        assert!(matches!(
            lex_num("2f64").0,
            Token::Float(f, Some(LiteralSuffix::F64)) if (f - 2.0).abs() < 1e-9
        ));
    }

    #[test]
    fn test_bad_suffix() {
        let (token, errors) = lex_num("5u128");
        assert_eq!(token, Token::Int(5, None));
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_exponent_needs_digits() {
        let (_, errors) = lex_num("1e");
        assert_eq!(errors, 1);
    }
}
