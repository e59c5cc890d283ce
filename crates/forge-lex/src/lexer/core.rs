//! Main lexer struct and token dispatch.

use forge_util::{DiagnosticBuilder, DiagnosticCode, FileId, Messages, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenWithSpan};

/// The Forge lexer.
///
/// Produces one token per [`Lexer::next_token`] call, ending with
/// [`Token::Eof`]. Lexical errors are reported to the diagnostic sink and
/// lexing continues at the next character.
pub struct Lexer<'a, 'm> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) file_id: FileId,
    pub(crate) messages: &'m mut Messages,
}

impl<'a, 'm> Lexer<'a, 'm> {
    /// Create a lexer over a source buffer.
    pub fn new(source: &'a str, file_id: FileId, messages: &'m mut Messages) -> Self {
        Self {
            cursor: Cursor::new(source),
            file_id,
            messages,
        }
    }

    /// Lex the next token.
    pub fn next_token(&mut self) -> TokenWithSpan {
        loop {
            self.cursor.skip_whitespace();

            if self.cursor.is_at_end() {
                return TokenWithSpan::new(Token::Eof, self.span_here(self.cursor.position()));
            }

            let c = self.cursor.current_char();

            // Comments come before operator dispatch since they share '/'
            if c == '/' && (self.cursor.peek_char(1) == '/' || self.cursor.peek_char(1) == '*') {
                self.skip_comment();
                continue;
            }

            let start = self.cursor.position();
            let line = self.cursor.line();
            let column = self.cursor.column();

            let token = if c.is_ascii_digit() {
                self.lex_number()
            } else if c == '_' || c.is_alphabetic() {
                self.lex_identifier()
            } else if let Some(token) = self.lex_operator() {
                token
            } else {
                self.cursor.advance();
                let span = self.span_from(start, line, column);
                DiagnosticBuilder::error(format!("unexpected character '{c}'"))
                    .code(DiagnosticCode::UNEXPECTED_CHARACTER)
                    .span(span)
                    .emit(self.messages);
                continue;
            };

            return TokenWithSpan::new(token, self.span_from(start, line, column));
        }
    }

    pub(crate) fn span_from(&self, start: usize, line: u32, column: u32) -> Span {
        Span::with_file(start, self.cursor.position(), self.file_id, line, column)
    }

    fn span_here(&self, start: usize) -> Span {
        Span::with_file(
            start,
            self.cursor.position(),
            self.file_id,
            self.cursor.line(),
            self.cursor.column(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_token(source: &str) -> Token {
        let mut messages = Messages::new();
        let mut lexer = Lexer::new(source, FileId::DUMMY, &mut messages);
        lexer.next_token().token
    }

    #[test]
    fn test_eof_on_empty() {
        assert_eq!(first_token(""), Token::Eof);
        assert_eq!(first_token("   \n\t "), Token::Eof);
    }

    #[test]
    fn test_dispatch() {
        assert_eq!(first_token("while"), Token::While);
        assert_eq!(first_token("x"), Token::Ident("x".to_string()));
        assert_eq!(first_token("42"), Token::Int(42, None));
        assert_eq!(first_token("->"), Token::Arrow);
    }

    #[test]
    fn test_comment_then_token() {
        assert_eq!(first_token("// nothing\nbreak"), Token::Break);
        assert_eq!(first_token("/* x */ continue"), Token::Continue);
    }
}
