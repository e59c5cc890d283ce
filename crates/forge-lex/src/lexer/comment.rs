//! Comment skipping.

use forge_util::{DiagnosticBuilder, DiagnosticCode};

use crate::Lexer;

impl Lexer<'_, '_> {
    /// Skips a line (`//`) or block (`/* */`) comment.
    ///
    /// The cursor must be on the leading `/`. An unterminated block comment
    /// is reported with ESY001 and consumes the rest of the input.
    pub(crate) fn skip_comment(&mut self) {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        self.cursor.advance();

        if self.cursor.match_char('/') {
            while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                self.cursor.advance();
            }
            return;
        }

        // Block comment
        self.cursor.advance();
        loop {
            if self.cursor.is_at_end() {
                DiagnosticBuilder::error("block comment is never closed")
                    .code(DiagnosticCode::UNCLOSED_BLOCK_COMMENT)
                    .span(self.span_from(start, line, column))
                    .emit(self.messages);
                return;
            }

            if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance_n(2);
                return;
            }

            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::token::Token;
    use crate::Lexer;
    use forge_util::{FileId, Messages};

    #[test]
    fn test_line_comment() {
        let mut messages = Messages::new();
        let mut lexer = Lexer::new("// all comment", FileId::DUMMY, &mut messages);
        assert_eq!(lexer.next_token().token, Token::Eof);
        assert!(!messages.has_errors());
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let mut messages = Messages::new();
        let mut lexer = Lexer::new("/* a\nb\nc */ if", FileId::DUMMY, &mut messages);
        assert_eq!(lexer.next_token().token, Token::If);
        assert!(!messages.has_errors());
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut messages = Messages::new();
        let mut lexer = Lexer::new("/* oops", FileId::DUMMY, &mut messages);
        assert_eq!(lexer.next_token().token, Token::Eof);
        assert_eq!(messages.error_count(), 1);
    }
}
