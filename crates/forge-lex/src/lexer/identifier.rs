//! Identifier and keyword lexing.

use crate::token::Token;
use crate::Lexer;

impl Lexer<'_, '_> {
    /// Lexes an identifier or keyword.
    ///
    /// The current character must be `_` or alphabetic.
    pub(crate) fn lex_identifier(&mut self) -> Token {
        let start = self.cursor.position();

        while !self.cursor.is_at_end() {
            let c = self.cursor.current_char();
            if c == '_' || c.is_alphanumeric() {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let text = self.cursor.slice_from(start);
        Token::keyword(text).unwrap_or_else(|| Token::Ident(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_util::{FileId, Messages};

    fn lex_ident(source: &str) -> Token {
        let mut messages = Messages::new();
        let mut lexer = Lexer::new(source, FileId::DUMMY, &mut messages);
        lexer.lex_identifier()
    }

    #[test]
    fn test_plain_identifier() {
        assert_eq!(lex_ident("foo"), Token::Ident("foo".to_string()));
        assert_eq!(lex_ident("_bar9 rest"), Token::Ident("_bar9".to_string()));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(lex_ident("namespace"), Token::Namespace);
        assert_eq!(lex_ident("inherits"), Token::Inherits);
        assert_eq!(lex_ident("do"), Token::Do);
        assert_eq!(lex_ident("isize"), Token::Isize);
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(lex_ident("iffy"), Token::Ident("iffy".to_string()));
        assert_eq!(lex_ident("returns"), Token::Ident("returns".to_string()));
    }
}
