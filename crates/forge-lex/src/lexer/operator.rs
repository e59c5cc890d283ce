//! Operator and punctuation lexing.

use crate::token::Token;
use crate::Lexer;

impl Lexer<'_, '_> {
    /// Lexes an operator or punctuator, longest match first.
    ///
    /// Returns `None` if the current character starts no known token; the
    /// caller reports it and skips it.
    pub(crate) fn lex_operator(&mut self) -> Option<Token> {
        let token = match self.cursor.current_char() {
            '+' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Token::PlusAssign
                } else {
                    Token::Plus
                }
            }
            '-' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Token::MinusAssign
                } else if self.cursor.match_char('>') {
                    Token::Arrow
                } else {
                    Token::Minus
                }
            }
            '*' => {
                self.cursor.advance();
                if self.cursor.match_char('*') {
                    if self.cursor.match_char('=') {
                        Token::StarStarAssign
                    } else {
                        Token::StarStar
                    }
                } else if self.cursor.match_char('=') {
                    Token::StarAssign
                } else {
                    Token::Star
                }
            }
            '/' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Token::SlashAssign
                } else {
                    Token::Slash
                }
            }
            '%' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Token::PercentAssign
                } else {
                    Token::Percent
                }
            }
            '=' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Token::EqEq
                } else {
                    Token::Assign
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Token::NotEq
                } else {
                    Token::Bang
                }
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('<') {
                    if self.cursor.match_char('=') {
                        Token::ShlAssign
                    } else {
                        Token::Shl
                    }
                } else if self.cursor.match_char('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('>') {
                    if self.cursor.match_char('=') {
                        Token::ShrAssign
                    } else {
                        Token::Shr
                    }
                } else if self.cursor.match_char('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '&' => {
                self.cursor.advance();
                if self.cursor.match_char('&') {
                    Token::AmpAmp
                } else if self.cursor.match_char('=') {
                    Token::AmpAssign
                } else {
                    Token::Amp
                }
            }
            '|' => {
                self.cursor.advance();
                if self.cursor.match_char('|') {
                    Token::PipePipe
                } else if self.cursor.match_char('=') {
                    Token::PipeAssign
                } else {
                    Token::Pipe
                }
            }
            '^' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Token::CaretAssign
                } else {
                    Token::Caret
                }
            }
            '~' => {
                self.cursor.advance();
                Token::Tilde
            }
            '(' => {
                self.cursor.advance();
                Token::LParen
            }
            ')' => {
                self.cursor.advance();
                Token::RParen
            }
            '{' => {
                self.cursor.advance();
                Token::LBrace
            }
            '}' => {
                self.cursor.advance();
                Token::RBrace
            }
            ',' => {
                self.cursor.advance();
                Token::Comma
            }
            ';' => {
                self.cursor.advance();
                Token::Semi
            }
            ':' => {
                self.cursor.advance();
                Token::Colon
            }
            '.' => {
                self.cursor.advance();
                Token::Dot
            }
            _ => return None,
        };

        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_util::{FileId, Messages};

    fn lex_op(source: &str) -> Option<Token> {
        let mut messages = Messages::new();
        let mut lexer = Lexer::new(source, FileId::DUMMY, &mut messages);
        lexer.lex_operator()
    }

    #[test]
    fn test_longest_match() {
        assert_eq!(lex_op("<<="), Some(Token::ShlAssign));
        assert_eq!(lex_op("<<"), Some(Token::Shl));
        assert_eq!(lex_op("<="), Some(Token::Le));
        assert_eq!(lex_op("<"), Some(Token::Lt));
    }

    #[test]
    fn test_star_family() {
        assert_eq!(lex_op("**="), Some(Token::StarStarAssign));
        assert_eq!(lex_op("**"), Some(Token::StarStar));
        assert_eq!(lex_op("*="), Some(Token::StarAssign));
        assert_eq!(lex_op("*"), Some(Token::Star));
    }

    #[test]
    fn test_arrow_and_minus() {
        assert_eq!(lex_op("->"), Some(Token::Arrow));
        assert_eq!(lex_op("-="), Some(Token::MinusAssign));
        assert_eq!(lex_op("-"), Some(Token::Minus));
    }

    #[test]
    fn test_unknown() {
        assert_eq!(lex_op("$"), None);
        assert_eq!(lex_op("@"), None);
    }
}
