//! forge-lex - Lexical analysis for Forge source.
//!
//! Turns source text into a stream of [`Token`]s with source spans. Lexical
//! problems (stray characters, unterminated block comments) become
//! diagnostics rather than hard failures so that the parser can keep going
//! and report more.

pub mod cursor;
mod lexer;
mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{LiteralSuffix, Token, TokenWithSpan};

use forge_util::{FileId, Messages};

/// Tokenize an entire source buffer.
///
/// The returned stream always ends with a [`Token::Eof`] token.
pub fn tokenize(source: &str, file_id: FileId, messages: &mut Messages) -> Vec<TokenWithSpan> {
    let mut lexer = Lexer::new(source, file_id, messages);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.token == Token::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        let mut messages = Messages::new();
        let tokens = tokenize(source, FileId::DUMMY, &mut messages);
        assert!(!messages.has_errors(), "unexpected lex errors for {source:?}");
        tokens.into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_keywords_and_idents() {
        assert_eq!(
            lex("func abs x"),
            vec![
                Token::Func,
                Token::Ident("abs".to_string()),
                Token::Ident("x".to_string()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_function_header() {
        assert_eq!(
            lex("func f(a: u8) -> u8"),
            vec![
                Token::Func,
                Token::Ident("f".to_string()),
                Token::LParen,
                Token::Ident("a".to_string()),
                Token::Colon,
                Token::U8,
                Token::RParen,
                Token::Arrow,
                Token::U8,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_compound_assignments() {
        assert_eq!(
            lex("+= -= *= /= %= **= <<= >>= &= |= ^="),
            vec![
                Token::PlusAssign,
                Token::MinusAssign,
                Token::StarAssign,
                Token::SlashAssign,
                Token::PercentAssign,
                Token::StarStarAssign,
                Token::ShlAssign,
                Token::ShrAssign,
                Token::AmpAssign,
                Token::PipeAssign,
                Token::CaretAssign,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_exponent_vs_multiply() {
        assert_eq!(
            lex("a ** b * c"),
            vec![
                Token::Ident("a".to_string()),
                Token::StarStar,
                Token::Ident("b".to_string()),
                Token::Star,
                Token::Ident("c".to_string()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_suffixed_literal() {
        assert_eq!(
            lex("256u8"),
            vec![Token::Int(256, Some(LiteralSuffix::U8)), Token::Eof]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            lex("a // line\n/* block\nmore */ b"),
            vec![
                Token::Ident("a".to_string()),
                Token::Ident("b".to_string()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut messages = Messages::new();
        tokenize("a /* never closed", FileId::DUMMY, &mut messages);
        assert_eq!(messages.error_count(), 1);
        let diag = &messages.diagnostics()[0];
        assert_eq!(
            diag.code.map(|c| c.as_str()),
            Some("ESY001".to_string())
        );
    }

    #[test]
    fn test_unexpected_character() {
        let mut messages = Messages::new();
        let tokens = tokenize("a $ b", FileId::DUMMY, &mut messages);
        assert_eq!(messages.error_count(), 1);
        assert_eq!(
            messages.diagnostics()[0].code.map(|c| c.as_str()),
            Some("ESY002".to_string())
        );
        // Lexing continues past the bad character
        assert_eq!(tokens.len(), 3);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn lexing_never_panics(source in "\\PC*") {
                let mut messages = Messages::new();
                let tokens = tokenize(&source, FileId::DUMMY, &mut messages);
                prop_assert_eq!(tokens.last().map(|t| t.token.clone()), Some(Token::Eof));
            }

            #[test]
            fn decimal_integers_roundtrip(value in 0u64..=u64::MAX / 2) {
                let mut messages = Messages::new();
                let tokens = tokenize(&value.to_string(), FileId::DUMMY, &mut messages);
                prop_assert_eq!(tokens[0].token.clone(), Token::Int(value, None));
            }
        }
    }

    #[test]
    fn test_spans_track_lines() {
        let mut messages = Messages::new();
        let tokens = tokenize("a\n  b", FileId::DUMMY, &mut messages);
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.column, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 3);
    }
}
