//! forge-par - Syntax tree and recursive-descent parser.
//!
//! The tree itself lives in [`ast`] as a single-arena tagged sum; the
//! parser here turns a token stream into that tree. Parse errors become
//! diagnostics with statement-level recovery, so one bad construct does not
//! hide the rest of the file.

pub mod ast;
mod expr;
mod items;
mod stmt;
mod types;

use forge_lex::{Token, TokenWithSpan};
use forge_util::{DiagnosticBuilder, DiagnosticCode, Messages, Span};

use crate::ast::{NodeId, NodeKind, SyntaxTree};

/// Parse a token stream into a translation unit.
///
/// Returns the arena and the id of the `TranslationUnit` root node.
pub fn parse(tokens: Vec<TokenWithSpan>, messages: &mut Messages) -> (SyntaxTree, NodeId) {
    Parser::new(tokens, messages).parse_translation_unit()
}

/// The Forge parser.
pub struct Parser<'m> {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
    pub(crate) tree: SyntaxTree,
    pub(crate) messages: &'m mut Messages,
}

impl<'m> Parser<'m> {
    /// Create a parser over a token stream.
    ///
    /// The stream must end with [`Token::Eof`] (as produced by
    /// [`forge_lex::tokenize`]).
    pub fn new(tokens: Vec<TokenWithSpan>, messages: &'m mut Messages) -> Self {
        Self {
            tokens,
            pos: 0,
            tree: SyntaxTree::new(),
            messages,
        }
    }

    /// Parse the whole stream as one translation unit.
    pub fn parse_translation_unit(mut self) -> (SyntaxTree, NodeId) {
        let start_span = self.peek_span();
        let mut declarations = Vec::new();

        while !self.at_eof() {
            match self.parse_declaration() {
                Some(declaration) => declarations.push(declaration),
                None => self.recover_to_declaration(),
            }
        }

        let span = start_span.merge(self.peek_span());
        let unit = self.tree.alloc(
            span,
            NodeKind::TranslationUnit {
                declarations,
                scope: None,
            },
        );
        (self.tree, unit)
    }

    // -- token stream helpers ---------------------------------------------

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    pub(crate) fn peek_ahead(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)].token
    }

    pub(crate) fn peek_span(&self) -> Span {
        self.tokens[self.pos.min(self.tokens.len() - 1)].span
    }

    pub(crate) fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1).min(self.tokens.len() - 1)].span
    }

    pub(crate) fn at_eof(&self) -> bool {
        *self.peek() == Token::Eof
    }

    pub(crate) fn bump(&mut self) -> TokenWithSpan {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Consume the token if it matches.
    pub(crate) fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the expected token or report ESY003.
    pub(crate) fn expect(&mut self, token: Token, context: &str) -> bool {
        if self.eat(&token) {
            return true;
        }
        let found = self.peek().describe();
        DiagnosticBuilder::error(format!(
            "expected {} {}, found {}",
            token.describe(),
            context,
            found
        ))
        .code(DiagnosticCode::UNEXPECTED_TOKEN)
        .span(self.peek_span())
        .emit(self.messages);
        false
    }

    /// Consume an identifier or report ESY003.
    pub(crate) fn expect_ident(&mut self, context: &str) -> Option<String> {
        if let Token::Ident(name) = self.peek() {
            let name = name.clone();
            self.bump();
            return Some(name);
        }
        let found = self.peek().describe();
        DiagnosticBuilder::error(format!("expected identifier {context}, found {found}"))
            .code(DiagnosticCode::UNEXPECTED_TOKEN)
            .span(self.peek_span())
            .emit(self.messages);
        None
    }

    pub(crate) fn error_here(&mut self, message: impl Into<String>) {
        DiagnosticBuilder::error(message)
            .code(DiagnosticCode::UNEXPECTED_TOKEN)
            .span(self.peek_span())
            .emit(self.messages);
    }

    // -- recovery ---------------------------------------------------------

    /// Skip to the next plausible declaration start.
    ///
    /// Always consumes at least one token so a failing declaration cannot
    /// stall the parse loop.
    fn recover_to_declaration(&mut self) {
        if !self.at_eof() {
            self.bump();
        }
        while !self.at_eof() {
            if self.eat(&Token::Semi) {
                return;
            }
            match self.peek() {
                Token::Let
                | Token::Func
                | Token::Struct
                | Token::Type
                | Token::Namespace => return,
                Token::RBrace => {
                    // A stray closing brace cannot start anything; drop it
                    self.bump();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Skip to the next plausible statement start inside a block.
    pub(crate) fn recover_to_statement(&mut self) {
        while !self.at_eof() {
            if self.eat(&Token::Semi) {
                return;
            }
            match self.peek() {
                Token::Let
                | Token::If
                | Token::While
                | Token::Do
                | Token::Return
                | Token::Break
                | Token::Continue
                | Token::LBrace
                | Token::RBrace => return,
                _ => {
                    self.bump();
                }
            }
        }
    }
}
