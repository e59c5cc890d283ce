//! Declaration parsing.

use forge_lex::Token;

use crate::ast::{NodeId, NodeKind};
use crate::Parser;

impl Parser<'_> {
    /// Parse one declaration: `let`, `func`, `struct`, `type`, or
    /// `namespace`.
    pub(crate) fn parse_declaration(&mut self) -> Option<NodeId> {
        match self.peek() {
            Token::Let => self.parse_variable_declaration(),
            Token::Func => self.parse_function_declaration(),
            Token::Struct => self.parse_structured_type_declaration(),
            Token::Type => self.parse_type_alias_declaration(),
            Token::Namespace => self.parse_namespace_declaration(),
            other => {
                let found = other.describe();
                self.error_here(format!("expected a declaration, found {found}"));
                None
            }
        }
    }

    /// `let NAME [: TYPE] [= EXPR];`
    pub(crate) fn parse_variable_declaration(&mut self) -> Option<NodeId> {
        let start = self.peek_span();
        self.expect(Token::Let, "to start a variable declaration");
        let name = self.expect_ident("after 'let'")?;

        let ty = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let initial_value = if self.eat(&Token::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(Token::Semi, "after a variable declaration");

        let span = start.merge(self.prev_span());
        Some(self.tree.alloc(
            span,
            NodeKind::DeclarationVariable {
                name,
                ty,
                initial_value,
                resolved_type: None,
            },
        ))
    }

    /// `func NAME(ARG: TYPE, ...) -> TYPE { ... }`
    fn parse_function_declaration(&mut self) -> Option<NodeId> {
        let start = self.peek_span();
        self.bump();
        let name = self.expect_ident("after 'func'")?;

        self.expect(Token::LParen, "after the function name");
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.parse_function_argument()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen, "after the function arguments");
        }

        self.expect(Token::Arrow, "before the return type");
        let return_type = self.parse_type()?;

        let body = self.parse_block()?;

        let span = start.merge(self.prev_span());
        Some(self.tree.alloc(
            span,
            NodeKind::DeclarationFunction {
                name,
                args,
                return_type: Some(return_type),
                body: Some(body),
                resolved_type: None,
            },
        ))
    }

    /// `NAME: TYPE` inside a function argument list
    fn parse_function_argument(&mut self) -> Option<NodeId> {
        let start = self.peek_span();
        let name = self.expect_ident("as an argument name")?;
        self.expect(Token::Colon, "after the argument name");
        let ty = self.parse_type()?;

        let span = start.merge(self.prev_span());
        Some(self.tree.alloc(
            span,
            NodeKind::DeclarationVariable {
                name,
                ty: Some(ty),
                initial_value: None,
                resolved_type: None,
            },
        ))
    }

    /// `struct NAME [inherits A, B] { MEMBER; ... }`
    fn parse_structured_type_declaration(&mut self) -> Option<NodeId> {
        let start = self.peek_span();
        self.bump();
        let name = self.expect_ident("after 'struct'")?;

        let mut inherits = Vec::new();
        if self.eat(&Token::Inherits) {
            loop {
                let parent_span = self.peek_span();
                let parent = self.expect_ident("as an inherited type name")?;
                inherits.push(self.tree.alloc(
                    parent_span,
                    NodeKind::TypeSymbol {
                        name: parent,
                        referenced_declaration: None,
                        is_const: false,
                    },
                ));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        self.expect(Token::LBrace, "to open the struct body");
        let mut members = Vec::new();
        while !self.at_eof() && !self.eat(&Token::RBrace) {
            match self.parse_declaration() {
                Some(member) => members.push(member),
                None => self.recover_to_statement(),
            }
        }

        let span = start.merge(self.prev_span());
        Some(self.tree.alloc(
            span,
            NodeKind::DeclarationStructuredType {
                name,
                members,
                inherits,
                resolved_type: None,
            },
        ))
    }

    /// `type NAME = TYPE;`
    fn parse_type_alias_declaration(&mut self) -> Option<NodeId> {
        let start = self.peek_span();
        self.bump();
        let name = self.expect_ident("after 'type'")?;
        self.expect(Token::Assign, "after the alias name");
        let ty = self.parse_type()?;
        self.expect(Token::Semi, "after a type alias");

        let span = start.merge(self.prev_span());
        Some(self.tree.alloc(
            span,
            NodeKind::DeclarationTypeAlias {
                name,
                ty: Some(ty),
                resolved_type: None,
            },
        ))
    }

    /// `namespace NAME { ... }`
    fn parse_namespace_declaration(&mut self) -> Option<NodeId> {
        let start = self.peek_span();
        self.bump();
        let name = self.expect_ident("after 'namespace'")?;

        self.expect(Token::LBrace, "to open the namespace body");
        let mut members = Vec::new();
        while !self.at_eof() && !self.eat(&Token::RBrace) {
            match self.parse_declaration() {
                Some(member) => members.push(member),
                None => self.recover_to_statement(),
            }
        }

        let span = start.merge(self.prev_span());
        Some(
            self.tree
                .alloc(span, NodeKind::DeclarationNamespace { name, members }),
        )
    }
}
