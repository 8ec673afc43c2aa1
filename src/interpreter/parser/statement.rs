use std::{iter::Peekable, rc::Rc};

use tracing::debug;

use crate::{
    ast::Expr,
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind},
        operator::{ASSIGNMENT, OperatorDef},
        parser::core::{LOWEST, ParseResult, Parser},
    },
    util::num::whole_to_u8,
};

impl Parser {
    /// Parses a `;`-separated sequence of statements up to the end of input.
    ///
    /// Grammar: `program := (statement? ";")* statement?`
    pub(super) fn parse_program<'a, I>(&mut self,
                                       tokens: &mut Peekable<I>)
                                       -> ParseResult<Vec<Expr>>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let mut exprs = Vec::new();

        loop {
            while self.eat(tokens, &TokenKind::Semicolon) {}
            if tokens.peek().is_none() {
                break;
            }

            exprs.push(self.parse_statement(tokens)?);

            match tokens.next() {
                None => break,
                Some(Token { kind: TokenKind::Semicolon,
                             .. }) => {},
                Some(token) => return Err(Self::unexpected(token, "';' or end of input")),
            }
        }

        Ok(exprs)
    }

    /// Parses one statement: an operator declaration or an expression.
    pub(super) fn parse_statement<'a, I>(&mut self, tokens: &mut Peekable<I>) -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        if tokens.peek()
                 .is_some_and(|token| token.kind.is_declaration_keyword())
        {
            return self.parse_declaration(tokens);
        }
        self.parse_expression(tokens, LOWEST)
    }

    /// Parses an operator declaration.
    ///
    /// Grammar:
    /// ```text
    /// declaration := ("infixl" | "infixr" | "infix" | "prefix" | "postfix")
    ///                PRECEDENCE SYMBOL params "=" expression
    /// ```
    ///
    /// The signature is added to the parser's operator table before the body
    /// is parsed, so the body may use the operator it declares. It is also
    /// recorded in the delta returned by [`Parser::parse`].
    ///
    /// # Errors
    /// - `InvalidPrecedence` if the precedence is not a whole number.
    /// - `DeclarationArity` if the parameter count does not match the fixity.
    /// - `OperatorConflict` if the operator table refuses the signature.
    /// - Token errors for anything malformed.
    fn parse_declaration<'a, I>(&mut self, tokens: &mut Peekable<I>) -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let Some(keyword) = tokens.next() else {
            return Err(self.end_of_input("a declaration"));
        };
        let position = keyword.position;

        let precedence = match tokens.next() {
            Some(Token { kind: TokenKind::Number(n),
                         lexeme,
                         position, }) => {
                whole_to_u8(*n).ok_or_else(|| {
                                   ParseError::InvalidPrecedence { text:     lexeme.clone(),
                                                                   position: *position, }
                               })?
            },
            Some(token) => return Err(Self::unexpected(token, "a precedence")),
            None => return Err(self.end_of_input("a precedence")),
        };

        let (symbol, symbol_position) = match tokens.next() {
            Some(Token { kind: TokenKind::Operator(symbol),
                         position,
                         .. }) => (symbol.as_str(), *position),
            Some(token) => return Err(Self::unexpected(token, "an operator symbol")),
            None => return Err(self.end_of_input("an operator symbol")),
        };

        let def = match keyword.kind {
            TokenKind::Infixl => OperatorDef::infixl(symbol, precedence),
            TokenKind::Infixr => OperatorDef::infixr(symbol, precedence),
            TokenKind::Infix => OperatorDef::infix(symbol, precedence),
            TokenKind::Prefix => OperatorDef::prefix(symbol, precedence),
            _ => OperatorDef::postfix(symbol, precedence),
        };

        let params = self.parse_params(tokens)?;
        if params.names.len() != def.fixity.arity() {
            return Err(ParseError::DeclarationArity { symbol:   def.symbol,
                                                      fixity:   def.fixity,
                                                      expected: def.fixity.arity(),
                                                      found:    params.names.len(),
                                                      position: params.position, });
        }

        self.operators
            .define(def.clone())
            .map_err(|conflict| ParseError::OperatorConflict { conflict,
                                                               position: symbol_position })?;
        debug!(symbol = %def.symbol, keyword = def.keyword(), "parsed operator declaration");
        self.delta.push(def.clone());

        self.expect(tokens, &TokenKind::Operator(ASSIGNMENT.to_string()), "'='")?;
        let body = self.parse_expression(tokens, LOWEST)?;

        Ok(Expr::OperatorDecl { def,
                                params: params.names,
                                body: Rc::new(body),
                                position })
    }
}
