use std::{collections::HashSet, iter::Peekable};

use crate::{
    error::ParseError,
    interpreter::{
        lexer::{Position, Token, TokenKind},
        parser::core::{ParseResult, Parser},
    },
};

/// A parsed parameter list.
pub(super) struct Params {
    /// The parameter names, in order and without duplicates.
    pub names:    Vec<String>,
    /// Position of the opening parenthesis.
    pub position: Position,
}

impl Parser {
    /// Consumes the next token if it is of the given kind.
    ///
    /// # Returns
    /// `true` if a token was consumed.
    pub(super) fn eat<'a, I>(&self, tokens: &mut Peekable<I>, kind: &TokenKind) -> bool
        where I: Iterator<Item = &'a Token> + Clone
    {
        tokens.next_if(|token| token.kind == *kind).is_some()
    }

    /// Consumes the next token, which must be of the given kind.
    ///
    /// # Errors
    /// `UnexpectedToken` naming `expected` if another token follows, or
    /// `UnexpectedEndOfInput` if nothing does.
    pub(super) fn expect<'a, I>(&self,
                                tokens: &mut Peekable<I>,
                                kind: &TokenKind,
                                expected: &'static str)
                                -> ParseResult<&'a Token>
        where I: Iterator<Item = &'a Token> + Clone
    {
        match tokens.next() {
            Some(token) if token.kind == *kind => Ok(token),
            Some(token) => Err(Self::unexpected(token, expected)),
            None => Err(self.end_of_input(expected)),
        }
    }

    /// Consumes an identifier and returns its name.
    pub(super) fn expect_identifier<'a, I>(&self, tokens: &mut Peekable<I>) -> ParseResult<String>
        where I: Iterator<Item = &'a Token> + Clone
    {
        match tokens.next() {
            Some(Token { kind: TokenKind::Identifier(name),
                         .. }) => Ok(name.clone()),
            Some(token) => Err(Self::unexpected(token, "an identifier")),
            None => Err(self.end_of_input("an identifier")),
        }
    }

    /// Parses a parenthesized, comma-separated list of distinct identifiers.
    ///
    /// Grammar: `params := "(" (IDENT ("," IDENT)*)? ")"`
    ///
    /// # Errors
    /// `DuplicateParameter` if a name is repeated, plus the usual token
    /// errors.
    pub(super) fn parse_params<'a, I>(&self, tokens: &mut Peekable<I>) -> ParseResult<Params>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let position = self.expect(tokens, &TokenKind::LParen, "'('")?.position;
        let mut names = Vec::new();
        let mut seen = HashSet::new();

        if self.eat(tokens, &TokenKind::RParen) {
            return Ok(Params { names, position });
        }

        loop {
            let at = tokens.peek().map_or(self.end, |token| token.position);
            let name = self.expect_identifier(tokens)?;
            if !seen.insert(name.clone()) {
                return Err(ParseError::DuplicateParameter { name,
                                                            position: at });
            }
            names.push(name);

            if self.eat(tokens, &TokenKind::Comma) {
                continue;
            }
            self.expect(tokens, &TokenKind::RParen, "',' or ')'")?;
            return Ok(Params { names, position });
        }
    }

    /// Builds an `UnexpectedToken` error for `token`.
    pub(super) fn unexpected(token: &Token, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken { token: token.lexeme.clone(),
                                      expected,
                                      position: token.position }
    }

    /// Builds an `UnexpectedEndOfInput` error positioned after the last token.
    pub(super) const fn end_of_input(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedEndOfInput { expected,
                                           position: self.end }
    }
}
