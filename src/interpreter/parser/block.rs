use std::iter::Peekable;

use crate::{
    ast::Expr,
    interpreter::{
        lexer::{Position, Token, TokenKind},
        parser::core::{ParseResult, Parser},
    },
};

impl Parser {
    /// Parses a block expression delimited by braces.
    ///
    /// A block holds zero or more statements separated by `;`. The separator
    /// after the last statement is optional and empty statements are skipped.
    /// Operator declarations are allowed inside blocks.
    ///
    /// Grammar: `block := "{" (statement? ";")* statement? "}"`
    ///
    /// # Parameters
    /// - `tokens`: Token stream positioned after the opening brace.
    /// - `position`: Position of the opening brace.
    ///
    /// # Returns
    /// An `Expr::Block` containing all parsed statements.
    pub(super) fn parse_block<'a, I>(&mut self,
                                     tokens: &mut Peekable<I>,
                                     position: Position)
                                     -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let mut body = Vec::new();

        loop {
            while self.eat(tokens, &TokenKind::Semicolon) {}

            if self.eat(tokens, &TokenKind::RBrace) {
                break;
            }
            if tokens.peek().is_none() {
                return Err(self.end_of_input("'}'"));
            }

            body.push(self.parse_statement(tokens)?);

            if !self.eat(tokens, &TokenKind::Semicolon) {
                self.expect(tokens, &TokenKind::RBrace, "';' or '}'")?;
                break;
            }
        }

        Ok(Expr::Block { body, position })
    }
}
