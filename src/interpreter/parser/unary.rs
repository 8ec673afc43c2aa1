use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::Expr,
    error::ParseError,
    interpreter::{
        lexer::{Position, Token, TokenKind},
        operator::{ASSIGNMENT, Fixity},
        parser::core::{LOWEST, ParseResult, Parser},
        value::core::Value,
    },
};

impl Parser {
    /// Parses an expression in prefix position.
    ///
    /// Grammar:
    /// ```text
    /// prefix := NUMBER | STRING | "true" | "false" | "(" ")"
    ///         | IDENT call* | "(" expression ")" call* | "(" SYMBOL ")" call*
    ///         | block call* | if | lambda | let | SYMBOL prefix-operand
    /// ```
    ///
    /// The operand of a prefix operator is parsed with a threshold equal to
    /// the operator's precedence, so `-x ^ 2` is `(-x) ^ 2` while `-n!` is
    /// `-(n!)`.
    ///
    /// # Parameters
    /// - `tokens`: Token stream positioned at the start of an operand.
    ///
    /// # Returns
    /// The parsed operand.
    pub(super) fn parse_prefix<'a, I>(&mut self, tokens: &mut Peekable<I>) -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let Some(token) = tokens.next() else {
            return Err(self.end_of_input("an expression"));
        };
        let position = token.position;

        let literal = |value: Value| Ok(Expr::Literal { value, position });

        match &token.kind {
            TokenKind::Number(n) => literal(Value::Number(*n)),
            TokenKind::Str(s) => literal(Value::from(s.as_str())),
            TokenKind::True => literal(Value::Bool(true)),
            TokenKind::False => literal(Value::Bool(false)),
            TokenKind::Identifier(name) => {
                let callee = Expr::Identifier { name: name.clone(),
                                                position };
                self.parse_calls(tokens, callee)
            },
            TokenKind::LParen => {
                let group = self.parse_group(tokens, position)?;
                if matches!(group, Expr::Literal { .. }) {
                    return Ok(group);
                }
                self.parse_calls(tokens, group)
            },
            TokenKind::LBrace => {
                let block = self.parse_block(tokens, position)?;
                self.parse_calls(tokens, block)
            },
            TokenKind::If => self.parse_conditional(tokens, position),
            TokenKind::Fn => {
                let params = self.parse_params(tokens)?;
                let body = self.parse_expression(tokens, LOWEST)?;
                Ok(Expr::Lambda { params: params.names,
                                  body: Rc::new(body),
                                  position })
            },
            TokenKind::Let => self.parse_let(tokens, position),
            TokenKind::Operator(symbol) => {
                let Some(def) = self.operators.def(symbol, Fixity::Prefix) else {
                    return Err(ParseError::UnknownOperator { symbol: symbol.clone(),
                                                             fixity: Fixity::Prefix,
                                                             position });
                };
                let precedence = def.precedence;
                let operand = self.parse_expression(tokens, precedence)?;
                Ok(Expr::Unary { op: symbol.clone(),
                                 fixity: Fixity::Prefix,
                                 operand: Box::new(operand),
                                 position })
            },
            _ => Err(Self::unexpected(token, "an expression")),
        }
    }

    /// Parses what follows an opening parenthesis in prefix position: `()`,
    /// an operator section such as `(+)`, or a parenthesized expression.
    ///
    /// An operator section resolves to the infix operator of that symbol if
    /// there is one, then the prefix one, then the postfix one.
    ///
    /// # Errors
    /// - `InvalidOperatorSection` for `(=)`.
    /// - `UnknownOperator` if the section names no operator.
    /// - `UnexpectedToken` or `UnexpectedEndOfInput` for a missing `)`.
    fn parse_group<'a, I>(&mut self,
                          tokens: &mut Peekable<I>,
                          open: Position)
                          -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        if self.eat(tokens, &TokenKind::RParen) {
            return Ok(Expr::Literal { value:    Value::Unit,
                                      position: open, });
        }

        let mut lookahead = tokens.clone();
        if let (Some(Token { kind: TokenKind::Operator(symbol),
                             position,
                             .. }),
                Some(Token { kind: TokenKind::RParen,
                             .. })) = (lookahead.next(), lookahead.next())
        {
            tokens.next();
            tokens.next();
            return self.operator_section(symbol, *position);
        }

        let inner = self.parse_expression(tokens, LOWEST)?;
        self.expect(tokens, &TokenKind::RParen, "')'")?;
        Ok(inner)
    }

    fn operator_section(&self, symbol: &str, position: Position) -> ParseResult<Expr> {
        if symbol == ASSIGNMENT {
            return Err(ParseError::InvalidOperatorSection { symbol: symbol.to_string(),
                                                            position });
        }

        let fixity = [Fixity::Infix, Fixity::Prefix, Fixity::Postfix]
            .into_iter()
            .find(|fixity| self.operators.def(symbol, *fixity).is_some())
            .ok_or_else(|| ParseError::UnknownOperator { symbol: symbol.to_string(),
                                                         fixity: Fixity::Infix,
                                                         position })?;

        Ok(Expr::OperatorRef { symbol: symbol.to_string(),
                               fixity,
                               position })
    }

    /// Parses any number of argument lists following a callee, so `f(1)(2)`
    /// calls the result of `f(1)`.
    fn parse_calls<'a, I>(&mut self,
                          tokens: &mut Peekable<I>,
                          mut callee: Expr)
                          -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let mut height = callee.height();
        while let Some(open) = tokens.next_if(|token| token.kind == TokenKind::LParen) {
            let mut arguments = Vec::new();
            if !self.eat(tokens, &TokenKind::RParen) {
                loop {
                    arguments.push(self.parse_expression(tokens, LOWEST)?);
                    if self.eat(tokens, &TokenKind::Comma) {
                        continue;
                    }
                    self.expect(tokens, &TokenKind::RParen, "',' or ')'")?;
                    break;
                }
            }
            height = arguments.iter()
                              .map(Expr::height)
                              .fold(height, usize::max);
            height = Self::check_nesting(height + 1, open.position)?;
            callee = Expr::Call { callee: Box::new(callee),
                                  arguments,
                                  position: open.position };
        }
        Ok(callee)
    }

    /// Parses `if condition then expression [else expression]`.
    ///
    /// An `else` always belongs to the nearest `if` without one.
    fn parse_conditional<'a, I>(&mut self,
                                tokens: &mut Peekable<I>,
                                position: Position)
                                -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let condition = self.parse_expression(tokens, LOWEST)?;
        self.expect(tokens, &TokenKind::Then, "'then'")?;
        let then_branch = self.parse_expression(tokens, LOWEST)?;

        let else_branch = if self.eat(tokens, &TokenKind::Else) {
            Some(Box::new(self.parse_expression(tokens, LOWEST)?))
        } else {
            None
        };

        Ok(Expr::Conditional { condition: Box::new(condition),
                               then_branch: Box::new(then_branch),
                               else_branch,
                               position })
    }

    /// Parses `let name = expression`.
    fn parse_let<'a, I>(&mut self,
                        tokens: &mut Peekable<I>,
                        position: Position)
                        -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let target = self.expect_identifier(tokens)?;
        self.expect(tokens, &TokenKind::Operator(ASSIGNMENT.to_string()), "'='")?;
        let value = self.parse_expression(tokens, LOWEST)?;

        Ok(Expr::Assignment { target,
                              value: Box::new(value),
                              declare: true,
                              position })
    }
}
