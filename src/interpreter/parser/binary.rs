use std::iter::Peekable;

use crate::{
    ast::Expr,
    error::ParseError,
    interpreter::{
        lexer::{Position, Token, TokenKind},
        operator::{ASSIGNMENT, Associativity, Fixity, OperatorDef},
        parser::core::{ParseResult, Parser},
    },
};

impl Parser {
    /// Folds infix and postfix operators onto `left` while they bind at least
    /// as tightly as `min`.
    ///
    /// The right operand of an infix operator is parsed with a threshold of
    /// `precedence + 1` for left- and non-associative operators and
    /// `precedence` for right-associative ones. Two non-associative operators
    /// of the same precedence in a row are rejected.
    ///
    /// # Parameters
    /// - `tokens`: Token stream positioned after the left operand.
    /// - `left`: The operand parsed so far.
    /// - `height`: The height of `left`, kept up to date as operators fold
    ///   so that long chains stop at the nesting limit.
    /// - `min`: Lowest precedence this call may consume.
    ///
    /// # Returns
    /// The operand with every qualifying operator applied.
    pub(super) fn parse_operators<'a, I>(&mut self,
                                         tokens: &mut Peekable<I>,
                                         mut left: Expr,
                                         mut height: usize,
                                         min: u8)
                                         -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let mut chained: Option<u8> = None;

        while let Some(token) = tokens.peek().copied() {
            let TokenKind::Operator(symbol) = &token.kind else {
                break;
            };
            let position = token.position;

            let def = self.operator_after_operand(tokens, symbol, position)?;
            if def.precedence < min {
                break;
            }
            tokens.next();

            if def.fixity == Fixity::Postfix {
                height = Self::check_nesting(height + 1, position)?;
                left = Expr::Unary { op: def.symbol,
                                     fixity: Fixity::Postfix,
                                     operand: Box::new(left),
                                     position };
                chained = None;
                continue;
            }

            if def.associativity == Associativity::None && chained == Some(def.precedence) {
                return Err(ParseError::NonAssociativeChain { symbol: def.symbol,
                                                             position });
            }

            let threshold = match def.associativity {
                Associativity::Right => def.precedence,
                Associativity::Left | Associativity::None => def.precedence + 1,
            };

            if def.symbol == ASSIGNMENT {
                let name = match left {
                    Expr::Identifier { name, .. } => name,
                    other => {
                        return Err(ParseError::InvalidAssignmentTarget { target: other.to_string(),
                                                                         position });
                    },
                };
                let value = self.parse_expression(tokens, threshold)?;
                height = Self::check_nesting(1 + value.height(), position)?;
                left = Expr::Assignment { target: name,
                                          value: Box::new(value),
                                          declare: false,
                                          position };
            } else {
                let right = self.parse_expression(tokens, threshold)?;
                height = Self::check_nesting(1 + height.max(right.height()), position)?;
                left = Expr::Binary { op: def.symbol,
                                      left: Box::new(left),
                                      right: Box::new(right),
                                      position };
            }

            chained = (def.associativity == Associativity::None).then_some(def.precedence);
        }

        Ok(left)
    }

    /// Resolves an operator symbol that follows a complete operand.
    ///
    /// Such a symbol is either infix or postfix. When the table has both, the
    /// symbol is infix if the token after it can begin an operand and postfix
    /// otherwise.
    ///
    /// # Errors
    /// `UnknownOperator` if the symbol is neither infix nor postfix.
    fn operator_after_operand<'a, I>(&self,
                                     tokens: &Peekable<I>,
                                     symbol: &str,
                                     position: Position)
                                     -> ParseResult<OperatorDef>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let infix = self.operators.def(symbol, Fixity::Infix);
        let postfix = self.operators.def(symbol, Fixity::Postfix);

        match (infix, postfix) {
            (Some(infix), Some(postfix)) => {
                if self.operand_follows(tokens) {
                    Ok(infix.clone())
                } else {
                    Ok(postfix.clone())
                }
            },
            (Some(def), None) | (None, Some(def)) => Ok(def.clone()),
            (None, None) => Err(ParseError::UnknownOperator { symbol: symbol.to_string(),
                                                              fixity: Fixity::Infix,
                                                              position }),
        }
    }

    /// Returns `true` if the token after the next one can begin an operand.
    fn operand_follows<'a, I>(&self, tokens: &Peekable<I>) -> bool
        where I: Iterator<Item = &'a Token> + Clone
    {
        match tokens.clone().nth(1) {
            Some(Token { kind: TokenKind::Operator(symbol),
                         .. }) => self.operators.def(symbol, Fixity::Prefix).is_some(),
            Some(token) => token.kind.starts_operand(),
            None => false,
        }
    }
}
