use std::iter::Peekable;

use tracing::trace;

use crate::{
    ast::Expr,
    error::ParseError,
    interpreter::{
        lexer::{Position, Token},
        operator::{OperatorDef, OperatorTable},
    },
    util::{MAX_NESTING, STACK_GROW_SIZE, STACK_RED_ZONE},
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Threshold that admits every operator.
pub const LOWEST: u8 = 0;

/// The output of a successful [`Parser::parse`] call.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    /// The top-level expressions, in source order.
    pub exprs:     Vec<Expr>,
    /// The operator signatures declared during this call, in order.
    pub operators: Vec<OperatorDef>,
}

/// A Pratt parser over an operator table that grows as declarations are read.
///
/// A `Parser` may be fed several token sequences in turn; declarations made
/// by one call are known to the next. A failed call leaves the table as it
/// was before the call.
#[derive(Debug, Clone)]
pub struct Parser {
    pub(super) operators: OperatorTable,
    pub(super) delta:     Vec<OperatorDef>,
    pub(super) end:       Position,
    /// Number of `parse_expression` calls currently active.
    pub(super) depth:     usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Creates a parser that knows the built-in operators.
    #[must_use]
    pub fn new() -> Self {
        Self::with_operators(OperatorTable::builtin())
    }

    /// Creates a parser over an existing operator table.
    #[must_use]
    pub const fn with_operators(operators: OperatorTable) -> Self {
        Self { operators,
               delta: Vec::new(),
               end: Position { line:   1,
                               column: 1, },
               depth: 0 }
    }

    /// The operator table as it stands after the last successful call.
    #[must_use]
    pub const fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// Parses a whole token sequence into top-level expressions.
    ///
    /// Statements are separated by `;`. A trailing `;` is optional and empty
    /// statements are skipped, so empty input yields no expressions.
    ///
    /// # Errors
    /// Returns the first syntax error. The operator table is then restored to
    /// its state before the call.
    ///
    /// # Example
    /// ```
    /// use opera::interpreter::{lexer::lex, parser::core::Parser};
    ///
    /// let mut parser = Parser::new();
    /// let parsed = parser.parse(&lex("infixl 6 <+> (a, b) = a + b; 1 <+> 2").unwrap())
    ///                    .unwrap();
    /// assert_eq!(parsed.exprs.len(), 2);
    /// assert_eq!(parsed.exprs[1].to_string(), "(1 <+> 2)");
    /// assert_eq!(parsed.operators[0].symbol, "<+>");
    /// ```
    pub fn parse(&mut self, tokens: &[Token]) -> ParseResult<Parsed> {
        let snapshot = self.operators.clone();
        self.delta.clear();
        self.depth = 0;
        self.end = tokens.last()
                         .map_or_else(Position::default, Token::end_position);

        let mut iter = tokens.iter().peekable();
        match self.parse_program(&mut iter) {
            Ok(exprs) => {
                trace!(roots = exprs.len(), declared = self.delta.len(), "parsed program");
                Ok(Parsed { exprs,
                            operators: std::mem::take(&mut self.delta) })
            },
            Err(e) => {
                self.operators = snapshot;
                self.delta.clear();
                Err(e)
            },
        }
    }

    /// Parses one expression whose operators all bind at least as tightly
    /// as `min`.
    ///
    /// Recursion depth follows the nesting of the source, so the stack is
    /// grown on demand. Nesting beyond [`MAX_NESTING`] levels is refused
    /// before the tree gets any taller.
    ///
    /// # Errors
    /// `NestingTooDeep` past the nesting limit, plus any syntax error in the
    /// expression.
    pub(super) fn parse_expression<'a, I>(&mut self,
                                          tokens: &mut Peekable<I>,
                                          min: u8)
                                          -> ParseResult<Expr>
        where I: Iterator<Item = &'a Token> + Clone
    {
        let position = tokens.peek().map_or(self.end, |token| token.position);
        Self::check_nesting(self.depth + 1, position)?;

        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            let left = self.parse_prefix(tokens)?;
            let height = Self::check_nesting(left.height(), position)?;
            self.parse_operators(tokens, left, height, min)
        });
        self.depth -= 1;
        result
    }

    /// Passes `height` through if an expression that tall may be built.
    ///
    /// # Errors
    /// `NestingTooDeep` if `height` exceeds [`MAX_NESTING`].
    pub(super) const fn check_nesting(height: usize, position: Position) -> ParseResult<usize> {
        if height > MAX_NESTING {
            return Err(ParseError::NestingTooDeep { limit: MAX_NESTING,
                                                    position });
        }
        Ok(height)
    }
}
