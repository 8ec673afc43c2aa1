use std::fmt;

use logos::Logos;

use crate::error::ParseError;

/// A 1-based location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// The source line.
    pub line:   usize,
    /// The column within the line, counted in bytes.
    pub column: usize,
}

impl Position {
    /// Creates a position from a line and column.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The kind of a lexical token.
///
/// Operator symbols are maximal runs of operator characters, so `<+>` is a
/// single token and `a=-1` lexes `=-` as one (unknown) operator.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum TokenKind {
    /// Numeric literal tokens, such as `3`, `3.14` or `2.1e-10`.
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", parse_number)]
    Number(f64),
    /// String literal tokens with `\n`, `\t`, `\"` and `\\` escapes.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#, parse_string, allow_greedy = true)]
    Str(String),
    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `if`
    #[token("if")]
    If,
    /// `then`
    #[token("then")]
    Then,
    /// `else`
    #[token("else")]
    Else,
    /// `let`
    #[token("let")]
    Let,
    /// `fn`
    #[token("fn")]
    Fn,
    /// `infixl`
    #[token("infixl")]
    Infixl,
    /// `infixr`
    #[token("infixr")]
    Infixr,
    /// `infix`
    #[token("infix")]
    Infix,
    /// `prefix`
    #[token("prefix")]
    Prefix,
    /// `postfix`
    #[token("postfix")]
    Postfix,
    /// Identifier tokens such as `x` or `square`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// Operator symbols such as `+`, `<=` or `<+>`.
    #[regex(r"[+\-*/%^<>=!&|@$~?.:]+", |lex| lex.slice().to_string())]
    Operator(String),
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `# Comments.`
    #[regex(r"#[^\n]*", logos::skip, allow_greedy = true)]
    Comment,
    /// Line breaks only advance the position bookkeeping.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        lex.extras.line_start = lex.span().end;
        logos::Skip
    })]
    NewLine,
    /// Spaces, tabs, carriage returns and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

impl TokenKind {
    /// Returns `true` if a token of this kind may begin an operand without
    /// consulting the operator table.
    #[must_use]
    pub const fn starts_operand(&self) -> bool {
        matches!(self,
                 Self::Number(_)
                 | Self::Str(_)
                 | Self::True
                 | Self::False
                 | Self::Identifier(_)
                 | Self::LParen
                 | Self::LBrace
                 | Self::If
                 | Self::Fn
                 | Self::Let)
    }

    /// Returns `true` for the keywords that open an operator declaration.
    #[must_use]
    pub const fn is_declaration_keyword(&self) -> bool {
        matches!(self,
                 Self::Infixl | Self::Infixr | Self::Infix | Self::Prefix | Self::Postfix)
    }
}

/// A token together with its source text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was recognised.
    pub kind:     TokenKind,
    /// The exact source slice.
    pub lexeme:   String,
    /// Where the token starts.
    pub position: Position,
}

impl Token {
    /// The position just past the end of this token.
    #[must_use]
    pub fn end_position(&self) -> Position {
        Position::new(self.position.line,
                      self.position.column + self.lexeme.len())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "{}:{} {:?} '{}'",
               self.position.line, self.position.column, self.kind, self.lexeme)
    }
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number and the byte offset where it begins, so
/// that every token can be given a line and column.
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line:       usize,
    /// Byte offset of the first character of the current line.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

/// Turns source text into a token sequence.
///
/// Empty (or comment-only) input produces an empty vector, which callers
/// treat as "nothing to do".
///
/// # Errors
/// Returns [`ParseError::UnterminatedString`] for a string literal without a
/// closing quote and [`ParseError::UnexpectedCharacter`] for anything else
/// the lexer does not recognise.
///
/// # Example
/// ```
/// use opera::interpreter::lexer::{TokenKind, lex};
///
/// let tokens = lex("a <+> 2").unwrap();
/// assert_eq!(tokens[1].kind, TokenKind::Operator("<+>".to_string()));
/// assert_eq!(tokens[2].position.column, 7);
/// ```
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        let position = Position::new(lexer.extras.line, span.start - lexer.extras.line_start + 1);
        let slice = lexer.slice();

        match kind {
            Ok(kind) => tokens.push(Token { kind,
                                            lexeme: slice.to_string(),
                                            position }),
            Err(()) if slice.starts_with('"') => {
                return Err(ParseError::UnterminatedString { position });
            },
            Err(()) if slice.starts_with(|c: char| c.is_ascii_digit()) => {
                return Err(ParseError::InvalidNumber { text: slice.to_string(),
                                                       position });
            },
            Err(()) => {
                return Err(ParseError::UnexpectedCharacter { text: slice.to_string(),
                                                             position });
            },
        }
    }

    Ok(tokens)
}

/// Parses a numeric literal from the current token slice.
fn parse_number(lex: &logos::Lexer<TokenKind>) -> Option<f64> {
    lex.slice()
       .parse()
       .ok()
       .filter(|n: &f64| n.is_finite())
}

/// Strips the quotes from a string literal and resolves its escapes.
///
/// Unknown escapes keep the escaped character, so `"\q"` is `q`.
fn parse_string(lex: &logos::Lexer<TokenKind>) -> Option<String> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            other => out.push(other),
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_and_comment_only_input_yield_no_tokens() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("   \n\t # nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn operator_symbols_are_maximal_runs() {
        assert_eq!(kinds("a<+>b == c"),
                   vec![TokenKind::Identifier("a".into()),
                        TokenKind::Operator("<+>".into()),
                        TokenKind::Identifier("b".into()),
                        TokenKind::Operator("==".into()),
                        TokenKind::Identifier("c".into())]);
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(kinds("infixl infixlx if iffy"),
                   vec![TokenKind::Infixl,
                        TokenKind::Identifier("infixlx".into()),
                        TokenKind::If,
                        TokenKind::Identifier("iffy".into())]);
    }

    #[test]
    fn numbers_and_strings() {
        assert_eq!(kinds(r#"3 2.5 1e3 "a\"b\n""#),
                   vec![TokenKind::Number(3.0),
                        TokenKind::Number(2.5),
                        TokenKind::Number(1000.0),
                        TokenKind::Str("a\"b\n".into())]);
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let err = lex("x = 1e400").unwrap_err();
        assert_eq!(err,
                   ParseError::InvalidNumber { text:     "1e400".into(),
                                               position: Position::new(1, 5), });
        assert_eq!(kinds("1e308"), vec![TokenKind::Number(1e308)]);
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = lex("x = 1;\n  y").unwrap();
        assert_eq!(tokens[0].position, Position::new(1, 1));
        assert_eq!(tokens[2].position, Position::new(1, 5));
        assert_eq!(tokens[4].position, Position::new(2, 3));
        assert_eq!(tokens[4].end_position(), Position::new(2, 4));
    }

    #[test]
    fn unknown_characters_are_rejected_with_position() {
        let err = lex("1 +\n  `").unwrap_err();
        assert_eq!(err,
                   ParseError::UnexpectedCharacter { text:     "`".into(),
                                                     position: Position::new(2, 3), });
    }

    #[test]
    fn unterminated_strings_are_reported() {
        let err = lex("\"abc").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString { .. }));
    }
}
