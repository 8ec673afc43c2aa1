use std::{fmt, fmt::Write as _, rc::Rc};

use crate::interpreter::{
    lexer::Position,
    operator::{Fixity, OperatorDef},
    value::core::Value,
};

/// Number of spaces per indentation level in rendered source.
pub const INDENT_WIDTH: usize = 4;

/// An abstract syntax tree (AST) node representing an expression in the
/// language.
///
/// Everything in the language is an expression, including assignments,
/// blocks and operator declarations. Each variant carries the position of the
/// token that introduced it. Operator nodes store the symbol as written; its
/// meaning is looked up in the interpreter's operator table when the node is
/// evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant: a number, string, boolean or `()`.
    Literal {
        /// The constant value.
        value:    Value,
        /// Position of the literal.
        position: Position,
    },
    /// Reference to a variable by name.
    Identifier {
        /// Name of the variable.
        name:     String,
        /// Position of the name.
        position: Position,
    },
    /// A prefix or postfix operator application, such as `-x` or `n!`.
    Unary {
        /// The operator symbol.
        op:       String,
        /// Whether the operator was written before or after the operand.
        fixity:   Fixity,
        /// The operand.
        operand:  Box<Self>,
        /// Position of the operator symbol.
        position: Position,
    },
    /// An infix operator application, such as `a + b`.
    Binary {
        /// The operator symbol.
        op:       String,
        /// Left-hand operand.
        left:     Box<Self>,
        /// Right-hand operand.
        right:    Box<Self>,
        /// Position of the operator symbol.
        position: Position,
    },
    /// A call such as `f(1, 2)`.
    Call {
        /// The expression producing the callable.
        callee:    Box<Self>,
        /// The arguments, evaluated left to right.
        arguments: Vec<Self>,
        /// Position of the opening parenthesis.
        position:  Position,
    },
    /// `name = value`, or `let name = value` when `declare` is set.
    Assignment {
        /// The variable being bound.
        target:   String,
        /// The new value.
        value:    Box<Self>,
        /// `true` for `let`, which always binds in the current scope.
        declare:  bool,
        /// Position of the `=` or the `let` keyword.
        position: Position,
    },
    /// A braced sequence of expressions with its own scope.
    Block {
        /// The statements, in order.
        body:     Vec<Self>,
        /// Position of the opening brace.
        position: Position,
    },
    /// `if condition then a else b`, with an optional `else`.
    Conditional {
        /// Must evaluate to a boolean.
        condition:   Box<Self>,
        /// Evaluated when the condition holds.
        then_branch: Box<Self>,
        /// Evaluated otherwise, if present.
        else_branch: Option<Box<Self>>,
        /// Position of the `if` keyword.
        position:    Position,
    },
    /// An operator declaration with its body, such as
    /// `infixl 6 <+> (a, b) = a + b`.
    OperatorDecl {
        /// The declared signature.
        def:      OperatorDef,
        /// Parameter names; one per operand.
        params:   Vec<String>,
        /// The body, shared with the closure created from it.
        body:     Rc<Self>,
        /// Position of the declaration keyword.
        position: Position,
    },
    /// An anonymous function, `fn(a, b) body`.
    Lambda {
        /// Parameter names.
        params:   Vec<String>,
        /// The body, shared with the closures created from it.
        body:     Rc<Self>,
        /// Position of the `fn` keyword.
        position: Position,
    },
    /// An operator used as a value, such as `(+)`.
    OperatorRef {
        /// The operator symbol.
        symbol:   String,
        /// The fixity that was resolved when the reference was parsed.
        fixity:   Fixity,
        /// Position of the symbol.
        position: Position,
    },
}

impl Expr {
    /// Returns the source position of this expression.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Literal { position, .. }
            | Self::Identifier { position, .. }
            | Self::Unary { position, .. }
            | Self::Binary { position, .. }
            | Self::Call { position, .. }
            | Self::Assignment { position, .. }
            | Self::Block { position, .. }
            | Self::Conditional { position, .. }
            | Self::OperatorDecl { position, .. }
            | Self::Lambda { position, .. }
            | Self::OperatorRef { position, .. } => *position,
        }
    }

    /// Number of nodes on the longest path from this expression down to a
    /// leaf.
    ///
    /// Recursive, so only call it on trees the parser has already bounded.
    pub(crate) fn height(&self) -> usize {
        let below = match self {
            Self::Literal { .. } | Self::Identifier { .. } | Self::OperatorRef { .. } => 0,
            Self::Unary { operand, .. } => operand.height(),
            Self::Binary { left, right, .. } => left.height().max(right.height()),
            Self::Call { callee, arguments, .. } => {
                arguments.iter().map(Self::height).fold(callee.height(), usize::max)
            },
            Self::Assignment { value, .. } => value.height(),
            Self::Block { body, .. } => body.iter().map(Self::height).max().unwrap_or(0),
            Self::Conditional { condition,
                                then_branch,
                                else_branch,
                                .. } => {
                let branches = then_branch.height()
                                          .max(else_branch.as_deref().map_or(0, Self::height));
                condition.height().max(branches)
            },
            Self::OperatorDecl { body, .. } | Self::Lambda { body, .. } => body.height(),
        };
        below + 1
    }

    /// Renders the expression as canonical source text.
    ///
    /// Operator applications are fully parenthesized and blocks put one
    /// statement per line, indented by [`INDENT_WIDTH`] spaces per level.
    /// `indent` is the level of the line the expression starts on; it only
    /// affects how nested blocks are laid out. Parsing the rendered text with
    /// the same operator table yields an expression of the same shape.
    ///
    /// # Example
    /// ```
    /// use opera::{
    ///     ast::Expr,
    ///     interpreter::{lexer::Position, value::core::Value},
    /// };
    ///
    /// let num = |n: f64| Box::new(Expr::Literal { value:    Value::Number(n),
    ///                                             position: Position::default(), });
    /// let sum = Expr::Binary { op:       "+".to_string(),
    ///                          left:     num(1.0),
    ///                          right:    num(2.0),
    ///                          position: Position::default(), };
    /// assert_eq!(sum.render(0), "(1 + 2)");
    /// ```
    #[must_use]
    pub fn render(&self, indent: usize) -> String {
        let mut out = String::new();
        self.render_into(&mut out, indent);
        out
    }

    fn render_into(&self, out: &mut String, indent: usize) {
        match self {
            Self::Literal { value, .. } => render_literal(out, value),
            Self::Identifier { name, .. } => out.push_str(name),
            Self::Unary { op,
                          fixity,
                          operand,
                          .. } => {
                out.push('(');
                if *fixity == Fixity::Postfix {
                    operand.render_operand(out, indent);
                    out.push(' ');
                    out.push_str(op);
                } else {
                    out.push_str(op);
                    out.push(' ');
                    operand.render_operand(out, indent);
                }
                out.push(')');
            },
            Self::Binary { op, left, right, .. } => {
                out.push('(');
                left.render_operand(out, indent);
                let _ = write!(out, " {op} ");
                right.render_operand(out, indent);
                out.push(')');
            },
            Self::Call { callee, arguments, .. } => {
                if callee.is_call_target() {
                    callee.render_into(out, indent);
                } else {
                    callee.render_wrapped(out, indent);
                }
                out.push('(');
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    argument.render_into(out, indent);
                }
                out.push(')');
            },
            Self::Assignment { target,
                               value,
                               declare,
                               .. } => {
                if *declare {
                    out.push_str("let ");
                }
                let _ = write!(out, "{target} = ");
                value.render_into(out, indent);
            },
            Self::Block { body, .. } => {
                if body.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{\n");
                for statement in body {
                    push_indent(out, indent + 1);
                    statement.render_into(out, indent + 1);
                    out.push_str(";\n");
                }
                push_indent(out, indent);
                out.push('}');
            },
            Self::Conditional { condition,
                                then_branch,
                                else_branch,
                                .. } => {
                out.push_str("if ");
                if matches!(**condition, Self::Conditional { .. }) {
                    condition.render_wrapped(out, indent);
                } else {
                    condition.render_into(out, indent);
                }
                out.push_str(" then ");
                let wrap_then = matches!(**then_branch, Self::Conditional { .. })
                                || then_branch.ends_in_open_if();
                if wrap_then {
                    then_branch.render_wrapped(out, indent);
                } else {
                    then_branch.render_into(out, indent);
                }
                if let Some(else_branch) = else_branch {
                    out.push_str(" else ");
                    else_branch.render_into(out, indent);
                }
            },
            Self::OperatorDecl { def, params, body, .. } => {
                let _ = write!(out, "{} {} {} ", def.keyword(), def.precedence, def.symbol);
                render_params(out, params);
                out.push_str(" = ");
                body.render_into(out, indent);
            },
            Self::Lambda { params, body, .. } => {
                out.push_str("fn");
                render_params(out, params);
                out.push(' ');
                body.render_into(out, indent);
            },
            Self::OperatorRef { symbol, .. } => {
                let _ = write!(out, "({symbol})");
            },
        }
    }

    /// Renders an operand of an operator, wrapping the forms that would
    /// otherwise swallow the rest of the enclosing expression.
    fn render_operand(&self, out: &mut String, indent: usize) {
        match self {
            Self::Assignment { .. }
            | Self::Conditional { .. }
            | Self::Lambda { .. }
            | Self::OperatorDecl { .. } => self.render_wrapped(out, indent),
            _ => self.render_into(out, indent),
        }
    }

    fn render_wrapped(&self, out: &mut String, indent: usize) {
        out.push('(');
        self.render_into(out, indent);
        out.push(')');
    }

    /// Returns `true` if the rendered text ends in an `if` without an `else`,
    /// which would claim an `else` written after it.
    fn ends_in_open_if(&self) -> bool {
        let mut tail = self;
        loop {
            tail = match tail {
                Self::Conditional { else_branch: None, .. } => return true,
                Self::Conditional { else_branch: Some(else_branch),
                                    .. } => else_branch,
                Self::Assignment { value, .. } => value,
                Self::Lambda { body, .. } | Self::OperatorDecl { body, .. } => body,
                _ => return false,
            };
        }
    }

    /// Returns `true` for the forms that may be called without extra
    /// parentheses.
    const fn is_call_target(&self) -> bool {
        matches!(self,
                 Self::Identifier { .. }
                 | Self::Call { .. }
                 | Self::Block { .. }
                 | Self::Unary { .. }
                 | Self::Binary { .. }
                 | Self::OperatorRef { .. })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0))
    }
}

fn push_indent(out: &mut String, level: usize) {
    out.extend(std::iter::repeat_n(' ', level * INDENT_WIDTH));
}

fn render_params(out: &mut String, params: &[String]) {
    let _ = write!(out, "({})", params.join(", "));
}

fn render_literal(out: &mut String, value: &Value) {
    let Value::Str(s) = value else {
        let _ = write!(out, "{value}");
        return;
    };

    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn at() -> Position {
        Position::default()
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal { value:    Value::Number(n),
                                 position: at(), })
    }

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Identifier { name:     name.to_string(),
                                    position: at(), })
    }

    fn binary(op: &str, left: Box<Expr>, right: Box<Expr>) -> Box<Expr> {
        Box::new(Expr::Binary { op: op.to_string(),
                                left,
                                right,
                                position: at() })
    }

    #[test]
    fn operators_are_fully_parenthesized() {
        let neg = Box::new(Expr::Unary { op:       "-".to_string(),
                                         fixity:   Fixity::Prefix,
                                         operand:  ident("x"),
                                         position: at(), });
        let fact = Box::new(Expr::Unary { op:       "!".to_string(),
                                          fixity:   Fixity::Postfix,
                                          operand:  num(5.0),
                                          position: at(), });
        let expr = binary("*", binary("+", neg, num(2.5)), fact);
        assert_snapshot!(expr.to_string(), @"(((- x) + 2.5) * (5 !))");
    }

    #[test]
    fn low_precedence_forms_are_wrapped_as_operands() {
        let assign = Box::new(Expr::Assignment { target:   "y".to_string(),
                                                 value:    num(1.0),
                                                 declare:  false,
                                                 position: at(), });
        let cond = Box::new(Expr::Conditional { condition:   ident("c"),
                                                then_branch: num(1.0),
                                                else_branch: Some(num(2.0)),
                                                position:    at(), });
        assert_snapshot!(binary("+", assign, cond).to_string(),
                         @"((y = 1) + (if c then 1 else 2))");
    }

    #[test]
    fn then_branches_ending_in_an_open_if_are_wrapped() {
        let open_if = Expr::Conditional { condition:   ident("x"),
                                          then_branch: num(1.0),
                                          else_branch: None,
                                          position:    at(), };
        let lambda = Expr::Lambda { params:   vec!["x".to_string()],
                                    body:     Rc::new(open_if),
                                    position: at(), };
        let outer = Expr::Conditional { condition:   ident("a"),
                                        then_branch: Box::new(lambda),
                                        else_branch: Some(num(2.0)),
                                        position:    at(), };
        assert_snapshot!(outer.to_string(), @"if a then (fn(x) if x then 1) else 2");
    }

    #[test]
    fn strings_are_quoted_and_escaped() {
        let s = Expr::Literal { value:    Value::from("say \"hi\"\n"),
                                position: at(), };
        assert_snapshot!(s.to_string(), @r#""say \"hi\"\n""#);
    }

    #[test]
    fn calls_wrap_unusual_callees() {
        let lambda = Expr::Lambda { params:   vec!["a".to_string()],
                                    body:     Rc::new(*ident("a")),
                                    position: at(), };
        let call = Expr::Call { callee:    Box::new(lambda),
                                arguments: vec![*num(1.0)],
                                position:  at(), };
        assert_snapshot!(call.to_string(), @"(fn(a) a)(1)");

        let named = Expr::Call { callee:    ident("f"),
                                 arguments: vec![*num(1.0), *ident("x")],
                                 position:  at(), };
        assert_snapshot!(named.to_string(), @"f(1, x)");
    }

    #[test]
    fn declarations_render_with_their_keyword() {
        let decl = Expr::OperatorDecl { def:      OperatorDef::infixr("<+>", 6),
                                        params:   vec!["a".to_string(), "b".to_string()],
                                        body:     Rc::new(*binary("+", ident("a"), ident("b"))),
                                        position: at(), };
        assert_snapshot!(decl.to_string(), @"infixr 6 <+> (a, b) = (a + b)");
    }

    #[test]
    fn blocks_indent_nested_statements() {
        let inner = Expr::Block { body:     vec![*ident("y")],
                                  position: at(), };
        let outer = Expr::Block { body:     vec![Expr::Assignment { target:   "x".to_string(),
                                                                    value:    num(1.0),
                                                                    declare:  true,
                                                                    position: at(), },
                                                 inner],
                                  position: at(), };
        assert_eq!(outer.render(0),
                   "{\n    let x = 1;\n    {\n        y;\n    };\n}");
        assert_eq!(Expr::Block { body:     vec![],
                                 position: at(), }.render(3),
                   "{}");
    }
}
