use std::{fmt, rc::Rc};

use crate::interpreter::{
    operator::{NativeOp, OperatorDef},
    value::closure::Closure,
};

/// Represents a runtime value in the interpreter.
///
/// Values are immutable. Strings and closures are reference counted, so
/// cloning a value is cheap.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A double precision number. Evaluation never produces NaN or infinities.
    Number(f64),
    /// A boolean value, produced by comparisons and `true`/`false`.
    Bool(bool),
    /// An immutable string.
    Str(Rc<str>),
    /// A function or operator value.
    Callable(Callable),
    /// The value of statements that produce nothing, written `()`.
    Unit,
}

/// Something that can be called with arguments.
#[derive(Debug, Clone)]
pub enum Callable {
    /// A built-in operator taken as a value, such as `(+)`.
    Native {
        /// The operator signature at the time it was taken.
        def: OperatorDef,
        /// The built-in behaviour.
        op:  NativeOp,
    },
    /// A lambda or a user-declared operator.
    Closure(Rc<Closure>),
}

impl Callable {
    /// Number of arguments the callable expects.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Native { def, .. } => def.fixity.arity(),
            Self::Closure(closure) => closure.params.len(),
        }
    }

    /// A short description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Native { def, .. } => format!("{} operator '{}'", def.fixity, def.symbol),
            Self::Closure(closure) => closure.describe(),
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Native { def: a, op: x }, Self::Native { def: b, op: y }) => {
                x == y && a.symbol == b.symbol && a.fixity == b.fixity
            },
            (Self::Closure(a), Self::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl Value {
    /// The name of the value's kind, as used in type errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::Callable(_) => "callable",
            Self::Unit => "unit",
        }
    }

    /// Returns `true` for [`Value::Unit`].
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }
}

impl fmt::Display for Value {
    /// Formats the value as program output.
    ///
    /// Integral numbers print without a fraction and negative zero prints as
    /// `0`. Strings print without quotes.
    ///
    /// # Example
    /// ```
    /// use opera::interpreter::value::core::Value;
    ///
    /// assert_eq!(Value::Number(4.0).to_string(), "4");
    /// assert_eq!(Value::Number(2.5).to_string(), "2.5");
    /// assert_eq!(Value::from("hi").to_string(), "hi");
    /// assert_eq!(Value::Unit.to_string(), "()");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if *n == 0.0 => write!(f, "0"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Callable(Callable::Native { def, .. }) => write!(f, "<operator {}>", def.symbol),
            Self::Callable(Callable::Closure(closure)) => match &closure.operator {
                Some(def) => write!(f, "<operator {}>", def.symbol),
                None => write!(f, "<fn/{}>", closure.params.len()),
            },
            Self::Unit => write!(f, "()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::Expr,
        interpreter::{evaluator::environment::Scope, lexer::Position},
    };

    fn lambda(params: &[&str]) -> Rc<Closure> {
        Rc::new(Closure { operator: None,
                          params:   params.iter().map(ToString::to_string).collect(),
                          body:     Rc::new(Expr::Literal { value:    Value::Unit,
                                                            position: Position::default(), }),
                          env:      Scope::global(), })
    }

    #[test]
    fn numbers_print_without_needless_fractions() {
        assert_eq!(Value::Number(-5.0).to_string(), "-5");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Number(1e21).to_string(), "1000000000000000000000");
    }

    #[test]
    fn callables_print_their_shape() {
        let add = Callable::Native { def: OperatorDef::infixl("+", 6),
                                     op:  NativeOp::Add, };
        assert_eq!(Value::Callable(add).to_string(), "<operator +>");
        assert_eq!(Value::Callable(Callable::Closure(lambda(&["a", "b"]))).to_string(),
                   "<fn/2>");
    }

    #[test]
    fn closures_compare_by_identity() {
        let f = lambda(&["x"]);
        let g = lambda(&["x"]);
        assert_eq!(Value::Callable(Callable::Closure(Rc::clone(&f))),
                   Value::Callable(Callable::Closure(Rc::clone(&f))));
        assert_ne!(Value::Callable(Callable::Closure(f)),
                   Value::Callable(Callable::Closure(g)));
    }

    #[test]
    fn equality_is_kind_sensitive() {
        assert_eq!(Value::from("1"), Value::from("1"));
        assert_ne!(Value::from("1"), Value::Number(1.0));
        assert_ne!(Value::Bool(false), Value::Unit);
    }
}
