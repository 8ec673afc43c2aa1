use std::{fmt, rc::Rc};

use crate::{
    ast::Expr,
    interpreter::{evaluator::environment::Env, operator::OperatorDef},
};

/// A function body together with the scope it closes over.
///
/// Closures hold their defining environment by reference, so later changes to
/// captured variables are visible when the closure runs.
pub struct Closure {
    /// The operator this closure implements, or `None` for a lambda.
    pub operator: Option<OperatorDef>,
    /// Parameter names, bound in order on each call.
    pub params:   Vec<String>,
    /// The body, shared with the AST it was parsed from.
    pub body:     Rc<Expr>,
    /// The captured environment.
    pub env:      Env,
}

impl Closure {
    /// A short description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.operator {
            Some(def) => format!("{} operator '{}'", def.fixity, def.symbol),
            None => format!("function of {} parameter(s)", self.params.len()),
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
         .field("operator", &self.operator)
         .field("params", &self.params)
         .field("body", &self.body)
         .finish_non_exhaustive()
    }
}
