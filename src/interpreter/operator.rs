use std::{collections::HashMap, fmt, rc::Rc};

use thiserror::Error;
use tracing::debug;

use crate::interpreter::value::closure::Closure;

/// Highest precedence a declared operator may use.
pub const MAX_PRECEDENCE: u8 = 20;

/// The assignment symbol. It is handled by the parser and cannot be declared.
pub const ASSIGNMENT: &str = "=";

/// Where an operator stands relative to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    /// Before its single operand, as in `-x`.
    Prefix,
    /// Between two operands, as in `a + b`.
    Infix,
    /// After its single operand, as in `n!`.
    Postfix,
}

impl Fixity {
    /// Number of operands an operator of this fixity takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Infix => 2,
            Self::Prefix | Self::Postfix => 1,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Prefix => 0,
            Self::Infix => 1,
            Self::Postfix => 2,
        }
    }
}

impl fmt::Display for Fixity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
             Self::Prefix => "prefix",
             Self::Infix => "infix",
             Self::Postfix => "postfix",
         })
    }
}

/// How equal-precedence operators group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    /// `a - b - c` is `(a - b) - c`.
    Left,
    /// `a ^ b ^ c` is `a ^ (b ^ c)`.
    Right,
    /// `a == b == c` is a syntax error.
    None,
}

/// The signature of an operator: everything the parser needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperatorDef {
    /// The operator symbol, such as `+` or `<+>`.
    pub symbol:        String,
    /// Binding power. Higher binds tighter.
    pub precedence:    u8,
    /// Grouping of equal-precedence chains.
    pub associativity: Associativity,
    /// Position relative to the operands.
    pub fixity:        Fixity,
}

impl OperatorDef {
    /// Creates a left-associative infix operator.
    #[must_use]
    pub fn infixl(symbol: &str, precedence: u8) -> Self {
        Self::new(symbol, precedence, Associativity::Left, Fixity::Infix)
    }

    /// Creates a right-associative infix operator.
    #[must_use]
    pub fn infixr(symbol: &str, precedence: u8) -> Self {
        Self::new(symbol, precedence, Associativity::Right, Fixity::Infix)
    }

    /// Creates a non-associative infix operator.
    #[must_use]
    pub fn infix(symbol: &str, precedence: u8) -> Self {
        Self::new(symbol, precedence, Associativity::None, Fixity::Infix)
    }

    /// Creates a prefix operator. Prefix operators nest to the right.
    #[must_use]
    pub fn prefix(symbol: &str, precedence: u8) -> Self {
        Self::new(symbol, precedence, Associativity::Right, Fixity::Prefix)
    }

    /// Creates a postfix operator. Postfix operators nest to the left.
    #[must_use]
    pub fn postfix(symbol: &str, precedence: u8) -> Self {
        Self::new(symbol, precedence, Associativity::Left, Fixity::Postfix)
    }

    fn new(symbol: &str, precedence: u8, associativity: Associativity, fixity: Fixity) -> Self {
        Self { symbol: symbol.to_string(),
               precedence,
               associativity,
               fixity }
    }

    /// The declaration keyword that produces this signature.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match (self.fixity, self.associativity) {
            (Fixity::Prefix, _) => "prefix",
            (Fixity::Postfix, _) => "postfix",
            (Fixity::Infix, Associativity::Left) => "infixl",
            (Fixity::Infix, Associativity::Right) => "infixr",
            (Fixity::Infix, Associativity::None) => "infix",
        }
    }
}

/// The built-in operator implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// Infix `+`
    Add,
    /// Infix `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `^`
    Pow,
    /// Prefix `-`
    Negate,
    /// Prefix `!`
    Not,
    /// Postfix `!`
    Factorial,
    /// `=`, which never reaches dispatch.
    Assign,
}

/// What runs when an operator is applied.
#[derive(Debug, Clone)]
pub enum Implementation {
    /// A built-in.
    Native(NativeOp),
    /// A user declaration whose body has been evaluated.
    Closure(Rc<Closure>),
    /// A user declaration whose body has not been evaluated yet.
    Declared,
}

/// A row of the operator table.
#[derive(Debug, Clone)]
pub struct OperatorEntry {
    /// The signature.
    pub def:            OperatorDef,
    /// The behaviour.
    pub implementation: Implementation,
}

/// A declaration the table refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot declare {fixity} operator '{symbol}': {reason}")]
pub struct OperatorConflict {
    /// The declared symbol.
    pub symbol: String,
    /// The declared fixity.
    pub fixity: Fixity,
    /// Why it was refused.
    pub reason: String,
}

/// Maps `(symbol, fixity)` pairs to operator entries.
///
/// One symbol may carry up to three independent entries, one per fixity, so
/// `-` can be both prefix and infix. Both the parser and the interpreter own a
/// table; the parser's is updated as declarations are parsed and the
/// interpreter's as they are evaluated.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    entries: HashMap<String, [Option<OperatorEntry>; 3]>,
}

impl OperatorTable {
    /// Creates a table with no operators at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a table seeded with the built-in operators.
    ///
    /// # Example
    /// ```
    /// use opera::interpreter::operator::{Fixity, OperatorTable};
    ///
    /// let table = OperatorTable::builtin();
    /// assert_eq!(table.def("*", Fixity::Infix).unwrap().precedence, 7);
    /// assert!(table.lookup("-", Fixity::Prefix).is_some());
    /// assert!(table.lookup("*", Fixity::Prefix).is_none());
    /// ```
    #[must_use]
    pub fn builtin() -> Self {
        use NativeOp::{
            Add, And, Assign, Div, Equal, Factorial, Greater, GreaterEqual, Less, LessEqual,
            Mul, Negate, Not, NotEqual, Or, Pow, Rem, Sub,
        };

        let natives = [(OperatorDef::infixr(ASSIGNMENT, 1), Assign),
                       (OperatorDef::infixl("||", 2), Or),
                       (OperatorDef::infixl("&&", 3), And),
                       (OperatorDef::infix("==", 4), Equal),
                       (OperatorDef::infix("!=", 4), NotEqual),
                       (OperatorDef::infix("<", 5), Less),
                       (OperatorDef::infix("<=", 5), LessEqual),
                       (OperatorDef::infix(">", 5), Greater),
                       (OperatorDef::infix(">=", 5), GreaterEqual),
                       (OperatorDef::infixl("+", 6), Add),
                       (OperatorDef::infixl("-", 6), Sub),
                       (OperatorDef::infixl("*", 7), Mul),
                       (OperatorDef::infixl("/", 7), Div),
                       (OperatorDef::infixl("%", 7), Rem),
                       (OperatorDef::infixr("^", 8), Pow),
                       (OperatorDef::prefix("-", 9), Negate),
                       (OperatorDef::prefix("!", 9), Not),
                       (OperatorDef::postfix("!", 10), Factorial)];

        let mut table = Self::empty();
        for (def, op) in natives {
            table.insert(OperatorEntry { def,
                                         implementation: Implementation::Native(op) });
        }
        table
    }

    /// Finds the entry for a symbol with the given fixity.
    #[must_use]
    pub fn lookup(&self, symbol: &str, fixity: Fixity) -> Option<&OperatorEntry> {
        self.entries.get(symbol)?[fixity.slot()].as_ref()
    }

    /// Finds the signature for a symbol with the given fixity.
    #[must_use]
    pub fn def(&self, symbol: &str, fixity: Fixity) -> Option<&OperatorDef> {
        self.lookup(symbol, fixity).map(|entry| &entry.def)
    }

    /// Returns `true` if the symbol has an entry of any fixity.
    #[must_use]
    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.entries
            .get(symbol)
            .is_some_and(|slots| slots.iter().any(Option::is_some))
    }

    /// Checks that a signature may be declared.
    ///
    /// # Errors
    /// Returns an [`OperatorConflict`] when the symbol is reserved or the
    /// precedence is outside `1..=MAX_PRECEDENCE`.
    pub fn check(def: &OperatorDef) -> Result<(), OperatorConflict> {
        let conflict = |reason: String| OperatorConflict { symbol: def.symbol.clone(),
                                                           fixity: def.fixity,
                                                           reason };

        if def.symbol == ASSIGNMENT {
            return Err(conflict("the symbol is reserved for assignment".to_string()));
        }
        if !(1..=MAX_PRECEDENCE).contains(&def.precedence) {
            return Err(conflict(format!("precedence {} is outside 1..={MAX_PRECEDENCE}",
                                        def.precedence)));
        }
        Ok(())
    }

    /// Registers a signature without an implementation.
    ///
    /// An existing entry for the same symbol and fixity keeps its
    /// implementation and takes the new signature, so redeclaring `+` changes
    /// how it parses while the built-in keeps working until a body replaces
    /// it.
    ///
    /// # Errors
    /// See [`OperatorTable::check`].
    pub fn define(&mut self, def: OperatorDef) -> Result<(), OperatorConflict> {
        Self::check(&def)?;
        debug!(symbol = %def.symbol, fixity = %def.fixity, precedence = def.precedence,
               "declaring operator");

        let slot = self.slot_mut(&def.symbol, def.fixity);
        match slot {
            Some(entry) => entry.def = def,
            None => {
                *slot = Some(OperatorEntry { def,
                                             implementation: Implementation::Declared })
            },
        }
        Ok(())
    }

    /// Registers a signature together with a user implementation, replacing
    /// any previous entry.
    ///
    /// # Errors
    /// See [`OperatorTable::check`].
    pub fn install(&mut self, closure: Rc<Closure>) -> Result<(), OperatorConflict> {
        let Some(def) = closure.operator.clone() else {
            return Ok(());
        };
        Self::check(&def)?;
        debug!(symbol = %def.symbol, fixity = %def.fixity, "installing operator body");
        self.insert(OperatorEntry { def,
                                    implementation: Implementation::Closure(closure) });
        Ok(())
    }

    /// Registers every signature of a parser delta, in order.
    ///
    /// # Errors
    /// Stops at the first signature that conflicts.
    pub fn merge<'a>(&mut self,
                     delta: impl IntoIterator<Item = &'a OperatorDef>)
                     -> Result<(), OperatorConflict> {
        for def in delta {
            self.define(def.clone())?;
        }
        Ok(())
    }

    /// All entries, sorted by precedence, then symbol, then fixity.
    #[must_use]
    pub fn entries(&self) -> Vec<&OperatorEntry> {
        let mut all: Vec<_> = self.entries.values().flatten().flatten().collect();
        all.sort_by(|a, b| {
               (a.def.precedence, &a.def.symbol, a.def.fixity.slot()).cmp(&(b.def.precedence,
                                                                           &b.def.symbol,
                                                                           b.def.fixity.slot()))
           });
        all
    }

    fn insert(&mut self, entry: OperatorEntry) {
        let (symbol, fixity) = (entry.def.symbol.clone(), entry.def.fixity);
        *self.slot_mut(&symbol, fixity) = Some(entry);
    }

    fn slot_mut(&mut self, symbol: &str, fixity: Fixity) -> &mut Option<OperatorEntry> {
        &mut self.entries.entry(symbol.to_string()).or_default()[fixity.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixities_of_one_symbol_coexist() {
        let table = OperatorTable::builtin();
        assert_eq!(table.def("-", Fixity::Infix).unwrap().precedence, 6);
        assert_eq!(table.def("-", Fixity::Prefix).unwrap().precedence, 9);
        assert_eq!(table.def("!", Fixity::Postfix).unwrap().precedence, 10);
        assert!(table.lookup("-", Fixity::Postfix).is_none());
    }

    #[test]
    fn declaring_a_new_symbol_leaves_it_unimplemented() {
        let mut table = OperatorTable::builtin();
        table.define(OperatorDef::infixl("<+>", 6)).unwrap();
        let entry = table.lookup("<+>", Fixity::Infix).unwrap();
        assert!(matches!(entry.implementation, Implementation::Declared));
        assert!(table.contains_symbol("<+>"));
        assert!(!table.contains_symbol("<->"));
    }

    #[test]
    fn redeclaring_keeps_the_implementation() {
        let mut table = OperatorTable::builtin();
        table.define(OperatorDef::infixr("+", 12)).unwrap();
        let entry = table.lookup("+", Fixity::Infix).unwrap();
        assert_eq!(entry.def.precedence, 12);
        assert_eq!(entry.def.associativity, Associativity::Right);
        assert!(matches!(entry.implementation, Implementation::Native(NativeOp::Add)));
    }

    #[test]
    fn conflicts_are_rejected() {
        let mut table = OperatorTable::builtin();
        let err = table.define(OperatorDef::prefix("=", 3)).unwrap_err();
        assert_eq!(err.symbol, "=");
        assert!(table.define(OperatorDef::infixl("<+>", 0)).is_err());
        assert!(table.define(OperatorDef::infixl("<+>", MAX_PRECEDENCE + 1)).is_err());
        assert!(table.define(OperatorDef::infixl("<+>", MAX_PRECEDENCE)).is_ok());
    }

    #[test]
    fn merge_stops_at_first_conflict() {
        let mut table = OperatorTable::builtin();
        let delta = [OperatorDef::infixl("<+>", 6),
                     OperatorDef::infixl("=", 6),
                     OperatorDef::infixl("<->", 6)];
        assert!(table.merge(&delta).is_err());
        assert!(table.contains_symbol("<+>"));
        assert!(!table.contains_symbol("<->"));
    }

    #[test]
    fn keywords_match_signatures() {
        assert_eq!(OperatorDef::infixl("+", 6).keyword(), "infixl");
        assert_eq!(OperatorDef::infixr("^", 8).keyword(), "infixr");
        assert_eq!(OperatorDef::infix("==", 4).keyword(), "infix");
        assert_eq!(OperatorDef::prefix("-", 9).keyword(), "prefix");
        assert_eq!(OperatorDef::postfix("!", 10).keyword(), "postfix");
    }
}
