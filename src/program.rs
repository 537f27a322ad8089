//! The in-memory program contract: what a grammar parser hands the interpreter.

use crate::operation::ShapeOperation;
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A grammar nonterminal. Equality and hashing are by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that may appear on the right-hand side of a rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Successor {
    Symbol(Symbol),
    Operation(ShapeOperation),
}

impl From<Symbol> for Successor {
    fn from(symbol: Symbol) -> Self {
        Successor::Symbol(symbol)
    }
}

impl From<&str> for Successor {
    fn from(name: &str) -> Self {
        Successor::Symbol(Symbol::new(name))
    }
}

impl From<ShapeOperation> for Successor {
    fn from(operation: ShapeOperation) -> Self {
        Successor::Operation(operation)
    }
}

impl fmt::Display for Successor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Successor::Symbol(symbol) => write!(f, "{symbol}"),
            Successor::Operation(operation) => write!(f, "{operation}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionRule {
    pub predecessor: Symbol,
    pub successors: Vec<Successor>,
}

impl ProductionRule {
    pub fn new(predecessor: impl Into<Symbol>, successors: Vec<Successor>) -> Self {
        Self {
            predecessor: predecessor.into(),
            successors,
        }
    }
}

impl fmt::Display for ProductionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -->", self.predecessor)?;
        for successor in &self.successors {
            write!(f, " {successor}")?;
        }
        Ok(())
    }
}

/// A named numeric constant, global to one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: f32,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attr {} = {}", self.name, self.value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Attribute(Attribute),
    Rule(ProductionRule),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Attribute(attribute) => write!(f, "{attribute}"),
            Statement::Rule(rule) => write!(f, "{rule}"),
        }
    }
}

/// Attributes and production rules in source order.
///
/// Declaration order does not affect evaluation: rules are looked up by
/// predecessor and attributes by name. When a name is declared twice, the
/// later declaration wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `attr name = value`.
    pub fn attribute(mut self, name: impl Into<String>, value: f32) -> Self {
        self.statements.push(Statement::Attribute(Attribute {
            name: name.into(),
            value,
        }));
        self
    }

    /// Appends `predecessor --> successors`.
    pub fn rule(mut self, predecessor: impl Into<Symbol>, successors: Vec<Successor>) -> Self {
        self.statements
            .push(Statement::Rule(ProductionRule::new(predecessor, successors)));
        self
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Attribute(attribute) => Some(attribute),
            Statement::Rule(_) => None,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &ProductionRule> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Rule(rule) => Some(rule),
            Statement::Attribute(_) => None,
        })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

/// The entry point of a run: a starting symbol applied to a starting shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Axiom {
    pub symbol: Symbol,
    pub shape: Shape,
}

impl Axiom {
    pub fn new(symbol: impl Into<Symbol>, shape: Shape) -> Self {
        Self {
            symbol: symbol.into(),
            shape,
        }
    }
}
