//! Interpreter that derives a [`Program`] from an [`Axiom`] into terminal shapes.
//!
//! The entry point is [`Interpreter`]. Configure it with an
//! [`InterpreterConfig`], then call [`Interpreter::run`] with a program and an
//! axiom.

use crate::context::ExecutionContext;
use crate::error::{Error, Result};
use crate::program::{Axiom, Program, Successor};
use crate::shape::Shape;
use tracing::{debug, trace};

/// Configuration for a derivation.
#[derive(Clone, Debug, Default)]
pub struct InterpreterConfig {
    /// Maximum number of symbols and operations rewritten before the run is
    /// aborted. `None` runs until the worklist empties, which never happens
    /// for a grammar that rewrites a symbol into itself.
    pub max_rewrites: Option<usize>,
    /// Keep a copy of every shape pushed onto the shape stack.
    pub record_intermediates: bool,
}

/// The outcome of a successful run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Derivation {
    terminals: Vec<Shape>,
    intermediates: Vec<Shape>,
    rewrites: usize,
}

impl Derivation {
    /// Terminal shapes in discovery order.
    pub fn terminals(&self) -> &[Shape] {
        &self.terminals
    }

    pub fn into_terminals(self) -> Vec<Shape> {
        self.terminals
    }

    /// Every shape pushed during the run, in push order. Empty unless
    /// [`InterpreterConfig::record_intermediates`] was set.
    pub fn intermediates(&self) -> &[Shape] {
        &self.intermediates
    }

    /// Number of symbols and operations rewritten.
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }
}

/// Runs shape grammars.
///
/// A run is a pure function of its program and axiom: the same inputs always
/// produce the same terminal shapes in the same order. Independent runs share
/// nothing and may execute in parallel.
#[derive(Clone, Debug, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Derives `program` from `axiom` until no symbols remain.
    ///
    /// # Rewriting
    ///
    /// The worklist and the shape stack are both LIFO. Starting from the
    /// axiom symbol and a copy of the axiom shape, each step pops one entry
    /// and rewrites it:
    ///
    /// 1. A symbol with a production rule runs the rule body in place: each
    ///    successor is rewritten immediately, in declaration order, and only
    ///    the symbols the body yields are queued. An operation that follows a
    ///    split in the same body therefore acts on the first branch shape.
    /// 2. A symbol without a rule is terminal: the top shape moves into the
    ///    result.
    /// 3. An operation pops the top shape, rewrites it and yields whatever
    ///    successors it produces, first-declared on top.
    ///
    /// The derivation is therefore depth-first and leftmost-successor-first.
    /// Rule bodies recurse into the rules of the plain symbols they name, so
    /// a grammar that rewrites a symbol into itself needs
    /// [`InterpreterConfig::max_rewrites`] to terminate.
    ///
    /// # Errors
    ///
    /// The first error aborts the run. It is wrapped in [`Error::Rewrite`]
    /// naming the innermost symbol or operation that raised it.
    pub fn run(&self, program: &Program, axiom: &Axiom) -> Result<Derivation> {
        let seed = Successor::Symbol(axiom.symbol.clone());
        let mut ctx = ExecutionContext::new(program, self.config.record_intermediates);
        ctx.push_shape(axiom.shape);

        debug!(
            axiom = %axiom.symbol,
            statements = program.statements.len(),
            "derivation started"
        );

        let mut budget = Budget {
            limit: self.config.max_rewrites,
            spent: 0,
        };
        let mut worklist = vec![&seed];
        while let Some(successor) = worklist.pop() {
            let produced = budget.rewrite(successor, &mut ctx)?;
            worklist.extend(produced.into_iter().rev());
        }

        let rewrites = budget.spent;
        let (terminals, intermediates) = ctx.finish();
        debug!(terminals = terminals.len(), rewrites, "derivation finished");
        Ok(Derivation {
            terminals,
            intermediates,
            rewrites,
        })
    }
}

/// Counts rewrites across the worklist and nested rule bodies.
struct Budget {
    limit: Option<usize>,
    spent: usize,
}

impl Budget {
    /// Rewrites one successor and returns the symbols it yields, in
    /// declaration order.
    fn rewrite<'p>(
        &mut self,
        successor: &'p Successor,
        ctx: &mut ExecutionContext<'p>,
    ) -> Result<Vec<&'p Successor>> {
        if let Some(limit) = self.limit
            && self.spent >= limit
        {
            return Err(Error::RewriteBudgetExceeded(limit));
        }
        self.spent += 1;
        trace!(%successor, shapes = ctx.stack_depth(), "rewrite");

        let produced = match successor {
            Successor::Symbol(symbol) => match ctx.rule(symbol.name()) {
                Some(rule) => {
                    let mut produced = Vec::new();
                    for next in &rule.successors {
                        produced.extend(self.rewrite(next, ctx)?);
                    }
                    Ok(produced)
                }
                None => ctx.terminate().map(|()| Vec::new()),
            },
            Successor::Operation(operation) => operation.rewrite(ctx),
        };
        produced.map_err(|e| e.in_successor(successor))
    }
}
