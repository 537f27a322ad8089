//! Per-run mutable state of the interpreter.

use crate::error::{Error, Result};
use crate::expr::EvalScope;
use crate::operation::Branch;
use crate::program::{Program, ProductionRule, Successor};
use crate::shape::Shape;
use std::collections::HashMap;
use tracing::debug;

/// Rule table, attribute table, shape stack and terminal accumulator of one run.
///
/// Shapes are plain values: pushing copies, so a shape already on the stack is
/// never affected by later changes to the one being rewritten.
pub struct ExecutionContext<'p> {
    rules: HashMap<&'p str, &'p ProductionRule>,
    attributes: HashMap<&'p str, f32>,
    shapes: Vec<Shape>,
    current: Option<Shape>,
    terminals: Vec<Shape>,
    intermediates: Option<Vec<Shape>>,
}

impl<'p> ExecutionContext<'p> {
    /// Indexes `program`. Later declarations of a predecessor or attribute
    /// name replace earlier ones.
    pub fn new(program: &'p Program, record_intermediates: bool) -> Self {
        let mut rules = HashMap::new();
        for rule in program.rules() {
            if rules.insert(rule.predecessor.name(), rule).is_some() {
                debug!(predecessor = %rule.predecessor, "duplicate rule, later declaration wins");
            }
        }
        let mut attributes = HashMap::new();
        for attribute in program.attributes() {
            if attributes
                .insert(attribute.name.as_str(), attribute.value)
                .is_some()
            {
                debug!(name = %attribute.name, "duplicate attribute, later declaration wins");
            }
        }
        Self {
            rules,
            attributes,
            shapes: Vec::new(),
            current: None,
            terminals: Vec::new(),
            intermediates: record_intermediates.then(Vec::new),
        }
    }

    pub fn rule(&self, predecessor: &str) -> Option<&'p ProductionRule> {
        self.rules.get(predecessor).copied()
    }

    /// Pops the top shape and makes it the current shape.
    pub fn pop_shape(&mut self) -> Result<Shape> {
        let shape = self.shapes.pop().ok_or(Error::EmptyShapeStack)?;
        self.current = Some(shape);
        Ok(shape)
    }

    pub fn push_shape(&mut self, shape: Shape) {
        if let Some(intermediates) = &mut self.intermediates {
            intermediates.push(shape);
        }
        self.shapes.push(shape);
    }

    /// Pushes branch shapes so the first branch ends up on top, and returns
    /// their successors in declaration order.
    pub fn push_branches(&mut self, branches: Vec<Branch<'p>>) -> Vec<&'p Successor> {
        for branch in branches.iter().rev() {
            self.push_shape(branch.shape);
        }
        branches.into_iter().map(|b| b.successor).collect()
    }

    /// Moves the top shape into the terminal set.
    pub fn terminate(&mut self) -> Result<()> {
        let shape = self.shapes.pop().ok_or(Error::EmptyShapeStack)?;
        self.terminals.push(shape);
        Ok(())
    }

    pub fn stack_depth(&self) -> usize {
        self.shapes.len()
    }

    /// Terminal shapes in discovery order, and intermediates if recorded.
    pub fn finish(self) -> (Vec<Shape>, Vec<Shape>) {
        (self.terminals, self.intermediates.unwrap_or_default())
    }
}

impl EvalScope for ExecutionContext<'_> {
    fn attribute(&self, name: &str) -> Result<f32> {
        self.attributes
            .get(name)
            .copied()
            .ok_or_else(|| Error::UndefinedAttribute(name.to_string()))
    }

    fn current_shape(&self) -> Result<&Shape> {
        self.current.as_ref().ok_or(Error::EmptyShapeStack)
    }
}
