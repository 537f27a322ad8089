//! Split patterns and proportional space allocation.
//!
//! A pattern is a list of items laid out back to back along one axis. Each
//! item is either a step (absolute size, or `~` relative weight) with a
//! successor, or a nested pattern that takes a relative weight of 1 and then
//! lays out its own items inside the span it was given.

use crate::error::{Error, Result};
use crate::expr::{EvalScope, RuntimeValue};
use crate::geometry::Axis;
use crate::operation::Branch;
use crate::program::Successor;
use crate::shape::Shape;
use crate::strategy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SplitSize {
    /// Fixed length in scope units.
    Absolute(RuntimeValue),
    /// Weight for a share of the space the fixed items leave over (`~`).
    Relative(RuntimeValue),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitStep {
    pub size: SplitSize,
    pub successor: Successor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SplitItem {
    Step(SplitStep),
    Pattern(SplitPattern),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitPattern {
    pub items: Vec<SplitItem>,
    /// The trailing `*` repeat switch. Accepted but does not change sizing.
    #[serde(default)]
    pub has_switch: bool,
}

impl SplitPattern {
    pub fn new(items: Vec<SplitItem>) -> Self {
        Self {
            items,
            has_switch: false,
        }
    }

    /// Appends an absolute step.
    pub fn absolute(
        mut self,
        size: impl Into<RuntimeValue>,
        successor: impl Into<Successor>,
    ) -> Self {
        self.items.push(SplitItem::Step(SplitStep {
            size: SplitSize::Absolute(size.into()),
            successor: successor.into(),
        }));
        self
    }

    /// Appends a relative (`~`) step.
    pub fn relative(
        mut self,
        weight: impl Into<RuntimeValue>,
        successor: impl Into<Successor>,
    ) -> Self {
        self.items.push(SplitItem::Step(SplitStep {
            size: SplitSize::Relative(weight.into()),
            successor: successor.into(),
        }));
        self
    }

    /// Appends a nested pattern.
    pub fn nested(mut self, pattern: SplitPattern) -> Self {
        self.items.push(SplitItem::Pattern(pattern));
        self
    }

    pub fn with_switch(mut self) -> Self {
        self.has_switch = true;
        self
    }

    /// Computes the length of every item for a pattern spanning `total`.
    ///
    /// Fixed items keep their evaluated size; the remainder is shared among
    /// relative items in proportion to their weights. Fails with
    /// [`Error::DivisionByZero`] if relative items exist but their weights sum
    /// to zero.
    pub fn allocate(&self, scope: &impl EvalScope, total: f32) -> Result<Vec<f32>> {
        let mut fixed = 0.0;
        let mut weight_sum = 0.0;
        let mut has_relative = false;
        let mut sizes = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let size = match item {
                SplitItem::Step(SplitStep {
                    size: SplitSize::Absolute(value),
                    ..
                }) => {
                    let v = value.evaluate(scope)?;
                    fixed += v;
                    Length::Fixed(v)
                }
                SplitItem::Step(SplitStep {
                    size: SplitSize::Relative(value),
                    ..
                }) => {
                    let w = value.evaluate(scope)?;
                    weight_sum += w;
                    has_relative = true;
                    Length::Share(w)
                }
                SplitItem::Pattern(_) => {
                    weight_sum += 1.0;
                    has_relative = true;
                    Length::Share(1.0)
                }
            };
            sizes.push(size);
        }

        if has_relative && weight_sum == 0.0 {
            return Err(Error::DivisionByZero("split"));
        }
        let pool = total - fixed;
        Ok(sizes
            .into_iter()
            .map(|size| match size {
                Length::Fixed(v) => v,
                Length::Share(w) => pool / weight_sum * w,
            })
            .collect())
    }

    /// Lays the items out over `shape` along `axis`, appending one branch per
    /// step in declaration order. `shape` must span exactly this pattern.
    pub fn split<'p>(
        &'p self,
        scope: &impl EvalScope,
        shape: &Shape,
        axis: Axis,
        branches: &mut Vec<Branch<'p>>,
    ) -> Result<()> {
        let lengths = self.allocate(scope, shape.scope().extent(axis))?;
        let mut offset = 0.0;
        for (item, length) in self.items.iter().zip(lengths) {
            let piece = strategy::replicate(shape, axis, offset, length);
            match item {
                SplitItem::Step(step) => branches.push(Branch {
                    successor: &step.successor,
                    shape: piece,
                }),
                SplitItem::Pattern(pattern) => pattern.split(scope, &piece, axis, branches)?,
            }
            offset += length;
        }
        Ok(())
    }
}

/// An evaluated [`SplitSize`].
enum Length {
    Fixed(f32),
    Share(f32),
}

impl fmt::Display for SplitItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitItem::Step(SplitStep { size, successor }) => match size {
                SplitSize::Absolute(v) => write!(f, "{v}: {successor}"),
                SplitSize::Relative(w) => write!(f, "~{w}: {successor}"),
            },
            SplitItem::Pattern(pattern) => write!(f, "{pattern}"),
        }
    }
}

impl fmt::Display for SplitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str(" }")?;
        if self.has_switch {
            f.write_str("*")?;
        }
        Ok(())
    }
}
