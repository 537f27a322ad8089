//! Shape operations: the terminal symbols of the grammar.
//!
//! Every operation pops the shape on top of the execution stack. Transform
//! operations and extrusion push a single replacement and yield no
//! successors; component splits and splits push one shape per branch and
//! yield the matching successors.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::expr::RuntimeValue;
use crate::geometry::{Axis, ScopeTransform, yaw_pitch_roll};
use crate::program::Successor;
use crate::shape::Shape;
use crate::split::SplitPattern;
use crate::strategy;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which components a component split decomposes a shape into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentSelector {
    Faces,
    Edges,
    Vertices,
}

impl fmt::Display for ComponentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComponentSelector::Faces => "faces",
            ComponentSelector::Edges => "edges",
            ComponentSelector::Vertices => "vertices",
        })
    }
}

/// Face classification tag used to route components to successors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticSelector {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
    Vertical,
    Horizontal,
    Side,
    All,
}

impl fmt::Display for SemanticSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SemanticSelector::Front => "front",
            SemanticSelector::Back => "back",
            SemanticSelector::Left => "left",
            SemanticSelector::Right => "right",
            SemanticSelector::Top => "top",
            SemanticSelector::Bottom => "bottom",
            SemanticSelector::Vertical => "vertical",
            SemanticSelector::Horizontal => "horizontal",
            SemanticSelector::Side => "side",
            SemanticSelector::All => "all",
        })
    }
}

/// The `adjust` / `noadjust` modifier of a split.
///
/// Accepted as grammar surface; it does not change how a split is sized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustSelector {
    Adjust,
    NoAdjust,
}

impl fmt::Display for AdjustSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdjustSelector::Adjust => "adjust",
            AdjustSelector::NoAdjust => "noadjust",
        })
    }
}

/// One `selector: successor` argument of a component split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentSplitArg {
    pub selector: SemanticSelector,
    pub successor: Successor,
}

impl ComponentSplitArg {
    pub fn new(selector: SemanticSelector, successor: impl Into<Successor>) -> Self {
        Self {
            selector,
            successor: successor.into(),
        }
    }
}

/// A shape produced by a split together with the successor that will rewrite it.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch<'p> {
    pub successor: &'p Successor,
    pub shape: Shape,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeOperation {
    /// `T(x, y, z)`: move the scope in its local frame.
    Translate {
        x: RuntimeValue,
        y: RuntimeValue,
        z: RuntimeValue,
    },
    /// `R(x, y, z)`: rotate the scope by pitch `x`, yaw `y` and roll `z`, in degrees.
    Rotate {
        x: RuntimeValue,
        y: RuntimeValue,
        z: RuntimeValue,
    },
    /// `S(x, y, z)`: set the scope size outright.
    Scale {
        x: RuntimeValue,
        y: RuntimeValue,
        z: RuntimeValue,
    },
    /// `extrude([axis,] distance)`; the axis defaults to local Z.
    Extrude {
        axis: Option<Axis>,
        distance: RuntimeValue,
    },
    /// `split(faces) { top: a | side: b }`
    ComponentSplit {
        selector: ComponentSelector,
        args: Vec<ComponentSplitArg>,
    },
    /// `split(y) { 1: a | ~1: b }`
    Split {
        axis: Axis,
        adjust: Option<AdjustSelector>,
        pattern: SplitPattern,
    },
}

impl ShapeOperation {
    pub fn translate(
        x: impl Into<RuntimeValue>,
        y: impl Into<RuntimeValue>,
        z: impl Into<RuntimeValue>,
    ) -> Self {
        ShapeOperation::Translate {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    pub fn rotate(
        x: impl Into<RuntimeValue>,
        y: impl Into<RuntimeValue>,
        z: impl Into<RuntimeValue>,
    ) -> Self {
        ShapeOperation::Rotate {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    pub fn scale(
        x: impl Into<RuntimeValue>,
        y: impl Into<RuntimeValue>,
        z: impl Into<RuntimeValue>,
    ) -> Self {
        ShapeOperation::Scale {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    pub fn extrude(distance: impl Into<RuntimeValue>) -> Self {
        ShapeOperation::Extrude {
            axis: None,
            distance: distance.into(),
        }
    }

    pub fn extrude_along(axis: Axis, distance: impl Into<RuntimeValue>) -> Self {
        ShapeOperation::Extrude {
            axis: Some(axis),
            distance: distance.into(),
        }
    }

    pub fn component_split(selector: ComponentSelector, args: Vec<ComponentSplitArg>) -> Self {
        ShapeOperation::ComponentSplit { selector, args }
    }

    pub fn split(axis: Axis, pattern: SplitPattern) -> Self {
        ShapeOperation::Split {
            axis,
            adjust: None,
            pattern,
        }
    }

    /// `split(axis, adjust) { ... }`
    pub fn split_adjusted(axis: Axis, adjust: AdjustSelector, pattern: SplitPattern) -> Self {
        ShapeOperation::Split {
            axis,
            adjust: Some(adjust),
            pattern,
        }
    }

    /// Applies the operation to the shape on top of the stack.
    ///
    /// Parameters are evaluated after the pop, so `scope.*` lookups see the
    /// shape being rewritten. Returned successors are in declaration order and
    /// pair one-to-one, top down, with the shapes pushed for them.
    pub fn rewrite<'p>(&'p self, ctx: &mut ExecutionContext<'p>) -> Result<Vec<&'p Successor>> {
        let mut shape = ctx.pop_shape()?;
        match self {
            ShapeOperation::Translate { x, y, z } => {
                let offset = evaluate3(ctx, x, y, z)?;
                let scope = shape.scope_mut();
                scope.transform = scope.transform.translate_local(offset);
                ctx.push_shape(shape);
                Ok(Vec::new())
            }
            ShapeOperation::Rotate { x, y, z } => {
                let angles = evaluate3(ctx, x, y, z)?;
                let rotation = yaw_pitch_roll(angles.x, angles.y, angles.z);
                let scope = shape.scope_mut();
                scope.transform = scope.transform.rotate_local(rotation);
                ctx.push_shape(shape);
                Ok(Vec::new())
            }
            ShapeOperation::Scale { x, y, z } => {
                shape.scope_mut().size = evaluate3(ctx, x, y, z)?;
                ctx.push_shape(shape);
                Ok(Vec::new())
            }
            ShapeOperation::Extrude { axis, distance } => {
                let distance = distance.evaluate(&*ctx)?;
                let extruded = strategy::extrude(&shape, axis.unwrap_or(Axis::Z), distance)?;
                ctx.push_shape(extruded);
                Ok(Vec::new())
            }
            ShapeOperation::ComponentSplit { selector, args } => {
                let mut pool = strategy::decompose(&shape, *selector)?;
                let mut branches = Vec::new();
                for arg in args {
                    // A component goes to the first argument that claims it.
                    let mut remaining = Vec::with_capacity(pool.len());
                    for component in pool {
                        if strategy::classify(&shape, &component, arg.selector)? {
                            branches.push(Branch {
                                successor: &arg.successor,
                                shape: component,
                            });
                        } else {
                            remaining.push(component);
                        }
                    }
                    pool = remaining;
                }
                // Components left in the pool are dropped.
                Ok(ctx.push_branches(branches))
            }
            ShapeOperation::Split { axis, pattern, .. } => {
                let mut branches = Vec::new();
                pattern.split(&*ctx, &shape, *axis, &mut branches)?;
                Ok(ctx.push_branches(branches))
            }
        }
    }
}

fn evaluate3(
    ctx: &ExecutionContext<'_>,
    x: &RuntimeValue,
    y: &RuntimeValue,
    z: &RuntimeValue,
) -> Result<Vec3> {
    Ok(Vec3::new(x.evaluate(ctx)?, y.evaluate(ctx)?, z.evaluate(ctx)?))
}

impl fmt::Display for ShapeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeOperation::Translate { x, y, z } => write!(f, "T({x}, {y}, {z})"),
            ShapeOperation::Rotate { x, y, z } => write!(f, "R({x}, {y}, {z})"),
            ShapeOperation::Scale { x, y, z } => write!(f, "S({x}, {y}, {z})"),
            ShapeOperation::Extrude {
                axis: Some(axis),
                distance,
            } => write!(f, "extrude({axis}, {distance})"),
            ShapeOperation::Extrude {
                axis: None,
                distance,
            } => write!(f, "extrude({distance})"),
            ShapeOperation::ComponentSplit { selector, args } => {
                write!(f, "split({selector}) {{ ")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}: {}", arg.selector, arg.successor)?;
                }
                f.write_str(" }")
            }
            ShapeOperation::Split {
                axis,
                adjust,
                pattern,
            } => match adjust {
                Some(adjust) => write!(f, "split({axis}, {adjust}) {pattern}"),
                None => write!(f, "split({axis}) {pattern}"),
            },
        }
    }
}
