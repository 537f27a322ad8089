//! Shape model: scoped boxes and quads.

use crate::expr::ShapeAttribute;
use crate::geometry::{Axis, ScopeTransform};
use bevy_math::primitives::{Cuboid, Measured2d, Measured3d, Rectangle};
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The oriented frame and extents a shape occupies.
///
/// The transform places the scope's *center*; `size` holds the full extents
/// along the local X/Y/Z axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub transform: Mat4,
    pub size: Vec3,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            size: Vec3::ONE,
        }
    }
}

impl Scope {
    pub fn new(transform: Mat4, size: Vec3) -> Self {
        Self { transform, size }
    }

    /// Reads a derived scope attribute (`scope.tx`, `scope.ry`, `scope.sz`, ...).
    pub fn attribute(&self, attribute: ShapeAttribute) -> f32 {
        use ShapeAttribute::*;
        match attribute {
            TranslateX => self.transform.position().x,
            TranslateY => self.transform.position().y,
            TranslateZ => self.transform.position().z,
            RotateX => self.transform.euler_angles().x,
            RotateY => self.transform.euler_angles().y,
            RotateZ => self.transform.euler_angles().z,
            ScaleX => self.size.x,
            ScaleY => self.size.y,
            ScaleZ => self.size.z,
        }
    }

    pub fn extent(&self, axis: Axis) -> f32 {
        self.size[axis.index()]
    }
}

/// Shape variant tag, used for strategy dispatch and error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Box,
    Quad,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShapeKind::Box => "Box",
            ShapeKind::Quad => "Quad",
        })
    }
}

/// A shape produced by the grammar.
///
/// A `Quad` lies in its local XY plane with its normal along local +Z; its
/// in-plane extents are `size.x` and `size.y`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box(Scope),
    Quad(Scope),
}

impl Shape {
    /// A unit box centered at the origin.
    pub fn unit_box() -> Self {
        Shape::Box(Scope::default())
    }

    /// A unit quad centered at the origin, facing +Z.
    ///
    /// Like the faces of a decomposed box it has no extent along its normal.
    pub fn unit_quad() -> Self {
        Shape::Quad(Scope::new(Mat4::IDENTITY, Vec3::new(1.0, 1.0, 0.0)))
    }

    pub fn new(kind: ShapeKind, scope: Scope) -> Self {
        match kind {
            ShapeKind::Box => Shape::Box(scope),
            ShapeKind::Quad => Shape::Quad(scope),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Box(_) => ShapeKind::Box,
            Shape::Quad(_) => ShapeKind::Quad,
        }
    }

    pub fn scope(&self) -> &Scope {
        match self {
            Shape::Box(scope) | Shape::Quad(scope) => scope,
        }
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        match self {
            Shape::Box(scope) | Shape::Quad(scope) => scope,
        }
    }

    /// Same variant, different scope.
    pub fn with_scope(&self, scope: Scope) -> Self {
        Shape::new(self.kind(), scope)
    }

    pub fn transform(&self) -> Mat4 {
        self.scope().transform
    }

    pub fn size(&self) -> Vec3 {
        self.scope().size
    }

    pub fn position(&self) -> Vec3 {
        self.scope().transform.position()
    }

    /// World-space direction of the local Z axis; the face normal of a quad.
    pub fn normal(&self) -> Vec3 {
        self.scope().transform.axis(Axis::Z)
    }

    pub fn attribute(&self, attribute: ShapeAttribute) -> f32 {
        self.scope().attribute(attribute)
    }

    /// Transform that maps the unit primitive onto this shape, as a renderer draws it.
    pub fn model_matrix(&self) -> Mat4 {
        let scope = self.scope();
        let scale = match self {
            Shape::Box(_) => scope.size,
            Shape::Quad(_) => Vec3::new(scope.size.x, scope.size.y, 1.0),
        };
        scope.transform * Mat4::from_scale(scale)
    }

    /// Convert to the corresponding `bevy_math` primitive, in local space.
    pub fn to_primitive(&self) -> ShapePrimitive {
        let size = self.size().abs();
        match self {
            Shape::Box(_) => ShapePrimitive::Cuboid(Cuboid {
                half_size: size / 2.0,
            }),
            Shape::Quad(_) => ShapePrimitive::Rectangle(Rectangle {
                half_size: Vec2::new(size.x, size.y) / 2.0,
            }),
        }
    }

    /// Volume of a box, area of a quad.
    pub fn measure(&self) -> f32 {
        match self.to_primitive() {
            ShapePrimitive::Cuboid(c) => c.volume(),
            ShapePrimitive::Rectangle(r) => r.area(),
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::unit_box()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.scope();
        write!(
            f,
            "{}[position: {}, rotation: {}, size: {}]",
            self.kind(),
            scope.transform.position(),
            scope.transform.euler_angles(),
            scope.size
        )
    }
}

/// `bevy_math` primitive a terminal shape maps onto.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapePrimitive {
    Cuboid(Cuboid),
    Rectangle(Rectangle),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ComponentSelector;
    use crate::strategy;

    #[test]
    fn unit_quad_is_flat_like_box_faces() {
        let top = strategy::decompose(&Shape::unit_box(), ComponentSelector::Faces).unwrap()[1];
        let quad = Shape::unit_quad();
        assert_eq!(quad.size(), top.size());
        assert_eq!(quad.attribute(ShapeAttribute::ScaleZ), 0.0);
        assert_eq!(quad.measure(), 1.0);
    }
}
