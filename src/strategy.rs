//! Per-variant geometric algorithms behind the structural operations.
//!
//! Each function dispatches on the shape variant; combinations without an
//! algorithm fail with [`Error::NoStrategy`].

use crate::error::{Error, Result};
use crate::geometry::{Axis, ScopeTransform, with_component};
use crate::operation::{ComponentSelector, SemanticSelector};
use crate::shape::{Scope, Shape, ShapeKind};
use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

/// Tolerance for face classification.
pub const SELECTION_EPSILON: f32 = 1e-4;
const DOT_THRESHOLD: f32 = 1.0 - SELECTION_EPSILON;

/// Extrudes a quad into a box standing on it.
///
/// The box's local Y is the quad normal, its base lies in the quad's plane and
/// its size is `(quad.x, distance, quad.y)`. Only extrusion along the quad's
/// local Z is defined.
pub fn extrude(shape: &Shape, axis: Axis, distance: f32) -> Result<Shape> {
    match shape {
        Shape::Quad(scope) => {
            if axis != Axis::Z {
                return Err(Error::UnsupportedExtrusion {
                    kind: ShapeKind::Quad,
                    axis,
                });
            }
            let transform = scope
                .transform
                .rotate_local(Quat::from_rotation_x(FRAC_PI_2))
                .translate_local(Vec3::new(0.0, distance * 0.5, 0.0));
            let size = Vec3::new(scope.size.x, distance, scope.size.y);
            Ok(Shape::Box(Scope::new(transform, size)))
        }
        Shape::Box(_) => Err(Error::NoStrategy {
            operation: "extrusion",
            kind: ShapeKind::Box,
        }),
    }
}

/// Decomposes a shape into its components.
///
/// A box splits into six quads, in the order bottom, top, +Z, -Z, +X, -X.
/// Each quad is centered on its face and its local Z is the outward normal.
pub fn decompose(shape: &Shape, selector: ComponentSelector) -> Result<Vec<Shape>> {
    let scope = match shape {
        Shape::Box(scope) => scope,
        Shape::Quad(_) => {
            return Err(Error::NoStrategy {
                operation: "component split",
                kind: ShapeKind::Quad,
            });
        }
    };
    if selector != ComponentSelector::Faces {
        return Err(Error::UnsupportedComponentSelector {
            kind: ShapeKind::Box,
            selector,
        });
    }

    let Vec3 { x: w, y: h, z: d } = scope.size;
    let faces = [
        (Quat::from_rotation_x(FRAC_PI_2), h, Vec3::new(w, d, 0.0)),
        (Quat::from_rotation_x(-FRAC_PI_2), h, Vec3::new(w, d, 0.0)),
        (Quat::IDENTITY, d, Vec3::new(w, h, 0.0)),
        (Quat::from_rotation_y(PI), d, Vec3::new(w, h, 0.0)),
        (Quat::from_rotation_y(FRAC_PI_2), w, Vec3::new(d, h, 0.0)),
        (Quat::from_rotation_y(-FRAC_PI_2), w, Vec3::new(d, h, 0.0)),
    ];
    Ok(faces
        .into_iter()
        .map(|(rotation, thickness, size)| {
            let transform = scope
                .transform
                .rotate_local(rotation)
                .translate_local(Vec3::new(0.0, 0.0, thickness * 0.5));
            Shape::Quad(Scope::new(transform, size))
        })
        .collect())
}

/// Whether `component` of `parent` matches a semantic selector.
///
/// Classification compares the component's outward normal against the
/// parent's local axes: Y for top/bottom, Z for front/back, X for
/// right/left.
pub fn classify(parent: &Shape, component: &Shape, selector: SemanticSelector) -> Result<bool> {
    let Shape::Box(parent_scope) = parent else {
        return Err(Error::NoStrategy {
            operation: "semantic selection",
            kind: parent.kind(),
        });
    };
    if component.kind() != ShapeKind::Quad {
        return Err(Error::MismatchedComponentType {
            parent: ShapeKind::Box,
            component: component.kind(),
        });
    }

    let n = component.normal();
    let dot = |axis: Axis| parent_scope.transform.axis(axis).dot(n);
    Ok(match selector {
        SemanticSelector::Top => dot(Axis::Y) >= DOT_THRESHOLD,
        SemanticSelector::Bottom => dot(Axis::Y) <= -DOT_THRESHOLD,
        SemanticSelector::Front => dot(Axis::Z) >= DOT_THRESHOLD,
        SemanticSelector::Back => dot(Axis::Z) <= -DOT_THRESHOLD,
        SemanticSelector::Right => dot(Axis::X) >= DOT_THRESHOLD,
        SemanticSelector::Left => dot(Axis::X) <= -DOT_THRESHOLD,
        SemanticSelector::Horizontal => dot(Axis::Y).abs() >= DOT_THRESHOLD,
        SemanticSelector::Vertical | SemanticSelector::Side => {
            dot(Axis::Y).abs() <= SELECTION_EPSILON
        }
        SemanticSelector::All => true,
    })
}

/// Copies `shape`, narrowed to `[offset, offset + length)` along `axis`.
///
/// Offsets are measured from the shape's lower bound on that axis; the copy is
/// re-centered in the shape's local frame.
pub fn replicate(shape: &Shape, axis: Axis, offset: f32, length: f32) -> Shape {
    let scope = shape.scope();
    let shift = offset - scope.extent(axis) * 0.5 + length * 0.5;
    shape.with_scope(Scope {
        transform: scope.transform.translate_local(axis.unit() * shift),
        size: with_component(scope.size, axis, length),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn extrusion_stands_box_on_quad() {
        let quad = Shape::Quad(Scope::new(Mat4::IDENTITY, Vec3::new(2.0, 3.0, 0.0)));
        let boxed = extrude(&quad, Axis::Z, 4.0).unwrap();
        assert_eq!(boxed.kind(), ShapeKind::Box);
        assert!(approx(boxed.size(), Vec3::new(2.0, 4.0, 3.0)));
        assert!(approx(boxed.position(), Vec3::new(0.0, 0.0, 2.0)));
        assert!(approx(boxed.transform().axis(Axis::Y), Vec3::Z));
    }

    #[test]
    fn extrusion_rejects_other_axes_and_boxes() {
        let err = extrude(&Shape::unit_quad(), Axis::X, 1.0).unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtrusion { axis: Axis::X, .. }));
        let err = extrude(&Shape::unit_box(), Axis::Z, 1.0).unwrap_err();
        assert!(matches!(err, Error::NoStrategy { kind: ShapeKind::Box, .. }));
    }

    #[test]
    fn faces_sit_on_box_surface() {
        let parent = Shape::Box(Scope::new(
            Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)),
            Vec3::new(2.0, 4.0, 6.0),
        ));
        let faces = decompose(&parent, ComponentSelector::Faces).unwrap();
        let expected = [
            (Vec3::NEG_Y, Vec3::new(10.0, -2.0, 0.0), Vec3::new(2.0, 6.0, 0.0)),
            (Vec3::Y, Vec3::new(10.0, 2.0, 0.0), Vec3::new(2.0, 6.0, 0.0)),
            (Vec3::Z, Vec3::new(10.0, 0.0, 3.0), Vec3::new(2.0, 4.0, 0.0)),
            (Vec3::NEG_Z, Vec3::new(10.0, 0.0, -3.0), Vec3::new(2.0, 4.0, 0.0)),
            (Vec3::X, Vec3::new(11.0, 0.0, 0.0), Vec3::new(6.0, 4.0, 0.0)),
            (Vec3::NEG_X, Vec3::new(9.0, 0.0, 0.0), Vec3::new(6.0, 4.0, 0.0)),
        ];
        assert_eq!(faces.len(), 6);
        for (face, (normal, position, size)) in faces.iter().zip(expected) {
            assert_eq!(face.kind(), ShapeKind::Quad);
            assert!(approx(face.normal(), normal), "{face}");
            assert!(approx(face.position(), position), "{face}");
            assert_eq!(face.size(), size);
        }
    }

    #[test]
    fn only_box_faces_decompose() {
        let err = decompose(&Shape::unit_quad(), ComponentSelector::Faces).unwrap_err();
        assert!(matches!(err, Error::NoStrategy { kind: ShapeKind::Quad, .. }));
        let err = decompose(&Shape::unit_box(), ComponentSelector::Edges).unwrap_err();
        assert!(matches!(err, Error::UnsupportedComponentSelector { .. }));
    }

    #[test]
    fn classification_follows_parent_rotation() {
        // Rolled onto its side, the box's old +X face now points up in world
        // space but classification stays relative to the box's own axes.
        let parent = Shape::Box(Scope::new(
            Mat4::from_quat(Quat::from_rotation_z(FRAC_PI_2)),
            Vec3::ONE,
        ));
        let faces = decompose(&parent, ComponentSelector::Faces).unwrap();
        let select = |selector| {
            faces
                .iter()
                .map(|f| classify(&parent, f, selector).unwrap())
                .collect::<Vec<_>>()
        };
        use SemanticSelector::*;
        assert_eq!(select(Top), [false, true, false, false, false, false]);
        assert_eq!(select(Bottom), [true, false, false, false, false, false]);
        assert_eq!(select(Front), [false, false, true, false, false, false]);
        assert_eq!(select(Back), [false, false, false, true, false, false]);
        assert_eq!(select(Right), [false, false, false, false, true, false]);
        assert_eq!(select(Left), [false, false, false, false, false, true]);
        assert_eq!(select(Horizontal), [true, true, false, false, false, false]);
        assert_eq!(select(Side), [false, false, true, true, true, true]);
        assert_eq!(select(Vertical), select(Side));
        assert_eq!(select(All), [true; 6]);
    }

    #[test]
    fn classification_rejects_wrong_kinds() {
        let quad = Shape::unit_quad();
        let err = classify(&Shape::unit_box(), &Shape::unit_box(), SemanticSelector::Top)
            .unwrap_err();
        assert!(matches!(err, Error::MismatchedComponentType { .. }));
        let err = classify(&quad, &quad, SemanticSelector::Top).unwrap_err();
        assert!(matches!(err, Error::NoStrategy { .. }));
    }

    #[test]
    fn replicate_recenters_along_local_axis() {
        let parent = Shape::Box(Scope::new(
            Mat4::from_quat(Quat::from_rotation_z(FRAC_PI_2)),
            Vec3::new(10.0, 1.0, 1.0),
        ));
        let piece = replicate(&parent, Axis::X, 2.0, 3.0);
        assert_eq!(piece.size(), Vec3::new(3.0, 1.0, 1.0));
        // Local X points along world +Y after the roll; the slab centre sits
        // at -5 + 2 + 1.5 = -1.5 along it.
        assert!(approx(piece.position(), Vec3::new(0.0, -1.5, 0.0)));
        assert_eq!(piece.transform().axis(Axis::X), parent.transform().axis(Axis::X));
    }
}
