//! Runtime expressions used as operation parameters.
//!
//! Parameters are evaluated lazily, at rewrite time, against the attribute
//! table and the shape that the operation has just popped.

use crate::error::{Error, Result};
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an expression can read while it is evaluated.
pub trait EvalScope {
    /// Value of a declared `attr`.
    fn attribute(&self, name: &str) -> Result<f32>;

    /// The shape most recently popped off the shape stack.
    fn current_shape(&self) -> Result<&Shape>;
}

/// Derived scope attributes readable from the current shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeAttribute {
    TranslateX,
    TranslateY,
    TranslateZ,
    RotateX,
    RotateY,
    RotateZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl ShapeAttribute {
    pub fn name(self) -> &'static str {
        use ShapeAttribute::*;
        match self {
            TranslateX => "scope.tx",
            TranslateY => "scope.ty",
            TranslateZ => "scope.tz",
            RotateX => "scope.rx",
            RotateY => "scope.ry",
            RotateZ => "scope.rz",
            ScaleX => "scope.sx",
            ScaleY => "scope.sy",
            ScaleZ => "scope.sz",
        }
    }
}

impl FromStr for ShapeAttribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        use ShapeAttribute::*;
        Ok(match s {
            "scope.tx" => TranslateX,
            "scope.ty" => TranslateY,
            "scope.tz" => TranslateZ,
            "scope.rx" => RotateX,
            "scope.ry" => RotateY,
            "scope.rz" => RotateZ,
            "scope.sx" => ScaleX,
            "scope.sy" => ScaleY,
            "scope.sz" => ScaleZ,
            other => return Err(Error::UnknownShapeAttribute(other.to_string())),
        })
    }
}

impl fmt::Display for ShapeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
}

impl BinaryOperator {
    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Sub => '-',
            BinaryOperator::Mul => '*',
            BinaryOperator::Div => '/',
            BinaryOperator::Pow => '^',
            BinaryOperator::Mod => '%',
        }
    }

    pub fn apply(self, left: f32, right: f32) -> Result<f32> {
        Ok(match self {
            BinaryOperator::Add => left + right,
            BinaryOperator::Sub => left - right,
            BinaryOperator::Mul => left * right,
            BinaryOperator::Div if right == 0.0 => return Err(Error::DivisionByZero("division")),
            BinaryOperator::Div => left / right,
            BinaryOperator::Pow => left.powf(right),
            BinaryOperator::Mod if right == 0.0 => return Err(Error::DivisionByZero("modulo")),
            // Truncated remainder: the result takes the sign of the dividend.
            BinaryOperator::Mod => left % right,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValueKind {
    Constant(f32),
    /// Lookup of a declared `attr` by name.
    Attribute(String),
    Shape(ShapeAttribute),
    Binary {
        op: BinaryOperator,
        left: Box<RuntimeValue>,
        right: Box<RuntimeValue>,
    },
}

/// An expression node.
///
/// `parenthesized` only affects how the node is written back out as grammar
/// text; it never changes the value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeValue {
    pub kind: ValueKind,
    #[serde(default)]
    pub negated: bool,
    #[serde(default)]
    pub parenthesized: bool,
}

impl RuntimeValue {
    fn from_kind(kind: ValueKind) -> Self {
        Self {
            kind,
            negated: false,
            parenthesized: false,
        }
    }

    pub fn constant(value: f32) -> Self {
        Self::from_kind(ValueKind::Constant(value))
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Self::from_kind(ValueKind::Attribute(name.into()))
    }

    pub fn shape(attribute: ShapeAttribute) -> Self {
        Self::from_kind(ValueKind::Shape(attribute))
    }

    pub fn binary(op: BinaryOperator, left: RuntimeValue, right: RuntimeValue) -> Self {
        Self::from_kind(ValueKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Flips the negation flag.
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn in_parens(mut self) -> Self {
        self.parenthesized = true;
        self
    }

    /// Evaluates the expression. Operands are evaluated left before right.
    pub fn evaluate(&self, scope: &impl EvalScope) -> Result<f32> {
        let value = match &self.kind {
            ValueKind::Constant(v) => *v,
            ValueKind::Attribute(name) => scope.attribute(name)?,
            ValueKind::Shape(attribute) => scope.current_shape()?.attribute(*attribute),
            ValueKind::Binary { op, left, right } => {
                let l = left.evaluate(scope)?;
                let r = right.evaluate(scope)?;
                op.apply(l, r)?
            }
        };
        Ok(if self.negated { -value } else { value })
    }
}

impl From<f32> for RuntimeValue {
    fn from(value: f32) -> Self {
        RuntimeValue::constant(value)
    }
}

impl From<ShapeAttribute> for RuntimeValue {
    fn from(attribute: ShapeAttribute) -> Self {
        RuntimeValue::shape(attribute)
    }
}

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("-")?;
        }
        let wrap = self.parenthesized
            || (self.negated && matches!(self.kind, ValueKind::Binary { .. }));
        if wrap {
            f.write_str("(")?;
        }
        match &self.kind {
            ValueKind::Constant(v) => write!(f, "{v}")?,
            ValueKind::Attribute(name) => f.write_str(name)?,
            ValueKind::Shape(attribute) => write!(f, "{attribute}")?,
            ValueKind::Binary { op, left, right } => {
                write!(f, "{left} {} {right}", op.symbol())?
            }
        }
        if wrap {
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Scope, Shape};
    use glam::{Mat4, Vec3};
    use std::collections::HashMap;

    struct Fixture {
        attributes: HashMap<String, f32>,
        shape: Option<Shape>,
    }

    impl EvalScope for Fixture {
        fn attribute(&self, name: &str) -> Result<f32> {
            self.attributes
                .get(name)
                .copied()
                .ok_or_else(|| Error::UndefinedAttribute(name.to_string()))
        }

        fn current_shape(&self) -> Result<&Shape> {
            self.shape.as_ref().ok_or(Error::EmptyShapeStack)
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            attributes: HashMap::from([("h".to_string(), 2.0)]),
            shape: Some(Shape::Box(Scope::new(
                Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0)),
                Vec3::new(1.0, 3.0, 7.0),
            ))),
        }
    }

    #[test]
    fn binary_operators() {
        let f = fixture();
        let eval = |op, l: f32, r: f32| {
            RuntimeValue::binary(op, l.into(), r.into())
                .evaluate(&f)
                .unwrap()
        };
        assert_eq!(eval(BinaryOperator::Add, 2.0, 3.0), 5.0);
        assert_eq!(eval(BinaryOperator::Sub, 2.0, 3.0), -1.0);
        assert_eq!(eval(BinaryOperator::Mul, 2.0, 3.0), 6.0);
        assert_eq!(eval(BinaryOperator::Div, 3.0, 2.0), 1.5);
        assert_eq!(eval(BinaryOperator::Pow, 2.0, 3.0), 8.0);
        assert_eq!(eval(BinaryOperator::Mod, -7.0, 3.0), -1.0);
        assert_eq!(eval(BinaryOperator::Mod, 7.0, -3.0), 1.0);
    }

    #[test]
    fn lookups_and_negation() {
        let f = fixture();
        let h = RuntimeValue::attribute("h").negate();
        assert_eq!(h.evaluate(&f).unwrap(), -2.0);
        let sy = RuntimeValue::shape(ShapeAttribute::ScaleY);
        assert_eq!(sy.evaluate(&f).unwrap(), 3.0);
        let tz = RuntimeValue::shape(ShapeAttribute::TranslateZ);
        assert_eq!(tz.evaluate(&f).unwrap(), 6.0);
        let sum = RuntimeValue::binary(BinaryOperator::Add, h, sy).negate();
        assert_eq!(sum.evaluate(&f).unwrap(), -1.0);
    }

    #[test]
    fn missing_attribute_fails() {
        let f = fixture();
        let err = RuntimeValue::attribute("w").evaluate(&f).unwrap_err();
        assert!(matches!(err, Error::UndefinedAttribute(name) if name == "w"));
    }

    #[test]
    fn division_by_zero_fails() {
        let f = fixture();
        for op in [BinaryOperator::Div, BinaryOperator::Mod] {
            let v = RuntimeValue::binary(op, 1f32.into(), RuntimeValue::attribute("h"))
                .evaluate(&f)
                .unwrap();
            assert!(v.is_finite());
            let err = RuntimeValue::binary(op, 1f32.into(), 0f32.into())
                .evaluate(&f)
                .unwrap_err();
            assert!(matches!(err, Error::DivisionByZero(_)));
        }
    }

    #[test]
    fn parenthesization_is_textual_only() {
        let f = fixture();
        let plain = RuntimeValue::binary(
            BinaryOperator::Mul,
            RuntimeValue::constant(2.0),
            RuntimeValue::attribute("h"),
        );
        let wrapped = plain.clone().in_parens();
        assert_eq!(plain.evaluate(&f).unwrap(), wrapped.evaluate(&f).unwrap());
        assert_eq!(plain.to_string(), "2 * h");
        assert_eq!(wrapped.to_string(), "(2 * h)");
        assert_eq!(wrapped.negate().to_string(), "-(2 * h)");
    }

    #[test]
    fn shape_attribute_names_roundtrip() {
        assert_eq!("scope.rx".parse::<ShapeAttribute>().unwrap(), ShapeAttribute::RotateX);
        assert!(matches!(
            "scope.qq".parse::<ShapeAttribute>(),
            Err(Error::UnknownShapeAttribute(_))
        ));
    }
}
