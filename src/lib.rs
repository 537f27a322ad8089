//! # cga-shapes
//!
//! An engine-agnostic interpreter for CGA-style shape grammars.
//!
//! A [`Program`] of attributes and production rules is applied to an
//! [`Axiom`] (a starting symbol and shape). Rules recursively transform,
//! extrude, decompose and split scopes until only terminal shapes remain; the
//! result is a flat, ordered list of [`Shape`]s that renderers, exporters or
//! game engines can consume.
//!
//! Parsing grammar text is left to a separate front end; this crate consumes
//! the already-parsed program.

pub mod context;
pub mod error;
pub mod expr;
pub mod geometry;
pub mod interpreter;
pub mod operation;
pub mod program;
pub mod shape;
pub mod split;
pub mod strategy;

pub use context::*;
pub use error::*;
pub use expr::*;
pub use geometry::*;
pub use interpreter::*;
pub use operation::*;
pub use program::*;
pub use shape::*;
pub use split::*;
