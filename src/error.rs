//! Errors raised while interpreting a shape grammar.

use crate::geometry::Axis;
use crate::shape::ShapeKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Interpreter result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a derivation.
///
/// A run either completes with its full terminal set or fails with exactly one
/// of these; there is no partial-result mode.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("undefined attribute: {0}")]
    UndefinedAttribute(String),

    #[error("unknown shape attribute: {0}")]
    UnknownShapeAttribute(String),

    #[error("cannot extrude {kind} along {axis}")]
    UnsupportedExtrusion { kind: ShapeKind, axis: Axis },

    #[error("no {operation} strategy for {kind}")]
    NoStrategy {
        operation: &'static str,
        kind: ShapeKind,
    },

    #[error("{kind} cannot be decomposed into {selector}")]
    UnsupportedComponentSelector {
        kind: ShapeKind,
        selector: crate::operation::ComponentSelector,
    },

    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),

    #[error("{parent} cannot have a {component} as a component")]
    MismatchedComponentType {
        parent: ShapeKind,
        component: ShapeKind,
    },

    #[error("shape stack is empty")]
    EmptyShapeStack,

    #[error("rewrite budget of {0} symbols exceeded")]
    RewriteBudgetExceeded(usize),

    #[error("while rewriting `{successor}`: {source}")]
    Rewrite {
        successor: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps `self` with the successor that was executing when it was raised.
    ///
    /// Errors that already carry rewrite context are returned unchanged so the
    /// innermost successor is the one reported. An exhausted rewrite budget
    /// belongs to the whole run and is never wrapped.
    pub(crate) fn in_successor(self, successor: impl fmt::Display) -> Self {
        match self {
            Error::Rewrite { .. } | Error::RewriteBudgetExceeded(_) => self,
            other => Error::Rewrite {
                successor: successor.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with any rewrite context stripped.
    pub fn root(&self) -> &Error {
        match self {
            Error::Rewrite { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A syntax error reported by a grammar parser.
///
/// The interpreter never parses source text itself, but it gives parsers a
/// common diagnostic type: a byte offset plus the derived 1-based line and
/// column.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} (line {line}, column {column})")]
pub struct SyntaxError {
    pub message: String,
    /// 0-based byte offset into the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

impl SyntaxError {
    /// Builds an error at `offset`, deriving line and column from `source`.
    ///
    /// Offsets past the end of `source` are clamped to its length; offsets
    /// inside a multi-byte character are moved back to its start.
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = floor_char_boundary(source, offset);
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = source[line_start..offset].chars().count() + 1;
        Self {
            message: message.into(),
            offset,
            line,
            column,
        }
    }

    /// Renders the offending line with a caret under the error position.
    ///
    /// ```text
    /// a --> S(1, 1 1)
    ///              ↑
    /// ```
    pub fn render(&self, source: &str) -> String {
        let offset = floor_char_boundary(source, self.offset);
        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);
        let line = source[line_start..line_end].trim_end_matches('\r');
        let pad = source[line_start..offset].chars().count();
        format!("{line}\n{}\u{2191}", " ".repeat(pad))
    }
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
