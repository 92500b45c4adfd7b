use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::element::{ElementKind, ElementParser};

/// Which container grammar a property parses its raw string with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    List,
    Multimap,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Multimap => write!(f, "multimap"),
        }
    }
}

/// Declared shape of a property, carried as plain data so callers can branch
/// on it. Change notifications are keyed by `(name, Shape)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Scalar(ElementKind),
    List(ElementKind),
    Multimap(ElementKind),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind} scalar"),
            Self::List(kind) => write!(f, "{kind} list"),
            Self::Multimap(kind) => write!(f, "{kind} multimap"),
        }
    }
}

/// Maps an element parser to the container shape a property declares itself
/// as. Total only over the canonical parsers; an untagged parser is a
/// configuration error surfaced at property construction, never at first
/// read.
pub fn resolve_shape<T>(parser: &ElementParser<T>, container: ContainerKind) -> Result<Shape> {
    let Some(kind) = parser.kind() else {
        return Err(Error::UnsupportedShape(format!(
            "cannot declare a {container} shape for a custom element parser"
        )));
    };

    Ok(match container {
        ContainerKind::List => Shape::List(kind),
        ContainerKind::Multimap => Shape::Multimap(kind),
    })
}
