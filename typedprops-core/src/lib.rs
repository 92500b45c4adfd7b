pub mod error;
pub mod logging;
pub mod parser;
pub mod property;
pub mod registry;

pub use error::{Error, Result};
pub use parser::{ElementKind, ElementParser};
pub use property::{ContainerKind, ListProperty, Multimap, MultimapProperty, ScalarProperty, Shape};
pub use registry::ConfigRegistry;
