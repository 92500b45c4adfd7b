pub mod list;
pub mod multimap;
pub mod scalar;
pub mod shape;
pub mod simple;

pub use list::ListProperty;
pub use multimap::{Multimap, MultimapProperty};
pub use scalar::ScalarProperty;
pub use shape::{resolve_shape, ContainerKind, Shape};
pub use simple::SimpleProperty;
