pub mod element;
pub mod grammar;

pub use element::{ElementKind, ElementParser};
pub use grammar::{parse_list, parse_multimap};
