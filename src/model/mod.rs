pub mod field;
pub mod group;
pub mod language;

pub use field::{Field, FieldType};
pub use group::{InputGroup, Separator};
pub use language::Language;

#[cfg(test)]
mod tests;
