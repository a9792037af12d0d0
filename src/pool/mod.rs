//! Canonicalization pools for types and fields

mod fields;
mod types;

pub use fields::FieldPool;
pub use types::TypePool;
