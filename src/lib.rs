//! # Overview
//!
//! This crate turns the class records of a compiled Java library (as found
//! in DEX containers) into a canonical, generics-aware model of its public
//! API surface: packages, classes, members, type parameters and annotations,
//! with every type reference interned.
//!
//! The container reader itself lives outside this crate. Callers hand over
//! [`raw::RawClass`] records, either directly to a [`ClassConverter`] or
//! through a [`ClassSource`] driven by an [`ApiAssembler`].
//!
//! ## Pipeline
//!
//! - [`raw`]: the input records, access flags and reserved marker
//!   annotations carrying generic signatures and nesting information
//! - [`pool`]: interning of classes, types, type variables and fields
//! - [`visibility`]: which classes and members make it into the output
//! - [`signature`]: the generic signature grammar and the resolver that maps
//!   it onto pooled types, including type variables inherited from
//!   enclosing classes
//! - [`converter`]: the multi-phase conversion of a closed input set
//! - [`assembler`]: loading, converting and restricting to a package set
//!
//! ## Example
//!
//! ```
//! use apisig::raw::{flags, RawClass, RawMethod};
//! use apisig::{ApiAssembler, Visibility};
//!
//! # fn main() -> apisig::errors::Result<()> {
//! let classes = vec![RawClass::new("Lcom/example/Greeter;", flags::PUBLIC)
//!     .with_superclass("Ljava/lang/Object;")
//!     .with_method(RawMethod::new("greet", flags::PUBLIC, "Ljava/lang/String;"))];
//!
//! let api = ApiAssembler::builder()
//!     .name("example")
//!     .visibility(Visibility::Public)
//!     .package("com.example")
//!     .build()?
//!     .assemble(&classes)?;
//!
//! let greeter = api.find_class("com.example", "Greeter").unwrap();
//! let greet = api.class(greeter).methods[0];
//! let return_type = api.executable(greet).return_type().unwrap();
//! assert_eq!(api.display_type(return_type), "java.lang.String");
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod converter;
pub mod errors;
pub mod model;
pub mod pool;
pub mod raw;
pub mod signature;
pub mod visibility;

pub use assembler::{ApiAssembler, ApiAssemblerBuilder, ClassSource};
pub use converter::{ClassConverter, ConversionOptions};
pub use errors::{Error, Result};
pub use model::Api;
pub use visibility::{Visibility, VisibilityPolicy};
