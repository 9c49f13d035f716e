//! Prism Type Model
//!
//! Type expression algebra, host type-system seam, and the generic type
//! resolver. This crate is pure: it holds no caches and performs no I/O.

#![warn(missing_docs)]

pub mod decl;
pub mod error;
pub mod expr;
pub mod host;
pub mod primitive;
pub mod resolver;

pub use decl::{CtorDecl, FieldDecl, MethodDecl, Modifiers, TypeDecl, TypeParam};
pub use error::TypeError;
pub use expr::{TypeExpr, TypeHandle};
pub use host::TypeSystem;
pub use primitive::Primitive;
pub use resolver::{component_type, raw_type, resolve_variable};
