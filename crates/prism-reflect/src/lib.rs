//! Prism Reflection Layer
//!
//! Runtime type introspection over a host type system: a process-wide
//! metadata cache of per-class descriptors, constructor/method/field
//! models with lazy type resolution, convention-derived properties,
//! overload resolution, and adaptive promotion from reflective dispatch
//! to generated accessors.
//!
//! The host plugs in at two seams: [`prism_types::TypeSystem`] for
//! declarations and [`Dispatcher`] for the reflective slow path. An
//! optional [`AcceleratorFactory`] supplies the fast path. The
//! [`MemoryHost`] is a complete in-process host for tests and embedders
//! without a runtime of their own.

#![warn(missing_docs)]

pub mod accel;
pub mod cache;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod field;
pub mod member;
pub mod memory;
pub mod overload;
pub mod property;
pub mod value;

pub use accel::{AcceleratorFactory, GeneratedAccessor};
pub use cache::{CacheOptions, MetadataCache, DEFAULT_PROMOTION_THRESHOLD};
pub use descriptor::ClassDescriptor;
pub use dispatch::{AccessMode, Dispatcher, ParameterNameResolver, ReflectHost};
pub use error::ReflectError;
pub use field::FieldModel;
pub use member::{MemberKind, MemberModel, ParameterModel};
pub use memory::{Instance, MemoryHost, MemoryHostBuilder};
pub use overload::{assignable, best_match, parameter_types_compatible};
pub use property::PropertyModel;
pub use value::{ObjectRef, Value};
