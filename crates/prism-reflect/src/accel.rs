//! Generated accessor contract
//!
//! The fast-path collaborator. Once a class's reflective call count
//! crosses the promotion threshold, the cache asks the factory, exactly
//! once, for a generated accessor; the accessor then replaces reflective
//! dispatch for every member of that class. The generator itself lives
//! outside this crate; only the contract and the promotion policy are
//! defined here.

use crate::error::ReflectError;
use crate::value::Value;
use prism_types::TypeHandle;
use std::sync::Arc;

/// A generated equivalent of reflective access for one class, addressed
/// by member ordinal.
pub trait GeneratedAccessor: Send + Sync {
    /// Read the field at `ordinal`
    fn get_field(&self, target: &Value, ordinal: usize) -> Result<Value, ReflectError>;

    /// Write the field at `ordinal`
    fn set_field(
        &self,
        target: &Value,
        ordinal: usize,
        value: Value,
    ) -> Result<(), ReflectError>;

    /// Invoke the method at `ordinal`
    fn invoke(
        &self,
        target: Option<&Value>,
        ordinal: usize,
        args: &[Value],
    ) -> Result<Value, ReflectError>;

    /// Run the constructor at `ordinal`
    fn construct(&self, ordinal: usize, args: &[Value]) -> Result<Value, ReflectError>;

    /// Run the zero-argument constructor
    fn construct_default(&self) -> Result<Value, ReflectError>;
}

/// Produces generated accessors on demand.
///
/// Returning `None` means generation is unavailable for that class; the
/// cache then falls back to reflective dispatch permanently and never
/// asks again.
pub trait AcceleratorFactory: Send + Sync {
    /// Build an accessor for `class`, or report it unavailable
    fn create(&self, class: TypeHandle) -> Option<Arc<dyn GeneratedAccessor>>;
}
