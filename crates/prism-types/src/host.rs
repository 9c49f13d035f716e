//! The seam between the reflection layer and the host type system

use crate::decl::TypeDecl;
use crate::expr::TypeHandle;
use crate::primitive::Primitive;

/// Declaration-side view of the host type system.
///
/// Implementations must be cheap to query: the resolver and the metadata
/// cache call these methods on every lookup that misses a memoized
/// result. All methods are read-only; the host's declaration table is
/// expected to be frozen before reflection begins.
pub trait TypeSystem: Send + Sync {
    /// The declaration behind a handle, if the handle names a declared
    /// type (arrays and some primitives may have none)
    fn declaration(&self, handle: TypeHandle) -> Option<&TypeDecl>;

    /// The universal top type, supertype of everything
    fn top(&self) -> TypeHandle;

    /// The (possibly freshly minted) array type over `element`
    fn array_of(&self, element: TypeHandle) -> TypeHandle;

    /// The element type, if `handle` is an array type
    fn element_of(&self, handle: TypeHandle) -> Option<TypeHandle>;

    /// Reflexive, transitive subtype check over declared supertypes
    fn is_subtype(&self, sub: TypeHandle, sup: TypeHandle) -> bool;

    /// The primitive kind of `handle`, for both primitive handles and
    /// their boxed wrappers; `None` for reference types
    fn primitive_of(&self, handle: TypeHandle) -> Option<Primitive>;

    /// Best-effort human-readable name for a handle
    fn type_name(&self, handle: TypeHandle) -> String {
        if let Some(decl) = self.declaration(handle) {
            return decl.name.clone();
        }
        if let Some(elem) = self.element_of(handle) {
            return format!("{}[]", self.type_name(elem));
        }
        handle.to_string()
    }
}
