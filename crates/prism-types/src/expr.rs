//! Type handles and the type expression algebra

use std::fmt;

/// Opaque identity for a class, interface, primitive, or array type in the
/// host type system.
///
/// Handles are minted by the host and compared by identity. They are the
/// key for every cache in the reflection layer, so equality and hashing
/// must be stable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(u32);

impl TypeHandle {
    /// Create a handle from a host-assigned raw id
    pub const fn new(raw: u32) -> Self {
        TypeHandle(raw)
    }

    /// The host-assigned raw id
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.0)
    }
}

/// A possibly-generic type expression as reported by the host.
///
/// This is a closed algebra: the resolver in [`crate::resolver`] is a total,
/// structurally recursive function over these five cases.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A fully concrete type
    Concrete(TypeHandle),
    /// A generic type applied to actual arguments, e.g. `List<String>`
    Parameterized {
        /// The generic base type
        base: TypeHandle,
        /// Actual type arguments, in declaration order
        args: Vec<TypeExpr>,
    },
    /// A type variable, e.g. `T` with its declared bounds
    Variable {
        /// Variable name as declared, e.g. `"T"`
        name: String,
        /// Declared upper bounds, possibly empty
        bounds: Vec<TypeExpr>,
    },
    /// A wildcard with optional lower and upper bounds
    Wildcard {
        /// Lower bounds (`? super X`)
        lower: Vec<TypeExpr>,
        /// Upper bounds (`? extends X`)
        upper: Vec<TypeExpr>,
    },
    /// An array of some component type
    ArrayOf(Box<TypeExpr>),
}

impl TypeExpr {
    /// Shorthand for a concrete expression
    pub fn concrete(handle: TypeHandle) -> Self {
        TypeExpr::Concrete(handle)
    }

    /// Shorthand for an array expression
    pub fn array_of(component: TypeExpr) -> Self {
        TypeExpr::ArrayOf(Box::new(component))
    }

    /// Shorthand for an unbounded type variable
    pub fn variable(name: impl Into<String>) -> Self {
        TypeExpr::Variable {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    /// The handle, if this expression is already concrete
    pub fn as_concrete(&self) -> Option<TypeHandle> {
        match self {
            TypeExpr::Concrete(h) => Some(*h),
            _ => None,
        }
    }
}

impl From<TypeHandle> for TypeExpr {
    fn from(handle: TypeHandle) -> Self {
        TypeExpr::Concrete(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_identity() {
        let a = TypeHandle::new(3);
        let b = TypeHandle::new(3);
        let c = TypeHandle::new(4);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.raw(), 3);
    }

    #[test]
    fn test_as_concrete() {
        let h = TypeHandle::new(7);
        assert_eq!(TypeExpr::concrete(h).as_concrete(), Some(h));
        assert_eq!(TypeExpr::variable("T").as_concrete(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeHandle::new(12).to_string(), "TypeHandle(12)");
    }
}
