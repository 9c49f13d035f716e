//! Host-side type and member declarations
//!
//! These are the raw facts the host type system reports for a single
//! class or interface. The reflection layer never mutates them; it wraps
//! them in descriptors with resolved types and ordinal addressing.

use crate::expr::TypeExpr;

/// Visibility and attribute flags for a type member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Public visibility
    pub is_public: bool,
    /// Private visibility
    pub is_private: bool,
    /// Protected visibility
    pub is_protected: bool,
    /// Static member
    pub is_static: bool,
    /// Final (non-overridable / non-reassignable) member
    pub is_final: bool,
    /// Abstract member
    pub is_abstract: bool,
}

impl Modifiers {
    /// Flags for a plain public instance member
    pub fn public() -> Self {
        Modifiers {
            is_public: true,
            ..Modifiers::default()
        }
    }

    /// Flags for a private instance member
    pub fn private() -> Self {
        Modifiers {
            is_private: true,
            ..Modifiers::default()
        }
    }

    /// Flags for a public static member
    pub fn public_static() -> Self {
        Modifiers {
            is_public: true,
            is_static: true,
            ..Modifiers::default()
        }
    }
}

/// A formal type parameter declared by a generic type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    /// Parameter name, e.g. `"T"`
    pub name: String,
    /// Declared upper bounds, possibly empty
    pub bounds: Vec<TypeExpr>,
}

impl TypeParam {
    /// An unbounded type parameter
    pub fn new(name: impl Into<String>) -> Self {
        TypeParam {
            name: name.into(),
            bounds: Vec::new(),
        }
    }
}

/// A declared data member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Declared type expression
    pub ty: TypeExpr,
    /// Visibility and attribute flags
    pub modifiers: Modifiers,
}

/// A declared method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name
    pub name: String,
    /// Declared parameter type expressions, in order
    pub params: Vec<TypeExpr>,
    /// Declared return type; `None` means void
    pub return_type: Option<TypeExpr>,
    /// Visibility and attribute flags
    pub modifiers: Modifiers,
    /// Whether the trailing parameter is variadic
    pub is_variadic: bool,
}

/// A declared constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorDecl {
    /// Declared parameter type expressions, in order
    pub params: Vec<TypeExpr>,
    /// Visibility and attribute flags
    pub modifiers: Modifiers,
    /// Whether the trailing parameter is variadic
    pub is_variadic: bool,
}

/// Everything the host reports about one type declaration
#[derive(Debug, Clone, Default)]
pub struct TypeDecl {
    /// Type name
    pub name: String,
    /// Formal type parameters, in order
    pub type_params: Vec<TypeParam>,
    /// Superclass reference, possibly parameterized
    pub superclass: Option<TypeExpr>,
    /// Implemented interface references, possibly parameterized
    pub interfaces: Vec<TypeExpr>,
    /// Declared fields, in host declaration order
    pub fields: Vec<FieldDecl>,
    /// Declared methods, in host declaration order
    pub methods: Vec<MethodDecl>,
    /// Declared constructors, in host declaration order
    pub constructors: Vec<CtorDecl>,
}

impl TypeDecl {
    /// An empty declaration with just a name
    pub fn named(name: impl Into<String>) -> Self {
        TypeDecl {
            name: name.into(),
            ..TypeDecl::default()
        }
    }

    /// Whether `name` is one of this declaration's formal type parameters
    pub fn declares_type_param(&self, name: &str) -> bool {
        self.type_params.iter().any(|p| p.name == name)
    }
}
