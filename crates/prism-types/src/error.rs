//! Type resolution errors

use crate::expr::TypeHandle;
use thiserror::Error;

/// Errors raised while resolving generic type expressions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A handle with no declaration behind it was dereferenced
    #[error("unknown type: {0}")]
    UnknownType(TypeHandle),

    /// A type variable matched a formal position that the supertype
    /// reference does not actually supply an argument for
    #[error(
        "type variable `{name}` matched position {position} of {supertype}, \
         which supplies only {arity} argument(s)"
    )]
    VariableArity {
        /// The variable being resolved
        name: String,
        /// Name of the supertype whose reference was inspected
        supertype: String,
        /// Formal position the variable was matched at
        position: usize,
        /// Number of actual arguments the reference supplies
        arity: usize,
    },
}
