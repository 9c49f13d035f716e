//! Reflection layer errors
//!
//! Lookup-style operations (by name, by signature) return `Option` and
//! never produce these; invocation-style operations fail loudly with a
//! `ReflectError` propagated to the immediate caller.

use prism_types::TypeError;
use thiserror::Error;

/// Errors raised by get/set/invoke/construct and type resolution
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReflectError {
    /// A generic type expression could not be resolved
    #[error(transparent)]
    Resolution(#[from] TypeError),

    /// The host visibility system refused the operation, even after the
    /// privileged retry
    #[error("access to `{member}` on {class} was denied")]
    AccessDenied {
        /// Declaring type name
        class: String,
        /// Member name
        member: String,
    },

    /// A property without a read accessor was read
    #[error("property `{0}` is not readable")]
    NotReadable(String),

    /// A property without a write accessor was written
    #[error("property `{0}` is not writable")]
    NotWritable(String),

    /// An instance member was used without a target instance
    #[error("`{signature}` requires a target instance")]
    MissingTarget {
        /// Signature of the member
        signature: String,
    },

    /// The reflective or generated call itself failed
    #[error("invocation of `{signature}` failed: {reason}")]
    Invocation {
        /// Signature of the member
        signature: String,
        /// Host-reported reason
        reason: String,
    },

    /// An ordinal addressed no member of the class (host-side addressing
    /// failure, normally unreachable through the model API)
    #[error("{class} has no member at ordinal {ordinal}")]
    NoSuchMember {
        /// Declaring type name
        class: String,
        /// The out-of-range ordinal
        ordinal: usize,
    },
}
