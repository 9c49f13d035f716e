//! Reflective dispatch contract
//!
//! The slow-but-always-correct path. The host implements [`Dispatcher`]
//! next to its [`TypeSystem`] declarations; members are addressed by
//! (declaring class, ordinal) so the host never repeats a name lookup.

use crate::error::ReflectError;
use crate::member::MemberKind;
use crate::value::Value;
use prism_types::{TypeHandle, TypeSystem};

/// Access level for a single dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Honor the host's visibility rules
    Checked,
    /// Bypass visibility after a denied checked attempt
    Privileged,
}

/// Reflective member access implemented by the host.
///
/// `ordinal` indexes the declaring class's declared field, method, or
/// constructor table, in host declaration order.
pub trait Dispatcher: Send + Sync {
    /// Read a field of `target` (or a static field, where `target` is
    /// ignored)
    fn get_field(
        &self,
        class: TypeHandle,
        ordinal: usize,
        target: &Value,
        mode: AccessMode,
    ) -> Result<Value, ReflectError>;

    /// Write a field of `target`
    fn set_field(
        &self,
        class: TypeHandle,
        ordinal: usize,
        target: &Value,
        value: Value,
        mode: AccessMode,
    ) -> Result<(), ReflectError>;

    /// Invoke a method; `target` is `None` for static methods
    fn invoke(
        &self,
        class: TypeHandle,
        ordinal: usize,
        target: Option<&Value>,
        args: &[Value],
        mode: AccessMode,
    ) -> Result<Value, ReflectError>;

    /// Run a constructor and return the new instance
    fn construct(
        &self,
        class: TypeHandle,
        ordinal: usize,
        args: &[Value],
        mode: AccessMode,
    ) -> Result<Value, ReflectError>;
}

/// Full host contract: declarations plus reflective dispatch
pub trait ReflectHost: TypeSystem + Dispatcher {}

impl<T: TypeSystem + Dispatcher + ?Sized> ReflectHost for T {}

/// Optional collaborator recovering human-readable parameter names from
/// debug metadata.
///
/// Absence of the collaborator, or of data for a given member, never
/// affects parameter count or type resolution; the model falls back to
/// synthesized `arg{index}` names.
pub trait ParameterNameResolver: Send + Sync {
    /// Names for the parameters of one member, if known
    fn parameter_names(
        &self,
        class: TypeHandle,
        kind: MemberKind,
        ordinal: usize,
    ) -> Option<Vec<String>>;
}

/// Run `op` checked, retrying privileged exactly once on denial.
pub(crate) fn with_privileged_retry<T>(
    op: impl Fn(AccessMode) -> Result<T, ReflectError>,
) -> Result<T, ReflectError> {
    match op(AccessMode::Checked) {
        Err(ReflectError::AccessDenied { .. }) => op(AccessMode::Privileged),
        other => other,
    }
}
