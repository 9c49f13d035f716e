//! Member models for constructors and methods
//!
//! Immutable descriptors wrapping one host declaration. The parameter
//! list is resolved lazily against the declaring type and memoized, as is
//! the signature string. Invocation consults the declaring descriptor's
//! current strategy: generated accessor when published, reflective
//! dispatch with the privileged retry otherwise.

use crate::cache::{descriptor_for, CacheCore};
use crate::descriptor::ClassDescriptor;
use crate::dispatch::with_privileged_retry;
use crate::error::ReflectError;
use crate::value::Value;
use once_cell::sync::OnceCell;
use prism_types::{raw_type, CtorDecl, MethodDecl, Modifiers, TypeExpr, TypeHandle};
use std::sync::Arc;

/// Constructor name used in signatures
const CTOR_NAME: &str = "new";

/// Whether a member is a method or a constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// An invocable method
    Method,
    /// A constructor
    Constructor,
}

/// One resolved parameter of a member
#[derive(Debug, Clone)]
pub struct ParameterModel {
    /// Position in the parameter list
    pub index: usize,
    /// Resolved declared type
    pub ty: TypeHandle,
    /// Declared (possibly generic) type expression
    pub generic: TypeExpr,
    /// Debug-metadata name, or a synthesized `arg{index}` placeholder
    pub name: String,
}

/// Descriptor for a constructor or method
pub struct MemberModel {
    core: Arc<CacheCore>,
    declaring: TypeHandle,
    kind: MemberKind,
    name: String,
    ordinal: usize,
    modifiers: Modifiers,
    is_variadic: bool,
    return_type: Option<TypeExpr>,
    param_exprs: Vec<TypeExpr>,
    params: OnceCell<Vec<ParameterModel>>,
    signature: OnceCell<String>,
}

impl MemberModel {
    pub(crate) fn from_method(
        core: Arc<CacheCore>,
        declaring: TypeHandle,
        ordinal: usize,
        decl: &MethodDecl,
    ) -> Self {
        MemberModel {
            core,
            declaring,
            kind: MemberKind::Method,
            name: decl.name.clone(),
            ordinal,
            modifiers: decl.modifiers,
            is_variadic: decl.is_variadic,
            return_type: decl.return_type.clone(),
            param_exprs: decl.params.clone(),
            params: OnceCell::new(),
            signature: OnceCell::new(),
        }
    }

    pub(crate) fn from_constructor(
        core: Arc<CacheCore>,
        declaring: TypeHandle,
        ordinal: usize,
        decl: &CtorDecl,
    ) -> Self {
        MemberModel {
            core,
            declaring,
            kind: MemberKind::Constructor,
            name: CTOR_NAME.to_string(),
            ordinal,
            modifiers: decl.modifiers,
            is_variadic: decl.is_variadic,
            return_type: None,
            param_exprs: decl.params.clone(),
            params: OnceCell::new(),
            signature: OnceCell::new(),
        }
    }

    /// Member name; constructors report `"new"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method or constructor
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Position within the declaring class's member table, stable for the
    /// descriptor's lifetime and used by the generated accessor
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Visibility and attribute flags
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Whether the trailing parameter is variadic
    pub fn is_variadic(&self) -> bool {
        self.is_variadic
    }

    /// Whether the member is static
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    /// Declared return type; `None` means void (and always for
    /// constructors)
    pub fn return_type(&self) -> Option<&TypeExpr> {
        self.return_type.as_ref()
    }

    /// Handle of the declaring class
    pub fn declaring(&self) -> TypeHandle {
        self.declaring
    }

    /// Descriptor of the declaring class
    pub fn declaring_descriptor(&self) -> Arc<ClassDescriptor> {
        descriptor_for(&self.core, self.declaring)
    }

    /// Resolved parameters, computed once on first access.
    ///
    /// Types resolve against the declaring class; a parameter whose
    /// generic expression cannot be resolved falls back to the universal
    /// top type. Names come from the optional debug-metadata collaborator
    /// and never affect arity or types.
    pub fn parameters(&self) -> &[ParameterModel] {
        self.params.get_or_init(|| {
            let host = &self.core.host;
            let debug_names = self.core.options.parameter_names.as_ref().and_then(|r| {
                r.parameter_names(self.declaring, self.kind, self.ordinal)
            });
            self.param_exprs
                .iter()
                .enumerate()
                .map(|(index, expr)| {
                    let ty = raw_type(host.as_ref(), expr, Some(self.declaring))
                        .unwrap_or_else(|_| host.top());
                    let name = debug_names
                        .as_ref()
                        .and_then(|names| names.get(index).cloned())
                        .unwrap_or_else(|| format!("arg{}", index));
                    ParameterModel {
                        index,
                        ty,
                        generic: expr.clone(),
                        name,
                    }
                })
                .collect()
        })
    }

    /// Memoized signature string:
    /// `DeclaringType::name(ParamType, ...)`
    pub fn signature(&self) -> &str {
        self.signature.get_or_init(|| {
            let host = &self.core.host;
            let params: Vec<String> = self
                .parameters()
                .iter()
                .map(|p| host.type_name(p.ty))
                .collect();
            format!(
                "{}::{}({})",
                host.type_name(self.declaring),
                self.name,
                params.join(", ")
            )
        })
    }

    /// Invoke this method against `target` (None for static methods).
    ///
    /// Uses the generated accessor once the declaring class has been
    /// promoted; otherwise dispatches reflectively, counting the call
    /// toward promotion.
    pub fn invoke(
        &self,
        target: Option<&Value>,
        args: &[Value],
    ) -> Result<Value, ReflectError> {
        if self.kind != MemberKind::Method {
            return Err(ReflectError::Invocation {
                signature: self.signature().to_string(),
                reason: "constructor invoked as a method".to_string(),
            });
        }
        if !self.is_static() && target.is_none() {
            return Err(ReflectError::MissingTarget {
                signature: self.signature().to_string(),
            });
        }

        let descriptor = self.declaring_descriptor();
        if let Some(accessor) = descriptor.fast_accessor() {
            return accessor.invoke(target, self.ordinal, args);
        }

        let result = with_privileged_retry(|mode| {
            self.core
                .host
                .invoke(self.declaring, self.ordinal, target, args, mode)
        });
        descriptor.note_reflective_call();
        result
    }

    /// Run this constructor and return the new instance.
    pub fn construct(&self, args: &[Value]) -> Result<Value, ReflectError> {
        if self.kind != MemberKind::Constructor {
            return Err(ReflectError::Invocation {
                signature: self.signature().to_string(),
                reason: "method used as a constructor".to_string(),
            });
        }

        let descriptor = self.declaring_descriptor();
        if let Some(accessor) = descriptor.fast_accessor() {
            return accessor.construct(self.ordinal, args);
        }

        let result = with_privileged_retry(|mode| {
            self.core
                .host
                .construct(self.declaring, self.ordinal, args, mode)
        });
        descriptor.note_reflective_call();
        result
    }
}

impl std::fmt::Debug for MemberModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberModel")
            .field("kind", &self.kind)
            .field("signature", &self.signature())
            .finish()
    }
}
