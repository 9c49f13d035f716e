//! Field models

use crate::cache::{descriptor_for, CacheCore};
use crate::descriptor::ClassDescriptor;
use crate::dispatch::with_privileged_retry;
use crate::error::ReflectError;
use crate::value::Value;
use once_cell::sync::OnceCell;
use prism_types::{raw_type, FieldDecl, Modifiers, TypeExpr, TypeHandle};
use std::sync::Arc;

/// Descriptor for a data member
pub struct FieldModel {
    core: Arc<CacheCore>,
    declaring: TypeHandle,
    name: String,
    ordinal: usize,
    modifiers: Modifiers,
    generic: TypeExpr,
    ty: OnceCell<TypeHandle>,
    signature: OnceCell<String>,
}

impl FieldModel {
    pub(crate) fn new(
        core: Arc<CacheCore>,
        declaring: TypeHandle,
        ordinal: usize,
        decl: &FieldDecl,
    ) -> Self {
        FieldModel {
            core,
            declaring,
            name: decl.name.clone(),
            ordinal,
            modifiers: decl.modifiers,
            generic: decl.ty.clone(),
            ty: OnceCell::new(),
            signature: OnceCell::new(),
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position within the declaring class's field table
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Visibility and attribute flags
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Whether the field is static
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    /// Handle of the declaring class
    pub fn declaring(&self) -> TypeHandle {
        self.declaring
    }

    /// Descriptor of the declaring class
    pub fn declaring_descriptor(&self) -> Arc<ClassDescriptor> {
        descriptor_for(&self.core, self.declaring)
    }

    /// Declared (possibly generic) type expression
    pub fn generic_type(&self) -> &TypeExpr {
        &self.generic
    }

    /// Resolved declared type, memoized. Falls back to the universal top
    /// type when the generic expression cannot be resolved.
    pub fn ty(&self) -> TypeHandle {
        *self.ty.get_or_init(|| {
            let host = &self.core.host;
            raw_type(host.as_ref(), &self.generic, Some(self.declaring))
                .unwrap_or_else(|_| host.top())
        })
    }

    /// Memoized signature string: `DeclaringType::name`
    pub fn signature(&self) -> &str {
        self.signature.get_or_init(|| {
            format!(
                "{}::{}",
                self.core.host.type_name(self.declaring),
                self.name
            )
        })
    }

    /// Read this field from `target`.
    pub fn get(&self, target: &Value) -> Result<Value, ReflectError> {
        let descriptor = self.declaring_descriptor();
        if let Some(accessor) = descriptor.fast_accessor() {
            return accessor.get_field(target, self.ordinal);
        }

        let result = with_privileged_retry(|mode| {
            self.core
                .host
                .get_field(self.declaring, self.ordinal, target, mode)
        });
        descriptor.note_reflective_call();
        result
    }

    /// Write `value` into this field of `target`.
    pub fn set(&self, target: &Value, value: Value) -> Result<(), ReflectError> {
        let descriptor = self.declaring_descriptor();
        if let Some(accessor) = descriptor.fast_accessor() {
            return accessor.set_field(target, self.ordinal, value);
        }

        let result = with_privileged_retry(|mode| {
            self.core.host.set_field(
                self.declaring,
                self.ordinal,
                target,
                value.clone(),
                mode,
            )
        });
        descriptor.note_reflective_call();
        result
    }
}

impl std::fmt::Debug for FieldModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldModel")
            .field("signature", &self.signature())
            .field("ordinal", &self.ordinal)
            .finish()
    }
}
