//! Logical properties derived from accessor naming conventions
//!
//! A zero-argument non-void `get*`/`is*` method is a read accessor; a
//! one-argument void `set*` method is a write accessor. Accessors sharing
//! a derived name form one property. Static and non-public methods never
//! contribute.

use crate::error::ReflectError;
use crate::member::MemberModel;
use crate::value::Value;
use std::sync::Arc;

/// A read/write accessor pair sharing one derived name
#[derive(Debug)]
pub struct PropertyModel {
    name: String,
    getter: Option<Arc<MemberModel>>,
    setter: Option<Arc<MemberModel>>,
}

impl PropertyModel {
    pub(crate) fn new(
        name: String,
        getter: Option<Arc<MemberModel>>,
        setter: Option<Arc<MemberModel>>,
    ) -> Self {
        debug_assert!(getter.is_some() || setter.is_some());
        PropertyModel {
            name,
            getter,
            setter,
        }
    }

    /// Derived property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The read accessor, if present
    pub fn getter(&self) -> Option<&Arc<MemberModel>> {
        self.getter.as_ref()
    }

    /// The write accessor, if present
    pub fn setter(&self) -> Option<&Arc<MemberModel>> {
        self.setter.as_ref()
    }

    /// Whether the property can be read
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    /// Whether the property can be written
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the property from `target`.
    pub fn get(&self, target: &Value) -> Result<Value, ReflectError> {
        match &self.getter {
            Some(getter) => getter.invoke(Some(target), &[]),
            None => Err(ReflectError::NotReadable(self.name.clone())),
        }
    }

    /// Write `value` into the property of `target`.
    pub fn set(&self, target: &Value, value: Value) -> Result<(), ReflectError> {
        match &self.setter {
            Some(setter) => {
                setter.invoke(Some(target), &[value])?;
                Ok(())
            }
            None => Err(ReflectError::NotWritable(self.name.clone())),
        }
    }
}

/// Derived property name for a read accessor method name, if the name
/// follows the getter convention.
pub(crate) fn getter_property_name(method: &str) -> Option<String> {
    let stem = method
        .strip_prefix("get")
        .or_else(|| method.strip_prefix("is"))?;
    decapitalize(stem)
}

/// Derived property name for a write accessor method name, if the name
/// follows the setter convention.
pub(crate) fn setter_property_name(method: &str) -> Option<String> {
    decapitalize(method.strip_prefix("set")?)
}

fn decapitalize(stem: &str) -> Option<String> {
    let mut chars = stem.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getter_name_derivation() {
        assert_eq!(getter_property_name("getName"), Some("name".into()));
        assert_eq!(getter_property_name("isActive"), Some("active".into()));
        assert_eq!(getter_property_name("getURL"), Some("uRL".into()));
        assert_eq!(getter_property_name("get"), None);
        assert_eq!(getter_property_name("is"), None);
        assert_eq!(getter_property_name("fetchName"), None);
    }

    #[test]
    fn test_setter_name_derivation() {
        assert_eq!(setter_property_name("setName"), Some("name".into()));
        assert_eq!(setter_property_name("set"), None);
        assert_eq!(setter_property_name("reset"), None);
        assert_eq!(setter_property_name("getName"), None);
    }
}
