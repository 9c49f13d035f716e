//! In-memory host
//!
//! A self-contained [`TypeSystem`] + [`Dispatcher`] over hand-registered
//! declarations, used by the test suites and by embedders without a real
//! runtime behind them. Declarations are frozen at [`MemoryHostBuilder::build`];
//! only array handle minting and field storage mutate afterwards.

use crate::dispatch::{AccessMode, Dispatcher};
use crate::error::ReflectError;
use crate::value::{ObjectRef, Value};
use dashmap::DashMap;
use parking_lot::RwLock;
use prism_types::{
    raw_type, FieldDecl, Modifiers, Primitive, TypeDecl, TypeHandle, TypeSystem,
};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

type MethodBody =
    Box<dyn Fn(Option<&Value>, &[Value]) -> Result<Value, ReflectError> + Send + Sync>;
type CtorBody = Box<dyn Fn(&[Value]) -> Result<Value, ReflectError> + Send + Sync>;

/// Mutable field storage behind an [`ObjectRef`] payload.
///
/// Slots are keyed by declaring class and field name, so a field that
/// shadows an inherited one gets its own slot.
#[derive(Default)]
pub struct Instance {
    fields: RwLock<FxHashMap<(TypeHandle, String), Value>>,
}

impl Instance {
    /// Current value of a field slot; unset slots read as null
    pub fn get(&self, class: TypeHandle, name: &str) -> Value {
        self.fields
            .read()
            .get(&(class, name.to_string()))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Overwrite a field slot
    pub fn set(&self, class: TypeHandle, name: &str, value: Value) {
        self.fields.write().insert((class, name.to_string()), value);
    }
}

/// Builder accumulating declarations, primitive registrations, and
/// native member bodies.
///
/// Handle 0 is always the pre-registered universal `Object` type.
pub struct MemoryHostBuilder {
    decls: Vec<TypeDecl>,
    primitives: FxHashMap<TypeHandle, Primitive>,
    bodies: FxHashMap<(TypeHandle, usize), MethodBody>,
    ctor_bodies: FxHashMap<(TypeHandle, usize), CtorBody>,
}

impl MemoryHostBuilder {
    /// Start a builder with `Object` registered as the top type
    pub fn new() -> Self {
        let mut builder = MemoryHostBuilder {
            decls: Vec::new(),
            primitives: FxHashMap::default(),
            bodies: FxHashMap::default(),
            ctor_bodies: FxHashMap::default(),
        };
        builder.add_type(TypeDecl::named("Object"));
        builder
    }

    /// Handle of the pre-registered top type
    pub fn object(&self) -> TypeHandle {
        TypeHandle::new(0)
    }

    /// Register a declaration and return its handle
    pub fn add_type(&mut self, decl: TypeDecl) -> TypeHandle {
        let handle = TypeHandle::new(self.decls.len() as u32);
        self.decls.push(decl);
        handle
    }

    /// Register a primitive type under `name`
    pub fn add_primitive(&mut self, name: &str, primitive: Primitive) -> TypeHandle {
        let handle = self.add_type(TypeDecl::named(name));
        self.primitives.insert(handle, primitive);
        handle
    }

    /// Register a boxed wrapper type; it reports the same primitive kind
    /// as the primitive it wraps, making the two interchangeable during
    /// overload resolution.
    pub fn add_boxed(&mut self, name: &str, primitive: Primitive) -> TypeHandle {
        self.add_primitive(name, primitive)
    }

    /// Attach a native body to the method at `ordinal` of `class`
    pub fn method_body(
        &mut self,
        class: TypeHandle,
        ordinal: usize,
        body: impl Fn(Option<&Value>, &[Value]) -> Result<Value, ReflectError>
            + Send
            + Sync
            + 'static,
    ) {
        self.bodies.insert((class, ordinal), Box::new(body));
    }

    /// Attach a native body to the constructor at `ordinal` of `class`
    pub fn ctor_body(
        &mut self,
        class: TypeHandle,
        ordinal: usize,
        body: impl Fn(&[Value]) -> Result<Value, ReflectError> + Send + Sync + 'static,
    ) {
        self.ctor_bodies.insert((class, ordinal), Box::new(body));
    }

    /// Freeze the declarations into a host
    pub fn build(self) -> Arc<MemoryHost> {
        let next_handle = self.decls.len() as u32;
        Arc::new(MemoryHost {
            decls: self.decls,
            primitives: self.primitives,
            bodies: self.bodies,
            ctor_bodies: self.ctor_bodies,
            statics: DashMap::new(),
            arrays: DashMap::new(),
            elements: DashMap::new(),
            next_handle: AtomicU32::new(next_handle),
            top: TypeHandle::new(0),
        })
    }
}

impl Default for MemoryHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The frozen host
pub struct MemoryHost {
    decls: Vec<TypeDecl>,
    primitives: FxHashMap<TypeHandle, Primitive>,
    bodies: FxHashMap<(TypeHandle, usize), MethodBody>,
    ctor_bodies: FxHashMap<(TypeHandle, usize), CtorBody>,
    statics: DashMap<(TypeHandle, usize), Value>,
    arrays: DashMap<TypeHandle, TypeHandle>,
    elements: DashMap<TypeHandle, TypeHandle>,
    next_handle: AtomicU32,
    top: TypeHandle,
}

impl MemoryHost {
    /// Create a blank instance of `class`, usable as a dispatch target
    pub fn instantiate(&self, class: TypeHandle) -> Value {
        Value::Object(ObjectRef::new(class, Arc::new(Instance::default())))
    }

    fn check_visible(
        &self,
        class: TypeHandle,
        modifiers: Modifiers,
        member: &str,
        mode: AccessMode,
    ) -> Result<(), ReflectError> {
        if mode == AccessMode::Checked && !modifiers.is_public {
            return Err(ReflectError::AccessDenied {
                class: self.type_name(class),
                member: member.to_string(),
            });
        }
        Ok(())
    }

    fn field_decl(
        &self,
        class: TypeHandle,
        ordinal: usize,
    ) -> Result<&FieldDecl, ReflectError> {
        self.declaration(class)
            .and_then(|d| d.fields.get(ordinal))
            .ok_or_else(|| ReflectError::NoSuchMember {
                class: self.type_name(class),
                ordinal,
            })
    }

    fn instance_of<'a>(
        &self,
        class: TypeHandle,
        target: &'a Value,
        member: &str,
    ) -> Result<&'a Instance, ReflectError> {
        target
            .as_object()
            .filter(|o| self.is_subtype(o.class, class))
            .and_then(|o| o.downcast::<Instance>())
            .ok_or_else(|| ReflectError::Invocation {
                signature: format!("{}::{}", self.type_name(class), member),
                reason: "target is not an instance of the declaring class".to_string(),
            })
    }
}

impl TypeSystem for MemoryHost {
    fn declaration(&self, handle: TypeHandle) -> Option<&TypeDecl> {
        self.decls.get(handle.raw() as usize)
    }

    fn top(&self) -> TypeHandle {
        self.top
    }

    fn array_of(&self, element: TypeHandle) -> TypeHandle {
        if let Some(existing) = self.arrays.get(&element) {
            return *existing;
        }
        // The element mapping must be visible before the array handle is
        // published, so a concurrent element_of never misses
        *self.arrays.entry(element).or_insert_with(|| {
            let minted =
                TypeHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
            self.elements.insert(minted, element);
            minted
        })
    }

    fn element_of(&self, handle: TypeHandle) -> Option<TypeHandle> {
        self.elements.get(&handle).map(|e| *e)
    }

    fn is_subtype(&self, sub: TypeHandle, sup: TypeHandle) -> bool {
        if sub == sup || sup == self.top {
            return true;
        }
        if let (Some(sub_elem), Some(sup_elem)) =
            (self.element_of(sub), self.element_of(sup))
        {
            return self.is_subtype(sub_elem, sup_elem);
        }
        let Some(decl) = self.declaration(sub) else {
            return false;
        };
        decl.superclass
            .iter()
            .chain(decl.interfaces.iter())
            .any(|base| match raw_type(self, base, Some(sub)) {
                Ok(handle) => self.is_subtype(handle, sup),
                Err(_) => false,
            })
    }

    fn primitive_of(&self, handle: TypeHandle) -> Option<Primitive> {
        self.primitives.get(&handle).copied()
    }
}

impl Dispatcher for MemoryHost {
    fn get_field(
        &self,
        class: TypeHandle,
        ordinal: usize,
        target: &Value,
        mode: AccessMode,
    ) -> Result<Value, ReflectError> {
        let decl = self.field_decl(class, ordinal)?;
        self.check_visible(class, decl.modifiers, &decl.name, mode)?;
        if decl.modifiers.is_static {
            return Ok(self
                .statics
                .get(&(class, ordinal))
                .map(|v| v.clone())
                .unwrap_or(Value::Null));
        }
        let instance = self.instance_of(class, target, &decl.name)?;
        Ok(instance.get(class, &decl.name))
    }

    fn set_field(
        &self,
        class: TypeHandle,
        ordinal: usize,
        target: &Value,
        value: Value,
        mode: AccessMode,
    ) -> Result<(), ReflectError> {
        let decl = self.field_decl(class, ordinal)?;
        self.check_visible(class, decl.modifiers, &decl.name, mode)?;
        if decl.modifiers.is_static {
            self.statics.insert((class, ordinal), value);
            return Ok(());
        }
        let instance = self.instance_of(class, target, &decl.name)?;
        instance.set(class, &decl.name, value);
        Ok(())
    }

    fn invoke(
        &self,
        class: TypeHandle,
        ordinal: usize,
        target: Option<&Value>,
        args: &[Value],
        mode: AccessMode,
    ) -> Result<Value, ReflectError> {
        let decl = self
            .declaration(class)
            .and_then(|d| d.methods.get(ordinal))
            .ok_or_else(|| ReflectError::NoSuchMember {
                class: self.type_name(class),
                ordinal,
            })?;
        self.check_visible(class, decl.modifiers, &decl.name, mode)?;

        let signature = format!("{}::{}", self.type_name(class), decl.name);
        if !decl.modifiers.is_static {
            let target = target.ok_or_else(|| ReflectError::MissingTarget {
                signature: signature.clone(),
            })?;
            self.instance_of(class, target, &decl.name)?;
        }

        match self.bodies.get(&(class, ordinal)) {
            Some(body) => body(target, args),
            None => Err(ReflectError::Invocation {
                signature,
                reason: "no native body registered".to_string(),
            }),
        }
    }

    fn construct(
        &self,
        class: TypeHandle,
        ordinal: usize,
        args: &[Value],
        mode: AccessMode,
    ) -> Result<Value, ReflectError> {
        let decl = self
            .declaration(class)
            .and_then(|d| d.constructors.get(ordinal))
            .ok_or_else(|| ReflectError::NoSuchMember {
                class: self.type_name(class),
                ordinal,
            })?;
        self.check_visible(class, decl.modifiers, "new", mode)?;

        match self.ctor_bodies.get(&(class, ordinal)) {
            Some(body) => body(args),
            None => Ok(self.instantiate(class)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_types::{MethodDecl, TypeExpr};

    fn field(name: &str, ty: TypeExpr, modifiers: Modifiers) -> FieldDecl {
        FieldDecl {
            name: name.into(),
            ty,
            modifiers,
        }
    }

    #[test]
    fn test_instance_field_round_trip() {
        let mut builder = MemoryHostBuilder::new();
        let int = builder.add_primitive("int", Primitive::Int);
        let mut point = TypeDecl::named("Point");
        point
            .fields
            .push(field("x", TypeExpr::concrete(int), Modifiers::public()));
        let point = builder.add_type(point);

        let host = builder.build();
        let target = host.instantiate(point);

        let unset = host
            .get_field(point, 0, &target, AccessMode::Checked)
            .expect("readable");
        assert_eq!(unset, Value::Null);

        host.set_field(point, 0, &target, Value::Int(7), AccessMode::Checked)
            .expect("writable");
        let read = host
            .get_field(point, 0, &target, AccessMode::Checked)
            .expect("readable");
        assert_eq!(read, Value::Int(7));
    }

    #[test]
    fn test_checked_mode_denies_private_members() {
        let mut builder = MemoryHostBuilder::new();
        let object = builder.object();
        let mut vault = TypeDecl::named("Vault");
        vault.fields.push(field(
            "secret",
            TypeExpr::concrete(object),
            Modifiers::private(),
        ));
        let vault = builder.add_type(vault);

        let host = builder.build();
        let target = host.instantiate(vault);

        let denied = host.get_field(vault, 0, &target, AccessMode::Checked);
        assert!(matches!(denied, Err(ReflectError::AccessDenied { .. })));

        let allowed = host.get_field(vault, 0, &target, AccessMode::Privileged);
        assert_eq!(allowed, Ok(Value::Null));
    }

    #[test]
    fn test_invoke_dispatches_to_registered_body() {
        let mut builder = MemoryHostBuilder::new();
        let mut greeter = TypeDecl::named("Greeter");
        greeter.methods.push(MethodDecl {
            name: "greet".into(),
            params: vec![],
            return_type: None,
            modifiers: Modifiers::public_static(),
            is_variadic: false,
        });
        let greeter = builder.add_type(greeter);
        builder.method_body(greeter, 0, |_, _| Ok(Value::string("hello")));

        let host = builder.build();
        let result = host
            .invoke(greeter, 0, None, &[], AccessMode::Checked)
            .expect("body registered");
        assert_eq!(result, Value::string("hello"));
    }

    #[test]
    fn test_invoke_without_body_fails() {
        let mut builder = MemoryHostBuilder::new();
        let mut greeter = TypeDecl::named("Greeter");
        greeter.methods.push(MethodDecl {
            name: "greet".into(),
            params: vec![],
            return_type: None,
            modifiers: Modifiers::public_static(),
            is_variadic: false,
        });
        let greeter = builder.add_type(greeter);

        let host = builder.build();
        let result = host.invoke(greeter, 0, None, &[], AccessMode::Checked);
        assert!(matches!(result, Err(ReflectError::Invocation { .. })));
    }

    #[test]
    fn test_array_handles_are_memoized() {
        let mut builder = MemoryHostBuilder::new();
        let int = builder.add_primitive("int", Primitive::Int);
        let host = builder.build();

        let a = host.array_of(int);
        let b = host.array_of(int);
        assert_eq!(a, b);
        assert_eq!(host.element_of(a), Some(int));
        assert_eq!(host.type_name(a), "int[]");
        assert!(host.declaration(a).is_none());
    }

    #[test]
    fn test_minted_array_handle_is_immediately_resolvable() {
        let mut builder = MemoryHostBuilder::new();
        let int = builder.add_primitive("int", Primitive::Int);
        let host = builder.build();

        // Racing first mints must all see a complete handle: whichever
        // thread observes the array handle can resolve its element
        let mut handles = Vec::new();
        for _ in 0..8 {
            let host = host.clone();
            handles.push(std::thread::spawn(move || {
                let array = host.array_of(int);
                assert_eq!(host.element_of(array), Some(int));
            }));
        }
        for handle in handles {
            handle.join().expect("worker panicked");
        }
    }

    #[test]
    fn test_subtype_walk_covers_superclass_and_interfaces() {
        let mut builder = MemoryHostBuilder::new();
        let object = builder.object();
        let printable = builder.add_type(TypeDecl::named("Printable"));
        let mut base = TypeDecl::named("Base");
        base.interfaces.push(TypeExpr::concrete(printable));
        let base = builder.add_type(base);
        let mut derived = TypeDecl::named("Derived");
        derived.superclass = Some(TypeExpr::concrete(base));
        let derived = builder.add_type(derived);

        let host = builder.build();
        assert!(host.is_subtype(derived, derived));
        assert!(host.is_subtype(derived, base));
        assert!(host.is_subtype(derived, printable));
        assert!(host.is_subtype(derived, object));
        assert!(!host.is_subtype(base, derived));
    }
}
