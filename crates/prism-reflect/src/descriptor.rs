//! Per-class descriptor
//!
//! Owns the declared and merged member collections for one type handle.
//! Each collection is computed lazily and exactly once; concurrent
//! readers either see the finished list or block briefly on the single
//! in-flight computation. Descriptors live in the cache for the process
//! lifetime, so ordinal offsets stay stable for the generated accessor.

use crate::accel::GeneratedAccessor;
use crate::cache::{descriptor_for, CacheCore};
use crate::error::ReflectError;
use crate::field::FieldModel;
use crate::member::MemberModel;
use crate::overload;
use crate::property::{getter_property_name, setter_property_name, PropertyModel};
use crate::value::Value;
use once_cell::sync::OnceCell;
use prism_types::{raw_type, TypeExpr, TypeHandle};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Cached structural metadata for one class
pub struct ClassDescriptor {
    handle: TypeHandle,
    core: Arc<CacheCore>,
    constructors: OnceCell<Vec<Arc<MemberModel>>>,
    declared_methods: OnceCell<Vec<Arc<MemberModel>>>,
    declared_fields: OnceCell<Vec<Arc<FieldModel>>>,
    merged_methods: OnceCell<Vec<Arc<MemberModel>>>,
    merged_fields: OnceCell<Vec<Arc<FieldModel>>>,
    properties: OnceCell<Vec<Arc<PropertyModel>>>,
    reflective_calls: AtomicU32,
    accessor: OnceCell<Option<Arc<dyn GeneratedAccessor>>>,
}

impl ClassDescriptor {
    pub(crate) fn new(handle: TypeHandle, core: Arc<CacheCore>) -> Self {
        ClassDescriptor {
            handle,
            core,
            constructors: OnceCell::new(),
            declared_methods: OnceCell::new(),
            declared_fields: OnceCell::new(),
            merged_methods: OnceCell::new(),
            merged_fields: OnceCell::new(),
            properties: OnceCell::new(),
            reflective_calls: AtomicU32::new(0),
            accessor: OnceCell::new(),
        }
    }

    /// The described type handle
    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// Host-reported type name
    pub fn name(&self) -> String {
        self.core.host.type_name(self.handle)
    }

    /// Declared constructors, in host declaration order
    pub fn constructors(&self) -> &[Arc<MemberModel>] {
        self.constructors.get_or_init(|| {
            match self.core.host.declaration(self.handle) {
                Some(decl) => decl
                    .constructors
                    .iter()
                    .enumerate()
                    .map(|(ordinal, c)| {
                        Arc::new(MemberModel::from_constructor(
                            self.core.clone(),
                            self.handle,
                            ordinal,
                            c,
                        ))
                    })
                    .collect(),
                None => Vec::new(),
            }
        })
    }

    /// Declared methods, in host declaration order
    pub fn declared_methods(&self) -> &[Arc<MemberModel>] {
        self.declared_methods.get_or_init(|| {
            match self.core.host.declaration(self.handle) {
                Some(decl) => decl
                    .methods
                    .iter()
                    .enumerate()
                    .map(|(ordinal, m)| {
                        Arc::new(MemberModel::from_method(
                            self.core.clone(),
                            self.handle,
                            ordinal,
                            m,
                        ))
                    })
                    .collect(),
                None => Vec::new(),
            }
        })
    }

    /// Declared fields, in host declaration order
    pub fn declared_fields(&self) -> &[Arc<FieldModel>] {
        self.declared_fields.get_or_init(|| {
            match self.core.host.declaration(self.handle) {
                Some(decl) => decl
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(ordinal, f)| {
                        Arc::new(FieldModel::new(
                            self.core.clone(),
                            self.handle,
                            ordinal,
                            f,
                        ))
                    })
                    .collect(),
                None => Vec::new(),
            }
        })
    }

    /// Merged methods: interfaces' merged methods, then the superclass's
    /// merged methods restricted to public instance members, then this
    /// type's own declared methods.
    ///
    /// Ancestor models are shared with the ancestor descriptors. The same
    /// declaration arriving over two supertype paths is kept once;
    /// override pairs are kept as distinct entries, with the more derived
    /// declaration later in the list.
    pub fn methods(&self) -> &[Arc<MemberModel>] {
        self.merged_methods.get_or_init(|| {
            let mut out = Vec::new();
            let mut seen = FxHashSet::default();

            if let Some(decl) = self.core.host.declaration(self.handle) {
                for interface in &decl.interfaces {
                    if let Some(ancestor) = self.supertype_descriptor(interface) {
                        for m in ancestor.methods() {
                            insert_unique_method(&mut out, &mut seen, m.clone());
                        }
                    }
                }
                if let Some(superclass) = &decl.superclass {
                    if let Some(ancestor) = self.supertype_descriptor(superclass) {
                        for m in ancestor.methods() {
                            if m.modifiers().is_public && !m.is_static() {
                                insert_unique_method(&mut out, &mut seen, m.clone());
                            }
                        }
                    }
                }
            }
            for m in self.declared_methods() {
                insert_unique_method(&mut out, &mut seen, m.clone());
            }
            debug!(class = %self.handle, count = out.len(), "merged methods computed");
            out
        })
    }

    /// Merged fields: this type's own declared fields, then interface
    /// fields, then superclass fields, ancestors restricted to public
    /// instance members.
    pub fn fields(&self) -> &[Arc<FieldModel>] {
        self.merged_fields.get_or_init(|| {
            let mut out = Vec::new();
            let mut seen = FxHashSet::default();

            for f in self.declared_fields() {
                insert_unique_field(&mut out, &mut seen, f.clone());
            }
            if let Some(decl) = self.core.host.declaration(self.handle) {
                for interface in &decl.interfaces {
                    if let Some(ancestor) = self.supertype_descriptor(interface) {
                        for f in ancestor.fields() {
                            if f.modifiers().is_public && !f.is_static() {
                                insert_unique_field(&mut out, &mut seen, f.clone());
                            }
                        }
                    }
                }
                if let Some(superclass) = &decl.superclass {
                    if let Some(ancestor) = self.supertype_descriptor(superclass) {
                        for f in ancestor.fields() {
                            if f.modifiers().is_public && !f.is_static() {
                                insert_unique_field(&mut out, &mut seen, f.clone());
                            }
                        }
                    }
                }
            }
            out
        })
    }

    /// Properties derived from the merged methods by accessor naming
    /// convention, in first-seen order. When an accessor is overridden,
    /// the property binds the most derived declaration.
    pub fn properties(&self) -> &[Arc<PropertyModel>] {
        self.properties.get_or_init(|| {
            let mut order: Vec<String> = Vec::new();
            let mut getters: FxHashMap<String, Arc<MemberModel>> = FxHashMap::default();
            let mut setters: FxHashMap<String, Arc<MemberModel>> = FxHashMap::default();

            for m in self.methods() {
                let mods = m.modifiers();
                if !mods.is_public || mods.is_static {
                    continue;
                }
                let arity = m.parameters().len();
                if arity == 0 && m.return_type().is_some() {
                    if let Some(name) = getter_property_name(m.name()) {
                        if !order.contains(&name) {
                            order.push(name.clone());
                        }
                        // Later entries are more derived; an override
                        // replaces the inherited accessor, matching the
                        // most-derived-wins rule of method()
                        getters.insert(name, m.clone());
                    }
                } else if arity == 1 && m.return_type().is_none() {
                    if let Some(name) = setter_property_name(m.name()) {
                        if !order.contains(&name) {
                            order.push(name.clone());
                        }
                        setters.insert(name, m.clone());
                    }
                }
            }

            order
                .into_iter()
                .map(|name| {
                    let getter = getters.remove(&name);
                    let setter = setters.remove(&name);
                    Arc::new(PropertyModel::new(name, getter, setter))
                })
                .collect()
        })
    }

    /// Exact-signature lookup over the declared methods
    pub fn declared_method(
        &self,
        name: &str,
        param_types: &[TypeHandle],
    ) -> Option<Arc<MemberModel>> {
        exact_scan(self.declared_methods().iter(), name, param_types)
    }

    /// Exact-signature lookup over the merged methods; the most derived
    /// declaration wins
    pub fn method(&self, name: &str, param_types: &[TypeHandle]) -> Option<Arc<MemberModel>> {
        exact_scan(self.methods().iter().rev(), name, param_types)
    }

    /// Exact-signature constructor lookup
    pub fn constructor(&self, param_types: &[TypeHandle]) -> Option<Arc<MemberModel>> {
        self.constructors()
            .iter()
            .find(|c| {
                let params = c.parameters();
                params.len() == param_types.len()
                    && params.iter().zip(param_types).all(|(p, t)| p.ty == *t)
            })
            .cloned()
    }

    /// First field with the given name in the merged view (own
    /// declarations shadow inherited ones)
    pub fn field(&self, name: &str) -> Option<Arc<FieldModel>> {
        self.fields().iter().find(|f| f.name() == name).cloned()
    }

    /// Property lookup by derived name
    pub fn property(&self, name: &str) -> Option<Arc<PropertyModel>> {
        self.properties()
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// Best-fit method lookup: exact signature first, then overload
    /// resolution over the merged methods with the most derived
    /// candidates considered first.
    pub fn search_method(
        &self,
        name: &str,
        arg_types: &[TypeHandle],
    ) -> Option<Arc<MemberModel>> {
        if let Some(found) = self.method(name, arg_types) {
            return Some(found);
        }
        let candidates: Vec<Arc<MemberModel>> =
            self.methods().iter().rev().cloned().collect();
        overload::best_match(
            self.core.host.as_ref(),
            &candidates,
            Some(name),
            arg_types,
        )
    }

    /// Construct an instance through the zero-argument constructor using
    /// the current access strategy.
    pub fn new_instance(&self) -> Result<Value, ReflectError> {
        if let Some(accessor) = self.fast_accessor() {
            return accessor.construct_default();
        }
        let ctor = self
            .constructors()
            .iter()
            .find(|c| c.parameters().is_empty())
            .cloned()
            .ok_or_else(|| ReflectError::Invocation {
                signature: format!("{}::new()", self.name()),
                reason: "no zero-argument constructor".to_string(),
            })?;
        ctor.construct(&[])
    }

    /// Number of reflective calls performed through members of this class
    pub fn reflective_call_count(&self) -> u32 {
        self.reflective_calls.load(Ordering::Relaxed)
    }

    /// Whether the generated accessor path is active for this class
    pub fn is_accelerated(&self) -> bool {
        matches!(self.accessor.get(), Some(Some(_)))
    }

    /// The published generated accessor, if promotion has happened and
    /// generation succeeded.
    pub(crate) fn fast_accessor(&self) -> Option<Arc<dyn GeneratedAccessor>> {
        self.accessor.get().and_then(|slot| slot.clone())
    }

    /// Record one reflective call. On crossing the promotion threshold
    /// the factory is consulted exactly once; a failed generation is
    /// remembered and never retried.
    pub(crate) fn note_reflective_call(&self) {
        if self.core.options.accelerator.is_none() {
            return;
        }
        let count = self.reflective_calls.fetch_add(1, Ordering::Relaxed) + 1;
        if count >= self.core.options.promotion_threshold {
            self.accessor.get_or_init(|| {
                let factory = self.core.options.accelerator.as_ref()?;
                match factory.create(self.handle) {
                    Some(accessor) => {
                        debug!(class = %self.handle, "promoted to generated accessor");
                        Some(accessor)
                    }
                    None => {
                        debug!(
                            class = %self.handle,
                            "accessor generation unavailable, reflective path is permanent"
                        );
                        None
                    }
                }
            });
        }
    }

    fn supertype_descriptor(&self, expr: &TypeExpr) -> Option<Arc<ClassDescriptor>> {
        let handle =
            raw_type(self.core.host.as_ref(), expr, Some(self.handle)).ok()?;
        Some(descriptor_for(&self.core, handle))
    }
}

impl std::fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("handle", &self.handle)
            .field("name", &self.name())
            .finish()
    }
}

fn exact_scan<'a>(
    mut candidates: impl Iterator<Item = &'a Arc<MemberModel>>,
    name: &str,
    param_types: &[TypeHandle],
) -> Option<Arc<MemberModel>> {
    candidates
        .find(|m| {
            if m.name() != name {
                return false;
            }
            let params = m.parameters();
            params.len() == param_types.len()
                && params.iter().zip(param_types).all(|(p, t)| p.ty == *t)
        })
        .cloned()
}

fn insert_unique_method(
    out: &mut Vec<Arc<MemberModel>>,
    seen: &mut FxHashSet<(TypeHandle, usize)>,
    member: Arc<MemberModel>,
) {
    if seen.insert((member.declaring(), member.ordinal())) {
        out.push(member);
    }
}

fn insert_unique_field(
    out: &mut Vec<Arc<FieldModel>>,
    seen: &mut FxHashSet<(TypeHandle, usize)>,
    field: Arc<FieldModel>,
) {
    if seen.insert((field.declaring(), field.ordinal())) {
        out.push(field);
    }
}
