//! Process-wide metadata cache
//!
//! One descriptor per type handle, created on first lookup and kept for
//! the process lifetime. Registration is an atomic insert-if-absent on a
//! concurrent map; the member collections inside each descriptor are
//! memoized independently, so a reader of fields never blocks on methods
//! being computed.

use crate::accel::AcceleratorFactory;
use crate::descriptor::ClassDescriptor;
use crate::dispatch::{ParameterNameResolver, ReflectHost};
use dashmap::DashMap;
use prism_types::TypeHandle;
use std::sync::Arc;
use tracing::debug;

/// Default reflective call count before a class is promoted to the
/// generated accessor path
pub const DEFAULT_PROMOTION_THRESHOLD: u32 = 32;

/// Tuning knobs and collaborators for a cache instance
#[derive(Clone)]
pub struct CacheOptions {
    /// Reflective calls against one class before promotion is attempted
    pub promotion_threshold: u32,
    /// Generated-accessor factory; `None` disables promotion entirely
    pub accelerator: Option<Arc<dyn AcceleratorFactory>>,
    /// Debug-metadata parameter name source
    pub parameter_names: Option<Arc<dyn ParameterNameResolver>>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        CacheOptions {
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
            accelerator: None,
            parameter_names: None,
        }
    }
}

/// Shared interior of a cache, referenced by every descriptor and member
/// model it produces.
pub(crate) struct CacheCore {
    pub(crate) host: Arc<dyn ReflectHost>,
    pub(crate) options: CacheOptions,
    descriptors: DashMap<TypeHandle, Arc<ClassDescriptor>>,
}

/// Get or create the descriptor for `handle`.
///
/// At most one descriptor is ever published per handle; concurrent
/// first lookups agree on the winner.
pub(crate) fn descriptor_for(
    core: &Arc<CacheCore>,
    handle: TypeHandle,
) -> Arc<ClassDescriptor> {
    if let Some(existing) = core.descriptors.get(&handle) {
        return existing.clone();
    }
    core.descriptors
        .entry(handle)
        .or_insert_with(|| {
            debug!(%handle, "creating class descriptor");
            Arc::new(ClassDescriptor::new(handle, Arc::clone(core)))
        })
        .clone()
}

/// The public cache handle.
///
/// Cheap to clone; clones share the same descriptor table.
#[derive(Clone)]
pub struct MetadataCache {
    core: Arc<CacheCore>,
}

impl MetadataCache {
    /// Create a cache over `host` with default options
    pub fn new(host: Arc<dyn ReflectHost>) -> Self {
        Self::with_options(host, CacheOptions::default())
    }

    /// Create a cache over `host` with explicit options
    pub fn with_options(host: Arc<dyn ReflectHost>, options: CacheOptions) -> Self {
        MetadataCache {
            core: Arc::new(CacheCore {
                host,
                options,
                descriptors: DashMap::new(),
            }),
        }
    }

    /// The descriptor for `handle`, computing and publishing it on first
    /// access
    pub fn lookup(&self, handle: TypeHandle) -> Arc<ClassDescriptor> {
        descriptor_for(&self.core, handle)
    }

    /// Number of descriptors currently published
    pub fn len(&self) -> usize {
        self.core.descriptors.len()
    }

    /// Whether no descriptor has been published yet
    pub fn is_empty(&self) -> bool {
        self.core.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHostBuilder;
    use prism_types::TypeDecl;

    fn host_with_point() -> (Arc<crate::memory::MemoryHost>, TypeHandle) {
        let mut builder = MemoryHostBuilder::new();
        let point = builder.add_type(TypeDecl::named("Point"));
        (builder.build(), point)
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let (host, point) = host_with_point();
        let cache = MetadataCache::new(host);

        let a = cache.lookup(point);
        let b = cache.lookup(point);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_first_lookup_publishes_one_descriptor() {
        let (host, point) = host_with_point();
        let cache = MetadataCache::new(host);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(std::thread::spawn(move || cache.lookup(point)));
        }
        let descriptors: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("lookup thread panicked"))
            .collect();

        for d in &descriptors[1..] {
            assert!(Arc::ptr_eq(&descriptors[0], d));
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_handles_get_distinct_descriptors() {
        let mut builder = MemoryHostBuilder::new();
        let a = builder.add_type(TypeDecl::named("A"));
        let b = builder.add_type(TypeDecl::named("B"));
        let cache = MetadataCache::new(builder.build());

        let da = cache.lookup(a);
        let db = cache.lookup(b);
        assert!(!Arc::ptr_eq(&da, &db));
        assert_eq!(da.handle(), a);
        assert_eq!(db.handle(), b);
    }
}
