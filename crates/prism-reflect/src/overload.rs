//! Overload resolution
//!
//! Exact match first, then a single greedy best-fit pass with variadic
//! and widening-compatibility tie-breaking. The tie-break keeps a running
//! best in candidate order; genuinely ambiguous overload sets therefore
//! resolve deterministically to whichever equally-specific candidate was
//! seen first, without being detected as ambiguous.

use crate::member::MemberModel;
use prism_types::{TypeHandle, TypeSystem};
use std::sync::Arc;

/// Whether an argument of type `arg` may be passed where `param` is
/// expected: identity, primitive/boxed widening, or host subtyping.
/// Narrowing never holds.
pub fn assignable(host: &dyn TypeSystem, param: TypeHandle, arg: TypeHandle) -> bool {
    if param == arg {
        return true;
    }
    match (host.primitive_of(param), host.primitive_of(arg)) {
        (Some(p), Some(a)) => a.widens_to(p),
        _ => host.is_subtype(arg, param),
    }
}

/// Whether an argument list shaped like `args` can be passed to a member
/// declaring `params`.
///
/// `args_variadic` marks the argument list as a declared variadic
/// signature; this shape only arises when two declared signatures are
/// compared during tie-breaking.
pub fn parameter_types_compatible(
    host: &dyn TypeSystem,
    params: &[TypeHandle],
    params_variadic: bool,
    args: &[TypeHandle],
    args_variadic: bool,
) -> bool {
    if !params_variadic || params.is_empty() {
        return params.len() == args.len()
            && params
                .iter()
                .zip(args)
                .all(|(p, a)| assignable(host, *p, *a));
    }

    let fixed = params.len() - 1;
    let pairwise_fixed = params[..fixed]
        .iter()
        .zip(args)
        .all(|(p, a)| assignable(host, *p, *a));

    if args_variadic {
        // Declared-signature comparison: lengths match exactly and the
        // trailing element types are mutually compatible.
        if args.len() != params.len() || !pairwise_fixed {
            return false;
        }
        let pe = element_type(host, params[fixed]);
        let ae = element_type(host, args[fixed]);
        assignable(host, pe, ae) || assignable(host, ae, pe)
    } else {
        // Plain caller: every remaining argument (zero or more) must fit
        // the variadic element type.
        if args.len() < fixed || !pairwise_fixed {
            return false;
        }
        let elem = element_type(host, params[fixed]);
        args[fixed..].iter().all(|a| assignable(host, elem, *a))
    }
}

/// The element type of a declared variadic parameter; a non-array handle
/// stands for itself.
fn element_type(host: &dyn TypeSystem, handle: TypeHandle) -> TypeHandle {
    host.element_of(handle).unwrap_or(handle)
}

/// Select the exact or best-fit member for `arg_types` among
/// `candidates`, optionally filtered by `name`.
///
/// Returns `None` when nothing matches; never an error.
pub fn best_match(
    host: &dyn TypeSystem,
    candidates: &[Arc<MemberModel>],
    name: Option<&str>,
    arg_types: &[TypeHandle],
) -> Option<Arc<MemberModel>> {
    let named = |m: &MemberModel| name.map_or(true, |n| m.name() == n);

    // Exact pass: identical parameter handle list, first found.
    for candidate in candidates.iter().filter(|c| named(c)) {
        let params = candidate.parameters();
        if params.len() == arg_types.len()
            && params.iter().zip(arg_types).all(|(p, a)| p.ty == *a)
        {
            return Some(candidate.clone());
        }
    }

    // Compatibility pass with a greedy running best.
    let mut best: Option<(&Arc<MemberModel>, Vec<TypeHandle>)> = None;
    for candidate in candidates.iter().filter(|c| named(c)) {
        let params: Vec<TypeHandle> =
            candidate.parameters().iter().map(|p| p.ty).collect();
        if !parameter_types_compatible(
            host,
            &params,
            candidate.is_variadic(),
            arg_types,
            false,
        ) {
            continue;
        }

        best = match best {
            None => Some((candidate, params)),
            Some((current, current_params)) => {
                let replace = if current.is_variadic() && !candidate.is_variadic() {
                    // Non-variadic is strictly preferred.
                    true
                } else if current.is_variadic() == candidate.is_variadic() {
                    // The challenger wins if the current best accepts the
                    // challenger's declared signature, i.e. the challenger
                    // is at least as specific.
                    parameter_types_compatible(
                        host,
                        &current_params,
                        current.is_variadic(),
                        &params,
                        candidate.is_variadic(),
                    )
                } else {
                    // A non-variadic best is never displaced by a
                    // variadic challenger.
                    false
                };
                if replace {
                    Some((candidate, params))
                } else {
                    Some((current, current_params))
                }
            }
        };
    }

    best.map(|(m, _)| m.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MetadataCache;
    use crate::descriptor::ClassDescriptor;
    use crate::memory::{MemoryHost, MemoryHostBuilder};
    use prism_types::{MethodDecl, Modifiers, Primitive, TypeDecl, TypeExpr};

    struct Fixture {
        host: Arc<MemoryHost>,
        descriptor: Arc<ClassDescriptor>,
        int: TypeHandle,
        long: TypeHandle,
        string: TypeHandle,
        object: TypeHandle,
    }

    /// A class with a deliberately overloaded `run` plus helpers
    fn fixture() -> Fixture {
        let mut builder = MemoryHostBuilder::new();
        let object = builder.object();
        let int = builder.add_primitive("int", Primitive::Int);
        let long = builder.add_primitive("long", Primitive::Long);
        let string = builder.add_type(TypeDecl::named("String"));

        let method = |name: &str, params: Vec<TypeExpr>, variadic: bool| MethodDecl {
            name: name.into(),
            params,
            return_type: None,
            modifiers: Modifiers::public(),
            is_variadic: variadic,
        };

        let mut runner = TypeDecl::named("Runner");
        runner.methods.push(method(
            "run",
            vec![TypeExpr::concrete(object), TypeExpr::concrete(object)],
            false,
        ));
        runner.methods.push(method(
            "run",
            vec![TypeExpr::concrete(string), TypeExpr::concrete(string)],
            false,
        ));
        runner.methods.push(method("widen", vec![TypeExpr::concrete(long)], false));
        runner.methods.push(method("narrow", vec![TypeExpr::concrete(int)], false));
        runner.methods.push(method(
            "join",
            vec![TypeExpr::array_of(TypeExpr::concrete(string))],
            true,
        ));
        runner.methods.push(method(
            "join",
            vec![TypeExpr::concrete(string)],
            false,
        ));
        let runner = builder.add_type(runner);

        let host = builder.build();
        let cache = MetadataCache::new(host.clone());
        let descriptor = cache.lookup(runner);
        Fixture {
            host,
            descriptor,
            int,
            long,
            string,
            object,
        }
    }

    #[test]
    fn test_exact_match_takes_precedence() {
        let fx = fixture();
        let methods = fx.descriptor.declared_methods();

        let found = best_match(
            fx.host.as_ref(),
            methods,
            Some("run"),
            &[fx.string, fx.string],
        )
        .expect("should match");
        let params: Vec<_> = found.parameters().iter().map(|p| p.ty).collect();
        assert_eq!(params, vec![fx.string, fx.string]);
    }

    #[test]
    fn test_best_fit_when_no_exact_match() {
        let fx = fixture();
        let methods = fx.descriptor.declared_methods();

        // (String, Object) fits only the (Object, Object) overload
        let found = best_match(
            fx.host.as_ref(),
            methods,
            Some("run"),
            &[fx.string, fx.object],
        )
        .expect("should match");
        let params: Vec<_> = found.parameters().iter().map(|p| p.ty).collect();
        assert_eq!(params, vec![fx.object, fx.object]);
    }

    #[test]
    fn test_widening_is_allowed_narrowing_is_not() {
        let fx = fixture();
        let methods = fx.descriptor.declared_methods();

        // int argument widens into the long parameter
        assert!(best_match(fx.host.as_ref(), methods, Some("widen"), &[fx.int]).is_some());
        // long argument never narrows into the int parameter
        assert!(best_match(fx.host.as_ref(), methods, Some("narrow"), &[fx.long]).is_none());
    }

    #[test]
    fn test_non_variadic_preferred_over_variadic() {
        let fx = fixture();
        let methods = fx.descriptor.declared_methods();

        let found = best_match(fx.host.as_ref(), methods, Some("join"), &[fx.string])
            .expect("should match");
        assert!(!found.is_variadic());
    }

    #[test]
    fn test_variadic_accepts_zero_or_more_trailing_args() {
        let fx = fixture();
        let methods = fx.descriptor.declared_methods();

        let zero = best_match(fx.host.as_ref(), methods, Some("join"), &[])
            .expect("zero trailing args");
        assert!(zero.is_variadic());

        let three = best_match(
            fx.host.as_ref(),
            methods,
            Some("join"),
            &[fx.string, fx.string, fx.string],
        )
        .expect("three trailing args");
        assert!(three.is_variadic());
    }

    #[test]
    fn test_more_specific_candidate_replaces_running_best() {
        // Candidate order lists the Object overload first; the String
        // overload is more specific and must win. A subtype argument is
        // used so the exact pass cannot fire.
        let mut builder = MemoryHostBuilder::new();
        let object = builder.object();
        let string = builder.add_type(TypeDecl::named("String"));
        let mut tagged = TypeDecl::named("TaggedString");
        tagged.superclass = Some(TypeExpr::concrete(string));
        let tagged = builder.add_type(tagged);

        let method = |params: Vec<TypeExpr>| MethodDecl {
            name: "run".into(),
            params,
            return_type: None,
            modifiers: Modifiers::public(),
            is_variadic: false,
        };
        let mut runner = TypeDecl::named("Runner");
        runner
            .methods
            .push(method(vec![TypeExpr::concrete(object)]));
        runner
            .methods
            .push(method(vec![TypeExpr::concrete(string)]));
        let runner = builder.add_type(runner);

        let host = builder.build();
        let cache = MetadataCache::new(host.clone());
        let descriptor = cache.lookup(runner);

        let found = best_match(
            host.as_ref(),
            descriptor.declared_methods(),
            Some("run"),
            &[tagged],
        )
        .expect("should match");
        let params: Vec<_> = found.parameters().iter().map(|p| p.ty).collect();
        assert_eq!(params, vec![string]);
    }

    #[test]
    fn test_no_match_returns_none() {
        let fx = fixture();
        let methods = fx.descriptor.declared_methods();
        assert!(best_match(fx.host.as_ref(), methods, Some("missing"), &[]).is_none());
        assert!(
            best_match(fx.host.as_ref(), methods, Some("run"), &[fx.int]).is_none()
        );
    }
}
