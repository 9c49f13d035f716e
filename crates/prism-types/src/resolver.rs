//! Generic type resolver
//!
//! Resolves a type expression to its closest concrete handle, given an
//! optional implementing type for variable substitution. Stateless: every
//! function walks the host's declarations directly and caches nothing.

use crate::error::TypeError;
use crate::expr::{TypeExpr, TypeHandle};
use crate::host::TypeSystem;

/// Resolve `expr` to a concrete type handle.
///
/// `implementing` supplies the concrete type whose supertype chain is
/// searched when `expr` contains type variables. Wildcards prefer their
/// lower bound, then the first upper bound, then the universal top type;
/// unresolvable variables fall back the same way through their declared
/// bounds.
pub fn raw_type(
    host: &dyn TypeSystem,
    expr: &TypeExpr,
    implementing: Option<TypeHandle>,
) -> Result<TypeHandle, TypeError> {
    match expr {
        TypeExpr::Concrete(handle) => Ok(*handle),
        TypeExpr::Parameterized { base, .. } => Ok(*base),
        TypeExpr::Wildcard { lower, upper } => {
            if let Some(bound) = lower.first().or_else(|| upper.first()) {
                raw_type(host, bound, implementing)
            } else {
                Ok(host.top())
            }
        }
        TypeExpr::ArrayOf(component) => {
            let elem = raw_type(host, component, implementing)?;
            Ok(host.array_of(elem))
        }
        TypeExpr::Variable { name, bounds } => {
            if let Some(owner) = implementing {
                if let Some(actual) = resolve_variable(host, name, owner)? {
                    return raw_type(host, &actual, implementing);
                }
            }
            match bounds.first() {
                Some(bound) => raw_type(host, bound, implementing),
                None => Ok(host.top()),
            }
        }
    }
}

/// Locate the actual type supplied for variable `name` somewhere in the
/// supertype graph of `implementing`.
///
/// Returns `Ok(None)` when `implementing` itself declares the variable
/// (defined here, nothing to substitute yet) or when no supertype
/// mentions it. Interfaces are searched before the superclass. A
/// parameterized supertype reference that supplies an actual argument in
/// the variable's formal position yields that argument; a matched
/// position beyond the reference's argument list is a hard error.
pub fn resolve_variable(
    host: &dyn TypeSystem,
    name: &str,
    implementing: TypeHandle,
) -> Result<Option<TypeExpr>, TypeError> {
    let decl = host
        .declaration(implementing)
        .ok_or(TypeError::UnknownType(implementing))?;

    if decl.declares_type_param(name) {
        return Ok(None);
    }

    for supertype in decl.interfaces.iter().chain(decl.superclass.as_ref()) {
        match supertype {
            TypeExpr::Parameterized { base, args } => {
                let base_decl = host
                    .declaration(*base)
                    .ok_or(TypeError::UnknownType(*base))?;
                if let Some(position) =
                    base_decl.type_params.iter().position(|p| p.name == name)
                {
                    return match args.get(position) {
                        Some(actual) => Ok(Some(actual.clone())),
                        None => Err(TypeError::VariableArity {
                            name: name.to_string(),
                            supertype: base_decl.name.clone(),
                            position,
                            arity: args.len(),
                        }),
                    };
                }
                if let Some(found) = resolve_variable(host, name, *base)? {
                    return Ok(Some(found));
                }
            }
            TypeExpr::Concrete(handle) => {
                if let Some(found) = resolve_variable(host, name, *handle)? {
                    return Ok(Some(found));
                }
            }
            // Variables, wildcards, and arrays cannot declare formal
            // parameters, so there is nothing to search under them.
            _ => {}
        }
    }

    Ok(None)
}

/// Resolve the component type of an array or parameterized expression.
///
/// For a raw array handle this is its element type. For a parameterized
/// expression `index` selects the actual argument; negative values count
/// from the end, so `-1` names the last (most specific) argument, e.g.
/// the value type of a map-like generic. An index beyond the available
/// arguments yields `Ok(None)` rather than an error.
pub fn component_type(
    host: &dyn TypeSystem,
    expr: &TypeExpr,
    implementing: Option<TypeHandle>,
    index: isize,
) -> Result<Option<TypeHandle>, TypeError> {
    match expr {
        TypeExpr::Concrete(handle) => Ok(host.element_of(*handle)),
        TypeExpr::ArrayOf(component) => {
            Ok(Some(raw_type(host, component, implementing)?))
        }
        TypeExpr::Parameterized { args, .. } => {
            let len = args.len() as isize;
            let at = if index < 0 { len + index } else { index };
            if at < 0 || at >= len {
                return Ok(None);
            }
            let arg = &args[at as usize];
            Ok(Some(raw_type(host, arg, implementing)?))
        }
        TypeExpr::Variable { name, .. } => {
            if let Some(owner) = implementing {
                if let Some(actual) = resolve_variable(host, name, owner)? {
                    return component_type(host, &actual, implementing, index);
                }
            }
            Ok(None)
        }
        TypeExpr::Wildcard { .. } => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{TypeDecl, TypeParam};

    /// Tiny table-backed host: handle N indexes `decls[N]`
    struct TableHost {
        decls: Vec<TypeDecl>,
        // (element, array) pairs registered up front
        arrays: Vec<(TypeHandle, TypeHandle)>,
        top: TypeHandle,
    }

    impl TypeSystem for TableHost {
        fn declaration(&self, handle: TypeHandle) -> Option<&TypeDecl> {
            self.decls.get(handle.raw() as usize)
        }

        fn top(&self) -> TypeHandle {
            self.top
        }

        fn array_of(&self, element: TypeHandle) -> TypeHandle {
            self.arrays
                .iter()
                .find(|(e, _)| *e == element)
                .map(|(_, a)| *a)
                .unwrap_or(element)
        }

        fn element_of(&self, handle: TypeHandle) -> Option<TypeHandle> {
            self.arrays
                .iter()
                .find(|(_, a)| *a == handle)
                .map(|(e, _)| *e)
        }

        fn is_subtype(&self, sub: TypeHandle, sup: TypeHandle) -> bool {
            sub == sup || sup == self.top
        }

        fn primitive_of(&self, _handle: TypeHandle) -> Option<crate::Primitive> {
            None
        }
    }

    const OBJECT: TypeHandle = TypeHandle::new(0);
    const STRING: TypeHandle = TypeHandle::new(1);
    const LIST: TypeHandle = TypeHandle::new(2);
    const STRING_LIST: TypeHandle = TypeHandle::new(3);
    const INT: TypeHandle = TypeHandle::new(4);
    const INT_ARRAY: TypeHandle = TypeHandle::new(5);
    const BROKEN: TypeHandle = TypeHandle::new(6);

    fn fixture() -> TableHost {
        let mut list = TypeDecl::named("List");
        list.type_params.push(TypeParam::new("E"));

        // class StringList implements List<String>
        let mut string_list = TypeDecl::named("StringList");
        string_list.interfaces.push(TypeExpr::Parameterized {
            base: LIST,
            args: vec![TypeExpr::concrete(STRING)],
        });

        // class Broken implements List  (raw reference, no arguments)
        let mut broken = TypeDecl::named("Broken");
        broken.interfaces.push(TypeExpr::Parameterized {
            base: LIST,
            args: vec![],
        });

        TableHost {
            decls: vec![
                TypeDecl::named("Object"),
                TypeDecl::named("String"),
                list,
                string_list,
                TypeDecl::named("int"),
                TypeDecl::named("int[]"),
                broken,
            ],
            arrays: vec![(INT, INT_ARRAY)],
            top: OBJECT,
        }
    }

    #[test]
    fn test_raw_type_concrete_and_parameterized() {
        let host = fixture();
        let concrete = TypeExpr::concrete(STRING);
        assert_eq!(raw_type(&host, &concrete, None), Ok(STRING));

        let parameterized = TypeExpr::Parameterized {
            base: LIST,
            args: vec![TypeExpr::concrete(STRING)],
        };
        assert_eq!(raw_type(&host, &parameterized, None), Ok(LIST));
    }

    #[test]
    fn test_raw_type_wildcard_prefers_lower_bound() {
        let host = fixture();
        let lower = TypeExpr::Wildcard {
            lower: vec![TypeExpr::concrete(STRING)],
            upper: vec![TypeExpr::concrete(LIST)],
        };
        assert_eq!(raw_type(&host, &lower, None), Ok(STRING));

        let upper_only = TypeExpr::Wildcard {
            lower: vec![],
            upper: vec![TypeExpr::concrete(LIST)],
        };
        assert_eq!(raw_type(&host, &upper_only, None), Ok(LIST));

        let boundless = TypeExpr::Wildcard {
            lower: vec![],
            upper: vec![],
        };
        // Never null: a boundless wildcard resolves to the top type
        assert_eq!(raw_type(&host, &boundless, None), Ok(OBJECT));
    }

    #[test]
    fn test_raw_type_array_builds_array_handle() {
        let host = fixture();
        let arr = TypeExpr::array_of(TypeExpr::concrete(INT));
        assert_eq!(raw_type(&host, &arr, None), Ok(INT_ARRAY));
    }

    #[test]
    fn test_variable_resolved_against_implementing_type() {
        let host = fixture();
        let var = TypeExpr::variable("E");
        assert_eq!(raw_type(&host, &var, Some(STRING_LIST)), Ok(STRING));
    }

    #[test]
    fn test_variable_defined_here_falls_back_to_bounds() {
        let host = fixture();
        // Resolving E against List itself: List declares E, so no
        // substitution is available and the bound (none) gives top.
        let var = TypeExpr::variable("E");
        assert_eq!(raw_type(&host, &var, Some(LIST)), Ok(OBJECT));

        let bounded = TypeExpr::Variable {
            name: "E".into(),
            bounds: vec![TypeExpr::concrete(STRING)],
        };
        assert_eq!(raw_type(&host, &bounded, Some(LIST)), Ok(STRING));
    }

    #[test]
    fn test_variable_without_implementing_type() {
        let host = fixture();
        let var = TypeExpr::variable("T");
        assert_eq!(raw_type(&host, &var, None), Ok(OBJECT));
    }

    #[test]
    fn test_variable_arity_mismatch_is_an_error() {
        let host = fixture();
        let err = resolve_variable(&host, "E", BROKEN).unwrap_err();
        assert_eq!(
            err,
            TypeError::VariableArity {
                name: "E".into(),
                supertype: "List".into(),
                position: 0,
                arity: 0,
            }
        );
    }

    #[test]
    fn test_component_type_of_parameterized() {
        let host = fixture();
        let list_of_string = TypeExpr::Parameterized {
            base: LIST,
            args: vec![TypeExpr::concrete(STRING)],
        };
        assert_eq!(
            component_type(&host, &list_of_string, None, -1),
            Ok(Some(STRING))
        );
        assert_eq!(
            component_type(&host, &list_of_string, None, 0),
            Ok(Some(STRING))
        );
        // Out of range is absence, not an error
        assert_eq!(component_type(&host, &list_of_string, None, 3), Ok(None));
        assert_eq!(component_type(&host, &list_of_string, None, -2), Ok(None));
    }

    #[test]
    fn test_component_type_of_raw_array_handle() {
        let host = fixture();
        let arr = TypeExpr::concrete(INT_ARRAY);
        assert_eq!(component_type(&host, &arr, None, -1), Ok(Some(INT)));

        let arr_expr = TypeExpr::array_of(TypeExpr::concrete(INT));
        assert_eq!(component_type(&host, &arr_expr, None, -1), Ok(Some(INT)));
    }

    #[test]
    fn test_component_type_through_variable() {
        let host = fixture();
        // A field declared as `E` on List, viewed from StringList, has no
        // component; but a variable that resolves to List<String> does.
        let var = TypeExpr::variable("E");
        assert_eq!(component_type(&host, &var, Some(STRING_LIST), -1), Ok(None));
    }
}
