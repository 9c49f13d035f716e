//! Primitive kinds and the numeric widening order

use std::fmt;

/// Primitive value kinds recognized by the assignability rules.
///
/// Boxed wrapper types report the same kind as their unboxed counterpart
/// through [`crate::TypeSystem::primitive_of`], which makes boxing
/// invisible to overload resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `bool`
    Bool,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Unicode scalar
    Char,
}

impl Primitive {
    /// Whether a value of this kind may be passed where `target` is
    /// expected.
    ///
    /// Reflexive, and follows the widening order
    /// byte -> short -> int -> long -> float -> double and
    /// char -> int -> long -> float -> double. Narrowing never holds.
    pub fn widens_to(self, target: Primitive) -> bool {
        use Primitive::*;
        if self == target {
            return true;
        }
        match self {
            Bool => false,
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Double => false,
            Char => matches!(target, Int | Long | Float | Double),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::Bool => "bool",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Char => "char",
        };
        write!(f, "{}", name)
    }
}
