//! Wildcard and literal terms.
//!
//! `Wild<I>` captures any expression into slot `I`; the `WildConst*`
//! family captures numeric literals (looking through a broadcast) into the
//! constant slots. A second occurrence of the same slot index inside one
//! pattern turns into an equality check against the first capture — the
//! caller threads the already-bound mask through `match_expr` to make that
//! happen without any post-hoc scan.

use std::fmt;

use loam_dtype::Type;

use crate::expr::{Expr, Kind, equal};
use crate::types::ConstValue;

use super::{MAX_WILD, MakePattern, MatchPattern, MatcherState, Pattern, FoldPattern, const_to_expr, peel_broadcast};

/// Matches and binds any expression.
#[derive(Debug, Clone, Copy)]
pub struct Wild<const I: usize>;

impl<const I: usize> Pattern for Wild<I> {
    const BINDS: u32 = {
        assert!(I < MAX_WILD, "expression wildcard index out of range");
        1 << (I + 16)
    };
}

impl<const I: usize> MatchPattern for Wild<I> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        if bound & Self::BINDS != 0 {
            return equal(state.binding(I), e);
        }
        state.set_binding(I, e);
        true
    }
}

impl<const I: usize> MakePattern for Wild<I> {
    #[inline]
    fn make(&self, state: &mut MatcherState) -> Expr {
        state.binding(I).clone()
    }
}

impl<const I: usize> fmt::Display for Wild<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_{I}")
    }
}

/// Shared capture step for the constant wildcards.
///
/// Stores the full expression type (lane count included), so rebuilding
/// restores the broadcast. A repeat occurrence must agree on both the type
/// and the numeric value.
#[inline]
fn capture_const<const I: usize>(
    value: ConstValue,
    ty: Type,
    state: &mut MatcherState,
    bound: u32,
    binds: u32,
) -> bool {
    if bound & binds != 0 {
        let (prev, prev_ty) = state.bound_const(I);
        return ty == prev_ty && prev == value;
    }
    state.set_bound_const(I, value, ty);
    true
}

macro_rules! typed_const_wild {
    ($(#[$doc:meta])* $name:ident, $class:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<const I: usize>;

        impl<const I: usize> Pattern for $name<I> {
            const BINDS: u32 = {
                assert!(I < MAX_WILD, "constant wildcard index out of range");
                1 << I
            };
        }

        impl<const I: usize> MatchPattern for $name<I> {
            #[inline]
            fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
                let Kind::Imm(value @ ConstValue::$class(_)) = peel_broadcast(e).kind() else {
                    return false;
                };
                capture_const::<I>(*value, e.ty(), state, bound, Self::BINDS)
            }
        }

        impl<const I: usize> MakePattern for $name<I> {
            #[inline]
            fn make(&self, state: &mut MatcherState) -> Expr {
                let (value, ty) = state.bound_const(I);
                const_to_expr(value, ty)
            }
        }

        impl<const I: usize> FoldPattern for $name<I> {
            #[inline]
            fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
                state.bound_const(I)
            }
        }

        impl<const I: usize> fmt::Display for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), I)
            }
        }
    };
}

typed_const_wild! {
    /// Matches a signed-integer literal, possibly broadcast.
    WildConstInt, Int, "ci"
}
typed_const_wild! {
    /// Matches an unsigned-integer literal, possibly broadcast.
    WildConstUInt, UInt, "cu"
}
typed_const_wild! {
    /// Matches a float literal, possibly broadcast.
    WildConstFloat, Float, "cf"
}

/// Matches a literal of any numeric class, possibly broadcast.
#[derive(Debug, Clone, Copy)]
pub struct WildConst<const I: usize>;

impl<const I: usize> Pattern for WildConst<I> {
    const BINDS: u32 = {
        assert!(I < MAX_WILD, "constant wildcard index out of range");
        1 << I
    };
}

impl<const I: usize> MatchPattern for WildConst<I> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        match peel_broadcast(e).kind() {
            Kind::Imm(ConstValue::Int(_)) => WildConstInt::<I>.match_expr(e, state, bound),
            Kind::Imm(ConstValue::UInt(_)) => WildConstUInt::<I>.match_expr(e, state, bound),
            Kind::Imm(ConstValue::Float(_)) => WildConstFloat::<I>.match_expr(e, state, bound),
            _ => false,
        }
    }
}

impl<const I: usize> MakePattern for WildConst<I> {
    #[inline]
    fn make(&self, state: &mut MatcherState) -> Expr {
        let (value, ty) = state.bound_const(I);
        const_to_expr(value, ty)
    }
}

impl<const I: usize> FoldPattern for WildConst<I> {
    #[inline]
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
        state.bound_const(I)
    }
}

impl<const I: usize> fmt::Display for WildConst<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{I}")
    }
}

/// Matches a specific literal (or a broadcast of it) under the literal's
/// own arithmetic: `2` matches the int 2, the uint 2, and the float 2.0.
/// Binds nothing.
///
/// Inside a composite term the literal adopts the type of the opposite
/// operand; on its own it has no type, so it cannot be rebuilt or folded
/// in isolation.
#[derive(Debug, Clone, Copy)]
pub struct Const {
    pub value: i64,
}

impl Pattern for Const {
    const BINDS: u32 = 0;

    #[inline]
    fn literal(&self) -> Option<i64> {
        Some(self.value)
    }
}

impl MatchPattern for Const {
    #[inline]
    fn match_expr(&self, e: &Expr, _state: &mut MatcherState, _bound: u32) -> bool {
        match peel_broadcast(e).kind() {
            Kind::Imm(ConstValue::Int(v)) => *v == self.value,
            Kind::Imm(ConstValue::UInt(v)) => *v == self.value as u64,
            Kind::Imm(ConstValue::Float(v)) => *v == self.value as f64,
            _ => false,
        }
    }
}

impl MakePattern for Const {
    fn make(&self, _state: &mut MatcherState) -> Expr {
        unreachable!("a bare literal pattern has no type to rebuild with")
    }
}

impl FoldPattern for Const {
    fn fold_const(&self, _state: &mut MatcherState) -> (ConstValue, Type) {
        unreachable!("a bare literal pattern has no type to fold with")
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
