//! Typed pattern terms for the simplifier's rule tables.
//!
//! A pattern is a compile-time-shaped tree of small `Copy` values. Each
//! term exposes up to three capabilities, split across traits so that a
//! rule using a term in the wrong position fails to type-check rather than
//! at runtime:
//!
//! - [`MatchPattern`] — decide whether a concrete expression has this
//!   shape, writing captures into the [`MatcherState`] scratch buffer;
//! - [`MakePattern`] — rebuild a replacement expression from the captures;
//! - [`FoldPattern`] — evaluate to a `(value, type)` pair without
//!   materializing any nodes, used by `fold(...)` right-hand sides and by
//!   rule predicates.
//!
//! Matching is strictly left-to-right: every child match receives the
//! bitmask of slots already bound by its left siblings, so a repeated hole
//! turns into an equality check against the first capture instead of a
//! rebind. Nothing on the match path allocates.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use loam_dtype::Type;

use crate::expr::{Expr, Kind, intrinsic};
use crate::types::ConstValue;

pub mod ops;
pub mod operators;
pub mod semantic;
pub mod wildcards;

pub use operators::{IntoPattern, PatternOps};
pub use ops::{
    BinOp, BroadcastOp, CastOp, CmpOp, IntrinOp, NegateOp, NotOp, RampOp, SelectOp, broadcast,
    broadcast_lanes, cast, intrin, max, min, ramp, ramp_lanes, select,
};
pub use semantic::{
    BindOp, CanProveOp, FoldOp, GcdOp, IsConstOp, Prover, bind, can_prove, fold, gcd, is_const,
};
pub use wildcards::{Const, Wild, WildConst, WildConstFloat, WildConstInt, WildConstUInt};

/// Number of expression slots and of constant slots in a [`MatcherState`].
pub const MAX_WILD: usize = 5;

/// Scratch buffer for one rewrite attempt.
///
/// Lives on the stack, holds up to [`MAX_WILD`] expression captures and the
/// same number of typed constant captures. Slots are overwritten as rules
/// bind them; [`reset`](Self::reset) is a logical reset only and does not
/// touch the slots.
#[derive(Debug)]
pub struct MatcherState {
    bindings: [Option<Expr>; MAX_WILD],
    bound_const: [ConstValue; MAX_WILD],
    bound_const_type: [Type; MAX_WILD],
}

impl MatcherState {
    /// Sticky flag in a stored type's `lanes` field: signed arithmetic
    /// overflowed its bit width somewhere in the folded subtree.
    pub const SIGNED_INTEGER_OVERFLOW: u16 = 0x8000;
    /// Sticky flag in a stored type's `lanes` field: division or modulus
    /// by zero somewhere in the folded subtree.
    pub const INDETERMINATE_EXPRESSION: u16 = 0x4000;
    pub const SPECIAL_VALUES_MASK: u16 = 0xc000;

    pub fn new() -> Self {
        Self {
            bindings: [const { None }; MAX_WILD],
            bound_const: [ConstValue::Int(0); MAX_WILD],
            bound_const_type: [Type::int(32); MAX_WILD],
        }
    }

    /// Logical reset between rule attempts. Slots are overwritten on the
    /// next bind, so there is nothing to clear.
    pub fn reset(&mut self) {}

    #[inline]
    pub fn set_binding(&mut self, i: usize, e: &Expr) {
        self.bindings[i] = Some(e.clone());
    }

    #[inline]
    pub fn binding(&self, i: usize) -> &Expr {
        self.bindings[i].as_ref().expect("expression slot read before being bound")
    }

    #[inline]
    pub fn set_bound_const(&mut self, i: usize, value: ConstValue, ty: Type) {
        self.bound_const[i] = value;
        self.bound_const_type[i] = ty;
    }

    #[inline]
    pub fn bound_const(&self, i: usize) -> (ConstValue, Type) {
        (self.bound_const[i], self.bound_const_type[i])
    }
}

impl Default for MatcherState {
    fn default() -> Self {
        Self::new()
    }
}

/// Base interface of every pattern term: the compile-time mask of wildcard
/// slots the term binds. Bits `0..16` name constant slots, bits `16..21`
/// expression slots.
pub trait Pattern: Copy + fmt::Debug + fmt::Display {
    const BINDS: u32;

    /// The raw value when this term is a bare integer literal. The folders
    /// use this to let a literal adopt the opposite operand's type instead
    /// of folding the literal on its own.
    #[inline]
    fn literal(&self) -> Option<i64> {
        None
    }
}

/// Terms usable on the left-hand side of a rule.
pub trait MatchPattern: Pattern {
    /// Does `e` have this shape? `bound` carries the slots already bound
    /// by terms to the left; on success new captures are written into
    /// `state`. On failure the state is unspecified.
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool;
}

/// Terms usable on the right-hand side of a rule.
pub trait MakePattern: Pattern {
    /// Rebuild an expression from the captures. Every slot the term refers
    /// to must have been bound by the preceding match.
    fn make(&self, state: &mut MatcherState) -> Expr;
}

/// Terms that evaluate to a constant without building nodes.
pub trait FoldPattern: Pattern {
    /// The folded value and its type. Arithmetic anomalies are reported in
    /// the type's `lanes` flag bits, never as errors.
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type);
}

/// A predicate holds iff it folds to a non-zero value with no sticky flags.
pub fn evaluate_predicate<P: FoldPattern>(predicate: P, state: &mut MatcherState) -> bool {
    let (value, ty) = predicate.fold_const(state);
    value.is_non_zero() && ty.lanes & MatcherState::SPECIAL_VALUES_MASK == 0
}

/// Materialize a folded constant as an expression, re-broadcasting vectors
/// and diverting flagged results to their sentinel intrinsics.
pub(crate) fn const_to_expr(value: ConstValue, ty: Type) -> Expr {
    if ty.lanes & MatcherState::SPECIAL_VALUES_MASK != 0 {
        return special_expr(ty);
    }
    Expr::make_const(ty, value)
}

/// The sentinel produced when folding divides by zero. Carries a fresh
/// counter value, so two independent sentinels never compare equal.
pub fn indeterminate_expression(mut ty: Type) -> Expr {
    ty.lanes |= MatcherState::INDETERMINATE_EXPRESSION;
    special_expr(ty)
}

/// The sentinel produced when signed arithmetic overflows its width.
pub fn signed_integer_overflow(mut ty: Type) -> Expr {
    ty.lanes |= MatcherState::SIGNED_INTEGER_OVERFLOW;
    special_expr(ty)
}

/// Build the sentinel call for a flagged fold result.
///
/// Each sentinel carries a fresh counter value so that two independent
/// anomalies never compare structurally equal downstream.
#[cold]
fn special_expr(mut ty: Type) -> Expr {
    static COUNTER: AtomicI64 = AtomicI64::new(0);

    let flags = ty.lanes & MatcherState::SPECIAL_VALUES_MASK;
    ty.lanes &= !MatcherState::SPECIAL_VALUES_MASK;

    let tag = Expr::imm(Type::int(32), ConstValue::Int(COUNTER.fetch_add(1, Ordering::Relaxed)));
    let name = if flags & MatcherState::INDETERMINATE_EXPRESSION != 0 {
        intrinsic::INDETERMINATE_EXPRESSION
    } else {
        intrinsic::SIGNED_INTEGER_OVERFLOW
    };
    Expr::call(ty, name, vec![tag])
}

/// Insert a broadcast on whichever side is scalar when the other is a
/// vector; rules are written scalar-agnostically.
pub(crate) fn harmonize_lanes(a: Expr, b: Expr) -> (Expr, Expr) {
    if a.ty().is_vector() && b.ty().is_scalar() {
        let lanes = a.ty().lanes;
        let b = Expr::broadcast(b, lanes);
        (a, b)
    } else if b.ty().is_vector() && a.ty().is_scalar() {
        let lanes = b.ty().lanes;
        let a = Expr::broadcast(a, lanes);
        (a, b)
    } else {
        (a, b)
    }
}

/// Peel one broadcast, exposing the scalar underneath.
#[inline]
pub(crate) fn peel_broadcast(e: &Expr) -> &Expr {
    match e.kind() {
        Kind::Broadcast { value } => value,
        _ => e,
    }
}
