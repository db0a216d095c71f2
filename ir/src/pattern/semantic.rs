//! Terms that act on bound values rather than on node structure: inline
//! folding on a rule's right-hand side and the building blocks of rule
//! predicates.

use std::fmt;

use loam_dtype::Type;

use crate::arith;
use crate::expr::Expr;
use crate::types::ConstValue;

use super::{
    FoldPattern, IntoPattern, MAX_WILD, MakePattern, MatcherState, Pattern, const_to_expr,
    wildcards::WildConst,
};

/// Evaluate `A` as a constant at rewrite time and materialize the result
/// as a literal (or as a sentinel intrinsic call when folding flagged an
/// anomaly). Used on rule right-hand sides.
#[derive(Debug, Clone, Copy)]
pub struct FoldOp<A> {
    pub a: A,
}

impl<A: FoldPattern> Pattern for FoldOp<A> {
    const BINDS: u32 = A::BINDS;
}

impl<A: FoldPattern> MakePattern for FoldOp<A> {
    fn make(&self, state: &mut MatcherState) -> Expr {
        let (value, ty) = self.a.fold_const(state);
        const_to_expr(value, ty)
    }
}

impl<A: fmt::Display> fmt::Display for FoldOp<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fold({})", self.a)
    }
}

pub fn fold<A: FoldPattern>(a: A) -> FoldOp<A> {
    FoldOp { a }
}

/// Predicate term: folds to one iff `A` rebuilds to a literal.
#[derive(Debug, Clone, Copy)]
pub struct IsConstOp<A> {
    pub a: A,
}

impl<A: Pattern> Pattern for IsConstOp<A> {
    const BINDS: u32 = A::BINDS;
}

impl<A: MakePattern> FoldPattern for IsConstOp<A> {
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
        let e = self.a.make(state);
        (ConstValue::UInt(e.is_const() as u64), Type::uint(64))
    }
}

impl<A: fmt::Display> fmt::Display for IsConstOp<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "is_const({})", self.a)
    }
}

pub fn is_const<A: MakePattern>(a: A) -> IsConstOp<A> {
    IsConstOp { a }
}

/// The simplifier seam used by [`CanProveOp`]: one mutation pass over an
/// expression.
pub trait Prover {
    fn mutate(&self, e: Expr) -> Expr;
}

/// Predicate term: materializes `A`, runs it through a prover, and folds
/// to one iff the result is the literal one.
#[derive(Debug)]
pub struct CanProveOp<'p, A, P> {
    pub a: A,
    prover: &'p P,
}

// Not derived: the prover reference copies regardless of `P`.
impl<'p, A: Clone, P> Clone for CanProveOp<'p, A, P> {
    fn clone(&self) -> Self {
        Self { a: self.a.clone(), prover: self.prover }
    }
}

impl<'p, A: Copy, P> Copy for CanProveOp<'p, A, P> {}

impl<'p, A: Pattern, P: Prover + fmt::Debug> Pattern for CanProveOp<'p, A, P> {
    const BINDS: u32 = A::BINDS;
}

impl<'p, A: MakePattern, P: Prover + fmt::Debug> FoldPattern for CanProveOp<'p, A, P> {
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
        let condition = self.prover.mutate(self.a.make(state));
        let lanes = condition.ty().lanes;
        (ConstValue::UInt(condition.is_one() as u64), Type::bool_().with_lanes(lanes))
    }
}

impl<'p, A: fmt::Display, P> fmt::Display for CanProveOp<'p, A, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "can_prove({})", self.a)
    }
}

pub fn can_prove<'p, A, P>(a: A, prover: &'p P) -> CanProveOp<'p, A::Output, P>
where
    A: IntoPattern,
    P: Prover,
{
    CanProveOp { a: a.into_pattern(), prover }
}

/// Predicate term folding to the gcd of two folded signed constants.
#[derive(Debug, Clone, Copy)]
pub struct GcdOp<A, B> {
    pub a: A,
    pub b: B,
}

impl<A: Pattern, B: Pattern> Pattern for GcdOp<A, B> {
    const BINDS: u32 = A::BINDS | B::BINDS;
}

impl<A: FoldPattern, B: FoldPattern> FoldPattern for GcdOp<A, B> {
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
        let (va, ty_a) = self.a.fold_const(state);
        let (vb, ty_b) = self.b.fold_const(state);
        let mut ty = ty_a;
        ty.lanes |= ty_b.lanes;
        assert!(ty.is_int() && ty.bits >= 32, "gcd fold requires signed operands of at least 32 bits");
        let (ConstValue::Int(a), ConstValue::Int(b)) = (va, vb) else {
            unreachable!("gcd fold over non-integer constants");
        };
        (ConstValue::Int(arith::gcd(a, b)), ty)
    }
}

impl<A: fmt::Display, B: fmt::Display> fmt::Display for GcdOp<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gcd({}, {})", self.a, self.b)
    }
}

pub fn gcd<A: IntoPattern, B: IntoPattern>(a: A, b: B) -> GcdOp<A::Output, B::Output> {
    GcdOp { a: a.into_pattern(), b: b.into_pattern() }
}

/// Predicate term: folds `A`, writes the result into constant slot `I`,
/// and itself folds to one. Lets a predicate compute a constant that the
/// right-hand side then refers to as `c<I>`.
#[derive(Debug, Clone, Copy)]
pub struct BindOp<const I: usize, A> {
    pub a: A,
}

impl<const I: usize, A: Pattern> Pattern for BindOp<I, A> {
    const BINDS: u32 = {
        assert!(I < MAX_WILD, "constant wildcard index out of range");
        A::BINDS | (1 << I)
    };
}

impl<const I: usize, A: FoldPattern> FoldPattern for BindOp<I, A> {
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
        let (value, ty) = self.a.fold_const(state);
        state.set_bound_const(I, value, ty);
        (ConstValue::UInt(1), Type::bool_())
    }
}

impl<const I: usize, A: fmt::Display> fmt::Display for BindOp<I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bind(c{I} = {})", self.a)
    }
}

pub fn bind<const I: usize, A: FoldPattern>(_slot: WildConst<I>, a: A) -> BindOp<I, A> {
    BindOp { a }
}
