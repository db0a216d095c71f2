//! Rule-authoring sugar: `std::ops` overloads and comparison combinators.
//!
//! Rules are written the way the rewritten expressions read: `x + 0`,
//! `min(x, x)`, `(x * c0) / c0`, `!b`, `-x`. Integer literals on either
//! side become the typeless [`Const`] term through [`IntoPattern`]. The
//! logical connectives ride on `&` and `|` (Rust's `&&`/`||` cannot be
//! overloaded) and comparisons on named methods, since `==` must keep
//! returning `bool`.

use super::ops::{self, BinOp, CmpOp, IntrinOp, NegateOp, NotOp, RampOp, SelectOp, BroadcastOp, CastOp, PatternArgs};
use super::semantic::{BindOp, CanProveOp, FoldOp, GcdOp, IsConstOp, Prover};
use super::wildcards::{Const, Wild, WildConst, WildConstFloat, WildConstInt, WildConstUInt};
use super::{FoldPattern, Pattern};

/// Conversion into a pattern term. Implemented by every term (identity)
/// and by `i64` (which becomes the typeless literal term), so combinators
/// and operators accept either.
pub trait IntoPattern {
    type Output: Pattern;

    fn into_pattern(self) -> Self::Output;
}

impl IntoPattern for i64 {
    type Output = Const;

    #[inline]
    fn into_pattern(self) -> Const {
        Const { value: self }
    }
}

/// Comparison combinators on every pattern term.
///
/// Named methods rather than operators: Rust's comparison operators are
/// reserved for `bool`-returning trait impls.
pub trait PatternOps: Pattern {
    #[inline]
    fn eq<R: IntoPattern>(self, rhs: R) -> CmpOp<ops::EQ, Self, R::Output> {
        CmpOp::new(self, rhs.into_pattern())
    }

    #[inline]
    fn ne<R: IntoPattern>(self, rhs: R) -> CmpOp<ops::NE, Self, R::Output> {
        CmpOp::new(self, rhs.into_pattern())
    }

    #[inline]
    fn lt<R: IntoPattern>(self, rhs: R) -> CmpOp<ops::LT, Self, R::Output> {
        CmpOp::new(self, rhs.into_pattern())
    }

    #[inline]
    fn le<R: IntoPattern>(self, rhs: R) -> CmpOp<ops::LE, Self, R::Output> {
        CmpOp::new(self, rhs.into_pattern())
    }

    #[inline]
    fn gt<R: IntoPattern>(self, rhs: R) -> CmpOp<ops::GT, Self, R::Output> {
        CmpOp::new(self, rhs.into_pattern())
    }

    #[inline]
    fn ge<R: IntoPattern>(self, rhs: R) -> CmpOp<ops::GE, Self, R::Output> {
        CmpOp::new(self, rhs.into_pattern())
    }
}

impl<P: Pattern> PatternOps for P {}

macro_rules! term_binary_operator {
    ([$($g:tt)*] $ty:ty, $trait:ident, $method:ident, $tag:ty) => {
        impl<$($g)* Rhs: IntoPattern> std::ops::$trait<Rhs> for $ty {
            type Output = BinOp<$tag, Self, Rhs::Output>;

            #[inline]
            fn $method(self, rhs: Rhs) -> Self::Output {
                BinOp::new(self, rhs.into_pattern())
            }
        }

        impl<$($g)*> std::ops::$trait<$ty> for i64 {
            type Output = BinOp<$tag, Const, $ty>;

            #[inline]
            fn $method(self, rhs: $ty) -> Self::Output {
                BinOp::new(Const { value: self }, rhs)
            }
        }
    };
}

macro_rules! pattern_term {
    (impl[$($g:tt)*] $ty:ty) => {
        impl<$($g)*> IntoPattern for $ty {
            type Output = Self;

            #[inline]
            fn into_pattern(self) -> Self {
                self
            }
        }

        term_binary_operator!([$($g)*] $ty, Add, add, ops::Add);
        term_binary_operator!([$($g)*] $ty, Sub, sub, ops::Sub);
        term_binary_operator!([$($g)*] $ty, Mul, mul, ops::Mul);
        term_binary_operator!([$($g)*] $ty, Div, div, ops::Div);
        term_binary_operator!([$($g)*] $ty, Rem, rem, ops::Mod);
        term_binary_operator!([$($g)*] $ty, BitAnd, bitand, ops::And);
        term_binary_operator!([$($g)*] $ty, BitOr, bitor, ops::Or);

        impl<$($g)*> std::ops::Neg for $ty {
            type Output = NegateOp<Self>;

            #[inline]
            fn neg(self) -> NegateOp<Self> {
                NegateOp { a: self }
            }
        }

        impl<$($g)*> std::ops::Not for $ty {
            type Output = NotOp<Self>;

            #[inline]
            fn not(self) -> NotOp<Self> {
                NotOp { a: self }
            }
        }
    };
}

pattern_term!(impl[const I: usize,] Wild<I>);
pattern_term!(impl[const I: usize,] WildConst<I>);
pattern_term!(impl[const I: usize,] WildConstInt<I>);
pattern_term!(impl[const I: usize,] WildConstUInt<I>);
pattern_term!(impl[const I: usize,] WildConstFloat<I>);
pattern_term!(impl[] Const);
pattern_term!(impl[Op: ops::BinaryOpTag, A: Pattern, B: Pattern,] BinOp<Op, A, B>);
pattern_term!(impl[Op: ops::CmpOpTag, A: Pattern, B: Pattern,] CmpOp<Op, A, B>);
pattern_term!(impl[A: Pattern,] NotOp<A>);
pattern_term!(impl[A: Pattern,] NegateOp<A>);
pattern_term!(impl[C: Pattern, T: Pattern, F: Pattern,] SelectOp<C, T, F>);
pattern_term!(impl[A: Pattern,] BroadcastOp<A>);
pattern_term!(impl[A: Pattern, B: Pattern,] RampOp<A, B>);
pattern_term!(impl[A: Pattern,] CastOp<A>);
pattern_term!(impl[Args: PatternArgs,] IntrinOp<Args>);
pattern_term!(impl[A: FoldPattern,] FoldOp<A>);
pattern_term!(impl[A: Pattern,] IsConstOp<A>);
pattern_term!(impl['p, A: Pattern, P: Prover + std::fmt::Debug,] CanProveOp<'p, A, P>);
pattern_term!(impl[A: Pattern, B: Pattern,] GcdOp<A, B>);
pattern_term!(impl[const I: usize, A: Pattern,] BindOp<I, A>);
