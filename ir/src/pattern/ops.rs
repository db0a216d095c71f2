//! Structural operator terms and their constant folders.
//!
//! Each IR binary form gets a zero-sized tag type carrying its node kind
//! and its three class-specialized fold functions. `BinOp`/`CmpOp` compose
//! two sub-patterns under a tag; after inlining, a whole rule collapses to
//! a chain of node-kind checks and slot writes.
//!
//! Folding runs at 64 bits and re-narrows to the operand width: signed
//! results are masked and sign-extended back, unsigned results masked.
//! Arithmetic anomalies (signed overflow at >= 32 bits, division by zero)
//! are ORed into the result type's `lanes` flag bits and stay sticky
//! through every further fold.

use std::fmt;
use std::marker::PhantomData;

use loam_dtype::Type;

use crate::arith;
use crate::expr::{Expr, Kind};
use crate::types::{BinaryOp, ConstValue};

use super::{
    FoldPattern, IntoPattern, MakePattern, MatchPattern, MatcherState, Pattern, harmonize_lanes,
};

// ===== Op tags =====

/// Fold behavior of one arithmetic/logical binary form.
pub trait BinaryOpTag: Copy + fmt::Debug {
    const OP: BinaryOp;
    /// For the logical connectives: folding stops after the left operand
    /// when it folds to this value.
    const SHORT_CIRCUIT: Option<u64> = None;

    fn fold_int(ty: &mut Type, a: i64, b: i64) -> i64;
    fn fold_uint(ty: &mut Type, a: u64, b: u64) -> u64;
    fn fold_float(ty: &mut Type, a: f64, b: f64) -> f64;
}

/// Fold behavior of one comparison form.
pub trait CmpOpTag: Copy + fmt::Debug {
    const OP: BinaryOp;

    fn fold_int(a: i64, b: i64) -> bool;
    fn fold_uint(a: u64, b: u64) -> bool;
    fn fold_float(a: f64, b: f64) -> bool;
}

/// Mask a 64-bit signed result back down to `bits`, sign-extending.
#[inline]
fn narrow_int(value: i64, bits: u8) -> i64 {
    let dead = 64 - bits as u32;
    (value << dead) >> dead
}

/// Mask a 64-bit unsigned result back down to `bits`.
#[inline]
fn narrow_uint(value: u64, bits: u8) -> u64 {
    value & (u64::MAX >> (64 - bits as u32))
}

#[derive(Debug, Clone, Copy)]
pub struct Add;

impl BinaryOpTag for Add {
    const OP: BinaryOp = BinaryOp::Add;

    #[inline]
    fn fold_int(ty: &mut Type, a: i64, b: i64) -> i64 {
        if ty.bits >= 32 && arith::add_would_overflow(ty.bits as u32, a, b) {
            ty.lanes |= MatcherState::SIGNED_INTEGER_OVERFLOW;
        }
        narrow_int(a.wrapping_add(b), ty.bits)
    }

    #[inline]
    fn fold_uint(ty: &mut Type, a: u64, b: u64) -> u64 {
        narrow_uint(a.wrapping_add(b), ty.bits)
    }

    #[inline]
    fn fold_float(_ty: &mut Type, a: f64, b: f64) -> f64 {
        a + b
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sub;

impl BinaryOpTag for Sub {
    const OP: BinaryOp = BinaryOp::Sub;

    #[inline]
    fn fold_int(ty: &mut Type, a: i64, b: i64) -> i64 {
        if ty.bits >= 32 && arith::sub_would_overflow(ty.bits as u32, a, b) {
            ty.lanes |= MatcherState::SIGNED_INTEGER_OVERFLOW;
        }
        narrow_int(a.wrapping_sub(b), ty.bits)
    }

    #[inline]
    fn fold_uint(ty: &mut Type, a: u64, b: u64) -> u64 {
        narrow_uint(a.wrapping_sub(b), ty.bits)
    }

    #[inline]
    fn fold_float(_ty: &mut Type, a: f64, b: f64) -> f64 {
        a - b
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Mul;

impl BinaryOpTag for Mul {
    const OP: BinaryOp = BinaryOp::Mul;

    #[inline]
    fn fold_int(ty: &mut Type, a: i64, b: i64) -> i64 {
        if ty.bits >= 32 && arith::mul_would_overflow(ty.bits as u32, a, b) {
            ty.lanes |= MatcherState::SIGNED_INTEGER_OVERFLOW;
        }
        narrow_int(a.wrapping_mul(b), ty.bits)
    }

    #[inline]
    fn fold_uint(ty: &mut Type, a: u64, b: u64) -> u64 {
        narrow_uint(a.wrapping_mul(b), ty.bits)
    }

    #[inline]
    fn fold_float(_ty: &mut Type, a: f64, b: f64) -> f64 {
        a * b
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Div;

impl BinaryOpTag for Div {
    const OP: BinaryOp = BinaryOp::Div;

    #[inline]
    fn fold_int(ty: &mut Type, a: i64, b: i64) -> i64 {
        if b == 0 {
            ty.lanes |= MatcherState::INDETERMINATE_EXPRESSION;
            0
        } else {
            arith::div_imp(a, b)
        }
    }

    #[inline]
    fn fold_uint(ty: &mut Type, a: u64, b: u64) -> u64 {
        if b == 0 {
            ty.lanes |= MatcherState::INDETERMINATE_EXPRESSION;
            0
        } else {
            a / b
        }
    }

    #[inline]
    fn fold_float(_ty: &mut Type, a: f64, b: f64) -> f64 {
        a / b
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Mod;

impl BinaryOpTag for Mod {
    const OP: BinaryOp = BinaryOp::Mod;

    #[inline]
    fn fold_int(ty: &mut Type, a: i64, b: i64) -> i64 {
        if b == 0 {
            ty.lanes |= MatcherState::INDETERMINATE_EXPRESSION;
            0
        } else {
            arith::mod_imp(a, b)
        }
    }

    #[inline]
    fn fold_uint(ty: &mut Type, a: u64, b: u64) -> u64 {
        if b == 0 {
            ty.lanes |= MatcherState::INDETERMINATE_EXPRESSION;
            0
        } else {
            a % b
        }
    }

    #[inline]
    fn fold_float(_ty: &mut Type, a: f64, b: f64) -> f64 {
        arith::mod_imp_f64(a, b)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Min;

impl BinaryOpTag for Min {
    const OP: BinaryOp = BinaryOp::Min;

    #[inline]
    fn fold_int(_ty: &mut Type, a: i64, b: i64) -> i64 {
        a.min(b)
    }

    #[inline]
    fn fold_uint(_ty: &mut Type, a: u64, b: u64) -> u64 {
        a.min(b)
    }

    #[inline]
    fn fold_float(_ty: &mut Type, a: f64, b: f64) -> f64 {
        a.min(b)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Max;

impl BinaryOpTag for Max {
    const OP: BinaryOp = BinaryOp::Max;

    #[inline]
    fn fold_int(_ty: &mut Type, a: i64, b: i64) -> i64 {
        a.max(b)
    }

    #[inline]
    fn fold_uint(_ty: &mut Type, a: u64, b: u64) -> u64 {
        a.max(b)
    }

    #[inline]
    fn fold_float(_ty: &mut Type, a: f64, b: f64) -> f64 {
        a.max(b)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct And;

impl BinaryOpTag for And {
    const OP: BinaryOp = BinaryOp::And;
    const SHORT_CIRCUIT: Option<u64> = Some(0);

    #[inline]
    fn fold_int(_ty: &mut Type, _a: i64, _b: i64) -> i64 {
        debug_assert!(false, "logical fold over signed-int operands");
        0
    }

    #[inline]
    fn fold_uint(_ty: &mut Type, a: u64, b: u64) -> u64 {
        a & b
    }

    #[inline]
    fn fold_float(_ty: &mut Type, _a: f64, _b: f64) -> f64 {
        debug_assert!(false, "logical fold over float operands");
        0.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Or;

impl BinaryOpTag for Or {
    const OP: BinaryOp = BinaryOp::Or;
    const SHORT_CIRCUIT: Option<u64> = Some(1);

    #[inline]
    fn fold_int(_ty: &mut Type, _a: i64, _b: i64) -> i64 {
        debug_assert!(false, "logical fold over signed-int operands");
        0
    }

    #[inline]
    fn fold_uint(_ty: &mut Type, a: u64, b: u64) -> u64 {
        a | b
    }

    #[inline]
    fn fold_float(_ty: &mut Type, _a: f64, _b: f64) -> f64 {
        debug_assert!(false, "logical fold over float operands");
        0.0
    }
}

macro_rules! cmp_tags {
    ($($name:ident => $variant:ident, $op:tt;)+) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl CmpOpTag for $name {
                const OP: BinaryOp = BinaryOp::$variant;

                #[inline]
                fn fold_int(a: i64, b: i64) -> bool { a $op b }
                #[inline]
                fn fold_uint(a: u64, b: u64) -> bool { a $op b }
                #[inline]
                fn fold_float(a: f64, b: f64) -> bool { a $op b }
            }
        )+
    };
}

cmp_tags! {
    EQ => Eq, ==;
    NE => Ne, !=;
    LT => Lt, <;
    LE => Le, <=;
    GT => Gt, >;
    GE => Ge, >=;
}

/// Apply a tag's class-specialized fold to two constants of one class.
#[inline]
fn fold_binary<Op: BinaryOpTag>(ty: &mut Type, a: ConstValue, b: ConstValue) -> ConstValue {
    match (a, b) {
        (ConstValue::Int(a), ConstValue::Int(b)) => ConstValue::Int(Op::fold_int(ty, a, b)),
        (ConstValue::UInt(a), ConstValue::UInt(b)) => ConstValue::UInt(Op::fold_uint(ty, a, b)),
        (ConstValue::Float(a), ConstValue::Float(b)) => ConstValue::Float(Op::fold_float(ty, a, b)),
        _ => unreachable!("folded operands with mismatched numeric classes"),
    }
}

#[inline]
fn fold_cmp<Op: CmpOpTag>(a: ConstValue, b: ConstValue) -> bool {
    match (a, b) {
        (ConstValue::Int(a), ConstValue::Int(b)) => Op::fold_int(a, b),
        (ConstValue::UInt(a), ConstValue::UInt(b)) => Op::fold_uint(a, b),
        (ConstValue::Float(a), ConstValue::Float(b)) => Op::fold_float(a, b),
        _ => unreachable!("compared operands with mismatched numeric classes"),
    }
}

// ===== Binary term =====

/// A binary node whose children match `A` and `B`, left to right.
#[derive(Debug, Clone, Copy)]
pub struct BinOp<Op, A, B> {
    pub a: A,
    pub b: B,
    op: PhantomData<Op>,
}

impl<Op, A, B> BinOp<Op, A, B> {
    pub(crate) fn new(a: A, b: B) -> Self {
        Self { a, b, op: PhantomData }
    }
}

impl<Op: BinaryOpTag, A: Pattern, B: Pattern> Pattern for BinOp<Op, A, B> {
    const BINDS: u32 = A::BINDS | B::BINDS;
}

impl<Op: BinaryOpTag, A: MatchPattern, B: MatchPattern> MatchPattern for BinOp<Op, A, B> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        let Kind::Binary { op, a, b } = e.kind() else {
            return false;
        };
        *op == Op::OP
            && self.a.match_expr(a, state, bound)
            && self.b.match_expr(b, state, bound | A::BINDS)
    }
}

impl<Op: BinaryOpTag, A: MakePattern, B: MakePattern> MakePattern for BinOp<Op, A, B> {
    fn make(&self, state: &mut MatcherState) -> Expr {
        if let Some(v) = self.b.literal() {
            let ea = self.a.make(state);
            let eb = Expr::make_const(ea.ty(), ConstValue::Int(v));
            return Expr::binary(Op::OP, ea, eb);
        }
        if let Some(v) = self.a.literal() {
            let eb = self.b.make(state);
            let ea = Expr::make_const(eb.ty(), ConstValue::Int(v));
            return Expr::binary(Op::OP, ea, eb);
        }
        let (ea, eb) = harmonize_lanes(self.a.make(state), self.b.make(state));
        Expr::binary(Op::OP, ea, eb)
    }
}

impl<Op: BinaryOpTag, A: FoldPattern, B: FoldPattern> FoldPattern for BinOp<Op, A, B> {
    #[inline]
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
        // A bare literal has no type of its own; it adopts the class and
        // type of the pattern side without contributing lane bits.
        if let Some(lit) = self.b.literal() {
            let (va, mut ty) = self.a.fold_const(state);
            let v = fold_binary::<Op>(&mut ty, va, ConstValue::Int(lit).coerce(va.code()));
            return (v, ty);
        }
        if let Some(lit) = self.a.literal() {
            let (vb, mut ty) = self.b.fold_const(state);
            let v = fold_binary::<Op>(&mut ty, ConstValue::Int(lit).coerce(vb.code()), vb);
            return (v, ty);
        }
        let (va, ty_a) = self.a.fold_const(state);
        if let Some(short) = Op::SHORT_CIRCUIT
            && matches!(va, ConstValue::UInt(u) if u == short)
        {
            // The right side must not be evaluated: its value cannot
            // matter, and it may be indeterminate.
            return (va, ty_a);
        }
        let (vb, ty_b) = self.b.fold_const(state);
        let mut ty = ty_a;
        ty.lanes |= ty_b.lanes;
        let v = fold_binary::<Op>(&mut ty, va, vb);
        (v, ty)
    }
}

impl<Op: BinaryOpTag, A: fmt::Display, B: fmt::Display> fmt::Display for BinOp<Op, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Op::OP {
            BinaryOp::Min | BinaryOp::Max => write!(f, "{}({}, {})", Op::OP, self.a, self.b),
            op => write!(f, "({} {} {})", self.a, op, self.b),
        }
    }
}

// ===== Comparison term =====

/// A comparison node whose children match `A` and `B`, left to right.
/// Folds to the single-bit unsigned class.
#[derive(Debug, Clone, Copy)]
pub struct CmpOp<Op, A, B> {
    pub a: A,
    pub b: B,
    op: PhantomData<Op>,
}

impl<Op, A, B> CmpOp<Op, A, B> {
    pub(crate) fn new(a: A, b: B) -> Self {
        Self { a, b, op: PhantomData }
    }
}

impl<Op: CmpOpTag, A: Pattern, B: Pattern> Pattern for CmpOp<Op, A, B> {
    const BINDS: u32 = A::BINDS | B::BINDS;
}

impl<Op: CmpOpTag, A: MatchPattern, B: MatchPattern> MatchPattern for CmpOp<Op, A, B> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        let Kind::Binary { op, a, b } = e.kind() else {
            return false;
        };
        *op == Op::OP
            && self.a.match_expr(a, state, bound)
            && self.b.match_expr(b, state, bound | A::BINDS)
    }
}

impl<Op: CmpOpTag, A: MakePattern, B: MakePattern> MakePattern for CmpOp<Op, A, B> {
    fn make(&self, state: &mut MatcherState) -> Expr {
        if let Some(v) = self.b.literal() {
            let ea = self.a.make(state);
            let eb = Expr::make_const(ea.ty(), ConstValue::Int(v));
            return Expr::binary(Op::OP, ea, eb);
        }
        if let Some(v) = self.a.literal() {
            let eb = self.b.make(state);
            let ea = Expr::make_const(eb.ty(), ConstValue::Int(v));
            return Expr::binary(Op::OP, ea, eb);
        }
        let (ea, eb) = harmonize_lanes(self.a.make(state), self.b.make(state));
        Expr::binary(Op::OP, ea, eb)
    }
}

impl<Op: CmpOpTag, A: FoldPattern, B: FoldPattern> FoldPattern for CmpOp<Op, A, B> {
    #[inline]
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
        let (result, lanes) = if let Some(lit) = self.b.literal() {
            let (va, ty_a) = self.a.fold_const(state);
            (fold_cmp::<Op>(va, ConstValue::Int(lit).coerce(va.code())), ty_a.lanes)
        } else if let Some(lit) = self.a.literal() {
            let (vb, ty_b) = self.b.fold_const(state);
            (fold_cmp::<Op>(ConstValue::Int(lit).coerce(vb.code()), vb), ty_b.lanes)
        } else {
            let (va, ty_a) = self.a.fold_const(state);
            let (vb, ty_b) = self.b.fold_const(state);
            (fold_cmp::<Op>(va, vb), ty_a.lanes | ty_b.lanes)
        };
        (ConstValue::UInt(result as u64), Type::bool_().with_lanes(lanes))
    }
}

impl<Op: CmpOpTag, A: fmt::Display, B: fmt::Display> fmt::Display for CmpOp<Op, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.a, Op::OP, self.b)
    }
}

// ===== Unary and control terms =====

/// Logical not whose operand matches `A`.
#[derive(Debug, Clone, Copy)]
pub struct NotOp<A> {
    pub a: A,
}

impl<A: Pattern> Pattern for NotOp<A> {
    const BINDS: u32 = A::BINDS;
}

impl<A: MatchPattern> MatchPattern for NotOp<A> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        let Kind::Not { value } = e.kind() else {
            return false;
        };
        self.a.match_expr(value, state, bound)
    }
}

impl<A: MakePattern> MakePattern for NotOp<A> {
    fn make(&self, state: &mut MatcherState) -> Expr {
        Expr::not(self.a.make(state))
    }
}

impl<A: FoldPattern> FoldPattern for NotOp<A> {
    #[inline]
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
        let (v, ty) = self.a.fold_const(state);
        let flipped = match v {
            ConstValue::UInt(u) => ConstValue::UInt((u == 0) as u64),
            ConstValue::Int(i) => ConstValue::Int((i == 0) as i64),
            ConstValue::Float(_) => {
                debug_assert!(false, "logical not over a float operand");
                ConstValue::Float(0.0)
            }
        };
        (flipped, ty)
    }
}

impl<A: fmt::Display> fmt::Display for NotOp<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!({})", self.a)
    }
}

/// Negation, structurally `0 - a`.
#[derive(Debug, Clone, Copy)]
pub struct NegateOp<A> {
    pub a: A,
}

impl<A: Pattern> Pattern for NegateOp<A> {
    const BINDS: u32 = A::BINDS;
}

impl<A: MatchPattern> MatchPattern for NegateOp<A> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        let Kind::Binary { op: BinaryOp::Sub, a, b } = e.kind() else {
            return false;
        };
        self.a.match_expr(b, state, bound) && a.is_zero()
    }
}

impl<A: MakePattern> MakePattern for NegateOp<A> {
    fn make(&self, state: &mut MatcherState) -> Expr {
        let ea = self.a.make(state);
        let zero = Expr::make_zero(ea.ty());
        Expr::binary(BinaryOp::Sub, zero, ea)
    }
}

impl<A: FoldPattern> FoldPattern for NegateOp<A> {
    #[inline]
    fn fold_const(&self, state: &mut MatcherState) -> (ConstValue, Type) {
        let (v, mut ty) = self.a.fold_const(state);
        let dead = 64 - ty.bits as u32;
        let negated = match v {
            ConstValue::Int(i) => {
                if ty.bits >= 32 && i != 0 && i.wrapping_shl(65 - ty.bits as u32) == 0 {
                    // The most negative value of this width has no
                    // representable negation.
                    ty.lanes |= MatcherState::SIGNED_INTEGER_OVERFLOW;
                    ConstValue::Int(i)
                } else {
                    ConstValue::Int((i.wrapping_neg() << dead) >> dead)
                }
            }
            ConstValue::UInt(u) => {
                ConstValue::UInt(u.wrapping_neg() & (u64::MAX >> dead))
            }
            ConstValue::Float(x) => ConstValue::Float(-x),
        };
        (negated, ty)
    }
}

impl<A: fmt::Display> fmt::Display for NegateOp<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-{}", self.a)
    }
}

/// Conditional whose children match in condition, then, else order.
#[derive(Debug, Clone, Copy)]
pub struct SelectOp<C, T, F> {
    pub c: C,
    pub t: T,
    pub f: F,
}

impl<C: Pattern, T: Pattern, F: Pattern> Pattern for SelectOp<C, T, F> {
    const BINDS: u32 = C::BINDS | T::BINDS | F::BINDS;
}

impl<C: MatchPattern, T: MatchPattern, F: MatchPattern> MatchPattern for SelectOp<C, T, F> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        let Kind::Select { condition, true_value, false_value } = e.kind() else {
            return false;
        };
        self.c.match_expr(condition, state, bound)
            && self.t.match_expr(true_value, state, bound | C::BINDS)
            && self.f.match_expr(false_value, state, bound | C::BINDS | T::BINDS)
    }
}

impl<C: MakePattern, T: MakePattern, F: MakePattern> MakePattern for SelectOp<C, T, F> {
    fn make(&self, state: &mut MatcherState) -> Expr {
        let c = self.c.make(state);
        let t = self.t.make(state);
        let f = self.f.make(state);
        Expr::select(c, t, f)
    }
}

impl<C: fmt::Display, T: fmt::Display, F: fmt::Display> fmt::Display for SelectOp<C, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "select({}, {}, {})", self.c, self.t, self.f)
    }
}

/// Broadcast whose scalar matches `A`. `lanes` of `None` matches any
/// vector width (and leaves the term unable to rebuild an expression).
#[derive(Debug, Clone, Copy)]
pub struct BroadcastOp<A> {
    pub a: A,
    pub lanes: Option<u16>,
}

impl<A: Pattern> Pattern for BroadcastOp<A> {
    const BINDS: u32 = A::BINDS;
}

impl<A: MatchPattern> MatchPattern for BroadcastOp<A> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        let Kind::Broadcast { value } = e.kind() else {
            return false;
        };
        match self.lanes {
            Some(lanes) if lanes != e.ty().lanes => false,
            _ => self.a.match_expr(value, state, bound),
        }
    }
}

impl<A: MakePattern> MakePattern for BroadcastOp<A> {
    fn make(&self, state: &mut MatcherState) -> Expr {
        let lanes = self.lanes.expect("broadcast pattern without a fixed lane count cannot be rebuilt");
        Expr::broadcast(self.a.make(state), lanes)
    }
}

impl<A: fmt::Display> fmt::Display for BroadcastOp<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "broadcast({})", self.a)
    }
}

/// Ramp whose base and stride match `A` and `B`.
#[derive(Debug, Clone, Copy)]
pub struct RampOp<A, B> {
    pub a: A,
    pub b: B,
    pub lanes: Option<u16>,
}

impl<A: Pattern, B: Pattern> Pattern for RampOp<A, B> {
    const BINDS: u32 = A::BINDS | B::BINDS;
}

impl<A: MatchPattern, B: MatchPattern> MatchPattern for RampOp<A, B> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        let Kind::Ramp { base, stride } = e.kind() else {
            return false;
        };
        match self.lanes {
            Some(lanes) if lanes != e.ty().lanes => false,
            _ => {
                self.a.match_expr(base, state, bound)
                    && self.b.match_expr(stride, state, bound | A::BINDS)
            }
        }
    }
}

impl<A: MakePattern, B: MakePattern> MakePattern for RampOp<A, B> {
    fn make(&self, state: &mut MatcherState) -> Expr {
        let lanes = self.lanes.expect("ramp pattern without a fixed lane count cannot be rebuilt");
        let base = self.a.make(state);
        let stride = self.b.make(state);
        Expr::ramp(base, stride, lanes)
    }
}

impl<A: fmt::Display, B: fmt::Display> fmt::Display for RampOp<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ramp({}, {})", self.a, self.b)
    }
}

/// Cast to a fixed target type whose operand matches `A`. The operand's
/// own type is unconstrained.
#[derive(Debug, Clone, Copy)]
pub struct CastOp<A> {
    pub ty: Type,
    pub a: A,
}

impl<A: Pattern> Pattern for CastOp<A> {
    const BINDS: u32 = A::BINDS;
}

impl<A: MatchPattern> MatchPattern for CastOp<A> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        let Kind::Cast { value } = e.kind() else {
            return false;
        };
        self.a.match_expr(value, state, bound)
    }
}

impl<A: MakePattern> MakePattern for CastOp<A> {
    fn make(&self, state: &mut MatcherState) -> Expr {
        Expr::cast(self.ty, self.a.make(state))
    }
}

impl<A: fmt::Display> fmt::Display for CastOp<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cast({}, {})", self.ty, self.a)
    }
}

// ===== Intrinsic call term =====

/// Argument tuple of an [`IntrinOp`]: fixed arity, matched left to right
/// with the bound mask threaded through.
pub trait PatternArgs: Copy + fmt::Debug {
    const BINDS: u32;
    const ARITY: usize;

    fn match_args(&self, args: &[Expr], state: &mut MatcherState, bound: u32) -> bool;
    fn fmt_args(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

macro_rules! impl_pattern_args {
    ($arity:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: MatchPattern),+> PatternArgs for ($($name,)+) {
            const BINDS: u32 = 0 $(| $name::BINDS)+;
            const ARITY: usize = $arity;

            #[inline]
            fn match_args(&self, args: &[Expr], state: &mut MatcherState, bound: u32) -> bool {
                let mut bound = bound;
                $(
                    if !self.$idx.match_expr(&args[$idx], state, bound) {
                        return false;
                    }
                    bound |= $name::BINDS;
                )+
                let _ = bound;
                true
            }

            fn fmt_args(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                $(
                    if $idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.$idx)?;
                )+
                Ok(())
            }
        }
    };
}

impl_pattern_args!(1; A0: 0);
impl_pattern_args!(2; A0: 0, A1: 1);
impl_pattern_args!(3; A0: 0, A1: 1, A2: 2);
impl_pattern_args!(4; A0: 0, A1: 1, A2: 2, A3: 3);

/// A call to a specific intrinsic with a fixed argument tuple.
#[derive(Debug, Clone, Copy)]
pub struct IntrinOp<Args> {
    pub name: &'static str,
    pub args: Args,
}

impl<Args: PatternArgs> Pattern for IntrinOp<Args> {
    const BINDS: u32 = Args::BINDS;
}

impl<Args: PatternArgs> MatchPattern for IntrinOp<Args> {
    #[inline]
    fn match_expr(&self, e: &Expr, state: &mut MatcherState, bound: u32) -> bool {
        let Kind::Call { name, args } = e.kind() else {
            return false;
        };
        *name == self.name && args.len() == Args::ARITY && self.args.match_args(args, state, bound)
    }
}

impl<Args: PatternArgs> fmt::Display for IntrinOp<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        self.args.fmt_args(f)?;
        write!(f, ")")
    }
}

// ===== Constructor functions =====

pub fn min<A: IntoPattern, B: IntoPattern>(a: A, b: B) -> BinOp<Min, A::Output, B::Output> {
    BinOp::new(a.into_pattern(), b.into_pattern())
}

pub fn max<A: IntoPattern, B: IntoPattern>(a: A, b: B) -> BinOp<Max, A::Output, B::Output> {
    BinOp::new(a.into_pattern(), b.into_pattern())
}

pub fn select<C, T, F>(c: C, t: T, f: F) -> SelectOp<C::Output, T::Output, F::Output>
where
    C: IntoPattern,
    T: IntoPattern,
    F: IntoPattern,
{
    SelectOp { c: c.into_pattern(), t: t.into_pattern(), f: f.into_pattern() }
}

/// Broadcast of any vector width.
pub fn broadcast<A: IntoPattern>(a: A) -> BroadcastOp<A::Output> {
    BroadcastOp { a: a.into_pattern(), lanes: None }
}

/// Broadcast of exactly `lanes` lanes.
pub fn broadcast_lanes<A: IntoPattern>(a: A, lanes: u16) -> BroadcastOp<A::Output> {
    BroadcastOp { a: a.into_pattern(), lanes: Some(lanes) }
}

/// Ramp of any vector width.
pub fn ramp<A: IntoPattern, B: IntoPattern>(a: A, b: B) -> RampOp<A::Output, B::Output> {
    RampOp { a: a.into_pattern(), b: b.into_pattern(), lanes: None }
}

/// Ramp of exactly `lanes` lanes.
pub fn ramp_lanes<A: IntoPattern, B: IntoPattern>(
    a: A,
    b: B,
    lanes: u16,
) -> RampOp<A::Output, B::Output> {
    RampOp { a: a.into_pattern(), b: b.into_pattern(), lanes: Some(lanes) }
}

pub fn cast<A: IntoPattern>(ty: Type, a: A) -> CastOp<A::Output> {
    CastOp { ty, a: a.into_pattern() }
}

pub fn intrin<Args: PatternArgs>(name: &'static str, args: Args) -> IntrinOp<Args> {
    IntrinOp { name, args }
}
