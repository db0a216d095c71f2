//! Folding invariants over wide input spaces.

use proptest::prelude::*;

use crate::pattern::MatcherState;
use crate::prelude::*;

use super::generators::{arb_int_bits, arb_int_value, arb_lanes, arb_type_code, arb_uint_value};

fn int_state32(a: i64, b: i64) -> MatcherState {
    let mut state = MatcherState::new();
    state.set_bound_const(0, ConstValue::Int(a), Type::int(32));
    state.set_bound_const(1, ConstValue::Int(b), Type::int(32));
    state
}

proptest! {
    #[test]
    fn prop_i32_add_fold_wraps_and_flags(a in arb_int_value(32), b in arb_int_value(32)) {
        let mut state = int_state32(a, b);
        let (v, ty) = (WildConstInt::<0> + WildConstInt::<1>).fold_const(&mut state);
        let expected = (a as i32).wrapping_add(b as i32) as i64;
        prop_assert_eq!(v, ConstValue::Int(expected));
        let overflowed = (a as i32).checked_add(b as i32).is_none();
        prop_assert_eq!(ty.lanes & MatcherState::SIGNED_INTEGER_OVERFLOW != 0, overflowed);
    }

    #[test]
    fn prop_i32_mul_fold_wraps_and_flags(a in arb_int_value(32), b in arb_int_value(32)) {
        let mut state = int_state32(a, b);
        let (v, ty) = (WildConstInt::<0> * WildConstInt::<1>).fold_const(&mut state);
        let expected = (a as i32).wrapping_mul(b as i32) as i64;
        prop_assert_eq!(v, ConstValue::Int(expected));
        let overflowed = (a as i32).checked_mul(b as i32).is_none();
        prop_assert_eq!(ty.lanes & MatcherState::SIGNED_INTEGER_OVERFLOW != 0, overflowed);
    }

    #[test]
    fn prop_uint_folds_stay_in_width(
        (bits, a, b) in arb_int_bits()
            .prop_flat_map(|bits| (Just(bits), arb_uint_value(bits), arb_uint_value(bits)))
    ) {
        let mut state = MatcherState::new();
        state.set_bound_const(0, ConstValue::UInt(a), Type::uint(bits));
        state.set_bound_const(1, ConstValue::UInt(b), Type::uint(bits));
        let mask = u64::MAX >> (64 - bits as u32);

        let (v, _) = (WildConstUInt::<0> + WildConstUInt::<1>).fold_const(&mut state);
        prop_assert_eq!(v, ConstValue::UInt(a.wrapping_add(b) & mask));
        let (v, _) = (WildConstUInt::<0> * WildConstUInt::<1>).fold_const(&mut state);
        prop_assert_eq!(v, ConstValue::UInt(a.wrapping_mul(b) & mask));
        let (v, _) = (WildConstUInt::<0> - WildConstUInt::<1>).fold_const(&mut state);
        prop_assert_eq!(v, ConstValue::UInt(a.wrapping_sub(b) & mask));
    }

    #[test]
    fn prop_div_mod_fold_reconstructs(a in arb_int_value(32), b in arb_int_value(32)) {
        prop_assume!(b != 0);
        let mut state = int_state32(a, b);
        let (q, _) = (WildConstInt::<0> / WildConstInt::<1>).fold_const(&mut state);
        let (r, _) = (WildConstInt::<0> % WildConstInt::<1>).fold_const(&mut state);
        let (ConstValue::Int(q), ConstValue::Int(r)) = (q, r) else {
            panic!("non-integer fold result");
        };
        prop_assert_eq!(q * b + r, a);
        prop_assert!(0 <= r && r < b.abs());
    }

    #[test]
    fn prop_cmp_folds_agree_with_native_comparisons(a in arb_int_value(64), b in arb_int_value(64)) {
        let mut state = MatcherState::new();
        state.set_bound_const(0, ConstValue::Int(a), Type::int(64));
        state.set_bound_const(1, ConstValue::Int(b), Type::int(64));
        let c0 = WildConstInt::<0>;
        let c1 = WildConstInt::<1>;

        let (v, ty) = c0.lt(c1).fold_const(&mut state);
        prop_assert_eq!(v, ConstValue::UInt((a < b) as u64));
        prop_assert_eq!(ty, Type::bool_());
        let (v, _) = c0.le(c1).fold_const(&mut state);
        prop_assert_eq!(v, ConstValue::UInt((a <= b) as u64));
        let (v, _) = c0.gt(c1).fold_const(&mut state);
        prop_assert_eq!(v, ConstValue::UInt((a > b) as u64));
        let (v, _) = c0.ge(c1).fold_const(&mut state);
        prop_assert_eq!(v, ConstValue::UInt((a >= b) as u64));
        let (v, _) = c0.eq(c1).fold_const(&mut state);
        prop_assert_eq!(v, ConstValue::UInt((a == b) as u64));
        let (v, _) = c0.ne(c1).fold_const(&mut state);
        prop_assert_eq!(v, ConstValue::UInt((a != b) as u64));
    }

    #[test]
    fn prop_literals_round_trip(
        code in arb_type_code(),
        raw in arb_int_value(16),
        lanes in arb_lanes(),
    ) {
        let (ty, value) = match code {
            TypeCode::Int => (Type::int(32), ConstValue::Int(raw)),
            TypeCode::UInt => (Type::uint(32), ConstValue::UInt(raw.unsigned_abs())),
            TypeCode::Float => (Type::float(64), ConstValue::Float(raw as f64 / 4.0)),
        };
        let scalar = Expr::imm(ty, value);
        let e = if lanes == 1 { scalar } else { Expr::broadcast(scalar, lanes) };

        let c = WildConst::<0>;
        let mut state = MatcherState::new();
        prop_assert!(c.match_expr(&e, &mut state, 0));
        prop_assert!(equal(&c.make(&mut state), &e));
    }

    #[test]
    fn prop_repeated_hole_matches_iff_equal(a in arb_int_value(32), b in arb_int_value(32)) {
        let x = Wild::<0>;
        let e = Expr::binary(
            BinaryOp::Min,
            Expr::imm(Type::int(32), ConstValue::Int(a)),
            Expr::imm(Type::int(32), ConstValue::Int(b)),
        );
        let mut state = MatcherState::new();
        prop_assert_eq!(min(x, x).match_expr(&e, &mut state, 0), a == b);
    }
}
