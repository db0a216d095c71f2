//! End-to-end rule application through the rewriter driver.

use crate::expr::Kind;
use crate::prelude::*;

fn i32t() -> Type {
    Type::int(32)
}

fn imm_i32(v: i64) -> Expr {
    Expr::imm(i32t(), ConstValue::Int(v))
}

fn var_i32(name: &str) -> Expr {
    Expr::var(i32t(), name)
}

#[test]
fn test_add_zero_collapses() {
    let x = Wild::<0>;
    let xe = var_i32("x");
    let e = Expr::binary(BinaryOp::Add, xe.clone(), Expr::make_zero(i32t()));
    let mut rw = rewriter(&e);
    assert!(rw.apply(x + 0, x));
    assert!(Expr::ptr_eq(rw.result.as_ref().unwrap(), &xe));
}

#[test]
fn test_refolding_a_constant_multiplier_is_identity() {
    let x = Wild::<0>;
    let c0 = WildConstInt::<0>;
    let e = Expr::binary(BinaryOp::Mul, var_i32("y"), imm_i32(2));
    let mut rw = rewriter(&e);
    assert!(rw.apply(x * c0, x * fold(c0)));
    assert!(equal(rw.result.as_ref().unwrap(), &e));
}

#[test]
fn test_min_with_itself_collapses() {
    let x = Wild::<0>;
    let z = var_i32("z");
    let e = Expr::binary(BinaryOp::Min, z.clone(), z.clone());
    let mut rw = rewriter(&e);
    assert!(rw.apply(min(x, x), x));
    assert!(Expr::ptr_eq(rw.result.as_ref().unwrap(), &z));
}

#[test]
fn test_mul_div_cancellation_is_gated_on_nonzero() {
    let x = Wild::<0>;
    let c0 = WildConstInt::<0>;
    let a = var_i32("a");

    let e = Expr::binary(
        BinaryOp::Div,
        Expr::binary(BinaryOp::Mul, a.clone(), imm_i32(4)),
        imm_i32(4),
    );
    let mut rw = rewriter(&e);
    assert!(rw.apply_if(x * c0 / c0, x, c0.ne(0)));
    assert!(Expr::ptr_eq(rw.result.as_ref().unwrap(), &a));

    // The structure matches for a zero multiplier, the predicate refuses.
    let e = Expr::binary(
        BinaryOp::Div,
        Expr::binary(BinaryOp::Mul, a.clone(), imm_i32(0)),
        imm_i32(0),
    );
    let mut rw = rewriter(&e);
    assert!(!rw.apply_if(x * c0 / c0, x, c0.ne(0)));
    assert!(rw.result.is_none());
}

#[test]
fn test_reassociating_constant_adds() {
    let x = Wild::<0>;
    let c0 = WildConstInt::<0>;
    let c1 = WildConstInt::<1>;
    let b = var_i32("b");

    let e = Expr::binary(
        BinaryOp::Add,
        Expr::binary(BinaryOp::Add, b.clone(), imm_i32(3)),
        imm_i32(5),
    );
    let mut rw = rewriter(&e);
    assert!(rw.apply(x + c0 + c1, x + fold(c0 + c1)));
    let expected = Expr::binary(BinaryOp::Add, b, imm_i32(8));
    assert!(equal(rw.result.as_ref().unwrap(), &expected));
}

#[test]
fn test_folded_zero_division_materializes_the_sentinel() {
    let c0 = WildConstInt::<0>;
    let c1 = WildConstInt::<1>;
    let e = Expr::binary(BinaryOp::Div, imm_i32(3), imm_i32(0));
    let mut rw = rewriter(&e);
    assert!(rw.apply(c0 / c1, fold(c0 / c1)));
    let result = rw.result.unwrap();
    assert_eq!(result.ty(), i32t());
    assert!(
        matches!(result.kind(), Kind::Call { name, .. } if *name == intrinsic::INDETERMINATE_EXPRESSION)
    );
}

#[test]
fn test_prebuilt_replacement_expression() {
    let x = Wild::<0>;
    let e = Expr::binary(BinaryOp::Div, var_i32("c"), Expr::make_zero(i32t()));
    let indet = indeterminate_expression(i32t());
    let mut rw = rewriter(&e);
    assert!(rw.apply_expr(x / 0, &indet));
    assert!(equal(rw.result.as_ref().unwrap(), &indet));
}

#[test]
fn test_sentinels_never_compare_equal() {
    let a = indeterminate_expression(i32t());
    let b = indeterminate_expression(i32t());
    assert!(!equal(&a, &b));

    let o = signed_integer_overflow(i32t());
    assert!(matches!(o.kind(), Kind::Call { name, .. } if *name == intrinsic::SIGNED_INTEGER_OVERFLOW));
    assert_eq!(o.ty(), i32t());
}

#[test]
fn test_flagged_predicate_never_fires() {
    let x = Wild::<0>;
    let c0 = WildConstInt::<0>;
    let e = Expr::binary(BinaryOp::Mul, var_i32("z"), imm_i32(3));
    let mut rw = rewriter(&e);
    assert!(!rw.apply_if(x * c0, x, (c0 / 0).eq(0)));
    assert!(rw.result.is_none());
}

#[test]
fn test_failure_leaves_the_result_slot_alone() {
    let x = Wild::<0>;
    let y = Wild::<1>;
    let e = Expr::binary(BinaryOp::Add, var_i32("z"), Expr::make_zero(i32t()));
    let mut rw = rewriter(&e);

    assert!(!rw.apply(x * 0, x));
    assert!(rw.result.is_none());

    assert!(rw.apply(x + 0, x));
    let first = rw.result.clone().unwrap();

    assert!(!rw.apply(x - y, y));
    assert!(Expr::ptr_eq(rw.result.as_ref().unwrap(), &first));
}

#[test]
fn test_is_const_predicate_in_a_rule() {
    let x = Wild::<0>;
    let y = Wild::<1>;
    let z = var_i32("z");

    let e = Expr::binary(BinaryOp::Mul, z.clone(), imm_i32(3));
    let mut rw = rewriter(&e);
    assert!(rw.apply_if(x * y, y * x, is_const(y)));
    let expected = Expr::binary(BinaryOp::Mul, imm_i32(3), z.clone());
    assert!(equal(rw.result.as_ref().unwrap(), &expected));

    let e = Expr::binary(BinaryOp::Mul, z, var_i32("w"));
    let mut rw = rewriter(&e);
    assert!(!rw.apply_if(x * y, y * x, is_const(y)));
}

#[test]
fn test_bind_lets_the_replacement_use_a_computed_constant() {
    let x = Wild::<0>;
    let c0 = WildConstInt::<0>;
    let c1 = WildConst::<1>;

    let e = Expr::binary(BinaryOp::Mul, var_i32("z"), imm_i32(4));
    let mut rw = rewriter(&e);
    assert!(rw.apply_if(x * c0, fold(c1), bind(c1, c0 + 1)));
    assert!(equal(rw.result.as_ref().unwrap(), &imm_i32(5)));
}

#[derive(Debug)]
struct ConstCmpProver;

impl Prover for ConstCmpProver {
    fn mutate(&self, e: Expr) -> Expr {
        let c0 = WildConstInt::<0>;
        let c1 = WildConstInt::<1>;
        let mut rw = rewriter(&e);
        if rw.apply(c0.lt(c1), fold(c0.lt(c1))) {
            return rw.result.clone().unwrap();
        }
        e
    }
}

#[test]
fn test_can_prove_consults_the_prover() {
    let prover = ConstCmpProver;
    let x = Wild::<0>;
    let y = Wild::<1>;
    let c0 = WildConstInt::<0>;
    let c1 = WildConstInt::<1>;
    let t = var_i32("t");
    let f = var_i32("f");

    let cond = Expr::binary(BinaryOp::Lt, imm_i32(2), imm_i32(5));
    let e = Expr::select(cond, t.clone(), f.clone());
    let mut rw = rewriter(&e);
    assert!(rw.apply_if(select(c0.lt(c1), x, y), x, can_prove(c0.lt(c1), &prover)));
    assert!(Expr::ptr_eq(rw.result.as_ref().unwrap(), &t));

    let cond = Expr::binary(BinaryOp::Lt, imm_i32(5), imm_i32(2));
    let e = Expr::select(cond, t, f);
    let mut rw = rewriter(&e);
    assert!(!rw.apply_if(select(c0.lt(c1), x, y), x, can_prove(c0.lt(c1), &prover)));
}
