//! The free-form name matcher.

use std::collections::HashMap;

use crate::prelude::*;
use crate::{expr_match, expr_match_named};

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
fn test_star_wildcards_collect_in_order() {
    let wild = Expr::var(i32t(), "*");
    let pattern = Expr::binary(BinaryOp::Add, wild.clone(), wild);

    let three = imm_i32(3);
    let product = Expr::binary(BinaryOp::Mul, imm_i32(2), var_i32("k"));
    let e = Expr::binary(BinaryOp::Add, three.clone(), product.clone());

    let mut results = Vec::new();
    assert!(expr_match(&pattern, &e, &mut results));
    assert_eq!(results.len(), 2);
    assert!(equal(&results[0], &three));
    assert!(equal(&results[1], &product));
}

#[test]
fn test_star_wildcard_types_gate_the_match() {
    let mut results = Vec::new();

    let wild64 = Expr::var(Type::int(64), "*");
    assert!(!expr_match(&wild64, &imm_i32(3), &mut results));

    // Zero bits means any width, zero lanes any lane count.
    let any_int = Expr::var(Type { code: TypeCode::Int, bits: 0, lanes: 0 }, "*");
    assert!(expr_match(&any_int, &imm_i32(3), &mut results));
    assert!(expr_match(&any_int, &Expr::broadcast(imm_i32(3), 8), &mut results));

    let any_float = Expr::var(Type { code: TypeCode::Float, bits: 0, lanes: 0 }, "*");
    assert!(!expr_match(&any_float, &imm_i32(3), &mut results));

    // Width fixed, lanes free.
    let i32_any_lanes = Expr::var(Type { code: TypeCode::Int, bits: 32, lanes: 0 }, "*");
    assert!(expr_match(&i32_any_lanes, &Expr::broadcast(imm_i32(3), 4), &mut results));
    assert!(!expr_match(&i32_any_lanes, &Expr::imm(Type::int(8), ConstValue::Int(3)), &mut results));
}

#[test]
fn test_named_variables_bind_consistently() {
    let x = Expr::var(i32t(), "x");
    let y = Expr::var(i32t(), "y");
    let pattern =
        Expr::binary(BinaryOp::Mul, x.clone(), Expr::binary(BinaryOp::Add, x, y));

    let a = var_i32("a");
    let b = var_i32("b");
    let e = Expr::binary(
        BinaryOp::Mul,
        a.clone(),
        Expr::binary(BinaryOp::Add, a.clone(), b.clone()),
    );

    let mut results = HashMap::new();
    assert!(expr_match_named(&pattern, &e, &mut results));
    assert!(equal(&results["x"], &a));
    assert!(equal(&results["y"], &b));

    // Same name, different subtrees: no match.
    let e_bad = Expr::binary(
        BinaryOp::Mul,
        a.clone(),
        Expr::binary(BinaryOp::Add, b.clone(), b),
    );
    assert!(!expr_match_named(&pattern, &e_bad, &mut results));
}

#[test]
fn test_structure_mismatches_fail() {
    let wild = Expr::var(i32t(), "*");
    let pattern = Expr::binary(BinaryOp::Add, wild.clone(), imm_i32(1));
    let mut results = Vec::new();

    let mul = Expr::binary(BinaryOp::Mul, var_i32("a"), imm_i32(1));
    assert!(!expr_match(&pattern, &mul, &mut results));

    let wrong_literal = Expr::binary(BinaryOp::Add, var_i32("a"), imm_i32(2));
    assert!(!expr_match(&pattern, &wrong_literal, &mut results));

    let matching = Expr::binary(BinaryOp::Add, var_i32("a"), imm_i32(1));
    assert!(expr_match(&pattern, &matching, &mut results));
    assert_eq!(results.len(), 1);
}

#[test]
fn test_call_patterns_match_name_and_args() {
    let wild = Expr::var(i32t(), "*");
    let pattern = Expr::call(i32t(), "likely", vec![wild]);
    let e = Expr::call(i32t(), "likely", vec![var_i32("v")]);
    let mut results = Vec::new();
    assert!(expr_match(&pattern, &e, &mut results));
    assert_eq!(results.len(), 1);

    let other = Expr::call(i32t(), "unlikely", vec![var_i32("v")]);
    assert!(!expr_match(&pattern, &other, &mut results));
}
