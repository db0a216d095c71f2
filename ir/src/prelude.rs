//! Common imports for building expressions and authoring rewrite rules.
//!
//! ```rust,ignore
//! use loam_ir::prelude::*;
//! ```

pub use crate::expr::{Expr, Kind, equal, intrinsic};
pub use crate::types::{BinaryOp, ConstValue};

pub use crate::pattern::{
    BindOp, Const, FoldPattern, IntoPattern, MakePattern, MatchPattern, MatcherState, Pattern,
    PatternOps, Prover, Wild, WildConst, WildConstFloat, WildConstInt, WildConstUInt, bind,
    broadcast, broadcast_lanes, can_prove, cast, evaluate_predicate, fold, gcd,
    indeterminate_expression, intrin, is_const, max, min, ramp, ramp_lanes, select,
    signed_integer_overflow,
};
pub use crate::rewrite::{Rewriter, rewriter};

pub use loam_dtype::{Type, TypeCode};
