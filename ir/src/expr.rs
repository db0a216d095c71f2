//! The immutable expression tree.
//!
//! An [`Expr`] is a cheap shared handle to a typed node. Trees are built
//! bottom-up, never mutated, and shared freely between threads; rewriting
//! always produces new nodes. Structural equality lives here as well, with a
//! pointer fast path so that shared subtrees compare in constant time.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use loam_dtype::Type;

use crate::error::{ConditionNotBooleanSnafu, InvalidOperandTypeSnafu, OperandNotScalarSnafu, Result, TypeMismatchSnafu};
use crate::types::{BinaryOp, ConstValue};

use snafu::ensure;

/// Intrinsic call tags with meaning to the rewriter.
pub mod intrinsic {
    /// Result of folding a division or modulus by zero.
    pub const INDETERMINATE_EXPRESSION: &str = "indeterminate_expression";
    /// Result of folding signed arithmetic past its bit width.
    pub const SIGNED_INTEGER_OVERFLOW: &str = "signed_integer_overflow";
}

/// Node payload. Children are [`Expr`] handles; extra structure (lane
/// counts, target types) lives in the node's own [`Type`].
#[derive(Debug)]
pub enum Kind {
    /// Scalar literal of any of the three numeric classes.
    Imm(ConstValue),
    /// Scalar replicated across the node's lane count.
    Broadcast { value: Expr },
    /// `base + i * stride` for lane index `i`.
    Ramp { base: Expr, stride: Expr },
    /// Conversion to the node's type.
    Cast { value: Expr },
    Binary { op: BinaryOp, a: Expr, b: Expr },
    /// Logical not of a boolean.
    Not { value: Expr },
    Select { condition: Expr, true_value: Expr, false_value: Expr },
    /// Intrinsic call with an ordered argument list.
    Call { name: &'static str, args: SmallVec<[Expr; 2]> },
    /// Named variable. Opaque to the simplifier; the free-form matcher
    /// treats specially named variables as wildcards.
    Var { name: String },
}

#[derive(Debug)]
struct Node {
    ty: Type,
    kind: Kind,
}

/// Shared immutable handle to an expression node.
#[derive(Debug, Clone)]
pub struct Expr(Arc<Node>);

impl Expr {
    pub fn new(ty: Type, kind: Kind) -> Self {
        Self(Arc::new(Node { ty, kind }))
    }

    pub fn ty(&self) -> Type {
        self.0.ty
    }

    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    /// Same underlying node.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    // ===== Leaf constructors =====

    /// Scalar literal. The value class must agree with the type code.
    pub fn imm(ty: Type, value: ConstValue) -> Self {
        assert!(ty.is_scalar(), "literal type must be scalar, got {ty}");
        assert_eq!(ty.code, value.code(), "literal class must agree with its type");
        Self::new(ty, Kind::Imm(value))
    }

    /// A constant of the given type, broadcast when the type is a vector.
    ///
    /// The value is coerced into the type's numeric class, so rules can say
    /// `make_const(ty, Int(0))` without caring whether `ty` is float.
    pub fn make_const(ty: Type, value: ConstValue) -> Self {
        let scalar = Self::imm(ty.element(), value.coerce(ty.code));
        if ty.is_vector() { Self::broadcast(scalar, ty.lanes) } else { scalar }
    }

    pub fn make_zero(ty: Type) -> Self {
        Self::make_const(ty, ConstValue::zero(ty.code))
    }

    pub fn make_one(ty: Type) -> Self {
        Self::make_const(ty, ConstValue::one(ty.code))
    }

    pub fn var(ty: Type, name: impl Into<String>) -> Self {
        Self::new(ty, Kind::Var { name: name.into() })
    }

    // ===== Interior constructors =====

    pub fn broadcast(value: Expr, lanes: u16) -> Self {
        assert!(value.ty().is_scalar(), "broadcast takes a scalar, got {}", value.ty());
        let ty = value.ty().with_lanes(lanes);
        Self::new(ty, Kind::Broadcast { value })
    }

    pub fn ramp(base: Expr, stride: Expr, lanes: u16) -> Self {
        assert!(base.ty().is_scalar() && stride.ty().is_scalar(), "ramp takes scalars");
        assert_eq!(base.ty(), stride.ty(), "ramp base and stride types must match");
        let ty = base.ty().with_lanes(lanes);
        Self::new(ty, Kind::Ramp { base, stride })
    }

    pub fn cast(ty: Type, value: Expr) -> Self {
        Self::new(ty, Kind::Cast { value })
    }

    pub fn binary(op: BinaryOp, a: Expr, b: Expr) -> Self {
        assert_eq!(a.ty(), b.ty(), "binary operand types must match for `{op}`");
        let ty = op.result_type(a.ty());
        Self::new(ty, Kind::Binary { op, a, b })
    }

    pub fn not(value: Expr) -> Self {
        let ty = value.ty();
        Self::new(ty, Kind::Not { value })
    }

    pub fn select(condition: Expr, true_value: Expr, false_value: Expr) -> Self {
        assert_eq!(true_value.ty(), false_value.ty(), "select branch types must match");
        let ty = true_value.ty();
        Self::new(ty, Kind::Select { condition, true_value, false_value })
    }

    pub fn call(ty: Type, name: &'static str, args: Vec<Expr>) -> Self {
        Self::new(ty, Kind::Call { name, args: SmallVec::from_vec(args) })
    }

    // ===== Checked builders =====
    //
    // The matcher constructs nodes through the infallible paths above after
    // it has already established the invariants; callers assembling trees
    // from outside input go through these instead.

    pub fn try_binary(op: BinaryOp, a: Expr, b: Expr) -> Result<Expr> {
        ensure!(a.ty() == b.ty(), TypeMismatchSnafu { lhs: a.ty(), rhs: b.ty() });
        if op.is_logical() {
            ensure!(a.ty().element().is_bool(), InvalidOperandTypeSnafu { op, operand: a.ty() });
        }
        Ok(Self::binary(op, a, b))
    }

    pub fn try_select(condition: Expr, true_value: Expr, false_value: Expr) -> Result<Expr> {
        ensure!(
            true_value.ty() == false_value.ty(),
            TypeMismatchSnafu { lhs: true_value.ty(), rhs: false_value.ty() }
        );
        let expected = Type::bool_().with_lanes(true_value.ty().lanes);
        ensure!(condition.ty() == expected, ConditionNotBooleanSnafu { expected, actual: condition.ty() });
        Ok(Self::select(condition, true_value, false_value))
    }

    pub fn try_broadcast(value: Expr, lanes: u16) -> Result<Expr> {
        ensure!(value.ty().is_scalar(), OperandNotScalarSnafu { actual: value.ty() });
        Ok(Self::broadcast(value, lanes))
    }

    // ===== Inspection helpers =====

    /// The literal value of this node, looking through one broadcast.
    pub fn literal_value(&self) -> Option<ConstValue> {
        let inner = match self.kind() {
            Kind::Broadcast { value } => value,
            _ => self,
        };
        match inner.kind() {
            Kind::Imm(v) => Some(*v),
            _ => None,
        }
    }

    /// Is this a literal, possibly broadcast?
    pub fn is_const(&self) -> bool {
        self.literal_value().is_some()
    }

    pub fn is_zero(&self) -> bool {
        self.literal_value().is_some_and(|v| v.is_zero())
    }

    pub fn is_one(&self) -> bool {
        self.literal_value().is_some_and(|v| v.is_one())
    }
}

/// Structural equality over well-typed trees.
///
/// Shared nodes short-circuit on pointer identity, so comparing a tree
/// against itself is O(1) regardless of depth.
pub fn equal(a: &Expr, b: &Expr) -> bool {
    if Expr::ptr_eq(a, b) {
        return true;
    }
    if a.ty() != b.ty() {
        return false;
    }
    equal_kind(a.kind(), b.kind())
}

fn equal_kind(a: &Kind, b: &Kind) -> bool {
    match (a, b) {
        (Kind::Imm(x), Kind::Imm(y)) => x == y,
        (Kind::Broadcast { value: x }, Kind::Broadcast { value: y }) => equal(x, y),
        (Kind::Ramp { base: xb, stride: xs }, Kind::Ramp { base: yb, stride: ys }) => {
            equal(xb, yb) && equal(xs, ys)
        }
        (Kind::Cast { value: x }, Kind::Cast { value: y }) => equal(x, y),
        (Kind::Binary { op: xo, a: xa, b: xb }, Kind::Binary { op: yo, a: ya, b: yb }) => {
            xo == yo && equal(xa, ya) && equal(xb, yb)
        }
        (Kind::Not { value: x }, Kind::Not { value: y }) => equal(x, y),
        (
            Kind::Select { condition: xc, true_value: xt, false_value: xf },
            Kind::Select { condition: yc, true_value: yt, false_value: yf },
        ) => equal(xc, yc) && equal(xt, yt) && equal(xf, yf),
        (Kind::Call { name: xn, args: xa }, Kind::Call { name: yn, args: ya }) => {
            xn == yn && xa.len() == ya.len() && xa.iter().zip(ya.iter()).all(|(x, y)| equal(x, y))
        }
        (Kind::Var { name: x }, Kind::Var { name: y }) => x == y,
        _ => false,
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Kind::Imm(v) => write!(f, "{v}"),
            Kind::Broadcast { value } => write!(f, "x{}({value})", self.ty().lanes),
            Kind::Ramp { base, stride } => write!(f, "ramp({base}, {stride}, {})", self.ty().lanes),
            Kind::Cast { value } => write!(f, "{}({value})", self.ty()),
            Kind::Binary { op: op @ (BinaryOp::Min | BinaryOp::Max), a, b } => {
                write!(f, "{op}({a}, {b})")
            }
            Kind::Binary { op, a, b } => write!(f, "({a} {op} {b})"),
            Kind::Not { value } => write!(f, "!({value})"),
            Kind::Select { condition, true_value, false_value } => {
                write!(f, "select({condition}, {true_value}, {false_value})")
            }
            Kind::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Kind::Var { name } => f.write_str(name),
        }
    }
}
