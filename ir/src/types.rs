//! Operation vocabulary and the constant sum type.

use std::fmt;

use loam_dtype::{Type, TypeCode};

/// Binary node kinds, covering arithmetic, logical, and comparison forms.
///
/// Arithmetic and logical nodes preserve the operand type; comparison nodes
/// produce the single-bit unsigned type at the operand lane count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    /// Logical and, boolean operands only.
    And,
    /// Logical or, boolean operands only.
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Result type of a node with this op over operands of type `operand`.
    pub fn result_type(self, operand: Type) -> Type {
        if self.is_comparison() { Type::bool_().with_lanes(operand.lanes) } else { operand }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Min => "min",
            Self::Max => "max",
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A scalar constant at the widest representation of its class.
///
/// The tag mirrors the type-triple code; the surrounding `Type` carries the
/// actual bit width and lane count. Comparison is by numeric value within a
/// class, never across classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl ConstValue {
    pub const fn code(&self) -> TypeCode {
        match self {
            Self::Int(_) => TypeCode::Int,
            Self::UInt(_) => TypeCode::UInt,
            Self::Float(_) => TypeCode::Float,
        }
    }

    pub const fn zero(code: TypeCode) -> Self {
        match code {
            TypeCode::Int => Self::Int(0),
            TypeCode::UInt => Self::UInt(0),
            TypeCode::Float => Self::Float(0.0),
        }
    }

    pub const fn one(code: TypeCode) -> Self {
        match code {
            TypeCode::Int => Self::Int(1),
            TypeCode::UInt => Self::UInt(1),
            TypeCode::Float => Self::Float(1.0),
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Int(v) => v == 0,
            Self::UInt(v) => v == 0,
            Self::Float(v) => v == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match *self {
            Self::Int(v) => v == 1,
            Self::UInt(v) => v == 1,
            Self::Float(v) => v == 1.0,
        }
    }

    pub fn is_non_zero(&self) -> bool {
        !self.is_zero()
    }

    /// Reinterpret this constant in another numeric class, C-cast style.
    ///
    /// Identity when the class already matches; used where a bare integer
    /// literal in a rule adopts the class of the opposite operand.
    pub fn coerce(self, code: TypeCode) -> Self {
        match (self, code) {
            (v, code) if v.code() == code => v,
            (Self::Int(v), TypeCode::UInt) => Self::UInt(v as u64),
            (Self::Int(v), TypeCode::Float) => Self::Float(v as f64),
            (Self::UInt(v), TypeCode::Int) => Self::Int(v as i64),
            (Self::UInt(v), TypeCode::Float) => Self::Float(v as f64),
            (Self::Float(v), TypeCode::Int) => Self::Int(v as i64),
            (Self::Float(v), TypeCode::UInt) => Self::UInt(v as u64),
            (v, _) => v,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
        }
    }
}
