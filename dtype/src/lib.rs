//! Type triples for the loam IR.
//!
//! Every IR expression carries a `(code, bits, lanes)` triple: the numeric
//! class, the bit width of one element, and the vector width (`1` for
//! scalars). The triple is plain data, `Copy`, and cheap to compare; the
//! expression tree and the pattern matcher both key off it constantly.

use std::fmt;

/// Numeric class of a type: signed integer, unsigned integer, or float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumIter, strum::EnumCount)]
pub enum TypeCode {
    Int,
    UInt,
    Float,
}

impl TypeCode {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete IR type: numeric class, element bit width, vector lanes.
///
/// `lanes == 1` denotes a scalar. Lane counts in real programs are small
/// powers of two; the two highest bits of the `lanes` field are left as
/// headroom for the constant folder's sticky-flag channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type {
    pub code: TypeCode,
    pub bits: u8,
    pub lanes: u16,
}

impl Type {
    /// Scalar signed integer of the given width.
    pub const fn int(bits: u8) -> Self {
        Self { code: TypeCode::Int, bits, lanes: 1 }
    }

    /// Scalar unsigned integer of the given width.
    pub const fn uint(bits: u8) -> Self {
        Self { code: TypeCode::UInt, bits, lanes: 1 }
    }

    /// Scalar float of the given width.
    pub const fn float(bits: u8) -> Self {
        Self { code: TypeCode::Float, bits, lanes: 1 }
    }

    /// Single-bit unsigned integer, the IR's boolean.
    pub const fn bool_() -> Self {
        Self::uint(1)
    }

    /// Same class and width, different lane count.
    pub const fn with_lanes(self, lanes: u16) -> Self {
        Self { lanes, ..self }
    }

    /// The scalar element type of a vector (identity on scalars).
    pub const fn element(self) -> Self {
        self.with_lanes(1)
    }

    pub const fn is_scalar(&self) -> bool {
        self.lanes == 1
    }

    pub const fn is_vector(&self) -> bool {
        self.lanes > 1
    }

    pub const fn is_int(&self) -> bool {
        matches!(self.code, TypeCode::Int)
    }

    pub const fn is_uint(&self) -> bool {
        matches!(self.code, TypeCode::UInt)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self.code, TypeCode::Float)
    }

    /// True if this is the single-bit unsigned "boolean" type.
    pub const fn is_bool(&self) -> bool {
        self.is_uint() && self.bits == 1
    }

    pub const fn bytes(&self) -> usize {
        self.bits.div_ceil(8) as usize
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.code, self.bits)?;
        if self.lanes != 1 {
            write!(f, "x{}", self.lanes)?;
        }
        Ok(())
    }
}
