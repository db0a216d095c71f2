use loam_dtype::Type;
use snafu::Snafu;

use crate::types::BinaryOp;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Type mismatch in a binary node.
    #[snafu(display("type mismatch: cannot combine {lhs} and {rhs}"))]
    TypeMismatch { lhs: Type, rhs: Type },

    /// Operand type invalid for the operation (e.g. logical op on floats).
    #[snafu(display("invalid operand type for `{op}`: {operand}"))]
    InvalidOperandType { op: BinaryOp, operand: Type },

    /// Select condition must be a boolean of the branch lane count.
    #[snafu(display("select condition must be {expected}, got {actual}"))]
    ConditionNotBoolean { expected: Type, actual: Type },

    /// Broadcast and ramp require scalar operands.
    #[snafu(display("vector constructor requires a scalar operand, got {actual}"))]
    OperandNotScalar { actual: Type },
}
