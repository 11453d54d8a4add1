use super::Method;
use crate::common::Int;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("invalid operands for {operator}: {reason}")]
    InvalidOperands {
        operator: &'static str,
        reason: String,
    },
    #[error("cannot roll {count}d{sides}: dice must have at least one side")]
    InvalidDice { count: Int, sides: Int },
    #[error("an operand of {operator} has no possible outcomes")]
    EmptyDistribution { operator: &'static str },
    #[error("enumeration would exceed {limit} combinations")]
    EnumerationExplosion { limit: usize },
    #[error("convolution would exceed {limit} terms")]
    ConvolutionTooLarge { limit: usize },
    #[error("too many dice rolled (limit {limit})")]
    TooManyRolls { limit: usize },
    #[error("integer overflow in {operator}")]
    Overflow { operator: &'static str },
    #[error("{operator} needs the attacker to roll a d20")]
    MissingD20 { operator: &'static str },
    #[error("every evaluation method failed: {}", FailureList(.0))]
    AllMethodsFailed(Vec<(Method, EvalError)>),
}

impl EvalError {
    pub fn invalid_operands(operator: &'static str, reason: impl ToString) -> Self {
        Self::InvalidOperands {
            operator,
            reason: reason.to_string(),
        }
    }

    /// Whether the Auto policy may move on to the next method after this error.
    pub fn is_fallback_signal(&self) -> bool {
        !matches!(self, Self::AllMethodsFailed(_))
    }
}

struct FailureList<'a>(&'a [(Method, EvalError)]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (method, why)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", method, why)?;
        }
        Ok(())
    }
}
