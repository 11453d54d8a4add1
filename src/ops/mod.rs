//! Operator semantics. Each operator validates its operands and knows how to
//! evaluate itself under every engine.

mod addition;
mod advantage;
mod attack_roll;
mod comparison;
mod subtraction;

pub use addition::Addition;
pub use advantage::{Advantage, AdvantageMode, DEFAULT_ATTEMPTS};
pub use attack_roll::AttackRoll;
pub use comparison::{Comparison, ComparisonMode};
pub use subtraction::Subtraction;

use crate::combination::Combination;
use crate::distribution::Distribution;
use crate::eval::{CombinationEngine, ConvolutionEngine, EvalError, RollEngine, Roller};
use crate::parse::ast::DiceAst;
use crate::registry::{RegistryBuilder, RegistryError};
use std::fmt;
use std::ops::RangeInclusive;

type EResult<T> = Result<T, EvalError>;

#[enum_dispatch::enum_dispatch]
pub trait Operate {
    /// Name the operator is registered and printed under.
    fn symbol(&self) -> &'static str;

    /// Checks operand shape. Engines call this before any evaluation.
    fn validate(&self, operands: &[DiceAst]) -> EResult<()>;

    fn roll<R: Roller>(
        &self,
        engine: &mut RollEngine<R>,
        operands: &[DiceAst],
    ) -> EResult<Combination>;

    fn distribution(
        &self,
        engine: &mut ConvolutionEngine,
        operands: &[DiceAst],
    ) -> EResult<Distribution>;

    fn combinations(
        &self,
        engine: &mut CombinationEngine,
        operands: &[DiceAst],
    ) -> EResult<Vec<Combination>>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[enum_dispatch::enum_dispatch(Operate)]
pub enum DiceOperator {
    Addition(Addition),
    Subtraction(Subtraction),
    Comparison(Comparison),
    Advantage(Advantage),
    AttackRoll(AttackRoll),
}

impl fmt::Display for DiceOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The fixed start-up registration pass for the built-in operators.
pub fn register_builtins(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    builder
        .register_all(addition::entries())?
        .register_all(subtraction::entries())?
        .register_all(comparison::entries())?
        .register_all(advantage::entries())?
        .register_all(attack_roll::entries())?;
    Ok(())
}

fn check_operand_count(
    operator: &'static str,
    operands: &[DiceAst],
    expected: RangeInclusive<usize>,
) -> EResult<()> {
    if expected.contains(&operands.len()) {
        return Ok(());
    }
    let reason = match (*expected.start(), *expected.end()) {
        (lo, hi) if lo == hi => format!("expected {} operands, found {}", lo, operands.len()),
        (lo, usize::MAX) => format!("expected at least {} operands, found {}", lo, operands.len()),
        (lo, hi) => format!("expected {} to {} operands, found {}", lo, hi, operands.len()),
    };
    Err(EvalError::invalid_operands(operator, reason))
}
