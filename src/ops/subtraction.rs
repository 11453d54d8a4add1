use super::addition::Fold;
use super::{EResult, Operate};
use crate::combination::Combination;
use crate::common::Int;
use crate::distribution::Distribution;
use crate::eval::{CombinationEngine, ConvolutionEngine, RollEngine, Roller};
use crate::parse::ast::DiceAst;
use crate::registry::{Arity, RegistryEntry};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Subtraction;

pub(super) fn entries() -> Vec<RegistryEntry> {
    vec![RegistryEntry::new("-", Arity::Binary, || Subtraction.into())]
}

fn sub(a: Int, b: Int) -> Option<Int> {
    a.checked_sub(b)
}

const FOLD: Fold = Fold {
    symbol: "-",
    combine: sub,
};

impl Operate for Subtraction {
    fn symbol(&self) -> &'static str {
        FOLD.symbol
    }

    fn validate(&self, operands: &[DiceAst]) -> EResult<()> {
        FOLD.validate(operands)
    }

    fn roll<R: Roller>(
        &self,
        engine: &mut RollEngine<R>,
        operands: &[DiceAst],
    ) -> EResult<Combination> {
        FOLD.roll(engine, operands)
    }

    fn distribution(
        &self,
        engine: &mut ConvolutionEngine,
        operands: &[DiceAst],
    ) -> EResult<Distribution> {
        FOLD.distribution(engine, operands)
    }

    fn combinations(
        &self,
        engine: &mut CombinationEngine,
        operands: &[DiceAst],
    ) -> EResult<Vec<Combination>> {
        FOLD.combinations(engine, operands)
    }
}
