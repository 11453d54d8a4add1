use super::{check_operand_count, EResult, EvalError, Operate};
use crate::combination::Combination;
use crate::common::Int;
use crate::distribution::Distribution;
use crate::eval::{CombinationEngine, ConvolutionEngine, RollEngine, Roller};
use crate::parse::{ast::DiceAst, visit::AstVisitor};
use crate::registry::{Arity, RegistryEntry};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Addition;

pub(super) fn entries() -> Vec<RegistryEntry> {
    vec![RegistryEntry::new("+", Arity::Binary, || Addition.into())]
}

/// A left fold of operands under a checked integer combinator. Shared by the
/// additive operators. `combine` returns `None` on overflow.
pub(super) struct Fold {
    pub symbol: &'static str,
    pub combine: fn(Int, Int) -> Option<Int>,
}

impl Fold {
    pub fn validate(&self, operands: &[DiceAst]) -> EResult<()> {
        check_operand_count(self.symbol, operands, 1..=usize::MAX)
    }

    pub fn roll<R: Roller>(
        &self,
        engine: &mut RollEngine<R>,
        operands: &[DiceAst],
    ) -> EResult<Combination> {
        let (first, rest) = self.split(operands)?;
        let mut acc = engine.visit(first)?;
        for x in rest {
            let next = engine.visit(x)?;
            let total = (self.combine)(acc.total, next.total).ok_or_else(|| self.overflow())?;
            acc = acc.join(&next, total);
        }
        Ok(acc)
    }

    pub fn distribution(
        &self,
        engine: &mut ConvolutionEngine,
        operands: &[DiceAst],
    ) -> EResult<Distribution> {
        let (first, rest) = self.split(operands)?;
        let mut acc = engine.visit(first)?;
        for x in rest {
            let next = engine.visit(x)?;
            acc = engine.product(&acc, &next, |a, b| {
                (self.combine)(a, b).ok_or_else(|| self.overflow())
            })?;
        }
        Ok(acc)
    }

    pub fn combinations(
        &self,
        engine: &mut CombinationEngine,
        operands: &[DiceAst],
    ) -> EResult<Vec<Combination>> {
        let (first, rest) = self.split(operands)?;
        let mut acc = engine.visit(first)?;
        for x in rest {
            let next = engine.visit(x)?;
            acc = engine.product(&acc, &next, |a, b| {
                (self.combine)(a, b).ok_or_else(|| self.overflow())
            })?;
        }
        Ok(acc)
    }

    fn overflow(&self) -> EvalError {
        EvalError::Overflow {
            operator: self.symbol,
        }
    }

    fn split<'a>(&self, operands: &'a [DiceAst]) -> EResult<(&'a DiceAst, &'a [DiceAst])> {
        operands
            .split_first()
            .ok_or_else(|| EvalError::invalid_operands(self.symbol, "no operands"))
    }
}

fn add(a: Int, b: Int) -> Option<Int> {
    a.checked_add(b)
}

const FOLD: Fold = Fold {
    symbol: "+",
    combine: add,
};

impl Operate for Addition {
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
