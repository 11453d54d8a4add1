use super::{EResult, EvalError, DICE};
use crate::combination::{Combination, DieRoll};
use crate::common::Int;
use crate::ops::Operate;
use crate::parse::{
    ast::{Dice, DiceAst, Operation},
    visit::AstVisitor,
};

pub const DEFAULT_MAX_COMBINATIONS: usize = 10_000_000;

/// Enumerates every universe of die faces an expression can see, in
/// odometer order.
#[derive(Debug)]
pub struct CombinationEngine {
    limit: usize,
}

impl Default for CombinationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COMBINATIONS)
    }
}

impl CombinationEngine {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn eval(&mut self, ast: &DiceAst) -> EResult<Vec<Combination>> {
        let ret = self.visit(ast)?;
        log::debug!("enumerated {} combinations", ret.len());
        Ok(ret)
    }

    /// Fails unless `count` combinations fit under the limit. `None` stands
    /// for a count that overflowed while being computed.
    pub(crate) fn check_size(&self, count: Option<usize>) -> EResult<usize> {
        match count {
            Some(n) if n <= self.limit => Ok(n),
            _ => {
                log::warn!("enumeration rejected: more than {} combinations", self.limit);
                Err(EvalError::EnumerationExplosion { limit: self.limit })
            }
        }
    }

    /// Cartesian product with `left` varying slowest. Totals are combined
    /// with `combine`, roll records concatenated left then right.
    pub(crate) fn product(
        &self,
        left: &[Combination],
        right: &[Combination],
        combine: impl Fn(Int, Int) -> EResult<Int>,
    ) -> EResult<Vec<Combination>> {
        let n = self.check_size(left.len().checked_mul(right.len()))?;
        let mut ret = Vec::with_capacity(n);
        for l in left {
            for r in right {
                ret.push(l.join(r, combine(l.total, r.total)?));
            }
        }
        Ok(ret)
    }
}

impl AstVisitor for CombinationEngine {
    type Output = EResult<Vec<Combination>>;

    fn visit_constant(&mut self, value: Int) -> Self::Output {
        Ok(vec![Combination::constant(value)])
    }

    fn visit_dice(&mut self, dice: &Dice) -> Self::Output {
        if dice.count <= 0 {
            return Ok(vec![Combination::constant(0)]);
        }
        if dice.sides <= 0 {
            return Err(EvalError::InvalidDice {
                count: dice.count,
                sides: dice.sides,
            });
        }
        let count = u32::try_from(dice.count).ok();
        let sides = usize::try_from(dice.sides).ok();
        self.check_size(count.zip(sides).and_then(|(c, s)| s.checked_pow(c)))?;

        let mut ret = vec![Combination::default()];
        for _ in 0..dice.count {
            let mut next = Vec::with_capacity(ret.len() * dice.sides as usize);
            for c in &ret {
                for face in 1..=dice.sides {
                    let mut rolls = c.rolls.clone();
                    rolls.push(DieRoll::new(dice.sides, face));
                    let total = c
                        .total
                        .checked_add(face)
                        .ok_or(EvalError::Overflow { operator: DICE })?;
                    next.push(Combination::new(total, rolls));
                }
            }
            ret = next;
        }
        Ok(ret)
    }

    fn visit_operation(&mut self, op: &Operation) -> Self::Output {
        op.operator.validate(&op.operands)?;
        op.operator.combinations(self, &op.operands)
    }
}
