use super::{roller::Roller, EResult, EvalError, DICE};
use crate::combination::{Combination, DieRoll};
use crate::common::Int;
use crate::ops::Operate;
use crate::parse::{
    ast::{Dice, DiceAst, Operation},
    visit::AstVisitor,
};

/// Draws a single random sample of an expression.
///
/// Every node evaluates to a [`Combination`]: the sampled total together
/// with the die faces that produced it, in draw order.
pub struct RollEngine<R> {
    roller: R,
    max_rolls: Option<usize>,
    rolls: usize,
}

impl<R: Roller> RollEngine<R> {
    pub fn new(roller: R, max_rolls: Option<usize>) -> Self {
        Self {
            roller,
            max_rolls,
            rolls: 0,
        }
    }

    pub fn new_bounded(roller: R, max_rolls: usize) -> Self {
        Self::new(roller, Some(max_rolls))
    }

    pub fn new_unbounded(roller: R) -> Self {
        Self::new(roller, None)
    }

    /// Samples `ast` once. The draw budget starts over on every call.
    pub fn eval(&mut self, ast: &DiceAst) -> EResult<Combination> {
        self.rolls = 0;
        let ret = self.visit(ast)?;
        log::debug!("rolled {} using {} dice", ret, self.rolls);
        Ok(ret)
    }

    /// Number of elementary draws made since the last [`eval`](Self::eval).
    pub fn rolls(&self) -> usize {
        self.rolls
    }

    pub fn into_roller(self) -> R {
        self.roller
    }

    fn count_rolls(&mut self, n: usize) -> EResult<()> {
        self.rolls = self.rolls.saturating_add(n);
        match self.max_rolls {
            Some(limit) if self.rolls > limit => Err(EvalError::TooManyRolls { limit }),
            _ => Ok(()),
        }
    }

    pub(crate) fn roll_die(&mut self, sides: Int) -> DieRoll {
        let value = self.roller.next_int(1, sides);
        log::trace!("d{} -> {}", sides, value);
        DieRoll::new(sides, value)
    }
}

impl<R: Roller> AstVisitor for RollEngine<R> {
    type Output = EResult<Combination>;

    fn visit_constant(&mut self, value: Int) -> Self::Output {
        Ok(Combination::constant(value))
    }

    fn visit_dice(&mut self, dice: &Dice) -> Self::Output {
        if dice.count <= 0 {
            return Ok(Combination::constant(0));
        }
        if dice.sides <= 0 {
            return Err(EvalError::InvalidDice {
                count: dice.count,
                sides: dice.sides,
            });
        }
        self.count_rolls(usize::try_from(dice.count).unwrap_or(usize::MAX))?;

        let rolls: Vec<_> = (0..dice.count).map(|_| self.roll_die(dice.sides)).collect();
        let total = rolls
            .iter()
            .try_fold(0, |acc: Int, x| acc.checked_add(x.value))
            .ok_or(EvalError::Overflow { operator: DICE })?;
        Ok(Combination::new(total, rolls))
    }

    fn visit_operation(&mut self, op: &Operation) -> Self::Output {
        op.operator.validate(&op.operands)?;
        op.operator.roll(self, &op.operands)
    }
}
