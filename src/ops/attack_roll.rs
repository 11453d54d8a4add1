use super::{check_operand_count, EResult, Operate};
use crate::combination::Combination;
use crate::common::{Int, CRITICAL_HIT_THRESHOLD, CRITICAL_MISS_THRESHOLD};
use crate::distribution::{merge_provenance, Distribution};
use crate::eval::{CombinationEngine, ConvolutionEngine, EvalError, RollEngine, Roller};
use crate::parse::{ast::DiceAst, visit::AstVisitor, visit::CriticalDieCounter};
use crate::registry::{Arity, RegistryEntry};

/// `AttackRoll(attack, target)`: 1 when the attack meets the target, 0
/// otherwise. A natural 20 on the attacker's d20 always hits and a natural 1
/// always misses.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttackRoll;

const SYMBOL: &str = "AttackRoll";

pub(super) fn entries() -> Vec<RegistryEntry> {
    vec![RegistryEntry::new(SYMBOL, Arity::Function, || AttackRoll.into())]
}

fn resolve(face: Int, attack: Int, target: Int) -> Int {
    let hit = if face >= CRITICAL_HIT_THRESHOLD {
        true
    } else if face <= CRITICAL_MISS_THRESHOLD {
        false
    } else {
        attack >= target
    };
    hit as Int
}

fn missing_d20() -> EvalError {
    EvalError::MissingD20 { operator: SYMBOL }
}

impl Operate for AttackRoll {
    fn symbol(&self) -> &'static str {
        SYMBOL
    }

    fn validate(&self, operands: &[DiceAst]) -> EResult<()> {
        check_operand_count(SYMBOL, operands, 2..=2)?;
        match CriticalDieCounter::count(&operands[0]) {
            1 => Ok(()),
            n => Err(EvalError::invalid_operands(
                SYMBOL,
                format!("the attack must roll exactly one d20, found {}", n),
            )),
        }
    }

    fn roll<R: Roller>(
        &self,
        engine: &mut RollEngine<R>,
        operands: &[DiceAst],
    ) -> EResult<Combination> {
        let attack = engine.visit(&operands[0])?;
        let target = engine.visit(&operands[1])?;
        let face = attack.critical_face().ok_or_else(missing_d20)?;
        Ok(attack.join(&target, resolve(face, attack.total, target.total)))
    }

    fn distribution(
        &self,
        engine: &mut ConvolutionEngine,
        operands: &[DiceAst],
    ) -> EResult<Distribution> {
        let attack = engine.visit(&operands[0])?;
        let target = engine.visit(&operands[1])?;
        if attack.is_empty() || target.is_empty() {
            return Err(EvalError::EmptyDistribution { operator: SYMBOL });
        }

        let mut ret = Distribution::new();
        for (v1, t1, p1) in attack.entries() {
            let face = t1.ok_or_else(missing_d20)?;
            for (v2, t2, p2) in target.entries() {
                ret.add_tagged_outcome(resolve(face, v1, v2), merge_provenance(t1, t2), p1 * p2);
            }
        }
        Ok(ret)
    }

    fn combinations(
        &self,
        engine: &mut CombinationEngine,
        operands: &[DiceAst],
    ) -> EResult<Vec<Combination>> {
        let attack = engine.visit(&operands[0])?;
        let target = engine.visit(&operands[1])?;
        let n = engine.check_size(attack.len().checked_mul(target.len()))?;

        let mut ret = Vec::with_capacity(n);
        for a in &attack {
            let face = a.critical_face().ok_or_else(missing_d20)?;
            for t in &target {
                ret.push(a.join(t, resolve(face, a.total, t.total)));
            }
        }
        Ok(ret)
    }
}
