use super::{check_operand_count, EResult, Operate};
use crate::combination::Combination;
use crate::common::Int;
use crate::distribution::{Distribution, Provenance};
use crate::eval::{CombinationEngine, ConvolutionEngine, EvalError, RollEngine, Roller};
use crate::parse::{ast::DiceAst, visit::AstVisitor};
use crate::registry::{Arity, RegistryEntry};
use std::cmp::Ordering;

/// Number of attempts when no count is given.
pub const DEFAULT_ATTEMPTS: Int = 2;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AdvantageMode {
    /// Keep the highest attempt.
    Advantage,
    /// Keep the lowest attempt.
    Disadvantage,
}

impl AdvantageMode {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Advantage => "ADV",
            Self::Disadvantage => "DIS",
        }
    }

    /// Whether `candidate` replaces the current pick. Ties keep the earlier
    /// attempt.
    fn prefers(&self, candidate: Int, current: Int) -> bool {
        let wanted = match self {
            Self::Advantage => Ordering::Greater,
            Self::Disadvantage => Ordering::Less,
        };
        candidate.cmp(&current) == wanted
    }
}

/// Evaluates its first operand several independent times and keeps the best
/// (or worst) attempt. An optional second operand overrides the number of
/// attempts and must be a positive constant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Advantage {
    pub mode: AdvantageMode,
    pub attempts: Int,
}

impl Advantage {
    pub fn new(mode: AdvantageMode, attempts: Int) -> Self {
        Self { mode, attempts }
    }

    pub fn advantage() -> Self {
        Self::new(AdvantageMode::Advantage, DEFAULT_ATTEMPTS)
    }

    pub fn disadvantage() -> Self {
        Self::new(AdvantageMode::Disadvantage, DEFAULT_ATTEMPTS)
    }

    /// Attempt count for a validated operand list.
    fn attempts(&self, operands: &[DiceAst]) -> Int {
        operands
            .get(1)
            .and_then(DiceAst::as_constant)
            .unwrap_or(self.attempts)
    }

    /// Index of the attempt this operator keeps.
    fn pick(&self, totals: impl IntoIterator<Item = Int>) -> Option<usize> {
        let mut best: Option<(usize, Int)> = None;
        for (i, total) in totals.into_iter().enumerate() {
            match best {
                Some((_, current)) if !self.mode.prefers(total, current) => {}
                _ => best = Some((i, total)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Order statistic of `n` independent draws from `base`.
    ///
    /// For the maximum, `P(max = k) = F(k)^n - F(k-)^n` is accumulated in one
    /// ascending pass over the cumulative mass; the minimum uses the survival
    /// function in a descending pass. The mass of each value is shared among
    /// its provenance tags in proportion to their weight in `base`, which is
    /// the law of the tag carried by the earliest attempt reaching that value.
    fn order_statistic(&self, base: &Distribution, n: Int) -> Distribution {
        let base = base.clone().normalized();
        let exp = i32::try_from(n).unwrap_or(i32::MAX);

        let entries: Vec<(Int, Provenance, f64)> = match self.mode {
            AdvantageMode::Advantage => base.entries().collect(),
            AdvantageMode::Disadvantage => base.entries().rev().collect(),
        };

        let mut ret = Distribution::new();
        let mut below = 0.0f64;
        let mut i = 0;
        while i < entries.len() {
            let value = entries[i].0;
            let group_len = entries[i..]
                .iter()
                .take_while(|(v, _, _)| *v == value)
                .count();
            let group = &entries[i..i + group_len];
            let mass: f64 = group.iter().map(|(_, _, p)| p).sum();
            let reached = (below + mass).min(1.0);
            let p_value = reached.powi(exp) - below.powi(exp);
            for &(v, tag, p) in group {
                ret.add_tagged_outcome(v, tag, p_value * p / mass);
            }
            below = reached;
            i += group_len;
        }
        ret
    }
}

pub(super) fn entries() -> Vec<RegistryEntry> {
    vec![
        RegistryEntry::new("ADV", Arity::Function, || Advantage::advantage().into()),
        RegistryEntry::new("DIS", Arity::Function, || Advantage::disadvantage().into()),
    ]
}

impl Operate for Advantage {
    fn symbol(&self) -> &'static str {
        self.mode.symbol()
    }

    fn validate(&self, operands: &[DiceAst]) -> EResult<()> {
        check_operand_count(self.symbol(), operands, 1..=2)?;
        let attempts = match operands.get(1) {
            None => self.attempts,
            Some(x) => x.as_constant().ok_or_else(|| {
                EvalError::invalid_operands(self.symbol(), "attempt count must be a constant")
            })?,
        };
        if attempts < 1 {
            return Err(EvalError::invalid_operands(
                self.symbol(),
                format!("attempt count must be at least 1, found {}", attempts),
            ));
        }
        Ok(())
    }

    fn roll<R: Roller>(
        &self,
        engine: &mut RollEngine<R>,
        operands: &[DiceAst],
    ) -> EResult<Combination> {
        let mut kept: Option<Combination> = None;
        for _ in 0..self.attempts(operands) {
            let attempt = engine.visit(&operands[0])?;
            match &kept {
                Some(current) if !self.mode.prefers(attempt.total, current.total) => {}
                _ => kept = Some(attempt),
            }
        }
        kept.ok_or_else(|| EvalError::invalid_operands(self.symbol(), "no attempts made"))
    }

    fn distribution(
        &self,
        engine: &mut ConvolutionEngine,
        operands: &[DiceAst],
    ) -> EResult<Distribution> {
        let base = engine.visit(&operands[0])?;
        let n = self.attempts(operands);
        if n == 1 || base.is_empty() {
            return Ok(base);
        }
        Ok(self.order_statistic(&base, n))
    }

    fn combinations(
        &self,
        engine: &mut CombinationEngine,
        operands: &[DiceAst],
    ) -> EResult<Vec<Combination>> {
        let base = engine.visit(&operands[0])?;
        let n = self.attempts(operands);
        if n == 1 || base.len() <= 1 {
            return Ok(base);
        }
        let n = usize::try_from(n).unwrap_or(usize::MAX);
        let total = engine.check_size(
            u32::try_from(n)
                .ok()
                .and_then(|exp| base.len().checked_pow(exp)),
        )?;

        // odometer over attempt positions, position 0 turning fastest
        let mut ret = Vec::with_capacity(total);
        let mut digits = vec![0usize; n];
        for _ in 0..total {
            let chosen = self
                .pick(digits.iter().map(|&d| base[d].total))
                .map_or(0, |i| digits[i]);
            ret.push(base[chosen].clone());

            for d in digits.iter_mut() {
                *d += 1;
                if *d < base.len() {
                    break;
                }
                *d = 0;
            }
        }
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::DieRoll;
    use crate::common::test_utils::*;

    fn distribution(ast: DiceAst) -> Distribution {
        ConvolutionEngine::new().eval(&ast).unwrap()
    }

    fn check_distribution(ast: DiceAst, expected: &[(Int, f64)]) {
        let actual = distribution(ast);
        let expected = Distribution::from_pairs(expected.iter().copied());
        assert!(actual.approx_eq(&expected, 1e-9), "{} != {}", actual, expected);
        assert_eq!(actual.len(), expected.len());
    }

    fn roll(ast: DiceAst, script: &[Int]) -> Combination {
        RollEngine::new_unbounded(ScriptedRoller::new(script))
            .eval(&ast)
            .unwrap()
    }

    #[test]
    fn test_roll_keeps_best_attempt() {
        let ret = roll(adv_n(dice(1, 20), 3), &[2, 13, 3]);
        assert_eq!(ret.total, 13);
        assert_eq!(ret.rolls, vec![DieRoll::new(20, 13)]);
    }

    #[test]
    fn test_roll_keeps_worst_attempt() {
        let ret = roll(dis_n(dice(1, 20), 3), &[3, 13, 2]);
        assert_eq!(ret.total, 2);
        assert_eq!(ret.rolls, vec![DieRoll::new(20, 2)]);
    }

    #[test]
    fn test_roll_tie_keeps_first_attempt() {
        let ret = roll(adv(dice(2, 6)), &[5, 1, 3, 3]);
        assert_eq!(ret.total, 6);
        assert_eq!(ret.rolls, vec![DieRoll::new(6, 5), DieRoll::new(6, 1)]);
    }

    #[test]
    fn test_roll_default_attempts() {
        let mut engine = RollEngine::new_unbounded(ScriptedRoller::new([4, 9]));
        assert_eq!(engine.eval(&adv(dice(1, 20))).unwrap().total, 9);
        assert_eq!(engine.rolls(), 2);
    }

    #[test]
    fn test_distribution_of_1d3() {
        check_distribution(adv(dice(1, 3)), &[(1, 1.0 / 9.0), (2, 3.0 / 9.0), (3, 5.0 / 9.0)]);
        check_distribution(dis(dice(1, 3)), &[(1, 5.0 / 9.0), (2, 3.0 / 9.0), (3, 1.0 / 9.0)]);
    }

    #[test]
    fn test_distribution_of_2d2() {
        check_distribution(
            adv(dice(2, 2)),
            &[(2, 1.0 / 16.0), (3, 8.0 / 16.0), (4, 7.0 / 16.0)],
        );
        check_distribution(
            dis(dice(2, 2)),
            &[(2, 7.0 / 16.0), (3, 8.0 / 16.0), (4, 1.0 / 16.0)],
        );
    }

    #[test]
    fn test_distribution_single_attempt_is_identity() {
        let base = distribution(dice(2, 6));
        assert!(distribution(adv_n(dice(2, 6), 1)).approx_eq(&base, 1e-12));
        assert!(distribution(dis_n(dice(2, 6), 1)).approx_eq(&base, 1e-12));
    }

    #[test]
    fn test_distribution_more_attempts() {
        // P(max of 3d6 singles = 6) = 1 - (5/6)^3
        let d = distribution(adv_n(dice(1, 6), 3));
        assert_close!(d.probability(6), 1.0 - (5.0f64 / 6.0).powi(3));
        assert_close!(d.probability(1), (1.0f64 / 6.0).powi(3));
        assert_close!(d.total_mass(), 1.0);
    }

    #[test]
    fn test_combinations_odometer() {
        let ret = CombinationEngine::default().eval(&adv(dice(1, 6))).unwrap();
        assert_eq!(ret.len(), 36);
        // attempt 0 turns fastest: (1,1), (2,1), ..., (6,1), (1,2), ...
        let totals: Vec<_> = ret.iter().take(8).map(|c| c.total).collect();
        assert_eq!(totals, vec![1, 2, 3, 4, 5, 6, 2, 2]);
        assert!(ret.iter().all(|c| c.rolls.len() == 1));
        assert_eq!(ret[35].total, 6);
    }

    #[test]
    fn test_combinations_disadvantage() {
        let ret = CombinationEngine::default().eval(&dis(dice(1, 3))).unwrap();
        let totals: Vec<_> = ret.iter().map(|c| c.total).collect();
        assert_eq!(totals, vec![1, 1, 1, 1, 2, 2, 1, 2, 3]);
    }

    #[test]
    fn test_combinations_keep_chosen_rolls() {
        let ret = CombinationEngine::default().eval(&adv(dice(2, 2))).unwrap();
        assert_eq!(ret.len(), 16);
        // attempt 0 = (2,1), attempt 1 = (1,2): tie on 3, the first attempt wins
        assert_eq!(ret[6].total, 3);
        assert_eq!(ret[6].rolls, vec![DieRoll::new(2, 2), DieRoll::new(2, 1)]);
        // and the other way round
        assert_eq!(ret[9].rolls, vec![DieRoll::new(2, 1), DieRoll::new(2, 2)]);
        let d = Distribution::from_enumeration(&ret);
        assert_close!(d.probability(4), 7.0 / 16.0);
    }

    #[test]
    fn test_combinations_single_attempt_passthrough() {
        let base = CombinationEngine::default().eval(&dice(2, 3)).unwrap();
        let ret = CombinationEngine::default()
            .eval(&adv_n(dice(2, 3), 1))
            .unwrap();
        assert_eq!(ret, base);
    }

    #[test]
    fn test_combinations_explosion() {
        let err = CombinationEngine::default()
            .eval(&adv_n(dice(2, 20), 6))
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::EnumerationExplosion {
                limit: crate::eval::DEFAULT_MAX_COMBINATIONS
            }
        );
    }

    #[test]
    fn test_err_attempt_count() {
        let non_constant = DiceAst::operation(
            Advantage::advantage().into(),
            vec![dice(1, 20), dice(1, 4)],
        );
        for ast in [non_constant, adv_n(dice(1, 20), 0), dis_n(dice(1, 20), -1)] {
            assert!(matches!(
                ConvolutionEngine::new().eval(&ast),
                Err(EvalError::InvalidOperands { .. })
            ));
            assert!(matches!(
                CombinationEngine::default().eval(&ast),
                Err(EvalError::InvalidOperands { .. })
            ));
            assert!(matches!(
                RollEngine::new_unbounded(ScriptedRoller::new([1])).eval(&ast),
                Err(EvalError::InvalidOperands { .. })
            ));
        }
    }

    #[test]
    fn test_err_operand_count() {
        let ast = DiceAst::operation(Advantage::advantage().into(), vec![]);
        assert!(matches!(
            ConvolutionEngine::new().eval(&ast),
            Err(EvalError::InvalidOperands { operator: "ADV", .. })
        ));
        let ast = DiceAst::operation(Advantage::new(AdvantageMode::Advantage, 0).into(), vec![int(1)]);
        assert!(ConvolutionEngine::new().eval(&ast).is_err());
    }
}
