//! Parsing and evaluation of tabletop dice notation such as
//! `ADV(2d10+4)-1d6` or `AttackRoll(1d20+5, 15)`.
//!
//! An expression can be sampled once, turned into its exact probability
//! distribution, or expanded into every combination of die faces.

pub mod combination;
pub mod common;
pub mod distribution;
mod error;
pub mod eval;
pub mod ops;
pub mod parse;
pub mod registry;

pub use combination::{Combination, DieRoll};
pub use distribution::Distribution;
pub use error::{Error, Result};
pub use eval::{EvalConfig, EvalError, Evaluation, Method, Roller};
pub use parse::{ast::DiceAst, ParseError};
pub use registry::{Arity, OperatorRegistry, RegistryError};

use parse::reconstruct::Reconstruct;

/// Parses and evaluates expressions against one operator registry and one
/// evaluation configuration.
#[derive(Debug, Clone)]
pub struct DiceCalculator {
    registry: OperatorRegistry,
    config: EvalConfig,
}

impl DiceCalculator {
    /// A calculator with the built-in operators and the default limits.
    pub fn new() -> Result<Self> {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Result<Self> {
        Ok(Self::with_registry(OperatorRegistry::standard()?, config))
    }

    pub fn with_registry(registry: OperatorRegistry, config: EvalConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn parse(&self, s: &str) -> Result<DiceAst> {
        Ok(parse::parse(s, &self.registry)?)
    }

    pub fn reconstruct(&self, ast: &DiceAst) -> String {
        Reconstruct::reconstruct(ast)
    }

    pub fn evaluate<R: Roller>(&self, ast: &DiceAst, method: Method, roller: R) -> Result<Evaluation> {
        Ok(eval::evaluate(ast, method, roller, &self.config)?)
    }

    /// Parses `s` and evaluates it in one go.
    pub fn eval_str<R: Roller>(&self, s: &str, method: Method, roller: R) -> Result<Evaluation> {
        let ast = self.parse(s)?;
        self.evaluate(&ast, method, roller)
    }
}

/// Samples `s` once with the thread-local generator.
pub fn roll(s: &str) -> Result<Combination> {
    let calc = DiceCalculator::new()?;
    let ast = calc.parse(s)?;
    let mut engine = eval::RollEngine::new(rand::thread_rng(), calc.config.max_rolls);
    Ok(engine.eval(&ast)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_parse_and_reconstruct() {
        let calc = DiceCalculator::new().unwrap();
        let ast = calc.parse("ADV(2d10+4)-1d6").unwrap();
        assert_eq!(calc.reconstruct(&ast), "ADV(2d10 + 4) - 1d6");
    }

    #[test]
    fn test_parse_failure_is_error() {
        let calc = DiceCalculator::new().unwrap();
        assert!(matches!(calc.parse("1d6 +"), Err(Error::Parse(_))));
        match calc.parse("NOPE(1)") {
            Err(Error::Parse(why)) => assert!(why.is_unknown_operator()),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_eval_str() {
        let calc = DiceCalculator::new().unwrap();
        let ret = calc
            .eval_str("ADV(2d10+4)+1d6", Method::Roll, ScriptedRoller::new([1, 2, 3, 4, 5]))
            .unwrap();
        assert_eq!(ret, Evaluation::Sample(Combination::new(
            16,
            vec![
                DieRoll::new(10, 3),
                DieRoll::new(10, 4),
                DieRoll::new(6, 5),
            ],
        )));

        let d = calc
            .eval_str("AttackRoll(1d20, 13)", Method::Convolution, ScriptedRoller::new([1]))
            .unwrap()
            .to_distribution();
        assert_close!(d.probability(1), 8.0 / 20.0);
    }

    #[test]
    fn test_validation_error_surfaces() {
        let calc = DiceCalculator::new().unwrap();
        let err = calc
            .eval_str("AttackRoll(2d20, 13)", Method::Combination, StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, Error::Eval(EvalError::InvalidOperands { .. })));
    }

    #[test]
    fn test_overflow_surfaces() {
        let calc = DiceCalculator::new().unwrap();
        let err = calc
            .eval_str("9223372036854775807 + 1", Method::Roll, StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err, Error::Eval(EvalError::Overflow { operator: "+" }));

        let err = calc
            .eval_str("9223372036854775807 + 1d6", Method::Auto, StdRng::seed_from_u64(1))
            .unwrap_err();
        let overflow = EvalError::Overflow { operator: "+" };
        assert_eq!(
            err,
            Error::Eval(EvalError::AllMethodsFailed(vec![
                (Method::Convolution, overflow.clone()),
                (Method::Combination, overflow.clone()),
                (Method::Roll, overflow),
            ]))
        );

        let ret = calc
            .eval_str("-9223372036854775807 - 1", Method::Auto, StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(ret.to_distribution().values().collect::<Vec<_>>(), vec![i64::MIN]);
    }

    #[test]
    fn test_config_limits_apply() {
        let calc = DiceCalculator::with_config(EvalConfig {
            max_combinations: 10,
            max_rolls: Some(3),
            ..EvalConfig::default()
        })
        .unwrap();
        assert_eq!(
            calc.eval_str("2d6", Method::Combination, StdRng::seed_from_u64(1))
                .unwrap_err(),
            Error::Eval(EvalError::EnumerationExplosion { limit: 10 })
        );
        assert_eq!(
            calc.eval_str("4d6", Method::Roll, StdRng::seed_from_u64(1))
                .unwrap_err(),
            Error::Eval(EvalError::TooManyRolls { limit: 3 })
        );
    }

    #[test]
    fn test_roll() {
        for _ in 0..50 {
            let ret = roll("1d20 + 5").unwrap();
            assert!((6..=25).contains(&ret.total));
        }
        assert!(roll("1d20 +").is_err());
    }
}
