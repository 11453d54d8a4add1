mod combination;
mod convolution;
mod error;
mod roll;
pub mod roller;

pub use combination::{CombinationEngine, DEFAULT_MAX_COMBINATIONS};
pub use convolution::{ConvolutionEngine, DEFAULT_MAX_CONVOLUTION_TERMS};
pub use error::EvalError;
pub use roll::RollEngine;
pub use roller::Roller;

use crate::combination::Combination;
use crate::distribution::Distribution;
use crate::parse::ast::DiceAst;
use std::fmt;

pub(crate) type EResult<T> = Result<T, EvalError>;

pub const DEFAULT_MAX_ROLLS: usize = 100_000;

/// Name reported when summing the faces of a dice literal overflows.
const DICE: &str = "dice";

/// Which evaluation semantics to apply.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    /// Try convolution, then enumeration, then sampling.
    Auto,
    Convolution,
    Combination,
    Roll,
}

impl Method {
    /// Order in which [`Method::Auto`] tries the concrete methods.
    pub const FALLBACK_ORDER: [Method; 3] = [Method::Convolution, Method::Combination, Method::Roll];
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Convolution => "convolution",
            Self::Combination => "combination",
            Self::Roll => "roll",
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvalConfig {
    /// Largest enumeration the combination engine will build.
    pub max_combinations: usize,
    /// Most elementary draws one sample may make; `None` is unbounded.
    pub max_rolls: Option<usize>,
    /// Largest single convolution step the exact engine will perform.
    pub max_convolution_terms: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            max_rolls: Some(DEFAULT_MAX_ROLLS),
            max_convolution_terms: DEFAULT_MAX_CONVOLUTION_TERMS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Sample(Combination),
    Distribution(Distribution),
    Combinations(Vec<Combination>),
}

impl Evaluation {
    /// The outcome law this result describes. A sample is a point mass and
    /// an enumeration weighs every universe equally.
    pub fn to_distribution(&self) -> Distribution {
        match self {
            Self::Sample(x) => Distribution::certain(x.total),
            Self::Distribution(x) => x.clone(),
            Self::Combinations(x) => Distribution::from_enumeration(x),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::Sample(_) => Method::Roll,
            Self::Distribution(_) => Method::Convolution,
            Self::Combinations(_) => Method::Combination,
        }
    }
}

pub fn evaluate<R: Roller>(
    ast: &DiceAst,
    method: Method,
    roller: R,
    config: &EvalConfig,
) -> Result<Evaluation, EvalError> {
    match method {
        Method::Auto => evaluate_auto(ast, roller, config),
        Method::Roll => RollEngine::new(roller, config.max_rolls)
            .eval(ast)
            .map(Evaluation::Sample),
        exact => evaluate_exact(ast, exact, config),
    }
}

fn evaluate_exact(ast: &DiceAst, method: Method, config: &EvalConfig) -> EResult<Evaluation> {
    match method {
        Method::Combination => CombinationEngine::new(config.max_combinations)
            .eval(ast)
            .map(Evaluation::Combinations),
        _ => ConvolutionEngine::with_limit(config.max_convolution_terms)
            .eval(ast)
            .map(Evaluation::Distribution),
    }
}

fn evaluate_auto<R: Roller>(ast: &DiceAst, roller: R, config: &EvalConfig) -> EResult<Evaluation> {
    let mut failures = Vec::new();
    let mut roller = Some(roller);
    for method in Method::FALLBACK_ORDER {
        let result = match (method, roller.take()) {
            (Method::Roll, Some(r)) => evaluate(ast, method, r, config),
            (_, r) => {
                roller = r;
                evaluate_exact(ast, method, config)
            }
        };
        match result {
            Ok(x) => return Ok(x),
            Err(why) if why.is_fallback_signal() => {
                log::debug!("{} evaluation failed, trying the next method: {}", method, why);
                failures.push((method, why));
            }
            Err(why) => return Err(why),
        }
    }
    Err(EvalError::AllMethodsFailed(failures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;

    /// Convolution and normalized enumeration must describe the same law,
    /// including which critical face sits behind every total.
    fn check_agreement(ast: DiceAst) {
        let conv = ConvolutionEngine::new().eval(&ast).unwrap();
        let combos = CombinationEngine::default().eval(&ast).unwrap();
        let enumerated = Distribution::from_enumeration(&combos).normalized();
        assert!(
            conv.approx_eq(&enumerated, 1e-9),
            "{} != {}",
            conv,
            enumerated
        );
        let joint: Vec<_> = conv.entries().collect();
        let joint_enum: Vec<_> = enumerated.entries().collect();
        assert_eq!(joint.len(), joint_enum.len());
        for ((v1, t1, p1), (v2, t2, p2)) in joint.into_iter().zip(joint_enum) {
            assert_eq!((v1, t1), (v2, t2));
            assert_close!(p1, p2);
        }
    }

    #[test]
    fn test_engines_agree() {
        check_agreement(dice(3, 4));
        check_agreement(sub(vec![dice(2, 6), dice(1, 4), int(2)]));
        check_agreement(adv(dice(2, 4)));
        check_agreement(dis_n(add(vec![dice(1, 6), int(1)]), 3));
        check_agreement(cmp(ComparisonMode::GreaterEqual, dice(2, 6), dice(1, 8)));
        check_agreement(add(vec![dice(1, 20), dice(1, 6)]));
        check_agreement(adv(add(vec![dice(1, 20), int(2)])));
        check_agreement(attack(dice(1, 20), int(13)));
        check_agreement(attack(adv(add(vec![dice(1, 20), int(2)])), add(vec![dice(1, 6), int(10)])));
        check_agreement(attack(dis(dice(1, 20)), dice(1, 20)));
    }

    #[test]
    fn test_evaluate_each_method() {
        let ast = add(vec![dice(1, 6), int(1)]);
        let config = EvalConfig::default();

        let conv = evaluate(&ast, Method::Convolution, ScriptedRoller::new([1]), &config).unwrap();
        assert_eq!(conv.method(), Method::Convolution);
        assert_close!(conv.to_distribution().probability(7), 1.0 / 6.0);

        let comb = evaluate(&ast, Method::Combination, ScriptedRoller::new([1]), &config).unwrap();
        assert!(matches!(&comb, Evaluation::Combinations(x) if x.len() == 6));

        let roll = evaluate(&ast, Method::Roll, ScriptedRoller::new([4]), &config).unwrap();
        assert_eq!(roll, Evaluation::Sample(Combination::new(5, vec![crate::combination::DieRoll::new(6, 4)])));
    }

    #[test]
    fn test_auto_prefers_convolution() {
        let ast = dice(2, 6);
        let ret = evaluate(&ast, Method::Auto, ScriptedRoller::new([1]), &EvalConfig::default()).unwrap();
        assert_eq!(ret.method(), Method::Convolution);
    }

    #[test]
    fn test_auto_falls_back_in_order() {
        let config = EvalConfig {
            max_convolution_terms: 10,
            ..EvalConfig::default()
        };
        let ast = add(vec![dice(1, 6), dice(1, 6)]);
        let ret = evaluate(&ast, Method::Auto, ScriptedRoller::new([1]), &config).unwrap();
        assert!(matches!(&ret, Evaluation::Combinations(x) if x.len() == 36));

        let huge = dice(1, 4_000_000_000);
        let ret = evaluate(&huge, Method::Auto, ScriptedRoller::new([7]), &EvalConfig::default())
            .unwrap();
        assert_eq!(ret.method(), Method::Roll);
        assert_eq!(ret.to_distribution().values().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_auto_reports_every_failure() {
        let ast = attack(dice(1, 6), int(3));
        let err = evaluate(&ast, Method::Auto, ScriptedRoller::new([1]), &EvalConfig::default())
            .unwrap_err();
        let failures = match err {
            EvalError::AllMethodsFailed(x) => x,
            other => panic!("unexpected error {:?}", other),
        };
        let methods: Vec<_> = failures.iter().map(|(m, _)| *m).collect();
        assert_eq!(methods, Method::FALLBACK_ORDER.to_vec());
        assert!(failures
            .iter()
            .all(|(_, why)| matches!(why, EvalError::InvalidOperands { .. })));
    }

    #[test]
    fn test_combination_budget() {
        let config = EvalConfig {
            max_combinations: 5,
            max_rolls: None,
            ..EvalConfig::default()
        };
        let ret = evaluate(&dice(1, 6), Method::Combination, ScriptedRoller::new([1]), &config);
        assert_eq!(ret.unwrap_err(), EvalError::EnumerationExplosion { limit: 5 });
    }
}
