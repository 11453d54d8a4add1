use super::{check_operand_count, EResult, Operate};
use crate::combination::Combination;
use crate::common::Int;
use crate::distribution::Distribution;
use crate::eval::{CombinationEngine, ConvolutionEngine, EvalError, RollEngine, Roller};
use crate::parse::{ast::DiceAst, visit::AstVisitor};
use crate::registry::{Arity, RegistryEntry};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComparisonMode {
    LessThan,
    LessEqual,
    Equal,
    NotEqual,
    GreaterEqual,
    GreaterThan,
}

impl ComparisonMode {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterEqual => ">=",
            Self::GreaterThan => ">",
        }
    }

    pub fn test(&self, l: Int, r: Int) -> bool {
        match self {
            Self::LessThan => l < r,
            Self::LessEqual => l <= r,
            Self::Equal => l == r,
            Self::NotEqual => l != r,
            Self::GreaterEqual => l >= r,
            Self::GreaterThan => l > r,
        }
    }

    /// The relational test as an integer: 1 when it holds, 0 otherwise.
    pub fn apply(&self, l: Int, r: Int) -> Int {
        self.test(l, r) as Int
    }
}

/// Relational test between two operands, evaluating to 1 or 0.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Comparison {
    pub mode: ComparisonMode,
}

impl Comparison {
    pub fn new(mode: ComparisonMode) -> Self {
        Self { mode }
    }
}

pub(super) fn entries() -> Vec<RegistryEntry> {
    fn entry(mode: ComparisonMode, factory: fn() -> super::DiceOperator) -> RegistryEntry {
        RegistryEntry::new(mode.symbol(), Arity::Binary, factory)
    }

    vec![
        entry(ComparisonMode::LessThan, || {
            Comparison::new(ComparisonMode::LessThan).into()
        }),
        entry(ComparisonMode::LessEqual, || {
            Comparison::new(ComparisonMode::LessEqual).into()
        }),
        entry(ComparisonMode::Equal, || {
            Comparison::new(ComparisonMode::Equal).into()
        }),
        entry(ComparisonMode::NotEqual, || {
            Comparison::new(ComparisonMode::NotEqual).into()
        }),
        entry(ComparisonMode::GreaterEqual, || {
            Comparison::new(ComparisonMode::GreaterEqual).into()
        }),
        entry(ComparisonMode::GreaterThan, || {
            Comparison::new(ComparisonMode::GreaterThan).into()
        }),
    ]
}

impl Operate for Comparison {
    fn symbol(&self) -> &'static str {
        self.mode.symbol()
    }

    fn validate(&self, operands: &[DiceAst]) -> EResult<()> {
        check_operand_count(self.symbol(), operands, 2..=2)
    }

    fn roll<R: Roller>(
        &self,
        engine: &mut RollEngine<R>,
        operands: &[DiceAst],
    ) -> EResult<Combination> {
        let l = engine.visit(&operands[0])?;
        let r = engine.visit(&operands[1])?;
        Ok(l.join(&r, self.mode.apply(l.total, r.total)))
    }

    fn distribution(
        &self,
        engine: &mut ConvolutionEngine,
        operands: &[DiceAst],
    ) -> EResult<Distribution> {
        let l = engine.visit(&operands[0])?;
        let r = engine.visit(&operands[1])?;
        if l.is_empty() || r.is_empty() {
            return Err(EvalError::EmptyDistribution {
                operator: self.symbol(),
            });
        }
        engine.product(&l, &r, |a, b| Ok(self.mode.apply(a, b)))
    }

    fn combinations(
        &self,
        engine: &mut CombinationEngine,
        operands: &[DiceAst],
    ) -> EResult<Vec<Combination>> {
        let l = engine.visit(&operands[0])?;
        let r = engine.visit(&operands[1])?;
        engine.product(&l, &r, |a, b| Ok(self.mode.apply(a, b)))
    }
}
