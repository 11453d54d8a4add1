use super::{EResult, EvalError, DICE};
use crate::common::{Int, CRITICAL_DIE_SIDES};
use crate::distribution::{merge_provenance, Distribution};
use crate::ops::Operate;
use crate::parse::{
    ast::{Dice, DiceAst, Operation},
    visit::AstVisitor,
};

pub const DEFAULT_MAX_CONVOLUTION_TERMS: usize = 100_000_000;

/// Computes the exact distribution of an expression by discrete convolution.
///
/// `limit` bounds the work of a single step: the support of one die and the
/// number of entry pairs in one cross product.
#[derive(Debug)]
pub struct ConvolutionEngine {
    limit: usize,
}

impl Default for ConvolutionEngine {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_CONVOLUTION_TERMS)
    }
}

impl ConvolutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn check_size(&self, terms: Option<usize>) -> EResult<()> {
        match terms {
            Some(n) if n <= self.limit => Ok(()),
            _ => {
                log::warn!("convolution rejected: more than {} terms", self.limit);
                Err(EvalError::ConvolutionTooLarge { limit: self.limit })
            }
        }
    }

    pub fn eval(&mut self, ast: &DiceAst) -> EResult<Distribution> {
        let ret = self.visit(ast)?;
        log::debug!("convolution produced {} outcomes", ret.len());
        Ok(ret)
    }

    /// Cross product of two distributions: every pair of entries contributes
    /// the product of their masses to `combine(left, right)`.
    pub(crate) fn product(
        &self,
        left: &Distribution,
        right: &Distribution,
        combine: impl Fn(Int, Int) -> EResult<Int>,
    ) -> EResult<Distribution> {
        self.check_size(left.len().checked_mul(right.len()))?;
        let mut ret = Distribution::new();
        for (v1, t1, p1) in left.entries() {
            for (v2, t2, p2) in right.entries() {
                ret.add_tagged_outcome(combine(v1, v2)?, merge_provenance(t1, t2), p1 * p2);
            }
        }
        Ok(ret)
    }

    /// Uniform distribution of one die. Faces of the critical die carry
    /// themselves as provenance.
    fn single_die(sides: Int) -> Distribution {
        let p = 1.0 / sides as f64;
        let mut ret = Distribution::new();
        for face in 1..=sides {
            let tag = (sides == CRITICAL_DIE_SIDES).then(|| face);
            ret.add_tagged_outcome(face, tag, p);
        }
        ret
    }
}

impl AstVisitor for ConvolutionEngine {
    type Output = EResult<Distribution>;

    fn visit_constant(&mut self, value: Int) -> Self::Output {
        Ok(Distribution::certain(value))
    }

    fn visit_dice(&mut self, dice: &Dice) -> Self::Output {
        if dice.count <= 0 {
            return Ok(Distribution::certain(0));
        }
        if dice.sides <= 0 {
            return Err(EvalError::InvalidDice {
                count: dice.count,
                sides: dice.sides,
            });
        }
        self.check_size(usize::try_from(dice.sides).ok())?;
        let die = Self::single_die(dice.sides);
        let mut ret = Distribution::certain(0);
        for _ in 0..dice.count {
            ret = self.product(&ret, &die, |a, b| {
                a.checked_add(b).ok_or(EvalError::Overflow { operator: DICE })
            })?;
        }
        Ok(ret)
    }

    fn visit_operation(&mut self, op: &Operation) -> Self::Output {
        op.operator.validate(&op.operands)?;
        op.operator.distribution(self, &op.operands)
    }
}
