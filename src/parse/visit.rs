use super::ast::{Dice, DiceAst, Node, Operation};
use crate::common::{Int, CRITICAL_DIE_SIDES};

pub trait AstVisitor {
    type Output;

    fn visit<T: ?Sized>(&mut self, node: &T) -> Self::Output
    where
        T: Accept<Self>,
    {
        node.accept(self)
    }

    fn visit_constant(&mut self, value: Int) -> Self::Output;

    fn visit_dice(&mut self, dice: &Dice) -> Self::Output;

    fn visit_operation(&mut self, op: &Operation) -> Self::Output;
}

pub trait Accept<V: AstVisitor + ?Sized> {
    fn accept(&self, v: &mut V) -> V::Output;
}

impl<V: AstVisitor + ?Sized> Accept<V> for DiceAst {
    fn accept(&self, v: &mut V) -> V::Output {
        self.node().accept(v)
    }
}

impl<V: AstVisitor + ?Sized> Accept<V> for Node {
    fn accept(&self, v: &mut V) -> V::Output {
        match self {
            Self::Constant(x) => v.visit_constant(*x),
            Self::Dice(x) => v.visit_dice(x),
            Self::Operation(x) => v.visit_operation(x),
        }
    }
}

/// Counts the critical dice an expression throws, judging by the tree shape
/// alone: `2d20` counts two, `ADV(1d20)` counts one.
#[derive(Default)]
pub struct CriticalDieCounter;

impl CriticalDieCounter {
    pub fn count(ast: &DiceAst) -> usize {
        Self.visit(ast)
    }
}

impl AstVisitor for CriticalDieCounter {
    type Output = usize;

    fn visit_constant(&mut self, _: Int) -> Self::Output {
        0
    }

    fn visit_dice(&mut self, dice: &Dice) -> Self::Output {
        if dice.sides == CRITICAL_DIE_SIDES && dice.count > 0 {
            dice.count as usize
        } else {
            0
        }
    }

    fn visit_operation(&mut self, op: &Operation) -> Self::Output {
        op.operands.iter().map(|x| self.visit(x)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;

    #[test]
    fn test_count_critical_dice() {
        assert_eq!(CriticalDieCounter::count(&int(20)), 0);
        assert_eq!(CriticalDieCounter::count(&dice(1, 20)), 1);
        assert_eq!(CriticalDieCounter::count(&dice(3, 20)), 3);
        assert_eq!(CriticalDieCounter::count(&dice(1, 12)), 0);
        assert_eq!(CriticalDieCounter::count(&adv(add(vec![dice(1, 20), int(5)]))), 1);
        assert_eq!(
            CriticalDieCounter::count(&add(vec![dice(1, 20), dice(1, 6), dice(1, 20)])),
            2
        );
    }
}
