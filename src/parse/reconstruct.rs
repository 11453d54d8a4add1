use super::ast::{Dice, DiceAst, Node, Operation};
use super::visit::AstVisitor;
use crate::common::Int;
use crate::ops::{DiceOperator, Operate};

/// Prints an expression back as dice notation that parses to the same tree.
#[derive(Default)]
pub struct Reconstruct;

impl Reconstruct {
    pub fn reconstruct(ast: &DiceAst) -> String {
        Self.visit(ast)
    }

    fn operand(&mut self, ast: &DiceAst, parenthesize: bool) -> String {
        let s = self.visit(ast);
        if parenthesize {
            format!("({})", s)
        } else {
            s
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Level {
    Comparison,
    Additive,
    Primary,
}

fn level(ast: &DiceAst) -> Level {
    match ast.node() {
        Node::Operation(op) => match op.operator {
            DiceOperator::Comparison(_) => Level::Comparison,
            DiceOperator::Addition(_) | DiceOperator::Subtraction(_) => Level::Additive,
            _ => Level::Primary,
        },
        _ => Level::Primary,
    }
}

impl AstVisitor for Reconstruct {
    type Output = String;

    fn visit_constant(&mut self, value: Int) -> Self::Output {
        value.to_string()
    }

    fn visit_dice(&mut self, dice: &Dice) -> Self::Output {
        format!("{}d{}", dice.count, dice.sides)
    }

    fn visit_operation(&mut self, op: &Operation) -> Self::Output {
        let symbol = op.operator.symbol();
        match op.operator {
            DiceOperator::Addition(_) | DiceOperator::Subtraction(_) => {
                let mut ret = String::new();
                for (i, x) in op.operands.iter().enumerate() {
                    if i == 0 {
                        ret += &self.operand(x, level(x) == Level::Comparison);
                    } else {
                        ret += &format!(" {} ", symbol);
                        ret += &self.operand(x, level(x) != Level::Primary);
                    }
                }
                ret
            }
            DiceOperator::Comparison(_) => {
                let parts: Vec<_> = op
                    .operands
                    .iter()
                    .map(|x| self.operand(x, level(x) == Level::Comparison))
                    .collect();
                parts.join(&format!(" {} ", symbol))
            }
            _ => {
                let args: Vec<_> = op.operands.iter().map(|x| self.visit(x)).collect();
                format!("{}({})", symbol, args.join(", "))
            }
        }
    }
}
