use crate::common::Int;
use crate::ops::DiceOperator;
use std::sync::Arc;

/// An immutable, shareable dice expression tree.
///
/// Cloning is cheap: subtrees are reference counted, so an operator that
/// evaluates its operand several times simply walks the same nodes again.
#[derive(Debug, Clone)]
pub struct DiceAst(Arc<Node>);

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Int),
    Dice(Dice),
    Operation(Operation),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Dice {
    pub count: Int,
    pub sides: Int,
}

impl Dice {
    pub const fn new(count: Int, sides: Int) -> Self {
        Self { count, sides }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: DiceOperator,
    pub operands: Vec<DiceAst>,
}

impl DiceAst {
    pub fn new(node: Node) -> Self {
        Self(Arc::new(node))
    }

    pub fn constant(value: Int) -> Self {
        Self::new(Node::Constant(value))
    }

    pub fn dice(count: Int, sides: Int) -> Self {
        Self::new(Node::Dice(Dice::new(count, sides)))
    }

    pub fn operation(operator: DiceOperator, operands: Vec<DiceAst>) -> Self {
        Self::new(Node::Operation(Operation { operator, operands }))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn as_constant(&self) -> Option<Int> {
        match self.node() {
            Node::Constant(x) => Some(*x),
            _ => None,
        }
    }
}

/// Structural equality: same node kinds, same values, same operator
/// configuration and pairwise-equal operands in order.
impl PartialEq for DiceAst {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl From<Node> for DiceAst {
    fn from(node: Node) -> Self {
        Self::new(node)
    }
}
