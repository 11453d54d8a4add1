pub mod ast;
pub mod lexer;
mod parser;
pub mod reconstruct;
pub mod visit;

pub use parser::{ParseError, ParseErrorKind, Parser};

use crate::registry::OperatorRegistry;

pub fn parse(s: &str, registry: &OperatorRegistry) -> Result<ast::DiceAst, ParseError> {
    Parser::new(s, registry).parse()
}
