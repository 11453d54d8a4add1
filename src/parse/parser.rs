use super::{ast::DiceAst, lexer::*};
use crate::common::{Int, NonEmpty};
use crate::ops::DiceOperator;
use crate::registry::{Arity, OperatorRegistry, RegistryError};
use logos_iter::LogosIter;
use std::fmt;
use std::ops::Range;

type PResult<T = DiceAst> = Result<T, ParseError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("error at position {} ({slice:?}): {kind}", .span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Range<usize>,
    pub slice: String,
}

impl ParseError {
    /// Whether this is a failure to resolve an operator name rather than a
    /// malformed expression.
    pub fn is_unknown_operator(&self) -> bool {
        matches!(self.kind, ParseErrorKind::UnknownOperator { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: TokenKind,
        expected: NonEmpty<TokenKind>,
    },
    UnexpectedEnd {
        expected: NonEmpty<TokenKind>,
    },
    TrailingInput {
        found: TokenKind,
    },
    InvalidInteger,
    UnknownOperator {
        name: String,
        arity: Arity,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token: found {}, expected ", found)?;
                fmt_expected(expected, f)
            }
            Self::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input, expected ")?;
                fmt_expected(expected, f)
            }
            Self::TrailingInput { found } => {
                write!(f, "expected end of input, found {}", found)
            }
            Self::InvalidInteger => f.write_str("integer literal out of range"),
            Self::UnknownOperator { name, arity } => {
                write!(f, "no {} operator named {:?}", arity, name)
            }
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expected {
        [] => Ok(()),
        [a] => f.write_str(a.as_str()),
        [a, b] => write!(f, "{} or {}", a, b),
        [init @ .., last] => {
            for exp in init {
                write!(f, "{}, ", exp)?;
            }
            write!(f, "or {}", last)
        }
    }
}

/// Recursive-descent parser for dice notation.
///
/// ```text
/// expression := additive ( ( '<' | '<=' | '==' | '!=' | '>=' | '>' ) additive )?
/// additive   := primary ( ( '+' | '-' ) primary )*
/// primary    := DICE | '-'? INTEGER | IDENTIFIER '(' ( expression ( ',' expression )* )? ')'
///             | '(' expression ')'
/// ```
///
/// Every operator, infix ones included, is constructed through the
/// [`OperatorRegistry`].
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    registry: &'a OperatorRegistry,
}

impl<'a> Parser<'a> {
    const COMPARISON_OPS: &'static [TokenKind] = &[
        TokenKind::LessThan,
        TokenKind::LessEqual,
        TokenKind::EqualEqual,
        TokenKind::BangEqual,
        TokenKind::GreaterEqual,
        TokenKind::GreaterThan,
    ];

    const ADDITION_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    const PRIMARY_START: &'static [TokenKind] = &[
        TokenKind::Dice,
        TokenKind::Integer,
        TokenKind::Minus,
        TokenKind::Identifier,
        TokenKind::LeftParen,
    ];

    pub fn new(source: &'a str, registry: &'a OperatorRegistry) -> Self {
        Self {
            source,
            lexer: lexer(source),
            registry,
        }
    }

    /// Parses the whole input. Nothing is returned unless every token was
    /// consumed.
    pub fn parse(mut self) -> PResult {
        let ret = self.parse_expression()?;
        match self.advance() {
            None => Ok(ret),
            Some(found) => self.error(ParseErrorKind::TrailingInput { found }),
        }
    }

    fn advance(&mut self) -> Option<TokenKind> {
        self.lexer.next()
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.lexer.peek().map_or(false, |&peeked| peeked == kind)
    }

    fn matches_any(&mut self, options: &[TokenKind]) -> bool {
        self.lexer
            .peek()
            .map_or(false, |peeked| options.contains(peeked))
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<()> {
        if self.matches(expected) {
            self.advance();
            Ok(())
        } else {
            self.unexpected_token(&[expected])
        }
    }

    fn error<T>(&mut self, kind: ParseErrorKind) -> PResult<T> {
        Err(ParseError {
            kind,
            span: self.lexer.span(),
            slice: self.lexer.slice().to_string(),
        })
    }

    fn unexpected_token<T>(&mut self, expected: &[TokenKind]) -> PResult<T> {
        // callers always name at least one token
        let expected = NonEmpty::try_from(expected.to_vec())
            .unwrap_or_else(|_| NonEmpty::new(TokenKind::Error));
        match self.advance() {
            Some(found) => self.error(ParseErrorKind::UnexpectedToken { found, expected }),
            None => {
                let end = self.source.len();
                Err(ParseError {
                    kind: ParseErrorKind::UnexpectedEnd { expected },
                    span: end..end,
                    slice: String::new(),
                })
            }
        }
    }

    fn resolve(&mut self, name: &str, arity: Arity) -> PResult<DiceOperator> {
        match self.registry.create(name, arity) {
            Ok(op) => Ok(op),
            Err(RegistryError::UnknownOperator { name, arity })
            | Err(RegistryError::DuplicateOperator { name, arity }) => {
                self.error(ParseErrorKind::UnknownOperator { name, arity })
            }
        }
    }

    fn parse_expression(&mut self) -> PResult {
        let lhs = self.parse_additive()?;

        if self.matches_any(Self::COMPARISON_OPS) {
            let op = self.parse_infix_operator()?;
            let rhs = self.parse_additive()?;
            Ok(DiceAst::operation(op, vec![lhs, rhs]))
        } else {
            Ok(lhs)
        }
    }

    fn parse_additive(&mut self) -> PResult {
        let mut lhs = self.parse_primary()?;

        while self.matches_any(Self::ADDITION_OPS) {
            let op = self.parse_infix_operator()?;
            let rhs = self.parse_primary()?;

            lhs = DiceAst::operation(op, vec![lhs, rhs]);
        }

        Ok(lhs)
    }

    fn parse_infix_operator(&mut self) -> PResult<DiceOperator> {
        let symbol = self.advance().and_then(|tok| tok.as_symbol()).unwrap_or("");
        self.resolve(symbol, Arity::Binary)
    }

    fn parse_primary(&mut self) -> PResult {
        match self.lexer.peek() {
            Some(TokenKind::Dice) => self.parse_dice(),
            Some(TokenKind::Integer) | Some(TokenKind::Minus) => self.parse_integer(),
            Some(TokenKind::Identifier) => self.parse_call(),
            Some(TokenKind::LeftParen) => self.parse_parens(),
            _ => self.unexpected_token(Self::PRIMARY_START),
        }
    }

    fn parse_int(&mut self, s: &str) -> PResult<Int> {
        match s.parse() {
            Ok(x) => Ok(x),
            Err(_) => self.error(ParseErrorKind::InvalidInteger),
        }
    }

    /// Integer constant with an optional sign. Dice counts are never signed.
    fn parse_integer(&mut self) -> PResult {
        let negative = self.matches(TokenKind::Minus);
        if negative {
            self.advance();
        }
        self.consume(TokenKind::Integer)?;
        let slice = if negative {
            format!("-{}", self.lexer.slice())
        } else {
            self.lexer.slice().to_owned()
        };
        let x = self.parse_int(&slice)?;
        Ok(DiceAst::constant(x))
    }

    fn parse_dice(&mut self) -> PResult {
        self.consume(TokenKind::Dice)?;
        let slice = self.lexer.slice().to_owned();
        let (count, sides) = match slice.split_once('d') {
            Some(x) => x,
            None => return self.error(ParseErrorKind::InvalidInteger),
        };
        let count = self.parse_int(count)?;
        let sides = self.parse_int(sides)?;
        Ok(DiceAst::dice(count, sides))
    }

    fn parse_call(&mut self) -> PResult {
        self.consume(TokenKind::Identifier)?;
        let name = self.lexer.slice().to_owned();
        let op = self.resolve(&name, Arity::Function)?;
        self.consume(TokenKind::LeftParen)?;

        let mut operands = Vec::new();
        if !self.matches(TokenKind::RightParen) {
            operands.push(self.parse_expression()?);
            while self.matches(TokenKind::Comma) {
                self.advance();
                operands.push(self.parse_expression()?);
            }
        }
        if !self.matches(TokenKind::RightParen) {
            return self.unexpected_token(&[TokenKind::Comma, TokenKind::RightParen]);
        }
        self.advance();

        Ok(DiceAst::operation(op, operands))
    }

    fn parse_parens(&mut self) -> PResult {
        self.consume(TokenKind::LeftParen)?;
        let inner = self.parse_expression()?;
        self.consume(TokenKind::RightParen)?;
        Ok(inner)
    }
}
