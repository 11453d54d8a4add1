use logos::{Lexer as LogosLexer, Logos};
use logos_iter::{LogosIter, PeekableLexer};
use std::fmt;

pub type Lexer<'a> = PeekableLexer<'a, LogosLexer<'a, TokenKind>, TokenKind>;

pub fn lexer(s: &str) -> Lexer {
    TokenKind::lexer(s).peekable_lexer()
}

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"[0-9]+d[0-9]+")]
    Dice,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token(",")]
    Comma,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,

    #[token("<")]
    LessThan,
    #[token("<=")]
    LessEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token(">=")]
    GreaterEqual,
    #[token(">")]
    GreaterThan,

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            Dice => "<dice>",
            Identifier => "<identifier>",
            LeftParen => "'('",
            RightParen => "')'",
            Comma => "','",
            Plus => "'+'",
            Minus => "'-'",
            LessThan => "'<'",
            LessEqual => "'<='",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            GreaterEqual => "'>='",
            GreaterThan => "'>'",
            Error => "<error>",
        }
    }

    /// Registry name of an infix operator token.
    pub fn as_symbol(&self) -> Option<&'static str> {
        use TokenKind::*;

        Some(match self {
            Plus => "+",
            Minus => "-",
            LessThan => "<",
            LessEqual => "<=",
            EqualEqual => "==",
            BangEqual => "!=",
            GreaterEqual => ">=",
            GreaterThan => ">",
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(s: &str, expected: &[TokenKind]) {
        let mut lex = TokenKind::lexer(s);
        let mut actual = Vec::new();
        while let Some(tok) = lex.next() {
            actual.push(tok);
        }
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_lex_literals() {
        check("42", &[TokenKind::Integer]);
        check("2d10", &[TokenKind::Dice]);
        check("2 d10", &[TokenKind::Integer, TokenKind::Identifier]);
        check("d6", &[TokenKind::Identifier]);
    }

    #[test]
    fn test_lex_operators() {
        use TokenKind::*;
        check(
            "< <= == != >= > + -",
            &[LessThan, LessEqual, EqualEqual, BangEqual, GreaterEqual, GreaterThan, Plus, Minus],
        );
    }

    #[test]
    fn test_lex_call() {
        use TokenKind::*;
        check(
            "AttackRoll(1d20 + 5, 15)",
            &[Identifier, LeftParen, Dice, Plus, Integer, Comma, Integer, RightParen],
        );
    }

    #[test]
    fn test_lex_error() {
        check("2 * 3", &[TokenKind::Integer, TokenKind::Error, TokenKind::Integer]);
    }
}
