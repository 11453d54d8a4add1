use crate::eval::EvalError;
use crate::parse::ParseError;
use crate::registry::RegistryError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Eval(#[from] EvalError),
    #[error("{0}")]
    Registry(#[from] RegistryError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
