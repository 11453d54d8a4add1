use crate::ops::{self, DiceOperator};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// How an operator is written in dice notation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Arity {
    Zero,
    Unary,
    /// Infix, between two operands.
    Binary,
    /// `NAME(arg, ...)` call syntax.
    Function,
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zero => "nullary",
            Self::Unary => "unary",
            Self::Binary => "binary",
            Self::Function => "function",
        })
    }
}

pub type OperatorFactory = fn() -> DiceOperator;

#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub name: String,
    pub arity: Arity,
    pub factory: OperatorFactory,
}

impl RegistryEntry {
    pub fn new(name: impl Into<String>, arity: Arity, factory: OperatorFactory) -> Self {
        Self {
            name: name.into(),
            arity,
            factory,
        }
    }

    pub fn create(&self) -> DiceOperator {
        (self.factory)()
    }
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RegistryError {
    #[error("operator {name:?} is already registered as {arity}")]
    DuplicateOperator { name: String, arity: Arity },
    #[error("no {arity} operator named {name:?}")]
    UnknownOperator { name: String, arity: Arity },
}

/// Collects operator entries during start-up, rejecting duplicate
/// `(name, arity)` keys. [`build`](Self::build) seals it into an
/// [`OperatorRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<Arity, BTreeMap<String, RegistryEntry>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: RegistryEntry) -> Result<&mut Self, RegistryError> {
        let by_name = self.entries.entry(entry.arity).or_default();
        if by_name.contains_key(&entry.name) {
            return Err(RegistryError::DuplicateOperator {
                name: entry.name,
                arity: entry.arity,
            });
        }
        log::trace!("registered {} operator {:?}", entry.arity, entry.name);
        by_name.insert(entry.name.clone(), entry);
        Ok(self)
    }

    pub fn register_all(
        &mut self,
        entries: impl IntoIterator<Item = RegistryEntry>,
    ) -> Result<&mut Self, RegistryError> {
        for entry in entries {
            self.register(entry)?;
        }
        Ok(self)
    }

    pub fn build(self) -> OperatorRegistry {
        OperatorRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable catalog of operator factories keyed by `(name, arity)`.
///
/// Once built it is only ever read, so a single registry may be shared
/// between threads and parsers freely.
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    entries: BTreeMap<Arity, BTreeMap<String, RegistryEntry>>,
}

impl OperatorRegistry {
    /// Runs the built-in registration pass.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut builder = RegistryBuilder::new();
        ops::register_builtins(&mut builder)?;
        Ok(builder.build())
    }

    pub fn entry(&self, name: &str, arity: Arity) -> Result<&RegistryEntry, RegistryError> {
        self.entries
            .get(&arity)
            .and_then(|by_name| by_name.get(name))
            .ok_or_else(|| RegistryError::UnknownOperator {
                name: name.to_owned(),
                arity,
            })
    }

    pub fn create(&self, name: &str, arity: Arity) -> Result<DiceOperator, RegistryError> {
        self.entry(name, arity).map(RegistryEntry::create)
    }

    pub fn contains(&self, name: &str, arity: Arity) -> bool {
        self.entry(name, arity).is_ok()
    }

    /// Every entry of the given arity, sorted by name.
    pub fn operators_by_arity(&self, arity: Arity) -> impl Iterator<Item = &RegistryEntry> + '_ {
        self.entries.get(&arity).into_iter().flat_map(|x| x.values())
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;

    fn names(registry: &OperatorRegistry, arity: Arity) -> Vec<&str> {
        registry
            .operators_by_arity(arity)
            .map(|x| x.name.as_str())
            .collect()
    }

    #[test]
    fn test_standard_catalog() {
        let registry = OperatorRegistry::standard().unwrap();
        assert_eq!(registry.len(), 11);
        assert_eq!(
            names(&registry, Arity::Binary),
            vec!["!=", "+", "-", "<", "<=", "==", ">", ">="]
        );
        assert_eq!(names(&registry, Arity::Function), vec!["ADV", "AttackRoll", "DIS"]);
        assert!(names(&registry, Arity::Unary).is_empty());
    }

    #[test]
    fn test_create() {
        let registry = OperatorRegistry::standard().unwrap();
        assert_eq!(
            registry.create("+", Arity::Binary).unwrap(),
            DiceOperator::from(Addition)
        );
        assert_eq!(
            registry.create("DIS", Arity::Function).unwrap(),
            DiceOperator::from(Advantage::disadvantage())
        );
        assert_eq!(
            registry.create(">=", Arity::Binary).unwrap(),
            DiceOperator::from(Comparison::new(ComparisonMode::GreaterEqual))
        );
    }

    #[test]
    fn test_unknown_operator() {
        let registry = OperatorRegistry::standard().unwrap();
        assert_eq!(
            registry.create("ADV", Arity::Binary).unwrap_err(),
            RegistryError::UnknownOperator {
                name: "ADV".to_owned(),
                arity: Arity::Binary
            }
        );
        assert!(!registry.contains("KEEP", Arity::Function));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(RegistryEntry::new("+", Arity::Binary, || Addition.into()))
            .unwrap();
        builder
            .register(RegistryEntry::new("+", Arity::Function, || Addition.into()))
            .unwrap();
        let err = builder
            .register(RegistryEntry::new("+", Arity::Binary, || Subtraction.into()))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateOperator {
                name: "+".to_owned(),
                arity: Arity::Binary
            }
        );
    }

    #[test]
    fn test_builtins_twice_is_duplicate() {
        let mut builder = RegistryBuilder::new();
        crate::ops::register_builtins(&mut builder).unwrap();
        assert!(matches!(
            crate::ops::register_builtins(&mut builder),
            Err(RegistryError::DuplicateOperator { .. })
        ));
    }
}
