use crate::common::{Int, CRITICAL_DIE_SIDES};
use std::fmt;

/// A single elementary die face: which kind of die was thrown and what it showed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieRoll {
    pub sides: Int,
    pub value: Int,
}

impl DieRoll {
    pub const fn new(sides: Int, value: Int) -> Self {
        Self { sides, value }
    }

    pub(crate) const fn is_critical_die(&self) -> bool {
        self.sides == CRITICAL_DIE_SIDES
    }
}

impl fmt::Display for DieRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}={}", self.sides, self.value)
    }
}

/// One concrete universe of die faces together with the value the expression
/// takes in it.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combination {
    pub total: Int,
    pub rolls: Vec<DieRoll>,
}

impl Combination {
    pub fn new(total: Int, rolls: Vec<DieRoll>) -> Self {
        Self { total, rolls }
    }

    pub fn constant(total: Int) -> Self {
        Self::new(total, Vec::new())
    }

    /// Joins two universes: `total` becomes the new total and the roll records
    /// are concatenated left then right.
    pub(crate) fn join(&self, other: &Self, total: Int) -> Self {
        let mut rolls = Vec::with_capacity(self.rolls.len() + other.rolls.len());
        rolls.extend_from_slice(&self.rolls);
        rolls.extend_from_slice(&other.rolls);
        Self { total, rolls }
    }

    /// Face shown by the first critical die in this universe, if any.
    pub fn critical_face(&self) -> Option<Int> {
        self.rolls
            .iter()
            .find(|r| r.is_critical_die())
            .map(|r| r.value)
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.total)?;
        for (i, roll) in self.rolls.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", roll)?;
        }
        f.write_str("]")
    }
}
