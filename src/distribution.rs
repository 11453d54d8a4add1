use crate::combination::Combination;
use crate::common::Int;
use std::collections::BTreeMap;
use std::fmt;

/// Face of the critical die that produced an outcome, when one was involved.
pub type Provenance = Option<Int>;

/// Picks the provenance of a combined outcome: the left-most tagged side wins.
pub(crate) fn merge_provenance(left: Provenance, right: Provenance) -> Provenance {
    left.or(right)
}

/// A discrete probability mass function over integer outcomes.
///
/// Masses are keyed by `(value, provenance)` so the joint law of a total and
/// the critical die face behind it survives convolution. The value-level
/// accessors ([`len`](Self::len), [`probability`](Self::probability),
/// [`outcomes`](Self::outcomes)) fold the provenance away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    masses: BTreeMap<(Int, Provenance), f64>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// The distribution of a value known for certain.
    pub fn certain(value: Int) -> Self {
        let mut ret = Self::new();
        ret.add_outcome(value, 1.0);
        ret
    }

    /// Builds a distribution from `(value, probability)` pairs, merging
    /// duplicates.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Int, f64)>) -> Self {
        let mut ret = Self::new();
        for (value, probability) in pairs {
            ret.add_outcome(value, probability);
        }
        ret
    }

    /// Folds an exhaustive enumeration into a distribution where every
    /// universe is equally likely.
    pub fn from_enumeration(combinations: &[Combination]) -> Self {
        let mut ret = Self::new();
        if combinations.is_empty() {
            return ret;
        }
        let weight = 1.0 / combinations.len() as f64;
        for c in combinations {
            ret.add_tagged_outcome(c.total, c.critical_face(), weight);
        }
        ret
    }

    pub fn add_outcome(&mut self, value: Int, probability: f64) {
        self.add_tagged_outcome(value, None, probability);
    }

    /// Accumulates `probability` onto `(value, provenance)`. An entry whose
    /// mass cancels out to exactly zero is removed.
    pub fn add_tagged_outcome(&mut self, value: Int, provenance: Provenance, probability: f64) {
        if probability == 0.0 {
            return;
        }
        let key = (value, provenance);
        let mass = self.masses.entry(key).or_insert(0.0);
        *mass += probability;
        if *mass == 0.0 {
            self.masses.remove(&key);
        }
    }

    /// Probability mass of `value` across every provenance.
    pub fn probability(&self, value: Int) -> f64 {
        self.masses
            .range((value, None)..=(value, Some(Int::MAX)))
            .map(|(_, p)| *p)
            .sum()
    }

    /// Number of distinct outcome values.
    pub fn len(&self) -> usize {
        self.outcomes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Distinct values with their total mass, ascending by value.
    pub fn outcomes(&self) -> impl Iterator<Item = (Int, f64)> + '_ {
        Outcomes {
            inner: self.masses.iter().peekable(),
        }
    }

    /// Every `(value, provenance, mass)` entry, ascending by value then provenance.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = (Int, Provenance, f64)> + '_ {
        self.masses.iter().map(|(&(v, t), &p)| (v, t, p))
    }

    pub fn values(&self) -> impl Iterator<Item = Int> + '_ {
        self.outcomes().map(|(v, _)| v)
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.values().sum()
    }

    /// Divides every mass by the total. Does nothing when the total is zero.
    pub fn normalize(&mut self) {
        let sum = self.total_mass();
        if sum == 0.0 {
            return;
        }
        for p in self.masses.values_mut() {
            *p /= sum;
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn clear(&mut self) {
        self.masses.clear();
    }

    pub fn min_value(&self) -> Option<Int> {
        self.masses.keys().next().map(|&(v, _)| v)
    }

    pub fn max_value(&self) -> Option<Int> {
        self.masses.keys().next_back().map(|&(v, _)| v)
    }

    /// Expected value, weighted by the (possibly unnormalized) masses.
    pub fn mean(&self) -> Option<f64> {
        let sum = self.total_mass();
        if sum == 0.0 {
            return None;
        }
        let weighted: f64 = self.entries().map(|(v, _, p)| v as f64 * p).sum();
        Some(weighted / sum)
    }

    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let sum = self.total_mass();
        let var: f64 = self
            .entries()
            .map(|(v, _, p)| {
                let d = v as f64 - mean;
                d * d * p
            })
            .sum::<f64>()
            / sum;
        Some(var.sqrt())
    }

    /// Mass of every outcome greater than or equal to `value`.
    pub fn probability_at_least(&self, value: Int) -> f64 {
        self.masses
            .range((value, None)..)
            .map(|(_, p)| *p)
            .sum()
    }

    /// Pointwise comparison of the value-level masses within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        let mut values: Vec<Int> = self.values().chain(other.values()).collect();
        values.sort_unstable();
        values.dedup();
        values
            .into_iter()
            .all(|v| (self.probability(v) - other.probability(v)).abs() <= tolerance)
    }
}

struct Outcomes<I: Iterator> {
    inner: std::iter::Peekable<I>,
}

impl<'a, I> Iterator for Outcomes<I>
where
    I: Iterator<Item = (&'a (Int, Provenance), &'a f64)>,
{
    type Item = (Int, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let (&(value, _), &first) = self.inner.next()?;
        let mut mass = first;
        while let Some(((v, _), p)) = self.inner.peek() {
            if *v != value {
                break;
            }
            mass += **p;
            self.inner.next();
        }
        Some((value, mass))
    }
}

impl FromIterator<(Int, f64)> for Distribution {
    fn from_iter<T: IntoIterator<Item = (Int, f64)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (value, p)) in self.outcomes().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", value, p)?;
        }
        f.write_str("}")
    }
}
