use crate::common::Int;
use rand::Rng;

/// Source of uniformly distributed, independent integers.
pub trait Roller {
    /// A value in `min..=max`.
    fn next_int(&mut self, min: Int, max: Int) -> Int;
}

impl<R: Rng> Roller for R {
    fn next_int(&mut self, min: Int, max: Int) -> Int {
        self.gen_range(min..=max)
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedRoller;
