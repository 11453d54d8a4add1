pub use vec1::vec1;

pub type Int = i64;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Number of faces of the die that can score a critical hit or miss.
pub const CRITICAL_DIE_SIDES: Int = 20;
/// A natural roll at or above this value on the critical die always hits.
pub const CRITICAL_HIT_THRESHOLD: Int = 20;
/// A natural roll at or below this value on the critical die always misses.
pub const CRITICAL_MISS_THRESHOLD: Int = 1;
