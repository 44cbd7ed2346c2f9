#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod algebra;
pub mod groups;
pub mod iter;
pub mod random;
#[cfg(feature = "std")]
pub mod ranges;
pub mod utils;

pub use algebra::generator::DiscoveredGenerator;
#[cfg(feature = "serde")]
pub use algebra::group::{GroupSpecRecord, SpecParseError};
pub use algebra::group::{GroupSpec, ValidationError};
pub use groups::{KnownGroup, KNOWN_GROUPS};
pub use iter::{
    BigIntGroupIterator, GroupIterator, IteratorError, UintGroupIterator,
    MAX_GENERATOR_FOR_SMALL_GROUP, PRIME_BOUND_FOR_SMALL_GROUP,
};
pub use random::{RandomSource, RandomnessError};
#[cfg(feature = "std")]
pub use ranges::{read_ip_ranges, IpNetwork, IpRanges, RangeParseError};
pub use utils::{is_probable_prime, MILLER_RABIN_ROUNDS};
