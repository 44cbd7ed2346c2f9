//! Full-period iterators over `(Z/pZ)*`.
//!
//! Two implementations of the same walk:
//! - [`BigIntGroupIterator`] works for any modulus.
//! - [`UintGroupIterator`] is restricted to moduli up to 2^40 and steps with
//!   native `u64` arithmetic.
//!
//! Both are ordinary [`Iterator`]s. [`GroupIterator`] wraps either one
//! behind a single type when the choice is made at runtime.

mod big;
mod uint;

pub use big::BigIntGroupIterator;
pub use uint::{MAX_GENERATOR_FOR_SMALL_GROUP, PRIME_BOUND_FOR_SMALL_GROUP, UintGroupIterator};

use core::fmt;
use core::iter::FusedIterator;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::algebra::group::GroupSpec;
use crate::random::{RandomSource, RandomnessError};

/// Error type for iterator construction.
#[derive(Debug)]
pub enum IteratorError {
    /// The randomness source failed.
    Randomness(RandomnessError),
    /// A value exceeds the bound of the fixed-width iterator.
    OutOfRange { value: BigUint, bound: u64 },
    /// A seed value is not an element of `(Z/pZ)*`.
    NotInGroup { value: BigUint },
}

impl From<RandomnessError> for IteratorError {
    fn from(err: RandomnessError) -> Self {
        IteratorError::Randomness(err)
    }
}

impl fmt::Display for IteratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IteratorError::Randomness(err) => write!(f, "{}", err),
            IteratorError::OutOfRange { value, bound } => {
                write!(f, "{} exceeds the fixed-width bound {}", value, bound)
            }
            IteratorError::NotInGroup { value } => {
                write!(f, "{} is not an element of the multiplicative group", value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IteratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IteratorError::Randomness(err) => Some(err),
            _ => None,
        }
    }
}

/// Draw a start element uniformly from `[1, p)`.
fn random_start<R>(modulus: &BigUint, rng: &mut R) -> Result<BigUint, RandomnessError>
where
    R: RandomSource + ?Sized,
{
    let bound = modulus - BigUint::one();
    Ok(rng.random_below(&bound)? + 1u32)
}

fn check_member(modulus: &BigUint, value: &BigUint) -> Result<(), IteratorError> {
    if value.is_zero() || value >= modulus {
        return Err(IteratorError::NotInGroup {
            value: value.clone(),
        });
    }
    Ok(())
}

/// Either iterator variant, yielding [`BigUint`] elements.
///
/// # Example
///
/// ```
/// use cyclo::groups::GROUP_16;
/// use cyclo::GroupIterator;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let spec = GROUP_16.spec();
/// spec.validate().unwrap();
///
/// let mut rng = StdRng::seed_from_u64(9);
/// let it = GroupIterator::with_fast_path(&spec, &mut rng).unwrap();
/// assert!(matches!(it, GroupIterator::Uint(_)));
/// assert_eq!(it.count(), 65536);
/// ```
#[derive(Clone, Debug)]
pub enum GroupIterator {
    BigInt(BigIntGroupIterator),
    Uint(UintGroupIterator),
}

impl GroupIterator {
    /// Create an arbitrary-precision iterator.
    ///
    /// # Errors
    ///
    /// Returns `IteratorError::Randomness` if the randomness source fails.
    ///
    /// # Panics
    ///
    /// Panics if the modulus is below 2, which no valid spec has.
    pub fn new<R>(spec: &GroupSpec, rng: &mut R) -> Result<Self, IteratorError>
    where
        R: RandomSource + ?Sized,
    {
        BigIntGroupIterator::new(spec, rng).map(GroupIterator::BigInt)
    }

    /// Create a fixed-width iterator when the modulus fits, and an
    /// arbitrary-precision one otherwise.
    ///
    /// # Errors
    ///
    /// Returns `IteratorError::Randomness` if the randomness source fails.
    ///
    /// # Panics
    ///
    /// Panics if the modulus is below 2, which no valid spec has.
    pub fn with_fast_path<R>(spec: &GroupSpec, rng: &mut R) -> Result<Self, IteratorError>
    where
        R: RandomSource + ?Sized,
    {
        if UintGroupIterator::supports(spec) {
            UintGroupIterator::new(spec, rng).map(GroupIterator::Uint)
        } else {
            Self::new(spec, rng)
        }
    }

    /// [`GroupIterator::with_fast_path`] seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns `IteratorError::Randomness` if the OS source fails.
    #[cfg(feature = "std")]
    pub fn from_entropy(spec: &GroupSpec) -> Result<Self, IteratorError> {
        Self::with_fast_path(spec, &mut rand::rngs::OsRng)
    }

    /// The multiplicative step.
    pub fn generator(&self) -> BigUint {
        match self {
            GroupIterator::BigInt(it) => it.generator().clone(),
            GroupIterator::Uint(it) => BigUint::from(it.generator()),
        }
    }

    /// The start element, which is also the last element emitted.
    pub fn start(&self) -> BigUint {
        match self {
            GroupIterator::BigInt(it) => it.start().clone(),
            GroupIterator::Uint(it) => BigUint::from(it.start()),
        }
    }

    /// Whether the full period has been emitted.
    pub fn is_exhausted(&self) -> bool {
        match self {
            GroupIterator::BigInt(it) => it.is_exhausted(),
            GroupIterator::Uint(it) => it.is_exhausted(),
        }
    }
}

impl Iterator for GroupIterator {
    type Item = BigUint;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            GroupIterator::BigInt(it) => it.next(),
            GroupIterator::Uint(it) => it.next().map(BigUint::from),
        }
    }
}

impl FusedIterator for GroupIterator {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::{GROUP_32, GROUP_8};
    use crate::random::testing::FailingRng;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn cross_variant_equivalence() {
        let spec = GROUP_32.spec();
        let mut rng = StdRng::seed_from_u64(2);
        let fast = UintGroupIterator::new(&spec, &mut rng).unwrap();
        let slow = BigIntGroupIterator::from_parts(
            &spec,
            BigUint::from(fast.generator()),
            BigUint::from(fast.start()),
        )
        .unwrap();

        for (i, (a, b)) in fast.zip(slow).take(100_000).enumerate() {
            assert_eq!(BigUint::from(a), b, "diverged at step {}", i);
        }
    }

    #[test]
    fn cross_variant_equivalence_full_period() {
        let spec = GROUP_8.spec();
        for g in [3u64, 5, 6, 7, 12] {
            let fast = UintGroupIterator::from_parts(&spec, g, 100).unwrap();
            let slow =
                BigIntGroupIterator::from_parts(&spec, BigUint::from(g), BigUint::from(100u8))
                    .unwrap();
            let a: Vec<BigUint> = fast.map(BigUint::from).collect();
            let b: Vec<BigUint> = slow.collect();
            assert_eq!(a.len(), 256);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn random_start_is_nonzero() {
        let mut rng = StdRng::seed_from_u64(5);
        let two = BigUint::from(2u8);
        for _ in 0..20 {
            // Only one candidate in [1, 2)
            assert_eq!(random_start(&two, &mut rng).unwrap(), BigUint::one());
        }
        let p = BigUint::from(257u32);
        for _ in 0..1000 {
            let s = random_start(&p, &mut rng).unwrap();
            assert!(!s.is_zero() && s < p);
        }
    }

    #[test]
    fn fast_path_selection() {
        let mut rng = StdRng::seed_from_u64(6);
        let spec = GROUP_8.spec();
        assert!(matches!(
            GroupIterator::new(&spec, &mut rng).unwrap(),
            GroupIterator::BigInt(_)
        ));
        assert!(matches!(
            GroupIterator::with_fast_path(&spec, &mut rng).unwrap(),
            GroupIterator::Uint(_)
        ));

        // 2^61 - 1, root 37
        let big = GroupSpec::new_unchecked(
            BigUint::from(2305843009213693951u64),
            BigUint::from(37u8),
            [2u64, 3, 5, 7, 11, 13, 31, 41, 61, 151, 331, 1321]
                .iter()
                .map(|&f| BigUint::from(f))
                .collect(),
        );
        assert!(big.validate().is_ok());
        let it = GroupIterator::with_fast_path(&big, &mut rng).unwrap();
        assert!(matches!(it, GroupIterator::BigInt(_)));
        assert!(big.check_generator(&it.generator()).is_ok());
    }

    #[test]
    fn wrapper_walks_full_period() {
        let spec = GROUP_8.spec();
        let mut rng = StdRng::seed_from_u64(10);
        for mut it in [
            GroupIterator::new(&spec, &mut rng).unwrap(),
            GroupIterator::with_fast_path(&spec, &mut rng).unwrap(),
        ] {
            let start = it.start();
            let mut all: Vec<BigUint> = it.by_ref().collect();
            assert!(it.is_exhausted());
            assert_eq!(it.next(), None);
            assert_eq!(all.last(), Some(&start));
            all.sort();
            all.dedup();
            assert_eq!(all.len(), 256);
        }
    }

    #[test]
    fn errors_display() {
        let err = IteratorError::OutOfRange {
            value: BigUint::from(5u8),
            bound: 4,
        };
        assert_eq!(err.to_string(), "5 exceeds the fixed-width bound 4");

        let spec = GROUP_8.spec();
        let err = GroupIterator::with_fast_path(&spec, &mut FailingRng).unwrap_err();
        assert!(err.to_string().starts_with("randomness source failed"));
    }
}
