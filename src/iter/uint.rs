//! Fixed-width walk over `(Z/pZ)*` for moduli up to 2^40.

use core::iter::FusedIterator;

use log::{debug, trace};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::algebra::group::GroupSpec;
use crate::iter::{random_start, IteratorError};
use crate::random::RandomSource;

/// Largest modulus accepted by [`UintGroupIterator`].
pub const PRIME_BOUND_FOR_SMALL_GROUP: u64 = 1 << 40;

/// Largest generator used by [`UintGroupIterator`].
///
/// With `current < 2^40` and `generator <= 2^24`, `current * generator`
/// stays below `2^64`.
pub const MAX_GENERATOR_FOR_SMALL_GROUP: u64 = 1 << 24;

/// Walks every element of `(Z/pZ)*` exactly once using native `u64`
/// arithmetic.
///
/// Same walk as [`BigIntGroupIterator`](crate::BigIntGroupIterator), for
/// moduli up to [`PRIME_BOUND_FOR_SMALL_GROUP`]. The generator search is
/// repeated until it lands on a generator no larger than
/// [`MAX_GENERATOR_FOR_SMALL_GROUP`], so each step is one multiply and one
/// remainder without overflow.
///
/// Zero is never an element of the group, so [`UintGroupIterator::next_uint`]
/// uses it as the end-of-walk sentinel.
#[derive(Clone, Debug)]
pub struct UintGroupIterator {
    prime: u64,
    generator: u64,
    start: u64,
    /// 0 once the walk has returned to `start`.
    current: u64,
}

impl UintGroupIterator {
    /// Whether the spec's modulus fits the fixed-width iterator.
    pub fn supports(spec: &GroupSpec) -> bool {
        small_prime(spec).is_ok()
    }

    /// Create an iterator with a fresh random generator and start.
    ///
    /// `spec` must be valid (see [`GroupSpec::validate`]); this is not
    /// rechecked.
    ///
    /// # Errors
    ///
    /// Returns `IteratorError::OutOfRange` if the modulus exceeds
    /// [`PRIME_BOUND_FOR_SMALL_GROUP`], and `IteratorError::Randomness` if
    /// the randomness source fails.
    ///
    /// # Panics
    ///
    /// Panics if the modulus is below 2, which no valid spec has.
    pub fn new<R>(spec: &GroupSpec, rng: &mut R) -> Result<Self, IteratorError>
    where
        R: RandomSource + ?Sized,
    {
        let prime = small_prime(spec)?;

        let generator = loop {
            let candidate = spec.find_generator(rng)?.into_element();
            match candidate.to_u64() {
                Some(g) if g <= MAX_GENERATOR_FOR_SMALL_GROUP => break g,
                _ => trace!("generator {} too large for fixed width, retrying", candidate),
            }
        };

        let start = random_start(spec.modulus(), rng)?;
        let start = start.to_u64().ok_or(IteratorError::OutOfRange {
            value: start,
            bound: PRIME_BOUND_FOR_SMALL_GROUP,
        })?;

        debug!(
            "uint iterator over {} with generator {} starting at {}",
            prime, generator, start
        );
        Ok(Self {
            prime,
            generator,
            start,
            current: start,
        })
    }

    /// Create an iterator seeded from the operating system's entropy source.
    ///
    /// # Errors
    ///
    /// Same as [`UintGroupIterator::new`].
    #[cfg(feature = "std")]
    pub fn from_entropy(spec: &GroupSpec) -> Result<Self, IteratorError> {
        Self::new(spec, &mut rand::rngs::OsRng)
    }

    /// Create an iterator from a known generator and start element.
    ///
    /// # Errors
    ///
    /// Returns `IteratorError::OutOfRange` if the modulus or the generator
    /// exceeds its fixed-width bound, and `IteratorError::NotInGroup` if
    /// `generator` or `start` is not in `[1, p)`.
    pub fn from_parts(spec: &GroupSpec, generator: u64, start: u64) -> Result<Self, IteratorError> {
        let prime = small_prime(spec)?;
        if generator > MAX_GENERATOR_FOR_SMALL_GROUP {
            return Err(IteratorError::OutOfRange {
                value: BigUint::from(generator),
                bound: MAX_GENERATOR_FOR_SMALL_GROUP,
            });
        }
        for value in [generator, start] {
            if value == 0 || value >= prime {
                return Err(IteratorError::NotInGroup {
                    value: BigUint::from(value),
                });
            }
        }

        Ok(Self {
            prime,
            generator,
            start,
            current: start,
        })
    }

    /// The modulus `p`.
    pub fn modulus(&self) -> u64 {
        self.prime
    }

    /// The multiplicative step.
    pub fn generator(&self) -> u64 {
        self.generator
    }

    /// The start element, which is also the last element emitted.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Whether the full period has been emitted.
    pub fn is_exhausted(&self) -> bool {
        self.current == 0
    }

    /// Typed version of [`Iterator::next`]: returns the next element, or
    /// `0` once the walk is exhausted.
    #[inline]
    pub fn next_uint(&mut self) -> u64 {
        if self.current == 0 {
            return 0;
        }
        self.current = self.current * self.generator % self.prime;

        let out = self.current;
        if out == self.start {
            self.current = 0;
        }
        out
    }
}

impl Iterator for UintGroupIterator {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_uint() {
            0 => None,
            x => Some(x),
        }
    }
}

impl FusedIterator for UintGroupIterator {}

/// The spec's modulus as a `u64`, if it is within the fixed-width bound.
fn small_prime(spec: &GroupSpec) -> Result<u64, IteratorError> {
    match spec.modulus().to_u64() {
        Some(p) if p <= PRIME_BOUND_FOR_SMALL_GROUP => Ok(p),
        _ => Err(IteratorError::OutOfRange {
            value: spec.modulus().clone(),
            bound: PRIME_BOUND_FOR_SMALL_GROUP,
        }),
    }
}
