//! Arbitrary-precision walk over `(Z/pZ)*`.

use core::iter::FusedIterator;

use log::debug;
use num_bigint::BigUint;

use crate::algebra::group::GroupSpec;
use crate::iter::{check_member, random_start, IteratorError};
use crate::random::RandomSource;

/// Walks every element of `(Z/pZ)*` exactly once, for a modulus of any size.
///
/// Each step computes `x <- x * g mod p` for a random generator `g`,
/// starting from a random element. Because `g` has order `p - 1`, the walk
/// emits `p - 1` distinct nonzero residues; the start element comes last,
/// after which the iterator is exhausted for good.
///
/// # Example
///
/// ```
/// use cyclo::groups::GROUP_8;
/// use cyclo::BigIntGroupIterator;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let spec = GROUP_8.spec();
/// let mut rng = StdRng::seed_from_u64(1);
/// let it = BigIntGroupIterator::new(&spec, &mut rng).unwrap();
///
/// let mut seen: Vec<u64> = it.map(|x| u64::try_from(&x).unwrap()).collect();
/// seen.sort_unstable();
/// assert_eq!(seen, (1..257).collect::<Vec<_>>());
/// ```
#[derive(Clone, Debug)]
pub struct BigIntGroupIterator {
    modulus: BigUint,
    generator: BigUint,
    start: BigUint,
    /// `None` once the walk has returned to `start`.
    current: Option<BigUint>,
}

impl BigIntGroupIterator {
    /// Create an iterator with a fresh random generator and start.
    ///
    /// `spec` must be valid (see [`GroupSpec::validate`]); this is not
    /// rechecked.
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
        let generator = spec.find_generator(rng)?.into_element();
        let start = random_start(spec.modulus(), rng)?;

        debug!(
            "big-int iterator over {} with generator {} starting at {}",
            spec.modulus(),
            generator,
            start
        );
        Ok(Self::from_trusted_parts(spec.modulus().clone(), generator, start))
    }

    /// Create an iterator seeded from the operating system's entropy source.
    ///
    /// # Errors
    ///
    /// Returns `IteratorError::Randomness` if the OS source fails.
    #[cfg(feature = "std")]
    pub fn from_entropy(spec: &GroupSpec) -> Result<Self, IteratorError> {
        Self::new(spec, &mut rand::rngs::OsRng)
    }

    /// Create an iterator from a known generator and start element.
    ///
    /// The walk is only full-period if `generator` passes
    /// [`GroupSpec::check_generator`].
    ///
    /// # Errors
    ///
    /// Returns `IteratorError::NotInGroup` if `generator` or `start` is not
    /// in `[1, p)`.
    pub fn from_parts(
        spec: &GroupSpec,
        generator: BigUint,
        start: BigUint,
    ) -> Result<Self, IteratorError> {
        check_member(spec.modulus(), &generator)?;
        check_member(spec.modulus(), &start)?;
        Ok(Self::from_trusted_parts(spec.modulus().clone(), generator, start))
    }

    fn from_trusted_parts(modulus: BigUint, generator: BigUint, start: BigUint) -> Self {
        Self {
            modulus,
            current: Some(start.clone()),
            generator,
            start,
        }
    }

    /// The modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The multiplicative step.
    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// The start element, which is also the last element emitted.
    pub fn start(&self) -> &BigUint {
        &self.start
    }

    /// Whether the full period has been emitted.
    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }
}

impl Iterator for BigIntGroupIterator {
    type Item = BigUint;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.as_mut()?;
        *current = &*current * &self.generator % &self.modulus;

        let out = current.clone();
        if out == self.start {
            self.current = None;
        }
        Some(out)
    }
}

impl FusedIterator for BigIntGroupIterator {}
