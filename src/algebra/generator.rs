//! Random generator discovery.
//!
//! Searching for a generator directly in `(Z/pZ)*` costs an exponentiation
//! per factor per candidate. Instead we search the additive group
//! `(Z/pZ, +)`, where testing a candidate is a handful of remainders, and
//! carry the result over with the isomorphism `x -> root^x mod p`.
//!
//! The inverse map is the discrete logarithm and is never computed.

use core::fmt;

use log::{debug, trace};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::algebra::group::GroupSpec;
use crate::random::{RandomSource, RandomnessError};

/// A generator of `(Z/pZ)*` found by [`GroupSpec::find_generator`].
///
/// Keeps the additive exponent it was derived from alongside the
/// multiplicative element, `element = root^exponent mod p`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiscoveredGenerator {
    exponent: BigUint,
    element: BigUint,
}

impl DiscoveredGenerator {
    /// The additive-group exponent that passed the coprimality test.
    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }

    /// The multiplicative generator, used as the iteration step.
    pub fn element(&self) -> &BigUint {
        &self.element
    }

    /// Consume and return the multiplicative generator.
    pub fn into_element(self) -> BigUint {
        self.element
    }
}

impl fmt::Display for DiscoveredGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element)
    }
}

impl GroupSpec {
    /// Test whether an additive-group element shares no factor with the
    /// group order, as far as the spec's factor list can tell.
    ///
    /// `x` passes when it is nonzero and, for every order factor `f`,
    /// `x != f`, `f` does not divide `x` (when `x > f`), and `x` does not
    /// divide `f` (when `x < f`).
    ///
    /// # Example
    ///
    /// ```
    /// use cyclo::GroupSpec;
    /// use num_bigint::BigUint;
    ///
    /// let spec = GroupSpec::new(
    ///     BigUint::from(23u32),
    ///     BigUint::from(5u32),
    ///     vec![BigUint::from(2u32), BigUint::from(11u32)],
    /// )
    /// .unwrap();
    /// assert!(spec.is_coprime(&BigUint::from(7u32)));
    /// assert!(!spec.is_coprime(&BigUint::from(11u32)));
    /// assert!(!spec.is_coprime(&BigUint::from(14u32)));
    /// ```
    pub fn is_coprime(&self, x: &BigUint) -> bool {
        if x.is_zero() {
            return false;
        }

        self.order_factors().iter().all(|factor| {
            if x > factor {
                !x.is_multiple_of(factor)
            } else if x < factor {
                !factor.is_multiple_of(x)
            } else {
                false
            }
        })
    }

    /// The isomorphism from `(Z/pZ, +)` to `(Z/pZ)*`: `x -> root^x mod p`.
    pub fn additive_to_multiplicative(&self, x: &BigUint) -> BigUint {
        self.root().modpow(x, self.modulus())
    }

    /// Find a uniformly placed coprime element of the additive group.
    ///
    /// Draws a random starting candidate in `[0, p)` and walks upward
    /// (mod `p`) to the first candidate accepted by
    /// [`GroupSpec::is_coprime`]. If a whole lap finds nothing, which only
    /// happens for degenerate groups such as `p = 3`, the exponent `1` is
    /// returned so that the isomorphism yields the validated root itself.
    ///
    /// # Errors
    ///
    /// Returns `RandomnessError` if the randomness source fails.
    ///
    /// # Panics
    ///
    /// Panics if the modulus is zero.
    pub fn find_additive_generator<R>(&self, rng: &mut R) -> Result<BigUint, RandomnessError>
    where
        R: RandomSource + ?Sized,
    {
        let modulus = self.modulus();
        let first = rng.random_below(modulus)?;

        let mut candidate = first.clone();
        let mut skipped = 0u64;
        while !self.is_coprime(&candidate) {
            skipped += 1;
            candidate += 1u32;
            if candidate == *modulus {
                candidate.set_zero();
            }
            if candidate == first {
                debug!("no coprime residue mod {}, falling back to the root", modulus);
                return Ok(BigUint::one());
            }
        }

        if skipped > 0 {
            trace!("additive search skipped {} candidates", skipped);
        }
        Ok(candidate)
    }

    /// Find a random generator of the multiplicative group.
    ///
    /// Runs [`GroupSpec::find_additive_generator`] and maps the result
    /// through [`GroupSpec::additive_to_multiplicative`]. For a valid spec
    /// the result always passes [`GroupSpec::check_generator`].
    ///
    /// # Errors
    ///
    /// Returns `RandomnessError` if the randomness source fails.
    ///
    /// # Example
    ///
    /// ```
    /// use cyclo::groups::GROUP_32;
    /// use rand::rngs::StdRng;
    /// use rand::SeedableRng;
    ///
    /// let spec = GROUP_32.spec();
    /// let mut rng = StdRng::seed_from_u64(5);
    /// let g = spec.find_generator(&mut rng).unwrap();
    /// assert!(spec.check_generator(g.element()).is_ok());
    /// ```
    pub fn find_generator<R>(&self, rng: &mut R) -> Result<DiscoveredGenerator, RandomnessError>
    where
        R: RandomSource + ?Sized,
    {
        let exponent = self.find_additive_generator(rng)?;
        let element = self.additive_to_multiplicative(&exponent);
        Ok(DiscoveredGenerator { exponent, element })
    }
}
