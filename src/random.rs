//! Uniform sampling of big integers from a fallible randomness source.
//!
//! Every random choice the crate makes (the additive search candidate and
//! the iteration start point) goes through [`RandomSource::random_below`].
//! The trait is implemented for every [`rand::RngCore`], so callers pass
//! `OsRng`, a seeded `StdRng`, or their own generator.

use alloc::vec;
use core::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;

/// The randomness source failed to produce bytes.
///
/// Never retried internally: the operation that needed randomness is
/// abandoned and this error is returned to the caller.
#[derive(Debug)]
pub struct RandomnessError {
    inner: rand::Error,
}

impl RandomnessError {
    /// The error reported by the underlying generator.
    pub fn inner(&self) -> &rand::Error {
        &self.inner
    }
}

impl From<rand::Error> for RandomnessError {
    fn from(inner: rand::Error) -> Self {
        Self { inner }
    }
}

impl fmt::Display for RandomnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "randomness source failed: {}", self.inner)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RandomnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

/// A source of uniformly distributed integers.
///
/// Implemented for all [`RngCore`] types. To plug in a custom entropy
/// source, implement `RngCore` for it (in particular `try_fill_bytes`,
/// whose errors are what surface as [`RandomnessError`]).
pub trait RandomSource {
    /// Draw an integer uniformly from `[0, bound)`.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    fn random_below(&mut self, bound: &BigUint) -> Result<BigUint, RandomnessError>;
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn random_below(&mut self, bound: &BigUint) -> Result<BigUint, RandomnessError> {
        assert!(!bound.is_zero(), "random_below requires a positive bound");

        // Sample exactly `bits` random bits and reject values >= bound.
        // At least half of all draws are accepted.
        let bits = bound.bits();
        let len = ((bits + 7) / 8) as usize;
        let mask = 0xffu8 >> (len as u64 * 8 - bits);
        let mut buf = vec![0u8; len];

        loop {
            self.try_fill_bytes(&mut buf)?;
            buf[0] &= mask;
            let candidate = BigUint::from_bytes_be(&buf);
            if candidate < *bound {
                return Ok(candidate);
            }
        }
    }
}
