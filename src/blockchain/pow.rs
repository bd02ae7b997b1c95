use std::sync::atomic::{AtomicBool, Ordering};

use super::{DEFAULT_DIFFICULTY, Digest};
use crate::error::{Error, Result};

/// Difference-of-squares puzzle: find the smallest non-negative `proof`
/// such that SHA-256 of the decimal text of `proof² - previous²` starts
/// with `difficulty` zero hex characters.
///
/// Arithmetic wraps in 64-bit two's complement so existing chains verify
/// identically. This is a CPU delay, not a security mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    /// Difficulty is clamped to the 64 hex characters of a digest.
    pub fn new(difficulty: usize) -> Self {
        Self {
            difficulty: difficulty.min(64),
        }
    }

    /// The digest the predicate inspects for a `(proof, previous)` pair.
    pub fn puzzle_digest(proof: i64, previous: i64) -> Digest {
        let operand = proof
            .wrapping_mul(proof)
            .wrapping_sub(previous.wrapping_mul(previous));
        Digest::sha256(operand.to_string().as_bytes())
    }

    /// Verification predicate shared by mining and chain validation.
    pub fn verify(&self, proof: i64, previous: i64) -> bool {
        Self::puzzle_digest(proof, previous).leading_zero_nibbles() >= self.difficulty
    }

    /// Scan 0, 1, 2, … and return the first proof that satisfies the
    /// predicate. The search is abandoned once `stop` is raised.
    pub fn solve_until(&self, previous: i64, stop: &AtomicBool) -> Result<i64> {
        let mut proof = 0i64;
        loop {
            if stop.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            if self.verify(proof, previous) {
                return Ok(proof);
            }
            proof = proof.wrapping_add(1);
        }
    }
}
