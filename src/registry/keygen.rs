//! Key Generator Module
//!
//! Produces short keys from a monotonic sequence passed through a keyed
//! Feistel permutation, so keys cannot be enumerated in order yet remain
//! collision-free by construction.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Number of Feistel rounds applied to each sequence number.
const ROUNDS: usize = 4;

// == Key Generator ==
/// Short-key source backed by a counter and a Feistel permutation.
///
/// The permutation is a bijection over the u64 space for any choice of round
/// keys, so two distinct sequence numbers can never map to the same key.
/// Round keys are drawn fresh from the process RNG at construction; keys are
/// not stable across restarts and do not need to be.
#[derive(Debug)]
pub struct KeyGenerator {
    sequence: u64,
    round_keys: [u32; ROUNDS],
}

impl KeyGenerator {
    // == Constructor ==
    /// Creates a generator with randomly seeded round keys.
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let mut round_keys = [0u32; ROUNDS];
        for key in &mut round_keys {
            *key = rng.next_u32();
        }
        Self {
            sequence: 0,
            round_keys,
        }
    }

    /// Creates a generator with fixed round keys, for deterministic tests.
    #[cfg(test)]
    pub fn with_round_keys(round_keys: [u32; ROUNDS]) -> Self {
        Self {
            sequence: 0,
            round_keys,
        }
    }

    // == Next ==
    /// Returns the next short key: an 11-character URL-safe encoding of the
    /// permuted sequence number.
    pub fn next(&mut self) -> String {
        self.sequence = self.sequence.wrapping_add(1);
        let permuted = self.permute(self.sequence);
        URL_SAFE_NO_PAD.encode(permuted.to_be_bytes())
    }

    // == Permutation ==
    /// Balanced Feistel network over the two 32-bit halves of `n`.
    fn permute(&self, n: u64) -> u64 {
        let mut left = (n >> 32) as u32;
        let mut right = n as u32;

        for &key in &self.round_keys {
            let mixed = left ^ Self::round(right, key);
            left = right;
            right = mixed;
        }

        ((left as u64) << 32) | right as u64
    }

    /// Round function: a small xor/multiply mixer. Any function works here;
    /// the Feistel structure alone guarantees invertibility.
    fn round(half: u32, key: u32) -> u32 {
        let mut x = half ^ key;
        x = x.wrapping_mul(0x9E37_79B9);
        x ^= x >> 16;
        x.wrapping_mul(0x85EB_CA6B)
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}
