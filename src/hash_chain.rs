//! Hash chaining: byte-wise modular accumulation of a seed with its own output.
//!
//! `links[0]` is the seed, `links[n] = chain(seed, links[n - 1])`. A chain only
//! ever looks at the seed and the previous link, so it can be resumed from any
//! stored link plus the original seed.

use crate::crypto::decode_hex;
use crate::error::{JouleError, Result};

/// Byte-wise `(seed[i] + previous[i]) mod 256`.
pub fn chain(seed: &[u8], previous: &[u8]) -> Result<Vec<u8>> {
    if seed.len() != previous.len() {
        return Err(JouleError::InvalidLength {
            expected: seed.len(),
            actual: previous.len(),
        });
    }
    Ok(combine(seed, previous))
}

/// Hex form of [`chain`]. With no `previous` digest the seed is chained with
/// itself. Output is lowercase with the same length as the input.
pub fn chain_hex(seed: &str, previous: Option<&str>) -> Result<String> {
    let seed_bytes = decode_hex("hash chain seed", seed)?;
    let previous_bytes = match previous {
        Some(p) => decode_hex("hash chain link", p)?,
        None => seed_bytes.clone(),
    };
    Ok(hex::encode(chain(&seed_bytes, &previous_bytes)?))
}

fn combine(seed: &[u8], previous: &[u8]) -> Vec<u8> {
    seed.iter()
        .zip(previous)
        .map(|(s, p)| s.wrapping_add(*p))
        .collect()
}

/// Unbounded iterator over the links of a chain, starting at link 0.
#[derive(Debug, Clone)]
pub struct HashChain {
    seed: Vec<u8>,
    previous: Option<Vec<u8>>,
}

impl HashChain {
    pub fn new(seed: impl Into<Vec<u8>>) -> Self {
        HashChain {
            seed: seed.into(),
            previous: None,
        }
    }

    /// Continue a chain from a stored link; the first item yielded is the
    /// link after `link`.
    pub fn resume(seed: impl Into<Vec<u8>>, link: impl Into<Vec<u8>>) -> Result<Self> {
        let seed = seed.into();
        let link = link.into();
        if seed.len() != link.len() {
            return Err(JouleError::InvalidLength {
                expected: seed.len(),
                actual: link.len(),
            });
        }
        Ok(HashChain {
            seed,
            previous: Some(link),
        })
    }

    /// The first `count` links.
    pub fn precompute(seed: impl Into<Vec<u8>>, count: usize) -> Vec<Vec<u8>> {
        HashChain::new(seed).take(count).collect()
    }

    pub fn seed(&self) -> &[u8] {
        &self.seed
    }
}

impl Iterator for HashChain {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        let link = match &self.previous {
            None => self.seed.clone(),
            Some(previous) => combine(&self.seed, previous),
        };
        self.previous = Some(link.clone());
        Some(link)
    }
}
