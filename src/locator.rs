//! Crypto joule location within a single transaction.
//!
//! Each transaction gets its own soul signature, chained from the block's,
//! and a precomputed chain of [`HASH_CHAIN_LENGTH`] links seeded by it. A scan
//! walks the transaction hash byte by byte; every byte equal to the block's
//! dominant force is recorded as a [`CryptoJoule`] carrying the TriQuanta of
//! the link at that position.

use crate::crypto::{byte_hex, decode_hex};
use crate::error::Result;
use crate::hash_chain::HashChain;
use crate::soul::SoulSignature;
use crate::tri_quanta::{Forces, TriQuanta};
use serde::Serialize;

/// Links precomputed per transaction. Positions past this are never matched.
pub const HASH_CHAIN_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoJoule {
    /// Index of the transaction within its block.
    pub parcel: usize,
    #[serde(with = "byte_hex")]
    pub byte: u8,
    /// Byte position within the transaction hash.
    pub index: usize,
    pub tri_quanta: TriQuanta,
}

#[derive(Debug, Clone)]
pub struct CryptoJouleLocator {
    block_tri_quanta: TriQuanta,
    transaction_hash: String,
    transaction_bytes: Vec<u8>,
    block_time: u64,
    soul_signature: SoulSignature,
    links: Vec<SoulSignature>,
}

impl CryptoJouleLocator {
    pub fn new(block_tri_quanta: &TriQuanta, transaction_hash: &str, block_time: u64) -> Result<Self> {
        let transaction_bytes = decode_hex("transaction hash", transaction_hash)?;
        let soul_signature = SoulSignature::for_transaction(
            block_tri_quanta.soul_signature(),
            transaction_hash,
            block_time,
        )?;
        let links = HashChain::new(soul_signature.as_bytes().to_vec())
            .take(HASH_CHAIN_LENGTH)
            .map(|link| SoulSignature::from_slice(&link))
            .collect::<Result<Vec<_>>>()?;

        Ok(CryptoJouleLocator {
            block_tri_quanta: block_tri_quanta.clone(),
            transaction_hash: transaction_hash.to_string(),
            transaction_bytes,
            block_time,
            soul_signature,
            links,
        })
    }

    /// Scan the transaction for bytes equal to the block's dominant force.
    /// Returns `None` when nothing matched.
    pub fn locate(&self, parcel: usize) -> Option<Vec<CryptoJoule>> {
        let dominant = self.block_tri_quanta.dominant_force();
        let joules: Vec<CryptoJoule> = self
            .transaction_bytes
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte == dominant)
            .filter_map(|(index, byte)| {
                self.link_tri_quanta(index).map(|tri_quanta| CryptoJoule {
                    parcel,
                    byte: *byte,
                    index,
                    tri_quanta,
                })
            })
            .collect();

        if joules.is_empty() {
            None
        } else {
            Some(joules)
        }
    }

    /// TriQuanta of link `index`, or `None` past the end of the chain.
    pub fn link_tri_quanta(&self, index: usize) -> Option<TriQuanta> {
        self.links.get(index).map(TriQuanta::from_soul_signature)
    }

    pub fn forces(&self) -> Forces {
        self.block_tri_quanta.forces()
    }

    pub fn tri_quanta(&self) -> &TriQuanta {
        &self.block_tri_quanta
    }

    pub fn transaction_hash(&self) -> &str {
        &self.transaction_hash
    }

    pub fn block_time(&self) -> u64 {
        self.block_time
    }

    pub fn soul_signature(&self) -> &SoulSignature {
        &self.soul_signature
    }

    pub fn links(&self) -> &[SoulSignature] {
        &self.links
    }
}
