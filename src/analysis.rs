//! Whole-block derivation: block soul signature, forces, and the crypto
//! joules of every transaction.
//!
//! Transactions are independent of one another, so locators are built and
//! scanned on the rayon pool when [`AnalysisConfig::parallel`] is set. Results
//! are kept in parcel order either way.

use crate::block::{BlockData, BlockIdentity};
use crate::config::AnalysisConfig;
use crate::error::{JouleError, Result};
use crate::locator::{CryptoJoule, CryptoJouleLocator};
use crate::modality::{ByteModalities, ModalityValue};
use crate::soul::SoulSignature;
use crate::tri_quanta::TriQuanta;
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct BlockAnalysis {
    identity: BlockIdentity,
    height: Option<u64>,
    modalities: ByteModalities,
    tri_quanta: TriQuanta,
    locators: Vec<CryptoJouleLocator>,
    /// Sorted by (parcel, index).
    joules: Vec<CryptoJoule>,
    modality_depth: usize,
}

/// Serializable summary of a [`BlockAnalysis`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockReport {
    pub block_hash: String,
    pub merkle_root: String,
    pub block_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    pub soul_signature: SoulSignature,
    pub tri_quanta: TriQuanta,
    pub transaction_count: usize,
    pub located_parcels: Vec<usize>,
    pub crypto_joules: Vec<CryptoJoule>,
}

impl BlockAnalysis {
    pub fn analyze(block: &BlockData, config: &AnalysisConfig) -> Result<Self> {
        let started = Instant::now();
        let identity = block.identity();
        let modalities = ByteModalities::from_identity(&identity)?;
        let tri_quanta = TriQuanta::from_soul_signature(modalities.soul_signature());
        debug!(
            "Block {} soul signature {} dominant force {} ({})",
            identity.block_hash,
            tri_quanta.soul_signature(),
            tri_quanta.dominant_force_hex(),
            tri_quanta.dominant_force_name()
        );

        let txids: Vec<&str> = block.txids().collect();
        let scanned = if config.parallel {
            scan_parallel(&tri_quanta, &txids, identity.block_time, config.threads)?
        } else {
            txids
                .iter()
                .enumerate()
                .map(|(parcel, txid)| scan(&tri_quanta, parcel, txid, identity.block_time))
                .collect::<Result<Vec<_>>>()?
        };

        let mut locators = Vec::with_capacity(scanned.len());
        let mut joules = Vec::new();
        for (locator, located) in scanned {
            locators.push(locator);
            joules.extend(located.into_iter().flatten());
        }

        info!(
            "Analyzed block {}: {} transactions, {} crypto joules in {:?}",
            identity.block_hash,
            locators.len(),
            joules.len(),
            started.elapsed()
        );

        Ok(BlockAnalysis {
            identity,
            height: block.height,
            modalities,
            tri_quanta,
            locators,
            joules,
            modality_depth: config.modality_depth,
        })
    }

    pub fn identity(&self) -> &BlockIdentity {
        &self.identity
    }

    pub fn soul_signature(&self) -> &SoulSignature {
        self.tri_quanta.soul_signature()
    }

    pub fn tri_quanta(&self) -> &TriQuanta {
        &self.tri_quanta
    }

    pub fn modalities(&self) -> &ByteModalities {
        &self.modalities
    }

    /// All ten modalities at `index`, using the configured depth.
    pub fn modalities_at(&self, index: usize) -> Vec<ModalityValue> {
        self.modalities.all_modalities(index, self.modality_depth)
    }

    pub fn transaction_count(&self) -> usize {
        self.locators.len()
    }

    pub fn locator(&self, parcel: usize) -> Option<&CryptoJouleLocator> {
        self.locators.get(parcel)
    }

    pub fn crypto_joules(&self) -> &[CryptoJoule] {
        &self.joules
    }

    pub fn joules_for_parcel(&self, parcel: usize) -> &[CryptoJoule] {
        let start = self.joules.partition_point(|j| j.parcel < parcel);
        let end = self.joules.partition_point(|j| j.parcel <= parcel);
        &self.joules[start..end]
    }

    pub fn crypto_joule(&self, parcel: usize, index: usize) -> Option<&CryptoJoule> {
        self.joules
            .binary_search_by_key(&(parcel, index), |j| (j.parcel, j.index))
            .ok()
            .map(|pos| &self.joules[pos])
    }

    /// Parcels holding at least one crypto joule, ascending.
    pub fn located_parcels(&self) -> Vec<usize> {
        let mut parcels: Vec<usize> = self.joules.iter().map(|j| j.parcel).collect();
        parcels.dedup();
        parcels
    }

    pub fn report(&self) -> BlockReport {
        BlockReport {
            block_hash: self.identity.block_hash.clone(),
            merkle_root: self.identity.merkle_root.clone(),
            block_time: self.identity.block_time,
            height: self.height,
            soul_signature: *self.soul_signature(),
            tri_quanta: self.tri_quanta.clone(),
            transaction_count: self.transaction_count(),
            located_parcels: self.located_parcels(),
            crypto_joules: self.joules.clone(),
        }
    }
}

type Scanned = (CryptoJouleLocator, Option<Vec<CryptoJoule>>);

fn scan(tri_quanta: &TriQuanta, parcel: usize, txid: &str, block_time: u64) -> Result<Scanned> {
    let locator = CryptoJouleLocator::new(tri_quanta, txid, block_time)?;
    let located = locator.locate(parcel);
    Ok((locator, located))
}

fn scan_parallel(
    tri_quanta: &TriQuanta,
    txids: &[&str],
    block_time: u64,
    threads: usize,
) -> Result<Vec<Scanned>> {
    let run = || {
        txids
            .par_iter()
            .enumerate()
            .map(|(parcel, txid)| scan(tri_quanta, parcel, txid, block_time))
            .collect::<Result<Vec<_>>>()
    };

    if threads == 0 {
        return run();
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| JouleError::Config(format!("Failed to build thread pool: {}", e)))?;
    pool.install(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TxEntry;

    const BLOCK_HASH: &str = "00000000000000000002a7c4c1e48d76c5a37902165a270156b7a8d72728a054";
    const MERKLE_ROOT: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";
    const TIME: u64 = 1_700_000_000;

    fn dominant() -> u8 {
        let soul = SoulSignature::for_block(BLOCK_HASH, MERKLE_ROOT, TIME).unwrap();
        TriQuanta::from_soul_signature(&soul).dominant_force()
    }

    fn block_with(txids: Vec<String>) -> BlockData {
        BlockData {
            hash: BLOCK_HASH.to_string(),
            merkleroot: MERKLE_ROOT.to_string(),
            time: TIME,
            height: Some(812_000),
            tx: txids.into_iter().map(TxEntry::Id).collect(),
        }
    }

    fn txn(positions: &[usize]) -> String {
        let d = dominant();
        let mut bytes = [d.wrapping_add(1); 32];
        for p in positions {
            bytes[*p] = d;
        }
        hex::encode(bytes)
    }

    #[test]
    fn test_joules_sorted_and_indexed() {
        let block = block_with(vec![txn(&[4, 9]), txn(&[]), txn(&[0])]);
        let analysis = BlockAnalysis::analyze(&block, &AnalysisConfig::default()).unwrap();

        assert_eq!(analysis.transaction_count(), 3);
        assert_eq!(analysis.located_parcels(), vec![0, 2]);
        assert_eq!(analysis.joules_for_parcel(0).len(), 2);
        assert!(analysis.joules_for_parcel(1).is_empty());
        assert_eq!(analysis.crypto_joule(0, 9).map(|j| j.index), Some(9));
        assert_eq!(analysis.crypto_joule(2, 0).map(|j| j.parcel), Some(2));
        assert!(analysis.crypto_joule(1, 0).is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let txids: Vec<String> = (0..40).map(|i| txn(&[i % 32])).collect();
        let block = block_with(txids);
        let parallel = BlockAnalysis::analyze(&block, &AnalysisConfig::default()).unwrap();
        let sequential = BlockAnalysis::analyze(
            &block,
            &AnalysisConfig {
                parallel: false,
                ..AnalysisConfig::default()
            },
        )
        .unwrap();
        let pooled = BlockAnalysis::analyze(
            &block,
            &AnalysisConfig {
                threads: 2,
                ..AnalysisConfig::default()
            },
        )
        .unwrap();

        assert_eq!(parallel.crypto_joules(), sequential.crypto_joules());
        assert_eq!(pooled.crypto_joules(), sequential.crypto_joules());
    }

    #[test]
    fn test_bad_transaction_fails_block() {
        let block = block_with(vec![txn(&[]), "xyz".to_string()]);
        let err = BlockAnalysis::analyze(&block, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, JouleError::InvalidInputFormat { .. }));
    }

    #[test]
    fn test_report_shape() {
        let block = block_with(vec![txn(&[1])]);
        let analysis = BlockAnalysis::analyze(&block, &AnalysisConfig::default()).unwrap();
        let json = serde_json::to_value(analysis.report()).unwrap();
        assert_eq!(json["blockHash"], BLOCK_HASH);
        assert_eq!(json["height"], 812_000);
        assert_eq!(json["transactionCount"], 1);
        assert_eq!(json["cryptoJoules"][0]["index"], 1);
        assert_eq!(json["soulSignature"], analysis.soul_signature().to_hex());
    }

    #[test]
    fn test_modalities_at_uses_block_bytes() {
        let block = block_with(vec![]);
        let analysis = BlockAnalysis::analyze(&block, &AnalysisConfig::default()).unwrap();
        let values = analysis.modalities_at(0);
        assert_eq!(values.len(), 10);
        assert_eq!(values[0].value, analysis.modalities().calculate(crate::modality::Modality::Noetic, 0));
    }
}
