//! Block data as delivered by a node's `getblock` call.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// The three scalar fields every derivation starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockIdentity {
    pub merkle_root: String,
    pub block_hash: String,
    pub block_time: u64,
}

impl BlockIdentity {
    pub fn new(merkle_root: impl Into<String>, block_hash: impl Into<String>, block_time: u64) -> Self {
        BlockIdentity {
            merkle_root: merkle_root.into(),
            block_hash: block_hash.into(),
            block_time,
        }
    }
}

/// A transaction entry: a bare txid (verbosity 1) or a decoded transaction
/// object carrying a `txid` field (verbosity 2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxEntry {
    Id(String),
    Detailed { txid: String },
}

impl TxEntry {
    pub fn txid(&self) -> &str {
        match self {
            TxEntry::Id(txid) => txid,
            TxEntry::Detailed { txid } => txid,
        }
    }
}

impl From<&str> for TxEntry {
    fn from(txid: &str) -> Self {
        TxEntry::Id(txid.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    pub hash: String,
    pub merkleroot: String,
    pub time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(default)]
    pub tx: Vec<TxEntry>,
}

impl BlockData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn identity(&self) -> BlockIdentity {
        BlockIdentity::new(self.merkleroot.clone(), self.hash.clone(), self.time)
    }

    pub fn txids(&self) -> impl Iterator<Item = &str> {
        self.tx.iter().map(TxEntry::txid)
    }
}
