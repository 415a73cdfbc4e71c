//! CryptoJoule - reproducible forces and crypto joules derived from block data
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Derivation Core
//! - [`soul`] - Soul signatures for blocks and transactions (SHA-256)
//! - [`hash_chain`] - Byte-wise modular hash chaining
//! - [`tri_quanta`] - Force reduction and ranking
//! - [`modality`] - The ten byte modalities and their composition
//! - [`locator`] - Crypto joule search within a transaction
//!
//! ## Block Processing
//! - [`block`] - Block data as returned by a node
//! - [`analysis`] - Whole-block analysis across transactions
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`crypto`] - Hex and digest helpers
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Derivation Core
// ============================================================================
pub mod hash_chain;
pub mod locator;
pub mod modality;
pub mod soul;
pub mod tri_quanta;

// ============================================================================
// Block Processing
// ============================================================================
pub mod analysis;
pub mod block;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod crypto;
pub mod error;

pub use analysis::{BlockAnalysis, BlockReport};
pub use block::{BlockData, BlockIdentity, TxEntry};
pub use error::{JouleError, Result};
pub use hash_chain::HashChain;
pub use locator::{CryptoJoule, CryptoJouleLocator, HASH_CHAIN_LENGTH};
pub use modality::{ByteModalities, Modality, ModalityValue};
pub use soul::SoulSignature;
pub use tri_quanta::{ForceName, Forces, Ranking, TriQuanta};
