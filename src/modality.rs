//! Byte modalities: ten fixed transforms of a subject byte and a soul byte.
//!
//! Every transform has the shape `f(byte, soul_byte, index) mod 256`. A
//! [`ByteModalities`] binds the transforms to a block: the merkle root supplies
//! the subject bytes and the block soul signature supplies the soul bytes,
//! which repeat every 32 positions.

use crate::block::BlockIdentity;
use crate::crypto::decode_hex;
use crate::error::{JouleError, Result};
use crate::soul::SoulSignature;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Default bound on composed chains.
pub const DEFAULT_MAX_DEPTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Modality {
    Noetic,
    Shadow,
    Cowl,
    Light,
    Reflection,
    Amplifier,
    Echo,
    Harmonic,
    Spectral,
    Dissonance,
}

/// Name, formula and meaning of one modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModalityExplanation {
    pub name: &'static str,
    pub formula: &'static str,
    pub explanation: &'static str,
}

/// A modality paired with the value it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModalityValue {
    pub name: Modality,
    pub value: u8,
}

impl Modality {
    /// Table order. Composed chains select the next modality by `value % 10`
    /// into this table, so the order is part of the output.
    pub const ALL: [Modality; 10] = [
        Modality::Noetic,
        Modality::Shadow,
        Modality::Cowl,
        Modality::Light,
        Modality::Reflection,
        Modality::Amplifier,
        Modality::Echo,
        Modality::Harmonic,
        Modality::Spectral,
        Modality::Dissonance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Modality::Noetic => "Noetic",
            Modality::Shadow => "Shadow",
            Modality::Cowl => "Cowl",
            Modality::Light => "Light",
            Modality::Reflection => "Reflection",
            Modality::Amplifier => "Amplifier",
            Modality::Echo => "Echo",
            Modality::Harmonic => "Harmonic",
            Modality::Spectral => "Spectral",
            Modality::Dissonance => "Dissonance",
        }
    }

    pub fn formula(&self) -> &'static str {
        match self {
            Modality::Noetic => "wrap(byte + soul)",
            Modality::Shadow => "wrap(255 - byte + soul)",
            Modality::Cowl => "wrap(255 - |byte - (255 - byte)| + soul)",
            Modality::Light => "wrap(floor(byte^2 / 255) + soul)",
            Modality::Reflection => "wrap(|byte - 128| + soul)",
            Modality::Amplifier => "wrap(byte * (index + 1) + soul)",
            Modality::Echo => "wrap(max(byte - index * 8, 0) + soul)",
            Modality::Harmonic => "wrap(byte * 2 * (index + 1) + soul)",
            Modality::Spectral => "wrap((255 - byte) * (index + 1) + soul)",
            Modality::Dissonance => "wrap(|byte - 128| * (index + 1) + soul)",
        }
    }

    pub fn describe(&self) -> ModalityExplanation {
        let explanation = match self {
            Modality::Noetic => "The raw byte read through the block's soul byte: a contextualized understanding of the data.",
            Modality::Shadow => "The complement of the byte shifted by the soul byte, an inverse image of the original.",
            Modality::Cowl => "The byte's distance from its own complement, emphasizing where it sits relative to the midpoint.",
            Modality::Light => "The byte squared and rescaled, a non-linear intensity of the value.",
            Modality::Reflection => "How far the byte lies from the centre of the range (128).",
            Modality::Amplifier => "The byte scaled by its position, momentum growing through the hash.",
            Modality::Echo => "The byte decaying linearly with its position, floored at zero.",
            Modality::Harmonic => "A harmonic series over the byte's position, twice the amplifier's step.",
            Modality::Spectral => "The complement scaled by position, the counterpart of the amplifier.",
            Modality::Dissonance => "Deviation from the midpoint scaled by position, growing dissonance through the hash.",
        };
        ModalityExplanation {
            name: self.name(),
            formula: self.formula(),
            explanation,
        }
    }

    /// Look up the explanation for a modality by name.
    pub fn explanation(name: &str) -> Result<ModalityExplanation> {
        Ok(name.parse::<Modality>()?.describe())
    }

    /// Apply the transform. Arithmetic is exact modulo 256 for any `index`.
    pub fn apply(&self, index: usize, byte_value: u8, soul_byte: u8) -> u8 {
        let byte = u64::from(byte_value);
        let soul = u64::from(soul_byte);
        let index = index as u64;
        let step = index.wrapping_add(1);

        let raw = match self {
            Modality::Noetic => byte + soul,
            Modality::Shadow => (255 - byte) + soul,
            Modality::Cowl => (255 - byte.abs_diff(255 - byte)) + soul,
            Modality::Light => byte * byte / 255 + soul,
            Modality::Reflection => byte.abs_diff(128) + soul,
            Modality::Amplifier => byte.wrapping_mul(step).wrapping_add(soul),
            Modality::Echo => byte.saturating_sub(index.saturating_mul(8)) + soul,
            Modality::Harmonic => (byte * 2).wrapping_mul(step).wrapping_add(soul),
            Modality::Spectral => (255 - byte).wrapping_mul(step).wrapping_add(soul),
            Modality::Dissonance => byte.abs_diff(128).wrapping_mul(step).wrapping_add(soul),
        };
        (raw % 256) as u8
    }

    /// Table entry selected by `value % 10`.
    pub fn select(value: u8) -> Modality {
        Modality::ALL[usize::from(value) % Modality::ALL.len()]
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Modality {
    type Err = JouleError;

    fn from_str(s: &str) -> Result<Self> {
        Modality::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| JouleError::UnknownModality(s.to_string()))
    }
}

/// The ten modalities bound to one block's merkle root and soul signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteModalities {
    bytes: Vec<u8>,
    soul_signature: SoulSignature,
}

impl ByteModalities {
    /// Fails with `InvalidInputFormat` before deriving anything if either
    /// digest is not pure hex.
    pub fn new(merkle_root: &str, block_hash: &str, block_time: u64) -> Result<Self> {
        let bytes = decode_hex("merkle root", merkle_root)?;
        let soul_signature = SoulSignature::for_block(block_hash, merkle_root, block_time)?;
        Ok(ByteModalities {
            bytes,
            soul_signature,
        })
    }

    pub fn from_identity(identity: &BlockIdentity) -> Result<Self> {
        Self::new(&identity.merkle_root, &identity.block_hash, identity.block_time)
    }

    pub fn soul_signature(&self) -> &SoulSignature {
        &self.soul_signature
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn soul_byte(&self, index: usize) -> u8 {
        let soul = self.soul_signature.as_bytes();
        soul[index % soul.len()]
    }

    /// Subject byte at `index`, wrapping past the end of the merkle root.
    pub fn subject_byte(&self, index: usize) -> u8 {
        self.bytes[index % self.bytes.len()]
    }

    /// Direct (depth 0) value of `modality` at `index`.
    pub fn calculate(&self, modality: Modality, index: usize) -> u8 {
        modality.apply(index, self.subject_byte(index), self.soul_byte(index))
    }

    /// Composed value of `modality` at `index`.
    ///
    /// Depth 0, or any depth at or past `max_depth`, yields the direct value.
    /// Otherwise the direct value picks the next modality (`value % 10`),
    /// becomes the next index, and the depth advances by one.
    pub fn modality(&self, modality: Modality, index: usize, depth: usize, max_depth: usize) -> u8 {
        let mut current = modality;
        let mut index = index;
        let mut depth = depth;
        loop {
            let value = self.calculate(current, index);
            if depth == 0 || depth >= max_depth {
                return value;
            }
            current = Modality::select(value);
            index = usize::from(value);
            depth += 1;
        }
    }

    pub fn modality_by_name(&self, name: &str, index: usize, depth: usize, max_depth: usize) -> Result<u8> {
        Ok(self.modality(name.parse()?, index, depth, max_depth))
    }

    /// All ten modalities at `index`, each started at depth 0.
    pub fn all_modalities(&self, index: usize, max_depth: usize) -> Vec<ModalityValue> {
        Modality::ALL
            .into_iter()
            .map(|name| ModalityValue {
                name,
                value: self.modality(name, index, 0, max_depth),
            })
            .collect()
    }

    /// One modality over a caller-supplied byte pair.
    pub fn byte_modality(name: &str, index: usize, byte_value: u8, soul_byte: u8) -> Result<u8> {
        Ok(name.parse::<Modality>()?.apply(index, byte_value, soul_byte))
    }

    /// All ten modalities over a caller-supplied byte pair.
    pub fn modalities_for_byte(index: usize, byte_value: u8, soul_byte: u8) -> Vec<ModalityValue> {
        Modality::ALL
            .into_iter()
            .map(|name| ModalityValue {
                name,
                value: name.apply(index, byte_value, soul_byte),
            })
            .collect()
    }
}
