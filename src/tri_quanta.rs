//! TriQuanta: three ranked "force" bytes reduced from a soul signature.
//!
//! # Derivation
//!
//! 1. The digest, read as one big-endian unsigned integer, is reduced modulo
//!    2^32 to four bytes.
//! 2. The last byte is the modulator; the first three are the raw quanta.
//! 3. Each raw byte becomes `(raw + modulator) mod 255`. The modulus is 255,
//!    not 256, and outputs depend on it.
//! 4. In order, the three bytes are named genesis, stasis and metamorphosis.
//!
//! Ranking sorts the three values ascending: tertiary, subdominant, dominant.
//! Mapping a ranked value back to its name takes the first positional match,
//! so when two forces share a value both ranks resolve to the earlier name.

use crate::crypto::{byte_hex, encode_byte};
use crate::soul::SoulSignature;
use serde::Serialize;
use std::fmt;

/// Modulus applied to the digest-as-integer before splitting it into bytes.
pub const QUANTA_MODULUS: u64 = 1 << 32;

/// Modulus applied when adding the modulator to each raw quantum.
pub const MODULATION_MODULUS: u16 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceName {
    Genesis,
    Stasis,
    Metamorphosis,
}

impl ForceName {
    pub const ALL: [ForceName; 3] = [ForceName::Genesis, ForceName::Stasis, ForceName::Metamorphosis];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForceName::Genesis => "genesis",
            ForceName::Stasis => "stasis",
            ForceName::Metamorphosis => "metamorphosis",
        }
    }
}

impl fmt::Display for ForceName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three forces in derivation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Forces {
    #[serde(with = "byte_hex")]
    pub genesis: u8,
    #[serde(with = "byte_hex")]
    pub stasis: u8,
    #[serde(with = "byte_hex")]
    pub metamorphosis: u8,
}

impl Forces {
    pub fn get(&self, name: ForceName) -> u8 {
        match name {
            ForceName::Genesis => self.genesis,
            ForceName::Stasis => self.stasis,
            ForceName::Metamorphosis => self.metamorphosis,
        }
    }

    pub fn as_array(&self) -> [u8; 3] {
        [self.genesis, self.stasis, self.metamorphosis]
    }

    /// First force (in derivation order) holding `value`.
    pub fn name_of(&self, value: u8) -> Option<ForceName> {
        ForceName::ALL.into_iter().find(|name| self.get(*name) == value)
    }

    pub fn ranking(&self) -> Ranking {
        let mut sorted = self.as_array();
        sorted.sort_unstable();
        Ranking {
            dominant: sorted[2],
            subdominant: sorted[1],
            tertiary: sorted[0],
        }
    }
}

/// The forces ordered by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Ranking {
    #[serde(with = "byte_hex")]
    pub dominant: u8,
    #[serde(with = "byte_hex")]
    pub subdominant: u8,
    #[serde(with = "byte_hex")]
    pub tertiary: u8,
}

/// Force names resolved for each rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RankedNames {
    pub dominant: ForceName,
    pub subdominant: ForceName,
    pub tertiary: ForceName,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriQuanta {
    soul_signature: SoulSignature,
    forces: Forces,
    ranking: Ranking,
    names: RankedNames,
}

impl TriQuanta {
    pub fn from_soul_signature(soul_signature: &SoulSignature) -> Self {
        let forces = Self::modulate(reduce(soul_signature.as_bytes()));
        Self::from_forces(*soul_signature, forces)
    }

    fn from_forces(soul_signature: SoulSignature, forces: Forces) -> Self {
        let ranking = forces.ranking();
        let names = RankedNames {
            dominant: resolve(&forces, ranking.dominant),
            subdominant: resolve(&forces, ranking.subdominant),
            tertiary: resolve(&forces, ranking.tertiary),
        };
        TriQuanta {
            soul_signature,
            forces,
            ranking,
            names,
        }
    }

    fn modulate(raw: u32) -> Forces {
        let [a, b, c, modulator] = raw.to_be_bytes();
        let apply = |byte: u8| ((u16::from(byte) + u16::from(modulator)) % MODULATION_MODULUS) as u8;
        Forces {
            genesis: apply(a),
            stasis: apply(b),
            metamorphosis: apply(c),
        }
    }

    pub fn soul_signature(&self) -> &SoulSignature {
        &self.soul_signature
    }

    pub fn forces(&self) -> Forces {
        self.forces
    }

    pub fn ranking(&self) -> Ranking {
        self.ranking
    }

    pub fn force(&self, name: ForceName) -> u8 {
        self.forces.get(name)
    }

    /// The modulated quanta as six hex characters, genesis first.
    pub fn quanta_hex(&self) -> String {
        hex::encode(self.forces.as_array())
    }

    pub fn dominant_force(&self) -> u8 {
        self.ranking.dominant
    }

    pub fn dominant_force_hex(&self) -> String {
        encode_byte(self.ranking.dominant)
    }

    pub fn dominant_force_name(&self) -> ForceName {
        self.names.dominant
    }

    pub fn subdominant_force_name(&self) -> ForceName {
        self.names.subdominant
    }

    pub fn tertiary_force_name(&self) -> ForceName {
        self.names.tertiary
    }

    pub fn ranked_names(&self) -> RankedNames {
        self.names
    }
}

/// Big-endian digest value modulo [`QUANTA_MODULUS`].
fn reduce(digest: &[u8]) -> u32 {
    let value = digest
        .iter()
        .fold(0u64, |acc, byte| (acc * 256 + u64::from(*byte)) % QUANTA_MODULUS);
    value as u32
}

fn resolve(forces: &Forces, value: u8) -> ForceName {
    // The ranked value always comes from the same triple.
    forces.name_of(value).unwrap_or(ForceName::Genesis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn soul_with_tail(tail: [u8; 4]) -> SoulSignature {
        let mut bytes = [0x5a; 32];
        bytes[28..].copy_from_slice(&tail);
        SoulSignature::from_bytes(bytes)
    }

    fn forces(genesis: u8, stasis: u8, metamorphosis: u8) -> Forces {
        Forces {
            genesis,
            stasis,
            metamorphosis,
        }
    }

    #[test]
    fn test_reduction_keeps_low_four_bytes() {
        let soul = soul_with_tail([0x01, 0x02, 0x03, 0x04]);
        assert_eq!(reduce(soul.as_bytes()), 0x0102_0304);
    }

    #[test]
    fn test_modulation_uses_mod_255() {
        let tq = TriQuanta::from_soul_signature(&soul_with_tail([0x10, 0xfe, 0x00, 0x01]));
        assert_eq!(tq.forces(), forces(0x11, 0x00, 0x01));
        assert_eq!(tq.quanta_hex(), "110001");
    }

    #[test]
    fn test_modulation_zero_tail() {
        let tq = TriQuanta::from_soul_signature(&soul_with_tail([0xff, 0x00, 0x80, 0x00]));
        // 0xff + 0 wraps to 0 under mod 255
        assert_eq!(tq.forces(), forces(0x00, 0x00, 0x80));
    }

    #[test]
    fn test_ranking_law_example() {
        let tq = TriQuanta::from_forces(SoulSignature::from_bytes([0; 32]), forces(0x12, 0x05, 0xaa));
        let ranking = tq.ranking();
        assert_eq!(ranking.dominant, 0xaa);
        assert_eq!(ranking.subdominant, 0x12);
        assert_eq!(ranking.tertiary, 0x05);
        assert_eq!(tq.dominant_force_name(), ForceName::Metamorphosis);
        assert_eq!(tq.subdominant_force_name(), ForceName::Genesis);
        assert_eq!(tq.tertiary_force_name(), ForceName::Stasis);
        assert_eq!(tq.dominant_force_hex(), "aa");
    }

    #[test]
    fn test_ties_resolve_to_first_name() {
        let tq = TriQuanta::from_forces(SoulSignature::from_bytes([0; 32]), forces(0x40, 0x90, 0x90));
        assert_eq!(tq.dominant_force_name(), ForceName::Stasis);
        assert_eq!(tq.subdominant_force_name(), ForceName::Stasis);
        assert_eq!(tq.tertiary_force_name(), ForceName::Genesis);
    }

    #[test]
    fn test_serialized_shape() {
        let tq = TriQuanta::from_forces(SoulSignature::from_bytes([0; 32]), forces(0x12, 0x05, 0xaa));
        let json = serde_json::to_value(&tq).unwrap();
        assert_eq!(json["forces"]["genesis"], "12");
        assert_eq!(json["ranking"]["dominant"], "aa");
        assert_eq!(json["names"]["dominant"], "metamorphosis");
        assert_eq!(json["soulSignature"], "00".repeat(32));
    }

    proptest! {
        #[test]
        fn prop_ranking_is_permutation(bytes in any::<[u8; 32]>()) {
            let tq = TriQuanta::from_soul_signature(&SoulSignature::from_bytes(bytes));
            let ranking = tq.ranking();
            let mut ranked = [ranking.tertiary, ranking.subdominant, ranking.dominant];
            let mut unsorted = tq.forces().as_array();
            ranked.sort_unstable();
            unsorted.sort_unstable();
            prop_assert_eq!(ranked, unsorted);
            prop_assert!(ranking.tertiary <= ranking.subdominant && ranking.subdominant <= ranking.dominant);
            prop_assert_eq!(tq.force(tq.dominant_force_name()), ranking.dominant);
            for value in tq.forces().as_array() {
                prop_assert!(value < 255);
            }
        }

        #[test]
        fn prop_deterministic(bytes in any::<[u8; 32]>()) {
            let soul = SoulSignature::from_bytes(bytes);
            prop_assert_eq!(TriQuanta::from_soul_signature(&soul), TriQuanta::from_soul_signature(&soul));
        }
    }
}
