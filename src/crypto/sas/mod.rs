//! # Short Authentication String (SAS) Module
//!
//! Derives a human-comparable, 7-emoji fingerprint from a stable
//! commitment to the group key state, so participants can detect
//! man-in-the-middle attacks by comparing the SAS out of band.
//!
//! The derivation is a BLAKE3 XOF (see `crypto::hash`) producing exactly
//! `n_bits` of pseudorandom output, sliced into seven 6-bit indices into
//! a fixed 64-entry emoji table.

use crate::crypto::hash::DeriveKey;

/// Number of SAS bits the protocol derives (7 entries * 6 bits each).
pub const SAS_BIT_LENGTH: usize = 42;

/// Number of emoji entries in a rendered SAS.
pub const SAS_EMOJI_COUNT: usize = 7;

/// Domain-separation context for SAS bit derivation.
const SAS_CONTEXT: &str = "confcrypt-core/v1/sas-bits";

/// Fixed 64-entry emoji table, indices 0..63.
///
/// Each entry is `(emoji_name, english_label)`. Emoji glyph rendering is
/// left to the caller/UI; this crate only exposes the stable name/label
/// pair per the wire-fixed alphabet.
pub const SAS_EMOJI_TABLE: [(&str, &str); 64] = [
    ("dog", "Dog"),
    ("cat", "Cat"),
    ("lion", "Lion"),
    ("horse", "Horse"),
    ("unicorn", "Unicorn"),
    ("pig", "Pig"),
    ("elephant", "Elephant"),
    ("rabbit", "Rabbit"),
    ("panda", "Panda"),
    ("rooster", "Rooster"),
    ("penguin", "Penguin"),
    ("turtle", "Turtle"),
    ("fish", "Fish"),
    ("octopus", "Octopus"),
    ("butterfly", "Butterfly"),
    ("flower", "Flower"),
    ("tree", "Tree"),
    ("cactus", "Cactus"),
    ("mushroom", "Mushroom"),
    ("globe", "Globe"),
    ("moon", "Moon"),
    ("cloud", "Cloud"),
    ("fire", "Fire"),
    ("banana", "Banana"),
    ("apple", "Apple"),
    ("strawberry", "Strawberry"),
    ("corn", "Corn"),
    ("pizza", "Pizza"),
    ("cake", "Cake"),
    ("heart", "Heart"),
    ("smiley", "Smiley"),
    ("robot", "Robot"),
    ("hat", "Hat"),
    ("glasses", "Glasses"),
    ("spanner", "Spanner"),
    ("santa", "Santa"),
    ("thumbs up", "Thumbs Up"),
    ("umbrella", "Umbrella"),
    ("hourglass", "Hourglass"),
    ("clock", "Clock"),
    ("gift", "Gift"),
    ("light bulb", "Light Bulb"),
    ("book", "Book"),
    ("pencil", "Pencil"),
    ("paperclip", "Paperclip"),
    ("scissors", "Scissors"),
    ("lock", "Lock"),
    ("key", "Key"),
    ("hammer", "Hammer"),
    ("telephone", "Telephone"),
    ("flag", "Flag"),
    ("train", "Train"),
    ("bicycle", "Bicycle"),
    ("aeroplane", "Aeroplane"),
    ("rocket", "Rocket"),
    ("trophy", "Trophy"),
    ("ball", "Ball"),
    ("guitar", "Guitar"),
    ("trumpet", "Trumpet"),
    ("bell", "Bell"),
    ("anchor", "Anchor"),
    ("headphones", "Headphones"),
    ("folder", "Folder"),
    ("pin", "Pin"),
];

/// The seven 6-bit emoji-table indices derived from a SAS bitstring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SasIndices(pub [u8; SAS_EMOJI_COUNT]);

/// Derive exactly `n_bits` of SAS material from `input` via BLAKE3 XOF.
///
/// `n_bits` must be a multiple of 8; the returned buffer has
/// `n_bits / 8` bytes. The protocol fixes `n_bits = 42`... in practice
/// the extraction below slices 6-bit groups directly out of the byte
/// stream, so this returns enough whole bytes to cover `n_bits`
/// (`ceil(n_bits / 8)` bytes) with only the low bits of the last byte
/// considered significant.
pub fn derive_sas_bits(input: &str, n_bits: usize) -> Vec<u8> {
    let byte_len = n_bits.div_ceil(8);
    let dk = DeriveKey::new(&[], SAS_CONTEXT);
    dk.derive(input.as_bytes(), byte_len)
}

/// Slice the first `SAS_BIT_LENGTH` bits of `input`'s SAS derivation into
/// seven 6-bit indices into [`SAS_EMOJI_TABLE`].
///
/// This is the canonical base64-style bit-slicing over the first 5
/// bytes of the 42-bit SAS material.
pub fn sas_indices(input: &str) -> SasIndices {
    let bytes = derive_sas_bits(input, SAS_BIT_LENGTH);
    // derive_sas_bits rounds 42 bits up to 6 whole bytes (48 bits); read
    // all 6 and take the top 42 as seven groups of 6.
    let mut bits: u64 = 0;
    for &b in bytes.iter().take(6) {
        bits = (bits << 8) | b as u64;
    }
    let mut indices = [0u8; SAS_EMOJI_COUNT];
    for (i, slot) in indices.iter_mut().enumerate() {
        let shift = 48 - 6 * (i + 1);
        *slot = ((bits >> shift) & 0x3F) as u8;
    }
    SasIndices(indices)
}

/// Render `input`'s SAS as seven `(emoji_name, english_label)` pairs.
pub fn sas_emojis(input: &str) -> Vec<(&'static str, &'static str)> {
    sas_indices(input)
        .0
        .iter()
        .map(|&idx| SAS_EMOJI_TABLE[idx as usize])
        .collect()
}
