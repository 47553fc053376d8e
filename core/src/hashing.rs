//! Line and token fingerprinting.
//!
//! The fold is a fixed-seed FNV-style mix with a shifted-add scramble. The
//! seed and mixer are load-bearing: fingerprints must stay stable across
//! releases so hosts can rely on them.

pub(crate) const HASH_SEED: u64 = 0x8422_2325;

/// Folds one byte into a running fingerprint.
#[inline]
pub(crate) fn fold_hash(hash: u64, byte: u8) -> u64 {
    let h = hash ^ u64::from(byte);
    h.wrapping_add(h << 1)
        .wrapping_add(h << 4)
        .wrapping_add(h << 5)
        .wrapping_add(h << 7)
        .wrapping_add(h << 8)
        .wrapping_add(h << 40)
}
