//! The Lamport one-time-signature reveal: one preimage pair per bit of the
//! `B`-byte message digest, scanned byte index ascending and MSB-first
//! within each byte.

/// Yields `(byte_index, mask)` for every bit of a `b`-byte digest, in the
/// exact order the signer reveals and the recoverer replays them.
pub(crate) fn bit_positions(b: usize) -> impl Iterator<Item = (usize, u8)> {
    (0..b).flat_map(|k| (0..8u8).map(move |shift| (k, 0x80u8 >> shift)))
}

pub(crate) fn bit_is_set(digest: &[u8], byte_index: usize, mask: u8) -> bool {
    digest[byte_index] & mask != 0
}
