//! Owning convenience layer over `mls-core`'s caller-buffered functions, in
//! the style of `lib/src/xmss/wrapper.rs`'s `XmssWrapper`: callers that
//! don't want to size and hold their own work-area/signature buffers get a
//! struct that manages them internally, at the cost of an allocation per
//! call instead of zero.

use mls_core::{pr_sz, public_root, recover, sg_sz, sign, wa_sz, ew_sz, HashCapability};

use crate::error::WrapperError;

/// A private key paired with the `(h, s)` it was generated for and the hash
/// capability it signs with, owning its own scratch work area.
pub struct OwnedKeyPair<C: HashCapability> {
    cap: C,
    h: u32,
    s: u32,
    private: Vec<u8>,
    work: Vec<u8>,
}

impl<C: HashCapability> OwnedKeyPair<C> {
    /// Wraps an existing private key buffer. `private` must be exactly
    /// `pr_sz(h, s)` bytes. Callers are responsible for having generated it
    /// from a cryptographically secure source; this crate deliberately has
    /// no opinion on key generation.
    pub fn from_private_key(cap: C, h: u32, s: u32, private: Vec<u8>) -> Result<Self, WrapperError> {
        let expected = pr_sz(h, s);
        if expected == 0 || private.len() as u64 != expected {
            return Err(WrapperError::ParameterError {
                reason: format!("private key must be {expected} bytes for h={h}, s={s}"),
            });
        }
        let wa = wa_sz(h, s);
        if wa == 0 {
            return Err(WrapperError::ParameterError {
                reason: format!("h={h}, s={s} overflow the work-area size oracle"),
            });
        }
        Ok(Self {
            cap,
            h,
            s,
            private,
            work: vec![0u8; wa as usize],
        })
    }

    pub fn h(&self) -> u32 {
        self.h
    }

    pub fn s(&self) -> u32 {
        self.s
    }

    /// The number of one-time signing slots this key holds, `2^s`.
    pub fn capacity(&self) -> u64 {
        1u64 << self.s
    }

    /// Recomputes the Merkle root over the full private key. Not cheap,
    /// since it's a full `2^s` leaf scan, so callers
    /// should compute and publish this once, not before every signature.
    pub fn public_root(&mut self) -> Result<Vec<u8>, WrapperError> {
        let root = public_root(&self.cap, self.h, self.s, &self.private, &mut self.work)?;
        Ok(root.to_vec())
    }

    /// Signs `message_hash` (exactly `2^h` bytes) using one-time slot
    /// `offset`. Reusing an `offset` across two calls breaks the scheme;
    /// this wrapper does not track used offsets, matching `mls-core`.
    pub fn sign(&mut self, message_hash: &[u8], offset: u32) -> Result<Vec<u8>, WrapperError> {
        if self.s < 32 && offset as u64 >= self.capacity() {
            return Err(WrapperError::OffsetOutOfRange {
                offset,
                s: self.s,
                limit: self.capacity(),
            });
        }
        let needed = sg_sz(self.h, self.s);
        let mut sig = vec![0u8; needed as usize];
        let written = sign(&self.cap, self.h, self.s, &self.private, &mut self.work, message_hash, offset, &mut sig)?;
        sig.truncate(written);
        Ok(sig)
    }
}

/// Recovers the Merkle root a signature resolves to, owning its own
/// work-area allocation sized from the signature's own stack-length header
/// bytes via [`mls_core::ew_sz`].
pub fn recover_root<C: HashCapability>(cap: &C, h: u32, message_hash: &[u8], sig: &[u8]) -> Result<Vec<u8>, WrapperError> {
    let needed = ew_sz(h, sig);
    if needed == 0 {
        return Err(WrapperError::ParameterError {
            reason: "signature too short to read its stack-length header".to_string(),
        });
    }
    let mut work = vec![0u8; needed as usize];
    let root = recover(cap, h, &mut work, message_hash, sig)?;
    Ok(root.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mls_hash::Sha256Capability;

    fn private_key(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 43 + 11) as u8).collect()
    }

    #[test]
    fn rejects_mismatched_private_key_length() {
        let err = OwnedKeyPair::from_private_key(Sha256Capability, 5, 2, vec![0u8; 4]).unwrap_err();
        assert!(matches!(err, WrapperError::ParameterError { .. }));
    }

    #[test]
    fn owned_round_trip_through_sign_and_recover() {
        let h = 5u32;
        let s = 2u32;
        let private = private_key(mls_core::pr_sz(h, s) as usize);
        let mut keypair = OwnedKeyPair::from_private_key(Sha256Capability, h, s, private).unwrap();
        let root = keypair.public_root().unwrap();

        let msg = vec![0x11u8; 1 << h];
        let sig = keypair.sign(&msg, 1).unwrap();

        let recovered = recover_root(&Sha256Capability, h, &msg, &sig).unwrap();
        assert_eq!(recovered, root);
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let h = 4u32;
        let s = 2u32;
        let private = private_key(mls_core::pr_sz(h, s) as usize);
        let mut keypair = OwnedKeyPair::from_private_key(Sha256Capability, h, s, private).unwrap();
        let msg = vec![0u8; 1 << h];
        let err = keypair.sign(&msg, 4).unwrap_err();
        assert!(matches!(err, WrapperError::OffsetOutOfRange { offset: 4, s: 2, limit: 4 }));
    }
}
