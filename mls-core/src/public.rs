use crate::capability::{HashCapability, MAX_DIGEST};
use crate::error::CoreError;
use crate::size::{pr_sz, wa_sz};
use crate::stack::{push_hash_of, split_work_area};

/// Computes the Merkle root (the public key) over every `B`-byte preimage
/// block of a private key of the given `(h, s)`, streaming leaves through
/// the stack-Merkle engine rather than materializing a tree.
///
/// `private` must be exactly `pr_sz(h, s)` bytes; `work` must be exactly
/// `wa_sz(h, s)` bytes. Returns a `B`-byte slice into `work` holding the
/// root, valid only until `work` is reused for another call.
pub fn public_root<'w, C: HashCapability>(
    cap: &C,
    h: u32,
    s: u32,
    private: &[u8],
    work: &'w mut [u8],
) -> Result<&'w [u8], CoreError> {
    let b = cap.digest_len();
    if b == 0 || (1usize << h.min(63)) != b || h >= 63 {
        return Err(CoreError::InvalidParameters {
            reason: "hash capability digest length does not match h",
        });
    }
    if b > MAX_DIGEST {
        return Err(CoreError::InvalidParameters {
            reason: "hash capability digest length exceeds MAX_DIGEST",
        });
    }
    let expected_pr = pr_sz(h, s);
    if expected_pr == 0 || private.len() as u64 != expected_pr {
        return Err(CoreError::InvalidParameters {
            reason: "private key length does not match PrSz(h, s)",
        });
    }
    let expected_wa = wa_sz(h, s);
    if expected_wa == 0 || work.len() as u64 != expected_wa {
        return Err(CoreError::InvalidParameters {
            reason: "work area length does not match WaSz(h, s)",
        });
    }

    let mut ctx = cap.allocate().ok_or(CoreError::CapabilityUnavailable)?;
    let depth = (expected_wa / (b as u64 + 1)) as usize;
    let total_leaves = (expected_pr / b as u64) as usize;

    let root_idx;
    {
        let mut stack = split_work_area(work, depth, b);
        let mut j = 0usize;
        for i in 0..total_leaves {
            push_hash_of(cap, &mut ctx, &mut stack, &mut j, 0, &private[i * b..(i + 1) * b]);
        }
        debug_assert_eq!(j, 1, "a full power-of-two leaf stream always collapses to one root");
        root_idx = j - 1;
    }
    Ok(&work[depth + root_idx * b..depth + (root_idx + 1) * b])
}
