use crate::capability::{HashCapability, MAX_DIGEST};
use crate::error::CoreError;
use crate::lamport::bit_positions;
use crate::size::{pr_sz, sg_sz, wa_sz};
use crate::stack::{push_hash_of, split_work_area};

/// Scans the left side-stack's recorded levels (already written to the
/// output buffer, bottom-to-top) from the top down, absorbing every entry
/// whose level is no greater than the current carry level `m`. Returns the
/// resulting `m`.
///
/// This determines the starting carry level the right-suffix stack compares
/// against, before a single right-side leaf has been processed. The
/// revealed signing slot's own Lamport subtree root is never computed (it's
/// implicitly reconstructable by the verifier), so it behaves here as a
/// virtual stack entry at level `h + 4`; this scan accounts for any left
/// entries that would immediately merge with it.
fn carry_scan(left_levels: &[u8], h: u32) -> u32 {
    let mut m = h + 4;
    let mut idx = left_levels.len();
    while idx > 0 && left_levels[idx - 1] as u32 <= m {
        m += 1;
        idx -= 1;
    }
    m
}

/// Produces a signature over `message_hash` (exactly `B = 2^h` bytes) using
/// the `offset`-th one-time leaf slot of a private key of the given
/// `(h, s)`.
///
/// `private` must be `pr_sz(h, s)` bytes, `work` exactly `wa_sz(h, s)`
/// bytes, and `sig_out` at least `sg_sz(h, s)` bytes (the worst case). The
/// actual number of bytes written, returned on success, is usually
/// smaller: every side-stack entry the verifier can re-derive from the
/// revealed Lamport data and the already-emitted left stack is omitted.
///
/// `offset` identifies which of the `2^s` one-time leaves this call
/// consumes. This crate does not track which offsets a given private key
/// has already signed with. Reusing an offset breaks the scheme's
/// security exactly as reusing a Lamport key pair does. Track used offsets
/// externally.
pub fn sign<C: HashCapability>(
    cap: &C,
    h: u32,
    s: u32,
    private: &[u8],
    work: &mut [u8],
    message_hash: &[u8],
    offset: u32,
    sig_out: &mut [u8],
) -> Result<usize, CoreError> {
    let b = cap.digest_len();
    if b == 0 || h >= 63 || (1usize << h) != b {
        return Err(CoreError::InvalidParameters {
            reason: "hash capability digest length does not match h",
        });
    }
    if b > MAX_DIGEST {
        return Err(CoreError::InvalidParameters {
            reason: "hash capability digest length exceeds MAX_DIGEST",
        });
    }
    if message_hash.len() != b {
        return Err(CoreError::InvalidParameters {
            reason: "message hash length does not match B = 2^h",
        });
    }
    if s < 32 && offset >= (1u32 << s) {
        return Err(CoreError::InvalidParameters {
            reason: "signing offset out of range for s",
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
    let needed_sig = sg_sz(h, s);
    if needed_sig == 0 || (sig_out.len() as u64) < needed_sig {
        return Err(CoreError::InvalidParameters {
            reason: "signature buffer smaller than SgSz(h, s)",
        });
    }

    let mut ctx = cap.allocate().ok_or(CoreError::CapabilityUnavailable)?;
    let depth = (expected_wa / (b as u64 + 1)) as usize;
    let total_leaves = (expected_pr / b as u64) as usize;
    let slot_leaves = 16 * b; // one signing slot spans 2^(h+4) preimage blocks
    let slot_start = offset as usize * slot_leaves;

    let mut stack = split_work_area(work, depth, b);
    let mut pos = 0usize;
    let mut i = 0usize;

    // Phase A: build the left-prefix Merkle stack over every preimage
    // block before this signing slot.
    let mut j = 0usize;
    while i < slot_start {
        push_hash_of(cap, &mut ctx, &mut stack, &mut j, 0, &private[i * b..(i + 1) * b]);
        i += 1;
    }
    let jl = j;

    // Phase B: emit the left stack.
    sig_out[pos] = jl as u8;
    pos += 1;
    for idx in 0..jl {
        sig_out[pos] = stack.lvl_at(idx);
        pos += 1;
        sig_out[pos..pos + b].copy_from_slice(stack.dig_at(idx));
        pos += b;
    }
    let left_header_start = 1usize;

    // Phase C: determine the carry level the right suffix will compare
    // against, from the left stack's levels (still intact in `stack`).
    let mut m = carry_scan(&stack.lvl[..jl], h);

    // Phase D: reveal the Lamport preimages for this signing slot,
    // writing directly into the signature. No stack pushes happen here;
    // the revealed subtree's root is never computed by the signer.
    for (byte_index, mask) in bit_positions(b) {
        if crate::lamport::bit_is_set(message_hash, byte_index, mask) {
            crate::capability::hash_once(cap, &mut ctx, &private[i * b..(i + 1) * b], &mut sig_out[pos..pos + b]);
            pos += b;
            i += 1;
            sig_out[pos..pos + b].copy_from_slice(&private[i * b..(i + 1) * b]);
            pos += b;
            i += 1;
        } else {
            sig_out[pos..pos + b].copy_from_slice(&private[i * b..(i + 1) * b]);
            pos += b;
            i += 1;
            crate::capability::hash_once(cap, &mut ctx, &private[i * b..(i + 1) * b], &mut sig_out[pos..pos + b]);
            pos += b;
            i += 1;
        }
    }

    // Phase E: build the right-suffix stack over the remaining preimages,
    // reusing the same work-area buffer from index 0 (the left stack's
    // bytes are already safely emitted to `sig_out`). Whenever the right
    // stack's current top level catches the carry level `m`, that entry is
    // frozen (never combined further) rather than suppressed from the
    // array. What makes it omittable from the final emission is that the
    // loop below only ever emits the entries `combine` leaves in place,
    // and entries below a raised barrier stop being touched, not that they
    // vanish from `j`.
    let mut k_barrier = 0usize;
    let mut jr = 0usize;
    while i < total_leaves {
        push_hash_of(cap, &mut ctx, &mut stack, &mut jr, k_barrier, &private[i * b..(i + 1) * b]);
        i += 1;
        if jr > 0 && stack.lvl_at(jr - 1) as u32 == m {
            k_barrier += 1;
            m += 1;
            let left_levels = &sig_out[left_header_start..left_header_start + jl * (1 + b)];
            let mut l = jl;
            while l > 0 {
                let t = left_levels[(l - 1) * (1 + b)] as u32;
                if t > m {
                    break;
                }
                if t == m {
                    m += 1;
                }
                l -= 1;
            }
        }
    }

    // Phase F: emit the right stack.
    sig_out[pos] = jr as u8;
    pos += 1;
    for idx in 0..jr {
        sig_out[pos] = stack.lvl_at(idx);
        pos += 1;
        sig_out[pos..pos + b].copy_from_slice(stack.dig_at(idx));
        pos += b;
    }

    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::test_support::ToyHash;
    use crate::public::public_root;
    use crate::recover::recover;
    use crate::size::{ew_sz, pr_sz, sg_sz, wa_sz};

    fn private_key(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 + 7) as u8).collect()
    }

    #[test]
    fn rejects_digest_width_exceeding_max_digest() {
        let h = 7u32; // B = 128, larger than MAX_DIGEST = 64
        let cap = ToyHash { b: 1 << h };
        let private = vec![0u8; 1];
        let mut work = vec![0u8; 1];
        let msg = vec![0u8; 1];
        let mut sig = vec![0u8; 1];
        let err = sign(&cap, h, 1, &private, &mut work, &msg, 0, &mut sig).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidParameters {
                reason: "hash capability digest length exceeds MAX_DIGEST"
            }
        );
    }

    #[test]
    fn rejects_offset_out_of_range() {
        let h = 2u32;
        let s = 1u32;
        let cap = ToyHash { b: 1 << h };
        let private = private_key(pr_sz(h, s) as usize);
        let mut work = vec![0u8; wa_sz(h, s) as usize];
        let mut sig = vec![0u8; sg_sz(h, s) as usize];
        let msg = vec![0u8; 1 << h];
        let err = sign(&cap, h, s, &private, &mut work, &msg, 2, &mut sig).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidParameters {
                reason: "signing offset out of range for s"
            }
        );
    }

    #[test]
    fn rejects_wrong_message_length() {
        let h = 2u32;
        let s = 1u32;
        let cap = ToyHash { b: 1 << h };
        let private = private_key(pr_sz(h, s) as usize);
        let mut work = vec![0u8; wa_sz(h, s) as usize];
        let mut sig = vec![0u8; sg_sz(h, s) as usize];
        let msg = vec![0u8; 1];
        let err = sign(&cap, h, s, &private, &mut work, &msg, 0, &mut sig).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidParameters {
                reason: "message hash length does not match B = 2^h"
            }
        );
    }

    #[test]
    fn bytes_written_never_exceeds_sg_sz() {
        let h = 3u32;
        let s = 2u32;
        let cap = ToyHash { b: 1 << h };
        let private = private_key(pr_sz(h, s) as usize);
        let mut work = vec![0u8; wa_sz(h, s) as usize];
        let msg: Vec<u8> = (0..(1u32 << h) as usize).map(|i| i as u8).collect();
        for offset in 0..(1u32 << s) {
            let mut sig = vec![0u8; sg_sz(h, s) as usize];
            let written = sign(&cap, h, s, &private, &mut work, &msg, offset, &mut sig).unwrap();
            assert!(written as u64 <= sg_sz(h, s));
        }
    }

    #[test]
    fn sign_then_recover_reaches_the_public_root() {
        let h = 3u32;
        let s = 2u32;
        let cap = ToyHash { b: 1 << h };
        let private = private_key(pr_sz(h, s) as usize);
        let mut pub_work = vec![0u8; wa_sz(h, s) as usize];
        let root = public_root(&cap, h, s, &private, &mut pub_work).unwrap().to_vec();

        for offset in 0..(1u32 << s) {
            let msg: Vec<u8> = (0..(1u32 << h) as usize)
                .map(|i| (i as u32 + offset).wrapping_mul(17) as u8)
                .collect();
            let mut sign_work = vec![0u8; wa_sz(h, s) as usize];
            let mut sig = vec![0u8; sg_sz(h, s) as usize];
            let written = sign(&cap, h, s, &private, &mut sign_work, &msg, offset, &mut sig).unwrap();
            sig.truncate(written);

            let needed_work = ew_sz(h, &sig) as usize;
            let mut rec_work = vec![0u8; needed_work];
            let recovered = recover(&cap, h, &mut rec_work, &msg, &sig).unwrap();
            assert_eq!(recovered, root.as_slice(), "offset {offset} failed to recover the root");
        }
    }

    #[test]
    fn degenerate_single_leaf_tree_round_trips_with_empty_side_stacks() {
        // s=0, L=1, o=0: the degenerate single-leaf tree. The public root
        // equals the Lamport leaf hash, so the signature carries no side
        // stacks at all (jL=0, jR=0) and is exactly the Lamport reveal
        // bracketed by two zero-length headers.
        let h = 2u32;
        let s = 0u32;
        let b = 1usize << h;
        let cap = ToyHash { b };
        let private = private_key(pr_sz(h, s) as usize);

        let mut pub_work = vec![0u8; wa_sz(h, s) as usize];
        let root = public_root(&cap, h, s, &private, &mut pub_work).unwrap().to_vec();

        let msg: Vec<u8> = (0..b).map(|i| (i as u8).wrapping_mul(53)).collect();
        let mut sign_work = vec![0u8; wa_sz(h, s) as usize];
        let mut sig = vec![0u8; sg_sz(h, s) as usize];
        let written = sign(&cap, h, s, &private, &mut sign_work, &msg, 0, &mut sig).unwrap();
        sig.truncate(written);

        let lamport_len = 16 * b * b;
        assert_eq!(written, 1 + lamport_len + 1, "no side-stack entries should be emitted at s=0");
        assert_eq!(sig[0], 0, "left stack length must be 0 at s=0");
        assert_eq!(sig[1 + lamport_len], 0, "right stack length must be 0 at s=0");

        let mut rec_work = vec![0u8; ew_sz(h, &sig) as usize];
        let recovered = recover(&cap, h, &mut rec_work, &msg, &sig).unwrap();
        assert_eq!(recovered, root.as_slice());
    }

    #[test]
    fn left_side_stack_has_two_entries_at_offset_three_of_eight() {
        // s=3, o=3 (binary 011): two bits set below the signing slot, so
        // the left Merkle prefix collapses to exactly two frontier entries
        // (one at level h+5 from the first two slots combining, one at
        // level h+4 for the third slot that doesn't merge further).
        let h = 3u32;
        let s = 3u32;
        let cap = ToyHash { b: 1 << h };
        let private = private_key(pr_sz(h, s) as usize);
        let mut work = vec![0u8; wa_sz(h, s) as usize];
        let msg = vec![0u8; 1 << h];
        let mut sig = vec![0u8; sg_sz(h, s) as usize];
        sign(&cap, h, s, &private, &mut work, &msg, 3, &mut sig).unwrap();
        assert_eq!(sig[0], 2, "left side-stack should hold exactly 2 entries for offset 3");
    }
}
