use crate::capability::{HashCapability, MAX_DIGEST};
use crate::error::CoreError;
use crate::lamport::bit_positions;
use crate::size::{read_stack_lengths, wa_sz};
use crate::stack::{combine, push_known_digest, set_leaf_hashed, set_leaf_known, split_work_area};

/// Replays a signature produced by `sign` against `message_hash`,
/// reconstructing the Merkle root it was signed under.
///
/// `work` must be exactly `ew_sz(h, sig)` (equivalently `rc_sz(h, sig)`)
/// bytes. Returns a `B`-byte slice into `work` holding the recomputed
/// root; the caller compares it against the expected public key.
pub fn recover<'w, C: HashCapability>(
    cap: &C,
    h: u32,
    work: &'w mut [u8],
    message_hash: &[u8],
    sig: &[u8],
) -> Result<&'w [u8], CoreError> {
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
    let (jl, jr) = read_stack_lengths(h, sig).ok_or(CoreError::MalformedSignature {
        reason: "signature too short to contain its left stack and Lamport reveal",
    })?;
    let expected_wa = wa_sz(h, jl as u32 + jr as u32);
    if expected_wa == 0 || work.len() as u64 != expected_wa {
        return Err(CoreError::InvalidParameters {
            reason: "work area length does not match EwSz/RcSz(h, sig)",
        });
    }

    let mut ctx = cap.allocate().ok_or(CoreError::CapabilityUnavailable)?;
    let depth = (expected_wa / (b as u64 + 1)) as usize;

    let root_idx;
    {
        let mut stack = split_work_area(work, depth, b);
        let mut pos = 1usize; // past the jL header byte

        // Step 1: copy the left stack's entries directly, at their
        // recorded levels, below index `jl`, with no combining here. The
        // stack pointer starts at `jl` itself, and the left entries are
        // filled in underneath it by plain assignment.
        let mut j = jl as usize;
        for k in 0..jl as usize {
            let level = *sig.get(pos).ok_or(CoreError::MalformedSignature {
                reason: "signature truncated within left stack",
            })?;
            pos += 1;
            let digest = sig.get(pos..pos + b).ok_or(CoreError::MalformedSignature {
                reason: "signature truncated within left stack",
            })?;
            stack.set_lvl(k, level);
            stack.dig_at_mut(k).copy_from_slice(digest);
            pos += b;
        }

        // Step 2: replay the Lamport reveal, reconstructing 16B leaves
        // (two per message-digest bit) and folding them, and as levels
        // rise the left stack below them, through the same combine
        // engine the signer conceptually ran.
        for (byte_index, mask) in bit_positions(b) {
            let bit_set = crate::lamport::bit_is_set(message_hash, byte_index, mask);
            if bit_set {
                let known = sig.get(pos..pos + b).ok_or(CoreError::MalformedSignature {
                    reason: "signature truncated within Lamport reveal",
                })?;
                set_leaf_known(&mut stack, j, known);
                pos += b;
                j += 1;
                let src = sig.get(pos..pos + b).ok_or(CoreError::MalformedSignature {
                    reason: "signature truncated within Lamport reveal",
                })?;
                set_leaf_hashed(cap, &mut ctx, &mut stack, j, src);
                pos += b;
            } else {
                let src = sig.get(pos..pos + b).ok_or(CoreError::MalformedSignature {
                    reason: "signature truncated within Lamport reveal",
                })?;
                set_leaf_hashed(cap, &mut ctx, &mut stack, j, src);
                pos += b;
                j += 1;
                let known = sig.get(pos..pos + b).ok_or(CoreError::MalformedSignature {
                    reason: "signature truncated within Lamport reveal",
                })?;
                set_leaf_known(&mut stack, j, known);
                pos += b;
            }
            combine(cap, &mut ctx, &mut stack, &mut j, 0);
            j += 1;
        }

        // Step 3: read the right stack's header and entries, pushing each
        // at its recorded level and combining as we go.
        let jr_read = *sig.get(pos).ok_or(CoreError::MalformedSignature {
            reason: "signature missing right stack length byte",
        })?;
        pos += 1;
        for _ in 0..jr_read {
            let level = *sig.get(pos).ok_or(CoreError::MalformedSignature {
                reason: "signature truncated within right stack",
            })?;
            pos += 1;
            let digest = sig.get(pos..pos + b).ok_or(CoreError::MalformedSignature {
                reason: "signature truncated within right stack",
            })?;
            push_known_digest(cap, &mut ctx, &mut stack, &mut j, 0, level, digest);
            pos += b;
        }

        if j == 0 {
            return Err(CoreError::MalformedSignature {
                reason: "signature folds to an empty stack",
            });
        }
        root_idx = j - 1;
    }
    Ok(&work[depth + root_idx * b..depth + (root_idx + 1) * b])
}
