/// The integer type every size oracle in this module returns. Wide enough
/// that overflow checks against tiny and huge `h`/`s` pairs are meaningful.
pub type Sz = u64;

const BITS: u32 = Sz::BITS;

/// `B = 2^h`, the digest width in bytes for a given `h`. `None` if `h`
/// doesn't fit the `Sz` bit width.
fn digest_bytes(h: u32) -> Option<u64> {
    if h >= BITS {
        None
    } else {
        Some(1u64 << h)
    }
}

/// Number of stack-entry slots a work area must reserve for a tree of
/// height `s` (or, for the recovery path, for `jL + jR` combined side-stack
/// entries; `rc_sz`/`ew_sz` call this with that sum in place of `s`).
///
/// Two equally-plausible formulas exist for `s = 0`: `h + 3 + (s>1 ? 2s : 3)`
/// gives `h + 6`, while `h + 4 + 2s - 1` gives `h + 3`; they agree for every
/// `s >= 1`. This picks the conservative (larger) bound. See `DESIGN.md`.
fn stack_depth(h: u32, s: u32) -> Option<u64> {
    let h = h as u64;
    let s = s as u64;
    if s == 0 {
        h.checked_add(6)
    } else {
        h.checked_add(4)?.checked_add(s.checked_mul(2)?)?.checked_sub(1)
    }
}

/// `PrSz(h, s)`: total private-key byte length, `2^(2h + s + 4)`.
/// Returns 0 to signal overflow of `Sz`.
pub fn pr_sz(h: u32, s: u32) -> Sz {
    (|| {
        let exp = (h as u64).checked_mul(2)?.checked_add(s as u64)?.checked_add(4)?;
        if exp >= BITS as u64 {
            return None;
        }
        Some(1u64 << exp)
    })()
    .unwrap_or(0)
}

/// `WaSz(h, s)`: work-area byte length, `stack_depth(h, s) * (1 + B)`.
pub fn wa_sz(h: u32, s: u32) -> Sz {
    (|| {
        let depth = stack_depth(h, s)?;
        let b = digest_bytes(h)?;
        let per_entry = b.checked_add(1)?;
        depth.checked_mul(per_entry)
    })()
    .unwrap_or(0)
}

/// `SgSz(h, s)`: worst-case signature byte length,
/// `2 + s*(1+B) + 2^(2h+4)` (two stack-length header bytes, at most `s`
/// combined side-stack entries, plus the full Lamport reveal).
pub fn sg_sz(h: u32, s: u32) -> Sz {
    (|| {
        let b = digest_bytes(h)?;
        let per_entry = b.checked_add(1)?;
        let side_stacks = (s as u64).checked_mul(per_entry)?;
        let lamport_exp = (h as u64).checked_mul(2)?.checked_add(4)?;
        if lamport_exp >= BITS as u64 {
            return None;
        }
        let lamport = 1u64 << lamport_exp;
        2u64.checked_add(side_stacks)?.checked_add(lamport)
    })()
    .unwrap_or(0)
}

/// Byte length of the full Lamport reveal block, `2^(2h+4)`. Shared by
/// `sg_sz` and the signature-reading oracles below.
pub(crate) fn lamport_block_len(h: u32) -> Option<u64> {
    let exp = (h as u64).checked_mul(2)?.checked_add(4)?;
    if exp >= BITS as u64 {
        None
    } else {
        Some(1u64 << exp)
    }
}

/// Reads `jL` (signature byte 0) and, from it, locates and reads `jR`, the
/// right-stack length byte immediately following the left stack and the
/// Lamport reveal. Returns `None` if `sig` is too short to contain the left
/// stack and the Lamport reveal (so the `jR` byte itself isn't present).
pub(crate) fn read_stack_lengths(h: u32, sig: &[u8]) -> Option<(u8, u8)> {
    let b = digest_bytes(h)?;
    let jl = *sig.first()?;
    let left_bytes = (jl as u64).checked_mul(b.checked_add(1)?)?;
    let lamport = lamport_block_len(h)?;
    let jr_offset = 1u64.checked_add(left_bytes)?.checked_add(lamport)?;
    let jr_offset = usize::try_from(jr_offset).ok()?;
    let jr = *sig.get(jr_offset)?;
    Some((jl, jr))
}

/// `EgSz(h, sig)`: the exact total signature length, computed from the two
/// stack-length header bytes read out of `sig`. Zero if `sig` is too short
/// to contain the left stack and Lamport reveal.
pub fn eg_sz(h: u32, sig: &[u8]) -> Sz {
    (|| {
        let (jl, jr) = read_stack_lengths(h, sig)?;
        let b = digest_bytes(h)?;
        let per_entry = b.checked_add(1)?;
        let left = (jl as u64).checked_mul(per_entry)?;
        let right = (jr as u64).checked_mul(per_entry)?;
        let lamport = lamport_block_len(h)?;
        1u64.checked_add(left)?
            .checked_add(lamport)?
            .checked_add(1)?
            .checked_add(right)
    })()
    .unwrap_or(0)
}

/// `EwSz(h, sig)`: the exact work-area size a call to `recover` on this
/// signature would need, `WaSz(h, jL + jR)`.
pub fn ew_sz(h: u32, sig: &[u8]) -> Sz {
    (|| {
        let (jl, jr) = read_stack_lengths(h, sig)?;
        let total = (jl as u32).checked_add(jr as u32)?;
        Some(wa_sz(h, total))
    })()
    .unwrap_or(0)
}

/// `RcSz(h, sig)`: identical formula to `ew_sz`, named separately because
/// it's the size a caller computes *before* calling `recover`, from a
/// signature of unknown provenance, while `EwSz` is typically checked
/// against a signature `sign` just produced.
pub fn rc_sz(h: u32, sig: &[u8]) -> Sz {
    ew_sz(h, sig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pr_sz_matches_worked_examples() {
        // h=5, s=1 -> PrSz = 2^(10+1+4) = 2^15
        assert_eq!(pr_sz(5, 1), 1 << 15);
        // h=4, s=2 -> 2^(8+2+4) = 2^14
        assert_eq!(pr_sz(4, 2), 1 << 14);
    }

    #[test]
    fn pr_sz_zero_on_overflow() {
        assert_eq!(pr_sz(40, 40), 0);
    }

    #[test]
    fn wa_sz_uses_conservative_depth_at_s_zero() {
        // depth = h + 6 at s = 0 (the larger of the two disagreeing variants)
        let h = 5;
        let b = 1u64 << h;
        assert_eq!(wa_sz(h, 0), (h as u64 + 6) * (b + 1));
    }

    #[test]
    fn wa_sz_matches_formula_for_s_ge_1() {
        let h = 5;
        let s = 3;
        let b = 1u64 << h;
        let depth = h as u64 + 4 + 2 * s as u64 - 1;
        assert_eq!(wa_sz(h, s), depth * (b + 1));
    }

    #[test]
    fn sg_sz_is_an_upper_bound_shape() {
        let h = 5;
        let s = 1;
        let b = 1u64 << h;
        let expected = 2 + (s as u64) * (b + 1) + (1u64 << (2 * h as u64 + 4));
        assert_eq!(sg_sz(h, s), expected);
    }

    #[test]
    fn size_oracles_zero_on_degenerate_h() {
        assert_eq!(pr_sz(63, 63), 0);
        assert_eq!(wa_sz(63, 1), 0);
        assert_eq!(sg_sz(63, 1), 0);
    }

    #[test]
    fn read_stack_lengths_rejects_truncated_signature() {
        // jL = 2, h = 3 (b = 8): needs 1 + 2*9 + lamport(2^10) bytes before
        // the jR byte is even present.
        let mut sig = vec![2u8];
        sig.extend(std::iter::repeat(0u8).take(5));
        assert!(read_stack_lengths(3, &sig).is_none());
    }

    #[test]
    fn eg_sz_zero_when_truncated() {
        assert_eq!(eg_sz(3, &[2, 0, 0]), 0);
    }

    #[test]
    fn rc_sz_matches_ew_sz() {
        // Construct a minimal, well-formed signature prefix: jL=0, full
        // Lamport block of zeros, jR=0.
        let h = 2u32;
        let lamport_len = lamport_block_len(h).unwrap() as usize;
        let mut sig = vec![0u8]; // jL
        sig.extend(std::iter::repeat(0u8).take(lamport_len));
        sig.push(0); // jR
        assert_eq!(rc_sz(h, &sig), ew_sz(h, &sig));
        assert_eq!(rc_sz(h, &sig), wa_sz(h, 0));
    }
}
