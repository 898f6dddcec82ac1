//! FNV-1 64-bit hashing for stable LCP identifiers.
//!
//! The hash must reproduce identically across runs and hosts, so the
//! randomized `std` hasher is not an option here.

const FNV1_64_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV1_64_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1 (not 1a) 64-bit hash of the input bytes.
pub fn fnv1_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV1_64_OFFSET_BASIS, |hash, byte| {
        hash.wrapping_mul(FNV1_64_PRIME) ^ u64::from(*byte)
    })
}

/// Stable hash of a node-scoped LCP, computed over `{node_id}-{lcp}`.
pub fn lcp_hash(node_id: &str, lcp: &str) -> u64 {
    fnv1_64(format!("{node_id}-{lcp}").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1_64_empty() {
        assert_eq!(fnv1_64(b""), FNV1_64_OFFSET_BASIS);
    }

    #[test]
    fn test_fnv1_64_known_vector() {
        // "a": offset_basis * prime ^ 0x61
        let expected = FNV1_64_OFFSET_BASIS.wrapping_mul(FNV1_64_PRIME) ^ 0x61;
        assert_eq!(fnv1_64(b"a"), expected);
    }

    #[test]
    fn test_lcp_hash_deterministic() {
        let h1 = lcp_hash("XPDR-A", "XPDR1-NETWORK1");
        let h2 = lcp_hash("XPDR-A", "XPDR1-NETWORK1");
        assert_eq!(h1, h2);
        assert_ne!(h1, lcp_hash("XPDR-A", "XPDR1-NETWORK2"));
        assert_ne!(h1, lcp_hash("XPDR-B", "XPDR1-NETWORK1"));
    }
}
