//! Stable identity hashing shared by rollout bucketing and segment derivation.
//!
//! Browser clients re-derive these buckets locally, so the hash is part of the
//! wire contract: a polynomial rolling hash with multiplier 31 over the UTF-8
//! bytes of the identity, accumulated in a wrapping 32-bit signed integer and
//! folded to non-negative by masking off the sign bit. Any reimplementation
//! with 32-bit wrapping arithmetic agrees bit-for-bit.

const SEGMENT_SALT: &str = "segment:";

/// `h = h * 31 + byte` with 32-bit wrapping, then `h & 0x7fff_ffff`.
pub fn stable_hash(input: &str) -> u32 {
    let mut h: i32 = 0;
    for byte in input.bytes() {
        h = h.wrapping_mul(31).wrapping_add(i32::from(byte));
    }
    (h & 0x7fff_ffff) as u32
}

/// Rollout bucket in `[0, 100)`. Identities with `bucket < rollout_percentage`
/// are inside the rollout.
pub fn rollout_bucket(identity: &str) -> u32 {
    stable_hash(identity) % 100
}

/// Segment draw in `[0, 100)`, salted so it is independent of the rollout
/// bucket. Reusing the unsalted hash here would pin every low-draw segment
/// into the low rollout buckets for every flag.
pub fn segment_draw(identity: &str) -> u32 {
    stable_hash(&format!("{SEGMENT_SALT}{identity}")) % 100
}
