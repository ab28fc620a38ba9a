use blake3::Hasher;

/// BLAKE3 hash of the exact text (cache key for similarity lookups).
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used to seed the deterministic stub backends; not suitable where
/// collisions would matter.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Fingerprint of an ordered list of reference texts.
///
/// Each text is length-prefixed so that `["ab", "c"]` and `["a", "bc"]` differ.
pub fn corpus_fingerprint<'a, I>(texts: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Hasher::new();
    for text in texts {
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    *hasher.finalize().as_bytes()
}
