//! The seeded MurmurHash3 used to place keys and virtual nodes on the ring
//!
//! This is the standard x86 32 bit variant so any other implementation given
//! the same seed and bytes lands on the same ring position.

/// A seeded 32 bit MurmurHash3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Murmur3 {
    /// The seed to mix into every hash
    seed: u32,
}

impl Murmur3 {
    /// Create a new hasher
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed to hash with
    #[must_use]
    pub fn new(seed: i32) -> Self {
        // murmur treats the seed as raw bits so negative seeds keep their pattern
        Murmur3 { seed: seed as u32 }
    }

    /// Hash some raw bytes to a ring position
    ///
    /// # Arguments
    ///
    /// * `bytes` - The bytes to hash
    #[must_use]
    pub fn hash_bytes(&self, bytes: &[u8]) -> i32 {
        // wrap our slice in a reader for the murmur crate
        let mut reader = bytes;
        // reading from an in-memory slice never fails
        let hash = murmur3::murmur3_32(&mut reader, self.seed)
            .expect("Failed to read from an in-memory slice");
        hash as i32
    }

    /// Hash a string by its UTF-16 code units to a ring position
    ///
    /// Each code unit is fed in little endian order, which keeps positions
    /// compatible with rings persisted by JVM based deployments.
    ///
    /// # Arguments
    ///
    /// * `key` - The string to hash
    #[must_use]
    pub fn hash_chars(&self, key: &str) -> i32 {
        // flatten our code units to little endian bytes
        let bytes = key
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect::<Vec<u8>>();
        self.hash_bytes(&bytes)
    }
}

/// Something that can be routed to a shard
pub trait RingKey {
    /// Get this keys position on the ring
    ///
    /// # Arguments
    ///
    /// * `hasher` - The hasher the ring was built with
    fn ring_hash(&self, hasher: &Murmur3) -> i32;
}

impl RingKey for str {
    fn ring_hash(&self, hasher: &Murmur3) -> i32 {
        hasher.hash_chars(self)
    }
}

impl RingKey for String {
    fn ring_hash(&self, hasher: &Murmur3) -> i32 {
        hasher.hash_chars(self)
    }
}

impl RingKey for [u8] {
    fn ring_hash(&self, hasher: &Murmur3) -> i32 {
        hasher.hash_bytes(self)
    }
}

impl RingKey for Vec<u8> {
    fn ring_hash(&self, hasher: &Murmur3) -> i32 {
        hasher.hash_bytes(self)
    }
}

impl<K: RingKey + ?Sized> RingKey for &K {
    fn ring_hash(&self, hasher: &Murmur3) -> i32 {
        (**self).ring_hash(hasher)
    }
}
