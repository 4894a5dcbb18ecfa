//! FNV-1a hashing.
//!
//! `fnv1a_32` is a `const fn` so string keys can be hashed at compile time.
//! `FnvHasher`/`FnvBuildHasher` plug the 64-bit variant into the map and
//! set as a deterministic alternative to `RandomState`.

use core::hash::{BuildHasher, Hasher};

const OFFSET_32: u32 = 0x811c_9dc5;
const PRIME_32: u32 = 0x0100_0193;
const OFFSET_64: u64 = 0xcbf2_9ce4_8422_2325;
const PRIME_64: u64 = 0x0000_0100_0000_01b3;

/// 32-bit FNV-1a of `bytes`.
pub const fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = OFFSET_32;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(PRIME_32);
        i += 1;
    }
    hash
}

/// 64-bit FNV-1a of `bytes`.
pub const fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = OFFSET_64;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(PRIME_64);
        i += 1;
    }
    hash
}

/// Streaming 64-bit FNV-1a.
#[derive(Copy, Clone, Debug)]
pub struct FnvHasher(u64);

impl Default for FnvHasher {
    fn default() -> Self {
        FnvHasher(OFFSET_64)
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(PRIME_64);
        }
    }
}

/// Builds [`FnvHasher`]s. Every instance hashes identically.
#[derive(Copy, Clone, Debug, Default)]
pub struct FnvBuildHasher;

impl BuildHasher for FnvBuildHasher {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> FnvHasher {
        FnvHasher::default()
    }
}
