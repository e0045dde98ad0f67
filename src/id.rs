//! Identifier generation
//!
//! Documents inserted without an `id` get a short random one.

use std::fmt::Write as _;

use rand::rngs::OsRng;
use rand::RngCore;

/// Produces ids for documents inserted without one
pub trait IdGenerator: Send + Sync {
    /// Generate a new id
    fn generate(&self) -> String;
}

/// Random hex ids drawn from OS entropy
///
/// The default of 4 bytes renders as 8 lowercase hex characters.
#[derive(Debug, Clone, Copy)]
pub struct RandomIds {
    bytes: usize,
}

impl RandomIds {
    /// Bytes of entropy used by `RandomIds::default()`
    pub const DEFAULT_BYTES: usize = 4;

    /// Create a generator drawing `bytes` bytes of entropy per id
    ///
    /// Zero is bumped to one so ids are never empty.
    pub fn with_bytes(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(1),
        }
    }

    /// Bytes of entropy per id
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::with_bytes(Self::DEFAULT_BYTES)
    }
}

impl IdGenerator for RandomIds {
    fn generate(&self) -> String {
        let mut raw = vec![0u8; self.bytes];
        OsRng.fill_bytes(&mut raw);

        let mut id = String::with_capacity(self.bytes * 2);
        for byte in raw {
            // Writing to a String cannot fail
            let _ = write!(id, "{:02x}", byte);
        }
        id
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}
