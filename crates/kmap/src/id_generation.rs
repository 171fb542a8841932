//! Random token generation for node and edge ids.
//!
//! Ids are short base36 tokens (8 characters by default), drawn from a
//! random 64-bit value. Candidates are checked against the ids already in
//! use and regenerated on collision, so a generated id never shadows an
//! existing node or edge.
//!
//! # Example
//!
//! ```
//! use kmap::id_generation::IdGenerator;
//!
//! let mut generator = IdGenerator::new(8);
//! let id = generator.generate(|candidate| candidate == "taken").unwrap();
//! assert_eq!(id.len(), 8);
//! ```

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_ATTEMPTS: u32 = 100;

/// Default length of generated ids.
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Longest id that still fits the entropy of one `u64` draw.
pub const MAX_ID_LENGTH: usize = 12;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Every candidate collided with an id already in use
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of candidates tried
        attempts: u32,
    },

    /// Invalid length parameter
    #[error("Length must be between 1 and {MAX_ID_LENGTH}")]
    InvalidLength,
}

/// Random base36 id generator with collision retry.
///
/// The generator does not track issued ids itself; callers pass an
/// `is_taken` predicate backed by their own id index so the two can
/// never drift apart.
pub struct IdGenerator {
    length: usize,
    rng: StdRng,
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl IdGenerator {
    /// Create a generator seeded from OS entropy.
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self {
            length,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a generator with a fixed seed (reproducible ids for tests).
    #[must_use]
    pub fn with_seed(length: usize, seed: u64) -> Self {
        Self {
            length,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate an id for which `is_taken` returns false.
    ///
    /// # Errors
    ///
    /// Returns [`IdGenerationError::InvalidLength`] if the configured length
    /// is 0 or exceeds [`MAX_ID_LENGTH`], and
    /// [`IdGenerationError::CollisionExhausted`] if every attempt collided.
    pub fn generate<F>(&mut self, is_taken: F) -> Result<String, IdGenerationError>
    where
        F: Fn(&str) -> bool,
    {
        for attempt in 0..MAX_ATTEMPTS {
            let id = encode_base36(self.rng.next_u64(), self.length)?;

            if !is_taken(&id) {
                if attempt > 0 {
                    debug!(attempt, length = self.length, "Generated unique ID after collision retries");
                }
                return Ok(id);
            }
        }

        warn!(
            length = self.length,
            max_attempts = MAX_ATTEMPTS,
            "All id candidates collided"
        );
        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }
}

/// Encode a number as a fixed-width base36 string.
///
/// Only the low `length` base36 digits of `num` are kept; shorter values
/// are left-padded with `0`.
///
/// # Errors
///
/// Returns an error if length is 0 or greater than [`MAX_ID_LENGTH`].
fn encode_base36(num: u64, length: usize) -> Result<String, IdGenerationError> {
    if length == 0 || length > MAX_ID_LENGTH {
        return Err(IdGenerationError::InvalidLength);
    }

    let mut result = Vec::with_capacity(length);
    let mut n = num;

    while result.len() < length {
        let remainder = usize::try_from(n % 36).unwrap_or_default();
        result.push(char::from(BASE36_CHARS[remainder]));
        n /= 36;
    }

    result.reverse();
    Ok(result.into_iter().collect())
}

/// Check that an id looks like a generated token of the given length.
#[must_use]
pub fn is_generated_id(id: &str, length: usize) -> bool {
    id.len() == length
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}
