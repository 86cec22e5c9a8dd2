//! Artifact naming: short lowercase identifiers correlating a source file with its video.
//!
//! The process-wide generator is seeded once from OS entropy. Reseeding per call from the
//! clock hands out identical names to calls landing in the same tick.

use crate::error::StorageError;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier length in characters.
pub const IDENTIFIER_LEN: usize = 10;

static PROCESS_GENERATOR: Lazy<IdentifierGenerator> = Lazy::new(IdentifierGenerator::from_entropy);

/// A `[a-z]{10}` token. Valid by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Draw a fresh identifier from the process-wide generator.
    pub fn generate() -> Self {
        PROCESS_GENERATOR.next()
    }

    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        if raw.len() == IDENTIFIER_LEN && raw.bytes().all(|b| b.is_ascii_lowercase()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(StorageError::InvalidIdentifier(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

/// Hands out identifiers for new source artifacts.
pub trait Namer: Send + Sync {
    fn next_identifier(&self) -> Identifier;
}

/// Draws from the process-wide generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNamer;

impl Namer for RandomNamer {
    fn next_identifier(&self) -> Identifier {
        Identifier::generate()
    }
}

/// Seeded identifier source. Use [`Identifier::generate`] outside tests.
pub struct IdentifierGenerator {
    rng: Mutex<StdRng>,
}

impl IdentifierGenerator {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for reproducible tests.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn next(&self) -> Identifier {
        let mut rng = self.rng.lock();
        let token: String = (0..IDENTIFIER_LEN)
            .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
            .collect();
        Identifier(token)
    }
}

impl Namer for IdentifierGenerator {
    fn next_identifier(&self) -> Identifier {
        self.next()
    }
}
