use crate::error::{OpsError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const ID_LEN: usize = 24;

/// Attempts before `fresh()` gives up and reports a collision.
const MAX_ATTEMPTS: usize = 16;

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// A generated object identifier: exactly 24 uppercase hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(s: &str) -> Option<Self> {
        if is_hex_identifier(s) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_hex_identifier(s: &str) -> bool {
    s.len() == ID_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'F'))
}

/// Object-id shaped token: 24 uppercase alphanumerics. Xcode only writes hex,
/// but hand-made fixtures and older tools use wider alphabets.
pub fn is_object_id(s: &str) -> bool {
    s.len() == ID_LEN && s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}

static OBJECT_ID_RE: OnceLock<Regex> = OnceLock::new();

fn object_id_re() -> &'static Regex {
    OBJECT_ID_RE.get_or_init(|| Regex::new(r"\b[0-9A-Z]{24}\b").unwrap())
}

/// Every object-id shaped token in `text`.
pub fn existing_ids(text: &str) -> HashSet<String> {
    object_id_re()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// IdGen
// ---------------------------------------------------------------------------

/// Hands out identifiers that appear neither in the project text it was
/// created from nor among identifiers it issued earlier.
pub struct IdGen {
    rng: StdRng,
    taken: HashSet<String>,
}

impl IdGen {
    pub fn new(text: &str) -> Self {
        Self::with_rng(text, StdRng::from_entropy())
    }

    /// Deterministic generator; the same seed and text yield the same ids.
    pub fn seeded(text: &str, seed: u64) -> Self {
        Self::with_rng(text, StdRng::seed_from_u64(seed))
    }

    fn with_rng(text: &str, rng: StdRng) -> Self {
        Self {
            rng,
            taken: existing_ids(text),
        }
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    pub fn fresh(&mut self) -> Result<Identifier> {
        let mut last = String::new();
        for _ in 0..MAX_ATTEMPTS {
            let bytes: [u8; ID_LEN / 2] = self.rng.gen();
            let candidate: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
            if self.taken.insert(candidate.clone()) {
                return Ok(Identifier(candidate));
            }
            last = candidate;
        }
        Err(OpsError::IdentifierCollision(last))
    }
}
