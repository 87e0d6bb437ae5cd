//! Stable snapshot identifiers.
//!
//! A snapshot is identified by its test name and 1-based page ordinal:
//! `"{ordinal:02}_{kebab-case test name}-{digest}-snap"`, where `digest` is the
//! first 8 hex characters of the SHA-256 of the raw test name. The slug keeps
//! file names readable; the digest keeps names that share a slug apart.
//! Changing this scheme orphans every stored baseline, so it must stay fixed.

use crate::utils::config::SNAPSHOT_SUFFIX;
use crate::utils::error::StoreError;
use sha2::{Digest, Sha256};

/// Hex characters of the test-name digest kept in identifiers
const DIGEST_LEN: usize = 8;

/// (test, ordinal) pair naming one stored page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotKey {
    namespace: String,
    ordinal: usize,
}

impl SnapshotKey {
    /// # Errors
    /// * `StoreError::InvalidKey` - If the ordinal is 0 or the test name has
    ///   no alphanumeric characters
    pub fn new(test_name: &str, ordinal: usize) -> Result<Self, StoreError> {
        if ordinal == 0 {
            return Err(StoreError::InvalidKey(
                "page ordinals start at 1".to_string(),
            ));
        }

        Ok(Self {
            namespace: test_namespace(test_name)?,
            ordinal,
        })
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// `<slug>-<digest>`, shared by every page of one test
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// e.g. `01_renders-invoice-3f2a9c1b-snap`
    pub fn identifier(&self) -> String {
        format!("{:02}_{}{}", self.ordinal, self.namespace, SNAPSHOT_SUFFIX)
    }
}

/// Per-test part of every identifier: readable slug plus name digest
///
/// # Errors
/// * `StoreError::InvalidKey` - If the test name has no alphanumeric characters
pub fn test_namespace(test_name: &str) -> Result<String, StoreError> {
    let slug = kebab_case(test_name);
    if slug.is_empty() {
        return Err(StoreError::InvalidKey(format!(
            "test name {:?} has no usable characters",
            test_name
        )));
    }

    let mut hasher = Sha256::new();
    hasher.update(test_name.as_bytes());
    let digest = hex::encode(hasher.finalize());

    Ok(format!("{}-{}", slug, &digest[..DIGEST_LEN]))
}

#[derive(Clone, Copy, PartialEq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
}

fn classify(c: char) -> Option<CharClass> {
    if c.is_numeric() {
        Some(CharClass::Digit)
    } else if c.is_uppercase() {
        Some(CharClass::Upper)
    } else if c.is_alphanumeric() {
        Some(CharClass::Lower)
    } else {
        None
    }
}

/// Lowercase words joined by `-`.
///
/// Words break on any non-alphanumeric character, on lower-to-upper case
/// changes, between letters and digits, and before the last capital of an
/// acronym followed by a lowercase letter (`"PDFFile"` -> `"pdf-file"`).
pub fn kebab_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<CharClass> = None;

    for (i, &c) in chars.iter().enumerate() {
        let Some(class) = classify(c) else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        };

        let next = chars.get(i + 1).copied().and_then(classify);
        let boundary = match (prev, class) {
            (None, _) => false,
            (Some(CharClass::Lower), CharClass::Upper) => true,
            (Some(CharClass::Digit), CharClass::Upper | CharClass::Lower) => true,
            (Some(CharClass::Upper | CharClass::Lower), CharClass::Digit) => true,
            (Some(CharClass::Upper), CharClass::Upper) => next == Some(CharClass::Lower),
            _ => false,
        };

        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
        prev = Some(class);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words.join("-")
}
