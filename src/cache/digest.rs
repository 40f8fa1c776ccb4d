//! Input fingerprinting
//!
//! Canonicalizes an [`InputValue`] into a stable JSON text (mapping keys
//! sorted, referenced nodes replaced by their persisted fingerprint) and
//! digests it. Same logical inputs = same fingerprint.

use crate::cache::input::{InputValue, Scalar};
use crate::error::{CacheError, CacheResult};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Number of digest bytes kept in a fingerprint (128 bits)
const FINGERPRINT_BYTES: usize = 16;

/// Length of an engine-computed fingerprint in hex characters
pub const FINGERPRINT_LEN: usize = FINGERPRINT_BYTES * 2;

/// Deterministic digest of a node's canonicalized inputs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-computed fingerprint string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Digest arbitrary bytes, keeping the first 128 bits as lowercase hex
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let result = hasher.finalize();
        Self(hex::encode(&result[..FINGERPRINT_BYTES]))
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the value can be stored in a record file and read back unchanged
    pub fn is_storable(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(|c| c.is_whitespace() || c.is_control())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Compute the fingerprint of an input description
pub fn fingerprint(inputs: &InputValue) -> CacheResult<Fingerprint> {
    let canonical = canonical_json(inputs)?;
    let fp = Fingerprint::of_bytes(canonical.as_bytes());
    debug!("Fingerprint {} for inputs {}", fp, canonical);
    Ok(fp)
}

/// Render an input description as canonical JSON
///
/// Mapping keys are sorted, sequences keep their order and node references
/// become the string value of the referenced node's cached fingerprint.
pub fn canonical_json(inputs: &InputValue) -> CacheResult<String> {
    let mut out = String::new();
    write_canonical(inputs, "$", &mut out)?;
    Ok(out)
}

fn write_canonical(value: &InputValue, at: &str, out: &mut String) -> CacheResult<()> {
    match value {
        InputValue::Scalar(scalar) => write_scalar(scalar, at, out)?,
        InputValue::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, &format!("{at}[{i}]"), out)?;
            }
            out.push(']');
        }
        InputValue::Mapping(entries) => {
            let mut sorted = BTreeMap::new();
            for (key, item) in entries {
                if sorted.insert(key.as_str(), item).is_some() {
                    return Err(CacheError::configuration(format!(
                        "duplicate key {:?} in mapping at {}",
                        key, at
                    )));
                }
            }

            out.push('{');
            for (i, (key, item)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&quote(key)?);
                out.push(':');
                write_canonical(item, &format!("{at}.{key}"), out)?;
            }
            out.push('}');
        }
        InputValue::Node(node) => {
            let upstream = node.get_cached_hash();
            debug!("Chaining fingerprint {} of node {} at {}", upstream, node.name(), at);
            out.push_str(&quote(upstream.as_str())?);
        }
    }
    Ok(())
}

fn write_scalar(scalar: &Scalar, at: &str, out: &mut String) -> CacheResult<()> {
    match scalar {
        Scalar::Null => out.push_str("null"),
        Scalar::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Scalar::Int(i) => out.push_str(&i.to_string()),
        Scalar::UInt(u) => out.push_str(&u.to_string()),
        Scalar::Float(f) => {
            let number = serde_json::Number::from_f64(*f).ok_or_else(|| {
                CacheError::configuration(format!("non-finite float {} at {}", f, at))
            })?;
            out.push_str(&number.to_string());
        }
        Scalar::Str(s) => out.push_str(&quote(s)?),
    }
    Ok(())
}

fn quote(s: &str) -> CacheResult<String> {
    Ok(serde_json::to_string(s)?)
}
