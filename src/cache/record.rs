//! Fingerprint records and freshness checks
//!
//! A record is a small text file next to the artifact holding the fingerprint
//! the artifact was last produced under. Missing or unreadable records are
//! ordinary cache misses.

use crate::cache::digest::Fingerprint;
use crate::cache::location::CacheLocation;
use crate::error::{CacheError, CacheResult};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// What was found at a record path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordState {
    /// No record file (never built, or deleted)
    Missing,
    /// A record file exists but its content is not a fingerprint
    Corrupt,
    /// The stored fingerprint
    Valid(Fingerprint),
}

impl RecordState {
    /// The stored fingerprint, if any
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Self::Valid(fp) => Some(fp),
            _ => None,
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Corrupt => write!(f, "corrupt"),
            Self::Valid(fp) => write!(f, "{}", fp),
        }
    }
}

/// Read the fingerprint stored at `path`
pub fn read_record(path: &Path) -> RecordState {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return RecordState::Missing,
        Err(e) => {
            warn!("Unreadable fingerprint record {}: {}", path.display(), e);
            return RecordState::Corrupt;
        }
    };

    let Ok(content) = String::from_utf8(bytes) else {
        warn!("Fingerprint record {} is not UTF-8", path.display());
        return RecordState::Corrupt;
    };

    let fp = Fingerprint::new(content.trim_end_matches(['\n', '\r']));
    if !fp.is_storable() {
        warn!("Fingerprint record {} is malformed", path.display());
        return RecordState::Corrupt;
    }

    RecordState::Valid(fp)
}

/// Persist `fingerprint` at `path`
///
/// Each call writes its own uniquely named temporary file in the record's
/// directory and renames it over the record. Concurrent writers never fail
/// on each other; the last rename wins.
pub fn write_record(path: &Path, fingerprint: &Fingerprint) -> CacheResult<()> {
    if !fingerprint.is_storable() {
        return Err(CacheError::configuration(format!(
            "fingerprint {:?} cannot be stored in a record file",
            fingerprint.as_str()
        )));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| {
        CacheError::io(format!("creating record directory {}", parent.display()), e)
    })?;

    let mut file = NamedTempFile::new_in(parent).map_err(|e| {
        CacheError::io(format!("creating temporary record in {}", parent.display()), e)
    })?;
    file.write_all(fingerprint.as_str().as_bytes())
        .map_err(|e| CacheError::io(format!("writing record file {}", path.display()), e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| CacheError::io(format!("syncing record file {}", path.display()), e))?;
    file.persist(path)
        .map_err(|e| CacheError::io(format!("writing record file {}", path.display()), e.error))?;

    debug!("Recorded fingerprint {} at {}", fingerprint, path.display());
    Ok(())
}

/// Resolved paths that do not exist on disk
pub fn missing_paths(resolved: &CacheLocation) -> Vec<&Path> {
    resolved.paths().into_iter().filter(|p| !p.exists()).collect()
}

/// Whether the artifact at `resolved` was produced under `fingerprint`
///
/// True iff the record holds exactly `fingerprint` and every resolved path
/// exists. A partially present named group is a miss.
pub fn is_fresh(resolved: &CacheLocation, record: &Path, fingerprint: &Fingerprint) -> bool {
    match read_record(record) {
        RecordState::Valid(stored) if stored == *fingerprint => {}
        RecordState::Valid(stored) => {
            debug!(
                "Fingerprint changed for {}: stored {}, current {}",
                record.display(),
                stored,
                fingerprint
            );
            return false;
        }
        state => {
            debug!("No usable fingerprint record at {} ({})", record.display(), state);
            return false;
        }
    }

    let missing = missing_paths(resolved);
    if !missing.is_empty() {
        for path in &missing {
            debug!("Cached artifact missing: {}", path.display());
        }
        return false;
    }

    true
}

/// Logical negation of [`is_fresh`]
pub fn is_update_needed(resolved: &CacheLocation, record: &Path, fingerprint: &Fingerprint) -> bool {
    !is_fresh(resolved, record, fingerprint)
}
