//! Cache path resolution
//!
//! Maps a nominal artifact location to its fingerprinted on-disk location
//! and to the fingerprint record path. Pure path arithmetic, no I/O.

use crate::cache::digest::Fingerprint;
use crate::error::{CacheError, CacheResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extension of fingerprint record files
pub const RECORD_EXTENSION: &str = "inputs-hash";

/// Where a node's artifact lives: one file, or a named group of files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CacheLocation {
    Single(PathBuf),
    Named(BTreeMap<String, PathBuf>),
}

impl CacheLocation {
    /// A single artifact file
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self::Single(path.into())
    }

    /// A named group of artifact files sharing one fingerprint
    pub fn named<K, P, I>(members: I) -> Self
    where
        K: Into<String>,
        P: Into<PathBuf>,
        I: IntoIterator<Item = (K, P)>,
    {
        Self::Named(
            members
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        )
    }

    /// All member paths, in key order for named groups
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            Self::Single(path) => vec![path.as_path()],
            Self::Named(members) => members.values().map(PathBuf::as_path).collect(),
        }
    }

    /// Path of a named member (or the single path, whatever the key)
    pub fn get(&self, key: &str) -> Option<&Path> {
        match self {
            Self::Single(path) => Some(path.as_path()),
            Self::Named(members) => members.get(key).map(PathBuf::as_path),
        }
    }

    /// Join relative member paths onto `root`; absolute paths are kept
    pub fn anchored(&self, root: &Path) -> Self {
        let anchor = |path: &PathBuf| {
            if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            }
        };

        match self {
            Self::Single(path) => Self::Single(anchor(path)),
            Self::Named(members) => {
                Self::Named(members.iter().map(|(k, p)| (k.clone(), anchor(p))).collect())
            }
        }
    }

    /// Path the record file is derived from: the single path, or the member
    /// with the lexicographically smallest key
    fn record_anchor(&self) -> Option<&Path> {
        match self {
            Self::Single(path) => Some(path.as_path()),
            Self::Named(members) => members.values().next().map(PathBuf::as_path),
        }
    }
}

/// Rewrite a nominal location with the fingerprint prefix
///
/// Returns the resolved location and the record path. Every file name becomes
/// `<fingerprint>-<name>`; the record sits next to the anchor member with its
/// extension replaced by [`RECORD_EXTENSION`].
pub fn resolve(
    nominal: &CacheLocation,
    fingerprint: &Fingerprint,
) -> CacheResult<(CacheLocation, PathBuf)> {
    let resolved = match nominal {
        CacheLocation::Single(path) => CacheLocation::Single(prefixed(path, fingerprint)?),
        CacheLocation::Named(members) => {
            if members.is_empty() {
                return Err(CacheError::configuration(
                    "named cache location has no members",
                ));
            }
            let mut rewritten = BTreeMap::new();
            for (key, path) in members {
                rewritten.insert(key.clone(), prefixed(path, fingerprint)?);
            }
            CacheLocation::Named(rewritten)
        }
    };

    let record = resolved
        .record_anchor()
        .map(|anchor| anchor.with_extension(RECORD_EXTENSION))
        .ok_or_else(|| CacheError::configuration("cache location has no record anchor"))?;

    if resolved.paths().contains(&record.as_path()) {
        return Err(CacheError::configuration(format!(
            "record file {} would overwrite an artifact; avoid the .{} extension",
            record.display(),
            RECORD_EXTENSION
        )));
    }

    Ok((resolved, record))
}

fn prefixed(path: &Path, fingerprint: &Fingerprint) -> CacheResult<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        CacheError::configuration(format!(
            "cache path {} has no file name",
            path.display()
        ))
    })?;

    let mut prefixed = std::ffi::OsString::from(format!("{}-", fingerprint));
    prefixed.push(name);
    Ok(path.with_file_name(prefixed))
}
