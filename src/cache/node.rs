//! Cached nodes
//!
//! A [`Node`] is built once per pipeline run by [`Node::open_or_build`], which
//! performs the whole get-or-create sequence before returning: fingerprint the
//! inputs, resolve the fingerprinted paths, check the record, then either read
//! the cached artifact or create it and persist the new fingerprint.

use crate::cache::digest::{self, Fingerprint};
use crate::cache::input::{InputValue, NodeHandle};
use crate::cache::location::{self, CacheLocation};
use crate::cache::record::{self, RecordState};
use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// The two capabilities a concrete node kind supplies
///
/// The engine decides which one to call; implementations hold the domain
/// logic and never check freshness themselves.
pub trait Asset {
    /// In-memory artifact
    type Output;

    /// Failure raised by the domain computation
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the artifact from the resolved location
    fn get_cached_asset(&self, location: &CacheLocation) -> Result<Self::Output, Self::Error>;

    /// Compute the artifact, write it to every resolved path, and return it
    fn create_and_get_asset(&self, location: &CacheLocation)
        -> Result<Self::Output, Self::Error>;
}

/// Declaration of a node: its name, logical inputs and nominal location
#[derive(Debug, Clone)]
pub struct NodeSpec {
    /// Name used in logs and error messages
    pub name: String,
    /// Logical inputs
    pub inputs: InputValue,
    /// Nominal artifact location; relative paths sit under the project root
    pub location: CacheLocation,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, inputs: InputValue, location: CacheLocation) -> Self {
        Self {
            name: name.into(),
            inputs,
            location,
        }
    }
}

/// How the artifact of a node was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Record matched and artifacts existed; read from disk
    Cached,
    /// Artifact was (re)built and the record rewritten
    Created,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::Created => write!(f, "created"),
        }
    }
}

/// A constructed cached node holding its materialized artifact
pub struct Node<A: Asset> {
    name: String,
    inputs: InputValue,
    nominal: CacheLocation,
    cache_path: CacheLocation,
    hash_path: PathBuf,
    fingerprint: RwLock<Fingerprint>,
    state: NodeState,
    asset: A,
    output: A::Output,
}

impl<A: Asset> Node<A> {
    /// Get the node's artifact from cache, or create it
    pub fn open_or_build(config: &CacheConfig, spec: NodeSpec, asset: A) -> CacheResult<Self> {
        let NodeSpec {
            name,
            inputs,
            location: declared,
        } = spec;

        let fingerprint = digest::fingerprint(&inputs).map_err(|e| in_node(&name, e))?;
        let nominal = declared.anchored(&config.project_root);
        let (cache_path, hash_path) =
            location::resolve(&nominal, &fingerprint).map_err(|e| in_node(&name, e))?;
        debug!(
            "Node {} resolved to {:?}, record {}",
            name,
            cache_path.paths(),
            hash_path.display()
        );

        let (output, state) = if record::is_fresh(&cache_path, &hash_path, &fingerprint) {
            info!("Using cached {} ({})", name, fingerprint);
            let output = asset
                .get_cached_asset(&cache_path)
                .map_err(|e| CacheError::cached_read(&name, fingerprint.as_str(), e))?;
            (output, NodeState::Cached)
        } else {
            info!("Creating {} ({})", name, fingerprint);
            if config.create_dirs {
                ensure_parent_dirs(&cache_path).map_err(|e| in_build(&name, &fingerprint, e))?;
            }
            let output = asset
                .create_and_get_asset(&cache_path)
                .map_err(|e| CacheError::creation(&name, fingerprint.as_str(), e))?;

            for path in record::missing_paths(&cache_path) {
                warn!("Node {} did not write {}", name, path.display());
            }
            record::write_record(&hash_path, &fingerprint)
                .map_err(|e| in_build(&name, &fingerprint, e))?;
            (output, NodeState::Created)
        };

        Ok(Self {
            name,
            inputs,
            nominal,
            cache_path,
            hash_path,
            fingerprint: RwLock::new(fingerprint),
            state,
            asset,
            output,
        })
    }

    /// The artifact decided at construction
    pub fn get(&self) -> &A::Output {
        &self.output
    }

    /// Fingerprint stored in the record file
    ///
    /// Falls back to the in-memory fingerprint when the record has been
    /// removed or damaged since construction.
    pub fn get_cached_hash(&self) -> Fingerprint {
        match record::read_record(&self.hash_path) {
            RecordState::Valid(fp) => fp,
            state => {
                warn!(
                    "Record of {} is {}, using in-memory fingerprint",
                    self.name, state
                );
                self.fingerprint()
            }
        }
    }

    /// Overwrite the fingerprint in memory and on disk
    ///
    /// Artifacts are left untouched.
    pub fn update_hash(&self, new_fingerprint: impl Into<Fingerprint>) -> CacheResult<()> {
        let new_fingerprint = new_fingerprint.into();
        record::write_record(&self.hash_path, &new_fingerprint).map_err(|e| in_node(&self.name, e))?;

        let mut current = self.fingerprint.write().unwrap_or_else(|e| e.into_inner());
        info!("Fingerprint of {} set to {} (was {})", self.name, new_fingerprint, current);
        *current = new_fingerprint;
        Ok(())
    }

    /// Whether the on-disk state no longer matches the current fingerprint
    ///
    /// Re-checked on every call, so out-of-band deletions are seen.
    pub fn is_update_needed(&self) -> bool {
        record::is_update_needed(&self.cache_path, &self.hash_path, &self.fingerprint())
    }

    /// Re-derive the fingerprint from the inputs
    pub fn compute_inputs_hash(&self) -> CacheResult<Fingerprint> {
        digest::fingerprint(&self.inputs).map_err(|e| in_node(&self.name, e))
    }

    /// Current in-memory fingerprint
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &InputValue {
        &self.inputs
    }

    /// Nominal location, anchored on the project root
    pub fn nominal_location(&self) -> &CacheLocation {
        &self.nominal
    }

    /// Fingerprinted artifact location
    pub fn cache_path(&self) -> &CacheLocation {
        &self.cache_path
    }

    /// Fingerprint record path
    pub fn hash_path(&self) -> &Path {
        &self.hash_path
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn asset(&self) -> &A {
        &self.asset
    }
}

impl<A: Asset> fmt::Debug for Node<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("fingerprint", &self.fingerprint())
            .field("cache_path", &self.cache_path)
            .field("hash_path", &self.hash_path)
            .field("state", &self.state)
            .finish()
    }
}

impl<A> NodeHandle for Node<A>
where
    A: Asset + Send + Sync,
    A::Output: Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn get_cached_hash(&self) -> Fingerprint {
        Node::get_cached_hash(self)
    }
}

impl<A> From<Arc<Node<A>>> for InputValue
where
    A: Asset + Send + Sync + 'static,
    A::Output: Send + Sync + 'static,
{
    fn from(node: Arc<Node<A>>) -> Self {
        InputValue::Node(node)
    }
}

fn ensure_parent_dirs(location: &CacheLocation) -> CacheResult<()> {
    for path in location.paths() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CacheError::io(format!("creating cache directory {}", parent.display()), e)
            })?;
        }
    }
    Ok(())
}

fn in_node(name: &str, err: CacheError) -> CacheError {
    match err {
        CacheError::Configuration { reason } => {
            CacheError::configuration(format!("node {}: {}", name, reason))
        }
        other => other,
    }
}

fn in_build(name: &str, fingerprint: &Fingerprint, err: CacheError) -> CacheError {
    match err {
        CacheError::Io { context, source } => CacheError::io(
            format!("node {} (fingerprint {}): {}", name, fingerprint, context),
            source,
        ),
        other => in_node(name, other),
    }
}
