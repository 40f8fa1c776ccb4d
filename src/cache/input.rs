//! Input descriptions
//!
//! A node declares its logical inputs as an [`InputValue`] tree. Leaves are
//! scalars, inner nodes are sequences or name-keyed mappings, and any position
//! may hold a reference to another cached node whose fingerprint is folded in.

use crate::cache::digest::Fingerprint;
use crate::error::{CacheError, CacheResult};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Type-erased view of a cached node, as seen from downstream nodes
pub trait NodeHandle: Send + Sync {
    /// Node name, used in logs and error messages
    fn name(&self) -> &str;

    /// Fingerprint persisted in the node's record file
    fn get_cached_hash(&self) -> Fingerprint;
}

/// Shared reference to another cached node
pub type NodeRef = Arc<dyn NodeHandle>;

/// Primitive leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

/// Anything that can appear in a node's input description
#[derive(Clone)]
pub enum InputValue {
    /// Primitive value
    Scalar(Scalar),
    /// Ordered sequence; position is significant
    Sequence(Vec<InputValue>),
    /// Name-keyed mapping; insertion order is not significant
    Mapping(Vec<(String, InputValue)>),
    /// Reference to another cached node
    Node(NodeRef),
}

impl InputValue {
    /// The null scalar
    pub fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Build a mapping from `(key, value)` pairs, keeping insertion order
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<InputValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a sequence from values
    pub fn sequence<V, I>(items: I) -> Self
    where
        V: Into<InputValue>,
        I: IntoIterator<Item = V>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Wrap a shared node reference
    pub fn node(node: NodeRef) -> Self {
        Self::Node(node)
    }

    /// Convert any serializable value into an input description
    ///
    /// Fails with a configuration error when the value has no JSON form,
    /// e.g. a map keyed by something other than strings.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> CacheResult<Self> {
        serde_json::to_value(value)
            .map(Self::from)
            .map_err(|e| CacheError::configuration(format!("value is not serializable: {e}")))
    }

    /// Look up a mapping entry by key
    pub fn get(&self, key: &str) -> Option<&InputValue> {
        match self {
            Self::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Debug for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{:?}", s),
            Self::Sequence(items) => f.debug_list().entries(items).finish(),
            Self::Mapping(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            Self::Node(node) => write!(f, "Node({})", node.name()),
        }
    }
}

impl From<Scalar> for InputValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for InputValue {
            fn from(value: $t) -> Self {
                Self::Scalar(Scalar::Int(i64::from(value)))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for InputValue {
            fn from(value: $t) -> Self {
                Self::Scalar(Scalar::UInt(u64::from(value)))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<usize> for InputValue {
    fn from(value: usize) -> Self {
        Self::Scalar(Scalar::UInt(value as u64))
    }
}

impl From<f32> for InputValue {
    fn from(value: f32) -> Self {
        Self::Scalar(Scalar::Float(f64::from(value)))
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::Str(value))
    }
}

impl From<&Path> for InputValue {
    fn from(value: &Path) -> Self {
        Self::Scalar(Scalar::Str(value.display().to_string()))
    }
}

impl From<PathBuf> for InputValue {
    fn from(value: PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

impl<T: Into<InputValue>> From<Option<T>> for InputValue {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Into::into)
    }
}

impl<T: Into<InputValue>> From<Vec<T>> for InputValue {
    fn from(value: Vec<T>) -> Self {
        Self::sequence(value)
    }
}

impl From<NodeRef> for InputValue {
    fn from(value: NodeRef) -> Self {
        Self::Node(value)
    }
}

impl From<serde_json::Value> for InputValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::null(),
            Value::Bool(b) => b.into(),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Scalar(Scalar::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Scalar(Scalar::UInt(u))
                } else {
                    Self::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => s.into(),
            Value::Array(items) => Self::sequence(items),
            Value::Object(map) => Self::mapping(map),
        }
    }
}
