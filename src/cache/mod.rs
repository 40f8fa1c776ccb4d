//! Fingerprint-based get-or-create cache for derived datasets
//!
//! Every derived dataset is a [`Node`]: a declared input description plus a
//! nominal output location. The inputs are digested into a [`Fingerprint`],
//! which prefixes the on-disk artifact names and is persisted in a sidecar
//! record. Same inputs = same files; changed inputs = new files.
//!
//! # Layout
//!
//! ```text
//! <root>/<fp>-<name>                # artifact (one per named member)
//! <root>/<fp>-<stem>.inputs-hash    # record holding <fp>
//! ```
//!
//! # Node States
//!
//! | State | Condition | Collaborator call |
//! |-------|-----------|-------------------|
//! | Cached | Record equals fingerprint, all artifacts exist | `get_cached_asset` |
//! | Created | Record missing, corrupt or different, or any artifact missing | `create_and_get_asset` |
//!
//! Nothing here deletes artifacts or records, and nothing locks them: two
//! processes building the same node both write, last writer wins.

pub mod digest;
pub mod input;
pub mod location;
pub mod node;
pub mod record;

pub use digest::{canonical_json, fingerprint, Fingerprint, FINGERPRINT_LEN};
pub use input::{InputValue, NodeHandle, NodeRef, Scalar};
pub use location::{resolve, CacheLocation, RECORD_EXTENSION};
pub use node::{Asset, Node, NodeSpec, NodeState};
pub use record::{is_fresh, is_update_needed, read_record, write_record, RecordState};
