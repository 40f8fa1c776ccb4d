//! CLI command implementations

pub mod config;
pub mod fingerprint;
pub mod status;

pub use config::execute as config;
pub use fingerprint::execute as fingerprint;
pub use status::execute as status;

use crate::cache::InputValue;
use crate::error::{CacheError, CacheResult};
use std::io::Read;
use std::path::Path;

/// Read a JSON input description from a file, or stdin for "-"
pub(crate) fn read_inputs(path: &Path) -> CacheResult<InputValue> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CacheError::io("reading inputs from stdin", e))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| CacheError::io(format!("reading inputs from {}", path.display()), e))?
    };

    let value: serde_json::Value = serde_json::from_str(&content)?;
    Ok(InputValue::from(value))
}
