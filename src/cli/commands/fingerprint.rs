//! Fingerprint command - digest a JSON input description

use super::read_inputs;
use crate::cache::{canonical_json, fingerprint};
use crate::cli::args::FingerprintArgs;
use crate::error::CacheResult;
use tracing::debug;

/// Execute the fingerprint command
pub fn execute(args: FingerprintArgs) -> CacheResult<()> {
    let inputs = read_inputs(&args.inputs)?;
    debug!("Read inputs {:?}", inputs);

    if args.canonical {
        println!("{}", canonical_json(&inputs)?);
    }
    println!("{}", fingerprint(&inputs)?);
    Ok(())
}
