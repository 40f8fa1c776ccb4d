//! Status command - report a node's resolved paths and freshness

use super::read_inputs;
use crate::cache::{self, read_record, resolve, CacheLocation, Fingerprint, RecordState};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// Freshness report for one nominal location
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub fingerprint: Fingerprint,
    pub cache_path: CacheLocation,
    pub hash_path: PathBuf,
    pub record: Option<Fingerprint>,
    pub record_state: String,
    pub missing: Vec<PathBuf>,
    pub fresh: bool,
}

/// Execute the status command
pub fn execute(args: StatusArgs, config: &Config) -> CacheResult<()> {
    let fingerprint = match (&args.fingerprint, &args.inputs) {
        (Some(fp), _) => Fingerprint::from(fp.as_str()),
        (None, Some(path)) => cache::fingerprint(&read_inputs(path)?)?,
        (None, None) => {
            return Err(CacheError::User(
                "either --inputs or --fingerprint is required".to_string(),
            ))
        }
    };

    let nominal = parse_location(&args.location, args.named)?.anchored(&config.cache.project_root);
    let report = build_report(&nominal, fingerprint)?;

    match args.format {
        OutputFormat::Table => print_report_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => println!("{}", if report.fresh { "fresh" } else { "stale" }),
    }

    Ok(())
}

/// Resolve `nominal` under `fingerprint` and inspect the disk
pub fn build_report(nominal: &CacheLocation, fingerprint: Fingerprint) -> CacheResult<StatusReport> {
    let (cache_path, hash_path) = resolve(nominal, &fingerprint)?;
    let state = read_record(&hash_path);
    let missing: Vec<PathBuf> = cache::record::missing_paths(&cache_path)
        .into_iter()
        .map(|p| p.to_path_buf())
        .collect();
    let fresh = cache::is_fresh(&cache_path, &hash_path, &fingerprint);
    debug!("Status of {}: record {}, fresh {}", hash_path.display(), state, fresh);

    Ok(StatusReport {
        record: state.fingerprint().cloned(),
        record_state: match state {
            RecordState::Valid(_) => "valid".to_string(),
            other => other.to_string(),
        },
        fingerprint,
        cache_path,
        hash_path,
        missing,
        fresh,
    })
}

/// Parse a single path, or a list of KEY=PATH members
///
/// A lone argument is a single path even if it contains '=', unless `named`
/// is set.
pub fn parse_location(args: &[String], named: bool) -> CacheResult<CacheLocation> {
    match args {
        [single] if !named => Ok(CacheLocation::single(single)),
        members => {
            let mut named = BTreeMap::new();
            for member in members {
                let (key, path) = parse_member(member).map_err(CacheError::User)?;
                if named.insert(key.clone(), PathBuf::from(path)).is_some() {
                    return Err(CacheError::User(format!("duplicate location key '{key}'")));
                }
            }
            Ok(CacheLocation::Named(named))
        }
    }
}

/// Parse a named member in KEY=PATH format
fn parse_member(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=PATH format: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn print_report_table(report: &StatusReport) {
    println!("{:<14} {}", "FINGERPRINT", report.fingerprint);

    match &report.cache_path {
        CacheLocation::Single(path) => println!("{:<14} {}", "ARTIFACT", path.display()),
        CacheLocation::Named(members) => {
            for (key, path) in members {
                println!("{:<14} {} ({})", "ARTIFACT", path.display(), key);
            }
        }
    }
    println!("{:<14} {}", "RECORD", report.hash_path.display());

    let record_display = match &report.record {
        Some(fp) if *fp == report.fingerprint => style(fp.to_string()).green().to_string(),
        Some(fp) => style(fp.to_string()).yellow().to_string(),
        None => style(report.record_state.clone()).dim().to_string(),
    };
    println!("{:<14} {}", "STORED", record_display);

    for path in &report.missing {
        println!("{:<14} {}", "MISSING", style(path.display()).red());
    }

    let state_display = if report.fresh {
        style("fresh").green().to_string()
    } else {
        style("stale (update needed)").yellow().to_string()
    };
    println!("{:<14} {}", "STATE", state_display);
}
