//! JSON snapshot loading for the CLI.
//!
//! Descriptors are plain JSON arrays of numbers. Enrollment snapshots are
//! arrays of `{"identity": ..., "descriptor": [...]}` objects. A path of
//! `-` reads from stdin.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use rollcall_core::{Descriptor, EnrollmentRecord};
use serde::de::DeserializeOwned;

use crate::config::Config;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn check_dim(descriptor: Descriptor, config: &Config) -> Result<Descriptor> {
    match config.descriptor_dim {
        Some(dim) => Ok(Descriptor::with_dimension(descriptor.values, dim)?),
        None => Ok(descriptor),
    }
}

/// Load a query descriptor and normalize it.
pub fn load_query(path: &Path, config: &Config) -> Result<Descriptor> {
    let raw: Descriptor = read_json(path)?;
    let raw = check_dim(raw, config).with_context(|| format!("query {}", path.display()))?;
    Ok(raw.normalized())
}

/// Load a raw descriptor without normalizing it.
pub fn load_descriptor(path: &Path, config: &Config) -> Result<Descriptor> {
    let raw: Descriptor = read_json(path)?;
    check_dim(raw, config).with_context(|| format!("descriptor {}", path.display()))
}

/// Load an enrollment snapshot, normalizing each record when
/// `normalize_on_load` is set.
pub fn load_enrollment(path: &Path, config: &Config) -> Result<Vec<EnrollmentRecord>> {
    let records: Vec<EnrollmentRecord> = read_json(path)?;
    let records: Vec<EnrollmentRecord> = records
        .into_iter()
        .map(|r| -> Result<EnrollmentRecord> {
            let descriptor = check_dim(r.descriptor, config)
                .with_context(|| format!("enrollment record {:?}", r.identity))?;
            let record = EnrollmentRecord {
                identity: r.identity,
                descriptor,
            };
            Ok(if config.normalize_on_load {
                record.normalized()
            } else {
                record
            })
        })
        .collect::<Result<_>>()?;

    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        normalized = config.normalize_on_load,
        "loaded enrollment snapshot"
    );
    Ok(records)
}

/// Load several captures of one identity (an array of descriptors).
pub fn load_captures(path: &Path, config: &Config) -> Result<Vec<Descriptor>> {
    let captures: Vec<Descriptor> = read_json(path)?;
    captures
        .into_iter()
        .enumerate()
        .map(|(i, d)| check_dim(d, config).with_context(|| format!("capture {i}")))
        .collect()
}
