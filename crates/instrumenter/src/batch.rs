// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Batch orchestration
//!
//! A batch is every unit of the target package. Units are processed one at a
//! time with a fresh pass each; the first failure stops the batch. Output is
//! only written once every unit has passed, so a rejected batch leaves no
//! partially instrumented tree behind.

use std::fs;
use std::path::{Path, PathBuf};

use bytecode::Unit;
use policy::PolicyStore;
use tracing::{debug, info};

use crate::codec::{read_unit, write_unit};
use crate::config::InstrumentConfig;
use crate::error::InstrumentError;
use crate::pass::instrument_unit;

/// Instrument every unit in memory, or return the first error.
pub fn instrument_batch(
    units: Vec<Unit>,
    policy: &PolicyStore,
    config: &InstrumentConfig,
) -> Result<Vec<Unit>, InstrumentError> {
    units
        .into_iter()
        .map(|unit| instrument_unit(unit, policy, config))
        .collect()
}

/// Instrument every unit file under `input` into a mirrored tree at `output`.
///
/// Every regular file under `input` must be an encoded unit. Returns the
/// number of units written.
pub fn instrument_dir(
    input: &Path,
    output: &Path,
    policy: &PolicyStore,
    config: &InstrumentConfig,
) -> Result<usize, InstrumentError> {
    if !input.is_dir() {
        return Err(InstrumentError::NotADirectory(input.to_path_buf()));
    }

    let mut files = Vec::new();
    collect_files(input, &mut files)?;
    info!(
        "Instrumenting {} unit(s) of package `{}` from {}",
        files.len(),
        config.package,
        input.display()
    );

    let mut instrumented = Vec::with_capacity(files.len());
    for path in files {
        debug!("Reading {}", path.display());
        let unit = instrument_unit(read_unit(&path)?, policy, config)?;
        let relative = path.strip_prefix(input).unwrap_or(&path).to_path_buf();
        instrumented.push((relative, unit));
    }

    for (relative, unit) in &instrumented {
        let path = output.join(relative);
        debug!("Writing {}", path.display());
        write_unit(&path, unit)?;
    }

    info!(
        "Wrote {} instrumented unit(s) to {}",
        instrumented.len(),
        output.display()
    );
    Ok(instrumented.len())
}

/// Regular files under `dir`, depth-first in name order.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), InstrumentError> {
    let read_error = |source| InstrumentError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}
