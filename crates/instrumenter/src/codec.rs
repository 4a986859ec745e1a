// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! JSON encoding of units on disk.

use std::fs;
use std::path::Path;

use bytecode::Unit;

use crate::error::InstrumentError;

pub fn read_unit(path: &Path) -> Result<Unit, InstrumentError> {
    let text = fs::read_to_string(path).map_err(|source| InstrumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| InstrumentError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `unit` to `path`, creating parent directories as needed.
pub fn write_unit(path: &Path, unit: &Unit) -> Result<(), InstrumentError> {
    let text = serde_json::to_string_pretty(unit).map_err(|source| InstrumentError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    let write_error = |source| InstrumentError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, text).map_err(write_error)
}
