// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for instrumentation.

use std::fmt;
use std::io;
use std::path::PathBuf;

use policy::ValidationError;
use thiserror::Error;

/// Where in a unit a violation was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Internal name of the unit, if its header has been seen.
    pub unit: Option<String>,
    /// Field or method name.
    pub member: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.unit, &self.member) {
            (Some(unit), Some(member)) => write!(f, "{unit}.{member}"),
            (Some(unit), None) => write!(f, "{unit}"),
            (None, _) => write!(f, "<unknown unit>"),
        }
    }
}

/// Errors that can occur while instrumenting a batch.
#[derive(Debug, Error)]
pub enum InstrumentError {
    /// A unit breaks the symbol or shape policy.
    #[error("in `{location}`: {source}")]
    Validation {
        location: Location,
        #[source]
        source: ValidationError,
    },

    /// Events arrived out of order, or an instruction is inconsistent.
    #[error("malformed unit: {0}")]
    MalformedUnit(String),

    #[error("input path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode unit {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode unit {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstrumentError {
    /// The policy or shape violation behind this error, if any.
    pub fn violation(&self) -> Option<&ValidationError> {
        match self {
            InstrumentError::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}
