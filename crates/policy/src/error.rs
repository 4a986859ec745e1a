// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for policy validation and policy loading

use std::io;
use std::path::PathBuf;

use bytecode::{DescriptorError, SignatureError};
use thiserror::Error;

/// A referenced symbol that the policy forbids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("library `{library}` is prohibited (used in `{class}`)")]
    ForbiddenLibrary { library: String, class: String },

    #[error("class `{class}` is prohibited")]
    ForbiddenClass { class: String },

    #[error("method `{method}` from `{owner}` is prohibited")]
    ForbiddenMethod { owner: String, method: String },
}

/// A unit whose shape breaks the controller rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    #[error(
        "controller `{unit}` declares a non-public constructor; drop the constructor and \
         initialize from the public init method instead"
    )]
    NonPublicControllerConstructor { unit: String },

    #[error("static field `{field}` in `{unit}` is prohibited (no shared mutable state)")]
    ForbiddenSharedState { unit: String, field: String },
}

/// Any reason a unit fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error(transparent)]
    Shape(#[from] ShapeViolation),

    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(#[from] DescriptorError),

    #[error("malformed signature: {0}")]
    MalformedSignature(#[from] SignatureError),
}

/// A policy table that is missing or malformed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read policy table {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{file}:{line}: {reason}")]
    Malformed {
        file: String,
        line: usize,
        reason: String,
    },
}
