// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the structural model.

use thiserror::Error;

/// A descriptor that does not follow the field/method descriptor grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// A class component (`L...`) is missing its `;` terminator or is empty.
    #[error("unterminated class reference at {position} in descriptor `{descriptor}`")]
    UnterminatedClass { descriptor: String, position: usize },
    /// A character that cannot start a type component.
    #[error("unexpected `{found}` at {position} in descriptor `{descriptor}`")]
    UnexpectedCharacter {
        descriptor: String,
        position: usize,
        found: char,
    },
    /// Unclosed parameter list, missing return type or dangling `[`.
    #[error("descriptor `{descriptor}` ended unexpectedly")]
    UnexpectedEnd { descriptor: String },
}

/// A generic signature that does not follow the signature grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature `{signature}` ended unexpectedly")]
    UnexpectedEnd { signature: String },
    #[error("signature nests deeper than {limit} levels")]
    TooDeep { limit: usize },
    #[error("unexpected `{found}` at {position} in signature `{signature}`")]
    UnexpectedCharacter {
        signature: String,
        position: usize,
        found: char,
    },
}

/// Opcode lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpcodeError {
    #[error("unknown opcode mnemonic `{0}`")]
    UnknownMnemonic(String),
}
