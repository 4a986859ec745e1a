// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Structural model of compiled units
//!
//! This crate provides the data a class-file front end hands to the
//! instrumenter, already decoded:
//! - **Opcode table** with mnemonics and operand kinds
//! - **Instructions** as a closed enum, one variant per operand shape
//! - **Unit events** (header, field and method declarations, nesting metadata)
//!   in file declaration order, plus a sink that reassembles them
//! - **Descriptor scanning** and **generic signature decomposition** into the
//!   class names they reference
//!
//! # Modules
//!
//! - [`opcode`]: Opcode table and classification
//! - [`instruction`]: `Instruction`, `Label`, `Constant`, `Handle`
//! - [`unit`]: `Unit`, declarations, `UnitEvent`, `UnitSink`, `UnitBuilder`
//! - [`descriptor`]: Field and method descriptor scanning
//! - [`signature`]: Generic signature reader

pub mod access;
pub mod descriptor;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod signature;
pub mod unit;

pub use access::AccessFlags;
pub use error::{DescriptorError, OpcodeError, SignatureError};
pub use instruction::{Constant, Handle, HandleKind, Instruction, Label};
pub use opcode::{BY_CODE, BY_MNEMONIC, Opcode, OpcodeInfo, OperandKind};
pub use unit::{
    Declaration,
    FieldDecl,
    InnerClass,
    MethodDecl,
    OuterClass,
    Unit,
    UnitBuilder,
    UnitEvent,
    UnitHeader,
    UnitSink,
};

/// Name of instance initializer methods.
pub const CONSTRUCTOR_NAME: &str = "<init>";
