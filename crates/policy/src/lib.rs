// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Symbol and shape policy for controller units
//!
//! Controller units come from untrusted authors and share one host process, so
//! every symbol a unit references is checked before the unit may run.
//!
//! # Policy Checklist
//!
//! | Check | Description |
//! |-------|-------------|
//! | **Approved libraries** | A referenced class must live in the unit's own package or in an approved library |
//! | **Disallowed classes** | Explicitly banned classes are rejected even inside approved libraries |
//! | **Disallowed methods** | Per-owner method bans (e.g. `java/lang/System.exit`) |
//! | **Descriptors and signatures** | Every class component of descriptors and generic signatures is checked |
//! | **No shared state** | Static fields are rejected, except compiler-generated switch tables |
//! | **Public controller constructor** | The controller type must be constructible by the host |
//!
//! The [`PolicyStore`] is built once per run (see [`load_policy`]) and shared
//! read-only by every validator.

mod context;
mod error;
mod shape;
mod store;
mod symbol;
mod tables;

pub use context::UnitContext;
pub use error::{ConfigError, PolicyViolation, ShapeViolation, ValidationError};
pub use shape::{DEFAULT_CONTROLLER, RESERVED_FIELD_PREFIX, ShapeRules, ShapeValidator};
pub use store::{MAX_METHOD_COST, PolicyStore, PolicyStoreBuilder};
pub use symbol::SymbolValidator;
pub use tables::{
    APPROVED_LIBRARIES_FILE,
    DISALLOWED_CLASSES_FILE,
    DISALLOWED_METHODS_FILE,
    METHOD_COSTS_FILE,
    load_policy,
    parse_approved_libraries,
    parse_disallowed_classes,
    parse_disallowed_methods,
    parse_method_costs,
};
