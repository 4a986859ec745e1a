// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Policy validation and execution metering for controller units
//!
//! This crate provides tools to:
//! - Validate every symbol a unit references against a [`policy::PolicyStore`]
//! - Enforce the unit-shape rules (no static state, public controller constructor)
//! - Insert a metering call after every executable instruction
//! - Run a whole package as a batch that writes output only if every unit passes
//!
//! The metering calls charge the host runtime's per-turn counter, so a unit
//! that runs too long can be suspended by the engine at a deterministic point.

pub mod batch;
pub mod codec;
pub mod config;
pub mod error;
pub mod meter;
pub mod pass;

pub use batch::{instrument_batch, instrument_dir};
pub use config::{InstrumentConfig, engine_api_library};
pub use error::{InstrumentError, Location};
pub use meter::{HOOK_DESCRIPTOR, Meter, MeteringHook};
pub use pass::{InstrumentationPass, PassState, instrument_unit};
