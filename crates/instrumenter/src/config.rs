// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use policy::ShapeRules;

use crate::meter::MeteringHook;

/// Per-run configuration of the instrumentation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentConfig {
    /// Target package in internal form (e.g. `mybot`).
    pub package: String,
    pub shape: ShapeRules,
    pub hook: MeteringHook,
}

impl InstrumentConfig {
    /// Default configuration for `package` running on `engine`.
    pub fn new(package: &str, engine: &str) -> Self {
        Self {
            package: package.replace('.', "/").trim_end_matches('/').to_string(),
            shape: ShapeRules::default(),
            hook: MeteringHook::for_engine(engine),
        }
    }
}

/// Library holding the engine API every unit may use.
pub fn engine_api_library(engine: &str) -> String {
    format!("{engine}/api/")
}
