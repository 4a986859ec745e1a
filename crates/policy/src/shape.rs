// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use bytecode::{AccessFlags, CONSTRUCTOR_NAME};

use crate::context::UnitContext;
use crate::error::{ShapeViolation, ValidationError};

/// Simple name of the type the host instantiates for each player.
pub const DEFAULT_CONTROLLER: &str = "UnitController";

/// Prefix of the static switch tables the compiler emits for enum switches.
pub const RESERVED_FIELD_PREFIX: &str = "$SwitchMap$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRules {
    /// Simple name of the controller type inside the target package.
    pub controller: String,
    /// Static fields starting with this prefix are exempt.
    pub reserved_field_prefix: String,
}

impl Default for ShapeRules {
    fn default() -> Self {
        Self {
            controller: DEFAULT_CONTROLLER.to_string(),
            reserved_field_prefix: RESERVED_FIELD_PREFIX.to_string(),
        }
    }
}

/// Enforces the unit-shape rules on declarations.
#[derive(Debug, Clone, Copy)]
pub struct ShapeValidator<'a> {
    rules: &'a ShapeRules,
}

impl<'a> ShapeValidator<'a> {
    pub fn new(rules: &'a ShapeRules) -> Self {
        Self { rules }
    }

    /// The controller's constructor must be public.
    pub fn check_method(
        &self,
        ctx: &UnitContext<'_>,
        access: AccessFlags,
        name: &str,
    ) -> Result<(), ValidationError> {
        if name == CONSTRUCTOR_NAME && ctx.is_unit(&self.rules.controller) && !access.is_public() {
            return Err(ShapeViolation::NonPublicControllerConstructor {
                unit: ctx.unit_name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Static fields are shared between every instance in the host process.
    pub fn check_field(
        &self,
        ctx: &UnitContext<'_>,
        access: AccessFlags,
        name: &str,
    ) -> Result<(), ValidationError> {
        if access.is_static() && !name.starts_with(&self.rules.reserved_field_prefix) {
            return Err(ShapeViolation::ForbiddenSharedState {
                unit: ctx.unit_name.to_string(),
                field: name.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
