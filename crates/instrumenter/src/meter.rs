// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Execution metering
//!
//! Every executable instruction is followed by a call that charges its cost
//! to the runtime counter of the running unit:
//!
//! ```text
//! <original instruction>
//! ldc <cost>
//! invokestatic <engine>/threading/ThreadManager.addBytecodes(I)V
//! ```
//!
//! Method calls cost the weight listed in the policy (1 when unlisted); every
//! other instruction, labels included, costs 1. Exception handler
//! registrations are not instructions and are never charged.

use bytecode::{Constant, Instruction, Opcode};
use policy::PolicyStore;
use tracing::warn;

/// Descriptor of the metering hook: takes the cost, returns nothing.
pub const HOOK_DESCRIPTOR: &str = "(I)V";

/// Static method the metering calls target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeteringHook {
    pub owner: String,
    pub name: String,
}

impl MeteringHook {
    pub fn for_engine(engine: &str) -> Self {
        Self {
            owner: format!("{engine}/threading/ThreadManager"),
            name: "addBytecodes".to_string(),
        }
    }

    /// The `ldc` / `invokestatic` pair that charges `cost`.
    pub fn charge(&self, cost: u32) -> [Instruction; 2] {
        // Loaded tables never exceed the limit; only hand-built stores can
        let cost = i32::try_from(cost).unwrap_or_else(|_| {
            warn!("Cost {cost} exceeds {}, charging the maximum", i32::MAX);
            i32::MAX
        });
        [
            Instruction::Ldc {
                value: Constant::Int(cost),
            },
            Instruction::MethodInsn {
                opcode: Opcode::INVOKESTATIC,
                owner: self.owner.clone(),
                name: self.name.clone(),
                descriptor: HOOK_DESCRIPTOR.to_string(),
                is_interface: Some(false),
            },
        ]
    }
}

/// Computes instruction costs and emits metered bodies.
#[derive(Debug, Clone, Copy)]
pub struct Meter<'a> {
    policy: &'a PolicyStore,
    hook: &'a MeteringHook,
}

impl<'a> Meter<'a> {
    pub fn new(policy: &'a PolicyStore, hook: &'a MeteringHook) -> Self {
        Self { policy, hook }
    }

    /// Cost charged after `instruction`, or `None` if it is not metered.
    pub fn cost(&self, instruction: &Instruction) -> Option<u32> {
        match instruction {
            Instruction::MethodInsn { owner, name, .. } => Some(self.policy.method_cost(owner, name)),
            Instruction::TryCatch { .. } => None,
            Instruction::Insn { .. }
            | Instruction::IntInsn { .. }
            | Instruction::VarInsn { .. }
            | Instruction::TypeInsn { .. }
            | Instruction::FieldInsn { .. }
            | Instruction::InvokeDynamic { .. }
            | Instruction::Jump { .. }
            | Instruction::Label { .. }
            | Instruction::Ldc { .. }
            | Instruction::Iinc { .. }
            | Instruction::TableSwitch { .. }
            | Instruction::LookupSwitch { .. }
            | Instruction::MultiANewArray { .. } => Some(1),
        }
    }

    /// Forward `instruction` to `out`, followed by its metering call.
    pub fn instrument(&self, instruction: Instruction, out: &mut Vec<Instruction>) {
        let cost = self.cost(&instruction);
        out.push(instruction);
        if let Some(cost) = cost {
            out.extend(self.hook.charge(cost));
        }
    }
}
