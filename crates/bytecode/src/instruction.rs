// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Instruction-level events of a method body.
//!
//! [`Instruction`] is closed: every instruction a structural reader can report
//! is one of its variants, and consumers match on it exhaustively. Each variant
//! carries exactly the symbols relevant to that instruction kind.

use serde::{Deserialize, Serialize};

use crate::opcode::{Opcode, OperandKind};

/// A position in a method body that branches, switches and exception
/// handlers refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub u32);

/// Reference kind of a method handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

/// A method handle (bootstrap methods, `ldc` of a method handle constant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub kind: HandleKind,
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub is_interface: bool,
}

/// A loadable constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Class literal or method type, as a descriptor (`Ljava/lang/String;`,
    /// `[I`, `(I)V`).
    Type(String),
    Handle(Handle),
}

/// One instruction of a method body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    /// Zero-operand instruction (`iadd`, `return`, `athrow`, ...).
    Insn { opcode: Opcode },
    /// `bipush`, `sipush` or `newarray`.
    IntInsn { opcode: Opcode, operand: i32 },
    /// Local variable load/store, or `ret`.
    VarInsn { opcode: Opcode, var: u16 },
    /// `new`, `anewarray`, `checkcast` or `instanceof`. The type is an
    /// internal class name, or an array descriptor for array types.
    TypeInsn { opcode: Opcode, type_name: String },
    FieldInsn {
        opcode: Opcode,
        owner: String,
        name: String,
        descriptor: String,
    },
    /// Method invocation. `is_interface` is `None` for the legacy form that
    /// does not record whether the owner is an interface.
    MethodInsn {
        opcode: Opcode,
        owner: String,
        name: String,
        descriptor: String,
        #[serde(default)]
        is_interface: Option<bool>,
    },
    InvokeDynamic {
        name: String,
        descriptor: String,
        bootstrap: Handle,
        #[serde(default)]
        bootstrap_args: Vec<Constant>,
    },
    Jump { opcode: Opcode, target: Label },
    /// Label marker.
    Label { label: Label },
    Ldc { value: Constant },
    Iinc { var: u16, increment: i16 },
    TableSwitch {
        min: i32,
        max: i32,
        default: Label,
        targets: Vec<Label>,
    },
    LookupSwitch {
        default: Label,
        keys: Vec<i32>,
        targets: Vec<Label>,
    },
    MultiANewArray { descriptor: String, dimensions: u8 },
    /// Exception handler registration. `catch_type` is `None` for `finally`.
    TryCatch {
        start: Label,
        end: Label,
        handler: Label,
        catch_type: Option<String>,
    },
}

impl Instruction {
    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Instruction::Insn { .. } => "insn",
            Instruction::IntInsn { .. } => "int_insn",
            Instruction::VarInsn { .. } => "var_insn",
            Instruction::TypeInsn { .. } => "type_insn",
            Instruction::FieldInsn { .. } => "field_insn",
            Instruction::MethodInsn { .. } => "method_insn",
            Instruction::InvokeDynamic { .. } => "invoke_dynamic",
            Instruction::Jump { .. } => "jump",
            Instruction::Label { .. } => "label",
            Instruction::Ldc { .. } => "ldc",
            Instruction::Iinc { .. } => "iinc",
            Instruction::TableSwitch { .. } => "table_switch",
            Instruction::LookupSwitch { .. } => "lookup_switch",
            Instruction::MultiANewArray { .. } => "multi_a_new_array",
            Instruction::TryCatch { .. } => "try_catch",
        }
    }

    /// Opcode of this instruction, if it corresponds to a single opcode.
    ///
    /// Labels and exception handler registrations are not opcodes.
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Instruction::Insn { opcode }
            | Instruction::IntInsn { opcode, .. }
            | Instruction::VarInsn { opcode, .. }
            | Instruction::TypeInsn { opcode, .. }
            | Instruction::FieldInsn { opcode, .. }
            | Instruction::MethodInsn { opcode, .. }
            | Instruction::Jump { opcode, .. } => Some(*opcode),
            Instruction::InvokeDynamic { .. } => Some(Opcode::INVOKEDYNAMIC),
            Instruction::Ldc { .. } => Some(Opcode::LDC),
            Instruction::Iinc { .. } => Some(Opcode::IINC),
            Instruction::TableSwitch { .. } => Some(Opcode::TABLESWITCH),
            Instruction::LookupSwitch { .. } => Some(Opcode::LOOKUPSWITCH),
            Instruction::MultiANewArray { .. } => Some(Opcode::MULTIANEWARRAY),
            Instruction::Label { .. } | Instruction::TryCatch { .. } => None,
        }
    }

    /// Operand shape this variant carries.
    fn operand_kind(&self) -> Option<OperandKind> {
        match self {
            Instruction::Insn { .. } => Some(OperandKind::None),
            Instruction::IntInsn { .. } => Some(OperandKind::Int),
            Instruction::VarInsn { .. } => Some(OperandKind::Var),
            Instruction::TypeInsn { .. } => Some(OperandKind::Type),
            Instruction::FieldInsn { .. } => Some(OperandKind::Field),
            Instruction::MethodInsn { .. } => Some(OperandKind::Method),
            Instruction::InvokeDynamic { .. } => Some(OperandKind::InvokeDynamic),
            Instruction::Jump { .. } => Some(OperandKind::Jump),
            Instruction::Ldc { .. } => Some(OperandKind::Ldc),
            Instruction::Iinc { .. } => Some(OperandKind::Iinc),
            Instruction::TableSwitch { .. } => Some(OperandKind::TableSwitch),
            Instruction::LookupSwitch { .. } => Some(OperandKind::LookupSwitch),
            Instruction::MultiANewArray { .. } => Some(OperandKind::MultiANewArray),
            Instruction::Label { .. } | Instruction::TryCatch { .. } => None,
        }
    }

    /// Check that the opcode belongs to this variant (e.g. no `iadd` carried
    /// by a `MethodInsn`).
    pub fn is_well_formed(&self) -> bool {
        match (self.opcode(), self.operand_kind()) {
            (Some(opcode), Some(kind)) => opcode.kind() == kind,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::{Constant, Handle, HandleKind, Instruction, Label};
    use crate::Opcode;

    #[test]
    fn test_opcode_of_fixed_variants() {
        let iinc = Instruction::Iinc {
            var: 1,
            increment: 1,
        };
        assert_eq!(iinc.opcode(), Some(Opcode::IINC));

        let label = Instruction::Label { label: Label(0) };
        assert_eq!(label.opcode(), None);
    }

    #[test]
    fn test_well_formed() {
        let call = Instruction::MethodInsn {
            opcode: Opcode::INVOKESTATIC,
            owner: "java/lang/Math".into(),
            name: "abs".into(),
            descriptor: "(I)I".into(),
            is_interface: Some(false),
        };
        assert!(call.is_well_formed());

        let bogus = Instruction::MethodInsn {
            opcode: Opcode::IADD,
            owner: "java/lang/Math".into(),
            name: "abs".into(),
            descriptor: "(I)I".into(),
            is_interface: None,
        };
        assert!(!bogus.is_well_formed());

        let jump = Instruction::Jump {
            opcode: Opcode::IFNULL,
            target: Label(3),
        };
        assert!(jump.is_well_formed());
        assert!(
            !Instruction::Insn {
                opcode: Opcode::GOTO
            }
            .is_well_formed()
        );
    }

    #[test]
    fn test_deserialize_body() {
        let json = indoc! {r#"
            [
                { "kind": "label", "label": 0 },
                { "kind": "var_insn", "opcode": "aload", "var": 0 },
                { "kind": "method_insn", "opcode": "invokespecial",
                  "owner": "java/lang/Object", "name": "<init>", "descriptor": "()V" },
                { "kind": "ldc", "value": { "type": "type", "value": "Ljava/lang/String;" } },
                { "kind": "try_catch", "start": 0, "end": 1, "handler": 2, "catch_type": null },
                { "kind": "insn", "opcode": "return" }
            ]
        "#};
        let body: Vec<Instruction> = serde_json::from_str(json).unwrap();
        assert_eq!(body.len(), 6);
        assert_eq!(
            body[2],
            Instruction::MethodInsn {
                opcode: Opcode::INVOKESPECIAL,
                owner: "java/lang/Object".into(),
                name: "<init>".into(),
                descriptor: "()V".into(),
                is_interface: None,
            }
        );
        assert_eq!(
            body[3],
            Instruction::Ldc {
                value: Constant::Type("Ljava/lang/String;".into())
            }
        );
        assert!(matches!(
            body[4],
            Instruction::TryCatch {
                catch_type: None,
                ..
            }
        ));
    }

    #[test]
    fn test_deserialize_invoke_dynamic() {
        let json = indoc! {r#"
            {
                "kind": "invoke_dynamic",
                "name": "run",
                "descriptor": "()Ljava/lang/Runnable;",
                "bootstrap": {
                    "kind": "invoke_static",
                    "owner": "java/lang/invoke/LambdaMetafactory",
                    "name": "metafactory",
                    "descriptor": "(Ljava/lang/invoke/MethodHandles$Lookup;)Ljava/lang/invoke/CallSite;"
                }
            }
        "#};
        let instruction: Instruction = serde_json::from_str(json).unwrap();
        let Instruction::InvokeDynamic {
            bootstrap,
            bootstrap_args,
            ..
        } = instruction
        else {
            panic!("expected invoke_dynamic");
        };
        assert_eq!(
            bootstrap,
            Handle {
                kind: HandleKind::InvokeStatic,
                owner: "java/lang/invoke/LambdaMetafactory".into(),
                name: "metafactory".into(),
                descriptor:
                    "(Ljava/lang/invoke/MethodHandles$Lookup;)Ljava/lang/invoke/CallSite;".into(),
                is_interface: false,
            }
        );
        assert!(bootstrap_args.is_empty());
    }
}
