// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! JVM opcode classification
//!
//! Single source of truth for the opcodes a unit body may contain, keyed both
//! by numeric code and by mnemonic. Only the canonical forms a structural
//! reader reports are listed: short forms such as `iload_0`, `ldc_w` or
//! `goto_w` are expanded by the reader before they reach the instrumenter.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::OpcodeError;

/// Operand shape of an opcode, matching the [`crate::Instruction`] variant
/// that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// No operand (`iadd`, `return`, ...).
    None,
    /// Immediate integer (`bipush`, `sipush`, `newarray`).
    Int,
    /// Local variable index (`iload`, `astore`, `ret`, ...).
    Var,
    /// Class or array type name (`new`, `checkcast`, ...).
    Type,
    /// Field owner/name/descriptor.
    Field,
    /// Method owner/name/descriptor.
    Method,
    /// Dynamic call site.
    InvokeDynamic,
    /// Branch to a label.
    Jump,
    /// Constant pool load.
    Ldc,
    /// Local variable increment.
    Iinc,
    TableSwitch,
    LookupSwitch,
    MultiANewArray,
}

/// Classification of a JVM opcode.
pub struct OpcodeInfo {
    /// Numeric opcode.
    pub code: u8,
    /// Lowercase mnemonic (e.g., "invokestatic").
    pub mnemonic: &'static str,
    /// Operand shape.
    pub kind: OperandKind,
}

impl OpcodeInfo {
    const fn new(code: u8, mnemonic: &'static str, kind: OperandKind) -> Self {
        Self {
            code,
            mnemonic,
            kind,
        }
    }

    /// Placeholder returned for codes missing from the table.
    pub const UNKNOWN: Self = Self {
        code: 0xff,
        mnemonic: "unknown",
        kind: OperandKind::None,
    };
}

/// A JVM opcode, serialized as its mnemonic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Opcode(u8);

impl Opcode {
    pub const NOP: Self = Self(0x00);
    pub const ACONST_NULL: Self = Self(0x01);
    pub const ICONST_0: Self = Self(0x03);
    pub const ICONST_1: Self = Self(0x04);
    pub const BIPUSH: Self = Self(0x10);
    pub const SIPUSH: Self = Self(0x11);
    pub const LDC: Self = Self(0x12);
    pub const ILOAD: Self = Self(0x15);
    pub const ALOAD: Self = Self(0x19);
    pub const ISTORE: Self = Self(0x36);
    pub const ASTORE: Self = Self(0x3a);
    pub const POP: Self = Self(0x57);
    pub const DUP: Self = Self(0x59);
    pub const IADD: Self = Self(0x60);
    pub const ISUB: Self = Self(0x64);
    pub const IMUL: Self = Self(0x68);
    pub const IINC: Self = Self(0x84);
    pub const IFEQ: Self = Self(0x99);
    pub const IFNE: Self = Self(0x9a);
    pub const IF_ICMPGE: Self = Self(0xa2);
    pub const IF_ICMPLT: Self = Self(0xa1);
    pub const GOTO: Self = Self(0xa7);
    pub const TABLESWITCH: Self = Self(0xaa);
    pub const LOOKUPSWITCH: Self = Self(0xab);
    pub const IRETURN: Self = Self(0xac);
    pub const ARETURN: Self = Self(0xb0);
    pub const RETURN: Self = Self(0xb1);
    pub const GETSTATIC: Self = Self(0xb2);
    pub const PUTSTATIC: Self = Self(0xb3);
    pub const GETFIELD: Self = Self(0xb4);
    pub const PUTFIELD: Self = Self(0xb5);
    pub const INVOKEVIRTUAL: Self = Self(0xb6);
    pub const INVOKESPECIAL: Self = Self(0xb7);
    pub const INVOKESTATIC: Self = Self(0xb8);
    pub const INVOKEINTERFACE: Self = Self(0xb9);
    pub const INVOKEDYNAMIC: Self = Self(0xba);
    pub const NEW: Self = Self(0xbb);
    pub const NEWARRAY: Self = Self(0xbc);
    pub const ANEWARRAY: Self = Self(0xbd);
    pub const ARRAYLENGTH: Self = Self(0xbe);
    pub const ATHROW: Self = Self(0xbf);
    pub const CHECKCAST: Self = Self(0xc0);
    pub const INSTANCEOF: Self = Self(0xc1);
    pub const MULTIANEWARRAY: Self = Self(0xc5);
    pub const IFNULL: Self = Self(0xc6);
    pub const IFNONNULL: Self = Self(0xc7);

    /// Look up an opcode by mnemonic (case-insensitive).
    pub fn from_mnemonic(mnemonic: &str) -> Result<Self, OpcodeError> {
        BY_MNEMONIC
            .get(mnemonic.to_ascii_lowercase().as_str())
            .map(|info| Self(info.code))
            .ok_or_else(|| OpcodeError::UnknownMnemonic(mnemonic.to_string()))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Classification of this opcode.
    pub fn info(self) -> &'static OpcodeInfo {
        BY_CODE.get(&self.0).copied().unwrap_or(&OpcodeInfo::UNKNOWN)
    }

    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }

    pub fn kind(self) -> OperandKind {
        self.info().kind
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opcode({})", self.mnemonic())
    }
}

impl TryFrom<String> for Opcode {
    type Error = OpcodeError;

    fn try_from(mnemonic: String) -> Result<Self, Self::Error> {
        Self::from_mnemonic(&mnemonic)
    }
}

impl From<Opcode> for String {
    fn from(opcode: Opcode) -> Self {
        opcode.mnemonic().to_string()
    }
}

/// Single source of truth: all classified opcodes
const OPCODE_TABLE: &[OpcodeInfo] = &[
    // Constants
    OpcodeInfo::new(0x00, "nop", OperandKind::None),
    OpcodeInfo::new(0x01, "aconst_null", OperandKind::None),
    OpcodeInfo::new(0x02, "iconst_m1", OperandKind::None),
    OpcodeInfo::new(0x03, "iconst_0", OperandKind::None),
    OpcodeInfo::new(0x04, "iconst_1", OperandKind::None),
    OpcodeInfo::new(0x05, "iconst_2", OperandKind::None),
    OpcodeInfo::new(0x06, "iconst_3", OperandKind::None),
    OpcodeInfo::new(0x07, "iconst_4", OperandKind::None),
    OpcodeInfo::new(0x08, "iconst_5", OperandKind::None),
    OpcodeInfo::new(0x09, "lconst_0", OperandKind::None),
    OpcodeInfo::new(0x0a, "lconst_1", OperandKind::None),
    OpcodeInfo::new(0x0b, "fconst_0", OperandKind::None),
    OpcodeInfo::new(0x0c, "fconst_1", OperandKind::None),
    OpcodeInfo::new(0x0d, "fconst_2", OperandKind::None),
    OpcodeInfo::new(0x0e, "dconst_0", OperandKind::None),
    OpcodeInfo::new(0x0f, "dconst_1", OperandKind::None),
    OpcodeInfo::new(0x10, "bipush", OperandKind::Int),
    OpcodeInfo::new(0x11, "sipush", OperandKind::Int),
    OpcodeInfo::new(0x12, "ldc", OperandKind::Ldc),
    // Loads
    OpcodeInfo::new(0x15, "iload", OperandKind::Var),
    OpcodeInfo::new(0x16, "lload", OperandKind::Var),
    OpcodeInfo::new(0x17, "fload", OperandKind::Var),
    OpcodeInfo::new(0x18, "dload", OperandKind::Var),
    OpcodeInfo::new(0x19, "aload", OperandKind::Var),
    OpcodeInfo::new(0x2e, "iaload", OperandKind::None),
    OpcodeInfo::new(0x2f, "laload", OperandKind::None),
    OpcodeInfo::new(0x30, "faload", OperandKind::None),
    OpcodeInfo::new(0x31, "daload", OperandKind::None),
    OpcodeInfo::new(0x32, "aaload", OperandKind::None),
    OpcodeInfo::new(0x33, "baload", OperandKind::None),
    OpcodeInfo::new(0x34, "caload", OperandKind::None),
    OpcodeInfo::new(0x35, "saload", OperandKind::None),
    // Stores
    OpcodeInfo::new(0x36, "istore", OperandKind::Var),
    OpcodeInfo::new(0x37, "lstore", OperandKind::Var),
    OpcodeInfo::new(0x38, "fstore", OperandKind::Var),
    OpcodeInfo::new(0x39, "dstore", OperandKind::Var),
    OpcodeInfo::new(0x3a, "astore", OperandKind::Var),
    OpcodeInfo::new(0x4f, "iastore", OperandKind::None),
    OpcodeInfo::new(0x50, "lastore", OperandKind::None),
    OpcodeInfo::new(0x51, "fastore", OperandKind::None),
    OpcodeInfo::new(0x52, "dastore", OperandKind::None),
    OpcodeInfo::new(0x53, "aastore", OperandKind::None),
    OpcodeInfo::new(0x54, "bastore", OperandKind::None),
    OpcodeInfo::new(0x55, "castore", OperandKind::None),
    OpcodeInfo::new(0x56, "sastore", OperandKind::None),
    // Stack
    OpcodeInfo::new(0x57, "pop", OperandKind::None),
    OpcodeInfo::new(0x58, "pop2", OperandKind::None),
    OpcodeInfo::new(0x59, "dup", OperandKind::None),
    OpcodeInfo::new(0x5a, "dup_x1", OperandKind::None),
    OpcodeInfo::new(0x5b, "dup_x2", OperandKind::None),
    OpcodeInfo::new(0x5c, "dup2", OperandKind::None),
    OpcodeInfo::new(0x5d, "dup2_x1", OperandKind::None),
    OpcodeInfo::new(0x5e, "dup2_x2", OperandKind::None),
    OpcodeInfo::new(0x5f, "swap", OperandKind::None),
    // Arithmetic
    OpcodeInfo::new(0x60, "iadd", OperandKind::None),
    OpcodeInfo::new(0x61, "ladd", OperandKind::None),
    OpcodeInfo::new(0x62, "fadd", OperandKind::None),
    OpcodeInfo::new(0x63, "dadd", OperandKind::None),
    OpcodeInfo::new(0x64, "isub", OperandKind::None),
    OpcodeInfo::new(0x65, "lsub", OperandKind::None),
    OpcodeInfo::new(0x66, "fsub", OperandKind::None),
    OpcodeInfo::new(0x67, "dsub", OperandKind::None),
    OpcodeInfo::new(0x68, "imul", OperandKind::None),
    OpcodeInfo::new(0x69, "lmul", OperandKind::None),
    OpcodeInfo::new(0x6a, "fmul", OperandKind::None),
    OpcodeInfo::new(0x6b, "dmul", OperandKind::None),
    OpcodeInfo::new(0x6c, "idiv", OperandKind::None),
    OpcodeInfo::new(0x6d, "ldiv", OperandKind::None),
    OpcodeInfo::new(0x6e, "fdiv", OperandKind::None),
    OpcodeInfo::new(0x6f, "ddiv", OperandKind::None),
    OpcodeInfo::new(0x70, "irem", OperandKind::None),
    OpcodeInfo::new(0x71, "lrem", OperandKind::None),
    OpcodeInfo::new(0x72, "frem", OperandKind::None),
    OpcodeInfo::new(0x73, "drem", OperandKind::None),
    OpcodeInfo::new(0x74, "ineg", OperandKind::None),
    OpcodeInfo::new(0x75, "lneg", OperandKind::None),
    OpcodeInfo::new(0x76, "fneg", OperandKind::None),
    OpcodeInfo::new(0x77, "dneg", OperandKind::None),
    OpcodeInfo::new(0x78, "ishl", OperandKind::None),
    OpcodeInfo::new(0x79, "lshl", OperandKind::None),
    OpcodeInfo::new(0x7a, "ishr", OperandKind::None),
    OpcodeInfo::new(0x7b, "lshr", OperandKind::None),
    OpcodeInfo::new(0x7c, "iushr", OperandKind::None),
    OpcodeInfo::new(0x7d, "lushr", OperandKind::None),
    OpcodeInfo::new(0x7e, "iand", OperandKind::None),
    OpcodeInfo::new(0x7f, "land", OperandKind::None),
    OpcodeInfo::new(0x80, "ior", OperandKind::None),
    OpcodeInfo::new(0x81, "lor", OperandKind::None),
    OpcodeInfo::new(0x82, "ixor", OperandKind::None),
    OpcodeInfo::new(0x83, "lxor", OperandKind::None),
    OpcodeInfo::new(0x84, "iinc", OperandKind::Iinc),
    // Conversions
    OpcodeInfo::new(0x85, "i2l", OperandKind::None),
    OpcodeInfo::new(0x86, "i2f", OperandKind::None),
    OpcodeInfo::new(0x87, "i2d", OperandKind::None),
    OpcodeInfo::new(0x88, "l2i", OperandKind::None),
    OpcodeInfo::new(0x89, "l2f", OperandKind::None),
    OpcodeInfo::new(0x8a, "l2d", OperandKind::None),
    OpcodeInfo::new(0x8b, "f2i", OperandKind::None),
    OpcodeInfo::new(0x8c, "f2l", OperandKind::None),
    OpcodeInfo::new(0x8d, "f2d", OperandKind::None),
    OpcodeInfo::new(0x8e, "d2i", OperandKind::None),
    OpcodeInfo::new(0x8f, "d2l", OperandKind::None),
    OpcodeInfo::new(0x90, "d2f", OperandKind::None),
    OpcodeInfo::new(0x91, "i2b", OperandKind::None),
    OpcodeInfo::new(0x92, "i2c", OperandKind::None),
    OpcodeInfo::new(0x93, "i2s", OperandKind::None),
    // Comparisons
    OpcodeInfo::new(0x94, "lcmp", OperandKind::None),
    OpcodeInfo::new(0x95, "fcmpl", OperandKind::None),
    OpcodeInfo::new(0x96, "fcmpg", OperandKind::None),
    OpcodeInfo::new(0x97, "dcmpl", OperandKind::None),
    OpcodeInfo::new(0x98, "dcmpg", OperandKind::None),
    // Branches
    OpcodeInfo::new(0x99, "ifeq", OperandKind::Jump),
    OpcodeInfo::new(0x9a, "ifne", OperandKind::Jump),
    OpcodeInfo::new(0x9b, "iflt", OperandKind::Jump),
    OpcodeInfo::new(0x9c, "ifge", OperandKind::Jump),
    OpcodeInfo::new(0x9d, "ifgt", OperandKind::Jump),
    OpcodeInfo::new(0x9e, "ifle", OperandKind::Jump),
    OpcodeInfo::new(0x9f, "if_icmpeq", OperandKind::Jump),
    OpcodeInfo::new(0xa0, "if_icmpne", OperandKind::Jump),
    OpcodeInfo::new(0xa1, "if_icmplt", OperandKind::Jump),
    OpcodeInfo::new(0xa2, "if_icmpge", OperandKind::Jump),
    OpcodeInfo::new(0xa3, "if_icmpgt", OperandKind::Jump),
    OpcodeInfo::new(0xa4, "if_icmple", OperandKind::Jump),
    OpcodeInfo::new(0xa5, "if_acmpeq", OperandKind::Jump),
    OpcodeInfo::new(0xa6, "if_acmpne", OperandKind::Jump),
    OpcodeInfo::new(0xa7, "goto", OperandKind::Jump),
    OpcodeInfo::new(0xa8, "jsr", OperandKind::Jump),
    OpcodeInfo::new(0xa9, "ret", OperandKind::Var),
    OpcodeInfo::new(0xaa, "tableswitch", OperandKind::TableSwitch),
    OpcodeInfo::new(0xab, "lookupswitch", OperandKind::LookupSwitch),
    OpcodeInfo::new(0xc6, "ifnull", OperandKind::Jump),
    OpcodeInfo::new(0xc7, "ifnonnull", OperandKind::Jump),
    // Returns
    OpcodeInfo::new(0xac, "ireturn", OperandKind::None),
    OpcodeInfo::new(0xad, "lreturn", OperandKind::None),
    OpcodeInfo::new(0xae, "freturn", OperandKind::None),
    OpcodeInfo::new(0xaf, "dreturn", OperandKind::None),
    OpcodeInfo::new(0xb0, "areturn", OperandKind::None),
    OpcodeInfo::new(0xb1, "return", OperandKind::None),
    // Fields
    OpcodeInfo::new(0xb2, "getstatic", OperandKind::Field),
    OpcodeInfo::new(0xb3, "putstatic", OperandKind::Field),
    OpcodeInfo::new(0xb4, "getfield", OperandKind::Field),
    OpcodeInfo::new(0xb5, "putfield", OperandKind::Field),
    // Invocations
    OpcodeInfo::new(0xb6, "invokevirtual", OperandKind::Method),
    OpcodeInfo::new(0xb7, "invokespecial", OperandKind::Method),
    OpcodeInfo::new(0xb8, "invokestatic", OperandKind::Method),
    OpcodeInfo::new(0xb9, "invokeinterface", OperandKind::Method),
    OpcodeInfo::new(0xba, "invokedynamic", OperandKind::InvokeDynamic),
    // Objects and arrays
    OpcodeInfo::new(0xbb, "new", OperandKind::Type),
    OpcodeInfo::new(0xbc, "newarray", OperandKind::Int),
    OpcodeInfo::new(0xbd, "anewarray", OperandKind::Type),
    OpcodeInfo::new(0xbe, "arraylength", OperandKind::None),
    OpcodeInfo::new(0xbf, "athrow", OperandKind::None),
    OpcodeInfo::new(0xc0, "checkcast", OperandKind::Type),
    OpcodeInfo::new(0xc1, "instanceof", OperandKind::Type),
    OpcodeInfo::new(0xc2, "monitorenter", OperandKind::None),
    OpcodeInfo::new(0xc3, "monitorexit", OperandKind::None),
    OpcodeInfo::new(0xc5, "multianewarray", OperandKind::MultiANewArray),
];

lazy_static! {
    /// Map from mnemonic string to OpcodeInfo
    pub static ref BY_MNEMONIC: HashMap<&'static str, &'static OpcodeInfo> = {
        OPCODE_TABLE.iter().map(|info| (info.mnemonic, info)).collect()
    };

    /// Map from numeric code to OpcodeInfo
    pub static ref BY_CODE: HashMap<u8, &'static OpcodeInfo> = {
        OPCODE_TABLE.iter().map(|info| (info.code, info)).collect()
    };
}

#[cfg(test)]
mod tests {
    use super::{BY_CODE, BY_MNEMONIC, OPCODE_TABLE, Opcode, OperandKind};
    use crate::OpcodeError;

    #[test]
    fn test_table_has_no_duplicates() {
        assert_eq!(BY_CODE.len(), OPCODE_TABLE.len());
        assert_eq!(BY_MNEMONIC.len(), OPCODE_TABLE.len());
    }

    #[test]
    fn test_named_constants_are_in_table() {
        for opcode in [
            Opcode::NOP,
            Opcode::LDC,
            Opcode::IINC,
            Opcode::IF_ICMPLT,
            Opcode::GOTO,
            Opcode::RETURN,
            Opcode::GETSTATIC,
            Opcode::INVOKESTATIC,
            Opcode::INVOKEDYNAMIC,
            Opcode::MULTIANEWARRAY,
            Opcode::IFNONNULL,
        ] {
            assert_ne!(opcode.mnemonic(), "unknown", "{:#04x}", opcode.code());
        }
    }

    #[test]
    fn test_classify_invoke() {
        let info = Opcode::INVOKEINTERFACE.info();
        assert_eq!(info.mnemonic, "invokeinterface");
        assert_eq!(info.kind, OperandKind::Method);
        assert_eq!(Opcode::INVOKEDYNAMIC.kind(), OperandKind::InvokeDynamic);
    }

    #[test]
    fn test_classify_operand_kinds() {
        assert_eq!(Opcode::BIPUSH.kind(), OperandKind::Int);
        assert_eq!(Opcode::ALOAD.kind(), OperandKind::Var);
        assert_eq!(Opcode::CHECKCAST.kind(), OperandKind::Type);
        assert_eq!(Opcode::PUTFIELD.kind(), OperandKind::Field);
        assert_eq!(Opcode::IFNULL.kind(), OperandKind::Jump);
        assert_eq!(Opcode::IADD.kind(), OperandKind::None);
    }

    #[test]
    fn test_from_mnemonic() {
        assert_eq!(Opcode::from_mnemonic("iadd").unwrap(), Opcode::IADD);
        assert_eq!(Opcode::from_mnemonic("GOTO").unwrap(), Opcode::GOTO);
        assert_eq!(
            Opcode::from_mnemonic("iload_0"),
            Err(OpcodeError::UnknownMnemonic("iload_0".to_string()))
        );
    }

    #[test]
    fn test_serializes_as_mnemonic() {
        let json = serde_json::to_string(&Opcode::INVOKEVIRTUAL).unwrap();
        assert_eq!(json, "\"invokevirtual\"");
        let opcode: Opcode = serde_json::from_str("\"if_icmpge\"").unwrap();
        assert_eq!(opcode, Opcode::IF_ICMPGE);
        assert!(serde_json::from_str::<Opcode>("\"bogus\"").is_err());
    }
}
