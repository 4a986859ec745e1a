// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Declaration-level events of a compiled unit.
//!
//! A [`Unit`] is the decoded form of one class: its header followed by its
//! declarations in file order. [`Unit::into_events`] flattens it into the
//! ordered [`UnitEvent`] stream that passes consume, and [`UnitBuilder`] is the
//! [`UnitSink`] that reassembles a stream back into a `Unit` for encoding.

use serde::{Deserialize, Serialize};

use crate::access::AccessFlags;
use crate::instruction::{Constant, Instruction};

/// Unit header: declared name and supertypes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitHeader {
    /// Class file version.
    #[serde(default)]
    pub version: u32,
    pub access: AccessFlags,
    /// Internal name (e.g., `mybot/UnitController`).
    pub name: String,
    pub signature: Option<String>,
    /// `None` only for `java/lang/Object`.
    pub super_name: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub access: AccessFlags,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Initial value of a constant field.
    pub value: Option<Constant>,
}

/// A method declaration together with its instruction stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub access: AccessFlags,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Declared thrown exception classes.
    #[serde(default)]
    pub exceptions: Vec<String>,
    /// Empty for abstract and native methods.
    #[serde(default)]
    pub body: Vec<Instruction>,
}

/// Enclosing class (and method) of a local or anonymous class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OuterClass {
    pub owner: String,
    pub method_name: Option<String>,
    pub method_descriptor: Option<String>,
}

/// Nested class entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnerClass {
    /// Internal name of the nested class.
    pub name: String,
    pub outer_name: Option<String>,
    /// Simple source name; `None` for anonymous classes.
    pub inner_name: Option<String>,
    pub access: AccessFlags,
}

/// A declaration in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Field(FieldDecl),
    Method(MethodDecl),
    OuterClass(OuterClass),
    InnerClass(InnerClass),
}

/// One decoded compiled unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub header: UnitHeader,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Unit {
    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Flatten into the event stream: header, declarations, end.
    pub fn into_events(self) -> impl Iterator<Item = UnitEvent> {
        std::iter::once(UnitEvent::Header(self.header))
            .chain(self.declarations.into_iter().map(UnitEvent::from))
            .chain(std::iter::once(UnitEvent::End))
    }

    /// Iterate over the method declarations.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.declarations.iter().filter_map(|decl| match decl {
            Declaration::Method(method) => Some(method),
            _ => None,
        })
    }
}

/// Structural event of a unit traversal.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitEvent {
    Header(UnitHeader),
    Field(FieldDecl),
    Method(MethodDecl),
    OuterClass(OuterClass),
    InnerClass(InnerClass),
    End,
}

impl UnitEvent {
    /// Short name of the event, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            UnitEvent::Header(_) => "header",
            UnitEvent::Field(_) => "field",
            UnitEvent::Method(_) => "method",
            UnitEvent::OuterClass(_) => "outer_class",
            UnitEvent::InnerClass(_) => "inner_class",
            UnitEvent::End => "end",
        }
    }
}

impl From<Declaration> for UnitEvent {
    fn from(decl: Declaration) -> Self {
        match decl {
            Declaration::Field(field) => UnitEvent::Field(field),
            Declaration::Method(method) => UnitEvent::Method(method),
            Declaration::OuterClass(outer) => UnitEvent::OuterClass(outer),
            Declaration::InnerClass(inner) => UnitEvent::InnerClass(inner),
        }
    }
}

/// Downstream consumer of a unit event stream (e.g. the encoder).
pub trait UnitSink {
    fn accept(&mut self, event: UnitEvent);
}

/// Sink that reassembles an event stream into a [`Unit`].
#[derive(Debug, Default)]
pub struct UnitBuilder {
    header: Option<UnitHeader>,
    declarations: Vec<Declaration>,
    ended: bool,
}

impl UnitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The assembled unit, or `None` if the header or the end event was
    /// never received.
    pub fn finish(self) -> Option<Unit> {
        if !self.ended {
            return None;
        }
        self.header.map(|header| Unit {
            header,
            declarations: self.declarations,
        })
    }
}

impl UnitSink for UnitBuilder {
    fn accept(&mut self, event: UnitEvent) {
        match event {
            UnitEvent::Header(header) => self.header = Some(header),
            UnitEvent::Field(field) => self.declarations.push(Declaration::Field(field)),
            UnitEvent::Method(method) => self.declarations.push(Declaration::Method(method)),
            UnitEvent::OuterClass(outer) => self.declarations.push(Declaration::OuterClass(outer)),
            UnitEvent::InnerClass(inner) => self.declarations.push(Declaration::InnerClass(inner)),
            UnitEvent::End => self.ended = true,
        }
    }
}
