// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-unit validation and instrumentation pass
//!
//! The pass consumes the event stream of one unit and forwards a rewritten
//! stream to a [`UnitSink`]:
//!
//! ```text
//! Idle --Header--> UnitOpen --Field/Method/OuterClass/InnerClass--> Declarations --End--> Closed
//!                                   |                    ^
//!                                   +--> MethodBody -----+
//! ```
//!
//! Events that do not fit the state machine are a [`InstrumentError::MalformedUnit`].
//! The first violation is terminal: the pass forwards nothing further and the
//! caller is expected to abandon the whole batch.

use bytecode::{
    Constant,
    FieldDecl,
    Handle,
    InnerClass,
    Instruction,
    MethodDecl,
    OuterClass,
    Unit,
    UnitBuilder,
    UnitEvent,
    UnitHeader,
    UnitSink,
};
use policy::{PolicyStore, ShapeValidator, SymbolValidator, UnitContext, ValidationError};
use tracing::{debug, info};

use crate::config::InstrumentConfig;
use crate::error::{InstrumentError, Location};
use crate::meter::Meter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// No event seen yet.
    Idle,
    /// Header accepted, no declaration yet.
    UnitOpen,
    Declarations,
    /// Inside the instruction stream of a method.
    MethodBody,
    /// End accepted; the pass takes no more events.
    Closed,
}

/// Validates and meters one unit.
pub struct InstrumentationPass<'a> {
    package: &'a str,
    symbols: SymbolValidator<'a>,
    shape: ShapeValidator<'a>,
    meter: Meter<'a>,
    unit_name: Option<String>,
    state: PassState,
}

impl<'a> InstrumentationPass<'a> {
    pub fn new(policy: &'a PolicyStore, config: &'a InstrumentConfig) -> Self {
        Self {
            package: &config.package,
            symbols: SymbolValidator::new(policy, &config.package),
            shape: ShapeValidator::new(&config.shape),
            meter: Meter::new(policy, &config.hook),
            unit_name: None,
            state: PassState::Idle,
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    /// Name of the unit, once its header has been accepted.
    pub fn unit_name(&self) -> Option<&str> {
        self.unit_name.as_deref()
    }

    /// Validate `event` and forward its instrumented form to `sink`.
    pub fn accept(
        &mut self,
        event: UnitEvent,
        sink: &mut impl UnitSink,
    ) -> Result<(), InstrumentError> {
        debug!("Visiting {} in state {:?}", event.kind_name(), self.state);

        let event = match event {
            UnitEvent::Header(header) => UnitEvent::Header(self.visit_header(header)?),
            UnitEvent::End => {
                self.expect_open("end")?;
                self.state = PassState::Closed;
                info!("Instrumented unit `{}`", self.unit_name.as_deref().unwrap_or_default());
                UnitEvent::End
            }
            UnitEvent::Field(field) => {
                self.expect_open("field")?;
                UnitEvent::Field(self.visit_field(field)?)
            }
            UnitEvent::Method(method) => {
                self.expect_open("method")?;
                UnitEvent::Method(self.visit_method(method)?)
            }
            UnitEvent::OuterClass(outer) => {
                self.expect_open("outer class")?;
                UnitEvent::OuterClass(self.visit_outer_class(outer)?)
            }
            UnitEvent::InnerClass(inner) => {
                self.expect_open("inner class")?;
                UnitEvent::InnerClass(self.visit_inner_class(inner)?)
            }
        };

        sink.accept(event);
        Ok(())
    }

    /// Run the pass over a whole unit and reassemble the result.
    pub fn run(mut self, unit: Unit) -> Result<Unit, InstrumentError> {
        let mut builder = UnitBuilder::new();
        for event in unit.into_events() {
            self.accept(event, &mut builder)?;
        }
        builder
            .finish()
            .ok_or_else(|| InstrumentError::MalformedUnit("incomplete event stream".to_string()))
    }

    fn visit_header(&mut self, header: UnitHeader) -> Result<UnitHeader, InstrumentError> {
        if self.state != PassState::Idle {
            return Err(self.out_of_order("header"));
        }
        // Captured before any check so violations carry the unit name
        self.unit_name = Some(header.name.clone());

        let check = || -> Result<(), ValidationError> {
            self.symbols.validate_class(Some(&header.name))?;
            self.symbols.validate_signature(header.signature.as_deref())?;
            self.symbols.validate_class(header.super_name.as_deref())?;
            self.symbols.validate_classes(&header.interfaces)
        };
        check().map_err(|source| self.violation(None, source))?;

        self.state = PassState::UnitOpen;
        Ok(header)
    }

    fn visit_field(&mut self, field: FieldDecl) -> Result<FieldDecl, InstrumentError> {
        let check = || -> Result<(), ValidationError> {
            self.shape
                .check_field(&self.context(), field.access, &field.name)?;
            self.symbols.validate_descriptor(Some(&field.descriptor))?;
            self.symbols.validate_signature(field.signature.as_deref())
        };
        check().map_err(|source| self.violation(Some(&field.name), source))?;

        self.state = PassState::Declarations;
        Ok(field)
    }

    fn visit_method(&mut self, method: MethodDecl) -> Result<MethodDecl, InstrumentError> {
        let check = || -> Result<(), ValidationError> {
            self.shape
                .check_method(&self.context(), method.access, &method.name)?;
            self.symbols.validate_descriptor(Some(&method.descriptor))?;
            self.symbols.validate_signature(method.signature.as_deref())?;
            self.symbols.validate_classes(&method.exceptions)
        };
        check().map_err(|source| self.violation(Some(&method.name), source))?;

        self.state = PassState::MethodBody;
        let MethodDecl {
            access,
            name,
            descriptor,
            signature,
            exceptions,
            body,
        } = method;

        let mut metered = Vec::with_capacity(body.len() * 3);
        for instruction in body {
            if !instruction.is_well_formed() {
                return Err(InstrumentError::MalformedUnit(format!(
                    "`{}` in {}.{name} carries opcode {:?}",
                    instruction.kind_name(),
                    self.unit_name.as_deref().unwrap_or_default(),
                    instruction.opcode(),
                )));
            }
            debug!("Visiting {} in {name}", instruction.kind_name());
            self.validate_instruction(&instruction)
                .map_err(|source| self.violation(Some(&name), source))?;
            self.meter.instrument(instruction, &mut metered);
        }

        self.state = PassState::Declarations;
        Ok(MethodDecl {
            access,
            name,
            descriptor,
            signature,
            exceptions,
            body: metered,
        })
    }

    fn visit_outer_class(&mut self, outer: OuterClass) -> Result<OuterClass, InstrumentError> {
        let check = || -> Result<(), ValidationError> {
            self.symbols.validate_class(Some(&outer.owner))?;
            self.symbols
                .validate_descriptor(outer.method_descriptor.as_deref())
        };
        check().map_err(|source| self.violation(None, source))?;

        self.state = PassState::Declarations;
        Ok(outer)
    }

    fn visit_inner_class(&mut self, inner: InnerClass) -> Result<InnerClass, InstrumentError> {
        let check = || -> Result<(), ValidationError> {
            self.symbols.validate_class(Some(&inner.name))?;
            self.symbols.validate_class(inner.outer_name.as_deref())
        };
        check().map_err(|source| self.violation(None, source))?;

        self.state = PassState::Declarations;
        Ok(inner)
    }

    fn validate_instruction(&self, instruction: &Instruction) -> Result<(), ValidationError> {
        match instruction {
            Instruction::FieldInsn {
                owner, descriptor, ..
            } => {
                self.symbols.validate_class(Some(owner))?;
                self.symbols.validate_descriptor(Some(descriptor))
            }
            Instruction::MethodInsn {
                owner,
                name,
                descriptor,
                ..
            } => {
                self.symbols.validate_class(Some(owner))?;
                self.symbols.validate_method(owner, name)?;
                self.symbols.validate_descriptor(Some(descriptor))
            }
            Instruction::InvokeDynamic {
                descriptor,
                bootstrap,
                bootstrap_args,
                ..
            } => {
                // The bootstrap owner is usually a JDK linkage factory, so
                // only method policy applies to it
                self.symbols.validate_descriptor(Some(descriptor))?;
                self.symbols
                    .validate_method(&bootstrap.owner, &bootstrap.name)?;
                bootstrap_args
                    .iter()
                    .try_for_each(|arg| self.validate_constant(arg))
            }
            Instruction::TypeInsn { type_name, .. } => self.symbols.validate_class(Some(type_name)),
            Instruction::MultiANewArray { descriptor, .. } => {
                self.symbols.validate_descriptor(Some(descriptor))
            }
            Instruction::TryCatch { catch_type, .. } => {
                self.symbols.validate_class(catch_type.as_deref())
            }
            Instruction::Ldc { value } => self.validate_constant(value),
            Instruction::Insn { .. }
            | Instruction::IntInsn { .. }
            | Instruction::VarInsn { .. }
            | Instruction::Jump { .. }
            | Instruction::Label { .. }
            | Instruction::Iinc { .. }
            | Instruction::TableSwitch { .. }
            | Instruction::LookupSwitch { .. } => Ok(()),
        }
    }

    /// Class literals, method types and method handles name symbols.
    fn validate_constant(&self, constant: &Constant) -> Result<(), ValidationError> {
        match constant {
            Constant::Type(descriptor) => self.symbols.validate_descriptor(Some(descriptor)),
            Constant::Handle(handle) => self.validate_handle(handle),
            Constant::Int(_)
            | Constant::Long(_)
            | Constant::Float(_)
            | Constant::Double(_)
            | Constant::String(_) => Ok(()),
        }
    }

    fn validate_handle(&self, handle: &Handle) -> Result<(), ValidationError> {
        self.symbols.validate_class(Some(&handle.owner))?;
        self.symbols.validate_method(&handle.owner, &handle.name)?;
        self.symbols.validate_descriptor(Some(&handle.descriptor))
    }

    fn context(&self) -> UnitContext<'_> {
        UnitContext::new(self.package, self.unit_name.as_deref().unwrap_or_default())
    }

    fn expect_open(&self, event: &str) -> Result<(), InstrumentError> {
        match self.state {
            PassState::UnitOpen | PassState::Declarations => Ok(()),
            PassState::Idle | PassState::MethodBody | PassState::Closed => {
                Err(self.out_of_order(event))
            }
        }
    }

    fn out_of_order(&self, event: &str) -> InstrumentError {
        InstrumentError::MalformedUnit(format!(
            "unexpected {event} in state {:?} of unit `{}`",
            self.state,
            self.unit_name.as_deref().unwrap_or("<none>")
        ))
    }

    fn violation(&self, member: Option<&str>, source: ValidationError) -> InstrumentError {
        InstrumentError::Validation {
            location: Location {
                unit: self.unit_name.clone(),
                member: member.map(str::to_string),
            },
            source,
        }
    }
}

/// Validate and meter a single unit.
pub fn instrument_unit(
    unit: Unit,
    policy: &PolicyStore,
    config: &InstrumentConfig,
) -> Result<Unit, InstrumentError> {
    InstrumentationPass::new(policy, config).run(unit)
}
