// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Generic signature reader.
//!
//! Signatures are only present when a declaration uses type parameters. The
//! reader accepts all three forms:
//!
//! ```text
//! class:  [<TypeParams>] SuperclassSig SuperinterfaceSig*
//! method: [<TypeParams>] ( JavaTypeSig* ) ReturnType (^ThrowsSig)*
//! field:  ReferenceTypeSig
//! ```
//!
//! and reports every class type it meets, depth-first: type parameter bounds,
//! type arguments (including wildcard-bounded ones), array components and
//! inner class types. An inner class type `Outer<A>.Inner` is reported as
//! `Outer` then `Outer$Inner`.

use crate::error::SignatureError;

/// Maximum nesting of reference types (type arguments, arrays, bounds).
pub const MAX_DEPTH: usize = 256;

/// Collect the class names referenced by a generic signature, in
/// depth-first order.
pub fn class_references(signature: &str) -> Result<Vec<String>, SignatureError> {
    let mut names = Vec::new();
    SignatureReader::new(signature).read(&mut |name| names.push(name))?;
    Ok(names)
}

/// Recursive-descent reader over a signature string.
struct SignatureReader<'a> {
    input: &'a str,
    position: usize,
    depth: usize,
}

impl<'a> SignatureReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            depth: 0,
        }
    }

    /// Read a whole signature, reporting each class type to `visit`.
    fn read(mut self, visit: &mut impl FnMut(String)) -> Result<(), SignatureError> {
        if self.peek() == Some(b'<') {
            self.type_parameters(visit)?;
        }

        if self.peek() == Some(b'(') {
            self.bump();
            while self.peek() != Some(b')') {
                self.java_type(visit)?;
            }
            self.bump();
            if self.peek() == Some(b'V') {
                self.bump();
            } else {
                self.java_type(visit)?;
            }
            while self.peek() == Some(b'^') {
                self.bump();
                self.reference_type(visit)?;
            }
        } else {
            // Superclass and superinterfaces, or a single field type
            self.reference_type(visit)?;
            while self.peek().is_some() {
                self.reference_type(visit)?;
            }
        }

        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected()),
        }
    }

    /// `<T:Bound:IBound;U::IBound>`
    fn type_parameters(&mut self, visit: &mut impl FnMut(String)) -> Result<(), SignatureError> {
        self.bump();
        loop {
            match self.peek() {
                Some(b'>') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {
                    self.identifier_until(b":")?;
                    self.bump();
                    // The class bound may be empty when only interface bounds exist
                    if matches!(self.peek(), Some(b'L' | b'T' | b'[')) {
                        self.reference_type(visit)?;
                    }
                    while self.peek() == Some(b':') {
                        self.bump();
                        self.reference_type(visit)?;
                    }
                }
                None => return Err(self.unexpected_end()),
            }
        }
    }

    /// A primitive or a reference type.
    fn java_type(&mut self, visit: &mut impl FnMut(String)) -> Result<(), SignatureError> {
        match self.peek() {
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                self.bump();
                Ok(())
            }
            _ => self.reference_type(visit),
        }
    }

    /// Class type, type variable or array type.
    fn reference_type(&mut self, visit: &mut impl FnMut(String)) -> Result<(), SignatureError> {
        if self.depth == MAX_DEPTH {
            return Err(SignatureError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let result = self.reference_type_inner(visit);
        self.depth -= 1;
        result
    }

    fn reference_type_inner(
        &mut self,
        visit: &mut impl FnMut(String),
    ) -> Result<(), SignatureError> {
        match self.peek() {
            Some(b'L') => self.class_type(visit),
            Some(b'T') => {
                self.bump();
                self.identifier_until(b";")?;
                self.bump();
                Ok(())
            }
            Some(b'[') => {
                self.bump();
                self.java_type(visit)
            }
            Some(_) => Err(self.unexpected()),
            None => Err(self.unexpected_end()),
        }
    }

    /// `Lpkg/Outer<Args>.Inner<Args>;`
    fn class_type(&mut self, visit: &mut impl FnMut(String)) -> Result<(), SignatureError> {
        self.bump();
        let mut name = self.identifier_until(b"<.;")?.to_string();
        visit(name.clone());

        loop {
            match self.peek() {
                Some(b'<') => self.type_arguments(visit)?,
                Some(b'.') => {
                    self.bump();
                    let inner = self.identifier_until(b"<.;")?;
                    name = format!("{name}${inner}");
                    visit(name.clone());
                }
                Some(b';') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => return Err(self.unexpected()),
                None => return Err(self.unexpected_end()),
            }
        }
    }

    /// `<*+LBound;-LBound;LArg;>`
    fn type_arguments(&mut self, visit: &mut impl FnMut(String)) -> Result<(), SignatureError> {
        self.bump();
        loop {
            match self.peek() {
                Some(b'>') => {
                    self.bump();
                    return Ok(());
                }
                Some(b'*') => self.bump(),
                Some(b'+' | b'-') => {
                    self.bump();
                    self.reference_type(visit)?;
                }
                Some(_) => self.reference_type(visit)?,
                None => return Err(self.unexpected_end()),
            }
        }
    }

    /// Consume a non-empty identifier ending before one of `terminators`.
    fn identifier_until(&mut self, terminators: &[u8]) -> Result<&'a str, SignatureError> {
        let start = self.position;
        let length = self.input.as_bytes()[start..]
            .iter()
            .position(|b| terminators.contains(b))
            .ok_or_else(|| self.unexpected_end())?;
        if length == 0 {
            return Err(self.unexpected());
        }
        self.position += length;
        Ok(&self.input[start..start + length])
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    fn bump(&mut self) {
        self.position += 1;
    }

    fn unexpected(&self) -> SignatureError {
        match self.input[self.position..].chars().next() {
            Some(found) => SignatureError::UnexpectedCharacter {
                signature: self.input.to_string(),
                position: self.position,
                found,
            },
            None => self.unexpected_end(),
        }
    }

    fn unexpected_end(&self) -> SignatureError {
        SignatureError::UnexpectedEnd {
            signature: self.input.to_string(),
        }
    }
}
