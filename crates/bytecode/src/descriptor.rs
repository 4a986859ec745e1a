// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Field and method descriptor scanning.
//!
//! A field descriptor is a single type; a method descriptor is
//! `(<parameter types>)<return type>`. Class types are written `L<name>;`,
//! arrays prefix their component type with `[`, and primitives are single
//! letters (`BCDFIJSZ`, plus `V` for a void return). Only class types name a
//! symbol, so scanning yields the internal name of every class component in
//! order and skips everything else.

use crate::error::DescriptorError;

/// Iterate over the class names referenced by a field or method descriptor.
///
/// Each class component is yielded exactly once, regardless of array depth.
/// The iterator yields an error and stops at the first malformed component.
pub fn class_references(descriptor: &str) -> ClassReferences<'_> {
    ClassReferences {
        descriptor,
        position: 0,
        parameters: Parameters::NotStarted,
        pending_array: false,
        completed: 0,
        finished: false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parameters {
    NotStarted,
    Open,
    Closed,
}

/// Iterator returned by [`class_references`].
#[derive(Debug, Clone)]
pub struct ClassReferences<'a> {
    descriptor: &'a str,
    position: usize,
    parameters: Parameters,
    /// A `[` still waiting for its component type.
    pending_array: bool,
    /// Complete types outside the parameter list (the field type or the
    /// return type); at most one is allowed.
    completed: usize,
    finished: bool,
}

impl<'a> ClassReferences<'a> {
    fn complete_type(&mut self) {
        self.pending_array = false;
        if self.parameters != Parameters::Open {
            self.completed += 1;
        }
    }

    fn fail(&mut self, error: DescriptorError) -> Option<Result<&'a str, DescriptorError>> {
        self.finished = true;
        Some(Err(error))
    }

    fn unexpected(&mut self) -> Option<Result<&'a str, DescriptorError>> {
        let position = self.position;
        let found = self.descriptor[position..].chars().next().unwrap_or('?');
        self.fail(DescriptorError::UnexpectedCharacter {
            descriptor: self.descriptor.to_string(),
            position,
            found,
        })
    }
}

impl<'a> Iterator for ClassReferences<'a> {
    type Item = Result<&'a str, DescriptorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let descriptor = self.descriptor;
        let bytes = descriptor.as_bytes();

        while self.position < bytes.len() {
            if self.completed > 0 {
                return self.unexpected();
            }
            match bytes[self.position] {
                b'L' => {
                    let start = self.position + 1;
                    return match descriptor[start..].find(';') {
                        Some(length) if length > 0 => {
                            self.position = start + length + 1;
                            self.complete_type();
                            Some(Ok(&descriptor[start..start + length]))
                        }
                        _ => {
                            let position = self.position;
                            self.fail(DescriptorError::UnterminatedClass {
                                descriptor: descriptor.to_string(),
                                position,
                            })
                        }
                    };
                }
                b'[' => {
                    self.pending_array = true;
                    self.position += 1;
                }
                b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'V' => {
                    self.position += 1;
                    self.complete_type();
                }
                b'(' if self.position == 0 => {
                    self.parameters = Parameters::Open;
                    self.position += 1;
                }
                b')' if self.parameters == Parameters::Open && !self.pending_array => {
                    self.parameters = Parameters::Closed;
                    self.position += 1;
                }
                _ => return self.unexpected(),
            }
        }

        self.finished = true;
        // Unclosed parameters, a missing return type and a dangling `[` all
        // end before a complete type
        if self.completed == 0 {
            return Some(Err(DescriptorError::UnexpectedEnd {
                descriptor: descriptor.to_string(),
            }));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::class_references;
    use crate::DescriptorError;

    fn names(descriptor: &str) -> Vec<&str> {
        class_references(descriptor)
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_primitive_field() {
        assert!(names("I").is_empty());
        assert!(names("[[J").is_empty());
    }

    #[test]
    fn test_class_field() {
        assert_eq!(names("Ljava/lang/String;"), ["java/lang/String"]);
    }

    #[test]
    fn test_nested_array_of_class() {
        assert_eq!(names("[[[Ljava/util/List;"), ["java/util/List"]);
    }

    #[test]
    fn test_method_parameters_and_return() {
        assert_eq!(
            names("(ILjava/lang/String;[Ljava/util/Map;J)Ljava/lang/Object;"),
            ["java/lang/String", "java/util/Map", "java/lang/Object"]
        );
    }

    #[test]
    fn test_consecutive_class_parameters() {
        assert_eq!(
            names("(Lbot/A;Lbot/B;Lbot/C;)V"),
            ["bot/A", "bot/B", "bot/C"]
        );
    }

    #[test]
    fn test_class_name_containing_type_letters() {
        // `L`, `I`, `V` inside a class name must not start new components
        assert_eq!(names("(LIVL;)LLoop;"), ["IVL", "Loop"]);
    }

    #[test]
    fn test_empty_method() {
        assert!(names("()V").is_empty());
    }

    #[test]
    fn test_unterminated_class() {
        let result: Result<Vec<_>, _> = class_references("(Ljava/lang/String)V").collect();
        assert_eq!(
            result,
            Err(DescriptorError::UnterminatedClass {
                descriptor: "(Ljava/lang/String)V".into(),
                position: 1,
            })
        );
    }

    #[test]
    fn test_empty_class_name() {
        assert!(matches!(
            class_references("L;").next(),
            Some(Err(DescriptorError::UnterminatedClass { position: 0, .. }))
        ));
    }

    #[test]
    fn test_unexpected_character() {
        let mut refs = class_references("(IQ)V");
        assert!(matches!(
            refs.next(),
            Some(Err(DescriptorError::UnexpectedCharacter {
                position: 2,
                found: 'Q',
                ..
            }))
        ));
        // fused after the first error
        assert!(refs.next().is_none());
    }

    #[test]
    fn test_unclosed_parameters() {
        let result: Result<Vec<_>, _> = class_references("(I").collect();
        assert_eq!(
            result,
            Err(DescriptorError::UnexpectedEnd {
                descriptor: "(I".into()
            })
        );
        // the class before the truncation is still reported first
        let mut refs = class_references("(Lbot/A;");
        assert_eq!(refs.next(), Some(Ok("bot/A")));
        assert!(matches!(
            refs.next(),
            Some(Err(DescriptorError::UnexpectedEnd { .. }))
        ));
        assert!(refs.next().is_none());
    }

    #[test]
    fn test_missing_return_type() {
        assert!(matches!(
            class_references("()").next(),
            Some(Err(DescriptorError::UnexpectedEnd { .. }))
        ));
        assert!(matches!(
            class_references("(I)[").next(),
            Some(Err(DescriptorError::UnexpectedEnd { .. }))
        ));
    }

    #[test]
    fn test_dangling_array_marker() {
        assert!(class_references("[").next().unwrap().is_err());
        assert!(class_references("").next().unwrap().is_err());
        assert!(matches!(
            class_references("([)V").next(),
            Some(Err(DescriptorError::UnexpectedCharacter { position: 2, .. }))
        ));
    }

    #[test]
    fn test_more_than_one_type() {
        assert!(matches!(
            class_references("II").next(),
            Some(Err(DescriptorError::UnexpectedCharacter { position: 1, .. }))
        ));
        let result: Result<Vec<_>, _> = class_references("()VLbot/A;").collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_stray_parenthesis() {
        assert!(class_references("I(").next().unwrap().is_err());
        assert!(class_references("()V)").next().unwrap().is_err());
    }

    fn arb_class_name() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z][a-zA-Z0-9_$]{0,6}", 1..4).prop_map(|parts| parts.join("/"))
    }

    /// A field type plus the class name it references, if any.
    fn arb_field_type() -> impl Strategy<Value = (String, Option<String>)> {
        let primitive = prop::sample::select(vec!["B", "C", "D", "F", "I", "J", "S", "Z"])
            .prop_map(|p| (p.to_string(), None));
        let class = arb_class_name().prop_map(|name| (format!("L{name};"), Some(name)));
        (0usize..4, prop_oneof![primitive, class]).prop_map(|(depth, (ty, name))| {
            (format!("{}{ty}", "[".repeat(depth)), name)
        })
    }

    proptest! {
        #[test]
        fn method_descriptor_yields_every_class_once(
            params in prop::collection::vec(arb_field_type(), 0..8),
            ret in prop_oneof![
                Just(("V".to_string(), None)),
                arb_field_type(),
            ],
        ) {
            let descriptor = format!(
                "({}){}",
                params.iter().map(|(ty, _)| ty.as_str()).collect::<String>(),
                ret.0
            );
            let expected: Vec<String> = params
                .iter()
                .chain(std::iter::once(&ret))
                .filter_map(|(_, name)| name.clone())
                .collect();

            let found: Vec<String> = class_references(&descriptor)
                .map(|name| name.map(str::to_string))
                .collect::<Result<_, _>>()
                .unwrap();
            prop_assert_eq!(found, expected);
        }
    }
}
