// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use bytecode::{descriptor, signature};

use crate::error::{PolicyViolation, ValidationError};
use crate::store::{PolicyStore, internal_name};

/// Checks referenced symbols against a [`PolicyStore`].
///
/// Classes inside the target package (and its subpackages) are always
/// allowed. Every check is pure: validating the same symbol twice gives the
/// same answer.
#[derive(Debug, Clone, Copy)]
pub struct SymbolValidator<'a> {
    policy: &'a PolicyStore,
    package: &'a str,
}

impl<'a> SymbolValidator<'a> {
    pub fn new(policy: &'a PolicyStore, package: &'a str) -> Self {
        Self { policy, package }
    }

    /// Validate a class name. Array type names are validated as descriptors.
    pub fn validate_class(&self, name: Option<&str>) -> Result<(), ValidationError> {
        let Some(name) = name else {
            return Ok(());
        };
        if name.starts_with('[') {
            return self.validate_descriptor(Some(name));
        }

        let name = internal_name(name);
        if let Some(split) = name.rfind('/') {
            let library = &name[..=split];
            if self.is_own_library(library) {
                return Ok(());
            }
            if !self.policy.is_library_approved(library) {
                return Err(PolicyViolation::ForbiddenLibrary {
                    library: library.to_string(),
                    class: name.into_owned(),
                }
                .into());
            }
        }

        if self.policy.is_class_disallowed(&name) {
            return Err(PolicyViolation::ForbiddenClass {
                class: name.into_owned(),
            }
            .into());
        }
        Ok(())
    }

    pub fn validate_classes(&self, names: &[String]) -> Result<(), ValidationError> {
        names
            .iter()
            .try_for_each(|name| self.validate_class(Some(name)))
    }

    pub fn validate_method(&self, owner: &str, name: &str) -> Result<(), ValidationError> {
        let owner = internal_name(owner);
        if self.policy.is_method_disallowed(&owner, name) {
            return Err(PolicyViolation::ForbiddenMethod {
                owner: owner.into_owned(),
                method: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Validate every class component of a field or method descriptor.
    pub fn validate_descriptor(&self, descriptor: Option<&str>) -> Result<(), ValidationError> {
        let Some(descriptor) = descriptor.filter(|d| !d.is_empty()) else {
            return Ok(());
        };
        for class in descriptor::class_references(descriptor) {
            self.validate_class(Some(class?))?;
        }
        Ok(())
    }

    /// Validate every class type of a generic signature, depth-first.
    pub fn validate_signature(&self, signature: Option<&str>) -> Result<(), ValidationError> {
        let Some(signature) = signature.filter(|s| !s.is_empty()) else {
            return Ok(());
        };
        for class in signature::class_references(signature)? {
            self.validate_class(Some(&class))?;
        }
        Ok(())
    }

    fn is_own_library(&self, library: &str) -> bool {
        library
            .strip_prefix(self.package)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::SymbolValidator;
    use crate::{PolicyStore, PolicyViolation, ValidationError};

    fn policy() -> PolicyStore {
        PolicyStore::builder()
            .approve_library("java/lang")
            .approve_library("java/util")
            .approve_library("engine/api")
            .disallow_class("java/lang/Thread")
            .disallow_class("Unsafe")
            .disallow_method("java/lang/System", "exit")
            .build()
    }

    fn forbidden_library(library: &str, class: &str) -> ValidationError {
        PolicyViolation::ForbiddenLibrary {
            library: library.into(),
            class: class.into(),
        }
        .into()
    }

    #[test]
    fn test_none_is_vacuous() {
        let policy = PolicyStore::default();
        let validator = SymbolValidator::new(&policy, "bot");
        assert!(validator.validate_class(None).is_ok());
        assert!(validator.validate_descriptor(None).is_ok());
        assert!(validator.validate_descriptor(Some("")).is_ok());
        assert!(validator.validate_signature(None).is_ok());
        assert!(validator.validate_signature(Some("")).is_ok());
    }

    #[test]
    fn test_approved_and_forbidden_libraries() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        assert!(validator.validate_class(Some("java/lang/String")).is_ok());
        assert!(validator.validate_class(Some("java.util.ArrayList")).is_ok());
        assert_eq!(
            validator.validate_class(Some("java/io/File")),
            Err(forbidden_library("java/io/", "java/io/File"))
        );
        // approval is per library, not per prefix
        assert_eq!(
            validator.validate_class(Some("java/util/concurrent/Executors")),
            Err(forbidden_library(
                "java/util/concurrent/",
                "java/util/concurrent/Executors"
            ))
        );
    }

    #[test]
    fn test_explicit_ban_beats_library_approval() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        assert_eq!(
            validator.validate_class(Some("java/lang/Thread")),
            Err(PolicyViolation::ForbiddenClass {
                class: "java/lang/Thread".into()
            }
            .into())
        );
    }

    #[test]
    fn test_own_package_is_always_allowed() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        assert!(validator.validate_class(Some("bot/Pathing")).is_ok());
        assert!(validator.validate_class(Some("bot/nav/Graph")).is_ok());
        assert!(validator.validate_class(Some("botnet/Graph")).is_err());
    }

    #[test]
    fn test_undelimited_name_skips_library_check() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        assert!(validator.validate_class(Some("Helper")).is_ok());
        assert!(validator.validate_class(Some("Unsafe")).is_err());
    }

    #[test]
    fn test_array_type_name() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        assert!(validator.validate_class(Some("[Ljava/lang/String;")).is_ok());
        assert!(validator.validate_class(Some("[[I")).is_ok());
        assert_eq!(
            validator.validate_class(Some("[Ljava/io/File;")),
            Err(forbidden_library("java/io/", "java/io/File"))
        );
    }

    #[test]
    fn test_validate_classes() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        let ok = vec!["java/lang/Runnable".to_string(), "bot/Unit".to_string()];
        assert!(validator.validate_classes(&ok).is_ok());
        let bad = vec!["java/lang/Runnable".to_string(), "java/io/Closeable".to_string()];
        assert!(validator.validate_classes(&bad).is_err());
    }

    #[test]
    fn test_validate_method() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        assert_eq!(
            validator.validate_method("java.lang.System", "exit"),
            Err(PolicyViolation::ForbiddenMethod {
                owner: "java/lang/System".into(),
                method: "exit".into()
            }
            .into())
        );
        assert!(validator.validate_method("java/lang/System", "nanoTime").is_ok());
        assert!(validator.validate_method("java/lang/Runtime", "exit").is_ok());
    }

    #[test]
    fn test_validate_descriptor() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        assert!(
            validator
                .validate_descriptor(Some("(I[[Ljava/util/List;Lbot/Unit;)Ljava/lang/String;"))
                .is_ok()
        );
        assert_eq!(
            validator.validate_descriptor(Some("(Ljava/lang/String;)Ljava/io/File;")),
            Err(forbidden_library("java/io/", "java/io/File"))
        );
        assert!(matches!(
            validator.validate_descriptor(Some("(Ljava/lang/String)V")),
            Err(ValidationError::MalformedDescriptor(_))
        ));
        for truncated in ["(I", "()", "(I)["] {
            assert!(matches!(
                validator.validate_descriptor(Some(truncated)),
                Err(ValidationError::MalformedDescriptor(_))
            ));
        }
    }

    #[test]
    fn test_validate_signature() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        assert!(
            validator
                .validate_signature(Some("Ljava/util/Map<Ljava/lang/String;Lbot/Unit;>;"))
                .is_ok()
        );
        assert_eq!(
            validator.validate_signature(Some("Ljava/util/List<+Ljava/io/File;>;")),
            Err(forbidden_library("java/io/", "java/io/File"))
        );
        assert!(matches!(
            validator.validate_signature(Some("Ljava/util/List<")),
            Err(ValidationError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let policy = policy();
        let validator = SymbolValidator::new(&policy, "bot");
        for _ in 0..3 {
            assert!(validator.validate_class(Some("java/lang/Thread")).is_err());
            assert!(validator.validate_class(Some("java/lang/Math")).is_ok());
        }
    }

    fn arb_segment() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["bot", "java", "lang", "util", "io", "net", "api", "engine"])
            .prop_map(str::to_string)
    }

    fn arb_class_name() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(arb_segment(), 0..4),
            prop::sample::select(vec!["String", "Thread", "File", "Unit", "Unsafe"]),
        )
            .prop_map(|(library, simple)| {
                library
                    .into_iter()
                    .chain(std::iter::once(simple.to_string()))
                    .collect::<Vec<_>>()
                    .join("/")
            })
    }

    proptest! {
        #[test]
        fn validate_class_accepts_exactly_the_permitted_names(name in arb_class_name()) {
            let policy = policy();
            let validator = SymbolValidator::new(&policy, "bot");

            let expected = match name.rfind('/') {
                Some(split) => {
                    let library = &name[..=split];
                    library.starts_with("bot/")
                        || (policy.is_library_approved(library) && !policy.is_class_disallowed(&name))
                }
                None => !policy.is_class_disallowed(&name),
            };
            prop_assert_eq!(validator.validate_class(Some(&name)).is_ok(), expected);
        }
    }
}
