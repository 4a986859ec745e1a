// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Policy table loading.
//!
//! A policy directory holds four flat text tables. Each line is split on
//! whitespace; blank lines and lines starting with `#` are ignored.
//!
//! ```text
//! method_costs.txt         java/util/Arrays/sort 50
//! approved_libraries.txt   java/util
//! disallowed_classes.txt   java/lang/Thread
//! disallowed_methods.txt   java/lang/System exit
//! ```

use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

use tracing::{debug, info};

use crate::error::ConfigError;
use crate::store::{MAX_METHOD_COST, PolicyStore, PolicyStoreBuilder};

pub const METHOD_COSTS_FILE: &str = "method_costs.txt";
pub const APPROVED_LIBRARIES_FILE: &str = "approved_libraries.txt";
pub const DISALLOWED_CLASSES_FILE: &str = "disallowed_classes.txt";
pub const DISALLOWED_METHODS_FILE: &str = "disallowed_methods.txt";

/// Load the four policy tables from `dir` into `builder`.
///
/// Callers add run-specific entries (such as the engine API library) to the
/// returned builder before building the store.
pub fn load_policy(
    dir: &Path,
    builder: PolicyStoreBuilder,
) -> Result<PolicyStoreBuilder, ConfigError> {
    let builder = parse_method_costs(&read_table(dir, METHOD_COSTS_FILE)?, builder)?;
    let builder = parse_approved_libraries(&read_table(dir, APPROVED_LIBRARIES_FILE)?, builder)?;
    let builder = parse_disallowed_classes(&read_table(dir, DISALLOWED_CLASSES_FILE)?, builder)?;
    let builder = parse_disallowed_methods(&read_table(dir, DISALLOWED_METHODS_FILE)?, builder)?;
    info!("Loaded policy tables from {}", dir.display());
    Ok(builder)
}

/// Parse `<owner>/<name> <weight>` lines.
pub fn parse_method_costs(
    text: &str,
    mut builder: PolicyStoreBuilder,
) -> Result<PolicyStoreBuilder, ConfigError> {
    for (line, fields) in entries(text) {
        let [method, weight] = expect_fields::<2>(METHOD_COSTS_FILE, line, &fields)?;
        let cost = weight
            .parse::<NonZeroU32>()
            .map_err(|_| malformed(METHOD_COSTS_FILE, line, format!("invalid weight `{weight}`")))?;
        if cost.get() > MAX_METHOD_COST {
            return Err(malformed(
                METHOD_COSTS_FILE,
                line,
                format!("weight {cost} exceeds {MAX_METHOD_COST}"),
            ));
        }
        debug!("Method `{method}` costs {cost}");
        builder = builder.method_cost(method, cost);
    }
    Ok(builder)
}

/// Parse one library prefix per line.
pub fn parse_approved_libraries(
    text: &str,
    mut builder: PolicyStoreBuilder,
) -> Result<PolicyStoreBuilder, ConfigError> {
    for (line, fields) in entries(text) {
        let [library] = expect_fields::<1>(APPROVED_LIBRARIES_FILE, line, &fields)?;
        builder = builder.approve_library(library);
    }
    Ok(builder)
}

/// Parse one class name per line.
pub fn parse_disallowed_classes(
    text: &str,
    mut builder: PolicyStoreBuilder,
) -> Result<PolicyStoreBuilder, ConfigError> {
    for (line, fields) in entries(text) {
        let [class] = expect_fields::<1>(DISALLOWED_CLASSES_FILE, line, &fields)?;
        builder = builder.disallow_class(class);
    }
    Ok(builder)
}

/// Parse `<owner> <method>` lines.
pub fn parse_disallowed_methods(
    text: &str,
    mut builder: PolicyStoreBuilder,
) -> Result<PolicyStoreBuilder, ConfigError> {
    for (line, fields) in entries(text) {
        let [owner, method] = expect_fields::<2>(DISALLOWED_METHODS_FILE, line, &fields)?;
        builder = builder.disallow_method(owner, method);
    }
    Ok(builder)
}

impl PolicyStore {
    /// Load a complete store from a policy directory.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        load_policy(dir, PolicyStore::builder()).map(PolicyStoreBuilder::build)
    }
}

fn read_table(dir: &Path, file: &str) -> Result<String, ConfigError> {
    let path = dir.join(file);
    fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })
}

/// Non-empty, non-comment lines with their 1-based line numbers.
fn entries(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, text)| (line, text.split_whitespace().collect()))
}

fn expect_fields<'a, const N: usize>(
    file: &str,
    line: usize,
    fields: &[&'a str],
) -> Result<[&'a str; N], ConfigError> {
    <[&str; N]>::try_from(fields).map_err(|_| {
        malformed(
            file,
            line,
            format!("expected {N} field(s), found {}", fields.len()),
        )
    })
}

fn malformed(file: &str, line: usize, reason: String) -> ConfigError {
    ConfigError::Malformed {
        file: file.to_string(),
        line,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn test_parse_method_costs() {
        let text = indoc! {"
            # sorting is expensive
            java/util/Arrays/sort 50

            java/lang/Math/sqrt   3
        "};
        let policy = parse_method_costs(text, PolicyStore::builder())
            .unwrap()
            .build();
        assert_eq!(policy.method_cost("java/util/Arrays", "sort"), 50);
        assert_eq!(policy.method_cost("java/lang/Math", "sqrt"), 3);
        assert_eq!(policy.weighted_method_count(), 2);
    }

    #[test]
    fn test_zero_weight_is_rejected() {
        let err = parse_method_costs("java/lang/Math/abs 0\n", PolicyStore::builder()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Malformed { ref file, line: 1, .. } if file == METHOD_COSTS_FILE
        ));
    }

    #[test]
    fn test_weight_must_fit_the_hook_argument() {
        let policy = parse_method_costs("java/lang/Math/pow 2147483647\n", PolicyStore::builder())
            .unwrap()
            .build();
        assert_eq!(policy.method_cost("java/lang/Math", "pow"), MAX_METHOD_COST);

        let err = parse_method_costs("java/lang/Math/pow 2147483648\n", PolicyStore::builder())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "method_costs.txt:1: weight 2147483648 exceeds 2147483647"
        );
    }

    #[test]
    fn test_non_numeric_weight_is_rejected() {
        let text = indoc! {"
            java/lang/Math/abs 2
            java/lang/Math/max lots
        "};
        let err = parse_method_costs(text, PolicyStore::builder()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "method_costs.txt:2: invalid weight `lots`"
        );
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_disallowed_methods("java/lang/System\n", PolicyStore::builder()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "disallowed_methods.txt:1: expected 2 field(s), found 1"
        );
        assert!(parse_approved_libraries("java/util java/io\n", PolicyStore::builder()).is_err());
    }

    #[test]
    fn test_parse_lists() {
        let builder = parse_approved_libraries(
            indoc! {"
                java/util
                java/lang/
            "},
            PolicyStore::builder(),
        )
        .unwrap();
        let builder = parse_disallowed_classes("java/lang/Thread\n", builder).unwrap();
        let policy = parse_disallowed_methods(
            indoc! {"
                java/lang/System exit
                java/lang/System gc
            "},
            builder,
        )
        .unwrap()
        .build();

        assert!(policy.is_library_approved("java/util/"));
        assert!(policy.is_library_approved("java/lang/"));
        assert!(policy.is_class_disallowed("java/lang/Thread"));
        assert!(policy.is_method_disallowed("java/lang/System", "gc"));
        assert_eq!(policy.disallowed_method_count(), 2);
    }
}
