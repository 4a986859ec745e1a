// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;

/// Largest weight a call may carry; the metering hook takes an `int`.
pub const MAX_METHOD_COST: u32 = i32::MAX as u32;

/// Read-only policy shared by every pass of a batch.
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    /// `owner/name` to cost weight. Unlisted methods cost 1.
    method_costs: HashMap<String, NonZeroU32>,
    /// Library prefixes, each ending with `/`.
    approved_libraries: HashSet<String>,
    disallowed_classes: HashSet<String>,
    /// Owner to banned method names.
    disallowed_methods: HashMap<String, HashSet<String>>,
}

impl PolicyStore {
    pub fn builder() -> PolicyStoreBuilder {
        PolicyStoreBuilder::default()
    }

    /// Cost weight of a call to `owner.name`.
    pub fn method_cost(&self, owner: &str, name: &str) -> u32 {
        let key = format!("{}/{name}", internal_name(owner));
        self.method_costs.get(&key).map_or(1, |cost| cost.get())
    }

    /// Check if `library` (with its trailing `/`) is approved.
    pub fn is_library_approved(&self, library: &str) -> bool {
        self.approved_libraries.contains(library)
    }

    pub fn is_class_disallowed(&self, class: &str) -> bool {
        self.disallowed_classes.contains(class)
    }

    pub fn is_method_disallowed(&self, owner: &str, name: &str) -> bool {
        self.disallowed_methods
            .get(owner)
            .is_some_and(|methods| methods.contains(name))
    }

    pub fn weighted_method_count(&self) -> usize {
        self.method_costs.len()
    }

    pub fn approved_library_count(&self) -> usize {
        self.approved_libraries.len()
    }

    pub fn disallowed_class_count(&self) -> usize {
        self.disallowed_classes.len()
    }

    pub fn disallowed_method_count(&self) -> usize {
        self.disallowed_methods.values().map(HashSet::len).sum()
    }
}

/// Collects policy entries; names are normalized to slash-delimited form.
#[derive(Debug, Clone, Default)]
pub struct PolicyStoreBuilder {
    store: PolicyStore,
}

impl PolicyStoreBuilder {
    /// Set the cost weight of `qualified`, written `owner/name`. Weights above
    /// [`MAX_METHOD_COST`] are charged as `MAX_METHOD_COST`.
    pub fn method_cost(mut self, qualified: &str, cost: NonZeroU32) -> Self {
        self.store
            .method_costs
            .insert(internal_name(qualified).into_owned(), cost);
        self
    }

    pub fn approve_library(mut self, library: &str) -> Self {
        let mut library = internal_name(library).into_owned();
        if !library.ends_with('/') {
            library.push('/');
        }
        self.store.approved_libraries.insert(library);
        self
    }

    pub fn disallow_class(mut self, class: &str) -> Self {
        self.store
            .disallowed_classes
            .insert(internal_name(class).into_owned());
        self
    }

    pub fn disallow_method(mut self, owner: &str, name: &str) -> Self {
        self.store
            .disallowed_methods
            .entry(internal_name(owner).into_owned())
            .or_default()
            .insert(name.to_string());
        self
    }

    pub fn build(self) -> PolicyStore {
        self.store
    }
}

/// Convert a dot-delimited name to internal (slash-delimited) form.
pub(crate) fn internal_name(name: &str) -> Cow<'_, str> {
    if name.contains('.') {
        Cow::Owned(name.replace('.', "/"))
    } else {
        Cow::Borrowed(name)
    }
}
