// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::store::internal_name;

/// Identity of the unit being processed.
///
/// Built from the unit header and passed to every validator call for that
/// unit, so validators never depend on which unit was seen last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitContext<'a> {
    /// Target package of the batch, in internal form (e.g. `mybot`).
    pub package: &'a str,
    /// Internal name of the unit (e.g. `mybot/Pathing`).
    pub unit_name: &'a str,
}

impl<'a> UnitContext<'a> {
    pub fn new(package: &'a str, unit_name: &'a str) -> Self {
        Self { package, unit_name }
    }

    /// Check if the unit is `<package>/<simple_name>`, in either delimiter
    /// form.
    pub fn is_unit(&self, simple_name: &str) -> bool {
        internal_name(self.unit_name)
            .strip_prefix(self.package)
            .and_then(|rest| rest.strip_prefix('/'))
            == Some(simple_name)
    }
}

#[cfg(test)]
mod tests {
    use super::UnitContext;

    #[test]
    fn test_is_unit() {
        let ctx = UnitContext::new("bot", "bot/UnitController");
        assert!(ctx.is_unit("UnitController"));
        assert!(!ctx.is_unit("Main"));

        let nested = UnitContext::new("bot", "bot/sub/UnitController");
        assert!(!nested.is_unit("UnitController"));

        let dotted = UnitContext::new("bot", "bot.UnitController");
        assert!(dotted.is_unit("UnitController"));
        assert!(!UnitContext::new("bot", "bot.sub.UnitController").is_unit("UnitController"));
    }
}
