// SPDX-License-Identifier: Apache-2.0

//! Built-in `RuleCheck` implementations.

pub mod atomic_action;
pub mod coverage_minimum;
pub mod headless_body;
pub mod import_resolution;
pub mod python_scan;
pub mod style;

use warden_policy::PolicyRegistry;

use crate::check::RuleCheck;

/// Every built-in check: the fixed-rule-id checks plus one `DocstringCheck`
/// per rule a loaded registry binds to the `DocstringCheck` engine.
#[must_use]
pub fn default_checks(registry: &PolicyRegistry) -> Vec<Box<dyn RuleCheck>> {
    let mut checks: Vec<Box<dyn RuleCheck>> = vec![
        Box::new(atomic_action::AtomicActionCheck::default()),
        Box::new(headless_body::HeadlessBodyCheck::default()),
        Box::new(import_resolution::ImportResolutionCheck::default()),
        Box::new(coverage_minimum::CoverageMinimumCheck::default()),
    ];
    checks.extend(style::DocstringCheck::bind(registry));
    checks
}
