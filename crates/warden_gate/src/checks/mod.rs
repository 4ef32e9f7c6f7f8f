// SPDX-License-Identifier: Apache-2.0

//! The eight built-in `WorkflowCheck` implementations.

pub mod alignment_verification;
pub mod audit_history;
pub mod canary_audit;
pub mod coverage_minimum;
pub mod dead_code_check;
pub mod import_resolution_check;
pub mod linter_compliance;
pub mod test_verification;
