// SPDX-License-Identifier: Apache-2.0

//! The immutable observation a check emits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use warden_common::severity::Severity;

/// One violation observation produced by a check.
///
/// `check_id` must equal one of the rule ids declared by the emitting check
/// (the audit dispatcher asserts this in debug builds); `context` carries
/// any free-form supporting detail the check wants to attach (a suggested
/// fix, the offending snippet, a subprocess's raw output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    /// The rule id this finding is evidence for.
    pub check_id: String,
    /// How serious this particular observation is.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Repository-relative path the finding applies to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// 1-based line number, if any.
    #[serde(rename = "line_number", skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Free-form supporting context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Finding {
    /// Builds a finding with no location and no extra context.
    #[must_use]
    pub fn new(check_id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Finding {
            check_id: check_id.into(),
            severity,
            message: message.into(),
            file_path: None,
            line: None,
            context: None,
        }
    }

    /// Attaches a file path.
    #[must_use]
    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    /// Attaches a line number.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Attaches free-form context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The synthetic finding recorded when a check crashes instead of
    /// completing, per the audit engine's crash-capture policy.
    #[must_use]
    pub fn crash(message: impl Into<String>) -> Self {
        Finding::new("internal.audit.crash", Severity::Error, message)
    }
}
