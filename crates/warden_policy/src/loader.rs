// SPDX-License-Identifier: Apache-2.0

//! Discovers policy documents under a constitutional root and normalizes
//! either accepted shape (flat or nested) into `Policy`/`Rule` pairs.

use std::path::{Path, PathBuf};

use walkdir::DirEntry;
use warden_common::severity::{Authority, Enforcement, Severity};

use crate::error::PolicyError;
use crate::model::{EngineBinding, Policy, Rule};

/// Document-level id prefixes that mark a metadata identifier rather than a
/// real rule-bearing entry; filtered out before rule registration.
const METADATA_ID_PREFIXES: &[&str] = &["standard_", "schema_", "constitution_", "global_"];

/// Category sections recognized in the nested document shape.
const NESTED_SECTIONS: &[&str] = &[
    "agent_rules",
    "style_rules",
    "safety_rules",
    "autonomy_lanes",
    "naming_conventions",
];

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_policy_file(entry: &DirEntry) -> bool {
    let path = entry.path();
    let extension = path.extension().unwrap_or_default();
    path.is_file() && (extension == "yaml" || extension == "yml" || extension == "json")
}

/// Walks `root` and returns every candidate policy document path, sorted for
/// deterministic load order.
pub fn discover_documents(root: &Path) -> Result<Vec<PathBuf>, PolicyError> {
    let mut paths = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(|e| PolicyError::Unreadable {
            path: root.display().to_string(),
            error: e.to_string(),
        })?;
        if is_policy_file(&entry) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Parses a policy document (YAML or JSON, selected by extension) into a
/// generic JSON value so both accepted shapes can be matched uniformly.
pub fn parse_document(path: &Path) -> Result<serde_json::Value, PolicyError> {
    let contents = std::fs::read_to_string(path).map_err(|e| PolicyError::UnparseableDocument {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    if is_json {
        serde_json::from_str(&contents).map_err(|e| PolicyError::UnparseableDocument {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    } else {
        serde_yaml::from_str(&contents).map_err(|e| PolicyError::UnparseableDocument {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }
}

/// A document normalized into its policy header plus rules; absent when the
/// document has neither a `rules` array nor a recognized nested section
/// (treated as a silent, zero-rule metadata-only policy per the conservative
/// branch).
pub struct NormalizedDocument {
    /// The policy header extracted from the document.
    pub policy: Policy,
    /// Rules extracted from the document, in source order.
    pub rules: Vec<Rule>,
}

/// Normalizes one parsed document into a `Policy` plus its `Rule`s.
pub fn normalize(value: &serde_json::Value, path: &Path) -> NormalizedDocument {
    let obj = value.as_object();
    let policy_id = obj
        .and_then(|o| o.get("id").or_else(|| o.get("policy_id")))
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .unwrap_or_else(|| default_policy_id(path));

    let title = obj
        .and_then(|o| o.get("title"))
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .unwrap_or_else(|| policy_id.clone());
    let version = obj
        .and_then(|o| o.get("version"))
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .unwrap_or_else(|| "0".to_owned());
    let authority = obj
        .and_then(|o| o.get("authority"))
        .and_then(|v| v.as_str())
        .map(Authority::normalize)
        .unwrap_or(Authority::Policy);

    let mut rules = Vec::new();
    if let Some(array) = obj.and_then(|o| o.get("rules")).and_then(|v| v.as_array()) {
        for entry in array {
            if let Some(rule) = rule_from_value(entry, &policy_id) {
                rules.push(rule);
            }
        }
    } else {
        for section in NESTED_SECTIONS {
            let Some(section_value) = obj.and_then(|o| o.get(*section)) else {
                continue;
            };
            harvest_nested_section(section_value, &policy_id, &mut rules);
        }
    }

    let rule_ids = rules.iter().map(|r| r.rule_id.clone()).collect();
    NormalizedDocument {
        policy: Policy {
            policy_id,
            title,
            version,
            authority,
            rule_ids,
        },
        rules,
    }
}

fn default_policy_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .unwrap_or_else(|| path.display().to_string())
}

/// Recursively walks a nested section, which may be a list of rule objects
/// or a dict of named sub-lists (e.g. `naming_conventions.functions`).
fn harvest_nested_section(value: &serde_json::Value, policy_id: &str, out: &mut Vec<Rule>) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                if let Some(rule) = rule_from_value(item, policy_id) {
                    out.push(rule);
                }
            }
        }
        serde_json::Value::Object(map) => {
            for nested in map.values() {
                harvest_nested_section(nested, policy_id, out);
            }
        }
        _ => {}
    }
}

/// Builds a `Rule` from one candidate object, filtering out document-level
/// metadata identifiers that slipped into a rule list.
fn rule_from_value(value: &serde_json::Value, policy_id: &str) -> Option<Rule> {
    let obj = value.as_object()?;
    let rule_id = obj
        .get("id")
        .or_else(|| obj.get("rule_id"))
        .and_then(|v| v.as_str())?
        .to_owned();

    if METADATA_ID_PREFIXES.iter().any(|p| rule_id.starts_with(p)) {
        return None;
    }

    let statement = obj
        .get("statement")
        .or_else(|| obj.get("description"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_owned();
    let severity_raw = obj.get("severity").and_then(|v| v.as_str());
    let enforcement_raw = obj.get("enforcement").and_then(|v| v.as_str());
    let severity = severity_raw.map(Severity::normalize).unwrap_or(Severity::Info);
    let enforcement = enforcement_raw
        .map(Enforcement::normalize)
        .unwrap_or(Enforcement::Advisory);

    let engine = obj
        .get("check")
        .and_then(|c| c.as_object())
        .and_then(|c| c.get("engine"))
        .or_else(|| obj.get("engine"))
        .and_then(|v| v.as_str())
        .map(|engine| EngineBinding {
            engine: engine.to_owned(),
        });

    let category = obj
        .get("category")
        .and_then(|v| v.as_str())
        .map(str::to_owned);

    Some(Rule {
        rule_id,
        statement,
        severity,
        enforcement,
        engine,
        category,
        policy_id: policy_id.to_owned(),
    })
}
