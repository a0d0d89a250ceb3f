//! The Validator: a read-only structural check.
//!
//! Validation never changes the document. It reports whether the document
//! has the canonical shape, and the lifecycle uses that answer after a
//! repair pass to keep the result or fall back to a fresh document.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use state_rules::{keys, CanonicalDocument};

use crate::error::IntegrityError;
use crate::tree::{join, type_name};

/// Sub-objects every domain must carry.
pub const REQUIRED_OBJECTS: [(&str, &[&str]); 5] = [
    (keys::METADATA, &["时间"]),
    (keys::CHARACTER, &["身份", "属性"]),
    (keys::SOCIAL, &["关系", "事件", "记忆"]),
    (keys::WORLD, &["信息"]),
    (keys::SYSTEM, &["历史", "联机"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<IntegrityError>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<IntegrityError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check `document` against the canonical shape.
///
/// Structural checks run first. Only a structurally sound document is also
/// read through the typed view, so type mismatches below the required
/// objects are reported once, as a single error.
pub fn validate(document: &Value) -> ValidationReport {
    let Some(root) = document.as_object() else {
        return ValidationReport::from_errors(vec![IntegrityError::structural(
            "",
            format!("expected object, found {}", type_name(document)),
        )]);
    };

    let mut errors = Vec::new();
    for (domain, required) in REQUIRED_OBJECTS {
        let map = match root.get(domain) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                errors.push(IntegrityError::structural(
                    domain,
                    format!("expected object, found {}", type_name(other)),
                ));
                continue;
            }
            None => {
                errors.push(IntegrityError::structural(domain, "missing domain"));
                continue;
            }
        };
        for key in required {
            match map.get(*key) {
                Some(Value::Object(_)) => {}
                Some(other) => errors.push(IntegrityError::structural(
                    join(domain, key),
                    format!("expected object, found {}", type_name(other)),
                )),
                None => errors.push(IntegrityError::structural(join(domain, key), "missing")),
            }
        }
    }

    if errors.is_empty() {
        if let Err(err) = CanonicalDocument::from_value(document) {
            errors.push(IntegrityError::structural("", err.to_string()));
        }
    }

    debug!(errors = errors.len(), "validation complete");
    ValidationReport::from_errors(errors)
}
