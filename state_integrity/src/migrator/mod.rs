//! The Migrator: a pure transform from legacy or partial documents to the
//! canonical five-domain shape.
//!
//! Annotation keys are stripped first. Canonical documents are then
//! returned unchanged. V4 documents have their split character folded back
//! onto the canonical keys. Anything else is rebuilt on the default skeleton:
//! every chain in [`aliases::CHAINS`] claims its first matching candidate,
//! and whatever no chain claimed is kept, either merged back into its
//! domain or under `系统.扩展`.

pub mod aliases;
mod v4;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use state_rules::keys;

use crate::config::IntegrityConfig;
use crate::error::{Diagnostic, Diagnostics, IntegrityError};
use crate::numeric::repair_number;
use crate::repair::{self, defaults, PLAY_SECONDS};
use crate::schema::{detect, SchemaGeneration, LEGACY_ROOT_KEYS};
use crate::tree::{get_path, get_path_mut, join, object_mut, set_path, strip_keys, take_path};

use aliases::{Chain, Placement, Source, CHAINS};

/// Paths whose old values are superseded by the migration itself.
const SUPERSEDED: [&str; 4] = ["元数据.版本号", "元数据.更新时间", "版本号", "更新时间"];

/// Where preserved data goes when it has no canonical home.
const EXTENSION: &str = "系统.扩展";

/// One claimed candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
    pub from: String,
    pub to: String,
}

/// What a migration found and did.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub generation: SchemaGeneration,
    /// False when the input was already canonical.
    pub migrated: bool,
    pub annotations_stripped: usize,
    pub legacy_keys_found: Vec<String>,
    /// Deprecated root keys fully consumed by the chains.
    pub legacy_keys_removed: Vec<String>,
    pub claims: Vec<Claim>,
    /// `(source path, destination path)` of every unclaimed value kept.
    pub preserved: Vec<(String, String)>,
    pub diagnostics: Diagnostics,
}

impl MigrationReport {
    fn new(generation: SchemaGeneration, annotations_stripped: usize) -> Self {
        Self {
            generation,
            migrated: false,
            annotations_stripped,
            legacy_keys_found: Vec::new(),
            legacy_keys_removed: Vec::new(),
            claims: Vec::new(),
            preserved: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }
}

/// A migrated document and its report.
#[derive(Debug, Clone)]
pub struct Migration {
    pub document: Value,
    pub report: MigrationReport,
}

#[derive(Debug, Clone, Default)]
pub struct Migrator {
    config: IntegrityConfig,
}

impl Migrator {
    pub fn new(config: IntegrityConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Migrate a copy of `document`. Never fails and never touches
    /// `document`. Migrating an already migrated document returns it as is.
    pub fn migrate(&self, document: &Value, now: DateTime<Utc>) -> Migration {
        let mut source = document.clone();
        let stripped = strip_keys(&mut source, &|key: &str| self.config.is_annotation_key(key));

        let detection = detect(&source);
        let mut report = MigrationReport::new(detection.generation, stripped);

        if detection.is_canonical {
            debug!(annotations_stripped = stripped, "document already canonical");
            return Migration {
                document: source,
                report,
            };
        }

        report.migrated = true;
        report.legacy_keys_found = detection.legacy_markers;

        if !source.is_object() {
            report.diagnostics.push(Diagnostic::warning(IntegrityError::unknown_version(
                "",
                "root is not an object, default document built",
            )));
            let document = self.skeleton(now);
            info!(generation = ?report.generation, "migration produced default document");
            return Migration { document, report };
        }

        if detection.generation == SchemaGeneration::Unrecognized {
            report.diagnostics.push(Diagnostic::warning(IntegrityError::unknown_version(
                "",
                "no known schema markers, contents preserved under 系统.扩展",
            )));
        }

        if detection.generation == SchemaGeneration::ProfileV4 {
            v4::convert(&mut source, &mut report);
        }

        let legacy_present: Vec<&str> = LEGACY_ROOT_KEYS
            .into_iter()
            .filter(|key| get_path(&source, key).is_some())
            .collect();

        let mut output = self.skeleton(now);
        for chain in CHAINS {
            claim(chain, &mut source, &mut output, &mut report);
        }
        for path in SUPERSEDED {
            if take_path(&mut source, path).is_some() {
                debug!(path, "superseded value dropped");
            }
        }

        report.legacy_keys_removed = legacy_present
            .into_iter()
            .filter(|key| get_path(&source, key).map_or(true, is_empty))
            .map(str::to_string)
            .collect();

        preserve_leftovers(source, &mut output, &mut report);
        self.finish_metadata(&mut output, now, &mut report.diagnostics);

        info!(
            generation = ?report.generation,
            claims = report.claims.len(),
            preserved = report.preserved.len(),
            legacy_removed = report.legacy_keys_removed.len(),
            "document migrated"
        );
        Migration {
            document: output,
            report,
        }
    }

    fn skeleton(&self, now: DateTime<Utc>) -> Value {
        let mut skeleton = defaults::minimal_document(&self.config, now);
        set_path(
            &mut skeleton,
            "元数据.存档名",
            json!(self.config.defaults.migrated_save_name),
        );
        skeleton
    }

    /// Coerce the metadata fields the chains may have filled from legacy
    /// text or numbers.
    fn finish_metadata(&self, output: &mut Value, now: DateTime<Utc>, diagnostics: &mut Diagnostics) {
        let Some(metadata) = get_path_mut(output, keys::METADATA) else {
            return;
        };
        let metadata = object_mut(metadata);
        let path = keys::METADATA;

        metadata.insert("版本号".to_string(), json!(state_rules::SCHEMA_VERSION));
        metadata.insert("更新时间".to_string(), json!(defaults::timestamp(now)));
        repair::repair_string(metadata, "存档ID", defaults::new_save_id, false, path, diagnostics);
        repair::repair_string(
            metadata,
            "存档名",
            || self.config.defaults.migrated_save_name.clone(),
            false,
            path,
            diagnostics,
        );
        repair::repair_string(
            metadata,
            "创建时间",
            || defaults::timestamp(now),
            false,
            path,
            diagnostics,
        );
        repair::repair_optional_string(metadata, "游戏版本", path, diagnostics);
        repair_number(metadata, "游戏时长秒", PLAY_SECONDS, path, diagnostics);

        let clock = repair::ensure_object(metadata, "时间", defaults::clock, path, diagnostics);
        repair::repair_clock(clock, &join(path, "时间"), diagnostics);
    }
}

/// Claim the first acceptable candidate of `chain` from `source` into
/// `output`.
fn claim(chain: &Chain, source: &mut Value, output: &mut Value, report: &mut MigrationReport) {
    for candidate in chain.sources {
        let Some(found) = get_path(source, candidate.path()) else {
            continue;
        };
        let acceptable = match candidate {
            Source::Path(_) => chain.expect.accepts(found),
            Source::Unshaped { domain_keys, .. } => found
                .as_object()
                .is_some_and(|map| !domain_keys.iter().any(|key| map.contains_key(*key))),
            Source::Wrap { .. } => !found.is_null(),
        };
        if !acceptable {
            continue;
        }

        let Some(value) = take_path(source, candidate.path()) else {
            continue;
        };
        let value = match candidate {
            Source::Wrap { key, .. } => {
                let mut wrapped = Map::new();
                wrapped.insert(key.to_string(), value);
                Value::Object(wrapped)
            }
            _ => value,
        };
        place(output, chain, value);

        debug!(from = candidate.path(), to = chain.target, "claimed");
        report.claims.push(Claim {
            from: candidate.path().to_string(),
            to: chain.target.to_string(),
        });
        return;
    }
}

fn place(output: &mut Value, chain: &Chain, value: Value) {
    match (chain.placement, value) {
        (Placement::Overlay, Value::Object(incoming)) => match get_path_mut(output, chain.target) {
            Some(Value::Object(existing)) => {
                for (key, value) in incoming {
                    existing.insert(key, value);
                }
            }
            _ => set_path(output, chain.target, Value::Object(incoming)),
        },
        (_, value) => set_path(output, chain.target, value),
    }
}

/// Keep everything no chain claimed. Domain objects are merged back into
/// their domain; other root keys go to `系统.扩展`.
fn preserve_leftovers(source: Value, output: &mut Value, report: &mut MigrationReport) {
    let Value::Object(root) = source else {
        return;
    };

    let mut conflicts = Vec::new();
    for (key, value) in root {
        if is_empty(&value) {
            continue;
        }
        match (keys::DOMAINS.contains(&key.as_str()), value) {
            (true, Value::Object(leftover)) => {
                if let Some(domain) = get_path_mut(output, &key) {
                    let domain = object_mut(domain);
                    merge_missing(domain, leftover, &key, &mut report.preserved, &mut conflicts);
                }
            }
            (_, value) => conflicts.push((key, value)),
        }
    }

    if conflicts.is_empty() {
        return;
    }
    let extension = match get_path_mut(output, EXTENSION) {
        Some(extension) => object_mut(extension),
        None => {
            set_path(output, EXTENSION, json!({}));
            match get_path_mut(output, EXTENSION) {
                Some(extension) => object_mut(extension),
                None => return,
            }
        }
    };
    for (from, value) in conflicts {
        let mut slot = from.clone();
        while extension.contains_key(&slot) {
            slot.push_str("@legacy");
        }
        report.preserved.push((from, join(EXTENSION, &slot)));
        extension.insert(slot, value);
    }
}

/// Merge `incoming` into `target` without overwriting. Values that would
/// overwrite something different are collected as conflicts.
fn merge_missing(
    target: &mut Map<String, Value>,
    incoming: Map<String, Value>,
    path: &str,
    preserved: &mut Vec<(String, String)>,
    conflicts: &mut Vec<(String, Value)>,
) {
    for (key, value) in incoming {
        let child = join(path, &key);
        match (target.get_mut(&key), value) {
            (None, value) => {
                if !is_empty(&value) {
                    preserved.push((child.clone(), child));
                    target.insert(key, value);
                }
            }
            (Some(Value::Object(existing)), Value::Object(value)) => {
                merge_missing(existing, value, &child, preserved, conflicts);
            }
            (Some(existing), value) => {
                if *existing != value && !is_empty(&value) {
                    conflicts.push((child, value));
                }
            }
        }
    }
}

/// Null, or an empty object, array or string.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
