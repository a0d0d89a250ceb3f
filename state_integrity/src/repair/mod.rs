//! The Repairer: a total, best-effort pass that brings a document into the
//! canonical shape. Numbers are coerced and clamped, missing required
//! subtrees are filled with defaults, invalid collection entries are
//! dropped and dangling references are cleared.

mod character;
pub mod defaults;
pub mod references;
mod social;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::info;

use state_rules::{keys, SCHEMA_VERSION};

use crate::config::IntegrityConfig;
use crate::error::{Diagnostic, Diagnostics, IntegrityError};
use crate::numeric::{repair_number, NumberSpec};
use crate::tree::{array_mut, join, object_mut, type_name};

pub use references::{reference_id, resolve_or_null, ItemIndex};

/// In-world clock fields with their ranges.
pub const CLOCK_FIELDS: [(&str, NumberSpec); 5] = [
    ("年", NumberSpec::new(1.0, 999_999.0, 1000.0).integral()),
    ("月", NumberSpec::new(1.0, 12.0, 1.0).integral()),
    ("日", NumberSpec::new(1.0, 30.0, 1.0).integral()),
    ("小时", NumberSpec::new(0.0, 23.0, 8.0).integral()),
    ("分钟", NumberSpec::new(0.0, 59.0, 0.0).integral()),
];

pub const PLAY_SECONDS: NumberSpec = NumberSpec::new(0.0, 999_999_999.0, 0.0);

/// A repaired document and the corrections made to it.
#[derive(Debug, Clone)]
pub struct Repair {
    pub document: Value,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct Repairer {
    config: IntegrityConfig,
}

impl Repairer {
    pub fn new(config: IntegrityConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Repair a copy of `document`. Never fails; `document` is untouched.
    pub fn repair(&self, document: &Value, now: DateTime<Utc>) -> Repair {
        let mut document = document.clone();
        let mut diagnostics = Diagnostics::default();
        self.repair_in_place(&mut document, now, &mut diagnostics);
        info!(corrections = diagnostics.len(), "repair pass complete");
        Repair {
            document,
            diagnostics,
        }
    }

    fn repair_in_place(&self, document: &mut Value, now: DateTime<Utc>, diagnostics: &mut Diagnostics) {
        if !document.is_object() {
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                "",
                format!("root is {}, replaced with a new document", type_name(document)),
            )));
            *document = defaults::minimal_document(&self.config, now);
            return;
        }

        let root = object_mut(document);
        for domain in keys::DOMAINS {
            ensure_object(root, domain, || defaults::domain(domain, &self.config, now), "", diagnostics);
        }

        if let Some(Value::Object(metadata)) = root.get_mut(keys::METADATA) {
            self.repair_metadata(metadata, now, diagnostics);
        }
        if let Some(Value::Object(character)) = root.get_mut(keys::CHARACTER) {
            character::repair_character(character, &self.config, diagnostics);
        }
        if let Some(Value::Object(social)) = root.get_mut(keys::SOCIAL) {
            social::repair_social(social, &self.config, diagnostics);
        }
        if let Some(Value::Object(world)) = root.get_mut(keys::WORLD) {
            self.repair_world(world, diagnostics);
        }
        if let Some(Value::Object(system)) = root.get_mut(keys::SYSTEM) {
            repair_system(system, diagnostics);
        }
    }

    fn repair_metadata(
        &self,
        metadata: &mut Map<String, Value>,
        now: DateTime<Utc>,
        diagnostics: &mut Diagnostics,
    ) {
        let path = keys::METADATA;

        if metadata.get("版本号").and_then(Value::as_u64) != Some(SCHEMA_VERSION as u64) {
            diagnostics.push(Diagnostic::info(IntegrityError::unknown_version(
                join(path, "版本号"),
                format!("set to {}", SCHEMA_VERSION),
            )));
            metadata.insert("版本号".to_string(), json!(SCHEMA_VERSION));
        }

        repair_string(metadata, "存档ID", defaults::new_save_id, false, path, diagnostics);
        repair_string(
            metadata,
            "存档名",
            || self.config.defaults.save_name.clone(),
            false,
            path,
            diagnostics,
        );
        repair_optional_string(metadata, "游戏版本", path, diagnostics);
        let stamp = || defaults::timestamp(now);
        repair_string(metadata, "创建时间", stamp, false, path, diagnostics);
        repair_string(metadata, "更新时间", stamp, false, path, diagnostics);
        repair_number(metadata, "游戏时长秒", PLAY_SECONDS, path, diagnostics);

        let clock = ensure_object(metadata, "时间", defaults::clock, path, diagnostics);
        repair_clock(clock, &join(path, "时间"), diagnostics);
    }

    fn repair_world(&self, world: &mut Map<String, Value>, diagnostics: &mut Diagnostics) {
        let path = keys::WORLD;
        let info_path = join(path, "信息");
        let info = ensure_object(
            world,
            "信息",
            || defaults::world_info(&self.config),
            path,
            diagnostics,
        );
        repair_string(
            info,
            "世界名称",
            || self.config.defaults.world_name.clone(),
            false,
            &info_path,
            diagnostics,
        );
        for key in defaults::WORLD_LISTS {
            ensure_array(info, key, &info_path, diagnostics);
        }

        match world.get("状态") {
            None | Some(Value::Object(_)) => {}
            Some(other) => {
                diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                    join(path, "状态"),
                    format!("expected object, found {}, removed", type_name(other)),
                )));
                world.remove("状态");
            }
        }
    }
}

fn repair_system(system: &mut Map<String, Value>, diagnostics: &mut Diagnostics) {
    let path = keys::SYSTEM;

    ensure_object(system, "配置", || json!({}), path, diagnostics);

    let history = ensure_object(system, "历史", || json!({ "叙事": [] }), path, diagnostics);
    ensure_array(history, "叙事", &join(path, "历史"), diagnostics);

    let online = ensure_object(
        system,
        "联机",
        || Value::Object(defaults::online_session()),
        path,
        diagnostics,
    );
    repair_online(online, &join(path, "联机"), diagnostics);
}

/// Overlay the session block on the single-player defaults and fix the
/// type of every known field.
fn repair_online(online: &mut Map<String, Value>, path: &str, diagnostics: &mut Diagnostics) {
    let defaults = defaults::online_session();
    for (key, value) in &defaults {
        if !online.contains_key(key) {
            online.insert(key.clone(), value.clone());
        }
    }

    repair_string(online, "模式", || "单机".to_string(), false, path, diagnostics);
    repair_string(online, "冲突策略", || "服务器".to_string(), false, path, diagnostics);

    for key in ["房间ID", "玩家ID"] {
        let replacement = match online.get(key) {
            Some(Value::Null) | Some(Value::String(_)) | None => continue,
            Some(Value::Number(n)) => json!(n.to_string()),
            Some(Value::Bool(b)) => json!(b.to_string()),
            Some(other) => {
                diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                    join(path, key),
                    format!("expected string or null, found {}", type_name(other)),
                )));
                Value::Null
            }
        };
        online.insert(key.to_string(), replacement);
    }

    let paths_key = "只读路径";
    match online.get_mut(paths_key) {
        Some(Value::Array(paths)) => {
            let before = paths.len();
            paths.retain(Value::is_string);
            if paths.len() != before {
                diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                    join(path, paths_key),
                    format!("{} non-string entries removed", before - paths.len()),
                )));
            }
        }
        _ => {
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                join(path, paths_key),
                "expected array, defaults restored",
            )));
            online.insert(paths_key.to_string(), defaults[paths_key].clone());
        }
    }

    if !online.get("世界曝光").is_some_and(Value::is_boolean) {
        diagnostics.push(Diagnostic::warning(IntegrityError::structural(
            join(path, "世界曝光"),
            "expected boolean, set to false",
        )));
        online.insert("世界曝光".to_string(), json!(false));
    }
}

/// Coerce every clock field. `年数` is accepted for `年`.
pub fn repair_clock(clock: &mut Map<String, Value>, path: &str, diagnostics: &mut Diagnostics) {
    if !clock.contains_key("年") {
        if let Some(years) = clock.remove("年数") {
            clock.insert("年".to_string(), years);
        }
    }
    for (key, spec) in CLOCK_FIELDS {
        repair_number(clock, key, spec, path, diagnostics);
    }
}

/// Make `map[key]` an object, inserting `default()` when it is missing or
/// of another type.
pub(crate) fn ensure_object<'m>(
    map: &'m mut Map<String, Value>,
    key: &str,
    default: impl FnOnce() -> Value,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> &'m mut Map<String, Value> {
    let slot = map.entry(key.to_string()).or_insert(Value::Null);
    if !slot.is_object() {
        let message = match &*slot {
            Value::Null => "missing, default inserted".to_string(),
            other => format!("expected object, found {}, default inserted", type_name(other)),
        };
        diagnostics.push(Diagnostic::warning(IntegrityError::structural(join(path, key), message)));
        *slot = default();
    }
    object_mut(slot)
}

/// Make `map[key]` an array, replacing anything else with an empty one.
pub(crate) fn ensure_array<'m>(
    map: &'m mut Map<String, Value>,
    key: &str,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> &'m mut Vec<Value> {
    let slot = map.entry(key.to_string()).or_insert(Value::Null);
    if !slot.is_array() {
        diagnostics.push(Diagnostic::warning(IntegrityError::structural(
            join(path, key),
            format!("expected array, found {}", type_name(slot)),
        )));
    }
    array_mut(slot)
}

/// Make `map[key]` a string. Numbers and booleans are written as text;
/// anything else, and empty text unless `allow_empty`, takes `default()`.
pub(crate) fn repair_string(
    map: &mut Map<String, Value>,
    key: &str,
    default: impl FnOnce() -> String,
    allow_empty: bool,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> String {
    let replacement = match map.get(key) {
        Some(Value::String(s)) if allow_empty || !s.trim().is_empty() => return s.clone(),
        Some(Value::Number(n)) => {
            diagnostics.push(Diagnostic::info(IntegrityError::structural(
                join(path, key),
                "number written as text",
            )));
            n.to_string()
        }
        Some(Value::Bool(b)) => {
            diagnostics.push(Diagnostic::info(IntegrityError::structural(
                join(path, key),
                "boolean written as text",
            )));
            b.to_string()
        }
        other => {
            let found = other.map_or("nothing", type_name);
            let value = default();
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                join(path, key),
                format!("expected text, found {}, defaulted to {:?}", found, value),
            )));
            value
        }
    };
    map.insert(key.to_string(), Value::String(replacement.clone()));
    replacement
}

/// Like [`repair_string`] for optional text: absent and null stay as they
/// are, values that cannot be text are removed.
pub(crate) fn repair_optional_string(
    map: &mut Map<String, Value>,
    key: &str,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    match map.get(key) {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(Value::Number(_)) | Some(Value::Bool(_)) => {
            repair_string(map, key, String::new, true, path, diagnostics);
        }
        Some(other) => {
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                join(path, key),
                format!("expected text, found {}, removed", type_name(other)),
            )));
            map.remove(key);
        }
    }
}
