//! Repairs of the `社交` domain: the NPC table, the event log and the
//! memory tiers.

use serde_json::{json, Map, Value};

use state_rules::{keys, DEFAULT_BASELINE_AXIS, FAVOR_MAX, FAVOR_MIN};

use super::character::{repair_axes, repair_inventory, repair_location, repair_rank, BASELINE_AXIS};
use super::defaults;
use super::{ensure_array, ensure_object, repair_string};
use crate::config::IntegrityConfig;
use crate::error::{Diagnostic, Diagnostics, IntegrityError};
use crate::numeric::{repair_number, NumberSpec};
use crate::tree::{fill_missing, join, type_name};

const FAVOR: NumberSpec = NumberSpec::new(FAVOR_MIN, FAVOR_MAX, 0.0);

pub(crate) fn repair_social(
    social: &mut Map<String, Value>,
    config: &IntegrityConfig,
    diagnostics: &mut Diagnostics,
) {
    let path = keys::SOCIAL;

    let relations = ensure_object(social, "关系", || json!({}), path, diagnostics);
    repair_relationships(relations, config, &join(path, "关系"), diagnostics);

    let events = ensure_object(social, "事件", defaults::event_log, path, diagnostics);
    repair_events(events, &join(path, "事件"), diagnostics);

    let memory_path = join(path, "记忆");
    let memory = ensure_object(social, "记忆", defaults::memory, path, diagnostics);
    for tier in defaults::MEMORY_TIERS {
        ensure_array(memory, tier, &memory_path, diagnostics);
    }
}

/// Re-key every NPC by its trimmed name and repair it. Reserved keys
/// (leading `_`), non-objects and nameless entries are dropped.
fn repair_relationships(
    relations: &mut Map<String, Value>,
    config: &IntegrityConfig,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    for (key, value) in std::mem::take(relations) {
        let entry_path = join(path, &key);
        if key.starts_with('_') {
            diagnostics.push(Diagnostic::info(IntegrityError::structural(
                entry_path,
                "reserved key, dropped",
            )));
            continue;
        }
        let mut npc = match value {
            Value::Object(map) => map,
            other => {
                diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                    entry_path,
                    format!("expected object, found {}, dropped", type_name(&other)),
                )));
                continue;
            }
        };

        let name = npc
            .get("名字")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| key.trim())
            .to_string();
        if name.is_empty() {
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                entry_path,
                "NPC without a name, dropped",
            )));
            continue;
        }
        if npc.get("名字").and_then(Value::as_str) != Some(name.as_str()) {
            npc.insert("名字".to_string(), json!(name));
        }
        if name != key {
            diagnostics.push(Diagnostic::info(IntegrityError::structural(
                entry_path,
                format!("re-keyed as {:?}", name),
            )));
        }

        repair_npc(&mut npc, config, &join(path, &name), diagnostics);
        if relations.insert(name.clone(), Value::Object(npc)).is_some() {
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                join(path, &name),
                "duplicate NPC name, later entry kept",
            )));
        }
    }
}

fn repair_npc(
    npc: &mut Map<String, Value>,
    config: &IntegrityConfig,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    repair_string(npc, "性别", || config.defaults.gender.clone(), false, path, diagnostics);

    let rank = ensure_object(npc, "阶位", defaults::rank, path, diagnostics);
    repair_rank(rank, &join(path, "阶位"), diagnostics);

    let baseline = ensure_object(
        npc,
        "初始六维",
        || defaults::axes(DEFAULT_BASELINE_AXIS),
        path,
        diagnostics,
    );
    repair_axes(baseline, BASELINE_AXIS, &join(path, "初始六维"), diagnostics);

    repair_number(npc, "好感度", FAVOR, path, diagnostics);

    if let Some(Value::String(description)) = npc.get("当前位置") {
        let location = json!({ "描述": description });
        npc.insert("当前位置".to_string(), location);
    }
    let location = ensure_object(
        npc,
        "当前位置",
        || json!({ "描述": config.defaults.location }),
        path,
        diagnostics,
    );
    repair_location(location, config, false, &join(path, "当前位置"), diagnostics);

    let memories = ensure_array(npc, "记忆", path, diagnostics);
    if memories.is_empty() {
        memories.push(json!(config.defaults.npc_memory));
        diagnostics.push(Diagnostic::info(IntegrityError::structural(
            join(path, "记忆"),
            "empty, default memory inserted",
        )));
    }

    match npc.get("背包") {
        None | Some(Value::Null) => {}
        Some(_) => {
            let inventory = ensure_object(npc, "背包", defaults::inventory, path, diagnostics);
            repair_inventory(inventory, &join(path, "背包"), diagnostics);
        }
    }
}

/// Event configuration defaults, the record list, and the next-event time
/// as an object or null.
fn repair_events(events: &mut Map<String, Value>, path: &str, diagnostics: &mut Diagnostics) {
    let config = ensure_object(
        events,
        "配置",
        || Value::Object(defaults::event_config()),
        path,
        diagnostics,
    );
    fill_missing(config, defaults::event_config());

    ensure_array(events, "事件记录", path, diagnostics);

    let next = "下次事件时间";
    match events.get(next) {
        None | Some(Value::Null) | Some(Value::Object(_)) => {}
        Some(other) => {
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                join(path, next),
                format!("expected object or null, found {}", type_name(other)),
            )));
            events.insert(next.to_string(), Value::Null);
        }
    }
}
