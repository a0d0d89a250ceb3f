//! The V4 layout splits the character into `档案` (profile), `能力`
//! (abilities) and `资源` (resources). This pass folds them back onto
//! `身份` and `属性` so the alias chains see canonical keys.
//!
//! Fields whose canonical slot is already taken stay in their container.
//! A container that is not fully folded is moved to the root, where it is
//! preserved under `系统.扩展` like any other unclaimed key.

use serde_json::{json, Map, Value};
use tracing::debug;

use state_rules::keys;

use super::{Claim, MigrationReport};
use crate::tree::join;

/// A field renamed on its way into the canonical container. `inner`
/// renames the keys of an object value.
#[derive(Debug, Clone, Copy)]
struct Rename {
    from: &'static str,
    to: &'static str,
    inner: &'static [(&'static str, &'static str)],
}

const fn rename(from: &'static str, to: &'static str) -> Rename {
    Rename { from, to, inner: &[] }
}

const fn nested(
    from: &'static str,
    to: &'static str,
    inner: &'static [(&'static str, &'static str)],
) -> Rename {
    Rename { from, to, inner }
}

/// V4 axis names and their canonical keys.
pub const AXES: &[(&str, &str)] = &[
    ("体格", "体质"),
    ("反应", "能源"),
    ("智识", "算法"),
    ("意志", "心智"),
    ("幸运", "资源感知"),
    ("魅力", "魅力"),
];

const RANK: &[(&str, &str)] = &[
    ("称号", "名称"),
    ("阶段", "阶段"),
    ("进度", "当前进度"),
    ("晋升需求", "下一级所需"),
    ("晋升说明", "升级描述"),
];

const PROFILE: &[Rename] = &[
    rename("姓名", "名字"),
    rename("所属世界", "世界"),
    rename("族群", "种族"),
    rename("背景", "出生"),
    rename("天赋", "模块"),
    nested("基础素质", "初始六维", AXES),
    nested("改造素质", "成长六维", AXES),
];

const ABILITIES: &[Rename] = &[nested("等级", "阶位", RANK), rename("热度", "声望")];

const RESOURCES: &[Rename] = &[rename("生理耐久", "寿命")];

/// `(V4 container, canonical target, renames)`. Unlisted fields keep
/// their names.
const CONTAINERS: [(&str, &str, &[Rename]); 3] = [
    ("档案", "身份", PROFILE),
    ("能力", "属性", ABILITIES),
    ("资源", "属性", RESOURCES),
];

const CHARACTER_RENAMES: [(&str, &str); 3] =
    [("状态效果", "效果"), ("技能树", "程序"), ("专精树", "流派")];

const WORLD_INFO_RENAMES: [(&str, &str); 3] = [
    ("区域信息", "大陆信息"),
    ("公司势力", "势力信息"),
    ("节点信息", "地点信息"),
];

/// Rewrite a V4 document in place into the canonical character layout.
pub(super) fn convert(source: &mut Value, report: &mut MigrationReport) {
    let Value::Object(root) = source else {
        return;
    };

    let mut stranded = Vec::new();
    if let Some(Value::Object(character)) = root.get_mut(keys::CHARACTER) {
        for (container, target, renames) in CONTAINERS {
            if !character.get(container).is_some_and(Value::is_object) {
                continue;
            }
            let Some(Value::Object(fields)) = character.remove(container) else {
                continue;
            };
            let leftover = fold(fields, character, container, target, renames, report);
            if !leftover.is_empty() {
                stranded.push((container, leftover));
            }
        }

        rename_in_place(character, &CHARACTER_RENAMES, keys::CHARACTER, report);
        fold_credits(character, report);
    }

    if let Some(Value::Object(world)) = root.get_mut(keys::WORLD) {
        if let Some(Value::Object(info)) = world.get_mut("信息") {
            let path = join(keys::WORLD, "信息");
            rename_in_place(info, &WORLD_INFO_RENAMES, &path, report);
        }
    }

    if let Some(Value::Object(metadata)) = root.get_mut(keys::METADATA) {
        if metadata.get("版本").and_then(Value::as_str) == Some("v4") {
            metadata.remove("版本");
        }
    }

    for (container, leftover) in stranded {
        let mut slot = container.to_string();
        while root.contains_key(&slot) {
            slot.push_str("@v4");
        }
        debug!(container, slot = %slot, fields = leftover.len(), "v4 fields left unfolded");
        root.insert(slot, Value::Object(leftover));
    }
}

/// Move every field of `fields` into `character[target]`, renaming as
/// listed. Returns what could not be moved.
fn fold(
    mut fields: Map<String, Value>,
    character: &mut Map<String, Value>,
    container: &str,
    target: &str,
    renames: &[Rename],
    report: &mut MigrationReport,
) -> Map<String, Value> {
    if character.get(target).map_or(true, Value::is_null) {
        character.insert(target.to_string(), Value::Object(Map::new()));
    }
    let Some(Value::Object(destination)) = character.get_mut(target) else {
        return fields;
    };

    let from_path = join(keys::CHARACTER, container);
    let to_path = join(keys::CHARACTER, target);

    for rename in renames {
        let Some(value) = fields.remove(rename.from) else {
            continue;
        };
        if is_occupied(destination, rename.to) {
            fields.insert(rename.from.to_string(), value);
            continue;
        }
        let value = match value {
            Value::Object(map) if !rename.inner.is_empty() => {
                Value::Object(rename_keys(map, rename.inner))
            }
            other => other,
        };
        record(report, join(&from_path, rename.from), join(&to_path, rename.to));
        destination.insert(rename.to.to_string(), value);
    }

    for (key, value) in std::mem::take(&mut fields) {
        if is_occupied(destination, &key) {
            fields.insert(key, value);
            continue;
        }
        record(report, join(&from_path, &key), join(&to_path, &key));
        destination.insert(key, value);
    }
    fields
}

/// Rename keys of `map`. A renamed key whose new name is already used keeps
/// its old name.
fn rename_keys(map: Map<String, Value>, pairs: &[(&str, &str)]) -> Map<String, Value> {
    let mut renamed = Map::new();
    let mut pending = Vec::new();
    for (key, value) in map {
        match pairs.iter().find(|(from, _)| *from == key) {
            Some((_, to)) => pending.push((key, *to, value)),
            None => {
                renamed.insert(key, value);
            }
        }
    }
    for (from, to, value) in pending {
        if renamed.contains_key(to) {
            renamed.insert(from, value);
        } else {
            renamed.insert(to.to_string(), value);
        }
    }
    renamed
}

fn rename_in_place(
    map: &mut Map<String, Value>,
    pairs: &[(&str, &str)],
    path: &str,
    report: &mut MigrationReport,
) {
    for (from, to) in pairs {
        if !map.contains_key(*from) || is_occupied(map, to) {
            continue;
        }
        if let Some(value) = map.remove(*from) {
            record(report, join(path, from), join(path, to));
            map.insert(to.to_string(), value);
        }
    }
}

/// V4 keeps a single credit number; it becomes the lowest denomination.
fn fold_credits(character: &mut Map<String, Value>, report: &mut MigrationReport) {
    let Some(Value::Object(inventory)) = character.get_mut("背包") else {
        return;
    };
    let Some(amount) = inventory.get("信用点").filter(|v| v.is_number()).cloned() else {
        return;
    };
    inventory.insert("信用点".to_string(), json!({ "低额": amount }));
    record(report, "角色.背包.信用点".to_string(), "角色.背包.信用点.低额".to_string());
}

fn is_occupied(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(|value| !value.is_null())
}

fn record(report: &mut MigrationReport, from: String, to: String) {
    debug!(from = %from, to = %to, "v4 field folded");
    report.claims.push(Claim { from, to });
}
