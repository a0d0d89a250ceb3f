//! Repairs of the `角色` domain, plus the rank, axis, location and
//! inventory passes NPC records share with it.

use serde_json::{json, Map, Value};

use state_rules::{
    keys, rank_description, Axis, EffectKind, ItemCategory, QualityTier, BASELINE_BOUNDS,
    DEFAULT_BASELINE_AXIS, DEFAULT_EFFECT_INTENSITY, DEFAULT_GRADE, EQUIPMENT_SLOT_KEYS,
    GRADE_MAX, GRADE_MIN, GROWTH_BOUNDS, MORTAL_RANK, QUANTITY_MAX, QUANTITY_MIN,
};

use super::defaults::{self, DEFAULT_COORDINATE};
use super::references::{resolve_or_null, ItemIndex};
use super::{ensure_array, ensure_object, repair_optional_string, repair_string};
use crate::config::IntegrityConfig;
use crate::error::{Diagnostic, Diagnostics, IntegrityError};
use crate::numeric::{number_value, repair_number, repair_optional_number, NumberSpec};
use crate::tree::{join, type_name};

pub const BASELINE_AXIS: NumberSpec =
    NumberSpec::new(0.0, BASELINE_BOUNDS.per_axis, DEFAULT_BASELINE_AXIS);
pub const GROWTH_AXIS: NumberSpec = NumberSpec::new(0.0, GROWTH_BOUNDS.per_axis, 0.0);

const PROGRESS: NumberSpec = NumberSpec::new(0.0, 999_999_999.0, 0.0);
const REQUIRED: NumberSpec = NumberSpec::new(1.0, 999_999_999.0, 100.0);
const REPUTATION: NumberSpec = NumberSpec::new(0.0, 999_999.0, 0.0);
const VITAL_LIMIT: f64 = 999_999_999.0;
const CREDITS: NumberSpec = NumberSpec::new(0.0, 999_999_999.0, 0.0);
const CREDIT_KEYS: [&str; 4] = ["低额", "中额", "高额", "最高额"];
const QUANTITY: NumberSpec =
    NumberSpec::new(QUANTITY_MIN as f64, QUANTITY_MAX as f64, 1.0).integral();
const GRADE: NumberSpec =
    NumberSpec::new(GRADE_MIN as f64, GRADE_MAX as f64, DEFAULT_GRADE as f64).integral();
const PROFICIENCY: NumberSpec = NumberSpec::new(0.0, 100.0, 0.0);
const DENSITY: NumberSpec = NumberSpec::new(1.0, 100.0, 50.0);
const INTENSITY: NumberSpec = NumberSpec::new(0.0, 100.0, DEFAULT_EFFECT_INTENSITY);
const COORDINATE: NumberSpec =
    NumberSpec::new(-999_999_999.0, 999_999_999.0, DEFAULT_COORDINATE);

pub(crate) fn repair_character(
    character: &mut Map<String, Value>,
    config: &IntegrityConfig,
    diagnostics: &mut Diagnostics,
) {
    let path = keys::CHARACTER;

    let identity = ensure_object(character, "身份", || defaults::identity(config), path, diagnostics);
    repair_identity(identity, config, &join(path, "身份"), diagnostics);

    let attributes = ensure_object(character, "属性", defaults::attributes, path, diagnostics);
    repair_attributes(attributes, &join(path, "属性"), diagnostics);

    let location = ensure_object(character, "位置", || defaults::location(config), path, diagnostics);
    repair_location(location, config, true, &join(path, "位置"), diagnostics);

    let effects = ensure_array(character, "效果", path, diagnostics);
    repair_effects(effects, &join(path, "效果"), diagnostics);

    let inventory = ensure_object(character, "背包", defaults::inventory, path, diagnostics);
    repair_inventory(inventory, &join(path, "背包"), diagnostics);

    let index = character
        .get("背包")
        .and_then(|inventory| inventory.get("物品"))
        .and_then(Value::as_object)
        .map(ItemIndex::from_items)
        .unwrap_or_default();

    let equipment = ensure_object(character, "装备", || defaults::equipment(config), path, diagnostics);
    repair_equipment(equipment, &index, config, &join(path, "装备"), diagnostics);

    let loadout = ensure_object(character, "程序", defaults::program_loadout, path, diagnostics);
    repair_loadout(loadout, &index, &join(path, "程序"), diagnostics);

    let training = ensure_object(character, "训练", defaults::training, path, diagnostics);
    repair_training(training, &index, &join(path, "训练"), diagnostics);
}

fn repair_identity(
    identity: &mut Map<String, Value>,
    config: &IntegrityConfig,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    let names = &config.defaults;
    repair_string(identity, "名字", || names.character_name.clone(), false, path, diagnostics);
    repair_string(identity, "性别", || names.gender.clone(), false, path, diagnostics);

    let baseline = ensure_object(
        identity,
        "初始六维",
        || defaults::axes(DEFAULT_BASELINE_AXIS),
        path,
        diagnostics,
    );
    repair_axes(baseline, BASELINE_AXIS, &join(path, "初始六维"), diagnostics);

    let growth = ensure_object(identity, "成长六维", || defaults::axes(0.0), path, diagnostics);
    repair_axes(growth, GROWTH_AXIS, &join(path, "成长六维"), diagnostics);

    ensure_array(identity, "模块", path, diagnostics);
}

/// Clamp every axis into `spec`. Alias keys (`STR`, `敏捷`, …) are renamed
/// to the canonical key when that key is absent.
pub(crate) fn repair_axes(
    axes: &mut Map<String, Value>,
    spec: NumberSpec,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    let aliases: Vec<(String, Axis)> = axes
        .keys()
        .filter(|key| Axis::ALL.iter().all(|axis| axis.key() != key.as_str()))
        .filter_map(|key| Axis::from_key(key).map(|axis| (key.clone(), axis)))
        .collect();
    for (alias, axis) in aliases {
        if axes.contains_key(axis.key()) {
            continue;
        }
        if let Some(value) = axes.remove(&alias) {
            diagnostics.push(Diagnostic::info(IntegrityError::structural(
                join(path, &alias),
                format!("renamed to {}", axis.key()),
            )));
            axes.insert(axis.key().to_string(), value);
        }
    }

    for axis in Axis::ALL {
        repair_number(axes, axis.key(), spec, path, diagnostics);
    }
}

fn repair_attributes(attributes: &mut Map<String, Value>, path: &str, diagnostics: &mut Diagnostics) {
    let rank = ensure_object(attributes, "阶位", defaults::rank, path, diagnostics);
    repair_rank(rank, &join(path, "阶位"), diagnostics);

    repair_number(attributes, "声望", REPUTATION, path, diagnostics);

    for (key, current, max) in defaults::VITALS {
        repair_vital(attributes, key, current, max, path, diagnostics);
    }
}

/// Rank name, stage, progress and description. A missing description is
/// taken from `突破描述` or synthesized from the rank table.
pub(crate) fn repair_rank(rank: &mut Map<String, Value>, path: &str, diagnostics: &mut Diagnostics) {
    let name = repair_string(rank, "名称", || MORTAL_RANK.to_string(), false, path, diagnostics);
    let stage = repair_string(rank, "阶段", String::new, true, path, diagnostics);
    repair_number(rank, "当前进度", PROGRESS, path, diagnostics);
    repair_number(rank, "下一级所需", REQUIRED, path, diagnostics);

    if has_text(rank.get("升级描述")) {
        return;
    }
    if has_text(rank.get("突破描述")) {
        if let Some(legacy) = rank.remove("突破描述") {
            diagnostics.push(Diagnostic::info(IntegrityError::structural(
                join(path, "突破描述"),
                "moved to 升级描述",
            )));
            rank.insert("升级描述".to_string(), legacy);
            return;
        }
    }

    let description = rank_description(&name, &stage);
    diagnostics.push(Diagnostic::info(IntegrityError::structural(
        join(path, "升级描述"),
        format!("synthesized for {} {}", name, stage),
    )));
    rank.insert("升级描述".to_string(), json!(description));
}

fn has_text(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// `{当前, 上限}` with `当前 ≤ 上限`. A bare number is read as the current
/// value.
fn repair_vital(
    attributes: &mut Map<String, Value>,
    key: &str,
    default_current: f64,
    default_max: f64,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    if let Some(current) = attributes.get(key).and_then(Value::as_f64) {
        diagnostics.push(Diagnostic::info(IntegrityError::structural(
            join(path, key),
            "bare number read as the current value",
        )));
        let pair = json!({
            "当前": number_value(current),
            "上限": number_value(current.max(default_max)),
        });
        attributes.insert(key.to_string(), pair);
    }

    let pair = ensure_object(
        attributes,
        key,
        || defaults::vital(default_current, default_max),
        path,
        diagnostics,
    );
    let path = join(path, key);
    let max = repair_number(
        pair,
        "上限",
        NumberSpec::new(1.0, VITAL_LIMIT, default_max),
        &path,
        diagnostics,
    );
    repair_number(
        pair,
        "当前",
        NumberSpec::new(0.0, max, default_current.min(max)),
        &path,
        diagnostics,
    );
}

/// `描述` is required. The player's coordinates are required, an NPC's
/// are optional.
pub(crate) fn repair_location(
    location: &mut Map<String, Value>,
    config: &IntegrityConfig,
    coordinates_required: bool,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    repair_string(
        location,
        "描述",
        || config.defaults.location.clone(),
        false,
        path,
        diagnostics,
    );
    for key in ["x", "y"] {
        if coordinates_required {
            repair_number(location, key, COORDINATE, path, diagnostics);
        } else {
            repair_optional_number(location, key, COORDINATE, path, diagnostics);
        }
    }
    repair_optional_number(location, "信号强度", DENSITY, path, diagnostics);
}

/// Keep effects with a name and a buff/debuff type.
fn repair_effects(effects: &mut Vec<Value>, path: &str, diagnostics: &mut Diagnostics) {
    let mut kept = Vec::with_capacity(effects.len());
    for (i, effect) in std::mem::take(effects).into_iter().enumerate() {
        let effect_path = format!("{}[{}]", path, i);
        let mut reject = |reason: String| {
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                effect_path.clone(),
                format!("{}, dropped", reason),
            )));
        };

        let mut effect = match effect {
            Value::Object(map) => map,
            other => {
                reject(format!("expected object, found {}", type_name(&other)));
                continue;
            }
        };
        if !has_text(effect.get("状态名称")) {
            reject("missing 状态名称".to_string());
            continue;
        }
        let declared = effect.get("类型").and_then(Value::as_str);
        let Some(kind) = declared.and_then(EffectKind::from_key) else {
            reject(format!("unknown effect type {:?}", declared));
            continue;
        };
        if declared != Some(kind.key()) {
            effect.insert("类型".to_string(), json!(kind.key()));
        }

        repair_optional_number(&mut effect, "强度", INTENSITY, &effect_path, diagnostics);
        kept.push(Value::Object(effect));
    }
    *effects = kept;
}

/// Credits and items. Items without a name are dropped; every kept item
/// has a known category, a quality and a quantity.
pub(crate) fn repair_inventory(
    inventory: &mut Map<String, Value>,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    let credits_path = join(path, "信用点");
    let credits = ensure_object(inventory, "信用点", defaults::credits, path, diagnostics);
    for key in CREDIT_KEYS {
        repair_number(credits, key, CREDITS, &credits_path, diagnostics);
    }

    let items_path = join(path, "物品");
    let items = ensure_object(inventory, "物品", || json!({}), path, diagnostics);
    for (id, entry) in std::mem::take(items) {
        let entry_path = join(&items_path, &id);
        if let Some(entry) = repair_item(&id, entry, &entry_path, diagnostics) {
            items.insert(id, entry);
        }
    }
}

fn repair_item(id: &str, entry: Value, path: &str, diagnostics: &mut Diagnostics) -> Option<Value> {
    let mut item = match entry {
        Value::Object(map) => map,
        other => {
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                path,
                format!("expected object, found {}, dropped", type_name(&other)),
            )));
            return None;
        }
    };
    if !has_text(item.get("名称")) {
        diagnostics.push(Diagnostic::warning(IntegrityError::structural(
            path,
            "item without a name, dropped",
        )));
        return None;
    }

    if item.get("物品ID").and_then(Value::as_str) != Some(id) {
        diagnostics.push(Diagnostic::info(IntegrityError::structural(
            join(path, "物品ID"),
            "set to the inventory key",
        )));
        item.insert("物品ID".to_string(), json!(id));
    }

    let declared = item.get("类型").and_then(Value::as_str);
    if declared.and_then(ItemCategory::from_key).is_none() {
        diagnostics.push(Diagnostic::warning(IntegrityError::structural(
            join(path, "类型"),
            format!("unknown category {:?}, set to {}", declared, ItemCategory::Other.key()),
        )));
        item.insert("类型".to_string(), json!(ItemCategory::Other.key()));
    }

    let quality_path = join(path, "品质");
    let quality = ensure_object(&mut item, "品质", defaults::quality, path, diagnostics);
    let declared = quality.get("quality").and_then(Value::as_str);
    let tier = declared.and_then(QualityTier::from_key);
    if declared != tier.map(|t| t.key()) {
        let tier = tier.unwrap_or_default();
        diagnostics.push(Diagnostic::warning(IntegrityError::range(
            join(&quality_path, "quality"),
            format!("{:?} read as {}", declared, tier.key()),
        )));
        quality.insert("quality".to_string(), json!(tier.key()));
    }
    repair_number(quality, "grade", GRADE, &quality_path, diagnostics);

    repair_number(&mut item, "数量", QUANTITY, path, diagnostics);
    if item.get("描述").is_some_and(Value::is_null) {
        item.remove("描述");
    }
    repair_optional_string(&mut item, "描述", path, diagnostics);
    repair_bonus_block(&mut item, "装备增幅", "成长六维", path, diagnostics);
    repair_bonus_block(&mut item, "程序效果", "属性加成", path, diagnostics);
    repair_optional_number(&mut item, "训练进度", PROFICIENCY, path, diagnostics);

    if item.get("已装备").is_some_and(|v| !v.is_boolean()) {
        diagnostics.push(Diagnostic::warning(IntegrityError::structural(
            join(path, "已装备"),
            "expected boolean, removed",
        )));
        item.remove("已装备");
    }

    Some(Value::Object(item))
}

/// A bonus block and its inner axis map must be objects when present.
fn repair_bonus_block(
    item: &mut Map<String, Value>,
    block_key: &str,
    inner_key: &str,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    let block_path = join(path, block_key);
    match item.get_mut(block_key) {
        None | Some(Value::Null) => {}
        Some(Value::Object(block)) => {
            let misshapen = block
                .get(inner_key)
                .is_some_and(|inner| !inner.is_object() && !inner.is_null());
            if misshapen {
                diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                    join(&block_path, inner_key),
                    "expected object, removed",
                )));
                block.remove(inner_key);
            }
        }
        Some(other) => {
            diagnostics.push(Diagnostic::warning(IntegrityError::structural(
                block_path,
                format!("expected object, found {}, removed", type_name(other)),
            )));
            item.remove(block_key);
        }
    }
}

/// Resolve a reference stored as a bare identifier, normalizing object
/// and numeric forms to the identifier string.
fn resolve_id_slot(
    slot: &mut Value,
    index: &ItemIndex,
    category: ItemCategory,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    if let Some((id, _)) = resolve_or_null(slot, index, category, path, diagnostics) {
        if slot.as_str() != Some(id.as_str()) {
            diagnostics.push(Diagnostic::info(IntegrityError::reference(
                path,
                format!("normalized to {:?}", id),
            )));
            *slot = Value::String(id);
        }
    }
}

fn repair_equipment(
    equipment: &mut Map<String, Value>,
    index: &ItemIndex,
    config: &IntegrityConfig,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    let slots = config.slot_keys();
    for key in slots {
        let slot = equipment.entry(key.to_string()).or_insert(Value::Null);
        resolve_id_slot(slot, index, ItemCategory::Equipment, &join(path, key), diagnostics);
    }

    for key in &EQUIPMENT_SLOT_KEYS[slots.len()..] {
        if let Some(removed) = equipment.remove(*key) {
            if !removed.is_null() {
                diagnostics.push(Diagnostic::warning(IntegrityError::reference(
                    join(path, key),
                    "slot is disabled, cleared",
                )));
            }
        }
    }
}

/// `程序.当前程序ID` and the `程序套装` main and secondary slots.
fn repair_loadout(
    loadout: &mut Map<String, Value>,
    index: &ItemIndex,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    let current = loadout.entry("当前程序ID".to_string()).or_insert(Value::Null);
    resolve_id_slot(
        current,
        index,
        ItemCategory::Technique,
        &join(path, "当前程序ID"),
        diagnostics,
    );

    ensure_object(loadout, "程序进度", || json!({}), path, diagnostics);

    let set_path = join(path, "程序套装");
    let set = ensure_object(
        loadout,
        "程序套装",
        || json!({ "主槽": null, "副槽": [] }),
        path,
        diagnostics,
    );
    for (alias, key) in [("主修", "主槽"), ("辅修", "副槽")] {
        if !set.contains_key(key) {
            if let Some(value) = set.remove(alias) {
                set.insert(key.to_string(), value);
            }
        }
    }

    let main = set.entry("主槽".to_string()).or_insert(Value::Null);
    resolve_id_slot(main, index, ItemCategory::Technique, &join(&set_path, "主槽"), diagnostics);

    let secondary_path = join(&set_path, "副槽");
    let secondary = ensure_array(set, "副槽", &set_path, diagnostics);
    let mut kept = Vec::with_capacity(secondary.len());
    for (i, mut reference) in std::mem::take(secondary).into_iter().enumerate() {
        let entry_path = format!("{}[{}]", secondary_path, i);
        if let Some((id, _)) =
            resolve_or_null(&mut reference, index, ItemCategory::Technique, &entry_path, diagnostics)
        {
            kept.push(Value::String(id));
        }
    }
    *secondary = kept;
}

/// The training pointer must name a technique; its cached name follows the
/// inventory.
fn repair_training(
    training: &mut Map<String, Value>,
    index: &ItemIndex,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    let pointer_path = join(path, "训练程序");
    let pointer = training.entry("训练程序".to_string()).or_insert(Value::Null);
    let Some((id, name)) =
        resolve_or_null(pointer, index, ItemCategory::Technique, &pointer_path, diagnostics)
    else {
        return;
    };

    match pointer {
        Value::Object(map) => {
            if map.get("物品ID").and_then(Value::as_str) != Some(id.as_str()) {
                map.insert("物品ID".to_string(), json!(id));
            }
            if map.get("名称").and_then(Value::as_str) != Some(name) {
                diagnostics.push(Diagnostic::info(IntegrityError::reference(
                    join(&pointer_path, "名称"),
                    format!("cached name corrected to {:?}", name),
                )));
                map.insert("名称".to_string(), json!(name));
            }
        }
        other => {
            diagnostics.push(Diagnostic::info(IntegrityError::reference(
                pointer_path,
                "identifier expanded to {物品ID, 名称}",
            )));
            *other = json!({ "物品ID": id, "名称": name });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use state_rules::CharacterState;

    fn repaired(character: Value) -> (Value, Diagnostics) {
        let mut character = character;
        let mut diagnostics = Diagnostics::default();
        if let Value::Object(map) = &mut character {
            repair_character(map, &IntegrityConfig::default(), &mut diagnostics);
        }
        (character, diagnostics)
    }

    fn inventory() -> Value {
        json!({
            "物品": {
                "blade": { "名称": "单分子刃", "类型": "装备", "品质": { "quality": "玄", "grade": 3 } },
                "ice": { "名称": "破冰协议", "类型": "程序", "训练进度": 40 },
                "stim": { "名称": "兴奋剂", "类型": "药剂", "数量": 3 }
            }
        })
    }

    #[test]
    fn test_repaired_character_is_typed_readable() {
        let (character, _) = repaired(json!({}));
        let typed: CharacterState = serde_json::from_value(character).unwrap();
        assert_eq!(typed.identity.baseline.sum(), 30.0);
        assert_eq!(typed.attributes.lifespan.max, 80.0);
    }

    #[test]
    fn test_dangling_slot_is_cleared() {
        let (character, diagnostics) = repaired(json!({
            "背包": inventory(),
            "装备": { "装备1": "X", "装备2": { "物品ID": "blade" }, "装备3": "stim", "饰品": "keep" }
        }));
        let equipment = &character["装备"];
        assert_eq!(equipment["装备1"], Value::Null);
        assert_eq!(equipment["装备2"], json!("blade"));
        assert_eq!(equipment["装备3"], Value::Null);
        assert_eq!(equipment["装备6"], Value::Null);
        assert_eq!(equipment["饰品"], json!("keep"));
        assert_eq!(diagnostics.under("角色.装备").count(), 3);
    }

    #[test]
    fn test_training_pointer_to_consumable_is_cleared() {
        let (character, _) = repaired(json!({
            "背包": inventory(),
            "训练": { "训练程序": { "物品ID": "stim", "名称": "兴奋剂" } }
        }));
        assert_eq!(character["训练"]["训练程序"], Value::Null);
    }

    #[test]
    fn test_training_pointer_name_follows_inventory() {
        let (character, _) = repaired(json!({
            "背包": inventory(),
            "训练": { "训练程序": { "物品ID": "ice", "名称": "旧名", "开始": 3 } }
        }));
        assert_eq!(
            character["训练"]["训练程序"],
            json!({ "物品ID": "ice", "名称": "破冰协议", "开始": 3 })
        );

        let (character, _) = repaired(json!({ "背包": inventory(), "训练": { "训练程序": "ice" } }));
        assert_eq!(
            character["训练"]["训练程序"],
            json!({ "物品ID": "ice", "名称": "破冰协议" })
        );
    }

    #[test]
    fn test_growth_axis_is_clamped() {
        let (character, _) = repaired(json!({
            "身份": { "成长六维": { "体质": 25, "STR": 3, "能源": -1, "算法": "7" } }
        }));
        let growth = &character["身份"]["成长六维"];
        assert_eq!(growth["体质"], json!(20));
        assert_eq!(growth["能源"], json!(0));
        assert_eq!(growth["算法"], json!(7));
        assert_eq!(growth["STR"], json!(3));
        assert_eq!(growth["心智"], json!(0));
    }

    #[test]
    fn test_axis_alias_is_renamed() {
        let (character, _) = repaired(json!({ "身份": { "初始六维": { "DEX": 8, "体质": 12 } } }));
        let baseline = &character["身份"]["初始六维"];
        assert_eq!(baseline["能源"], json!(8));
        assert_eq!(baseline["体质"], json!(10));
        assert!(baseline.get("DEX").is_none());
        assert_eq!(baseline["魅力"], json!(5));
    }

    #[test]
    fn test_items_are_normalized() {
        let (character, _) = repaired(json!({
            "背包": {
                "信用点": { "低额": "12", "高额": -4 },
                "物品": {
                    "a": { "名称": "扳手", "类型": "工具", "数量": 0, "品质": { "quality": "地品", "grade": 12 } },
                    "b": { "名称": "  " },
                    "c": "junk",
                    "d": { "名称": "芯片", "物品ID": "zzz", "装备增幅": 3, "程序效果": { "属性加成": [1] }, "已装备": "yes" }
                }
            }
        }));
        let inventory = &character["背包"];
        assert_eq!(
            inventory["信用点"],
            json!({ "低额": 12, "中额": 0, "高额": 0, "最高额": 0 })
        );

        let items = inventory["物品"].as_object().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items["a"],
            json!({
                "名称": "扳手",
                "物品ID": "a",
                "类型": "其他",
                "数量": 1,
                "品质": { "quality": "地", "grade": 10 }
            })
        );
        assert_eq!(items["d"]["物品ID"], json!("d"));
        assert!(items["d"].get("装备增幅").is_none());
        assert_eq!(items["d"]["程序效果"], json!({}));
        assert!(items["d"].get("已装备").is_none());
        assert_eq!(items["d"]["品质"], json!({ "quality": "凡", "grade": 1 }));
    }

    #[test]
    fn test_rank_description() {
        let (character, _) = repaired(json!({
            "属性": { "阶位": { "名称": "跑者", "阶段": "中期", "当前进度": 150, "下一级所需": 0 } }
        }));
        let rank = &character["属性"]["阶位"];
        assert_eq!(rank["下一级所需"], json!(1));
        assert_eq!(rank["当前进度"], json!(150));
        assert_eq!(rank["升级描述"], json!(rank_description("跑者", "中期")));

        let (character, _) = repaired(json!({
            "属性": { "阶位": { "名称": "跑者", "突破描述": "自定义" } }
        }));
        assert_eq!(character["属性"]["阶位"]["升级描述"], json!("自定义"));
        assert!(character["属性"]["阶位"].get("突破描述").is_none());
    }

    #[test]
    fn test_vitals_keep_current_below_max() {
        let (character, _) = repaired(json!({
            "属性": { "生命值": { "当前": 150, "上限": 120 }, "电量": 70, "带宽": "full" }
        }));
        let attributes = &character["属性"];
        assert_eq!(attributes["生命值"], json!({ "当前": 120, "上限": 120 }));
        assert_eq!(attributes["电量"], json!({ "当前": 70, "上限": 70 }));
        assert_eq!(attributes["带宽"], json!({ "当前": 30, "上限": 30 }));
    }

    #[test]
    fn test_effects_filter() {
        let (character, _) = repaired(json!({
            "效果": [
                { "状态名称": "过载", "类型": "BUFF", "强度": 140 },
                { "状态名称": "中毒", "类型": "curse" },
                { "类型": "debuff" },
                "旧格式",
                { "状态名称": "迟缓", "类型": "debuff" }
            ]
        }));
        assert_eq!(
            character["效果"],
            json!([
                { "状态名称": "过载", "类型": "buff", "强度": 100 },
                { "状态名称": "迟缓", "类型": "debuff" }
            ])
        );
    }

    #[test]
    fn test_loadout_references() {
        let (character, _) = repaired(json!({
            "背包": inventory(),
            "程序": {
                "当前程序ID": "blade",
                "程序套装": { "主修": { "物品ID": "ice" }, "辅修": ["ice", "X", "stim"] }
            }
        }));
        let loadout = &character["程序"];
        assert_eq!(loadout["当前程序ID"], Value::Null);
        assert_eq!(loadout["程序进度"], json!({}));
        assert_eq!(
            loadout["程序套装"],
            json!({ "主槽": "ice", "副槽": ["ice"] })
        );
    }

    #[test]
    fn test_disabled_slots_are_removed() {
        let config = IntegrityConfig::from_toml_str("equipment_slots = 2").unwrap();
        let mut character = json!({
            "背包": inventory(),
            "装备": { "装备1": "blade", "装备5": "blade" }
        });
        let mut diagnostics = Diagnostics::default();
        if let Value::Object(map) = &mut character {
            repair_character(map, &config, &mut diagnostics);
        }
        assert_eq!(character["装备"], json!({ "装备1": "blade", "装备2": null }));
    }

    #[test]
    fn test_location_defaults() {
        let (character, _) = repaired(json!({ "位置": { "x": "12", "信号强度": 0 } }));
        assert_eq!(
            character["位置"],
            json!({ "描述": "霓虹城·无名区", "x": 12, "y": 5000, "信号强度": 1 })
        );
    }
}
