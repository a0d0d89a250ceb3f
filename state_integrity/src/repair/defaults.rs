//! Default blocks and the minimal new-game document.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use state_rules::{
    keys, Axis, DEFAULT_BASELINE_AXIS, DEFAULT_GRADE, MORTAL_DESCRIPTION, MORTAL_RANK, SCHEMA_VERSION,
};

use crate::config::IntegrityConfig;

/// Default map coordinate of the player.
pub const DEFAULT_COORDINATE: f64 = 5000.0;

/// RFC 3339 timestamp with millisecond precision.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A fresh `save_<uuid>` identifier.
pub fn new_save_id() -> String {
    format!("save_{}", Uuid::new_v4().simple())
}

pub fn clock() -> Value {
    json!({ "年": 1000, "月": 1, "日": 1, "小时": 8, "分钟": 0 })
}

pub fn metadata(save_name: &str, now: DateTime<Utc>) -> Value {
    let stamp = timestamp(now);
    json!({
        "版本号": SCHEMA_VERSION,
        "存档ID": new_save_id(),
        "存档名": save_name,
        "创建时间": stamp,
        "更新时间": stamp,
        "游戏时长秒": 0,
        "时间": clock(),
    })
}

/// Six-axis object with every axis set to `value`.
pub fn axes(value: f64) -> Value {
    let map: Map<String, Value> = Axis::ALL
        .into_iter()
        .map(|axis| (axis.key().to_string(), crate::numeric::number_value(value)))
        .collect();
    Value::Object(map)
}

pub fn identity(config: &IntegrityConfig) -> Value {
    let defaults = &config.defaults;
    json!({
        "名字": defaults.character_name,
        "性别": defaults.gender,
        "种族": defaults.race,
        "世界": defaults.world_name,
        "出生": defaults.origin,
        "改造核心": defaults.core,
        "模块": [],
        "初始六维": axes(DEFAULT_BASELINE_AXIS),
        "成长六维": axes(0.0),
    })
}

pub fn rank() -> Value {
    json!({
        "名称": MORTAL_RANK,
        "阶段": "",
        "当前进度": 0,
        "下一级所需": 100,
        "升级描述": MORTAL_DESCRIPTION,
    })
}

pub fn vital(current: f64, max: f64) -> Value {
    json!({ "当前": current as i64, "上限": max as i64 })
}

/// `(key, default current, default max)` of each vital pair.
pub const VITALS: [(&str, f64, f64); 4] = [
    ("生命值", 100.0, 100.0),
    ("电量", 50.0, 50.0),
    ("带宽", 30.0, 30.0),
    ("寿命", 18.0, 80.0),
];

pub fn attributes() -> Value {
    let mut map = Map::new();
    map.insert("阶位".to_string(), rank());
    map.insert("声望".to_string(), json!(0));
    for (key, current, max) in VITALS {
        map.insert(key.to_string(), vital(current, max));
    }
    Value::Object(map)
}

pub fn location(config: &IntegrityConfig) -> Value {
    json!({
        "描述": config.defaults.location,
        "x": DEFAULT_COORDINATE as i64,
        "y": DEFAULT_COORDINATE as i64,
    })
}

pub fn credits() -> Value {
    json!({ "低额": 0, "中额": 0, "高额": 0, "最高额": 0 })
}

pub fn inventory() -> Value {
    json!({ "信用点": credits(), "物品": {} })
}

pub fn quality() -> Value {
    json!({ "quality": "凡", "grade": DEFAULT_GRADE })
}

pub fn equipment(config: &IntegrityConfig) -> Value {
    let map: Map<String, Value> = config
        .slot_keys()
        .iter()
        .map(|key| (key.to_string(), Value::Null))
        .collect();
    Value::Object(map)
}

pub fn program_loadout() -> Value {
    json!({
        "当前程序ID": null,
        "程序进度": {},
        "程序套装": { "主槽": null, "副槽": [] },
    })
}

pub fn training() -> Value {
    json!({ "训练程序": null })
}

pub fn character(config: &IntegrityConfig) -> Value {
    json!({
        "身份": identity(config),
        "属性": attributes(),
        "位置": location(config),
        "效果": [],
        "背包": inventory(),
        "装备": equipment(config),
        "程序": program_loadout(),
        "训练": training(),
        "流派": { "流派列表": {} },
        "技能": { "掌握技能": [], "装备栏": [], "冷却": {} },
    })
}

pub fn event_config() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("启用随机事件".to_string(), json!(true));
    map.insert("最小间隔年".to_string(), json!(1));
    map.insert("最大间隔年".to_string(), json!(10));
    map.insert("事件提示词".to_string(), json!(""));
    map
}

pub fn event_log() -> Value {
    json!({
        "配置": event_config(),
        "下次事件时间": null,
        "事件记录": [],
    })
}

/// Keys of the four memory tiers.
pub const MEMORY_TIERS: [&str; 4] = ["短期记忆", "中期记忆", "长期记忆", "隐式中期记忆"];

pub fn memory() -> Value {
    let map: Map<String, Value> = MEMORY_TIERS
        .into_iter()
        .map(|tier| (tier.to_string(), json!([])))
        .collect();
    Value::Object(map)
}

pub fn social() -> Value {
    json!({
        "关系": {},
        "组织": null,
        "事件": event_log(),
        "记忆": memory(),
    })
}

/// List fields of `世界.信息`.
pub const WORLD_LISTS: [&str; 3] = ["大陆信息", "势力信息", "地点信息"];

pub fn world_info(config: &IntegrityConfig) -> Value {
    let mut map = Map::new();
    map.insert("世界名称".to_string(), json!(config.defaults.world_name));
    for key in WORLD_LISTS {
        map.insert(key.to_string(), json!([]));
    }
    Value::Object(map)
}

pub fn world(config: &IntegrityConfig) -> Value {
    json!({ "信息": world_info(config) })
}

pub fn online_session() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("模式".to_string(), json!("单机"));
    map.insert("房间ID".to_string(), Value::Null);
    map.insert("玩家ID".to_string(), Value::Null);
    map.insert("只读路径".to_string(), json!([keys::WORLD]));
    map.insert("世界曝光".to_string(), json!(false));
    map.insert("冲突策略".to_string(), json!("服务器"));
    map
}

pub fn system() -> Value {
    json!({
        "配置": {},
        "历史": { "叙事": [] },
        "联机": online_session(),
        "扩展": {},
    })
}

/// Default block for one domain.
pub fn domain(key: &str, config: &IntegrityConfig, now: DateTime<Utc>) -> Value {
    match key {
        keys::METADATA => metadata(&config.defaults.save_name, now),
        keys::CHARACTER => character(config),
        keys::SOCIAL => social(),
        keys::WORLD => world(config),
        _ => system(),
    }
}

/// The minimal new-game document. Passes validation and reads as a
/// [`state_rules::CanonicalDocument`].
pub fn minimal_document(config: &IntegrityConfig, now: DateTime<Utc>) -> Value {
    let map: Map<String, Value> = keys::DOMAINS
        .into_iter()
        .map(|key| (key.to_string(), domain(key, config, now)))
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use state_rules::CanonicalDocument;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_minimal_document_is_typed_readable() {
        let config = IntegrityConfig::default();
        let doc = minimal_document(&config, now());
        let typed = CanonicalDocument::from_value(&doc).unwrap();

        assert_eq!(typed.metadata.version, SCHEMA_VERSION);
        assert!(typed.metadata.save_id.starts_with("save_"));
        assert_eq!(typed.metadata.created_at, "2024-05-01T12:00:00.000Z");
        assert_eq!(typed.character.identity.name, "无名行动者");
        assert_eq!(typed.character.identity.baseline.sum(), 30.0);
        assert_eq!(typed.character.attributes.rank.description, MORTAL_DESCRIPTION);
        assert!(typed.system.online.is_single_player());
        assert_eq!(typed.world.info.name, "霓虹城");
    }

    #[test]
    fn test_save_ids_are_unique() {
        assert_ne!(new_save_id(), new_save_id());
    }

    #[test]
    fn test_equipment_follows_slot_count() {
        let config = IntegrityConfig::from_toml_str("equipment_slots = 2").unwrap();
        assert_eq!(equipment(&config), json!({ "装备1": null, "装备2": null }));
    }

    #[test]
    fn test_axes_are_integers() {
        assert_eq!(axes(5.0)["体质"], json!(5));
        assert_eq!(axes(0.0).as_object().map(Map::len), Some(6));
    }
}
