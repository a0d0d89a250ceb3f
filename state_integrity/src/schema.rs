//! Schema detection: classify an arbitrary value as canonical or as one of
//! the legacy shapes, without touching it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use state_rules::keys;

/// Root keys used by earlier save generations.
pub const LEGACY_ROOT_KEYS: [&str; 21] = [
    "状态",
    "玩家角色状态",
    "玩家角色状态信息",
    "玩家角色信息",
    "角色基础信息",
    "玩家角色基础信息",
    "训练状态",
    "状态效果",
    "叙事历史",
    "对话历史",
    "任务系统",
    "事件系统",
    "组织系统",
    "世界信息",
    "人物关系",
    "装备栏",
    "游戏时间",
    "专精体系",
    "训练程序",
    "掌握技能",
    "身体部位开发",
];

/// Fields that flattened saves placed directly at the root.
pub const SHORTCUT_KEYS: [&str; 4] = ["属性", "位置", "背包", "时间"];

/// Marker reported when any shortcut field is present.
pub const SHORTCUT_MARKER: &str = "短路径平铺";

/// Character keys of the V4 layout, where identity and attributes are split
/// into a profile, abilities and resources.
pub const V4_CHARACTER_KEYS: [&str; 3] = ["档案", "能力", "资源"];

/// Whether `character` uses the V4 layout: both `档案` and `能力` are
/// objects.
pub fn is_v4_character(character: &Value) -> bool {
    V4_CHARACTER_KEYS[..2]
        .iter()
        .all(|key| character.get(*key).is_some_and(Value::is_object))
}

/// Which generation a document appears to belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaGeneration {
    /// All five domains present as objects.
    CanonicalV3,
    /// Some domains present, none of the legacy markers.
    PartialV3,
    /// Deprecated root keys present.
    LegacyV0,
    /// Only flattened shortcut fields present.
    LegacyFlat,
    /// Character split into `档案` / `能力` / `资源`.
    ProfileV4,
    /// Not an object, or nothing recognizable in it.
    Unrecognized,
}

impl SchemaGeneration {
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyV0 | Self::LegacyFlat)
    }
}

/// Result of [`detect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub is_canonical: bool,
    pub generation: SchemaGeneration,
    /// Deprecated root keys found, followed by [`SHORTCUT_MARKER`] if any
    /// shortcut field is present.
    pub legacy_markers: Vec<String>,
    /// Domains that are absent or not objects.
    pub missing_domains: Vec<&'static str>,
    /// `元数据.版本号`, when readable.
    pub version: Option<u64>,
}

impl Detection {
    pub fn needs_migration(&self) -> bool {
        !self.is_canonical
    }
}

/// Classify `document`. Never fails.
pub fn detect(document: &Value) -> Detection {
    let Some(root) = document.as_object() else {
        return Detection {
            is_canonical: false,
            generation: SchemaGeneration::Unrecognized,
            legacy_markers: Vec::new(),
            missing_domains: keys::DOMAINS.to_vec(),
            version: None,
        };
    };

    let missing_domains: Vec<&'static str> = keys::DOMAINS
        .into_iter()
        .filter(|domain| !root.get(*domain).is_some_and(Value::is_object))
        .collect();

    let version = root
        .get(keys::METADATA)
        .and_then(|m| m.get("版本号"))
        .and_then(Value::as_u64);

    let v4 = root.get(keys::CHARACTER).is_some_and(is_v4_character);

    if missing_domains.is_empty() && !v4 {
        return Detection {
            is_canonical: true,
            generation: SchemaGeneration::CanonicalV3,
            legacy_markers: Vec::new(),
            missing_domains,
            version,
        };
    }

    let mut legacy_markers: Vec<String> = LEGACY_ROOT_KEYS
        .into_iter()
        .filter(|key| root.contains_key(*key))
        .map(str::to_string)
        .collect();
    let deprecated = !legacy_markers.is_empty();

    let shortcut = SHORTCUT_KEYS
        .into_iter()
        .any(|key| root.get(key).is_some_and(is_present));
    if shortcut {
        legacy_markers.push(SHORTCUT_MARKER.to_string());
    }

    if v4 {
        legacy_markers.extend(
            V4_CHARACTER_KEYS
                .into_iter()
                .filter(|key| root.get(keys::CHARACTER).and_then(|c| c.get(*key)).is_some())
                .map(|key| format!("{}.{}", keys::CHARACTER, key)),
        );
    }

    let any_domain = keys::DOMAINS.into_iter().any(|d| root.contains_key(d));

    let generation = if v4 {
        SchemaGeneration::ProfileV4
    } else if deprecated {
        SchemaGeneration::LegacyV0
    } else if shortcut {
        SchemaGeneration::LegacyFlat
    } else if any_domain {
        SchemaGeneration::PartialV3
    } else {
        SchemaGeneration::Unrecognized
    };

    Detection {
        is_canonical: false,
        generation,
        legacy_markers,
        missing_domains,
        version,
    }
}

/// Truthiness of a shortcut field: present and not an empty scalar.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_document() {
        let doc = json!({
            "元数据": { "版本号": 3 },
            "角色": {},
            "社交": {},
            "世界": {},
            "系统": {}
        });
        let detection = detect(&doc);
        assert!(detection.is_canonical);
        assert_eq!(detection.generation, SchemaGeneration::CanonicalV3);
        assert!(detection.missing_domains.is_empty());
        assert_eq!(detection.version, Some(3));
    }

    #[test]
    fn test_domain_must_be_object() {
        let doc = json!({
            "元数据": {},
            "角色": [],
            "社交": {},
            "世界": {},
            "系统": {}
        });
        let detection = detect(&doc);
        assert!(!detection.is_canonical);
        assert_eq!(detection.missing_domains, vec!["角色"]);
        assert_eq!(detection.generation, SchemaGeneration::PartialV3);
    }

    #[test]
    fn test_legacy_root_keys() {
        let doc = json!({ "状态": { "声望": 3 }, "人物关系": {}, "属性": {} });
        let detection = detect(&doc);
        assert_eq!(detection.generation, SchemaGeneration::LegacyV0);
        assert_eq!(detection.legacy_markers, vec!["状态", "人物关系", SHORTCUT_MARKER]);
        assert_eq!(detection.missing_domains.len(), 5);
        assert!(detection.generation.is_legacy());
    }

    #[test]
    fn test_flat_shortcut_only() {
        let detection = detect(&json!({ "位置": { "描述": "港口" } }));
        assert_eq!(detection.generation, SchemaGeneration::LegacyFlat);
        assert_eq!(detection.legacy_markers, vec![SHORTCUT_MARKER]);
    }

    #[test]
    fn test_empty_shortcut_is_not_a_marker() {
        let detection = detect(&json!({ "时间": null, "备注": "x" }));
        assert_eq!(detection.generation, SchemaGeneration::Unrecognized);
        assert!(detection.legacy_markers.is_empty());
    }

    #[test]
    fn test_v4_profile_layout() {
        let doc = json!({
            "元数据": { "版本": "v4" },
            "角色": { "档案": { "姓名": "林夜" }, "能力": {}, "资源": {} },
            "社交": {},
            "世界": {},
            "系统": {}
        });
        let detection = detect(&doc);
        assert!(!detection.is_canonical);
        assert!(detection.needs_migration());
        assert!(detection.missing_domains.is_empty());
        assert_eq!(detection.generation, SchemaGeneration::ProfileV4);
        assert_eq!(detection.legacy_markers, vec!["角色.档案", "角色.能力", "角色.资源"]);
    }

    #[test]
    fn test_profile_without_abilities_is_not_v4() {
        let doc = json!({
            "元数据": {},
            "角色": { "身份": {}, "档案": { "姓名": "林夜" } },
            "社交": {},
            "世界": {},
            "系统": {}
        });
        let detection = detect(&doc);
        assert!(detection.is_canonical);
        assert_eq!(detection.generation, SchemaGeneration::CanonicalV3);
    }

    #[test]
    fn test_non_object_input() {
        for value in [json!(null), json!(42), json!("save"), json!([1, 2])] {
            let detection = detect(&value);
            assert!(!detection.is_canonical);
            assert_eq!(detection.generation, SchemaGeneration::Unrecognized);
            assert_eq!(detection.missing_domains.len(), 5);
        }
    }
}
