//! The canonical five-domain save document.
//!
//! The integrity pipeline works on untyped JSON. Once a document has been
//! repaired it converts cleanly into [`CanonicalDocument`], which is what
//! the mechanics read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::entities::{CharacterState, NpcRecord};
use crate::error::Result;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 3;

/// Document keys shared by the typed model and the integrity pipeline.
pub mod keys {
    pub const METADATA: &str = "元数据";
    pub const CHARACTER: &str = "角色";
    pub const SOCIAL: &str = "社交";
    pub const WORLD: &str = "世界";
    pub const SYSTEM: &str = "系统";

    /// The five domains, in document order.
    pub const DOMAINS: [&str; 5] = [METADATA, CHARACTER, SOCIAL, WORLD, SYSTEM];
}

/// In-world calendar clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    #[serde(rename = "年", default = "default_year")]
    pub year: u32,
    #[serde(rename = "月", default = "one")]
    pub month: u32,
    #[serde(rename = "日", default = "one")]
    pub day: u32,
    #[serde(rename = "小时", default = "default_hour")]
    pub hour: u32,
    #[serde(rename = "分钟", default)]
    pub minute: u32,
}

fn default_year() -> u32 {
    1000
}

fn one() -> u32 {
    1
}

fn default_hour() -> u32 {
    8
}

impl Default for GameTime {
    fn default() -> Self {
        Self {
            year: default_year(),
            month: 1,
            day: 1,
            hour: default_hour(),
            minute: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "版本号", default = "default_version")]
    pub version: u32,
    #[serde(rename = "存档ID", default)]
    pub save_id: String,
    #[serde(rename = "存档名", default)]
    pub save_name: String,
    #[serde(rename = "游戏版本", default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,
    #[serde(rename = "创建时间", default)]
    pub created_at: String,
    #[serde(rename = "更新时间", default)]
    pub updated_at: String,
    #[serde(rename = "游戏时长秒", default)]
    pub play_seconds: f64,
    #[serde(rename = "时间", default)]
    pub clock: GameTime,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(rename = "配置", default)]
    pub config: Map<String, Value>,
    #[serde(rename = "下次事件时间", default)]
    pub next_event: Option<Map<String, Value>>,
    #[serde(rename = "事件记录", default)]
    pub records: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Four memory tiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryTiers {
    #[serde(rename = "短期记忆", default)]
    pub short_term: Vec<Value>,
    #[serde(rename = "中期记忆", default)]
    pub mid_term: Vec<Value>,
    #[serde(rename = "长期记忆", default)]
    pub long_term: Vec<Value>,
    #[serde(rename = "隐式中期记忆", default)]
    pub implicit_mid_term: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialState {
    /// NPCs keyed by name.
    #[serde(rename = "关系", default)]
    pub relationships: BTreeMap<String, NpcRecord>,
    #[serde(rename = "组织", default)]
    pub faction: Option<Value>,
    #[serde(rename = "事件", default)]
    pub events: EventLog,
    #[serde(rename = "记忆", default)]
    pub memory: MemoryTiers,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldInfo {
    #[serde(rename = "世界名称", default)]
    pub name: String,
    #[serde(rename = "大陆信息", default)]
    pub regions: Vec<Value>,
    #[serde(rename = "势力信息", default)]
    pub factions: Vec<Value>,
    #[serde(rename = "地点信息", default)]
    pub locations: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    #[serde(rename = "信息", default)]
    pub info: WorldInfo,
    #[serde(rename = "状态", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeHistory {
    #[serde(rename = "叙事", default)]
    pub narrative: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Single-player or online session block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineSession {
    #[serde(rename = "模式", default)]
    pub mode: String,
    #[serde(rename = "房间ID", default)]
    pub room_id: Option<String>,
    #[serde(rename = "玩家ID", default)]
    pub player_id: Option<String>,
    #[serde(rename = "只读路径", default)]
    pub read_only_paths: Vec<String>,
    #[serde(rename = "世界曝光", default)]
    pub world_exposed: bool,
    #[serde(rename = "冲突策略", default)]
    pub conflict_policy: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for OnlineSession {
    fn default() -> Self {
        Self {
            mode: "单机".to_string(),
            room_id: None,
            player_id: None,
            read_only_paths: vec![keys::WORLD.to_string()],
            world_exposed: false,
            conflict_policy: "服务器".to_string(),
            extra: Map::new(),
        }
    }
}

impl OnlineSession {
    pub fn is_single_player(&self) -> bool {
        self.mode == "单机"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    #[serde(rename = "配置", default)]
    pub config: Map<String, Value>,
    #[serde(rename = "历史", default)]
    pub history: NarrativeHistory,
    #[serde(rename = "联机", default)]
    pub online: OnlineSession,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed view of a repaired document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    #[serde(rename = "元数据")]
    pub metadata: Metadata,
    #[serde(rename = "角色")]
    pub character: CharacterState,
    #[serde(rename = "社交")]
    pub social: SocialState,
    #[serde(rename = "世界")]
    pub world: WorldState,
    #[serde(rename = "系统")]
    pub system: SystemState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CanonicalDocument {
    /// Read a repaired document.
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn npc(&self, name: &str) -> Option<&NpcRecord> {
        self.social.relationships.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "元数据": { "版本号": 3, "存档ID": "save_1", "时间": { "年": 1024 } },
            "角色": { "身份": { "名字": "零" } },
            "社交": { "关系": { "老K": { "名字": "老K", "好感度": 20 } } },
            "世界": { "信息": { "世界名称": "霓虹城" } },
            "系统": { "联机": { "模式": "联机", "房间ID": "r1" }, "扩展": { "mod": true } }
        })
    }

    #[test]
    fn test_from_value_reads_domains() {
        let doc = CanonicalDocument::from_value(&minimal()).unwrap();
        assert_eq!(doc.metadata.version, SCHEMA_VERSION);
        assert_eq!(doc.metadata.clock.year, 1024);
        assert_eq!(doc.metadata.clock.hour, 8);
        assert_eq!(doc.character.identity.name, "零");
        assert_eq!(doc.npc("老K").map(|n| n.favor), Some(20.0));
        assert!(!doc.system.online.is_single_player());
        assert_eq!(doc.system.extra.get("扩展"), Some(&json!({ "mod": true })));
    }

    #[test]
    fn test_missing_domain_is_an_error() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("世界");
        assert!(CanonicalDocument::from_value(&value).is_err());
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let mut value = minimal();
        value["角色"]["身体"] = json!({ "义体": ["左臂"] });
        let doc = CanonicalDocument::from_value(&value).unwrap();
        let back = doc.to_value().unwrap();
        assert_eq!(back["角色"]["身体"], json!({ "义体": ["左臂"] }));
    }

    #[test]
    fn test_default_online_session() {
        let session = OnlineSession::default();
        assert!(session.is_single_player());
        assert_eq!(session.read_only_paths, vec!["世界".to_string()]);
    }
}
