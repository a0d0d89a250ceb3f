//! Character and NPC definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AxisVector, EquipmentSlots, Inventory, TrainingPointer};

/// Rank shown for characters who have not been ranked yet.
pub const MORTAL_RANK: &str = "凡人";

/// Rank `{name, stage, progress, required, description}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    #[serde(rename = "名称", default)]
    pub name: String,
    #[serde(rename = "阶段", default)]
    pub stage: String,
    #[serde(rename = "当前进度", default)]
    pub progress: f64,
    #[serde(rename = "下一级所需", default = "default_required")]
    pub required: f64,
    #[serde(rename = "升级描述", default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_required() -> f64 {
    100.0
}

impl Default for Rank {
    fn default() -> Self {
        Self {
            name: MORTAL_RANK.to_string(),
            stage: String::new(),
            progress: 0.0,
            required: default_required(),
            description: String::new(),
            extra: Map::new(),
        }
    }
}

impl Rank {
    /// Progress still missing before promotion, in percent of `required`.
    pub fn remaining_percent(&self) -> f64 {
        if self.required <= 0.0 {
            return 0.0;
        }
        ((self.required - self.progress) / self.required * 100.0).max(0.0)
    }
}

/// `{当前, 上限}` pair such as health or energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalPair {
    #[serde(rename = "当前", default)]
    pub current: f64,
    #[serde(rename = "上限", default)]
    pub max: f64,
}

impl VitalPair {
    pub fn new(current: f64, max: f64) -> Self {
        Self { current, max }
    }
}

impl Default for VitalPair {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "描述", default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Environment density in `[1, 100]`.
    #[serde(rename = "信号强度", default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Buff,
    Debuff,
}

impl EffectKind {
    pub fn key(&self) -> &'static str {
        match self {
            EffectKind::Buff => "buff",
            EffectKind::Debuff => "debuff",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "buff" => Some(EffectKind::Buff),
            "debuff" => Some(EffectKind::Debuff),
            _ => None,
        }
    }
}

/// Default intensity of an effect that carries none.
pub const DEFAULT_EFFECT_INTENSITY: f64 = 50.0;

/// A timed buff or debuff on the character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    #[serde(rename = "状态名称")]
    pub name: String,
    #[serde(rename = "类型")]
    pub kind: EffectKind,
    #[serde(rename = "强度", default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusEffect {
    pub fn new(name: impl Into<String>, kind: EffectKind, intensity: Option<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            intensity,
            extra: Map::new(),
        }
    }

    pub fn intensity_or_default(&self) -> f64 {
        self.intensity.unwrap_or(DEFAULT_EFFECT_INTENSITY)
    }
}

/// Who the character is. The baseline vector is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "名字", default)]
    pub name: String,
    #[serde(rename = "性别", default)]
    pub gender: String,
    #[serde(rename = "初始六维", default)]
    pub baseline: AxisVector,
    #[serde(rename = "成长六维", default)]
    pub growth: AxisVector,
    /// Talent modules. Entries are free-form; effects are read leniently.
    #[serde(rename = "模块", default)]
    pub talents: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(rename = "阶位", default)]
    pub rank: Rank,
    #[serde(rename = "声望", default)]
    pub reputation: f64,
    #[serde(rename = "生命值", default)]
    pub health: VitalPair,
    #[serde(rename = "电量", default)]
    pub energy: VitalPair,
    #[serde(rename = "带宽", default)]
    pub bandwidth: VitalPair,
    #[serde(rename = "寿命", default)]
    pub lifespan: VitalPair,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            rank: Rank::default(),
            reputation: 0.0,
            health: VitalPair::new(100.0, 100.0),
            energy: VitalPair::new(50.0, 50.0),
            bandwidth: VitalPair::new(30.0, 30.0),
            lifespan: VitalPair::new(18.0, 80.0),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Training {
    #[serde(rename = "训练程序", default)]
    pub program: Option<TrainingPointer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The player character domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    #[serde(rename = "身份", default)]
    pub identity: Identity,
    #[serde(rename = "属性", default)]
    pub attributes: Attributes,
    #[serde(rename = "位置", default)]
    pub location: Location,
    #[serde(rename = "效果", default)]
    pub effects: Vec<StatusEffect>,
    #[serde(rename = "背包", default)]
    pub inventory: Inventory,
    #[serde(rename = "装备", default)]
    pub equipment: EquipmentSlots,
    #[serde(rename = "训练", default)]
    pub training: Training,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CharacterState {
    /// Inventory entries currently sitting in an equipment slot.
    pub fn equipped_items(&self) -> impl Iterator<Item = &super::InventoryEntry> + '_ {
        self.equipment
            .equipped_ids()
            .into_iter()
            .filter_map(|id| self.inventory.resolve(id, super::ItemCategory::Equipment))
    }

    /// The technique the training pointer refers to, if it resolves.
    pub fn training_technique(&self) -> Option<&super::InventoryEntry> {
        let pointer = self.training.program.as_ref()?;
        self.inventory
            .resolve(&pointer.id, super::ItemCategory::Technique)
    }
}

/// Favor bounds for NPC relationships.
pub const FAVOR_MIN: f64 = -100.0;
pub const FAVOR_MAX: f64 = 100.0;

/// An NPC in the relationship table, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NpcRecord {
    #[serde(rename = "名字", default)]
    pub name: String,
    #[serde(rename = "性别", default)]
    pub gender: String,
    #[serde(rename = "阶位", default)]
    pub rank: Rank,
    #[serde(rename = "初始六维", default)]
    pub baseline: AxisVector,
    #[serde(rename = "好感度", default)]
    pub favor: f64,
    #[serde(rename = "当前位置", default)]
    pub location: Location,
    #[serde(rename = "记忆", default)]
    pub memories: Vec<Value>,
    #[serde(rename = "背包", default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Inventory>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{InventoryEntry, ItemCategory};
    use serde_json::json;

    #[test]
    fn test_rank_remaining_percent() {
        let mut rank = Rank::default();
        rank.progress = 25.0;
        rank.required = 100.0;
        assert!((rank.remaining_percent() - 75.0).abs() < 1e-9);

        rank.progress = 150.0;
        assert_eq!(rank.remaining_percent(), 0.0);
    }

    #[test]
    fn test_effect_kind_is_case_insensitive() {
        assert_eq!(EffectKind::from_key("BUFF"), Some(EffectKind::Buff));
        assert_eq!(EffectKind::from_key(" debuff "), Some(EffectKind::Debuff));
        assert_eq!(EffectKind::from_key("curse"), None);
    }

    #[test]
    fn test_character_defaults_fill_missing_fields() {
        let character: CharacterState =
            serde_json::from_value(json!({ "身份": { "名字": "零" } })).unwrap();
        assert_eq!(character.identity.name, "零");
        assert_eq!(character.attributes.rank.name, MORTAL_RANK);
        assert_eq!(character.attributes.lifespan.max, 80.0);
        assert!(character.training.program.is_none());
    }

    #[test]
    fn test_training_technique_requires_technique_category() {
        let mut character = CharacterState::default();
        character.inventory.items.insert(
            "stim".to_string(),
            InventoryEntry::new("stim", "兴奋剂", ItemCategory::Consumable),
        );
        character.training.program = Some(TrainingPointer {
            id: "stim".to_string(),
            name: "兴奋剂".to_string(),
            extra: Map::new(),
        });
        assert!(character.training_technique().is_none());

        character.inventory.items.insert(
            "ice".to_string(),
            InventoryEntry::new("ice", "破冰协议", ItemCategory::Technique),
        );
        character.training.program = Some(TrainingPointer {
            id: "ice".to_string(),
            name: "破冰协议".to_string(),
            extra: Map::new(),
        });
        assert_eq!(
            character.training_technique().map(|e| e.name.as_str()),
            Some("破冰协议")
        );
    }

    #[test]
    fn test_equipped_items_skip_unknown_ids() {
        let mut character = CharacterState::default();
        character.inventory.items.insert(
            "vest".to_string(),
            InventoryEntry::new("vest", "防弹背心", ItemCategory::Equipment),
        );
        character.equipment.slot1 = Some("vest".to_string());
        character.equipment.slot2 = Some("ghost".to_string());

        let names: Vec<_> = character.equipped_items().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["防弹背心".to_string()]);
    }
}
