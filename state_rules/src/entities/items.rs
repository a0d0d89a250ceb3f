//! Inventory entries, quality tiers and the slots that reference them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Closed set of item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemCategory {
    #[serde(rename = "装备")]
    Equipment,
    #[serde(rename = "程序")]
    Technique,
    #[serde(rename = "药剂")]
    Consumable,
    #[serde(rename = "材料")]
    Material,
    #[default]
    #[serde(rename = "其他")]
    Other,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 5] = [
        ItemCategory::Equipment,
        ItemCategory::Technique,
        ItemCategory::Consumable,
        ItemCategory::Material,
        ItemCategory::Other,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ItemCategory::Equipment => "装备",
            ItemCategory::Technique => "程序",
            ItemCategory::Consumable => "药剂",
            ItemCategory::Material => "材料",
            ItemCategory::Other => "其他",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// Seven ordered quality tiers, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum QualityTier {
    #[default]
    #[serde(rename = "凡")]
    Common,
    #[serde(rename = "黄")]
    Yellow,
    #[serde(rename = "玄")]
    Mystic,
    #[serde(rename = "地")]
    Earth,
    #[serde(rename = "天")]
    Heaven,
    #[serde(rename = "仙")]
    Immortal,
    #[serde(rename = "神")]
    Divine,
}

impl QualityTier {
    pub const ALL: [QualityTier; 7] = [
        QualityTier::Common,
        QualityTier::Yellow,
        QualityTier::Mystic,
        QualityTier::Earth,
        QualityTier::Heaven,
        QualityTier::Immortal,
        QualityTier::Divine,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            QualityTier::Common => "凡",
            QualityTier::Yellow => "黄",
            QualityTier::Mystic => "玄",
            QualityTier::Earth => "地",
            QualityTier::Heaven => "天",
            QualityTier::Immortal => "仙",
            QualityTier::Divine => "神",
        }
    }

    /// Accepts the bare tier character or the long form (`玄阶`, `玄品`).
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        let head = key.chars().next()?;
        Self::ALL
            .into_iter()
            .find(|tier| tier.key().starts_with(head))
    }

    /// Multiplier applied to technique proficiency when computing the
    /// technique bonus of the progression speed.
    pub fn base_bonus(&self) -> f64 {
        match self {
            QualityTier::Common => 0.0,
            QualityTier::Yellow => 0.1,
            QualityTier::Mystic => 0.25,
            QualityTier::Earth => 0.45,
            QualityTier::Heaven => 0.7,
            QualityTier::Immortal => 0.9,
            QualityTier::Divine => 1.0,
        }
    }
}

/// Grade bounds inside a tier.
pub const GRADE_MIN: u32 = 0;
pub const GRADE_MAX: u32 = 10;
pub const DEFAULT_GRADE: u32 = 1;

/// Tier × grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuality {
    #[serde(rename = "quality", default)]
    pub tier: QualityTier,
    #[serde(default = "default_grade")]
    pub grade: u32,
}

fn default_grade() -> u32 {
    DEFAULT_GRADE
}

impl Default for ItemQuality {
    fn default() -> Self {
        Self {
            tier: QualityTier::Common,
            grade: DEFAULT_GRADE,
        }
    }
}

/// Numeric bonus block an equipment item grants while worn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentBonus {
    /// Axis key → amount; values are read leniently.
    #[serde(rename = "成长六维", default, skip_serializing_if = "Option::is_none")]
    pub growth: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Effects a technique grants while it is the active training program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechniqueEffects {
    #[serde(rename = "属性加成", default, skip_serializing_if = "Option::is_none")]
    pub attribute_bonus: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const QUANTITY_MIN: u32 = 1;
pub const QUANTITY_MAX: u32 = 999_999;

/// A single entry in the inventory map. Its identifier equals its map key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    #[serde(rename = "物品ID", default)]
    pub id: String,
    #[serde(rename = "名称", default)]
    pub name: String,
    #[serde(rename = "类型", default)]
    pub category: ItemCategory,
    #[serde(rename = "品质", default)]
    pub quality: ItemQuality,
    #[serde(rename = "数量", default = "default_quantity")]
    pub quantity: u32,
    #[serde(rename = "描述", default)]
    pub description: String,
    #[serde(rename = "装备增幅", default, skip_serializing_if = "Option::is_none")]
    pub equipment_bonus: Option<EquipmentBonus>,
    #[serde(rename = "程序效果", default, skip_serializing_if = "Option::is_none")]
    pub technique_effects: Option<TechniqueEffects>,
    /// Training proficiency in percent, techniques only.
    #[serde(rename = "训练进度", default, skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_quantity() -> u32 {
    QUANTITY_MIN
}

impl InventoryEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            quality: ItemQuality::default(),
            quantity: QUANTITY_MIN,
            description: String::new(),
            equipment_bonus: None,
            technique_effects: None,
            proficiency: None,
            extra: Map::new(),
        }
    }

    pub fn is_equipment(&self) -> bool {
        self.category == ItemCategory::Equipment
    }

    pub fn is_technique(&self) -> bool {
        self.category == ItemCategory::Technique
    }
}

/// Four-denomination currency block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(rename = "低额", default)]
    pub low: f64,
    #[serde(rename = "中额", default)]
    pub mid: f64,
    #[serde(rename = "高额", default)]
    pub high: f64,
    #[serde(rename = "最高额", default)]
    pub top: f64,
}

/// The character-owned inventory. Entries are keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "信用点", default)]
    pub credits: Credits,
    #[serde(rename = "物品", default)]
    pub items: BTreeMap<String, InventoryEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Inventory {
    pub fn get(&self, id: &str) -> Option<&InventoryEntry> {
        self.items.get(id)
    }

    /// Look up `id` and require the entry to be of `category`.
    pub fn resolve(&self, id: &str, category: ItemCategory) -> Option<&InventoryEntry> {
        self.items.get(id).filter(|entry| entry.category == category)
    }
}

/// Slot keys in document order.
pub const EQUIPMENT_SLOT_KEYS: [&str; 6] = ["装备1", "装备2", "装备3", "装备4", "装备5", "装备6"];

/// Fixed set of named equipment slots, each empty or an item identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlots {
    #[serde(rename = "装备1", default)]
    pub slot1: Option<String>,
    #[serde(rename = "装备2", default)]
    pub slot2: Option<String>,
    #[serde(rename = "装备3", default)]
    pub slot3: Option<String>,
    #[serde(rename = "装备4", default)]
    pub slot4: Option<String>,
    #[serde(rename = "装备5", default)]
    pub slot5: Option<String>,
    #[serde(rename = "装备6", default)]
    pub slot6: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EquipmentSlots {
    /// `(slot key, referenced id)` in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        let slots = [
            &self.slot1,
            &self.slot2,
            &self.slot3,
            &self.slot4,
            &self.slot5,
            &self.slot6,
        ];
        EQUIPMENT_SLOT_KEYS
            .into_iter()
            .zip(slots)
            .map(|(key, slot)| (key, slot.as_deref()))
    }

    /// Identifiers of every occupied slot.
    pub fn equipped_ids(&self) -> Vec<&str> {
        self.iter().filter_map(|(_, id)| id).collect()
    }
}

/// Reference to the technique currently being trained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingPointer {
    #[serde(rename = "物品ID", default)]
    pub id: String,
    #[serde(rename = "名称", default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
