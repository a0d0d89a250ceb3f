//! Pipeline configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use state_rules::EQUIPMENT_SLOT_KEYS;

use crate::error::ConfigError;

/// Default strings written into documents that lack them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentDefaults {
    pub save_name: String,
    /// Save name given to documents built from a legacy shape.
    pub migrated_save_name: String,
    pub character_name: String,
    pub gender: String,
    pub race: String,
    pub world_name: String,
    pub location: String,
    pub origin: String,
    pub core: String,
    /// Memory given to an NPC whose memory list is empty.
    pub npc_memory: String,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            save_name: "自动存档".to_string(),
            migrated_save_name: "迁移存档".to_string(),
            character_name: "无名行动者".to_string(),
            gender: "男".to_string(),
            race: "人类".to_string(),
            world_name: "霓虹城".to_string(),
            location: "霓虹城·无名区".to_string(),
            origin: "自由人".to_string(),
            core: "基础核心".to_string(),
            npc_memory: "与玩家初次相识".to_string(),
        }
    }
}

/// Configuration for the integrity pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Authoring-annotation keys removed from every object.
    pub annotation_keys: Vec<String>,

    /// Number of equipment slots (`装备1` … `装备N`).
    pub equipment_slots: usize,

    /// Replace the document with a fresh default when it still fails
    /// validation after repair.
    pub fallback_on_invalid: bool,

    pub defaults: DocumentDefaults,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            annotation_keys: vec![
                "_AI说明".to_string(),
                "_AI修改规则".to_string(),
                "_AI重要提醒".to_string(),
            ],
            equipment_slots: EQUIPMENT_SLOT_KEYS.len(),
            fallback_on_invalid: true,
            defaults: DocumentDefaults::default(),
        }
    }
}

impl IntegrityConfig {
    /// Parse from a TOML string. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: IntegrityConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.equipment_slots == 0 || self.equipment_slots > EQUIPMENT_SLOT_KEYS.len() {
            return Err(ConfigError::Invalid(format!(
                "equipment_slots must be between 1 and {}, got {}",
                EQUIPMENT_SLOT_KEYS.len(),
                self.equipment_slots
            )));
        }
        Ok(())
    }

    /// Slot keys in use, in document order.
    pub fn slot_keys(&self) -> &'static [&'static str] {
        &EQUIPMENT_SLOT_KEYS[..self.equipment_slots.min(EQUIPMENT_SLOT_KEYS.len())]
    }

    pub fn is_annotation_key(&self, key: &str) -> bool {
        self.annotation_keys.iter().any(|k| k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IntegrityConfig::default();
        assert!(config.is_annotation_key("_AI说明"));
        assert!(!config.is_annotation_key("说明"));
        assert_eq!(config.slot_keys().len(), 6);
        assert!(config.fallback_on_invalid);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = IntegrityConfig::from_toml_str(
            r#"
            fallback_on_invalid = false

            [defaults]
            world_name = "锈带"
            "#,
        )
        .unwrap();

        assert!(!config.fallback_on_invalid);
        assert_eq!(config.defaults.world_name, "锈带");
        assert_eq!(config.defaults.character_name, "无名行动者");
        assert_eq!(config.annotation_keys.len(), 3);
    }

    #[test]
    fn test_rejects_bad_slot_count() {
        let err = IntegrityConfig::from_toml_str("equipment_slots = 9").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = IntegrityConfig::from_toml_str("equipment_slots = 4").unwrap();
        assert_eq!(config.slot_keys(), &["装备1", "装备2", "装备3", "装备4"]);
    }

    #[test]
    fn test_parse_error() {
        let err = IntegrityConfig::from_toml_str("equipment_slots = \"six\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = IntegrityConfig::load("/nonexistent/integrity.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
