//! End-to-end lifecycle tests

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use state_integrity::*;
use state_rules::{Axis, AxisVector, CanonicalDocument};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// A clean canonical document to patch in each test.
fn fresh() -> Value {
    Pipeline::with_defaults().process(&Value::Null, now()).document
}

fn process(document: &Value) -> Outcome {
    Pipeline::with_defaults().process(document, now())
}

#[test]
fn test_legacy_status_wrapper_is_relocated() {
    let legacy = json!({
        "状态": {
            "位置": { "描述": "第七区码头", "x": "120", "y": 88, "信号强度": 70 },
            "状态效果": [ { "状态名称": "过载", "类型": "debuff", "强度": 140 } ],
            "生命值": { "当前": 150, "上限": 120 },
            "阶位": { "名称": "跑者", "阶段": "初期", "当前进度": 30 },
            "声望": "45"
        },
        "玩家角色信息": { "名字": "零", "成长六维": { "体质": 2 } },
        "人物关系": { "老K": { "好感度": 240, "当前位置": "酒吧" } },
        "叙事历史": [ { "role": "narrator", "text": "雨夜" } ],
        "游戏时间": { "年数": 2077, "月": 13 },
        "_AI说明": "删除我"
    });

    let outcome = process(&legacy);
    assert!(outcome.is_ready());
    assert!(outcome.migration.migrated);
    assert_eq!(outcome.detection.generation, SchemaGeneration::LegacyV0);

    let doc = &outcome.document;
    for domain in ["元数据", "角色", "社交", "世界", "系统"] {
        assert!(doc[domain].is_object(), "{} missing", domain);
    }
    assert!(doc.get("状态").is_none());
    assert!(doc.get("_AI说明").is_none());

    let character = &doc["角色"];
    assert_eq!(character["身份"]["名字"], json!("零"));
    assert_eq!(character["身份"]["成长六维"]["体质"], json!(2));
    assert_eq!(character["位置"]["描述"], json!("第七区码头"));
    assert_eq!(character["位置"]["x"], json!(120));
    assert_eq!(character["位置"]["信号强度"], json!(70));
    assert_eq!(character["效果"][0]["强度"], json!(100));
    assert_eq!(character["属性"]["生命值"], json!({ "当前": 120, "上限": 120 }));
    assert_eq!(character["属性"]["声望"], json!(45));
    assert_eq!(character["属性"]["阶位"]["名称"], json!("跑者"));

    let npc = &doc["社交"]["关系"]["老K"];
    assert_eq!(npc["好感度"], json!(100));
    assert_eq!(npc["当前位置"]["描述"], json!("酒吧"));

    assert_eq!(doc["系统"]["历史"]["叙事"][0]["text"], json!("雨夜"));
    assert_eq!(doc["元数据"]["时间"]["年"], json!(2077));
    assert_eq!(doc["元数据"]["时间"]["月"], json!(12));
    assert_eq!(doc["元数据"]["版本号"], json!(3));

    let typed = outcome.canonical.as_ref().unwrap();
    assert_eq!(typed.metadata.clock.year, 2077);
    assert_eq!(typed.character.attributes.reputation, 45.0);
}

#[test]
fn test_dangling_equipment_slot_becomes_null() {
    let mut doc = fresh();
    doc["角色"]["背包"]["物品"] = json!({
        "blade": { "名称": "单分子刃", "类型": "装备" }
    });
    doc["角色"]["装备"]["装备1"] = json!("X");
    doc["角色"]["装备"]["装备2"] = json!("blade");

    let outcome = process(&doc);
    assert!(outcome.is_ready());
    assert_eq!(outcome.document["角色"]["装备"]["装备1"], Value::Null);
    assert_eq!(outcome.document["角色"]["装备"]["装备2"], json!("blade"));

    let cleared: Vec<&Diagnostic> = outcome.repairs.under("角色.装备.装备1").collect();
    assert_eq!(cleared.len(), 1);
    assert!(matches!(cleared[0].error, IntegrityError::Reference { .. }));
}

#[test]
fn test_training_pointer_to_consumable_is_cleared() {
    let mut doc = fresh();
    doc["角色"]["背包"]["物品"] = json!({
        "stim": { "名称": "兴奋剂", "类型": "药剂", "数量": 2 }
    });
    doc["角色"]["训练"]["训练程序"] = json!({ "物品ID": "stim", "名称": "兴奋剂" });

    let outcome = process(&doc);
    assert_eq!(outcome.document["角色"]["训练"]["训练程序"], Value::Null);
    assert!(outcome.canonical.unwrap().character.training.program.is_none());
}

#[test]
fn test_growth_axis_over_cap_is_clamped() {
    let mut doc = fresh();
    doc["角色"]["身份"]["成长六维"]["体质"] = json!(25);

    let outcome = process(&doc);
    assert_eq!(outcome.document["角色"]["身份"]["成长六维"]["体质"], json!(20));
    let growth = outcome.canonical.unwrap().character.identity.growth;
    assert_eq!(growth.get(Axis::Constitution), 20.0);
    assert_eq!(growth.sum(), 20.0);
}

#[test]
fn test_speed_regression_fixture() {
    let mut doc = fresh();
    doc["角色"]["位置"]["信号强度"] = json!(50);
    for axis in ["体质", "能源", "算法", "心智", "资源感知", "魅力"] {
        doc["角色"]["身份"]["初始六维"][axis] = json!(6);
        doc["角色"]["身份"]["成长六维"][axis] = json!(4);
    }

    let outcome = process(&doc);
    let derivation = outcome.derive(0.0).unwrap();
    let density = 0.7 + 9.0 / 19.0 * 0.3;

    assert!((derivation.speed.factors.density - density).abs() < 1e-12);
    assert!((derivation.speed.factors.combined_axis - 1.316).abs() < 1e-12);
    assert_eq!(derivation.speed.factors.status, 1.0);
    assert_eq!(derivation.speed.factors.technique, 0.0);
    assert!((derivation.speed.speed - density * 1.316).abs() < 1e-12);
    assert_eq!(derivation.attributes.total, AxisVector::splat(10.0));
}

#[test]
fn test_canonical_document_migrates_to_itself() {
    let doc = fresh();
    let migration = Migrator::with_defaults().migrate(&doc, now());
    assert_eq!(migration.document, doc);
    assert!(!migration.report.migrated);
}

#[test]
fn test_lifecycle_is_idempotent() {
    let legacy = json!({
        "角色基础信息": { "名字": "零", "初始六维": { "体质": "9", "DEX": 11 } },
        "背包": { "物品": { "a": { "名称": "零件", "数量": 2.0 } } },
        "装备栏": { "装备1": "a", "装备7": "a" }
    });
    let first = process(&legacy);
    let second = process(&first.document);
    assert_eq!(second.document, first.document);
    assert!(second.repairs.is_empty(), "{:?}", second.repairs);
    assert!(!second.migration.migrated);
}

#[test]
fn test_input_is_never_mutated() {
    let input = json!({ "_AI说明": "x", "状态": { "声望": "3" }, "人物关系": { "_模板": {} } });
    let before = input.clone();
    process(&input);
    Repairer::with_defaults().repair(&input, now());
    validate(&input);
    assert_eq!(input, before);
}

#[test]
fn test_unreadable_input_reaches_ready_with_defaults() {
    let outcome = process(&json!(42));
    assert!(outcome.is_ready());
    assert_eq!(outcome.detection.generation, SchemaGeneration::Unrecognized);
    assert!(outcome
        .migration
        .diagnostics
        .iter()
        .any(|d| matches!(d.error, IntegrityError::UnknownVersion { .. })));
    assert!(CanonicalDocument::from_value(&outcome.document).is_ok());
}

#[test]
fn test_fallback_replaces_untrusted_document() {
    let pipeline = Pipeline::with_defaults();
    let settled = pipeline.settle(json!({ "元数据": "broken" }), now());
    assert_eq!(settled.state, LifecycleState::Fallback);
    assert!(settled.validation.errors.len() >= 5);
    assert!(validate(&settled.document).valid);
    assert_eq!(settled.document["元数据"]["存档名"], json!("自动存档"));
}

#[test]
fn test_config_drives_defaults() {
    let config = IntegrityConfig::from_toml_str(
        r#"
        equipment_slots = 2

        [defaults]
        character_name = "无名氏"
        world_name = "锈带"
        "#,
    )
    .unwrap();
    let pipeline = Pipeline::new(config);

    let outcome = pipeline.process(&json!({ "角色": { "性别": "女" } }), now());
    let doc = &outcome.document;
    assert!(outcome.is_ready());
    assert_eq!(doc["角色"]["身份"]["名字"], json!("无名氏"));
    assert_eq!(doc["角色"]["身份"]["性别"], json!("女"));
    assert_eq!(doc["世界"]["信息"]["世界名称"], json!("锈带"));
    assert_eq!(doc["角色"]["装备"].as_object().unwrap().len(), 2);
}

#[test]
fn test_unknown_root_data_is_preserved() {
    let outcome = process(&json!({ "状态": {}, "任务系统": { "主线": "追查" }, "自定义": 7 }));
    let extension = &outcome.document["系统"]["扩展"];
    assert_eq!(extension["任务系统"], json!({ "主线": "追查" }));
    assert_eq!(extension["自定义"], json!(7));
    assert!(outcome
        .migration
        .preserved
        .contains(&("自定义".to_string(), "系统.扩展.自定义".to_string())));
}

#[test]
fn test_v4_profile_save_keeps_player_data() {
    let mut doc = fresh();
    let character = doc["角色"].as_object_mut().unwrap();
    character.remove("身份");
    character.remove("属性");
    character.insert(
        "档案".to_string(),
        json!({
            "姓名": "林夜",
            "性别": "女",
            "基础素质": { "体格": 9, "反应": 7, "智识": 6, "幸运": 4, "魅力": 3, "意志": 8 },
            "改造素质": { "体格": 2 }
        }),
    );
    character.insert(
        "能力".to_string(),
        json!({ "等级": { "称号": "跑者", "阶段": "初期", "进度": 30 }, "热度": 12 }),
    );
    character.insert(
        "资源".to_string(),
        json!({ "生命值": { "当前": 70, "上限": 100 }, "生理耐久": { "当前": 25, "上限": 90 } }),
    );
    doc["元数据"]["版本"] = json!("v4");

    let outcome = process(&doc);
    assert!(outcome.is_ready());
    assert_eq!(outcome.detection.generation, SchemaGeneration::ProfileV4);

    let typed = outcome.canonical.as_ref().unwrap();
    let identity = &typed.character.identity;
    assert_eq!(identity.name, "林夜");
    assert_eq!(identity.gender, "女");
    assert_eq!(identity.baseline.get(Axis::Constitution), 9.0);
    assert_eq!(identity.baseline.sum(), 37.0);
    assert_eq!(identity.growth.get(Axis::Constitution), 2.0);

    let attributes = &typed.character.attributes;
    assert_eq!(attributes.reputation, 12.0);
    assert_eq!(attributes.rank.name, "跑者");
    assert_eq!(outcome.document["角色"]["属性"]["阶位"]["当前进度"], json!(30));
    assert_eq!(outcome.document["角色"]["属性"]["生命值"], json!({ "当前": 70, "上限": 100 }));
    assert_eq!(outcome.document["角色"]["属性"]["寿命"], json!({ "当前": 25, "上限": 90 }));
    assert!(outcome.document["角色"].get("档案").is_none());

    let second = process(&outcome.document);
    assert!(!second.migration.migrated);
    assert_eq!(second.document, outcome.document);
}

#[test]
fn test_dirty_relationship_table_is_repaired() {
    let mut doc = fresh();
    doc["社交"]["关系"] = json!({
        "_模板": { "名字": "示例" },
        "老K ": { "好感度": "250", "当前位置": "酒吧", "记忆": "丢失" },
        "夜莺": { "好感度": -300, "记忆": ["在码头见过玩家"] },
        "坏数据": 7
    });

    let outcome = process(&doc);
    assert!(outcome.is_ready());

    let relations = outcome.document["社交"]["关系"].as_object().unwrap();
    let mut names: Vec<&String> = relations.keys().collect();
    names.sort();
    assert_eq!(names, vec!["夜莺", "老K"]);

    let typed = outcome.canonical.as_ref().unwrap();
    let k = typed.npc("老K").unwrap();
    assert_eq!(k.favor, 100.0);
    assert_eq!(k.location.description, "酒吧");
    assert_eq!(k.memories, vec![json!("与玩家初次相识")]);

    let nightingale = typed.npc("夜莺").unwrap();
    assert_eq!(nightingale.favor, -100.0);
    assert_eq!(nightingale.memories, vec![json!("在码头见过玩家")]);
    assert_eq!(nightingale.location.description, "霓虹城·无名区");

    assert!(outcome.repairs.under("社交.关系.坏数据").next().is_some());
}
