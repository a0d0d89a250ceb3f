//! Derived attributes: growth bonus sources summed onto the baseline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{compute_speed, SpeedInput, SpeedResult, DEFAULT_DENSITY};
use crate::entities::{Axis, AxisVector, CharacterState, BASELINE_BOUNDS, GROWTH_BOUNDS};

/// Where a growth contribution comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusKind {
    /// Growth already recorded on the identity.
    Stored,
    Equipment,
    Technique,
    Talent,
    Other,
}

/// One independently summed contribution to growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusSource {
    pub kind: BonusKind,
    pub label: String,
    pub contribution: AxisVector,
}

impl BonusSource {
    pub fn new(kind: BonusKind, label: impl Into<String>, contribution: AxisVector) -> Self {
        Self {
            kind,
            label: label.into(),
            contribution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedAttributes {
    pub baseline: AxisVector,
    pub growth: AxisVector,
    pub total: AxisVector,
}

/// Sum every source, clamp the growth to its caps and add it to the
/// baseline.
pub fn compute_derived(baseline: &AxisVector, sources: &[BonusSource]) -> DerivedAttributes {
    let baseline = baseline.clamped(BASELINE_BOUNDS);
    let growth = sources
        .iter()
        .fold(AxisVector::default(), |acc, source| acc.plus(&source.contribution))
        .clamped(GROWTH_BOUNDS);

    DerivedAttributes {
        baseline,
        growth,
        total: baseline.plus(&growth),
    }
}

fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Read an `{axis key: amount}` map. Unknown keys and non-numeric amounts
/// are skipped.
pub fn axis_contribution(map: &Map<String, Value>) -> AxisVector {
    let mut out = AxisVector::default();
    for (key, value) in map {
        if let (Some(axis), Some(amount)) = (Axis::from_key(key), lenient_number(value)) {
            out.set(axis, out.get(axis) + amount);
        }
    }
    out
}

/// Growth granted by one talent effect, in either the document form
/// `{类型: 成长六维, 目标, 数值}` or the backend form
/// `{type: ATTRIBUTE_MODIFIER, target, value}`.
fn talent_effect(effect: &Value) -> Option<(Axis, f64)> {
    let effect = effect.as_object()?;
    let (target, amount) = if effect.get("类型").and_then(Value::as_str) == Some("成长六维") {
        (effect.get("目标")?, effect.get("数值"))
    } else if effect.get("type").and_then(Value::as_str) == Some("ATTRIBUTE_MODIFIER") {
        (effect.get("target")?, effect.get("value"))
    } else {
        return None;
    };
    let axis = Axis::from_key(target.as_str()?)?;
    let amount = amount.and_then(lenient_number).unwrap_or(0.0);
    Some((axis, amount))
}

fn talent_source(talent: &Value) -> Option<BonusSource> {
    let talent = talent.as_object()?;
    let effects = talent
        .get("effects")
        .or_else(|| talent.get("效果"))
        .and_then(Value::as_array)?;

    let mut contribution = AxisVector::default();
    for (axis, amount) in effects.iter().filter_map(talent_effect) {
        contribution.set(axis, contribution.get(axis) + amount);
    }

    let label = talent
        .get("名称")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(BonusSource::new(BonusKind::Talent, label, contribution))
}

/// Collect every growth source recorded on a character: stored growth,
/// equipped items, the active technique and talent modules.
pub fn bonus_sources(character: &CharacterState) -> Vec<BonusSource> {
    let mut sources = vec![BonusSource::new(
        BonusKind::Stored,
        "成长六维",
        character.identity.growth,
    )];

    for item in character.equipped_items() {
        if let Some(growth) = item.equipment_bonus.as_ref().and_then(|b| b.growth.as_ref()) {
            sources.push(BonusSource::new(
                BonusKind::Equipment,
                item.name.clone(),
                axis_contribution(growth),
            ));
        }
    }

    let active = character
        .inventory
        .items
        .values()
        .find(|item| {
            item.is_technique() && item.extra.get("已装备").and_then(Value::as_bool) == Some(true)
        })
        .or_else(|| character.training_technique());
    if let Some(technique) = active {
        if let Some(bonus) = technique
            .technique_effects
            .as_ref()
            .and_then(|e| e.attribute_bonus.as_ref())
        {
            sources.push(BonusSource::new(
                BonusKind::Technique,
                technique.name.clone(),
                axis_contribution(bonus),
            ));
        }
    }

    sources.extend(character.identity.talents.iter().filter_map(talent_source));
    sources
}

/// Derived attributes of a character from its own document data.
pub fn derive_character(character: &CharacterState) -> DerivedAttributes {
    compute_derived(&character.identity.baseline, &bonus_sources(character))
}

/// Build the speed input for a character. Growth comes from the derived
/// attributes so equipment and technique bonuses count.
pub fn speed_input(character: &CharacterState, environment_bonus: f64) -> SpeedInput {
    let derived = derive_character(character);
    let rank = &character.attributes.rank;
    let technique = character
        .training_technique()
        .map(|item| (item.quality.tier, item.proficiency.unwrap_or(0.0)));

    SpeedInput {
        density: character.location.density.unwrap_or(DEFAULT_DENSITY),
        baseline: derived.baseline,
        growth: derived.growth,
        effects: character.effects.clone(),
        technique,
        rank_name: rank.name.clone(),
        rank_stage: rank.stage.clone(),
        progress: rank.progress,
        required: rank.required,
        environment_bonus,
    }
}

/// Progression speed of a character.
pub fn character_speed(character: &CharacterState, environment_bonus: f64) -> SpeedResult {
    compute_speed(&speed_input(character, environment_bonus))
}
