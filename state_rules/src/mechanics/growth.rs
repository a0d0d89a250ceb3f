//! Growth grants and talent scoring.

use serde::{Deserialize, Serialize};

use crate::entities::{Axis, AxisVector, GROWTH_BOUNDS};

/// General cap on a single growth grant.
pub const SINGLE_GRANT_CAP: f64 = 3.0;
/// Single-grant cap for rare events.
pub const RARE_GRANT_CAP: f64 = 5.0;

/// Share of the talent score carried by the baseline vector.
pub const BASELINE_SCORE_WEIGHT: f64 = 0.7;
/// Share carried by the growth vector.
pub const GROWTH_SCORE_WEIGHT: f64 = 0.3;

/// The only ways growth may increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthSource {
    #[serde(rename = "装备增幅")]
    EquipmentBonus,
    #[serde(rename = "模块效果")]
    TechniqueBonus,
    #[serde(rename = "注入耗材")]
    Consumable,
    #[serde(rename = "稀有机遇")]
    RareEvent,
    #[serde(rename = "关键突破")]
    Breakthrough,
    #[serde(rename = "阶位晋升")]
    RankPromotion,
}

impl GrowthSource {
    pub fn key(&self) -> &'static str {
        match self {
            GrowthSource::EquipmentBonus => "装备增幅",
            GrowthSource::TechniqueBonus => "模块效果",
            GrowthSource::Consumable => "注入耗材",
            GrowthSource::RareEvent => "稀有机遇",
            GrowthSource::Breakthrough => "关键突破",
            GrowthSource::RankPromotion => "阶位晋升",
        }
    }

    /// Per-application cap of this source.
    pub fn max_increase(&self) -> f64 {
        match self {
            GrowthSource::EquipmentBonus => 3.0,
            GrowthSource::TechniqueBonus => 2.0,
            GrowthSource::Consumable => 2.0,
            GrowthSource::RareEvent => 5.0,
            GrowthSource::Breakthrough => 1.0,
            GrowthSource::RankPromotion => 1.0,
        }
    }

    fn single_cap(&self) -> f64 {
        match self {
            GrowthSource::RareEvent => RARE_GRANT_CAP,
            _ => SINGLE_GRANT_CAP,
        }
    }
}

/// A request to raise one growth axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthGrant {
    pub axis: Axis,
    pub amount: f64,
    pub source: GrowthSource,
}

/// Outcome of [`validate_grant`].
#[derive(Debug, Clone, PartialEq)]
pub enum GrantDecision {
    Accepted,
    /// Valid, but only `amount` fits under the axis cap.
    Adjusted { amount: f64, reason: String },
    /// Invalid. `suggested` is the largest amount that would pass the
    /// violated cap, when one exists.
    Rejected {
        reason: String,
        suggested: Option<f64>,
    },
}

impl GrantDecision {
    pub fn is_valid(&self) -> bool {
        !matches!(self, GrantDecision::Rejected { .. })
    }
}

/// Check a grant against the single-application, per-source and per-axis
/// caps.
pub fn validate_grant(current: &AxisVector, grant: &GrowthGrant) -> GrantDecision {
    if !grant.amount.is_finite() || grant.amount <= 0.0 {
        return GrantDecision::Rejected {
            reason: "grant amount must be positive".to_string(),
            suggested: None,
        };
    }

    let single_cap = grant.source.single_cap();
    if grant.amount > single_cap {
        return GrantDecision::Rejected {
            reason: format!(
                "{} grants at most {} per application, requested {}",
                grant.source.key(),
                single_cap,
                grant.amount
            ),
            suggested: Some(single_cap),
        };
    }

    let source_cap = grant.source.max_increase();
    if grant.amount > source_cap {
        return GrantDecision::Rejected {
            reason: format!("{} grants at most {}", grant.source.key(), source_cap),
            suggested: Some(source_cap),
        };
    }

    let current_value = current.get(grant.axis);
    if current_value + grant.amount > GROWTH_BOUNDS.per_axis {
        let room = GROWTH_BOUNDS.per_axis - current_value;
        if room <= 0.0 {
            return GrantDecision::Rejected {
                reason: format!("{} is already at cap {}", grant.axis, GROWTH_BOUNDS.per_axis),
                suggested: None,
            };
        }
        return GrantDecision::Adjusted {
            amount: room,
            reason: format!("{} reaches its cap, granting {}", grant.axis, room),
        };
    }

    GrantDecision::Accepted
}

/// Validate and apply a grant to `growth`. Returns the decision; the vector
/// is only changed when the decision is valid.
pub fn apply_grant(growth: &mut AxisVector, grant: &GrowthGrant) -> GrantDecision {
    let decision = validate_grant(growth, grant);
    let amount = match &decision {
        GrantDecision::Accepted => grant.amount,
        GrantDecision::Adjusted { amount, .. } => *amount,
        GrantDecision::Rejected { .. } => return decision,
    };
    growth.set(grant.axis, growth.get(grant.axis) + amount);
    decision
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TalentGrade {
    Exceptional,
    Gifted,
    Average,
    Mediocre,
    Limited,
}

impl TalentGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            TalentGrade::Exceptional
        } else if score >= 7.0 {
            TalentGrade::Gifted
        } else if score >= 5.0 {
            TalentGrade::Average
        } else if score >= 3.0 {
            TalentGrade::Mediocre
        } else {
            TalentGrade::Limited
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TalentGrade::Exceptional => "天赋极佳",
            TalentGrade::Gifted => "天赋上佳",
            TalentGrade::Average => "中等水平",
            TalentGrade::Mediocre => "表现平庸",
            TalentGrade::Limited => "潜力有限",
        }
    }
}

/// Composite talent evaluation. Scores are rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TalentScore {
    pub baseline_score: f64,
    pub growth_score: f64,
    pub total: f64,
    pub grade: TalentGrade,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Growth is capped at twice the baseline, so it is halved before weighting.
pub fn talent_score(baseline: &AxisVector, growth: &AxisVector) -> TalentScore {
    let baseline_score = baseline.weighted_score();
    let growth_score = growth.weighted_score();
    let total = baseline_score * BASELINE_SCORE_WEIGHT + (growth_score / 2.0) * GROWTH_SCORE_WEIGHT;

    TalentScore {
        baseline_score: round2(baseline_score),
        growth_score: round2(growth_score),
        total: round2(total),
        grade: TalentGrade::from_score(total),
    }
}
