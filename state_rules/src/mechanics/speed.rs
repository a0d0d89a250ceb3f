//! Progression speed, promotion-time estimates and progress plausibility.

use serde::{Deserialize, Serialize};

use super::{lerp, promotion_standard};
use crate::entities::{AxisVector, EffectKind, QualityTier, StatusEffect};

/// Progress per turn at every factor equal to one.
pub const BASE_SPEED: f64 = 1.0;

/// Default environment density when a location carries none.
pub const DEFAULT_DENSITY: f64 = 50.0;

/// Maximum environment bonus.
pub const MAX_ENVIRONMENT_BONUS: f64 = 0.5;

/// Tolerance over the theoretical maximum before a progress gain is
/// considered implausible.
pub const PROGRESS_TOLERANCE: f64 = 1.2;

/// One piecewise-linear segment of the density curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityBand {
    pub min: f64,
    pub max: f64,
    pub min_factor: f64,
    pub max_factor: f64,
    pub label: &'static str,
}

pub const DENSITY_BANDS: [DensityBand; 5] = [
    DensityBand {
        min: 1.0,
        max: 20.0,
        min_factor: 0.1,
        max_factor: 0.4,
        label: "信号稀薄",
    },
    DensityBand {
        min: 21.0,
        max: 40.0,
        min_factor: 0.4,
        max_factor: 0.7,
        label: "信号普通",
    },
    DensityBand {
        min: 41.0,
        max: 60.0,
        min_factor: 0.7,
        max_factor: 1.0,
        label: "信号充沛",
    },
    DensityBand {
        min: 61.0,
        max: 80.0,
        min_factor: 1.0,
        max_factor: 1.5,
        label: "信号浓郁",
    },
    DensityBand {
        min: 81.0,
        max: 100.0,
        min_factor: 1.5,
        max_factor: 2.0,
        label: "信号极盛",
    },
];

/// Band containing `density`. Values between two integer bands fall into
/// the upper one.
fn density_band(density: f64) -> &'static DensityBand {
    let density = if density.is_finite() {
        density.clamp(1.0, 100.0)
    } else {
        DEFAULT_DENSITY
    };
    DENSITY_BANDS
        .iter()
        .find(|band| density <= band.max)
        .unwrap_or(&DENSITY_BANDS[DENSITY_BANDS.len() - 1])
}

/// Density factor in `[0.1, 2.0]`.
pub fn density_factor(density: f64) -> f64 {
    let band = density_band(density);
    let density = if density.is_finite() { density } else { DEFAULT_DENSITY };
    lerp(density, band.min, band.max, band.min_factor, band.max_factor)
}

pub fn density_description(density: f64) -> &'static str {
    density_band(density).label
}

/// Baseline factor in `[0.5, 2.0]`.
pub fn baseline_factor(baseline: &AxisVector) -> f64 {
    lerp(baseline.weighted_score(), 0.0, 10.0, 0.5, 2.0)
}

/// Growth factor in `[0.0, 0.6]`.
pub fn growth_factor(growth: &AxisVector) -> f64 {
    lerp(growth.weighted_score(), 0.0, 20.0, 0.0, 0.6)
}

/// `baseline·0.7 + (1 + growth)·0.3`.
pub fn combined_axis_factor(baseline: &AxisVector, growth: &AxisVector) -> f64 {
    baseline_factor(baseline) * 0.7 + (1.0 + growth_factor(growth)) * 0.3
}

/// Status factor in `[0.5, 2.0]`. Each effect moves it by up to ±0.5.
pub fn status_factor(effects: &[StatusEffect]) -> f64 {
    let modifier: f64 = effects
        .iter()
        .map(|effect| {
            let m = effect.intensity_or_default() / 100.0 * 0.5;
            match effect.kind {
                EffectKind::Buff => m,
                EffectKind::Debuff => -m,
            }
        })
        .sum();
    (1.0 + modifier).clamp(0.5, 2.0)
}

/// `tier base bonus × proficiency / 100`.
pub fn technique_bonus(tier: QualityTier, proficiency: f64) -> f64 {
    tier.base_bonus() * proficiency / 100.0
}

/// Everything the speed computation reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedInput {
    pub density: f64,
    pub baseline: AxisVector,
    pub growth: AxisVector,
    pub effects: Vec<StatusEffect>,
    /// Quality tier and proficiency of the technique being trained.
    pub technique: Option<(QualityTier, f64)>,
    pub rank_name: String,
    pub rank_stage: String,
    pub progress: f64,
    pub required: f64,
    pub environment_bonus: f64,
}

/// Individual factors, kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedFactors {
    pub density: f64,
    pub baseline: f64,
    pub growth: f64,
    pub combined_axis: f64,
    pub status: f64,
    pub technique: f64,
    pub environment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedResult {
    pub base_speed: f64,
    pub combined_factor: f64,
    pub speed: f64,
    pub estimate: PromotionEstimate,
    pub factors: SpeedFactors,
}

/// `base × density × combined axis × status × (1 + technique + environment)`.
pub fn compute_speed(input: &SpeedInput) -> SpeedResult {
    let density = density_factor(input.density);
    let baseline = baseline_factor(&input.baseline);
    let growth = growth_factor(&input.growth);
    let combined_axis = baseline * 0.7 + (1.0 + growth) * 0.3;
    let status = status_factor(&input.effects);
    let technique = input
        .technique
        .map(|(tier, proficiency)| technique_bonus(tier, proficiency))
        .unwrap_or(0.0);
    let environment = input.environment_bonus.clamp(0.0, MAX_ENVIRONMENT_BONUS);

    let combined_factor = density * combined_axis * status * (1.0 + technique + environment);
    let speed = BASE_SPEED * combined_factor;

    let estimate = estimate_promotion(
        &input.rank_name,
        &input.rank_stage,
        input.required - input.progress,
        speed,
    );

    SpeedResult {
        base_speed: BASE_SPEED,
        combined_factor,
        speed,
        estimate,
        factors: SpeedFactors {
            density,
            baseline,
            growth,
            combined_axis,
            status,
            technique,
            environment,
        },
    }
}

/// How long until the next promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionEstimate {
    Eligible,
    /// No standard duration is known; abstract turns at the current speed.
    Turns(u64),
    /// In-game months derived from the standard duration.
    Months(u64),
}

impl std::fmt::Display for PromotionEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromotionEstimate::Eligible => write!(f, "已可晋升"),
            PromotionEstimate::Turns(n) => write!(f, "约{}回合", n),
            PromotionEstimate::Months(0) => write!(f, "不足一月"),
            PromotionEstimate::Months(m) if *m < 12 => write!(f, "约{}月", m),
            PromotionEstimate::Months(m) => {
                let (years, months) = (m / 12, m % 12);
                if months == 0 {
                    write!(f, "约{}年", years)
                } else {
                    write!(f, "约{}年{}月", years, months)
                }
            }
        }
    }
}

/// Estimate the time to promotion from the remaining progress.
pub fn estimate_promotion(rank: &str, stage: &str, remaining: f64, speed: f64) -> PromotionEstimate {
    if !(speed > 0.0) || !(remaining > 0.0) {
        return PromotionEstimate::Eligible;
    }

    match promotion_standard(rank, stage) {
        None => PromotionEstimate::Turns((remaining / speed).ceil() as u64),
        Some(standard) => {
            let months = (standard.standard_months as f64 * (remaining / 100.0) / speed).ceil();
            PromotionEstimate::Months(months.max(0.0) as u64)
        }
    }
}

/// Outcome of [`check_progress_gain`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressCheck {
    pub valid: bool,
    /// Theoretical maximum gain for the interval, absent when no standard
    /// applies.
    pub theoretical_max: Option<f64>,
    pub reason: String,
}

/// Reject progress gains over 120% of what the fastest documented duration
/// allows at `speed` over `elapsed_months`.
pub fn check_progress_gain(
    rank: &str,
    stage: &str,
    gain: f64,
    elapsed_months: f64,
    speed: f64,
) -> ProgressCheck {
    let Some(standard) = promotion_standard(rank, stage) else {
        return ProgressCheck {
            valid: true,
            theoretical_max: None,
            reason: "no promotion standard for this rank".to_string(),
        };
    };

    let per_month = 100.0 / standard.min_months as f64 * speed;
    let theoretical_max = per_month * elapsed_months;

    if gain > theoretical_max * PROGRESS_TOLERANCE {
        return ProgressCheck {
            valid: false,
            theoretical_max: Some(theoretical_max),
            reason: format!(
                "progress gain {} exceeds theoretical maximum {:.1}",
                gain, theoretical_max
            ),
        };
    }

    ProgressCheck {
        valid: true,
        theoretical_max: Some(theoretical_max),
        reason: "progress gain is plausible".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_input(baseline: f64, growth: f64) -> SpeedInput {
        SpeedInput {
            density: 50.0,
            baseline: AxisVector::splat(baseline),
            growth: AxisVector::splat(growth),
            effects: Vec::new(),
            technique: None,
            rank_name: "街头人".to_string(),
            rank_stage: "初期".to_string(),
            progress: 0.0,
            required: 100.0,
            environment_bonus: 0.0,
        }
    }

    #[test]
    fn test_density_factor_bands() {
        assert!((density_factor(1.0) - 0.1).abs() < 1e-12);
        assert!((density_factor(20.0) - 0.4).abs() < 1e-12);
        assert!((density_factor(100.0) - 2.0).abs() < 1e-12);
        assert!((density_factor(500.0) - 2.0).abs() < 1e-12);
        assert!((density_factor(-3.0) - 0.1).abs() < 1e-12);
        assert!((density_factor(20.5) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_density_description() {
        assert_eq!(density_description(10.0), "信号稀薄");
        assert_eq!(density_description(50.0), "信号充沛");
        assert_eq!(density_description(95.0), "信号极盛");
    }

    #[test]
    fn test_status_factor_bounds() {
        assert_eq!(status_factor(&[]), 1.0);

        let buffs: Vec<_> = (0..5)
            .map(|i| StatusEffect::new(format!("buff{}", i), EffectKind::Buff, Some(100.0)))
            .collect();
        assert_eq!(status_factor(&buffs), 2.0);

        let debuff = StatusEffect::new("过载", EffectKind::Debuff, None);
        assert!((status_factor(&[debuff]) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_technique_bonus() {
        assert!((technique_bonus(QualityTier::Heaven, 50.0) - 0.35).abs() < 1e-12);
        assert_eq!(technique_bonus(QualityTier::Common, 100.0), 0.0);
    }

    #[test]
    fn test_speed_regression_fixture() {
        let result = compute_speed(&uniform_input(6.0, 4.0));

        let density = 0.7 + 9.0 / 19.0 * 0.3;
        assert!((result.factors.density - density).abs() < 1e-12);
        assert!((result.factors.baseline - 1.4).abs() < 1e-12);
        assert!((result.factors.growth - 0.12).abs() < 1e-12);
        assert!((result.factors.combined_axis - 1.316).abs() < 1e-12);
        assert!((result.speed - density * 1.316).abs() < 1e-12);
    }

    #[test]
    fn test_environment_bonus_is_clamped() {
        let mut input = uniform_input(5.0, 0.0);
        input.environment_bonus = 3.0;
        let result = compute_speed(&input);
        assert_eq!(result.factors.environment, MAX_ENVIRONMENT_BONUS);
    }

    #[test]
    fn test_estimate_strings() {
        assert_eq!(estimate_promotion("街头人", "初期", 0.0, 1.0).to_string(), "已可晋升");
        assert_eq!(estimate_promotion("街头人", "初期", 50.0, 0.0).to_string(), "已可晋升");
        assert_eq!(estimate_promotion("企业特使", "初期", 10.0, 3.0).to_string(), "约4回合");
        assert_eq!(estimate_promotion("街头人", "初期", 50.0, 1.0).to_string(), "约6月");
        assert_eq!(estimate_promotion("跑者", "初期", 100.0, 1.0).to_string(), "约5年");
        assert_eq!(estimate_promotion("街头人", "中期", 100.0, 1.5).to_string(), "约1年4月");
        assert_eq!(PromotionEstimate::Months(0).to_string(), "不足一月");
    }

    #[test]
    fn test_progress_gain_check() {
        let ok = check_progress_gain("街头人", "初期", 30.0, 1.0, 1.0);
        assert!(ok.valid);

        let too_fast = check_progress_gain("街头人", "初期", 50.0, 1.0, 1.0);
        assert!(!too_fast.valid);
        assert!((too_fast.theoretical_max.unwrap() - 100.0 / 3.0).abs() < 1e-9);

        let unknown = check_progress_gain("企业特使", "初期", 1e9, 1.0, 1.0);
        assert!(unknown.valid);
        assert!(unknown.theoretical_max.is_none());
    }
}
