//! Rank tables: promotion durations and stage descriptions.

use crate::entities::MORTAL_RANK;

/// Stages a rank moves through, in order.
pub const RANK_STAGES: [&str; 4] = ["初期", "中期", "后期", "圆满"];

/// How many in-game months a rank stage takes at speed 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionStandard {
    pub rank: &'static str,
    pub stage: &'static str,
    pub min_months: u32,
    pub standard_months: u32,
    pub max_months: u32,
}

const fn standard(
    rank: &'static str,
    stage: &'static str,
    min_months: u32,
    standard_months: u32,
    max_months: u32,
) -> PromotionStandard {
    PromotionStandard {
        rank,
        stage,
        min_months,
        standard_months,
        max_months,
    }
}

pub const PROMOTION_STANDARDS: [PromotionStandard; 20] = [
    standard("街头人", "初期", 3, 12, 36),
    standard("街头人", "中期", 6, 24, 60),
    standard("街头人", "后期", 12, 36, 120),
    standard("街头人", "圆满", 24, 60, 240),
    standard("跑者", "初期", 12, 60, 180),
    standard("跑者", "中期", 24, 96, 300),
    standard("跑者", "后期", 36, 144, 480),
    standard("跑者", "圆满", 60, 240, 720),
    standard("潜影者", "初期", 60, 240, 600),
    standard("潜影者", "中期", 120, 360, 960),
    standard("潜影者", "后期", 180, 480, 1200),
    standard("潜影者", "圆满", 240, 720, 1800),
    standard("雇佣猎手", "初期", 240, 720, 1800),
    standard("雇佣猎手", "中期", 360, 1080, 2400),
    standard("雇佣猎手", "后期", 480, 1440, 3600),
    standard("雇佣猎手", "圆满", 720, 2160, 6000),
    standard("战术大师", "初期", 600, 1800, 6000),
    standard("战术大师", "中期", 960, 2880, 9600),
    standard("战术大师", "后期", 1440, 4320, 14400),
    standard("战术大师", "圆满", 2400, 7200, 24000),
];

pub fn promotion_standard(rank: &str, stage: &str) -> Option<&'static PromotionStandard> {
    PROMOTION_STANDARDS
        .iter()
        .find(|s| s.rank == rank && s.stage == stage)
}

/// Description for a character who has never been ranked.
pub const MORTAL_DESCRIPTION: &str = "身份未登记，完成首次任务以解锁基础权限";

const FALLBACK_DESCRIPTION: &str = "提升等级阶段，准备下一步升级";

/// Per-rank texts: `[初期, 中期, 后期, 圆满, no stage]`.
const RANK_DESCRIPTIONS: [(&str, [&str; 5]); 5] = [
    (
        "街头人",
        [
            "完成低风险委托，建立基础权限，准备迈向中期",
            "补强装备与关系网，提升行动效率，准备进入后期",
            "稳定资源渠道，扩展行动范围，准备阶段圆满",
            "完成基础认证，准备升级为跑者",
            "完成街区任务，稳固基础权限",
        ],
    ),
    (
        "跑者",
        [
            "适配基础义体，拓展委托网络，准备进入中期",
            "提升协作与效率，解锁更高风险任务，准备进入后期",
            "稳定战术流程，积累关键情报，准备阶段圆满",
            "获得稳定通行权限，准备升级为潜影者",
            "提升执行力与稳定性，推进跑者阶段",
        ],
    ),
    (
        "潜影者",
        [
            "强化渗透能力，优化隐匿流程，准备进入中期",
            "掌握关键节点，提升情报处理，准备进入后期",
            "稳定深度行动，扩展资源触达，准备阶段圆满",
            "完成高危认证，准备升级为雇佣猎手",
            "提升潜行与渗透效率，推进潜影者阶段",
        ],
    ),
    (
        "雇佣猎手",
        [
            "优化战术配置，提升火力效率，准备进入中期",
            "整合情报与火力，提升执行效率，准备进入后期",
            "稳定高危行动，建立团队影响力，准备阶段圆满",
            "完成关键任务链，准备升级为战术大师",
            "强化战术适配与执行力，推进雇佣猎手阶段",
        ],
    ),
    (
        "战术大师",
        [
            "建立指挥链路，提升战术协同，准备进入中期",
            "掌控多线行动，扩展资源调度，准备进入后期",
            "稳定局势操控，构建长线优势，准备阶段圆满",
            "完成核心协定，准备升级为企业特使",
            "优化指挥与调度，推进战术大师阶段",
        ],
    ),
];

const GENERIC_DESCRIPTIONS: [&str; 4] = [
    "稳固当前阶段，准备进入中期",
    "优化配置与流程，准备进入后期",
    "巩固关键能力，准备阶段圆满",
    "完成阶段目标，准备升级下一等级",
];

fn stage_index(stage: &str) -> Option<usize> {
    RANK_STAGES.iter().position(|s| *s == stage)
}

/// Synthesize a rank description from its name and stage.
///
/// Known ranks use their own table; an unknown stage on a known rank falls
/// back to that rank's stage-less text. Unknown ranks get a generic
/// stage-keyed message.
pub fn rank_description(rank: &str, stage: &str) -> &'static str {
    let rank = if rank.is_empty() { MORTAL_RANK } else { rank };
    if rank == MORTAL_RANK {
        return MORTAL_DESCRIPTION;
    }

    if let Some((_, texts)) = RANK_DESCRIPTIONS.iter().find(|(name, _)| *name == rank) {
        return match stage_index(stage) {
            Some(i) => texts[i],
            None => texts[4],
        };
    }

    match stage_index(stage) {
        Some(i) => GENERIC_DESCRIPTIONS[i],
        None => FALLBACK_DESCRIPTION,
    }
}

/// Display form of a rank: `name·stage`, or the bare name for the mortal
/// rank and stage-less ranks.
pub fn format_rank(rank: &str, stage: &str) -> String {
    if rank.is_empty() {
        return MORTAL_RANK.to_string();
    }
    if rank == MORTAL_RANK || stage.is_empty() {
        return rank.to_string();
    }
    format!("{}·{}", rank, stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_standard_lookup() {
        let s = promotion_standard("跑者", "后期").unwrap();
        assert_eq!(s.min_months, 36);
        assert_eq!(s.standard_months, 144);
        assert_eq!(s.max_months, 480);
        assert!(promotion_standard("跑者", "极境").is_none());
        assert!(promotion_standard("企业特使", "初期").is_none());
    }

    #[test]
    fn test_standards_are_ordered() {
        for s in PROMOTION_STANDARDS.iter() {
            assert!(s.min_months <= s.standard_months);
            assert!(s.standard_months <= s.max_months);
        }
    }

    #[test]
    fn test_known_rank_descriptions() {
        assert_eq!(
            rank_description("街头人", "初期"),
            "完成低风险委托，建立基础权限，准备迈向中期"
        );
        assert_eq!(rank_description("跑者", "未知"), "提升执行力与稳定性，推进跑者阶段");
        assert_eq!(rank_description("", ""), MORTAL_DESCRIPTION);
        assert_eq!(rank_description(MORTAL_RANK, "初期"), MORTAL_DESCRIPTION);
    }

    #[test]
    fn test_unknown_rank_uses_generic_text() {
        assert_eq!(rank_description("企业特使", "中期"), "优化配置与流程，准备进入后期");
        assert_eq!(rank_description("企业特使", ""), "提升等级阶段，准备下一步升级");
    }

    #[test]
    fn test_format_rank() {
        assert_eq!(format_rank("潜影者", "中期"), "潜影者·中期");
        assert_eq!(format_rank(MORTAL_RANK, "初期"), "凡人");
        assert_eq!(format_rank("跑者", ""), "跑者");
        assert_eq!(format_rank("", ""), "凡人");
    }
}
