//! Where each canonical field may be found in older documents.
//!
//! Every chain lists candidate locations in priority order. The first
//! candidate that is present and has the expected shape is claimed: it is
//! removed from the source and written to the chain's target.

use serde_json::Value;

/// Keys that mark `角色` as a canonical domain rather than a bare identity.
pub const CHARACTER_DOMAIN_KEYS: &[&str] = &["身份", "属性", "背包", "装备"];

/// Keys that mark `世界` as a canonical domain rather than bare world info.
pub const WORLD_DOMAIN_KEYS: &[&str] = &["信息", "状态"];

/// Keys that mark `系统` as a canonical domain rather than bare config.
pub const SYSTEM_DOMAIN_KEYS: &[&str] =
    &["配置", "历史", "联机", "设置", "缓存", "行动队列", "扩展"];

/// One candidate location in a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The value at a dotted path.
    Path(&'static str),
    /// An object at `path` that is not itself a canonical domain, i.e. has
    /// none of `domain_keys`.
    Unshaped {
        path: &'static str,
        domain_keys: &'static [&'static str],
    },
    /// The value at `path`, wrapped as `{ key: value }`.
    Wrap {
        path: &'static str,
        key: &'static str,
    },
}

impl Source {
    pub fn path(&self) -> &'static str {
        match self {
            Source::Path(path) | Source::Unshaped { path, .. } | Source::Wrap { path, .. } => path,
        }
    }
}

/// Shape a candidate must have to be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Object,
    Array,
    /// A string or a number.
    Scalar,
    /// Anything but null.
    Present,
}

impl Expect {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Expect::Object => value.is_object(),
            Expect::Array => value.is_array(),
            Expect::Scalar => value.is_string() || value.is_number(),
            Expect::Present => !value.is_null(),
        }
    }
}

/// How a claimed value is written to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Merge the claimed object's keys over the skeleton's default.
    Overlay,
    /// Replace the skeleton's default.
    Replace,
}

/// A canonical target and its candidates.
#[derive(Debug, Clone, Copy)]
pub struct Chain {
    pub target: &'static str,
    pub expect: Expect,
    pub placement: Placement,
    pub sources: &'static [Source],
}

const fn overlay(target: &'static str, sources: &'static [Source]) -> Chain {
    Chain {
        target,
        expect: Expect::Object,
        placement: Placement::Overlay,
        sources,
    }
}

const fn replace(target: &'static str, expect: Expect, sources: &'static [Source]) -> Chain {
    Chain {
        target,
        expect,
        placement: Placement::Replace,
        sources,
    }
}

use Expect::{Array, Object, Present, Scalar};
use Source::{Path, Unshaped, Wrap};

/// All chains, in claiming order. Identity, location and effects come
/// before the status-like attribute objects they are nested in.
pub const CHAINS: &[Chain] = &[
    overlay(
        "角色.身份",
        &[
            Path("角色.身份"),
            Unshaped {
                path: "角色",
                domain_keys: CHARACTER_DOMAIN_KEYS,
            },
            Path("角色基础信息"),
            Path("玩家角色基础信息"),
            Path("玩家角色信息"),
            Path("玩家角色状态信息.角色"),
        ],
    ),
    overlay(
        "角色.位置",
        &[
            Path("角色.位置"),
            Path("位置"),
            Path("属性.位置"),
            Path("状态.位置"),
            Path("玩家角色状态.位置"),
            Path("玩家角色状态信息.位置"),
            Path("状态位置"),
        ],
    ),
    replace(
        "角色.效果",
        Array,
        &[
            Path("角色.效果"),
            Path("效果"),
            Path("修行状态"),
            Path("属性.状态效果"),
            Path("状态.状态效果"),
            Path("玩家角色状态.状态效果"),
            Path("状态效果"),
        ],
    ),
    overlay(
        "角色.属性",
        &[
            Path("角色.属性"),
            Path("属性"),
            Path("状态"),
            Path("玩家角色状态"),
            Path("玩家角色状态信息"),
        ],
    ),
    overlay("角色.背包", &[Path("角色.背包"), Path("背包")]),
    overlay(
        "角色.装备",
        &[Path("角色.装备"), Path("装备"), Path("装备栏")],
    ),
    overlay("角色.程序", &[Path("角色.程序"), Path("程序")]),
    overlay(
        "角色.训练",
        &[
            Path("角色.训练"),
            Path("训练"),
            Wrap {
                path: "训练程序",
                key: "训练程序",
            },
        ],
    ),
    overlay(
        "角色.流派",
        &[
            Path("角色.流派"),
            Path("流派"),
            Path("专精"),
            Wrap {
                path: "专精体系",
                key: "流派列表",
            },
        ],
    ),
    overlay(
        "角色.技能",
        &[
            Path("角色.技能"),
            Path("技能"),
            Wrap {
                path: "掌握技能",
                key: "掌握技能",
            },
        ],
    ),
    overlay(
        "角色.身体",
        &[
            Path("角色.身体"),
            Path("身体"),
            Wrap {
                path: "身体部位开发",
                key: "部位开发",
            },
        ],
    ),
    overlay(
        "社交.关系",
        &[Path("社交.关系"), Path("关系"), Path("人物关系")],
    ),
    replace(
        "社交.组织",
        Present,
        &[Path("社交.组织"), Path("组织"), Path("组织系统")],
    ),
    overlay(
        "社交.事件",
        &[Path("社交.事件"), Path("事件"), Path("事件系统")],
    ),
    overlay("社交.记忆", &[Path("社交.记忆"), Path("记忆")]),
    overlay(
        "世界.信息",
        &[
            Path("世界.信息"),
            Unshaped {
                path: "世界",
                domain_keys: WORLD_DOMAIN_KEYS,
            },
            Path("世界信息"),
            Path("worldInfo"),
        ],
    ),
    overlay("世界.状态", &[Path("世界.状态"), Path("世界状态")]),
    overlay(
        "系统.配置",
        &[
            Path("系统.配置"),
            Unshaped {
                path: "系统",
                domain_keys: SYSTEM_DOMAIN_KEYS,
            },
            Path("系统配置"),
        ],
    ),
    replace("系统.设置", Present, &[Path("系统.设置"), Path("设置")]),
    replace("系统.缓存", Present, &[Path("系统.缓存"), Path("缓存")]),
    replace(
        "系统.行动队列",
        Present,
        &[Path("系统.行动队列"), Path("行动队列")],
    ),
    replace(
        "系统.历史.叙事",
        Array,
        &[
            Path("系统.历史.叙事"),
            Path("历史.叙事"),
            Path("叙事历史"),
            Path("对话历史"),
        ],
    ),
    overlay("系统.联机", &[Path("系统.联机"), Path("联机")]),
    overlay("系统.扩展", &[Path("系统.扩展"), Path("扩展")]),
    replace(
        "元数据.时间",
        Object,
        &[Path("元数据.时间"), Path("时间"), Path("游戏时间")],
    ),
    replace(
        "元数据.存档ID",
        Scalar,
        &[Path("元数据.存档ID"), Path("存档ID")],
    ),
    replace(
        "元数据.存档名",
        Scalar,
        &[Path("元数据.存档名"), Path("存档名")],
    ),
    replace(
        "元数据.游戏版本",
        Scalar,
        &[Path("元数据.游戏版本"), Path("游戏版本")],
    ),
    replace(
        "元数据.创建时间",
        Scalar,
        &[Path("元数据.创建时间"), Path("创建时间")],
    ),
    replace(
        "元数据.游戏时长秒",
        Scalar,
        &[
            Path("元数据.游戏时长秒"),
            Path("游戏时长秒"),
            Path("元数据.游戏时长"),
            Path("游戏时长"),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_targets_are_unique() {
        let targets: HashSet<&str> = CHAINS.iter().map(|c| c.target).collect();
        assert_eq!(targets.len(), CHAINS.len());
    }

    #[test]
    fn test_canonical_location_comes_first() {
        for chain in CHAINS {
            assert_eq!(chain.sources[0], Path(chain.target), "{}", chain.target);
        }
    }

    #[test]
    fn test_expect_shapes() {
        assert!(Object.accepts(&json!({})));
        assert!(!Object.accepts(&json!([])));
        assert!(Scalar.accepts(&json!(3)));
        assert!(Scalar.accepts(&json!("x")));
        assert!(!Scalar.accepts(&json!(null)));
        assert!(Present.accepts(&json!(false)));
        assert!(!Present.accepts(&Value::Null));
    }
}
