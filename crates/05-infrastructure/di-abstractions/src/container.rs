//! 容器配置与初始化阶段

use serde::{Deserialize, Serialize};
use std::fmt;

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 多个实现满足同一能力时的选择规则
    pub capability_tie_break: CapabilityTieBreak,
    /// 检测到循环依赖时的处理方式
    pub circular_dependencies: CircularDependencyPolicy,
    /// 依赖无法解析时是否终止初始化
    pub fail_on_unresolved: bool,
}

impl ContainerConfig {
    /// 设置能力选择规则
    pub fn with_tie_break(mut self, tie_break: CapabilityTieBreak) -> Self {
        self.capability_tie_break = tie_break;
        self
    }

    /// 设置循环依赖处理方式
    pub fn with_circular_dependencies(mut self, policy: CircularDependencyPolicy) -> Self {
        self.circular_dependencies = policy;
        self
    }

    /// 设置依赖无法解析时是否终止初始化
    pub fn with_fail_on_unresolved(mut self, fail: bool) -> Self {
        self.fail_on_unresolved = fail;
        self
    }
}

/// 能力解析的候选排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityTieBreak {
    /// 按发现顺序，先发现者优先
    #[default]
    DiscoveryOrder,
    /// 按完整类型名的字典序
    TypeName,
}

/// 循环依赖处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircularDependencyPolicy {
    /// 记录警告，环上的 bean 各重建一次，可能保留过期引用
    #[default]
    Warn,
    /// 终止初始化
    Fail,
}

/// 初始化阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPhase {
    Discover,
    CreatePlainBeans,
    WeaveAspects,
    ReconcileInjections,
    Done,
}

impl InitPhase {
    /// 下一个阶段
    pub fn next(self) -> Self {
        match self {
            Self::Discover => Self::CreatePlainBeans,
            Self::CreatePlainBeans => Self::WeaveAspects,
            Self::WeaveAspects => Self::ReconcileInjections,
            Self::ReconcileInjections | Self::Done => Self::Done,
        }
    }
}

impl fmt::Display for InitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discover => "discover",
            Self::CreatePlainBeans => "create_plain_beans",
            Self::WeaveAspects => "weave_aspects",
            Self::ReconcileInjections => "reconcile_injections",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}
