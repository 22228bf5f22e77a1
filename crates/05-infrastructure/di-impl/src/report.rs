//! 初始化报告

use infrastructure_common::TypeInfo;
use serde::Serialize;

/// 一次初始化的结果摘要
#[derive(Debug, Clone, Default, Serialize)]
pub struct InitReport {
    /// 创建的 bean，按创建顺序
    pub created: Vec<TypeInfo>,
    /// 没有组件标记而跳过的类型
    pub skipped: Vec<TypeInfo>,
    /// 织入的代理
    pub woven: Vec<WovenTarget>,
    /// 跳过的切面
    pub skipped_aspects: Vec<SkippedAspect>,
    /// 重新注入阶段重建的 bean
    pub rebuilt: Vec<TypeInfo>,
    /// 最终仍未解析的属性
    pub unresolved: Vec<UnresolvedAttribute>,
    /// 检测到的循环依赖
    pub cycles: Vec<Vec<TypeInfo>>,
    /// 初始化耗时，毫秒
    pub elapsed_ms: u64,
}

/// 织入记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WovenTarget {
    pub aspect: TypeInfo,
    pub target: TypeInfo,
    pub method: String,
}

/// 跳过的切面
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAspect {
    pub aspect: TypeInfo,
    pub reason: String,
}

/// 未解析的属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedAttribute {
    pub owner: TypeInfo,
    pub attribute: String,
    pub requested: TypeInfo,
}

impl InitReport {
    /// 是否织入过指定目标
    pub fn is_woven(&self, target: &TypeInfo) -> bool {
        self.woven.iter().any(|woven| &woven.target == target)
    }

    /// 是否在重新注入阶段重建过
    pub fn was_rebuilt(&self, owner: &TypeInfo) -> bool {
        self.rebuilt.contains(owner)
    }

    /// 是否存在循环依赖
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}
