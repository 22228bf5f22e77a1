//! 依赖关系图
//!
//! 用于重新注入阶段：节点是需要重新注入的 bean，边指向它当前解析到的依赖

use infrastructure_common::TypeInfo;
use std::any::TypeId;
use std::collections::HashMap;

/// 依赖关系图
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// 节点，保持加入顺序
    nodes: Vec<TypeInfo>,
    /// 邻接表：依赖者 -> 依赖
    adjacency_list: HashMap<TypeId, Vec<TypeInfo>>,
}

/// 图的遍历结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphAnalysis {
    /// 依赖在前、依赖者在后的处理顺序
    pub order: Vec<TypeInfo>,
    /// 检测到的循环，每个循环按依赖方向列出
    pub cycles: Vec<Vec<TypeInfo>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl DependencyGraph {
    /// 创建空图
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点，重复添加会被忽略
    pub fn add_node(&mut self, node: TypeInfo) {
        if !self.contains(node.id) {
            self.nodes.push(node);
        }
    }

    /// 添加依赖关系
    pub fn add_dependency(&mut self, dependent: TypeInfo, dependency: TypeInfo) {
        let dependencies = self.adjacency_list.entry(dependent.id).or_default();
        if !dependencies.contains(&dependency) {
            dependencies.push(dependency);
        }
    }

    /// 一次深度优先遍历，同时得到依赖优先的处理顺序和循环
    ///
    /// 环上的节点按完成顺序排列；指向图外节点的边不参与遍历
    pub fn analyze(&self) -> GraphAnalysis {
        let mut marks = HashMap::new();
        let mut path = Vec::new();
        let mut analysis = GraphAnalysis::default();

        for node in &self.nodes {
            if !marks.contains_key(&node.id) {
                self.visit(*node, &mut marks, &mut path, &mut analysis);
            }
        }

        analysis
    }

    fn contains(&self, id: TypeId) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    fn dependencies(&self, node: TypeId) -> &[TypeInfo] {
        self.adjacency_list
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn visit(
        &self,
        node: TypeInfo,
        marks: &mut HashMap<TypeId, Mark>,
        path: &mut Vec<TypeInfo>,
        analysis: &mut GraphAnalysis,
    ) {
        marks.insert(node.id, Mark::Visiting);
        path.push(node);

        for dependency in self.dependencies(node.id) {
            if !self.contains(dependency.id) {
                continue;
            }
            match marks.get(&dependency.id).copied() {
                Some(Mark::Visiting) => {
                    if let Some(start) = path.iter().position(|n| n == dependency) {
                        analysis.cycles.push(path[start..].to_vec());
                    }
                }
                Some(Mark::Done) => {}
                None => self.visit(*dependency, marks, path, analysis),
            }
        }

        path.pop();
        marks.insert(node.id, Mark::Done);
        analysis.order.push(node);
    }
}

/// 把循环格式化为 `A -> B -> A`
pub fn describe_cycle(cycle: &[TypeInfo]) -> String {
    let mut names: Vec<&str> = cycle.iter().map(|node| node.short_name()).collect();
    if let Some(first) = names.first().copied() {
        names.push(first);
    }
    names.join(" -> ")
}
