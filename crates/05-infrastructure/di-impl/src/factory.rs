//! Bean 工厂
//!
//! 按阶段驱动一次完整的初始化：发现、创建普通 bean、织入切面、重新注入。
//! 所有 bean 先写入暂存注册表，只有全部阶段成功后才发布为 [`BeanContext`]。

use crate::aspect::{AspectResolution, AspectResolver};
use crate::capability::CapabilityIndex;
use crate::graph::{describe_cycle, DependencyGraph};
use crate::injector::{CapturedAttribute, DependencyInjector};
use crate::registry::BeanRegistry;
use crate::report::{InitReport, SkippedAspect, UnresolvedAttribute, WovenTarget};
use crate::weaver::ProxyWeaver;
use di_abstractions::{
    AspectProxy, BeanLookup, CircularDependencyPolicy, ComponentRegistry, ContainerConfig, InitPhase,
    TypeDescriptor,
};
use infrastructure_common::{Bean, DependencyError, TypeInfo};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Bean 工厂
#[derive(Debug, Clone, Default)]
pub struct BeanFactory {
    config: ContainerConfig,
}

impl BeanFactory {
    /// 使用指定配置创建工厂
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 初始化给定类型列表中的全部 bean
    ///
    /// 任一致命错误都会中止初始化，此时不会发布任何注册表。
    pub fn init_beans(&self, types: &[TypeDescriptor]) -> Result<BeanContext, DependencyError> {
        let started = Instant::now();
        let registry = BeanRegistry::new();
        let mut run = InitRun::discover(&self.config, types);

        run.advance();
        run.create_plain_beans(&registry)?;
        run.advance();
        run.weave_aspects(&registry)?;
        run.advance();
        run.reconcile_injections(&registry)?;
        run.advance();

        let InitRun {
            capabilities,
            mut report,
            ..
        } = run;
        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            "容器初始化完成: {} 个 bean，{} 个代理，{} 个重建，耗时 {}ms",
            registry.len(),
            report.woven.len(),
            report.rebuilt.len(),
            report.elapsed_ms
        );

        Ok(BeanContext {
            registry: Arc::new(registry),
            capabilities: Arc::new(capabilities),
            report: Arc::new(report),
        })
    }
}

/// 一次初始化的中间状态
struct InitRun<'a> {
    config: &'a ContainerConfig,
    phase: InitPhase,
    /// 全部输入类型，用于查找切点目标
    catalog: &'a [TypeDescriptor],
    plain: Vec<&'a TypeDescriptor>,
    aspects: Vec<&'a TypeDescriptor>,
    by_type: HashMap<TypeId, &'a TypeDescriptor>,
    capabilities: CapabilityIndex,
    /// 需要重新注入的 bean，保持创建顺序
    reinjection: Vec<TypeInfo>,
    captured: HashMap<TypeId, Vec<CapturedAttribute>>,
    report: InitReport,
}

impl<'a> InitRun<'a> {
    fn discover(config: &'a ContainerConfig, catalog: &'a [TypeDescriptor]) -> Self {
        info!("初始化阶段: {}，共 {} 个类型", InitPhase::Discover, catalog.len());

        let mut plain = Vec::new();
        let mut aspects = Vec::new();
        let mut by_type = HashMap::new();
        for descriptor in catalog {
            if by_type.contains_key(&descriptor.type_info().id) {
                warn!("类型 {} 重复出现，只处理第一次", descriptor.type_info());
                continue;
            }
            by_type.insert(descriptor.type_info().id, descriptor);
            if descriptor.is_aspect() {
                aspects.push(descriptor);
            } else {
                plain.push(descriptor);
            }
        }

        let capabilities = CapabilityIndex::build(plain.iter().copied(), config.capability_tie_break);
        debug!("发现 {} 个普通类型，{} 个切面", plain.len(), aspects.len());

        Self {
            config,
            phase: InitPhase::Discover,
            catalog,
            plain,
            aspects,
            by_type,
            capabilities,
            reinjection: Vec::new(),
            captured: HashMap::new(),
            report: InitReport::default(),
        }
    }

    fn advance(&mut self) {
        self.phase = self.phase.next();
        info!("初始化阶段: {}", self.phase);
    }

    fn injector<'r>(&'r self, registry: &'r BeanRegistry) -> DependencyInjector<'r> {
        DependencyInjector::new(registry, &self.capabilities)
    }

    fn create_plain_beans(&mut self, registry: &BeanRegistry) -> Result<(), DependencyError> {
        for descriptor in self.plain.clone() {
            let created = self.injector(registry).create_bean(descriptor)?;
            match created {
                Some(created) => {
                    let type_info = descriptor.type_info();
                    self.report.created.push(type_info);
                    if descriptor.has_injections() {
                        self.reinjection.push(type_info);
                        self.captured.insert(type_info.id, created.captured);
                    }
                }
                None => self.report.skipped.push(descriptor.type_info()),
            }
        }
        Ok(())
    }

    fn weave_aspects(&mut self, registry: &BeanRegistry) -> Result<(), DependencyError> {
        let resolver = AspectResolver::new(self.catalog);
        let weaver = ProxyWeaver::new(registry);

        for aspect in &self.aspects {
            match resolver.resolve_advice(aspect)? {
                AspectResolution::Woven(bundle) => {
                    let woven = WovenTarget {
                        aspect: bundle.aspect,
                        target: bundle.target.type_info(),
                        method: bundle.advice.method().to_string(),
                    };
                    weaver.create_proxy(bundle)?;
                    if self.report.is_woven(&woven.target) {
                        warn!("{} 被多个切面织入，只有最后一个生效", woven.target);
                    }
                    // 代理包装的是新实例，不再参与重新注入
                    self.reinjection.retain(|owner| owner != &woven.target);
                    self.captured.remove(&woven.target.id);
                    self.report.woven.push(woven);
                }
                AspectResolution::Skipped(reason) => {
                    self.report.skipped_aspects.push(SkippedAspect {
                        aspect: aspect.type_info(),
                        reason,
                    });
                }
            }
        }
        Ok(())
    }

    fn reconcile_injections(&mut self, registry: &BeanRegistry) -> Result<(), DependencyError> {
        let graph = self.dependency_graph(registry);
        let analysis = graph.analyze();

        if !analysis.cycles.is_empty() {
            let chains: Vec<String> = analysis.cycles.iter().map(|cycle| describe_cycle(cycle)).collect();
            match self.config.circular_dependencies {
                CircularDependencyPolicy::Fail => {
                    return Err(DependencyError::CircularDependency {
                        dependency_chain: chains.join("; "),
                    });
                }
                CircularDependencyPolicy::Warn => {
                    for chain in &chains {
                        warn!("检测到循环依赖: {}，环上的 bean 可能持有过期引用", chain);
                    }
                    self.report.cycles = analysis.cycles.clone();
                }
            }
        }

        for owner in analysis.order {
            let Some(descriptor) = self.by_type.get(&owner.id).copied() else {
                continue;
            };
            if !self.is_stale(owner, registry) {
                continue;
            }

            let rebuilt = self.injector(registry).create_bean(descriptor)?;
            if let Some(created) = rebuilt {
                debug!("重新注入: {}", owner);
                self.captured.insert(owner.id, created.captured);
                self.report.rebuilt.push(owner);
            }
        }

        self.report.unresolved = self.unresolved_attributes();
        for unresolved in &self.report.unresolved {
            warn!(
                "{}.{} 的依赖 {} 无法解析，属性保持为空",
                unresolved.owner.short_name(),
                unresolved.attribute,
                unresolved.requested
            );
        }
        if self.config.fail_on_unresolved {
            if let Some(first) = self.report.unresolved.first() {
                return Err(DependencyError::DependencyResolutionFailed {
                    type_name: first.owner.type_name.to_string(),
                    message: format!("属性 {} 的依赖 {} 无法解析", first.attribute, first.requested),
                });
            }
        }
        Ok(())
    }

    /// 以当前解析结果建立重新注入集合内的依赖关系
    fn dependency_graph(&self, registry: &BeanRegistry) -> DependencyGraph {
        let injector = self.injector(registry);
        let mut graph = DependencyGraph::new();
        for owner in &self.reinjection {
            graph.add_node(*owner);
        }
        for owner in &self.reinjection {
            let Some(descriptor) = self.by_type.get(&owner.id) else {
                continue;
            };
            for attribute in descriptor.attributes() {
                if let Some(bean) = injector.resolve(attribute.requested()) {
                    graph.add_dependency(*owner, bean.type_info());
                }
            }
        }
        graph
    }

    fn is_stale(&self, owner: TypeInfo, registry: &BeanRegistry) -> bool {
        let injector = self.injector(registry);
        self.captured
            .get(&owner.id)
            .map(|captured| {
                captured
                    .iter()
                    .any(|attribute| attribute.is_stale(injector.resolve(attribute.requested).as_ref()))
            })
            .unwrap_or(false)
    }

    fn unresolved_attributes(&self) -> Vec<UnresolvedAttribute> {
        self.reinjection
            .iter()
            .filter_map(|owner| self.captured.get(&owner.id).map(|captured| (owner, captured)))
            .flat_map(|(owner, captured)| {
                captured
                    .iter()
                    .filter(|attribute| attribute.bean.is_none())
                    .map(move |attribute| UnresolvedAttribute {
                        owner: *owner,
                        attribute: attribute.attribute.to_string(),
                        requested: attribute.requested,
                    })
            })
            .collect()
    }
}

/// 初始化完成后发布的容器上下文
///
/// 可以廉价克隆并跨线程共享
#[derive(Debug, Clone)]
pub struct BeanContext {
    registry: Arc<BeanRegistry>,
    capabilities: Arc<CapabilityIndex>,
    report: Arc<InitReport>,
}

impl BeanContext {
    /// 按类型键取 bean
    pub fn get_bean_by_type(&self, type_id: TypeId) -> Option<Bean> {
        self.registry.lookup(type_id)
    }

    /// 按类型键取 bean 的视图
    ///
    /// `K` 可以是具体类型，也可以是以 `K` 为键注册的 bean 所提供的能力
    pub fn get_bean<K>(&self) -> Option<Arc<K>>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        self.registry.get_bean::<K>()
    }

    /// 按注入规则解析：先按类型键查找，再按能力查找
    pub fn resolve<K>(&self) -> Option<Arc<K>>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        self.get_bean::<K>().or_else(|| {
            self.capabilities
                .resolve(TypeInfo::of::<K>(), self.registry.as_ref())
                .and_then(|bean| bean.view::<K>())
        })
    }

    /// 取织入到 `T` 上的切面代理
    pub fn get_proxy<T>(&self) -> Option<Arc<AspectProxy<T>>>
    where
        T: Send + Sync + 'static,
    {
        self.registry
            .lookup(TypeId::of::<T>())
            .filter(Bean::is_proxy)
            .and_then(|bean| bean.view::<AspectProxy<T>>())
    }

    /// 能力的全部已注册实现，按选择规则排序
    pub fn resolve_all<K>(&self) -> Vec<Arc<K>>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        self.capabilities
            .candidates(TypeId::of::<K>())
            .iter()
            .filter_map(|candidate| self.registry.lookup(candidate.id))
            .filter_map(|bean| bean.view::<K>())
            .collect()
    }

    /// 注册表
    pub fn registry(&self) -> &BeanRegistry {
        &self.registry
    }

    /// 已注册的 bean 数量
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// 是否没有任何 bean
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// 初始化报告
    pub fn report(&self) -> &InitReport {
        &self.report
    }
}
