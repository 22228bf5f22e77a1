//! Bean 工厂的集成测试

use di_abstractions::{
    forward_capability, BeanLookup, CapabilityTieBreak, CircularDependencyPolicy, ComponentType,
    ContainerConfig, TypeDescriptor,
};
use di_impl::BeanFactory;
use infrastructure_common::{DependencyError, TypeInfo};
use stage::{Fans, Performer};
use std::any::TypeId;
use std::sync::{Arc, Mutex};

/// 最简单的两个组件：B 注入 A
mod plain {
    use super::*;

    #[derive(Debug, Default)]
    pub struct TypeA;

    #[derive(Debug, Default)]
    pub struct TypeB {
        pub field_a: Option<Arc<TypeA>>,
    }

    #[derive(Debug, Default)]
    pub struct Unmarked;

    pub fn types() -> Vec<TypeDescriptor> {
        vec![
            ComponentType::<TypeA>::component().with_default().build(),
            ComponentType::<TypeB>::component()
                .with_default()
                .autowired("field_a", |this: &mut TypeB, value: Option<Arc<TypeA>>| this.field_a = value)
                .build(),
            ComponentType::<Unmarked>::new().with_default().build(),
        ]
    }
}

/// 切面场景：Fans 在 Rapper::rap 前后喊话
mod stage {
    use super::*;

    pub static EVENTS: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

    pub trait Performer: Send + Sync {
        fn rap(&self) -> &'static str;
        fn bow(&self) -> &'static str;
    }

    #[derive(Debug, Default)]
    pub struct Rapper;

    impl Performer for Rapper {
        fn rap(&self) -> &'static str {
            EVENTS.lock().unwrap().push("rap");
            "yo yo"
        }

        fn bow(&self) -> &'static str {
            "thanks"
        }
    }

    forward_capability! {
        impl Performer for Rapper {
            fn rap(&self) -> &'static str;
            fn bow(&self) -> &'static str;
        }
    }

    #[derive(Debug, Default)]
    pub struct Fans;

    /// 在织入之前创建，持有能力和具体类型两种引用
    #[derive(Default)]
    pub struct Host {
        pub performer: Option<Arc<dyn Performer>>,
        pub rapper: Option<Arc<Rapper>>,
    }

    /// 依赖 Host，Host 重建后它也需要重建
    #[derive(Default)]
    pub struct Venue {
        pub host: Option<Arc<Host>>,
    }

    pub fn rapper() -> TypeDescriptor {
        ComponentType::<Rapper>::component()
            .with_default()
            .proxied(
                |bean| -> Arc<dyn Performer> { bean },
                |proxy| -> Arc<dyn Performer> { proxy },
            )
            .build()
    }

    pub fn fans() -> TypeDescriptor {
        ComponentType::<Fans>::aspect()
            .with_default()
            .pointcut("rap_point", "stage::Rapper::rap()")
            .before("say_yo", "rap_point()", |_: &Fans| EVENTS.lock().unwrap().push("before"))
            .after("say_good", "rap_point()", |_: &Fans| EVENTS.lock().unwrap().push("after"))
            .build()
    }

    pub fn types() -> Vec<TypeDescriptor> {
        vec![
            rapper(),
            ComponentType::<Host>::controller()
                .with_default()
                .autowired("performer", |this: &mut Host, value: Option<Arc<dyn Performer>>| {
                    this.performer = value
                })
                .autowired("rapper", |this: &mut Host, value: Option<Arc<Rapper>>| this.rapper = value)
                .build(),
            ComponentType::<Venue>::component()
                .with_default()
                .autowired("host", |this: &mut Venue, value: Option<Arc<Host>>| this.host = value)
                .build(),
            fans(),
        ]
    }
}

/// 循环依赖：Left <-> Right，Lone 不在环上
mod cycle {
    use super::*;

    #[derive(Default)]
    pub struct Left {
        pub right: Option<Arc<Right>>,
    }

    #[derive(Default)]
    pub struct Right {
        pub left: Option<Arc<Left>>,
    }

    #[derive(Debug, Default)]
    pub struct Leaf;

    #[derive(Default)]
    pub struct Lone {
        pub leaf: Option<Arc<Leaf>>,
    }

    pub fn types() -> Vec<TypeDescriptor> {
        vec![
            ComponentType::<Left>::component()
                .with_default()
                .autowired("right", |this: &mut Left, value: Option<Arc<Right>>| this.right = value)
                .build(),
            ComponentType::<Right>::component()
                .with_default()
                .autowired("left", |this: &mut Right, value: Option<Arc<Left>>| this.left = value)
                .build(),
            ComponentType::<Lone>::component()
                .with_default()
                .autowired("leaf", |this: &mut Lone, value: Option<Arc<Leaf>>| this.leaf = value)
                .build(),
            ComponentType::<Leaf>::component().with_default().build(),
        ]
    }
}

/// 同一能力的多个实现
mod storage {
    use super::*;

    pub trait Store: Send + Sync {
        fn kind(&self) -> &'static str;
    }

    #[derive(Default)]
    pub struct ZetaStore;

    #[derive(Default)]
    pub struct AlphaStore;

    impl Store for ZetaStore {
        fn kind(&self) -> &'static str {
            "zeta"
        }
    }

    impl Store for AlphaStore {
        fn kind(&self) -> &'static str {
            "alpha"
        }
    }

    #[derive(Default)]
    pub struct Archive {
        pub store: Option<Arc<dyn Store>>,
    }

    pub fn types() -> Vec<TypeDescriptor> {
        vec![
            ComponentType::<Archive>::component()
                .with_default()
                .autowired("store", |this: &mut Archive, value: Option<Arc<dyn Store>>| this.store = value)
                .build(),
            ComponentType::<ZetaStore>::component()
                .with_default()
                .provides(|bean| -> Arc<dyn Store> { bean })
                .build(),
            ComponentType::<AlphaStore>::component()
                .with_default()
                .provides(|bean| -> Arc<dyn Store> { bean })
                .build(),
        ]
    }
}

#[test]
fn test_plain_components_are_registered() -> anyhow::Result<()> {
    let context = BeanFactory::default().init_beans(&plain::types())?;

    assert!(context.get_bean::<plain::TypeA>().is_some());
    let bean = context.get_bean_by_type(TypeId::of::<plain::TypeA>()).unwrap();
    assert_eq!(bean.type_info(), TypeInfo::of::<plain::TypeA>());
    assert!(!bean.is_proxy());
    Ok(())
}

#[test]
fn test_concrete_injection_shares_registered_instance() -> anyhow::Result<()> {
    let context = BeanFactory::default().init_beans(&plain::types())?;

    let a = context.get_bean::<plain::TypeA>().unwrap();
    let b = context.get_bean::<plain::TypeB>().unwrap();
    assert!(Arc::ptr_eq(b.field_a.as_ref().unwrap(), &a));
    Ok(())
}

#[test]
fn test_unmarked_types_are_never_registered() -> anyhow::Result<()> {
    let context = BeanFactory::default().init_beans(&plain::types())?;

    assert!(context.get_bean::<plain::Unmarked>().is_none());
    assert_eq!(context.report().skipped, vec![TypeInfo::of::<plain::Unmarked>()]);
    assert_eq!(context.len(), 2);
    Ok(())
}

#[test]
fn test_single_capability_implementation_is_injected() -> anyhow::Result<()> {
    let types = vec![
        storage::types()[0].clone(),
        storage::types()[1].clone(),
    ];
    let context = BeanFactory::default().init_beans(&types)?;

    let archive = context.get_bean::<storage::Archive>().unwrap();
    assert_eq!(archive.store.as_ref().unwrap().kind(), "zeta");
    Ok(())
}

#[test]
fn test_capability_tie_break_policies() -> anyhow::Result<()> {
    let by_discovery = BeanFactory::default().init_beans(&storage::types())?;
    let archive = by_discovery.get_bean::<storage::Archive>().unwrap();
    assert_eq!(archive.store.as_ref().unwrap().kind(), "zeta");
    assert_eq!(by_discovery.resolve_all::<dyn storage::Store>().len(), 2);

    let config = ContainerConfig::default().with_tie_break(CapabilityTieBreak::TypeName);
    let by_name = BeanFactory::new(config).init_beans(&storage::types())?;
    let archive = by_name.get_bean::<storage::Archive>().unwrap();
    assert_eq!(archive.store.as_ref().unwrap().kind(), "alpha");
    assert_eq!(by_name.resolve::<dyn storage::Store>().unwrap().kind(), "alpha");
    Ok(())
}

#[test]
fn test_weaving_replaces_target_and_rewires_dependents() -> anyhow::Result<()> {
    let context = BeanFactory::default().init_beans(&stage::types())?;

    // 注册表中的目标已经是代理
    let target = context.get_bean_by_type(TypeId::of::<stage::Rapper>()).unwrap();
    assert!(target.is_proxy());
    assert!(context.get_proxy::<stage::Rapper>().is_some());
    assert!(context.get_bean::<Fans>().is_none());

    // 织入前创建的 Host 重新注入后引用代理
    let host = context.get_bean::<stage::Host>().unwrap();
    let proxied = target.view::<dyn stage::Performer>().unwrap();
    assert!(Arc::ptr_eq(host.performer.as_ref().unwrap(), &proxied));

    // 按具体类型注入的引用指向代理内部的目标
    let wrapped = context.get_proxy::<stage::Rapper>().unwrap();
    let concrete = context.get_bean::<stage::Rapper>().unwrap();
    assert!(Arc::ptr_eq(&concrete, wrapped.target()));
    assert!(Arc::ptr_eq(host.rapper.as_ref().unwrap(), &concrete));

    // 依赖 Host 的 Venue 也随之重建
    let venue = context.get_bean::<stage::Venue>().unwrap();
    assert!(Arc::ptr_eq(venue.host.as_ref().unwrap(), &host));

    let report = context.report();
    assert!(report.is_woven(&TypeInfo::of::<stage::Rapper>()));
    assert!(report.was_rebuilt(&TypeInfo::of::<stage::Host>()));
    assert!(report.was_rebuilt(&TypeInfo::of::<stage::Venue>()));
    assert!(report.unresolved.is_empty());
    Ok(())
}

#[test]
fn test_concrete_dependency_on_woven_type_is_resolved_under_strict_mode() -> anyhow::Result<()> {
    let strict = ContainerConfig::default().with_fail_on_unresolved(true);
    let context = BeanFactory::new(strict).init_beans(&stage::types())?;

    let host = context.get_bean::<stage::Host>().unwrap();
    stage::EVENTS.lock().unwrap().clear();
    assert_eq!(host.rapper.as_ref().unwrap().bow(), "thanks");
    assert!(context.report().unresolved.is_empty());
    Ok(())
}

#[test]
fn test_aspect_on_unmarked_type_is_skipped() -> anyhow::Result<()> {
    let aspect = ComponentType::<Fans>::aspect()
        .with_default()
        .pointcut("polish_point", "plain::Unmarked::polish()")
        .before("shine", "polish_point()", |_: &Fans| {})
        .build();
    let mut types = plain::types();
    types.push(aspect);

    let context = BeanFactory::default().init_beans(&types)?;
    assert!(context.get_bean_by_type(TypeId::of::<plain::Unmarked>()).is_none());
    assert!(context.get_proxy::<plain::Unmarked>().is_none());

    let report = context.report();
    assert!(report.woven.is_empty());
    assert_eq!(report.skipped_aspects.len(), 1);
    assert_eq!(report.skipped_aspects[0].aspect, TypeInfo::of::<Fans>());
    Ok(())
}

#[test]
fn test_advice_runs_around_intercepted_method_once() -> anyhow::Result<()> {
    let context = BeanFactory::default().init_beans(&stage::types())?;
    let host = context.get_bean::<stage::Host>().unwrap();
    let performer = host.performer.clone().unwrap();

    stage::EVENTS.lock().unwrap().clear();
    assert_eq!(performer.rap(), "yo yo");
    assert_eq!(*stage::EVENTS.lock().unwrap(), vec!["before", "rap", "after"]);

    stage::EVENTS.lock().unwrap().clear();
    assert_eq!(performer.bow(), "thanks");
    assert!(stage::EVENTS.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_cycles_warn_by_default() -> anyhow::Result<()> {
    let context = BeanFactory::default().init_beans(&cycle::types())?;

    let report = context.report();
    assert!(report.has_cycles());
    assert_eq!(report.cycles[0].len(), 2);

    let left = context.get_bean::<cycle::Left>().unwrap();
    let right = context.get_bean::<cycle::Right>().unwrap();
    assert!(Arc::ptr_eq(left.right.as_ref().unwrap(), &right));
    assert!(right.left.is_some());

    // 不在环上的 bean 不受影响
    let lone = context.get_bean::<cycle::Lone>().unwrap();
    let leaf = context.get_bean::<cycle::Leaf>().unwrap();
    assert!(Arc::ptr_eq(lone.leaf.as_ref().unwrap(), &leaf));
    Ok(())
}

#[test]
fn test_cycles_can_fail_initialization() {
    let config = ContainerConfig::default().with_circular_dependencies(CircularDependencyPolicy::Fail);
    let result = BeanFactory::new(config).init_beans(&cycle::types());

    match result {
        Err(DependencyError::CircularDependency { dependency_chain }) => {
            assert!(dependency_chain.contains("Left"));
            assert!(dependency_chain.contains("Right"));
        }
        other => panic!("expected circular dependency error, got {other:?}"),
    }
}

#[test]
fn test_unknown_pointcut_target_is_fatal() {
    let aspect = ComponentType::<Fans>::aspect()
        .with_default()
        .pointcut("rap_point", "stage::Drummer::drum()")
        .before("say_yo", "rap_point()", |_: &Fans| {})
        .build();
    let types = vec![stage::rapper(), aspect];

    let result = BeanFactory::default().init_beans(&types);
    assert!(matches!(
        result,
        Err(DependencyError::AspectTargetNotFound { .. })
    ));
}

#[test]
fn test_unresolved_dependency_policy() -> anyhow::Result<()> {
    let types = vec![plain::types()[1].clone()];

    let lenient = BeanFactory::default().init_beans(&types)?;
    assert!(lenient.get_bean::<plain::TypeB>().unwrap().field_a.is_none());
    assert_eq!(lenient.report().unresolved.len(), 1);

    let strict = ContainerConfig::default().with_fail_on_unresolved(true);
    let result = BeanFactory::new(strict.clone()).init_beans(&types);
    assert!(matches!(
        result,
        Err(DependencyError::DependencyResolutionFailed { .. })
    ));

    // 前向引用在重新注入后可以解析，不算失败
    let mut forward = plain::types();
    forward.swap(0, 1);
    assert!(BeanFactory::new(strict).init_beans(&forward).is_ok());
    Ok(())
}

#[test]
fn test_construction_failure_publishes_nothing() {
    #[derive(Debug)]
    struct Flaky;

    let mut types = plain::types();
    types.push(
        ComponentType::<Flaky>::component()
            .with_constructor(|| Err::<Flaky, _>(std::io::Error::new(std::io::ErrorKind::NotConnected, "no socket")))
            .build(),
    );

    let result = BeanFactory::default().init_beans(&types);
    assert!(matches!(
        result,
        Err(DependencyError::ComponentCreationFailed { .. })
    ));
}

#[test]
fn test_runs_are_independent() -> anyhow::Result<()> {
    let factory = BeanFactory::default();
    let first = factory.init_beans(&plain::types())?;
    let second = factory.init_beans(&plain::types())?;

    let a1 = first.get_bean::<plain::TypeA>().unwrap();
    let a2 = second.get_bean::<plain::TypeA>().unwrap();
    assert!(!Arc::ptr_eq(&a1, &a2));
    assert!(first.registry().get_bean::<plain::TypeB>().is_some());
    Ok(())
}
