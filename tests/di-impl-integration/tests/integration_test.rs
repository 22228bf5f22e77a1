//! 扫描器、工厂与并发读取的端到端测试

use async_trait::async_trait;
use di_abstractions::{
    forward_capability, ComponentType, ContainerConfig, TypeCatalog, TypeDescriptor, TypeScanner,
};
use di_impl::{BeanContext, BeanFactory};
use infrastructure_common::{ComponentError, TypeInfo};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod app {
    pub mod repository {
        use std::sync::Arc;

        pub trait OrderRepository: Send + Sync {
            fn count(&self) -> usize;
        }

        #[derive(Debug, Default)]
        pub struct MemoryOrders;

        impl OrderRepository for MemoryOrders {
            fn count(&self) -> usize {
                3
            }
        }

        #[derive(Default)]
        pub struct Reports {
            pub orders: Option<Arc<dyn OrderRepository>>,
        }
    }

    pub mod web {
        use super::repository::OrderRepository;
        use std::sync::Arc;

        pub trait Handler: Send + Sync {
            fn handle(&self) -> String;
        }

        #[derive(Default)]
        pub struct OrderController {
            pub orders: Option<Arc<dyn OrderRepository>>,
        }

        impl Handler for OrderController {
            fn handle(&self) -> String {
                let count = self.orders.as_ref().map(|orders| orders.count()).unwrap_or(0);
                format!("{count} orders")
            }
        }
    }

    pub mod audit {
        #[derive(Debug, Default)]
        pub struct RequestAudit;
    }
}

use app::repository::{MemoryOrders, OrderRepository, Reports};
use app::web::{Handler, OrderController};

static AUDITED: AtomicUsize = AtomicUsize::new(0);

forward_capability! {
    impl Handler for OrderController {
        fn handle(&self) -> String;
    }
}

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with_descriptor(
            ComponentType::<OrderController>::controller()
                .with_default()
                .proxied(
                    |bean| -> Arc<dyn Handler> { bean },
                    |proxy| -> Arc<dyn Handler> { proxy },
                )
                .autowired("orders", |this: &mut OrderController, value: Option<Arc<dyn OrderRepository>>| {
                    this.orders = value
                })
                .build(),
        )
        .with_descriptor(
            ComponentType::<Reports>::component()
                .with_default()
                .autowired("orders", |this: &mut Reports, value: Option<Arc<dyn OrderRepository>>| {
                    this.orders = value
                })
                .build(),
        )
        .with_descriptor(
            ComponentType::<MemoryOrders>::component()
                .with_default()
                .provides(|bean| -> Arc<dyn OrderRepository> { bean })
                .build(),
        )
        .with_descriptor(
            ComponentType::<app::audit::RequestAudit>::aspect()
                .with_default()
                .pointcut("handle_point", "web.OrderController.handle()")
                .before("count", "handle_point()", |_: &app::audit::RequestAudit| {
                    AUDITED.fetch_add(1, Ordering::SeqCst);
                })
                .build(),
        )
}

/// 从内存目录按命名空间取类型
struct MemoryScanner {
    catalog: TypeCatalog,
}

#[async_trait]
impl TypeScanner for MemoryScanner {
    async fn scan(&self, namespace: &str) -> Result<Vec<TypeDescriptor>, ComponentError> {
        let found = self.catalog.under(namespace);
        if found.is_empty() {
            return Err(ComponentError::scan_error(format!("命名空间 {namespace} 下没有类型")));
        }
        Ok(found)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

async fn scan_all(scanner: &dyn TypeScanner, namespaces: &[&str]) -> anyhow::Result<Vec<TypeDescriptor>> {
    let mut merged = TypeCatalog::new();
    for namespace in namespaces {
        for descriptor in scanner.scan(namespace).await? {
            merged.add(descriptor);
        }
    }
    Ok(merged.descriptors().to_vec())
}

async fn boot() -> anyhow::Result<BeanContext> {
    let scanner = MemoryScanner { catalog: catalog() };
    let types = scan_all(&scanner, &["app::web", "app::repository", "app::audit", "app"]).await?;
    Ok(BeanFactory::new(ContainerConfig::default()).init_beans(&types)?)
}

#[tokio::test]
async fn test_scanned_types_are_wired() -> anyhow::Result<()> {
    let context = boot().await?;

    let reports = context.get_bean::<Reports>().unwrap();
    assert_eq!(reports.orders.as_ref().unwrap().count(), 3);
    assert_eq!(context.report().created.len(), 3);
    assert_eq!(context.report().woven.len(), 1);
    assert!(context.report().is_woven(&TypeInfo::of::<OrderController>()));
    Ok(())
}

#[tokio::test]
async fn test_proxy_wraps_fresh_target() -> anyhow::Result<()> {
    let context = boot().await?;

    // 代理包装的是新建的目标实例，没有经过注入
    let proxy = context.get_proxy::<OrderController>().unwrap();
    assert!(proxy.target().orders.is_none());

    let before = AUDITED.load(Ordering::SeqCst);
    let handler = context.resolve::<dyn Handler>().unwrap();
    assert_eq!(handler.handle(), "0 orders");
    assert!(AUDITED.load(Ordering::SeqCst) > before);
    Ok(())
}

#[tokio::test]
async fn test_unknown_namespace_is_a_scan_error() {
    let scanner = MemoryScanner { catalog: catalog() };
    let result = scanner.scan("billing").await;
    assert!(matches!(result, Err(ComponentError::ScanError { .. })));
    assert_eq!(scanner.name(), "memory");
}

#[tokio::test]
async fn test_concurrent_lookups_after_init() -> anyhow::Result<()> {
    let context = boot().await?;

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let context = context.clone();
            tokio::spawn(async move {
                let reports = context.get_bean::<Reports>()?;
                let orders = context.resolve::<dyn OrderRepository>()?;
                Some(reports.orders.as_ref()?.count() + orders.count())
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await?, Some(6));
    }
    Ok(())
}
