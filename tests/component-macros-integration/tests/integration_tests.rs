//! 声明式标记与 bean 工厂的端到端测试

use component_macros::{advice, Component};
use di_abstractions::{forward_capability, Describe, TypeCatalog};
use di_impl::BeanFactory;
use infrastructure_common::TypeInfo;
use std::sync::{Arc, Mutex};

static SHOW: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn record(line: &str) {
    SHOW.lock().unwrap().push(line.to_string());
}

pub trait Singer: Send + Sync {
    fn rap(&self) -> String;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Default, Component)]
#[component]
#[proxy(dyn Singer)]
pub struct Rapper;

impl Singer for Rapper {
    fn rap(&self) -> String {
        record("rap");
        "skr".to_string()
    }

    fn name(&self) -> &'static str {
        "rapper"
    }
}

forward_capability! {
    impl Singer for Rapper {
        fn rap(&self) -> String;
        fn name(&self) -> &'static str;
    }
}

#[derive(Default, Component)]
#[controller]
pub struct RapController {
    #[autowired]
    singer: Option<Arc<dyn Singer>>,
}

impl RapController {
    fn perform(&self) -> Option<String> {
        self.singer.as_ref().map(|singer| singer.rap())
    }
}

#[derive(Default, Component)]
#[component]
pub struct Playlist {
    #[autowired]
    controller: Option<Arc<RapController>>,
}

#[derive(Default, Component)]
#[aspect]
pub struct Fans;

#[advice]
impl Fans {
    #[pointcut("integration_tests::Rapper::rap()")]
    fn rap_point(&self) {}

    #[before("rap_point()")]
    fn say_yo(&self) {
        record("yo");
    }

    #[after("rap_point()")]
    fn say_good(&self) {
        record("good");
    }
}

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with::<RapController>()
        .with::<Playlist>()
        .with::<Rapper>()
        .with::<Fans>()
}

#[test]
fn test_rapper_scenario() -> anyhow::Result<()> {
    let context = BeanFactory::default().init_beans(catalog().descriptors())?;

    let playlist = context.get_bean::<Playlist>().unwrap();
    let controller = playlist.controller.clone().unwrap();
    assert!(Arc::ptr_eq(&controller, &context.get_bean::<RapController>().unwrap()));

    SHOW.lock().unwrap().clear();
    assert_eq!(controller.perform().as_deref(), Some("skr"));
    assert_eq!(*SHOW.lock().unwrap(), vec!["yo", "rap", "good"]);

    SHOW.lock().unwrap().clear();
    assert_eq!(controller.singer.as_ref().unwrap().name(), "rapper");
    assert!(SHOW.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_report_describes_the_run() -> anyhow::Result<()> {
    let context = BeanFactory::default().init_beans(catalog().descriptors())?;
    let report = context.report();

    assert_eq!(report.created.len(), 3);
    assert!(report.is_woven(&TypeInfo::of::<Rapper>()));
    assert!(report.was_rebuilt(&TypeInfo::of::<RapController>()));
    assert!(report.was_rebuilt(&TypeInfo::of::<Playlist>()));
    assert!(report.unresolved.is_empty());

    let json = serde_json::to_value(report)?;
    assert_eq!(json["woven"][0]["method"], "rap");
    assert_eq!(json["woven"][0]["aspect"], std::any::type_name::<Fans>());
    Ok(())
}

#[test]
fn test_catalog_lists_derived_types() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 4);
    assert!(Fans::descriptor().is_aspect());
    assert!(catalog.under("integration_tests").len() == 4);
}
