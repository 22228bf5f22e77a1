//! 演示用组件：一位说唱歌手、他的歌迷和舞台

use component_macros::{advice, Component};
use di_abstractions::{forward_capability, TypeCatalog};
use std::sync::Arc;
use tracing::info;

/// 表演者
pub trait Performer: Send + Sync {
    /// 表演，返回歌词
    fn rap(&self) -> String;
}

/// 说唱歌手
#[derive(Debug, Default, Component)]
#[component]
#[proxy(dyn Performer)]
pub struct Rapper;

impl Performer for Rapper {
    fn rap(&self) -> String {
        println!("  rapper: 我是说唱歌手");
        "skr skr".to_string()
    }
}

forward_capability! {
    impl Performer for Rapper {
        fn rap(&self) -> String;
    }
}

/// 歌迷，在每次表演前后欢呼
#[derive(Debug, Default, Component)]
#[aspect]
pub struct Fans;

#[advice]
impl Fans {
    #[pointcut("demo.Rapper.rap()")]
    fn rap_point(&self) {}

    #[before("rap_point()")]
    fn say_yo(&self) {
        println!("  fans: yo");
    }

    #[after("rap_point()")]
    fn say_good(&self) {
        println!("  fans: good");
    }
}

/// 舞台，安排表演
#[derive(Default, Component)]
#[controller]
pub struct Stage {
    #[autowired]
    performer: Option<Arc<dyn Performer>>,
}

impl Stage {
    /// 开始演出，没有表演者时返回 `None`
    pub fn show(&self) -> Option<String> {
        let performer = self.performer.as_ref()?;
        info!("演出开始");
        Some(performer.rap())
    }
}

/// 演示目录
pub fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with::<Stage>()
        .with::<Rapper>()
        .with::<Fans>()
}
