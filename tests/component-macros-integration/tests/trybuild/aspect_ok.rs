use component_macros::{advice, Component};
use di_abstractions::{forward_capability, Describe};

pub trait Job: Send + Sync {
    fn run(&self) -> u32;
}

#[derive(Default, Component)]
#[component]
#[proxy(dyn Job)]
struct Backup;

impl Job for Backup {
    fn run(&self) -> u32 {
        0
    }
}

forward_capability! {
    impl Job for Backup {
        fn run(&self) -> u32;
    }
}

#[derive(Default, Component)]
#[aspect]
struct Timing;

#[advice]
impl Timing {
    #[pointcut("Backup::run()")]
    fn run_point(&self) {}

    #[before("run_point()")]
    fn start(&self) {}

    #[after("run_point()")]
    fn stop(&self) {}
}

fn main() {
    let descriptor = Timing::descriptor();
    assert!(descriptor.is_aspect());
    assert_eq!(descriptor.methods().len(), 3);
    assert!(Backup::descriptor().capabilities()[0].is_proxied());
}
