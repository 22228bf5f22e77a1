use component_macros::Component;
use di_abstractions::Describe;
use std::sync::Arc;

pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Default, Component)]
#[component]
#[provides(dyn Clock)]
struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        1
    }
}

#[derive(Default, Component)]
#[controller]
struct Scheduler {
    #[autowired]
    clock: Option<Arc<dyn Clock>>,
}

fn main() {
    assert!(SystemClock::descriptor().is_bean());
    let scheduler = Scheduler::descriptor();
    assert_eq!(scheduler.attributes()[0].name(), "clock");
    assert!(Scheduler::default().clock.is_none());
}
