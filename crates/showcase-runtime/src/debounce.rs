//! 취소 가능한 디바운스 타이머.
//!
//! 알림이 올 때마다 대기 중인 작업 하나를 `wait` 뒤로 다시 예약하고,
//! 이전 예약은 취소한다. 마지막 알림 이후 `wait` 동안 조용하면 동작이 한 번 실행된다.

use parking_lot::Mutex;
use showcase_core::ports::scheduler::{Scheduler, TimerId};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::trace;

/// 디바운스 동작
pub type DebouncedAction = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct PendingState {
    timer: Option<TimerId>,
    generation: u64,
}

/// 디바운서
pub struct Debouncer {
    scheduler: Arc<dyn Scheduler>,
    wait: Duration,
    action: DebouncedAction,
    state: Mutex<PendingState>,
    me: Weak<Debouncer>,
}

impl Debouncer {
    /// 새 디바운서 생성
    pub fn new(scheduler: Arc<dyn Scheduler>, wait: Duration, action: DebouncedAction) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            scheduler,
            wait,
            action,
            state: Mutex::new(PendingState::default()),
            me: me.clone(),
        })
    }

    /// 알림: 대기 중인 실행을 취소하고 `wait` 뒤로 다시 예약
    pub fn trigger(&self) {
        let mut state = self.state.lock();
        if let Some(prev) = state.timer.take() {
            self.scheduler.cancel(prev);
        }
        state.generation += 1;
        let generation = state.generation;

        let me = self.me.clone();
        let timer = self.scheduler.schedule(
            self.wait,
            Box::new(move || {
                if let Some(debouncer) = me.upgrade() {
                    debouncer.fire(generation);
                }
            }),
        );
        state.timer = Some(timer);
        trace!(generation, "디바운스 재예약");
    }

    /// 대기 중인 실행 취소
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if let Some(timer) = state.timer.take() {
            self.scheduler.cancel(timer);
        }
        state.generation += 1;
    }

    /// 실행 대기 중인지
    pub fn is_pending(&self) -> bool {
        self.state.lock().timer.is_some()
    }

    fn fire(&self, generation: u64) {
        {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            state.timer = None;
        }
        (self.action)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (Arc<ManualScheduler>, Arc<AtomicUsize>, Arc<Debouncer>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let action_counter = Arc::clone(&counter);
        let debouncer = Debouncer::new(
            scheduler.clone(),
            Duration::from_millis(200),
            Arc::new(move || {
                action_counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (scheduler, counter, debouncer)
    }

    #[test]
    fn burst_collapses_to_single_run() {
        let (scheduler, counter, debouncer) = setup();

        for _ in 0..5 {
            debouncer.trigger();
            scheduler.advance(Duration::from_millis(50));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        // 마지막 알림 후 200ms
        scheduler.advance(Duration::from_millis(150));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn separated_triggers_run_each_time() {
        let (scheduler, counter, debouncer) = setup();

        debouncer.trigger();
        scheduler.advance(Duration::from_millis(250));
        debouncer.trigger();
        scheduler.advance(Duration::from_millis(250));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancel_drops_pending_run() {
        let (scheduler, counter, debouncer) = setup();

        debouncer.trigger();
        debouncer.cancel();
        scheduler.advance(Duration::from_secs(1));

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!debouncer.is_pending());
    }
}
