//! 시계/스케줄러 어댑터.
//!
//! - [`SystemClock`] — `tokio::time::Instant` 기반 단조 시계
//! - [`TokioScheduler`] — tokio 태스크 + `AbortHandle`로 취소 가능한 타이머
//! - [`ManualScheduler`] — 가상 시간 스케줄러 (테스트/리플레이용, `Clock` 겸용)

use parking_lot::Mutex;
use showcase_core::ports::scheduler::{Clock, Scheduler, TimerId, TimerTask};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::trace;

// ============================================================
// SystemClock
// ============================================================

/// 생성 시점 기준 단조 시계
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

// ============================================================
// TokioScheduler
// ============================================================

/// tokio 런타임 위의 지연 작업 스케줄러
pub struct TokioScheduler {
    handle: Handle,
    next_id: AtomicU64,
    /// 실행 대기 중인 작업의 중단 핸들
    tasks: Arc<Mutex<HashMap<u64, AbortHandle>>>,
}

impl TokioScheduler {
    /// 지정 런타임 핸들로 생성
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            next_id: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 현재 런타임으로 생성 (런타임 컨텍스트 밖에서 호출하면 panic)
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// 대기 중인 작업 수
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        // 작업이 등록 전에 끝나지 않도록 락을 잡은 채로 spawn
        let mut pending = self.tasks.lock();
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            tasks.lock().remove(&id);
            task();
        });
        pending.insert(id, join.abort_handle());

        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        if let Some(handle) = self.tasks.lock().remove(&id.0) {
            handle.abort();
            trace!(timer = id.0, "타이머 취소");
        }
    }
}

// ============================================================
// ManualScheduler
// ============================================================

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    /// (만료 시각, ID) 순으로 정렬된 대기 작업
    pending: BTreeMap<(Duration, u64), TimerTask>,
}

/// 가상 시간 스케줄러
///
/// `advance()`가 호출될 때만 시간이 흐르며, 만료된 작업을 만료 시각 순서대로
/// 실행한다. 작업 안에서 새 작업을 예약해도 같은 `advance()` 안에서 처리된다.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 가상 시간을 `by`만큼 진행. 실행한 작업 수를 반환한다.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by;
        let mut executed = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            executed += 1;
        }
        let mut state = self.state.lock();
        if state.now < target {
            state.now = target;
        }
        executed
    }

    /// 대기 중인 작업 수
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    fn pop_due(&self, until: Duration) -> Option<TimerTask> {
        let mut state = self.state.lock();
        let key = *state.pending.keys().next()?;
        if key.0 > until {
            return None;
        }
        state.now = key.0;
        state.pending.remove(&key)
    }
}

impl Clock for ManualScheduler {
    fn now(&self) -> Duration {
        self.state.lock().now
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerId {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        let due = state.now + delay;
        state.pending.insert((due, id), task);
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        self.state.lock().pending.retain(|(_, pending_id), _| *pending_id != id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter_task(counter: &Arc<AtomicUsize>) -> TimerTask {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn manual_runs_due_tasks_in_order() {
        let scheduler = Arc::new(ManualScheduler::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        for (delay, tag) in [(300, "c"), (100, "a"), (200, "b")] {
            let order = Arc::clone(&order);
            scheduler.schedule(
                Duration::from_millis(delay),
                Box::new(move || order.lock().push(tag)),
            );
        }

        assert_eq!(scheduler.advance(Duration::from_millis(250)), 2);
        assert_eq!(*order.lock(), vec!["a", "b"]);
        assert_eq!(scheduler.now(), Duration::from_millis(250));

        assert_eq!(scheduler.advance(Duration::from_millis(50)), 1);
        assert_eq!(*order.lock(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn manual_cancel_prevents_execution() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let id = scheduler.schedule(Duration::from_millis(100), counter_task(&counter));
        scheduler.cancel(id);
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        // 없는 ID 취소는 무시
        scheduler.cancel(TimerId(999));
    }

    #[test]
    fn manual_task_can_schedule_follow_up() {
        let scheduler = Arc::new(ManualScheduler::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let inner_scheduler = Arc::clone(&scheduler);
        let inner_counter = Arc::clone(&counter);
        scheduler.schedule(
            Duration::from_millis(100),
            Box::new(move || {
                inner_scheduler.schedule(Duration::from_millis(50), counter_task(&inner_counter));
            }),
        );

        assert_eq!(scheduler.advance(Duration::from_millis(200)), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_fires_after_delay() {
        let scheduler = TokioScheduler::current();
        let counter = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(Duration::from_millis(100), counter_task(&counter));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_cancel() {
        let scheduler = TokioScheduler::current();
        let counter = Arc::new(AtomicUsize::new(0));

        let id = scheduler.schedule(Duration::from_millis(100), counter_task(&counter));
        scheduler.cancel(id);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn system_clock_follows_tokio_time() {
        let clock = SystemClock::new();
        tokio::time::advance(Duration::from_millis(250)).await;
        assert!(clock.now() >= Duration::from_millis(250));
    }
}
