//! 시계/타이머 포트.
//!
//! 구현: `showcase-runtime` crate (`SystemClock`, `TokioScheduler`, `ManualScheduler`)

use std::time::Duration;

/// 예약된 타이머 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// 타이머 만료 시 실행될 작업
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// 단조 증가 시계
pub trait Clock: Send + Sync {
    /// 기준 시점 이후 경과 시간
    fn now(&self) -> Duration;
}

/// 지연 작업 스케줄러
pub trait Scheduler: Send + Sync {
    /// `delay` 후 `task` 실행 예약
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerId;

    /// 예약 취소. 이미 실행됐거나 없는 ID는 무시한다.
    fn cancel(&self, id: TimerId);
}
