//! 비디오 그룹 동기화기.
//!
//! 그룹 멤버 하나가 네이티브 이벤트를 발생시키면 그 요소를 마스터로 삼아
//! 나머지 멤버의 재생 위치, 재생/일시정지 상태, 재생 속도를 맞춘다.
//!
//! 보정 동작(seek/play/pause) 자체가 같은 그룹에 이벤트를 다시 발생시키므로
//! 그룹 단위 재진입 가드로 패스를 상호 배타적으로 만든다. 겹친 호출은
//! 대기열에 쌓이지 않고 버려진다.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use showcase_core::config::SyncConfig;
use showcase_core::models::media::{MediaEvent, SyncTrigger};
use showcase_core::ports::media::{MediaElement, MediaElementExt, MediaRef};
use showcase_core::ports::scheduler::Clock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::activity::SetActivity;

// ============================================================
// 정책
// ============================================================

/// 허용 오차와 진행 이벤트 쓰로틀
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncPolicy {
    /// 이산 이벤트(play/pause/seek/ratechange)의 허용 오차 (초)
    pub discrete_threshold: f64,
    /// 진행 이벤트(timeupdate)의 허용 오차 (초)
    pub progress_threshold: f64,
    /// 진행 이벤트 최소 간격 (`None`이면 쓰로틀 없음)
    pub progress_throttle: Option<Duration>,
}

impl SyncPolicy {
    /// 짧은/중간 길이 클립
    pub fn short_clip() -> Self {
        Self::from(&SyncConfig::short_clip())
    }

    /// 긴 시퀀스: 진행 중 보정을 덜 자주 한다
    pub fn long_sequence() -> Self {
        Self::from(&SyncConfig::long_sequence())
    }

    /// 모든 이벤트를 이산 오차로 즉시 처리
    pub fn unthrottled() -> Self {
        Self::from(&SyncConfig::unthrottled())
    }

    /// 트리거 종류에 맞는 허용 오차
    pub fn threshold_for(&self, trigger: SyncTrigger) -> f64 {
        if trigger.is_progress() {
            self.progress_threshold
        } else {
            self.discrete_threshold
        }
    }
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self::short_clip()
    }
}

impl From<&SyncConfig> for SyncPolicy {
    fn from(config: &SyncConfig) -> Self {
        Self {
            discrete_threshold: config.discrete_threshold_secs,
            progress_threshold: config.progress_threshold_secs,
            progress_throttle: config.progress_throttle_ms.map(Duration::from_millis),
        }
    }
}

// ============================================================
// 통계
// ============================================================

/// 동기화 패스 카운터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// 실제로 실행된 패스
    pub passes: u64,
    /// 진행 중인 패스와 겹쳐 버려진 호출
    pub dropped_reentrant: u64,
    /// 쓰로틀 창 안이라 건너뛴 진행 이벤트
    pub throttled: u64,
    /// 소속 세트가 비활성이라 건너뛴 호출
    pub gated: u64,
}

#[derive(Default)]
struct StatCounters {
    passes: AtomicU64,
    dropped_reentrant: AtomicU64,
    throttled: AtomicU64,
    gated: AtomicU64,
}

impl StatCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SyncStats {
        SyncStats {
            passes: self.passes.load(Ordering::Relaxed),
            dropped_reentrant: self.dropped_reentrant.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            gated: self.gated.load(Ordering::Relaxed),
        }
    }
}

// ============================================================
// 재진입 가드
// ============================================================

/// 패스 동안 잡혀 있는 가드. drop 시 해제된다.
struct SyncGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SyncGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ============================================================
// VideoGroupSynchronizer
// ============================================================

/// 한 동기화 그룹(행 또는 쌍)의 동기화기
///
/// 멤버 구성은 생성 시점에 고정된다.
pub struct VideoGroupSynchronizer {
    label: String,
    members: Vec<MediaRef>,
    policy: SyncPolicy,
    activity: Option<SetActivity>,
    clock: Arc<dyn Clock>,
    syncing: AtomicBool,
    last_progress_sync: Mutex<Option<Duration>>,
    stats: StatCounters,
}

impl VideoGroupSynchronizer {
    /// 새 동기화기 생성
    ///
    /// `activity`가 있으면 해당 세트가 활성일 때만 동기화한다.
    pub fn new(
        members: Vec<MediaRef>,
        policy: SyncPolicy,
        activity: Option<SetActivity>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            label: String::new(),
            members,
            policy,
            activity,
            clock,
            syncing: AtomicBool::new(false),
            last_progress_sync: Mutex::new(None),
            stats: StatCounters::default(),
        }
    }

    /// 로그용 그룹 이름
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn members(&self) -> &[MediaRef] {
        &self.members
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    /// 누적 카운터
    pub fn stats(&self) -> SyncStats {
        self.stats.snapshot()
    }

    /// 모든 멤버의 이벤트 구독.
    ///
    /// 리스너는 `Weak` 참조만 잡으므로 동기화기가 drop되면 조용히 무시된다.
    pub fn attach(self: &Arc<Self>) {
        for member in &self.members {
            let weak = Arc::downgrade(self);
            member.subscribe(Arc::new(move |element: &dyn MediaElement, event: MediaEvent| {
                let Some(trigger) = SyncTrigger::from_event(event) else {
                    return;
                };
                if let Some(sync) = weak.upgrade() {
                    sync.handle_event(element, trigger);
                }
            }));
        }
        debug!(group = %self.label, members = self.members.len(), "그룹 동기화 연결");
    }

    /// `master`가 발생시킨 이벤트로 한 번의 동기화 패스 실행.
    ///
    /// 재진입, 비활성 세트, 쓰로틀 창 안의 진행 이벤트는 아무것도 변경하지 않고 반환한다.
    pub fn handle_event(&self, master: &dyn MediaElement, trigger: SyncTrigger) {
        let Some(_guard) = SyncGuard::acquire(&self.syncing) else {
            StatCounters::bump(&self.stats.dropped_reentrant);
            trace!(group = %self.label, master = master.id(), ?trigger, "패스 진행 중: 호출 버림");
            return;
        };

        if let Some(activity) = &self.activity {
            if !activity.is_active() {
                StatCounters::bump(&self.stats.gated);
                trace!(group = %self.label, ?trigger, "비활성 세트: 동기화 생략");
                return;
            }
        }

        if trigger.is_progress() && !self.take_progress_slot() {
            StatCounters::bump(&self.stats.throttled);
            return;
        }

        StatCounters::bump(&self.stats.passes);
        self.align_members(master, trigger);
    }

    /// 쓰로틀 창이 지났으면 타임스탬프를 갱신하고 `true`
    fn take_progress_slot(&self) -> bool {
        let Some(window) = self.policy.progress_throttle else {
            return true;
        };
        let now = self.clock.now();
        let mut last = self.last_progress_sync.lock();
        if let Some(prev) = *last {
            if now.saturating_sub(prev) < window {
                return false;
            }
        }
        *last = Some(now);
        true
    }

    fn align_members(&self, master: &dyn MediaElement, trigger: SyncTrigger) {
        let threshold = self.policy.threshold_for(trigger);
        let master_time = master.current_time();
        let master_paused = master.is_paused();
        let master_rate = master.playback_rate();

        trace!(
            group = %self.label,
            master = master.id(),
            ?trigger,
            time = master_time,
            paused = master_paused,
            rate = master_rate,
            "동기화 패스"
        );

        for member in &self.members {
            if member.id() == master.id() {
                continue;
            }
            // 로드 전이거나 세트 전환으로 리셋 중인 요소는 건드리지 않는다
            if member.ready_state().is_unloaded() || member.is_resetting() {
                continue;
            }

            let drift = (member.current_time() - master_time).abs();
            if drift > threshold {
                trace!(member = member.id(), drift, threshold, "재생 위치 보정");
                member.request_seek(master_time);
            }

            if master_paused {
                if !member.is_paused() {
                    member.pause();
                }
            } else if member.is_paused() {
                member.request_play();
            }

            if member.playback_rate() != master_rate {
                member.set_playback_rate(master_rate);
            }
        }
    }
}
