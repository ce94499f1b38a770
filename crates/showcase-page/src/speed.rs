//! 섹션별 재생 속도.
//!
//! [`SpeedPolicy`]는 대상 컨테이너의 비디오에 섹션 속도를, 나머지 비디오에
//! 기본 속도를 적용한다. [`SpeedObserver`]는 대상 컨테이너의 하위 트리
//! 변경을 감시해 디바운스 후 정책과 호버 컨트롤을 다시 적용한다.

use parking_lot::Mutex;
use showcase_core::config::{ObserverConfig, SpeedConfig};
use showcase_core::models::media::MediaEvent;
use showcase_core::ports::media::{MediaElement, MediaRef};
use showcase_core::ports::page::PageDocument;
use showcase_core::ports::scheduler::{Scheduler, TimerId};
use showcase_runtime::Debouncer;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tracing::{debug, info, trace, warn};

use crate::hover::HoverControls;

// ============================================================
// SpeedPolicy
// ============================================================

/// 재생 속도 정책
pub struct SpeedPolicy {
    config: SpeedConfig,
    /// 비디오 ID → 마지막으로 적용한 속도
    applied: Mutex<HashMap<String, f64>>,
    me: Weak<SpeedPolicy>,
}

impl SpeedPolicy {
    pub fn new(config: SpeedConfig) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            config,
            applied: Mutex::new(HashMap::new()),
            me: me.clone(),
        })
    }

    pub fn config(&self) -> &SpeedConfig {
        &self.config
    }

    /// 페이지 전체에 속도 적용. 속도를 설정한 비디오 수를 반환한다.
    pub fn apply(&self, page: &dyn PageDocument) -> usize {
        let mut matched = HashSet::new();
        let mut count = 0;

        for target in &self.config.targets {
            let rate = self
                .config
                .rate_for(&target.key)
                .unwrap_or(self.config.default_rate);
            for video in page.videos_in(&target.selector) {
                matched.insert(video.id().to_string());
                self.set_rate(&video, rate);
                count += 1;
            }
        }

        for video in page.all_videos() {
            if !matched.contains(video.id()) {
                self.set_rate(&video, self.config.default_rate);
                count += 1;
            }
        }

        debug!(videos = count, sections = matched.len(), "재생 속도 적용");
        count
    }

    /// 비디오에 마지막으로 적용한 속도
    pub fn applied_rate(&self, id: &str) -> Option<f64> {
        self.applied.lock().get(id).copied()
    }

    fn set_rate(&self, video: &MediaRef, rate: f64) {
        video.set_playback_rate(rate);
        let first_seen = self
            .applied
            .lock()
            .insert(video.id().to_string(), rate)
            .is_none();

        // 로드가 속도를 초기화하므로 메타데이터마다 다시 적용
        if first_seen {
            let me = self.me.clone();
            video.subscribe(Arc::new(move |element: &dyn MediaElement, event: MediaEvent| {
                if event != MediaEvent::LoadedMetadata {
                    return;
                }
                let Some(policy) = me.upgrade() else {
                    return;
                };
                if let Some(rate) = policy.applied_rate(element.id()) {
                    trace!(id = element.id(), rate, "메타데이터 로드 후 속도 재적용");
                    element.set_playback_rate(rate);
                }
            }));
        }
    }
}

// ============================================================
// SpeedObserver
// ============================================================

#[derive(Default)]
struct ObserverState {
    observing: bool,
    attempts: u32,
    retry_timer: Option<TimerId>,
    disconnected: bool,
}

/// 대상 컨테이너 변경 감시기
pub struct SpeedObserver {
    page: Arc<dyn PageDocument>,
    policy: Arc<SpeedPolicy>,
    hover: bool,
    scheduler: Arc<dyn Scheduler>,
    config: ObserverConfig,
    debouncer: Arc<Debouncer>,
    state: Mutex<ObserverState>,
    me: Weak<SpeedObserver>,
}

impl SpeedObserver {
    /// 감시기 생성. `hover`가 켜져 있으면 재적용 때 호버 컨트롤도 설정한다.
    pub fn new(
        page: Arc<dyn PageDocument>,
        policy: Arc<SpeedPolicy>,
        hover: bool,
        scheduler: Arc<dyn Scheduler>,
        config: ObserverConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<SpeedObserver>| {
            let target = me.clone();
            let debouncer = Debouncer::new(
                Arc::clone(&scheduler),
                config.debounce(),
                Arc::new(move || {
                    if let Some(observer) = target.upgrade() {
                        observer.reapply();
                    }
                }),
            );
            Self {
                page,
                policy,
                hover,
                scheduler,
                config,
                debouncer,
                state: Mutex::new(ObserverState::default()),
                me: me.clone(),
            }
        })
    }

    /// 감시 시작. 대상 컨테이너가 아직 없으면 `retry_delay` 뒤 다시 시도한다.
    pub fn start(&self) {
        if self.state.lock().disconnected {
            return;
        }
        // 이전 감시는 끊고 새로 건다
        self.page.disconnect_observers();

        let me = self.me.clone();
        let observed = self.page.observe_mutations(
            &self.policy.config().selectors(),
            Arc::new(move || {
                if let Some(observer) = me.upgrade() {
                    observer.on_mutation();
                }
            }),
        );

        let mut state = self.state.lock();
        state.retry_timer = None;
        if observed > 0 {
            state.observing = true;
            info!(containers = observed, "재생 속도 변경 감시 시작");
            return;
        }

        state.attempts += 1;
        if state.attempts > self.config.retry_limit {
            warn!(attempts = state.attempts - 1, "감시 대상 컨테이너 없음: 재시도 중단");
            return;
        }
        let me = self.me.clone();
        let timer = self.scheduler.schedule(
            self.config.retry_delay(),
            Box::new(move || {
                if let Some(observer) = me.upgrade() {
                    observer.start();
                }
            }),
        );
        state.retry_timer = Some(timer);
        trace!(attempt = state.attempts, "감시 대상 컨테이너 대기");
    }

    /// 감시 중단과 대기 중인 재적용/재시도 취소
    pub fn disconnect(&self) {
        self.page.disconnect_observers();
        self.debouncer.cancel();
        let mut state = self.state.lock();
        if let Some(timer) = state.retry_timer.take() {
            self.scheduler.cancel(timer);
        }
        state.observing = false;
        state.disconnected = true;
        debug!("재생 속도 변경 감시 해제");
    }

    pub fn is_observing(&self) -> bool {
        self.state.lock().observing
    }

    /// 컨테이너를 찾지 못한 시도 횟수
    pub fn attempts(&self) -> u32 {
        self.state.lock().attempts
    }

    /// 재적용 대기 중인지
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn on_mutation(&self) {
        if self.state.lock().disconnected {
            return;
        }
        self.debouncer.trigger();
    }

    fn reapply(&self) {
        self.policy.apply(self.page.as_ref());
        if self.hover {
            HoverControls::setup(self.page.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_core::config::ShowcaseConfig;
    use showcase_runtime::sim::{MemoryPage, VideoFixture};
    use showcase_runtime::ManualScheduler;
    use std::time::Duration;

    const PAGE: &str = r##"{
        "videos": [
            {"id": "carousel-1"}, {"id": "longseq-1"}, {"id": "longseq-2"},
            {"id": "stray"}
        ],
        "sections": [
            {"name": "longseq", "selector": "#longseq-grid", "rows": [["longseq-1", "longseq-2"]]}
        ],
        "containers": [
            {"selector": ".video-carousel-container", "videos": ["carousel-1"]}
        ]
    }"##;

    fn page() -> Arc<MemoryPage> {
        Arc::new(MemoryPage::from_json(PAGE, None).unwrap())
    }

    fn fixture(id: &str) -> VideoFixture {
        VideoFixture {
            id: id.to_string(),
            duration: 10.0,
            lazy: false,
            block_unmuted_autoplay: false,
        }
    }

    #[test]
    fn apply_sets_section_and_default_rates() {
        let page = page();
        let policy = SpeedPolicy::new(ShowcaseConfig::default_config().speed);

        let count = policy.apply(page.as_ref());

        assert_eq!(count, 4);
        assert_eq!(page.video("carousel-1").unwrap().playback_rate(), 0.7);
        assert_eq!(page.video("longseq-1").unwrap().playback_rate(), 0.8);
        assert_eq!(page.video("stray").unwrap().playback_rate(), 1.0);
    }

    #[test]
    fn rate_reapplied_after_metadata() {
        let page = page();
        let policy = SpeedPolicy::new(ShowcaseConfig::default_config().speed);
        policy.apply(page.as_ref());

        let video = page.video("longseq-1").unwrap();
        video.load();
        assert_eq!(video.playback_rate(), 1.0);
        video.complete_load();
        assert_eq!(video.playback_rate(), 0.8);

        // 다시 적용한 뒤의 로드에도 섹션 속도 유지
        policy.apply(page.as_ref());
        video.set_playback_rate(2.0);
        video.load();
        video.complete_load();
        assert_eq!(video.playback_rate(), 0.8);
    }

    #[test]
    fn mutations_are_debounced() {
        let page = page();
        let scheduler = Arc::new(ManualScheduler::new());
        let config = ShowcaseConfig::default_config();
        let policy = SpeedPolicy::new(config.speed.clone());
        let observer = SpeedObserver::new(
            page.clone(),
            policy.clone(),
            true,
            scheduler.clone(),
            config.observer.clone(),
        );
        observer.start();
        assert!(observer.is_observing());

        let first = page.insert_video("#longseq-grid", fixture("late-1"));
        scheduler.advance(Duration::from_millis(150));
        let second = page.insert_video("#longseq-grid", fixture("late-2"));
        scheduler.advance(Duration::from_millis(150));

        // 두 번째 변경 후 아직 200ms가 지나지 않음
        assert_eq!(first.playback_rate(), 1.0);
        assert!(observer.is_pending());

        scheduler.advance(Duration::from_millis(60));
        assert_eq!(first.playback_rate(), 0.8);
        assert_eq!(second.playback_rate(), 0.8);
        assert!(!second.controls_visible());
        assert!(!observer.is_pending());
    }

    #[test]
    fn retries_until_container_appears() {
        let page = Arc::new(MemoryPage::from_json("{}", None).unwrap());
        let scheduler = Arc::new(ManualScheduler::new());
        let config = ShowcaseConfig::default_config();
        let observer = SpeedObserver::new(
            page.clone(),
            SpeedPolicy::new(config.speed.clone()),
            false,
            scheduler.clone(),
            config.observer.clone(),
        );

        observer.start();
        assert!(!observer.is_observing());
        scheduler.advance(Duration::from_millis(250));
        assert_eq!(observer.attempts(), 3);

        page.add_container("#io-grid");
        scheduler.advance(Duration::from_millis(100));
        assert!(observer.is_observing());
        assert_eq!(page.observer_count(), 1);
    }

    #[test]
    fn retry_is_bounded() {
        let page = Arc::new(MemoryPage::from_json("{}", None).unwrap());
        let scheduler = Arc::new(ManualScheduler::new());
        let config = ShowcaseConfig::default_config();
        let mut observer_config = config.observer.clone();
        observer_config.retry_limit = 3;
        let observer = SpeedObserver::new(
            page.clone(),
            SpeedPolicy::new(config.speed.clone()),
            false,
            scheduler.clone(),
            observer_config,
        );

        observer.start();
        scheduler.advance(Duration::from_secs(5));
        assert_eq!(observer.attempts(), 4);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn disconnect_cancels_pending_reapply() {
        let page = page();
        let scheduler = Arc::new(ManualScheduler::new());
        let config = ShowcaseConfig::default_config();
        let observer = SpeedObserver::new(
            page.clone(),
            SpeedPolicy::new(config.speed.clone()),
            false,
            scheduler.clone(),
            config.observer.clone(),
        );
        observer.start();

        let late = page.insert_video("#longseq-grid", fixture("late"));
        observer.disconnect();
        scheduler.advance(Duration::from_millis(500));

        assert_eq!(late.playback_rate(), 1.0);
        assert!(!observer.is_observing());
        assert_eq!(page.observer_count(), 0);
    }
}
