//! 세트 전환기.
//!
//! 섹션 안의 세트 중 하나만 활성화한다. 활성 세트의 비디오는 지연 로드 후
//! 자동 재생하고, 나머지 세트의 비디오는 일시정지 후 0초로 되감는다.
//!
//! 되감는 동안 요소에 `resetting` 표식을 남겨 이미 진행 중인 동기화 패스가
//! 그 요소를 건너뛰게 한다. 표식 해제 타이머는 비디오별로 추적하며
//! 다시 활성화되면 즉시 취소된다.

use parking_lot::Mutex;
use showcase_core::config::SwitchConfig;
use showcase_core::models::media::Preload;
use showcase_core::ports::media::{MediaElement, MediaElementExt, MediaRef};
use showcase_core::ports::page::SetView;
use showcase_core::ports::scheduler::{Scheduler, TimerId};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::activity::SetActivity;

/// 전환 시 적용할 정책
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchPolicy {
    /// 활성 세트 비디오의 재생 속도
    pub playback_rate: f64,
    /// 리셋 표식 유지 시간
    pub reset_delay: Duration,
}

impl SwitchPolicy {
    pub fn new(playback_rate: f64, config: &SwitchConfig) -> Self {
        Self {
            playback_rate,
            reset_delay: Duration::from_millis(config.reset_delay_ms),
        }
    }
}

impl Default for SwitchPolicy {
    fn default() -> Self {
        let config = SwitchConfig::default();
        Self::new(config.fallback_rate, &config)
    }
}

/// 상호 배타적 비디오 세트
#[derive(Clone)]
pub struct VideoSet {
    /// 세트 식별자 (`data-set` 값)
    pub id: String,
    /// 이 세트의 그룹 동기화기와 공유하는 활성 플래그
    pub activity: SetActivity,
    /// 세트 안의 모든 비디오
    pub videos: Vec<MediaRef>,
}

impl VideoSet {
    /// 비활성 상태의 세트 생성
    pub fn new(id: impl Into<String>, videos: Vec<MediaRef>) -> Self {
        Self {
            id: id.into(),
            activity: SetActivity::new(false),
            videos,
        }
    }
}

#[derive(Default)]
struct SwitchState {
    active: Option<String>,
    /// 비디오 ID → (토큰, 타이머)
    pending_resets: HashMap<String, (u64, TimerId)>,
    next_token: u64,
}

/// 세트 전환기
pub struct SetSwitcher {
    section: String,
    sets: Vec<VideoSet>,
    buttons: Vec<String>,
    view: Arc<dyn SetView>,
    scheduler: Arc<dyn Scheduler>,
    policy: SwitchPolicy,
    state: Mutex<SwitchState>,
    me: Weak<SetSwitcher>,
}

impl SetSwitcher {
    /// 새 전환기 생성. 초기에는 어떤 세트도 활성이 아니다.
    pub fn new(
        section: impl Into<String>,
        sets: Vec<VideoSet>,
        buttons: Vec<String>,
        view: Arc<dyn SetView>,
        scheduler: Arc<dyn Scheduler>,
        policy: SwitchPolicy,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            section: section.into(),
            sets,
            buttons,
            view,
            scheduler,
            policy,
            state: Mutex::new(SwitchState::default()),
            me: me.clone(),
        })
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn sets(&self) -> &[VideoSet] {
        &self.sets
    }

    pub fn policy(&self) -> SwitchPolicy {
        self.policy
    }

    /// 현재 활성 세트 ID
    pub fn active_set(&self) -> Option<String> {
        self.state.lock().active.clone()
    }

    /// 리셋 표식 해제를 기다리는 비디오 수
    pub fn pending_resets(&self) -> usize {
        self.state.lock().pending_resets.len()
    }

    /// `target` 세트만 활성화.
    ///
    /// 일치하는 세트가 없으면 모든 세트와 버튼이 비활성화된다.
    /// 같은 ID로 반복 호출해도 중복 로드는 일어나지 않는다.
    pub fn show_set(&self, target: &str) {
        let matched = self.sets.iter().any(|set| set.id == target);
        if !matched {
            warn!(section = %self.section, target, "일치하는 세트 없음: 모든 세트 비활성화");
        }

        for set in self.sets.iter().filter(|set| set.id != target) {
            self.deactivate(set);
        }
        if let Some(set) = self.sets.iter().find(|set| set.id == target) {
            self.activate(set);
        }

        for button in &self.buttons {
            self.view.mark_button(&self.section, button, button == target);
        }

        self.state.lock().active = matched.then(|| target.to_string());
        if matched {
            info!(section = %self.section, set = target, "세트 전환");
        }
    }

    fn activate(&self, set: &VideoSet) {
        set.activity.set_active(true);
        self.view.mark_set(&self.section, &set.id, true);

        let rate = self.policy.playback_rate;
        for video in &set.videos {
            self.cancel_reset(video.as_ref());

            if video.preload() == Preload::None {
                // 한 번도 로드되지 않은 비디오
                video.set_preload(Preload::Metadata);
                video.set_playback_rate(rate);

                let weak = Arc::downgrade(video);
                let activity = set.activity.clone();
                video.once_loaded_metadata(Box::new(move || {
                    let Some(video) = weak.upgrade() else {
                        return;
                    };
                    // 로드가 속도를 초기화하는 브라우저가 있다
                    video.set_playback_rate(rate);
                    if activity.is_active() {
                        video.set_muted(true);
                        video.request_play();
                    }
                }));
                debug!(section = %self.section, video = video.id(), "지연 로드 시작");
                video.load();
            } else if video.ready_state().is_unloaded() {
                // 앞선 활성화의 메타데이터 콜백이 재생을 시작한다
                video.set_playback_rate(rate);
                debug!(section = %self.section, video = video.id(), "메타데이터 대기 중");
            } else {
                video.set_muted(true);
                video.request_play();
            }
        }
    }

    fn deactivate(&self, set: &VideoSet) {
        // 동기화기가 먼저 비활성 상태를 보도록 표식부터 내린다
        set.activity.set_active(false);
        self.view.mark_set(&self.section, &set.id, false);

        for video in &set.videos {
            video.set_resetting(true);
            video.pause();
            video.request_seek(0.0);
            self.schedule_reset_clear(video);
        }
    }

    fn schedule_reset_clear(&self, video: &MediaRef) {
        let mut state = self.state.lock();
        if let Some((_, prev)) = state.pending_resets.remove(video.id()) {
            self.scheduler.cancel(prev);
        }
        state.next_token += 1;
        let token = state.next_token;

        let me = self.me.clone();
        let target = Arc::clone(video);
        let timer = self.scheduler.schedule(
            self.policy.reset_delay,
            Box::new(move || match me.upgrade() {
                Some(switcher) => switcher.finish_reset(target.as_ref(), token),
                None => target.set_resetting(false),
            }),
        );
        state
            .pending_resets
            .insert(video.id().to_string(), (token, timer));
    }

    fn finish_reset(&self, video: &dyn MediaElement, token: u64) {
        {
            let mut state = self.state.lock();
            match state.pending_resets.get(video.id()) {
                Some((current, _)) if *current == token => {
                    state.pending_resets.remove(video.id());
                }
                // 더 새로운 전환이 대체했거나 재활성화로 취소됨
                _ => return,
            }
        }
        video.set_resetting(false);
    }

    fn cancel_reset(&self, video: &dyn MediaElement) {
        let pending = self.state.lock().pending_resets.remove(video.id());
        if let Some((_, timer)) = pending {
            self.scheduler.cancel(timer);
        }
        if video.is_resetting() {
            video.set_resetting(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_runtime::sim::SimulatedVideo;
    use showcase_runtime::ManualScheduler;

    /// 마지막 표시 상태를 기록하는 뷰
    #[derive(Default)]
    struct RecordingView {
        sets: Mutex<HashMap<String, bool>>,
        buttons: Mutex<HashMap<String, bool>>,
    }

    impl RecordingView {
        fn active_sets(&self) -> Vec<String> {
            let mut ids: Vec<String> = self
                .sets
                .lock()
                .iter()
                .filter(|(_, active)| **active)
                .map(|(id, _)| id.clone())
                .collect();
            ids.sort();
            ids
        }

        fn active_buttons(&self) -> Vec<String> {
            let mut ids: Vec<String> = self
                .buttons
                .lock()
                .iter()
                .filter(|(_, active)| **active)
                .map(|(id, _)| id.clone())
                .collect();
            ids.sort();
            ids
        }
    }

    impl SetView for RecordingView {
        fn mark_set(&self, _section: &str, set_id: &str, active: bool) {
            self.sets.lock().insert(set_id.to_string(), active);
        }

        fn mark_button(&self, _section: &str, set_id: &str, active: bool) {
            self.buttons.lock().insert(set_id.to_string(), active);
        }
    }

    struct Fixture {
        switcher: Arc<SetSwitcher>,
        view: Arc<RecordingView>,
        scheduler: Arc<ManualScheduler>,
        first: Vec<Arc<SimulatedVideo>>,
        second: Vec<Arc<SimulatedVideo>>,
    }

    fn fixture() -> Fixture {
        let scheduler = Arc::new(ManualScheduler::new());
        let view = Arc::new(RecordingView::default());
        let first = vec![
            SimulatedVideo::new("s1-a", 10.0),
            SimulatedVideo::new("s1-b", 10.0),
        ];
        let second = vec![
            SimulatedVideo::lazy("s2-a", 10.0),
            SimulatedVideo::lazy("s2-b", 10.0),
        ];
        for video in &second {
            video.auto_complete_loads(scheduler.clone(), Duration::from_millis(40));
        }

        let to_refs = |videos: &[Arc<SimulatedVideo>]| -> Vec<MediaRef> {
            videos.iter().map(|v| Arc::clone(v) as MediaRef).collect()
        };
        let switcher = SetSwitcher::new(
            "davis",
            vec![
                VideoSet::new("1", to_refs(&first)),
                VideoSet::new("2", to_refs(&second)),
            ],
            vec!["1".to_string(), "2".to_string()],
            view.clone(),
            scheduler.clone(),
            SwitchPolicy {
                playback_rate: 0.5,
                reset_delay: Duration::from_millis(100),
            },
        );

        Fixture {
            switcher,
            view,
            scheduler,
            first,
            second,
        }
    }

    #[test]
    fn initial_show_plays_loaded_set() {
        let f = fixture();
        f.switcher.show_set("1");

        assert_eq!(f.switcher.active_set().as_deref(), Some("1"));
        assert_eq!(f.view.active_sets(), vec!["1"]);
        assert_eq!(f.view.active_buttons(), vec!["1"]);
        for video in &f.first {
            assert!(!video.is_paused());
            assert!(video.is_muted());
        }
        for video in &f.second {
            assert!(video.is_paused());
            assert_eq!(video.load_count(), 0);
            assert!(video.is_resetting());
        }
        assert!(f.switcher.sets()[0].activity.is_active());
        assert!(!f.switcher.sets()[1].activity.is_active());
    }

    #[test]
    fn switching_resets_old_set_and_lazy_loads_new() {
        let f = fixture();
        f.switcher.show_set("1");
        f.scheduler.advance(Duration::from_millis(150));
        f.first[0].tick(Duration::from_secs(2));

        f.switcher.show_set("2");

        for video in &f.first {
            assert!(video.is_paused());
            assert_eq!(video.current_time(), 0.0);
            assert!(video.is_resetting());
        }
        for video in &f.second {
            assert_eq!(video.preload(), Preload::Metadata);
            assert_eq!(video.load_count(), 1);
            assert_eq!(video.pending_metadata_callbacks(), 1);
            assert!(video.is_paused());
        }
        assert_eq!(f.view.active_sets(), vec!["2"]);
        assert_eq!(f.view.active_buttons(), vec!["2"]);

        // 메타데이터 도착 (40ms) → 속도 재적용 + 음소거 자동 재생
        f.scheduler.advance(Duration::from_millis(50));
        for video in &f.second {
            assert_eq!(video.playback_rate(), 0.5);
            assert!(video.is_muted());
            assert!(!video.is_paused());
        }
        assert!(f.first.iter().all(|v| v.is_resetting()));

        // 리셋 지연 (100ms) 후 표식 해제
        f.scheduler.advance(Duration::from_millis(60));
        assert!(f.first.iter().all(|v| !v.is_resetting()));
        assert_eq!(f.switcher.pending_resets(), 0);
    }

    #[test]
    fn show_set_is_idempotent() {
        let f = fixture();
        f.switcher.show_set("2");
        f.switcher.show_set("2");

        for video in &f.second {
            assert_eq!(video.load_count(), 1);
            assert_eq!(video.pending_metadata_callbacks(), 1);
            // 메타데이터 전에는 재생 요청이 나가지 않는다
            assert!(video.is_paused());
            assert_eq!(video.playback_rate(), 0.5);
        }

        f.scheduler.advance(Duration::from_millis(200));
        f.switcher.show_set("2");
        for video in &f.second {
            assert_eq!(video.load_count(), 1);
            assert!(!video.is_paused());
        }
        assert_eq!(f.view.active_sets(), vec!["2"]);
    }

    #[test]
    fn reactivation_cancels_pending_reset() {
        let f = fixture();
        f.switcher.show_set("1");
        f.switcher.show_set("2");
        assert!(f.first.iter().all(|v| v.is_resetting()));

        // 리셋 창 안에서 다시 활성화
        f.scheduler.advance(Duration::from_millis(30));
        f.switcher.show_set("1");
        assert!(f.first.iter().all(|v| !v.is_resetting()));
        assert!(f.first.iter().all(|v| !v.is_paused()));

        // 다시 비활성화: 이전 타이머가 새 표식을 일찍 지우면 안 된다
        f.scheduler.advance(Duration::from_millis(30));
        f.switcher.show_set("2");
        f.scheduler.advance(Duration::from_millis(80));
        assert!(f.first.iter().all(|v| v.is_resetting()));

        f.scheduler.advance(Duration::from_millis(20));
        assert!(f.first.iter().all(|v| !v.is_resetting()));
    }

    #[test]
    fn unknown_set_deactivates_everything() {
        let f = fixture();
        f.switcher.show_set("1");
        f.switcher.show_set("9");

        assert_eq!(f.switcher.active_set(), None);
        assert!(f.view.active_sets().is_empty());
        assert!(f.view.active_buttons().is_empty());
        assert!(f.first.iter().all(|v| v.is_paused()));
        assert!(f.switcher.sets().iter().all(|s| !s.activity.is_active()));
    }

    #[test]
    fn metadata_after_switching_away_does_not_autoplay() {
        let f = fixture();
        f.switcher.show_set("2");
        f.switcher.show_set("1");

        f.scheduler.advance(Duration::from_millis(50));
        for video in &f.second {
            assert_eq!(video.playback_rate(), 0.5);
            assert!(video.is_paused());
        }
    }

    #[test]
    fn default_policy_uses_fallback_rate() {
        let policy = SwitchPolicy::default();
        assert_eq!(policy.playback_rate, 0.5);
        assert_eq!(policy.reset_delay, Duration::from_millis(100));
    }
}
