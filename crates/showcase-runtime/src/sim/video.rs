//! 시뮬레이션 비디오 요소.
//!
//! 브라우저 미디어 요소처럼 상태 변경 호출 안에서 이벤트를 동기적으로 발생시킨다.
//! 리스너는 내부 락을 풀고 호출하므로 리스너가 요소를 다시 조작해도 된다.

use parking_lot::Mutex;
use showcase_core::error::MediaError;
use showcase_core::models::media::{MediaEvent, Preload, ReadyState};
use showcase_core::ports::media::{MediaElement, MediaListener, MetadataCallback};
use showcase_core::ports::scheduler::Scheduler;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::trace;

struct VideoState {
    current_time: f64,
    duration: f64,
    paused: bool,
    playback_rate: f64,
    default_playback_rate: f64,
    ready_state: ReadyState,
    preload: Preload,
    muted: bool,
    resetting: bool,
    controls: bool,
    controls_setup: bool,
    looping: bool,
    /// 음소거되지 않은 재생 요청을 거부 (자동재생 정책)
    block_unmuted_autoplay: bool,
    load_count: u32,
}

/// 시뮬레이션 비디오
pub struct SimulatedVideo {
    id: String,
    state: Mutex<VideoState>,
    listeners: Mutex<Vec<MediaListener>>,
    metadata_callbacks: Mutex<Vec<MetadataCallback>>,
    /// 설정되면 `load()`가 지연 후 자동으로 로드를 완료한다
    loader: Mutex<Option<(Arc<dyn Scheduler>, Duration)>>,
    me: Weak<SimulatedVideo>,
}

impl SimulatedVideo {
    /// 이미 버퍼링이 끝난 비디오
    pub fn new(id: impl Into<String>, duration: f64) -> Arc<Self> {
        Self::build(id.into(), duration, ReadyState::HaveEnoughData, Preload::Auto)
    }

    /// 지연 로드 비디오 (`preload="none"`, 데이터 없음)
    pub fn lazy(id: impl Into<String>, duration: f64) -> Arc<Self> {
        Self::build(id.into(), duration, ReadyState::HaveNothing, Preload::None)
    }

    fn build(id: String, duration: f64, ready_state: ReadyState, preload: Preload) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id,
            state: Mutex::new(VideoState {
                current_time: 0.0,
                duration,
                paused: true,
                playback_rate: 1.0,
                default_playback_rate: 1.0,
                ready_state,
                preload,
                muted: false,
                resetting: false,
                controls: true,
                controls_setup: false,
                looping: true,
                block_unmuted_autoplay: false,
                load_count: 0,
            }),
            listeners: Mutex::new(Vec::new()),
            metadata_callbacks: Mutex::new(Vec::new()),
            loader: Mutex::new(None),
            me: me.clone(),
        })
    }

    /// 음소거되지 않은 재생 요청을 거부하도록 설정
    pub fn block_unmuted_autoplay(&self, block: bool) {
        self.state.lock().block_unmuted_autoplay = block;
    }

    /// `load()` 후 `latency` 뒤에 자동으로 로드 완료
    pub fn auto_complete_loads(&self, scheduler: Arc<dyn Scheduler>, latency: Duration) {
        *self.loader.lock() = Some((scheduler, latency));
    }

    /// 로드 완료: 메타데이터 준비, `loadedmetadata` 발생
    pub fn complete_load(&self) {
        {
            let mut state = self.state.lock();
            state.ready_state = ReadyState::HaveEnoughData;
        }
        trace!(id = %self.id, "메타데이터 로드 완료");
        self.emit(MediaEvent::LoadedMetadata);
        let callbacks = std::mem::take(&mut *self.metadata_callbacks.lock());
        for callback in callbacks {
            callback();
        }
    }

    /// 재생 진행 시뮬레이션: 재생 중이면 시간을 진행하고 `timeupdate` 발생
    pub fn tick(&self, elapsed: Duration) {
        {
            let mut state = self.state.lock();
            if state.paused || state.ready_state.is_unloaded() {
                return;
            }
            let mut next = state.current_time + elapsed.as_secs_f64() * state.playback_rate;
            if next >= state.duration {
                next = if state.looping && state.duration > 0.0 {
                    next % state.duration
                } else {
                    state.duration
                };
            }
            state.current_time = next;
        }
        self.emit(MediaEvent::TimeUpdate);
    }

    /// 이벤트 없이 재생 위치를 바꿈 (드리프트 주입용)
    pub fn drift_to(&self, time: f64) {
        self.state.lock().current_time = time;
    }

    /// 마우스 진입/이탈 등 외부 이벤트 주입
    pub fn dispatch(&self, event: MediaEvent) {
        self.emit(event);
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    pub fn controls_visible(&self) -> bool {
        self.state.lock().controls
    }

    pub fn load_count(&self) -> u32 {
        self.state.lock().load_count
    }

    pub fn duration(&self) -> f64 {
        self.state.lock().duration
    }

    /// 대기 중인 1회성 메타데이터 콜백 수
    pub fn pending_metadata_callbacks(&self) -> usize {
        self.metadata_callbacks.lock().len()
    }

    fn emit(&self, event: MediaEvent) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener(self, event);
        }
    }
}

impl MediaElement for SimulatedVideo {
    fn id(&self) -> &str {
        &self.id
    }

    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn seek(&self, time: f64) -> Result<(), MediaError> {
        {
            let mut state = self.state.lock();
            if !time.is_finite() || time < 0.0 || time > state.duration {
                return Err(MediaError::SeekOutOfRange {
                    requested: time,
                    duration: state.duration,
                });
            }
            state.current_time = time;
            if state.ready_state.is_unloaded() {
                // 데이터가 없으면 시작 위치만 기억
                return Ok(());
            }
        }
        self.emit(MediaEvent::Seeking);
        self.emit(MediaEvent::Seeked);
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn play(&self) -> Result<(), MediaError> {
        {
            let mut state = self.state.lock();
            if state.block_unmuted_autoplay && !state.muted {
                return Err(MediaError::PlayRejected("NotAllowedError".to_string()));
            }
            if !state.paused {
                return Ok(());
            }
            state.paused = false;
        }
        self.emit(MediaEvent::Play);
        Ok(())
    }

    fn pause(&self) {
        {
            let mut state = self.state.lock();
            if state.paused {
                return;
            }
            state.paused = true;
        }
        self.emit(MediaEvent::Pause);
    }

    fn playback_rate(&self) -> f64 {
        self.state.lock().playback_rate
    }

    fn set_playback_rate(&self, rate: f64) {
        {
            let mut state = self.state.lock();
            if state.playback_rate == rate {
                return;
            }
            state.playback_rate = rate;
        }
        self.emit(MediaEvent::RateChange);
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready_state
    }

    fn preload(&self) -> Preload {
        self.state.lock().preload
    }

    fn set_preload(&self, preload: Preload) {
        self.state.lock().preload = preload;
    }

    fn set_muted(&self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn load(&self) {
        {
            // 로드 알고리즘은 재생 위치와 속도를 초기화한다
            let mut state = self.state.lock();
            state.ready_state = ReadyState::HaveNothing;
            state.current_time = 0.0;
            state.playback_rate = state.default_playback_rate;
            state.load_count += 1;
        }
        let loader = self.loader.lock().clone();
        if let Some((scheduler, latency)) = loader {
            let me = self.me.clone();
            scheduler.schedule(
                latency,
                Box::new(move || {
                    if let Some(video) = me.upgrade() {
                        video.complete_load();
                    }
                }),
            );
        }
    }

    fn is_resetting(&self) -> bool {
        self.state.lock().resetting
    }

    fn set_resetting(&self, resetting: bool) {
        self.state.lock().resetting = resetting;
    }

    fn once_loaded_metadata(&self, callback: MetadataCallback) {
        self.metadata_callbacks.lock().push(callback);
    }

    fn set_controls(&self, visible: bool) {
        self.state.lock().controls = visible;
    }

    fn controls_setup(&self) -> bool {
        self.state.lock().controls_setup
    }

    fn mark_controls_setup(&self) {
        self.state.lock().controls_setup = true;
    }

    fn subscribe(&self, listener: MediaListener) {
        self.listeners.lock().push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use assert_matches::assert_matches;

    fn record(video: &SimulatedVideo) -> Arc<Mutex<Vec<MediaEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        video.subscribe(Arc::new(move |_: &dyn MediaElement, event: MediaEvent| {
            sink.lock().push(event)
        }));
        events
    }

    #[test]
    fn mutations_fire_native_events() {
        let video = SimulatedVideo::new("v", 10.0);
        let events = record(&video);

        video.play().unwrap();
        video.seek(2.0).unwrap();
        video.set_playback_rate(0.5);
        video.pause();
        // 상태가 같으면 이벤트 없음
        video.pause();
        video.set_playback_rate(0.5);

        assert_eq!(
            *events.lock(),
            vec![
                MediaEvent::Play,
                MediaEvent::Seeking,
                MediaEvent::Seeked,
                MediaEvent::RateChange,
                MediaEvent::Pause,
            ]
        );
    }

    #[test]
    fn out_of_range_seek_keeps_time() {
        let video = SimulatedVideo::new("v", 10.0);
        video.seek(3.0).unwrap();

        assert_matches!(video.seek(12.0), Err(MediaError::SeekOutOfRange { .. }));
        assert_matches!(video.seek(-1.0), Err(MediaError::SeekOutOfRange { .. }));
        assert_eq!(video.current_time(), 3.0);
    }

    #[test]
    fn unmuted_play_rejected_when_blocked() {
        let video = SimulatedVideo::new("v", 10.0);
        video.block_unmuted_autoplay(true);

        assert_matches!(video.play(), Err(MediaError::PlayRejected(_)));
        assert!(video.is_paused());

        video.set_muted(true);
        assert!(video.play().is_ok());
        assert!(!video.is_paused());
    }

    #[test]
    fn load_resets_rate_and_completes_with_callbacks() {
        let video = SimulatedVideo::lazy("v", 10.0);
        video.set_playback_rate(0.5);
        video.once_loaded_metadata(Box::new(|| {}));
        video.load();

        assert_eq!(video.playback_rate(), 1.0);
        assert_eq!(video.ready_state(), ReadyState::HaveNothing);
        assert_eq!(video.pending_metadata_callbacks(), 1);

        video.complete_load();
        assert_eq!(video.ready_state(), ReadyState::HaveEnoughData);
        assert_eq!(video.pending_metadata_callbacks(), 0);
        assert_eq!(video.load_count(), 1);
    }

    #[test]
    fn auto_complete_uses_scheduler() {
        let scheduler = Arc::new(ManualScheduler::new());
        let video = SimulatedVideo::lazy("v", 10.0);
        video.auto_complete_loads(scheduler.clone(), Duration::from_millis(30));
        let events = record(&video);

        video.load();
        assert!(events.lock().is_empty());
        scheduler.advance(Duration::from_millis(30));
        assert_eq!(*events.lock(), vec![MediaEvent::LoadedMetadata]);
    }

    #[test]
    fn tick_advances_by_rate_and_loops() {
        let video = SimulatedVideo::new("v", 4.0);
        video.set_playback_rate(0.5);
        video.play().unwrap();

        video.tick(Duration::from_secs(2));
        assert!((video.current_time() - 1.0).abs() < 1e-9);

        video.tick(Duration::from_secs(8));
        assert!((video.current_time() - 1.0).abs() < 1e-9);

        video.pause();
        video.tick(Duration::from_secs(1));
        assert!((video.current_time() - 1.0).abs() < 1e-9);
    }
}
