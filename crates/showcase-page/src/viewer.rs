//! 3D 모델 뷰어.
//!
//! [`GlbViewer`]는 컨테이너 안에 모델 뷰어 요소와 선택적인 재생/일시정지
//! 버튼을 만든다. [`ViewerControls`]는 페이지에 이미 있는 뷰어에
//! 애니메이션 시간 배율을 적용하고 `data-viewer` 버튼을 연결한다.

use showcase_core::error::CoreError;
use showcase_core::models::viewer::{play_pause_label, ViewerEvent};
use showcase_core::ports::viewer::{ButtonRef, ModelViewer, ViewerHost, ViewerRef};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================
// GlbViewer
// ============================================================

/// 모델 뷰어 생성 옵션
#[derive(Debug, Clone, PartialEq)]
pub struct GlbViewerOptions {
    /// 모델 파일 경로 (필수)
    pub src: String,
    pub exposure: f64,
    pub shadow_intensity: f64,
    pub camera_orbit: String,
    pub field_of_view: String,
    /// 재생/일시정지 버튼 표시
    pub show_controls: bool,
    pub autoplay: bool,
    pub ar: bool,
    pub neutral_lighting: bool,
    pub animation_playback_rate: f64,
}

impl Default for GlbViewerOptions {
    fn default() -> Self {
        Self {
            src: String::new(),
            exposure: 1.0,
            shadow_intensity: 0.0,
            camera_orbit: "30deg 60deg 2.5m".to_string(),
            field_of_view: "30deg".to_string(),
            show_controls: true,
            autoplay: true,
            ar: true,
            neutral_lighting: true,
            animation_playback_rate: 0.27,
        }
    }
}

impl GlbViewerOptions {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }
}

/// AR 지원 모드
const AR_MODES: &str = "webxr scene-viewer quick-look";

/// 생성된 모델 뷰어
pub struct GlbViewer {
    viewer: ViewerRef,
    control: Option<Arc<PlayPauseControl>>,
}

impl GlbViewer {
    /// 컨테이너 안에 뷰어 생성. `src`가 비어 있으면 `Validation` 에러.
    pub fn create(
        host: &dyn ViewerHost,
        container: &str,
        options: &GlbViewerOptions,
    ) -> Result<Self, CoreError> {
        if options.src.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "src".to_string(),
                message: "모델 경로가 필요합니다".to_string(),
            });
        }

        let viewer = host.create_viewer(container)?;
        viewer.set_attribute("src", &options.src);
        viewer.set_attribute("camera-controls", "");
        viewer.set_attribute("shadow-intensity", &options.shadow_intensity.to_string());
        viewer.set_attribute("exposure", &options.exposure.to_string());
        viewer.set_attribute("camera-orbit", &options.camera_orbit);
        viewer.set_attribute("field-of-view", &options.field_of_view);
        viewer.set_attribute("touch-action", "pan-y");
        if options.neutral_lighting {
            viewer.set_attribute("neutral-lighting", "");
        }
        if options.autoplay {
            viewer.set_attribute("autoplay", "");
        }
        viewer.set_attribute(
            "animation-playback-rate",
            &options.animation_playback_rate.to_string(),
        );
        if options.ar {
            viewer.set_attribute("ar", "");
            viewer.set_attribute("ar-modes", AR_MODES);
        }

        let control = if options.show_controls {
            let button = host.create_button(container, play_pause_label(options.autoplay))?;
            Some(PlayPauseControl::bind(
                Arc::clone(&viewer),
                button,
                options.autoplay,
            ))
        } else {
            None
        };

        info!(viewer = viewer.id(), src = %options.src, "모델 뷰어 생성");
        Ok(Self { viewer, control })
    }

    pub fn viewer(&self) -> &ViewerRef {
        &self.viewer
    }

    pub fn control(&self) -> Option<&Arc<PlayPauseControl>> {
        self.control.as_ref()
    }
}

// ============================================================
// PlayPauseControl
// ============================================================

/// 뷰어 재생/일시정지 토글 버튼
pub struct PlayPauseControl {
    viewer: ViewerRef,
    button: ButtonRef,
    playing: AtomicBool,
}

impl PlayPauseControl {
    /// 버튼 클릭을 뷰어 토글에 연결
    pub fn bind(viewer: ViewerRef, button: ButtonRef, playing: bool) -> Arc<Self> {
        let control = Arc::new(Self {
            viewer,
            button,
            playing: AtomicBool::new(playing),
        });
        let weak = Arc::downgrade(&control);
        control.button.on_click(Arc::new(move || {
            if let Some(control) = weak.upgrade() {
                control.toggle();
            }
        }));
        control
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// 재생 상태 반전 후 뷰어와 버튼 라벨 갱신
    pub fn toggle(&self) {
        let playing = !self.playing.fetch_xor(true, Ordering::AcqRel);
        if playing {
            self.viewer.play();
        } else {
            self.viewer.pause();
        }
        self.button.set_label(play_pause_label(playing));
    }
}

// ============================================================
// ViewerControls
// ============================================================

/// 페이지 뷰어 일괄 설정
pub struct ViewerControls {
    controls: Vec<Arc<PlayPauseControl>>,
    viewers: usize,
}

impl ViewerControls {
    /// 모든 뷰어에 로드/씬 그래프 준비 시 `time_scale`을 적용하고,
    /// 대상 뷰어가 있는 재생/일시정지 버튼을 연결한다.
    pub fn install(host: &dyn ViewerHost, time_scale: f64) -> Self {
        let viewers = host.viewers();
        for viewer in &viewers {
            viewer.subscribe(Arc::new(move |viewer: &dyn ModelViewer, event: ViewerEvent| {
                match event {
                    ViewerEvent::Load | ViewerEvent::SceneGraphReady => {
                        viewer.set_time_scale(time_scale);
                    }
                }
            }));
        }

        let mut controls = Vec::new();
        for button in host.play_pause_buttons() {
            let target = button.target_viewer();
            let Some(viewer) = target.as_deref().and_then(|id| host.viewer_by_id(id)) else {
                debug!(target = ?target, "대상 뷰어 없음: 버튼 건너뜀");
                continue;
            };
            controls.push(PlayPauseControl::bind(viewer, button, true));
        }

        info!(
            viewers = viewers.len(),
            buttons = controls.len(),
            time_scale,
            "모델 뷰어 컨트롤 설치"
        );
        Self {
            controls,
            viewers: viewers.len(),
        }
    }

    pub fn controls(&self) -> &[Arc<PlayPauseControl>] {
        &self.controls
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers
    }
}
