//! 인메모리 모델 뷰어 호스트.

use parking_lot::Mutex;
use showcase_core::error::CoreError;
use showcase_core::models::viewer::{ViewerEvent, PAUSE_LABEL};
use showcase_core::ports::viewer::{
    ButtonRef, ClickListener, ControlButton, ModelViewer, ViewerHost, ViewerListener, ViewerRef,
};
use std::collections::BTreeSet;
use std::sync::Arc;

// ============================================================
// SimulatedViewer
// ============================================================

#[derive(Default)]
struct ViewerState {
    attributes: Vec<(String, String)>,
    playing: bool,
    time_scale: f64,
    play_calls: u32,
    pause_calls: u32,
}

/// 시뮬레이션 모델 뷰어
pub struct SimulatedViewer {
    id: String,
    container: String,
    state: Mutex<ViewerState>,
    listeners: Mutex<Vec<ViewerListener>>,
}

impl SimulatedViewer {
    pub fn new(id: impl Into<String>, container: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            container: container.into(),
            state: Mutex::new(ViewerState {
                time_scale: 1.0,
                ..ViewerState::default()
            }),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// 속성 값 조회 (마지막으로 설정된 값)
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .attributes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// 설정된 속성 이름 (설정 순서)
    pub fn attribute_names(&self) -> Vec<String> {
        self.state
            .lock()
            .attributes
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn time_scale(&self) -> f64 {
        self.state.lock().time_scale
    }

    /// (play 호출 수, pause 호출 수)
    pub fn calls(&self) -> (u32, u32) {
        let state = self.state.lock();
        (state.play_calls, state.pause_calls)
    }

    /// 뷰어 이벤트 발생
    pub fn emit(&self, event: ViewerEvent) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener(self, event);
        }
    }
}

impl ModelViewer for SimulatedViewer {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.state
            .lock()
            .attributes
            .push((name.to_string(), value.to_string()));
    }

    fn play(&self) {
        let mut state = self.state.lock();
        state.playing = true;
        state.play_calls += 1;
    }

    fn pause(&self) {
        let mut state = self.state.lock();
        state.playing = false;
        state.pause_calls += 1;
    }

    fn set_time_scale(&self, scale: f64) {
        self.state.lock().time_scale = scale;
    }

    fn subscribe(&self, listener: ViewerListener) {
        self.listeners.lock().push(listener);
    }
}

// ============================================================
// SimulatedButton
// ============================================================

/// 시뮬레이션 버튼
pub struct SimulatedButton {
    target: Option<String>,
    label: Mutex<String>,
    listeners: Mutex<Vec<ClickListener>>,
}

impl SimulatedButton {
    pub fn new(target: Option<String>, label: &str) -> Arc<Self> {
        Arc::new(Self {
            target,
            label: Mutex::new(label.to_string()),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn label(&self) -> String {
        self.label.lock().clone()
    }

    /// 클릭 시뮬레이션
    pub fn click(&self) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener();
        }
    }
}

impl ControlButton for SimulatedButton {
    fn target_viewer(&self) -> Option<String> {
        self.target.clone()
    }

    fn set_label(&self, label: &str) {
        *self.label.lock() = label.to_string();
    }

    fn on_click(&self, listener: ClickListener) {
        self.listeners.lock().push(listener);
    }
}

// ============================================================
// MemoryViewerHost
// ============================================================

#[derive(Default)]
struct HostState {
    containers: BTreeSet<String>,
    viewers: Vec<Arc<SimulatedViewer>>,
    buttons: Vec<Arc<SimulatedButton>>,
    play_pause_buttons: Vec<Arc<SimulatedButton>>,
}

/// 인메모리 뷰어 호스트
#[derive(Default)]
pub struct MemoryViewerHost {
    state: Mutex<HostState>,
}

impl MemoryViewerHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// 컨테이너 추가
    pub fn add_container(&self, id: &str) {
        self.state.lock().containers.insert(id.to_string());
    }

    /// 페이지에 미리 존재하는 뷰어 추가
    pub fn add_viewer(&self, id: &str) -> Arc<SimulatedViewer> {
        let viewer = SimulatedViewer::new(id, "");
        self.state.lock().viewers.push(Arc::clone(&viewer));
        viewer
    }

    /// `data-viewer` 대상을 가진 재생/일시정지 버튼 추가
    pub fn add_play_pause_button(&self, target: Option<&str>) -> Arc<SimulatedButton> {
        let button = SimulatedButton::new(target.map(String::from), PAUSE_LABEL);
        self.state.lock().play_pause_buttons.push(Arc::clone(&button));
        button
    }

    /// 컨테이너 안에 생성된 버튼들
    pub fn created_buttons(&self) -> Vec<Arc<SimulatedButton>> {
        self.state.lock().buttons.clone()
    }

    /// ID로 시뮬레이션 뷰어 조회
    pub fn simulated_viewer(&self, id: &str) -> Option<Arc<SimulatedViewer>> {
        self.state.lock().viewers.iter().find(|v| v.id() == id).cloned()
    }

    fn require_container(&self, container: &str) -> Result<(), CoreError> {
        if self.state.lock().containers.contains(container) {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                resource_type: "Container".to_string(),
                id: container.to_string(),
            })
        }
    }
}

impl ViewerHost for MemoryViewerHost {
    fn create_viewer(&self, container: &str) -> Result<ViewerRef, CoreError> {
        self.require_container(container)?;
        let mut state = self.state.lock();
        let id = format!("{}-viewer-{}", container, state.viewers.len() + 1);
        let viewer = SimulatedViewer::new(id, container);
        state.viewers.push(Arc::clone(&viewer));
        Ok(viewer)
    }

    fn create_button(&self, container: &str, label: &str) -> Result<ButtonRef, CoreError> {
        self.require_container(container)?;
        let button = SimulatedButton::new(None, label);
        self.state.lock().buttons.push(Arc::clone(&button));
        Ok(button)
    }

    fn viewers(&self) -> Vec<ViewerRef> {
        self.state
            .lock()
            .viewers
            .iter()
            .map(|v| Arc::clone(v) as ViewerRef)
            .collect()
    }

    fn viewer_by_id(&self, id: &str) -> Option<ViewerRef> {
        self.simulated_viewer(id).map(|v| v as ViewerRef)
    }

    fn play_pause_buttons(&self) -> Vec<ButtonRef> {
        self.state
            .lock()
            .play_pause_buttons
            .iter()
            .map(|b| Arc::clone(b) as ButtonRef)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn create_viewer_requires_container() {
        let host = MemoryViewerHost::new();
        let result = host.create_viewer("missing");
        assert_matches!(result.err(), Some(CoreError::NotFound { id, .. }) if id == "missing");

        host.add_container("stage");
        let viewer = host.create_viewer("stage").unwrap();
        assert_eq!(viewer.id(), "stage-viewer-1");
        assert_eq!(host.viewers().len(), 1);
        assert!(host.viewer_by_id("stage-viewer-1").is_some());
    }

    #[test]
    fn attributes_keep_last_value() {
        let viewer = SimulatedViewer::new("v", "stage");
        viewer.set_attribute("src", "a.glb");
        viewer.set_attribute("src", "b.glb");
        viewer.set_attribute("autoplay", "");
        assert_eq!(viewer.attribute("src").as_deref(), Some("b.glb"));
        assert_eq!(viewer.attribute("autoplay").as_deref(), Some(""));
        assert_eq!(viewer.attribute("camera-controls"), None);
        assert_eq!(viewer.attribute_names(), vec!["src", "src", "autoplay"]);
    }

    #[test]
    fn emit_reaches_subscribers() {
        let viewer = SimulatedViewer::new("v", "stage");
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        viewer.subscribe(Arc::new(move |v: &dyn ModelViewer, event: ViewerEvent| {
            assert_eq!(v.id(), "v");
            if event == ViewerEvent::Load {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        viewer.emit(ViewerEvent::Load);
        viewer.emit(ViewerEvent::SceneGraphReady);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn button_click_and_label() {
        let host = MemoryViewerHost::new();
        let button = host.add_play_pause_button(Some("hero"));
        assert_eq!(button.label(), PAUSE_LABEL);
        assert_eq!(button.target_viewer().as_deref(), Some("hero"));

        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&clicks);
        button.on_click(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        button.click();
        button.click();
        assert_eq!(clicks.load(Ordering::SeqCst), 2);

        button.set_label("▶ Play");
        assert_eq!(button.label(), "▶ Play");
        assert_eq!(host.play_pause_buttons().len(), 1);
    }
}
