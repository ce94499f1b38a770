//! 인메모리 페이지 문서.
//!
//! `PageFixture`(JSON)로 섹션/세트/행/버튼 구조를 기술하고,
//! `PageDocument` + `SetView` 포트를 구현한다.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use showcase_core::config::SectionConfig;
use showcase_core::error::CoreError;
use showcase_core::models::media::PlaybackSnapshot;
use showcase_core::ports::media::{MediaElement, MediaRef};
use showcase_core::ports::page::{
    MutationCallback, PageDocument, SectionLayout, SetClickHandler, SetLayout, SetView,
};
use showcase_core::ports::scheduler::Scheduler;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::video::SimulatedVideo;

// ============================================================
// 픽스처
// ============================================================

/// 비디오 정의
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoFixture {
    pub id: String,
    /// 길이 (초)
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// `preload="none"`으로 시작
    #[serde(default)]
    pub lazy: bool,
    /// 음소거되지 않은 재생을 거부
    #[serde(default)]
    pub block_unmuted_autoplay: bool,
}

/// 세트 정의
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFixture {
    pub id: String,
    /// 행 (비디오 ID 목록)
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    /// 행에 속하지 않은 비디오
    #[serde(default)]
    pub extra: Vec<String>,
}

/// 섹션 정의 (섹션 이름으로 `SectionConfig`와 연결)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionFixture {
    pub name: String,
    /// 컨테이너 선택자 (속도 정책/변경 감시용)
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub sets: Vec<SetFixture>,
    /// 세트 밖의 행
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    /// 버튼의 `data-set` 값
    #[serde(default)]
    pub buttons: Vec<String>,
}

/// 섹션이 아닌 단순 컨테이너 (예: 캐러셀)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerFixture {
    pub selector: String,
    #[serde(default)]
    pub videos: Vec<String>,
}

/// 페이지 전체 정의
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub videos: Vec<VideoFixture>,
    #[serde(default)]
    pub sections: Vec<SectionFixture>,
    #[serde(default)]
    pub containers: Vec<ContainerFixture>,
    /// 지연 로드 완료까지 걸리는 시간 (밀리초, 없으면 수동 완료)
    #[serde(default)]
    pub load_latency_ms: Option<u64>,
}

fn default_duration() -> f64 {
    10.0
}

// ============================================================
// MemoryPage
// ============================================================

struct Observer {
    selectors: Vec<String>,
    callback: MutationCallback,
}

#[derive(Default)]
struct PageState {
    containers: BTreeMap<String, Vec<String>>,
    observers: Vec<Observer>,
    click_handlers: HashMap<String, Vec<SetClickHandler>>,
    active_sets: BTreeMap<(String, String), bool>,
    active_buttons: BTreeMap<(String, String), bool>,
}

/// 인메모리 페이지
pub struct MemoryPage {
    videos: Mutex<Vec<Arc<SimulatedVideo>>>,
    sections: Vec<SectionFixture>,
    state: Mutex<PageState>,
}

impl MemoryPage {
    /// 픽스처로 페이지 구성. 정의되지 않은 비디오 ID를 참조하면 `NotFound`.
    pub fn from_fixture(
        fixture: PageFixture,
        scheduler: Option<Arc<dyn Scheduler>>,
    ) -> Result<Self, CoreError> {
        let latency = fixture.load_latency_ms.map(Duration::from_millis);
        let mut videos = Vec::with_capacity(fixture.videos.len());
        for def in &fixture.videos {
            let video = if def.lazy {
                SimulatedVideo::lazy(def.id.clone(), def.duration)
            } else {
                SimulatedVideo::new(def.id.clone(), def.duration)
            };
            video.block_unmuted_autoplay(def.block_unmuted_autoplay);
            if let (Some(scheduler), Some(latency)) = (&scheduler, latency) {
                video.auto_complete_loads(Arc::clone(scheduler), latency);
            }
            videos.push(video);
        }

        let page = Self {
            videos: Mutex::new(videos),
            sections: fixture.sections,
            state: Mutex::new(PageState::default()),
        };

        for section in &page.sections {
            let ids = section
                .sets
                .iter()
                .flat_map(|s| s.rows.iter().flatten().chain(s.extra.iter()))
                .chain(section.rows.iter().flatten());
            for id in ids {
                page.require(id)?;
            }
        }
        {
            let mut state = page.state.lock();
            for container in fixture.containers {
                for id in &container.videos {
                    page.require(id)?;
                }
                state.containers.insert(container.selector, container.videos);
            }
        }
        Ok(page)
    }

    /// JSON 문자열로 페이지 구성
    pub fn from_json(json: &str, scheduler: Option<Arc<dyn Scheduler>>) -> Result<Self, CoreError> {
        let fixture: PageFixture = serde_json::from_str(json)?;
        Self::from_fixture(fixture, scheduler)
    }

    /// ID로 비디오 조회
    pub fn video(&self, id: &str) -> Option<Arc<SimulatedVideo>> {
        self.videos.lock().iter().find(|v| v.id() == id).cloned()
    }

    /// 모든 비디오의 상태 스냅샷 (정의 순서)
    pub fn snapshots(&self) -> Vec<PlaybackSnapshot> {
        self.videos.lock().iter().map(|v| v.snapshot()).collect()
    }

    /// 세트 버튼 클릭 시뮬레이션.
    ///
    /// 페이지에 없는 버튼이면 `NotFound`를 돌려주고 핸들러를 부르지 않는다.
    pub fn click_set_button(&self, section: &str, set_id: &str) -> Result<(), CoreError> {
        let exists = self
            .section_fixture(section)
            .is_some_and(|fixture| fixture.buttons.iter().any(|b| b == set_id));
        if !exists {
            return Err(CoreError::NotFound {
                resource_type: "SetButton".to_string(),
                id: format!("{section}/{set_id}"),
            });
        }

        let handlers = self
            .state
            .lock()
            .click_handlers
            .get(section)
            .cloned()
            .unwrap_or_default();
        if handlers.is_empty() {
            warn!(section, set_id, "클릭 핸들러가 없는 섹션");
        }
        for handler in handlers {
            handler(set_id);
        }
        Ok(())
    }

    /// 재생 중인 모든 비디오의 시간 진행
    pub fn tick(&self, elapsed: Duration) {
        let videos = self.videos.lock().clone();
        for video in videos {
            video.tick(elapsed);
        }
    }

    /// 컨테이너에 비디오 추가: 컨테이너를 감시 중인 옵저버에 알림
    pub fn insert_video(&self, selector: &str, fixture: VideoFixture) -> Arc<SimulatedVideo> {
        let video = if fixture.lazy {
            SimulatedVideo::lazy(fixture.id.clone(), fixture.duration)
        } else {
            SimulatedVideo::new(fixture.id.clone(), fixture.duration)
        };
        self.videos.lock().push(Arc::clone(&video));

        let callbacks: Vec<MutationCallback> = {
            let mut state = self.state.lock();
            state
                .containers
                .entry(selector.to_string())
                .or_default()
                .push(fixture.id);
            state
                .observers
                .iter()
                .filter(|o| o.selectors.iter().any(|s| s == selector))
                .map(|o| Arc::clone(&o.callback))
                .collect()
        };
        debug!(selector, observers = callbacks.len(), "비디오 추가");
        for callback in callbacks {
            callback();
        }
        video
    }

    /// 빈 컨테이너 추가 (감시 재시도 시나리오용)
    pub fn add_container(&self, selector: &str) {
        self.state
            .lock()
            .containers
            .entry(selector.to_string())
            .or_default();
    }

    /// 세트 활성 표시 여부
    pub fn is_set_active(&self, section: &str, set_id: &str) -> bool {
        let key = (section.to_string(), set_id.to_string());
        self.state.lock().active_sets.get(&key).copied().unwrap_or(false)
    }

    /// 버튼 활성 표시 여부
    pub fn is_button_active(&self, section: &str, set_id: &str) -> bool {
        let key = (section.to_string(), set_id.to_string());
        self.state.lock().active_buttons.get(&key).copied().unwrap_or(false)
    }

    /// 섹션에서 활성 표시된 세트 ID
    pub fn active_sets(&self, section: &str) -> Vec<String> {
        self.state
            .lock()
            .active_sets
            .iter()
            .filter(|((s, _), active)| s == section && **active)
            .map(|((_, id), _)| id.clone())
            .collect()
    }

    /// 등록된 옵저버 수
    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    fn require(&self, id: &str) -> Result<MediaRef, CoreError> {
        self.video(id)
            .map(|v| v as MediaRef)
            .ok_or_else(|| CoreError::NotFound {
                resource_type: "Video".to_string(),
                id: id.to_string(),
            })
    }

    fn resolve(&self, ids: &[String]) -> Vec<MediaRef> {
        ids.iter().filter_map(|id| self.require(id).ok()).collect()
    }

    fn section_fixture(&self, name: &str) -> Option<&SectionFixture> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_videos(&self, section: &SectionFixture) -> Vec<MediaRef> {
        let mut ids: Vec<String> = Vec::new();
        for set in &section.sets {
            ids.extend(set.rows.iter().flatten().cloned());
            ids.extend(set.extra.iter().cloned());
        }
        ids.extend(section.rows.iter().flatten().cloned());
        self.resolve(&ids)
    }

    fn container_exists(&self, selector: &str) -> bool {
        self.state.lock().containers.contains_key(selector)
            || self
                .sections
                .iter()
                .any(|s| s.selector.as_deref() == Some(selector))
    }
}

impl PageDocument for MemoryPage {
    fn section_layout(&self, section: &SectionConfig) -> Option<SectionLayout> {
        let fixture = self.section_fixture(&section.name)?;

        let sets = fixture
            .sets
            .iter()
            .map(|set| {
                let rows: Vec<Vec<MediaRef>> = set.rows.iter().map(|r| self.resolve(r)).collect();
                let mut videos: Vec<MediaRef> = rows.iter().flatten().cloned().collect();
                videos.extend(self.resolve(&set.extra));
                SetLayout {
                    id: set.id.clone(),
                    rows,
                    videos,
                }
            })
            .collect();

        Some(SectionLayout {
            sets,
            rows: fixture.rows.iter().map(|r| self.resolve(r)).collect(),
            buttons: fixture.buttons.clone(),
            videos: self.section_videos(fixture),
        })
    }

    fn videos_in(&self, selector: &str) -> Vec<MediaRef> {
        let mut videos: Vec<MediaRef> = self
            .sections
            .iter()
            .filter(|s| s.selector.as_deref() == Some(selector))
            .flat_map(|s| self.section_videos(s))
            .collect();
        let ids = self.state.lock().containers.get(selector).cloned();
        if let Some(ids) = ids {
            videos.extend(self.resolve(&ids));
        }
        videos
    }

    fn all_videos(&self) -> Vec<MediaRef> {
        self.videos
            .lock()
            .iter()
            .map(|v| Arc::clone(v) as MediaRef)
            .collect()
    }

    fn observe_mutations(&self, selectors: &[String], callback: MutationCallback) -> usize {
        let observed: Vec<String> = selectors
            .iter()
            .filter(|s| self.container_exists(s))
            .cloned()
            .collect();
        let count = observed.len();
        if count > 0 {
            self.state.lock().observers.push(Observer {
                selectors: observed,
                callback,
            });
        }
        count
    }

    fn disconnect_observers(&self) {
        self.state.lock().observers.clear();
    }

    fn on_set_button_click(&self, section: &SectionConfig, handler: SetClickHandler) {
        self.state
            .lock()
            .click_handlers
            .entry(section.name.clone())
            .or_default()
            .push(handler);
    }
}

impl SetView for MemoryPage {
    fn mark_set(&self, section: &str, set_id: &str, active: bool) {
        self.state
            .lock()
            .active_sets
            .insert((section.to_string(), set_id.to_string()), active);
    }

    fn mark_button(&self, section: &str, set_id: &str, active: bool) {
        self.state
            .lock()
            .active_buttons
            .insert((section.to_string(), set_id.to_string()), active);
    }
}
