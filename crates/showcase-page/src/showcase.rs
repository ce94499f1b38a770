//! 페이지 전체 마운트.
//!
//! 순서: 설정 검증 → 재생 속도 적용 → 호버 컨트롤 → 변경 감시 시작 →
//! 섹션 마운트 → (뷰어 호스트가 있으면) 모델 뷰어 컨트롤 설치.

use serde::Serialize;
use showcase_core::config::ShowcaseConfig;
use showcase_core::error::CoreError;
use showcase_core::ports::viewer::ViewerHost;
use std::sync::Arc;
use tracing::info;

use crate::hover::HoverControls;
use crate::section::{MountContext, MountedSection, SectionReport};
use crate::speed::{SpeedObserver, SpeedPolicy};
use crate::viewer::ViewerControls;

/// 페이지 상태 요약
#[derive(Debug, Clone, Serialize)]
pub struct ShowcaseReport {
    pub sections: Vec<SectionReport>,
    pub observing: bool,
}

/// 마운트된 쇼케이스 페이지
pub struct Showcase {
    context: MountContext,
    sections: Vec<MountedSection>,
    speed: Arc<SpeedPolicy>,
    observer: Arc<SpeedObserver>,
    viewer_controls: Option<ViewerControls>,
}

impl Showcase {
    /// 설정대로 페이지 전체를 배선. 설정이 유효하지 않으면 아무것도 건드리지 않는다.
    pub fn mount(
        config: &ShowcaseConfig,
        context: MountContext,
        viewer_host: Option<&dyn ViewerHost>,
    ) -> Result<Self, CoreError> {
        config.validate()?;

        let speed = SpeedPolicy::new(config.speed.clone());
        speed.apply(context.page.as_ref());
        HoverControls::setup(context.page.as_ref());

        let observer = SpeedObserver::new(
            Arc::clone(&context.page),
            Arc::clone(&speed),
            true,
            Arc::clone(&context.scheduler),
            config.observer.clone(),
        );
        observer.start();

        let sections: Vec<MountedSection> = config
            .sections
            .iter()
            .filter_map(|section| MountedSection::mount(&context, config, section))
            .collect();

        let viewer_controls =
            viewer_host.map(|host| ViewerControls::install(host, config.viewer.time_scale()));

        info!(
            sections = sections.len(),
            configured = config.sections.len(),
            "쇼케이스 마운트 완료"
        );

        Ok(Self {
            context,
            sections,
            speed,
            observer,
            viewer_controls,
        })
    }

    pub fn context(&self) -> &MountContext {
        &self.context
    }

    pub fn sections(&self) -> &[MountedSection] {
        &self.sections
    }

    /// 이름으로 마운트된 섹션 조회
    pub fn section(&self, name: &str) -> Option<&MountedSection> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// 섹션의 세트 전환 (버튼 클릭 없이). 전환기가 없으면 `false`.
    pub fn show_set(&self, section: &str, set_id: &str) -> bool {
        match self.section(section).and_then(|s| s.switcher()) {
            Some(switcher) => {
                switcher.show_set(set_id);
                true
            }
            None => false,
        }
    }

    pub fn speed(&self) -> &Arc<SpeedPolicy> {
        &self.speed
    }

    pub fn observer(&self) -> &Arc<SpeedObserver> {
        &self.observer
    }

    pub fn viewer_controls(&self) -> Option<&ViewerControls> {
        self.viewer_controls.as_ref()
    }

    /// 변경 감시 해제
    pub fn disconnect(&self) {
        self.observer.disconnect();
    }

    pub fn report(&self) -> ShowcaseReport {
        ShowcaseReport {
            sections: self.sections.iter().map(|s| s.report()).collect(),
            observing: self.observer.is_observing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use showcase_core::ports::media::MediaElement;
    use showcase_runtime::sim::{MemoryPage, MemoryViewerHost};
    use showcase_runtime::ManualScheduler;

    const PAGE: &str = r##"{
        "videos": [
            {"id": "c1-a"}, {"id": "c1-b"}, {"id": "c2-a", "lazy": true}, {"id": "c2-b", "lazy": true},
            {"id": "ls-in"}, {"id": "ls-out"}, {"id": "loose"}
        ],
        "sections": [
            {
                "name": "consistent4d",
                "selector": ".video-table",
                "sets": [
                    {"id": "1", "rows": [["c1-a", "c1-b"]]},
                    {"id": "2", "rows": [["c2-a", "c2-b"]]}
                ],
                "buttons": ["1", "2"]
            },
            {"name": "longseq", "selector": "#longseq-grid", "rows": [["ls-in", "ls-out"]]}
        ],
        "load_latency_ms": 30
    }"##;

    fn mount() -> (Showcase, Arc<MemoryPage>, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let page = Arc::new(MemoryPage::from_json(PAGE, Some(scheduler.clone())).unwrap());
        let context = MountContext {
            page: page.clone(),
            view: page.clone(),
            scheduler: scheduler.clone(),
            clock: scheduler.clone(),
        };
        let showcase = Showcase::mount(&ShowcaseConfig::default_config(), context, None).unwrap();
        (showcase, page, scheduler)
    }

    #[test]
    fn mounts_only_present_sections() {
        let (showcase, page, _) = mount();

        let names: Vec<&str> = showcase.sections().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["consistent4d", "longseq"]);
        assert!(showcase.observer().is_observing());
        assert_eq!(page.observer_count(), 1);
        assert!(showcase.viewer_controls().is_none());
    }

    #[test]
    fn speed_and_hover_applied_on_mount() {
        let (_showcase, page, _) = mount();

        assert_eq!(page.video("ls-in").unwrap().playback_rate(), 0.8);
        assert_eq!(page.video("c1-a").unwrap().playback_rate(), 0.5);
        assert_eq!(page.video("loose").unwrap().playback_rate(), 1.0);
        assert!(!page.video("loose").unwrap().controls_visible());
    }

    #[test]
    fn show_set_switches_programmatically() {
        let (showcase, page, scheduler) = mount();

        assert!(showcase.show_set("consistent4d", "2"));
        assert!(!showcase.show_set("longseq", "2"));

        scheduler.advance(std::time::Duration::from_millis(40));
        let video = page.video("c2-a").unwrap();
        assert!(!video.is_paused());
        assert_eq!(video.playback_rate(), 0.5);

        let report = showcase.report();
        assert_eq!(report.sections[0].active_set.as_deref(), Some("2"));
        assert!(report.observing);
    }

    #[test]
    fn report_serializes_sections() {
        let (showcase, _, _) = mount();

        let json = serde_json::to_value(showcase.report()).unwrap();
        assert_eq!(json["observing"], true);
        assert_eq!(json["sections"][0]["name"], "consistent4d");
        assert_eq!(json["sections"][0]["active_set"], "1");
        assert_eq!(json["sections"][1]["active_set"], serde_json::Value::Null);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let scheduler = Arc::new(ManualScheduler::new());
        let page = Arc::new(MemoryPage::from_json(PAGE, None).unwrap());
        let context = MountContext {
            page: page.clone(),
            view: page.clone(),
            scheduler: scheduler.clone(),
            clock: scheduler,
        };
        let mut config = ShowcaseConfig::default_config();
        config.speed.default_rate = 0.0;

        let result = Showcase::mount(&config, context, None);
        assert_matches!(result.err(), Some(CoreError::Validation { .. }));
        assert_eq!(page.video("loose").unwrap().playback_rate(), 1.0);
    }

    #[test]
    fn installs_viewer_controls_when_host_given() {
        let scheduler = Arc::new(ManualScheduler::new());
        let page = Arc::new(MemoryPage::from_json(PAGE, None).unwrap());
        let context = MountContext {
            page: page.clone(),
            view: page.clone(),
            scheduler: scheduler.clone(),
            clock: scheduler,
        };
        let host = MemoryViewerHost::new();
        host.add_viewer("fox");
        host.add_play_pause_button(Some("fox"));

        let showcase =
            Showcase::mount(&ShowcaseConfig::default_config(), context, Some(&host)).unwrap();
        let controls = showcase.viewer_controls().unwrap();
        assert_eq!(controls.viewer_count(), 1);
        assert_eq!(controls.controls().len(), 1);
    }
}
