//! 섹션 마운트.
//!
//! 설정 하나(`SectionConfig`)와 페이지 스캔 결과(`SectionLayout`)로
//! 그룹 동기화기와 세트 전환기를 만들고 버튼 클릭을 연결한다.
//! 컨테이너가 없으면 아무것도 설정하지 않는다.

use serde::Serialize;
use showcase_core::config::{SectionConfig, ShowcaseConfig};
use showcase_core::models::layout::GroupShape;
use showcase_core::ports::media::{MediaElementExt, MediaRef};
use showcase_core::ports::page::{PageDocument, SetView};
use showcase_core::ports::scheduler::{Clock, Scheduler};
use showcase_sync::{
    SetActivity, SetSwitcher, SwitchPolicy, SyncPolicy, SyncStats, VideoGroupSynchronizer,
    VideoSet,
};
use std::sync::Arc;
use tracing::{debug, info};

/// 마운트에 필요한 호스트 포트 묶음
#[derive(Clone)]
pub struct MountContext {
    pub page: Arc<dyn PageDocument>,
    pub view: Arc<dyn SetView>,
    pub scheduler: Arc<dyn Scheduler>,
    pub clock: Arc<dyn Clock>,
}

/// 섹션 상태 요약 (리포트용)
#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub name: String,
    pub active_set: Option<String>,
    pub groups: usize,
    pub videos: usize,
    pub sync: SyncStats,
}

/// 마운트된 섹션
///
/// 동기화기와 전환기의 강한 참조를 소유한다. drop되면 이벤트 리스너와
/// 버튼 핸들러는 남아 있어도 아무 동작도 하지 않는다.
pub struct MountedSection {
    name: String,
    groups: Vec<Arc<VideoGroupSynchronizer>>,
    switcher: Option<Arc<SetSwitcher>>,
    videos: Vec<MediaRef>,
}

impl MountedSection {
    /// 섹션 마운트. 컨테이너가 없으면 `None`.
    pub fn mount(
        context: &MountContext,
        config: &ShowcaseConfig,
        section: &SectionConfig,
    ) -> Option<Self> {
        let Some(layout) = context.page.section_layout(section) else {
            debug!(section = %section.name, "컨테이너 없음: 섹션 건너뜀");
            return None;
        };

        let policy = section.sync.as_ref().map(SyncPolicy::from);
        let gated = section.switching.is_some();
        let mut groups = Vec::new();
        let mut sets = Vec::with_capacity(layout.sets.len());

        for set_layout in &layout.sets {
            let set = VideoSet::new(set_layout.id.clone(), set_layout.videos.clone());
            if let Some(policy) = policy {
                let activity = gated.then(|| set.activity.clone());
                let label = format!("{}/{}", section.name, set.id);
                groups.extend(build_groups(
                    context,
                    &label,
                    &set_layout.rows,
                    section.group_shape,
                    policy,
                    activity,
                ));
            }
            sets.push(set);
        }

        // 세트 밖의 행은 항상 동기화
        if let Some(policy) = policy {
            groups.extend(build_groups(
                context,
                &section.name,
                &layout.rows,
                section.group_shape,
                policy,
                None,
            ));
        }

        let switcher = match &section.switching {
            Some(switching) if !sets.is_empty() => {
                let rate = config.section_rate(section);
                let switcher = SetSwitcher::new(
                    section.name.clone(),
                    sets,
                    layout.buttons.clone(),
                    Arc::clone(&context.view),
                    Arc::clone(&context.scheduler),
                    SwitchPolicy::new(rate, switching),
                );

                let weak = Arc::downgrade(&switcher);
                context.page.on_set_button_click(
                    section,
                    Arc::new(move |set_id: &str| {
                        if let Some(switcher) = weak.upgrade() {
                            switcher.show_set(set_id);
                        }
                    }),
                );
                switcher.show_set(&switching.initial_set);
                Some(switcher)
            }
            Some(_) => {
                debug!(section = %section.name, "세트 없음: 전환기 생략");
                None
            }
            None => None,
        };

        if section.autoplay_on_mount {
            for video in &layout.videos {
                video.set_muted(true);
                video.request_play();
            }
        }

        info!(
            section = %section.name,
            groups = groups.len(),
            sets = switcher.as_ref().map(|s| s.sets().len()).unwrap_or(0),
            videos = layout.videos.len(),
            "섹션 마운트"
        );

        Some(Self {
            name: section.name.clone(),
            groups,
            switcher,
            videos: layout.videos,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groups(&self) -> &[Arc<VideoGroupSynchronizer>] {
        &self.groups
    }

    pub fn switcher(&self) -> Option<&Arc<SetSwitcher>> {
        self.switcher.as_ref()
    }

    pub fn videos(&self) -> &[MediaRef] {
        &self.videos
    }

    /// 현재 활성 세트 (전환기가 없으면 `None`)
    pub fn active_set(&self) -> Option<String> {
        self.switcher.as_ref().and_then(|s| s.active_set())
    }

    /// 모든 그룹의 카운터 합계
    pub fn sync_stats(&self) -> SyncStats {
        self.groups
            .iter()
            .map(|g| g.stats())
            .fold(SyncStats::default(), |acc, s| SyncStats {
                passes: acc.passes + s.passes,
                dropped_reentrant: acc.dropped_reentrant + s.dropped_reentrant,
                throttled: acc.throttled + s.throttled,
                gated: acc.gated + s.gated,
            })
    }

    pub fn report(&self) -> SectionReport {
        SectionReport {
            name: self.name.clone(),
            active_set: self.active_set(),
            groups: self.groups.len(),
            videos: self.videos.len(),
            sync: self.sync_stats(),
        }
    }
}

/// 행들을 그룹으로 나누고 각 그룹의 동기화기를 연결.
/// 멤버가 하나뿐인 그룹은 맞출 대상이 없으므로 만들지 않는다.
fn build_groups(
    context: &MountContext,
    label: &str,
    rows: &[Vec<MediaRef>],
    shape: GroupShape,
    policy: SyncPolicy,
    activity: Option<SetActivity>,
) -> Vec<Arc<VideoGroupSynchronizer>> {
    rows.iter()
        .flat_map(|row| shape.partition(row))
        .filter(|members| members.len() > 1)
        .enumerate()
        .map(|(index, members)| {
            let sync = Arc::new(
                VideoGroupSynchronizer::new(
                    members,
                    policy,
                    activity.clone(),
                    Arc::clone(&context.clock),
                )
                .with_label(format!("{label}#{index}")),
            );
            sync.attach();
            sync
        })
        .collect()
}
