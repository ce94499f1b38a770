//! 재생 시나리오.
//!
//! 시나리오는 사용자 조작과 시간 경과를 순서대로 기술한 JSON 문서다.
//! [`Replay`]가 인메모리 페이지에 쇼케이스를 마운트하고 단계를 적용한 뒤
//! 모든 비디오 상태와 섹션 상태를 [`ReplayReport`]로 모은다.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use showcase_core::config::ShowcaseConfig;
use showcase_core::error::CoreError;
use showcase_core::models::media::{MediaEvent, PlaybackSnapshot};
use showcase_core::ports::media::{MediaElement, MediaElementExt};
use showcase_core::ports::scheduler::{Clock, Scheduler};
use showcase_page::showcase::ShowcaseReport;
use showcase_page::{MountContext, Showcase};
use showcase_runtime::sim::{MemoryPage, PageFixture, SimulatedVideo, VideoFixture};
use showcase_runtime::{ManualScheduler, SystemClock, TokioScheduler};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 시나리오 문서
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// 시나리오 단계
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// 세트 버튼 클릭
    Click { section: String, set: String },
    /// 비디오 재생 (사용자 조작)
    Play { video: String },
    /// 비디오 일시정지
    Pause { video: String },
    /// 재생 위치 이동
    Seek { video: String, time: f64 },
    /// 재생 속도 변경
    Rate { video: String, rate: f64 },
    /// 마우스 진입/이탈
    Hover {
        video: String,
        #[serde(default)]
        leave: bool,
    },
    /// 메타데이터 로드 완료 (로드 지연이 없는 픽스처용)
    Load { video: String },
    /// 컨테이너에 비디오 추가
    Insert {
        container: String,
        video: VideoFixture,
    },
    /// 시간 경과
    Tick {
        ms: u64,
        #[serde(default = "default_step_ms")]
        step_ms: u64,
    },
}

fn default_step_ms() -> u64 {
    50
}

/// 재생 결과 리포트
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: usize,
    pub elapsed_ms: u64,
    pub videos: Vec<PlaybackSnapshot>,
    pub showcase: ShowcaseReport,
}

/// 시간 진행 방식
enum Driver {
    /// 가상 시간: 결정적
    Virtual(Arc<ManualScheduler>),
    /// tokio 타이머와 실제 시간
    Realtime,
}

/// 시나리오 재생기
pub struct Replay {
    page: Arc<MemoryPage>,
    showcase: Showcase,
    driver: Driver,
    steps: AtomicU64,
    elapsed_ms: AtomicU64,
}

impl Replay {
    /// 픽스처로 페이지를 만들고 쇼케이스 마운트.
    ///
    /// `realtime`이면 현재 tokio 런타임의 타이머를 쓴다.
    pub fn new(config: &ShowcaseConfig, fixture: PageFixture, realtime: bool) -> Result<Self> {
        let (scheduler, clock, driver): (Arc<dyn Scheduler>, Arc<dyn Clock>, Driver) = if realtime {
            (
                Arc::new(TokioScheduler::current()),
                Arc::new(SystemClock::new()),
                Driver::Realtime,
            )
        } else {
            let manual = Arc::new(ManualScheduler::new());
            (manual.clone(), manual.clone(), Driver::Virtual(manual))
        };

        let page = Arc::new(
            MemoryPage::from_fixture(fixture, Some(Arc::clone(&scheduler)))
                .context("페이지 픽스처 구성 실패")?,
        );
        let context = MountContext {
            page: page.clone(),
            view: page.clone(),
            scheduler,
            clock,
        };
        let showcase = Showcase::mount(config, context, None).context("쇼케이스 마운트 실패")?;

        Ok(Self {
            page,
            showcase,
            driver,
            steps: AtomicU64::new(0),
            elapsed_ms: AtomicU64::new(0),
        })
    }

    pub fn showcase(&self) -> &Showcase {
        &self.showcase
    }

    /// 모든 단계를 순서대로 적용. 실패한 단계 번호(1부터)를 에러에 포함한다.
    pub async fn run(&self, scenario: &Scenario) -> Result<()> {
        info!(steps = scenario.steps.len(), "시나리오 재생 시작");
        for (index, step) in scenario.steps.iter().enumerate() {
            self.apply(step)
                .await
                .with_context(|| format!("시나리오 단계 {} 실패", index + 1))?;
            self.steps.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    /// 단계 하나 적용
    pub async fn apply(&self, step: &Step) -> Result<()> {
        debug!(?step, "단계 적용");
        match step {
            Step::Click { section, set } => self.page.click_set_button(section, set)?,
            Step::Play { video } => self.video(video)?.request_play(),
            Step::Pause { video } => self.video(video)?.pause(),
            Step::Seek { video, time } => self.video(video)?.request_seek(*time),
            Step::Rate { video, rate } => self.video(video)?.set_playback_rate(*rate),
            Step::Hover { video, leave } => {
                let event = if *leave {
                    MediaEvent::MouseLeave
                } else {
                    MediaEvent::MouseEnter
                };
                self.video(video)?.dispatch(event);
            }
            Step::Load { video } => self.video(video)?.complete_load(),
            Step::Insert { container, video } => {
                self.page.insert_video(container, video.clone());
            }
            Step::Tick { ms, step_ms } => self.advance(*ms, *step_ms).await,
        }
        Ok(())
    }

    /// 현재 상태 리포트
    pub fn report(&self) -> ReplayReport {
        ReplayReport {
            steps: self.steps.load(Ordering::Relaxed) as usize,
            elapsed_ms: self.elapsed_ms.load(Ordering::Relaxed),
            videos: self.page.snapshots(),
            showcase: self.showcase.report(),
        }
    }

    fn video(&self, id: &str) -> Result<Arc<SimulatedVideo>, CoreError> {
        self.page.video(id).ok_or_else(|| CoreError::NotFound {
            resource_type: "Video".to_string(),
            id: id.to_string(),
        })
    }

    /// `ms`를 `step_ms` 단위로 나눠 타이머와 재생을 진행
    async fn advance(&self, ms: u64, step_ms: u64) {
        let step = step_ms.max(1);
        let mut remaining = ms;
        while remaining > 0 {
            let chunk = remaining.min(step);
            let elapsed = Duration::from_millis(chunk);
            match &self.driver {
                Driver::Virtual(scheduler) => {
                    scheduler.advance(elapsed);
                }
                Driver::Realtime => tokio::time::sleep(elapsed).await,
            }
            self.page.tick(elapsed);
            remaining -= chunk;
            self.elapsed_ms.fetch_add(chunk, Ordering::Relaxed);
        }
    }
}
