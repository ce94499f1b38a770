//! # showcase-replay
//!
//! 쇼케이스 재생 도구.
//! 페이지 픽스처에 쇼케이스를 마운트하고 시나리오를 재생한 뒤
//! 비디오/섹션 상태 리포트를 JSON으로 표준 출력에 쓴다.

mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use showcase_core::config::ShowcaseConfig;
use showcase_core::config_manager::ConfigManager;
use showcase_runtime::sim::PageFixture;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::scenario::{Replay, Scenario};

/// 쇼케이스 시나리오 재생기
///
/// 동기화/세트 전환 동작을 브라우저 없이 재현한다
#[derive(Parser, Debug)]
#[command(name = "showcase-replay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 페이지 픽스처 (JSON)
    #[arg(long, short = 'p')]
    page: PathBuf,

    /// 시나리오 (JSON, 없으면 마운트 직후 상태만 출력)
    #[arg(long, short = 's')]
    scenario: Option<PathBuf>,

    /// 설정 파일 (없으면 기본값, 경로가 없으면 기본값으로 생성)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 가상 시간 대신 실제 시간으로 진행
    #[arg(long)]
    realtime: bool,

    /// 한 줄 JSON 출력
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 리포트는 stdout, 로그는 stderr
    let log_filter = format!(
        "showcase_replay={0},showcase_core={0},showcase_runtime={0},showcase_sync={0},showcase_page={0}",
        args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(args.config.as_deref())?;
    let fixture: PageFixture = read_json(&args.page).context("페이지 픽스처 로드 실패")?;
    let scenario: Scenario = match &args.scenario {
        Some(path) => read_json(path).context("시나리오 로드 실패")?,
        None => Scenario::default(),
    };

    let replay = Replay::new(&config, fixture, args.realtime)?;
    replay.run(&scenario).await?;

    let report = replay.report();
    info!(
        steps = report.steps,
        elapsed_ms = report.elapsed_ms,
        videos = report.videos.len(),
        "재생 완료"
    );
    replay.showcase().disconnect();

    let json = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{json}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ShowcaseConfig> {
    match path {
        Some(path) => {
            let manager = ConfigManager::with_path(path.to_path_buf())
                .with_context(|| format!("설정 로드 실패: {}", path.display()))?;
            info!("설정 파일: {}", manager.config_path().display());
            Ok(manager.get())
        }
        None => Ok(ShowcaseConfig::default_config()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("파일 읽기 실패: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("JSON 파싱 실패: {}", path.display()))
}
