//! # showcase-core
//!
//! 프로젝트 쇼케이스 페이지의 도메인 모델, 포트(trait) 정의, 설정, 에러 타입.
//! 모든 crate가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 미디어 상태/이벤트, 그룹 형태, 뷰어 이벤트
//! - [`ports`] — 호스트 경계 인터페이스 (미디어 요소, 페이지, 스케줄러, 모델 뷰어)
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 섹션/속도/감시/뷰어 설정 구조체
//! - [`config_manager`] — 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
