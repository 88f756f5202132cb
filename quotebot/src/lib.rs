use tracing_log::LogTracer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

pub mod bot;
pub mod reply;
pub mod utility;

/// tracing 초기화 함수
/// JSON 구조화 로그를 출력하며, 레벨은 설정 파일의 `logging.level`을 따른다.
/// (`RUST_LOG`가 있으면 설정 로드 단계에서 이미 그 값으로 덮어쓴다)
pub fn init_tracing(level: &str) -> Result<(), String> {
    // 기존 log! 매크로 호환
    LogTracer::init().map_err(|e| {
        eprintln!("Failed to set LogTracer: {}", e);
        format!("로그 시스템 초기화 실패: {}", e)
    })?;

    let filter = EnvFilter::try_new(level).map_err(|e| format!("잘못된 로그 레벨 {}: {}", level, e))?;

    // JSON 구조화 로그 + 파일/라인/스레드 정보 포함
    let subscriber = Registry::default().with(filter).with(
        fmt::layer()
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true),
    );

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        eprintln!("Failed to set tracing subscriber: {}", e);
        format!("로그 시스템 초기화 실패: {}", e)
    })?;

    Ok(())
}
