use market_data_api::types::config::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("설정 파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),
    #[error("설정 파일 읽기 오류: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("설정 파일 파싱 오류: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("설정 유효성 검증 실패: {0}")]
    ValidationError(String),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub http: GatewayConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// 미국 시세 세션 상태 파일 (JSON)
    pub session_file: String,
    /// 장 마감 차트 이미지. 없으면 비교하지 않는다
    pub placeholder_image: String,
    /// KRX 종목 테이블 CSV
    pub symbol_table: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FetcherConfig {
    /// 여러 종목 동시 조회 한도. 비우면 CPU 수
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// 지정된 파일에서 설정을 로드
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Err(ConfigError::FileNotFound(format!(
                "{}가 없습니다. config.example.toml을 복사해서 config.toml을 만들어주세요.",
                path
            )));
        }

        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        // 환경 변수로 오버라이드
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("QUOTEBOT_SESSION_FILE") {
            self.storage.session_file = path;
        }
        if let Ok(path) = std::env::var("QUOTEBOT_SYMBOL_TABLE") {
            self.storage.symbol_table = path;
        }
        if let Ok(path) = std::env::var("QUOTEBOT_PLACEHOLDER_IMAGE") {
            self.storage.placeholder_image = path;
        }

        // 로그 레벨
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// 설정 유효성 검증
    fn validate(&self) -> Result<(), ConfigError> {
        if *self.http.timeout_secs() == 0 || *self.http.timeout_secs() > 120 {
            return Err(ConfigError::ValidationError(
                "http.timeout_secs는 1~120 사이여야 합니다".to_string(),
            ));
        }
        if self.http.user_agent().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "http.user_agent가 비어 있습니다".to_string(),
            ));
        }

        for (name, value) in [
            ("storage.session_file", &self.storage.session_file),
            ("storage.placeholder_image", &self.storage.placeholder_image),
            ("storage.symbol_table", &self.storage.symbol_table),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("{}가 비어 있습니다", name)));
            }
        }

        if self.fetcher.max_concurrency == Some(0) {
            return Err(ConfigError::ValidationError(
                "fetcher.max_concurrency는 1 이상이어야 합니다".to_string(),
            ));
        }

        // RUST_LOG 형식의 지시어("info,market_data_api=debug")도 허용한다
        let level = self
            .logging
            .level
            .split(',')
            .next()
            .and_then(|directive| directive.rsplit('=').next())
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "log level은 'error', 'warn', 'info', 'debug', 'trace' 중 하나여야 합니다"
                        .to_string(),
                ))
            }
        }

        Ok(())
    }
}
