use thiserror::Error;

/// 챗봇 명령 처리 중 발생하는 오류
#[derive(Error, Debug)]
pub enum BotError {
    /// 시세 라이브러리 오류
    #[error("시세 조회 오류: {0}")]
    MarketData(#[from] market_data_api::Error),

    /// 설정 관련 오류 (config.rs의 ConfigError와 연동)
    #[error("설정 오류: {0}")]
    Config(#[from] crate::utility::config::ConfigError),

    /// 종목 테이블 CSV 로딩 오류
    #[error("종목 테이블 오류: {path} - {reason}")]
    SymbolTable { path: String, reason: String },

    /// 사용자 입력 오류 (잘못된 금액, 통화 등)
    #[error("잘못된 입력: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("I/O 오류: {operation} - {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("오류: {message}")]
    General { message: String },
}

pub type BotResult<T> = Result<T, BotError>;

impl BotError {
    pub fn symbol_table(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SymbolTable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// 사용자에게 "종목을 찾지 못했습니다"로 안내할 오류인지
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MarketData(e) if e.is_not_found())
    }
}

impl From<std::io::Error> for BotError {
    fn from(error: std::io::Error) -> Self {
        Self::io("파일 I/O", error)
    }
}

impl From<csv::Error> for BotError {
    fn from(error: csv::Error) -> Self {
        Self::symbol_table("CSV", error.to_string())
    }
}
