//! 비공식 시세 엔드포인트(네이버 금융, Robinhood, Daum 차트, 두나무 환율 등)를
//! 묶어 챗봇에 필요한 시세 데이터를 제공하는 클라이언트 모음.
//!
//! 구성
//! - [`gateway`]: 공통 헤더/타임아웃을 적용하는 HTTP 호출 계층
//! - [`korean`]: 국내 지수/종목 시세, 종목명 → 코드 변환
//! - [`us`]: 세션 토큰 기반 미국 주식 시세 (인증 실패 시 1회 재발급 후 재시도)
//! - [`chart`]: 미국 주식 차트 이미지 + 장 마감 이미지 걸러내기
//! - [`fetcher`]: 여러 종목 동시 조회
//! - [`currency`]: 환율 조회 및 환산
//! - [`sentiment`], [`crypto`]: 공포탐욕지수, 레딧 언급 순위, 업비트 시세

pub mod chart;
pub mod crypto;
pub mod currency;
pub mod fetcher;
pub mod gateway;
pub mod korean;
pub mod session;
pub mod sentiment;
pub mod types;
pub mod us;

pub use chart::{ChartOutcome, ChartService, PlaceholderImage, UnavailableReason};
pub use crypto::CryptoService;
pub use currency::{CurrencyService, FxRate};
pub use fetcher::QuoteFetcher;
pub use gateway::{GatewayRequest, HttpGateway, RawResponse, RequestGateway};
pub use korean::KoreanMarketClient;
pub use sentiment::SentimentService;
pub use session::{JsonFileStore, MemoryStore, ResilienceState, SessionState, SessionStore};
pub use us::UsMarketClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// DNS, 연결, 타임아웃 등 네트워크 단계 실패
    #[error("네트워크 오류: {0}")]
    Transport(#[from] reqwest::Error),

    /// 예상하지 못한 응답 형태 또는 설명되지 않는 비정상 상태 코드
    #[error("{provider} 응답 오류: {reason}")]
    Provider { provider: String, reason: String },

    /// 존재하지 않는 종목. 장애가 아닌 정상적인 결과
    #[error("종목을 찾을 수 없습니다: {0}")]
    NotFound(String),

    #[error("토큰 갱신 실패: {0}")]
    Renewal(String),

    #[error("지원하지 않는 차트 종류: {0}")]
    InvalidChartKind(String),

    #[error("지원하지 않는 통화: {0}")]
    InvalidCurrency(String),

    /// 환산 결과가 표현 범위를 넘는 금액
    #[error("환산할 수 없는 금액: {0}")]
    InvalidAmount(String),

    #[error("세션 저장소 오류: {operation} - {reason}")]
    Store { operation: String, reason: String },

    /// 동시 조회 작업이 비정상 종료됨
    #[error("비동기 작업 실패: {0}")]
    Task(String),

    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn provider(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn store(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// 사용자에게 "종목 없음"으로 안내할 결과인지
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        Error::Task(error.to_string())
    }
}
