//! 미국 주식 차트 이미지 (Daum 금융 CDN)
//!
//! 장이 닫혀 있으면 CDN이 차트 대신 고정된 "장 마감" 이미지를 내려준다.
//! 그 이미지와 바이트 단위로 같으면 차트가 없는 것으로 본다.

use crate::gateway::HttpGateway;
use crate::types::time::Time;
use crate::types::ChartKind;
use crate::Result;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

pub const CHART_ENDPOINT: &str = "https://t1.daumcdn.net/finance/chart/us";

static PLACEHOLDER: OnceLock<Arc<PlaceholderImage>> = OnceLock::new();

/// 장 마감 안내 이미지. 파일이 없으면 비교를 건너뛴다.
#[derive(Debug, Default)]
pub struct PlaceholderImage {
    bytes: Option<Vec<u8>>,
}

impl PlaceholderImage {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => {
                info!("장 마감 이미지 로드: {} ({} bytes)", path.display(), bytes.len());
                Self::from_bytes(bytes)
            }
            Err(e) => {
                warn!("장 마감 이미지를 읽지 못해 비교를 건너뜁니다: {} ({})", path.display(), e);
                Self::empty()
            }
        }
    }

    /// 프로세스 전체에서 한 번만 읽는다. 이후 호출의 `path`는 무시된다.
    pub fn global(path: &Path) -> Arc<PlaceholderImage> {
        PLACEHOLDER
            .get_or_init(|| Arc::new(Self::load(path)))
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.bytes.is_some()
    }

    pub fn matches(&self, bytes: &[u8]) -> bool {
        self.bytes.as_deref() == Some(bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// CDN이 200이 아닌 상태 코드를 돌려줌
    Status(u16),
    /// 장 마감 이미지가 내려옴
    MarketClosed,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "차트 응답 상태 {}", status),
            Self::MarketClosed => write!(f, "장이 열리지 않아 차트가 없습니다"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    Available(Vec<u8>),
    Unavailable { reason: UnavailableReason },
}

impl ChartOutcome {
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Available(bytes) => Some(bytes),
            Self::Unavailable { .. } => None,
        }
    }
}

/// 차트 종류 → (기간, 시리즈)
pub fn chart_params(kind: ChartKind) -> (&'static str, &'static str) {
    match kind {
        ChartKind::Realtime => ("d", "stock"),
        ChartKind::Month1 => ("m", "stock"),
        ChartKind::Month3 => ("m3", "stock"),
        ChartKind::Year1 => ("y", "stock"),
        ChartKind::Year3 => ("y3", "stock"),
        ChartKind::Year10 => ("y10", "stock"),
        ChartKind::Day => ("d", "candle"),
        ChartKind::Week => ("w", "candle"),
        ChartKind::Monthly => ("m", "candle"),
    }
}

pub fn chart_url(ticker: &str, kind: ChartKind) -> String {
    let (period, series) = chart_params(kind);
    format!(
        "{}/{}/{}/{}.png?timestamp={}",
        CHART_ENDPOINT,
        series,
        period,
        ticker.trim().to_uppercase(),
        Time::now().timestamp()
    )
}

#[derive(Clone)]
pub struct ChartService {
    gateway: Arc<dyn HttpGateway>,
    placeholder: Arc<PlaceholderImage>,
}

impl ChartService {
    pub fn new(gateway: Arc<dyn HttpGateway>, placeholder: Arc<PlaceholderImage>) -> Self {
        Self {
            gateway,
            placeholder,
        }
    }

    pub async fn fetch_chart(&self, ticker: &str, kind: ChartKind) -> Result<ChartOutcome> {
        let response = self.gateway.get(&chart_url(ticker, kind), &[]).await?;
        if response.status() != 200 {
            debug!("{} {} 차트 없음: 상태 {}", ticker, kind, response.status());
            return Ok(ChartOutcome::Unavailable {
                reason: UnavailableReason::Status(response.status()),
            });
        }

        if self.placeholder.matches(response.bytes()) {
            debug!("{} {} 차트가 장 마감 이미지입니다", ticker, kind);
            return Ok(ChartOutcome::Unavailable {
                reason: UnavailableReason::MarketClosed,
            });
        }

        Ok(ChartOutcome::Available(response.into_bytes()))
    }

    /// 사용자 입력 키/라벨로 조회. 모르는 값이면 `Error::InvalidChartKind`
    pub async fn fetch_chart_by_key(&self, ticker: &str, key: &str) -> Result<ChartOutcome> {
        let kind = key.parse::<ChartKind>()?;
        self.fetch_chart(ticker, kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::FakeGateway;
    use crate::gateway::RawResponse;
    use crate::Error;

    const CLOSED_PNG: &[u8] = b"\x89PNG market closed";

    // 프로세스 전역 상태를 쓰므로 이 테스트 바이너리에서 `global`을 부르는 곳은 여기뿐이어야 한다
    #[test]
    fn test_global_placeholder_loads_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        fs::write(&first, b"first").expect("write first");
        fs::write(&second, b"second").expect("write second");

        let barrier = Arc::new(std::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let barrier = barrier.clone();
                let path = if i % 2 == 0 { first.clone() } else { second.clone() };
                std::thread::spawn(move || {
                    barrier.wait();
                    PlaceholderImage::global(&path)
                })
            })
            .collect();
        let images: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect();

        assert!(images.iter().all(|image| Arc::ptr_eq(image, &images[0])));
        let winner = &images[0];
        assert!(winner.is_loaded());
        assert!(winner.matches(b"first") || winner.matches(b"second"));

        // 이후 호출은 경로와 상관없이 처음 읽은 이미지를 돌려준다
        let later = PlaceholderImage::global(&dir.path().join("missing.png"));
        assert!(Arc::ptr_eq(&later, winner));
        assert!(later.is_loaded());
    }

    fn service(gateway: FakeGateway) -> (ChartService, Arc<FakeGateway>) {
        let gateway = Arc::new(gateway);
        (
            ChartService::new(
                gateway.clone(),
                Arc::new(PlaceholderImage::from_bytes(CLOSED_PNG)),
            ),
            gateway,
        )
    }

    #[test]
    fn test_chart_url_table() {
        assert!(chart_url("tsla", ChartKind::Week)
            .starts_with("https://t1.daumcdn.net/finance/chart/us/candle/w/TSLA.png?timestamp="));
        assert!(chart_url("AAPL", ChartKind::Year10)
            .starts_with("https://t1.daumcdn.net/finance/chart/us/stock/y10/AAPL.png?timestamp="));
        assert_eq!(chart_params(ChartKind::Monthly), ("m", "candle"));
        assert_eq!(chart_params(ChartKind::Month1), ("m", "stock"));
    }

    #[test]
    fn test_placeholder_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("market_close.png");
        assert!(!PlaceholderImage::load(&path).is_loaded());

        std::fs::write(&path, CLOSED_PNG).expect("write placeholder");
        let placeholder = PlaceholderImage::load(&path);
        assert!(placeholder.matches(CLOSED_PNG));
        assert!(!placeholder.matches(b"other"));
        assert!(!PlaceholderImage::empty().matches(CLOSED_PNG));
    }

    #[tokio::test]
    async fn test_placeholder_bytes_are_unavailable() {
        let (service, _) = service(
            FakeGateway::new().route("/stock/d/AAPL.png", vec![RawResponse::new(200, CLOSED_PNG)]),
        );
        assert_eq!(
            service.fetch_chart("AAPL", ChartKind::Realtime).await.expect("outcome"),
            ChartOutcome::Unavailable {
                reason: UnavailableReason::MarketClosed
            }
        );
    }

    #[tokio::test]
    async fn test_real_chart_is_returned_unchanged() {
        let chart = b"\x89PNG real chart".to_vec();
        let (service, _) = service(
            FakeGateway::new().route("/candle/d/AAPL.png", vec![RawResponse::new(200, chart.clone())]),
        );
        let outcome = service.fetch_chart("AAPL", ChartKind::Day).await.expect("outcome");
        assert_eq!(outcome.bytes(), Some(chart.as_slice()));
    }

    #[tokio::test]
    async fn test_non_200_is_unavailable() {
        let (service, _) = service(
            FakeGateway::new().route("/stock/y/AAPL.png", vec![RawResponse::new(204, "")]),
        );
        assert_eq!(
            service.fetch_chart("AAPL", ChartKind::Year1).await.expect("outcome"),
            ChartOutcome::Unavailable {
                reason: UnavailableReason::Status(204)
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_key_never_hits_network() {
        let (service, gateway) = service(FakeGateway::new());
        assert!(matches!(
            service.fetch_chart_by_key("AAPL", "HOURLY").await,
            Err(Error::InvalidChartKind(_))
        ));
        assert!(gateway.requests().is_empty());

        let outcome = service.fetch_chart_by_key("AAPL", "3개월").await.expect("outcome");
        assert_eq!(
            outcome,
            ChartOutcome::Unavailable {
                reason: UnavailableReason::Status(404)
            }
        );
        assert_eq!(gateway.count("/stock/m3/AAPL.png"), 1);
    }
}
