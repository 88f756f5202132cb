use crate::gateway::HttpGateway;
use crate::types::response::upbit::Ticker;
use crate::{Error, Result};
use std::sync::Arc;

pub const TICKER_ENDPOINT: &str = "https://api.upbit.com/v1/ticker";

const PROVIDER: &str = "업비트";

/// 업비트 원화 마켓 시세
#[derive(Clone)]
pub struct CryptoService {
    gateway: Arc<dyn HttpGateway>,
}

impl CryptoService {
    pub fn new(gateway: Arc<dyn HttpGateway>) -> Self {
        Self { gateway }
    }

    /// `market` 예: "KRW-BTC"
    pub async fn fetch_ticker(&self, market: &str) -> Result<Ticker> {
        let rows: Vec<Ticker> = self
            .gateway
            .get(TICKER_ENDPOINT, &[("markets", market)])
            .await?
            .ensure_success(PROVIDER)?
            .json(PROVIDER)?;

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::provider(PROVIDER, format!("{} 시세 결과가 비어 있습니다", market)))
    }
}
