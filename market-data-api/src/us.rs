//! 미국 주식 시세 (Robinhood 비공식 엔드포인트)
//!
//! 시세 API는 종목 페이지에 심어진 베어러 토큰을 요구한다. 토큰 상태는
//! `NoToken → TokenValid → TokenExpired(갱신 중) → TokenValid | RenewalFailed` 로 움직이며,
//! 한 번의 `fetch_quote` 호출 안에서 토큰 갱신은 최대 한 번만 일어난다.

use crate::gateway::{GatewayRequest, HttpGateway};
use crate::session::ResilienceState;
use crate::types::response::robinhood::{LiveDetail, NextData};
use crate::types::{parse_decimal, Quote, SessionLabel};
use crate::{Error, Result};
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PAGE_ENDPOINT: &str = "https://robinhood.com/us/en/stocks";
pub const DETAIL_ENDPOINT: &str = "https://bonfire.robinhood.com/instruments";
/// 토큰을 긁어올 때 사용하는 기준 종목
pub const REFERENCE_TICKER: &str = "NVDA";

const PROVIDER: &str = "Robinhood";
const INSTRUMENT_META_SELECTOR: &str = r#"meta[name="twitter:app:url:iphone"]"#;
const INSTRUMENT_URL_PREFIX: &str = "robinhood://instrument?id=";
const NEXT_DATA_SELECTOR: &str = "script#__NEXT_DATA__";
/// 최초 시도 + 토큰 갱신 후 재시도
const QUOTE_ATTEMPTS: usize = 2;

fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

fn page_url(ticker: &str) -> String {
    format!("{}/{}/", PAGE_ENDPOINT, ticker)
}

/// `<meta name="twitter:app:url:iphone" content="robinhood://instrument?id=...">`
fn extract_instrument_id(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(INSTRUMENT_META_SELECTOR).ok()?;
    document
        .select(&selector)
        .filter_map(|meta| meta.value().attr("content"))
        .map(|content| content.replace(INSTRUMENT_URL_PREFIX, "").trim().to_string())
        .find(|id| !id.is_empty())
}

/// `<script id="__NEXT_DATA__">` JSON에서 베어러 토큰 추출
fn extract_bearer_token(html: &str) -> Result<String> {
    let raw = {
        let document = Html::parse_document(html);
        let selector = Selector::parse(NEXT_DATA_SELECTOR)
            .map_err(|e| Error::Renewal(format!("선택자 오류: {:?}", e)))?;
        document
            .select(&selector)
            .next()
            .map(|script| script.text().collect::<String>())
            .ok_or_else(|| Error::Renewal("__NEXT_DATA__ 스크립트가 없습니다".to_string()))?
    };

    let next_data: NextData = serde_json::from_str(&raw)
        .map_err(|e| Error::Renewal(format!("__NEXT_DATA__ 파싱 실패: {}", e)))?;
    next_data
        .bearer_token()
        .map(str::to_string)
        .ok_or_else(|| Error::Renewal("토큰 필드가 비어 있습니다".to_string()))
}

/// 가장 최근 세션 슬롯의 가격과 라벨로 시세를 만든다
fn quote_from_detail(ticker: &str, detail: &LiveDetail) -> Result<Quote> {
    let slot = detail.chart_section().latest();
    let price_text = slot.price().as_deref().unwrap_or_default();
    let price = parse_decimal(price_text)
        .ok_or_else(|| Error::provider(PROVIDER, format!("{} 가격 형식 오류: {:?}", ticker, price_text)))?;

    let session = SessionLabel::from_provider(slot.label().as_deref().unwrap_or_default());
    let symbol = detail.symbol().clone().unwrap_or_else(|| ticker.to_string());
    let company_name = detail.name().clone().unwrap_or_else(|| symbol.clone());

    Ok(Quote::new(
        symbol,
        company_name,
        price,
        session,
        slot.change().as_deref().and_then(parse_decimal),
        slot.change_percent().as_deref().and_then(parse_decimal),
    ))
}

pub struct UsMarketClient {
    gateway: Arc<dyn HttpGateway>,
    state: ResilienceState,
}

impl UsMarketClient {
    /// 저장소에서 읽어 둔 세션 상태를 넘겨받아 생성
    pub fn new(gateway: Arc<dyn HttpGateway>, state: ResilienceState) -> Self {
        Self { gateway, state }
    }

    /// 티커 → 종목 식별자. 캐시에 있으면 네트워크를 쓰지 않는다.
    /// 종목 페이지가 404면 없는 티커로 보고 `NotFound`.
    pub async fn resolve_instrument_id(&self, ticker: &str) -> Result<String> {
        let ticker = normalize_ticker(ticker);
        if let Some(instrument_id) = self.state.instrument(&ticker).await {
            return Ok(instrument_id);
        }

        let response = self.gateway.get(&page_url(&ticker), &[]).await?;
        if response.status() == 404 {
            return Err(Error::NotFound(ticker));
        }
        let response = response.ensure_success(PROVIDER)?;

        let Some(instrument_id) = extract_instrument_id(&response.text()) else {
            warn!("{} 종목 페이지에 식별자 메타 태그가 없습니다", ticker);
            return Err(Error::NotFound(ticker));
        };

        self.state.record_instrument(&ticker, &instrument_id).await;
        info!("종목 식별자 등록: {} → {}", ticker, instrument_id);
        Ok(instrument_id)
    }

    /// 기준 종목 페이지에서 새 토큰을 긁어와 저장한다. 자동 재시도 없음
    pub async fn renew_token(&self) -> Result<()> {
        let response = self
            .gateway
            .get(&page_url(REFERENCE_TICKER), &[])
            .await?;
        if !response.is_success() {
            return Err(Error::Renewal(format!(
                "{} 페이지 응답 상태 {}",
                REFERENCE_TICKER,
                response.status()
            )));
        }

        let token = extract_bearer_token(&response.text())?;
        self.state.replace_token(token).await;
        info!("Robinhood 토큰 갱신 완료");
        Ok(())
    }

    /// 단일 종목 시세. 인증 실패 시 토큰을 한 번 갱신하고 한 번만 다시 시도한다.
    /// 저장된 토큰이 없으면 먼저 갱신하며, 이 경우 추가 갱신은 없다.
    pub async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
        let ticker = normalize_ticker(ticker);
        let instrument_id = self.resolve_instrument_id(&ticker).await?;

        let mut renewed = false;
        if !self.state.has_token().await {
            info!("저장된 토큰이 없어 {} 조회 전에 발급합니다", ticker);
            self.renew_token().await?;
            renewed = true;
        }

        let mut last_status = 0;
        for attempt in 0..QUOTE_ATTEMPTS {
            if attempt > 0 {
                if renewed {
                    break;
                }
                warn!(
                    "{} 시세 조회 실패 (상태 {}), 토큰 갱신 후 재시도",
                    ticker, last_status
                );
                self.renew_token().await?;
                renewed = true;
            }

            let token = self.state.token().await;
            let response = self
                .gateway
                .execute(detail_request(&instrument_id, &token))
                .await?;
            if response.is_success() {
                let detail: LiveDetail = response.json(PROVIDER)?;
                debug!("{} 시세 수신 (시도 {})", ticker, attempt + 1);
                return quote_from_detail(&ticker, &detail);
            }
            last_status = response.status();
        }

        Err(Error::provider(
            PROVIDER,
            format!("{} 시세 조회 실패: 토큰 갱신 후에도 상태 {}", ticker, last_status),
        ))
    }
}

fn detail_request(instrument_id: &str, token: &str) -> GatewayRequest {
    GatewayRequest::get(format!(
        "{}/{}/detail-page-live-updating-data/",
        DETAIL_ENDPOINT, instrument_id
    ))
    .query("display_span", "day")
    .query("hide_extended_hours", "false")
    .header("accept-language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7")
    .header("origin", "https://robinhood.com")
    .header("referer", "https://robinhood.com/")
    .bearer(token)
}
