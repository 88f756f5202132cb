use crate::gateway::HttpGateway;
use crate::types::response::naver::{IndexBasic, RealtimeStock};
use crate::types::time::Time;
use crate::types::{parse_decimal, KoreanMarket, MarketPoint, Quote, SessionLabel, SymbolCode, SymbolTable};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub const INDEX_ENDPOINT: &str = "https://m.stock.naver.com/api/index";
pub const REALTIME_ENDPOINT: &str = "https://polling.finance.naver.com/api/realtime/domestic/stock";
pub const CHART_ENDPOINT: &str = "https://ssl.pstatic.net/imgfinance/chart/item/area";

const PROVIDER: &str = "네이버 금융";

/// 국내 종목 차트 기간. 종목명 뒤에 붙는 키워드로 지정한다
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KrChartPeriod {
    Day,
    Week,
}

impl KrChartPeriod {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim() {
            "일봉" => Some(Self::Day),
            "주봉" => Some(Self::Week),
            _ => None,
        }
    }

    /// 마지막 토큰이 기간 키워드면 그 기간, 아니면 일봉
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        tokens
            .last()
            .and_then(|last| Self::from_keyword(last.as_ref()))
            .unwrap_or(Self::Day)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Day => "일봉",
            Self::Week => "주봉",
        }
    }
}

/// 사용자 입력 토큰을 종목코드로 변환
///
/// 첫 토큰이 숫자면 그대로 코드로 쓰고, 아니면 끝의 기간 키워드를 뗀 나머지를
/// 공백으로 이어 종목명 테이블에서 찾는다.
pub fn resolve_symbol<S: AsRef<str>>(tokens: &[S], table: &SymbolTable) -> Result<SymbolCode> {
    let first = tokens
        .first()
        .map(|token| token.as_ref().trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::NotFound(String::new()))?;

    if first.chars().all(|c| c.is_ascii_digit()) {
        return Ok(SymbolCode::new(first));
    }

    let name_tokens = match tokens.split_last() {
        Some((last, rest)) if KrChartPeriod::from_keyword(last.as_ref()).is_some() => rest,
        _ => tokens,
    };
    let name = name_tokens
        .iter()
        .map(|token| token.as_ref().trim())
        .collect::<Vec<_>>()
        .join(" ");

    match table.lookup(&name) {
        Some(code) => {
            debug!("종목명 {} → {}", name, code);
            Ok(SymbolCode::new(code))
        }
        None => Err(Error::NotFound(name)),
    }
}

/// 국내 종목 차트 이미지 URL. 캐시를 피하려고 현재 시각을 붙인다
pub fn chart_url(code: &SymbolCode, period: KrChartPeriod) -> String {
    format!(
        "{}/{}/{}.png?ver={}",
        CHART_ENDPOINT,
        period.path(),
        code,
        Time::now().timestamp()
    )
}

/// 네이버 금융 기반 국내 지수/종목 시세.
/// 인증이 없으므로 재시도하지 않는다.
#[derive(Clone)]
pub struct KoreanMarketClient {
    gateway: Arc<dyn HttpGateway>,
    symbols: Arc<SymbolTable>,
}

impl KoreanMarketClient {
    pub fn new(gateway: Arc<dyn HttpGateway>, symbols: Arc<SymbolTable>) -> Self {
        Self { gateway, symbols }
    }

    pub fn resolve_symbol<S: AsRef<str>>(&self, tokens: &[S]) -> Result<SymbolCode> {
        resolve_symbol(tokens, &self.symbols)
    }

    /// 코스피/코스닥 지수
    pub async fn fetch_index(&self, market: KoreanMarket) -> Result<MarketPoint> {
        let url = format!("{}/{}/basic", INDEX_ENDPOINT, market.code());
        let body: IndexBasic = self
            .gateway
            .get(&url, &[])
            .await?
            .ensure_success(PROVIDER)?
            .json(PROVIDER)?;

        info!("{} 지수 조회: {}", market.display_name(), body.close_price());
        Ok(MarketPoint::new(
            market.code(),
            body.close_price(),
            body.compare_to_previous_close_price(),
            format!("{}%", body.fluctuations_ratio()),
        ))
    }

    /// 단일 종목 실시간 시세. 결과가 비어 있으면 없는 코드로 본다
    pub async fn fetch_quote(&self, code: &SymbolCode) -> Result<Quote> {
        let url = format!("{}/{}", REALTIME_ENDPOINT, code);
        let body: RealtimeStock = self
            .gateway
            .get(&url, &[])
            .await?
            .ensure_success(PROVIDER)?
            .json(PROVIDER)?;

        let row = body
            .datas()
            .first()
            .ok_or_else(|| Error::provider(PROVIDER, format!("{} 시세 결과가 비어 있습니다", code)))?;

        let price = parse_decimal(row.close_price()).ok_or_else(|| {
            Error::provider(PROVIDER, format!("현재가 형식 오류: {}", row.close_price()))
        })?;
        let change_percent = parse_decimal(row.fluctuations_ratio()).ok_or_else(|| {
            Error::provider(PROVIDER, format!("등락률 형식 오류: {}", row.fluctuations_ratio()))
        })?;
        let change_amount = row
            .compare_to_previous_close_price()
            .as_deref()
            .and_then(parse_decimal);

        Ok(Quote::new(
            code.as_str(),
            row.stock_name().as_str(),
            price,
            SessionLabel::Regular,
            change_amount,
            Some(change_percent),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::FakeGateway;
    use crate::gateway::RawResponse;
    use rust_decimal_macros::dec;

    fn table() -> SymbolTable {
        vec![("삼성전자", "005930"), ("삼성전자우", "005935"), ("KODEX 200", "069500")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_resolve_symbol_by_name() {
        assert_eq!(
            resolve_symbol(&["삼성전자"], &table()).expect("known name"),
            SymbolCode::new("005930")
        );
        assert!(matches!(
            resolve_symbol(&["없는종목"], &table()),
            Err(Error::NotFound(name)) if name == "없는종목"
        ));
    }

    #[test]
    fn test_resolve_symbol_numeric_and_keywords() {
        assert_eq!(
            resolve_symbol(&["000660", "주봉"], &table()).expect("numeric code"),
            SymbolCode::new("000660")
        );
        assert_eq!(
            resolve_symbol(&["KODEX", "200", "주봉"], &table()).expect("multi token name"),
            SymbolCode::new("069500")
        );
        assert_eq!(
            resolve_symbol(&["삼성전자우", "일봉"], &table()).expect("trailing day keyword"),
            SymbolCode::new("005935")
        );
        let empty: [&str; 0] = [];
        assert!(resolve_symbol(&empty, &table()).is_err());
    }

    #[test]
    fn test_chart_period_and_url() {
        assert_eq!(KrChartPeriod::from_tokens(&["삼성전자", "주봉"]), KrChartPeriod::Week);
        assert_eq!(KrChartPeriod::from_tokens(&["삼성전자"]), KrChartPeriod::Day);

        let url = chart_url(&SymbolCode::new("005930"), KrChartPeriod::Week);
        assert!(url.starts_with(
            "https://ssl.pstatic.net/imgfinance/chart/item/area/week/005930.png?ver="
        ));
    }

    fn client(gateway: FakeGateway) -> (KoreanMarketClient, Arc<FakeGateway>) {
        let gateway = Arc::new(gateway);
        (
            KoreanMarketClient::new(gateway.clone(), Arc::new(table())),
            gateway,
        )
    }

    #[tokio::test]
    async fn test_fetch_index() {
        let (client, gateway) = client(FakeGateway::new().route(
            "/api/index/KOSDAQ/basic",
            vec![RawResponse::new(
                200,
                r#"{"closePrice":"868.95","compareToPreviousClosePrice":"-3.21","fluctuationsRatio":"-0.37"}"#,
            )],
        ));

        let point = client.fetch_index(KoreanMarket::Kosdaq).await.expect("index");
        assert_eq!(point.market_name(), "KOSDAQ");
        assert_eq!(point.close_price(), "868.95");
        assert_eq!(point.change_amount(), "-3.21");
        assert_eq!(point.change_percent_text(), "-0.37%");
        assert_eq!(gateway.count("KOSDAQ"), 1);
    }

    #[tokio::test]
    async fn test_fetch_index_failures() {
        let (client, _) = client(
            FakeGateway::new()
                .route("/KOSPI/", vec![RawResponse::new(500, "")])
                .route("/KOSDAQ/", vec![RawResponse::new(200, r#"{"closePrice":"1"}"#)]),
        );
        assert!(matches!(
            client.fetch_index(KoreanMarket::Kospi).await,
            Err(Error::Provider { .. })
        ));
        assert!(matches!(
            client.fetch_index(KoreanMarket::Kosdaq).await,
            Err(Error::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_quote() {
        let (client, _) = client(FakeGateway::new().route(
            "/stock/005930",
            vec![RawResponse::new(
                200,
                r#"{"datas":[{"itemCode":"005930","stockName":"삼성전자","closePrice":"71,000","compareToPreviousClosePrice":"-500","fluctuationsRatio":"-0.70"}]}"#,
            )],
        ));

        let quote = client
            .fetch_quote(&SymbolCode::new("005930"))
            .await
            .expect("quote");
        assert_eq!(quote.company_name(), "삼성전자");
        assert_eq!(*quote.price(), dec!(71000));
        assert_eq!(*quote.change_amount(), Some(dec!(-500)));
        assert_eq!(*quote.change_percent(), Some(dec!(-0.70)));
        assert_eq!(*quote.session(), SessionLabel::Regular);
    }

    #[tokio::test]
    async fn test_fetch_quote_empty_result() {
        let (client, _) = client(
            FakeGateway::new().route("/stock/999999", vec![RawResponse::new(200, r#"{"datas":[]}"#)]),
        );
        assert!(matches!(
            client.fetch_quote(&SymbolCode::new("999999")).await,
            Err(Error::Provider { .. })
        ));
    }
}
