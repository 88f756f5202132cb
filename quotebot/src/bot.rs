//! 명령 단위 처리. 각 명령은 서비스 호출 결과를 채팅 응답 하나로 바꾼다.

use crate::reply::{self, Attachment, Reply};
use crate::utility::config::Config;
use crate::utility::errors::{BotError, BotResult};
use crate::utility::symbols::{apply_custom_fixtures, load_symbol_table};
use market_data_api::korean::{self, KrChartPeriod};
use market_data_api::types::{ChartKind, Currency, KoreanMarket, SymbolTable};
use market_data_api::{
    currency, ChartOutcome, ChartService, CryptoService, CurrencyService, HttpGateway,
    JsonFileStore, KoreanMarketClient, PlaceholderImage, QuoteFetcher, RequestGateway,
    ResilienceState, SentimentService, SessionStore, UsMarketClient,
};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

const BITCOIN_MARKET: &str = "KRW-BTC";

pub struct QuoteBot {
    korean: KoreanMarketClient,
    us: Arc<UsMarketClient>,
    fetcher: QuoteFetcher,
    charts: ChartService,
    currency: CurrencyService,
    sentiment: SentimentService,
    crypto: CryptoService,
}

impl QuoteBot {
    pub fn from_config(config: &Config) -> BotResult<Self> {
        let gateway: Arc<dyn HttpGateway> = Arc::new(RequestGateway::new(&config.http)?);

        // 종목 테이블이 없어도 국내 종목명 조회 외의 명령은 동작해야 한다
        let symbols = load_symbol_table(Path::new(&config.storage.symbol_table)).unwrap_or_else(|e| {
            warn!("종목 테이블 없이 시작합니다: {}", e);
            let mut table = SymbolTable::new();
            apply_custom_fixtures(&mut table);
            table
        });

        let store: Arc<dyn SessionStore> =
            Arc::new(JsonFileStore::new(&config.storage.session_file));
        let placeholder = PlaceholderImage::global(Path::new(&config.storage.placeholder_image));

        Self::new(gateway, symbols, store, placeholder, config.fetcher.max_concurrency)
    }

    pub fn new(
        gateway: Arc<dyn HttpGateway>,
        symbols: SymbolTable,
        store: Arc<dyn SessionStore>,
        placeholder: Arc<PlaceholderImage>,
        max_concurrency: Option<usize>,
    ) -> BotResult<Self> {
        let state = ResilienceState::load(store)?;
        let us = Arc::new(UsMarketClient::new(gateway.clone(), state));

        let fetcher = QuoteFetcher::new(us.clone());
        let fetcher = match max_concurrency {
            Some(limit) => fetcher.with_max_concurrency(limit),
            None => fetcher,
        };

        Ok(Self {
            korean: KoreanMarketClient::new(gateway.clone(), Arc::new(symbols)),
            us,
            fetcher,
            charts: ChartService::new(gateway.clone(), placeholder),
            currency: CurrencyService::new(gateway.clone()),
            sentiment: SentimentService::new(gateway.clone()),
            crypto: CryptoService::new(gateway),
        })
    }

    pub async fn korean_index(&self, market: KoreanMarket) -> BotResult<Reply> {
        let point = self.korean.fetch_index(market).await?;
        Ok(Reply::text(reply::korean_index(&point)))
    }

    /// `/kospi 삼성전자 주봉`. 인자가 없으면 코스피 지수
    pub async fn korean_stock(&self, tokens: &[String]) -> BotResult<Reply> {
        if tokens.is_empty() {
            return self.korean_index(KoreanMarket::Kospi).await;
        }

        let code = match self.korean.resolve_symbol(tokens) {
            Ok(code) => code,
            Err(e) if e.is_not_found() => return Ok(Reply::text(reply::NOT_FOUND)),
            Err(e) => return Err(e.into()),
        };
        info!("국내 종목 조회: {:?} → {}", tokens, code);

        let period = KrChartPeriod::from_tokens(tokens);
        let quote = self.korean.fetch_quote(&code).await?;
        Ok(Reply::text(reply::korean_stock(&quote, period))
            .with_attachment(Attachment::Url(korean::chart_url(&code, period))))
    }

    /// `/us AAPL [차트종류]`. 시세와 차트는 동시에 조회한다
    pub async fn us_stock(&self, ticker: &str, chart_key: Option<&str>) -> BotResult<Reply> {
        let kind = match chart_key.map(ChartKind::from_str).transpose() {
            Ok(kind) => kind.unwrap_or(ChartKind::Realtime),
            Err(_) => return Ok(Reply::text(reply::invalid_chart_kind())),
        };

        let (quote, chart) = tokio::join!(
            self.us.fetch_quote(ticker),
            self.charts.fetch_chart(ticker, kind)
        );

        let quote = match quote {
            Ok(quote) => quote,
            Err(e) if e.is_not_found() => return Ok(Reply::text(reply::NOT_FOUND)),
            Err(e) => return Err(e.into()),
        };

        match chart {
            Ok(ChartOutcome::Available(image)) => {
                Ok(Reply::text(reply::us_stock(&quote, Some(kind)))
                    .with_attachment(Attachment::Image(image)))
            }
            Ok(ChartOutcome::Unavailable { reason }) => {
                info!("{} 차트 없음: {}", ticker, reason);
                Ok(Reply::text(reply::us_stock(&quote, None)))
            }
            Err(e) => {
                warn!("{} 차트 조회 실패: {}", ticker, e);
                Ok(Reply::text(reply::us_stock(&quote, None)))
            }
        }
    }

    /// 여러 종목 시세를 한 번에. 개별 실패는 해당 줄에만 표시
    pub async fn us_many(&self, tickers: &[String]) -> BotResult<Reply> {
        if tickers.is_empty() {
            return Err(BotError::invalid_input("종목", "조회할 티커가 없습니다"));
        }
        let results = self.fetcher.fetch_many(tickers).await;
        let lines: Vec<String> = results
            .iter()
            .map(|(ticker, result)| reply::us_quote_line(ticker, result))
            .collect();
        Ok(Reply::text(lines.join("\n")))
    }

    /// `/fx usd [금액]`. 모르는 통화는 입력 오류
    pub async fn fx_by_key(&self, key: &str, amount: Option<&str>) -> BotResult<Reply> {
        let currency = Currency::from_str(key)
            .map_err(|_| BotError::invalid_input("통화", format!("{} (usd/jpy/eur/cny)", key)))?;
        self.fx(currency, amount).await
    }

    /// `/usd [금액]`
    pub async fn fx(&self, currency: Currency, amount: Option<&str>) -> BotResult<Reply> {
        let amount = amount
            .map(|text| {
                Decimal::from_str(text.trim().replace(',', "").as_str())
                    .map_err(|e| BotError::invalid_input("금액", format!("{} ({})", text, e)))
            })
            .transpose()?;

        let rate = self.currency.fetch_rate(currency).await?;
        let converted = currency::convert(amount, &rate)
            .map_err(|e| BotError::invalid_input("금액", e.to_string()))?;
        Ok(Reply::text(reply::fx(amount, &rate, converted))
            .with_attachment(Attachment::Url(currency::chart_url(currency))))
    }

    pub async fn fear_greed(&self) -> BotResult<Reply> {
        let index = self.sentiment.fear_greed().await?;
        Ok(Reply::text(reply::fear_greed(&index)))
    }

    pub async fn wallstreetbets(&self) -> BotResult<Reply> {
        let mentions = self.sentiment.top_mentions().await?;
        Ok(Reply::text(reply::wallstreetbets(&mentions)))
    }

    pub async fn bitcoin(&self) -> BotResult<Reply> {
        let ticker = self.crypto.fetch_ticker(BITCOIN_MARKET).await?;
        Ok(Reply::text(reply::upbit(&ticker)))
    }
}
