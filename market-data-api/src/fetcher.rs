use crate::types::Quote;
use crate::us::UsMarketClient;
use crate::{Error, Result};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// 여러 미국 종목을 동시에 조회한다.
///
/// 종목마다 작업을 하나씩 띄우고 세마포어로 동시 실행 수를 제한한다.
/// 한 종목의 실패는 그 종목 결과에만 담기며, 결과 순서는 입력 순서와 같다.
#[derive(Clone)]
pub struct QuoteFetcher {
    client: Arc<UsMarketClient>,
    max_concurrency: usize,
}

impl QuoteFetcher {
    /// 동시 실행 수 기본값은 사용 가능한 CPU 수
    pub fn new(client: Arc<UsMarketClient>) -> Self {
        let max_concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            client,
            max_concurrency,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub async fn fetch_many<S: AsRef<str>>(&self, tickers: &[S]) -> Vec<(String, Result<Quote>)> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        info!(
            "{}개 종목 동시 조회 시작 (최대 {}개)",
            tickers.len(),
            self.max_concurrency
        );

        let handles: Vec<_> = tickers
            .iter()
            .map(|ticker| {
                let ticker = ticker.as_ref().to_string();
                let client = self.client.clone();
                let semaphore = semaphore.clone();
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| Error::Task(e.to_string()))?;
                    client.fetch_quote(&ticker).await
                })
            })
            .collect();

        let results = join_all(handles).await;

        tickers
            .iter()
            .zip(results)
            .map(|(ticker, joined)| {
                let result = joined.map_err(Error::from).and_then(|quote| quote);
                if let Err(e) = &result {
                    debug!("{} 조회 실패: {}", ticker.as_ref(), e);
                }
                (ticker.as_ref().to_string(), result)
            })
            .collect()
    }
}
