//! 시장 심리 지표: CNN 공포탐욕지수, 레딧 WallStreetBets 언급 순위

use crate::gateway::HttpGateway;
use crate::types::response::cnn::FearGreedGraph;
use crate::types::response::tradestie::RedditMention;
use crate::types::time::Time;
use crate::Result;
use getset::Getters;
use std::sync::Arc;
use tracing::info;

pub const FEAR_GREED_ENDPOINT: &str = "https://production.dataviz.cnn.io/index/fearandgreed/graphdata";
pub const REDDIT_ENDPOINT: &str = "https://tradestie.com/api/v1/apps/reddit";
/// 언급 순위는 상위 10개만 보여준다
pub const TOP_MENTIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct FearGreedIndex {
    /// 소수점 첫째 자리로 반올림된 점수
    #[getset(get = "pub")]
    score: f64,
    #[getset(get = "pub")]
    rating: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Other(String),
}

impl Sentiment {
    pub fn from_provider(value: &str) -> Self {
        match value {
            "Bullish" => Self::Bullish,
            "Bearish" => Self::Bearish,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Bullish => "🚀",
            Self::Bearish => "📉",
            Self::Other(_) => "🤷‍♂️",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Mention {
    #[getset(get = "pub")]
    ticker: String,
    #[getset(get = "pub")]
    sentiment: Sentiment,
    #[getset(get = "pub")]
    sentiment_score: f64,
    #[getset(get = "pub")]
    comments: u32,
}

impl From<&RedditMention> for Mention {
    fn from(row: &RedditMention) -> Self {
        Self {
            ticker: row.ticker().clone(),
            sentiment: Sentiment::from_provider(row.sentiment()),
            sentiment_score: *row.sentiment_score(),
            comments: *row.no_of_comments(),
        }
    }
}

fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Clone)]
pub struct SentimentService {
    gateway: Arc<dyn HttpGateway>,
}

impl SentimentService {
    pub fn new(gateway: Arc<dyn HttpGateway>) -> Self {
        Self { gateway }
    }

    /// 오늘(서울 기준) 날짜의 공포탐욕지수
    pub async fn fear_greed(&self) -> Result<FearGreedIndex> {
        let url = format!("{}/{}", FEAR_GREED_ENDPOINT, Time::now().date());
        let graph: FearGreedGraph = self
            .gateway
            .get(&url, &[])
            .await?
            .ensure_success("CNN")?
            .json("CNN")?;

        let now = graph.fear_and_greed();
        info!("공포탐욕지수: {} {}", now.score(), now.rating());
        Ok(FearGreedIndex {
            score: round_one(*now.score()),
            rating: now.rating().clone(),
        })
    }

    /// 댓글 수 순으로 정렬된 언급 종목 상위 [`TOP_MENTIONS`]개
    pub async fn top_mentions(&self) -> Result<Vec<Mention>> {
        let rows: Vec<RedditMention> = self
            .gateway
            .get(REDDIT_ENDPOINT, &[])
            .await?
            .ensure_success("tradestie")?
            .json("tradestie")?;

        Ok(rows.iter().take(TOP_MENTIONS).map(Mention::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::FakeGateway;
    use crate::gateway::RawResponse;
    use crate::Error;

    #[tokio::test]
    async fn test_fear_greed_rounds_score() {
        let gateway = Arc::new(FakeGateway::new().route(
            "fearandgreed/graphdata/",
            vec![RawResponse::new(
                200,
                r#"{"fear_and_greed":{"score":63.4571,"rating":"greed","timestamp":"2024-06-03T23:59:57+00:00","previous_close":61.2}}"#,
            )],
        ));

        let index = SentimentService::new(gateway.clone())
            .fear_greed()
            .await
            .expect("index");
        assert_eq!(*index.score(), 63.5);
        assert_eq!(index.rating(), "greed");
        assert!(gateway.requests()[0].url().ends_with(&Time::now().date()));
    }

    #[tokio::test]
    async fn test_top_mentions_limited() {
        let rows: Vec<String> = (0..12)
            .map(|i| {
                let sentiment = match i % 3 {
                    0 => "Bullish",
                    1 => "Bearish",
                    _ => "Neutral",
                };
                format!(
                    r#"{{"no_of_comments":{},"sentiment":"{}","sentiment_score":0.{},"ticker":"T{}"}}"#,
                    100 - i,
                    sentiment,
                    i,
                    i
                )
            })
            .collect();
        let body = format!("[{}]", rows.join(","));
        let gateway = Arc::new(FakeGateway::new().route("apps/reddit", vec![RawResponse::new(200, body)]));

        let mentions = SentimentService::new(gateway).top_mentions().await.expect("mentions");
        assert_eq!(mentions.len(), TOP_MENTIONS);
        assert_eq!(mentions[0].ticker(), "T0");
        assert_eq!(mentions[0].sentiment().emoji(), "🚀");
        assert_eq!(mentions[1].sentiment().emoji(), "📉");
        assert_eq!(mentions[2].sentiment().emoji(), "🤷‍♂️");
        assert_eq!(*mentions[3].comments(), 97);
    }

    #[tokio::test]
    async fn test_failure_status() {
        let gateway = Arc::new(FakeGateway::new().route("apps/reddit", vec![RawResponse::new(502, "")]));
        assert!(matches!(
            SentimentService::new(gateway).top_mentions().await,
            Err(Error::Provider { .. })
        ));
    }
}
