use getset::Getters;
use serde::Deserialize;

/// tradestie `/api/v1/apps/reddit` 배열의 원소 (댓글 수 순)
#[derive(Clone, Debug, Deserialize, Getters)]
pub struct RedditMention {
    #[getset(get = "pub")]
    ticker: String,
    /// "Bullish" | "Bearish"
    #[getset(get = "pub")]
    sentiment: String,
    #[getset(get = "pub")]
    sentiment_score: f64,
    #[getset(get = "pub")]
    #[serde(default)]
    no_of_comments: u32,
}
