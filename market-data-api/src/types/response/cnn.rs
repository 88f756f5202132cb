use getset::Getters;
use serde::Deserialize;

/// CNN `index/fearandgreed/graphdata/{date}` 응답 중 현재 값
#[derive(Clone, Debug, Deserialize, Getters)]
pub struct FearGreedGraph {
    #[getset(get = "pub")]
    fear_and_greed: FearGreedNow,
}

#[derive(Clone, Debug, Deserialize, Getters)]
pub struct FearGreedNow {
    #[getset(get = "pub")]
    score: f64,
    /// 예: "extreme fear", "greed"
    #[getset(get = "pub")]
    rating: String,
    #[getset(get = "pub")]
    #[serde(default)]
    previous_close: Option<f64>,
}
